use microkernel_api::system::{SystemPayload, CHILD_EXIT, FD_EVENT, SUP_START, SYSTEM_BASE, TIMER};
use microkernel_api::{
    ActorId, ActorStatus, ChildExit, ExitReason, FdEvent, Interest, RestartStrategy, RestartType, TimerFired,
    TimerId,
};

#[test]
fn test_reserved_tags_are_distinct() {
    let tags = [TIMER, FD_EVENT, CHILD_EXIT, SUP_START];
    for (i, a) in tags.iter().enumerate() {
        assert!(*a > SYSTEM_BASE);
        for b in &tags[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

// Payloads are little-endian, fixed size
#[test]
fn test_wire_layouts() {
    let fired = TimerFired {
        timer: TimerId::from_raw(0x0102_0304),
        expirations: 5,
    };
    assert_eq!(fired.encode(), vec![4, 3, 2, 1, 5, 0, 0, 0, 0, 0, 0, 0]);

    let event = FdEvent {
        fd: 3,
        events: Interest::WRITABLE | Interest::ERROR,
    };
    assert_eq!(event.encode(), vec![3, 0, 0, 0, 6, 0, 0, 0]);

    let exit = ChildExit {
        child: ActorId::new(0, 2),
        reason: ExitReason::Normal,
    };
    assert_eq!(ChildExit::decode(&exit.encode()), Some(exit));
}

#[test]
fn test_trailing_bytes_are_ignored() {
    let mut bytes = FdEvent {
        fd: 9,
        events: Interest::READABLE,
    }
    .encode();
    bytes.extend_from_slice(&[0xAA; 4]);
    assert_eq!(
        FdEvent::decode(&bytes),
        Some(FdEvent {
            fd: 9,
            events: Interest::READABLE
        })
    );
}

#[test]
fn test_interest_mask() {
    let mask = Interest::READABLE | Interest::WRITABLE;
    assert!(mask.is_readable() && mask.is_writable());
    assert!(mask.contains(Interest::READABLE));
    assert!(!mask.contains(Interest::READABLE | Interest::HANGUP));
    assert!(mask.intersects(Interest::READABLE | Interest::HANGUP));
    assert!(Interest::NONE.is_empty());
    assert_eq!(Interest::from_bits(mask.bits()), mask);
}

#[test]
fn test_exit_reason_codes() {
    assert_eq!(ExitReason::default(), ExitReason::Normal);
    assert_eq!(ExitReason::from_u8(ExitReason::Killed.as_u8()), Some(ExitReason::Killed));
    assert_eq!(ExitReason::from_u8(2), None);
    assert!(ExitReason::Normal.is_normal());
    assert!(!ExitReason::Killed.is_normal());
}

#[test]
fn test_restart_vocabulary() {
    assert_eq!(RestartStrategy::default(), RestartStrategy::OneForOne);
    assert_eq!(RestartStrategy::RestForOne.to_string(), "rest_for_one");
    assert_eq!(RestartType::default(), RestartType::Permanent);
    assert!(RestartType::Permanent.should_restart(ExitReason::Normal));
    assert!(!RestartType::Transient.should_restart(ExitReason::Normal));
    assert!(RestartType::Transient.should_restart(ExitReason::Killed));
    assert!(!RestartType::Temporary.should_restart(ExitReason::Killed));
    assert_ne!(ActorStatus::Idle, ActorStatus::Stopped);
}
