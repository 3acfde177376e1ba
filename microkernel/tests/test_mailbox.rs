use anyhow::Result;
use microkernel::{ActorConfig, SendError};

mod test_helpers;
use test_helpers::{new_log, runtime, types, Recorder, PING, PONG, START};

#[test]
fn test_capacity_is_rounded_up() -> Result<()> {
    let mut rt = runtime(4);
    let log = new_log();
    let a = rt.spawn(Recorder::new(&log), 3)?;
    let b = rt.spawn(Recorder::new(&log), 0)?;
    let c = rt.spawn_with(Box::new(Recorder::new(&log)), &ActorConfig::default())?;

    let capacity = |id| rt.actor(id).map(|actor| actor.mailbox().capacity());
    assert_eq!(capacity(a), Some(4));
    assert_eq!(capacity(b), Some(2));
    assert_eq!(capacity(c), Some(rt.config().default_mailbox_capacity));
    Ok(())
}

#[test]
fn test_backpressure_then_recovery() -> Result<()> {
    let mut rt = runtime(4);
    let log = new_log();
    let a = rt.spawn(Recorder::new(&log), 2)?;

    rt.send(a, PING, &[1])?;
    rt.send(a, PING, &[2])?;
    let err = rt.send(a, PING, &[3]).unwrap_err();
    assert_eq!(err, SendError::MailboxFull { actor: a, capacity: 2 });
    assert_eq!(rt.mailbox_len(a), Some(2));

    // One quantum frees one slot.
    assert!(rt.step());
    rt.send(a, PONG, &[4])?;
    rt.run_until_idle();

    let payloads: Vec<u8> = log.borrow().iter().map(|r| r.payload[0]).collect();
    assert_eq!(payloads, vec![1, 2, 4]);
    assert_eq!(rt.mailbox_len(a), Some(0));
    Ok(())
}

#[test]
fn test_order_preserved_across_senders() -> Result<()> {
    let mut rt = runtime(4);
    let log = new_log();
    let a = rt.spawn(Recorder::new(&log), 8)?;
    let b = rt.spawn(Recorder::new(&new_log()), 2)?;

    rt.send_from(b, a, START, &[])?;
    rt.send(a, PING, &[])?;
    rt.send_from(b, a, PONG, &[])?;
    rt.run_until_idle();

    assert_eq!(types(&log), vec![START, PING, PONG]);
    let sources: Vec<_> = log.borrow().iter().map(|r| r.source).collect();
    assert_eq!(sources[0], b);
    assert!(!sources[1].is_valid());
    Ok(())
}

#[test]
fn test_pending_messages_dropped_with_actor() -> Result<()> {
    let mut rt = runtime(4);
    let log = new_log();
    let a = rt.spawn(Recorder::new(&log), 4)?;
    rt.send(a, PING, &[])?;
    rt.send(a, PING, &[])?;

    rt.stop(a);
    rt.run_until_idle();

    assert!(log.borrow().is_empty());
    assert_eq!(rt.mailbox_len(a), None);
    Ok(())
}
