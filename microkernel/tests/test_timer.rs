use std::time::Duration;

use anyhow::Result;
use microkernel::system::TIMER;
use microkernel::{from_fn, SystemPayload, TimerError, TimerFired, TimerId};

mod test_helpers;
use test_helpers::{manual_runtime, new_log, runtime, types, Log, Recorder, START};

const MS: Duration = Duration::from_millis(1);

fn fired(log: &Log) -> Vec<TimerFired> {
    log.borrow()
        .iter()
        .filter(|r| r.msg_type == TIMER)
        .filter_map(|r| TimerFired::decode(&r.payload))
        .collect()
}

#[test]
fn test_one_shot_fires_once() -> Result<()> {
    let (mut rt, clock) = manual_runtime(4);
    let log = new_log();
    let a = rt.spawn(Recorder::new(&log), 4)?;
    let timer = rt.set_timer(a, 10 * MS, false)?;
    assert!(timer.is_valid());

    clock.advance(5 * MS);
    assert_eq!(rt.poll_events(Duration::ZERO)?, 0);

    clock.advance(5 * MS);
    assert_eq!(rt.poll_events(Duration::ZERO)?, 1);
    rt.run_until_idle();
    assert_eq!(
        fired(&log),
        vec![TimerFired {
            timer,
            expirations: 1
        }]
    );
    assert_eq!(rt.timer_count(), 0);

    clock.advance(100 * MS);
    assert_eq!(rt.poll_events(Duration::ZERO)?, 0);
    Ok(())
}

#[test]
fn test_timer_message_has_no_source() -> Result<()> {
    let (mut rt, clock) = manual_runtime(4);
    let log = new_log();
    let a = rt.spawn(Recorder::new(&log), 4)?;
    rt.set_timer(a, MS, false)?;

    clock.advance(MS);
    rt.poll_events(Duration::ZERO)?;
    rt.run_until_idle();

    let received = log.borrow();
    assert_eq!(received.len(), 1);
    assert!(!received[0].source.is_valid());
    assert_eq!(received[0].actor, a);
    Ok(())
}

#[test]
fn test_periodic_reports_missed_expirations() -> Result<()> {
    let (mut rt, clock) = manual_runtime(4);
    let log = new_log();
    let a = rt.spawn(Recorder::new(&log), 4)?;
    let timer = rt.set_timer(a, 10 * MS, true)?;

    clock.advance(35 * MS);
    assert_eq!(rt.poll_events(Duration::ZERO)?, 1);
    // Next deadline stays on the 10ms grid.
    clock.advance(5 * MS);
    assert_eq!(rt.poll_events(Duration::ZERO)?, 1);
    rt.run_until_idle();

    let expirations: Vec<u64> = fired(&log).iter().map(|f| f.expirations).collect();
    assert_eq!(expirations, vec![3, 1]);
    assert!(fired(&log).iter().all(|f| f.timer == timer));
    assert_eq!(rt.timer_count(), 1);
    Ok(())
}

#[test]
fn test_cancelled_timer_never_fires() -> Result<()> {
    let (mut rt, clock) = manual_runtime(4);
    let log = new_log();
    let a = rt.spawn(Recorder::new(&log), 4)?;
    let keep = rt.set_timer(a, 10 * MS, false)?;
    let cancel = rt.set_timer(a, 10 * MS, true)?;
    assert_ne!(keep, cancel);

    rt.cancel_timer(a, cancel)?;
    assert_eq!(rt.cancel_timer(a, cancel).unwrap_err(), TimerError::NotFound(cancel));

    clock.advance(30 * MS);
    rt.poll_events(Duration::ZERO)?;
    rt.run_until_idle();
    assert_eq!(fired(&log).iter().map(|f| f.timer).collect::<Vec<_>>(), vec![keep]);
    Ok(())
}

#[test]
fn test_only_owner_can_cancel() -> Result<()> {
    let (mut rt, _clock) = manual_runtime(4);
    let log = new_log();
    let a = rt.spawn(Recorder::new(&log), 4)?;
    let b = rt.spawn(Recorder::new(&log), 4)?;
    let timer = rt.set_timer(a, 10 * MS, false)?;

    assert!(rt.cancel_timer(b, timer).is_err());
    assert_eq!(rt.timer_count(), 1);
    Ok(())
}

#[test]
fn test_stopping_owner_cancels_timers() -> Result<()> {
    let (mut rt, clock) = manual_runtime(4);
    let log = new_log();
    let a = rt.spawn(Recorder::new(&log), 4)?;
    rt.set_timer(a, 10 * MS, true)?;
    rt.set_timer(a, 20 * MS, false)?;
    assert_eq!(rt.timer_count(), 2);

    rt.stop(a);
    rt.run_until_idle();
    assert_eq!(rt.timer_count(), 0);

    clock.advance(50 * MS);
    assert_eq!(rt.poll_events(Duration::ZERO)?, 0);
    assert!(log.borrow().is_empty());
    Ok(())
}

#[test]
fn test_timer_arguments_are_checked() -> Result<()> {
    let (mut rt, _clock) = manual_runtime(4);
    let log = new_log();
    let a = rt.spawn(Recorder::new(&log), 4)?;

    assert_eq!(rt.set_timer(a, Duration::ZERO, false).unwrap_err(), TimerError::ZeroInterval);

    rt.stop(a);
    assert_eq!(rt.set_timer(a, MS, false).unwrap_err(), TimerError::InvalidOwner(a));
    assert!(rt.cancel_timer(a, TimerId::INVALID).is_err());
    Ok(())
}

#[test]
fn test_timer_table_capacity() -> Result<()> {
    let (mut rt, _clock) = manual_runtime(4);
    let log = new_log();
    let a = rt.spawn(Recorder::new(&log), 4)?;
    let capacity = rt.config().max_timers;

    for _ in 0..capacity {
        rt.set_timer(a, MS, false)?;
    }
    assert_eq!(
        rt.set_timer(a, MS, false).unwrap_err(),
        TimerError::TableFull { capacity }
    );
    Ok(())
}

#[test]
fn test_run_waits_for_real_timer() -> Result<()> {
    let mut rt = runtime(4);
    let log = new_log();
    let recorder = rt.spawn(Recorder::new(&log), 4)?;

    // Arms a short timer on START and forwards the expiry before stopping.
    let sleeper = rt.spawn(
        from_fn(recorder, |recorder, ctx, msg| match msg.msg_type() {
            START => ctx.set_timer(Duration::from_millis(5), false).is_ok(),
            TIMER => {
                let _ = ctx.send(*recorder, TIMER, msg.payload());
                false
            }
            _ => true,
        }),
        4,
    )?;
    rt.send(sleeper, START, &[])?;

    let started = rt.now();
    rt.run()?;

    assert!(rt.now() - started >= Duration::from_millis(5));
    assert_eq!(types(&log), vec![TIMER]);
    assert!(!rt.is_alive(sleeper));
    Ok(())
}
