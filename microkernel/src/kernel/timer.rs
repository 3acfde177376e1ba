use std::time::Duration;

use microkernel_api::address::ActorId;
use microkernel_api::errors::TimerError;
use microkernel_api::system::TimerFired;
use microkernel_api::types::TimerId;

#[derive(Debug, Clone)]
struct TimerEntry {
    id: TimerId,
    owner: ActorId,
    deadline: Duration,
    interval: Duration,
    periodic: bool,
}

/// Fixed-capacity table of armed timers.
///
/// Deadlines are kept relative to the runtime clock's origin. Expired
/// one-shot timers are removed; periodic timers are re-armed on a fixed
/// grid (`deadline += n * interval`) so they do not drift.
#[derive(Debug)]
pub struct TimerTable {
    entries: Vec<Option<TimerEntry>>,
    next_id: u32,
}

impl TimerTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity],
            next_id: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    fn alloc_id(&mut self) -> TimerId {
        let id = TimerId::from_raw(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    pub fn arm(
        &mut self,
        owner: ActorId,
        interval: Duration,
        periodic: bool,
        now: Duration,
    ) -> Result<TimerId, TimerError> {
        if interval.is_zero() {
            return Err(TimerError::ZeroInterval);
        }
        let deadline = now.checked_add(interval).ok_or(TimerError::IntervalTooLong)?;
        let capacity = self.capacity();
        let slot = self
            .entries
            .iter()
            .position(Option::is_none)
            .ok_or(TimerError::TableFull { capacity })?;

        let id = self.alloc_id();
        self.entries[slot] = Some(TimerEntry {
            id,
            owner,
            deadline,
            interval,
            periodic,
        });
        Ok(id)
    }

    /// Cancels `id` if it belongs to `owner`.
    pub fn cancel(&mut self, owner: ActorId, id: TimerId) -> Result<(), TimerError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|e| matches!(e, Some(t) if t.id == id && t.owner == owner))
            .ok_or(TimerError::NotFound(id))?;
        *slot = None;
        Ok(())
    }

    /// Cancels every timer owned by `owner`.
    pub fn remove_owner(&mut self, owner: ActorId) -> usize {
        let mut removed = 0;
        for slot in self.entries.iter_mut() {
            if matches!(slot, Some(t) if t.owner == owner) {
                *slot = None;
                removed += 1;
            }
        }
        removed
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().flatten().map(|t| t.deadline).min()
    }

    /// Collects every timer due at `now` into `fired` as `(owner, payload)`.
    ///
    /// A periodic timer whose next deadline is not representable fires one
    /// last time and is removed.
    pub fn expire(&mut self, now: Duration, fired: &mut Vec<(ActorId, TimerFired)>) {
        for slot in self.entries.iter_mut() {
            let Some(timer) = slot else { continue };
            if timer.deadline > now {
                continue;
            }
            let mut retire = !timer.periodic;
            let expirations = if timer.periodic {
                let overrun = (now - timer.deadline).as_nanos() / timer.interval.as_nanos();
                let n = u64::try_from(overrun).unwrap_or(u64::MAX - 1) + 1;
                let next = u32::try_from(n)
                    .ok()
                    .and_then(|n| timer.interval.checked_mul(n))
                    .and_then(|advance| timer.deadline.checked_add(advance));
                match next {
                    Some(deadline) => timer.deadline = deadline,
                    None => retire = true,
                }
                n
            } else {
                1
            };
            fired.push((
                timer.owner,
                TimerFired {
                    timer: timer.id,
                    expirations,
                },
            ));
            if retire {
                *slot = None;
            }
        }
    }
}
