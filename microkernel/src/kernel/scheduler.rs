use std::fmt;

use crossbeam_queue::ArrayQueue;
use microkernel_api::address::ActorId;
use microkernel_api::types::ActorStatus;

use crate::kernel::actor::Actor;

/// FIFO queue of actors waiting for a quantum.
///
/// The queue holds addresses, not actors, and is bounded by the size of the
/// actor table. An actor is in the queue at most once: enqueueing an actor
/// whose status is already `Ready` does nothing.
pub struct Scheduler {
    ready: ArrayQueue<ActorId>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("ready", &self.ready.len())
            .field("capacity", &self.ready.capacity())
            .finish()
    }
}

impl Scheduler {
    /// `capacity` must be non-zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            ready: ArrayQueue::new(capacity),
        }
    }

    /// Marks `actor` ready and appends it to the queue.
    ///
    /// Returns `false` if the actor was already ready or is stopped.
    pub fn enqueue(&self, actor: &mut Actor) -> bool {
        match actor.status {
            ActorStatus::Ready | ActorStatus::Stopped => return false,
            ActorStatus::Idle | ActorStatus::Running => {}
        }
        if actor.queued {
            return false;
        }
        if let Err(id) = self.ready.push(actor.id()) {
            tracing::error!(actor = %id, "ready queue overflow");
            return false;
        }
        actor.status = ActorStatus::Ready;
        actor.queued = true;
        crate::log_scheduler!("ready_queue", "enqueued", actor = %actor.id(), ready = self.ready.len());
        true
    }

    /// Pops the next address. The caller resolves it against the actor table.
    pub fn dequeue(&self) -> Option<ActorId> {
        self.ready.pop()
    }

    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.ready.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::behavior::from_fn;

    fn actor(seq: u32) -> Actor {
        Actor::new(ActorId::new(0, seq), Box::new(from_fn((), |_, _, _| true)), 4)
    }

    #[test]
    fn test_enqueue_is_idempotent_while_ready() {
        let sched = Scheduler::new(4);
        let mut a = actor(1);

        assert!(sched.enqueue(&mut a));
        assert!(!sched.enqueue(&mut a));
        assert!(!sched.enqueue(&mut a));
        assert_eq!(sched.len(), 1);
        assert_eq!(a.status(), ActorStatus::Ready);
    }

    #[test]
    fn test_fifo_order() {
        let sched = Scheduler::new(4);
        let mut a = actor(1);
        let mut b = actor(2);
        let mut c = actor(3);
        sched.enqueue(&mut b);
        sched.enqueue(&mut a);
        sched.enqueue(&mut c);

        assert_eq!(sched.dequeue(), Some(b.id()));
        assert_eq!(sched.dequeue(), Some(a.id()));
        assert_eq!(sched.dequeue(), Some(c.id()));
        assert_eq!(sched.dequeue(), None);
    }

    #[test]
    fn test_stopped_actor_not_enqueued() {
        let sched = Scheduler::new(2);
        let mut a = actor(1);
        a.status = ActorStatus::Stopped;
        assert!(!sched.enqueue(&mut a));
        assert!(sched.is_empty());
    }
}
