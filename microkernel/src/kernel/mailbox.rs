use std::fmt;

use microkernel_api::errors::MailboxFull;
use microkernel_api::message::Message;
use ringbuf::traits::{Consumer, Observer, Producer};
use ringbuf::HeapRb;

/// Smallest mailbox the kernel will create.
pub const MIN_MAILBOX_CAPACITY: usize = 2;

/// Rounds a requested capacity up to the next power of two, never below
/// [`MIN_MAILBOX_CAPACITY`].
pub fn round_capacity(requested: usize) -> usize {
    requested.max(MIN_MAILBOX_CAPACITY).next_power_of_two()
}

/// A fixed-capacity FIFO of owned messages belonging to one actor.
///
/// Storage is a heap ring buffer allocated once at creation. Enqueue never
/// blocks and never grows the buffer: when the ring is full the message is
/// handed back inside [`MailboxFull`] and the caller decides what to do
/// with it.
pub struct Mailbox {
    ring: HeapRb<Message>,
    capacity: usize,
}

impl fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl Mailbox {
    /// Creates a mailbox able to hold `round_capacity(requested)` messages.
    pub fn new(requested: usize) -> Self {
        let capacity = round_capacity(requested);
        Self {
            ring: HeapRb::new(capacity),
            capacity,
        }
    }

    pub fn enqueue(&mut self, message: Message) -> Result<(), MailboxFull> {
        self.ring.try_push(message).map_err(|message| MailboxFull {
            capacity: self.capacity,
            message,
        })
    }

    /// Removes the oldest message.
    pub fn dequeue(&mut self) -> Option<Message> {
        self.ring.try_pop()
    }

    pub fn len(&self) -> usize {
        self.ring.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Disposes of every pending message and returns how many there were.
    pub fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while self.ring.try_pop().is_some() {
            dropped += 1;
        }
        dropped
    }
}

impl Drop for Mailbox {
    fn drop(&mut self) {
        let dropped = self.drain();
        if dropped > 0 {
            tracing::trace!(dropped, "mailbox dropped with pending messages");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microkernel_api::ActorId;

    fn msg(n: u32) -> Message {
        Message::new(ActorId::INVALID, ActorId::new(0, 1), n, &n.to_le_bytes())
    }

    #[test]
    fn test_capacity_rounding() {
        assert_eq!(round_capacity(0), 2);
        assert_eq!(round_capacity(1), 2);
        assert_eq!(round_capacity(2), 2);
        assert_eq!(round_capacity(3), 4);
        assert_eq!(round_capacity(16), 16);
        assert_eq!(round_capacity(17), 32);
        assert_eq!(Mailbox::new(5).capacity(), 8);
    }

    #[test]
    fn test_wraparound_preserves_order() {
        let mut mb = Mailbox::new(4);
        for round in 0..10u32 {
            mb.enqueue(msg(round * 2)).unwrap();
            mb.enqueue(msg(round * 2 + 1)).unwrap();
            assert_eq!(mb.dequeue().unwrap().msg_type(), round * 2);
            assert_eq!(mb.dequeue().unwrap().msg_type(), round * 2 + 1);
        }
        assert!(mb.is_empty());
    }

    #[test]
    fn test_full_returns_message() {
        let mut mb = Mailbox::new(2);
        mb.enqueue(msg(1)).unwrap();
        mb.enqueue(msg(2)).unwrap();
        assert!(mb.is_full());

        let err = mb.enqueue(msg(3)).unwrap_err();
        assert_eq!(err.capacity, 2);
        assert_eq!(err.into_message().msg_type(), 3);
        assert_eq!(mb.len(), 2);
    }

    #[test]
    fn test_drain() {
        let mut mb = Mailbox::new(8);
        for i in 0..5 {
            mb.enqueue(msg(i)).unwrap();
        }
        assert_eq!(mb.drain(), 5);
        assert!(mb.is_empty());
        assert!(mb.dequeue().is_none());
    }
}
