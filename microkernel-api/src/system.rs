//! # Kernel Messages
//!
//! The kernel talks to actors with the same envelopes actors use among
//! themselves. Timer expiry, descriptor readiness and child termination are
//! delivered as ordinary messages whose type tags live in a reserved range,
//! with the source address set to [`ActorId::INVALID`].
//!
//! Payloads use a fixed little-endian layout so they can be produced and
//! consumed without any serialization framework:
//!
//! | type          | layout                               |
//! |---------------|--------------------------------------|
//! | `TIMER`       | `timer_id: u32, expirations: u64`    |
//! | `FD_EVENT`    | `fd: i32, events: u32`               |
//! | `CHILD_EXIT`  | `child: u64, reason: u8`             |
//! | `SUP_START`   | empty                                |

use crate::address::ActorId;
use crate::message::MsgType;
use crate::types::{ExitReason, Fd, Interest, TimerId};

/// First tag of the reserved range.
pub const SYSTEM_BASE: MsgType = 0xFF00_0000;
/// A timer armed by the receiver fired.
pub const TIMER: MsgType = 0xFF00_0001;
/// A descriptor watched by the receiver became ready.
pub const FD_EVENT: MsgType = 0xFF00_0002;
/// A child linked to the receiver terminated.
pub const CHILD_EXIT: MsgType = 0xFF00_0010;
/// Tells a freshly spawned supervisor to start its children.
pub const SUP_START: MsgType = 0xFF00_0011;

pub const fn is_system_type(msg_type: MsgType) -> bool {
    msg_type >= SYSTEM_BASE
}

/// A payload with a fixed type tag and byte layout.
pub trait SystemPayload: Sized {
    const MSG_TYPE: MsgType;

    fn encode(&self) -> Vec<u8>;

    /// Returns `None` when the buffer is too short or holds an unknown value.
    fn decode(bytes: &[u8]) -> Option<Self>;
}

fn read_array<const N: usize>(bytes: &[u8], at: usize) -> Option<[u8; N]> {
    bytes.get(at..at + N)?.try_into().ok()
}

/// Payload of a [`TIMER`] message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub timer: TimerId,
    /// Number of intervals elapsed since the previous delivery. Greater than
    /// one only when a periodic timer overran.
    pub expirations: u64,
}

impl SystemPayload for TimerFired {
    const MSG_TYPE: MsgType = TIMER;

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(12);
        buf.extend_from_slice(&self.timer.as_raw().to_le_bytes());
        buf.extend_from_slice(&self.expirations.to_le_bytes());
        buf
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            timer: TimerId::from_raw(u32::from_le_bytes(read_array(bytes, 0)?)),
            expirations: u64::from_le_bytes(read_array(bytes, 4)?),
        })
    }
}

/// Payload of an [`FD_EVENT`] message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdEvent {
    pub fd: Fd,
    pub events: Interest,
}

impl SystemPayload for FdEvent {
    const MSG_TYPE: MsgType = FD_EVENT;

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8);
        buf.extend_from_slice(&self.fd.to_le_bytes());
        buf.extend_from_slice(&self.events.bits().to_le_bytes());
        buf
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            fd: Fd::from_le_bytes(read_array(bytes, 0)?),
            events: Interest::from_bits(u32::from_le_bytes(read_array(bytes, 4)?)),
        })
    }
}

/// Payload of a [`CHILD_EXIT`] message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    pub child: ActorId,
    pub reason: ExitReason,
}

impl SystemPayload for ChildExit {
    const MSG_TYPE: MsgType = CHILD_EXIT;

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(9);
        buf.extend_from_slice(&self.child.as_raw().to_le_bytes());
        buf.push(self.reason.as_u8());
        buf
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            child: ActorId::from_raw(u64::from_le_bytes(read_array(bytes, 0)?)),
            reason: ExitReason::from_u8(*bytes.get(8)?)?,
        })
    }
}
