//! # Microkernel API
//!
//! Shared vocabulary of a single-address-space actor microkernel: how actors
//! are addressed, what a message looks like, which messages the kernel
//! itself generates, and how failures are reported.
//!
//! ## Key Concepts
//!
//! - **Address**: an [`ActorId`] packs a node identifier with a per-node
//!   sequence number. Sequence 0 is the invalid sentinel.
//! - **Message**: an immutable envelope owning a private copy of its
//!   payload bytes, tagged with a numeric [`MsgType`].
//! - **Kernel messages**: timer expiry, descriptor readiness and child
//!   termination are ordinary messages in a reserved tag range
//!   ([`system`]).
//! - **Supervision vocabulary**: [`RestartStrategy`] and [`RestartType`].
//!
//! ## Module Organization
//!
//! - [`address`]: actor addressing
//! - [`message`]: message envelope
//! - [`system`]: kernel message tags and payload codecs
//! - [`types`]: lifecycle status, exit reasons, timer ids, interest masks
//! - [`supervisor`]: restart strategies and restart types
//! - [`errors`]: error types

pub mod address;
pub mod errors;
pub mod message;
pub mod supervisor;
pub mod system;
pub mod types;

pub use address::{ActorId, NodeId};
pub use errors::*;
pub use message::{Message, MsgType};
pub use supervisor::{RestartStrategy, RestartType};
pub use system::{ChildExit, FdEvent, SystemPayload, TimerFired};
pub use types::{ActorStatus, ExitReason, Fd, Interest, TimerId};
