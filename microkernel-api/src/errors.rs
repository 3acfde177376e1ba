//! # Kernel Error Types
//!
//! Every failure the kernel can report is a value, never a panic. Failures
//! fall into four families:
//!
//! - **Capacity exhaustion**: a full mailbox, actor table, timer table or
//!   watch table. Always recoverable; the caller may retry later.
//! - **Addressing**: the destination is unknown, stopped, or lives on a
//!   node this runtime has no transport to.
//! - **Supervision**: malformed child specifications or lookups against a
//!   supervisor that does not exist.
//! - **Runtime**: configuration and OS-level failures of the event loop.
//!
//! Behavioral failure (a behavior choosing to stop) is not an error value;
//! it travels to the parent as a `CHILD_EXIT` message.

use std::io;

use thiserror::Error;

use crate::address::{ActorId, NodeId};
use crate::message::Message;
use crate::types::{Fd, TimerId};

/// Returned by a mailbox that has no free slot. The rejected message is
/// handed back to the caller.
#[derive(Error, Debug)]
#[error("Mailbox is full (capacity: {capacity})")]
pub struct MailboxFull {
    pub capacity: usize,
    pub message: Message,
}

impl MailboxFull {
    pub fn into_message(self) -> Message {
        self.message
    }
}

/// Errors related to spawning actors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    #[error("Actor table is full (capacity: {capacity})")]
    TableFull { capacity: usize },
    #[error("Parent actor not found: {0}")]
    ParentNotFound(ActorId),
    #[error("Address space of node {node} is exhausted")]
    AddressSpaceExhausted { node: NodeId },
}

/// Errors related to sending a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("Invalid destination address")]
    InvalidAddress,
    #[error("Actor not found: {0}")]
    NoSuchActor(ActorId),
    #[error("Actor is stopped: {0}")]
    ActorStopped(ActorId),
    #[error("Mailbox of {actor} is full (capacity: {capacity})")]
    MailboxFull { actor: ActorId, capacity: usize },
    #[error("No transport to node {node}")]
    RemoteNode { node: NodeId },
}

impl SendError {
    /// Capacity failures may succeed on retry; addressing failures will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SendError::MailboxFull { .. })
    }
}

/// Errors related to timers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Timer table is full (capacity: {capacity})")]
    TableFull { capacity: usize },
    #[error("Timer owner is not a live actor: {0}")]
    InvalidOwner(ActorId),
    #[error("Timer interval must be non-zero")]
    ZeroInterval,
    #[error("Timer deadline is out of range")]
    IntervalTooLong,
    #[error("Timer not found: {0}")]
    NotFound(TimerId),
}

/// Errors related to descriptor watches.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("Watch table is full (capacity: {capacity})")]
    TableFull { capacity: usize },
    #[error("Watch owner is not a live actor: {0}")]
    InvalidOwner(ActorId),
    #[error("Invalid file descriptor: {0}")]
    InvalidDescriptor(Fd),
    #[error("Empty interest mask")]
    EmptyInterest,
    #[error("Descriptor is not watched: {0}")]
    NotWatched(Fd),
}

/// Errors related to supervision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    #[error("Supervisor has no children")]
    NoChildren,
    #[error("Too many children: {count} (max: {max})")]
    TooManyChildren { count: usize, max: usize },
    #[error("Not a supervisor: {0}")]
    NotASupervisor(ActorId),
    #[error("Unknown child: {0}")]
    UnknownChild(ActorId),
    #[error("Failed to spawn supervisor: {0}")]
    Spawn(#[from] SpawnError),
    #[error("Failed to start supervisor: {0}")]
    Send(#[from] SendError),
}

/// Errors related to the runtime and its event loop.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Event wait failed: {0}")]
    Io(#[from] io::Error),
}
