use std::fmt;

use microkernel_api::address::{ActorId, NodeId};
use microkernel_api::types::{ActorStatus, ExitReason};

use crate::kernel::behavior::Behavior;
use crate::kernel::mailbox::Mailbox;

/// The runtime's record of one actor.
pub struct Actor {
    id: ActorId,
    pub(crate) status: ActorStatus,
    /// `None` only while the behavior is being dispatched.
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    pub(crate) mailbox: Mailbox,
    pub(crate) parent: ActorId,
    pub(crate) exit_reason: ExitReason,
    /// Not consulted; the ready queue is strict FIFO.
    pub(crate) priority: u8,
    /// Set while the actor's id sits in the ready queue.
    pub(crate) queued: bool,
}

impl Actor {
    pub(crate) fn new(id: ActorId, behavior: Box<dyn Behavior>, mailbox_capacity: usize) -> Self {
        Self {
            id,
            status: ActorStatus::Idle,
            behavior: Some(behavior),
            mailbox: Mailbox::new(mailbox_capacity),
            parent: ActorId::INVALID,
            exit_reason: ExitReason::Normal,
            priority: 0,
            queued: false,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        self.id.node()
    }

    pub fn status(&self) -> ActorStatus {
        self.status
    }

    pub fn parent(&self) -> ActorId {
        self.parent
    }

    pub fn exit_reason(&self) -> ExitReason {
        self.exit_reason
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub fn is_stopped(&self) -> bool {
        self.status == ActorStatus::Stopped
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("parent", &self.parent)
            .field("mailbox", &self.mailbox)
            .field("queued", &self.queued)
            .finish()
    }
}
