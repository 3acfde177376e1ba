use std::time::Duration;

use microkernel_api::address::{ActorId, NodeId};
use microkernel_api::errors::{SendError, SpawnError, TimerError, WatchError};
use microkernel_api::message::MsgType;
use microkernel_api::types::{Fd, Interest, TimerId};

use crate::kernel::behavior::Behavior;
use crate::kernel::config::ActorConfig;
use crate::kernel::runtime::Runtime;

/// Handle given to a behavior for the duration of one call.
///
/// Everything an actor does to the outside world goes through here: sends
/// carry the actor's own address as source, and timers and watches are
/// owned by it.
pub struct Context<'a> {
    rt: &'a mut Runtime,
    id: ActorId,
}

impl<'a> Context<'a> {
    pub(crate) fn new(rt: &'a mut Runtime, id: ActorId) -> Self {
        Self { rt, id }
    }

    /// Address of the actor being run.
    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        self.rt.node_id()
    }

    pub fn now(&self) -> Duration {
        self.rt.now()
    }

    pub fn parent(&self) -> Option<ActorId> {
        self.rt.parent(self.id)
    }

    pub fn send(&mut self, dest: ActorId, msg_type: MsgType, payload: &[u8]) -> Result<(), SendError> {
        self.rt.send_from(self.id, dest, msg_type, payload)
    }

    pub fn spawn<B: Behavior>(&mut self, behavior: B, mailbox_capacity: usize) -> Result<ActorId, SpawnError> {
        self.rt.spawn(behavior, mailbox_capacity)
    }

    /// Spawns an actor whose termination is reported to this one.
    pub fn spawn_linked<B: Behavior>(&mut self, behavior: B, mailbox_capacity: usize) -> Result<ActorId, SpawnError> {
        let config = ActorConfig::default()
            .with_mailbox_capacity(mailbox_capacity)
            .with_parent(self.id);
        self.rt.spawn_with(Box::new(behavior), &config)
    }

    /// Stops another actor, or this one.
    pub fn stop(&mut self, id: ActorId) -> bool {
        self.rt.stop(id)
    }

    /// Registers this actor as the parent of `child`.
    pub fn link(&mut self, child: ActorId) -> bool {
        self.rt.link(child, self.id)
    }

    pub fn set_timer(&mut self, interval: Duration, periodic: bool) -> Result<TimerId, TimerError> {
        self.rt.set_timer(self.id, interval, periodic)
    }

    pub fn cancel_timer(&mut self, timer: TimerId) -> Result<(), TimerError> {
        self.rt.cancel_timer(self.id, timer)
    }

    pub fn watch_fd(&mut self, fd: Fd, interest: Interest) -> Result<(), WatchError> {
        self.rt.watch_fd(self.id, fd, interest)
    }

    pub fn unwatch_fd(&mut self, fd: Fd) -> Result<(), WatchError> {
        self.rt.unwatch_fd(self.id, fd)
    }

    /// Asks the event loop to return once this call finishes.
    pub fn request_stop(&self) {
        self.rt.request_stop();
    }

    /// The runtime itself, for APIs layered on top of it such as
    /// [`supervisor`](crate::supervisor).
    pub fn runtime(&mut self) -> &mut Runtime {
        self.rt
    }
}
