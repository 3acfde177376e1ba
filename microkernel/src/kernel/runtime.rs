//! # Runtime
//!
//! The runtime owns every kernel table and is the only thing that mutates
//! them: the actor slot table, the ready queue, the timer table and the
//! watch table. Everything runs on the thread that owns the `Runtime`.
//!
//! ## Key Concepts
//!
//! - **Quantum**: one call to [`Runtime::step`]. Pops one ready actor,
//!   dispatches exactly one message to it, and puts it back at the tail of
//!   the ready queue if it still has mail.
//! - **Deferred reclamation**: [`Runtime::stop`] only marks an actor
//!   `Stopped`, which makes further sends fail at once. The record is freed
//!   during the cleanup pass that ends every quantum. An actor whose address
//!   still sits in the ready queue is reclaimed after it has been popped.
//! - **Event loop**: [`Runtime::run`] drains the ready queue, then blocks in
//!   the [`Poller`] until a timer deadline or descriptor readiness, and turns
//!   those into ordinary messages.
//!
//! ## Addressing
//!
//! Slots are recycled; sequence numbers are not. Lookups go through a
//! `seq -> slot` map, so an address whose actor is gone resolves to nothing
//! even when its old slot is occupied again.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use microkernel_api::address::{ActorId, NodeId};
use microkernel_api::errors::{RuntimeError, SendError, SpawnError, TimerError, WatchError};
use microkernel_api::message::{Message, MsgType};
use microkernel_api::system::{ChildExit, FdEvent, TimerFired};
use microkernel_api::types::{ActorStatus, ExitReason, Fd, Interest, TimerId};

use crate::kernel::actor::Actor;
use crate::kernel::behavior::Behavior;
use crate::kernel::clock::{Clock, SystemClock};
use crate::kernel::config::{ActorConfig, RuntimeConfig};
use crate::kernel::context::Context;
use crate::kernel::poller::{default_poller, Poller, Readiness};
use crate::kernel::scheduler::Scheduler;
use crate::kernel::timer::TimerTable;
use crate::kernel::watch::{Watch, WatchTable};

/// Cloneable, thread-safe handle that asks a running event loop to return.
///
/// The loop notices the request between quanta and at the end of every
/// wait, which is bounded by `RuntimeConfig::max_wait`.
#[derive(Clone, Debug)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The actor runtime.
pub struct Runtime {
    config: RuntimeConfig,
    slots: Vec<Option<Actor>>,
    free_slots: Vec<usize>,
    index: HashMap<u32, usize>,
    next_seq: u32,
    scheduler: Scheduler,
    stopped: VecDeque<ActorId>,
    timers: TimerTable,
    watches: WatchTable,
    clock: Box<dyn Clock>,
    poller: Box<dyn Poller>,
    current: Option<ActorId>,
    stop_requested: Arc<AtomicBool>,
    // Scratch buffers reused across polls.
    watch_snapshot: Vec<Watch>,
    ready: Vec<Readiness>,
    fired: Vec<(ActorId, TimerFired)>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("node_id", &self.config.node_id)
            .field("actors", &self.index.len())
            .field("ready", &self.scheduler.len())
            .field("timers", &self.timers.len())
            .field("watches", &self.watches.len())
            .finish()
    }
}

impl Runtime {
    /// Creates a runtime using the system clock and the platform poller.
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        Self::with_parts(config, Box::new(SystemClock::new()), default_poller())
    }

    /// Creates a runtime with an explicit clock and poller.
    pub fn with_parts(
        config: RuntimeConfig,
        clock: Box<dyn Clock>,
        poller: Box<dyn Poller>,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;

        let max_actors = config.max_actors;
        let runtime = Self {
            slots: (0..max_actors).map(|_| None).collect(),
            free_slots: (0..max_actors).rev().collect(),
            index: HashMap::with_capacity(max_actors),
            next_seq: 1,
            scheduler: Scheduler::new(max_actors),
            stopped: VecDeque::new(),
            timers: TimerTable::new(config.max_timers),
            watches: WatchTable::new(config.max_fd_watches),
            clock,
            poller,
            current: None,
            stop_requested: Arc::new(AtomicBool::new(false)),
            watch_snapshot: Vec::with_capacity(config.max_fd_watches),
            ready: Vec::with_capacity(config.max_fd_watches),
            fired: Vec::with_capacity(config.max_timers),
            config,
        };
        crate::log_system!("runtime_create", "completed", node = runtime.config.node_id, max_actors);
        Ok(runtime)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn node_id(&self) -> NodeId {
        self.config.node_id
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    // --- Actor table ---

    fn slot_of(&self, id: ActorId) -> Option<usize> {
        if !id.is_valid() || id.node() != self.config.node_id {
            return None;
        }
        self.index.get(&id.seq()).copied()
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.slots.get(self.slot_of(id)?)?.as_ref()
    }

    fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        let slot = self.slot_of(id)?;
        self.slots.get_mut(slot)?.as_mut()
    }

    /// Number of actors in the table, including stopped actors that have not
    /// been reclaimed yet.
    pub fn actor_count(&self) -> usize {
        self.index.len()
    }

    pub fn status(&self, id: ActorId) -> Option<ActorStatus> {
        self.actor(id).map(Actor::status)
    }

    /// Whether `id` names an actor that can still receive messages.
    pub fn is_alive(&self, id: ActorId) -> bool {
        self.actor(id).is_some_and(|a| !a.is_stopped())
    }

    /// The actor whose behavior is currently executing, if any.
    pub fn current_actor(&self) -> Option<ActorId> {
        self.current
    }

    pub fn ready_count(&self) -> usize {
        self.scheduler.len()
    }

    pub fn mailbox_len(&self, id: ActorId) -> Option<usize> {
        self.actor(id).map(|a| a.mailbox().len())
    }

    /// Borrows the state of `id` as `T`.
    ///
    /// Returns `None` if the actor does not exist, is not a `T`, or is the
    /// actor currently being dispatched.
    pub fn state<T: Behavior>(&self, id: ActorId) -> Option<&T> {
        self.actor(id)?.behavior.as_deref()?.downcast_ref::<T>()
    }

    pub fn state_mut<T: Behavior>(&mut self, id: ActorId) -> Option<&mut T> {
        self.actor_mut(id)?.behavior.as_deref_mut()?.downcast_mut::<T>()
    }

    /// Spawns an actor with the given mailbox capacity.
    pub fn spawn<B: Behavior>(&mut self, behavior: B, mailbox_capacity: usize) -> Result<ActorId, SpawnError> {
        self.spawn_with(
            Box::new(behavior),
            &ActorConfig::default().with_mailbox_capacity(mailbox_capacity),
        )
    }

    /// Spawns an actor. The new actor starts `Idle` and runs when its first
    /// message arrives.
    pub fn spawn_with(&mut self, behavior: Box<dyn Behavior>, config: &ActorConfig) -> Result<ActorId, SpawnError> {
        let config = self.config.merge_with_actor_config(config);

        let parent = config.parent.unwrap_or(ActorId::INVALID);
        if parent.is_valid() && !self.is_alive(parent) {
            return Err(SpawnError::ParentNotFound(parent));
        }
        if self.next_seq == 0 {
            return Err(SpawnError::AddressSpaceExhausted {
                node: self.config.node_id,
            });
        }
        let slot = self.free_slots.pop().ok_or(SpawnError::TableFull {
            capacity: self.config.max_actors,
        })?;

        let seq = self.next_seq;
        // Wraps to 0 once the node's sequence space is used up.
        self.next_seq = seq.wrapping_add(1);
        let id = ActorId::new(self.config.node_id, seq);

        let capacity = config.mailbox_capacity.unwrap_or(self.config.default_mailbox_capacity);
        let mut actor = Actor::new(id, behavior, capacity);
        actor.parent = parent;

        crate::log_lifecycle!(id, "spawned", mailbox = actor.mailbox().capacity(), parent = %parent);
        self.slots[slot] = Some(actor);
        self.index.insert(seq, slot);
        Ok(id)
    }

    /// Marks `id` stopped with [`ExitReason::Killed`].
    ///
    /// Sends to `id` fail from now on. Its timers and watches are cancelled
    /// and its record freed during the next cleanup pass. Returns `false`
    /// if the actor does not exist or was already stopped.
    pub fn stop(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.actor_mut(id) else {
            return false;
        };
        if actor.is_stopped() {
            return false;
        }
        actor.exit_reason = ExitReason::Killed;
        self.mark_stopped(id);
        true
    }

    fn mark_stopped(&mut self, id: ActorId) {
        if let Some(actor) = self.actor_mut(id) {
            actor.status = ActorStatus::Stopped;
            let reason = actor.exit_reason;
            self.stopped.push_back(id);
            tracing::debug!(actor = %id, %reason, "actor stopped");
        }
    }

    /// Makes `parent` receive a `CHILD_EXIT` message when `child` terminates.
    /// Passing [`ActorId::INVALID`] removes the link.
    pub fn link(&mut self, child: ActorId, parent: ActorId) -> bool {
        match self.actor_mut(child) {
            Some(actor) => {
                actor.parent = parent;
                true
            }
            None => false,
        }
    }

    pub fn unlink(&mut self, child: ActorId) -> bool {
        self.link(child, ActorId::INVALID)
    }

    pub fn parent(&self, child: ActorId) -> Option<ActorId> {
        self.actor(child)
            .map(Actor::parent)
            .filter(|p| p.is_valid())
    }

    // --- Messaging ---

    /// Sends a message. Called from inside a behavior the source is the
    /// running actor; otherwise the message has no source address.
    pub fn send(&mut self, dest: ActorId, msg_type: MsgType, payload: &[u8]) -> Result<(), SendError> {
        let source = self.current.unwrap_or(ActorId::INVALID);
        self.deliver(Message::new(source, dest, msg_type, payload))
    }

    pub fn send_from(
        &mut self,
        source: ActorId,
        dest: ActorId,
        msg_type: MsgType,
        payload: &[u8],
    ) -> Result<(), SendError> {
        self.deliver(Message::new(source, dest, msg_type, payload))
    }

    /// Delivers a prebuilt message to `msg.dest()`.
    ///
    /// On failure the message is dropped.
    pub fn deliver(&mut self, msg: Message) -> Result<(), SendError> {
        let dest = msg.dest();
        if !dest.is_valid() {
            return Err(SendError::InvalidAddress);
        }
        if dest.node() != self.config.node_id {
            return Err(SendError::RemoteNode { node: dest.node() });
        }
        let slot = self.slot_of(dest).ok_or(SendError::NoSuchActor(dest))?;
        let Some(actor) = self.slots[slot].as_mut() else {
            return Err(SendError::NoSuchActor(dest));
        };
        if actor.is_stopped() {
            return Err(SendError::ActorStopped(dest));
        }
        actor.mailbox.enqueue(msg).map_err(|full| SendError::MailboxFull {
            actor: dest,
            capacity: full.capacity,
        })?;
        if actor.status == ActorStatus::Idle {
            self.scheduler.enqueue(actor);
        }
        Ok(())
    }

    // --- Scheduling ---

    /// Runs one quantum, then the cleanup pass.
    ///
    /// Returns `false` once there is nothing left to run. With an empty
    /// ready queue only the cleanup pass runs, and the result reports
    /// whether it produced work (exit notifications to parents). Calling
    /// `step` from inside a behavior does nothing and returns `false`.
    pub fn step(&mut self) -> bool {
        if let Some(current) = self.current {
            tracing::warn!(actor = %current, "step called from inside a behavior");
            return false;
        }
        let Some(id) = self.scheduler.dequeue() else {
            self.reclaim_stopped();
            return !self.scheduler.is_empty();
        };
        self.dispatch(id);
        self.reclaim_stopped();
        true
    }

    fn dispatch(&mut self, id: ActorId) {
        let Some(slot) = self.slot_of(id) else {
            return;
        };
        let Some(actor) = self.slots[slot].as_mut() else {
            return;
        };
        actor.queued = false;
        if actor.is_stopped() {
            return;
        }
        if actor.behavior.is_none() {
            return;
        }
        let Some(msg) = actor.mailbox.dequeue() else {
            actor.status = ActorStatus::Idle;
            return;
        };
        let Some(mut behavior) = actor.behavior.take() else {
            return;
        };
        actor.status = ActorStatus::Running;

        crate::log_scheduler!("runtime", "dispatch", actor = %id, msg_type = msg.msg_type());
        self.current = Some(id);
        let keep_running = {
            let _span = crate::actor_span!(id).entered();
            let mut ctx = Context::new(self, id);
            behavior.handle(&mut ctx, msg)
        };
        self.current = None;

        let Some(actor) = self.slots[slot].as_mut() else {
            return;
        };
        actor.behavior = Some(behavior);

        if !keep_running && !actor.is_stopped() {
            actor.exit_reason = ExitReason::Normal;
            self.mark_stopped(id);
            return;
        }
        if actor.status == ActorStatus::Running {
            actor.status = ActorStatus::Idle;
            if !actor.mailbox.is_empty() {
                self.scheduler.enqueue(actor);
            }
        }
    }

    /// Steps until nothing is left to run, without waiting for timers or
    /// descriptors. Returns the number of productive steps.
    pub fn run_until_idle(&mut self) -> usize {
        let mut quanta = 0;
        while self.step() {
            quanta += 1;
        }
        quanta
    }

    // --- Reclamation ---

    fn reclaim_stopped(&mut self) {
        if self.stopped.is_empty() {
            return;
        }
        let mut deferred = Vec::new();
        // Reclaiming a supervisor stops its children, which appends to the
        // list; those are handled in the same pass.
        while let Some(id) = self.stopped.pop_front() {
            if !self.reclaim(id) {
                deferred.push(id);
            }
        }
        self.stopped.extend(deferred);
    }

    /// Returns `false` if the actor cannot be reclaimed yet.
    fn reclaim(&mut self, id: ActorId) -> bool {
        let Some(slot) = self.slot_of(id) else {
            return true;
        };
        match self.slots[slot].as_ref() {
            None => return true,
            Some(actor) if actor.queued || actor.behavior.is_none() => return false,
            Some(_) => {}
        }
        let Some(mut actor) = self.slots[slot].take() else {
            return true;
        };
        self.index.remove(&id.seq());
        self.free_slots.push(slot);

        let timers = self.timers.remove_owner(id);
        let watches = self.watches.remove_owner(id);
        let reason = actor.exit_reason;

        if let Some(mut behavior) = actor.behavior.take() {
            let previous = self.current.replace(id);
            {
                let mut ctx = Context::new(self, id);
                behavior.on_stop(&mut ctx, reason);
            }
            self.current = previous;
        }

        if actor.parent.is_valid() {
            let exit = ChildExit { child: id, reason };
            if let Err(err) = self.deliver(Message::system(ActorId::INVALID, actor.parent, &exit)) {
                tracing::warn!(actor = %id, parent = %actor.parent, error = %err, "child exit notification lost");
            }
        }

        crate::log_lifecycle!(id, "reclaimed", %reason, timers, watches, pending = actor.mailbox().len());
        true
    }

    // --- Timers and descriptor watches ---

    /// Arms a timer owned by `owner`. The owner receives a
    /// [`TimerFired`] message after `interval`, and every `interval` after
    /// that if `periodic`.
    pub fn set_timer(&mut self, owner: ActorId, interval: Duration, periodic: bool) -> Result<TimerId, TimerError> {
        if !self.is_alive(owner) {
            return Err(TimerError::InvalidOwner(owner));
        }
        let now = self.clock.now();
        let id = self.timers.arm(owner, interval, periodic, now)?;
        tracing::trace!(actor = %owner, timer = %id, ?interval, periodic, "timer armed");
        Ok(id)
    }

    pub fn cancel_timer(&mut self, owner: ActorId, id: TimerId) -> Result<(), TimerError> {
        self.timers.cancel(owner, id)
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Delivers an [`FdEvent`] to `owner` whenever `fd` is ready for any of
    /// `interest`. Watching an already-watched descriptor replaces the mask.
    pub fn watch_fd(&mut self, owner: ActorId, fd: Fd, interest: Interest) -> Result<(), WatchError> {
        if !self.is_alive(owner) {
            return Err(WatchError::InvalidOwner(owner));
        }
        self.watches.watch(owner, fd, interest)
    }

    pub fn unwatch_fd(&mut self, owner: ActorId, fd: Fd) -> Result<(), WatchError> {
        self.watches.unwatch(owner, fd)
    }

    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }

    fn has_event_sources(&self) -> bool {
        !self.timers.is_empty() || !self.watches.is_empty()
    }

    /// Waits up to `timeout` for descriptor readiness or the next timer
    /// deadline, whichever comes first, and delivers the resulting messages.
    ///
    /// Returns the number of events generated. Events whose owner's mailbox
    /// is full are dropped and still counted.
    pub fn poll_events(&mut self, timeout: Duration) -> Result<usize, RuntimeError> {
        let mut wait = timeout;
        if let Some(deadline) = self.timers.next_deadline() {
            wait = wait.min(deadline.saturating_sub(self.clock.now()));
        }

        let mut snapshot = std::mem::take(&mut self.watch_snapshot);
        let mut ready = std::mem::take(&mut self.ready);
        snapshot.clear();
        ready.clear();
        snapshot.extend(self.watches.iter().copied());

        let waited = if snapshot.is_empty() && wait.is_zero() {
            Ok(())
        } else {
            self.poller.wait(&snapshot, wait, &mut ready)
        };
        if let Err(err) = waited {
            crate::log_error!(err, operation = "poll");
            self.watch_snapshot = snapshot;
            self.ready = ready;
            return Err(RuntimeError::Io(err));
        }

        let mut generated = 0;

        let mut fired = std::mem::take(&mut self.fired);
        fired.clear();
        self.timers.expire(self.clock.now(), &mut fired);
        for (owner, payload) in fired.drain(..) {
            generated += 1;
            self.deliver_event(Message::system(ActorId::INVALID, owner, &payload));
        }
        self.fired = fired;

        for r in ready.drain(..) {
            let Some(watch) = snapshot.get(r.index).copied() else {
                continue;
            };
            // Skip owners that unwatched while earlier events were delivered.
            if self.watches.get(watch.owner, watch.fd).is_none() {
                continue;
            }
            generated += 1;
            let event = FdEvent {
                fd: watch.fd,
                events: r.events,
            };
            self.deliver_event(Message::system(ActorId::INVALID, watch.owner, &event));
        }

        self.watch_snapshot = snapshot;
        self.ready = ready;
        Ok(generated)
    }

    fn deliver_event(&mut self, msg: Message) {
        let dest = msg.dest();
        let msg_type = msg.msg_type();
        if let Err(err) = self.deliver(msg) {
            tracing::warn!(actor = %dest, msg_type, error = %err, "event dropped");
        }
    }

    // --- Event loop ---

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.stop_requested))
    }

    /// Asks [`run`](Self::run) to return after the current quantum.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Runs the event loop.
    ///
    /// Returns when a stop is requested, when there is no ready work and
    /// nothing to wait for, or when every actor is gone. A stop requested
    /// before the call is discarded.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        self.stop_requested.store(false, Ordering::SeqCst);
        crate::log_system!("run", "started", actors = self.actor_count());

        loop {
            while !self.is_stop_requested() && self.step() {}
            if self.is_stop_requested() {
                break;
            }
            if !self.has_event_sources() {
                break;
            }
            let generated = self.poll_events(Duration::ZERO)?;
            if generated == 0 && self.scheduler.is_empty() {
                if self.actor_count() == 0 {
                    break;
                }
                self.poll_events(self.config.max_wait)?;
            }
        }

        crate::log_system!("run", "finished", actors = self.actor_count());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::behavior::from_fn;

    fn idle() -> impl Behavior {
        from_fn((), |_, _, _| true)
    }

    #[test]
    fn test_sequence_space_exhaustion() {
        let mut rt = Runtime::new(RuntimeConfig::new(2, 4)).unwrap();
        rt.next_seq = u32::MAX;

        let last = rt.spawn(idle(), 2).unwrap();
        assert_eq!(last, ActorId::new(2, u32::MAX));
        assert_eq!(
            rt.spawn(idle(), 2),
            Err(SpawnError::AddressSpaceExhausted { node: 2 })
        );

        // Freeing a slot does not bring sequence numbers back.
        assert!(rt.stop(last));
        rt.run_until_idle();
        assert_eq!(rt.actor_count(), 0);
        assert_eq!(
            rt.spawn(idle(), 2),
            Err(SpawnError::AddressSpaceExhausted { node: 2 })
        );
    }

    #[test]
    fn test_send_from_behavior_carries_source() {
        let mut rt = Runtime::new(RuntimeConfig::new(0, 4)).unwrap();
        let sink = rt.spawn(idle(), 4).unwrap();
        let sender = rt
            .spawn(
                from_fn(sink, |sink, ctx, _| ctx.runtime().send(*sink, 9, &[]).is_ok()),
                4,
            )
            .unwrap();

        rt.send(sender, 1, &[]).unwrap();
        assert!(rt.step());

        let sink_actor = rt.actor_mut(sink).unwrap();
        let msg = sink_actor.mailbox.dequeue().unwrap();
        assert_eq!(msg.source(), sender);
        assert_eq!(msg.msg_type(), 9);
    }
}
