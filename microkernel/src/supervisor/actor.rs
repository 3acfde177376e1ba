use std::time::Duration;

use microkernel_api::address::ActorId;
use microkernel_api::message::Message;
use microkernel_api::supervisor::RestartStrategy;
use microkernel_api::system::{ChildExit, CHILD_EXIT, SUP_START};
use microkernel_api::types::ExitReason;

use crate::kernel::behavior::Behavior;
use crate::kernel::config::ActorConfig;
use crate::kernel::context::Context;
use crate::kernel::runtime::Runtime;
use crate::supervisor::history::RestartHistory;
use crate::supervisor::spec::{ChildSpec, FactoryArg, SupervisorSpec};

/// State and behavior of a supervisor actor.
///
/// Children are linked to the supervisor, so the kernel reports each
/// child's termination as a `CHILD_EXIT` message. Children the supervisor
/// stops itself are unlinked first and produce no notification.
#[derive(Debug)]
pub struct Supervisor {
    strategy: RestartStrategy,
    max_restarts: u32,
    window: Duration,
    specs: Vec<ChildSpec>,
    children: Vec<ActorId>,
    history: RestartHistory,
    shutting_down: bool,
}

impl Supervisor {
    pub fn new(spec: SupervisorSpec) -> Self {
        let children = vec![ActorId::INVALID; spec.children.len()];
        Self {
            strategy: spec.strategy,
            max_restarts: spec.max_restarts,
            window: spec.window,
            specs: spec.children,
            children,
            history: RestartHistory::default(),
            shutting_down: false,
        }
    }

    pub fn strategy(&self) -> RestartStrategy {
        self.strategy
    }

    /// Live child addresses, in spec order. Empty slots hold
    /// [`ActorId::INVALID`].
    pub fn children(&self) -> &[ActorId] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<ActorId> {
        self.children.get(index).copied().filter(|id| id.is_valid())
    }

    pub fn factory_arg(&self, index: usize) -> Option<&FactoryArg> {
        self.specs.get(index)?.factory_arg()
    }

    fn spawn_child(&mut self, rt: &mut Runtime, sup: ActorId, index: usize) {
        let spec = &self.specs[index];
        let config = ActorConfig::default()
            .with_mailbox_capacity(spec.mailbox_size())
            .with_parent(sup);

        match rt.spawn_with(spec.build(), &config) {
            Ok(child) => {
                self.children[index] = child;
                if let Some(boot) = spec.boot_message() {
                    if let Err(err) = rt.send_from(sup, child, boot, &[]) {
                        tracing::warn!(supervisor = %sup, %child, error = %err, "boot message not delivered");
                    }
                }
                crate::log_lifecycle!(child, "child_started", supervisor = %sup, name = spec.name(), index);
            }
            Err(err) => {
                self.children[index] = ActorId::INVALID;
                tracing::error!(supervisor = %sup, name = spec.name(), error = %err, "failed to start child");
            }
        }
    }

    fn spawn_range(&mut self, rt: &mut Runtime, sup: ActorId, from: usize) {
        for index in from..self.specs.len() {
            self.spawn_child(rt, sup, index);
        }
    }

    fn stop_child(&mut self, rt: &mut Runtime, index: usize) {
        let child = std::mem::replace(&mut self.children[index], ActorId::INVALID);
        if child.is_valid() {
            rt.unlink(child);
            rt.stop(child);
        }
    }

    fn stop_range(&mut self, rt: &mut Runtime, from: usize) {
        for index in from..self.children.len() {
            self.stop_child(rt, index);
        }
    }

    pub(crate) fn mark_shutting_down(&mut self) {
        self.shutting_down = true;
        self.children.fill(ActorId::INVALID);
    }

    pub(crate) fn shut_down(&mut self, rt: &mut Runtime) {
        self.shutting_down = true;
        self.stop_range(rt, 0);
    }

    /// Swaps the address and factory argument recorded for `old`.
    pub(crate) fn replace_child(
        &mut self,
        old: ActorId,
        new: ActorId,
        arg: Option<FactoryArg>,
    ) -> Option<(usize, Option<FactoryArg>)> {
        let index = self.children.iter().position(|&c| c == old && c.is_valid())?;
        self.children[index] = new;
        let previous = self.specs[index].replace_factory_arg(arg);
        Some((index, previous))
    }

    fn on_child_exit(&mut self, ctx: &mut Context<'_>, exit: ChildExit) -> bool {
        if self.shutting_down {
            return true;
        }
        let Some(index) = self.children.iter().position(|&c| c == exit.child) else {
            return true;
        };
        self.children[index] = ActorId::INVALID;

        let sup = ctx.id();
        let spec = &self.specs[index];
        if !spec.restart_type().should_restart(exit.reason) {
            crate::log_lifecycle!(exit.child, "child_exited", supervisor = %sup, name = spec.name(), reason = %exit.reason);
            return true;
        }

        if !self.history.permit(ctx.now(), self.max_restarts, self.window) {
            tracing::warn!(
                supervisor = %sup,
                max_restarts = self.max_restarts,
                window = ?self.window,
                "restart limit exceeded, shutting down"
            );
            self.shut_down(ctx.runtime());
            // Exhaustion is an abnormal exit so it escalates to our own parent.
            ctx.stop(sup);
            return false;
        }

        tracing::info!(
            supervisor = %sup,
            child = %exit.child,
            name = spec.name(),
            reason = %exit.reason,
            strategy = %self.strategy,
            "restarting"
        );
        let rt = ctx.runtime();
        match self.strategy {
            RestartStrategy::OneForOne => self.spawn_child(rt, sup, index),
            RestartStrategy::OneForAll => {
                self.stop_range(rt, 0);
                self.spawn_range(rt, sup, 0);
            }
            RestartStrategy::RestForOne => {
                self.stop_range(rt, index);
                self.spawn_range(rt, sup, index);
            }
        }
        true
    }
}

impl Behavior for Supervisor {
    fn handle(&mut self, ctx: &mut Context<'_>, msg: Message) -> bool {
        match msg.msg_type() {
            SUP_START => {
                let sup = ctx.id();
                self.spawn_range(ctx.runtime(), sup, 0);
                true
            }
            CHILD_EXIT => match msg.decode::<ChildExit>() {
                Some(exit) => self.on_child_exit(ctx, exit),
                None => {
                    tracing::warn!(supervisor = %ctx.id(), len = msg.len(), "malformed child exit");
                    true
                }
            },
            _ => true,
        }
    }

    fn on_stop(&mut self, ctx: &mut Context<'_>, _reason: ExitReason) {
        self.shut_down(ctx.runtime());
    }
}
