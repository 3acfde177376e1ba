use std::fmt;

use downcast_rs::{impl_downcast, Downcast};
use microkernel_api::message::Message;
use microkernel_api::types::ExitReason;

use crate::kernel::context::Context;

/// The code and state of an actor.
///
/// An actor's state is the value implementing this trait, so the runtime
/// owns it outright and drops it when the actor is reclaimed. Code that
/// needs to inspect a particular actor's state from outside downcasts it
/// through [`Runtime::state`](crate::kernel::runtime::Runtime::state).
pub trait Behavior: Downcast {
    /// Handles one message. Returning `false` stops the actor with
    /// [`ExitReason::Normal`].
    ///
    /// Handlers run to completion and must not block.
    fn handle(&mut self, ctx: &mut Context<'_>, msg: Message) -> bool;

    /// Called once while the actor is being reclaimed, after its timers and
    /// watches have been cancelled and before its parent is notified.
    fn on_stop(&mut self, _ctx: &mut Context<'_>, _reason: ExitReason) {}
}
impl_downcast!(Behavior);

/// Behavior built from a state value and a closure.
pub struct FnBehavior<S, F> {
    state: S,
    handler: F,
}

/// Wraps `state` and `handler` into a [`Behavior`].
///
/// ```ignore
/// let counter = from_fn(0u32, |count, _ctx, _msg| {
///     *count += 1;
///     *count < 3
/// });
/// rt.spawn(counter, 4)?;
/// ```
pub fn from_fn<S, F>(state: S, handler: F) -> FnBehavior<S, F>
where
    S: 'static,
    F: FnMut(&mut S, &mut Context<'_>, Message) -> bool + 'static,
{
    FnBehavior { state, handler }
}

impl<S, F> FnBehavior<S, F> {
    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

impl<S, F> Behavior for FnBehavior<S, F>
where
    S: 'static,
    F: FnMut(&mut S, &mut Context<'_>, Message) -> bool + 'static,
{
    fn handle(&mut self, ctx: &mut Context<'_>, msg: Message) -> bool {
        (self.handler)(&mut self.state, ctx, msg)
    }
}

impl<S: fmt::Debug, F> fmt::Debug for FnBehavior<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnBehavior").field("state", &self.state).finish()
    }
}
