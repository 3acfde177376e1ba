//! # Supervision
//!
//! Erlang-style supervision trees built entirely on the kernel's public
//! primitives: a supervisor is an ordinary actor whose children are linked
//! to it, and it learns about their termination through `CHILD_EXIT`
//! messages.
//!
//! ## Key Concepts
//!
//! - **Child specification**: a factory that builds fresh behavior state,
//!   an optional factory argument, a mailbox size and a [`RestartType`].
//! - **Restart strategy**: which siblings are restarted along with the
//!   child that terminated ([`RestartStrategy`]).
//! - **Restart intensity**: at most `max_restarts` restarts within
//!   `window`. One more and the supervisor stops every child and terminates
//!   itself abnormally, which its own parent sees as a child exit.
//!
//! ## Usage
//!
//! ```ignore
//! let spec = SupervisorSpec::new(RestartStrategy::OneForOne, 3, Duration::from_secs(5))
//!     .with_child(ChildSpec::new("worker", |_| Worker::default()));
//! let sup = supervisor::start(&mut rt, spec)?;
//! rt.run()?;
//! ```
//!
//! [`RestartType`]: microkernel_api::RestartType
//! [`RestartStrategy`]: microkernel_api::RestartStrategy

pub mod actor;
pub mod history;
pub mod spec;

pub use actor::Supervisor;
pub use history::{RestartHistory, MAX_RESTART_HISTORY};
pub use spec::{ChildSpec, FactoryArg, SupervisorSpec, MAX_CHILDREN};

use microkernel_api::address::ActorId;
use microkernel_api::errors::SupervisorError;
use microkernel_api::system::SUP_START;

use crate::kernel::runtime::Runtime;

/// Spawns a supervisor and tells it to start its children.
///
/// The children are spawned when the supervisor handles its first message,
/// i.e. on the next quantum that reaches it.
pub fn start(rt: &mut Runtime, spec: SupervisorSpec) -> Result<ActorId, SupervisorError> {
    spec.validate()?;
    let mailbox_size = spec.mailbox_size();
    let children = spec.children.len();
    let strategy = spec.strategy;

    let sup = rt.spawn(Supervisor::new(spec), mailbox_size)?;
    if let Err(err) = rt.send(sup, SUP_START, &[]) {
        rt.stop(sup);
        return Err(err.into());
    }
    crate::log_lifecycle!(sup, "supervisor_started", %strategy, children);
    Ok(sup)
}

/// Address of the child at `index`, if that child is currently running.
pub fn child(rt: &Runtime, sup: ActorId, index: usize) -> Option<ActorId> {
    rt.state::<Supervisor>(sup)?.child(index)
}

/// Factory argument currently recorded for the child at `index`.
pub fn factory_arg(rt: &Runtime, sup: ActorId, index: usize) -> Option<FactoryArg> {
    rt.state::<Supervisor>(sup)?.factory_arg(index).cloned()
}

/// Replaces the child `old` with the already running `new`, and its factory
/// argument with `arg`.
///
/// `new` is linked to the supervisor so later restarts manage it; future
/// restarts of that slot build from `arg`. `old` is left running and is no
/// longer supervised. Returns the child's index and the previous argument.
pub fn replace_child(
    rt: &mut Runtime,
    sup: ActorId,
    old: ActorId,
    new: ActorId,
    arg: Option<FactoryArg>,
) -> Result<(usize, Option<FactoryArg>), SupervisorError> {
    let state = rt
        .state_mut::<Supervisor>(sup)
        .ok_or(SupervisorError::NotASupervisor(sup))?;
    let replaced = state
        .replace_child(old, new, arg)
        .ok_or(SupervisorError::UnknownChild(old))?;
    rt.unlink(old);
    rt.link(new, sup);
    Ok(replaced)
}

/// Stops a supervisor and all of its children without restarting anything.
pub fn stop(rt: &mut Runtime, sup: ActorId) -> Result<(), SupervisorError> {
    let children = {
        let state = rt
            .state_mut::<Supervisor>(sup)
            .ok_or(SupervisorError::NotASupervisor(sup))?;
        let children = state.children().to_vec();
        state.mark_shutting_down();
        children
    };
    for child in children.into_iter().filter(|c| c.is_valid()) {
        rt.unlink(child);
        rt.stop(child);
    }
    rt.stop(sup);
    Ok(())
}
