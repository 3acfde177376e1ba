//! # Microkernel
//!
//! A single-address-space actor microkernel: isolated actors that share
//! nothing and talk only through asynchronous messages, a cooperative FIFO
//! scheduler, an event loop that turns timers and descriptor readiness into
//! messages, and Erlang-style supervision trees.
//!
//! ## Key Concepts
//!
//! - **Actor**: an address, a bounded mailbox and a [`Behavior`] that owns
//!   the actor's state.
//! - **Quantum**: one message dispatched to one actor. Behaviors run to
//!   completion and never block; only the event loop waits.
//! - **Backpressure**: mailboxes never grow. A send to a full mailbox fails
//!   immediately and the sender decides what to do.
//! - **Supervision**: a supervisor restarts terminated children with fresh
//!   state according to a [`RestartStrategy`], and gives up when restarts
//!   become too frequent.
//!
//! Everything runs on one thread. The only cross-thread entry point is
//! [`StopHandle`].
//!
//! ## Example
//!
//! ```ignore
//! use microkernel::{from_fn, Runtime, RuntimeConfig};
//!
//! let mut rt = Runtime::new(RuntimeConfig::new(0, 16))?;
//! let echo = rt.spawn(from_fn((), |_, ctx, msg| {
//!     let _ = ctx.send(msg.source(), msg.msg_type(), msg.payload());
//!     true
//! }), 8)?;
//! rt.send(echo, 1, b"hello")?;
//! rt.run()?;
//! ```

pub mod kernel;
pub mod logging;
pub mod supervisor;

// Re-export commonly used types
pub use kernel::{
    from_fn, Actor, ActorConfig, Behavior, Clock, Context, FnBehavior, Mailbox, ManualClock, Poller, Readiness,
    Runtime, RuntimeConfig, Scheduler, SleepPoller, StopHandle, SystemClock,
};
#[cfg(unix)]
pub use kernel::PollPoller;
pub use microkernel_api::*;
pub use supervisor::{ChildSpec, FactoryArg, Supervisor, SupervisorSpec};
