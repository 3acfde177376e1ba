//! Single-threaded cooperative actor kernel.

pub mod actor;
pub mod behavior;
pub mod clock;
pub mod config;
pub mod context;
pub mod mailbox;
pub mod poller;
pub mod runtime;
pub mod scheduler;
pub mod timer;
pub mod watch;

// Re-export key types
pub use actor::Actor;
pub use behavior::{from_fn, Behavior, FnBehavior};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ActorConfig, RuntimeConfig};
pub use context::Context;
pub use mailbox::Mailbox;
#[cfg(unix)]
pub use poller::PollPoller;
pub use poller::{Poller, Readiness, SleepPoller};
pub use runtime::{Runtime, StopHandle};
pub use scheduler::Scheduler;
