use std::time::Duration;

use microkernel_api::address::{ActorId, NodeId};
use microkernel_api::errors::RuntimeError;

pub const DEFAULT_MAX_ACTORS: usize = 64;
pub const DEFAULT_MAX_TIMERS: usize = 32;
pub const DEFAULT_MAX_FD_WATCHES: usize = 32;
pub const DEFAULT_MAILBOX_CAPACITY: usize = 16;
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(100);

// --- Runtime Configuration ---

/// Configuration for a [`Runtime`](crate::kernel::runtime::Runtime).
///
/// Every table is sized here, once, when the runtime is created.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Node identifier embedded in every address this runtime allocates.
    pub node_id: NodeId,

    /// Capacity of the actor table.
    pub max_actors: usize,

    /// Capacity of the timer table.
    pub max_timers: usize,

    /// Capacity of the watched-descriptor table.
    pub max_fd_watches: usize,

    /// Mailbox capacity for actors spawned without an explicit one.
    pub default_mailbox_capacity: usize,

    /// Upper bound on a single blocking wait of the event loop. Stop
    /// requests are observed at least this often.
    pub max_wait: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            node_id: 0,
            max_actors: DEFAULT_MAX_ACTORS,
            max_timers: DEFAULT_MAX_TIMERS,
            max_fd_watches: DEFAULT_MAX_FD_WATCHES,
            default_mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

impl RuntimeConfig {
    pub fn new(node_id: NodeId, max_actors: usize) -> Self {
        Self {
            node_id,
            max_actors,
            ..Default::default()
        }
    }

    /// Rejects configurations that would produce unusable tables.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.max_actors == 0 {
            return Err(RuntimeError::Config("max_actors must be at least 1".to_string()));
        }
        if self.max_actors > u32::MAX as usize {
            return Err(RuntimeError::Config(format!(
                "max_actors exceeds the per-node address space: {}",
                self.max_actors
            )));
        }
        if self.max_timers == 0 {
            return Err(RuntimeError::Config("max_timers must be at least 1".to_string()));
        }
        if self.max_fd_watches == 0 {
            return Err(RuntimeError::Config("max_fd_watches must be at least 1".to_string()));
        }
        if self.max_wait.is_zero() {
            return Err(RuntimeError::Config("max_wait must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Merge runtime defaults with actor-specific configuration.
    /// Fields the actor config leaves unset are taken from the runtime.
    pub fn merge_with_actor_config(&self, actor_config: &ActorConfig) -> ActorConfig {
        ActorConfig {
            mailbox_capacity: actor_config
                .mailbox_capacity
                .or(Some(self.default_mailbox_capacity)),
            parent: actor_config.parent,
        }
    }
}

// --- Actor Configuration ---

/// Per-actor settings, overriding runtime defaults.
#[derive(Clone, Debug, Default)]
pub struct ActorConfig {
    /// Requested mailbox capacity, rounded up to a power of two.
    pub mailbox_capacity: Option<usize>,

    /// Actor that receives a `CHILD_EXIT` message when this one terminates.
    pub parent: Option<ActorId>,
}

impl ActorConfig {
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = Some(capacity);
        self
    }

    pub fn with_parent(mut self, parent: ActorId) -> Self {
        self.parent = Some(parent);
        self
    }
}
