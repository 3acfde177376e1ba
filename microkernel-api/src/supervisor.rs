use std::fmt;

use crate::types::ExitReason;

/// Which siblings are restarted when one child terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RestartStrategy {
    /// Restart only the child that terminated.
    #[default]
    OneForOne,
    /// Stop every child and start them all again, in order.
    OneForAll,
    /// Stop the terminated child and every child started after it, then
    /// start that suffix again, in order.
    RestForOne,
}

impl fmt::Display for RestartStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartStrategy::OneForOne => f.write_str("one_for_one"),
            RestartStrategy::OneForAll => f.write_str("one_for_all"),
            RestartStrategy::RestForOne => f.write_str("rest_for_one"),
        }
    }
}

/// Whether a terminated child is restarted at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RestartType {
    /// Always restarted.
    #[default]
    Permanent,
    /// Restarted only after an abnormal exit.
    Transient,
    /// Never restarted.
    Temporary,
}

impl RestartType {
    pub fn should_restart(self, reason: ExitReason) -> bool {
        match self {
            RestartType::Permanent => true,
            RestartType::Transient => !reason.is_normal(),
            RestartType::Temporary => false,
        }
    }
}
