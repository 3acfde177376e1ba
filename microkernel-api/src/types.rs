use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Raw OS file descriptor.
pub type Fd = i32;

/// Lifecycle state of an actor.
///
/// `Idle -> Ready` when a message arrives, `Ready -> Running` when the
/// scheduler picks the actor, `Running -> Idle | Ready` after one message.
/// `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorStatus {
    Idle,
    Ready,
    Running,
    Stopped,
}

/// Why an actor terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExitReason {
    /// The behavior asked to stop.
    #[default]
    Normal,
    /// The actor was stopped from outside.
    Killed,
}

impl ExitReason {
    pub const fn as_u8(self) -> u8 {
        match self {
            ExitReason::Normal => 0,
            ExitReason::Killed => 1,
        }
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ExitReason::Normal),
            1 => Some(ExitReason::Killed),
            _ => None,
        }
    }

    pub const fn is_normal(self) -> bool {
        matches!(self, ExitReason::Normal)
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Normal => f.write_str("normal"),
            ExitReason::Killed => f.write_str("killed"),
        }
    }
}

/// Handle of an armed timer. Ids are allocated monotonically from 1; 0 is
/// never handed out.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u32);

impl TimerId {
    pub const INVALID: TimerId = TimerId(0);

    pub const fn from_raw(raw: u32) -> Self {
        TimerId(raw)
    }

    pub const fn as_raw(self) -> u32 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Readiness mask for watched descriptors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interest(u32);

impl Interest {
    pub const NONE: Interest = Interest(0);
    pub const READABLE: Interest = Interest(0x1);
    pub const WRITABLE: Interest = Interest(0x2);
    /// Reported only, never requested.
    pub const ERROR: Interest = Interest(0x4);
    /// Reported only, never requested.
    pub const HANGUP: Interest = Interest(0x8);

    pub const fn from_bits(bits: u32) -> Self {
        Interest(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Interest) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn intersects(self, other: Interest) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_readable(self) -> bool {
        self.intersects(Interest::READABLE)
    }

    pub const fn is_writable(self) -> bool {
        self.intersects(Interest::WRITABLE)
    }
}

impl BitOr for Interest {
    type Output = Interest;

    fn bitor(self, rhs: Interest) -> Interest {
        Interest(self.0 | rhs.0)
    }
}

impl BitOrAssign for Interest {
    fn bitor_assign(&mut self, rhs: Interest) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.intersects(Interest::READABLE) {
            names.push("READABLE");
        }
        if self.intersects(Interest::WRITABLE) {
            names.push("WRITABLE");
        }
        if self.intersects(Interest::ERROR) {
            names.push("ERROR");
        }
        if self.intersects(Interest::HANGUP) {
            names.push("HANGUP");
        }
        if names.is_empty() {
            f.write_str("Interest(NONE)")
        } else {
            write!(f, "Interest({})", names.join(" | "))
        }
    }
}
