use std::fmt;

/// Identifier of a node in the (future) distributed deployment.
pub type NodeId = u32;

/// Address of an actor.
///
/// The upper 32 bits carry the node identifier and the lower 32 bits a
/// per-node sequence number. Sequence 0 never names a live actor, so the
/// all-zero value doubles as the "no address" sentinel used for the source
/// of system messages.
///
/// Sequence numbers are handed out monotonically by the runtime and are not
/// recycled, so a stale `ActorId` can never alias a newer actor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ActorId(u64);

impl ActorId {
    /// The invalid address.
    pub const INVALID: ActorId = ActorId(0);

    pub const fn new(node: NodeId, seq: u32) -> Self {
        ActorId(((node as u64) << 32) | seq as u64)
    }

    pub const fn from_raw(raw: u64) -> Self {
        ActorId(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }

    pub const fn node(self) -> NodeId {
        (self.0 >> 32) as NodeId
    }

    pub const fn seq(self) -> u32 {
        self.0 as u32
    }

    /// An address is valid when its sequence part is non-zero.
    pub const fn is_valid(self) -> bool {
        self.seq() != 0
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({}:{})", self.node(), self.seq())
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "<{}.{}>", self.node(), self.seq())
        } else {
            f.write_str("<invalid>")
        }
    }
}

impl From<ActorId> for u64 {
    fn from(id: ActorId) -> u64 {
        id.0
    }
}
