use std::fmt;

use crate::address::ActorId;
use crate::system::{is_system_type, SystemPayload};

/// Numeric message type tag. Values from `0xFF00_0000` up are reserved for
/// kernel-generated messages (see [`crate::system`]).
pub type MsgType = u32;

/// An immutable message envelope.
///
/// The payload is copied into the envelope when the message is built, so the
/// sender keeps ownership of its own buffer and the receiver gets an
/// independent copy. A zero-length payload allocates nothing.
#[derive(Clone, PartialEq, Eq)]
pub struct Message {
    source: ActorId,
    dest: ActorId,
    msg_type: MsgType,
    payload: Box<[u8]>,
}

impl Message {
    pub fn new(source: ActorId, dest: ActorId, msg_type: MsgType, payload: &[u8]) -> Self {
        Self {
            source,
            dest,
            msg_type,
            payload: payload.into(),
        }
    }

    /// Builds a kernel message carrying an encoded system payload.
    pub fn system<P: SystemPayload>(source: ActorId, dest: ActorId, payload: &P) -> Self {
        Self {
            source,
            dest,
            msg_type: P::MSG_TYPE,
            payload: payload.encode().into(),
        }
    }

    pub fn source(&self) -> ActorId {
        self.source
    }

    pub fn dest(&self) -> ActorId {
        self.dest
    }

    pub fn msg_type(&self) -> MsgType {
        self.msg_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn is_system(&self) -> bool {
        is_system_type(self.msg_type)
    }

    /// Decodes the payload as `P` if the type tag matches.
    pub fn decode<P: SystemPayload>(&self) -> Option<P> {
        if self.msg_type != P::MSG_TYPE {
            return None;
        }
        P::decode(&self.payload)
    }

    pub fn into_payload(self) -> Box<[u8]> {
        self.payload
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("source", &self.source)
            .field("dest", &self.dest)
            .field("msg_type", &format_args!("{:#010x}", self.msg_type))
            .field("len", &self.payload.len())
            .finish()
    }
}
