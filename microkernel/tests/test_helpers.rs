#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use microkernel::kernel::poller::default_poller;
use microkernel::{
    logging, ActorId, Behavior, Context, ManualClock, Message, MsgType, Runtime, RuntimeConfig,
};

/// Application message types used across the tests.
pub const PING: MsgType = 1;
pub const PONG: MsgType = 2;
pub const START: MsgType = 3;
pub const QUIT: MsgType = 4;

/// One received message as seen by a [`Recorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub actor: ActorId,
    pub source: ActorId,
    pub msg_type: MsgType,
    pub payload: Vec<u8>,
}

/// Shared, ordered log of received messages.
pub type Log = Rc<RefCell<Vec<Received>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Message types in the order they were received.
pub fn types(log: &Log) -> Vec<MsgType> {
    log.borrow().iter().map(|r| r.msg_type).collect()
}

/// Receiving actors in the order they received.
pub fn actors(log: &Log) -> Vec<ActorId> {
    log.borrow().iter().map(|r| r.actor).collect()
}

/// Behavior that appends every message to a shared log and stops when it
/// receives [`QUIT`].
pub struct Recorder {
    log: Log,
}

impl Recorder {
    pub fn new(log: &Log) -> Self {
        Self { log: Rc::clone(log) }
    }
}

impl Behavior for Recorder {
    fn handle(&mut self, ctx: &mut Context<'_>, msg: Message) -> bool {
        self.log.borrow_mut().push(Received {
            actor: ctx.id(),
            source: msg.source(),
            msg_type: msg.msg_type(),
            payload: msg.payload().to_vec(),
        });
        msg.msg_type() != QUIT
    }
}

/// A runtime on node 0 with the system clock.
pub fn runtime(max_actors: usize) -> Runtime {
    logging::init_test();
    Runtime::new(RuntimeConfig::new(0, max_actors)).expect("runtime")
}

/// A runtime on node 0 whose clock only moves when the test advances it.
pub fn manual_runtime(max_actors: usize) -> (Runtime, ManualClock) {
    logging::init_test();
    let clock = ManualClock::new();
    let rt = Runtime::with_parts(
        RuntimeConfig::new(0, max_actors),
        Box::new(clock.clone()),
        default_poller(),
    )
    .expect("runtime");
    (rt, clock)
}
