use std::time::Duration;

use microkernel::supervisor::{self, ChildSpec, SupervisorSpec};
use microkernel::system::TIMER;
use microkernel::{logging, Behavior, Context, Message, MsgType, RestartStrategy, Runtime, RuntimeConfig};

// Application message types
const PING: MsgType = 1;
const PONG: MsgType = 2;
const PEER: MsgType = 3;

const ROUNDS: u32 = 5;

/// Answers every PING with a PONG carrying the same counter.
#[derive(Debug, Default)]
struct Ponger;

impl Behavior for Ponger {
    fn handle(&mut self, ctx: &mut Context<'_>, msg: Message) -> bool {
        if msg.msg_type() == PING {
            println!("{} received Ping({:?})", ctx.id(), msg.payload());
            if let Err(err) = ctx.send(msg.source(), PONG, msg.payload()) {
                eprintln!("pong lost: {err}");
            }
        }
        true
    }
}

/// Sends one PING per timer tick and stops the runtime after `ROUNDS`
/// answers.
#[derive(Debug, Default)]
struct Pinger {
    peer: Option<microkernel::ActorId>,
    sent: u32,
    received: u32,
}

impl Behavior for Pinger {
    fn handle(&mut self, ctx: &mut Context<'_>, msg: Message) -> bool {
        match msg.msg_type() {
            PEER => {
                let raw = msg.payload().try_into().ok().map(u64::from_le_bytes);
                self.peer = raw.map(microkernel::ActorId::from_raw);
                if let Err(err) = ctx.set_timer(Duration::from_millis(50), true) {
                    eprintln!("no ticker: {err}");
                    return false;
                }
            }
            TIMER => {
                let Some(peer) = self.peer else { return true };
                self.sent += 1;
                if ctx.send(peer, PING, &self.sent.to_le_bytes()).is_err() {
                    println!("ponger unavailable, skipping round {}", self.sent);
                }
            }
            PONG => {
                self.received += 1;
                println!("{} received Pong({:?})", ctx.id(), msg.payload());
                if self.received >= ROUNDS {
                    ctx.request_stop();
                }
            }
            _ => {}
        }
        true
    }
}

fn main() -> anyhow::Result<()> {
    logging::init_development();

    let mut rt = Runtime::new(RuntimeConfig::new(0, 16))?;

    let spec = SupervisorSpec::new(RestartStrategy::OneForOne, 3, Duration::from_secs(5))
        .with_child(ChildSpec::new("ponger", |_| Ponger))
        .with_child(ChildSpec::new("pinger", |_| Pinger::default()));
    let sup = supervisor::start(&mut rt, spec)?;
    rt.run_until_idle();

    let (Some(ponger), Some(pinger)) = (supervisor::child(&rt, sup, 0), supervisor::child(&rt, sup, 1)) else {
        anyhow::bail!("supervisor failed to start its children");
    };
    rt.send(pinger, PEER, &ponger.as_raw().to_le_bytes())?;

    rt.run()?;
    println!("done after {:?}", rt.now());

    supervisor::stop(&mut rt, sup)?;
    rt.run_until_idle();
    Ok(())
}
