use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use microkernel_api::errors::SupervisorError;
use microkernel_api::message::MsgType;
use microkernel_api::supervisor::{RestartStrategy, RestartType};
use microkernel_api::system::SUP_START;

use crate::kernel::behavior::Behavior;
use crate::kernel::config::DEFAULT_MAILBOX_CAPACITY;
use crate::supervisor::actor::Supervisor;

/// Maximum number of children one supervisor manages.
pub const MAX_CHILDREN: usize = 16;

/// Extra mailbox slots a supervisor gets on top of one per child.
pub const SUPERVISOR_MAILBOX_HEADROOM: usize = 4;

/// Opaque argument handed to a child factory on every (re)start.
pub type FactoryArg = Rc<dyn Any>;

type Factory = Rc<dyn Fn(Option<&FactoryArg>) -> Box<dyn Behavior>>;

/// How to build, and rebuild, one supervised child.
///
/// Every start calls the factory again, so a restarted child never sees
/// the state of the incarnation it replaces.
#[derive(Clone)]
pub struct ChildSpec {
    name: String,
    factory: Factory,
    factory_arg: Option<FactoryArg>,
    mailbox_size: usize,
    restart_type: RestartType,
    boot_message: Option<MsgType>,
}

impl ChildSpec {
    /// A permanent child with the default mailbox size.
    pub fn new<F, B>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(Option<&FactoryArg>) -> B + 'static,
        B: Behavior,
    {
        let factory: Factory = Rc::new(move |arg: Option<&FactoryArg>| -> Box<dyn Behavior> { Box::new(factory(arg)) });
        Self {
            name: name.into(),
            factory,
            factory_arg: None,
            mailbox_size: DEFAULT_MAILBOX_CAPACITY,
            restart_type: RestartType::Permanent,
            boot_message: None,
        }
    }

    /// A child that is itself a supervisor. Each incarnation starts its own
    /// children as soon as it is spawned.
    pub fn supervisor(name: impl Into<String>, spec: SupervisorSpec) -> Result<Self, SupervisorError> {
        spec.validate()?;
        let mailbox_size = spec.mailbox_size();
        Ok(Self::new(name, move |_| Supervisor::new(spec.clone()))
            .with_mailbox_size(mailbox_size)
            .with_boot_message(SUP_START))
    }

    pub fn with_arg<A: Any>(self, arg: A) -> Self {
        self.with_shared_arg(Rc::new(arg))
    }

    pub fn with_shared_arg(mut self, arg: FactoryArg) -> Self {
        self.factory_arg = Some(arg);
        self
    }

    pub fn with_mailbox_size(mut self, mailbox_size: usize) -> Self {
        self.mailbox_size = mailbox_size;
        self
    }

    pub fn with_restart_type(mut self, restart_type: RestartType) -> Self {
        self.restart_type = restart_type;
        self
    }

    /// Message (with an empty payload) sent to every new incarnation right
    /// after it is spawned.
    pub fn with_boot_message(mut self, msg_type: MsgType) -> Self {
        self.boot_message = Some(msg_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mailbox_size(&self) -> usize {
        self.mailbox_size
    }

    pub fn restart_type(&self) -> RestartType {
        self.restart_type
    }

    pub fn boot_message(&self) -> Option<MsgType> {
        self.boot_message
    }

    pub fn factory_arg(&self) -> Option<&FactoryArg> {
        self.factory_arg.as_ref()
    }

    pub(crate) fn replace_factory_arg(&mut self, arg: Option<FactoryArg>) -> Option<FactoryArg> {
        std::mem::replace(&mut self.factory_arg, arg)
    }

    pub(crate) fn build(&self) -> Box<dyn Behavior> {
        (self.factory)(self.factory_arg.as_ref())
    }
}

impl fmt::Debug for ChildSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildSpec")
            .field("name", &self.name)
            .field("has_arg", &self.factory_arg.is_some())
            .field("mailbox_size", &self.mailbox_size)
            .field("restart_type", &self.restart_type)
            .field("boot_message", &self.boot_message)
            .finish()
    }
}

/// Restart policy and children of one supervisor.
#[derive(Clone, Debug)]
pub struct SupervisorSpec {
    pub strategy: RestartStrategy,
    /// Restarts tolerated within `window`; one more and the supervisor
    /// gives up. Zero disables restarts altogether.
    pub max_restarts: u32,
    pub window: Duration,
    /// Started in order, restarted in order.
    pub children: Vec<ChildSpec>,
}

impl SupervisorSpec {
    pub fn new(strategy: RestartStrategy, max_restarts: u32, window: Duration) -> Self {
        Self {
            strategy,
            max_restarts,
            window,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: ChildSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn validate(&self) -> Result<(), SupervisorError> {
        if self.children.is_empty() {
            return Err(SupervisorError::NoChildren);
        }
        if self.children.len() > MAX_CHILDREN {
            return Err(SupervisorError::TooManyChildren {
                count: self.children.len(),
                max: MAX_CHILDREN,
            });
        }
        Ok(())
    }

    /// Mailbox capacity requested for the supervisor itself.
    pub fn mailbox_size(&self) -> usize {
        self.children.len() + SUPERVISOR_MAILBOX_HEADROOM
    }
}
