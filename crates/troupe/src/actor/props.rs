use std::fmt;
use std::sync::Arc;

use crate::actor::context::ActorContext;
use crate::actor::middleware::{Pipeline, Receiver, ReceiverMiddleware};
use crate::actor::receiver::{Actor, ActorCell};

type Producer = Arc<dyn Fn() -> Box<dyn Receiver> + Send + Sync>;
type InitHook = Arc<dyn Fn(&mut ActorContext) + Send + Sync>;

/// # Props
///
/// Recipe for an activation: how to produce a fresh receiver, which middleware
/// to put in front of it, and which hooks to run on the new context before the
/// first message is delivered.
///
/// Props are cheap to clone. Cloning and extending a props value never affects
/// the value it came from, so a kind's registered props stay untouched when an
/// activation adds its own identity hook.
#[derive(Clone)]
pub struct Props {
    producer: Producer,
    middleware: Vec<Arc<dyn ReceiverMiddleware>>,
    on_init: Vec<InitHook>,
}

impl Props {
    /// Props producing a new `A` for every activation.
    pub fn from_producer<A, F>(producer: F) -> Self
    where
        A: Actor,
        F: Fn() -> A + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(move || Box::new(ActorCell::new(producer())) as Box<dyn Receiver>),
            middleware: Vec::new(),
            on_init: Vec::new(),
        }
    }

    /// Appends a middleware. Middleware run in the order they were added; the
    /// first one added sees every message first.
    pub fn with_receiver_middleware<M: ReceiverMiddleware>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Appends a hook run against the context at construction time.
    pub fn with_on_init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ActorContext) + Send + Sync + 'static,
    {
        self.on_init.push(Arc::new(hook));
        self
    }

    pub fn middleware_names(&self) -> Vec<&str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    pub(crate) fn run_init(&self, ctx: &mut ActorContext) {
        for hook in &self.on_init {
            hook(ctx);
        }
    }

    pub(crate) fn produce(&self) -> Pipeline {
        Pipeline::new(self.middleware.clone(), (self.producer)())
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("middleware", &self.middleware_names())
            .field("on_init", &self.on_init.len())
            .finish()
    }
}
