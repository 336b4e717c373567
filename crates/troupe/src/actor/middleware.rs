//! # Receiver Pipeline
//!
//! Every activation processes its messages through a pipeline: an ordered list
//! of middleware followed by a terminal receiver. Each middleware is handed the
//! rest of the pipeline as a [`Next`] and decides whether, when and how often to
//! call it. A middleware that calls `next` twice delivers two messages inside
//! the same turn; nothing else can interleave because the activation's mailbox
//! is not polled until the pipeline returns.

use async_trait::async_trait;
use std::sync::Arc;

use crate::actor::context::ActorContext;
use crate::actor::types::{ActorError, Envelope};

/// The end of a pipeline: the code that actually handles a message.
#[async_trait]
pub trait Receiver: Send {
    async fn receive(&mut self, ctx: &mut ActorContext, envelope: Envelope)
        -> Result<(), ActorError>;
}

/// An interceptor placed in front of a receiver.
#[async_trait]
pub trait ReceiverMiddleware: Send + Sync + 'static {
    /// Short name, used in logs and for introspection of props.
    fn name(&self) -> &str;

    async fn receive(
        &self,
        ctx: &mut ActorContext,
        envelope: Envelope,
        next: &mut Next<'_>,
    ) -> Result<(), ActorError>;
}

/// The remainder of a pipeline, as seen from one middleware.
pub struct Next<'a> {
    chain: &'a [Arc<dyn ReceiverMiddleware>],
    terminal: &'a mut Box<dyn Receiver>,
}

impl<'a> Next<'a> {
    /// Passes an envelope to the next middleware, or to the receiver once the
    /// chain is exhausted. May be called any number of times.
    pub async fn run(&mut self, ctx: &mut ActorContext, envelope: Envelope) -> Result<(), ActorError> {
        match self.chain.split_first() {
            Some((head, rest)) => {
                let mut next = Next {
                    chain: rest,
                    terminal: &mut *self.terminal,
                };
                head.receive(ctx, envelope, &mut next).await
            }
            None => self.terminal.receive(ctx, envelope).await,
        }
    }
}

/// A built pipeline owned by one activation.
pub struct Pipeline {
    middleware: Vec<Arc<dyn ReceiverMiddleware>>,
    receiver: Box<dyn Receiver>,
}

impl Pipeline {
    pub fn new(middleware: Vec<Arc<dyn ReceiverMiddleware>>, receiver: Box<dyn Receiver>) -> Self {
        Self {
            middleware,
            receiver,
        }
    }

    pub async fn invoke(&mut self, ctx: &mut ActorContext, envelope: Envelope) -> Result<(), ActorError> {
        let mut next = Next {
            chain: &self.middleware,
            terminal: &mut self.receiver,
        };
        next.run(ctx, envelope).await
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}
