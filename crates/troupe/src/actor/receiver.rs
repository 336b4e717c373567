use async_trait::async_trait;
use std::any::Any;

use crate::actor::context::ActorContext;
use crate::actor::middleware::Receiver;
use crate::actor::types::{ActorError, Envelope, Message};

/// # Actor
///
/// User-facing behavior of an activation.
///
/// ## Purpose
///
/// An `Actor` owns its state exclusively and is handed one message at a time.
/// Lifecycle signals (`Started`, `Stopped`, `ClusterInit`) arrive through the
/// same method as business messages, so an actor that cares about them simply
/// matches on them.
///
/// Continuations produced by [`ActorContext::reenter_after`] never reach
/// `receive`: they run directly against [`continuation_target`](Actor::continuation_target).
#[async_trait]
pub trait Actor: Send + 'static {
    async fn receive(&mut self, ctx: &mut ActorContext, message: Message) -> Result<(), ActorError>;

    /// The value continuations are resumed against. Wrappers that delegate to
    /// an inner value return that value here.
    fn continuation_target(&mut self) -> &mut dyn Any
    where
        Self: Sized,
    {
        self
    }
}

/// Adapts an [`Actor`] into the terminal receiver of a pipeline.
pub struct ActorCell<A: Actor> {
    actor: A,
}

impl<A: Actor> ActorCell<A> {
    pub fn new(actor: A) -> Self {
        Self { actor }
    }
}

#[async_trait]
impl<A: Actor> Receiver for ActorCell<A> {
    async fn receive(&mut self, ctx: &mut ActorContext, envelope: Envelope) -> Result<(), ActorError> {
        match envelope.message {
            Message::Continuation(continuation) => {
                continuation.resume(self.actor.continuation_target(), ctx);
                Ok(())
            }
            message => self.actor.receive(ctx, message).await,
        }
    }
}
