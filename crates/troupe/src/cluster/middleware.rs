//! # Activation Middleware
//!
//! Turns a plain actor into a cluster-aware grain. Only `Started` and
//! `Stopped` are intercepted; every other message passes straight through.

use async_trait::async_trait;
use tracing::debug;

use crate::actor::{ActorContext, ActorError, Envelope, Message, Next, ReceiverMiddleware, Signal};
use crate::cluster::messages::ClusterInit;
use crate::events::{ActivationTerminating, SystemEvent};

#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterMiddleware;

impl ClusterMiddleware {
    pub const NAME: &'static str = "cluster-activation";

    pub fn new() -> Self {
        Self
    }

    /// Forwards `Started`, then delivers `ClusterInit` through the same chain.
    ///
    /// If the start handler fails, the error is returned and `ClusterInit` is
    /// not delivered.
    async fn handle_started(
        &self,
        ctx: &mut ActorContext,
        envelope: Envelope,
        next: &mut Next<'_>,
    ) -> Result<(), ActorError> {
        next.run(ctx, envelope).await?;

        let identity = ctx.identity().cloned();
        let cluster = ctx.cluster().cloned();
        match (identity, cluster) {
            (Some(identity), Some(cluster)) => {
                debug!("Delivering ClusterInit for {} to {}", identity, ctx.id());
                let init = ClusterInit::new(identity, cluster);
                next.run(ctx, Envelope::new(Message::ClusterInit(init))).await
            }
            _ => {
                debug!(
                    "Actor {} has no identity or cluster bound; skipping ClusterInit",
                    ctx.id()
                );
                Ok(())
            }
        }
    }

    /// Publishes `ActivationTerminating`, evicts this activation from the
    /// identity cache, then forwards `Stopped`.
    async fn handle_stopped(
        &self,
        ctx: &mut ActorContext,
        envelope: Envelope,
        next: &mut Next<'_>,
    ) -> Result<(), ActorError> {
        match ctx.identity().cloned() {
            Some(identity) => {
                let event = ActivationTerminating {
                    pid: ctx.self_ref().clone(),
                    identity: identity.clone(),
                };
                ctx.system()
                    .event_stream()
                    .publish(SystemEvent::ActivationTerminating(event));

                if let Some(cluster) = ctx.cluster() {
                    if !cluster.pid_cache().remove_by_value(&identity, ctx.self_ref()) {
                        debug!(
                            "Cache entry for {} no longer points at {}; leaving it",
                            identity,
                            ctx.id()
                        );
                    }
                }
            }
            None => {
                debug!("Actor {} stopping without an identity", ctx.id());
            }
        }

        next.run(ctx, envelope).await
    }
}

#[async_trait]
impl ReceiverMiddleware for ClusterMiddleware {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn receive(
        &self,
        ctx: &mut ActorContext,
        envelope: Envelope,
        next: &mut Next<'_>,
    ) -> Result<(), ActorError> {
        match envelope.message.signal() {
            Signal::Started => self.handle_started(ctx, envelope, next).await,
            Signal::Stopped => self.handle_stopped(ctx, envelope, next).await,
            Signal::Other => next.run(ctx, envelope).await,
        }
    }
}
