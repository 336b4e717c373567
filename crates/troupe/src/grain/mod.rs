//! # Grain Calls
//!
//! The runtime half of generated grain code. Generated clients encode a
//! request, address it to a cluster identity and either await the reply
//! (blocking) or hand it to a continuation on the caller's own mailbox
//! (reentrant).
//!
//! A blocking call holds the caller's turn until the reply or the timeout. Two
//! grains that call each other this way both wait out the full timeout and
//! both fail with `RequestTimeout`. A reentrant call releases the turn at
//! once, so the same cycle completes, at the cost of the caller's state
//! possibly changing between the call and its continuation.

pub mod codec;
pub mod request;

pub use request::{GrainRequest, ReplyTo, Responder};

use std::any::Any;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::actor::ActorContext;
use crate::cluster::Cluster;
use crate::errors::GrainError;
use crate::identity::ClusterIdentity;

/// Per-call settings for generated clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Overrides the cluster's request timeout when set.
    pub timeout: Option<Duration>,
}

impl CallOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    fn resolve_timeout(&self, cluster: &Cluster) -> Duration {
        self.timeout.unwrap_or_else(|| cluster.request_timeout())
    }
}

/// Blocking call: returns once the grain answered or the timeout elapsed.
pub async fn call<Req, Resp>(
    cluster: &Cluster,
    identity: &ClusterIdentity,
    method_index: u32,
    request: &Req,
    options: &CallOptions,
) -> Result<Resp, GrainError>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let payload = codec::encode(request)?;
    let response = cluster
        .request(identity, method_index, payload, options.resolve_timeout(cluster))
        .await?;
    codec::decode(&response)
}

/// Reentrant call: returns immediately. `continuation` later runs on one of
/// the calling actor's turns with the outcome.
///
/// `A` is the type the caller's continuations run against (see
/// [`Actor::continuation_target`](crate::actor::Actor::continuation_target)).
/// Only encoding failures are reported synchronously.
pub fn call_reentrant<A, Req, Resp, F>(
    ctx: &ActorContext,
    cluster: &Cluster,
    identity: &ClusterIdentity,
    method_index: u32,
    request: &Req,
    options: &CallOptions,
    continuation: F,
) -> Result<(), GrainError>
where
    A: Any,
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned + Send + 'static,
    F: FnOnce(&mut A, Result<Resp, GrainError>, &mut ActorContext) + Send + 'static,
{
    let payload = codec::encode(request)?;
    let timeout = options.resolve_timeout(cluster);
    let cluster = cluster.clone();
    let identity = identity.clone();

    ctx.reenter_after(
        async move {
            cluster
                .request(&identity, method_index, payload, timeout)
                .await
                .and_then(|response| codec::decode::<Resp>(&response))
        },
        continuation,
    );
    Ok(())
}
