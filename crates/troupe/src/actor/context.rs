//! # Actor Context
//!
//! The per-activation view of the world handed to every middleware and
//! receiver: who the activation is, which system and cluster it belongs to,
//! and the tools it needs to stop itself or resume work later.

use std::any::Any;
use std::future::Future;
use tracing::{debug, warn};

use crate::actor::handle::ActorRef;
use crate::actor::system::ActorSystem;
use crate::actor::types::{Continuation, Envelope, Message};
use crate::cluster::Cluster;
use crate::id::ProcessId;
use crate::identity::ClusterIdentity;

pub struct ActorContext {
    self_ref: ActorRef,
    system: ActorSystem,
    identity: Option<ClusterIdentity>,
    cluster: Option<Cluster>,
    stopping: bool,
}

impl ActorContext {
    pub(crate) fn new(self_ref: ActorRef, system: ActorSystem) -> Self {
        Self {
            self_ref,
            system,
            identity: None,
            cluster: None,
            stopping: false,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.self_ref.id()
    }

    pub fn self_ref(&self) -> &ActorRef {
        &self.self_ref
    }

    pub fn system(&self) -> &ActorSystem {
        &self.system
    }

    /// The cluster identity bound to this activation, if it is a grain.
    pub fn identity(&self) -> Option<&ClusterIdentity> {
        self.identity.as_ref()
    }

    /// Binds the activation's identity. An identity is immutable once bound:
    /// later calls are ignored and return `false`.
    pub fn set_identity(&mut self, identity: ClusterIdentity) -> bool {
        if let Some(existing) = &self.identity {
            warn!(
                "Actor {} already bound to {}, ignoring {}",
                self.id(),
                existing,
                identity
            );
            return false;
        }
        debug!("Actor {} bound to identity {}", self.id(), identity);
        self.identity = Some(identity);
        true
    }

    /// The cluster this activation was created by, if any.
    pub fn cluster(&self) -> Option<&Cluster> {
        self.cluster.as_ref()
    }

    /// Binds the owning cluster. Like the identity, it can be set only once.
    pub fn set_cluster(&mut self, cluster: Cluster) -> bool {
        if self.cluster.is_some() {
            warn!("Actor {} already bound to a cluster", self.id());
            return false;
        }
        self.cluster = Some(cluster);
        true
    }

    /// Asks the activation to stop once the current turn completes.
    pub fn stop(&mut self) {
        self.stopping = true;
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping
    }

    /// Awaits `future` outside of the current turn, then runs `continuation`
    /// on a later turn of this activation with the future's output.
    ///
    /// The current turn is not blocked: other messages are processed while the
    /// future is pending. State observed before this call may have changed by
    /// the time the continuation runs. If the activation stops first, the
    /// continuation is dropped.
    pub fn reenter_after<A, T, Fut, F>(&self, future: Fut, continuation: F)
    where
        A: Any,
        T: Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        F: FnOnce(&mut A, T, &mut ActorContext) + Send + 'static,
    {
        let target = self.self_ref.clone();
        tokio::spawn(async move {
            let value = future.await;
            let continuation =
                Continuation::new::<A, _>(move |actor, ctx| continuation(actor, value, ctx));
            if target
                .send(Envelope::new(Message::Continuation(continuation)))
                .is_err()
            {
                debug!(
                    "Actor {} stopped before its continuation could run",
                    target.id()
                );
            }
        });
    }
}
