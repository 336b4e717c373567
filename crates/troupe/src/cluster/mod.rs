//! # Cluster
//!
//! The grain side of the system: kinds, the identity cache and the activation
//! middleware, tied together by [`Cluster`], which activates grains on first
//! use and routes identity-addressed requests to them.

pub mod config;
pub mod kind;
pub mod messages;
pub mod middleware;
pub mod pid_cache;
pub mod strategy;
pub mod throttle;

pub use config::{ClusterConfig, ClusterContextConfig, MemberStrategyBuilder};
pub use kind::{with_cluster_identity, ActivatedKind, Kind, KindRegistry, StrategyBuilder};
pub use messages::ClusterInit;
pub use middleware::ClusterMiddleware;
pub use pid_cache::PidCache;
pub use strategy::{MemberStrategy, RoundRobinStrategy};
pub use throttle::{Throttle, Valve};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::actor::{ActorRef, ActorSystem};
use crate::errors::GrainError;
use crate::events::{ActivationTerminating, DeadLetter, Subscription, SystemEvent};
use crate::identity::ClusterIdentity;
use crate::shutdown::ShutdownType;

/// # Cluster
///
/// Handle to a running cluster member. Cloning is cheap; every clone refers to
/// the same member.
///
/// ## Purpose
///
/// The cluster owns the identity cache and the per-kind live counts. It is
/// passed explicitly to each grain it activates (see
/// [`ActorContext::cluster`](crate::actor::ActorContext::cluster)), so grains
/// never look it up through global state.
#[derive(Clone)]
pub struct Cluster {
    inner: Arc<ClusterInner>,
}

struct ClusterInner {
    config: ClusterConfig,
    system: ActorSystem,
    kinds: RwLock<HashMap<String, Arc<ActivatedKind>>>,
    pid_cache: PidCache,
    request_log_throttle: Throttle,
    activation_lock: Mutex<()>,
    subscription: Subscription,
}

impl ClusterInner {
    fn kind(&self, name: &str) -> Option<Arc<ActivatedKind>> {
        self.kinds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn on_activation_terminating(&self, event: &ActivationTerminating) {
        match self.kind(event.identity.kind()) {
            Some(kind) => {
                kind.dec();
                debug!(
                    "Activation {} of {} terminated; {} live",
                    event.pid.id(),
                    event.identity,
                    kind.count()
                );
            }
            None => debug!("Terminated activation {} has an unknown kind", event.identity),
        }
    }
}

impl Drop for ClusterInner {
    fn drop(&mut self) {
        self.system.event_stream().unsubscribe(self.subscription);
    }
}

impl Cluster {
    /// Creates a cluster member on `system`, building every registered kind.
    pub fn new(system: ActorSystem, config: ClusterConfig) -> Self {
        let throttle = Throttle::new(
            "cluster requests",
            config.max_number_of_events_in_request_log_throttle_period,
            config.requests_log_throttle_period,
        );

        let inner = Arc::new_cyclic(|weak: &Weak<ClusterInner>| {
            let weak = weak.clone();
            let subscription = system.event_stream().subscribe(move |event| {
                if let SystemEvent::ActivationTerminating(terminating) = event {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_activation_terminating(terminating);
                    }
                }
            });

            ClusterInner {
                config,
                system,
                kinds: RwLock::new(HashMap::new()),
                pid_cache: PidCache::new(),
                request_log_throttle: throttle,
                activation_lock: Mutex::new(()),
                subscription,
            }
        });

        let cluster = Cluster { inner };
        let activated: HashMap<String, Arc<ActivatedKind>> = cluster
            .inner
            .config
            .kinds
            .iter()
            .map(|kind| (kind.name().to_string(), Arc::new(kind.build(&cluster))))
            .collect();
        info!(
            "Cluster {} started at {} with kinds {:?}",
            cluster.name(),
            cluster.address(),
            cluster.inner.config.kinds.names()
        );
        *cluster
            .inner
            .kinds
            .write()
            .unwrap_or_else(PoisonError::into_inner) = activated;

        cluster
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn address(&self) -> &str {
        &self.inner.config.address
    }

    pub fn system(&self) -> &ActorSystem {
        &self.inner.system
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.inner.config
    }

    pub fn pid_cache(&self) -> &PidCache {
        &self.inner.pid_cache
    }

    pub fn request_timeout(&self) -> Duration {
        self.inner.config.request_timeout
    }

    pub fn kind(&self, name: &str) -> Option<Arc<ActivatedKind>> {
        self.inner.kind(name)
    }

    /// The kind's own member strategy, or the one the config's default
    /// builder produces for it.
    pub fn member_strategy(&self, kind: &str) -> Option<Arc<dyn MemberStrategy>> {
        let activated = self.kind(kind)?;
        Some(match activated.strategy() {
            Some(strategy) => strategy.clone(),
            None => (self.inner.config.member_strategy_builder)(self, kind),
        })
    }

    /// Returns the live activation for `identity`, activating it first if
    /// there is none.
    ///
    /// Activations are serialized, so concurrent callers for the same identity
    /// always end up with the same activation.
    pub async fn get_or_activate(&self, identity: &ClusterIdentity) -> Result<ActorRef, GrainError> {
        if let Some(pid) = self.cached_live(identity) {
            return Ok(pid);
        }

        let _guard = self.inner.activation_lock.lock().await;
        if let Some(pid) = self.cached_live(identity) {
            return Ok(pid);
        }

        let kind = self.kind(identity.kind()).ok_or_else(|| {
            warn!("Cannot activate {}: kind is not registered", identity);
            GrainError::UnknownKind(identity.kind().to_string())
        })?;

        let cluster = self.clone();
        let props = with_cluster_identity(kind.props(), identity.clone()).with_on_init(move |ctx| {
            ctx.set_cluster(cluster.clone());
        });

        let live = kind.inc();
        let pid = match self.inner.system.spawn(&props) {
            Ok(pid) => pid,
            Err(e) => {
                kind.dec();
                return Err(e.into());
            }
        };
        self.inner.pid_cache.insert(identity.clone(), pid.clone());

        info!("Activated {} as {} ({} live)", identity, pid.id(), live);
        Ok(pid)
    }

    fn cached_live(&self, identity: &ClusterIdentity) -> Option<ActorRef> {
        let pid = self.inner.pid_cache.get(identity)?;
        if pid.is_alive() {
            return Some(pid);
        }
        self.inner.pid_cache.remove_by_value(identity, &pid);
        None
    }

    /// Sends an encoded request to the grain behind `identity`, activating it
    /// if needed, and waits up to `timeout` for the encoded response.
    ///
    /// Failures are returned as-is and never retried. A transport failure
    /// against an activation that has gone away evicts its cache entry and is
    /// published as a dead letter.
    pub async fn request(
        &self,
        identity: &ClusterIdentity,
        method_index: u32,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, GrainError> {
        let pid = self.get_or_activate(identity).await?;

        match pid.request(method_index, payload, timeout).await {
            Err(GrainError::TransportFailure(reason)) => {
                if !pid.is_alive() && self.inner.pid_cache.remove_by_value(identity, &pid) {
                    debug!("Evicted stale activation {} of {}", pid.id(), identity);
                }
                self.inner
                    .system
                    .event_stream()
                    .publish(SystemEvent::DeadLetter(DeadLetter {
                        target: pid.id(),
                        description: format!("request #{} to {}: {}", method_index, identity, reason),
                    }));
                self.log_request_failure(identity, &reason);
                Err(GrainError::TransportFailure(reason))
            }
            Err(error @ GrainError::RequestTimeout { .. }) => {
                self.log_request_failure(identity, &error.to_string());
                Err(error)
            }
            other => other,
        }
    }

    fn log_request_failure(&self, identity: &ClusterIdentity, reason: &str) {
        match self.inner.request_log_throttle.should_throttle() {
            Valve::Open => warn!("Request to {} failed: {}", identity, reason),
            Valve::Closing => warn!(
                "Request to {} failed: {}; suppressing further failures for {:?}",
                identity,
                reason,
                self.inner.request_log_throttle.period()
            ),
            Valve::Closed => {}
        }
    }

    /// Gracefully stops every activation on this member's actor system.
    pub async fn shutdown(&self) {
        info!("Cluster {} shutting down", self.name());
        self.inner.system.shutdown(ShutdownType::Graceful).await;
    }
}

impl fmt::Debug for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cluster")
            .field("name", &self.inner.config.name)
            .field("address", &self.inner.config.address)
            .field("cached", &self.inner.pid_cache.len())
            .finish()
    }
}
