//! # Kinds
//!
//! A kind is a named grain type: a behavior factory plus, optionally, a
//! builder for the member strategy used to place its activations. Kinds are
//! registered in a [`KindRegistry`] and built once per cluster into
//! [`ActivatedKind`]s, which additionally track how many activations of the
//! kind are live.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::actor::Props;
use crate::cluster::middleware::ClusterMiddleware;
use crate::cluster::strategy::MemberStrategy;
use crate::cluster::Cluster;
use crate::identity::ClusterIdentity;

pub type StrategyBuilder = Arc<dyn Fn(&Cluster) -> Arc<dyn MemberStrategy> + Send + Sync>;

#[derive(Clone)]
pub struct Kind {
    name: String,
    props: Props,
    strategy_builder: Option<StrategyBuilder>,
}

impl Kind {
    /// Creates a kind whose activations run `props` behind the cluster
    /// activation middleware.
    pub fn new(name: impl Into<String>, props: Props) -> Self {
        Self {
            name: name.into(),
            props: props.with_receiver_middleware(ClusterMiddleware::new()),
            strategy_builder: None,
        }
    }

    pub fn with_member_strategy<F>(mut self, builder: F) -> Self
    where
        F: Fn(&Cluster) -> Arc<dyn MemberStrategy> + Send + Sync + 'static,
    {
        self.strategy_builder = Some(Arc::new(builder));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn has_member_strategy(&self) -> bool {
        self.strategy_builder.is_some()
    }

    /// Resolves the strategy builder against `cluster`, if the kind has one.
    pub fn build(&self, cluster: &Cluster) -> ActivatedKind {
        let strategy = self.strategy_builder.as_ref().map(|builder| builder(cluster));
        ActivatedKind {
            name: self.name.clone(),
            props: self.props.clone(),
            strategy,
            count: AtomicI64::new(0),
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kind")
            .field("name", &self.name)
            .field("props", &self.props)
            .field("member_strategy", &self.strategy_builder.is_some())
            .finish()
    }
}

/// Returns props that bind `identity` to every context they create.
pub fn with_cluster_identity(props: &Props, identity: ClusterIdentity) -> Props {
    props.clone().with_on_init(move |ctx| {
        ctx.set_identity(identity.clone());
    })
}

/// Kinds by name. Registering a name twice keeps the later kind.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: HashMap<String, Kind>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `kind`, returning the kind it replaced.
    pub fn register(&mut self, kind: Kind) -> Option<Kind> {
        let previous = self.kinds.insert(kind.name.clone(), kind);
        if let Some(previous) = &previous {
            debug!("Kind {} re-registered; replacing earlier registration", previous.name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Kind> {
        self.kinds.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Kind> {
        self.kinds.values()
    }
}

/// A kind built for one cluster, with its live-activation count.
pub struct ActivatedKind {
    name: String,
    props: Props,
    strategy: Option<Arc<dyn MemberStrategy>>,
    count: AtomicI64,
}

impl ActivatedKind {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn strategy(&self) -> Option<&Arc<dyn MemberStrategy>> {
        self.strategy.as_ref()
    }

    /// Records a new activation and returns the live count after it.
    pub fn inc(&self) -> i64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Records a terminated activation. A decrement that would take the count
    /// below zero is refused and reported as `false`.
    pub fn dec(&self) -> bool {
        let result = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                (count > 0).then(|| count - 1)
            });
        if result.is_err() {
            warn!("Kind {}: ignoring decrement of empty live count", self.name);
        }
        result.is_ok()
    }

    pub fn count(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ActivatedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivatedKind")
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .field("count", &self.count())
            .finish()
    }
}
