use std::fmt;

use crate::cluster::Cluster;
use crate::identity::ClusterIdentity;

/// Delivered to a grain right after `Started`, in the same turn, carrying the
/// identity it was activated for and the cluster that activated it.
#[derive(Clone)]
pub struct ClusterInit {
    identity: ClusterIdentity,
    cluster: Cluster,
}

impl ClusterInit {
    pub fn new(identity: ClusterIdentity, cluster: Cluster) -> Self {
        Self { identity, cluster }
    }

    pub fn identity(&self) -> &ClusterIdentity {
        &self.identity
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }
}

impl fmt::Debug for ClusterInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterInit")
            .field("identity", &self.identity)
            .field("cluster", &self.cluster.name())
            .finish()
    }
}
