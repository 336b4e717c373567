use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::actor::ActorRef;
use crate::identity::ClusterIdentity;

/// Maps each cluster identity to the activation currently serving it.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct PidCache {
    entries: Arc<RwLock<HashMap<ClusterIdentity, ActorRef>>>,
}

impl PidCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &ClusterIdentity) -> Option<ActorRef> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identity)
            .cloned()
    }

    /// Stores `pid` for `identity`, returning the entry it replaced.
    pub fn insert(&self, identity: ClusterIdentity, pid: ActorRef) -> Option<ActorRef> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identity, pid)
    }

    /// Removes the entry for `identity` only if it still points at `pid`.
    ///
    /// An entry that a newer activation has already overwritten is left in
    /// place. Returns whether an entry was removed.
    pub fn remove_by_value(&self, identity: &ClusterIdentity, pid: &ActorRef) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get(identity) {
            Some(current) if current == pid => {
                entries.remove(identity);
                true
            }
            _ => false,
        }
    }

    /// Unconditionally removes the entry for `identity`.
    pub fn remove(&self, identity: &ClusterIdentity) -> Option<ActorRef> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(identity)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn identities(&self) -> Vec<ClusterIdentity> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, ActorContext, ActorError, ActorSystem, Message, Props};
    use async_trait::async_trait;

    struct Idle;

    #[async_trait]
    impl Actor for Idle {
        async fn receive(&mut self, _ctx: &mut ActorContext, _message: Message) -> Result<(), ActorError> {
            Ok(())
        }
    }

    fn spawn_idle(system: &ActorSystem) -> ActorRef {
        system.spawn(&Props::from_producer(|| Idle)).unwrap()
    }

    #[tokio::test]
    async fn remove_by_value_leaves_newer_activation() {
        let system = ActorSystem::new("cache");
        let cache = PidCache::new();
        let identity = ClusterIdentity::new("user-1", "Hello");
        let old = spawn_idle(&system);
        let new = spawn_idle(&system);

        cache.insert(identity.clone(), old.clone());
        assert_eq!(cache.insert(identity.clone(), new.clone()), Some(old.clone()));

        assert!(!cache.remove_by_value(&identity, &old));
        assert_eq!(cache.get(&identity), Some(new.clone()));

        assert!(cache.remove_by_value(&identity, &new));
        assert!(cache.get(&identity).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn same_identity_in_two_kinds_has_two_entries() {
        let system = ActorSystem::new("cache");
        let cache = PidCache::new();
        let hello = ClusterIdentity::new("user-1", "Hello");
        let goodbye = ClusterIdentity::new("user-1", "Goodbye");

        cache.insert(hello.clone(), spawn_idle(&system));
        cache.insert(goodbye.clone(), spawn_idle(&system));

        assert_eq!(cache.len(), 2);
        assert_ne!(cache.get(&hello), cache.get(&goodbye));
        assert!(cache.remove(&hello).is_some());
        assert_eq!(cache.identities(), vec![goodbye]);
    }
}
