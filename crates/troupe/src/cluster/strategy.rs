use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// Decides which cluster member hosts a new activation of a kind.
///
/// The placement algorithm itself lives outside this crate; the cluster only
/// builds, stores and hands out strategies.
pub trait MemberStrategy: Send + Sync + fmt::Debug {
    fn members(&self) -> Vec<String>;

    fn add_member(&self, address: &str);

    fn remove_member(&self, address: &str);

    /// Address of the member that should host the next activation requested
    /// by `sender_address`, or `None` when no member is known.
    fn get_activator(&self, sender_address: &str) -> Option<String>;
}

/// Round-robin over the known members.
#[derive(Debug, Default)]
pub struct RoundRobinStrategy {
    members: RwLock<Vec<String>>,
    next: AtomicUsize,
}

impl RoundRobinStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// A strategy whose only member is `address`.
    pub fn with_member(address: &str) -> Self {
        let strategy = Self::new();
        strategy.add_member(address);
        strategy
    }
}

impl MemberStrategy for RoundRobinStrategy {
    fn members(&self) -> Vec<String> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn add_member(&self, address: &str) {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        if !members.iter().any(|m| m == address) {
            members.push(address.to_string());
        }
    }

    fn remove_member(&self, address: &str) {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|m| m != address);
    }

    fn get_activator(&self, _sender_address: &str) -> Option<String> {
        let members = self.members.read().unwrap_or_else(PoisonError::into_inner);
        if members.is_empty() {
            return None;
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % members.len();
        Some(members[index].clone())
    }
}
