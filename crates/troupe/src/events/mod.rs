//! # Event Stream
//!
//! Process-wide publish/subscribe bus. Publishing is synchronous: every
//! subscriber has run by the time `publish` returns, which is what lets a
//! subscriber observe system state exactly as it was at the moment of the
//! event.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;
use tracing::trace;

use crate::actor::ActorRef;
use crate::id::ProcessId;
use crate::identity::ClusterIdentity;

/// Published by an activation with a bound identity while it stops, before
/// its identity cache entry is removed.
#[derive(Debug, Clone)]
pub struct ActivationTerminating {
    pub pid: ActorRef,
    pub identity: ClusterIdentity,
}

/// A message that could not be delivered to its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetter {
    pub target: ProcessId,
    pub description: String,
}

#[derive(Debug, Clone)]
pub enum SystemEvent {
    ActivationTerminating(ActivationTerminating),
    DeadLetter(DeadLetter),
}

type Handler = Arc<dyn Fn(&SystemEvent) + Send + Sync>;

/// Handle returned by [`EventStream::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Handler)>,
}

#[derive(Clone, Default)]
pub struct EventStream {
    subscribers: Arc<RwLock<Subscribers>>,
}

impl EventStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` to run for every published event, in subscription
    /// order.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&SystemEvent) + Send + Sync + 'static,
    {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.entries.push((id, Arc::new(handler)));
        Subscription(id)
    }

    /// Subscribes a channel that receives a clone of every event.
    pub fn subscribe_channel(&self) -> (Subscription, mpsc::UnboundedReceiver<SystemEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });
        (subscription, rx)
    }

    /// Returns false if the subscription was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.entries.len();
        subscribers.entries.retain(|(id, _)| *id != subscription.0);
        subscribers.entries.len() != before
    }

    /// Delivers `event` to every subscriber before returning.
    ///
    /// Subscribers run outside the registry lock, so a handler may itself
    /// subscribe, unsubscribe or publish.
    pub fn publish(&self, event: SystemEvent) {
        let handlers: Vec<Handler> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        trace!("Publishing {:?} to {} subscribers", event, handlers.len());
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
