use std::time::Duration;
use tokio::sync::oneshot::{Receiver, Sender};
use tracing::debug;

/// Default timeout for waiting for an activation to shutdown gracefully
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A signal indicating that an activation should shutdown
#[derive(Debug)]
pub struct ShutdownSignal {
    /// Type of shutdown to perform
    pub shutdown_type: ShutdownType,
    pub sender: Option<Sender<()>>,
}

impl ShutdownSignal {
    /// Confirms the shutdown back to the controller, if it is still waiting.
    pub fn acknowledge(self) {
        if let Some(sender) = self.sender {
            let _ = sender.send(());
        }
    }
}

/// Type of shutdown to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownType {
    /// Process every envelope already queued, then stop
    Graceful,
    /// Stop after the current turn, dropping queued envelopes
    Force,
}

/// Controller that can broadcast shutdown signals to multiple receivers
#[derive(Debug, Default)]
pub struct ShutdownController {
    subscribers: Vec<Sender<ShutdownSignal>>,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Get a new receiver for this controller.
    ///
    /// Receivers belonging to activations that already finished are pruned here,
    /// so a long-lived system does not accumulate dead subscribers.
    pub fn subscribe(&mut self) -> ShutdownReceiver {
        self.subscribers.retain(|sender| !sender.is_closed());
        let (sender, receiver) = tokio::sync::oneshot::channel();
        self.subscribers.push(sender);
        ShutdownReceiver { receiver }
    }

    /// Number of receivers still listening
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|sender| !sender.is_closed())
            .count()
    }

    /// Signal all receivers to shutdown and wait until each has confirmed,
    /// giving up on stragglers after `DEFAULT_SHUTDOWN_TIMEOUT`.
    pub async fn signal_shutdown(self, shutdown_type: ShutdownType) {
        debug!(
            "Signaling {:?} shutdown to {} subscribers",
            shutdown_type,
            self.subscribers.len()
        );
        let mut receivers = Vec::new();
        for sender in self.subscribers {
            let (responder, receiver) = tokio::sync::oneshot::channel();
            match sender.send(ShutdownSignal {
                shutdown_type,
                sender: Some(responder),
            }) {
                Ok(_) => receivers.push(receiver),
                Err(_) => {
                    debug!("Shutdown subscriber already gone");
                }
            }
        }

        let wait_all = async {
            for receiver in receivers {
                if let Err(e) = receiver.await {
                    debug!("Subscriber finished without confirming shutdown: {:?}", e);
                }
            }
        };
        if tokio::time::timeout(DEFAULT_SHUTDOWN_TIMEOUT, wait_all)
            .await
            .is_err()
        {
            debug!(
                "Shutdown not confirmed by every subscriber within {:?}",
                DEFAULT_SHUTDOWN_TIMEOUT
            );
        }
    }
}

/// Receiver that can wait for shutdown signals
#[derive(Debug)]
pub struct ShutdownReceiver {
    pub receiver: Receiver<ShutdownSignal>,
}

impl ShutdownReceiver {
    /// Wait for a shutdown signal to be received.
    ///
    /// If the controller is dropped without signalling, this never resolves:
    /// the activation keeps running until stopped some other way.
    pub async fn wait_for_shutdown(self) -> ShutdownSignal {
        match self.receiver.await {
            Ok(signal) => {
                debug!("Received shutdown signal");
                signal
            }
            Err(_) => std::future::pending().await,
        }
    }
}
