//! # Actor Handle
//!
//! This module provides the `ActorRef` type, the primary interface for
//! interacting with a running activation from the outside.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error};

use crate::actor::types::{ActorControl, ActorError, Envelope, Message, DEFAULT_STOP_TIMEOUT};
use crate::errors::GrainError;
use crate::grain::GrainRequest;
use crate::id::ProcessId;

/// # ActorRef
///
/// A handle to one activation, providing methods to message it and manage its
/// lifecycle.
///
/// ## Purpose
///
/// ActorRef encapsulates the channels between a caller and an activation's
/// execution loop. Two refs are equal when they point at the same activation,
/// which is what the identity cache relies on for removal by value.
#[derive(Clone)]
pub struct ActorRef {
    id: ProcessId,
    mailbox_tx: mpsc::UnboundedSender<Envelope>,
    control_tx: mpsc::UnboundedSender<ActorControl>,
}

impl ActorRef {
    pub(crate) fn new(
        id: ProcessId,
        mailbox_tx: mpsc::UnboundedSender<Envelope>,
        control_tx: mpsc::UnboundedSender<ActorControl>,
    ) -> Self {
        Self {
            id,
            mailbox_tx,
            control_tx,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Queues an envelope in the activation's mailbox.
    pub fn send(&self, envelope: Envelope) -> Result<(), ActorError> {
        self.mailbox_tx.send(envelope).map_err(|_| {
            debug!("Mailbox of actor {} is closed", self.id);
            ActorError::MailboxClosed
        })
    }

    /// Fire-and-forget delivery of a user message.
    pub fn tell<M: Any + Send>(&self, message: M) -> Result<(), ActorError> {
        self.send(Envelope::new(Message::user(message)))
    }

    /// Sends a grain request and waits up to `timeout` for its reply.
    ///
    /// ## Returns
    ///
    /// * `Ok(bytes)` - The encoded response.
    /// * `Err(GrainError::RequestTimeout)` - No reply arrived in time.
    /// * `Err(GrainError::TransportFailure)` - The activation is gone or
    ///   dropped the request without answering.
    /// * Any error the grain itself replied with.
    pub async fn request(
        &self,
        method_index: u32,
        payload: Vec<u8>,
        timeout_after: Duration,
    ) -> Result<Vec<u8>, GrainError> {
        let (request, reply_rx) = GrainRequest::new(method_index, payload, timeout_after);

        self.send(Envelope::new(Message::Request(request)))
            .map_err(|_| {
                GrainError::TransportFailure(format!("activation {} is not running", self.id))
            })?;

        match timeout(timeout_after, reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(GrainError::TransportFailure(format!(
                "activation {} dropped request #{}",
                self.id, method_index
            ))),
            Err(_) => Err(GrainError::timeout(timeout_after)),
        }
    }

    /// Stops the activation and waits until it has processed `Stopped`.
    pub async fn stop(&self) -> Result<(), ActorError> {
        let (tx, rx) = oneshot::channel();
        self.control_tx
            .send(ActorControl::Stop {
                response_tx: Some(tx),
            })
            .map_err(|_| ActorError::MailboxClosed)?;

        match timeout(DEFAULT_STOP_TIMEOUT, rx).await {
            Ok(_) => Ok(()),
            Err(_) => {
                error!(
                    "Actor {} did not stop within {:?}",
                    self.id, DEFAULT_STOP_TIMEOUT
                );
                Err(ActorError::StopTimeout(DEFAULT_STOP_TIMEOUT))
            }
        }
    }

    /// False once the activation has begun shutting down.
    pub fn is_alive(&self) -> bool {
        !self.control_tx.is_closed()
    }
}

impl PartialEq for ActorRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ActorRef {}

impl Hash for ActorRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRef")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}
