//! # Actor Types
//!
//! This module defines the core data types and error types used throughout the actor system:
//! the message set an activation processes, the envelope that carries it, the control
//! operations accepted outside the mailbox, and the continuation type used for reentrancy.

use crate::actor::context::ActorContext;
use crate::cluster::ClusterInit;
use crate::grain::GrainRequest;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::Duration;
use tracing::error;

/// Default time a caller waits for an activation to acknowledge a stop request
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// # ActorError
///
/// Represents errors that can occur while running an actor or talking to it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorError {
    /// The actor's mailbox is closed; it has stopped or is stopping
    #[error("Actor mailbox closed")]
    MailboxClosed,

    /// The actor system is shutting down and cannot accept new actors
    #[error("Actor system is shutting down")]
    Stopping,

    /// The actor did not acknowledge a stop request in time
    #[error("Stop timed out after {0:?}")]
    StopTimeout(Duration),

    /// The actor's handler failed while processing a message
    #[error("Actor failed: {0}")]
    Failed(String),
}

/// The closed set of signals the activation middleware distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Started,
    Stopped,
    Other,
}

/// # Message
///
/// Everything an activation can be asked to process during one turn.
pub enum Message {
    /// First message of every activation
    Started,
    /// Last message of every activation
    Stopped,
    /// Cluster binding, delivered right after `Started` for grains
    ClusterInit(ClusterInit),
    /// Identity-addressed RPC produced by generated grain clients
    Request(GrainRequest),
    /// Deferred resumption of a reentrant call
    Continuation(Continuation),
    /// Any other user message
    User(Box<dyn Any + Send>),
}

impl Message {
    /// Wraps an arbitrary value as a user message.
    pub fn user<M: Any + Send>(message: M) -> Self {
        Message::User(Box::new(message))
    }

    /// Classifies the message for lifecycle interception.
    pub fn signal(&self) -> Signal {
        match self {
            Message::Started => Signal::Started,
            Message::Stopped => Signal::Stopped,
            _ => Signal::Other,
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Started => write!(f, "Started"),
            Message::Stopped => write!(f, "Stopped"),
            Message::ClusterInit(init) => write!(f, "ClusterInit({})", init.identity()),
            Message::Request(request) => write!(f, "Request(#{})", request.method_index()),
            Message::Continuation(_) => write!(f, "Continuation"),
            Message::User(_) => write!(f, "User"),
        }
    }
}

/// A queued mailbox entry.
#[derive(Debug)]
pub struct Envelope {
    pub message: Message,
}

impl Envelope {
    pub fn new(message: Message) -> Self {
        Self { message }
    }
}

/// Operations handled outside the mailbox, ahead of queued messages.
#[derive(Debug)]
pub enum ActorControl {
    /// Stop the actor after the current turn
    Stop {
        /// Channel to confirm the actor has processed `Stopped`
        response_tx: Option<oneshot::Sender<()>>,
    },
}

type ResumeFn = Box<dyn FnOnce(&mut dyn Any, &mut ActorContext) + Send>;

/// # Continuation
///
/// Work scheduled to run later on an actor's own turn. Continuations are how a
/// reentrant call resumes: the call's result is wrapped into one and queued in
/// the caller's mailbox, so it runs with exclusive access to the actor's state
/// like any other message.
pub struct Continuation(ResumeFn);

impl Continuation {
    /// Wraps a closure that expects to run against an `A`.
    pub fn new<A, F>(resume: F) -> Self
    where
        A: Any,
        F: FnOnce(&mut A, &mut ActorContext) + Send + 'static,
    {
        Continuation(Box::new(move |target: &mut dyn Any, ctx: &mut ActorContext| {
            match target.downcast_mut::<A>() {
                Some(actor) => resume(actor, ctx),
                None => error!(
                    "Continuation for {} dropped: actor {} is a different type",
                    std::any::type_name::<A>(),
                    ctx.id()
                ),
            }
        }))
    }

    /// Runs the continuation against the actor's continuation target.
    pub fn resume(self, target: &mut dyn Any, ctx: &mut ActorContext) {
        (self.0)(target, ctx)
    }
}
