use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::debug;

use crate::errors::GrainError;
use crate::grain::codec;

pub type Reply = Result<Vec<u8>, GrainError>;

/// An identity-addressed call waiting in a grain's mailbox.
///
/// The request remembers when its caller stops waiting. A request dequeued
/// after that point is answered with `RequestTimeout` by the runtime and never
/// reaches the grain.
pub struct GrainRequest {
    method_index: u32,
    payload: Vec<u8>,
    /// `None` when the timeout is too large to express as an instant
    deadline: Option<Instant>,
    timeout: Duration,
    reply: ReplyTo,
}

impl GrainRequest {
    pub fn new(method_index: u32, payload: Vec<u8>, timeout: Duration) -> (Self, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        let request = Self {
            method_index,
            payload,
            deadline: Instant::now().checked_add(timeout),
            timeout,
            reply: ReplyTo { tx },
        };
        (request, rx)
    }

    pub fn method_index(&self) -> u32 {
        self.method_index
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once the caller has given up, or has dropped its end.
    pub fn is_expired(&self) -> bool {
        let passed = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        passed || self.reply.is_closed()
    }

    /// Decodes the payload. On failure the caller is answered with a
    /// serialization error and `None` is returned.
    pub fn decode<T: DeserializeOwned>(self) -> Option<(T, ReplyTo)> {
        match codec::decode(&self.payload) {
            Ok(input) => Some((input, self.reply)),
            Err(e) => {
                debug!("Request #{} has an undecodable payload: {}", self.method_index, e);
                self.reply.fail(e);
                None
            }
        }
    }

    pub fn reject(self, error: GrainError) {
        self.reply.fail(error);
    }

    pub fn into_reply(self) -> ReplyTo {
        self.reply
    }
}

impl fmt::Debug for GrainRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrainRequest")
            .field("method_index", &self.method_index)
            .field("payload_len", &self.payload.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// The reply side of a [`GrainRequest`].
#[derive(Debug)]
pub struct ReplyTo {
    tx: oneshot::Sender<Reply>,
}

impl ReplyTo {
    pub fn send<T: Serialize>(self, result: Result<T, GrainError>) {
        let reply = result.and_then(|value| codec::encode(&value));
        if self.tx.send(reply).is_err() {
            debug!("Caller stopped waiting before the reply was sent");
        }
    }

    pub fn fail(self, error: GrainError) {
        self.send::<()>(Err(error));
    }

    /// Wraps this reply for a handler that answers later with a `T`.
    pub fn responder<T: Serialize>(self) -> Responder<T> {
        Responder {
            reply: self,
            _marker: PhantomData,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Completes a reenterable call. It may be moved into a continuation and
/// answered on a later turn; dropping it unanswered fails the caller with a
/// transport failure.
pub struct Responder<T> {
    reply: ReplyTo,
    _marker: PhantomData<fn(T)>,
}

impl<T: Serialize> Responder<T> {
    pub fn respond(self, result: Result<T, GrainError>) {
        self.reply.send(result);
    }

    pub fn ok(self, value: T) {
        self.respond(Ok(value));
    }

    pub fn fail(self, error: GrainError) {
        self.respond(Err(error));
    }

    pub fn is_closed(&self) -> bool {
        self.reply.is_closed()
    }
}

impl<T> fmt::Debug for Responder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("type", &std::any::type_name::<T>())
            .field("closed", &self.reply.is_closed())
            .finish()
    }
}
