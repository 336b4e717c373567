//! # Actor Runtime
//!
//! The execution loop of a single activation. It owns the context and the
//! pipeline, and it is the only place messages are taken out of the mailbox,
//! which is what gives every activation its one-message-at-a-time guarantee.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::actor::context::ActorContext;
use crate::actor::middleware::Pipeline;
use crate::actor::types::{ActorControl, Envelope, Message};
use crate::errors::GrainError;
use crate::shutdown::{ShutdownReceiver, ShutdownSignal, ShutdownType};

pub struct ActorRuntime {
    ctx: ActorContext,
    pipeline: Pipeline,
    mailbox_rx: mpsc::UnboundedReceiver<Envelope>,
    control_rx: mpsc::UnboundedReceiver<ActorControl>,
}

impl ActorRuntime {
    pub fn new(
        ctx: ActorContext,
        pipeline: Pipeline,
        mailbox_rx: mpsc::UnboundedReceiver<Envelope>,
        control_rx: mpsc::UnboundedReceiver<ActorControl>,
    ) -> Self {
        Self {
            ctx,
            pipeline,
            mailbox_rx,
            control_rx,
        }
    }

    /// Runs the activation until it is stopped.
    ///
    /// `Started` is always the first message and `Stopped` always the last.
    /// Between them exactly one envelope is processed per turn. Control
    /// requests and shutdown signals are checked before the mailbox, so a stop
    /// takes effect after the current turn rather than after the queue drains.
    pub async fn run(mut self, shutdown: ShutdownReceiver) {
        let id = self.ctx.id();
        info!("Activation {} starting", id);

        self.deliver(Envelope::new(Message::Started)).await;

        let shutdown_wait = shutdown.wait_for_shutdown();
        tokio::pin!(shutdown_wait);

        let mut stop_ack: Option<oneshot::Sender<()>> = None;
        let mut shutdown_signal: Option<ShutdownSignal> = None;

        while !self.ctx.is_stopping() {
            tokio::select! {
                biased;

                Some(control) = self.control_rx.recv() => match control {
                    ActorControl::Stop { response_tx } => {
                        debug!("Activation {} received stop request", id);
                        stop_ack = response_tx;
                        break;
                    }
                },

                signal = &mut shutdown_wait => {
                    debug!("Activation {} received {:?} shutdown", id, signal.shutdown_type);
                    if signal.shutdown_type == ShutdownType::Graceful {
                        self.drain().await;
                    }
                    shutdown_signal = Some(signal);
                    break;
                },

                envelope = self.mailbox_rx.recv() => match envelope {
                    Some(envelope) => self.deliver(envelope).await,
                    None => {
                        debug!("Mailbox of activation {} closed", id);
                        break;
                    }
                },
            }
        }

        // Closing both receivers is what flips `ActorRef::is_alive`.
        self.control_rx.close();
        self.mailbox_rx.close();

        self.deliver(Envelope::new(Message::Stopped)).await;
        info!("Activation {} stopped", id);

        if let Some(ack) = stop_ack {
            let _ = ack.send(());
        }
        while let Ok(ActorControl::Stop { response_tx }) = self.control_rx.try_recv() {
            if let Some(ack) = response_tx {
                let _ = ack.send(());
            }
        }
        if let Some(signal) = shutdown_signal {
            signal.acknowledge();
        }
    }

    /// Processes everything already queued, stopping early if a handler asks
    /// the activation to stop.
    async fn drain(&mut self) {
        self.mailbox_rx.close();
        while let Ok(envelope) = self.mailbox_rx.try_recv() {
            self.deliver(envelope).await;
            if self.ctx.is_stopping() {
                break;
            }
        }
    }

    async fn deliver(&mut self, envelope: Envelope) {
        let envelope = match envelope.message {
            Message::Request(request) if request.is_expired() => {
                debug!(
                    "Activation {} dropping request #{} whose caller gave up",
                    self.ctx.id(),
                    request.method_index()
                );
                let timeout = request.timeout();
                request.reject(GrainError::timeout(timeout));
                return;
            }
            message => Envelope::new(message),
        };

        if let Err(e) = self.pipeline.invoke(&mut self.ctx, envelope).await {
            error!("Activation {} failed to handle message: {}", self.ctx.id(), e);
        }
    }
}
