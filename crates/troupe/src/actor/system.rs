use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::actor::context::ActorContext;
use crate::actor::handle::ActorRef;
use crate::actor::props::Props;
use crate::actor::runtime::ActorRuntime;
use crate::actor::types::ActorError;
use crate::events::EventStream;
use crate::id::ProcessId;
use crate::shutdown::{ShutdownController, ShutdownType};

/// # ActorSystem
///
/// Owns the process-wide event stream and tracks every activation it spawned
/// so they can be shut down together. Cloning yields another handle to the
/// same system.
#[derive(Clone)]
pub struct ActorSystem {
    inner: Arc<SystemInner>,
}

struct SystemInner {
    name: String,
    events: EventStream,
    shutdown: Mutex<Option<ShutdownController>>,
}

impl ActorSystem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(SystemInner {
                name: name.into(),
                events: EventStream::new(),
                shutdown: Mutex::new(Some(ShutdownController::new())),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn event_stream(&self) -> &EventStream {
        &self.inner.events
    }

    /// Starts a new activation from `props` on its own task.
    ///
    /// Init hooks run on the fresh context before the task starts, so the
    /// activation's first message already sees whatever they bound.
    pub fn spawn(&self, props: &Props) -> Result<ActorRef, ActorError> {
        let shutdown = {
            let mut controller = self
                .inner
                .shutdown
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match controller.as_mut() {
                Some(controller) => controller.subscribe(),
                None => return Err(ActorError::Stopping),
            }
        };

        let (mailbox_tx, mailbox_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let actor_ref = ActorRef::new(ProcessId::generate(), mailbox_tx, control_tx);

        let mut ctx = ActorContext::new(actor_ref.clone(), self.clone());
        props.run_init(&mut ctx);

        let runtime = ActorRuntime::new(ctx, props.produce(), mailbox_rx, control_rx);
        tokio::spawn(runtime.run(shutdown));

        debug!("Spawned actor {} in system {}", actor_ref.id(), self.name());
        Ok(actor_ref)
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner
            .shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Stops every activation and waits for them to finish. Further spawns
    /// fail with [`ActorError::Stopping`]. Calling this twice is a no-op.
    pub async fn shutdown(&self, shutdown_type: ShutdownType) {
        let controller = self
            .inner
            .shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match controller {
            Some(controller) => {
                info!("Shutting down actor system {}", self.name());
                controller.signal_shutdown(shutdown_type).await;
                info!("Actor system {} shut down", self.name());
            }
            None => debug!("Actor system {} already shut down", self.name()),
        }
    }
}

impl fmt::Debug for ActorSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorSystem")
            .field("name", &self.inner.name)
            .finish()
    }
}
