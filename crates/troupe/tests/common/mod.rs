#![allow(dead_code)]

pub mod messages;
pub mod worker_grain;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use troupe::{
    Actor, ActorContext, ActorError, CallOptions, Cluster, ClusterConfig, GrainError, Kind,
    Message, Props, Responder,
};

use messages::{InvokeRequest, InvokeResponse, WorkRequest, WorkResponse};
use worker_grain::{worker_kind, WorkerGrain, WorkerGrainClient};

/// Routing target that makes a worker drop the reply instead of answering.
pub const DROP_REPLY: &str = "!drop";

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Records every message it sees. On `Stopped` it also records whether the
/// identity cache still holds an entry for it.
pub struct Recorder {
    pub tag: &'static str,
    pub journal: Journal,
}

#[troupe::async_trait]
impl Actor for Recorder {
    async fn receive(&mut self, ctx: &mut ActorContext, message: Message) -> Result<(), ActorError> {
        let entry = match message {
            Message::Started => format!("{}:started", self.tag),
            Message::ClusterInit(init) => format!("{}:cluster-init {}", self.tag, init.identity()),
            Message::Stopped => {
                let cached = match (ctx.identity(), ctx.cluster()) {
                    (Some(identity), Some(cluster)) => cluster.pid_cache().get(identity).is_some(),
                    _ => false,
                };
                format!("{}:stopped cached={}", self.tag, cached)
            }
            Message::User(payload) => match payload.downcast::<String>() {
                Ok(text) => format!("{}:user {}", self.tag, text),
                Err(_) => format!("{}:user ?", self.tag),
            },
            other => format!("{}:{:?}", self.tag, other),
        };
        self.journal.lock().unwrap().push(entry);
        Ok(())
    }
}

pub fn recorder_kind(name: &str, tag: &'static str, journal: &Journal) -> Kind {
    let journal = journal.clone();
    Kind::new(
        name,
        Props::from_producer(move || Recorder {
            tag,
            journal: journal.clone(),
        }),
    )
}

/// Worker grain used by the dispatch tests. Each hop is recorded in the
/// shared journal as `<identity>:<event>`.
pub struct Worker {
    pub name: String,
    pub journal: Journal,
    pub hop_timeout: Duration,
    pub completed: u32,
}

impl Worker {
    fn record(&self, event: impl std::fmt::Display) {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, event));
    }

    fn client(&self, ctx: &ActorContext, identity: &str) -> Option<WorkerGrainClient> {
        let cluster = ctx.cluster()?.clone();
        Some(
            WorkerGrainClient::new(cluster, identity)
                .with_options(CallOptions::with_timeout(self.hop_timeout)),
        )
    }
}

#[troupe::async_trait]
impl WorkerGrain for Worker {
    async fn init(&mut self, ctx: &mut ActorContext) {
        if let Some(identity) = ctx.identity() {
            self.name = identity.identity().to_string();
        }
        self.record("init");
    }

    async fn invoke_service(
        &mut self,
        request: InvokeRequest,
        respond: Responder<InvokeResponse>,
        ctx: &mut ActorContext,
    ) {
        let mut trail = request.trail;
        trail.push(self.name.clone());
        self.record("invoke");

        let mut next = request.next;
        if next.is_empty() {
            respond.ok(InvokeResponse { trail });
            return;
        }

        let target = next.remove(0);
        if target == DROP_REPLY {
            self.record("dropped");
            drop(respond);
            return;
        }
        let Some(client) = self.client(ctx, &target) else {
            respond.fail(GrainError::Remote("no cluster bound".into()));
            return;
        };
        let forwarded = InvokeRequest { trail, next };
        let result = client.invoke_service_reentrant(
            ctx,
            &forwarded,
            move |worker: &mut Worker, result, _ctx| {
                worker.completed += 1;
                worker.record(format!("resumed {}", worker.completed));
                respond.respond(result);
            },
        );
        if let Err(e) = result {
            self.record(format!("call failed {}", e));
        }
    }

    async fn do_work(
        &mut self,
        request: WorkRequest,
        ctx: &mut ActorContext,
    ) -> Result<WorkResponse, GrainError> {
        self.record("do_work");

        let mut next = request.next;
        if next.is_empty() {
            return Ok(WorkResponse {
                done_by: self.name.clone(),
            });
        }

        let target = next.remove(0);
        let client = self
            .client(ctx, &target)
            .ok_or_else(|| GrainError::Remote("no cluster bound".into()))?;
        let result = client.do_work(&WorkRequest { next }).await;
        match &result {
            Ok(_) => self.record("done"),
            Err(GrainError::RequestTimeout { .. }) => self.record("timeout"),
            Err(e) => self.record(format!("failed {}", e)),
        }
        result
    }
}

pub fn worker_cluster(system_name: &str, journal: &Journal, hop_timeout: Duration) -> Cluster {
    let journal = journal.clone();
    let kind = worker_kind(move || Worker {
        name: String::new(),
        journal: journal.clone(),
        hop_timeout,
        completed: 0,
    });
    let config = ClusterConfig::new(system_name).with_kinds([kind]);
    Cluster::new(troupe::ActorSystem::new(system_name), config)
}
