// Code generated by troupe-codegen. DO NOT EDIT.
// source: worker.toml
use super::messages::*;

pub const WORKER_KIND: &str = "Worker";
pub const WORKER_INVOKE_SERVICE: u32 = 0;
pub const WORKER_DO_WORK: u32 = 1;

/// Server side of the `Worker` grain.
#[::troupe::async_trait]
pub trait WorkerGrain: Send + 'static {
    async fn init(&mut self, _ctx: &mut ::troupe::ActorContext) {}

    async fn terminate(&mut self, _ctx: &mut ::troupe::ActorContext) {}

    async fn receive_default(&mut self, _ctx: &mut ::troupe::ActorContext, _message: ::troupe::Message) {}

    async fn invoke_service(
        &mut self,
        request: InvokeRequest,
        respond: ::troupe::Responder<InvokeResponse>,
        ctx: &mut ::troupe::ActorContext,
    );

    async fn do_work(
        &mut self,
        request: WorkRequest,
        ctx: &mut ::troupe::ActorContext,
    ) -> ::std::result::Result<WorkResponse, ::troupe::GrainError>;
}

/// Runs a [`WorkerGrain`] as an activation, routing requests by method index.
pub struct WorkerGrainActor<G: WorkerGrain> {
    grain: G,
}

impl<G: WorkerGrain> WorkerGrainActor<G> {
    pub fn new(grain: G) -> Self {
        Self { grain }
    }

    pub fn grain(&self) -> &G {
        &self.grain
    }
}

#[::troupe::async_trait]
impl<G: WorkerGrain> ::troupe::Actor for WorkerGrainActor<G> {
    async fn receive(
        &mut self,
        ctx: &mut ::troupe::ActorContext,
        message: ::troupe::Message,
    ) -> ::std::result::Result<(), ::troupe::ActorError> {
        match message {
            ::troupe::Message::ClusterInit(_) => self.grain.init(ctx).await,
            ::troupe::Message::Stopped => self.grain.terminate(ctx).await,
            ::troupe::Message::Request(request) => match request.method_index() {
                WORKER_INVOKE_SERVICE => {
                    if let ::std::option::Option::Some((input, reply)) = request.decode::<InvokeRequest>() {
                        self.grain.invoke_service(input, reply.responder(), ctx).await;
                    }
                }
                WORKER_DO_WORK => {
                    if let ::std::option::Option::Some((input, reply)) = request.decode::<WorkRequest>() {
                        let result = self.grain.do_work(input, ctx).await;
                        reply.send(result);
                    }
                }
                other => request.reject(::troupe::GrainError::UnknownMethod(other)),
            },
            other => self.grain.receive_default(ctx, other).await,
        }
        ::std::result::Result::Ok(())
    }

    fn continuation_target(&mut self) -> &mut dyn ::std::any::Any {
        &mut self.grain
    }
}

/// Kind for `Worker` grains, each produced by `factory`.
pub fn worker_kind<G, F>(factory: F) -> ::troupe::Kind
where
    G: WorkerGrain,
    F: Fn() -> G + Send + Sync + 'static,
{
    ::troupe::Kind::new(
        WORKER_KIND,
        ::troupe::Props::from_producer(move || WorkerGrainActor::new(factory())),
    )
}

/// Identity-addressed client for `Worker` grains.
#[derive(Debug, Clone)]
pub struct WorkerGrainClient {
    cluster: ::troupe::Cluster,
    identity: ::troupe::ClusterIdentity,
    options: ::troupe::CallOptions,
}

impl WorkerGrainClient {
    pub fn new(cluster: ::troupe::Cluster, identity: impl Into<String>) -> Self {
        Self {
            cluster,
            identity: ::troupe::ClusterIdentity::new(identity, WORKER_KIND),
            options: ::troupe::CallOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ::troupe::CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn identity(&self) -> &::troupe::ClusterIdentity {
        &self.identity
    }

    pub async fn invoke_service(
        &self,
        request: &InvokeRequest,
    ) -> ::std::result::Result<InvokeResponse, ::troupe::GrainError> {
        ::troupe::grain::call(&self.cluster, &self.identity, WORKER_INVOKE_SERVICE, request, &self.options).await
    }

    /// Calls `InvokeService` without holding the caller's turn; `continuation`
    /// runs on a later turn of the calling actor.
    pub fn invoke_service_reentrant<A, F>(
        &self,
        ctx: &::troupe::ActorContext,
        request: &InvokeRequest,
        continuation: F,
    ) -> ::std::result::Result<(), ::troupe::GrainError>
    where
        A: ::std::any::Any,
        F: FnOnce(&mut A, ::std::result::Result<InvokeResponse, ::troupe::GrainError>, &mut ::troupe::ActorContext)
            + Send
            + 'static,
    {
        ::troupe::grain::call_reentrant(
            ctx,
            &self.cluster,
            &self.identity,
            WORKER_INVOKE_SERVICE,
            request,
            &self.options,
            continuation,
        )
    }

    pub async fn do_work(
        &self,
        request: &WorkRequest,
    ) -> ::std::result::Result<WorkResponse, ::troupe::GrainError> {
        ::troupe::grain::call(&self.cluster, &self.identity, WORKER_DO_WORK, request, &self.options).await
    }
}
