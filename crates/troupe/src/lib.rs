//! # Troupe
//!
//! Troupe is the activation and dispatch core of a virtual-actor ("grain")
//! runtime. Every grain is addressed by a location-independent
//! [`ClusterIdentity`]; the [`Cluster`] binds that identity to a live
//! activation on first use, keeps an identity cache, counts live activations
//! per [`Kind`], and routes identity-addressed requests.
//!
//! ## Core Components
//!
//! * [`actor`] - A small in-process actor system: mailboxes, serial turns, a
//!   receiver middleware pipeline, and reentrant continuations.
//! * [`cluster`] - Kinds, the identity cache, the activation middleware and the
//!   cluster configuration.
//! * [`grain`] - Request/response plumbing used by code generated with
//!   `troupe-codegen`, with blocking and reentrant call semantics.
//! * [`events`] - The synchronous system event stream.
//!
//! ## Example
//!
//! ```rust,no_run
//! use troupe::{Actor, ActorContext, ActorError, ActorSystem, Cluster, ClusterConfig};
//! use troupe::{ClusterIdentity, Kind, Message, Props};
//!
//! struct Hello;
//!
//! #[troupe::async_trait]
//! impl Actor for Hello {
//!     async fn receive(&mut self, ctx: &mut ActorContext, message: Message) -> Result<(), ActorError> {
//!         if let Message::ClusterInit(init) = message {
//!             println!("{} activated as {}", init.identity(), ctx.id());
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() -> Result<(), troupe::GrainError> {
//! let system = ActorSystem::new("example");
//! let config = ClusterConfig::new("example")
//!     .with_kinds([Kind::new("Hello", Props::from_producer(|| Hello))]);
//! let cluster = Cluster::new(system, config);
//!
//! let pid = cluster.get_or_activate(&ClusterIdentity::new("user-1", "Hello")).await?;
//! println!("live activation {}", pid.id());
//! cluster.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod cluster;
pub mod errors;
pub mod events;
pub mod grain;
pub mod id;
pub mod identity;
pub mod logging;
pub mod shutdown;

pub use async_trait::async_trait;

pub use actor::{
    Actor, ActorContext, ActorError, ActorRef, ActorSystem, Envelope, Message, Props, Signal,
};
pub use cluster::{
    ActivatedKind, Cluster, ClusterConfig, ClusterInit, Kind, KindRegistry, MemberStrategy,
    PidCache,
};
pub use errors::{ConfigError, GrainError};
pub use events::{ActivationTerminating, DeadLetter, EventStream, SystemEvent};
pub use grain::{CallOptions, GrainRequest, ReplyTo, Responder};
pub use id::ProcessId;
pub use identity::ClusterIdentity;
pub use shutdown::ShutdownType;
