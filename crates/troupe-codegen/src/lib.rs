//! # Troupe Codegen
//!
//! Compiles grain service definitions into Rust source for the `troupe`
//! runtime. For every service the generated file contains:
//!
//! * a kind-name constant and one routing constant per method,
//! * a grain trait to implement (blocking methods return their response,
//!   reenterable methods get a `Responder` they may complete later),
//! * an actor adapter that dispatches requests to the trait by method index,
//! * a function building the service's `Kind`,
//! * a client with one awaited call per method, plus a `_reentrant` variant
//!   for reenterable methods.
//!
//! Streaming methods are accepted in definitions but produce no code.
//! Reading definitions from disk and writing the output is left to the
//! caller.

pub mod descriptor;
pub mod error;
pub mod generator;

pub use descriptor::{MethodDefinition, MethodDescriptor, ServiceDefinition, ServiceFile};
pub use error::CodegenError;
pub use generator::GrainGenerator;

/// Parses `definition` and renders it. Returns `None` when the definition
/// declares nothing to dispatch.
pub fn generate(source_name: &str, definition: &str) -> Result<Option<String>, CodegenError> {
    let file = ServiceFile::parse(source_name, definition)?;
    GrainGenerator::new()?.render(source_name, &file)
}
