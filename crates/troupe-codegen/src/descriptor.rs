//! # Service Definitions
//!
//! A service file is a TOML document declaring one or more grain services:
//!
//! ```toml
//! imports = ["crate::messages::*"]
//!
//! [[service]]
//! name = "Worker"
//!
//! [[service.method]]
//! name = "InvokeService"
//! input = "InvokeRequest"
//! output = "InvokeResponse"
//! reenterable = true
//!
//! [[service.method]]
//! name = "DoWork"
//! input = "WorkRequest"
//! output = "WorkResponse"
//! ```
//!
//! Methods are numbered by their position in the file, streaming ones
//! included, and that number is what requests are routed by.

use std::collections::HashSet;

use heck::{ToShoutySnakeCase, ToSnakeCase};
use serde::{Deserialize, Serialize};

use crate::error::CodegenError;

/// Names the generated trait, adapter or client already use.
const RESERVED_METHOD_NAMES: &[&str] = &[
    "init",
    "terminate",
    "receive_default",
    "new",
    "with_options",
    "identity",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceFile {
    /// Paths emitted as `use` lines at the top of the generated file
    #[serde(default)]
    pub imports: Vec<String>,

    #[serde(default, rename = "service")]
    pub services: Vec<ServiceDefinition>,
}

impl ServiceFile {
    pub fn parse(source_name: &str, text: &str) -> Result<Self, CodegenError> {
        let file: ServiceFile = toml::from_str(text).map_err(|source| CodegenError::Parse {
            source_name: source_name.to_string(),
            source,
        })?;
        file.validate()?;
        Ok(file)
    }

    pub fn validate(&self) -> Result<(), CodegenError> {
        // Generated constants and functions are derived from this prefix.
        let mut prefixes = HashSet::new();
        for service in &self.services {
            service.validate()?;
            if !prefixes.insert(service.name.to_shouty_snake_case()) {
                return Err(CodegenError::invalid(&service.name, "declared more than once"));
            }
        }
        Ok(())
    }

    /// True when at least one service has a method to dispatch.
    pub fn has_dispatch_methods(&self) -> bool {
        self.services
            .iter()
            .any(|service| !service.dispatch_methods().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub name: String,

    /// Kind name grains of this service are registered under; defaults to
    /// the service name
    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default, rename = "method")]
    pub methods: Vec<MethodDefinition>,
}

impl ServiceDefinition {
    pub fn kind_name(&self) -> &str {
        self.kind.as_deref().unwrap_or(&self.name)
    }

    /// Non-streaming methods, each carrying its declared position.
    pub fn dispatch_methods(&self) -> Vec<MethodDescriptor> {
        self.methods
            .iter()
            .enumerate()
            .filter(|(_, method)| !method.is_streaming())
            .map(|(index, method)| MethodDescriptor {
                name: method.name.clone(),
                input_type: method.input.clone(),
                output_type: method.output.clone(),
                index: index as u32,
                reenterable: method.reenterable,
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), CodegenError> {
        if self.name.trim().is_empty() {
            return Err(CodegenError::invalid("<unnamed>", "service name is empty"));
        }
        if self.kind_name().trim().is_empty() {
            return Err(CodegenError::invalid(&self.name, "kind name is empty"));
        }

        let mut seen = HashSet::new();
        for method in &self.methods {
            if method.name.trim().is_empty() {
                return Err(CodegenError::invalid(&self.name, "method with empty name"));
            }
            if method.input.trim().is_empty() || method.output.trim().is_empty() {
                return Err(CodegenError::invalid(
                    &self.name,
                    format!("method {} is missing its input or output type", method.name),
                ));
            }
            let fn_name = method.name.to_snake_case();
            if RESERVED_METHOD_NAMES.contains(&fn_name.as_str()) {
                return Err(CodegenError::invalid(
                    &self.name,
                    format!("method name {} is reserved", method.name),
                ));
            }
            if !seen.insert(fn_name) {
                return Err(CodegenError::invalid(
                    &self.name,
                    format!("method {} is declared more than once", method.name),
                ));
            }
        }

        // A reenterable method also gets a `{name}_reentrant` client call.
        for method in self.dispatch_methods().iter().filter(|m| m.reenterable) {
            let reentrant = format!("{}_reentrant", method.name.to_snake_case());
            if seen.contains(&reentrant) {
                return Err(CodegenError::invalid(
                    &self.name,
                    format!("method {} clashes with the reentrant call of {}", reentrant, method.name),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub name: String,
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub reenterable: bool,
    #[serde(default)]
    pub client_streaming: bool,
    #[serde(default)]
    pub server_streaming: bool,
}

impl MethodDefinition {
    pub fn is_streaming(&self) -> bool {
        self.client_streaming || self.server_streaming
    }
}

/// A method that gets dispatch code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    /// Declared position of the method within its service
    pub index: u32,
    pub reenterable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CHAT: &str = r#"
        [[service]]
        name = "Chat"
        kind = "ChatRoom"

        [[service.method]]
        name = "Join"
        input = "JoinRequest"
        output = "JoinResponse"

        [[service.method]]
        name = "Watch"
        input = "WatchRequest"
        output = "ChatEvent"
        server_streaming = true

        [[service.method]]
        name = "Say"
        input = "SayRequest"
        output = "SayResponse"
        reenterable = true
    "#;

    #[test]
    fn streaming_methods_are_skipped_but_keep_numbering() {
        let file = ServiceFile::parse("chat.toml", CHAT).unwrap();
        let service = &file.services[0];

        assert_eq!(service.kind_name(), "ChatRoom");
        assert_eq!(
            service.dispatch_methods(),
            vec![
                MethodDescriptor {
                    name: "Join".into(),
                    input_type: "JoinRequest".into(),
                    output_type: "JoinResponse".into(),
                    index: 0,
                    reenterable: false,
                },
                MethodDescriptor {
                    name: "Say".into(),
                    input_type: "SayRequest".into(),
                    output_type: "SayResponse".into(),
                    index: 2,
                    reenterable: true,
                },
            ]
        );
    }

    #[test]
    fn kind_defaults_to_service_name() {
        let file = ServiceFile::parse(
            "hello.toml",
            r#"
            [[service]]
            name = "Hello"
            "#,
        )
        .unwrap();
        assert_eq!(file.services[0].kind_name(), "Hello");
        assert!(!file.has_dispatch_methods());
    }

    #[test]
    fn duplicate_method_names_are_rejected() {
        let result = ServiceFile::parse(
            "dup.toml",
            r#"
            [[service]]
            name = "Dup"

            [[service.method]]
            name = "DoWork"
            input = "A"
            output = "B"

            [[service.method]]
            name = "do_work"
            input = "A"
            output = "B"
            "#,
        );
        assert!(matches!(result, Err(CodegenError::InvalidService { .. })));
    }

    #[test]
    fn reserved_method_names_are_rejected() {
        let result = ServiceFile::parse(
            "reserved.toml",
            r#"
            [[service]]
            name = "Reserved"

            [[service.method]]
            name = "Init"
            input = "A"
            output = "B"
            "#,
        );
        assert!(matches!(result, Err(CodegenError::InvalidService { .. })));
    }

    #[test]
    fn method_shadowing_a_reentrant_call_is_rejected() {
        let result = ServiceFile::parse(
            "shadow.toml",
            r#"
            [[service]]
            name = "Shadow"

            [[service.method]]
            name = "Foo"
            input = "A"
            output = "B"
            reenterable = true

            [[service.method]]
            name = "FooReentrant"
            input = "A"
            output = "B"
            "#,
        );
        assert!(matches!(result, Err(CodegenError::InvalidService { .. })));
    }

    #[test]
    fn reentrant_suffix_without_reenterable_twin_is_allowed() {
        let file = ServiceFile::parse(
            "plain.toml",
            r#"
            [[service]]
            name = "Plain"

            [[service.method]]
            name = "Foo"
            input = "A"
            output = "B"

            [[service.method]]
            name = "FooReentrant"
            input = "A"
            output = "B"
            "#,
        )
        .unwrap();
        assert_eq!(file.services[0].dispatch_methods().len(), 2);
    }

    #[test]
    fn services_differing_only_in_case_are_rejected() {
        let result = ServiceFile::parse(
            "case.toml",
            r#"
            [[service]]
            name = "Foo"

            [[service]]
            name = "foo"
            "#,
        );
        assert!(matches!(result, Err(CodegenError::InvalidService { .. })));
    }

    #[test]
    fn missing_output_type_is_a_parse_error() {
        let result = ServiceFile::parse(
            "broken.toml",
            r#"
            [[service]]
            name = "Broken"

            [[service.method]]
            name = "DoWork"
            input = "A"
            "#,
        );
        assert!(matches!(result, Err(CodegenError::Parse { .. })));
    }

    #[test]
    fn empty_type_name_is_invalid() {
        let result = ServiceFile::parse(
            "empty.toml",
            r#"
            [[service]]
            name = "Empty"

            [[service.method]]
            name = "DoWork"
            input = ""
            output = "B"
            "#,
        );
        assert!(matches!(result, Err(CodegenError::InvalidService { .. })));
    }
}
