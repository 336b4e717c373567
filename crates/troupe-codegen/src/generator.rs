use handlebars::Handlebars;
use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use serde::Serialize;
use tracing::debug;

use crate::descriptor::{MethodDescriptor, ServiceDefinition, ServiceFile};
use crate::error::CodegenError;

const GRAIN_TEMPLATE: &str = include_str!("../templates/grain.rs.hbs");
const GRAIN_TEMPLATE_NAME: &str = "grain";

/// Renders grain code for parsed service files.
pub struct GrainGenerator {
    handlebars: Handlebars<'static>,
}

impl GrainGenerator {
    pub fn new() -> Result<Self, CodegenError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        // Output is Rust, not HTML.
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string(GRAIN_TEMPLATE_NAME, GRAIN_TEMPLATE)?;
        Ok(Self { handlebars })
    }

    /// Renders `file`, or returns `None` when nothing in it needs dispatch
    /// code.
    pub fn render(&self, source_name: &str, file: &ServiceFile) -> Result<Option<String>, CodegenError> {
        if !file.has_dispatch_methods() {
            debug!("{} declares no dispatchable methods; nothing to generate", source_name);
            return Ok(None);
        }

        let context = FileContext {
            source: source_name.to_string(),
            imports: file.imports.clone(),
            services: file
                .services
                .iter()
                .filter(|service| {
                    let empty = service.dispatch_methods().is_empty();
                    if empty {
                        debug!("Service {} has no dispatchable methods; skipping", service.name);
                    }
                    !empty
                })
                .map(ServiceContext::from_definition)
                .collect(),
        };
        let rendered = self.handlebars.render(GRAIN_TEMPLATE_NAME, &context)?;
        Ok(Some(rendered))
    }
}

#[derive(Serialize)]
struct FileContext {
    source: String,
    imports: Vec<String>,
    services: Vec<ServiceContext>,
}

#[derive(Serialize)]
struct ServiceContext {
    name: String,
    kind: String,
    kind_const: String,
    kind_fn: String,
    trait_name: String,
    actor_name: String,
    client_name: String,
    methods: Vec<MethodContext>,
}

impl ServiceContext {
    fn from_definition(service: &ServiceDefinition) -> Self {
        let prefix = service.name.to_shouty_snake_case();
        let type_name = service.name.to_upper_camel_case();

        for method in service.methods.iter().filter(|m| m.is_streaming()) {
            debug!("Skipping streaming method {}.{}", service.name, method.name);
        }

        Self {
            name: service.name.clone(),
            kind: service.kind_name().to_string(),
            kind_const: format!("{}_KIND", prefix),
            kind_fn: format!("{}_kind", service.name.to_snake_case()),
            trait_name: format!("{}Grain", type_name),
            actor_name: format!("{}GrainActor", type_name),
            client_name: format!("{}GrainClient", type_name),
            methods: service
                .dispatch_methods()
                .iter()
                .map(|method| MethodContext::from_descriptor(&prefix, method))
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct MethodContext {
    name: String,
    fn_name: String,
    const_name: String,
    index: u32,
    input: String,
    output: String,
    reenterable: bool,
}

impl MethodContext {
    fn from_descriptor(prefix: &str, method: &MethodDescriptor) -> Self {
        Self {
            name: method.name.clone(),
            fn_name: method.name.to_snake_case(),
            const_name: format!("{}_{}", prefix, method.name.to_shouty_snake_case()),
            index: method.index,
            input: method.input_type.clone(),
            output: method.output_type.clone(),
            reenterable: method.reenterable,
        }
    }
}
