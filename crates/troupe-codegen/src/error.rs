use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to parse service definition {source_name}: {source}")]
    Parse {
        source_name: String,
        source: toml::de::Error,
    },

    #[error("Template compilation failed: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Invalid service {service}: {reason}")]
    InvalidService { service: String, reason: String },
}

impl CodegenError {
    pub(crate) fn invalid(service: &str, reason: impl Into<String>) -> Self {
        Self::InvalidService {
            service: service.to_string(),
            reason: reason.into(),
        }
    }
}
