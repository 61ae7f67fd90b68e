use reqwest::{Method, StatusCode};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::services::session_completion::CompletionProgress;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{method} {resource} returned {status}: {body}")]
    Http {
        status: StatusCode,
        method: Method,
        resource: String,
        body: String,
    },

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Lookup on {resource} failed: {source}")]
    Lookup {
        resource: &'static str,
        source: Box<StorageError>,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Partial write after {} committed step(s): {source}", .progress.committed_steps())]
    PartialWrite {
        progress: Box<CompletionProgress>,
        source: Box<StorageError>,
    },

    #[error("Workout session {0} is already completed")]
    AlreadyCompleted(i64),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn lookup(resource: &'static str, source: StorageError) -> Self {
        StorageError::Lookup {
            resource,
            source: Box::new(source),
        }
    }

    /// Transport failures and non-2xx responses.
    pub fn is_network(&self) -> bool {
        match self {
            StorageError::Network(_) | StorageError::Http { .. } => true,
            StorageError::Lookup { source, .. } | StorageError::PartialWrite { source, .. } => {
                source.is_network()
            }
            _ => false,
        }
    }

    /// PostgREST answers a unique constraint violation (23505) with 409.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Http { status, .. } if *status == StatusCode::CONFLICT
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }

    pub fn progress(&self) -> Option<&CompletionProgress> {
        match self {
            StorageError::PartialWrite { progress, .. } => Some(progress),
            _ => None,
        }
    }
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", path, message)
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_messages(&format!("{}[{}]", path, idx), inner, out);
                }
            }
        }
    }
}

impl From<ValidationErrors> for StorageError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_messages("", &errors, &mut messages);
        messages.sort();

        StorageError::Validation(messages.join("; "))
    }
}
