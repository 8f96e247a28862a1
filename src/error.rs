use serde::Serialize;

use crate::models::operation::MutationKind;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{}", .detail.as_deref().unwrap_or("resource not found or in conflict"))]
    NotFoundOrConflict { status: u16, detail: Option<String> },

    #[error("Service error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Service { status: u16, detail: Option<String> },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("A {kind} operation is already in progress for '{path}'")]
    OperationPending { kind: MutationKind, path: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Classifies a non-2xx response. `detail` is the server's `{detail}` field, if any.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        match status {
            404 | 409 => Self::NotFoundOrConflict { status, detail },
            _ => Self::Service { status, detail },
        }
    }

    /// Text shown to the user: the server detail when present, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::OperationPending { .. } => self.to_string(),
            Self::NotFoundOrConflict {
                detail: Some(detail),
                ..
            }
            | Self::Service {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Transport(format!("malformed response: {error}"))
        } else {
            Self::Transport(error.to_string())
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_conflict_share_a_variant() {
        assert!(matches!(
            AppError::from_status(404, None),
            AppError::NotFoundOrConflict { status: 404, .. }
        ));
        assert!(matches!(
            AppError::from_status(409, None),
            AppError::NotFoundOrConflict { status: 409, .. }
        ));
        assert!(matches!(
            AppError::from_status(500, None),
            AppError::Service { status: 500, .. }
        ));
    }

    #[test]
    fn user_message_prefers_server_detail() {
        let err = AppError::from_status(400, Some("Folder already exists".to_string()));
        assert_eq!(err.user_message("Failed to create folder"), "Folder already exists");
    }

    #[test]
    fn user_message_falls_back_without_detail() {
        let err = AppError::from_status(500, None);
        assert_eq!(err.user_message("Failed to delete item"), "Failed to delete item");

        let err = AppError::Transport("connection refused".to_string());
        assert_eq!(err.user_message("Failed to load files"), "Failed to load files");
    }

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = AppError::Validation("Folder name cannot be empty".to_string());
        assert_eq!(err.user_message("ignored"), "Folder name cannot be empty");
        assert!(err.is_validation());
    }

    #[test]
    fn serializes_as_display_string() {
        let err = AppError::from_status(404, Some("Path not found: x".to_string()));
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Path not found: x\"");
    }
}
