//! Console error types and the operation error normalizer.

use cursus_core::error::CoreError;

/// Errors from talking to the catalog API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status and its error body.
    #[error("API error ({status} {code}): {message}")]
    Status {
        status: u16,
        code: String,
        message: String,
        field: Option<String>,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Status { status: 403, .. })
            || matches!(self, Self::Status { code, .. } if code == "PERMISSION_DENIED")
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// What a page reports to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    /// Input rejected, attached to the offending field when known.
    #[error("{message}")]
    Invalid {
        field: Option<String>,
        message: String,
    },

    /// A backend operation failed; the message is ready to display.
    #[error("{0}")]
    Operation(String),

    /// Refused because the same action is already running.
    #[error("{0}")]
    Busy(String),
}

impl ConsoleError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Invalid { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

impl From<CoreError> for ConsoleError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidField { field, message } => Self::Invalid {
                field: Some(field.to_string()),
                message,
            },
            CoreError::Validation(message) => Self::Invalid {
                field: None,
                message,
            },
            other => Self::Operation(other.to_string()),
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Turn an API failure into a user-facing error for `operation`
/// (an infinitive phrase such as "créer l'année").
///
/// Permission refusals get their own message; field-scoped validation
/// failures stay attached to their field; anything else is reported as
/// "Impossible de {operation} : {detail}". The original error is logged.
pub fn normalize(operation: &str, err: ApiError) -> ConsoleError {
    tracing::warn!(operation, error = %err, "Console operation failed");

    if err.is_permission_denied() {
        return ConsoleError::Operation(format!(
            "Accès refusé : vous n'avez pas les droits nécessaires pour {operation}."
        ));
    }

    let detail = match err {
        ApiError::Status {
            status: 400,
            field: Some(field),
            message,
            ..
        } => {
            return ConsoleError::Invalid {
                field: Some(field),
                message,
            }
        }
        ApiError::Status { message, .. } => message,
        ApiError::Transport(_) => "le serveur est injoignable.".to_string(),
        ApiError::Decode(_) => "réponse inattendue du serveur.".to_string(),
    };
    ConsoleError::Operation(format!("Impossible de {operation} : {detail}"))
}
