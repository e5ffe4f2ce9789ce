//! Error taxonomy for the API client
//!
//! Server failures are classified by HTTP status into one of six variants,
//! each carrying an [`ApiError`]. Precondition failures (missing identifiers,
//! scope mismatches, mutually exclusive fields) are unit variants raised
//! before any request is made.

use std::fmt;

use thiserror::Error;

use crate::api::container::ResourceLevel;
use crate::api::response::ResponseInfo;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure reported by a [`Transport`](crate::api::transport::Transport)
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("context canceled")]
    Canceled,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Middleware(anyhow::Error),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl From<reqwest_middleware::Error> for TransportError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => TransportError::Http(e),
            reqwest_middleware::Error::Middleware(e) => TransportError::Middleware(e),
        }
    }
}

/// Classification of a failed API call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Request,
    Authentication,
    Authorization,
    NotFound,
    RateLimit,
    Service,
}

impl ErrorKind {
    /// Map an HTTP status to its error class. Statuses below 400 only reach
    /// this path for `success: false` envelopes and count as request errors.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Authentication,
            403 => ErrorKind::Authorization,
            404 => ErrorKind::NotFound,
            429 => ErrorKind::RateLimit,
            500..=599 => ErrorKind::Service,
            _ => ErrorKind::Request,
        }
    }
}

/// Details of an error returned by the API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub error_codes: Vec<i64>,
    pub error_messages: Vec<String>,
    pub ray_id: Option<String>,
    pub messages: Vec<String>,
    pub errors: Vec<ResponseInfo>,
}

impl ApiError {
    pub fn new(
        status: u16,
        errors: Vec<ResponseInfo>,
        messages: &[ResponseInfo],
        ray_id: Option<String>,
    ) -> Self {
        Self {
            status,
            error_codes: errors.iter().map(|e| e.code).collect(),
            error_messages: errors.iter().map(|e| e.message.clone()).collect(),
            ray_id,
            messages: messages.iter().map(|m| m.message.clone()).collect(),
            errors,
        }
    }

    /// Error built from a bare message, with no status or code attached
    pub fn from_message(message: impl Into<String>) -> Self {
        Self::new(
            0,
            vec![ResponseInfo {
                code: 0,
                message: message.into(),
            }],
            &[],
            None,
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .errors
            .iter()
            .map(|e| {
                if e.code == 0 {
                    e.message.clone()
                } else {
                    format!("{} ({})", e.message, e.code)
                }
            })
            .collect();

        if rendered.is_empty() {
            write!(f, "HTTP status {}", self.status)?;
        } else {
            f.write_str(&rendered.join(", "))?;
        }

        for message in &self.messages {
            write!(f, "\n{}", message)?;
        }
        Ok(())
    }
}

/// Errors produced by the client
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Request(ApiError),

    #[error("{0}")]
    Authentication(ApiError),

    #[error("{0}")]
    Authorization(ApiError),

    #[error("{0}")]
    NotFound(ApiError),

    #[error("{0}")]
    RateLimit(ApiError),

    #[error("{0}")]
    Service(ApiError),

    #[error("request error: {0}")]
    Transport(#[source] TransportError),

    #[error("error marshalling params to JSON: {0}")]
    Marshal(#[source] serde_json::Error),

    #[error("error unmarshalling the JSON response: {source}: {body}")]
    Unmarshal {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("operation aborted during backoff: {0}")]
    BulkOperationAborted(String),

    #[error("bulk operation did not finish before timeout")]
    BulkOperationTimeout,

    #[error("missing account id")]
    MissingAccountId,

    #[error("missing zone id")]
    MissingZoneId,

    #[error("requested resource container is not supported for this endpoint (got {level})")]
    UnsupportedContainer { level: ResourceLevel },

    #[error("{0} cannot be empty")]
    MissingResourceId(&'static str),

    #[error("missing list id")]
    MissingListId,

    #[error("missing domain")]
    MissingDomain,

    #[error("missing hostname")]
    MissingHostname,

    #[error("missing rule id")]
    MissingRuleId,

    #[error("missing database id")]
    MissingDatabaseId,

    #[error("missing project name")]
    MissingProjectName,

    #[error("missing service")]
    MissingService,

    #[error("missing environment")]
    MissingEnvironment,

    #[error("missing TLS setting name")]
    MissingTlsSettingName,

    #[error("account members cannot have both roles and policies")]
    RolesAndPoliciesMutuallyExclusive,

    #[error("api keys and tokens are mutually exclusive")]
    ApiKeysAndTokensMutuallyExclusive,

    #[error("no credentials configured: set an API token, an API key and email, or a user service key")]
    MissingCredentials,

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

impl Error {
    /// Build the classified variant for `kind`.
    pub fn api(kind: ErrorKind, error: ApiError) -> Self {
        match kind {
            ErrorKind::Request => Error::Request(error),
            ErrorKind::Authentication => Error::Authentication(error),
            ErrorKind::Authorization => Error::Authorization(error),
            ErrorKind::NotFound => Error::NotFound(error),
            ErrorKind::RateLimit => Error::RateLimit(error),
            ErrorKind::Service => Error::Service(error),
        }
    }

    /// Classify an HTTP failure by status.
    pub fn from_status(status: u16, error: ApiError) -> Self {
        Self::api(ErrorKind::from_status(status), error)
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Request(_) => Some(ErrorKind::Request),
            Error::Authentication(_) => Some(ErrorKind::Authentication),
            Error::Authorization(_) => Some(ErrorKind::Authorization),
            Error::NotFound(_) => Some(ErrorKind::NotFound),
            Error::RateLimit(_) => Some(ErrorKind::RateLimit),
            Error::Service(_) => Some(ErrorKind::Service),
            _ => None,
        }
    }

    /// Server error details, for the classified variants
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Request(e)
            | Error::Authentication(e)
            | Error::Authorization(e)
            | Error::NotFound(e)
            | Error::RateLimit(e)
            | Error::Service(e) => Some(e),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|e| e.status)
    }

    pub fn ray_id(&self) -> Option<&str> {
        self.api_error().and_then(|e| e.ray_id.as_deref())
    }

    pub fn error_codes(&self) -> &[i64] {
        self.api_error().map(|e| e.error_codes.as_slice()).unwrap_or_default()
    }

    pub fn error_messages(&self) -> &[String] {
        self.api_error()
            .map(|e| e.error_messages.as_slice())
            .unwrap_or_default()
    }

    /// 400 <= status < 500
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimit(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Whether the server reported internal error `code`.
    pub fn internal_error_code_is(&self, code: i64) -> bool {
        self.error_codes().contains(&code)
    }

    /// Whether any server error message contains `needle`.
    pub fn error_message_contains(&self, needle: &str) -> bool {
        self.error_messages().iter().any(|m| m.contains(needle))
    }

    /// True for errors raised locally before any request was made.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::MissingAccountId
                | Error::MissingZoneId
                | Error::UnsupportedContainer { .. }
                | Error::MissingResourceId(_)
                | Error::MissingListId
                | Error::MissingDomain
                | Error::MissingHostname
                | Error::MissingRuleId
                | Error::MissingDatabaseId
                | Error::MissingProjectName
                | Error::MissingService
                | Error::MissingEnvironment
                | Error::MissingTlsSettingName
                | Error::RolesAndPoliciesMutuallyExclusive
        )
    }
}
