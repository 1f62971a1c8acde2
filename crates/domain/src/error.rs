use serde::{Deserialize, Serialize};

/// Shared error type used across all SupportDesk crates.
///
/// Provider adapters classify upstream failures into the typed variants
/// below so the router can decide on fallback by matching on the variant
/// instead of inspecting message text.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("{provider} is not configured: set the {env_var} environment variable")]
    NotConfigured { provider: String, env_var: String },

    #[error("provider {provider}: quota exceeded: {message}")]
    QuotaExceeded { provider: String, message: String },

    #[error("provider {provider}: invalid API key: {message}")]
    AuthInvalid { provider: String, message: String },

    #[error("provider {provider}: access denied: {message}")]
    AccessDenied { provider: String, message: String },

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("video generation error: {0}")]
    Video(String),

    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable failure category reported in a `ResponseResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotConfigured,
    QuotaExceeded,
    AuthInvalid,
    AccessDenied,
    ProviderGeneric,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotConfigured => "not_configured",
            ErrorKind::QuotaExceeded => "quota_exceeded",
            ErrorKind::AuthInvalid => "auth_invalid",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::ProviderGeneric => "provider_generic",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotConfigured { .. } | Error::Config(_) => ErrorKind::NotConfigured,
            Error::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Error::AuthInvalid { .. } => ErrorKind::AuthInvalid,
            Error::AccessDenied { .. } => ErrorKind::AccessDenied,
            Error::Io(_)
            | Error::Json(_)
            | Error::Http(_)
            | Error::Timeout(_)
            | Error::Provider { .. }
            | Error::Video(_) => ErrorKind::ProviderGeneric,
        }
    }

    /// Human-readable remediation hint for the failure category.
    pub fn hint(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "Enter a message and pick a model before sending.",
            ErrorKind::NotConfigured => {
                "Add the provider API key to your environment and restart the console."
            }
            ErrorKind::QuotaExceeded => {
                "The provider account is out of quota. Check billing or switch to another model."
            }
            ErrorKind::AuthInvalid => "The API key was rejected. Verify it is correct and active.",
            ErrorKind::AccessDenied => {
                "The API key does not have access to this model. Check the key's permissions."
            }
            ErrorKind::ProviderGeneric => {
                "The provider request failed. Try again or switch to a different model."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mapping_covers_provider_classes() {
        let quota = Error::QuotaExceeded {
            provider: "openai".into(),
            message: "HTTP 429".into(),
        };
        assert_eq!(quota.kind(), ErrorKind::QuotaExceeded);

        let auth = Error::AuthInvalid {
            provider: "openai".into(),
            message: "HTTP 401".into(),
        };
        assert_eq!(auth.kind(), ErrorKind::AuthInvalid);

        assert_eq!(Error::Timeout("slow".into()).kind(), ErrorKind::ProviderGeneric);
        assert_eq!(Error::Video("bad".into()).kind(), ErrorKind::ProviderGeneric);
        assert_eq!(Error::Validation("empty".into()).kind(), ErrorKind::Validation);
    }

    #[test]
    fn not_configured_names_env_var() {
        let err = Error::NotConfigured {
            provider: "openai".into(),
            env_var: "OPENAI_API_KEY".into(),
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
        assert_eq!(err.kind(), ErrorKind::NotConfigured);
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::QuotaExceeded).unwrap();
        assert_eq!(json, r#""quota_exceeded""#);
        assert_eq!(ErrorKind::ProviderGeneric.to_string(), "provider_generic");
    }

    #[test]
    fn every_kind_has_a_hint() {
        let errors = [
            Error::Validation("x".into()),
            Error::Config("x".into()),
            Error::Http("x".into()),
        ];
        for e in errors {
            assert!(!e.hint().is_empty());
        }
    }
}
