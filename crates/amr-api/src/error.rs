//! Error types for the remote adapters.

use thiserror::Error;

/// Errors raised while preparing requests or reading typed payloads.
///
/// Remote rejections are not errors here; they travel as failed
/// [`amr_core::ApiResponse`] values.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL is not an absolute http(s) URL.
    #[error("invalid base URL '{url}'")]
    InvalidBaseUrl {
        /// Offending value.
        url: String,
    },
    /// The configured TOTP secret is not valid base32.
    #[error("TOTP secret is not valid base32")]
    InvalidTotpSecret,
    /// A successful response carried a payload of the wrong shape.
    #[error("failed to decode {function} payload")]
    Decode {
        /// Remote call whose payload was read.
        function: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience alias for adapter results.
pub type ApiResult<T> = Result<T, ApiError>;

/// Trim trailing slashes and require an http(s) scheme.
pub(crate) fn normalise_base_url(url: &str) -> ApiResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let has_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if has_scheme {
        Ok(trimmed.to_string())
    } else {
        Err(ApiError::InvalidBaseUrl {
            url: url.to_string(),
        })
    }
}
