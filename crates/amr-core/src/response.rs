//! Normalised outcome of a remote call.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status code recorded when the remote could not be reached at all.
pub const TRANSPORT_FAILURE_STATUS: i64 = -1;

const UNKNOWN_ERROR: &str = "unknown error";

/// Outcome of one remote call.
///
/// A successful response always carries an empty error; a failed one always
/// carries a non-empty message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    success: bool,
    status_code: i64,
    error: String,
    data: Value,
}

impl ApiResponse {
    /// Successful response carrying `data`.
    #[must_use]
    pub fn success(status_code: i64, data: Value) -> Self {
        Self {
            success: true,
            status_code,
            error: String::new(),
            data: normalise_data(data),
        }
    }

    /// Remote rejection with the provider's own status and message.
    #[must_use]
    pub fn failure(status_code: i64, error: impl Into<String>, data: Value) -> Self {
        let error = error.into();
        Self {
            success: false,
            status_code,
            error: if error.trim().is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                error
            },
            data: normalise_data(data),
        }
    }

    /// The request never produced a usable response.
    #[must_use]
    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self::failure(TRANSPORT_FAILURE_STATUS, error, Value::Null)
    }

    /// Whether the call succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Remote status code, or `-1` for transport failures.
    #[must_use]
    pub const fn status_code(&self) -> i64 {
        self.status_code
    }

    /// Error message; empty on success.
    #[must_use]
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Raw payload. Missing payloads are an empty object.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Deserialize the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the payload does not match `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}

fn normalise_data(data: Value) -> Value {
    if data.is_null() {
        Value::Object(Map::new())
    } else {
        data
    }
}
