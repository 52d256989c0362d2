//! Shared serde helpers for provider payloads.

use amr_core::ApiResponse;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::{ApiError, ApiResult};

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decode the payload of a response produced by `function`.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] when the payload does not match `T`.
pub fn payload<T: DeserializeOwned>(response: &ApiResponse, function: &'static str) -> ApiResult<T> {
    response
        .data_as()
        .map_err(|source| ApiError::Decode { function, source })
}
