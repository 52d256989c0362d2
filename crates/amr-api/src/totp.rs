//! Time-based one-time passwords for Alist two-factor login.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::{ApiError, ApiResult};

const STEP_SECS: u64 = 30;
const DIGITS_MODULUS: u32 = 1_000_000;

/// Generator for 6-digit codes from a base32 shared secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totp {
    key: Vec<u8>,
}

impl Totp {
    /// Parse a base32 secret. Case, spaces, and `=` padding are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidTotpSecret`] for empty or malformed secrets.
    pub fn from_base32(secret: &str) -> ApiResult<Self> {
        let key = decode_base32(secret).ok_or(ApiError::InvalidTotpSecret)?;
        if key.is_empty() {
            return Err(ApiError::InvalidTotpSecret);
        }
        Ok(Self { key })
    }

    /// Code valid at `unix_secs`.
    #[must_use]
    pub fn code_at(&self, unix_secs: u64) -> String {
        let counter = unix_secs / STEP_SECS;
        let Ok(mut mac) = Hmac::<Sha1>::new_from_slice(&self.key) else {
            // HMAC accepts keys of any length.
            return String::new();
        };
        mac.update(&counter.to_be_bytes());
        let digest = mac.finalize().into_bytes();
        let offset = usize::from(digest[digest.len() - 1] & 0x0f);
        let truncated = u32::from_be_bytes([
            digest[offset] & 0x7f,
            digest[offset + 1],
            digest[offset + 2],
            digest[offset + 3],
        ]);
        format!("{:06}", truncated % DIGITS_MODULUS)
    }

    /// Code valid now.
    #[must_use]
    pub fn now(&self) -> String {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        self.code_at(secs)
    }
}

/// Current code for an optional secret; an empty secret yields an empty code.
///
/// # Errors
///
/// Returns [`ApiError::InvalidTotpSecret`] when a non-empty secret is malformed.
pub fn current_code(secret: &str) -> ApiResult<String> {
    if secret.trim().is_empty() {
        return Ok(String::new());
    }
    Ok(Totp::from_base32(secret)?.now())
}

/// Whether `secret` decodes as base32.
#[must_use]
pub fn is_valid_secret(secret: &str) -> bool {
    Totp::from_base32(secret).is_ok()
}

fn decode_base32(input: &str) -> Option<Vec<u8>> {
    let mut output = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    for ch in input.chars().filter(|ch| !ch.is_whitespace() && *ch != '=') {
        let value = match ch.to_ascii_uppercase() {
            upper @ 'A'..='Z' => u32::from(upper) - u32::from('A'),
            digit @ '2'..='7' => u32::from(digit) - u32::from('2') + 26,
            _ => return None,
        };
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            output.push(u8::try_from((buffer >> bits) & 0xff).ok()?);
        }
        buffer &= (1 << bits) - 1;
    }
    Some(output)
}
