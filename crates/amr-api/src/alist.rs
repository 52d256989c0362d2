//! Alist filesystem provider: login, listing, and rename.

use amr_core::{ApiResponse, Folder, RemoteEntry, RenameTask, sanitize_name};
use amr_tasks::ApiTask;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{ApiResult, normalise_base_url};
use crate::wire::{null_as_default, payload};

const SUCCESS_MESSAGE: &str = "success";
const EMPTY_FOLDER_MESSAGES: [&str; 2] = ["folder is empty", "folder empty"];

/// Payload of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginData {
    /// Session token sent as the `Authorization` header.
    pub token: String,
}

/// Payload of a directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListData {
    /// Entries of the directory; `null` for empty folders.
    #[serde(deserialize_with = "null_as_default")]
    pub content: Vec<RemoteEntry>,
    /// Entry count reported by the provider.
    #[serde(deserialize_with = "null_as_default")]
    pub total: u64,
}

/// Builds Alist requests as unsent tasks.
///
/// The session token obtained from [`AlistClient::authenticate`] is captured
/// by every task built afterwards. Guest sessions never authenticate and send
/// no `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlistClient {
    base_url: String,
    token: Option<String>,
}

impl AlistClient {
    /// Client for the Alist site at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`](crate::ApiError::InvalidBaseUrl) unless `url` is an http(s) URL.
    pub fn new(url: &str) -> ApiResult<Self> {
        Ok(Self {
            base_url: normalise_base_url(url)?,
            token: None,
        })
    }

    /// Site root without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current session token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Password login. `otp_code` is empty when two-factor login is off.
    #[must_use]
    pub fn login(&self, username: &str, password: &str, otp_code: &str) -> ApiTask {
        let url = self.endpoint("/api/auth/login");
        let body = json!({
            "username": username,
            "password": password,
            "otp_code": otp_code,
        });
        ApiTask::new(
            "alist.login",
            move |client| client.post(&url).json(&body),
            parse_alist,
        )
        .argument("username", username)
        .secret_argument("password", password)
        .secret_argument("otp_code", otp_code)
        .raise_error(true)
    }

    /// Store the token carried by a successful login response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`](crate::ApiError::Decode) when the payload has no usable token.
    pub fn authenticate(&mut self, response: &ApiResponse) -> ApiResult<()> {
        let data: LoginData = payload(response, "alist.login")?;
        debug!(base_url = %self.base_url, "alist session established");
        self.token = Some(data.token);
        Ok(())
    }

    /// List `folder`. `refresh` asks the provider to bypass its cache.
    #[must_use]
    pub fn list(&self, folder: &Folder, password: &str, refresh: bool) -> ApiTask {
        let url = self.endpoint("/api/fs/list");
        let token = self.token.clone();
        let body = json!({
            "path": folder.as_str(),
            "password": password,
            "page": 1,
            "per_page": 0,
            "refresh": refresh,
        });
        ApiTask::new(
            "alist.list",
            move |client| {
                let request = client.post(&url).json(&body);
                match &token {
                    Some(token) => request.header(AUTHORIZATION, token.as_str()),
                    None => request,
                }
            },
            parse_alist_list,
        )
        .argument("path", folder)
        .secret_argument("password", password)
        .argument("refresh", refresh)
        .raise_error(true)
    }

    /// Rename the object at `path` to `name`. The name is sanitized again
    /// before sending.
    #[must_use]
    pub fn rename(&self, name: &str, path: &str) -> ApiTask {
        let url = self.endpoint("/api/fs/rename");
        let token = self.token.clone();
        let name = sanitize_name(name);
        let body = json!({ "name": name, "path": path });
        ApiTask::new(
            "alist.rename",
            move |client| {
                let request = client.post(&url).json(&body);
                match &token {
                    Some(token) => request.header(AUTHORIZATION, token.as_str()),
                    None => request,
                }
            },
            parse_alist,
        )
        .argument("name", &name)
        .argument("path", path)
    }

    /// Rename task for a reconciled pairing.
    #[must_use]
    pub fn rename_task(&self, task: &RenameTask) -> ApiTask {
        self.rename(task.target_name(), &task.full_path())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Entries of a successful listing response.
///
/// # Errors
///
/// Returns [`ApiError::Decode`](crate::ApiError::Decode) when the payload is not a listing.
pub fn list_entries(response: &ApiResponse) -> ApiResult<Vec<RemoteEntry>> {
    payload::<ListData>(response, "alist.list").map(|data| data.content)
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

/// Parse the `{code, message, data}` envelope every Alist endpoint returns.
#[must_use]
pub fn parse_alist(status: StatusCode, body: &[u8]) -> ApiResponse {
    match serde_json::from_slice::<Envelope>(body) {
        Ok(envelope) if envelope.message == SUCCESS_MESSAGE => {
            ApiResponse::success(envelope.code, envelope.data)
        }
        Ok(envelope) => ApiResponse::failure(envelope.code, envelope.message, envelope.data),
        Err(_) => ApiResponse::failure(
            i64::from(status.as_u16()),
            format!("alist site returned an unreadable reply (HTTP {status})"),
            Value::Null,
        ),
    }
}

/// Like [`parse_alist`], with empty-folder rejections turned into empty
/// listings.
#[must_use]
pub fn parse_alist_list(status: StatusCode, body: &[u8]) -> ApiResponse {
    let response = parse_alist(status, body);
    let empty = !response.is_success()
        && EMPTY_FOLDER_MESSAGES
            .iter()
            .any(|message| response.error().eq_ignore_ascii_case(message));
    if empty {
        ApiResponse::success(200, json!({ "content": [], "total": 0 }))
    } else {
        response
    }
}
