//! The uniform `{success, data, count, error, errorKind}` response wrapper.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Wire envelope used by every resource endpoint.
///
/// Internally handlers work with `Result<T, _>`; the envelope only exists at
/// the HTTP edge. The fallback client decodes responses with `into_result`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), count: None, error: None, error_kind: None }
    }

    pub fn err(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            count: None,
            error: Some(message.into()),
            error_kind: Some(kind),
        }
    }

    /// Success envelopes must carry data; failures must not claim success.
    pub fn into_result(self) -> Result<(T, Option<usize>), (Option<ErrorKind>, String)> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok((data, self.count)),
            (true, None) => Err((None, "success envelope without data".to_string())),
            (false, _) => Err((
                self.error_kind,
                self.error.unwrap_or_else(|| "request failed without error message".to_string()),
            )),
        }
    }
}

impl<T> Envelope<Vec<T>> {
    /// List envelope; `count` always equals `data.len()`.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self { success: true, data: Some(items), count: Some(count), error: None, error_kind: None }
    }
}
