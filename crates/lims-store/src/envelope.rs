//! Wire envelopes and their translation into canonical types

use crate::error::{ApiError, CODE_OK};
use chrono::NaiveDateTime;
use lims_model::Page;
use serde::{Deserialize, Serialize};

/// Common response envelope: `{code, message, data, timestamp}`
///
/// A non-200 `code` is a failure whatever the HTTP status was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Application status code
    pub code: i32,
    /// Human-readable status
    #[serde(default)]
    pub message: String,
    /// Payload
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Server local time, `2026-02-25T16:30:00`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            code: CODE_OK,
            message: "success".to_string(),
            data: Some(data),
            timestamp: None,
        }
    }

    /// Failed envelope
    #[must_use]
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            timestamp: None,
        }
    }

    /// Payload of a successful envelope, which may be empty
    ///
    /// # Errors
    /// [`ApiError::Unauthorized`] or [`ApiError::Backend`] for non-200 codes.
    pub fn into_data(self) -> Result<Option<T>, ApiError> {
        if self.code == CODE_OK {
            Ok(self.data)
        } else {
            Err(ApiError::from_code(self.code, self.message))
        }
    }

    /// Payload of a successful envelope
    ///
    /// # Errors
    /// As [`into_data`](Self::into_data), plus [`ApiError::Decode`] when the
    /// payload is missing.
    pub fn into_result(self) -> Result<T, ApiError> {
        self.into_data()?
            .ok_or_else(|| ApiError::Decode("successful response has no data".to_string()))
    }
}

/// Page envelope with 1-based `current`: `{records, total, current, size}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsPage<T> {
    /// Records on the page
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
    /// Total record count
    #[serde(default)]
    pub total: u64,
    /// 1-based page number
    pub current: u32,
    /// Page size
    pub size: u32,
}

impl<T> From<RecordsPage<T>> for Page<T> {
    fn from(page: RecordsPage<T>) -> Self {
        Page::new(page.records, page.total, page.current, page.size)
    }
}

/// Page envelope with 0-based `number`: `{content, totalElements, number, size?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPage<T> {
    /// Records on the page
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    /// Total record count
    #[serde(default)]
    pub total_elements: u64,
    /// 0-based page number
    #[serde(default)]
    pub number: u32,
    /// Page size, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl<T> ContentPage<T> {
    /// Canonical page; `requested_size` fills in a missing `size`
    #[must_use]
    pub fn into_page(self, requested_size: u32) -> Page<T> {
        Page::new(
            self.content,
            self.total_elements,
            self.number + 1,
            self.size.unwrap_or(requested_size),
        )
    }
}
