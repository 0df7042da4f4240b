//! Canonical pagination types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One page of records, independent of the wire envelope it came in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records on this page, in server order
    pub items: Vec<T>,
    /// Total record count across all pages
    pub total: u64,
    /// 1-based page number
    pub page_index: u32,
    /// Requested page size
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Create new page
    #[inline]
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, page_index: u32, page_size: u32) -> Self {
        Self {
            items,
            total,
            page_index,
            page_size,
        }
    }

    /// Number of pages needed for `total` records
    #[inline]
    #[must_use]
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(u64::from(self.page_size))
        }
    }
}

/// Page request with free-form filters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageQuery {
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub page_size: u32,
    /// Filter name → value (status, projectId, sampleCode, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, String>,
}

impl PageQuery {
    /// Create new query
    #[inline]
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            filters: BTreeMap::new(),
        }
    }

    /// With filter
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Keep filters, move to another page
    #[inline]
    #[must_use]
    pub fn at(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}
