use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;
use crate::shared::AppError;

/// Bounded offset/limit window handed to repositories
///
/// Only constructible through [`PageRequest::new`], so `limit` is always in
/// `1..=max_limit` and `offset` is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    offset: i64,
    limit: i64,
}

impl PageRequest {
    /// Validates raw query values, applying the default limit and capping at the maximum
    pub fn new(
        offset: Option<i64>,
        limit: Option<i64>,
        config: &PaginationConfig,
    ) -> Result<Self, AppError> {
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::Validation(format!(
                "offset must be zero or greater, got {offset}"
            )));
        }

        let limit = limit.unwrap_or(config.default_limit);
        if limit <= 0 {
            return Err(AppError::Validation(format!(
                "limit must be greater than zero, got {limit}"
            )));
        }

        Ok(Self {
            offset,
            limit: limit.min(config.max_limit),
        })
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Applies the window to an already ordered slice
    pub fn window<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

/// Response envelope for list endpoints
///
/// `total_records` is counted separately from the page query, so under
/// concurrent writes it may not match the records exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub records: Vec<T>,
    pub offset: i64,
    pub limit: i64,
    pub total_records: i64,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, request: PageRequest, total_records: i64) -> Self {
        Self {
            records,
            offset: request.offset(),
            limit: request.limit(),
            total_records,
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            records: self.records.into_iter().map(f).collect(),
            offset: self.offset,
            limit: self.limit,
            total_records: self.total_records,
        }
    }
}
