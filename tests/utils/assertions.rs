//! Test assertion helpers - fluent API for verifying responses
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::http::StatusCode;
use serde_json::Value;

use super::actions::TestResponse;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ResponseAssertion<'a> {
    response: &'a TestResponse,
}

impl<'a> ResponseAssertion<'a> {
    pub fn of(response: &'a TestResponse) -> Self {
        Self { response }
    }

    pub fn has_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status, expected,
            "unexpected status, body: {}",
            self.response.body
        );
        self
    }

    pub fn has_error(self, expected: &str) -> Self {
        assert_eq!(self.response.body["error"], expected);
        self
    }

    /// Asserts the body is a session and returns (accessToken, refreshToken)
    pub fn is_session(self, expected_expiry_ms: i64) -> (String, String) {
        let body = &self.response.body;
        assert_eq!(body["expiryDuration"], expected_expiry_ms);
        (
            string_field(body, "accessToken"),
            string_field(body, "refreshToken"),
        )
    }

    /// Asserts the page envelope fields and returns the record titles
    pub fn is_page(self, offset: i64, limit: i64, total_records: i64) -> Vec<String> {
        let body = &self.response.body;
        assert_eq!(body["offset"], offset, "offset mismatch");
        assert_eq!(body["limit"], limit, "limit mismatch");
        assert_eq!(body["totalRecords"], total_records, "totalRecords mismatch");

        let records = body["records"].as_array().expect("records should be an array");
        assert!(records.len() as i64 <= limit);
        records
            .iter()
            .map(|record| string_field(record, "title"))
            .collect()
    }
}

pub fn string_field(value: &Value, field: &str) -> String {
    value[field]
        .as_str()
        .unwrap_or_else(|| panic!("{} should be a string in {}", field, value))
        .to_string()
}
