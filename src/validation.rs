//! Field rules checked before a command touches the store.

use serde::Serialize;
use serde_json::Value;

pub const NAME_MAX: usize = 100;
pub const TITLE_MAX: usize = 100;
pub const AUTHOR_MAX: usize = 100;
pub const GENRE_MAX: usize = 50;
pub const ISBN_MAX: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: String,
}

/// Every rule a request broke, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|err| err.field)
    }

    /// `[{"field": .., "error": ..}]` for the error envelope.
    pub fn to_details(&self) -> Vec<Value> {
        self.0
            .iter()
            .map(|err| serde_json::json!({ "field": err.field, "error": err.error }))
            .collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for err in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.field, err.error)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Collects rule failures for one request.
#[derive(Debug, Default)]
pub struct Rules {
    errors: Vec<FieldError>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &'static str, error: String) {
        self.errors.push(FieldError { field, error });
    }

    pub fn not_empty(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, "must not be empty".to_string());
        }
        self
    }

    /// Length in characters, not bytes.
    pub fn max_length(&mut self, field: &'static str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.fail(field, format!("must be at most {max} characters"));
        }
        self
    }

    pub fn positive(&mut self, field: &'static str, value: u64) -> &mut Self {
        if value == 0 {
            self.fail(field, "must be greater than 0".to_string());
        }
        self
    }

    /// `not_empty` plus `max_length`, the common text field rule.
    pub fn text(&mut self, field: &'static str, value: &str, max: usize) -> &mut Self {
        self.not_empty(field, value).max_length(field, value, max)
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(std::mem::take(&mut self.errors)))
        }
    }
}

/// Implemented by every command; handlers call it before opening a session.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}
