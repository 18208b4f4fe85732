//! Request validation: nested validator results, their flat form, and the 422 they raise.

pub mod extractor;

pub use extractor::ValidatedJson;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::errors::HttpException;

/// Validation result for one property, possibly with nested children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub property: String,
    /// (constraint name, message) pairs in the order they were checked
    pub constraints: Vec<(String, String)>,
    pub children: Vec<ValidationError>,
}

impl ValidationError {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            constraints: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn constraint(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.constraints.push((name.into(), message.into()));
        self
    }

    pub fn child(mut self, child: ValidationError) -> Self {
        self.children.push(child);
        self
    }
}

/// One failed constraint on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Dotted path of the field, e.g. `address.city`
    pub field: String,
    /// Name of the failed constraint
    pub constraint: String,
    /// Human-readable message
    pub message: String,
}

/// Flatten nested results depth first, parents before children
pub fn flatten_validation_errors(errors: &[ValidationError]) -> Vec<FieldError> {
    let mut flat = Vec::new();
    for error in errors {
        flatten_into(error, None, &mut flat);
    }
    flat
}

fn flatten_into(error: &ValidationError, parent: Option<&str>, flat: &mut Vec<FieldError>) {
    let field = match parent {
        Some(parent) => format!("{}.{}", parent, error.property),
        None => error.property.clone(),
    };

    for (constraint, message) in &error.constraints {
        flat.push(FieldError {
            field: field.clone(),
            constraint: constraint.clone(),
            message: message.clone(),
        });
    }

    for child in &error.children {
        flatten_into(child, Some(&field), flat);
    }
}

/// The 422 raised when a request body fails validation
pub fn validation_exception(errors: &[ValidationError]) -> HttpException {
    let status = StatusCode::UNPROCESSABLE_ENTITY;
    let flat = flatten_validation_errors(errors);
    let messages: Vec<&str> = flat.iter().map(|e| e.message.as_str()).collect();

    HttpException::unprocessable_entity(json!({
        "statusCode": status.as_u16(),
        "message": messages,
        "error": status.canonical_reason(),
        "errors": flat,
    }))
}

/// Implemented by request bodies accepted through [`ValidatedJson`]
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

/// Collects failed checks property by property
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` under `property` unless `passed` holds
    pub fn check(
        &mut self,
        property: &str,
        passed: bool,
        constraint: &str,
        message: impl Into<String>,
    ) -> &mut Self {
        if passed {
            return self;
        }

        match self.errors.iter_mut().find(|e| e.property == property) {
            Some(existing) => existing
                .constraints
                .push((constraint.to_string(), message.into())),
            None => self
                .errors
                .push(ValidationError::new(property).constraint(constraint, message)),
        }
        self
    }

    /// Attach the failures of a nested object under `property`
    pub fn nested(&mut self, property: &str, result: Result<(), Vec<ValidationError>>) -> &mut Self {
        if let Err(children) = result {
            let mut parent = ValidationError::new(property);
            parent.children = children;
            self.errors.push(parent);
        }
        self
    }

    pub fn finish(self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
