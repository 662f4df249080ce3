//! The module contains the error the engine returns.
//!
//! Every expected failure is carried as data: an [`EngineError`] with an
//! [`ErrorKind`], a dotted `code` (e.g. `Spending.CategoryNotFound`), a
//! human readable message and optional metadata.
//!
//! Results are plain [`Result`]s. [`Outcome`] adds the few combinators the
//! handlers lean on that `std` does not spell the same way.
use std::collections::BTreeMap;

use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity category of an [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Business,
    NotFound,
    Unauthorized,
    System,
    Conflict,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Business => "business",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::System => "system",
            Self::Conflict => "conflict",
        }
    }
}

/// Engine custom error.
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct EngineError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub metadata: BTreeMap<String, String>,
}

impl EngineError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, code, message)
    }

    pub fn business(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Business, code, message)
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, code, message)
    }

    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, code, message)
    }

    pub fn system(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::System, code, message)
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, code, message)
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.insert(key.into(), value.to_string());
        self
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        EngineError::system("Database.Error", err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::system("Serialization.Error", err.to_string())
    }
}

/// Result helpers used by the handlers.
pub trait Outcome<T> {
    /// Fold both branches into a single value.
    fn fold<U>(self, on_ok: impl FnOnce(T) -> U, on_err: impl FnOnce(EngineError) -> U) -> U;

    /// Run `f` on success and hand the result back untouched.
    fn on_success(self, f: impl FnOnce(&T)) -> Self;

    /// Run `f` on failure and hand the result back untouched.
    fn on_failure(self, f: impl FnOnce(&EngineError)) -> Self;
}

impl<T> Outcome<T> for Result<T, EngineError> {
    fn fold<U>(self, on_ok: impl FnOnce(T) -> U, on_err: impl FnOnce(EngineError) -> U) -> U {
        match self {
            Ok(value) => on_ok(value),
            Err(err) => on_err(err),
        }
    }

    fn on_success(self, f: impl FnOnce(&T)) -> Self {
        if let Ok(value) = &self {
            f(value);
        }
        self
    }

    fn on_failure(self, f: impl FnOnce(&EngineError)) -> Self {
        if let Err(err) = &self {
            f(err);
        }
        self
    }
}
