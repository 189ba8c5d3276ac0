use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::common::Document;

/// Payload returned when a lookup misses: the id that was asked for (when
/// one was given) and a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFoundById {
    pub id: Option<String>,
    pub errors: String,
}

impl NotFoundById {
    pub fn new(id: impl Into<String>, errors: impl Into<String>) -> Self {
        NotFoundById {
            id: Some(id.into()),
            errors: errors.into(),
        }
    }

    pub fn anonymous(errors: impl Into<String>) -> Self {
        NotFoundById {
            id: None,
            errors: errors.into(),
        }
    }
}

/// Domain result of a single operation. `NotFound` and `Invalid` are
/// expected business outcomes the caller renders to the client; infrastructure
/// failures travel separately as `anyhow::Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    NotFound(NotFoundById),
    Invalid(String),
}

impl<T> Outcome<T> {
    pub fn not_found(id: impl Into<String>, errors: impl Into<String>) -> Self {
        Outcome::NotFound(NotFoundById::new(id, errors))
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Ok(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::NotFound(nf) => Outcome::NotFound(nf),
            Outcome::Invalid(msg) => Outcome::Invalid(msg),
        }
    }

}

/// Unwraps the `Ok` arm of an [`Outcome`] or early-returns the failure arm
/// from a `Result<Outcome<_>>`-returning function.
#[macro_export]
macro_rules! try_outcome {
    ($expr:expr) => {
        match $expr {
            $crate::model::Outcome::Ok(value) => value,
            $crate::model::Outcome::NotFound(nf) => {
                return Ok($crate::model::Outcome::NotFound(nf))
            }
            $crate::model::Outcome::Invalid(msg) => {
                return Ok($crate::model::Outcome::Invalid(msg))
            }
        }
    };
}

impl Outcome<Document> {
    /// Deserializes the document arm into a typed model.
    pub fn parse<T: DeserializeOwned>(self) -> Result<Outcome<T>> {
        Ok(match self {
            Outcome::Ok(doc) => {
                Outcome::Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
            }
            Outcome::NotFound(nf) => Outcome::NotFound(nf),
            Outcome::Invalid(msg) => Outcome::Invalid(msg),
        })
    }
}
