//! Error types for the object model

use thiserror::Error;

use crate::value::{JsString, JsValue};

pub(crate) const INVALID_DESCRIPTOR: &str =
    "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute";

/// Main error type for the object model
#[derive(Debug, Error)]
pub enum JsError {
    #[error("SyntaxError: {message}")]
    SyntaxError { message: String },

    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("RangeError: {message}")]
    RangeError { message: String },

    /// A script value thrown out of a getter, setter or native callback
    #[error("Uncaught {value:?}")]
    Thrown { value: JsValue },

    #[error("ConfigError: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl JsError {
    pub fn syntax_error(message: impl Into<String>) -> Self {
        JsError::SyntaxError {
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::TypeError {
            message: message.into(),
        }
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        JsError::RangeError {
            message: message.into(),
        }
    }

    /// Wrap a value thrown by script code
    pub fn thrown(value: JsValue) -> Self {
        JsError::Thrown { value }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        JsError::Config {
            message: message.into(),
        }
    }

    /// Create an internal error for broken object-model invariants.
    /// These should never happen in correctly-written code
    pub fn internal_error(message: impl Into<String>) -> Self {
        JsError::Internal(message.into())
    }

    pub fn is_type_error(&self) -> bool {
        matches!(self, JsError::TypeError { .. })
    }

    /// The value a script `catch` clause would observe for this error
    pub fn to_value(&self) -> JsValue {
        match self {
            JsError::Thrown { value } => value.clone(),
            JsError::SyntaxError { message } => {
                JsValue::String(JsString::from(format!("SyntaxError: {}", message)))
            }
            JsError::TypeError { message } => {
                JsValue::String(JsString::from(format!("TypeError: {}", message)))
            }
            JsError::RangeError { message } => {
                JsValue::String(JsString::from(format!("RangeError: {}", message)))
            }
            JsError::Config { message } => {
                JsValue::String(JsString::from(format!("ConfigError: {}", message)))
            }
            JsError::Internal(msg) => {
                JsValue::String(JsString::from(format!("InternalError: {}", msg)))
            }
        }
    }
}
