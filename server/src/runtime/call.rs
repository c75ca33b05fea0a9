//! Call decoding — turns `tx:submit` parameters into typed runtime calls.
//!
//! The UI hands parameters over exactly as typed into its forms, so numbers
//! usually arrive as decimal strings and actions as free text. Decoding is
//! where those are checked; the components themselves never validate.

use frames::Action;
use frames::chain::{PALLET, callable};
use serde_json::Value;

use super::RecordId;

/// A decoded storagechain extrinsic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Store { val_to_add: u32, action: Option<Action> },
    ChangeAction { storage_id: RecordId, new_action: Option<Action> },
    Execute { storage_id: RecordId, action: Option<Action> },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("unknown pallet `{0}`")]
    UnknownPallet(String),
    #[error("unknown callable `{0}`")]
    UnknownCallable(String),
    #[error("{callable} expects {expected} parameters, got {got}")]
    ParamCount { callable: &'static str, expected: usize, got: usize },
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("value is below the storage minimum")]
    NegativeNumber,
    #[error("unknown action `{0}`")]
    InvalidActionType(String),
}

impl crate::frame::ErrorCode for CallError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownPallet(_) | Self::UnknownCallable(_) => "E_UNKNOWN_CALL",
            Self::ParamCount { .. } | Self::InvalidParameter { .. } => "E_INVALID_PARAMS",
            Self::NegativeNumber => "storagechain.NegativeNumber",
            Self::InvalidActionType(_) => "storagechain.InvalidActionType",
        }
    }
}

impl Call {
    /// Decode `pallet.callable(params...)`.
    ///
    /// # Errors
    ///
    /// Returns a [`CallError`] when the call is unknown or a parameter
    /// cannot be encoded as the runtime type.
    pub fn decode(pallet: &str, name: &str, params: &[Value]) -> Result<Self, CallError> {
        if pallet != PALLET {
            return Err(CallError::UnknownPallet(pallet.to_owned()));
        }

        match name {
            callable::STORE => {
                expect_params(callable::STORE, params, 2)?;
                Ok(Self::Store { val_to_add: decode_u32("val_to_add", &params[0])?, action: decode_action(&params[1])? })
            }
            callable::CHANGE_ACTION => {
                expect_params(callable::CHANGE_ACTION, params, 2)?;
                Ok(Self::ChangeAction {
                    storage_id: decode_id("storage_id", &params[0])?,
                    new_action: decode_action(&params[1])?,
                })
            }
            callable::EXECUTE => {
                expect_params(callable::EXECUTE, params, 2)?;
                Ok(Self::Execute { storage_id: decode_id("storage_id", &params[0])?, action: decode_action(&params[1])? })
            }
            callable::CLEAR => {
                expect_params(callable::CLEAR, params, 0)?;
                Ok(Self::Clear)
            }
            other => Err(CallError::UnknownCallable(other.to_owned())),
        }
    }

    /// `pallet.callable` label used in logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Store { .. } => "storagechain.store",
            Self::ChangeAction { .. } => "storagechain.changeAction",
            Self::Execute { .. } => "storagechain.execute",
            Self::Clear => "storagechain.clear",
        }
    }
}

fn expect_params(callable: &'static str, params: &[Value], expected: usize) -> Result<(), CallError> {
    if params.len() == expected {
        Ok(())
    } else {
        Err(CallError::ParamCount { callable, expected, got: params.len() })
    }
}

fn decode_u32(name: &'static str, value: &Value) -> Result<u32, CallError> {
    let invalid = |reason: String| CallError::InvalidParameter { name, reason };

    let parsed: i128 = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i128::from(i)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.fract() != 0.0 || !f.is_finite() {
                    return Err(invalid(format!("{n} is not an integer")));
                }
                #[allow(clippy::cast_possible_truncation)]
                let whole = f as i128;
                whole
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|_| invalid(format!("`{s}` is not a number")))?,
        Value::Null => return Err(invalid("missing".to_owned())),
        other => return Err(invalid(format!("unexpected {other}"))),
    };

    if parsed < 0 {
        return Err(CallError::NegativeNumber);
    }
    u32::try_from(parsed).map_err(|_| invalid(format!("{parsed} does not fit in u32")))
}

fn decode_id(name: &'static str, value: &Value) -> Result<RecordId, CallError> {
    let Some(raw) = value.as_str() else {
        return Err(CallError::InvalidParameter { name, reason: "expected a hex string".to_owned() });
    };
    raw.trim()
        .parse()
        .map_err(|e: super::ParseHashError| CallError::InvalidParameter { name, reason: e.to_string() })
}

/// `Option<Action>`: empty string or null is `None`. Names match exactly.
fn decode_action(value: &Value) -> Result<Option<Action>, CallError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => s
            .parse()
            .map(Some)
            .map_err(|_| CallError::InvalidActionType(s.clone())),
        other => Err(CallError::InvalidActionType(other.to_string())),
    }
}

#[cfg(test)]
#[path = "call_test.rs"]
mod tests;
