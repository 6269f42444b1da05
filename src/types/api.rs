//! Typed request/response pairs for the four remote calls.
//!
//! These are the orchestrator-facing shapes; the codec converts them to
//! and from the generic [`Content`](crate::types::records::Content)
//! representation that travels through the queue.
//!
//! A response's [`Status`] is application-level: a non-[`Code::Ok`] status
//! is returned to the caller as part of the typed response, never raised
//! as an error. Only transport-level failures raise
//! [`Error`](crate::error::Error).

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::records::Scalar;

/// String-keyed scalar map used for call configuration.
pub type Config = IndexMap<String, Scalar>;

/// String-keyed scalar map of node-reported properties.
pub type Properties = IndexMap<String, Scalar>;

/// String-keyed scalar map of training/evaluation metrics.
pub type Metrics = IndexMap<String, Scalar>;

/// Application-level status code carried by every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    /// The call succeeded.
    Ok,
    /// The node does not implement `get_properties`.
    GetPropertiesNotImplemented,
    /// The node does not implement `get_parameters`.
    GetParametersNotImplemented,
    /// The node does not implement `fit`.
    FitNotImplemented,
    /// The node does not implement `evaluate`.
    EvaluateNotImplemented,
}

impl Code {
    /// Numeric wire value of this code.
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Ok => 0,
            Self::GetPropertiesNotImplemented => 1,
            Self::GetParametersNotImplemented => 2,
            Self::FitNotImplemented => 3,
            Self::EvaluateNotImplemented => 4,
        }
    }

    /// Parses a numeric wire value, `None` for unknown values.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::GetPropertiesNotImplemented),
            2 => Some(Self::GetParametersNotImplemented),
            3 => Some(Self::FitNotImplemented),
            4 => Some(Self::EvaluateNotImplemented),
            _ => None,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::GetPropertiesNotImplemented => "get_properties_not_implemented",
            Self::GetParametersNotImplemented => "get_parameters_not_implemented",
            Self::FitNotImplemented => "fit_not_implemented",
            Self::EvaluateNotImplemented => "evaluate_not_implemented",
        };
        f.write_str(s)
    }
}

/// Application-level response status: a code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    /// The status code.
    pub code: Code,
    /// Human-readable detail.
    pub message: String,
}

impl Status {
    /// Creates a status.
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// An `Ok` status with a standard message.
    pub fn ok() -> Self {
        Self::new(Code::Ok, "OK")
    }

    /// Returns `true` if the code is [`Code::Ok`].
    pub fn is_ok(&self) -> bool {
        self.code == Code::Ok
    }
}

/// Serialized model parameters: one opaque byte blob per tensor.
///
/// The core never inspects tensor bytes; `tensor_type` names the
/// serialization the producing numeric runtime used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Serialized tensors in model order.
    pub tensors: Vec<Vec<u8>>,
    /// Serialization label, e.g. `"np"`.
    pub tensor_type: String,
}

impl Parameters {
    /// Creates parameters from serialized tensors.
    pub fn new(tensors: Vec<Vec<u8>>, tensor_type: impl Into<String>) -> Self {
        Self {
            tensors,
            tensor_type: tensor_type.into(),
        }
    }
}

/// Request for a node's properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetPropertiesIns {
    /// Which properties the orchestrator is interested in.
    pub config: Config,
}

/// A node's properties response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPropertiesRes {
    /// Application-level status.
    pub status: Status,
    /// The reported properties.
    pub properties: Properties,
}

/// Request for a node's current model parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetParametersIns {
    /// Call configuration.
    pub config: Config,
}

/// A node's current model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetParametersRes {
    /// Application-level status.
    pub status: Status,
    /// The node's parameters.
    pub parameters: Parameters,
}

/// Instruction to run one training round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitIns {
    /// Global parameters to train from.
    pub parameters: Parameters,
    /// Training configuration.
    pub config: Config,
}

/// Result of one training round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRes {
    /// Application-level status.
    pub status: Status,
    /// Locally updated parameters.
    pub parameters: Parameters,
    /// Number of examples the round trained on.
    pub num_examples: u64,
    /// Training metrics.
    pub metrics: Metrics,
}

/// Instruction to evaluate the given parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluateIns {
    /// Parameters to evaluate.
    pub parameters: Parameters,
    /// Evaluation configuration.
    pub config: Config,
}

/// Result of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateRes {
    /// Application-level status.
    pub status: Status,
    /// Evaluation loss.
    pub loss: f64,
    /// Number of examples evaluated.
    pub num_examples: u64,
    /// Evaluation metrics.
    pub metrics: Metrics,
}
