//! Wire and data-model types: records, messages, typed calls, and queue
//! envelopes.
//!
//! - [`records`] - the payload model ([`Content`] and its record kinds)
//! - [`message`] - [`Message`]/[`Metadata`], the unit flowing through the
//!   pipeline
//! - [`api`] - typed request/response pairs for the four remote calls
//! - [`task`] - [`TaskIns`]/[`TaskRes`] queue envelopes and [`CallType`]

pub mod api;
pub mod message;
pub mod records;
pub mod task;

pub use api::{
    Code, Config, EvaluateIns, EvaluateRes, FitIns, FitRes, GetParametersIns, GetParametersRes,
    GetPropertiesIns, GetPropertiesRes, Metrics, Parameters, Properties, Status,
};
pub use message::{Message, Metadata};
pub use records::{
    Array, ConfigsRecord, Content, MetricValue, MetricsRecord, ParametersRecord, Record, Scalar,
};
pub use task::{CallType, TaskIns, TaskRes, UnknownCallType};
