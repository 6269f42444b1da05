//! Constants for call-type tags, codec record names, and polling defaults.

/// Wire tag for the `get_properties` remote call.
pub const TASK_TYPE_GET_PROPERTIES: &str = "get-properties";

/// Wire tag for the `get_parameters` remote call.
pub const TASK_TYPE_GET_PARAMETERS: &str = "get-parameters";

/// Wire tag for the `fit` remote call.
pub const TASK_TYPE_FIT: &str = "fit";

/// Wire tag for the `evaluate` remote call.
pub const TASK_TYPE_EVALUATE: &str = "evaluate";

/// Default pause between result polls in the proxy and between
/// instruction polls in the node runner.
///
/// The transport contract is a non-blocking pull, so callers wait by
/// polling with a fixed pause. 500 ms keeps queue round-trips cheap
/// without busy-looping; override per proxy/runner with
/// `with_poll_interval`.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

// Record names used by the codec. One `<call>ins.*` / `<call>res.*`
// family per call type; the status record is present on every response.

pub(crate) const KEY_GET_PROPERTIES_INS_CONFIG: &str = "getpropertiesins.config";
pub(crate) const KEY_GET_PROPERTIES_RES_PROPERTIES: &str = "getpropertiesres.properties";
pub(crate) const KEY_GET_PROPERTIES_RES_STATUS: &str = "getpropertiesres.status";

pub(crate) const KEY_GET_PARAMETERS_INS_CONFIG: &str = "getparametersins.config";
pub(crate) const KEY_GET_PARAMETERS_RES_PARAMETERS: &str = "getparametersres.parameters";
pub(crate) const KEY_GET_PARAMETERS_RES_STATUS: &str = "getparametersres.status";

pub(crate) const KEY_FIT_INS_PARAMETERS: &str = "fitins.parameters";
pub(crate) const KEY_FIT_INS_CONFIG: &str = "fitins.config";
pub(crate) const KEY_FIT_RES_PARAMETERS: &str = "fitres.parameters";
pub(crate) const KEY_FIT_RES_METRICS: &str = "fitres.metrics";
pub(crate) const KEY_FIT_RES_NUM_EXAMPLES: &str = "fitres.num_examples";
pub(crate) const KEY_FIT_RES_STATUS: &str = "fitres.status";

pub(crate) const KEY_EVALUATE_INS_PARAMETERS: &str = "evaluateins.parameters";
pub(crate) const KEY_EVALUATE_INS_CONFIG: &str = "evaluateins.config";
pub(crate) const KEY_EVALUATE_RES_LOSS: &str = "evaluateres.loss";
pub(crate) const KEY_EVALUATE_RES_METRICS: &str = "evaluateres.metrics";
pub(crate) const KEY_EVALUATE_RES_NUM_EXAMPLES: &str = "evaluateres.num_examples";
pub(crate) const KEY_EVALUATE_RES_STATUS: &str = "evaluateres.status";

// Field keys inside the status and scalar sub-records.
pub(crate) const STATUS_CODE_KEY: &str = "code";
pub(crate) const STATUS_MESSAGE_KEY: &str = "message";
pub(crate) const NUM_EXAMPLES_KEY: &str = "num_examples";
pub(crate) const LOSS_KEY: &str = "loss";
