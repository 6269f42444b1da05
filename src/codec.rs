//! Bidirectional conversion between typed calls and [`Content`].
//!
//! The codec is pure and stateless: one encode/decode pair per call type,
//! keyed by fixed record names, never touching metadata. For every
//! supported call type and valid value `x`, `decode(encode(x)) == x`.
//!
//! One wire quirk is inherited from the transport model: parameter
//! payloads carry their `tensor_type` on each serialized tensor, so a
//! [`Parameters`] with zero tensors decodes with an empty `tensor_type`.
//! Example counts are carried as `i64` metrics and saturate at
//! `i64::MAX`. The round-trip law therefore covers non-empty parameter
//! sets and in-range example counts; all other fields round-trip
//! unconditionally.
//!
//! Decoding fails with [`Error::SchemaMismatch`] naming the record that
//! was missing or had the wrong kind.

use crate::constants::*;
use crate::error::{Error, Result};
use crate::types::{
    Array, CallType, Code, Config, ConfigsRecord, Content, EvaluateIns, EvaluateRes, FitIns,
    FitRes, GetParametersIns, GetParametersRes, GetPropertiesIns, GetPropertiesRes, MetricValue,
    Metrics, MetricsRecord, Parameters, ParametersRecord, Scalar, Status,
};

// ---- shared helpers ----

fn mismatch(task_type: CallType, detail: impl Into<String>) -> Error {
    Error::SchemaMismatch {
        task_type,
        detail: detail.into(),
    }
}

fn require_configs<'a>(
    content: &'a Content,
    name: &str,
    task_type: CallType,
) -> Result<&'a ConfigsRecord> {
    match content.get(name) {
        Some(crate::types::Record::Configs(r)) => Ok(r),
        Some(_) => Err(mismatch(task_type, format!("record {name} is not a configs record"))),
        None => Err(mismatch(task_type, format!("missing record: {name}"))),
    }
}

fn require_metrics<'a>(
    content: &'a Content,
    name: &str,
    task_type: CallType,
) -> Result<&'a MetricsRecord> {
    match content.get(name) {
        Some(crate::types::Record::Metrics(r)) => Ok(r),
        Some(_) => Err(mismatch(task_type, format!("record {name} is not a metrics record"))),
        None => Err(mismatch(task_type, format!("missing record: {name}"))),
    }
}

fn require_parameters<'a>(
    content: &'a Content,
    name: &str,
    task_type: CallType,
) -> Result<&'a ParametersRecord> {
    match content.get(name) {
        Some(crate::types::Record::Parameters(r)) => Ok(r),
        Some(_) => Err(mismatch(
            task_type,
            format!("record {name} is not a parameters record"),
        )),
        None => Err(mismatch(task_type, format!("missing record: {name}"))),
    }
}

fn scalar_map_to_record(map: &Config) -> ConfigsRecord {
    map.iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn record_to_scalar_map(record: &ConfigsRecord) -> Config {
    record.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn parameters_to_record(parameters: &Parameters) -> ParametersRecord {
    parameters
        .tensors
        .iter()
        .enumerate()
        .map(|(i, tensor)| {
            (
                i.to_string(),
                Array {
                    dtype: String::new(),
                    shape: Vec::new(),
                    stype: parameters.tensor_type.clone(),
                    data: tensor.clone(),
                },
            )
        })
        .collect()
}

fn record_to_parameters(record: &ParametersRecord) -> Parameters {
    let tensor_type = record
        .iter()
        .next()
        .map(|(_, array)| array.stype.clone())
        .unwrap_or_default();
    Parameters {
        tensors: record.iter().map(|(_, array)| array.data.clone()).collect(),
        tensor_type,
    }
}

fn status_to_record(status: &Status) -> ConfigsRecord {
    let mut record = ConfigsRecord::new();
    record.set(STATUS_CODE_KEY, status.code.as_i64());
    record.set(STATUS_MESSAGE_KEY, status.message.clone());
    record
}

fn record_to_status(record: &ConfigsRecord, task_type: CallType) -> Result<Status> {
    let code = record
        .get(STATUS_CODE_KEY)
        .and_then(Scalar::as_i64)
        .and_then(Code::from_i64)
        .ok_or_else(|| mismatch(task_type, "status record has no valid code"))?;
    let message = record
        .get(STATUS_MESSAGE_KEY)
        .and_then(Scalar::as_str)
        .ok_or_else(|| mismatch(task_type, "status record has no message"))?
        .to_string();
    Ok(Status { code, message })
}

// Example counts ride the wire as i64 metrics; counts beyond i64::MAX
// saturate rather than wrap.
fn num_examples_metric(num_examples: u64) -> i64 {
    i64::try_from(num_examples).unwrap_or(i64::MAX)
}

fn num_examples_from(record: &MetricsRecord, task_type: CallType) -> Result<u64> {
    let value = record
        .get(NUM_EXAMPLES_KEY)
        .and_then(MetricValue::as_i64)
        .ok_or_else(|| mismatch(task_type, "missing num_examples metric"))?;
    u64::try_from(value).map_err(|_| mismatch(task_type, "negative num_examples metric"))
}

// ---- get-properties ----

/// Encodes a `get_properties` request.
pub fn get_properties_ins_to_content(ins: &GetPropertiesIns) -> Content {
    let mut content = Content::new();
    content.set_configs(KEY_GET_PROPERTIES_INS_CONFIG, scalar_map_to_record(&ins.config));
    content
}

/// Decodes a `get_properties` request.
pub fn content_to_get_properties_ins(content: &Content) -> Result<GetPropertiesIns> {
    let config = require_configs(content, KEY_GET_PROPERTIES_INS_CONFIG, CallType::GetProperties)?;
    Ok(GetPropertiesIns {
        config: record_to_scalar_map(config),
    })
}

/// Encodes a `get_properties` response.
pub fn get_properties_res_to_content(res: &GetPropertiesRes) -> Content {
    let mut content = Content::new();
    content.set_configs(
        KEY_GET_PROPERTIES_RES_PROPERTIES,
        scalar_map_to_record(&res.properties),
    );
    content.set_configs(KEY_GET_PROPERTIES_RES_STATUS, status_to_record(&res.status));
    content
}

/// Decodes a `get_properties` response.
pub fn content_to_get_properties_res(content: &Content) -> Result<GetPropertiesRes> {
    let task_type = CallType::GetProperties;
    let properties = require_configs(content, KEY_GET_PROPERTIES_RES_PROPERTIES, task_type)?;
    let status = require_configs(content, KEY_GET_PROPERTIES_RES_STATUS, task_type)?;
    Ok(GetPropertiesRes {
        status: record_to_status(status, task_type)?,
        properties: record_to_scalar_map(properties),
    })
}

// ---- get-parameters ----

/// Encodes a `get_parameters` request.
pub fn get_parameters_ins_to_content(ins: &GetParametersIns) -> Content {
    let mut content = Content::new();
    content.set_configs(KEY_GET_PARAMETERS_INS_CONFIG, scalar_map_to_record(&ins.config));
    content
}

/// Decodes a `get_parameters` request.
pub fn content_to_get_parameters_ins(content: &Content) -> Result<GetParametersIns> {
    let config = require_configs(content, KEY_GET_PARAMETERS_INS_CONFIG, CallType::GetParameters)?;
    Ok(GetParametersIns {
        config: record_to_scalar_map(config),
    })
}

/// Encodes a `get_parameters` response.
pub fn get_parameters_res_to_content(res: &GetParametersRes) -> Content {
    let mut content = Content::new();
    content.set_parameters(
        KEY_GET_PARAMETERS_RES_PARAMETERS,
        parameters_to_record(&res.parameters),
    );
    content.set_configs(KEY_GET_PARAMETERS_RES_STATUS, status_to_record(&res.status));
    content
}

/// Decodes a `get_parameters` response.
pub fn content_to_get_parameters_res(content: &Content) -> Result<GetParametersRes> {
    let task_type = CallType::GetParameters;
    let parameters = require_parameters(content, KEY_GET_PARAMETERS_RES_PARAMETERS, task_type)?;
    let status = require_configs(content, KEY_GET_PARAMETERS_RES_STATUS, task_type)?;
    Ok(GetParametersRes {
        status: record_to_status(status, task_type)?,
        parameters: record_to_parameters(parameters),
    })
}

// ---- fit ----

/// Encodes a `fit` request.
pub fn fit_ins_to_content(ins: &FitIns) -> Content {
    let mut content = Content::new();
    content.set_parameters(KEY_FIT_INS_PARAMETERS, parameters_to_record(&ins.parameters));
    content.set_configs(KEY_FIT_INS_CONFIG, scalar_map_to_record(&ins.config));
    content
}

/// Decodes a `fit` request.
pub fn content_to_fit_ins(content: &Content) -> Result<FitIns> {
    let task_type = CallType::Fit;
    let parameters = require_parameters(content, KEY_FIT_INS_PARAMETERS, task_type)?;
    let config = require_configs(content, KEY_FIT_INS_CONFIG, task_type)?;
    Ok(FitIns {
        parameters: record_to_parameters(parameters),
        config: record_to_scalar_map(config),
    })
}

/// Encodes a `fit` response.
pub fn fit_res_to_content(res: &FitRes) -> Content {
    let mut content = Content::new();
    content.set_parameters(KEY_FIT_RES_PARAMETERS, parameters_to_record(&res.parameters));
    content.set_configs(KEY_FIT_RES_METRICS, scalar_map_to_record(&res.metrics));

    let mut examples = MetricsRecord::new();
    examples.set(NUM_EXAMPLES_KEY, num_examples_metric(res.num_examples));
    content.set_metrics(KEY_FIT_RES_NUM_EXAMPLES, examples);

    content.set_configs(KEY_FIT_RES_STATUS, status_to_record(&res.status));
    content
}

/// Decodes a `fit` response.
pub fn content_to_fit_res(content: &Content) -> Result<FitRes> {
    let task_type = CallType::Fit;
    let parameters = require_parameters(content, KEY_FIT_RES_PARAMETERS, task_type)?;
    let metrics = require_configs(content, KEY_FIT_RES_METRICS, task_type)?;
    let examples = require_metrics(content, KEY_FIT_RES_NUM_EXAMPLES, task_type)?;
    let status = require_configs(content, KEY_FIT_RES_STATUS, task_type)?;
    Ok(FitRes {
        status: record_to_status(status, task_type)?,
        parameters: record_to_parameters(parameters),
        num_examples: num_examples_from(examples, task_type)?,
        metrics: record_to_scalar_map(metrics),
    })
}

// ---- evaluate ----

/// Encodes an `evaluate` request.
pub fn evaluate_ins_to_content(ins: &EvaluateIns) -> Content {
    let mut content = Content::new();
    content.set_parameters(
        KEY_EVALUATE_INS_PARAMETERS,
        parameters_to_record(&ins.parameters),
    );
    content.set_configs(KEY_EVALUATE_INS_CONFIG, scalar_map_to_record(&ins.config));
    content
}

/// Decodes an `evaluate` request.
pub fn content_to_evaluate_ins(content: &Content) -> Result<EvaluateIns> {
    let task_type = CallType::Evaluate;
    let parameters = require_parameters(content, KEY_EVALUATE_INS_PARAMETERS, task_type)?;
    let config = require_configs(content, KEY_EVALUATE_INS_CONFIG, task_type)?;
    Ok(EvaluateIns {
        parameters: record_to_parameters(parameters),
        config: record_to_scalar_map(config),
    })
}

/// Encodes an `evaluate` response.
pub fn evaluate_res_to_content(res: &EvaluateRes) -> Content {
    let mut content = Content::new();

    let mut loss = MetricsRecord::new();
    loss.set(LOSS_KEY, res.loss);
    content.set_metrics(KEY_EVALUATE_RES_LOSS, loss);

    let mut examples = MetricsRecord::new();
    examples.set(NUM_EXAMPLES_KEY, num_examples_metric(res.num_examples));
    content.set_metrics(KEY_EVALUATE_RES_NUM_EXAMPLES, examples);

    content.set_configs(KEY_EVALUATE_RES_METRICS, scalar_map_to_record(&res.metrics));
    content.set_configs(KEY_EVALUATE_RES_STATUS, status_to_record(&res.status));
    content
}

/// Decodes an `evaluate` response.
pub fn content_to_evaluate_res(content: &Content) -> Result<EvaluateRes> {
    let task_type = CallType::Evaluate;
    let loss_record = require_metrics(content, KEY_EVALUATE_RES_LOSS, task_type)?;
    let examples = require_metrics(content, KEY_EVALUATE_RES_NUM_EXAMPLES, task_type)?;
    let metrics = require_configs(content, KEY_EVALUATE_RES_METRICS, task_type)?;
    let status = require_configs(content, KEY_EVALUATE_RES_STATUS, task_type)?;

    let loss = loss_record
        .get(LOSS_KEY)
        .and_then(MetricValue::as_f64)
        .ok_or_else(|| mismatch(task_type, "missing loss metric"))?;

    Ok(EvaluateRes {
        status: record_to_status(status, task_type)?,
        loss,
        num_examples: num_examples_from(examples, task_type)?,
        metrics: record_to_scalar_map(metrics),
    })
}
