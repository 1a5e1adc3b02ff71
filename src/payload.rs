//! Layered decoding of the server-data API response.
//!
//! The API nests JSON inside JSON strings three times over:
//!
//! - the HTTP envelope `{ "body": "<string>" }`
//! - the outer body `{ "server": { ... } }`
//! - the `software` and `strategy_scores` fields, each a JSON string
//!
//! Every layer has its own decoder. Envelope and outer-body failures propagate;
//! failures in the nested fields are logged and replaced with empty containers.

use crate::error::ReportError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

/// A single server's details as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerRecord {
    pub server_name: String,
    /// Percent.
    pub cpu_utilization: Quantity,
    /// MB.
    pub memory_utilization: Quantity,
    /// GB.
    pub storage: Quantity,
    /// Percent.
    pub network_utilization: Quantity,
    pub cost: Quantity,
    pub instance_type: Option<String>,
    pub primary_strategy: Option<String>,
    pub software: Vec<String>,
    pub strategy_scores: StrategyScores,
}

/// A numeric field as the backend stored it.
///
/// Numbers and numeric strings become `Number`. Anything else (the backend
/// writes `"{}"` for a server ingested without storage) is kept verbatim as
/// `Text` so the record still decodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

impl Quantity {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| Self::Text(n.to_string()), Self::Number),
            Value::String(text) => parse_number(text)
                .map_or_else(|| Self::Text(text.clone()), Self::Number),
            Value::Null => Self::Text(String::new()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<f64> for Quantity {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl PartialEq<f64> for Quantity {
    fn eq(&self, other: &f64) -> bool {
        self.as_f64() == Some(*other)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// Strategy name -> score, kept in the order the payload lists them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrategyScores(Vec<(String, f64)>);

impl StrategyScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a score. An existing name keeps its position and takes the new value.
    pub fn insert(&mut self, name: impl Into<String>, score: f64) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = score,
            None => self.0.push((name, score)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, score)| (name.as_str(), *score))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for StrategyScores {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut scores = Self::new();
        for (name, score) in iter {
            scores.insert(name, score);
        }
        scores
    }
}

impl Serialize for StrategyScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, score) in &self.0 {
            map.serialize_entry(name, score)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct RawServer {
    server_name: String,
    #[serde(deserialize_with = "quantity")]
    cpu_utilization: Quantity,
    #[serde(deserialize_with = "quantity")]
    memory_utilization: Quantity,
    #[serde(deserialize_with = "quantity")]
    storage: Quantity,
    #[serde(deserialize_with = "quantity")]
    network_utilization: Quantity,
    #[serde(deserialize_with = "quantity")]
    cost: Quantity,
    #[serde(default)]
    instance_type: Option<String>,
    #[serde(default)]
    primary_strategy: Option<String>,
    #[serde(default)]
    software: Option<Value>,
    #[serde(default)]
    strategy_scores: Option<Value>,
}

/// Only presence is checked; DynamoDB hands numbers back as strings.
fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Quantity, D::Error> {
    Value::deserialize(deserializer).map(|value| Quantity::from_value(&value))
}

pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Extracts the outer body from the HTTP envelope.
///
/// `body` is normally a JSON string; an inline object is accepted too, and a
/// response that already carries `server` is treated as the outer body itself.
pub fn unwrap_envelope(response_text: &str) -> Result<String, ReportError> {
    let envelope: Value = serde_json::from_str(response_text)
        .map_err(|e| ReportError::OuterDecodeFailed(format!("response is not JSON: {}", e)))?;

    match envelope.get("body") {
        Some(Value::String(body)) => Ok(body.clone()),
        Some(body @ Value::Object(_)) => Ok(body.to_string()),
        Some(other) => Err(ReportError::OuterDecodeFailed(format!(
            "`body` must be a JSON string, found {}",
            json_kind(other)
        ))),
        None if envelope.get("server").is_some() => Ok(response_text.to_string()),
        None => Err(ReportError::OuterDecodeFailed(
            "response has no `body` field".to_string(),
        )),
    }
}

/// Decodes the outer body into a [`ServerRecord`].
///
/// Only a malformed outer body or a missing field fails; `software` and
/// `strategy_scores` degrade to empty containers.
pub fn parse_server_record(raw_body: &str) -> Result<ServerRecord, ReportError> {
    let outer: Value = serde_json::from_str(raw_body)
        .map_err(|e| ReportError::OuterDecodeFailed(format!("body is not JSON: {}", e)))?;

    let server = match outer.get("server") {
        Some(server @ Value::Object(_)) => server,
        _ => {
            let reason = match outer.get("error").and_then(Value::as_str) {
                Some(api_error) => format!("API returned an error: {}", api_error),
                None => "body has no `server` object".to_string(),
            };
            return Err(ReportError::OuterDecodeFailed(reason));
        }
    };

    let raw = RawServer::deserialize(server)
        .map_err(|e| ReportError::OuterDecodeFailed(format!("invalid `server` object: {}", e)))?;

    let software = decode_software(raw.software.as_ref()).unwrap_or_else(|err| {
        warn!(server = %raw.server_name, "{}", err);
        Vec::new()
    });

    let strategy_scores =
        decode_strategy_scores(raw.strategy_scores.as_ref()).unwrap_or_else(|err| {
            warn!(server = %raw.server_name, "{}", err);
            StrategyScores::new()
        });

    debug!(
        server = %raw.server_name,
        software = software.len(),
        strategies = strategy_scores.len(),
        "decoded server record"
    );

    Ok(ServerRecord {
        server_name: raw.server_name,
        cpu_utilization: raw.cpu_utilization,
        memory_utilization: raw.memory_utilization,
        storage: raw.storage,
        network_utilization: raw.network_utilization,
        cost: raw.cost,
        instance_type: raw.instance_type,
        primary_strategy: raw.primary_strategy,
        software,
        strategy_scores,
    })
}

/// Envelope and outer body in one step.
pub fn parse_response(response_text: &str) -> Result<ServerRecord, ReportError> {
    let body = unwrap_envelope(response_text)?;
    parse_server_record(&body)
}

/// Decodes the `software` field: a JSON string holding an array of strings.
pub fn decode_software(raw: Option<&Value>) -> Result<Vec<String>, ReportError> {
    let nested = |reason: String| ReportError::NestedDecodeFailed {
        field: "software",
        reason,
    };

    let value = decode_nested_layer(raw).map_err(nested)?;
    Vec::<String>::deserialize(&value).map_err(|e| nested(e.to_string()))
}

/// Decodes the `strategy_scores` field: a JSON string holding an object of
/// name -> number.
pub fn decode_strategy_scores(raw: Option<&Value>) -> Result<StrategyScores, ReportError> {
    let nested = |reason: String| ReportError::NestedDecodeFailed {
        field: "strategy_scores",
        reason,
    };

    let value = decode_nested_layer(raw).map_err(nested)?;
    let map = match value {
        Value::Object(map) => map,
        other => return Err(nested(format!("expected an object, found {}", json_kind(&other)))),
    };

    let mut scores = StrategyScores::new();
    for (name, score) in map {
        match score.as_f64().filter(|n| n.is_finite()) {
            Some(score) => scores.insert(name, score),
            None => {
                return Err(nested(format!(
                    "score for {:?} is not a number ({})",
                    name,
                    json_kind(&score)
                )))
            }
        }
    }
    Ok(scores)
}

/// One decode pass over a doubly-encoded field. Inline JSON values are taken
/// as already decoded.
fn decode_nested_layer(raw: Option<&Value>) -> Result<Value, String> {
    match raw {
        None | Some(Value::Null) => Err("field is missing".to_string()),
        Some(Value::String(encoded)) => serde_json::from_str(encoded).map_err(|e| e.to_string()),
        Some(inline) => Ok(inline.clone()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
