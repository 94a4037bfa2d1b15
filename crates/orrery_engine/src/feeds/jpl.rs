//! HTTP adapter for the JPL proxy service
//!
//! The proxy forwards two JPL endpoints unchanged:
//!
//! - `GET /api/fireball` → `{ "fields": [...], "data": [[...], ...] }`
//! - `GET /api/sbdb` → a single lookup record, or a list of records
//!
//! Payload interpretation is kept in free functions so it can be exercised
//! without a network.

use serde_json::{Map, Value};

use super::{Attributes, DataFeed, FeedError, ObjectDescriptor, ObjectKind};
use crate::core::config::FeedConfig;

/// Blocking client for the proxy's fireball and small-body endpoints
pub struct JplProxyFeed {
    agent: ureq::Agent,
    fireball_url: String,
    small_body_url: String,
}

impl JplProxyFeed {
    /// Create a client for the proxy described by `config`
    pub fn new(config: &FeedConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.timeout())
            .timeout_read(config.timeout())
            .build();

        Self {
            agent,
            fireball_url: config.fireball_url(),
            small_body_url: config.small_body_url(),
        }
    }

    fn fetch_json(&self, url: &str) -> Result<Value, FeedError> {
        log::debug!("GET {url}");
        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(status, _) => FeedError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => FeedError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            },
        })?;

        let body = response.into_string().map_err(|e| FeedError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&body).map_err(|e| FeedError::Parse(format!("{url}: {e}")))
    }
}

impl DataFeed for JplProxyFeed {
    fn fetch_fireballs(&self) -> Result<Vec<ObjectDescriptor>, FeedError> {
        let payload = self.fetch_json(&self.fireball_url)?;
        parse_fireballs(&payload)
    }

    fn fetch_small_bodies(&self) -> Result<Vec<ObjectDescriptor>, FeedError> {
        let payload = self.fetch_json(&self.small_body_url)?;
        parse_small_bodies(&payload)
    }
}

/// Normalise a fireball payload into descriptors
///
/// Rows may be objects or positional arrays paired with `fields`. A payload
/// with a `count` but no `data` is an empty result.
pub fn parse_fireballs(payload: &Value) -> Result<Vec<ObjectDescriptor>, FeedError> {
    let rows: &[Value] = match payload {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(object) => match object.get("data") {
            Some(Value::Array(rows)) => rows.as_slice(),
            None if object.contains_key("count") => &[],
            _ => return Err(FeedError::Parse("fireball payload has no data list".into())),
        },
        _ => return Err(FeedError::Parse("fireball payload is not an object".into())),
    };

    let fields = field_names(payload);
    Ok(rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let attributes = row_attributes(row, &fields, ObjectKind::Fireball, index)?;
            let name = name_from(&attributes)
                .or_else(|| attributes.get("date").and_then(Value::as_str).map(|date| format!("Fireball {date}")))
                .unwrap_or_else(|| synthetic_name(ObjectKind::Fireball, index));
            Some(descriptor(name, ObjectKind::Fireball, attributes))
        })
        .collect())
}

/// Normalise a small-body payload into descriptors
///
/// Accepts a list of records, a single lookup record, or an object carrying
/// a `data` list.
pub fn parse_small_bodies(payload: &Value) -> Result<Vec<ObjectDescriptor>, FeedError> {
    let fields = field_names(payload);
    let rows: Vec<&Value> = match payload {
        Value::Array(rows) => rows.iter().collect(),
        Value::Object(object) => match object.get("data") {
            Some(Value::Array(rows)) => rows.iter().collect(),
            Some(_) => return Err(FeedError::Parse("small-body data is not a list".into())),
            None if object.is_empty() => Vec::new(),
            None => vec![payload],
        },
        _ => return Err(FeedError::Parse("small-body payload is neither a record nor a list".into())),
    };

    Ok(rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let attributes = row_attributes(row, &fields, ObjectKind::SmallBody, index)?;
            let name = name_from(&attributes)
                .or_else(|| lookup_fullname(&attributes))
                .unwrap_or_else(|| synthetic_name(ObjectKind::SmallBody, index));
            Some(descriptor(name, ObjectKind::SmallBody, attributes))
        })
        .collect())
}

fn field_names(payload: &Value) -> Vec<String> {
    payload
        .get("fields")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn row_attributes(row: &Value, fields: &[String], kind: ObjectKind, index: usize) -> Option<Attributes> {
    match row {
        Value::Object(object) => Some(object_attributes(object)),
        Value::Array(values) if !fields.is_empty() => Some(
            fields
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect(),
        ),
        _ => {
            log::warn!("Skipping unrecognised {kind} row #{index}");
            None
        }
    }
}

fn object_attributes(object: &Map<String, Value>) -> Attributes {
    object.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn name_from(attributes: &Attributes) -> Option<String> {
    attributes
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn lookup_fullname(attributes: &Attributes) -> Option<String> {
    let fullname = attributes
        .get("object")
        .and_then(|object| object.get("fullname"))
        .or_else(|| attributes.get("full_name"))?;
    fullname
        .as_str()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn synthetic_name(kind: ObjectKind, index: usize) -> String {
    format!("{kind} #{index}")
}

fn descriptor(name: String, kind: ObjectKind, mut attributes: Attributes) -> ObjectDescriptor {
    attributes.remove("name");
    ObjectDescriptor { name, kind, attributes }
}
