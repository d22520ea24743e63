use crate::error::NormalizedError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Paging metadata of a partial list result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub limit: u64,
    pub skip: u64,
}

/// Data carried by a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    List(Vec<Value>),
    Object(Value),
}

impl Payload {
    /// Get the records if this is a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Payload::List(list) => Some(list),
            Payload::Object(_) => None,
        }
    }

    /// Get the value if this is a single object
    pub fn as_object(&self) -> Option<&Value> {
        match self {
            Payload::Object(value) => Some(value),
            Payload::List(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Payload::List(list) => Value::Array(list.clone()),
            Payload::Object(value) => value.clone(),
        }
    }
}

/// Normalized result of a call, whatever shape the server answered with.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Present only for paginated list results
    pub pagination: Option<Pagination>,
    pub data: Payload,
}

impl Response {
    /// Check whether the server paginated the result
    pub fn is_paginated(&self) -> bool {
        self.pagination.is_some()
    }

    /// Decode the payload into the provided type
    pub fn decode<T>(&self) -> Result<T, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(self.to_value())
    }

    /// Get a value from the payload by a slash-separated path.
    /// For example, "0/name" accesses the "name" field of the first record.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('/').filter(|s| !s.is_empty());

        let mut current = match &self.data {
            Payload::Object(value) => value,
            Payload::List(list) => match parts.next() {
                Some(first) => list.get(first.parse::<usize>().ok()?)?,
                None => return None,
            },
        };

        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// Get a string value from the payload by a slash-separated path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    /// The payload as a single JSON value
    pub fn to_value(&self) -> Value {
        self.data.to_value()
    }
}

/// Failure reported by the transport, or a response that did not pass validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// HTTP status, when the exchange got that far
    pub code: Option<u16>,
    /// Human readable reason
    pub description: String,
    /// Raw response body, if one was received
    pub body: Option<Vec<u8>>,
}

/// Raw result of one HTTP exchange, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutcome {
    /// Successful status with the decoded body, if there was one
    Success(Option<Value>),
    Failure(TransportFailure),
}

impl RawOutcome {
    /// Classify a received status and body.
    ///
    /// Non-2xx statuses become failures carrying the status code. A 2xx body
    /// that is empty or not JSON decodes to nothing.
    pub fn from_http(status: reqwest::StatusCode, body: Vec<u8>) -> Self {
        if !status.is_success() {
            return RawOutcome::Failure(TransportFailure {
                code: Some(status.as_u16()),
                description: status_reason(status),
                body: Some(body),
            });
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return RawOutcome::Success(None);
        }

        match serde_json::from_slice(&body) {
            Ok(value) => RawOutcome::Success(Some(value)),
            Err(e) => {
                tracing::warn!(status = status.as_u16(), error = %e, "response body is not JSON");
                RawOutcome::Success(None)
            }
        }
    }

    /// Classify a response whose status arrived but whose body could not be read.
    ///
    /// A non-2xx status still yields a failure carrying that status.
    pub fn from_unread_body(status: reqwest::StatusCode, description: String) -> Self {
        if status.is_success() {
            return RawOutcome::Failure(TransportFailure {
                code: None,
                description,
                body: None,
            });
        }

        tracing::warn!(
            status = status.as_u16(),
            reason = %description,
            "failed to read error body"
        );
        RawOutcome::Failure(TransportFailure {
            code: Some(status.as_u16()),
            description: status_reason(status),
            body: None,
        })
    }

    /// Classify an error raised by the HTTP client before a body was read
    pub fn from_transport_error(error: &reqwest::Error) -> Self {
        RawOutcome::Failure(TransportFailure {
            code: error.status().map(|s| s.as_u16()),
            description: error.to_string(),
            body: None,
        })
    }
}

/// Normalize a raw outcome.
///
/// Priority order: failure, list, paginated object, plain object. Anything
/// else fails with `{message: fallback_message}`.
pub fn interpret(
    outcome: RawOutcome,
    fallback_message: &str,
) -> Result<Response, NormalizedError> {
    let value = match outcome {
        RawOutcome::Failure(failure) => return Err(normalize_failure(failure)),
        RawOutcome::Success(value) => value,
    };

    match value {
        Some(Value::Array(list)) => Ok(Response {
            pagination: None,
            data: Payload::List(list),
        }),
        Some(Value::Object(mut map)) => Ok(match paginated(&map) {
            Some(pagination) => {
                let list = match map.remove("data") {
                    Some(Value::Array(list)) => list,
                    _ => Vec::new(),
                };
                Response {
                    pagination: Some(pagination),
                    data: Payload::List(list),
                }
            }
            None => Response {
                pagination: None,
                data: Payload::Object(Value::Object(map)),
            },
        }),
        _ => Err(NormalizedError::from_reason(fallback_message)),
    }
}

fn normalize_failure(failure: TransportFailure) -> NormalizedError {
    let server_payload = failure
        .body
        .as_deref()
        .and_then(|body| serde_json::from_slice::<Map<String, Value>>(body).ok())
        .filter(|payload| !payload.is_empty());
    if let Some(payload) = server_payload {
        return NormalizedError::from_payload(payload);
    }

    match failure.code {
        Some(code) => NormalizedError::from_code(code, failure.description),
        None => {
            tracing::warn!(reason = %failure.description, "request failed without a status code");
            NormalizedError::unknown()
        }
    }
}

fn status_reason(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Response status code was unacceptable: {}", status.as_u16()))
}

fn paginated(map: &Map<String, Value>) -> Option<Pagination> {
    let skip = map.get("skip")?.as_u64()?;
    let limit = map.get("limit")?.as_u64()?;
    let total = map.get("total")?.as_u64()?;
    map.get("data")?.as_array()?;
    Some(Pagination { total, limit, skip })
}
