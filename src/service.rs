use crate::query::Query;
use serde_json::{Map, Value};
use std::fmt;

/// Body sent with mutating calls
pub type Data = Map<String, Value>;

/// Description of one data-service call.
///
/// Immutable once constructed. The provider only reads it through
/// [`ServiceMethod::id`], [`ServiceMethod::parameters`] and [`ServiceMethod::data`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceMethod {
    Find {
        query: Option<Query>,
    },
    Get {
        id: String,
        query: Option<Query>,
    },
    Create {
        data: Data,
        query: Option<Query>,
    },
    Update {
        id: Option<String>,
        data: Data,
        query: Option<Query>,
    },
    Patch {
        id: Option<String>,
        data: Data,
        query: Option<Query>,
    },
    Remove {
        id: Option<String>,
        query: Option<Query>,
    },
}

impl ServiceMethod {
    /// Method name used in request identifiers
    pub fn name(&self) -> &'static str {
        match self {
            ServiceMethod::Find { .. } => "find",
            ServiceMethod::Get { .. } => "get",
            ServiceMethod::Create { .. } => "create",
            ServiceMethod::Update { .. } => "update",
            ServiceMethod::Patch { .. } => "patch",
            ServiceMethod::Remove { .. } => "remove",
        }
    }

    /// Identifier of the targeted record, if any
    pub fn id(&self) -> Option<&str> {
        match self {
            ServiceMethod::Get { id, .. } => Some(id.as_str()),
            ServiceMethod::Update { id, .. }
            | ServiceMethod::Patch { id, .. }
            | ServiceMethod::Remove { id, .. } => id.as_deref(),
            ServiceMethod::Find { .. } | ServiceMethod::Create { .. } => None,
        }
    }

    /// Query attached to the call, if any
    pub fn query(&self) -> Option<&Query> {
        match self {
            ServiceMethod::Find { query }
            | ServiceMethod::Get { query, .. }
            | ServiceMethod::Create { query, .. }
            | ServiceMethod::Update { query, .. }
            | ServiceMethod::Patch { query, .. }
            | ServiceMethod::Remove { query, .. } => query.as_ref(),
        }
    }

    /// Flattened query parameters, if the call carries a query
    pub fn parameters(&self) -> Option<Map<String, Value>> {
        self.query().map(Query::serialize)
    }

    /// Body of mutating calls
    pub fn data(&self) -> Option<&Data> {
        match self {
            ServiceMethod::Create { data, .. }
            | ServiceMethod::Update { data, .. }
            | ServiceMethod::Patch { data, .. } => Some(data),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Events a realtime transport could deliver for a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealTimeEvent {
    Created,
    Updated,
    Patched,
    Removed,
}

impl RealTimeEvent {
    /// Wire name of the event
    pub fn as_str(self) -> &'static str {
        match self {
            RealTimeEvent::Created => "created",
            RealTimeEvent::Updated => "updated",
            RealTimeEvent::Patched => "patched",
            RealTimeEvent::Removed => "removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> Data {
        let Value::Object(map) = json!({"name": "x"}) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn test_method_names() {
        assert_eq!(ServiceMethod::Find { query: None }.name(), "find");
        assert_eq!(
            ServiceMethod::Remove { id: None, query: None }.to_string(),
            "remove"
        );
    }

    #[test]
    fn test_id_accessor() {
        let get = ServiceMethod::Get { id: "42".to_string(), query: None };
        assert_eq!(get.id(), Some("42"));

        let patch = ServiceMethod::Patch { id: None, data: data(), query: None };
        assert_eq!(patch.id(), None);

        let create = ServiceMethod::Create { data: data(), query: None };
        assert_eq!(create.id(), None);
    }

    #[test]
    fn test_data_accessor() {
        let update = ServiceMethod::Update {
            id: Some("1".to_string()),
            data: data(),
            query: None,
        };
        assert_eq!(update.data(), Some(&data()));
        assert_eq!(ServiceMethod::Find { query: None }.data(), None);
    }

    #[test]
    fn test_parameters_accessor() {
        let find = ServiceMethod::Find { query: Some(Query::new().limit(5)) };
        let params = find.parameters().unwrap();
        assert_eq!(params["$limit"], 5);

        assert!(ServiceMethod::Find { query: None }.parameters().is_none());
    }
}
