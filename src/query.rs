use serde_json::{Map, Value};

/// Reserved key listing the fields a response should be reduced to.
pub const SELECT_KEY: &str = "$select";

/// Sort direction for a `$sort` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_value(self) -> Value {
        match self {
            SortOrder::Ascending => Value::from(1),
            SortOrder::Descending => Value::from(-1),
        }
    }
}

/// Operator applied to a single property.
///
/// `In` and `NotIn` take a list of values; the rest compare against one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyOperator {
    In,
    NotIn,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    NotEqual,
}

impl PropertyOperator {
    /// Wire name of the operator
    pub fn key(self) -> &'static str {
        match self {
            PropertyOperator::In => "$in",
            PropertyOperator::NotIn => "$nin",
            PropertyOperator::LessThan => "$lt",
            PropertyOperator::LessThanOrEqual => "$lte",
            PropertyOperator::GreaterThan => "$gt",
            PropertyOperator::GreaterThanOrEqual => "$gte",
            PropertyOperator::NotEqual => "$ne",
        }
    }

    /// Look an operator up by its wire name
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "$in" => PropertyOperator::In,
            "$nin" => PropertyOperator::NotIn,
            "$lt" => PropertyOperator::LessThan,
            "$lte" => PropertyOperator::LessThanOrEqual,
            "$gt" => PropertyOperator::GreaterThan,
            "$gte" => PropertyOperator::GreaterThanOrEqual,
            "$ne" => PropertyOperator::NotEqual,
            _ => return None,
        })
    }

    /// Whether the operator expects a list of values
    pub fn is_array(self) -> bool {
        matches!(self, PropertyOperator::In | PropertyOperator::NotIn)
    }
}

/// Query attached to a service call.
///
/// ```
/// use rest_provider::query::{Query, SortOrder};
///
/// let query = Query::new()
///     .limit(10)
///     .sort("name", SortOrder::Ascending)
///     .select(["name", "age"])
///     .is_in("role", ["admin", "owner"]);
///
/// let params = query.serialize();
/// assert_eq!(params["$limit"], 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    limit: Option<u64>,
    skip: Option<u64>,
    sort: Vec<(String, SortOrder)>,
    select: Vec<String>,
    properties: Vec<(String, PropertyFilter)>,
}

#[derive(Debug, Clone, PartialEq)]
enum PropertyFilter {
    Equal(Value),
    Operator(PropertyOperator, Value),
}

impl Query {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of returned records
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip a number of records
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sort on a property
    pub fn sort(mut self, property: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push((property.into(), order));
        self
    }

    /// Only return the listed properties
    pub fn select<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(properties.into_iter().map(Into::into));
        self
    }

    /// Match records whose property equals `value`
    pub fn equal_to(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties
            .push((property.into(), PropertyFilter::Equal(value.into())));
        self
    }

    /// Match records whose property is one of `values`
    pub fn is_in<I, S>(self, property: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_operator(property, PropertyOperator::In, values)
    }

    /// Match records whose property is none of `values`
    pub fn not_in<I, S>(self, property: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_operator(property, PropertyOperator::NotIn, values)
    }

    /// Apply a single-value operator to a property
    ///
    /// List operators passed here keep whatever value they are given; only
    /// lists of strings are encoded into the URL.
    pub fn compare(
        mut self,
        property: impl Into<String>,
        operator: PropertyOperator,
        value: impl Into<Value>,
    ) -> Self {
        self.properties.push((
            property.into(),
            PropertyFilter::Operator(operator, value.into()),
        ));
        self
    }

    fn list_operator<I, S>(
        mut self,
        property: impl Into<String>,
        operator: PropertyOperator,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|v| Value::String(v.into()))
            .collect();
        self.properties.push((
            property.into(),
            PropertyFilter::Operator(operator, Value::Array(values)),
        ));
        self
    }

    /// Check whether the query carries anything at all
    pub fn is_empty(&self) -> bool {
        self.limit.is_none()
            && self.skip.is_none()
            && self.sort.is_empty()
            && self.select.is_empty()
            && self.properties.is_empty()
    }

    /// Flatten the query into the parameter mapping sent with a call.
    ///
    /// Keys appear in the order the query was built: `$limit`, `$skip`,
    /// `$sort`, `$select`, then properties. Several operators on the same
    /// property are merged into one nested mapping.
    pub fn serialize(&self) -> Map<String, Value> {
        let mut params = Map::new();

        if let Some(limit) = self.limit {
            params.insert("$limit".to_string(), Value::from(limit));
        }
        if let Some(skip) = self.skip {
            params.insert("$skip".to_string(), Value::from(skip));
        }
        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(|(property, order)| (property.clone(), order.as_value()))
                .collect();
            params.insert("$sort".to_string(), Value::Object(sort));
        }
        if !self.select.is_empty() {
            let select = self.select.iter().cloned().map(Value::String).collect();
            params.insert(SELECT_KEY.to_string(), Value::Array(select));
        }

        for (property, filter) in &self.properties {
            match filter {
                PropertyFilter::Equal(value) => {
                    params.insert(property.clone(), value.clone());
                }
                PropertyFilter::Operator(operator, value) => {
                    let entry = params
                        .entry(property.clone())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if !entry.is_object() {
                        *entry = Value::Object(Map::new());
                    }
                    if let Value::Object(nested) = entry {
                        nested.insert(operator.key().to_string(), value.clone());
                    }
                }
            }
        }

        params
    }
}
