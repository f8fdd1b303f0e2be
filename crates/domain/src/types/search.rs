//! Search request body for `POST /rest/entities/<Entity>/search`

use serde::{Deserialize, Serialize};

/// Filter, paging and sort parameters
///
/// Also used as the trailing segment of a parameterized list cache key, so two
/// equal parameter sets always address the same entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Conditions, all of which must hold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    /// Maximum number of results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Results to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Sort expression, e.g. `-username`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

/// Conjunction of conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Conditions in request order.
    pub conditions: Vec<Condition>,
}

/// One property comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Entity attribute name.
    pub property: String,
    /// Comparison.
    pub operator: Operator,
    /// Right-hand operand.
    pub value: ConditionValue,
}

/// Comparison operators understood by the search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `=`
    #[serde(rename = "=")]
    Eq,
    /// `contains`
    #[serde(rename = "contains")]
    Contains,
    /// `startsWith`
    #[serde(rename = "startsWith")]
    StartsWith,
    /// `endsWith`
    #[serde(rename = "endsWith")]
    EndsWith,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `>=`
    #[serde(rename = ">=")]
    Gte,
    /// `<=`
    #[serde(rename = "<=")]
    Lte,
}

/// String, number or boolean operand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    /// Boolean operand.
    Bool(bool),
    /// Numeric operand.
    Number(serde_json::Number),
    /// String operand.
    Text(String),
}

impl SearchParams {
    /// No filter, paging or sort.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter condition.
    pub fn condition(
        mut self,
        property: impl Into<String>,
        operator: Operator,
        value: impl Into<ConditionValue>,
    ) -> Self {
        self.filter.get_or_insert_with(Filter::default).conditions.push(Condition {
            property: property.into(),
            operator,
            value: value.into(),
        });
        self
    }

    /// Cap the result count.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `offset` results.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sort by `sort`.
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ConditionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConditionValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for ConditionValue {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}
