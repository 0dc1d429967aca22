//! Ordering of query results

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Caller-supplied ordering, applied after filtering and includes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderBy(pub(crate) Vec<(String, SortOrder)>);

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        Self(vec![(field.to_string(), SortOrder::Asc)])
    }

    pub fn desc(field: &str) -> Self {
        Self(vec![(field.to_string(), SortOrder::Desc)])
    }

    pub fn then_asc(mut self, field: &str) -> Self {
        self.0.push((field.to_string(), SortOrder::Asc));
        self
    }

    pub fn then_desc(mut self, field: &str) -> Self {
        self.0.push((field.to_string(), SortOrder::Desc));
        self
    }

    pub fn fields(&self) -> &[(String, SortOrder)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
