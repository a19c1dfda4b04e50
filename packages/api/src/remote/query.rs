//! Table query description shared by the REST client and the in-memory fake.

use serde_json::Value;

/// A single row filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    In(String, Vec<Value>),
}

impl Filter {
    fn column(&self) -> &str {
        match self {
            Filter::Eq(column, _) | Filter::In(column, _) => column,
        }
    }

    /// PostgREST operator expression, e.g. `eq.42` or `in.("a","b")`.
    fn expression(&self) -> String {
        match self {
            Filter::Eq(_, value) => format!("eq.{}", literal(value)),
            Filter::In(_, values) => {
                let list: Vec<String> = values.iter().map(quoted).collect();
                format!("in.({})", list.join(","))
            }
        }
    }

    fn matches(&self, row: &Value) -> bool {
        let cell = row.get(self.column()).unwrap_or(&Value::Null);
        match self {
            Filter::Eq(_, value) => loosely_equal(cell, value),
            Filter::In(_, values) => values.iter().any(|v| loosely_equal(cell, v)),
        }
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn quoted(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        other => other.to_string(),
    }
}

/// Compare the way the REST layer does: everything arrives as text.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    a == b || (!a.is_null() && literal(a) == literal(b))
}

/// Select/update/delete target: a table, a projection and row filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: String,
    pub filters: Vec<Filter>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
        }
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.into(), value.into()));
        self
    }

    pub fn is_in<V: Into<Value>>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filters.push(Filter::In(
            column.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Query-string pairs for the REST endpoint.
    pub fn to_params(&self, include_select: bool) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 1);
        if include_select {
            params.push(("select".to_string(), self.columns.clone()));
        }
        params.extend(
            self.filters
                .iter()
                .map(|f| (f.column().to_string(), f.expression())),
        );
        params
    }

    /// Whether `row` passes every filter.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Apply the column projection to `row`.
    pub fn project(&self, row: &Value) -> Value {
        if self.columns.trim() == "*" {
            return row.clone();
        }
        let Some(object) = row.as_object() else {
            return row.clone();
        };
        let projected = self
            .columns
            .split(',')
            .map(str::trim)
            .filter_map(|column| object.get(column).map(|v| (column.to_string(), v.clone())))
            .collect();
        Value::Object(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params() {
        let query = Query::table("saved_posts")
            .select("post_id, is_sold")
            .eq("user_id", "u1")
            .is_in("post_id", [json!(1), json!("a\"b")]);
        assert_eq!(
            query.to_params(true),
            vec![
                ("select".to_string(), "post_id, is_sold".to_string()),
                ("user_id".to_string(), "eq.u1".to_string()),
                ("post_id".to_string(), "in.(1,\"a\\\"b\")".to_string()),
            ]
        );
        assert_eq!(query.to_params(false).len(), 2);
    }

    #[test]
    fn test_matches_text_and_numbers() {
        let row = json!({ "user_id": "u1", "post_id": 7, "is_sold": false });
        assert!(Query::table("t").eq("user_id", "u1").eq("post_id", "7").matches(&row));
        assert!(Query::table("t").is_in("post_id", ["3", "7"]).matches(&row));
        assert!(!Query::table("t").eq("user_id", "u2").matches(&row));
        assert!(!Query::table("t").eq("missing", "x").matches(&row));
    }

    #[test]
    fn test_projection() {
        let row = json!({ "post_id": 7, "user_id": "u1", "is_sold": true });
        assert_eq!(
            Query::table("t").select("post_id,is_sold").project(&row),
            json!({ "post_id": 7, "is_sold": true })
        );
        assert_eq!(Query::table("t").project(&row), row);
    }
}
