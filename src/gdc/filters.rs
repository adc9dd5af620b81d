//! GDC filter and query-parameter builders
//!
//! GDC search endpoints take a JSON filter tree passed as a single
//! URL-encoded `filters` parameter, e.g.
//! `{"op":"in","content":{"field":"cases.project.project_id","value":["TCGA-BRCA"]}}`.

use serde_json::{json, Value};

/// `{"op":"in"}` filter matching `field` against any of `values`
pub fn in_filter<S: AsRef<str>>(field: &str, values: &[S]) -> Value {
    let values: Vec<&str> = values.iter().map(|v| v.as_ref()).collect();
    json!({
        "op": "in",
        "content": {
            "field": field,
            "value": values,
        }
    })
}

/// `{"op":"and"}` conjunction of filters
pub fn and(filters: Vec<Value>) -> Value {
    json!({
        "op": "and",
        "content": filters,
    })
}

/// Restrict a query to one TCGA project
pub fn project_filter(project_id: &str) -> Value {
    in_filter("cases.project.project_id", &[project_id])
}

/// Query string for a GDC search endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub filters: Value,
    pub fields: Vec<String>,
    pub size: usize,
}

impl QueryParams {
    pub fn new(filters: Value, fields: &[&str], size: usize) -> Self {
        Self {
            filters,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            size,
        }
    }

    /// Key/value pairs for `reqwest::RequestBuilder::query`
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("filters", self.filters.to_string()),
            ("fields", self.fields.join(",")),
            ("size", self.size.to_string()),
            ("format", "JSON".to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_filter_shape() {
        let filter = in_filter("files.data_type", &["Gene Expression Quantification"]);
        assert_eq!(filter["op"], "in");
        assert_eq!(filter["content"]["field"], "files.data_type");
        assert_eq!(filter["content"]["value"][0], "Gene Expression Quantification");
    }

    #[test]
    fn test_and_nests_filters() {
        let filter = and(vec![
            project_filter("TCGA-BRCA"),
            in_filter("files.experimental_strategy", &["RNA-Seq"]),
        ]);
        assert_eq!(filter["op"], "and");
        let content = filter["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["content"]["field"], "cases.project.project_id");
        assert_eq!(content[0]["content"]["value"][0], "TCGA-BRCA");
    }

    #[test]
    fn test_query_pairs() {
        let params = QueryParams::new(project_filter("TCGA-BRCA"), &["case_id", "demographic"], 100);
        let pairs = params.to_pairs();

        assert_eq!(pairs[1], ("fields", "case_id,demographic".to_string()));
        assert_eq!(pairs[2], ("size", "100".to_string()));
        assert_eq!(pairs[3], ("format", "JSON".to_string()));

        let filters: Value = serde_json::from_str(&pairs[0].1).unwrap();
        assert_eq!(filters, project_filter("TCGA-BRCA"));
    }
}
