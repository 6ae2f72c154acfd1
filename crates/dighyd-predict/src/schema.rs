//! Training-time feature schema: the ordered column list the model expects.

use std::path::Path;

use tracing::info;

use crate::error::{PredictError, Result};
use crate::featurize::{FeatureRow, FRACTION_PREFIX};

/// Missing column names listed in a mismatch error before truncating.
const MISSING_LISTED: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// One column name per line; surrounding whitespace and blank lines are dropped.
    pub fn parse(content: &str) -> Self {
        let columns = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self { columns }
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let schema = Self::parse(&content);
        if schema.columns.is_empty() {
            return Err(PredictError::ModelLoad(format!(
                "feature list {:?} is empty",
                path
            )));
        }
        info!("Loaded {} feature names from {:?}", schema.len(), path);
        Ok(schema)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Elements named by the `frac_<El>` columns, in schema order.
    pub fn fraction_elements(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter_map(|c| c.strip_prefix(FRACTION_PREFIX))
    }

    /// Project `row` onto the schema's columns, in order.
    pub fn select(&self, row: &FeatureRow) -> Result<Vec<f32>> {
        let mut values = Vec::with_capacity(self.columns.len());
        let mut missing = Vec::new();

        for column in &self.columns {
            match row.get(column) {
                Some(v) => values.push(*v as f32),
                None => missing.push(column.as_str()),
            }
        }

        if missing.is_empty() {
            return Ok(values);
        }

        let mut listed = missing
            .iter()
            .take(MISSING_LISTED)
            .map(|c| format!("'{}'", c))
            .collect::<Vec<_>>()
            .join(", ");
        if missing.len() > MISSING_LISTED {
            listed.push_str(", ...");
        }
        Err(PredictError::FeatureMismatch(format!(
            "{} of {} expected columns not in featurizer output: [{}]",
            missing.len(),
            self.columns.len(),
            listed
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, f64)]) -> FeatureRow {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_parse_trims_and_skips_blank_lines() {
        let schema = FeatureSchema::parse("MagpieData mean Number\n  frac_H \n\nfrac_Li\r\n");
        assert_eq!(
            schema.columns(),
            &["MagpieData mean Number", "frac_H", "frac_Li"]
        );
        assert_eq!(schema.fraction_elements().collect::<Vec<_>>(), vec!["H", "Li"]);
    }

    #[test]
    fn test_select_follows_schema_order_and_drops_extras() {
        let schema = FeatureSchema::parse("b\na\n");
        let values = schema.select(&row(&[("a", 1.0), ("b", 2.0), ("extra", 9.0)])).unwrap();
        assert_eq!(values, vec![2.0, 1.0]);
    }

    #[test]
    fn test_select_reports_missing_columns() {
        let schema = FeatureSchema::parse("a\nb\nc\n");
        let err = schema.select(&row(&[("a", 1.0)])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Feature mismatch: 2 of 3"), "{msg}");
        assert!(msg.contains("'b', 'c'"), "{msg}");
    }

    #[tokio::test]
    async fn test_load_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature_names.txt");
        std::fs::write(&path, "\n\n").unwrap();
        assert!(matches!(
            FeatureSchema::load(&path).await,
            Err(PredictError::ModelLoad(_))
        ));

        std::fs::write(&path, "frac_H\nfrac_Li\n").unwrap();
        assert_eq!(FeatureSchema::load(&path).await.unwrap().len(), 2);
    }
}
