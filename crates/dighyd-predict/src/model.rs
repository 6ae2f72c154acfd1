//! Pretrained regressor.

use std::path::{Path, PathBuf};

use gbdt::decision_tree::{Data, VALUE_TYPE_UNKNOWN};
use gbdt::gradient_boost::GBDT;
use tracing::info;

use crate::error::{PredictError, Result};

/// A fitted model mapping one feature vector to one scalar.
///
/// Implementations are loaded once and shared read-only across requests.
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &[f32]) -> Result<f64>;
}

/// XGBoost objectives that yield one scalar per row, as gbdt names them.
const SCALAR_OBJECTIVES: &[&str] = &["reg:linear", "reg:logistic", "binary:logistic", "binary:logitraw"];

/// Map an XGBoost objective name onto the name gbdt understands.
///
/// `reg:squarederror` is the current XGBoost name for `reg:linear`.
pub fn gbdt_objective(objective: &str) -> Result<&'static str> {
    let name = match objective {
        "reg:squarederror" => "reg:linear",
        other => other,
    };
    SCALAR_OBJECTIVES
        .iter()
        .find(|o| **o == name)
        .copied()
        .ok_or_else(|| {
            PredictError::ModelLoad(format!(
                "unsupported objective {:?} (expected reg:squarederror or one of {})",
                objective,
                SCALAR_OBJECTIVES.join(", ")
            ))
        })
}

/// Boosted-tree ensemble evaluated with the `gbdt` crate.
///
/// The artifact is an XGBoost model converted to gbdt's dump format.
pub struct GbdtRegressor {
    model: GBDT,
    path: PathBuf,
}

impl GbdtRegressor {
    pub fn load<P: AsRef<Path>>(path: P, objective: &str) -> Result<Self> {
        let path = path.as_ref();
        let objective = gbdt_objective(objective)?;
        let path_str = path.to_str().ok_or_else(|| {
            PredictError::ModelLoad(format!("model path {:?} is not valid UTF-8", path))
        })?;

        let model = GBDT::from_xgboost_dump(path_str, objective)
            .map_err(|e| PredictError::ModelLoad(format!("{}: {}", path.display(), e)))?;

        info!("Loaded boosted-tree model from {:?} ({})", path, objective);
        Ok(Self {
            model,
            path: path.to_path_buf(),
        })
    }

    /// Build from an in-memory dump: the base score on the first line, then the trees as JSON.
    pub fn from_reader<R: std::io::BufRead>(reader: R, objective: &str) -> Result<Self> {
        let objective = gbdt_objective(objective)?;
        let model = GBDT::from_xgboost_reader(reader, objective)
            .map_err(|e| PredictError::ModelLoad(e.to_string()))?;
        Ok(Self {
            model,
            path: PathBuf::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// NaN marks a missing feature; gbdt routes only its own sentinel down the
/// learned missing-value branch.
fn to_gbdt_row(features: &[f32]) -> Vec<f32> {
    features
        .iter()
        .map(|v| if v.is_nan() { VALUE_TYPE_UNKNOWN } else { *v })
        .collect()
}

impl Regressor for GbdtRegressor {
    fn predict(&self, features: &[f32]) -> Result<f64> {
        let batch = vec![Data::new_test_data(to_gbdt_row(features), None)];
        let predictions = self.model.predict(&batch);
        predictions
            .first()
            .map(|v| f64::from(*v))
            .ok_or_else(|| PredictError::Inference("model returned no prediction".to_string()))
    }
}

impl std::fmt::Debug for GbdtRegressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GbdtRegressor")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GbdtRegressor::load(dir.path().join("xgb_model.dump"), "reg:linear").unwrap_err();
        assert!(matches!(err, PredictError::ModelLoad(_)));
    }

    /// Base score 0.5 and one stump on f0 < 0.5; missing values take the `yes` branch.
    const STUMP_DUMP: &str = r#"0.5
[{"nodeid": 0, "depth": 0, "split": "f0", "split_condition": 0.5, "yes": 1, "no": 2, "missing": 1,
  "children": [{"nodeid": 1, "leaf": 1.0}, {"nodeid": 2, "leaf": 2.0}]}]
"#;

    fn stump() -> GbdtRegressor {
        GbdtRegressor::from_reader(STUMP_DUMP.as_bytes(), "reg:linear").unwrap()
    }

    #[test]
    fn test_stump_adds_base_score_to_leaf() {
        let model = stump();
        assert!((model.predict(&[0.1]).unwrap() - 1.5).abs() < 1e-6);
        assert!((model.predict(&[0.9]).unwrap() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_nan_feature_follows_missing_branch() {
        let value = stump().predict(&[f32::NAN]).unwrap();
        assert!((value - 1.5).abs() < 1e-6, "got {value}");
    }

    #[test]
    fn test_load_reads_dump_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xgb_model.dump");
        std::fs::write(&path, STUMP_DUMP).unwrap();

        let model = GbdtRegressor::load(&path, "reg:squarederror").unwrap();
        assert_eq!(model.path(), path.as_path());
        assert!((model.predict(&[0.9]).unwrap() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_objective_names() {
        assert_eq!(gbdt_objective("reg:squarederror").unwrap(), "reg:linear");
        assert_eq!(gbdt_objective("reg:logistic").unwrap(), "reg:logistic");
        assert!(matches!(
            gbdt_objective("reg:pseudohubererror"),
            Err(PredictError::ModelLoad(_))
        ));
        assert!(matches!(
            GbdtRegressor::from_reader(STUMP_DUMP.as_bytes(), "multi:softmax"),
            Err(PredictError::ModelLoad(_))
        ));
    }
}
