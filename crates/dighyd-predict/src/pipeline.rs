//! Formula in, prediction out.
//!
//! Every stage returns its own `PredictError` variant, so callers can tell a
//! bad formula (client error) from a schema or model fault (server error).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::composition::Composition;
use crate::error::{PredictError, Result};
use crate::featurize::{fraction_features, ElementPropertyFeaturizer, FeatureRow};
use crate::model::Regressor;
use crate::schema::FeatureSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: f64,
    pub formula: String,
    pub markdown: String,
}

/// Human-readable summary with the value at four decimals.
pub fn summary_markdown(formula: &str, value: f64) -> String {
    format!("**Predicted value for `{}`:** `{:.4}`", formula, value)
}

/// Shared, read-only prediction state built once at startup.
#[derive(Clone)]
pub struct PredictionPipeline {
    featurizer: Arc<dyn ElementPropertyFeaturizer>,
    regressor: Arc<dyn Regressor>,
    schema: Arc<FeatureSchema>,
}

impl PredictionPipeline {
    pub fn new(
        featurizer: Arc<dyn ElementPropertyFeaturizer>,
        regressor: Arc<dyn Regressor>,
        schema: FeatureSchema,
    ) -> Self {
        Self {
            featurizer,
            regressor,
            schema: Arc::new(schema),
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn parse(&self, formula: &str) -> Result<Composition> {
        Composition::parse(formula).map_err(|source| PredictError::InvalidFormula {
            formula: formula.to_string(),
            source,
        })
    }

    /// Element-property statistics merged with `frac_` columns for the schema.
    pub async fn features(&self, composition: &Composition) -> Result<FeatureRow> {
        let mut row = self.featurizer.featurize(composition).await?;
        row.extend(fraction_features(composition, self.schema.fraction_elements()));
        Ok(row)
    }

    pub fn select(&self, row: &FeatureRow) -> Result<Vec<f32>> {
        self.schema.select(row)
    }

    /// Tree evaluation is CPU-bound, so it runs off the async workers.
    pub async fn infer(&self, features: Vec<f32>) -> Result<f64> {
        let regressor = Arc::clone(&self.regressor);
        let value = tokio::task::spawn_blocking(move || regressor.predict(&features))
            .await
            .map_err(|e| PredictError::Inference(e.to_string()))??;

        if !value.is_finite() {
            return Err(PredictError::Inference(format!(
                "model produced a non-finite value ({})",
                value
            )));
        }
        Ok(value)
    }

    pub async fn predict(&self, formula: &str) -> Result<Prediction> {
        let composition = self.parse(formula)?;
        debug!("Parsed {:?} as {}", formula, composition);

        let row = self.features(&composition).await?;
        let features = self.select(&row)?;
        let value = self.infer(features).await?;

        info!("Predicted {:.4} for {:?}", value, formula);
        Ok(Prediction {
            prediction: value,
            formula: formula.to_string(),
            markdown: summary_markdown(formula, value),
        })
    }
}

impl std::fmt::Debug for PredictionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionPipeline")
            .field("schema_columns", &self.schema.len())
            .finish()
    }
}
