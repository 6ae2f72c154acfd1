//! Incoming `/plot` request body.

use serde::{Deserialize, Deserializer, Serialize};

/// Parameters for one chart. Every field except `figure_type` may be omitted
/// or sent as `null`, which selects the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRequest {
    pub figure_type: String,

    /// Inclusive publication-year bounds.
    #[serde(default = "default_year_range", deserialize_with = "year_range_or_default")]
    pub year_range: (i32, i32),

    #[serde(default = "default_material_types", deserialize_with = "material_types_or_default")]
    pub material_type: Vec<String>,

    /// Integer-like string; numeric JSON is accepted too.
    #[serde(default = "default_number_of_elements", deserialize_with = "string_or_integer")]
    pub number_of_interested_elements: String,

    #[serde(default, deserialize_with = "list_or_empty")]
    pub interested_performance: Vec<String>,

    #[serde(default, deserialize_with = "list_or_empty")]
    pub elements_in_typical_material: Vec<String>,

    #[serde(default = "default_color_list", deserialize_with = "color_list_or_default")]
    pub color_list: Vec<String>,
}

fn default_year_range() -> (i32, i32) { (1972, 2025) }

fn default_material_types() -> Vec<String> {
    [
        "Interstitial Hydride",
        "Complex Hydride",
        "Multi-component Hydride",
        "Porous Material",
        "Ionic Hydride",
        "Superhydride",
        "Others",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_number_of_elements() -> String { "5".to_string() }

fn default_color_list() -> Vec<String> {
    ["#1f77b4", "#adc6ea", "#ff8800", "#fbb78f", "#98df8a", "#d62728", "#8c564b"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn null_or<'de, D, T>(deserializer: D, default: fn() -> T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_else(default))
}

fn year_range_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<(i32, i32), D::Error> {
    null_or(d, default_year_range)
}

fn material_types_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    null_or(d, default_material_types)
}

fn color_list_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    null_or(d, default_color_list)
}

fn list_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    null_or(d, Vec::new)
}

fn string_or_integer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Int(n)) => n.to_string(),
        None => default_number_of_elements(),
    })
}

impl PlotRequest {
    /// A request for `figure_type` with every other field at its default.
    pub fn with_defaults(figure_type: impl Into<String>) -> Self {
        Self {
            figure_type: figure_type.into(),
            year_range: default_year_range(),
            material_type: default_material_types(),
            number_of_interested_elements: default_number_of_elements(),
            interested_performance: Vec::new(),
            elements_in_typical_material: Vec::new(),
            color_list: default_color_list(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let req: PlotRequest =
            serde_json::from_str(r#"{"figure_type": "publication_trend"}"#).unwrap();
        assert_eq!(req, PlotRequest::with_defaults("publication_trend"));
        assert_eq!(req.year_range, (1972, 2025));
        assert_eq!(req.material_type.len(), 7);
        assert_eq!(req.color_list[0], "#1f77b4");
    }

    #[test]
    fn test_numeric_element_count_is_accepted() {
        let req: PlotRequest = serde_json::from_str(
            r#"{"figure_type": "typical_material_analyses", "number_of_interested_elements": 8}"#,
        )
        .unwrap();
        assert_eq!(req.number_of_interested_elements, "8");
    }

    #[test]
    fn test_year_range_reads_json_pair() {
        let req: PlotRequest = serde_json::from_str(
            r#"{"figure_type": "material_type_ratio", "year_range": [2000, 2010]}"#,
        )
        .unwrap();
        assert_eq!(req.year_range, (2000, 2010));
    }

    #[test]
    fn test_null_fields_take_defaults() {
        let req: PlotRequest = serde_json::from_str(
            r#"{
                "figure_type": "typical_material_analyses",
                "year_range": null,
                "material_type": null,
                "number_of_interested_elements": null,
                "interested_performance": null,
                "elements_in_typical_material": null,
                "color_list": null
            }"#,
        )
        .unwrap();
        assert_eq!(req, PlotRequest::with_defaults("typical_material_analyses"));
        assert_eq!(req.number_of_interested_elements, "5");
    }

    #[test]
    fn test_figure_type_is_required() {
        assert!(serde_json::from_str::<PlotRequest>("{}").is_err());
    }
}
