//! Figure types and their parameter contracts.
//!
//! The set of figures is closed: each `FigureType` has exactly one row in
//! [`FIGURES`] naming its rendering collaborator and the request fields it
//! consumes. Turning a request into a [`RenderJob`] validates only those
//! fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};
use crate::renderer::RenderJob;
use crate::request::PlotRequest;

/// Column charted by `typical_material_analyses` when no performance is given.
pub const DEFAULT_INTERESTED_COLUMN: &str = "Dehydrogenation temperature_processed";

/// Top-N used when `number_of_interested_elements` is empty.
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureType {
    PublicationTrend,
    MaterialTypeBasedTrend,
    MaterialTypeRatio,
    TypicalMaterialAnalyses,
}

/// A `PlotRequest` field a figure reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    YearRange,
    MaterialType,
    NumberOfInterestedElements,
    InterestedPerformance,
    ElementsInTypicalMaterial,
    ColorList,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::YearRange                  => "year_range",
            Field::MaterialType               => "material_type",
            Field::NumberOfInterestedElements => "number_of_interested_elements",
            Field::InterestedPerformance      => "interested_performance",
            Field::ElementsInTypicalMaterial  => "elements_in_typical_material",
            Field::ColorList                  => "color_list",
        }
    }
}

/// Descriptor row for one figure type.
#[derive(Debug)]
pub struct FigureSpec {
    pub figure: FigureType,
    /// Wire tag accepted in `figure_type`.
    pub tag: &'static str,
    /// Entry point of the plotting collaborator that draws this figure.
    pub renderer: &'static str,
    pub fields: &'static [Field],
}

pub static FIGURES: [FigureSpec; 4] = [
    FigureSpec {
        figure: FigureType::PublicationTrend,
        tag: "publication_trend",
        renderer: "plot_hydrogen_material_trend",
        fields: &[Field::YearRange, Field::MaterialType, Field::ColorList],
    },
    FigureSpec {
        figure: FigureType::MaterialTypeBasedTrend,
        tag: "material_type_based_trend",
        renderer: "plot_hydrogen_density_distribution",
        fields: &[
            Field::YearRange,
            Field::MaterialType,
            Field::NumberOfInterestedElements,
            Field::InterestedPerformance,
            Field::ColorList,
        ],
    },
    FigureSpec {
        figure: FigureType::MaterialTypeRatio,
        tag: "material_type_ratio",
        renderer: "plot_material_type_distribution",
        fields: &[Field::YearRange, Field::MaterialType, Field::ColorList],
    },
    FigureSpec {
        figure: FigureType::TypicalMaterialAnalyses,
        tag: "typical_material_analyses",
        renderer: "plot_typical_material_element_analyses",
        fields: &[
            Field::MaterialType,
            Field::ElementsInTypicalMaterial,
            Field::InterestedPerformance,
            Field::NumberOfInterestedElements,
            Field::ColorList,
        ],
    },
];

impl FigureType {
    pub const ALL: [FigureType; 4] = [
        FigureType::PublicationTrend,
        FigureType::MaterialTypeBasedTrend,
        FigureType::MaterialTypeRatio,
        FigureType::TypicalMaterialAnalyses,
    ];

    pub fn spec(self) -> &'static FigureSpec {
        &FIGURES[self as usize]
    }

    pub fn tag(self) -> &'static str {
        self.spec().tag
    }

    pub fn reads(self, field: Field) -> bool {
        self.spec().fields.contains(&field)
    }

    /// Validate the fields this figure reads and build its render job.
    pub fn job(self, req: &PlotRequest) -> Result<RenderJob> {
        if self.reads(Field::YearRange) && req.year_range.0 > req.year_range.1 {
            return Err(PlotError::InvalidParameter(format!(
                "year_range start {} is after end {}",
                req.year_range.0, req.year_range.1
            )));
        }
        if self.reads(Field::ColorList) && req.color_list.is_empty() {
            return Err(PlotError::InvalidParameter("color_list must not be empty".into()));
        }
        let top_n = if self.reads(Field::NumberOfInterestedElements) {
            parse_top_n(&req.number_of_interested_elements)?
        } else {
            DEFAULT_TOP_N
        };

        let job = match self {
            FigureType::PublicationTrend => RenderJob::PublicationTrend {
                year_range: req.year_range,
                material_type: req.material_type.clone(),
                color_list: req.color_list.clone(),
            },
            FigureType::MaterialTypeBasedTrend => RenderJob::MaterialTypeBasedTrend {
                year_range: req.year_range,
                material_type: req.material_type.clone(),
                number_of_interested_elements: req.number_of_interested_elements.clone(),
                interested_performance: req.interested_performance.clone(),
                color_list: req.color_list.clone(),
            },
            FigureType::MaterialTypeRatio => RenderJob::MaterialTypeRatio {
                year_range: req.year_range,
                material_type: req.material_type.clone(),
                color_list: req.color_list.clone(),
            },
            FigureType::TypicalMaterialAnalyses => RenderJob::TypicalMaterialAnalyses {
                material_type_targets: req.material_type.clone(),
                element_targets: req.elements_in_typical_material.clone(),
                interested_col: req
                    .interested_performance
                    .first()
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_INTERESTED_COLUMN.to_string()),
                top_n,
                color_list: req.color_list.clone(),
            },
        };
        Ok(job)
    }
}

/// Empty means "use the default"; anything else must be a non-negative integer.
fn parse_top_n(raw: &str) -> Result<usize> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_TOP_N);
    }
    raw.parse::<usize>().map_err(|_| {
        PlotError::InvalidParameter(format!(
            "number_of_interested_elements must be an integer, got {:?}",
            raw
        ))
    })
}

impl FromStr for FigureType {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        FIGURES
            .iter()
            .find(|spec| spec.tag == s)
            .map(|spec| spec.figure)
            .ok_or_else(|| PlotError::UnsupportedFigureType(s.to_string()))
    }
}

impl fmt::Display for FigureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
