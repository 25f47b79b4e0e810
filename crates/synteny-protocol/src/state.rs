//! Plain, JSON-serializable view state shared with the persistence layer.

use crate::error::ProtocolError;
use crate::model::{MutationType, Strand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pan/zoom transform: screen = content * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl ViewportTransform {
    pub const IDENTITY: ViewportTransform = ViewportTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    pub fn apply(&self, point: (f64, f64)) -> (f64, f64) {
        (point.0 * self.k + self.x, point.1 * self.k + self.y)
    }

    pub fn invert(&self, point: (f64, f64)) -> (f64, f64) {
        if self.k == 0.0 {
            return (0.0, 0.0);
        }
        ((point.0 - self.x) / self.k, (point.1 - self.y) / self.k)
    }

    /// Linear interpolation of all three components, `t` in `[0, 1]`.
    pub fn lerp(&self, other: &ViewportTransform, t: f64) -> ViewportTransform {
        let t = t.clamp(0.0, 1.0);
        ViewportTransform {
            k: self.k + (other.k - self.k) * t,
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn approx_eq(&self, other: &ViewportTransform) -> bool {
        (self.k - other.k).abs() < 1e-9
            && (self.x - other.x).abs() < 1e-9
            && (self.y - other.y).abs() < 1e-9
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentFilter {
    #[default]
    All,
    Forward,
    Reverse,
}

impl AlignmentFilter {
    pub fn accepts(self, strand: Strand) -> bool {
        match self {
            AlignmentFilter::All => true,
            AlignmentFilter::Forward => strand == Strand::Forward,
            AlignmentFilter::Reverse => strand == Strand::Reverse,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualizationState {
    pub selected_species: Vec<String>,
    pub selected_chromosomes: Vec<String>,
    pub alignment_filter: AlignmentFilter,
    pub show_connected_only: bool,
    pub transform: ViewportTransform,
    /// Selected blocks as `refChr-queryChr-refStart-queryStart` strings.
    pub selected_synteny: Vec<String>,
    pub mutation_types: BTreeMap<String, MutationType>,
    pub custom_species_colors: BTreeMap<String, String>,
}

impl VisualizationState {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn transform_apply_and_invert() {
        let t = ViewportTransform::new(2.0, 100.0, 50.0);
        assert_eq!(t.apply((10.0, 5.0)), (120.0, 60.0));
        assert_eq!(t.invert((120.0, 60.0)), (10.0, 5.0));
        let mid = ViewportTransform::IDENTITY.lerp(&t, 0.5);
        assert!(mid.approx_eq(&ViewportTransform::new(1.5, 50.0, 25.0)));
    }

    #[test]
    fn alignment_filter_accepts_strands() {
        assert!(AlignmentFilter::All.accepts(Strand::Reverse));
        assert!(AlignmentFilter::Forward.accepts(Strand::Forward));
        assert!(!AlignmentFilter::Forward.accepts(Strand::Reverse));
        assert!(AlignmentFilter::Reverse.accepts(Strand::Reverse));
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut state = VisualizationState {
            selected_species: vec!["B".to_string()],
            selected_chromosomes: vec!["ref:chr1".to_string(), "B:chr2".to_string()],
            alignment_filter: AlignmentFilter::Reverse,
            transform: ViewportTransform::new(2.0, 100.0, 50.0),
            selected_synteny: vec!["chr1-chr2-100-200".to_string()],
            ..Default::default()
        };
        state
            .mutation_types
            .insert("chr1-chr2-100-200".to_string(), MutationType::Inv);
        state
            .custom_species_colors
            .insert("B".to_string(), "#ff0000".to_string());
        let json = state.to_json().unwrap();
        assert!(json.contains("\"k\": 2.0"));
        assert!(json.contains("\"INV\""));
        assert!(json.contains("selectedSynteny"));
        assert_eq!(VisualizationState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn snapshot_tolerates_missing_fields() {
        let state = VisualizationState::from_json("{\"alignmentFilter\":\"forward\"}").unwrap();
        assert_eq!(state.alignment_filter, AlignmentFilter::Forward);
        assert_eq!(state.transform, ViewportTransform::IDENTITY);
    }
}
