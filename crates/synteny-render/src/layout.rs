//! Species rows and per-chromosome x offsets for the overview scene.

use crate::scale::LinearScale;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use synteny_protocol::{Chromosome, Dataset};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    pub enabled: bool,
    /// Single annotations narrower than this (px) are not drawn.
    pub min_visible_px: f64,
    /// Neighbours closer than this (px) merge into one cluster.
    pub cluster_threshold_px: f64,
    pub max_visible_genes: usize,
    pub max_tracks: usize,
    /// Arrowheads are only drawn on genes wider than this (px).
    pub arrow_min_px: f64,
    pub track_height: f64,
    pub track_gap: f64,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_visible_px: 1.0,
            cluster_threshold_px: 2.0,
            max_visible_genes: 2000,
            max_tracks: 3,
            arrow_min_px: 6.0,
            track_height: 6.0,
            track_gap: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub margin_left: f64,
    pub margin_top: f64,
    pub chromosome_height: f64,
    pub chromosome_spacing: f64,
    pub row_gap: f64,
    /// Pixel width of the largest chromosome; every other one scales relative to it.
    pub chromosome_max_width: f64,
    pub centromere_indent: f64,
    pub label_font_size: f64,
    pub annotations: AnnotationConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_left: 120.0,
            margin_top: 40.0,
            chromosome_height: 20.0,
            chromosome_spacing: 30.0,
            row_gap: 200.0,
            chromosome_max_width: 600.0,
            centromere_indent: 5.0,
            label_font_size: 12.0,
            annotations: AnnotationConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChromosomePlacement {
    pub chromosome_id: String,
    pub x: f64,
    pub width: f64,
    pub size_bp: u64,
}

impl ChromosomePlacement {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesRow {
    pub species: String,
    pub y: f64,
    pub chromosomes: Vec<ChromosomePlacement>,
}

/// Precomputed offsets so endpoint lookups are O(1) per block instead of a
/// walk over the species' chromosome list.
#[derive(Clone, Debug)]
pub struct OverviewLayout {
    config: LayoutConfig,
    scale: LinearScale,
    rows: Vec<SpeciesRow>,
    index: HashMap<(String, String), (usize, usize)>,
}

impl OverviewLayout {
    /// Lays out one row per species in `species_order`, keeping only the
    /// chromosomes `include` accepts. Chromosomes of a row are placed left to
    /// right in data order, separated by the configured spacing.
    pub fn compute(
        dataset: &Dataset,
        species_order: &[String],
        include: impl Fn(&Chromosome) -> bool,
        config: &LayoutConfig,
    ) -> Self {
        let shown: Vec<Vec<&Chromosome>> = species_order
            .iter()
            .map(|species| dataset.chromosomes_of(species).filter(|c| include(c)).collect())
            .collect();
        let max_bp = shown
            .iter()
            .flatten()
            .map(|c| c.size_bp)
            .max()
            .unwrap_or(0);
        let scale = LinearScale::for_layout(max_bp, config.chromosome_max_width);

        let mut rows = vec![];
        let mut index = HashMap::new();
        for (row_idx, (species, chromosomes)) in species_order.iter().zip(shown).enumerate() {
            let mut x = config.margin_left;
            let mut placements = vec![];
            for (chr_idx, chr) in chromosomes.into_iter().enumerate() {
                let width = scale.scale_bp(chr.size_bp);
                placements.push(ChromosomePlacement {
                    chromosome_id: chr.chromosome_id.clone(),
                    x,
                    width,
                    size_bp: chr.size_bp,
                });
                index.insert(
                    (species.clone(), chr.chromosome_id.clone()),
                    (row_idx, chr_idx),
                );
                x += width + config.chromosome_spacing;
            }
            rows.push(SpeciesRow {
                species: species.clone(),
                y: config.margin_top + row_idx as f64 * config.row_gap,
                chromosomes: placements,
            });
        }

        Self {
            config: config.clone(),
            scale,
            rows,
            index,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn scale(&self) -> &LinearScale {
        &self.scale
    }

    pub fn rows(&self) -> &[SpeciesRow] {
        &self.rows
    }

    pub fn row(&self, species: &str) -> Option<&SpeciesRow> {
        self.rows.iter().find(|r| r.species == species)
    }

    pub fn row_index(&self, species: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.species == species)
    }

    pub fn placement(&self, species: &str, chromosome_id: &str) -> Option<&ChromosomePlacement> {
        let (row, chr) = self
            .index
            .get(&(species.to_string(), chromosome_id.to_string()))?;
        self.rows.get(*row)?.chromosomes.get(*chr)
    }

    pub fn row_y(&self, species: &str) -> Option<f64> {
        self.row(species).map(|r| r.y)
    }

    /// Pixel x of a base-pair position on a placed chromosome.
    pub fn x_of(&self, species: &str, chromosome_id: &str, position: u64) -> Option<f64> {
        let placement = self.placement(species, chromosome_id)?;
        Some(placement.x + self.scale.scale_bp(position).min(placement.width))
    }

    /// Pixel `(x, width)` of `[start, end]` on a placed chromosome, clamped so
    /// it never runs past the chromosome's right edge.
    pub fn interval(
        &self,
        species: &str,
        chromosome_id: &str,
        start: u64,
        end: u64,
    ) -> Option<(f64, f64)> {
        let placement = self.placement(species, chromosome_id)?;
        let x = placement.x + self.scale.scale_bp(start).min(placement.width);
        let width = self
            .scale
            .span(start, end)
            .min(placement.right() - x)
            .max(0.0);
        Some((x, width))
    }

    /// Right-most chromosome edge over all rows.
    pub fn content_width(&self) -> f64 {
        self.rows
            .iter()
            .filter_map(|r| r.chromosomes.last())
            .map(|p| p.right())
            .fold(self.config.margin_left, f64::max)
    }

    pub fn content_height(&self) -> f64 {
        self.rows
            .last()
            .map(|r| r.y + self.config.chromosome_height)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                Chromosome::new("A", "chr1", 1000),
                Chromosome::new("A", "chr2", 500),
                Chromosome::new("B", "b1", 250),
            ],
            vec![],
            vec![],
        )
    }

    fn config() -> LayoutConfig {
        LayoutConfig {
            margin_left: 10.0,
            margin_top: 5.0,
            chromosome_spacing: 20.0,
            row_gap: 100.0,
            chromosome_max_width: 400.0,
            ..Default::default()
        }
    }

    #[test]
    fn offsets_accumulate_widths_and_spacing() {
        let species = vec!["A".to_string(), "B".to_string()];
        let layout = OverviewLayout::compute(&dataset(), &species, |_| true, &config());
        let chr2 = layout.placement("A", "chr2").unwrap();
        assert_eq!(chr2.x, 10.0 + 400.0 + 20.0);
        assert_eq!(chr2.width, 200.0);
        assert_eq!(layout.placement("B", "b1").unwrap().width, 100.0);
        assert_eq!(layout.row_y("B"), Some(105.0));
        assert_eq!(layout.content_width(), 630.0);
    }

    #[test]
    fn interval_is_clamped_to_chromosome() {
        let species = vec!["A".to_string()];
        let layout = OverviewLayout::compute(&dataset(), &species, |_| true, &config());
        let (x, w) = layout.interval("A", "chr2", 400, 900).unwrap();
        assert_eq!(x, 430.0 + 160.0);
        assert_eq!(w, 40.0);
        let (_, w) = layout.interval("A", "chr2", 100, 100).unwrap();
        assert_eq!(w, 0.0);
        assert_eq!(layout.interval("A", "missing", 0, 1), None);
        assert_eq!(layout.interval("B", "b1", 0, 1), None);
    }

    #[test]
    fn excluded_chromosomes_shift_offsets() {
        let species = vec!["A".to_string()];
        let layout =
            OverviewLayout::compute(&dataset(), &species, |c| c.chromosome_id != "chr1", &config());
        assert!(layout.placement("A", "chr1").is_none());
        let chr2 = layout.placement("A", "chr2").unwrap();
        assert_eq!(chr2.x, 10.0);
        assert_eq!(chr2.width, 400.0);
    }

    #[test]
    fn empty_dataset_yields_empty_rows() {
        let layout = OverviewLayout::compute(&Dataset::default(), &[], |_| true, &config());
        assert!(layout.rows().is_empty());
        assert_eq!(layout.content_height(), 0.0);
    }
}
