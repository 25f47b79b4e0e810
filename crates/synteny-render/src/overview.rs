//! Builds the full overview scene (species rows, chromosome glyphs, ribbons,
//! breakpoint markers) from a dataset and the current filters. The scene is
//! rebuilt from scratch whenever any input changes.

use crate::chromosome::ChromosomeGlyph;
use crate::geometry::{Point, Rect};
use crate::layout::{LayoutConfig, OverviewLayout};
use crate::ribbon::{block_visible, render_ribbon, RibbonContext, RibbonNodes, RibbonStyle};
use crate::scene::{Interaction, NodeId, Paint, Scene, SceneEvent, TextAnchor};
use crate::theme::{SpeciesColors, Theme};
use std::collections::{BTreeMap, HashSet};
use synteny_protocol::{
    AlignmentFilter, BlockKey, ChromosomeBreakpoint, Dataset, MutationType, Strand, SyntenyBlock,
};

/// Everything besides the data that shapes the overview.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverviewOptions {
    /// Query species to show; empty shows all of them.
    pub selected_species: Vec<String>,
    /// `ref:<chr>` and `<species>:<chr>` keys.
    pub selected_chromosomes: Vec<String>,
    pub alignment_filter: AlignmentFilter,
    pub show_connected_only: bool,
    pub show_breakpoints: bool,
    pub layout: LayoutConfig,
    pub ribbon: RibbonStyle,
    pub theme: Theme,
    pub species_colors: BTreeMap<String, String>,
    /// Keyed by the block's serialized identity key.
    pub mutation_types: BTreeMap<String, MutationType>,
    pub custom_coloring: bool,
}

#[derive(Clone, Debug)]
pub struct RenderedRibbon {
    pub key: BlockKey,
    pub strand: Strand,
    pub nodes: RibbonNodes,
}

#[derive(Clone, Debug)]
pub struct OverviewScene {
    pub scene: Scene,
    pub layout: OverviewLayout,
    pub species_order: Vec<String>,
    pub species_colors: SpeciesColors,
    pub ribbons: Vec<RenderedRibbon>,
}

impl OverviewScene {
    pub fn ribbon(&self, key: &BlockKey) -> Option<&RenderedRibbon> {
        self.ribbons.iter().find(|r| r.key == *key)
    }

    /// Bounds of every visible primitive; used for the minimap and export.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.scene.bounding_box()
    }
}

/// Reference first, then the selected query species in data order.
pub fn species_order(dataset: &Dataset, selected_species: &[String]) -> Vec<String> {
    dataset
        .species_names()
        .into_iter()
        .filter(|s| {
            *s == dataset.reference_species
                || selected_species.is_empty()
                || selected_species.contains(s)
        })
        .collect()
}

/// Blocks passing the species, strand and chromosome-selection filters.
pub fn visible_blocks<'a>(
    dataset: &'a Dataset,
    species: &[String],
    options: &OverviewOptions,
) -> Vec<&'a SyntenyBlock> {
    dataset
        .blocks
        .iter()
        .filter(|b| species.contains(&b.query_name))
        .filter(|b| options.alignment_filter.accepts(b.query_strand))
        .filter(|b| block_visible(b, &options.selected_chromosomes))
        .collect()
}

pub fn build_overview(dataset: &Dataset, options: &OverviewOptions) -> OverviewScene {
    let species = species_order(dataset, &options.selected_species);
    let blocks = visible_blocks(dataset, &species, options);

    let connected: HashSet<(&str, &str)> = blocks
        .iter()
        .flat_map(|b| {
            [
                (b.ref_species.as_str(), b.ref_chromosome_id.as_str()),
                (b.query_name.as_str(), b.query_chromosome_id.as_str()),
            ]
        })
        .collect();
    let layout = OverviewLayout::compute(
        dataset,
        &species,
        |c| {
            !options.show_connected_only
                || connected.contains(&(c.species_name.as_str(), c.chromosome_id.as_str()))
        },
        &options.layout,
    );
    let colors = SpeciesColors::new(species.clone(), options.species_colors.clone());

    let mut scene = Scene::new();
    let root = scene.root();
    let chromosomes = scene.create_group(root);
    draw_rows(&mut scene, chromosomes, dataset, &layout, &colors, options);

    let ribbon_layer = scene.create_group(root);
    let mut ribbons = vec![];
    for (index, block) in blocks.iter().enumerate() {
        let key = block.key();
        let ctx = RibbonContext {
            layout: &layout,
            style: &options.ribbon,
            species_colors: &colors,
            mutation_type: options.mutation_types.get(&key.to_string()).copied(),
            custom_coloring: options.custom_coloring,
        };
        if let Some(nodes) = render_ribbon(&mut scene, ribbon_layer, &ctx, block, index) {
            ribbons.push(RenderedRibbon {
                key,
                strand: block.query_strand,
                nodes,
            });
        }
    }

    if options.show_breakpoints {
        let overlay = scene.create_group(root);
        for breakpoint in &dataset.breakpoints {
            render_breakpoint(
                &mut scene,
                overlay,
                &layout,
                &dataset.reference_species,
                breakpoint,
                options.theme,
            );
        }
    }

    log::debug!(
        "Overview rebuilt: {} rows, {} of {} ribbons drawn",
        layout.rows().len(),
        ribbons.len(),
        dataset.blocks.len()
    );
    OverviewScene {
        scene,
        layout,
        species_order: species,
        species_colors: colors,
        ribbons,
    }
}

fn draw_rows(
    scene: &mut Scene,
    parent: NodeId,
    dataset: &Dataset,
    layout: &OverviewLayout,
    colors: &SpeciesColors,
    options: &OverviewOptions,
) {
    let config = layout.config();
    for row in layout.rows() {
        let label = scene.create_text(
            parent,
            Point::new(
                config.margin_left - 12.0,
                row.y + config.chromosome_height / 2.0 + config.label_font_size / 3.0,
            ),
            &row.species,
            TextAnchor::End,
            config.label_font_size + 1.0,
        );
        if let Some(style) = scene.style_mut(label) {
            style.fill = Some(Paint::Color(colors.color(&row.species)));
            style.font_weight = Some("bold".to_string());
            style.class = Some("species-label".to_string());
        }

        let annotations = (row.species == dataset.reference_species).then_some(&config.annotations);
        for placement in &row.chromosomes {
            let Some(chromosome) = dataset.find_chromosome(&row.species, &placement.chromosome_id)
            else {
                continue;
            };
            ChromosomeGlyph {
                chromosome,
                x: placement.x,
                y: row.y,
                height: config.chromosome_height,
                centromere_indent: config.centromere_indent,
                label_font_size: config.label_font_size,
                scale: layout.scale(),
                annotations,
                theme: options.theme,
            }
            .render(scene, parent);
        }
    }
}

/// Thin marker with a label above the reference chromosome the breakpoint
/// names. Breakpoints on chromosomes outside the layout are skipped.
pub fn render_breakpoint(
    scene: &mut Scene,
    parent: NodeId,
    layout: &OverviewLayout,
    reference_species: &str,
    breakpoint: &ChromosomeBreakpoint,
    theme: Theme,
) -> Option<NodeId> {
    let (Some((x, width)), Some(y)) = (
        layout.interval(
            reference_species,
            &breakpoint.ref_chromosome_id,
            breakpoint.start,
            breakpoint.end,
        ),
        layout.row_y(reference_species),
    ) else {
        log::debug!(
            "skipping breakpoint on unknown chromosome {}",
            breakpoint.ref_chromosome_id
        );
        return None;
    };
    let height = layout.config().chromosome_height;
    let group = scene.create_group(parent);
    let marker = scene.create_rect(group, Rect::new(x, y - 4.0, width.max(1.5), height + 8.0), 0.0);
    if let Some(style) = scene.style_mut(marker) {
        style.fill = Some(Paint::color("#f59e0b"));
        style.opacity = Some(0.8);
    }
    if !breakpoint.label.is_empty() {
        let label = scene.create_text(
            group,
            Point::new(x + width / 2.0, y - 20.0),
            &breakpoint.label,
            TextAnchor::Middle,
            layout.config().label_font_size - 2.0,
        );
        if let Some(style) = scene.style_mut(label) {
            style.fill = Some(Paint::color(theme.muted_text()));
            style.class = Some("breakpoint-label".to_string());
        }
    }
    scene.on(
        group,
        &[
            SceneEvent::PointerEnter,
            SceneEvent::PointerMove,
            SceneEvent::PointerLeave,
        ],
        Interaction::Breakpoint {
            chromosome_id: breakpoint.ref_chromosome_id.clone(),
            label: breakpoint.label.clone(),
            start: breakpoint.start,
            end: breakpoint.end,
        },
    );
    Some(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use synteny_protocol::Chromosome;

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                Chromosome::new("Ref", "chr1", 1000),
                Chromosome::new("Ref", "chr2", 800),
                Chromosome::new("B", "b1", 900),
                Chromosome::new("B", "b2", 400),
                Chromosome::new("C", "c1", 700),
            ],
            vec![
                SyntenyBlock::new("Ref", "chr1", 0, 100, "B", "b1", 0, 100, Strand::Forward),
                SyntenyBlock::new("Ref", "chr1", 200, 300, "C", "c1", 50, 150, Strand::Reverse),
                SyntenyBlock::new("Ref", "chrX", 0, 10, "B", "b1", 0, 10, Strand::Forward),
            ],
            vec![ChromosomeBreakpoint {
                ref_chromosome_id: "chr2".to_string(),
                start: 100,
                end: 120,
                label: "bp1".to_string(),
            }],
        )
    }

    #[test]
    fn unresolved_blocks_are_skipped() {
        let overview = build_overview(&sample(), &OverviewOptions::default());
        assert_eq!(overview.species_order, vec!["Ref", "B", "C"]);
        assert_eq!(overview.ribbons.len(), 2);
    }

    #[test]
    fn strand_and_species_filters_apply() {
        let dataset = sample();
        let reverse = OverviewOptions {
            alignment_filter: AlignmentFilter::Reverse,
            ..Default::default()
        };
        let overview = build_overview(&dataset, &reverse);
        assert_eq!(overview.ribbons.len(), 1);
        assert_eq!(overview.ribbons[0].strand, Strand::Reverse);

        let only_b = OverviewOptions {
            selected_species: vec!["B".to_string()],
            ..Default::default()
        };
        let overview = build_overview(&dataset, &only_b);
        assert_eq!(overview.species_order, vec!["Ref", "B"]);
        assert_eq!(overview.ribbons.len(), 1);
    }

    #[test]
    fn connected_only_hides_unlinked_chromosomes() {
        let options = OverviewOptions {
            show_connected_only: true,
            ..Default::default()
        };
        let overview = build_overview(&sample(), &options);
        assert!(overview.layout.placement("Ref", "chr1").is_some());
        assert!(overview.layout.placement("Ref", "chr2").is_none());
        assert!(overview.layout.placement("B", "b2").is_none());
        assert!(overview.layout.placement("C", "c1").is_some());
    }

    #[test]
    fn breakpoints_are_drawn_on_request() {
        let options = OverviewOptions {
            show_breakpoints: true,
            ..Default::default()
        };
        let overview = build_overview(&sample(), &options);
        assert!(overview
            .scene
            .find_interaction(|i| matches!(i, Interaction::Breakpoint { label, .. } if label == "bp1"))
            .is_some());
    }

    #[test]
    fn empty_dataset_builds_empty_scene() {
        let overview = build_overview(&Dataset::default(), &OverviewOptions::default());
        assert!(overview.ribbons.is_empty());
        assert_eq!(overview.content_bounds(), None);
    }
}
