//! Synteny ribbons: the two matching block rectangles and the curved band
//! joining them.

use crate::geometry::{PathData, Point, Rect};
use crate::layout::OverviewLayout;
use crate::scene::{GradientStop, Interaction, LinearGradient, NodeId, Paint, Scene, SceneEvent};
use crate::theme::SpeciesColors;
use serde::{Deserialize, Serialize};
use synteny_protocol::{MutationType, Strand, SyntenyBlock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RibbonStyle {
    pub forward_color: String,
    pub forward_opacity: f64,
    pub reverse_color: String,
    pub reverse_opacity: f64,
    pub hover_opacity: f64,
    pub selected_opacity: f64,
    pub stroke_width: f64,
    pub selected_stroke_width: f64,
    /// Opacity of the query-species end of the gradient.
    pub gradient_end_opacity: f64,
}

impl Default for RibbonStyle {
    fn default() -> Self {
        Self {
            forward_color: "#2563eb".to_string(),
            forward_opacity: 0.45,
            reverse_color: "#dc2626".to_string(),
            reverse_opacity: 0.45,
            hover_opacity: 0.85,
            selected_opacity: 0.95,
            stroke_width: 0.5,
            selected_stroke_width: 2.0,
            gradient_end_opacity: 0.6,
        }
    }
}

impl RibbonStyle {
    pub fn strand_color(&self, strand: Strand) -> &str {
        match strand {
            Strand::Forward => &self.forward_color,
            Strand::Reverse => &self.reverse_color,
        }
    }

    /// Resting opacity of an unselected, unhovered ribbon.
    pub fn default_opacity(&self, strand: Strand) -> f64 {
        match strand {
            Strand::Forward => self.forward_opacity,
            Strand::Reverse => self.reverse_opacity,
        }
    }
}

pub fn ref_key(chromosome_id: &str) -> String {
    format!("ref:{chromosome_id}")
}

pub fn query_key(species: &str, chromosome_id: &str) -> String {
    format!("{species}:{chromosome_id}")
}

/// Whether a block passes the chromosome selection.
///
/// An empty selection shows everything. A selected reference chromosome shows
/// all of its partners as long as nothing of the block's query species is
/// selected; otherwise both ends must be selected explicitly.
pub fn block_visible(block: &SyntenyBlock, selected: &[String]) -> bool {
    if selected.is_empty() {
        return true;
    }
    let ref_selected = selected.contains(&ref_key(&block.ref_chromosome_id));
    let species_prefix = format!("{}:", block.query_name);
    let any_query_of_species = selected.iter().any(|k| k.starts_with(&species_prefix));
    if ref_selected && !any_query_of_species {
        return true;
    }
    ref_selected && selected.contains(&query_key(&block.query_name, &block.query_chromosome_id))
}

/// Closed band from the edge of `from` facing `to` to the edge of `to` facing
/// `from`, spanning both rectangles' full widths, with cubic sides.
pub fn ribbon_path(from: Rect, to: Rect) -> PathData {
    let (y1, y2) = if from.y <= to.y {
        (from.bottom(), to.y)
    } else {
        (from.y, to.bottom())
    };
    let mid = (y1 + y2) / 2.0;
    PathData::new()
        .move_to(Point::new(from.x, y1))
        .cubic_to(
            Point::new(from.x, mid),
            Point::new(to.x, mid),
            Point::new(to.x, y2),
        )
        .line_to(Point::new(to.right(), y2))
        .cubic_to(
            Point::new(to.right(), mid),
            Point::new(from.right(), mid),
            Point::new(from.right(), y1),
        )
        .close()
}

/// Gradient stops and outline color of one ribbon.
#[derive(Clone, Debug, PartialEq)]
pub struct RibbonColors {
    pub start: String,
    pub end: String,
    pub edge: String,
}

impl RibbonColors {
    /// Strand color fading into the query species color, unless a mutation
    /// type is given, which then paints the whole ribbon.
    pub fn for_block(
        block: &SyntenyBlock,
        style: &RibbonStyle,
        species_colors: &SpeciesColors,
        mutation_type: Option<MutationType>,
    ) -> Self {
        match mutation_type.map(MutationType::color) {
            Some(color) => Self {
                start: color.to_string(),
                end: color.to_string(),
                edge: color.to_string(),
            },
            None => {
                let strand = style.strand_color(block.query_strand).to_string();
                Self {
                    start: strand.clone(),
                    end: species_colors.color(&block.query_name),
                    edge: strand,
                }
            }
        }
    }
}

/// Everything a ribbon needs besides the block itself.
pub struct RibbonContext<'a> {
    pub layout: &'a OverviewLayout,
    pub style: &'a RibbonStyle,
    pub species_colors: &'a SpeciesColors,
    /// Only consulted when `custom_coloring` is on.
    pub mutation_type: Option<MutationType>,
    pub custom_coloring: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RibbonNodes {
    pub group: NodeId,
    pub ref_rect: NodeId,
    pub query_rect: NodeId,
    pub path: NodeId,
    pub gradient_id: String,
}

/// Appends one ribbon under `parent`. Returns `None`, creating nothing, when
/// either endpoint chromosome is not part of the layout.
pub fn render_ribbon(
    scene: &mut Scene,
    parent: NodeId,
    ctx: &RibbonContext,
    block: &SyntenyBlock,
    index: usize,
) -> Option<RibbonNodes> {
    let layout = ctx.layout;
    let height = layout.config().chromosome_height;
    let (Some((rx, rw)), Some(ry), Some((qx, qw)), Some(qy)) = (
        layout.interval(
            &block.ref_species,
            &block.ref_chromosome_id,
            block.ref_start,
            block.ref_end,
        ),
        layout.row_y(&block.ref_species),
        layout.interval(
            &block.query_name,
            &block.query_chromosome_id,
            block.query_start,
            block.query_end,
        ),
        layout.row_y(&block.query_name),
    ) else {
        log::debug!("skipping unresolved synteny block {}", block.key());
        return None;
    };
    let ref_box = Rect::new(rx, ry, rw, height);
    let query_box = Rect::new(qx, qy, qw, height);

    let colors = RibbonColors::for_block(
        block,
        ctx.style,
        ctx.species_colors,
        ctx.mutation_type.filter(|_| ctx.custom_coloring),
    );
    let opacity = ctx.style.default_opacity(block.query_strand);

    let gradient_id = format!("ribbon-gradient-{index}");
    let downward = ry <= qy;
    scene.add_gradient(LinearGradient {
        id: gradient_id.clone(),
        from: Point::new(0.0, if downward { 0.0 } else { 1.0 }),
        to: Point::new(0.0, if downward { 1.0 } else { 0.0 }),
        stops: vec![
            GradientStop {
                offset: 0.0,
                color: colors.start,
                opacity: 1.0,
            },
            GradientStop {
                offset: 1.0,
                color: colors.end,
                opacity: ctx.style.gradient_end_opacity,
            },
        ],
    });

    let group = scene.create_group(parent);
    if let Some(style) = scene.style_mut(group) {
        style.class = Some("synteny-ribbon".to_string());
    }
    let ref_rect = scene.create_rect(group, ref_box, 0.0);
    let query_rect = scene.create_rect(group, query_box, 0.0);
    for id in [ref_rect, query_rect] {
        if let Some(style) = scene.style_mut(id) {
            style.fill = Some(Paint::Color(colors.edge.clone()));
            style.opacity = Some(opacity);
        }
    }
    let path = scene.create_path(group, ribbon_path(ref_box, query_box));
    if let Some(style) = scene.style_mut(path) {
        style.fill = Some(Paint::Gradient(gradient_id.clone()));
        style.stroke = Some(colors.edge);
        style.stroke_width = Some(ctx.style.stroke_width);
        style.opacity = Some(opacity);
    }
    scene.on(
        group,
        &[
            SceneEvent::PointerEnter,
            SceneEvent::PointerMove,
            SceneEvent::PointerLeave,
            SceneEvent::Click,
        ],
        Interaction::Ribbon(block.key()),
    );

    Some(RibbonNodes {
        group,
        ref_rect,
        query_rect,
        path,
        gradient_id,
    })
}
