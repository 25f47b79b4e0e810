//! Radial detail scene for one synteny block: the reference chromosome as an
//! arc across the top, the query chromosome across the bottom, one ribbon
//! through the middle.

use crate::geometry::{PathData, Point};
use crate::ribbon::{RibbonColors, RibbonStyle};
use crate::scale::AngularScale;
use crate::scene::{
    GradientStop, Interaction, LinearGradient, NodeId, Paint, Scene, SceneEvent, TextAnchor,
};
use crate::theme::{SpeciesColors, Theme};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use synteny_protocol::{Chromosome, MutationType, Strand, SyntenyBlock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialConfig {
    /// Angle kept free between the two arcs on each side, in degrees.
    pub gap_angle_deg: f64,
    pub tick_count: usize,
    /// Inner edge of an arc as a fraction of the outer radius.
    pub inner_radius_ratio: f64,
    pub ribbon_opacity: f64,
    /// Scale arc length by chromosome size relative to the larger of the two.
    pub relative_size: bool,
    pub margin: f64,
    pub tick_length: f64,
    pub label_font_size: f64,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            gap_angle_deg: 20.0,
            tick_count: 10,
            inner_radius_ratio: 0.92,
            ribbon_opacity: 0.6,
            relative_size: true,
            margin: 60.0,
            tick_length: 6.0,
            label_font_size: 10.0,
        }
    }
}

/// Compact position label: `"950 bp"`, `"12.5 kb"`, `"3.20 Mb"`.
pub fn format_position(bp: u64) -> String {
    match bp {
        0..=9_999 => format!("{bp} bp"),
        10_000..=999_999 => format!("{:.1} kb", bp as f64 / 1_000.0),
        _ => format!("{:.2} Mb", bp as f64 / 1_000_000.0),
    }
}

/// Angular span of each arc: `PI - gap` for the larger chromosome, scaled
/// down proportionally for the smaller one when `relative_size` is set.
pub fn arc_spans(ref_size: u64, query_size: u64, config: &RadialConfig) -> (f64, f64) {
    let max_span = (PI - config.gap_angle_deg.to_radians()).max(0.0);
    if !config.relative_size {
        return (max_span, max_span);
    }
    let largest = ref_size.max(query_size);
    if largest == 0 {
        return (max_span, max_span);
    }
    (
        max_span * ref_size as f64 / largest as f64,
        max_span * query_size as f64 / largest as f64,
    )
}

/// Annular sector between `inner` and `outer` over `[from, to]`.
fn arc_band(center: Point, inner: f64, outer: f64, from: f64, to: f64) -> PathData {
    PathData::new()
        .move_to(Point::polar(center, outer, from))
        .arc_to(center, outer, from, to)
        .line_to(Point::polar(center, inner, to))
        .arc_to(center, inner, to, from)
        .close()
}

#[derive(Clone, Debug)]
pub struct RadialScene {
    pub scene: Scene,
    pub center: Point,
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub ref_scale: AngularScale,
    pub query_scale: AngularScale,
    pub ribbon: NodeId,
}

pub struct RadialInput<'a> {
    pub block: &'a SyntenyBlock,
    pub reference: &'a Chromosome,
    pub query: &'a Chromosome,
    pub config: &'a RadialConfig,
    pub ribbon_style: &'a RibbonStyle,
    pub species_colors: &'a SpeciesColors,
    /// Paints the whole ribbon when set.
    pub mutation_type: Option<MutationType>,
    pub theme: Theme,
    pub width: f64,
    pub height: f64,
}

impl RadialInput<'_> {
    pub fn build(&self) -> RadialScene {
        let config = self.config;
        let center = Point::new(self.width / 2.0, self.height / 2.0);
        let outer = ((self.width.min(self.height) / 2.0) - config.margin).max(10.0);
        let inner = outer * config.inner_radius_ratio.clamp(0.0, 1.0);

        let (ref_span, query_span) =
            arc_spans(self.reference.size_bp, self.query.size_bp, config);
        let ref_scale = AngularScale::new(
            self.reference.size_bp,
            -FRAC_PI_2 - ref_span / 2.0,
            -FRAC_PI_2 + ref_span / 2.0,
        );
        let query_scale = AngularScale::new(
            self.query.size_bp,
            FRAC_PI_2 - query_span / 2.0,
            FRAC_PI_2 + query_span / 2.0,
        );

        let mut scene = Scene::new();
        let root = scene.root();
        let arcs = scene.create_group(root);
        for (chr, scale) in [(self.reference, &ref_scale), (self.query, &query_scale)] {
            self.draw_arc(&mut scene, arcs, chr, scale, center, inner, outer);
        }

        let ribbon = self.draw_ribbon(&mut scene, root, &ref_scale, &query_scale, center, inner);

        let markers = scene.create_group(root);
        let b = self.block;
        for (scale, position) in [
            (&ref_scale, b.ref_start),
            (&ref_scale, b.ref_end),
            (&query_scale, b.query_start),
            (&query_scale, b.query_end),
        ] {
            self.draw_marker(&mut scene, markers, scale, position, center, outer);
        }

        RadialScene {
            scene,
            center,
            outer_radius: outer,
            inner_radius: inner,
            ref_scale,
            query_scale,
            ribbon,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_arc(
        &self,
        scene: &mut Scene,
        parent: NodeId,
        chr: &Chromosome,
        scale: &AngularScale,
        center: Point,
        inner: f64,
        outer: f64,
    ) {
        let group = scene.create_group(parent);
        let band = scene.create_path(
            group,
            arc_band(center, inner, outer, scale.start_angle(), scale.end_angle()),
        );
        if let Some(style) = scene.style_mut(band) {
            style.fill = Some(Paint::Color(self.species_colors.color(&chr.species_name)));
            style.stroke = Some(self.theme.stroke().to_string());
            style.stroke_width = Some(0.5);
        }
        scene.on(
            band,
            &[
                SceneEvent::PointerEnter,
                SceneEvent::PointerMove,
                SceneEvent::PointerLeave,
            ],
            Interaction::Chromosome {
                species: chr.species_name.clone(),
                chromosome_id: chr.chromosome_id.clone(),
                size_bp: chr.size_bp,
                centromere: chr.centromere(),
            },
        );

        let ticks = self.config.tick_count.max(1);
        for i in 0..=ticks {
            let position = chr.size_bp * i as u64 / ticks as u64;
            let angle = scale.angle(position);
            let tick = scene.create_line(
                group,
                Point::polar(center, outer, angle),
                Point::polar(center, outer + self.config.tick_length, angle),
            );
            if let Some(style) = scene.style_mut(tick) {
                style.stroke = Some(self.theme.stroke().to_string());
                style.stroke_width = Some(1.0);
            }
            let at = Point::polar(center, outer + self.config.tick_length + 4.0, angle);
            let anchor = if at.x >= center.x {
                TextAnchor::Start
            } else {
                TextAnchor::End
            };
            let label = scene.create_text(
                group,
                at,
                &format_position(position),
                anchor,
                self.config.label_font_size,
            );
            if let Some(style) = scene.style_mut(label) {
                style.fill = Some(Paint::color(self.theme.muted_text()));
                style.class = Some("tick-label".to_string());
            }
        }

        let mid = Point::polar(center, inner - 14.0, scale.angle(chr.size_bp / 2));
        let name = scene.create_text(
            group,
            mid,
            &format!("{} {}", chr.species_name, chr.chromosome_id),
            TextAnchor::Middle,
            self.config.label_font_size + 2.0,
        );
        if let Some(style) = scene.style_mut(name) {
            style.fill = Some(Paint::color(self.theme.text()));
            style.font_weight = Some("bold".to_string());
            style.class = Some("chromosome-label".to_string());
        }
    }

    fn draw_ribbon(
        &self,
        scene: &mut Scene,
        parent: NodeId,
        ref_scale: &AngularScale,
        query_scale: &AngularScale,
        center: Point,
        radius: f64,
    ) -> NodeId {
        let b = self.block;
        let (r0, r1) = (ref_scale.angle(b.ref_start), ref_scale.angle(b.ref_end));
        // A reverse block crosses over, joining ref start to query start.
        let (q0, q1) = match b.query_strand {
            Strand::Forward => (
                query_scale.angle(b.query_start),
                query_scale.angle(b.query_end),
            ),
            Strand::Reverse => (
                query_scale.angle(b.query_end),
                query_scale.angle(b.query_start),
            ),
        };
        let path = PathData::new()
            .move_to(Point::polar(center, radius, r0))
            .arc_to(center, radius, r0, r1)
            .quad_to(center, Point::polar(center, radius, q0))
            .arc_to(center, radius, q0, q1)
            .quad_to(center, Point::polar(center, radius, r0))
            .close();

        let colors =
            RibbonColors::for_block(b, self.ribbon_style, self.species_colors, self.mutation_type);
        let gradient_id = "radial-ribbon-gradient".to_string();
        scene.add_gradient(LinearGradient {
            id: gradient_id.clone(),
            from: Point::new(0.0, 0.0),
            to: Point::new(0.0, 1.0),
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: colors.start,
                    opacity: 1.0,
                },
                GradientStop {
                    offset: 1.0,
                    color: colors.end,
                    opacity: 1.0,
                },
            ],
        });

        let node = scene.create_path(parent, path);
        if let Some(style) = scene.style_mut(node) {
            style.fill = Some(Paint::Gradient(gradient_id));
            style.stroke = Some(colors.edge);
            style.stroke_width = Some(self.ribbon_style.stroke_width);
            style.opacity = Some(self.config.ribbon_opacity);
        }
        scene.on(
            node,
            &[
                SceneEvent::PointerEnter,
                SceneEvent::PointerMove,
                SceneEvent::PointerLeave,
            ],
            Interaction::Ribbon(b.key()),
        );
        node
    }

    fn draw_marker(
        &self,
        scene: &mut Scene,
        parent: NodeId,
        scale: &AngularScale,
        position: u64,
        center: Point,
        outer: f64,
    ) {
        let angle = scale.angle(position);
        let reach = outer + self.config.tick_length + 36.0;
        let group = scene.create_group(parent);
        let dot = scene.create_circle(group, Point::polar(center, outer, angle), 3.0);
        let leader = scene.create_line(
            group,
            Point::polar(center, outer, angle),
            Point::polar(center, reach, angle),
        );
        let at = Point::polar(center, reach + 4.0, angle);
        let anchor = if at.x >= center.x {
            TextAnchor::Start
        } else {
            TextAnchor::End
        };
        let label = scene.create_text(
            group,
            at,
            &position.to_string(),
            anchor,
            self.config.label_font_size,
        );
        let accent = self.ribbon_style.strand_color(self.block.query_strand);
        if let Some(style) = scene.style_mut(dot) {
            style.fill = Some(Paint::color(accent));
        }
        if let Some(style) = scene.style_mut(leader) {
            style.stroke = Some(accent.to_string());
            style.stroke_width = Some(1.0);
        }
        if let Some(style) = scene.style_mut(label) {
            style.fill = Some(Paint::color(self.theme.text()));
            style.font_weight = Some("bold".to_string());
            style.class = Some("marker-label".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeKind;

    fn input_parts() -> (SyntenyBlock, Chromosome, Chromosome) {
        (
            SyntenyBlock::new("Ref", "chr1", 100, 400, "B", "b1", 50, 200, Strand::Forward),
            Chromosome::new("Ref", "chr1", 1000),
            Chromosome::new("B", "b1", 500),
        )
    }

    #[test]
    fn half_sized_chromosome_spans_half_the_arc() {
        let config = RadialConfig::default();
        let (r, q) = arc_spans(1000, 500, &config);
        assert!((q * 2.0 - r).abs() < 1e-12);
        assert!((r - (PI - 20f64.to_radians())).abs() < 1e-12);

        let fixed = RadialConfig {
            relative_size: false,
            ..Default::default()
        };
        let (r, q) = arc_spans(1000, 500, &fixed);
        assert_eq!(r, q);
        assert_eq!(arc_spans(0, 0, &config), (r, r));
    }

    #[test]
    fn arcs_face_each_other() {
        let (block, reference, query) = input_parts();
        let config = RadialConfig::default();
        let style = RibbonStyle::default();
        let colors = SpeciesColors::default();
        let radial = RadialInput {
            block: &block,
            reference: &reference,
            query: &query,
            config: &config,
            ribbon_style: &style,
            species_colors: &colors,
            mutation_type: None,
            theme: Theme::Light,
            width: 600.0,
            height: 600.0,
        }
        .build();

        let mid_ref = radial.ref_scale.angle(500);
        let mid_query = radial.query_scale.angle(250);
        assert!((mid_ref + FRAC_PI_2).abs() < 1e-12);
        assert!((mid_query - FRAC_PI_2).abs() < 1e-12);
        assert!(radial.query_scale.sweep() < radial.ref_scale.sweep());

        let top = radial.ref_scale.point(500, radial.center, radial.outer_radius);
        assert!(top.y < radial.center.y);
        assert!(matches!(
            radial.scene.interaction(radial.ribbon),
            Some(Interaction::Ribbon(key)) if *key == block.key()
        ));
    }

    #[test]
    fn draws_configured_ticks_and_four_markers() {
        let (block, reference, query) = input_parts();
        let config = RadialConfig {
            tick_count: 4,
            ..Default::default()
        };
        let style = RibbonStyle::default();
        let colors = SpeciesColors::default();
        let radial = RadialInput {
            block: &block,
            reference: &reference,
            query: &query,
            config: &config,
            ribbon_style: &style,
            species_colors: &colors,
            mutation_type: None,
            theme: Theme::Dark,
            width: 400.0,
            height: 300.0,
        }
        .build();
        let scene = &radial.scene;
        let count = |pred: &dyn Fn(&NodeKind) -> bool| {
            scene
                .paint_order()
                .into_iter()
                .filter(|id| pred(&scene.node(*id).unwrap().kind))
                .count()
        };
        // Five ticks per arc plus one leader per marker.
        assert_eq!(count(&|k| matches!(k, NodeKind::Line { .. })), 2 * 5 + 4);
        assert_eq!(count(&|k| matches!(k, NodeKind::Circle { .. })), 4);
    }

    #[test]
    fn mutation_type_paints_the_ribbon() {
        let (block, reference, query) = input_parts();
        let config = RadialConfig::default();
        let style = RibbonStyle::default();
        let colors = SpeciesColors::default();
        let build = |mutation_type| {
            RadialInput {
                block: &block,
                reference: &reference,
                query: &query,
                config: &config,
                ribbon_style: &style,
                species_colors: &colors,
                mutation_type,
                theme: Theme::Light,
                width: 600.0,
                height: 600.0,
            }
            .build()
        };

        let plain = build(None);
        let gradient = plain.scene.gradient("radial-ribbon-gradient").unwrap();
        assert_eq!(gradient.stops[0].color, style.strand_color(Strand::Forward));
        assert_eq!(gradient.stops[1].color, colors.color("B"));

        let painted = build(Some(MutationType::Inv));
        let gradient = painted.scene.gradient("radial-ribbon-gradient").unwrap();
        assert!(gradient.stops.iter().all(|s| s.color == MutationType::Inv.color()));
        let ribbon = painted.scene.node(painted.ribbon).unwrap();
        assert_eq!(ribbon.style.stroke.as_deref(), Some(MutationType::Inv.color()));
    }

    #[test]
    fn position_labels_pick_units() {
        assert_eq!(format_position(950), "950 bp");
        assert_eq!(format_position(12_500), "12.5 kb");
        assert_eq!(format_position(3_200_000), "3.20 Mb");
    }
}
