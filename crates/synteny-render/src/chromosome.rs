//! Chromosome glyphs (capsule body with centromere waist) and their stacked
//! gene annotation tracks.

use crate::geometry::{PathData, Point, Rect};
use crate::layout::AnnotationConfig;
use crate::scale::LinearScale;
use crate::scene::{Interaction, NodeId, Paint, Scene, SceneEvent, TextAnchor};
use crate::theme::{gene_class_color, Theme, CLUSTER_CLASS};
use synteny_protocol::{Chromosome, GeneAnnotation, Strand};

const POINTER_EVENTS: [SceneEvent; 3] = [
    SceneEvent::PointerEnter,
    SceneEvent::PointerMove,
    SceneEvent::PointerLeave,
];

/// Capsule outline with corner radius `height / 2`. With a centromere, the top
/// and bottom edges dip inward by `indent` at `centromere_x`.
pub fn chromosome_body_path(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    centromere_x: Option<f64>,
    indent: f64,
) -> PathData {
    let r = (height / 2.0).min(width / 2.0).max(0.0);
    let (left, right, top, bottom) = (x, x + width, y, y + height);
    let waist = centromere_x
        .filter(|cx| *cx > left + r && *cx < right - r)
        .map(|cx| (cx, indent.min(height / 2.0)));

    let mut path = PathData::new().move_to(Point::new(left + r, top));
    if let Some((cx, depth)) = waist {
        path = path
            .line_to(Point::new(cx - depth, top))
            .line_to(Point::new(cx, top + depth))
            .line_to(Point::new(cx + depth, top));
    }
    path = path
        .line_to(Point::new(right - r, top))
        .quad_to(Point::new(right, top), Point::new(right, top + r))
        .line_to(Point::new(right, bottom - r))
        .quad_to(Point::new(right, bottom), Point::new(right - r, bottom));
    if let Some((cx, depth)) = waist {
        path = path
            .line_to(Point::new(cx + depth, bottom))
            .line_to(Point::new(cx, bottom - depth))
            .line_to(Point::new(cx - depth, bottom));
    }
    path.line_to(Point::new(left + r, bottom))
        .quad_to(Point::new(left, bottom), Point::new(left, bottom - r))
        .line_to(Point::new(left, top + r))
        .quad_to(Point::new(left, top), Point::new(left + r, top))
        .close()
}

/// One annotation (or cluster) positioned in a track, in chromosome-local pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedAnnotation {
    pub annotation: GeneAnnotation,
    pub track: usize,
    pub x: f64,
    pub width: f64,
}

fn cluster_of(members: &[&GeneAnnotation]) -> GeneAnnotation {
    let first = members[0];
    let start = members.iter().map(|g| g.start).min().unwrap_or(first.start);
    let end = members.iter().map(|g| g.end).max().unwrap_or(first.end);
    let forward = members
        .iter()
        .filter(|g| g.strand == Strand::Forward)
        .count();
    let strand = if forward * 2 >= members.len() {
        Strand::Forward
    } else {
        Strand::Reverse
    };
    let mut cluster = GeneAnnotation::new(&first.chromosome, start, end, strand, CLUSTER_CLASS);
    cluster.is_cluster = true;
    cluster.gene_count = members.len();
    cluster
}

/// Clusters, filters, caps and assigns annotations to tracks.
///
/// 1. Annotations are walked in position order; a new group starts whenever
///    the pixel gap from the previous annotation's end exceeds the clustering
///    threshold.
/// 2. Multi-member groups collapse into one cluster spanning their members.
///    Singletons narrower than the minimum visible size are dropped.
/// 3. At most `max_visible_genes` survive, earliest by position.
/// 4. Each survivor takes the first track whose last end is at least the
///    minimum visible size before its start; a new track opens while fewer
///    than `max_tracks` exist, otherwise the annotation is dropped.
pub fn place_annotations(
    annotations: &[GeneAnnotation],
    scale: &LinearScale,
    config: &AnnotationConfig,
) -> Vec<PlacedAnnotation> {
    let mut sorted: Vec<&GeneAnnotation> = annotations.iter().collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut groups: Vec<Vec<&GeneAnnotation>> = vec![];
    let mut prev_end_px = f64::NEG_INFINITY;
    for gene in sorted {
        let start_px = scale.scale_bp(gene.start);
        match groups.last_mut() {
            Some(group) if start_px - prev_end_px <= config.cluster_threshold_px => {
                group.push(gene)
            }
            _ => groups.push(vec![gene]),
        }
        prev_end_px = scale.scale_bp(gene.end);
    }

    let mut visible: Vec<GeneAnnotation> = groups
        .into_iter()
        .filter_map(|group| {
            if group.len() > 1 {
                Some(cluster_of(&group))
            } else if scale.span(group[0].start, group[0].end) >= config.min_visible_px {
                Some(group[0].clone())
            } else {
                None
            }
        })
        .collect();
    visible.truncate(config.max_visible_genes);

    let mut track_ends: Vec<f64> = vec![];
    let mut placed = vec![];
    for gene in visible {
        let x = scale.scale_bp(gene.start);
        let width = scale.span(gene.start, gene.end).max(0.0);
        let track = match track_ends
            .iter()
            .position(|end| x - *end >= config.min_visible_px)
        {
            Some(track) => track,
            None if track_ends.len() < config.max_tracks => {
                track_ends.push(f64::NEG_INFINITY);
                track_ends.len() - 1
            }
            None => continue,
        };
        track_ends[track] = x + width;
        placed.push(PlacedAnnotation {
            annotation: gene,
            track,
            x,
            width,
        });
    }
    placed
}

/// Triangle at the leading end of a gene: right for `+`, left for `-`.
pub fn arrowhead_path(x: f64, y: f64, width: f64, height: f64, strand: Strand) -> PathData {
    let size = height.min(width / 2.0);
    let mid = y + height / 2.0;
    match strand {
        Strand::Forward => PathData::new()
            .move_to(Point::new(x + width - size, y))
            .line_to(Point::new(x + width, mid))
            .line_to(Point::new(x + width - size, y + height))
            .close(),
        Strand::Reverse => PathData::new()
            .move_to(Point::new(x + size, y))
            .line_to(Point::new(x, mid))
            .line_to(Point::new(x + size, y + height))
            .close(),
    }
}

pub struct ChromosomeGlyph<'a> {
    pub chromosome: &'a Chromosome,
    pub x: f64,
    pub y: f64,
    pub height: f64,
    pub centromere_indent: f64,
    pub label_font_size: f64,
    pub scale: &'a LinearScale,
    pub annotations: Option<&'a AnnotationConfig>,
    pub theme: Theme,
}

impl ChromosomeGlyph<'_> {
    pub fn width(&self) -> f64 {
        self.scale.scale_bp(self.chromosome.size_bp)
    }

    /// Appends the body, label and annotation tracks under `parent` and
    /// returns the chromosome's group.
    pub fn render(&self, scene: &mut Scene, parent: NodeId) -> NodeId {
        let chr = self.chromosome;
        let group = scene.create_group(parent);
        let width = self.width();
        let centromere_x = chr
            .centromere()
            .map(|(s, e)| self.x + self.scale.scale_bp((s + e) / 2));

        let body = scene.create_path(
            group,
            chromosome_body_path(
                self.x,
                self.y,
                width,
                self.height,
                centromere_x,
                self.centromere_indent,
            ),
        );
        if let Some(style) = scene.style_mut(body) {
            style.fill = Some(Paint::color(self.theme.chromosome_fill()));
            style.stroke = Some(self.theme.stroke().to_string());
            style.stroke_width = Some(1.0);
            style.class = Some("chromosome-body".to_string());
        }
        scene.on(
            body,
            &POINTER_EVENTS,
            Interaction::Chromosome {
                species: chr.species_name.clone(),
                chromosome_id: chr.chromosome_id.clone(),
                size_bp: chr.size_bp,
                centromere: chr.centromere(),
            },
        );

        let label = scene.create_text(
            group,
            Point::new(self.x + width / 2.0, self.y - 6.0),
            &chr.chromosome_id,
            TextAnchor::Middle,
            self.label_font_size,
        );
        if let Some(style) = scene.style_mut(label) {
            style.fill = Some(Paint::color(self.theme.text()));
            style.class = Some("chromosome-label".to_string());
        }

        if let Some(config) = self.annotations.filter(|c| c.enabled) {
            if !chr.annotations.is_empty() {
                self.render_annotations(scene, group, config);
            }
        }
        group
    }

    fn render_annotations(&self, scene: &mut Scene, parent: NodeId, config: &AnnotationConfig) {
        let tracks = scene.create_group(parent);
        let top = self.y + self.height + config.track_gap * 2.0;
        for placed in place_annotations(&self.chromosome.annotations, self.scale, config) {
            let gene = &placed.annotation;
            let x = self.x + placed.x;
            let y = top + placed.track as f64 * (config.track_height + config.track_gap);
            let color = gene_class_color(&gene.class);
            let gene_group = scene.create_group(tracks);
            let rect = scene.create_rect(
                gene_group,
                Rect::new(x, y, placed.width, config.track_height),
                0.0,
            );
            if let Some(style) = scene.style_mut(rect) {
                style.fill = Some(Paint::color(color));
                style.class = Some("gene".to_string());
            }
            if placed.width > config.arrow_min_px {
                let arrow = scene.create_path(
                    gene_group,
                    arrowhead_path(x, y, placed.width, config.track_height, gene.strand),
                );
                if let Some(style) = scene.style_mut(arrow) {
                    style.fill = Some(Paint::color(self.theme.background()));
                    style.fill_opacity = Some(0.7);
                }
            }
            scene.on(
                gene_group,
                &POINTER_EVENTS,
                Interaction::Gene {
                    species: self.chromosome.species_name.clone(),
                    annotation: gene.clone(),
                },
            );
        }
    }
}
