//! The one tooltip shown at a time and the element it belongs to.

use std::time::{Duration, Instant};
use synteny_protocol::{Dataset, GeneAnnotation, MutationType, SyntenyBlock};
use synteny_render::{Interaction, NodeId};

#[derive(Clone, Debug, PartialEq)]
pub enum TooltipPayload {
    Chromosome {
        species: String,
        chromosome_id: String,
        size_bp: u64,
        centromere: Option<(u64, u64)>,
    },
    Gene {
        species: String,
        annotation: GeneAnnotation,
    },
    Synteny {
        block: SyntenyBlock,
        mutation_type: Option<MutationType>,
        selected: bool,
    },
    Breakpoint {
        chromosome_id: String,
        label: String,
        start: u64,
        end: u64,
    },
}

impl TooltipPayload {
    /// Resolves what a hit node stands for. Ribbons whose block is no longer
    /// in the dataset produce nothing.
    pub fn from_interaction(
        interaction: &Interaction,
        dataset: &Dataset,
        mutation_type: Option<MutationType>,
        selected: bool,
    ) -> Option<Self> {
        Some(match interaction {
            Interaction::Chromosome {
                species,
                chromosome_id,
                size_bp,
                centromere,
            } => TooltipPayload::Chromosome {
                species: species.clone(),
                chromosome_id: chromosome_id.clone(),
                size_bp: *size_bp,
                centromere: *centromere,
            },
            Interaction::Gene {
                species,
                annotation,
            } => TooltipPayload::Gene {
                species: species.clone(),
                annotation: annotation.clone(),
            },
            Interaction::Ribbon(key) => TooltipPayload::Synteny {
                block: dataset.block(key)?.clone(),
                mutation_type,
                selected,
            },
            Interaction::Breakpoint {
                chromosome_id,
                label,
                start,
                end,
            } => TooltipPayload::Breakpoint {
                chromosome_id: chromosome_id.clone(),
                label: label.clone(),
                start: *start,
                end: *end,
            },
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TooltipPayload::Chromosome { .. } => "chromosome",
            TooltipPayload::Gene { .. } => "gene",
            TooltipPayload::Synteny { .. } => "synteny",
            TooltipPayload::Breakpoint { .. } => "breakpoint",
        }
    }

    pub fn title(&self) -> String {
        match self {
            TooltipPayload::Chromosome {
                species,
                chromosome_id,
                ..
            } => format!("{species} {chromosome_id}"),
            TooltipPayload::Gene { annotation, .. } if annotation.is_cluster => {
                format!("Gene cluster ({} genes)", annotation.gene_count)
            }
            TooltipPayload::Gene { annotation, .. } => annotation.label(),
            TooltipPayload::Synteny { block, .. } => format!(
                "{} {} \u{2194} {} {}",
                block.ref_species, block.ref_chromosome_id, block.query_name, block.query_chromosome_id
            ),
            TooltipPayload::Breakpoint { label, .. } if !label.is_empty() => label.clone(),
            TooltipPayload::Breakpoint { .. } => "Breakpoint".to_string(),
        }
    }

    /// Body lines below the title.
    pub fn lines(&self) -> Vec<String> {
        match self {
            TooltipPayload::Chromosome {
                size_bp,
                centromere,
                ..
            } => {
                let mut lines = vec![format!("Size: {} bp", group_digits(*size_bp))];
                if let Some((start, end)) = centromere {
                    lines.push(format!(
                        "Centromere: {}-{}",
                        group_digits(*start),
                        group_digits(*end)
                    ));
                }
                lines
            }
            TooltipPayload::Gene {
                species,
                annotation,
            } => {
                let mut lines = vec![
                    format!("{species} {}", annotation.chromosome),
                    format!(
                        "Position: {}-{}",
                        group_digits(annotation.start),
                        group_digits(annotation.end)
                    ),
                ];
                if annotation.is_cluster {
                    lines.push(format!("{} genes merged at this zoom", annotation.gene_count));
                    return lines;
                }
                lines.push(format!("Strand: {}", annotation.strand.symbol()));
                lines.push(format!("Class: {}", annotation.class));
                for (label, value) in [
                    ("Name", &annotation.name),
                    ("Locus tag", &annotation.locus_tag),
                    ("Gene ID", &annotation.gene_id),
                ] {
                    if let Some(v) = value {
                        lines.push(format!("{label}: {v}"));
                    }
                }
                lines
            }
            TooltipPayload::Synteny {
                block,
                mutation_type,
                selected,
            } => {
                let mut lines = vec![
                    format!(
                        "Reference: {}-{} ({} bp)",
                        group_digits(block.ref_start),
                        group_digits(block.ref_end),
                        group_digits(block.ref_len())
                    ),
                    format!(
                        "Query: {}-{} ({} bp)",
                        group_digits(block.query_start),
                        group_digits(block.query_end),
                        group_digits(block.query_len())
                    ),
                    format!("Strand: {}", block.query_strand.symbol()),
                ];
                if let Some(symbol) = &block.symbol {
                    lines.push(format!("Gene: {symbol}"));
                }
                if let Some(t) = mutation_type {
                    lines.push(format!("Type: {} ({})", t.code(), t.description()));
                }
                lines.push(
                    if *selected {
                        "Click to deselect"
                    } else {
                        "Click to select"
                    }
                    .to_string(),
                );
                lines
            }
            TooltipPayload::Breakpoint {
                chromosome_id,
                start,
                end,
                ..
            } => vec![format!(
                "{chromosome_id}: {}-{}",
                group_digits(*start),
                group_digits(*end)
            )],
        }
    }
}

/// `1234567` becomes `1,234,567`.
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub payload: TooltipPayload,
    /// Screen position, lagging the pointer by the debounce interval.
    pub position: (f64, f64),
}

#[derive(Debug)]
pub struct HoverManager {
    show_tooltips: bool,
    debounce: Duration,
    hovered: Option<NodeId>,
    tooltip: Option<Tooltip>,
    pending_position: Option<((f64, f64), Instant)>,
}

impl HoverManager {
    pub fn new(show_tooltips: bool, debounce: Duration) -> Self {
        Self {
            show_tooltips,
            debounce,
            hovered: None,
            tooltip: None,
            pending_position: None,
        }
    }

    pub fn show_tooltips(&self) -> bool {
        self.show_tooltips
    }

    pub fn set_show_tooltips(&mut self, show: bool) {
        self.show_tooltips = show;
        if !show {
            self.tooltip = None;
            self.pending_position = None;
        }
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Pointer entered `node`. Replaces whatever was shown before.
    pub fn enter(&mut self, node: NodeId, payload: Option<TooltipPayload>, position: (f64, f64)) {
        self.hovered = Some(node);
        self.pending_position = None;
        self.tooltip = payload
            .filter(|_| self.show_tooltips)
            .map(|payload| Tooltip { payload, position });
    }

    /// Pointer moved within the hovered node; the tooltip follows once the
    /// pointer has rested for the debounce interval.
    pub fn move_to(&mut self, position: (f64, f64), now: Instant) {
        if self.tooltip.is_some() {
            self.pending_position = Some((position, now + self.debounce));
        }
    }

    pub fn leave(&mut self) {
        self.hovered = None;
        self.tooltip = None;
        self.pending_position = None;
    }

    /// Applies a due position update. Returns whether the tooltip moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some((position, due)) = self.pending_position else {
            return false;
        };
        if now < due {
            return false;
        }
        self.pending_position = None;
        match &mut self.tooltip {
            Some(tooltip) => {
                tooltip.position = position;
                true
            }
            None => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending_position.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synteny_protocol::Strand;

    fn gene_payload(cluster: bool) -> TooltipPayload {
        let mut annotation = GeneAnnotation::new("chr1", 1000, 2500, Strand::Forward, "mRNA");
        annotation.symbol = Some("ABC1".to_string());
        if cluster {
            annotation.is_cluster = true;
            annotation.gene_count = 4;
        }
        TooltipPayload::Gene {
            species: "Ref".to_string(),
            annotation,
        }
    }

    #[test]
    fn cluster_reports_aggregate() {
        let single = gene_payload(false);
        assert_eq!(single.kind(), "gene");
        assert_eq!(single.title(), "ABC1");
        assert!(single.lines().contains(&"Strand: +".to_string()));

        let cluster = gene_payload(true);
        assert_eq!(cluster.title(), "Gene cluster (4 genes)");
        assert!(!cluster.lines().iter().any(|l| l.starts_with("Strand")));
    }

    #[test]
    fn synteny_payload_needs_known_block() {
        let block = SyntenyBlock::new("Ref", "chr1", 0, 100, "B", "b1", 10, 90, Strand::Reverse);
        let dataset = Dataset::new(vec![], vec![block.clone()], vec![]);
        let payload = TooltipPayload::from_interaction(
            &Interaction::Ribbon(block.key()),
            &dataset,
            Some(MutationType::Inv),
            false,
        )
        .unwrap();
        assert_eq!(payload.kind(), "synteny");
        assert!(payload.lines().contains(&"Type: INV (Inversion)".to_string()));

        let other = synteny_protocol::BlockKey::new("chr9", "b1", 0, 10);
        assert!(
            TooltipPayload::from_interaction(&Interaction::Ribbon(other), &dataset, None, false)
                .is_none()
        );
    }

    #[test]
    fn digits_are_grouped() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1_000), "1,000");
        assert_eq!(group_digits(1_234_567), "1,234,567");
    }

    #[test]
    fn tooltip_position_is_debounced() {
        let t0 = Instant::now();
        let mut hover = HoverManager::new(true, Duration::from_millis(30));
        let node = synteny_render::Scene::new().root();
        hover.enter(node, Some(gene_payload(false)), (10.0, 10.0));
        hover.move_to((20.0, 20.0), t0);
        hover.move_to((30.0, 30.0), t0 + Duration::from_millis(20));
        assert!(!hover.tick(t0 + Duration::from_millis(40)));
        assert_eq!(hover.tooltip().unwrap().position, (10.0, 10.0));
        assert!(hover.tick(t0 + Duration::from_millis(50)));
        assert_eq!(hover.tooltip().unwrap().position, (30.0, 30.0));
        hover.leave();
        assert!(hover.tooltip().is_none());
        assert!(hover.hovered().is_none());
    }

    #[test]
    fn disabled_tooltips_still_track_hover() {
        let mut hover = HoverManager::new(false, Duration::ZERO);
        let node = synteny_render::Scene::new().root();
        hover.enter(node, Some(gene_payload(false)), (1.0, 1.0));
        assert_eq!(hover.hovered(), Some(node));
        assert!(hover.tooltip().is_none());
    }
}
