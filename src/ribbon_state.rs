//! Per-ribbon hover/selection state machine and the once-per-frame style
//! write queue the overview funnels every visual change through.

use synteny_protocol::Strand;
use synteny_render::{NodeId, RibbonNodes, RibbonStyle, Scene};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RibbonState {
    #[default]
    UnselectedDefault,
    UnselectedHovered,
    Selected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RibbonEvent {
    PointerEnter,
    PointerLeave,
    Click,
}

impl RibbonState {
    pub fn from_selected(selected: bool) -> Self {
        if selected {
            RibbonState::Selected
        } else {
            RibbonState::UnselectedDefault
        }
    }

    pub fn is_selected(self) -> bool {
        self == RibbonState::Selected
    }

    /// A click always happens under the pointer, so deselecting lands in the
    /// hovered state.
    pub fn on(self, event: RibbonEvent) -> Self {
        use RibbonState::*;
        match (self, event) {
            (Selected, RibbonEvent::Click) => UnselectedHovered,
            (_, RibbonEvent::Click) => Selected,
            (Selected, _) => Selected,
            (_, RibbonEvent::PointerEnter) => UnselectedHovered,
            (_, RibbonEvent::PointerLeave) => UnselectedDefault,
        }
    }

    pub fn visual(self, strand: Strand, style: &RibbonStyle) -> RibbonVisual {
        match self {
            RibbonState::UnselectedDefault => RibbonVisual {
                opacity: style.default_opacity(strand),
                stroke_width: style.stroke_width,
            },
            RibbonState::UnselectedHovered => RibbonVisual {
                opacity: style.hover_opacity,
                stroke_width: style.stroke_width,
            },
            RibbonState::Selected => RibbonVisual {
                opacity: style.selected_opacity,
                stroke_width: style.selected_stroke_width,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RibbonVisual {
    pub opacity: f64,
    pub stroke_width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum StyleWrite {
    Opacity(NodeId, f64),
    StrokeWidth(NodeId, f64),
    Raise(NodeId),
}

/// Style writes collected during event handling and applied together by
/// [`PendingStyles::flush`] at the frame boundary.
#[derive(Debug, Default)]
pub struct PendingStyles {
    writes: Vec<StyleWrite>,
}

impl PendingStyles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn queue_ribbon(&mut self, nodes: &RibbonNodes, visual: RibbonVisual, raise: bool) {
        for id in [nodes.ref_rect, nodes.query_rect, nodes.path] {
            self.writes.push(StyleWrite::Opacity(id, visual.opacity));
        }
        self.writes
            .push(StyleWrite::StrokeWidth(nodes.path, visual.stroke_width));
        if raise {
            self.writes.push(StyleWrite::Raise(nodes.group));
        }
    }

    /// Drops queued writes, used when the scene they target is rebuilt.
    pub fn discard(&mut self) {
        self.writes.clear();
    }

    /// Applies every queued write in order. Writes to removed nodes are
    /// ignored. Returns how many were applied.
    pub fn flush(&mut self, scene: &mut Scene) -> usize {
        let mut applied = 0;
        for write in self.writes.drain(..) {
            match write {
                StyleWrite::Opacity(id, value) => {
                    if let Some(style) = scene.style_mut(id) {
                        style.opacity = Some(value);
                        applied += 1;
                    }
                }
                StyleWrite::StrokeWidth(id, value) => {
                    if let Some(style) = scene.style_mut(id) {
                        style.stroke_width = Some(value);
                        applied += 1;
                    }
                }
                StyleWrite::Raise(id) => {
                    if scene.node(id).is_some() {
                        scene.raise(id);
                        applied += 1;
                    }
                }
            }
        }
        applied
    }
}
