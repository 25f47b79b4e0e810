//! Retained vector scene: an arena of groups and primitives that renderers
//! append to, the viewer hit-tests and restyles, and the exporter serializes.

use crate::geometry::{PathData, Point, Rect};
use std::collections::HashMap;
use synteny_protocol::{BlockKey, GeneAnnotation};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Group,
    Path(PathData),
    Rect {
        rect: Rect,
        corner_radius: f64,
    },
    Text {
        position: Point,
        content: String,
        anchor: TextAnchor,
        font_size: f64,
    },
    Line {
        from: Point,
        to: Point,
    },
    Circle {
        center: Point,
        radius: f64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Color(String),
    /// Reference to a gradient registered with [`Scene::add_gradient`].
    Gradient(String),
}

impl Paint {
    pub fn color(color: &str) -> Self {
        Paint::Color(color.to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    pub fill: Option<Paint>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    pub fill_opacity: Option<f64>,
    pub stroke_opacity: Option<f64>,
    pub font_weight: Option<String>,
    /// Class names emitted into exported SVG so theme overrides can target them.
    pub class: Option<String>,
    pub hidden: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: String,
    pub opacity: f64,
}

/// Linear gradient in object-bounding-box units (0..1).
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    pub id: String,
    pub from: Point,
    pub to: Point,
    pub stops: Vec<GradientStop>,
}

/// What a node represents to the interaction layer when it is hovered or clicked.
#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
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
    Ribbon(BlockKey),
    Breakpoint {
        chromosome_id: String,
        label: String,
        start: u64,
        end: u64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    PointerEnter,
    PointerLeave,
    PointerMove,
    Click,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub style: Style,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    interaction: Option<Interaction>,
    events: Vec<SceneEvent>,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            style: Style::default(),
            parent,
            children: vec![],
            interaction: None,
            events: vec![],
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    pub fn listens(&self, event: SceneEvent) -> bool {
        self.events.contains(&event)
    }

    /// Geometric bounds of this primitive alone, ignoring stroke width.
    pub fn own_bounds(&self) -> Option<Rect> {
        match &self.kind {
            NodeKind::Group => None,
            NodeKind::Path(data) => data.bounds(),
            NodeKind::Rect { rect, .. } => Some(*rect),
            NodeKind::Text {
                position,
                content,
                anchor,
                font_size,
            } => {
                let width = estimate_text_width(content, *font_size);
                let x = match anchor {
                    TextAnchor::Start => position.x,
                    TextAnchor::Middle => position.x - width / 2.0,
                    TextAnchor::End => position.x - width,
                };
                Some(Rect::new(x, position.y - font_size * 0.8, width, *font_size))
            }
            NodeKind::Line { from, to } => Rect::from_points([*from, *to]),
            NodeKind::Circle { center, radius } => Some(Rect::new(
                center.x - radius,
                center.y - radius,
                radius * 2.0,
                radius * 2.0,
            )),
        }
    }

    fn hit(&self, p: Point, tolerance: f64) -> bool {
        match &self.kind {
            NodeKind::Group => false,
            NodeKind::Path(data) => data.contains(p),
            NodeKind::Rect { rect, .. } => rect.expand(tolerance).contains(p),
            NodeKind::Circle { center, radius } => {
                ((p.x - center.x).powi(2) + (p.y - center.y).powi(2)).sqrt() <= radius + tolerance
            }
            NodeKind::Line { .. } | NodeKind::Text { .. } => {
                self.own_bounds().is_some_and(|b| b.expand(tolerance).contains(p))
            }
        }
    }
}

pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count().max(1) as f64 * font_size * 0.6
}

/// Arena-backed scene graph. Removed nodes leave a hole so ids stay stable
/// until [`Scene::clear`].
#[derive(Clone, Debug)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    gradients: Vec<LinearGradient>,
    gradient_index: HashMap<String, usize>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::new(NodeKind::Group, None))],
            root: NodeId(0),
            gradients: vec![],
            gradient_index: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Drops every node and gradient; the scene is rebuilt from scratch on
    /// any data, filter or configuration change.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::new(kind, Some(parent))));
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        id
    }

    pub fn create_group(&mut self, parent: NodeId) -> NodeId {
        self.push(parent, NodeKind::Group)
    }

    pub fn create_path(&mut self, parent: NodeId, data: PathData) -> NodeId {
        self.push(parent, NodeKind::Path(data))
    }

    pub fn create_rect(&mut self, parent: NodeId, rect: Rect, corner_radius: f64) -> NodeId {
        self.push(
            parent,
            NodeKind::Rect {
                rect,
                corner_radius,
            },
        )
    }

    pub fn create_text(
        &mut self,
        parent: NodeId,
        position: Point,
        content: &str,
        anchor: TextAnchor,
        font_size: f64,
    ) -> NodeId {
        self.push(
            parent,
            NodeKind::Text {
                position,
                content: content.to_string(),
                anchor,
                font_size,
            },
        )
    }

    pub fn create_line(&mut self, parent: NodeId, from: Point, to: Point) -> NodeId {
        self.push(parent, NodeKind::Line { from, to })
    }

    pub fn create_circle(&mut self, parent: NodeId, center: Point, radius: f64) -> NodeId {
        self.push(parent, NodeKind::Circle { center, radius })
    }

    /// Registers interest in `events` and tags the node with what it represents.
    pub fn on(&mut self, id: NodeId, events: &[SceneEvent], interaction: Interaction) {
        if let Some(node) = self.node_mut(id) {
            for event in events {
                if !node.events.contains(event) {
                    node.events.push(*event);
                }
            }
            node.interaction = Some(interaction);
        }
    }

    /// Detaches and drops `id` with its whole subtree. Removing the root clears the scene.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            self.clear();
            return;
        }
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        if let Some(parent) = node.parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|c| *c != id);
        }
        for child in node.children {
            self.remove(child);
        }
    }

    /// Moves `id` to the end of its parent's children, i.e. on top in paint order.
    pub fn raise(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != id);
            p.children.push(id);
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn style_mut(&mut self, id: NodeId) -> Option<&mut Style> {
        self.node_mut(id).map(|n| &mut n.style)
    }

    /// A gradient with an id already present replaces it in place.
    pub fn add_gradient(&mut self, gradient: LinearGradient) {
        match self.gradient_index.get(&gradient.id) {
            Some(&i) => self.gradients[i] = gradient,
            None => {
                self.gradient_index
                    .insert(gradient.id.clone(), self.gradients.len());
                self.gradients.push(gradient);
            }
        }
    }

    pub fn gradients(&self) -> &[LinearGradient] {
        &self.gradients
    }

    pub fn gradient(&self, id: &str) -> Option<&LinearGradient> {
        self.gradients.get(*self.gradient_index.get(id)?)
    }

    pub fn gradient_mut(&mut self, id: &str) -> Option<&mut LinearGradient> {
        let i = *self.gradient_index.get(id)?;
        self.gradients.get_mut(i)
    }

    /// Visible nodes in paint order (parents before children, siblings in order).
    pub fn paint_order(&self) -> Vec<NodeId> {
        let mut out = vec![];
        self.collect(self.root, &mut out);
        out
    }

    fn collect(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.style.hidden {
            return;
        }
        out.push(id);
        for child in &node.children {
            self.collect(*child, out);
        }
    }

    /// Union of all visible primitive bounds, the equivalent of `getBBox` on the root.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.paint_order()
            .into_iter()
            .filter_map(|id| self.node(id).and_then(Node::own_bounds))
            .reduce(|a, b| a.union(&b))
    }

    /// Topmost interactive node under `p`, walking up to the nearest tagged ancestor.
    pub fn hit_test(&self, p: Point, tolerance: f64) -> Option<NodeId> {
        self.paint_order().into_iter().rev().find_map(|id| {
            let node = self.node(id)?;
            if !node.hit(p, tolerance) {
                return None;
            }
            self.interactive_ancestor(id)
        })
    }

    fn interactive_ancestor(&self, mut id: NodeId) -> Option<NodeId> {
        loop {
            let node = self.node(id)?;
            if node.interaction.is_some() {
                return Some(id);
            }
            id = node.parent?;
        }
    }

    pub fn interaction(&self, id: NodeId) -> Option<&Interaction> {
        self.node(id).and_then(Node::interaction)
    }

    pub fn find_interaction(&self, pred: impl Fn(&Interaction) -> bool) -> Option<NodeId> {
        self.paint_order()
            .into_iter()
            .find(|id| self.interaction(*id).is_some_and(&pred))
    }
}
