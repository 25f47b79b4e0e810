//! Interactive controller for the chromosome overview: owns the dataset, the
//! filters and the built scene, and routes pointer input through hover,
//! selection and the ribbon state machine without ever writing the viewport
//! transform itself.

use crate::error::ViewerError;
use crate::hover::{HoverManager, TooltipPayload};
use crate::ribbon_state::{PendingStyles, RibbonEvent, RibbonState};
use crate::selection::SelectionSet;
use crate::settings::ViewerSettings;
use crate::viewport::SharedViewport;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::{Duration, Instant};
use synteny_protocol::{
    AlignmentFilter, BlockKey, Dataset, MutationType, SyntenyBlock, VisualizationState,
};
use synteny_render::export::export_to_path;
use synteny_render::{
    build_overview, ExportFormat, ExportOptions, Interaction, NodeId, OverviewOptions,
    OverviewScene, Point, RenderedRibbon, Scene, Theme,
};

/// Hit tolerance in screen pixels.
const HIT_TOLERANCE_PX: f64 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct RibbonClick {
    pub key: BlockKey,
    pub selected: bool,
}

pub struct SyntenyOverview {
    dataset: Dataset,
    options: OverviewOptions,
    built: OverviewScene,
    viewport: SharedViewport,
    selection: SelectionSet,
    hover: HoverManager,
    states: HashMap<BlockKey, RibbonState>,
    pending: PendingStyles,
    selection_dirty: bool,
    revision: u64,
}

impl SyntenyOverview {
    pub fn new(dataset: Dataset, settings: &ViewerSettings, viewport: SharedViewport) -> Self {
        let options = OverviewOptions {
            show_breakpoints: settings.show_breakpoints,
            layout: settings.layout.clone(),
            ribbon: settings.ribbon.clone(),
            theme: settings.theme,
            species_colors: settings.species_colors.clone(),
            custom_coloring: settings.custom_coloring,
            ..Default::default()
        };
        let built = build_overview(&dataset, &options);
        let mut overview = Self {
            dataset,
            options,
            built,
            viewport,
            selection: SelectionSet::new(),
            hover: HoverManager::new(settings.show_tooltips, settings.zoom.tooltip_debounce()),
            states: HashMap::new(),
            pending: PendingStyles::new(),
            selection_dirty: false,
            revision: 0,
        };
        overview.rebuild();
        overview
    }

    /// Clears and redraws the whole scene from the data and current filters,
    /// then reapplies selection visuals.
    pub fn rebuild(&mut self) {
        self.options.mutation_types = self.selection.mutation_types_by_key_str();
        self.built = build_overview(&self.dataset, &self.options);
        self.pending.discard();
        self.hover.leave();
        self.states.clear();
        for ribbon in &self.built.ribbons {
            let state = RibbonState::from_selected(self.selection.is_selected(&ribbon.key));
            if state.is_selected() {
                self.pending.queue_ribbon(
                    &ribbon.nodes,
                    state.visual(ribbon.strand, &self.options.ribbon),
                    false,
                );
            }
            self.states.insert(ribbon.key.clone(), state);
        }
        self.pending.flush(&mut self.built.scene);
        self.selection_dirty = false;
        self.revision += 1;
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn options(&self) -> &OverviewOptions {
        &self.options
    }

    pub fn built(&self) -> &OverviewScene {
        &self.built
    }

    pub fn scene(&self) -> &Scene {
        &self.built.scene
    }

    pub fn viewport(&self) -> &SharedViewport {
        &self.viewport
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    pub fn hover(&self) -> &HoverManager {
        &self.hover
    }

    /// Bumped whenever the scene changes in a way other than hover styling.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn ribbon_state(&self, key: &BlockKey) -> Option<RibbonState> {
        self.states.get(key).copied()
    }

    pub fn set_dataset(&mut self, dataset: Dataset) {
        log::info!(
            "Loaded {} chromosomes and {} synteny blocks",
            dataset.chromosomes.len(),
            dataset.blocks.len()
        );
        self.dataset = dataset;
        self.selection.clear();
        self.selection.replace_mutation_types(BTreeMap::new());
        self.rebuild();
    }

    pub fn set_selected_species(&mut self, species: Vec<String>) {
        self.options.selected_species = species;
        self.rebuild();
    }

    pub fn set_selected_chromosomes(&mut self, keys: Vec<String>) {
        self.options.selected_chromosomes = keys;
        self.rebuild();
    }

    /// Adds or removes one `ref:<chr>` / `<species>:<chr>` key.
    pub fn toggle_chromosome_key(&mut self, key: &str) {
        let keys = &mut self.options.selected_chromosomes;
        match keys.iter().position(|k| k == key) {
            Some(pos) => {
                keys.remove(pos);
            }
            None => keys.push(key.to_string()),
        }
        self.rebuild();
    }

    pub fn set_alignment_filter(&mut self, filter: AlignmentFilter) {
        self.options.alignment_filter = filter;
        self.rebuild();
    }

    pub fn set_show_connected_only(&mut self, on: bool) {
        self.options.show_connected_only = on;
        self.rebuild();
    }

    pub fn set_show_breakpoints(&mut self, on: bool) {
        self.options.show_breakpoints = on;
        self.rebuild();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.options.theme = theme;
        self.rebuild();
    }

    pub fn set_custom_coloring(&mut self, on: bool) {
        self.options.custom_coloring = on;
        self.rebuild();
    }

    /// `None` drops the override and falls back to the palette.
    pub fn set_species_color(&mut self, species: &str, color: Option<String>) {
        match color {
            Some(c) => self.options.species_colors.insert(species.to_string(), c),
            None => self.options.species_colors.remove(species),
        };
        self.rebuild();
    }

    pub fn set_show_tooltips(&mut self, show: bool) {
        self.hover.set_show_tooltips(show);
    }

    /// Applies changed settings that shape the scene.
    pub fn apply_settings(&mut self, settings: &ViewerSettings) {
        self.options.layout = settings.layout.clone();
        self.options.ribbon = settings.ribbon.clone();
        self.options.theme = settings.theme;
        self.options.show_breakpoints = settings.show_breakpoints;
        self.options.custom_coloring = settings.custom_coloring;
        self.options.species_colors = settings.species_colors.clone();
        self.hover = HoverManager::new(settings.show_tooltips, settings.zoom.tooltip_debounce());
        self.rebuild();
    }

    fn ribbon(&self, key: &BlockKey) -> Option<&RenderedRibbon> {
        self.built.ribbon(key)
    }

    fn transition(&mut self, key: &BlockKey, event: RibbonEvent) {
        let Some(ribbon) = self.built.ribbon(key) else {
            return;
        };
        let before = self.states.get(key).copied().unwrap_or_default();
        let after = before.on(event);
        let raise = event == RibbonEvent::PointerEnter && !before.is_selected();
        if after != before || raise {
            self.pending.queue_ribbon(
                &ribbon.nodes,
                after.visual(ribbon.strand, &self.options.ribbon),
                raise,
            );
        }
        if after.is_selected() != before.is_selected() {
            self.selection_dirty = true;
        }
        self.states.insert(key.clone(), after);
    }

    /// Moves a ribbon to the state its selection membership dictates.
    fn sync_ribbon(&mut self, key: &BlockKey) {
        let selected = self.selection.is_selected(key);
        let hovered = self.hovered_ribbon().is_some_and(|r| r.key == *key);
        let target = match (selected, hovered) {
            (true, _) => RibbonState::Selected,
            (false, true) => RibbonState::UnselectedHovered,
            (false, false) => RibbonState::UnselectedDefault,
        };
        let Some(ribbon) = self.ribbon(key) else {
            return;
        };
        let visual = target.visual(ribbon.strand, &self.options.ribbon);
        let nodes = ribbon.nodes.clone();
        if self.states.get(key).copied() != Some(target) {
            self.pending.queue_ribbon(&nodes, visual, false);
            self.selection_dirty = true;
            self.states.insert(key.clone(), target);
        }
    }

    fn hit(&self, screen: (f64, f64), now: Instant) -> Option<NodeId> {
        let viewport = self.viewport.borrow();
        let (x, y) = viewport.screen_to_content(screen, now);
        let k = viewport.displayed(now).k.max(f64::EPSILON);
        self.built.scene.hit_test(Point::new(x, y), HIT_TOLERANCE_PX / k)
    }

    fn ribbon_key_of(&self, node: NodeId) -> Option<BlockKey> {
        match self.built.scene.interaction(node)? {
            Interaction::Ribbon(key) => Some(key.clone()),
            _ => None,
        }
    }

    pub fn hovered_ribbon(&self) -> Option<&RenderedRibbon> {
        let node = self.hover.hovered()?;
        let key = self.ribbon_key_of(node)?;
        self.ribbon(&key)
    }

    /// Pointer position in screen coordinates relative to the view.
    pub fn pointer_move(&mut self, screen: (f64, f64), now: Instant) {
        let hit = self.hit(screen, now);
        if hit.is_some() && hit == self.hover.hovered() {
            self.hover.move_to(screen, now);
            return;
        }
        self.pointer_leave();
        let Some(node) = hit else {
            return;
        };
        let payload = self.payload_for(node);
        if let Some(key) = self.ribbon_key_of(node) {
            self.transition(&key, RibbonEvent::PointerEnter);
        }
        self.hover.enter(node, payload, screen);
    }

    pub fn pointer_leave(&mut self) {
        if let Some(node) = self.hover.hovered() {
            if let Some(key) = self.ribbon_key_of(node) {
                self.transition(&key, RibbonEvent::PointerLeave);
            }
        }
        self.hover.leave();
    }

    fn payload_for(&self, node: NodeId) -> Option<TooltipPayload> {
        let interaction = self.built.scene.interaction(node)?;
        let (mutation_type, selected) = match interaction {
            Interaction::Ribbon(key) => (
                self.selection.mutation_type(key),
                self.selection.is_selected(key),
            ),
            _ => (None, false),
        };
        TooltipPayload::from_interaction(interaction, &self.dataset, mutation_type, selected)
    }

    /// Toggles the ribbon under the pointer, if any. The viewport transform
    /// read before the toggle is written back afterwards so a selection
    /// never shifts the view.
    pub fn click(&mut self, screen: (f64, f64), now: Instant) -> Option<RibbonClick> {
        let node = self.hit(screen, now)?;
        let key = self.ribbon_key_of(node)?;
        let saved = self.viewport.borrow().transform();

        let selected = self.selection.toggle(key.clone());
        self.transition(&key, RibbonEvent::Click);
        if self.hover.hovered() == Some(node) {
            let payload = self.payload_for(node);
            self.hover.enter(node, payload, screen);
        }

        let mut viewport = self.viewport.borrow_mut();
        if !viewport.transform().approx_eq(&saved) {
            viewport.set_transform(saved);
        }
        Some(RibbonClick { key, selected })
    }

    pub fn select(&mut self, key: BlockKey) -> bool {
        let changed = self.selection.select(key.clone());
        self.sync_ribbon(&key);
        changed
    }

    pub fn deselect(&mut self, key: &BlockKey) -> bool {
        let changed = self.selection.deselect(key);
        self.sync_ribbon(key);
        changed
    }

    pub fn toggle(&mut self, key: BlockKey) -> bool {
        let selected = self.selection.toggle(key.clone());
        self.sync_ribbon(&key);
        selected
    }

    pub fn clear_selection(&mut self) {
        let keys = self.selection.keys().to_vec();
        self.selection.clear();
        for key in &keys {
            self.sync_ribbon(key);
        }
    }

    /// Mutation types feed ribbon colors, so a change under custom coloring
    /// redraws the scene.
    pub fn set_mutation_type(&mut self, key: BlockKey, value: Option<MutationType>) {
        self.selection.set_mutation_type(key, value);
        if self.options.custom_coloring {
            self.rebuild();
        }
    }

    pub fn current_block(&self) -> Option<&SyntenyBlock> {
        self.dataset.block(self.selection.current()?)
    }

    pub fn next_block(&mut self) -> Option<&SyntenyBlock> {
        let key = self.selection.next()?.clone();
        self.dataset.block(&key)
    }

    pub fn prev_block(&mut self) -> Option<&SyntenyBlock> {
        let key = self.selection.prev()?.clone();
        self.dataset.block(&key)
    }

    /// Applies queued style writes. Returns whether anything changed.
    pub fn flush_frame(&mut self) -> bool {
        let applied = self.pending.flush(&mut self.built.scene) > 0;
        if applied && self.selection_dirty {
            self.revision += 1;
        }
        self.selection_dirty = false;
        applied
    }

    /// Once per frame: advances the viewport, the tooltip debounce and the
    /// style queue. Returns whether a repaint is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let moved = self.viewport.borrow_mut().tick(now);
        let tooltip = self.hover.tick(now);
        let styled = self.flush_frame();
        moved || tooltip || styled
    }

    pub fn snapshot(&self) -> VisualizationState {
        VisualizationState {
            selected_species: self.options.selected_species.clone(),
            selected_chromosomes: self.options.selected_chromosomes.clone(),
            alignment_filter: self.options.alignment_filter,
            show_connected_only: self.options.show_connected_only,
            transform: self.viewport.borrow().transform(),
            selected_synteny: self.selection.keys().iter().map(ToString::to_string).collect(),
            mutation_types: self.selection.mutation_types_by_key_str(),
            custom_species_colors: self.options.species_colors.clone(),
        }
    }

    /// Key strings are matched against the loaded blocks first, since ids
    /// containing dashes make the bare string ambiguous.
    fn resolve_key(&self, text: &str) -> Option<BlockKey> {
        let key = self
            .dataset
            .block_by_key_str(text)
            .map(SyntenyBlock::key)
            .or_else(|| BlockKey::parse(text));
        if key.is_none() {
            log::debug!("ignoring malformed selection key {text}");
        }
        key
    }

    /// Restores filters, selection, mutation types, colors and the transform.
    /// Keys that do not parse are skipped.
    pub fn restore(&mut self, state: &VisualizationState) {
        self.options.selected_species = state.selected_species.clone();
        self.options.selected_chromosomes = state.selected_chromosomes.clone();
        self.options.alignment_filter = state.alignment_filter;
        self.options.show_connected_only = state.show_connected_only;
        self.options.species_colors = state.custom_species_colors.clone();

        let keys = state
            .selected_synteny
            .iter()
            .filter_map(|text| self.resolve_key(text))
            .collect();
        self.selection.replace(keys);
        let types = state
            .mutation_types
            .iter()
            .filter_map(|(text, t)| self.resolve_key(text).map(|k| (k, *t)))
            .collect();
        self.selection.replace_mutation_types(types);

        self.rebuild();
        self.viewport.borrow_mut().set_transform(state.transform);
    }

    /// Writes the full scene, independent of the current pan and zoom.
    pub fn export(
        &mut self,
        path: &Path,
        format: ExportFormat,
        timeout: Option<Duration>,
    ) -> Result<(), ViewerError> {
        self.flush_frame();
        let mut options = ExportOptions::new(format, self.options.theme);
        options.deadline = timeout.map(|t| Instant::now() + t);
        export_to_path(&self.built.scene, path, &options)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ZoomConfig;
    use crate::viewport::ViewportController;
    use synteny_protocol::{Chromosome, Strand, ViewportTransform};

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                Chromosome::new("Ref", "chr1", 1000),
                Chromosome::new("B", "b1", 1000),
            ],
            vec![
                SyntenyBlock::new("Ref", "chr1", 0, 500, "B", "b1", 0, 500, Strand::Forward),
                SyntenyBlock::new("Ref", "chr1", 600, 900, "B", "b1", 600, 900, Strand::Reverse),
            ],
            vec![],
        )
    }

    fn overview() -> SyntenyOverview {
        let viewport = ViewportController::new(ZoomConfig::default(), 800.0, 600.0).shared();
        SyntenyOverview::new(dataset(), &ViewerSettings::default(), viewport)
    }

    /// Screen point on the middle of a ribbon's band.
    fn ribbon_point(overview: &SyntenyOverview, key: &BlockKey) -> (f64, f64) {
        let ribbon = overview.built().ribbon(key).unwrap();
        let node = overview.scene().node(ribbon.nodes.path).unwrap();
        let bounds = node.own_bounds().unwrap();
        let c = bounds.center();
        overview.viewport().borrow().transform().apply((c.x, c.y))
    }

    #[test]
    fn hover_raises_and_flushes_next_frame() {
        let now = Instant::now();
        let mut o = overview();
        let key = o.dataset().blocks[0].key();
        let p = ribbon_point(&o, &key);
        let revision = o.revision();
        o.pointer_move(p, now);
        assert_eq!(o.ribbon_state(&key), Some(RibbonState::UnselectedHovered));
        let path = o.built().ribbon(&key).unwrap().nodes.path;
        assert_eq!(o.scene().node(path).unwrap().style.opacity, Some(0.45));
        assert!(o.tick(now));
        assert_eq!(o.scene().node(path).unwrap().style.opacity, Some(0.85));
        assert_eq!(o.revision(), revision);
        assert_eq!(o.hover().tooltip().unwrap().payload.kind(), "synteny");

        o.pointer_leave();
        o.flush_frame();
        assert_eq!(o.ribbon_state(&key), Some(RibbonState::UnselectedDefault));
        assert_eq!(o.scene().node(path).unwrap().style.opacity, Some(0.45));
    }

    #[test]
    fn click_toggles_and_keeps_transform() {
        let now = Instant::now();
        let mut o = overview();
        o.viewport()
            .borrow_mut()
            .set_transform(ViewportTransform::new(2.0, 100.0, 50.0));
        let key = o.dataset().blocks[1].key();
        let p = ribbon_point(&o, &key);
        let click = o.click(p, now).unwrap();
        assert_eq!(click, RibbonClick { key: key.clone(), selected: true });
        o.flush_frame();
        assert_eq!(
            o.viewport().borrow().transform(),
            ViewportTransform::new(2.0, 100.0, 50.0)
        );
        assert_eq!(o.ribbon_state(&key), Some(RibbonState::Selected));
        assert_eq!(o.current_block().map(|b| b.key()), Some(key.clone()));

        assert!(!o.click(p, now).unwrap().selected);
        assert!(o.selection().is_empty());
    }

    #[test]
    fn selection_survives_rebuild_and_snapshot() {
        let mut o = overview();
        let key = o.dataset().blocks[0].key();
        o.select(key.clone());
        o.set_mutation_type(key.clone(), Some(MutationType::Dup));
        o.set_alignment_filter(AlignmentFilter::Forward);
        assert_eq!(o.ribbon_state(&key), Some(RibbonState::Selected));
        o.viewport()
            .borrow_mut()
            .set_transform(ViewportTransform::new(1.5, -20.0, 10.0));

        let state = o.snapshot();
        assert_eq!(state.selected_synteny, vec!["chr1-b1-0-0".to_string()]);
        let json = state.to_json().unwrap();

        let mut fresh = overview();
        fresh.restore(&VisualizationState::from_json(&json).unwrap());
        assert_eq!(fresh.snapshot(), state);
        assert_eq!(fresh.built().ribbons.len(), 1);
        assert_eq!(fresh.ribbon_state(&key), Some(RibbonState::Selected));
    }

    #[test]
    fn custom_coloring_redraws_on_mutation_type() {
        let mut o = overview();
        o.set_custom_coloring(true);
        let key = o.dataset().blocks[0].key();
        let before = o.revision();
        o.set_mutation_type(key.clone(), Some(MutationType::Inv));
        assert!(o.revision() > before);
        let path = o.built().ribbon(&key).unwrap().nodes.path;
        assert_eq!(
            o.scene().node(path).unwrap().style.stroke.as_deref(),
            Some(MutationType::Inv.color())
        );
    }

    #[test]
    fn navigation_follows_selection() {
        let mut o = overview();
        let a = o.dataset().blocks[0].key();
        let b = o.dataset().blocks[1].key();
        o.select(a.clone());
        o.select(b.clone());
        assert_eq!(o.next_block().map(|blk| blk.key()), Some(b));
        assert_eq!(o.next_block().map(|blk| blk.key()), Some(a.clone()));
        o.clear_selection();
        assert!(o.current_block().is_none());
        o.flush_frame();
        assert_eq!(o.ribbon_state(&a), Some(RibbonState::UnselectedDefault));
    }

    #[test]
    fn export_ignores_view_transform() {
        let dir = tempfile::tempdir().unwrap();
        let mut o = overview();
        let path = dir.path().join("view.svg");
        o.export(&path, ExportFormat::Svg, None).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        o.viewport()
            .borrow_mut()
            .set_transform(ViewportTransform::new(3.0, -400.0, -100.0));
        o.export(&path, ExportFormat::Svg, None).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }
}
