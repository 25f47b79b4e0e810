//! Radial detail view of the block under the selection cursor, with its own
//! viewport and a lock that disables zooming.

use crate::error::ViewerError;
use crate::settings::ViewerSettings;
use crate::viewport::{SharedViewport, ViewportController};
use std::path::Path;
use std::time::Instant;
use synteny_protocol::{
    BlockKey, Chromosome, Dataset, MutationType, SyntenyBlock, ViewportTransform,
};
use synteny_render::export::export_to_path;
use synteny_render::{
    ExportFormat, ExportOptions, RadialConfig, RadialInput, RadialScene, RibbonStyle,
    SpeciesColors, Theme,
};

#[derive(Clone, Debug)]
struct Subject {
    block: SyntenyBlock,
    reference: Chromosome,
    query: Chromosome,
}

pub struct DetailView {
    viewport: SharedViewport,
    config: RadialConfig,
    ribbon_style: RibbonStyle,
    theme: Theme,
    species_colors: SpeciesColors,
    mutation_type: Option<MutationType>,
    size: (f64, f64),
    subject: Option<Subject>,
    scene: Option<RadialScene>,
    revision: u64,
}

impl DetailView {
    pub fn new(settings: &ViewerSettings, width: f64, height: f64) -> Self {
        Self {
            viewport: ViewportController::new(settings.detail_zoom.clone(), width, height).shared(),
            config: settings.radial.clone(),
            ribbon_style: settings.ribbon.clone(),
            theme: settings.theme,
            species_colors: SpeciesColors::default(),
            mutation_type: None,
            size: (width, height),
            subject: None,
            scene: None,
            revision: 0,
        }
    }

    pub fn viewport(&self) -> &SharedViewport {
        &self.viewport
    }

    pub fn scene(&self) -> Option<&RadialScene> {
        self.scene.as_ref()
    }

    pub fn block(&self) -> Option<&SyntenyBlock> {
        self.subject.as_ref().map(|s| &s.block)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    /// Shows `key`, or nothing when it is `None` or its chromosomes are not
    /// in `dataset`. Switching blocks resets the detail zoom. A mutation type
    /// colors the ribbon, so pass `None` unless custom coloring is on.
    pub fn show(
        &mut self,
        dataset: &Dataset,
        key: Option<&BlockKey>,
        species_colors: &SpeciesColors,
        mutation_type: Option<MutationType>,
    ) {
        let subject = key.and_then(|key| {
            let block = dataset.block(key)?;
            let reference = dataset.find_chromosome(&block.ref_species, &block.ref_chromosome_id)?;
            let query = dataset.find_chromosome(&block.query_name, &block.query_chromosome_id)?;
            Some(Subject {
                block: block.clone(),
                reference: reference.clone(),
                query: query.clone(),
            })
        });
        let changed = subject.as_ref().map(|s| s.block.key()) != self.block().map(SyntenyBlock::key);
        self.species_colors = species_colors.clone();
        self.mutation_type = mutation_type;
        self.subject = subject;
        if changed {
            self.viewport
                .borrow_mut()
                .set_transform(ViewportTransform::IDENTITY);
        }
        self.rebuild();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.rebuild();
    }

    pub fn apply_settings(&mut self, settings: &ViewerSettings) {
        self.config = settings.radial.clone();
        self.ribbon_style = settings.ribbon.clone();
        self.theme = settings.theme;
        self.rebuild();
    }

    /// New panel size: the scene is laid out again, the transform is kept.
    pub fn resize(&mut self, width: f64, height: f64) {
        if (width, height) == self.size {
            return;
        }
        self.size = (width, height);
        self.viewport.borrow_mut().resize(width, height);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.scene = self.subject.as_ref().map(|s| {
            RadialInput {
                block: &s.block,
                reference: &s.reference,
                query: &s.query,
                config: &self.config,
                ribbon_style: &self.ribbon_style,
                species_colors: &self.species_colors,
                mutation_type: self.mutation_type,
                theme: self.theme,
                width: self.size.0,
                height: self.size.1,
            }
            .build()
        });
        self.revision += 1;
    }

    pub fn is_locked(&self) -> bool {
        self.viewport.borrow().zoom_locked()
    }

    pub fn toggle_lock(&mut self) -> bool {
        let mut viewport = self.viewport.borrow_mut();
        let locked = !viewport.zoom_locked();
        viewport.set_zoom_locked(locked);
        locked
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.viewport.borrow_mut().tick(now)
    }

    pub fn export(&self, path: &Path, format: ExportFormat) -> Result<(), ViewerError> {
        let Some(radial) = &self.scene else {
            return Err(ViewerError::String("no synteny block selected".to_string()));
        };
        export_to_path(&radial.scene, path, &ExportOptions::new(format, self.theme))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synteny_protocol::Strand;

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                Chromosome::new("Ref", "chr1", 2_000_000),
                Chromosome::new("B", "b1", 1_000_000),
            ],
            vec![
                SyntenyBlock::new("Ref", "chr1", 100, 5000, "B", "b1", 200, 4000, Strand::Forward),
                SyntenyBlock::new("Ref", "chr9", 0, 10, "B", "b1", 0, 10, Strand::Forward),
            ],
            vec![],
        )
    }

    #[test]
    fn shows_resolvable_blocks_only() {
        let data = dataset();
        let mut detail = DetailView::new(&ViewerSettings::default(), 500.0, 500.0);
        detail.show(&data, Some(&data.blocks[0].key()), &SpeciesColors::default(), None);
        assert!(detail.scene().is_some());
        detail.show(&data, Some(&data.blocks[1].key()), &SpeciesColors::default(), None);
        assert!(detail.scene().is_none());
        detail.show(&data, None, &SpeciesColors::default(), None);
        assert!(detail.block().is_none());
    }

    #[test]
    fn mutation_type_reaches_the_detail_ribbon() {
        let data = dataset();
        let key = data.blocks[0].key();
        let mut detail = DetailView::new(&ViewerSettings::default(), 500.0, 500.0);
        let stroke = |detail: &DetailView| {
            let radial = detail.scene().unwrap();
            radial.scene.node(radial.ribbon).unwrap().style.stroke.clone()
        };

        detail.show(&data, Some(&key), &SpeciesColors::default(), Some(MutationType::Dup));
        assert_eq!(stroke(&detail).as_deref(), Some(MutationType::Dup.color()));
        detail.show(&data, Some(&key), &SpeciesColors::default(), None);
        assert_ne!(stroke(&detail).as_deref(), Some(MutationType::Dup.color()));
    }

    #[test]
    fn switching_blocks_resets_zoom_but_resize_keeps_it() {
        let data = dataset();
        let mut detail = DetailView::new(&ViewerSettings::default(), 500.0, 500.0);
        let key = data.blocks[0].key();
        detail.show(&data, Some(&key), &SpeciesColors::default(), None);
        detail.viewport().borrow_mut().zoom_by(4.0, (250.0, 250.0));
        assert_eq!(detail.viewport().borrow().transform().k, 4.0);

        let before = detail.revision();
        detail.resize(600.0, 400.0);
        assert!(detail.revision() > before);
        assert_eq!(detail.viewport().borrow().transform().k, 4.0);

        detail.show(&data, Some(&key), &SpeciesColors::default(), None);
        assert_eq!(detail.viewport().borrow().transform().k, 4.0);
        detail.show(&data, None, &SpeciesColors::default(), None);
        assert_eq!(detail.viewport().borrow().transform(), ViewportTransform::IDENTITY);
    }

    #[test]
    fn lock_blocks_zoom() {
        let mut detail = DetailView::new(&ViewerSettings::default(), 500.0, 500.0);
        assert!(detail.toggle_lock());
        detail.viewport().borrow_mut().zoom_by(2.0, (0.0, 0.0));
        assert_eq!(detail.viewport().borrow().transform().k, 1.0);
        assert!(!detail.toggle_lock());
        assert!(!detail.is_locked());
    }
}
