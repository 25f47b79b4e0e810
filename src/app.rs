use crate::about;
use crate::detail::DetailView;
use crate::error::ViewerError;
use crate::loader::DatasetPaths;
use crate::minimap::MinimapFrame;
use crate::overview::SyntenyOverview;
use crate::paint::{outline_path, outline_rect, parse_hex, theme_color, SceneTexture};
use crate::settings::ViewerSettings;
use crate::viewport::{PanDirection, SharedViewport, ViewKey, ViewportController};
use anyhow::{anyhow, Result};
use eframe::egui::{self, menu, Color32, Pos2, Sense, Stroke, Ui, Vec2};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use synteny_protocol::{
    AlignmentFilter, BlockKey, Dataset, MutationType, VisualizationState,
};
use synteny_render::export::timestamped_filename;
use synteny_render::{ExportFormat, NodeKind, Theme};

const MINIMAP_SIZE: Vec2 = Vec2::new(220.0, 130.0);
const EXPORT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct SyntenyApp {
    settings: ViewerSettings,
    settings_path: PathBuf,
    paths: DatasetPaths,
    overview: SyntenyOverview,
    detail: DetailView,
    overview_texture: SceneTexture,
    detail_texture: SceneTexture,
    held_pan: Option<PanDirection>,
    canvas_size: Vec2,
    detail_key: Option<BlockKey>,
    detail_source_revision: u64,
    status: Option<String>,
}

impl SyntenyApp {
    pub fn new(
        settings: ViewerSettings,
        settings_path: PathBuf,
        paths: DatasetPaths,
        state: Option<VisualizationState>,
    ) -> Self {
        let viewport: SharedViewport =
            ViewportController::new(settings.zoom.clone(), 800.0, 600.0).shared();
        let mut status = None;
        let dataset = if paths.is_complete() {
            Self::load_dataset(&paths).unwrap_or_else(|e| {
                status = Some(format!("Could not load data: {e}"));
                Dataset::default()
            })
        } else {
            Dataset::default()
        };
        let mut overview = SyntenyOverview::new(dataset, &settings, viewport);
        if let Some(state) = state {
            overview.restore(&state);
        }
        let detail = DetailView::new(&settings, 360.0, 360.0);
        Self {
            settings,
            settings_path,
            paths,
            overview,
            detail,
            overview_texture: SceneTexture::new("synteny-overview"),
            detail_texture: SceneTexture::new("synteny-detail"),
            held_pan: None,
            canvas_size: Vec2::ZERO,
            detail_key: None,
            detail_source_revision: u64::MAX,
            status,
        }
    }

    fn load_dataset(paths: &DatasetPaths) -> Result<Dataset> {
        let dataset = paths.load()?;
        if dataset.is_empty() {
            return Err(anyhow!("no chromosomes found in the species table"));
        }
        Ok(dataset)
    }

    fn reload(&mut self) {
        match Self::load_dataset(&self.paths) {
            Ok(dataset) => {
                self.overview.set_dataset(dataset);
                self.status = None;
            }
            Err(e) => self.report(format!("Could not load data: {e}")),
        }
    }

    fn report(&mut self, message: String) {
        log::warn!("{message}");
        self.status = Some(message);
    }

    fn viewport(&self) -> SharedViewport {
        self.overview.viewport().clone()
    }

    fn pick_table(title: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title(title)
            .add_filter("Tables", &["csv", "tsv", "txt"])
            .pick_file()
    }

    fn render_menu_bar(&mut self, ui: &mut Ui) {
        menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                let mut picked = false;
                if ui.button("Open synteny table…").clicked() {
                    if let Some(path) = Self::pick_table("Synteny table") {
                        self.paths.synteny = Some(path);
                        picked = true;
                    }
                    ui.close_menu();
                }
                if ui.button("Open species table…").clicked() {
                    if let Some(path) = Self::pick_table("Species chromosome table") {
                        self.paths.species = Some(path);
                        picked = true;
                    }
                    ui.close_menu();
                }
                if ui.button("Open reference sizes…").clicked() {
                    self.paths.reference_sizes = Self::pick_table("Reference chromosome sizes");
                    picked = self.paths.reference_sizes.is_some();
                    ui.close_menu();
                }
                if ui.button("Open gene annotations…").clicked() {
                    self.paths.annotations = Self::pick_table("Gene annotations");
                    picked = self.paths.annotations.is_some();
                    ui.close_menu();
                }
                if ui.button("Open breakpoints…").clicked() {
                    self.paths.breakpoints = Self::pick_table("Breakpoints");
                    picked = self.paths.breakpoints.is_some();
                    ui.close_menu();
                }
                if picked && self.paths.is_complete() {
                    self.reload();
                }
                ui.separator();
                if ui.button("Load view state…").clicked() {
                    self.load_state();
                    ui.close_menu();
                }
                if ui.button("Save view state…").clicked() {
                    self.save_state();
                    ui.close_menu();
                }
                if ui.button("Save settings").clicked() {
                    if let Err(e) = self.settings.save_json_file(&self.settings_path) {
                        self.report(format!("Could not save settings: {e}"));
                    }
                    ui.close_menu();
                }
            });
            ui.menu_button("Export", |ui| {
                for format in ExportFormat::ALL {
                    let label = format!("Overview as {}…", format.extension().to_uppercase());
                    if ui.button(label).clicked() {
                        self.export_overview(format);
                        ui.close_menu();
                    }
                }
                ui.separator();
                let has_detail = self.detail.scene().is_some();
                if ui
                    .add_enabled(has_detail, egui::Button::new("Detail view as SVG…"))
                    .clicked()
                {
                    self.export_detail(ExportFormat::Svg);
                    ui.close_menu();
                }
            });
            ui.menu_button("Help", |ui| {
                ui.label(about::version_cli_text());
            });
        });
    }

    fn save_dialog(format: ExportFormat) -> Option<PathBuf> {
        let name = timestamped_filename(format, &chrono::Local::now().naive_local());
        rfd::FileDialog::new()
            .set_file_name(name)
            .add_filter(format.extension().to_uppercase(), &[format.extension()])
            .save_file()
    }

    fn export_overview(&mut self, format: ExportFormat) {
        let Some(path) = Self::save_dialog(format) else {
            return;
        };
        match self.overview.export(&path, format, Some(EXPORT_TIMEOUT)) {
            Ok(()) => self.status = Some(format!("Exported {}", path.display())),
            Err(e) => self.report(format!("Export failed: {e}")),
        }
    }

    fn export_detail(&mut self, format: ExportFormat) {
        let Some(path) = Self::save_dialog(format) else {
            return;
        };
        match self.detail.export(&path, format) {
            Ok(()) => self.status = Some(format!("Exported {}", path.display())),
            Err(e) => self.report(format!("Export failed: {e}")),
        }
    }

    fn save_state(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("synteny-view.json")
            .add_filter("JSON", &["json"])
            .save_file()
        else {
            return;
        };
        let result = self
            .overview
            .snapshot()
            .to_json()
            .map_err(ViewerError::from)
            .and_then(|json| std::fs::write(&path, json).map_err(ViewerError::from));
        if let Err(e) = result {
            self.report(format!("Could not save view state: {e}"));
        }
    }

    fn load_state(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        else {
            return;
        };
        match read_state(&path) {
            Ok(state) => self.overview.restore(&state),
            Err(e) => self.report(format!("Could not load view state: {e}")),
        }
    }

    fn render_toolbar(&mut self, ui: &mut Ui, ctx: &egui::Context, now: Instant) {
        let viewport = self.viewport();
        ui.horizontal(|ui| {
            if ui.button("−").on_hover_text("Zoom out (-)").clicked() {
                viewport.borrow_mut().zoom_out(now);
            }
            ui.label(format!("{}%", viewport.borrow().zoom_percent()));
            if ui.button("+").on_hover_text("Zoom in (+)").clicked() {
                viewport.borrow_mut().zoom_in(now);
            }
            if ui.button("Reset").on_hover_text("Reset view (0)").clicked() {
                viewport.borrow_mut().reset(now);
            }
            ui.separator();

            let mut held = None;
            for (label, direction) in [
                ("◀", PanDirection::Left),
                ("▲", PanDirection::Up),
                ("▼", PanDirection::Down),
                ("▶", PanDirection::Right),
            ] {
                let response = ui.button(label).on_hover_text("Hold to pan");
                if response.is_pointer_button_down_on() {
                    held = Some(direction);
                }
            }
            self.update_held_pan(held, now);
            ui.separator();

            let fullscreen = viewport.borrow().is_fullscreen();
            if ui
                .selectable_label(fullscreen, "Fullscreen")
                .on_hover_text("Toggle fullscreen")
                .clicked()
            {
                self.toggle_fullscreen(ctx);
            }
        });
    }

    fn update_held_pan(&mut self, held: Option<PanDirection>, now: Instant) {
        let viewport = self.viewport();
        let mut viewport = viewport.borrow_mut();
        match (self.held_pan, held) {
            (None, Some(direction)) => {
                viewport.pan_by(direction);
                viewport.start_pan(direction, now);
            }
            (Some(previous), Some(direction)) if previous != direction => {
                viewport.start_pan(direction, now);
            }
            (Some(_), None) => viewport.stop_pan(),
            _ => {}
        }
        self.held_pan = held;
    }

    fn toggle_fullscreen(&mut self, ctx: &egui::Context) {
        let viewport = self.viewport();
        let mut viewport = viewport.borrow_mut();
        if viewport.is_fullscreen() {
            viewport.exit_fullscreen();
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(false));
            return;
        }
        let monitor = ctx.input(|i| i.viewport().monitor_size);
        let screen = monitor.map(|s| (s.x as f64, s.y as f64)).unwrap_or_default();
        let result = viewport.enter_fullscreen(screen, || {
            if monitor.is_none() {
                return Err("monitor size unknown".to_string());
            }
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(true));
            Ok(())
        });
        drop(viewport);
        if let Err(e) = result {
            self.report(e.to_string());
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context, now: Instant) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let keys: Vec<ViewKey> = ctx.input(|i| {
            [
                (egui::Key::ArrowLeft, ViewKey::ArrowLeft),
                (egui::Key::ArrowRight, ViewKey::ArrowRight),
                (egui::Key::ArrowUp, ViewKey::ArrowUp),
                (egui::Key::ArrowDown, ViewKey::ArrowDown),
                (egui::Key::Plus, ViewKey::Plus),
                (egui::Key::Equals, ViewKey::Plus),
                (egui::Key::Minus, ViewKey::Minus),
                (egui::Key::Num0, ViewKey::Zero),
            ]
            .into_iter()
            .filter(|(key, _)| i.key_pressed(*key))
            .map(|(_, view_key)| view_key)
            .collect()
        });
        let viewport = self.viewport();
        for key in keys {
            viewport.borrow_mut().handle_key(key, now);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) && viewport.borrow().is_fullscreen() {
            self.toggle_fullscreen(ctx);
        }
    }

    fn render_filters(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Filters");
            let mut filter = self.overview.options().alignment_filter;
            ui.horizontal(|ui| {
                ui.radio_value(&mut filter, AlignmentFilter::All, "All");
                ui.radio_value(&mut filter, AlignmentFilter::Forward, "Forward");
                ui.radio_value(&mut filter, AlignmentFilter::Reverse, "Reverse");
            });
            if filter != self.overview.options().alignment_filter {
                self.overview.set_alignment_filter(filter);
            }

            let mut connected = self.overview.options().show_connected_only;
            if ui.checkbox(&mut connected, "Connected chromosomes only").changed() {
                self.overview.set_show_connected_only(connected);
            }
            if ui
                .checkbox(&mut self.settings.show_breakpoints, "Breakpoints")
                .changed()
            {
                self.overview.set_show_breakpoints(self.settings.show_breakpoints);
            }
            if ui
                .checkbox(&mut self.settings.show_tooltips, "Tooltips")
                .changed()
            {
                self.overview.set_show_tooltips(self.settings.show_tooltips);
            }
            ui.checkbox(&mut self.settings.show_minimap, "Minimap");
            if ui
                .checkbox(&mut self.settings.custom_coloring, "Color by mutation type")
                .changed()
            {
                self.overview.set_custom_coloring(self.settings.custom_coloring);
            }
            let mut dark = self.settings.theme == Theme::Dark;
            if ui.checkbox(&mut dark, "Dark theme").changed() {
                self.settings.theme = if dark { Theme::Dark } else { Theme::Light };
                self.overview.set_theme(self.settings.theme);
                self.detail.set_theme(self.settings.theme);
            }

            ui.separator();
            self.render_species_filter(ui);
            ui.separator();
            self.render_chromosome_filter(ui);
            ui.separator();
            self.render_selection_list(ui);
        });
    }

    fn render_species_filter(&mut self, ui: &mut Ui) {
        ui.label(egui::RichText::new("Species").strong());
        let all = self.overview.dataset().query_species();
        let selected = self.overview.options().selected_species.clone();
        let colors = self.overview.built().species_colors.clone();
        let mut changed = None;
        for species in &all {
            let mut on = selected.is_empty() || selected.contains(species);
            let color = parse_hex(&colors.color(species)).unwrap_or(Color32::GRAY);
            ui.horizontal(|ui| {
                ui.colored_label(color, "■");
                if ui.checkbox(&mut on, species.as_str()).changed() {
                    changed = Some((species.clone(), on));
                }
            });
        }
        if let Some((species, on)) = changed {
            let mut next: Vec<String> = if selected.is_empty() {
                all.clone()
            } else {
                selected
            };
            next.retain(|s| *s != species);
            if on {
                next.push(species);
            }
            if next.len() == all.len() {
                next.clear();
            }
            self.overview.set_selected_species(next);
        }
    }

    fn render_chromosome_filter(&mut self, ui: &mut Ui) {
        ui.label(egui::RichText::new("Chromosomes").strong());
        let dataset = self.overview.dataset();
        let reference = dataset.reference_species.clone();
        let mut entries = vec![];
        for species in self.overview.built().species_order.clone() {
            let ids: Vec<(String, String)> = dataset
                .chromosomes_of(&species)
                .map(|c| {
                    let key = if species == reference {
                        format!("ref:{}", c.chromosome_id)
                    } else {
                        format!("{species}:{}", c.chromosome_id)
                    };
                    (key, c.chromosome_id.clone())
                })
                .collect();
            entries.push((species, ids));
        }
        let selected = self.overview.options().selected_chromosomes.clone();
        let mut toggled = None;
        for (species, ids) in entries {
            ui.collapsing(species, |ui| {
                for (key, id) in ids {
                    let mut on = selected.contains(&key);
                    if ui.checkbox(&mut on, id).changed() {
                        toggled = Some(key);
                    }
                }
            });
        }
        if let Some(key) = toggled {
            self.overview.toggle_chromosome_key(&key);
        }
        if !selected.is_empty() && ui.button("Clear chromosome selection").clicked() {
            self.overview.set_selected_chromosomes(vec![]);
        }
    }

    fn render_selection_list(&mut self, ui: &mut Ui) {
        ui.label(egui::RichText::new("Selected blocks").strong());
        let keys = self.overview.selection().keys().to_vec();
        if keys.is_empty() {
            ui.label("Click a ribbon to select it.");
            return;
        }
        let mut remove = None;
        for key in &keys {
            ui.horizontal(|ui| {
                if ui.small_button("✕").clicked() {
                    remove = Some(key.clone());
                }
                ui.label(key.to_string());
            });
        }
        if let Some(key) = remove {
            self.overview.deselect(&key);
        }
        if ui.button("Clear selection").clicked() {
            self.overview.clear_selection();
        }
    }

    fn sync_detail(&mut self) {
        let key = self.overview.selection().current().cloned();
        if key == self.detail_key && self.overview.revision() == self.detail_source_revision {
            return;
        }
        let mutation_type = key
            .as_ref()
            .and_then(|k| self.overview.selection().mutation_type(k))
            .filter(|_| self.overview.options().custom_coloring);
        self.detail.show(
            self.overview.dataset(),
            key.as_ref(),
            &self.overview.built().species_colors,
            mutation_type,
        );
        self.detail_key = key;
        self.detail_source_revision = self.overview.revision();
    }

    fn render_detail(&mut self, ui: &mut Ui, now: Instant) {
        ui.heading("Detail view");
        let count = self.overview.selection().len();
        let index = self.overview.selection().current_index().unwrap_or(0);
        ui.horizontal(|ui| {
            if ui.button("◀ Prev").clicked() {
                self.overview.prev_block();
            }
            ui.label(format!("{} / {count}", index + 1));
            if ui.button("Next ▶").clicked() {
                self.overview.next_block();
            }
            let mut locked = self.detail.is_locked();
            if ui.checkbox(&mut locked, "Lock zoom").changed() {
                self.detail.toggle_lock();
            }
        });
        self.sync_detail();

        if let Some(key) = self.detail_key.clone() {
            let current = self.overview.selection().mutation_type(&key);
            let mut choice = current;
            egui::ComboBox::from_label("Mutation type")
                .selected_text(choice.map(MutationType::code).unwrap_or("None"))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut choice, None, "None");
                    for t in MutationType::ALL {
                        ui.selectable_value(&mut choice, Some(t), format!("{} {}", t.code(), t.description()));
                    }
                });
            if choice != current {
                self.overview.set_mutation_type(key, choice);
            }
        }

        let side = ui.available_width().min(ui.available_height()).max(120.0);
        let (response, painter) = ui.allocate_painter(Vec2::splat(side), Sense::click_and_drag());
        let rect = response.rect;
        self.detail.resize(rect.width() as f64, rect.height() as f64);
        painter.rect_filled(rect, 0.0, theme_color(self.settings.theme, Theme::background));

        let Some(radial) = self.detail.scene() else {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No block to show",
                egui::FontId::proportional(13.0),
                theme_color(self.settings.theme, Theme::muted_text),
            );
            return;
        };
        let viewport = self.detail.viewport().clone();
        let transform = viewport.borrow().displayed(now);
        let committed = viewport.borrow().transform().k;
        self.detail_texture.update(
            ui.ctx(),
            &radial.scene,
            self.settings.theme,
            self.detail.revision(),
            committed,
        );
        let painter = painter.with_clip_rect(rect);
        self.detail_texture.paint(&painter, rect.min, &transform);

        if response.dragged() {
            let d = response.drag_delta();
            viewport.borrow_mut().pan_by_delta(d.x as f64, d.y as f64);
        }
        if let Some(pos) = response.hover_pos() {
            let anchor = ((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
            zoom_from_input(ui.ctx(), &viewport, anchor);
        }
    }

    fn render_overview(&mut self, ui: &mut Ui, now: Instant) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;
        let viewport = self.viewport();
        if rect.size() != self.canvas_size {
            self.canvas_size = rect.size();
            viewport
                .borrow_mut()
                .resize(rect.width() as f64, rect.height() as f64);
        }
        let theme = self.settings.theme;
        let painter = painter.with_clip_rect(rect);
        painter.rect_filled(rect, 0.0, theme_color(theme, Theme::background));

        if self.overview.dataset().is_empty() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Open a synteny table and a species table from the File menu",
                egui::FontId::proportional(15.0),
                theme_color(theme, Theme::muted_text),
            );
            return;
        }

        let transform = viewport.borrow().displayed(now);
        let committed = viewport.borrow().transform().k;
        self.overview_texture.update(
            ui.ctx(),
            self.overview.scene(),
            theme,
            self.overview.revision(),
            committed,
        );
        self.overview_texture.paint(&painter, rect.min, &transform);

        if let Some(ribbon) = self.overview.hovered_ribbon() {
            if let Some(NodeKind::Path(path)) = self
                .overview
                .scene()
                .node(ribbon.nodes.path)
                .map(|n| &n.kind)
            {
                let color = parse_hex(self.settings.ribbon.strand_color(ribbon.strand))
                    .unwrap_or(Color32::LIGHT_BLUE);
                outline_path(&painter, path, rect.min, &transform, Stroke::new(2.0, color));
            }
        }

        let minimap_rect = self.settings.show_minimap.then(|| {
            egui::Rect::from_min_size(rect.right_bottom() - MINIMAP_SIZE - Vec2::splat(10.0), MINIMAP_SIZE)
        });
        let over_minimap = |p: Pos2| minimap_rect.is_some_and(|m| m.contains(p));

        match response.hover_pos() {
            Some(pos) if !over_minimap(pos) => {
                let local = ((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
                self.overview.pointer_move(local, now);
                zoom_from_input(ui.ctx(), &viewport, local);
            }
            _ => {
                if self.overview.hover().hovered().is_some() {
                    self.overview.pointer_leave();
                }
            }
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos().filter(|p| !over_minimap(*p)) {
                let local = ((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
                self.overview.click(local, now);
            }
        }
        if response.dragged() {
            let d = response.drag_delta();
            viewport.borrow_mut().pan_by_delta(d.x as f64, d.y as f64);
        }

        if let Some(minimap_rect) = minimap_rect {
            self.render_minimap(ui, &painter, minimap_rect, now);
        }
    }

    fn render_minimap(&mut self, ui: &mut Ui, painter: &egui::Painter, rect: egui::Rect, now: Instant) {
        let theme = self.settings.theme;
        let Some(frame) = MinimapFrame::fit(
            self.overview_texture.view_box(),
            rect.width() as f64,
            rect.height() as f64,
        ) else {
            return;
        };
        painter.rect_filled(rect, 4.0, theme_color(theme, Theme::background));
        let content = frame.content_rect();
        let to_egui = |r: synteny_render::Rect| {
            egui::Rect::from_min_size(
                rect.min + Vec2::new(r.x as f32, r.y as f32),
                Vec2::new(r.width as f32, r.height as f32),
            )
        };
        self.overview_texture.paint_into(painter, to_egui(content));
        outline_rect(painter, rect, Stroke::new(1.0, theme_color(theme, Theme::stroke)));

        let viewport = self.viewport();
        let indicator = frame.indicator(viewport.borrow().visible_region(now));
        outline_rect(painter, to_egui(indicator), Stroke::new(1.5, Color32::from_rgb(0xf5, 0x9e, 0x0b)));

        let response = ui.interact(rect, egui::Id::new("synteny-minimap"), Sense::click_and_drag());
        if let Some(pos) = response.interact_pointer_pos().filter(|_| response.clicked() || response.dragged()) {
            let local = ((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
            let mut viewport = viewport.borrow_mut();
            let target = frame.recenter(local, &viewport.transform(), viewport.container());
            viewport.set_transform(target);
        }
    }

    fn render_tooltip(&self, ctx: &egui::Context, canvas_origin: Pos2) {
        let Some(tooltip) = self.overview.hover().tooltip() else {
            return;
        };
        let pos = canvas_origin + Vec2::new(tooltip.position.0 as f32 + 14.0, tooltip.position.1 as f32 + 14.0);
        egui::Area::new(egui::Id::new("synteny-tooltip"))
            .order(egui::Order::Tooltip)
            .fixed_pos(pos)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(egui::RichText::new(tooltip.payload.title()).strong());
                    for line in tooltip.payload.lines() {
                        ui.label(line);
                    }
                });
            });
    }
}

/// Wheel scrolls and pinch gestures zoom about the pointer.
fn zoom_from_input(ctx: &egui::Context, viewport: &SharedViewport, anchor: (f64, f64)) {
    let (scroll, pinch) = ctx.input(|i| (i.smooth_scroll_delta.y, i.zoom_delta()));
    let mut factor = pinch as f64;
    if scroll != 0.0 {
        factor *= (scroll as f64 / 200.0).exp();
    }
    if (factor - 1.0).abs() > f64::EPSILON {
        viewport.borrow_mut().zoom_by(factor, anchor);
    }
}

pub fn read_state(path: &Path) -> Result<VisualizationState, ViewerError> {
    let text = std::fs::read_to_string(path)?;
    Ok(VisualizationState::from_json(&text)?)
}

impl eframe::App for SyntenyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        ctx.set_visuals(if self.settings.theme.is_dark() {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
        self.handle_keys(ctx, now);

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            self.render_menu_bar(ui);
        });
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui, ctx, now);
        });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let dataset = self.overview.dataset();
                ui.label(format!(
                    "{} chromosomes · {} of {} blocks shown · {} selected",
                    dataset.chromosomes.len(),
                    self.overview.built().ribbons.len(),
                    dataset.blocks.len(),
                    self.overview.selection().len()
                ));
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });
        egui::SidePanel::left("filters")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                self.render_filters(ui);
            });
        if !self.overview.selection().is_empty() {
            egui::SidePanel::right("detail")
                .resizable(true)
                .default_width(380.0)
                .show(ctx, |ui| {
                    self.render_detail(ui, now);
                });
        }
        let mut canvas_origin = Pos2::ZERO;
        egui::CentralPanel::default().show(ctx, |ui| {
            canvas_origin = ui.max_rect().min;
            self.render_overview(ui, now);
        });
        self.render_tooltip(ctx, canvas_origin);

        let viewport = self.viewport();
        let mut busy = self.overview.tick(now);
        busy |= self.detail.tick(now);
        let animating = {
            let v = viewport.borrow();
            v.is_animating(now) || v.is_panning()
        } || self.detail.viewport().borrow().is_animating(now);
        if busy || animating || self.overview.hover().has_pending() {
            ctx.request_repaint();
        }
    }
}
