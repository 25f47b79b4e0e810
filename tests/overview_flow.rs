use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};
use synteny_protocol::{
    AlignmentFilter, BlockKey, Chromosome, Dataset, Strand, SyntenyBlock, ViewportTransform,
    VisualizationState,
};
use synteny_render::export::{export_view_box, EXPORT_PADDING};
use synteny_render::{ExportFormat, Theme};
use synteny_viewer::{
    PanDirection, SyntenyOverview, ViewerSettings, ViewportController, ZoomConfig,
};

fn dataset() -> Dataset {
    Dataset::new(
        vec![
            Chromosome::new("Ref", "chr1", 2000),
            Chromosome::new("Ref", "chr2", 1500),
            Chromosome::new("B", "b1", 1800),
            Chromosome::new("B", "b2", 1200),
        ],
        vec![
            SyntenyBlock::new("Ref", "chr1", 0, 800, "B", "b1", 100, 900, Strand::Forward),
            SyntenyBlock::new("Ref", "chr1", 1000, 1600, "B", "b1", 1000, 1500, Strand::Reverse),
            SyntenyBlock::new("Ref", "chr2", 200, 900, "B", "b2", 0, 700, Strand::Forward),
        ],
        vec![],
    )
}

fn overview() -> SyntenyOverview {
    let settings = ViewerSettings::default();
    let viewport = ViewportController::new(settings.zoom.clone(), 1000.0, 700.0).shared();
    SyntenyOverview::new(dataset(), &settings, viewport)
}

fn drawn_keys(overview: &SyntenyOverview) -> Vec<BlockKey> {
    let mut keys: Vec<BlockKey> = overview.built().ribbons.iter().map(|r| r.key.clone()).collect();
    keys.sort_by_key(|k| k.to_string());
    keys
}

fn screen_point_on(overview: &SyntenyOverview, key: &BlockKey) -> (f64, f64) {
    let ribbon = overview.built().ribbon(key).unwrap();
    let node = overview.scene().node(ribbon.nodes.path).unwrap();
    let c = node.own_bounds().unwrap().center();
    overview.viewport().borrow().transform().apply((c.x, c.y))
}

fn view_box_of(svg_text: &str) -> Vec<f64> {
    for event in svg::read(svg_text).unwrap() {
        if let svg::parser::Event::Tag("svg", _, attributes) = event {
            return attributes["viewBox"]
                .split_whitespace()
                .map(|v| v.parse().unwrap())
                .collect();
        }
    }
    panic!("no svg root");
}

#[test]
fn selecting_a_ribbon_leaves_the_view_where_it_was() {
    let now = Instant::now();
    let mut o = overview();
    let zoomed = ViewportTransform::new(2.0, 100.0, 50.0);
    o.viewport().borrow_mut().set_transform(zoomed);

    let key = o.dataset().blocks[0].key();
    let at = screen_point_on(&o, &key);
    o.pointer_move(at, now);
    let click = o.click(at, now).unwrap();
    assert!(click.selected);
    o.tick(now + Duration::from_millis(16));

    assert_eq!(o.viewport().borrow().transform(), zoomed);
    assert_eq!(o.selection().keys(), &[key.clone()]);

    o.click(at, now).unwrap();
    o.tick(now + Duration::from_millis(32));
    assert_eq!(o.viewport().borrow().transform(), zoomed);
    assert!(o.selection().is_empty());
}

#[test]
fn chromosome_and_strand_filters_hide_ribbons() {
    let mut o = overview();
    assert_eq!(drawn_keys(&o).len(), 3);

    o.set_selected_chromosomes(vec!["ref:chr1".to_string()]);
    let keys = drawn_keys(&o);
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().all(|k| k.ref_chr == "chr1"));

    // A query key for B narrows chr1 to the named B chromosome.
    o.set_selected_chromosomes(vec!["ref:chr1".to_string(), "B:b2".to_string()]);
    assert!(drawn_keys(&o).is_empty());

    o.set_selected_chromosomes(vec![]);
    o.set_alignment_filter(AlignmentFilter::Reverse);
    let keys = drawn_keys(&o);
    assert_eq!(keys, vec![o.dataset().blocks[1].key()]);
}

#[test]
fn svg_export_covers_the_whole_scene_in_both_themes() {
    let dir = tempfile::tempdir().unwrap();
    for theme in [Theme::Light, Theme::Dark] {
        let mut o = overview();
        o.set_theme(theme);
        o.viewport()
            .borrow_mut()
            .set_transform(ViewportTransform::new(3.0, -400.0, -250.0));
        let path = dir.path().join(format!("{theme:?}.svg"));
        o.export(&path, ExportFormat::Svg, None).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let vb = view_box_of(&text);
        let bounds = o.scene().bounding_box().unwrap();
        assert!((vb[0] - (bounds.x - EXPORT_PADDING)).abs() < 1e-6);
        assert!((vb[2] - (bounds.width + 2.0 * EXPORT_PADDING)).abs() < 1e-6);
        assert!((vb[3] - (bounds.height + 2.0 * EXPORT_PADDING)).abs() < 1e-6);
        assert_eq!(export_view_box(o.scene()).width, vb[2]);
        assert!(text.contains(theme.text()));
    }
}

#[test]
fn png_export_writes_a_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overview.png");
    let mut o = overview();
    o.export(&path, ExportFormat::Png, Some(Duration::from_secs(60)))
        .unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn continuous_pan_stops_cleanly() {
    let t0 = Instant::now();
    let config = ZoomConfig::default();
    let cadence = config.pan_cadence();
    let step = config.pan_step_px;
    let mut viewport = ViewportController::new(config, 800.0, 600.0);

    viewport.start_pan(PanDirection::Left, t0);
    viewport.start_pan(PanDirection::Left, t0);
    assert!(!viewport.tick(t0));
    for n in 1..=3 {
        assert!(viewport.tick(t0 + cadence * n));
    }
    assert_eq!(viewport.transform().x, 3.0 * step);

    viewport.stop_pan();
    assert!(!viewport.is_panning());
    assert!(!viewport.tick(t0 + cadence * 10));
    assert_eq!(viewport.transform().x, 3.0 * step);
}

#[test]
fn zoom_steps_stay_within_bounds() {
    let mut now = Instant::now();
    let config = ZoomConfig::default();
    let (min, max) = (config.min_scale, config.max_scale);
    let settle = config.duration() + Duration::from_millis(1);
    let mut viewport = ViewportController::new(config, 800.0, 600.0);

    for _ in 0..30 {
        viewport.zoom_in(now);
        now += settle;
        viewport.tick(now);
    }
    assert_eq!(viewport.transform().k, max);
    assert_eq!(viewport.zoom_percent(), (max * 100.0).round() as u32);

    for _ in 0..60 {
        viewport.zoom_out(now);
        now += settle;
        viewport.tick(now);
    }
    assert_eq!(viewport.transform().k, min);

    viewport.reset(now);
    viewport.tick(now + settle);
    assert_eq!(viewport.transform(), ViewportTransform::IDENTITY);
}

#[test]
fn snapshot_survives_json_and_a_fresh_viewer() {
    let mut o = overview();
    let key = o.dataset().blocks[2].key();
    o.select(key.clone());
    o.set_mutation_type(key.clone(), Some(synteny_protocol::MutationType::Inv));
    o.set_alignment_filter(AlignmentFilter::Forward);
    o.set_selected_chromosomes(vec!["ref:chr2".to_string()]);
    o.viewport()
        .borrow_mut()
        .set_transform(ViewportTransform::new(1.5, -20.0, 10.0));

    let json = o.snapshot().to_json().unwrap();
    let state = VisualizationState::from_json(&json).unwrap();

    let mut fresh = overview();
    fresh.restore(&state);
    assert_eq!(fresh.snapshot(), o.snapshot());
    assert_eq!(drawn_keys(&fresh), vec![key.clone()]);
    assert!(fresh.selection().is_selected(&key));
}

#[test]
fn dashed_chromosome_ids_survive_a_snapshot() {
    let dashed = || {
        Dataset::new(
            vec![
                Chromosome::new("Ref", "chr-1", 2000),
                Chromosome::new("B", "b-1", 1800),
            ],
            vec![SyntenyBlock::new(
                "Ref", "chr-1", 0, 800, "B", "b-1", 100, 900, Strand::Forward,
            )],
            vec![],
        )
    };
    let settings = ViewerSettings::default();
    let viewer = || {
        let viewport = ViewportController::new(settings.zoom.clone(), 1000.0, 700.0).shared();
        SyntenyOverview::new(dashed(), &settings, viewport)
    };

    let mut o = viewer();
    let key = o.dataset().blocks[0].key();
    o.select(key.clone());
    o.set_mutation_type(key.clone(), Some(synteny_protocol::MutationType::Dup));
    let state = VisualizationState::from_json(&o.snapshot().to_json().unwrap()).unwrap();

    let mut fresh = viewer();
    fresh.restore(&state);
    assert_eq!(fresh.selection().keys(), &[key.clone()]);
    assert_eq!(
        fresh.selection().mutation_type(&key),
        Some(synteny_protocol::MutationType::Dup)
    );
    assert_eq!(fresh.snapshot(), o.snapshot());
}
