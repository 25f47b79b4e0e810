use anyhow::{anyhow, Result};
use eframe::{egui, NativeOptions};
use std::env;
use synteny_viewer::app::{read_state, SyntenyApp};
use synteny_viewer::cli::CommonArgs;
use synteny_viewer::{about, ViewerSettings};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args = CommonArgs::parse(&args).map_err(|e| {
        eprintln!("{}", CommonArgs::usage("synteny_viewer"));
        anyhow!(e)
    })?;
    if args.version {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    let settings = ViewerSettings::from_json_file(&args.settings_path)?;
    let state = args.state_path.as_deref().map(read_state).transpose()?;

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(about::window_title())
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Synteny Viewer",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(SyntenyApp::new(
                settings,
                args.settings_path,
                args.paths,
                state,
            )))
        }),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
