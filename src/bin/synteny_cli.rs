use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use synteny_render::ExportFormat;
use synteny_viewer::app::read_state;
use synteny_viewer::cli::CommonArgs;
use synteny_viewer::{about, SyntenyOverview, ViewerSettings, ViewportController};

const EXPORT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct SpeciesSummary {
    name: String,
    chromosomes: usize,
    blocks: usize,
}

#[derive(Serialize)]
struct Summary {
    reference_species: String,
    species: Vec<SpeciesSummary>,
    blocks: usize,
    breakpoints: usize,
    ribbons_drawn: usize,
}

fn usage() {
    eprintln!(
        "{}\n\nCommands:\n  summary\n  state\n  export OUTPUT.svg|png|jpg",
        CommonArgs::usage("synteny_cli")
    );
}

fn format_of(path: &Path) -> Result<ExportFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| anyhow!("{} has no file extension", path.display()))?;
    ext.parse().map_err(|e: String| anyhow!(e))
}

fn summary(overview: &SyntenyOverview) -> Summary {
    let dataset = overview.dataset();
    Summary {
        reference_species: dataset.reference_species.clone(),
        species: dataset
            .species_names()
            .into_iter()
            .map(|name| SpeciesSummary {
                chromosomes: dataset.chromosomes_of(&name).count(),
                blocks: dataset.blocks.iter().filter(|b| b.query_name == name).count(),
                name,
            })
            .collect(),
        blocks: dataset.blocks.len(),
        breakpoints: dataset.breakpoints.len(),
        ribbons_drawn: overview.built().ribbons.len(),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args = match CommonArgs::parse(&args) {
        Ok(args) => args,
        Err(e) => {
            usage();
            bail!(e);
        }
    };
    if args.version {
        println!("{}", about::version_cli_text());
        return Ok(());
    }
    if !args.paths.is_complete() || args.rest.is_empty() {
        usage();
        bail!("a synteny table, a species table and a command are required");
    }

    let settings = ViewerSettings::from_json_file(&args.settings_path)?;
    let dataset = args.paths.load().context("loading input tables")?;
    let viewport = ViewportController::new(settings.zoom.clone(), 1200.0, 800.0).shared();
    let mut overview = SyntenyOverview::new(dataset, &settings, viewport);
    if let Some(path) = &args.state_path {
        overview.restore(&read_state(path)?);
    }

    match args.rest[0].as_str() {
        "summary" => println!("{}", serde_json::to_string_pretty(&summary(&overview))?),
        "state" => println!("{}", overview.snapshot().to_json()?),
        "export" => {
            let output = args
                .rest
                .get(1)
                .ok_or_else(|| anyhow!("export needs an output path"))?;
            let path = Path::new(output);
            overview.export(path, format_of(path)?, Some(EXPORT_TIMEOUT))?;
            println!("{}", path.display());
        }
        other => {
            usage();
            bail!("unknown command {other}");
        }
    }
    Ok(())
}
