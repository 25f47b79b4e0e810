pub const SYNTENY_DISPLAY_VERSION: &str = env!("SYNTENY_DISPLAY_VERSION");
pub const SYNTENY_BUILD_N: &str = env!("SYNTENY_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "Synteny Viewer {}\nBuild {}\nComparative genomics synteny browser",
        SYNTENY_DISPLAY_VERSION, SYNTENY_BUILD_N
    )
}

pub fn window_title() -> String {
    format!("Synteny Viewer {SYNTENY_DISPLAY_VERSION}")
}
