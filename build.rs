use std::time::{SystemTime, UNIX_EPOCH};

fn emit_build_version() {
    let n = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    println!("cargo:rustc-env=SYNTENY_BUILD_N={n}");
    println!(
        "cargo:rustc-env=SYNTENY_DISPLAY_VERSION={}",
        std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string())
    );
}

fn main() {
    emit_build_version();
    println!("cargo:rerun-if-changed=build.rs");
}
