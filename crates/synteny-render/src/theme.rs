use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn background(self) -> &'static str {
        match self {
            Theme::Light => "#ffffff",
            Theme::Dark => "#1f2937",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Theme::Light => "#111827",
            Theme::Dark => "#f3f4f6",
        }
    }

    pub fn muted_text(self) -> &'static str {
        match self {
            Theme::Light => "#4b5563",
            Theme::Dark => "#9ca3af",
        }
    }

    pub fn stroke(self) -> &'static str {
        match self {
            Theme::Light => "#374151",
            Theme::Dark => "#d1d5db",
        }
    }

    pub fn chromosome_fill(self) -> &'static str {
        match self {
            Theme::Light => "#e5e7eb",
            Theme::Dark => "#4b5563",
        }
    }

    pub fn background_rgb(self) -> [u8; 3] {
        match self {
            Theme::Light => [255, 255, 255],
            Theme::Dark => [31, 41, 55],
        }
    }
}

const SPECIES_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub const DEFAULT_GENE_COLOR: &str = "#6e6e6e";
pub const CLUSTER_CLASS: &str = "cluster";

lazy_static! {
    static ref GENE_CLASS_COLORS: HashMap<&'static str, &'static str> = HashMap::from([
        ("protein_coding", "#2563eb"),
        ("pseudogene", "#9ca3af"),
        ("ncrna", "#16a34a"),
        ("lncrna", "#15803d"),
        ("mirna", "#65a30d"),
        ("rrna", "#ca8a04"),
        ("trna", "#d97706"),
        ("snrna", "#0d9488"),
        ("snorna", "#0891b2"),
        ("misc_rna", "#7c3aed"),
        ("transcribed_pseudogene", "#a8a29e"),
        (CLUSTER_CLASS, "#475569"),
    ]);
}

/// Fill color for a gene class; unknown classes fall back to a neutral gray.
pub fn gene_class_color(class: &str) -> &'static str {
    GENE_CLASS_COLORS
        .get(class.trim().to_ascii_lowercase().as_str())
        .copied()
        .unwrap_or(DEFAULT_GENE_COLOR)
}

/// Species colors: explicit overrides first, then the palette in species order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeciesColors {
    order: Vec<String>,
    overrides: BTreeMap<String, String>,
}

impl SpeciesColors {
    pub fn new(order: Vec<String>, overrides: BTreeMap<String, String>) -> Self {
        Self { order, overrides }
    }

    pub fn color(&self, species: &str) -> String {
        if let Some(color) = self.overrides.get(species) {
            return color.clone();
        }
        let idx = self
            .order
            .iter()
            .position(|s| s == species)
            .unwrap_or(self.order.len());
        SPECIES_PALETTE[idx % SPECIES_PALETTE.len()].to_string()
    }

    pub fn overrides(&self) -> &BTreeMap<String, String> {
        &self.overrides
    }
}
