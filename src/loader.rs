//! Reads the CSV/TSV inputs from disk into a [`Dataset`].

use crate::error::ViewerError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use synteny_protocol::rows::read_rows_from_str;
use synteny_protocol::{Dataset, DatasetRows};

/// The synteny and species tables are required, the rest optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetPaths {
    pub synteny: Option<PathBuf>,
    pub species: Option<PathBuf>,
    pub reference_sizes: Option<PathBuf>,
    pub annotations: Option<PathBuf>,
    pub breakpoints: Option<PathBuf>,
}

impl DatasetPaths {
    pub fn is_complete(&self) -> bool {
        self.synteny.is_some() && self.species.is_some()
    }

    pub fn load(&self) -> Result<Dataset, ViewerError> {
        let (Some(synteny), Some(species)) = (&self.synteny, &self.species) else {
            return Err(ViewerError::String(
                "both a synteny table and a species table are required".to_string(),
            ));
        };
        let rows = DatasetRows {
            synteny: read_table(synteny)?,
            species: read_table(species)?,
            reference_sizes: read_optional(&self.reference_sizes)?,
            annotations: read_optional(&self.annotations)?,
            breakpoints: read_optional(&self.breakpoints)?,
        };
        Ok(Dataset::from_rows(&rows)?)
    }
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ViewerError> {
    let text = std::fs::read_to_string(path)?;
    let rows = read_rows_from_str(&text).map_err(|e| {
        ViewerError::String(format!("{}: {e}", path.display()))
    })?;
    log::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn read_optional<T: DeserializeOwned>(path: &Option<PathBuf>) -> Result<Vec<T>, ViewerError> {
    match path {
        Some(path) => read_table(path),
        None => Ok(vec![]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SYNTENY: &str = "query_name,query_chr,query_start,query_end,query_strand,ref_chr,ref_start,ref_end,ref_species,symbol\n\
        B,b1,100,900,+,chr1,0,800,Ref,ABC1\n\
        B,b1,1000,1500,-,chr1,900,1400,Ref,\n";
    const SPECIES: &str = "species_name\tchr_id\tchr_type\tchr_size_bp\tcentromere_start\tcentromere_end\n\
        Ref\tchr1\tautosome\t5000\t2000\t2100\n\
        B\tb1\tautosome\t4000\t\t\n";

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn loads_csv_and_tsv_tables() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DatasetPaths {
            synteny: Some(write(dir.path(), "synteny.csv", SYNTENY)),
            species: Some(write(dir.path(), "species.tsv", SPECIES)),
            breakpoints: Some(write(
                dir.path(),
                "bp.csv",
                "ref_chr,ref_start,ref_end,breakpoint\nchr1,850,950,bp1\n",
            )),
            ..Default::default()
        };
        assert!(paths.is_complete());
        let dataset = paths.load().unwrap();
        assert_eq!(dataset.reference_species, "Ref");
        assert_eq!(dataset.blocks.len(), 2);
        assert_eq!(dataset.breakpoints[0].label, "bp1");
        let chr1 = dataset.find_chromosome("Ref", "chr1").unwrap();
        assert_eq!(chr1.centromere(), Some((2000, 2100)));
        assert_eq!(dataset.find_chromosome("B", "b1").unwrap().centromere(), None);
    }

    #[test]
    fn missing_inputs_and_bad_numbers_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DatasetPaths::default().load().is_err());

        let bad = SYNTENY.replace("100,900", "1x0,900");
        let paths = DatasetPaths {
            synteny: Some(write(dir.path(), "synteny.csv", &bad)),
            species: Some(write(dir.path(), "species.tsv", SPECIES)),
            ..Default::default()
        };
        let err = paths.load().unwrap_err();
        assert!(err.to_string().contains("query_start"), "{err}");

        let gone = DatasetPaths {
            synteny: Some(dir.path().join("nope.csv")),
            species: Some(dir.path().join("nope.tsv")),
            ..Default::default()
        };
        assert!(matches!(gone.load(), Err(ViewerError::Io(_))));
    }
}
