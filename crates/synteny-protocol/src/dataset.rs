use crate::error::ProtocolError;
use crate::model::{BlockKey, Chromosome, ChromosomeBreakpoint, SyntenyBlock};
use crate::rows::{
    BreakpointRow, GeneAnnotationRow, ReferenceSizeRow, SpeciesChromosomeRow, SyntenyRow,
};
use log::{debug, info};
use std::collections::{HashMap, HashSet};

/// Everything loaded for one visualization. Replaced wholesale on reload.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub reference_species: String,
    pub chromosomes: Vec<Chromosome>,
    pub blocks: Vec<SyntenyBlock>,
    pub breakpoints: Vec<ChromosomeBreakpoint>,
}

/// Raw rows handed over by the file-loading collaborator.
#[derive(Clone, Debug, Default)]
pub struct DatasetRows {
    pub synteny: Vec<SyntenyRow>,
    pub species: Vec<SpeciesChromosomeRow>,
    pub reference_sizes: Vec<ReferenceSizeRow>,
    pub annotations: Vec<GeneAnnotationRow>,
    pub breakpoints: Vec<BreakpointRow>,
}

impl Dataset {
    pub fn new(
        chromosomes: Vec<Chromosome>,
        blocks: Vec<SyntenyBlock>,
        breakpoints: Vec<ChromosomeBreakpoint>,
    ) -> Self {
        let reference_species = blocks
            .first()
            .map(|b| b.ref_species.clone())
            .or_else(|| chromosomes.first().map(|c| c.species_name.clone()))
            .unwrap_or_default();
        let mut ret = Self {
            reference_species,
            chromosomes: vec![],
            blocks,
            breakpoints,
        };
        ret.set_chromosomes(chromosomes);
        ret
    }

    /// Inserts chromosomes, keeping the first record for any duplicate
    /// `(species, chromosome_id)` pair.
    fn set_chromosomes(&mut self, chromosomes: Vec<Chromosome>) {
        let mut seen = HashSet::new();
        self.chromosomes = chromosomes
            .into_iter()
            .filter(|c| {
                let fresh = seen.insert((c.species_name.clone(), c.chromosome_id.clone()));
                if !fresh {
                    debug!(
                        "Dropping duplicate chromosome {}:{}",
                        c.species_name, c.chromosome_id
                    );
                }
                fresh
            })
            .collect();
    }

    /// Coerces and assembles the loader's rows. Reference-size rows are attached
    /// to the reference species named by the synteny rows and take precedence
    /// over species rows for the same chromosome.
    pub fn from_rows(rows: &DatasetRows) -> Result<Self, ProtocolError> {
        let blocks = rows
            .synteny
            .iter()
            .enumerate()
            .map(|(i, r)| r.to_block(i))
            .collect::<Result<Vec<_>, _>>()?;
        let reference_species = blocks
            .first()
            .map(|b| b.ref_species.clone())
            .or_else(|| rows.species.first().map(|r| r.species_name.trim().to_string()))
            .unwrap_or_default();

        let mut chromosomes = rows
            .reference_sizes
            .iter()
            .enumerate()
            .map(|(i, r)| r.to_chromosome(i, &reference_species))
            .collect::<Result<Vec<_>, _>>()?;
        for (i, row) in rows.species.iter().enumerate() {
            chromosomes.push(row.to_chromosome(i)?);
        }

        let mut annotations_by_chr: HashMap<String, Vec<_>> = HashMap::new();
        for (i, row) in rows.annotations.iter().enumerate() {
            let gene = row.to_annotation(i)?;
            annotations_by_chr
                .entry(gene.chromosome.clone())
                .or_default()
                .push(gene);
        }
        for chr in chromosomes
            .iter_mut()
            .filter(|c| c.species_name == reference_species)
        {
            if let Some(mut genes) = annotations_by_chr.remove(&chr.chromosome_id) {
                genes.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
                chr.annotations = genes;
            }
        }
        for chromosome in annotations_by_chr.keys() {
            debug!("Annotations for unknown reference chromosome {chromosome} ignored");
        }

        let breakpoints = rows
            .breakpoints
            .iter()
            .enumerate()
            .map(|(i, r)| r.to_breakpoint(i))
            .collect::<Result<Vec<_>, _>>()?;

        let mut ret = Self {
            reference_species,
            chromosomes: vec![],
            blocks,
            breakpoints,
        };
        ret.set_chromosomes(chromosomes);
        info!(
            "Loaded {} chromosomes, {} synteny blocks, {} breakpoints",
            ret.chromosomes.len(),
            ret.blocks.len(),
            ret.breakpoints.len()
        );
        Ok(ret)
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Reference species first, then query species in order of first appearance.
    pub fn species_names(&self) -> Vec<String> {
        let mut names: Vec<String> = vec![];
        if !self.reference_species.is_empty() {
            names.push(self.reference_species.clone());
        }
        let candidates = self
            .chromosomes
            .iter()
            .map(|c| &c.species_name)
            .chain(self.blocks.iter().map(|b| &b.query_name));
        for name in candidates {
            if !names.iter().any(|n| n == name) {
                names.push(name.clone());
            }
        }
        names
    }

    pub fn query_species(&self) -> Vec<String> {
        self.species_names()
            .into_iter()
            .filter(|s| *s != self.reference_species)
            .collect()
    }

    pub fn chromosomes_of<'a>(&'a self, species: &'a str) -> impl Iterator<Item = &'a Chromosome> {
        self.chromosomes
            .iter()
            .filter(move |c| c.species_name == species)
    }

    pub fn find_chromosome(&self, species: &str, chromosome_id: &str) -> Option<&Chromosome> {
        self.chromosomes
            .iter()
            .find(|c| c.species_name == species && c.chromosome_id == chromosome_id)
    }

    pub fn max_chromosome_size(&self) -> u64 {
        self.chromosomes.iter().map(|c| c.size_bp).max().unwrap_or(0)
    }

    pub fn block(&self, key: &BlockKey) -> Option<&SyntenyBlock> {
        self.blocks.iter().find(|b| b.key() == *key)
    }

    /// Matches a serialized `refChr-queryChr-refStart-queryStart` key against
    /// the loaded blocks, which is unambiguous even when ids contain dashes.
    pub fn block_by_key_str(&self, text: &str) -> Option<&SyntenyBlock> {
        self.blocks.iter().find(|b| b.key().to_string() == text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Strand;

    fn rows() -> DatasetRows {
        DatasetRows {
            synteny: vec![SyntenyRow {
                query_name: "B".to_string(),
                query_chr: "b-1".to_string(),
                query_start: "5".to_string(),
                query_end: "50".to_string(),
                query_strand: "+".to_string(),
                ref_chr: "chr-1".to_string(),
                ref_start: "10".to_string(),
                ref_end: "100".to_string(),
                ref_species: "A".to_string(),
                ..Default::default()
            }],
            species: vec![SpeciesChromosomeRow {
                species_name: "B".to_string(),
                chr_id: "b-1".to_string(),
                chr_type: "chromosome".to_string(),
                chr_size_bp: "500".to_string(),
                centromere_start: None,
                centromere_end: None,
            }],
            reference_sizes: vec![ReferenceSizeRow {
                chromosome: "chr-1".to_string(),
                size: "1000".to_string(),
                centromere_start: Some("400".to_string()),
                centromere_end: Some("450".to_string()),
            }],
            annotations: vec![
                GeneAnnotationRow {
                    chromosome: "chr-1".to_string(),
                    start: "300".to_string(),
                    end: "320".to_string(),
                    strand: "-".to_string(),
                    class: "ncRNA".to_string(),
                    ..Default::default()
                },
                GeneAnnotationRow {
                    chromosome: "chr-1".to_string(),
                    start: "20".to_string(),
                    end: "40".to_string(),
                    strand: "+".to_string(),
                    ..Default::default()
                },
            ],
            breakpoints: vec![],
        }
    }

    #[test]
    fn assembles_reference_and_query_chromosomes() {
        let ds = Dataset::from_rows(&rows()).unwrap();
        assert_eq!(ds.reference_species, "A");
        assert_eq!(ds.species_names(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(ds.query_species(), vec!["B".to_string()]);
        let chr = ds.find_chromosome("A", "chr-1").unwrap();
        assert_eq!(chr.centromere(), Some((400, 450)));
        assert_eq!(chr.annotations.len(), 2);
        assert_eq!(chr.annotations[0].start, 20);
        assert_eq!(chr.annotations[0].class, "other");
        assert_eq!(chr.annotations[1].strand, Strand::Reverse);
        assert_eq!(ds.max_chromosome_size(), 1000);
    }

    #[test]
    fn key_strings_with_dashes_resolve_through_the_dataset() {
        let ds = Dataset::from_rows(&rows()).unwrap();
        let key = "chr-1-b-1-10-5";
        assert!(ds.block_by_key_str(key).is_some());
        assert_eq!(ds.block_by_key_str("chr-1-b-1-10-6"), None);
    }

    #[test]
    fn duplicate_chromosomes_keep_first_record() {
        let ds = Dataset::new(
            vec![Chromosome::new("A", "chr1", 10), Chromosome::new("A", "chr1", 20)],
            vec![],
            vec![],
        );
        assert_eq!(ds.chromosomes.len(), 1);
        assert_eq!(ds.chromosomes[0].size_bp, 10);
    }

    #[test]
    fn end_first_rows_load_alongside_good_ones() {
        let mut data = rows();
        let mut flipped = data.synteny[0].clone();
        flipped.ref_start = "700".to_string();
        flipped.ref_end = "600".to_string();
        flipped.query_start = "90".to_string();
        flipped.query_end = "60".to_string();
        data.synteny.push(flipped);
        data.annotations[0].start = "320".to_string();
        data.annotations[0].end = "300".to_string();

        let ds = Dataset::from_rows(&data).unwrap();
        assert_eq!(ds.blocks.len(), 2);
        let b = &ds.blocks[1];
        assert_eq!((b.ref_start, b.ref_end), (600, 700));
        assert_eq!((b.query_start, b.query_end), (60, 90));
        let chr = ds.find_chromosome("A", "chr-1").unwrap();
        assert_eq!((chr.annotations[1].start, chr.annotations[1].end), (300, 320));
    }

    #[test]
    fn bad_row_reports_error() {
        let mut bad = rows();
        bad.synteny[0].ref_end = "abc".to_string();
        assert!(Dataset::from_rows(&bad).is_err());
    }
}
