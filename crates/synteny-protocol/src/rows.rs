//! Text-typed input rows as delivered by the file loader, and their coercion
//! into the typed model. Every numeric column arrives as text.

use crate::error::ProtocolError;
use crate::model::{Chromosome, ChromosomeBreakpoint, GeneAnnotation, Strand, SyntenyBlock};
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Read;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SyntenyRow {
    pub query_name: String,
    pub query_chr: String,
    pub query_start: String,
    pub query_end: String,
    pub query_strand: String,
    pub ref_chr: String,
    pub ref_start: String,
    pub ref_end: String,
    pub ref_species: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default, rename = "GeneID")]
    pub gene_id: Option<String>,
    #[serde(default)]
    pub locus_tag: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SpeciesChromosomeRow {
    pub species_name: String,
    pub chr_id: String,
    #[serde(default)]
    pub chr_type: String,
    pub chr_size_bp: String,
    #[serde(default)]
    pub centromere_start: Option<String>,
    #[serde(default)]
    pub centromere_end: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReferenceSizeRow {
    pub chromosome: String,
    pub size: String,
    #[serde(default)]
    pub centromere_start: Option<String>,
    #[serde(default)]
    pub centromere_end: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GeneAnnotationRow {
    pub chromosome: String,
    #[serde(default)]
    pub genomic_accession: Option<String>,
    pub start: String,
    pub end: String,
    pub strand: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub locus_tag: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "GeneID")]
    pub gene_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BreakpointRow {
    pub ref_chr: String,
    pub ref_start: String,
    pub ref_end: String,
    #[serde(default)]
    pub breakpoint: String,
}

/// Coerces a required integer column. Surrounding whitespace is ignored and a
/// decimal value is truncated toward zero; anything else is an error naming
/// the field.
pub fn coerce_required(row: usize, field: &'static str, text: &str) -> Result<u64, ProtocolError> {
    coerce_optional(row, field, Some(text))?.ok_or(ProtocolError::MissingField { row, field })
}

/// Coerces an optional integer column; empty text becomes `None`.
pub fn coerce_optional(
    row: usize,
    field: &'static str,
    text: Option<&str>,
) -> Result<Option<u64>, ProtocolError> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if let Ok(value) = text.parse::<u64>() {
        return Ok(Some(value));
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value.trunc() as u64)),
        _ => Err(ProtocolError::InvalidNumber {
            row,
            field,
            value: text.to_string(),
        }),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

fn coerce_strand(row: usize, text: &str) -> Result<Strand, ProtocolError> {
    text.parse().map_err(|_| ProtocolError::InvalidStrand {
        row,
        value: text.to_string(),
    })
}

/// Reverse-strand tools often write intervals end-first; those are swapped.
fn ordered(row: usize, start: u64, end: u64) -> (u64, u64) {
    if start > end {
        log::debug!("row {row}: interval {start}..{end} given end-first, swapping");
        return (end, start);
    }
    (start, end)
}

impl SyntenyRow {
    pub fn to_block(&self, row: usize) -> Result<SyntenyBlock, ProtocolError> {
        let (ref_start, ref_end) = ordered(
            row,
            coerce_required(row, "ref_start", &self.ref_start)?,
            coerce_required(row, "ref_end", &self.ref_end)?,
        );
        let (query_start, query_end) = ordered(
            row,
            coerce_required(row, "query_start", &self.query_start)?,
            coerce_required(row, "query_end", &self.query_end)?,
        );
        let mut block = SyntenyBlock::new(
            self.ref_species.trim(),
            self.ref_chr.trim(),
            ref_start,
            ref_end,
            self.query_name.trim(),
            self.query_chr.trim(),
            query_start,
            query_end,
            coerce_strand(row, &self.query_strand)?,
        );
        block.symbol = non_empty(&self.symbol);
        block.class = non_empty(&self.class);
        block.gene_id = non_empty(&self.gene_id);
        block.locus_tag = non_empty(&self.locus_tag);
        block.name = non_empty(&self.name);
        Ok(block)
    }
}

impl SpeciesChromosomeRow {
    pub fn to_chromosome(&self, row: usize) -> Result<Chromosome, ProtocolError> {
        let mut chr = Chromosome::new(
            self.species_name.trim(),
            self.chr_id.trim(),
            coerce_required(row, "chr_size_bp", &self.chr_size_bp)?,
        );
        if !self.chr_type.trim().is_empty() {
            chr.chr_type = self.chr_type.trim().to_string();
        }
        chr.centromere_start =
            coerce_optional(row, "centromere_start", self.centromere_start.as_deref())?;
        chr.centromere_end = coerce_optional(row, "centromere_end", self.centromere_end.as_deref())?;
        Ok(chr)
    }
}

impl ReferenceSizeRow {
    pub fn to_chromosome(&self, row: usize, species: &str) -> Result<Chromosome, ProtocolError> {
        let mut chr = Chromosome::new(
            species,
            self.chromosome.trim(),
            coerce_required(row, "size", &self.size)?,
        );
        chr.centromere_start =
            coerce_optional(row, "centromere_start", self.centromere_start.as_deref())?;
        chr.centromere_end = coerce_optional(row, "centromere_end", self.centromere_end.as_deref())?;
        Ok(chr)
    }
}

impl GeneAnnotationRow {
    pub fn to_annotation(&self, row: usize) -> Result<GeneAnnotation, ProtocolError> {
        let (start, end) = ordered(
            row,
            coerce_required(row, "start", &self.start)?,
            coerce_required(row, "end", &self.end)?,
        );
        let class = if self.class.trim().is_empty() {
            "other"
        } else {
            self.class.trim()
        };
        let mut gene = GeneAnnotation::new(
            self.chromosome.trim(),
            start,
            end,
            coerce_strand(row, &self.strand)?,
            class,
        );
        gene.symbol = non_empty(&self.symbol);
        gene.name = non_empty(&self.name);
        gene.locus_tag = non_empty(&self.locus_tag);
        gene.gene_id = non_empty(&self.gene_id);
        Ok(gene)
    }
}

impl BreakpointRow {
    pub fn to_breakpoint(&self, row: usize) -> Result<ChromosomeBreakpoint, ProtocolError> {
        let (start, end) = ordered(
            row,
            coerce_required(row, "ref_start", &self.ref_start)?,
            coerce_required(row, "ref_end", &self.ref_end)?,
        );
        Ok(ChromosomeBreakpoint {
            ref_chromosome_id: self.ref_chr.trim().to_string(),
            start,
            end,
            label: self.breakpoint.trim().to_string(),
        })
    }
}

/// Reads headered CSV (or TSV, via `delimiter`) text into typed rows.
pub fn read_rows<T: DeserializeOwned, R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<Vec<T>, ProtocolError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut rows = vec![];
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Guesses the delimiter from the header line: tab when it has more tabs than commas.
pub fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    if header.matches('\t').count() > header.matches(',').count() {
        b'\t'
    } else {
        b','
    }
}

pub fn read_rows_from_str<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, ProtocolError> {
    read_rows(text.as_bytes(), sniff_delimiter(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn coerce_trims_and_truncates() {
        assert_eq!(coerce_required(0, "start", " 42 ").unwrap(), 42);
        assert_eq!(coerce_required(0, "start", "42.9").unwrap(), 42);
        assert_eq!(coerce_optional(0, "centromere_start", Some("")).unwrap(), None);
        assert_eq!(coerce_optional(0, "centromere_start", None).unwrap(), None);
    }

    #[test]
    fn coerce_rejects_garbage_naming_the_field() {
        let err = coerce_required(3, "ref_start", "4x").unwrap_err();
        match err {
            ProtocolError::InvalidNumber { row, field, value } => {
                assert_eq!(row, 3);
                assert_eq!(field, "ref_start");
                assert_eq!(value, "4x");
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(coerce_required(0, "size", "-5").is_err());
        assert!(matches!(
            coerce_required(0, "size", "  "),
            Err(ProtocolError::MissingField { field: "size", .. })
        ));
    }

    #[test]
    fn synteny_rows_from_csv() {
        let text = "query_name,query_chr,query_start,query_end,query_strand,ref_chr,ref_start,ref_end,ref_species,symbol,GeneID\n\
                    B,chr2,100,200,-,chr1,1000,1500,A,TP53,7157\n\
                    B,chr3,5,10,+,chr1,20,30,A,,\n";
        let rows: Vec<SyntenyRow> = read_rows_from_str(text).unwrap();
        assert_eq!(rows.len(), 2);
        let block = rows[0].to_block(0).unwrap();
        assert_eq!(block.query_strand, Strand::Reverse);
        assert_eq!(block.ref_start, 1000);
        assert_eq!(block.symbol.as_deref(), Some("TP53"));
        assert_eq!(block.gene_id.as_deref(), Some("7157"));
        let block = rows[1].to_block(1).unwrap();
        assert_eq!(block.symbol, None);
        assert_eq!(block.locus_tag, None);
    }

    #[test]
    fn species_rows_from_tsv_with_missing_centromere() {
        let text = "species_name\tchr_id\tchr_type\tchr_size_bp\tcentromere_start\tcentromere_end\n\
                    A\tchr1\tchromosome\t248956422\t121700000\t125100000\n\
                    A\tchrM\tmitochondrion\t16569\t\t\n";
        let rows: Vec<SpeciesChromosomeRow> = read_rows_from_str(text).unwrap();
        let chr1 = rows[0].to_chromosome(0).unwrap();
        assert_eq!(chr1.centromere(), Some((121_700_000, 125_100_000)));
        let chrm = rows[1].to_chromosome(1).unwrap();
        assert_eq!(chrm.chr_type, "mitochondrion");
        assert_eq!(chrm.centromere_start, None);
        assert_eq!(chrm.centromere_end, None);
    }

    #[test]
    fn inverted_interval_is_swapped() {
        let row = BreakpointRow {
            ref_chr: "chr1".to_string(),
            ref_start: "50".to_string(),
            ref_end: "10".to_string(),
            breakpoint: "bp1".to_string(),
        };
        let bp = row.to_breakpoint(7).unwrap();
        assert_eq!((bp.start, bp.end), (10, 50));
    }
}
