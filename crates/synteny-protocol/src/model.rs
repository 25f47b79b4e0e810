//! Genomic entities shared by the renderer and the interactive viewer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    pub fn is_reverse(self) -> bool {
        self == Strand::Reverse
    }

    pub fn symbol(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "+" | "forward" | "fwd" => Ok(Strand::Forward),
            "-" | "reverse" | "rev" => Ok(Strand::Reverse),
            other => Err(format!("unknown strand '{other}'")),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A gene, pseudogene or RNA feature on a chromosome.
///
/// Clusters are display-only: the annotation placer merges dense runs of
/// genes into one synthetic entry with `is_cluster` set and `gene_count`
/// holding the number of merged members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneAnnotation {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub class: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub locus_tag: Option<String>,
    pub gene_id: Option<String>,
    #[serde(default)]
    pub is_cluster: bool,
    #[serde(default = "default_gene_count")]
    pub gene_count: usize,
}

fn default_gene_count() -> usize {
    1
}

impl GeneAnnotation {
    pub fn new(chromosome: &str, start: u64, end: u64, strand: Strand, class: &str) -> Self {
        Self {
            chromosome: chromosome.to_string(),
            start,
            end,
            strand,
            class: class.to_string(),
            symbol: None,
            name: None,
            locus_tag: None,
            gene_id: None,
            is_cluster: false,
            gene_count: 1,
        }
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Best human label: symbol, then name, then locus tag, then gene id.
    pub fn label(&self) -> String {
        if self.is_cluster {
            return format!("{} genes", self.gene_count);
        }
        [&self.symbol, &self.name, &self.locus_tag, &self.gene_id]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| format!("{}..{}", self.start, self.end))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chromosome {
    pub species_name: String,
    pub chromosome_id: String,
    pub chr_type: String,
    pub size_bp: u64,
    pub centromere_start: Option<u64>,
    pub centromere_end: Option<u64>,
    #[serde(default)]
    pub annotations: Vec<GeneAnnotation>,
}

impl Chromosome {
    pub fn new(species_name: &str, chromosome_id: &str, size_bp: u64) -> Self {
        Self {
            species_name: species_name.to_string(),
            chromosome_id: chromosome_id.to_string(),
            chr_type: "chromosome".to_string(),
            size_bp,
            centromere_start: None,
            centromere_end: None,
            annotations: vec![],
        }
    }

    pub fn with_centromere(mut self, start: u64, end: u64) -> Self {
        self.centromere_start = Some(start);
        self.centromere_end = Some(end);
        self
    }

    /// The centromere interval, only when it is well formed for this chromosome.
    pub fn centromere(&self) -> Option<(u64, u64)> {
        match (self.centromere_start, self.centromere_end) {
            (Some(start), Some(end)) if start < end && end <= self.size_bp => Some((start, end)),
            _ => None,
        }
    }
}

/// Identity of a synteny block for selection, toggling and deduplication.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockKey {
    pub ref_chr: String,
    pub query_chr: String,
    pub ref_start: u64,
    pub query_start: u64,
}

impl BlockKey {
    pub fn new(ref_chr: &str, query_chr: &str, ref_start: u64, query_start: u64) -> Self {
        Self {
            ref_chr: ref_chr.to_string(),
            query_chr: query_chr.to_string(),
            ref_start,
            query_start,
        }
    }

    /// Parses `refChr-queryChr-refStart-queryStart`.
    ///
    /// The two numbers are taken from the right. When chromosome ids contain
    /// dashes the split between them is ambiguous and the first dash wins;
    /// callers that hold the data set should prefer [`crate::Dataset::block_by_key_str`].
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.rsplitn(3, '-');
        let query_start = parts.next()?.parse().ok()?;
        let ref_start = parts.next()?.parse().ok()?;
        let chromosomes = parts.next()?;
        let (ref_chr, query_chr) = chromosomes.split_once('-')?;
        Some(Self::new(ref_chr, query_chr, ref_start, query_start))
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.ref_chr, self.query_chr, self.ref_start, self.query_start
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyntenyBlock {
    pub ref_species: String,
    pub ref_chromosome_id: String,
    pub ref_start: u64,
    pub ref_end: u64,
    pub query_name: String,
    pub query_chromosome_id: String,
    pub query_start: u64,
    pub query_end: u64,
    pub query_strand: Strand,
    pub symbol: Option<String>,
    pub class: Option<String>,
    pub gene_id: Option<String>,
    pub locus_tag: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub is_cluster: bool,
    pub gene_count: Option<usize>,
}

impl SyntenyBlock {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ref_species: &str,
        ref_chromosome_id: &str,
        ref_start: u64,
        ref_end: u64,
        query_name: &str,
        query_chromosome_id: &str,
        query_start: u64,
        query_end: u64,
        query_strand: Strand,
    ) -> Self {
        Self {
            ref_species: ref_species.to_string(),
            ref_chromosome_id: ref_chromosome_id.to_string(),
            ref_start,
            ref_end,
            query_name: query_name.to_string(),
            query_chromosome_id: query_chromosome_id.to_string(),
            query_start,
            query_end,
            query_strand,
            symbol: None,
            class: None,
            gene_id: None,
            locus_tag: None,
            name: None,
            is_cluster: false,
            gene_count: None,
        }
    }

    pub fn key(&self) -> BlockKey {
        BlockKey::new(
            &self.ref_chromosome_id,
            &self.query_chromosome_id,
            self.ref_start,
            self.query_start,
        )
    }

    pub fn ref_len(&self) -> u64 {
        self.ref_end.saturating_sub(self.ref_start)
    }

    pub fn query_len(&self) -> u64 {
        self.query_end.saturating_sub(self.query_start)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChromosomeBreakpoint {
    pub ref_chromosome_id: String,
    pub start: u64,
    pub end: u64,
    pub label: String,
}

/// User-assigned rearrangement category that overrides strand coloring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MutationType {
    Syn,
    Inv,
    Trans,
    Invtr,
    Dup,
    Invdp,
}

impl MutationType {
    pub const ALL: [MutationType; 6] = [
        MutationType::Syn,
        MutationType::Inv,
        MutationType::Trans,
        MutationType::Invtr,
        MutationType::Dup,
        MutationType::Invdp,
    ];

    pub fn code(self) -> &'static str {
        match self {
            MutationType::Syn => "SYN",
            MutationType::Inv => "INV",
            MutationType::Trans => "TRANS",
            MutationType::Invtr => "INVTR",
            MutationType::Dup => "DUP",
            MutationType::Invdp => "INVDP",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MutationType::Syn => "Syntenic",
            MutationType::Inv => "Inversion",
            MutationType::Trans => "Translocation",
            MutationType::Invtr => "Inverted translocation",
            MutationType::Dup => "Duplication",
            MutationType::Invdp => "Inverted duplication",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            MutationType::Syn => "#2e7d32",
            MutationType::Inv => "#c62828",
            MutationType::Trans => "#1565c0",
            MutationType::Invtr => "#6a1b9a",
            MutationType::Dup => "#ef6c00",
            MutationType::Invdp => "#ad1457",
        }
    }
}

impl FromStr for MutationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MutationType::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mutation type '{s}'"))
    }
}

impl fmt::Display for MutationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_key_display_and_parse() {
        let key = BlockKey::new("chr1", "chr2", 100, 2000);
        assert_eq!(key.to_string(), "chr1-chr2-100-2000");
        assert_eq!(BlockKey::parse("chr1-chr2-100-2000"), Some(key));
        assert_eq!(BlockKey::parse("chr1-100-2000"), None);
        assert_eq!(BlockKey::parse("a-b-x-1"), None);
    }

    #[test]
    fn block_key_ignores_end_coordinates() {
        let mut a = SyntenyBlock::new("A", "chr1", 10, 20, "B", "chr2", 30, 40, Strand::Forward);
        let mut b = a.clone();
        b.ref_end = 99;
        b.query_end = 77;
        b.query_strand = Strand::Reverse;
        assert_eq!(a.key(), b.key());
        a.ref_start = 11;
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn centromere_requires_ordered_interval_within_chromosome() {
        let chr = Chromosome::new("A", "chr1", 1000);
        assert_eq!(chr.clone().with_centromere(400, 500).centromere(), Some((400, 500)));
        assert_eq!(chr.clone().with_centromere(500, 400).centromere(), None);
        assert_eq!(chr.with_centromere(900, 1200).centromere(), None);
    }

    #[test]
    fn strand_and_mutation_type_parse() {
        assert_eq!("+".parse::<Strand>(), Ok(Strand::Forward));
        assert_eq!(" reverse ".parse::<Strand>(), Ok(Strand::Reverse));
        assert!("?".parse::<Strand>().is_err());
        assert_eq!("invtr".parse::<MutationType>(), Ok(MutationType::Invtr));
        assert_eq!(
            serde_json::to_string(&MutationType::Invdp).unwrap(),
            "\"INVDP\""
        );
    }

    #[test]
    fn annotation_label_prefers_symbol() {
        let mut gene = GeneAnnotation::new("chr1", 5, 50, Strand::Forward, "protein_coding");
        assert_eq!(gene.label(), "5..50");
        gene.locus_tag = Some("LOC1".to_string());
        gene.symbol = Some("BRCA2".to_string());
        assert_eq!(gene.label(), "BRCA2");
        gene.is_cluster = true;
        gene.gene_count = 4;
        assert_eq!(gene.label(), "4 genes");
    }
}
