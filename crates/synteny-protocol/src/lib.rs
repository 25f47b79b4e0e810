//! Shared machine-readable synteny contracts: the genomic data model, the
//! text rows the loader hands over, and the serializable view state.

pub mod dataset;
pub mod error;
pub mod model;
pub mod rows;
pub mod state;

pub use dataset::{Dataset, DatasetRows};
pub use error::ProtocolError;
pub use model::{
    BlockKey, Chromosome, ChromosomeBreakpoint, GeneAnnotation, MutationType, Strand,
    SyntenyBlock,
};
pub use state::{AlignmentFilter, ViewportTransform, VisualizationState};
