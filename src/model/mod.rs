pub mod exon;
pub mod gene;
pub mod transcript;

pub use exon::{Exon, Variant};
pub use gene::Gene;
pub use transcript::Transcript;
