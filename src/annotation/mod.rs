pub mod builder;
pub mod diagnostic;
pub mod io;

pub use builder::{
    order_spans, BuildReport, BuilderState, ConvertOptions, GeneAccumulator, GeneModelBuilder,
    MinusStrandPolicy, PROTEIN_CODING,
};
pub use diagnostic::{Diagnostic, Severity};
pub use io::{AnnotationReader, AnnotationRecord, AttributeKeys, GeneAttributes, ParseError};
