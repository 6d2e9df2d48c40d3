//! Core ETL (Extract, Transform, Load) abstractions
//!
//! The roster export reads rows with an [`Extractor`], converts them with a
//! [`Transformer`] and hands the records to one or more [`Loader`]s.

mod extract;
mod load;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use transform::Transformer;
