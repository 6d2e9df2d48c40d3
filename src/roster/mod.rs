//! Roster domain: source rows, Moodle upload records and the mapping between them.

mod extractor;
mod normalize;
mod record;
mod schema;
mod transformer;

pub use extractor::{TabExtractor, records_from_values};
pub use normalize::{CPF_WIDTH, normalize_cpf};
pub use record::{OutputField, OutputRecord, SourceRecord, cell_to_string};
pub use schema::{ColumnMapping, SchemaMapping, SchemaVariant};
pub use transformer::{DEFAULT_PASSWORD, DEFAULT_ROLE, RosterTransformer, SessionConstants};
