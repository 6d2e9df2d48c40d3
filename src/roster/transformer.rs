//! Roster to Moodle upload transformer

use super::normalize::normalize_cpf;
use super::record::{OutputField, OutputRecord, SourceRecord, cell_to_string};
use super::schema::SchemaMapping;
use crate::error::RosterError;
use crate::etl::Transformer;
use eyre::Result;
use std::collections::BTreeSet;

/// Initial password given to every imported user
pub const DEFAULT_PASSWORD: &str = "Ead#1234";
/// Course role given to every imported user
pub const DEFAULT_ROLE: &str = "student";

/// Values shared by every record of one export
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConstants {
    pub password: String,
    pub role: String,
    pub course: String,
    pub group: String,
}

impl SessionConstants {
    pub fn new(course: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            password: DEFAULT_PASSWORD.to_string(),
            role: DEFAULT_ROLE.to_string(),
            course: course.into(),
            group: group.into(),
        }
    }
}

/// Builds Moodle upload records from roster rows
///
/// Only the mapped columns are read; every other source column is ignored. The CPF
/// becomes the username after [`normalize_cpf`].
///
/// # Example
/// ```
/// use moodle_roster::etl::Transformer;
/// use moodle_roster::roster::{RosterTransformer, SchemaVariant, SessionConstants, SourceRecord};
///
/// let transformer = RosterTransformer::new(
///     SchemaVariant::Basic.mapping(),
///     SessionConstants::new("CURSO1", "T1"),
/// );
/// let row = SourceRecord::new()
///     .with("CPF", "123.456.789-00")
///     .with("Nome", "Ana")
///     .with("E-mail", "a@x.com");
///
/// let records = transformer.transform_many(vec![row]).unwrap();
/// assert_eq!(records[0].username, "12345678900");
/// assert_eq!(records[0].lastname, ".");
/// ```
pub struct RosterTransformer {
    mapping: SchemaMapping,
    constants: SessionConstants,
}

impl RosterTransformer {
    pub fn new(mapping: SchemaMapping, constants: SessionConstants) -> Self {
        Self { mapping, constants }
    }

    fn require_columns(&self, present: &BTreeSet<&str>) -> Result<()> {
        let missing = self.mapping.missing_columns(present);
        if !missing.is_empty() {
            return Err(RosterError::MissingColumns { missing }.into());
        }
        Ok(())
    }
}

impl Transformer for RosterTransformer {
    type Input = SourceRecord;
    type Output = OutputRecord;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let present: BTreeSet<&str> = input.columns().collect();
        self.require_columns(&present)?;

        let mut record = OutputRecord::default();
        for column in &self.mapping.columns {
            let value = input.get(column.source).map(cell_to_string).unwrap_or_default();
            record.set(column.target, value);
        }
        for (field, value) in &self.mapping.synthesized {
            record.set(*field, *value);
        }

        record.username = normalize_cpf(&record.username);
        record.set(OutputField::Password, self.constants.password.as_str());
        record.set(OutputField::Role1, self.constants.role.as_str());
        record.set(OutputField::Course1, self.constants.course.as_str());
        record.set(OutputField::Group1, self.constants.group.as_str());

        Ok(record)
    }

    /// Validates the column set of the whole batch before converting any row.
    ///
    /// An empty batch has no columns and is rejected like any other header mismatch.
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        let present: BTreeSet<&str> = inputs.iter().flat_map(SourceRecord::columns).collect();
        self.require_columns(&present)?;
        log::debug!(
            "Mapping {} row(s) with the {} layout",
            inputs.len(),
            self.mapping.variant
        );

        inputs.into_iter().map(|i| self.transform(i)).collect()
    }
}
