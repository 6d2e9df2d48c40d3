//! Source layouts and how their columns map onto the upload record

use super::record::OutputField;
use std::collections::BTreeSet;

/// Source column feeding an output field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMapping {
    pub source: &'static str,
    pub target: OutputField,
}

impl ColumnMapping {
    const fn new(source: &'static str, target: OutputField) -> Self {
        Self { source, target }
    }
}

/// The two roster layouts the export understands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaVariant {
    /// `CPF, Nome, E-mail`; the last name is filled with a placeholder
    Basic,
    /// `CPF, Nome, Cargo, E-mail`; the role (`Cargo`) is stored as the last name
    WithRole,
}

impl SchemaVariant {
    /// Pick the richest layout whose columns are all present
    pub fn detect<'a>(columns: impl IntoIterator<Item = &'a str>) -> Self {
        let columns: BTreeSet<&str> = columns.into_iter().collect();
        let with_role = SchemaVariant::WithRole.mapping();
        if with_role.missing_columns(&columns).is_empty() {
            SchemaVariant::WithRole
        } else {
            SchemaVariant::Basic
        }
    }

    pub fn mapping(self) -> SchemaMapping {
        use OutputField::*;

        match self {
            SchemaVariant::Basic => SchemaMapping {
                variant: self,
                columns: vec![
                    ColumnMapping::new("CPF", Username),
                    ColumnMapping::new("Nome", Firstname),
                    ColumnMapping::new("E-mail", Email),
                ],
                synthesized: vec![(Lastname, ".")],
            },
            SchemaVariant::WithRole => SchemaMapping {
                variant: self,
                columns: vec![
                    ColumnMapping::new("CPF", Username),
                    ColumnMapping::new("Nome", Firstname),
                    ColumnMapping::new("Cargo", Lastname),
                    ColumnMapping::new("E-mail", Email),
                ],
                synthesized: Vec::new(),
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SchemaVariant::Basic => "basic",
            SchemaVariant::WithRole => "with-role",
        }
    }
}

impl std::fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Column projection and renaming for one layout
///
/// `columns` lists required source columns in their documented order; `synthesized`
/// holds output fields filled with a literal instead of a source column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaMapping {
    pub variant: SchemaVariant,
    pub columns: Vec<ColumnMapping>,
    pub synthesized: Vec<(OutputField, &'static str)>,
}

impl SchemaMapping {
    pub fn required_columns(&self) -> Vec<&'static str> {
        self.columns.iter().map(|m| m.source).collect()
    }

    /// Required columns absent from `present`, in required order
    pub fn missing_columns(&self, present: &BTreeSet<&str>) -> Vec<String> {
        self.columns
            .iter()
            .filter(|m| !present.contains(m.source))
            .map(|m| m.source.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_with_role() {
        let variant = SchemaVariant::detect(["E-mail", "Cargo", "Nome", "CPF", "Setor"]);
        assert_eq!(variant, SchemaVariant::WithRole);
    }

    #[test]
    fn test_detect_falls_back_to_basic() {
        assert_eq!(
            SchemaVariant::detect(["CPF", "Nome", "E-mail"]),
            SchemaVariant::Basic
        );
        assert_eq!(SchemaVariant::detect(["CPF"]), SchemaVariant::Basic);
        assert_eq!(
            SchemaVariant::detect(Vec::<&str>::new()),
            SchemaVariant::Basic
        );
    }

    #[test]
    fn test_every_output_field_is_covered_once() {
        // username..email come from the mapping; the rest are session constants
        for variant in [SchemaVariant::Basic, SchemaVariant::WithRole] {
            let mapping = variant.mapping();
            let mut targets: Vec<OutputField> = mapping.columns.iter().map(|m| m.target).collect();
            targets.extend(mapping.synthesized.iter().map(|(f, _)| *f));
            targets.sort_by_key(|f| f.index());
            assert_eq!(
                targets,
                vec![
                    OutputField::Username,
                    OutputField::Firstname,
                    OutputField::Lastname,
                    OutputField::Email
                ]
            );
        }
    }

    #[test]
    fn test_missing_columns_in_required_order() {
        let mapping = SchemaVariant::WithRole.mapping();
        let present: BTreeSet<&str> = ["Nome"].into_iter().collect();
        assert_eq!(mapping.missing_columns(&present), vec!["CPF", "Cargo", "E-mail"]);
    }
}
