//! Source rows and Moodle upload records

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One row of the source tab, keyed by header name
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceRecord {
    cells: BTreeMap<String, Value>,
}

impl SourceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell, returning the record for chaining
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Column names present in this row
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SourceRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Render a cell as the text Moodle will receive.
///
/// Integers keep no decimal point, booleans use the spreadsheet spelling and empty
/// cells become the empty string.
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Fields of a Moodle bulk user upload row, in file order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputField {
    Username,
    Password,
    Firstname,
    Lastname,
    Email,
    Course1,
    Role1,
    Group1,
}

impl OutputField {
    pub const ALL: [OutputField; 8] = [
        OutputField::Username,
        OutputField::Password,
        OutputField::Firstname,
        OutputField::Lastname,
        OutputField::Email,
        OutputField::Course1,
        OutputField::Role1,
        OutputField::Group1,
    ];

    /// Column header Moodle expects
    pub fn name(self) -> &'static str {
        match self {
            OutputField::Username => "username",
            OutputField::Password => "password",
            OutputField::Firstname => "firstname",
            OutputField::Lastname => "lastname",
            OutputField::Email => "email",
            OutputField::Course1 => "course1",
            OutputField::Role1 => "role1",
            OutputField::Group1 => "group1",
        }
    }

    /// Position of the field in an output row
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for OutputField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A row of the Moodle bulk user upload file
///
/// Field declaration order is the file's column order; the CSV sink relies on it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub username: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub course1: String,
    pub role1: String,
    pub group1: String,
}

impl OutputRecord {
    pub fn get(&self, field: OutputField) -> &str {
        match field {
            OutputField::Username => &self.username,
            OutputField::Password => &self.password,
            OutputField::Firstname => &self.firstname,
            OutputField::Lastname => &self.lastname,
            OutputField::Email => &self.email,
            OutputField::Course1 => &self.course1,
            OutputField::Role1 => &self.role1,
            OutputField::Group1 => &self.group1,
        }
    }

    pub fn set(&mut self, field: OutputField, value: impl Into<String>) {
        let value = value.into();
        match field {
            OutputField::Username => self.username = value,
            OutputField::Password => self.password = value,
            OutputField::Firstname => self.firstname = value,
            OutputField::Lastname => self.lastname = value,
            OutputField::Email => self.email = value,
            OutputField::Course1 => self.course1 = value,
            OutputField::Role1 => self.role1 = value,
            OutputField::Group1 => self.group1 = value,
        }
    }

    /// Header row of the upload file
    pub fn header() -> Vec<String> {
        OutputField::ALL.iter().map(|f| f.name().to_string()).collect()
    }

    /// Field values in file order
    pub fn to_row(&self) -> Vec<String> {
        OutputField::ALL
            .iter()
            .map(|f| self.get(*f).to_string())
            .collect()
    }
}
