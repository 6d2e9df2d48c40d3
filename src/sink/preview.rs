//! Console preview of transformed records

use crate::roster::{OutputField, OutputRecord};

/// Rows shown before the sinks run
pub const PREVIEW_ROWS: usize = 5;

/// Fixed-width table of the first `limit` records, header included
pub fn preview_table(records: &[OutputRecord], limit: usize) -> Vec<String> {
    let shown = &records[..records.len().min(limit)];

    let widths: Vec<usize> = OutputField::ALL
        .iter()
        .map(|field| {
            shown
                .iter()
                .map(|r| r.get(*field).chars().count())
                .chain(std::iter::once(field.name().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    std::iter::once(line(OutputField::ALL.iter().map(|f| f.name()).collect()))
        .chain(
            shown
                .iter()
                .map(|r| line(OutputField::ALL.iter().map(|f| r.get(*f)).collect())),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str, firstname: &str) -> OutputRecord {
        OutputRecord {
            username: username.to_string(),
            password: "Ead#1234".to_string(),
            firstname: firstname.to_string(),
            lastname: ".".to_string(),
            email: "a@x.com".to_string(),
            course1: "C".to_string(),
            role1: "student".to_string(),
            group1: "G".to_string(),
        }
    }

    #[test]
    fn test_preview_limits_rows() {
        let records: Vec<_> = (0..8).map(|i| record(&i.to_string(), "Ana")).collect();
        let lines = preview_table(&records, PREVIEW_ROWS);
        assert_eq!(lines.len(), PREVIEW_ROWS + 1);
        assert!(lines[0].starts_with("username"));
    }

    #[test]
    fn test_preview_aligns_columns() {
        let lines = preview_table(&[record("12345678900", "Maria Clara")], PREVIEW_ROWS);
        assert_eq!(
            lines,
            vec![
                "username     password  firstname    lastname  email    course1  role1    group1",
                "12345678900  Ead#1234  Maria Clara  .         a@x.com  C        student  G",
            ]
        );
    }
}
