//! CPF to Moodle username normalization

use regex::Regex;
use std::sync::LazyLock;

/// Number of digits in a CPF
pub const CPF_WIDTH: usize = 11;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.-]").expect("separator pattern is valid"));

/// Strip `.` and `-` from a CPF and left-pad it with zeros to [`CPF_WIDTH`].
///
/// Values that are still longer than 11 characters are returned as they are; nothing
/// is truncated or rejected.
///
/// ```
/// use moodle_roster::roster::normalize_cpf;
///
/// assert_eq!(normalize_cpf("123.456.789-00"), "12345678900");
/// assert_eq!(normalize_cpf("1234567890"), "01234567890");
/// ```
pub fn normalize_cpf(cpf: &str) -> String {
    let stripped = SEPARATORS.replace_all(cpf, "");
    let width = stripped.chars().count();
    if width >= CPF_WIDTH {
        return stripped.into_owned();
    }
    let mut padded = "0".repeat(CPF_WIDTH - width);
    padded.push_str(&stripped);
    padded
}
