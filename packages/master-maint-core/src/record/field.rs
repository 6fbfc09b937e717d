use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Gender classification of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "男性")]
    Male,
    #[serde(rename = "女性")]
    Female,
    #[serde(rename = "その他")]
    Other,
    #[default]
    #[serde(rename = "未設定")]
    Unset,
}

impl Gender {
    /// All selectable values, in display order.
    pub const ALL: [Gender; 4] = [Gender::Male, Gender::Female, Gender::Other, Gender::Unset];

    /// Returns the display label used on the wire and in the grid.
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "男性",
            Gender::Female => "女性",
            Gender::Other => "その他",
            Gender::Unset => "未設定",
        }
    }

    /// Parses a label or an ASCII alias, falling back to [`Gender::Unset`].
    pub fn coerce(raw: &str) -> Self {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.label() == raw)
            .unwrap_or_else(|| match raw.to_ascii_lowercase().as_str() {
                "male" | "m" => Gender::Male,
                "female" | "f" => Gender::Female,
                "other" | "o" => Gender::Other,
                _ => {
                    if !raw.is_empty() && raw != "unset" {
                        tracing::debug!("Unrecognized gender '{}', coerced to unset", raw);
                    }
                    Gender::Unset
                }
            })
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Editable fields of a record.
///
/// `id`, `is_new` and `is_deleted` are owned by the buffer store and cannot
/// be set through a field mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Name,
    Age,
    Gender,
    Address,
}

impl RecordField {
    /// Returns the wire name of the field.
    pub fn name(self) -> &'static str {
        match self {
            RecordField::Name => "name",
            RecordField::Age => "age",
            RecordField::Gender => "gender",
            RecordField::Address => "address",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(RecordField::Name),
            "age" => Ok(RecordField::Age),
            "gender" => Ok(RecordField::Gender),
            "address" => Ok(RecordField::Address),
            other => Err(format!("unknown field '{}'", other)),
        }
    }
}

/// Coerces raw age input to an integer.
///
/// Reads an optional sign followed by the leading run of ASCII digits after
/// any leading whitespace, so `"42"`, `" 42"` and `"42歳"` all give 42.
/// Input with no leading digits, or that overflows, becomes 0.
pub fn coerce_age(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];

    match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) => {
            tracing::debug!("Non-numeric age input '{}', coerced to 0", raw);
            0
        }
    }
}
