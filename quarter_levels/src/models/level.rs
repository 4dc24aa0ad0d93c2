//! Level definitions: named percentage offsets from a range's mid.
//!
//! Names encode an outcome prefix and a trailing numeric index, e.g.
//! `LONG_TRUE_5`, `SHORT_FALSE_8`, or the simple-catalog form `Long_High_20`.
//! They are parsed once into [`ParsedName`] and never inspected again.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::outcome::OutcomeBucket;

/// Stroke style of a level line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LineStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Dashed line.
    Dashed,
    /// Dotted line.
    Dotted,
    /// Any other style name, kept verbatim.
    Other(String),
}

impl From<String> for LineStyle {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" => LineStyle::Solid,
            "dashed" => LineStyle::Dashed,
            "dotted" => LineStyle::Dotted,
            _ => LineStyle::Other(s),
        }
    }
}

impl From<LineStyle> for String {
    fn from(s: LineStyle) -> Self {
        match s {
            LineStyle::Solid => "solid".into(),
            LineStyle::Dashed => "dashed".into(),
            LineStyle::Dotted => "dotted".into(),
            LineStyle::Other(s) => s,
        }
    }
}

/// The percent field of a definition as delivered by the catalog.
///
/// Anything that is not a finite number (or a numeric string) is carried
/// through untouched so rescaling never loses data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Percent {
    /// Numeric percent (e.g., `5.0` for +5%).
    Number(f64),
    /// Textual value; numeric if it parses as a finite float.
    Text(String),
    /// Absent or null.
    #[default]
    Missing,
}

impl Percent {
    /// Finite numeric value, if any.
    pub fn value(&self) -> Option<f64> {
        let v = match self {
            Percent::Number(v) => *v,
            Percent::Text(s) => s.trim().parse::<f64>().ok()?,
            Percent::Missing => return None,
        };
        v.is_finite().then_some(v)
    }
}

impl From<f64> for Percent {
    fn from(v: f64) -> Self {
        Percent::Number(v)
    }
}

/// A named percentage offset from mid, scoped to an outcome bucket by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Encoded name, e.g. `Long_High_20` or `LONG_TRUE_7`.
    pub name: String,
    /// Offset from mid in percent.
    #[serde(alias = "value", default)]
    pub percent: Percent,
    /// Optional line style.
    #[serde(rename = "style", alias = "lineStyle", default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
    /// Optional CSS color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl LevelDefinition {
    /// Definition with a numeric percent and no styling.
    pub fn new(name: impl Into<String>, percent: f64) -> Self {
        Self {
            name: name.into(),
            percent: Percent::Number(percent),
            line_style: None,
            color: None,
        }
    }
}

/// Which edge of the range a simple-catalog level sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelSide {
    /// `High` / `Upper` names.
    High,
    /// `Low` / `Lower` names.
    Low,
}

/// Structured form of a level name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedName {
    /// Outcome bucket selected by the name prefix.
    pub bucket: OutcomeBucket,
    /// Trailing `_<digits>` index, if present.
    pub index: Option<u32>,
    /// High/low marker, if present.
    pub side: Option<LevelSide>,
}

impl ParsedName {
    /// Parse a level name. Returns `None` when no outcome prefix matches.
    ///
    /// Prefixes (case-insensitive): `LONG_TRUE`/`LONG_CONFIRMED`,
    /// `LONG_FALSE`/`LONG_FAILED`, the `SHORT_` equivalents, and finally a bare
    /// `LONG_`/`SHORT_` which maps to the confirmed bucket of that side.
    pub fn parse(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        const PREFIXES: [(&str, OutcomeBucket); 10] = [
            ("LONG_TRUE", OutcomeBucket::LongConfirmed),
            ("LONG_CONFIRMED", OutcomeBucket::LongConfirmed),
            ("LONG_FALSE", OutcomeBucket::LongFailed),
            ("LONG_FAILED", OutcomeBucket::LongFailed),
            ("SHORT_TRUE", OutcomeBucket::ShortConfirmed),
            ("SHORT_CONFIRMED", OutcomeBucket::ShortConfirmed),
            ("SHORT_FALSE", OutcomeBucket::ShortFailed),
            ("SHORT_FAILED", OutcomeBucket::ShortFailed),
            ("LONG_", OutcomeBucket::LongConfirmed),
            ("SHORT_", OutcomeBucket::ShortConfirmed),
        ];
        let bucket = PREFIXES
            .iter()
            .find(|(p, _)| upper.starts_with(p))
            .map(|(_, b)| *b)?;

        let index = upper
            .rsplit_once('_')
            .map(|(_, tail)| tail)
            .filter(|tail| !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|tail| tail.parse::<u32>().ok());

        let side = upper.split('_').find_map(|tok| match tok {
            "HIGH" | "UPPER" => Some(LevelSide::High),
            "LOW" | "LOWER" => Some(LevelSide::Low),
            _ => None,
        });

        Some(Self { bucket, index, side })
    }
}

impl fmt::Display for ParsedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.bucket)?;
        if let Some(side) = self.side {
            write!(f, "/{side:?}")?;
        }
        if let Some(i) = self.index {
            write!(f, "#{i}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pro_catalog_names() {
        let p = ParsedName::parse("LONG_TRUE_5").unwrap();
        assert_eq!(p.bucket, OutcomeBucket::LongConfirmed);
        assert_eq!(p.index, Some(5));
        assert_eq!(p.side, None);

        let p = ParsedName::parse("short_false_9").unwrap();
        assert_eq!(p.bucket, OutcomeBucket::ShortFailed);
        assert_eq!(p.index, Some(9));
    }

    #[test]
    fn parses_simple_catalog_names() {
        let p = ParsedName::parse("Long_High_20").unwrap();
        assert_eq!(p.bucket, OutcomeBucket::LongConfirmed);
        assert_eq!(p.side, Some(LevelSide::High));
        assert_eq!(p.index, Some(20));

        let p = ParsedName::parse("Short_Low_80").unwrap();
        assert_eq!(p.bucket, OutcomeBucket::ShortConfirmed);
        assert_eq!(p.side, Some(LevelSide::Low));
    }

    #[test]
    fn rejects_names_without_outcome_prefix() {
        assert!(ParsedName::parse("Mid_5").is_none());
        assert!(ParsedName::parse("").is_none());
        assert_eq!(ParsedName::parse("LONG_TRUE_x").unwrap().index, None);
    }

    #[test]
    fn definitions_accept_value_alias_and_odd_percents() {
        let json = r##"[
            {"name": "Long_High_20", "value": 5.0, "style": "Dashed", "color": "#2563eb"},
            {"name": "Long_High_50", "value": "7.5"},
            {"name": "Long_High_80", "value": "n/a"},
            {"name": "Long_High_90", "value": null}
        ]"##;
        let defs: Vec<LevelDefinition> = serde_json::from_str(json).unwrap();
        assert_eq!(defs[0].percent.value(), Some(5.0));
        assert_eq!(defs[0].line_style, Some(LineStyle::Dashed));
        assert_eq!(defs[1].percent.value(), Some(7.5));
        assert_eq!(defs[2].percent, Percent::Text("n/a".into()));
        assert_eq!(defs[2].percent.value(), None);
        assert_eq!(defs[3].percent, Percent::Missing);
    }
}
