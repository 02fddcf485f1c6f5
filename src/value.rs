//! Loosely typed attribute values
//!
//! Genome documents carry every parameter as an XML attribute string. Values are
//! typed generically on load: a value containing whitespace becomes a list of
//! numbers, otherwise a single number, and anything that fails to parse as a number
//! is kept verbatim as text. Unknown attributes therefore survive a load/save cycle.

use crate::geometry::fmt_num;
use serde::Serialize;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Numbers(Vec<f64>),
    Text(String),
}

impl AttrValue {
    /// Type a raw attribute string.
    ///
    /// # Examples
    ///
    /// ```
    /// use flamekit::value::AttrValue;
    ///
    /// assert_eq!(AttrValue::parse("4"), AttrValue::Number(4.0));
    /// assert_eq!(AttrValue::parse("640 480"), AttrValue::Numbers(vec![640.0, 480.0]));
    /// assert_eq!(AttrValue::parse("off"), AttrValue::Text("off".to_string()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        if raw.chars().any(char::is_whitespace) {
            let numbers: Result<Vec<f64>, _> = raw.split_whitespace().map(str::parse).collect();
            return match numbers {
                Ok(numbers) => AttrValue::Numbers(numbers),
                Err(_) => AttrValue::Text(raw.to_string()),
            };
        }
        match raw.parse::<f64>() {
            Ok(n) => AttrValue::Number(n),
            Err(_) => AttrValue::Text(raw.to_string()),
        }
    }

    /// The value as a single number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The value as a list of numbers. A single number is a list of one.
    pub fn as_numbers(&self) -> Option<Vec<f64>> {
        match self {
            AttrValue::Number(n) => Some(vec![*n]),
            AttrValue::Numbers(v) => Some(v.clone()),
            AttrValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value counts as "set" when deciding to write it out.
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Number(n) => *n != 0.0,
            AttrValue::Numbers(v) => !v.is_empty(),
            AttrValue::Text(s) => !s.is_empty(),
        }
    }

    /// Render the value as an attribute string (unescaped).
    pub fn to_attribute(&self) -> String {
        match self {
            AttrValue::Number(n) => fmt_num(*n),
            AttrValue::Numbers(v) => v.iter().map(|n| fmt_num(*n)).collect::<Vec<_>>().join(" "),
            AttrValue::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<Vec<f64>> for AttrValue {
    fn from(v: Vec<f64>) -> Self {
        AttrValue::Numbers(v)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

/// An insertion-ordered bag of named attribute values.
///
/// Setting an existing key replaces its value in place, so document order is kept
/// across edits and the serialized form stays stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttrBag {
    entries: Vec<(String, AttrValue)>,
}

impl AttrBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Numeric lookup with the sparse default: missing or non-numeric reads as `0.0`.
    pub fn number(&self, name: &str) -> f64 {
        self.get(name).and_then(AttrValue::as_f64).unwrap_or(0.0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        let pos = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_text() {
        assert_eq!(AttrValue::parse("1 two 3"), AttrValue::Text("1 two 3".to_string()));
        assert_eq!(AttrValue::parse(""), AttrValue::Text(String::new()));
        assert_eq!(AttrValue::parse("-0.25"), AttrValue::Number(-0.25));
    }

    #[test]
    fn test_to_attribute_integral_numbers() {
        assert_eq!(AttrValue::Numbers(vec![640.0, 480.0]).to_attribute(), "640 480");
        assert_eq!(AttrValue::Number(0.04).to_attribute(), "0.04");
        assert_eq!(AttrValue::Text("Fr0st".to_string()).to_attribute(), "Fr0st");
    }

    #[test]
    fn test_truthiness() {
        assert!(!AttrValue::Number(0.0).is_truthy());
        assert!(AttrValue::Number(-1.0).is_truthy());
        assert!(!AttrValue::Text(String::new()).is_truthy());
        assert!(AttrValue::Numbers(vec![0.0]).is_truthy());
    }

    #[test]
    fn test_bag_keeps_order_on_replace() {
        let mut bag = AttrBag::new();
        bag.set("zoom", 1.0);
        bag.set("quality", 50.0);
        bag.set("zoom", 2.0);
        let keys: Vec<_> = bag.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zoom", "quality"]);
        assert_eq!(bag.number("zoom"), 2.0);
    }

    #[test]
    fn test_bag_sparse_default() {
        let mut bag = AttrBag::new();
        assert_eq!(bag.number("missing"), 0.0);
        bag.set("plotmode", "off");
        assert_eq!(bag.number("plotmode"), 0.0);
        assert_eq!(bag.remove("plotmode"), Some(AttrValue::Text("off".to_string())));
        assert!(bag.is_empty());
    }
}
