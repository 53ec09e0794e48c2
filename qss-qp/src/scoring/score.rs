//! Score values and per-category totals

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt;

/// A numeric score: integer until a fractional contribution is seen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Int(i64),
    Float(f64),
}

impl Default for Score {
    fn default() -> Self {
        Score::Int(0)
    }
}

impl Score {
    /// Lenient conversion of a raw response score.
    ///
    /// - JSON integers stay integers, other JSON numbers become floats
    /// - strings are parsed as an integer first, then as a finite float,
    ///   ignoring surrounding whitespace
    /// - anything else (unparseable strings, booleans, null, arrays,
    ///   objects) contributes zero
    pub fn coerce(value: &Value) -> Score {
        match value {
            Value::Number(n) => Score::from_number(n),
            Value::String(s) => parse_numeric(s).unwrap_or_default(),
            _ => Score::default(),
        }
    }

    fn from_number(n: &Number) -> Score {
        if let Some(i) = n.as_i64() {
            Score::Int(i)
        } else {
            n.as_f64().map(Score::Float).unwrap_or_default()
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Score::Int(i) => i as f64,
            Score::Float(f) => f,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Score::Int(_))
    }

    /// Numeric comparison across integer and float scores
    pub fn cmp_numeric(&self, other: &Score) -> Ordering {
        match (self, other) {
            (Score::Int(a), Score::Int(b)) => a.cmp(b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }

    pub fn to_value(self) -> Value {
        match self {
            Score::Int(i) => Value::from(i),
            Score::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Int(i) => write!(f, "{}", i),
            Score::Float(x) => write!(f, "{}", x),
        }
    }
}

fn parse_numeric(raw: &str) -> Option<Score> {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Score::Int(i));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Score::Float)
}

/// Running total of one category's contributions.
///
/// The result does not depend on the order contributions arrive in:
/// integers are summed exactly in `i128` and narrowed once at the end, and
/// fractional contributions are summed in ascending order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSum {
    ints: i128,
    floats: Vec<f64>,
}

impl ScoreSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, score: Score) {
        match score {
            Score::Int(i) => self.ints = self.ints.saturating_add(i128::from(i)),
            Score::Float(f) => self.floats.push(f),
        }
    }

    /// Integer while every contribution was an integer and the sum fits
    /// `i64`, float otherwise
    pub fn total(&self) -> Score {
        if self.floats.is_empty() {
            return i64::try_from(self.ints)
                .map(Score::Int)
                .unwrap_or(Score::Float(self.ints as f64));
        }

        let mut floats = self.floats.clone();
        floats.sort_by(f64::total_cmp);
        Score::Float(floats.into_iter().fold(self.ints as f64, |acc, f| acc + f))
    }
}

/// Category totals in insertion order.
///
/// Serializes as a JSON object whose key order is the vector order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryScores(Vec<(String, Score)>);

impl CategoryScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: &str) -> Option<Score> {
        self.0.iter().find(|(name, _)| name == category).map(|(_, s)| *s)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Score)> {
        self.0.iter().map(|(name, score)| (name.as_str(), *score))
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Reorder by descending score; equal scores keep their relative order
    pub fn sort_descending(&mut self) {
        self.0.sort_by(|(_, a), (_, b)| b.cmp_numeric(a));
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(name, score)| (name.clone(), score.to_value()))
                .collect(),
        )
    }
}

/// Sums contributions per category; categories keep first-occurrence order
impl<S: Into<String>> FromIterator<(S, Score)> for CategoryScores {
    fn from_iter<I: IntoIterator<Item = (S, Score)>>(iter: I) -> Self {
        let mut sums: Vec<(String, ScoreSum)> = Vec::new();
        for (name, score) in iter {
            let name: String = name.into();
            match sums.iter_mut().find(|(existing, _)| *existing == name) {
                Some((_, sum)) => sum.add(score),
                None => {
                    let mut sum = ScoreSum::new();
                    sum.add(score);
                    sums.push((name, sum));
                }
            }
        }

        CategoryScores(sums.into_iter().map(|(name, sum)| (name, sum.total())).collect())
    }
}

impl Serialize for CategoryScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, score) in &self.0 {
            map.serialize_entry(name, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoryScoresVisitor;

        impl<'de> Visitor<'de> for CategoryScoresVisitor {
            type Value = CategoryScores;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to numeric score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, score)) = access.next_entry::<String, Score>()? {
                    entries.push((name, score));
                }
                Ok(CategoryScores(entries))
            }
        }

        deserializer.deserialize_map(CategoryScoresVisitor)
    }
}
