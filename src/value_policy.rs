//! Absent-value rules shared by the comparator, the filter pipeline and the
//! rankings. Every place that has to decide what an unknown measurement means
//! goes through one of these functions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Side that wins a comparison row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "equal")]
    Equal,
}

impl Winner {
    /// The winner seen from the other side of the table.
    pub fn mirrored(self) -> Self {
        match self {
            Winner::A => Winner::B,
            Winner::B => Winner::A,
            Winner::Equal => Winner::Equal,
        }
    }
}

/// Which way a numeric attribute is ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Inclusive `[min, max]` bound used by range filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd> Range<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// `false` when `min > max` or either bound is unordered (NaN).
    pub fn is_well_formed(&self) -> bool {
        matches!(
            self.min.partial_cmp(&self.max),
            Some(Ordering::Less) | Some(Ordering::Equal)
        )
    }

    pub fn contains(&self, value: &T) -> bool {
        *value >= self.min && *value <= self.max
    }
}

/// Decides a row winner. An unknown value always loses against a known one,
/// whichever direction the attribute is ranked in.
pub fn pick_winner<T: PartialOrd>(a: Option<T>, b: Option<T>, direction: Direction) -> Winner {
    match (a, b) {
        (None, None) => Winner::Equal,
        (Some(_), None) => Winner::A,
        (None, Some(_)) => Winner::B,
        (Some(a), Some(b)) => match (a.partial_cmp(&b), direction) {
            (Some(Ordering::Greater), Direction::HigherIsBetter)
            | (Some(Ordering::Less), Direction::LowerIsBetter) => Winner::A,
            (Some(Ordering::Less), Direction::HigherIsBetter)
            | (Some(Ordering::Greater), Direction::LowerIsBetter) => Winner::B,
            _ => Winner::Equal,
        },
    }
}

/// Range check where an unknown value passes every range.
pub fn passes_range<T: PartialOrd>(value: Option<T>, range: &Range<T>) -> bool {
    match value {
        Some(v) => range.contains(&v),
        None => true,
    }
}

/// Ascending order with unknown values after every known one.
pub fn ascending_absent_last<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending order with unknown values after every known one.
pub fn descending_absent_last<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
