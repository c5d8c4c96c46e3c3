//! Filter and sort pipeline over an in-memory car list.
//!
//! [`apply`] is pure and cheap enough to run on every filter change. Set
//! filters with no members are skipped, range filters let records with an
//! unknown value through, and sorting is stable so equal keys keep their
//! input order.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::car_record::CarRecord;
use crate::value_policy::{ascending_absent_last, descending_absent_last, passes_range, Range};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("invalid {field} range: min {min} is greater than max {max}")]
    InvalidRange {
        field: &'static str,
        min: String,
        max: String,
    },

    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),
}

/// The user's active filter constraints. The default spec restricts nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSpec {
    /// Case-insensitive substring matched against brand or model.
    pub query: Option<String>,

    pub brands: Vec<String>,
    pub fuel_types: Vec<String>,
    pub transmissions: Vec<String>,
    pub drive_trains: Vec<String>,
    pub body_types: Vec<String>,

    pub price_range: Option<Range<u64>>,
    pub year_range: Option<Range<u32>>,
    pub horsepower_range: Option<Range<u32>>,
    pub economy_range: Option<Range<f64>>,
    pub baggage_range: Option<Range<u32>>,
    pub acceleration_range: Option<Range<f64>>,
}

impl FilterSpec {
    /// Rejects any range whose lower bound exceeds its upper bound.
    pub fn validate(&self) -> Result<(), FilterError> {
        check_range("price", &self.price_range)?;
        check_range("year", &self.year_range)?;
        check_range("horsepower", &self.horsepower_range)?;
        check_range("economy", &self.economy_range)?;
        check_range("baggage", &self.baggage_range)?;
        check_range("acceleration", &self.acceleration_range)?;
        Ok(())
    }

    /// `true` when the car satisfies every active predicate.
    pub fn matches(&self, car: &CarRecord) -> bool {
        self.matches_query(car)
            && in_set(&self.brands, &car.brand)
            && in_set(&self.fuel_types, &car.fuel_type)
            && in_set(&self.transmissions, &car.transmission)
            && in_set(&self.drive_trains, &car.drive_train)
            && in_set(&self.body_types, &car.body_type)
            && in_range(car.price, &self.price_range)
            && in_range(car.year, &self.year_range)
            && in_range(car.horsepower, &self.horsepower_range)
            && in_range(car.economy, &self.economy_range)
            && in_range(car.baggage, &self.baggage_range)
            && in_range(car.acceleration, &self.acceleration_range)
    }

    fn matches_query(&self, car: &CarRecord) -> bool {
        let needle = match self.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q.to_lowercase(),
            _ => return true,
        };

        car.brand.to_lowercase().contains(&needle) || car.model.to_lowercase().contains(&needle)
    }
}

/// Result orderings offered by the listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    Horsepower,
    Year,
    Rating,
}

impl FromStr for SortKey {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            "horsepower" => Ok(SortKey::Horsepower),
            "year" => Ok(SortKey::Year),
            "rating" => Ok(SortKey::Rating),
            other => Err(FilterError::UnknownSortKey(other.to_string())),
        }
    }
}

/// Filters `cars` by `spec` and optionally sorts the survivors.
///
/// A malformed range is rejected before any record is looked at.
pub fn apply<'a>(
    cars: &'a [CarRecord],
    spec: &FilterSpec,
    sort_key: Option<SortKey>,
) -> Result<Vec<&'a CarRecord>, FilterError> {
    spec.validate()?;

    let mut result: Vec<&CarRecord> = cars.iter().filter(|car| spec.matches(car)).collect();

    if let Some(key) = sort_key {
        sort(&mut result, key);
    }

    Ok(result)
}

/// Stable in-place sort. Unknown values sort last under every key.
pub fn sort(cars: &mut [&CarRecord], key: SortKey) {
    match key {
        SortKey::PriceAsc => cars.sort_by(|a, b| ascending_absent_last(a.price, b.price)),
        SortKey::PriceDesc => cars.sort_by(|a, b| descending_absent_last(a.price, b.price)),
        SortKey::Horsepower => {
            cars.sort_by(|a, b| descending_absent_last(a.horsepower, b.horsepower))
        }
        SortKey::Year => cars.sort_by(|a, b| descending_absent_last(a.year, b.year)),
        SortKey::Rating => {
            cars.sort_by(|a, b| descending_absent_last(a.average_rating, b.average_rating))
        }
    }
}

fn check_range<T>(field: &'static str, range: &Option<Range<T>>) -> Result<(), FilterError>
where
    T: PartialOrd + Display,
{
    match range {
        Some(r) if !r.is_well_formed() => Err(FilterError::InvalidRange {
            field,
            min: r.min.to_string(),
            max: r.max.to_string(),
        }),
        _ => Ok(()),
    }
}

fn in_set(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|a| a == value)
}

fn in_range<T: PartialOrd + Copy>(value: Option<T>, range: &Option<Range<T>>) -> bool {
    match range {
        Some(r) => passes_range(value, r),
        None => true,
    }
}
