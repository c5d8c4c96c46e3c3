//! "Best in category" rankings computed over an in-memory car list.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::car_record::CarRecord;
use crate::value_policy::{descending_absent_last, Direction};

pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 10;

/// The popularity list is longer than the per-metric lists.
pub const POPULAR_DEFAULT_LIMIT: usize = 8;
pub const POPULAR_MAX_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Largest cargo volume.
    Baggage,
    /// Quickest 0-100 time.
    Acceleration,
    /// Lowest consumption.
    Economy,
    Horsepower,
    /// Cheapest list price.
    Price,
    /// Most reviewed, then best rated.
    Popular,
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baggage" => Ok(Category::Baggage),
            "acceleration" => Ok(Category::Acceleration),
            "economy" => Ok(Category::Economy),
            "horsepower" => Ok(Category::Horsepower),
            "price" => Ok(Category::Price),
            "popular" => Ok(Category::Popular),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

impl Category {
    pub fn default_limit(self) -> usize {
        match self {
            Category::Popular => POPULAR_DEFAULT_LIMIT,
            _ => DEFAULT_LIMIT,
        }
    }

    pub fn max_limit(self) -> usize {
        match self {
            Category::Popular => POPULAR_MAX_LIMIT,
            _ => MAX_LIMIT,
        }
    }
}

/// Top cars in `category`, best first.
///
/// Cars whose ranking value is unknown are left out and ties keep input
/// order. Without a `limit` the category's default is used; a given limit is
/// clamped to `1..=category.max_limit()`.
pub fn best_of(cars: &[CarRecord], category: Category, limit: Option<usize>) -> Vec<&CarRecord> {
    let limit = limit
        .unwrap_or_else(|| category.default_limit())
        .clamp(1, category.max_limit());

    let mut ranked: Vec<&CarRecord> = match category {
        Category::Popular => cars.iter().collect(),
        _ => cars.iter().filter(|car| metric(car, category).is_some()).collect(),
    };

    ranked.sort_by(|a, b| match category {
        Category::Popular => b
            .review_count
            .cmp(&a.review_count)
            .then_with(|| descending_absent_last(a.average_rating, b.average_rating)),
        _ => by_direction(metric(a, category), metric(b, category), direction(category)),
    });

    ranked.truncate(limit);
    ranked
}

fn metric(car: &CarRecord, category: Category) -> Option<f64> {
    match category {
        Category::Baggage => car.baggage.map(f64::from),
        Category::Acceleration => car.acceleration,
        Category::Economy => car.economy,
        Category::Horsepower => car.horsepower.map(f64::from),
        Category::Price => car.price.map(|p| p as f64),
        Category::Popular => None,
    }
}

fn direction(category: Category) -> Direction {
    match category {
        Category::Acceleration | Category::Economy | Category::Price => Direction::LowerIsBetter,
        _ => Direction::HigherIsBetter,
    }
}

fn by_direction(a: Option<f64>, b: Option<f64>, direction: Direction) -> Ordering {
    let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    match direction {
        Direction::HigherIsBetter => ord.reverse(),
        Direction::LowerIsBetter => ord,
    }
}
