//! Car record definitions and boundary validation.
//!
//! This module defines [`CarRecord`], the typed form of the car objects the
//! catalog backend returns. Records are parsed from the backend's JSON field
//! names, normalized once at the boundary and then treated as immutable input
//! by the comparator, the filter pipeline and the activity store.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while bringing backend JSON into the core.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed car JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("car record has an empty identifier")]
    EmptyId,

    #[error("duplicate car identifier in catalog: {0}")]
    DuplicateId(String),
}

/// A single vehicle listing as returned by the catalog backend.
///
/// Every measurement is optional. An absent value means "unknown" and is
/// never treated as zero: the comparator lets the known side win, range
/// filters let the record through, and sorts place it last.
///
/// # JSON field names
///
/// Fields keep the backend's names on the wire (`CarID`, `ArabaMarka`,
/// `CarHorsePower`, ...) so payloads can be passed through unchanged.
/// Unknown fields such as `createdAt` are ignored.
///
/// Measurements are read leniently: any JSON number is accepted, so a
/// negative horsepower or a `450.0` cargo volume reads as "unknown" or `450`
/// instead of rejecting the record. Non-numeric values are still an error.
///
/// # Examples
///
/// ```rust
/// use car_compare_core::car_record::CarRecord;
///
/// let car = CarRecord::from_json(r#"{
///     "CarID": "c1",
///     "ArabaMarka": "Toyota",
///     "CarModel": "Corolla",
///     "CarHorsePower": 132,
///     "CarPrice": 0,
///     "averageRating": 0.0
/// }"#)?;
///
/// assert_eq!(car.horsepower, Some(132));
/// // The backend's zero defaults are normalized to "unknown"
/// assert_eq!(car.price, None);
/// assert_eq!(car.average_rating, None);
/// # Ok::<(), car_compare_core::car_record::CatalogError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CarRecord {
    /// Unique identifier within any catalog array.
    #[serde(rename = "CarID")]
    pub id: String,

    #[serde(rename = "ArabaMarka")]
    pub brand: String,

    #[serde(rename = "CarModel")]
    pub model: String,

    /// Trim or equipment package.
    #[serde(rename = "CarPack")]
    pub trim: String,

    #[serde(rename = "CarYear", deserialize_with = "measure::whole")]
    pub year: Option<u32>,

    #[serde(rename = "CarFuelType")]
    pub fuel_type: String,

    /// Engine displacement in cc.
    #[serde(rename = "CarEngineCapacity", deserialize_with = "measure::whole")]
    pub engine_capacity: Option<u32>,

    #[serde(rename = "CarHorsePower", deserialize_with = "measure::whole")]
    pub horsepower: Option<u32>,

    /// Body style (sedan, hatchback, SUV, ...).
    #[serde(rename = "CarType")]
    pub body_type: String,

    /// Top speed in km/h.
    #[serde(rename = "CarTopSpeed", deserialize_with = "measure::whole")]
    pub top_speed: Option<u32>,

    /// 0-100 km/h time in seconds.
    #[serde(rename = "CarAcceleration", deserialize_with = "measure::decimal")]
    pub acceleration: Option<f64>,

    #[serde(rename = "CarTransmission")]
    pub transmission: String,

    /// Combined consumption in L/100km.
    #[serde(rename = "CarEconomy", deserialize_with = "measure::decimal")]
    pub economy: Option<f64>,

    /// Curb weight in kg.
    #[serde(rename = "CarWeight", deserialize_with = "measure::whole")]
    pub weight: Option<u32>,

    /// Height in mm.
    #[serde(rename = "CarHeight", deserialize_with = "measure::whole")]
    pub height: Option<u32>,

    /// Width in mm.
    #[serde(rename = "CarWidth", deserialize_with = "measure::whole")]
    pub width: Option<u32>,

    #[serde(rename = "CarDriveTrain")]
    pub drive_train: String,

    /// Cargo volume in litres.
    #[serde(rename = "CarBaggageLT", deserialize_with = "measure::whole")]
    pub baggage: Option<u32>,

    /// 100-0 km/h braking distance in metres.
    #[serde(rename = "CarBrakeMetre", deserialize_with = "measure::whole")]
    pub brake_distance: Option<u32>,

    /// List price in Turkish lira.
    #[serde(rename = "CarPrice", deserialize_with = "measure::price")]
    pub price: Option<u64>,

    #[serde(rename = "CarPhotos")]
    pub photo: String,

    #[serde(rename = "averageRating", deserialize_with = "measure::decimal")]
    pub average_rating: Option<f64>,

    #[serde(rename = "reviewCount", deserialize_with = "measure::count")]
    pub review_count: u32,
}

impl CarRecord {
    /// Parses and normalizes a single backend record.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let car: CarRecord = serde_json::from_str(json)?;
        car.normalized()
    }

    /// Applies the boundary rules: a non-empty id, and every zero, negative
    /// or non-finite measurement turned into "unknown".
    pub fn normalized(mut self) -> Result<Self, CatalogError> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::EmptyId);
        }

        for field in [
            &mut self.year,
            &mut self.engine_capacity,
            &mut self.horsepower,
            &mut self.top_speed,
            &mut self.weight,
            &mut self.height,
            &mut self.width,
            &mut self.baggage,
            &mut self.brake_distance,
        ] {
            *field = field.filter(|v| *v > 0);
        }
        self.price = self.price.filter(|v| *v > 0);

        for field in [
            &mut self.acceleration,
            &mut self.economy,
            &mut self.average_rating,
        ] {
            *field = field.filter(|v| v.is_finite() && *v > 0.0);
        }

        Ok(self)
    }

    /// "Brand Model", the label used in comparison headers and activity logs.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }
}

/// Parses a backend JSON array into normalized records.
///
/// The whole array is rejected if any record fails normalization or if two
/// records share an identifier.
pub fn parse_catalog(json: &str) -> Result<Vec<CarRecord>, CatalogError> {
    let raw: Vec<CarRecord> = serde_json::from_str(json)?;
    let mut seen = HashSet::with_capacity(raw.len());
    let mut cars = Vec::with_capacity(raw.len());

    for car in raw {
        let car = car.normalized()?;
        if !seen.insert(car.id.clone()) {
            return Err(CatalogError::DuplicateId(car.id));
        }
        cars.push(car);
    }

    Ok(cars)
}

/// Lenient readers for the numeric fields. Every JSON number is accepted;
/// zero, negative and out-of-range values read as unknown.
mod measure {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Value;

    fn positive<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64().filter(|v| v.is_finite() && *v > 0.0)),
            Some(other) => Err(D::Error::custom(format!("expected a number, found {other}"))),
        }
    }

    fn rounded(value: Option<f64>, max: f64) -> Option<f64> {
        value.map(f64::round).filter(|v| *v >= 1.0 && *v <= max)
    }

    pub fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        positive(deserializer)
    }

    pub fn whole<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        Ok(rounded(positive(deserializer)?, f64::from(u32::MAX)).map(|v| v as u32))
    }

    pub fn price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        Ok(rounded(positive(deserializer)?, u64::MAX as f64).map(|v| v as u64))
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        Ok(whole(deserializer)?.unwrap_or(0))
    }
}
