//! Side-by-side comparison of two car records.
//!
//! [`compare`] produces one [`ComparisonRow`] per attribute in a fixed order.
//! Numeric attributes carry a ranking direction and a computed winner;
//! categorical and dimensional attributes are display-only and always report
//! [`Winner::Equal`].

use serde::{Deserialize, Serialize};

use crate::car_record::CarRecord;
use crate::format;
use crate::value_policy::{pick_winner, Direction, Winner};

/// Attributes in the order they appear in a comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Trim,
    Year,
    FuelType,
    EngineCapacity,
    Horsepower,
    BodyType,
    TopSpeed,
    Acceleration,
    Transmission,
    Economy,
    Weight,
    Height,
    Width,
    DriveTrain,
    Baggage,
    BrakeDistance,
    Price,
    Rating,
}

impl Attribute {
    pub fn label(self) -> &'static str {
        match self {
            Attribute::Trim => "Trim",
            Attribute::Year => "Year",
            Attribute::FuelType => "Fuel type",
            Attribute::EngineCapacity => "Engine capacity",
            Attribute::Horsepower => "Horsepower",
            Attribute::BodyType => "Body type",
            Attribute::TopSpeed => "Top speed",
            Attribute::Acceleration => "0-100 acceleration",
            Attribute::Transmission => "Transmission",
            Attribute::Economy => "Fuel economy",
            Attribute::Weight => "Weight",
            Attribute::Height => "Height",
            Attribute::Width => "Width",
            Attribute::DriveTrain => "Drive train",
            Attribute::Baggage => "Cargo volume",
            Attribute::BrakeDistance => "Braking distance",
            Attribute::Price => "Price",
            Attribute::Rating => "Rating",
        }
    }
}

/// How a row's winner was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    HigherIsBetter,
    LowerIsBetter,
    Unordered,
}

impl From<Direction> for Policy {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::HigherIsBetter => Policy::HigherIsBetter,
            Direction::LowerIsBetter => Policy::LowerIsBetter,
        }
    }
}

/// One attribute of a two-car comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub attribute: Attribute,
    pub label: String,
    pub value_a: String,
    pub value_b: String,
    pub winner: Winner,
    pub policy: Policy,
}

impl ComparisonRow {
    fn ranked<T: PartialOrd>(
        attribute: Attribute,
        a: Option<T>,
        b: Option<T>,
        direction: Direction,
        render: impl Fn(Option<T>) -> String,
    ) -> Self
    where
        T: Copy,
    {
        Self {
            attribute,
            label: attribute.label().to_string(),
            value_a: render(a),
            value_b: render(b),
            winner: pick_winner(a, b, direction),
            policy: direction.into(),
        }
    }

    fn display(attribute: Attribute, value_a: String, value_b: String) -> Self {
        Self {
            attribute,
            label: attribute.label().to_string(),
            value_a,
            value_b,
            winner: Winner::Equal,
            policy: Policy::Unordered,
        }
    }
}

/// Compares two cars attribute by attribute.
///
/// The braking-distance row is only emitted when at least one side knows it.
/// Comparing a car with itself yields `Equal` on every row.
///
/// ```rust
/// use car_compare_core::car_record::CarRecord;
/// use car_compare_core::comparator::{compare, Attribute};
/// use car_compare_core::value_policy::Winner;
///
/// let a = CarRecord { id: "a".into(), horsepower: Some(300), ..Default::default() };
/// let b = CarRecord { id: "b".into(), horsepower: Some(250), ..Default::default() };
///
/// let rows = compare(&a, &b);
/// let hp = rows.iter().find(|r| r.attribute == Attribute::Horsepower).unwrap();
/// assert_eq!(hp.winner, Winner::A);
/// ```
pub fn compare(a: &CarRecord, b: &CarRecord) -> Vec<ComparisonRow> {
    use Direction::{HigherIsBetter, LowerIsBetter};

    let mut rows = Vec::with_capacity(18);

    rows.push(ComparisonRow::display(Attribute::Trim, a.trim.clone(), b.trim.clone()));
    rows.push(ComparisonRow::ranked(Attribute::Year, a.year, b.year, HigherIsBetter, |v| {
        v.map(|y| y.to_string()).unwrap_or_else(|| format::NOT_SPECIFIED.to_string())
    }));
    rows.push(ComparisonRow::display(
        Attribute::FuelType,
        a.fuel_type.clone(),
        b.fuel_type.clone(),
    ));
    rows.push(ComparisonRow::ranked(
        Attribute::EngineCapacity,
        a.engine_capacity,
        b.engine_capacity,
        HigherIsBetter,
        |v| format::with_unit(v, "cc"),
    ));
    rows.push(ComparisonRow::ranked(
        Attribute::Horsepower,
        a.horsepower,
        b.horsepower,
        HigherIsBetter,
        |v| format::with_unit(v, "HP"),
    ));
    rows.push(ComparisonRow::display(
        Attribute::BodyType,
        a.body_type.clone(),
        b.body_type.clone(),
    ));
    rows.push(ComparisonRow::ranked(
        Attribute::TopSpeed,
        a.top_speed,
        b.top_speed,
        HigherIsBetter,
        |v| format::with_unit(v, "km/h"),
    ));
    rows.push(ComparisonRow::ranked(
        Attribute::Acceleration,
        a.acceleration,
        b.acceleration,
        LowerIsBetter,
        |v| format::with_unit(v, "s"),
    ));
    rows.push(ComparisonRow::display(
        Attribute::Transmission,
        a.transmission.clone(),
        b.transmission.clone(),
    ));
    rows.push(ComparisonRow::ranked(
        Attribute::Economy,
        a.economy,
        b.economy,
        LowerIsBetter,
        |v| format::with_unit(v, "L/100km"),
    ));
    rows.push(ComparisonRow::ranked(
        Attribute::Weight,
        a.weight,
        b.weight,
        LowerIsBetter,
        |v| format::with_unit(v, "kg"),
    ));
    rows.push(ComparisonRow::display(
        Attribute::Height,
        format::with_unit(a.height, "mm"),
        format::with_unit(b.height, "mm"),
    ));
    rows.push(ComparisonRow::display(
        Attribute::Width,
        format::with_unit(a.width, "mm"),
        format::with_unit(b.width, "mm"),
    ));
    rows.push(ComparisonRow::display(
        Attribute::DriveTrain,
        a.drive_train.clone(),
        b.drive_train.clone(),
    ));
    rows.push(ComparisonRow::ranked(
        Attribute::Baggage,
        a.baggage,
        b.baggage,
        HigherIsBetter,
        |v| format::with_unit(v, "L"),
    ));

    if a.brake_distance.is_some() || b.brake_distance.is_some() {
        rows.push(ComparisonRow::ranked(
            Attribute::BrakeDistance,
            a.brake_distance,
            b.brake_distance,
            LowerIsBetter,
            |v| format::with_unit(v, "m"),
        ));
    }

    rows.push(ComparisonRow::ranked(
        Attribute::Price,
        a.price,
        b.price,
        LowerIsBetter,
        format::price,
    ));

    let mut rating = ComparisonRow::ranked(
        Attribute::Rating,
        a.average_rating,
        b.average_rating,
        HigherIsBetter,
        |_| String::new(),
    );
    rating.value_a = format::rating(a.average_rating, a.review_count);
    rating.value_b = format::rating(b.average_rating, b.review_count);
    rows.push(rating);

    rows
}

/// Number of rows each side wins, as `(a_wins, b_wins)`.
pub fn tally(rows: &[ComparisonRow]) -> (usize, usize) {
    rows.iter().fold((0, 0), |(a, b), row| match row.winner {
        Winner::A => (a + 1, b),
        Winner::B => (a, b + 1),
        Winner::Equal => (a, b),
    })
}
