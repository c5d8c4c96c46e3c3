//! Locally persisted activity log: recently viewed cars and comparison
//! popularity counters.
//!
//! Both logs are JSON arrays stored under well-known keys of a
//! [`KeyValueStore`]. The log is convenience state, so no operation here
//! returns an error: unreadable data reads as an empty list and failed writes
//! are logged and dropped.
//!
//! A single writer is assumed. Two processes incrementing the same counter at
//! once can lose one of the increments.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::car_record::CarRecord;
use crate::config::ActivityConfig;
use crate::kv_store::KeyValueStore;

/// Snapshot of a car's display fields taken when it was viewed.
///
/// Display strings missing from an older log entry read as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentlyViewed {
    #[serde(rename = "CarID")]
    pub car_id: String,
    #[serde(rename = "ArabaMarka", default)]
    pub brand: String,
    #[serde(rename = "CarModel", default)]
    pub model: String,
    #[serde(rename = "CarPack", default)]
    pub trim: String,
    #[serde(rename = "CarPhotos", default)]
    pub photo: String,
    #[serde(rename = "CarPrice")]
    pub price: Option<u64>,
    #[serde(rename = "CarHorsePower")]
    pub horsepower: Option<u32>,
    #[serde(rename = "averageRating")]
    pub average_rating: Option<f64>,
    #[serde(rename = "viewedAt")]
    pub viewed_at: DateTime<Utc>,
}

impl RecentlyViewed {
    fn snapshot(car: &CarRecord, viewed_at: DateTime<Utc>) -> Self {
        Self {
            car_id: car.id.clone(),
            brand: car.brand.clone(),
            model: car.model.clone(),
            trim: car.trim.clone(),
            photo: car.photo.clone(),
            price: car.price,
            horsepower: car.horsepower,
            average_rating: car.average_rating,
            viewed_at,
        }
    }
}

/// How often an unordered pair of cars has been compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonCount {
    pub key: String,
    pub car1_id: String,
    pub car2_id: String,
    pub car1_name: String,
    pub car2_name: String,
    pub count: u64,
    pub last_compared: DateTime<Utc>,
}

impl ComparisonCount {
    fn is_pair(&self, lo: &str, hi: &str) -> bool {
        let (a, b) = ordered(&self.car1_id, &self.car2_id);
        a == lo && b == hi
    }
}

/// Order-independent key for a pair of car ids: the sorted ids joined by `-`.
pub fn pair_key(id_a: &str, id_b: &str) -> String {
    let (lo, hi) = ordered(id_a, id_b);
    format!("{lo}-{hi}")
}

fn ordered<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub struct ActivityStore<S> {
    store: S,
    config: ActivityConfig,
}

impl<S: KeyValueStore> ActivityStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, ActivityConfig::default())
    }

    pub fn with_config(store: S, config: ActivityConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ActivityConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn record_view(&self, car: &CarRecord) {
        self.record_view_at(car, Utc::now());
    }

    /// Moves `car` to the front of the recently-viewed log, dropping any
    /// earlier entry for the same id, then trims the log to its bound.
    pub fn record_view_at(&self, car: &CarRecord, viewed_at: DateTime<Utc>) {
        let mut recent = self.list_recently_viewed();

        recent.retain(|entry| entry.car_id != car.id);
        recent.insert(0, RecentlyViewed::snapshot(car, viewed_at));
        recent.truncate(self.config.max_recently_viewed);

        debug!("Recorded view of {} ({} in log)", car.id, recent.len());
        self.write_list(&self.config.recently_viewed_key, &recent);
    }

    /// Most recent first.
    pub fn list_recently_viewed(&self) -> Vec<RecentlyViewed> {
        self.read_list(&self.config.recently_viewed_key)
    }

    pub fn clear_recently_viewed(&self) {
        self.remove_list(&self.config.recently_viewed_key);
    }

    pub fn record_comparison(&self, id_a: &str, id_b: &str, name_a: &str, name_b: &str) {
        self.record_comparison_at(id_a, id_b, name_a, name_b, Utc::now());
    }

    /// Increments the counter for the unordered pair `{id_a, id_b}`, creating
    /// it with the given names if it does not exist yet.
    ///
    /// The log is then stably re-sorted by count, so entries with equal
    /// counts keep their previous relative order and a new entry starts
    /// behind every existing entry of count 1. Finally it is trimmed to its
    /// bound.
    pub fn record_comparison_at(
        &self,
        id_a: &str,
        id_b: &str,
        name_a: &str,
        name_b: &str,
        compared_at: DateTime<Utc>,
    ) {
        let mut comparisons = self.list_popular_comparisons();
        let (lo, hi) = ordered(id_a, id_b);

        match comparisons.iter_mut().find(|c| c.is_pair(lo, hi)) {
            Some(existing) => {
                existing.count += 1;
                existing.last_compared = compared_at;
            }
            None => comparisons.push(ComparisonCount {
                key: pair_key(id_a, id_b),
                car1_id: id_a.to_string(),
                car2_id: id_b.to_string(),
                car1_name: name_a.to_string(),
                car2_name: name_b.to_string(),
                count: 1,
                last_compared: compared_at,
            }),
        }

        comparisons.sort_by(|a, b| b.count.cmp(&a.count));
        comparisons.truncate(self.config.max_popular_comparisons);

        self.write_list(&self.config.popular_comparisons_key, &comparisons);
    }

    /// Highest count first.
    pub fn list_popular_comparisons(&self) -> Vec<ComparisonCount> {
        self.read_list(&self.config.popular_comparisons_key)
    }

    pub fn clear_popular_comparisons(&self) {
        self.remove_list(&self.config.popular_comparisons_key);
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Error reading {key}: {e}");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Discarding unreadable {key}: {e}");
            Vec::new()
        })
    }

    fn write_list<T: Serialize>(&self, key: &str, items: &[T]) {
        let json = match serde_json::to_string(items) {
            Ok(json) => json,
            Err(e) => {
                warn!("Error serializing {key}: {e}");
                return;
            }
        };

        if let Err(e) = self.store.set(key, &json) {
            warn!("Error saving {key}: {e}");
        }
    }

    fn remove_list(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!("Error clearing {key}: {e}");
        }
    }
}
