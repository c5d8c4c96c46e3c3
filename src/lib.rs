//! # Car Compare Core
//!
//! The client-side data layer of a car comparison and review application.
//! It turns the car records a catalog backend returns into side-by-side
//! comparisons, filtered and sorted listings, category rankings and
//! printable reports, and keeps a small locally persisted activity log.
//!
//! ## Modules
//!
//! - [`car_record`] - typed car records and boundary normalization
//! - [`value_policy`] - the absent-value rules every other module shares
//! - [`comparator`] - attribute-by-attribute comparison of two cars
//! - [`filter`] - set/range filters and stable sorting
//! - [`best_of`] - "best in category" rankings
//! - [`activity_store`] - recently viewed cars and comparison popularity
//! - [`kv_store`] / [`lmdb_store`] - the storage the activity log sits on
//! - [`report`] - XLSX comparison report
//!
//! The comparator, the pipeline, the rankings and the exporter are pure
//! functions of their arguments. Only the activity store touches storage.
//!
//! ## FFI Functions
//!
//! Every function below returns a JSON-encoded [`AppResponse`] as a C string
//! that must be released with [`free_response`]:
//!
//! - [`create_activity_store`] / [`close_activity_store`]
//! - [`record_view`], [`get_recently_viewed`], [`clear_recently_viewed`]
//! - [`record_comparison`], [`get_popular_comparisons`], [`clear_popular_comparisons`]
//! - [`compare_cars`], [`filter_cars`], [`best_of_cars`]
//! - [`export_comparison_report`]
//!
//! [`create_activity_store`] returns an opaque store pointer instead.
//!
//! ```no_run
//! use car_compare_core::{create_activity_store, get_popular_comparisons, record_comparison};
//! use std::ffi::CString;
//!
//! let name = CString::new("activity").unwrap();
//! let store = create_activity_store(name.as_ptr(), std::ptr::null());
//!
//! let a = CString::new("car-1").unwrap();
//! let b = CString::new("car-2").unwrap();
//! let name_a = CString::new("Toyota Corolla").unwrap();
//! let name_b = CString::new("Honda Civic").unwrap();
//! record_comparison(store, a.as_ptr(), b.as_ptr(), name_a.as_ptr(), name_b.as_ptr());
//!
//! let popular = get_popular_comparisons(store);
//! ```

pub mod activity_store;
pub mod app_response;
pub mod best_of;
pub mod car_record;
pub mod comparator;
pub mod config;
pub mod filter;
pub mod format;
pub mod kv_store;
pub mod lmdb_store;
pub mod report;
pub mod value_policy;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};

use crate::activity_store::ActivityStore;
use crate::app_response::AppResponse;
use crate::best_of::{best_of, Category};
use crate::car_record::{parse_catalog, CarRecord};
use crate::comparator::compare;
use crate::config::ActivityConfig;
use crate::filter::{apply, FilterSpec, SortKey};
use crate::lmdb_store::LmdbStore;
use crate::report::{export_comparison, write_report};

/// Activity store handed to FFI callers.
pub type ActivityState = ActivityStore<LmdbStore>;

/// Opens (or creates) the activity store in `<name>.lmdb`.
///
/// `config_json` may be null to use the default keys and bounds, or an
/// [`ActivityConfig`] JSON object.
///
/// # Returns
///
/// A pointer to the store, or null when the name is null or not UTF-8, the
/// config is invalid, or the environment cannot be opened. Release it with
/// [`close_activity_store`].
///
/// A name whose store is still open in this process is rejected with null;
/// close the first store before opening it again.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_activity_store(
    name: *const c_char,
    config_json: *const c_char,
) -> *mut ActivityState {
    if name.is_null() {
        warn!("Null name pointer passed to create_activity_store");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s.to_string(),
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    let config = if config_json.is_null() {
        ActivityConfig::default()
    } else {
        let parsed = unsafe { CStr::from_ptr(config_json).to_str() }
            .map_err(|e| e.to_string())
            .and_then(|json| ActivityConfig::from_json(json).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => config,
            Err(e) => {
                warn!("Rejected activity config: {e}");
                return std::ptr::null_mut();
            }
        }
    };

    match LmdbStore::init(name_str) {
        Ok(store) => {
            info!("Activity store ready at {}", store.path().display());
            Box::into_raw(Box::new(ActivityStore::with_config(store, config)))
        }
        Err(e) => {
            warn!("Failed to open activity store: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Releases a store created by [`create_activity_store`].
///
/// The pointer must not be used afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_activity_store(state: *mut ActivityState) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_activity_store".to_string());
        return response_to_c_string(&error);
    }

    drop(unsafe { Box::from_raw(state) });
    response_to_c_string(&AppResponse::success("Activity store closed"))
}

/// Records that the car described by `car_json` was viewed.
///
/// # JSON Format
///
/// A catalog record using the backend's field names:
/// ```json
/// { "CarID": "c1", "ArabaMarka": "Toyota", "CarModel": "Corolla", "CarPrice": 1250000 }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn record_view(state: *mut ActivityState, car_json: *const c_char) -> *const c_char {
    let state = match state_ref(state, "record_view") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let json = match c_ptr_to_string(car_json, "car JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    match CarRecord::from_json(&json) {
        Ok(car) => {
            state.record_view(&car);
            response_to_c_string(&AppResponse::success(format!("View of {} recorded", car.id)))
        }
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Returns the recently viewed cars, most recent first.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_recently_viewed(state: *mut ActivityState) -> *const c_char {
    match state_ref(state, "get_recently_viewed") {
        Ok(s) => response_to_c_string(&AppResponse::json(&s.list_recently_viewed())),
        Err(err) => err,
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_recently_viewed(state: *mut ActivityState) -> *const c_char {
    match state_ref(state, "clear_recently_viewed") {
        Ok(s) => {
            s.clear_recently_viewed();
            response_to_c_string(&AppResponse::success("Recently viewed cars cleared"))
        }
        Err(err) => err,
    }
}

/// Counts one comparison of the unordered pair `{id_a, id_b}`.
///
/// The names are stored only when the pair is seen for the first time.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn record_comparison(
    state: *mut ActivityState,
    id_a: *const c_char,
    id_b: *const c_char,
    name_a: *const c_char,
    name_b: *const c_char,
) -> *const c_char {
    let state = match state_ref(state, "record_comparison") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let mut args = Vec::with_capacity(4);
    for (ptr, field) in [(id_a, "id_a"), (id_b, "id_b"), (name_a, "name_a"), (name_b, "name_b")] {
        match c_ptr_to_string(ptr, field) {
            Ok(value) => args.push(value),
            Err(err) => return err,
        }
    }

    if args[0].trim().is_empty() || args[1].trim().is_empty() {
        let error = AppResponse::BadRequest("Car identifiers must not be empty".to_string());
        return response_to_c_string(&error);
    }

    state.record_comparison(&args[0], &args[1], &args[2], &args[3]);
    response_to_c_string(&AppResponse::success("Comparison recorded"))
}

/// Returns the comparison counters, highest count first.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_popular_comparisons(state: *mut ActivityState) -> *const c_char {
    match state_ref(state, "get_popular_comparisons") {
        Ok(s) => response_to_c_string(&AppResponse::json(&s.list_popular_comparisons())),
        Err(err) => err,
    }
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_popular_comparisons(state: *mut ActivityState) -> *const c_char {
    match state_ref(state, "clear_popular_comparisons") {
        Ok(s) => {
            s.clear_popular_comparisons();
            response_to_c_string(&AppResponse::success("Popular comparisons cleared"))
        }
        Err(err) => err,
    }
}

/// Compares two cars and returns the comparison rows as a JSON array.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn compare_cars(car_a_json: *const c_char, car_b_json: *const c_char) -> *const c_char {
    let (car_a, car_b) = match parse_pair(car_a_json, car_b_json) {
        Ok(pair) => pair,
        Err(err) => return err,
    };

    response_to_c_string(&AppResponse::json(&compare(&car_a, &car_b)))
}

/// Filters a JSON array of cars.
///
/// `spec_json` may be null for "no restriction" and `sort_key` may be null
/// to keep input order. Sort keys are `price-asc`, `price-desc`,
/// `horsepower`, `year` and `rating`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn filter_cars(
    cars_json: *const c_char,
    spec_json: *const c_char,
    sort_key: *const c_char,
) -> *const c_char {
    let cars = match c_ptr_to_string(cars_json, "cars JSON").map(|json| parse_catalog(&json)) {
        Ok(Ok(cars)) => cars,
        Ok(Err(e)) => return response_to_c_string(&AppResponse::from(e)),
        Err(err) => return err,
    };

    let spec = if spec_json.is_null() {
        FilterSpec::default()
    } else {
        let json = match c_ptr_to_string(spec_json, "filter JSON") {
            Ok(json) => json,
            Err(err) => return err,
        };
        match serde_json::from_str::<FilterSpec>(&json) {
            Ok(spec) => spec,
            Err(e) => return response_to_c_string(&AppResponse::from(e)),
        }
    };

    let sort = if sort_key.is_null() {
        None
    } else {
        let key = match c_ptr_to_string(sort_key, "sort key") {
            Ok(key) => key,
            Err(err) => return err,
        };
        match key.parse::<SortKey>() {
            Ok(key) => Some(key),
            Err(e) => return response_to_c_string(&AppResponse::from(e)),
        }
    };

    match apply(&cars, &spec, sort) {
        Ok(filtered) => response_to_c_string(&AppResponse::json(&filtered)),
        Err(e) => {
            warn!("Rejected filter: {e}");
            response_to_c_string(&AppResponse::from(e))
        }
    }
}

/// Returns up to `limit` cars that lead `category` (`baggage`,
/// `acceleration`, `economy`, `horsepower`, `price` or `popular`).
///
/// A `limit` of 0 selects the category's default (5, or 8 for `popular`).
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn best_of_cars(cars_json: *const c_char, category: *const c_char, limit: u32) -> *const c_char {
    let cars = match c_ptr_to_string(cars_json, "cars JSON").map(|json| parse_catalog(&json)) {
        Ok(Ok(cars)) => cars,
        Ok(Err(e)) => return response_to_c_string(&AppResponse::from(e)),
        Err(err) => return err,
    };

    let category = match c_ptr_to_string(category, "category") {
        Ok(raw) => match raw.parse::<Category>() {
            Ok(category) => category,
            Err(e) => return response_to_c_string(&AppResponse::BadRequest(e)),
        },
        Err(err) => return err,
    };

    let limit = (limit > 0).then_some(limit as usize);
    response_to_c_string(&AppResponse::json(&best_of(&cars, category, limit)))
}

/// Builds the comparison report for two cars and saves it into `dir`.
///
/// On success the response carries the written file's path. On failure no
/// file is left behind and the caller may retry.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn export_comparison_report(
    car_a_json: *const c_char,
    car_b_json: *const c_char,
    dir: *const c_char,
) -> *const c_char {
    let (car_a, car_b) = match parse_pair(car_a_json, car_b_json) {
        Ok(pair) => pair,
        Err(err) => return err,
    };

    let dir = match c_ptr_to_string(dir, "dir") {
        Ok(dir) => dir,
        Err(err) => return err,
    };

    let written = export_comparison(&car_a, &car_b).and_then(|report| write_report(&report, &dir));

    match written {
        Ok(path) => response_to_c_string(&AppResponse::success(path.to_string_lossy())),
        Err(e) => {
            warn!("Comparison export failed: {e}");
            response_to_c_string(&AppResponse::from(e))
        }
    }
}

/// Frees a response string returned by any function in this crate.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(response: *mut c_char) {
    if !response.is_null() {
        drop(unsafe { CString::from_raw(response) });
    }
}

fn parse_pair(
    car_a_json: *const c_char,
    car_b_json: *const c_char,
) -> Result<(CarRecord, CarRecord), *const c_char> {
    let mut cars = Vec::with_capacity(2);
    for (ptr, field) in [(car_a_json, "car A JSON"), (car_b_json, "car B JSON")] {
        let json = c_ptr_to_string(ptr, field)?;
        let car = CarRecord::from_json(&json).map_err(|e| response_to_c_string(&AppResponse::from(e)))?;
        cars.push(car);
    }

    let car_b = cars.pop();
    let car_a = cars.pop();
    match (car_a, car_b) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(response_to_c_string(&AppResponse::BadRequest("Two cars are required".to_string()))),
    }
}

fn state_ref<'a>(state: *mut ActivityState, fn_name: &str) -> Result<&'a ActivityState, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(s) => Ok(s),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {fn_name}"));
            Err(response_to_c_string(&error))
        }
    }
}

/// Serializes `response` to JSON and hands ownership of the C string to the
/// caller. Returns null only if serialization itself fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a `String`, or to a ready-made
/// `BadRequest` response when the pointer is null or not UTF-8.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
