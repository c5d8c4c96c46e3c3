use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::car_record::CatalogError;
use crate::config::ConfigError;
use crate::filter::FilterError;
use crate::kv_store::StoreError;
use crate::report::ExportFailedError;

/// JSON envelope returned to FFI callers.
#[derive(Debug, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    ExportError(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::ExportError(msg) => write!(f, "Export error: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<StoreError> for AppResponse {
    fn from(err: StoreError) -> Self {
        AppResponse::DatabaseError(err.to_string())
    }
}

impl From<CatalogError> for AppResponse {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Malformed(e) => AppResponse::from(e),
            other => AppResponse::ValidationError(other.to_string()),
        }
    }
}

impl From<FilterError> for AppResponse {
    fn from(err: FilterError) -> Self {
        AppResponse::ValidationError(err.to_string())
    }
}

impl From<ConfigError> for AppResponse {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Malformed(e) => AppResponse::from(e),
            other => AppResponse::ValidationError(other.to_string()),
        }
    }
}

impl From<ExportFailedError> for AppResponse {
    fn from(err: ExportFailedError) -> Self {
        AppResponse::ExportError(err.to_string())
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    /// Wraps a serializable payload as `Ok(<json>)`.
    pub fn json<T: Serialize + ?Sized>(payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(json) => AppResponse::Ok(json),
            Err(e) => AppResponse::SerializationError(format!("Failed to serialize result: {e}")),
        }
    }
}
