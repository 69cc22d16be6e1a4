// Domain Layer - Pure logic: credentials, signing, time ranges, query options

pub mod auth;
pub mod config;
pub mod error;
pub mod json;
pub mod query;
pub mod time_range;

// Re-exports
pub use auth::{generate_headers, sign, ApiKeyKind, CONTENT_TYPE, USER_AGENT};
pub use config::{AccountConfig, AuthSection, UrlSection, DEFAULT_API_URL};
pub use error::DomainError;
pub use json::{combine_objects, remove_log_from_logset};
pub use query::{resolve_log_keys, QueryOptions, ResolvedQuery, ALL_EVENTS_QUERY};
pub use time_range::TimeRange;
