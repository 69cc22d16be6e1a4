// Application Layer - one service per REST resource

pub mod api_keys;
pub mod client;
pub mod logs;
pub mod logsets;
pub mod query;
pub mod saved_queries;
pub mod teams;
pub mod usage;
pub mod users;

// Re-exports
pub use api_keys::ApiKeyService;
pub use client::{check_response, ApiClient};
pub use logs::{LogService, NewResource};
pub use logsets::LogsetService;
pub use query::{
    LogSelection, QueryObserver, QueryService, RecentWindow, TailOptions, DEFAULT_RECENT_SECONDS,
};
pub use saved_queries::{SavedQueryFields, SavedQueryService};
pub use teams::TeamService;
pub use usage::UsageService;
pub use users::{NewUser, UserService};
