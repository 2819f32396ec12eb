pub mod api;
pub mod cleaner;
pub mod config;
pub mod credentials;
pub mod delete;
pub mod prompt;
pub mod search;
pub mod snowflake;
