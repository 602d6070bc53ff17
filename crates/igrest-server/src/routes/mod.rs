//! Route handlers grouped by resource.

pub mod auth;
pub mod insights;
pub mod media;
pub mod story;
pub mod user;
