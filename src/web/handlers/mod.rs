pub mod auth;
pub mod posts;
pub mod public;
pub mod uploads;
pub mod users;
