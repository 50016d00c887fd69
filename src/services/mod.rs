pub mod auth;
pub mod posts;
pub mod slug;
pub mod uploads;
pub mod users;
