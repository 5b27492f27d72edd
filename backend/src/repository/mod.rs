pub mod sessions;
pub mod store;
pub mod tasks;
pub mod users;
