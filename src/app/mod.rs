pub mod database;
pub mod lifecycle;

pub use database::{Database, FindOptions, Page};
pub use lifecycle::{ConnectionState, Lifecycle};
