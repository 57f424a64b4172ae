//! SQLite backend for the payment engine.
mod sqlite_impl;

pub(crate) mod db;

pub use db::db_url;
pub use sqlite_impl::SqliteDatabase;
