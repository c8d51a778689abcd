//! Storage layer for breathe.
//!
//! SQLite-based persistence for practice session history.

mod database;
mod migrations;

pub use database::Database;
