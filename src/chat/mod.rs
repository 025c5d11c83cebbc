//! Chat storage module
//!
//! Handles sessions and messages storage using SQLite, plus conversation
//! history assembly for the completion provider.

pub mod db;
pub mod history;
pub mod models;

pub use db::ChatDb;
pub use models::{Identity, Sender, Session, StoredMessage};
