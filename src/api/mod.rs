//! API module
//!
//! Contains the HTTP request handlers for the chat gateway endpoints

pub mod chat;
pub mod sessions;
pub mod streaming;
pub mod utils;
