//! # Hobby Helper Common Library
//!
//! Shared code for the Hobby Helper API service and its maintenance tool:
//! - Database initialization, migrations and row models
//! - Password hashing and JWT token handling
//! - Bootstrap configuration loading
//! - The mood vocabulary and mood inference from tags
//! - Time utilities

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod mood;
pub mod time;

pub use error::{Error, Result};
pub use mood::Mood;
