//! HTTP request handlers organized by functionality

pub mod admin;
pub mod cleanings;
pub mod health;
pub mod sync;
