// src/lib.rs

//! postwatch library
//!
//! Watches markdown job-listing tables in git repositories and turns newly
//! added rows into notifications.

pub mod delivery;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod storage;
pub mod utils;
