//! Core registration domain: schedules, the enrollment cache, the
//! enrollment engine, the registration lifecycle, and the persistence
//! bridge they depend on.

pub mod cache;
pub mod engine;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod persistence;
pub mod schedule;
