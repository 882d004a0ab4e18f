//! Persistence-layer implementations of the domain's repository trait.

/// In-memory fake used by both unit tests and the `tests/` integration
/// suite; kept unconditional (not `cfg(test)`-gated) since integration
/// tests link against this crate's lib target without `cfg(test)` active.
pub mod fake;
pub mod postgres;

pub use postgres::PgRepository;
