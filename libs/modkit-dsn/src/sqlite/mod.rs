//! SQLite connection URIs.
//!
//! This module contains SQLite-specific functionality including:
//! - `sqlite:` URI validation and rewriting to the driver's `file:` form
//! - Default driver parameters with typed modes
//! - The credential layer for user-authenticated database files

pub(crate) mod dsn;
pub mod pragmas;

pub(crate) use dsn::normalize;
pub use pragmas::{auth_params, default_params, JournalMode, SyncMode, TxLock};

/// Input scheme handled here.
pub const SCHEME: &str = "sqlite";

/// Scheme of the emitted connection string.
pub const OUTPUT_SCHEME: &str = "file";

/// The only host accepted in the authority.
pub const LOCAL_HOST: &str = "localhost";
