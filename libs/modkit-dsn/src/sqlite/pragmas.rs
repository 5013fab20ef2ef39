//! Baseline sqlite3 driver parameters with typed values.

use crate::params::QueryParams;
use std::fmt;

/// Parameter keys understood by the sqlite3 driver.
pub mod keys {
    pub const CACHE_SIZE: &str = "_cache_size";
    pub const FOREIGN_KEYS: &str = "_fk";
    pub const JOURNAL: &str = "_journal";
    pub const SYNC: &str = "_sync";
    pub const BUSY_TIMEOUT: &str = "_timeout";
    pub const TX_LOCK: &str = "_txlock";

    pub const AUTH: &str = "_auth";
    pub const AUTH_USER: &str = "_auth_user";
    pub const AUTH_PASS: &str = "_auth_pass";
    pub const AUTH_CRYPT: &str = "_auth_crypt";
    pub const AUTH_SALT: &str = "_auth_salt";
}

/// Negative values are KiB: roughly 20MB of page cache instead of the 2MB default.
pub const DEFAULT_CACHE_SIZE: i64 = -20_000;

/// Lock wait before the driver surfaces SQLITE_BUSY.
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

/// Password hash algorithm for encrypted database files.
pub const AUTH_CRYPT: &str = "SHA256";

/// Salted hash scheme for encrypted database files.
pub const AUTH_SALT: &str = "SSHA256";

/// SQLite journal mode options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JournalMode {
    Delete,
    Truncate,
    Persist,
    Memory,
    Wal,
    Off,
}

impl JournalMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Persist => "PERSIST",
            JournalMode::Memory => "MEMORY",
            JournalMode::Wal => "WAL",
            JournalMode::Off => "OFF",
        }
    }
}

/// SQLite synchronous mode options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    Off,
    Normal,
    Full,
    Extra,
}

impl SyncMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Off => "OFF",
            SyncMode::Normal => "NORMAL",
            SyncMode::Full => "FULL",
            SyncMode::Extra => "EXTRA",
        }
    }
}

/// Lock taken by `BEGIN`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxLock {
    Deferred,
    Immediate,
    Exclusive,
}

impl TxLock {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TxLock::Deferred => "deferred",
            TxLock::Immediate => "immediate",
            TxLock::Exclusive => "exclusive",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )*};
}

display_as_str!(JournalMode, SyncMode, TxLock);

/// Defaults every sqlite connection string starts from.
///
/// | key | value |
/// |---|---|
/// | `_cache_size` | `-20000` |
/// | `_fk` | `1` |
/// | `_journal` | `WAL` |
/// | `_sync` | `NORMAL` |
/// | `_timeout` | `5000` |
/// | `_txlock` | `immediate` |
pub fn default_params() -> QueryParams {
    let mut params = QueryParams::new();
    params.set(keys::CACHE_SIZE, DEFAULT_CACHE_SIZE.to_string());
    params.set(keys::FOREIGN_KEYS, "1");
    params.set(keys::JOURNAL, JournalMode::Wal.as_str());
    params.set(keys::SYNC, SyncMode::Normal.as_str());
    params.set(keys::BUSY_TIMEOUT, DEFAULT_BUSY_TIMEOUT_MS.to_string());
    // Take the write lock at BEGIN so concurrent writers wait on _timeout
    // instead of failing on lock upgrade.
    params.set(keys::TX_LOCK, TxLock::Immediate.as_str());
    params
}

/// Credential layer for user-authenticated database files.
///
/// `_auth_pass` is only present when a password was supplied.
pub fn auth_params(user: &str, password: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();
    params.set(keys::AUTH, "");
    params.set(keys::AUTH_USER, user);
    if let Some(password) = password {
        params.set(keys::AUTH_PASS, password);
    }
    params.set(keys::AUTH_CRYPT, AUTH_CRYPT);
    params.set(keys::AUTH_SALT, AUTH_SALT);
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = default_params();
        assert_eq!(params.len(), 6);
        assert_eq!(params.get("_cache_size"), Some("-20000"));
        assert_eq!(params.get("_fk"), Some("1"));
        assert_eq!(params.get("_journal"), Some("WAL"));
        assert_eq!(params.get("_sync"), Some("NORMAL"));
        assert_eq!(params.get("_timeout"), Some("5000"));
        assert_eq!(params.get("_txlock"), Some("immediate"));
    }

    #[test]
    fn test_auth_params_with_password() {
        let params = auth_params("root", Some("secret"));
        assert_eq!(
            params.encode(),
            "_auth=&_auth_crypt=SHA256&_auth_pass=secret&_auth_salt=SSHA256&_auth_user=root"
        );
    }

    #[test]
    fn test_auth_params_without_password() {
        let params = auth_params("root", None);
        assert!(!params.contains_key("_auth_pass"));
        assert_eq!(params.get("_auth_user"), Some("root"));
        assert_eq!(params.get("_auth"), Some(""));
    }

    #[test]
    fn test_mode_rendering() {
        assert_eq!(JournalMode::Delete.to_string(), "DELETE");
        assert_eq!(SyncMode::Full.to_string(), "FULL");
        assert_eq!(TxLock::Deferred.to_string(), "deferred");
    }
}
