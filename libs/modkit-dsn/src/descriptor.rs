//! Output types: the driver identifier and the normalized connection URI.

use crate::params::{parse_query, QueryParams};
use std::fmt;

/// Downstream driver a connection string is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    /// The embedded file-database driver (`sqlite3`).
    Sqlite3,
}

impl Driver {
    /// Name the driver is registered under.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Driver::Sqlite3 => "sqlite3",
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured connection target produced by normalization.
///
/// `opaque` is set for the `scheme:locator` form, `path` for the
/// `scheme://host/path` and `scheme:/path` forms. Both hold the already
/// percent-encoded text of the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedUri {
    scheme: String,
    opaque: String,
    path: String,
    query: String,
    fragment: String,
}

impl NormalizedUri {
    pub(crate) fn new(
        scheme: impl Into<String>,
        opaque: impl Into<String>,
        path: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            opaque: opaque.into(),
            path: path.into(),
            query: String::new(),
            fragment: fragment.into(),
        }
    }

    /// Attach the serialized parameter set.
    ///
    /// The query is only attached when the URI points somewhere.
    pub(crate) fn with_query(mut self, params: &QueryParams) -> Self {
        if self.has_target() {
            self.query = params.encode();
        }
        self
    }

    /// True when either the opaque locator or the path is non-blank.
    pub fn has_target(&self) -> bool {
        !self.opaque.trim().is_empty() || !self.path.trim().is_empty()
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn opaque(&self) -> Option<&str> {
        (!self.opaque.is_empty()).then_some(self.opaque.as_str())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        (!self.query.is_empty()).then_some(self.query.as_str())
    }

    pub fn fragment(&self) -> Option<&str> {
        (!self.fragment.is_empty()).then_some(self.fragment.as_str())
    }

    /// Decoded value of a query parameter, if present.
    pub fn query_param(&self, key: &str) -> Option<String> {
        parse_query(&self.query)
            .ok()?
            .into_iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl fmt::Display for NormalizedUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.scheme.is_empty() {
            write!(f, "{}:", self.scheme)?;
        }

        if !self.opaque.is_empty() {
            f.write_str(&self.opaque)?;
        } else if self.path.starts_with('/') {
            // Empty authority keeps the path absolute: file:///dir/app.db
            write!(f, "//{}", self.path)?;
        } else {
            f.write_str(&self.path)?;
        }

        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        if !self.fragment.is_empty() {
            write!(f, "#{}", self.fragment)?;
        }
        Ok(())
    }
}

/// Driver name plus the connection string that driver should receive.
///
/// Only built once every validation step has passed. The `Default` value is
/// the empty descriptor: no driver and an empty connection string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    driver: Option<Driver>,
    uri: NormalizedUri,
}

impl ConnectionDescriptor {
    pub(crate) fn new(driver: Driver, uri: NormalizedUri) -> Self {
        Self {
            driver: Some(driver),
            uri,
        }
    }

    /// The empty descriptor returned alongside errors.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.driver.is_none()
    }

    pub fn driver(&self) -> Option<Driver> {
        self.driver
    }

    /// Driver name, `""` for the empty descriptor.
    pub fn driver_name(&self) -> &'static str {
        self.driver.map(|d| d.as_str()).unwrap_or_default()
    }

    pub fn uri(&self) -> &NormalizedUri {
        &self.uri
    }

    /// Connection string to hand to the driver verbatim.
    pub fn connection_string(&self) -> String {
        self.uri.to_string()
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.uri, f)
    }
}
