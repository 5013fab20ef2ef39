//! `sqlite:` URI validation and rewriting.
//!
//! `url` validates the input and yields the host, but the locator, query,
//! fragment and userinfo are taken from the input text as written: the
//! WHATWG parser resolves dot segments and re-encodes, which would change
//! the file the driver opens.

use super::{auth_params, default_params, LOCAL_HOST, OUTPUT_SCHEME};
use crate::descriptor::{ConnectionDescriptor, Driver, NormalizedUri};
use crate::params::{has_valid_escapes, parse_query};
use crate::{DsnError, Result};
use std::collections::BTreeMap;
use url::Url;

/// Rewrite a parsed `sqlite:` URI into a `sqlite3` connection descriptor.
///
/// `raw` is the exact input `parsed` came from.
///
/// Parameter layers, later wins:
/// 1. driver defaults
/// 2. credentials from the userinfo part
/// 3. the URI's own query
/// 4. `overrides`
pub(crate) fn normalize(
    parsed: &Url,
    raw: &str,
    overrides: &BTreeMap<String, String>,
) -> Result<ConnectionDescriptor> {
    let host = authority_host(parsed);
    if !host.trim().is_empty() && host != LOCAL_HOST {
        return Err(DsnError::UnsupportedHost { host });
    }

    let parts = RawParts::split(raw);
    let (opaque, path) = if parts.authority.is_none() && !parts.target.starts_with('/') {
        (parts.target, "")
    } else {
        ("", parts.target)
    };
    if opaque.trim().is_empty() && path.trim().is_empty() {
        return Err(DsnError::MissingPath);
    }

    let path = escape_component(path, "path")?;
    let fragment = escape_component(parts.fragment.unwrap_or_default(), "fragment")?;

    let mut params = default_params();
    if let Some((user, password)) = parts.credentials()? {
        params.extend(&auth_params(&user, password.as_deref()));
    }
    params.extend(parse_query(parts.query.unwrap_or_default())?);
    params.extend(overrides);

    let uri = NormalizedUri::new(OUTPUT_SCHEME, opaque, path, fragment).with_query(&params);

    Ok(ConnectionDescriptor::new(Driver::Sqlite3, uri))
}

/// Pieces of the input URI exactly as written.
#[derive(Debug, PartialEq, Eq)]
struct RawParts<'a> {
    authority: Option<&'a str>,
    target: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

impl<'a> RawParts<'a> {
    fn split(raw: &'a str) -> Self {
        let rest = raw.split_once(':').map_or(raw, |(_, rest)| rest);
        let (rest, fragment) = match rest.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (rest, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (rest, None),
        };

        match rest.strip_prefix("//") {
            Some(after) => {
                let end = after.find('/').unwrap_or(after.len());
                Self {
                    authority: Some(&after[..end]),
                    target: &after[end..],
                    query,
                    fragment,
                }
            }
            None => Self {
                authority: None,
                target: rest,
                query,
                fragment,
            },
        }
    }

    /// Decoded `(user, password)` when the authority carries an `@`, even an
    /// empty userinfo.
    fn credentials(&self) -> Result<Option<(String, Option<String>)>> {
        let Some((userinfo, _)) = self.authority.and_then(|a| a.rsplit_once('@')) else {
            return Ok(None);
        };

        let (user, password) = match userinfo.split_once(':') {
            Some((user, password)) => (user, Some(password)),
            None => (userinfo, None),
        };
        let user = decode_userinfo(user)?;
        let password = password.map(decode_userinfo).transpose()?;
        Ok(Some((user, password)))
    }
}

/// Host as written in the authority, port included.
fn authority_host(parsed: &Url) -> String {
    let host = parsed.host_str().unwrap_or_default();
    match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    }
}

fn decode_userinfo(raw: &str) -> Result<String> {
    if !has_valid_escapes(raw) {
        return Err(DsnError::MalformedUri(
            "invalid percent escape in userinfo".to_string(),
        ));
    }
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| DsnError::MalformedUri(format!("userinfo is not valid UTF-8: {e}")))
}

/// Keep existing escapes and URI-legal characters, percent-encode the rest.
fn escape_component(raw: &str, what: &str) -> Result<String> {
    if !has_valid_escapes(raw) {
        return Err(DsnError::MalformedUri(format!(
            "invalid percent escape in {what}"
        )));
    }

    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || "-._~!$&'()*+,;=:@/%[]?".contains(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    Ok(out)
}
