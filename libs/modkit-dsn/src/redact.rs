//! Credential masking for connection strings and URIs before they reach logs.

use crate::sqlite::pragmas::keys;

const MASK: &str = "***";

/// Mask the `_auth_pass` value of a normalized connection string.
///
/// Everything else, including parameter order, is left untouched.
pub fn redact_connection_string(dsn: &str) -> String {
    let Some((base, rest)) = dsn.split_once('?') else {
        return dsn.to_string();
    };
    let (query, fragment) = match rest.split_once('#') {
        Some((q, f)) => (q, Some(f)),
        None => (rest, None),
    };

    let query = query
        .split('&')
        .map(|segment| match segment.split_once('=') {
            Some((key, _)) if key == keys::AUTH_PASS => format!("{key}={MASK}"),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    let mut out = format!("{base}?{query}");
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Mask the password of an input connection URI, both in the userinfo and in
/// an explicit `_auth_pass` query parameter.
pub fn redact_uri(uri: &str) -> String {
    match url::Url::parse(uri) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some(MASK));
            }
            redact_connection_string(parsed.as_str())
        }
        Err(_) if uri.contains('@') => MASK.to_string(),
        Err(_) => redact_connection_string(uri),
    }
}
