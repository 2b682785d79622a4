//! Version token transport over HTTP headers.
//!
//! Tokens are sent to clients as strong entity tags (`ETag: "<token>"`) and
//! accepted back with or without the surrounding quotes. Writes read the
//! token from `If-Match`, falling back to a request `ETag` header; reads
//! honour `If-None-Match`.

use actix_web::HttpRequest;
use actix_web::http::header::{ETAG, HeaderMap, HeaderName, IF_MATCH, IF_NONE_MATCH};

use crate::domain::VersionToken;

/// Render a token as a strong entity tag.
pub fn entity_tag(token: &VersionToken) -> String {
    format!("\"{token}\"")
}

/// Token presented for a conditional write, if any.
///
/// Blank headers count as absent.
pub fn write_precondition(req: &HttpRequest) -> Option<VersionToken> {
    read_token(req.headers(), &IF_MATCH).or_else(|| read_token(req.headers(), &ETAG))
}

/// Token presented for a conditional read, if any.
pub fn read_precondition(req: &HttpRequest) -> Option<VersionToken> {
    read_token(req.headers(), &IF_NONE_MATCH)
}

fn read_token(headers: &HeaderMap, name: &HeaderName) -> Option<VersionToken> {
    let raw = headers.get(name)?.to_str().ok()?;
    let first = raw.split(',').next()?.trim();
    let unquoted = first
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(first);
    (!unquoted.is_empty()).then(|| VersionToken::new(unquoted))
}
