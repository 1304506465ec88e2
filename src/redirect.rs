//! Helpers for the `redirect_url` query parameter used to return to the
//! page an edit or delete was started from.

use axum::http::Uri;
use serde::Deserialize;

/// The query parameters of a request that may redirect once it is done.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Accept `raw_url` only if it is a path on this site, e.g. "/transactions?page=2".
///
/// Returns the path and query of `raw_url`, or `None` for absolute URLs and
/// protocol relative URLs such as "//example.com".
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();

    (path_and_query.starts_with('/') && !path_and_query.starts_with("//"))
        .then(|| path_and_query.to_owned())
}

/// Append `redirect_url` to `endpoint` as the `redirect_url` query parameter.
///
/// Returns `endpoint` unchanged if the redirect URL cannot be encoded.
pub fn with_redirect_url(endpoint: &str, redirect_url: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", redirect_url)]) {
        Ok(param) => format!("{endpoint}?{param}"),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_url}: {error}");
            endpoint.to_owned()
        }
    }
}
