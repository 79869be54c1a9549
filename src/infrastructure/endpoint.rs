use crate::types::{RealtimeError, Result};
use url::Url;

/// Parses the realtime endpoint, rewriting `http(s)://` to `ws(s)://`.
///
/// The storefront configures its API base URL; the realtime endpoint lives
/// on the same host, so both forms are accepted.
pub fn to_ws_endpoint(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;

    let scheme = match url.scheme() {
        "ws" | "wss" => return Ok(url),
        "http" => "ws",
        "https" => "wss",
        other => {
            return Err(RealtimeError::InvalidEndpoint(format!(
                "unsupported scheme '{}' in {}",
                other, raw
            )));
        }
    };

    url.set_scheme(scheme)
        .map_err(|_| RealtimeError::InvalidEndpoint(raw.to_string()))?;
    Ok(url)
}
