use url::Url;
use log::debug;

use crate::config::ConfigError;

/// Derive a WebSocket endpoint from the server origin.
///
/// `http` maps to `ws` and `https` to `wss`; the resource is resolved
/// relative to the origin's path, which is treated as a directory. An origin
/// path without a trailing slash gets one, so `/aesop` plus `ws/remote/`
/// yields `/aesop/ws/remote/` where plain string concatenation of page path
/// and resource would give `/aesopws/remote/`.
///
/// ```
/// use mediaremote::helpers::endpoint::websocket_endpoint;
///
/// let endpoint = websocket_endpoint("http://mediacenter.local:5000/aesop", "ws/remote/").unwrap();
/// assert_eq!(endpoint.as_str(), "ws://mediacenter.local:5000/aesop/ws/remote/");
/// ```
pub fn websocket_endpoint(origin: &str, resource: &str) -> Result<Url, ConfigError> {
    let mut base = Url::parse(origin).map_err(|e| ConfigError::InvalidServer {
        server: origin.to_string(),
        reason: e.to_string(),
    })?;

    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
    };
    if base.set_scheme(scheme).is_err() {
        return Err(ConfigError::UnsupportedScheme(base.scheme().to_string()));
    }

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);

    let endpoint = base
        .join(resource.trim_start_matches('/'))
        .map_err(|e| ConfigError::InvalidServer {
            server: origin.to_string(),
            reason: e.to_string(),
        })?;

    debug!("Endpoint for {} on {}: {}", resource, origin, endpoint);
    Ok(endpoint)
}
