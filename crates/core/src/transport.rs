//! Outbound HTTP client construction.
//!
//! All network calls (feed fetches, metadata lookups, webhook delivery) go
//! through a client built here, so proxy settings apply uniformly.

use std::time::Duration;

use tracing::warn;

use crate::settings::ProxySettings;

/// Build a reqwest client honoring the given proxy settings.
///
/// An enabled but incompletely configured proxy (missing host or port) is
/// ignored with a warning rather than failing the call.
pub fn build_client(
    proxy: &ProxySettings,
    timeout: Duration,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().timeout(timeout);

    if proxy.enabled {
        match proxy.url() {
            Some(url) => match reqwest::Proxy::all(&url) {
                Ok(p) => builder = builder.proxy(p),
                Err(e) => {
                    warn!(error = %e, "Invalid proxy configuration, ignoring proxy settings")
                }
            },
            None => {
                warn!("Proxy enabled but host/port not configured, ignoring proxy settings")
            }
        }
    }

    builder.build()
}
