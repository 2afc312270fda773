use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Lower bound for the auto-sync interval.
pub const MIN_SYNC_INTERVAL_MINUTES: u32 = 5;

pub(crate) mod keys {
    pub const FEED_URL: &str = "feed_url";
    pub const ADDITIONAL_FEED_URLS: &str = "additional_feed_urls";
    pub const METADATA_API_KEY: &str = "metadata_api_key";
    pub const METADATA_LANGUAGE: &str = "metadata_language";
    pub const PROXY_ENABLED: &str = "proxy_enabled";
    pub const PROXY_PROTOCOL: &str = "proxy_protocol";
    pub const PROXY_HOST: &str = "proxy_host";
    pub const PROXY_PORT: &str = "proxy_port";
    pub const PROXY_USERNAME: &str = "proxy_username";
    pub const PROXY_PASSWORD: &str = "proxy_password";
    pub const AUTO_SYNC_ENABLED: &str = "auto_sync_enabled";
    pub const SYNC_INTERVAL_MINUTES: &str = "sync_interval_minutes";
    pub const WEBHOOK_URL: &str = "webhook_url";
    pub const NOTIFICATIONS_ENABLED: &str = "notifications_enabled";
    pub const ENHANCED_NOTIFICATIONS_ENABLED: &str = "enhanced_notifications_enabled";
}

/// Proxy protocol for outbound HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyProtocol {
    #[default]
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyProtocol::Http => "http",
            ProxyProtocol::Https => "https",
            ProxyProtocol::Socks4 => "socks4",
            ProxyProtocol::Socks5 => "socks5",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "http" => Some(ProxyProtocol::Http),
            "https" => Some(ProxyProtocol::Https),
            "socks4" => Some(ProxyProtocol::Socks4),
            "socks5" => Some(ProxyProtocol::Socks5),
            _ => None,
        }
    }
}

/// Outbound proxy settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    pub enabled: bool,
    pub protocol: ProxyProtocol,
    pub host: String,
    pub port: Option<u16>,
    pub username: String,
    pub password: String,
}

impl ProxySettings {
    /// Whether the proxy is enabled AND usable (host and port configured).
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.host.trim().is_empty() && self.port.is_some()
    }

    /// Proxy URL suitable for an HTTP client, credentials included when set.
    pub fn url(&self) -> Option<String> {
        if !self.is_usable() {
            return None;
        }
        let port = self.port?;
        if !self.username.is_empty() && !self.password.is_empty() {
            Some(format!(
                "{}://{}:{}@{}:{}",
                self.protocol.as_str(),
                self.username,
                self.password,
                self.host,
                port
            ))
        } else {
            Some(format!(
                "{}://{}:{}",
                self.protocol.as_str(),
                self.host,
                port
            ))
        }
    }
}

/// Typed view over the persisted operator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Primary feed URL. Empty means not configured.
    pub feed_url: String,
    /// Additional feed URLs.
    pub additional_feed_urls: Vec<String>,
    /// Metadata provider API key. Empty means not configured.
    pub metadata_api_key: String,
    /// Preferred result language for metadata lookups.
    pub metadata_language: String,
    pub proxy: ProxySettings,
    pub auto_sync_enabled: bool,
    /// Interval between scheduled syncs, clamped to [`MIN_SYNC_INTERVAL_MINUTES`].
    pub sync_interval_minutes: u32,
    /// Notification webhook URL. Empty means not configured.
    pub webhook_url: String,
    pub notifications_enabled: bool,
    /// Include recent additions with artwork in notifications.
    pub enhanced_notifications_enabled: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            feed_url: String::new(),
            additional_feed_urls: Vec::new(),
            metadata_api_key: String::new(),
            metadata_language: "en-US".to_string(),
            proxy: ProxySettings::default(),
            auto_sync_enabled: false,
            sync_interval_minutes: 180,
            webhook_url: String::new(),
            notifications_enabled: false,
            enhanced_notifications_enabled: false,
        }
    }
}

fn parse_bool(map: &HashMap<String, String>, key: &str, default: bool) -> bool {
    match map.get(key).map(String::as_str) {
        Some("true") => true,
        Some("false") => false,
        Some(other) => {
            warn!(key, value = other, "Ignoring non-boolean setting value");
            default
        }
        None => default,
    }
}

fn get_string(map: &HashMap<String, String>, key: &str, default: &str) -> String {
    map.get(key)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| default.to_string())
}

impl SyncSettings {
    /// Build the typed view from the raw string map, falling back to
    /// defaults for missing or malformed values. Lenient on purpose: a bad
    /// value in the settings table must never make the service unstartable.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let defaults = SyncSettings::default();

        let additional_feed_urls = map
            .get(keys::ADDITIONAL_FEED_URLS)
            .and_then(|raw| {
                serde_json::from_str::<Vec<String>>(raw)
                    .map_err(|e| warn!(error = %e, "Ignoring malformed additional feed URL list"))
                    .ok()
            })
            .unwrap_or_default()
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();

        let sync_interval_minutes = map
            .get(keys::SYNC_INTERVAL_MINUTES)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.sync_interval_minutes)
            .max(MIN_SYNC_INTERVAL_MINUTES);

        let proxy = ProxySettings {
            enabled: parse_bool(map, keys::PROXY_ENABLED, false),
            protocol: map
                .get(keys::PROXY_PROTOCOL)
                .and_then(|v| ProxyProtocol::parse(v))
                .unwrap_or_default(),
            host: get_string(map, keys::PROXY_HOST, ""),
            port: map.get(keys::PROXY_PORT).and_then(|v| v.parse().ok()),
            username: get_string(map, keys::PROXY_USERNAME, ""),
            password: get_string(map, keys::PROXY_PASSWORD, ""),
        };

        Self {
            feed_url: get_string(map, keys::FEED_URL, ""),
            additional_feed_urls,
            metadata_api_key: get_string(map, keys::METADATA_API_KEY, ""),
            metadata_language: get_string(map, keys::METADATA_LANGUAGE, &defaults.metadata_language),
            proxy,
            auto_sync_enabled: parse_bool(map, keys::AUTO_SYNC_ENABLED, false),
            sync_interval_minutes,
            webhook_url: get_string(map, keys::WEBHOOK_URL, ""),
            notifications_enabled: parse_bool(map, keys::NOTIFICATIONS_ENABLED, false),
            enhanced_notifications_enabled: parse_bool(
                map,
                keys::ENHANCED_NOTIFICATIONS_ENABLED,
                false,
            ),
        }
    }

    /// Flatten back into the raw string map for persistence.
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(keys::FEED_URL.to_string(), self.feed_url.clone());
        map.insert(
            keys::ADDITIONAL_FEED_URLS.to_string(),
            serde_json::to_string(&self.additional_feed_urls).unwrap_or_else(|_| "[]".to_string()),
        );
        map.insert(
            keys::METADATA_API_KEY.to_string(),
            self.metadata_api_key.clone(),
        );
        map.insert(
            keys::METADATA_LANGUAGE.to_string(),
            self.metadata_language.clone(),
        );
        map.insert(
            keys::PROXY_ENABLED.to_string(),
            self.proxy.enabled.to_string(),
        );
        map.insert(
            keys::PROXY_PROTOCOL.to_string(),
            self.proxy.protocol.as_str().to_string(),
        );
        map.insert(keys::PROXY_HOST.to_string(), self.proxy.host.clone());
        map.insert(
            keys::PROXY_PORT.to_string(),
            self.proxy.port.map(|p| p.to_string()).unwrap_or_default(),
        );
        map.insert(
            keys::PROXY_USERNAME.to_string(),
            self.proxy.username.clone(),
        );
        map.insert(
            keys::PROXY_PASSWORD.to_string(),
            self.proxy.password.clone(),
        );
        map.insert(
            keys::AUTO_SYNC_ENABLED.to_string(),
            self.auto_sync_enabled.to_string(),
        );
        map.insert(
            keys::SYNC_INTERVAL_MINUTES.to_string(),
            self.sync_interval_minutes.to_string(),
        );
        map.insert(keys::WEBHOOK_URL.to_string(), self.webhook_url.clone());
        map.insert(
            keys::NOTIFICATIONS_ENABLED.to_string(),
            self.notifications_enabled.to_string(),
        );
        map.insert(
            keys::ENHANCED_NOTIFICATIONS_ENABLED.to_string(),
            self.enhanced_notifications_enabled.to_string(),
        );
        map
    }
}

/// Sanitized settings for API responses (secrets redacted).
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSettings {
    pub feed_url: String,
    pub additional_feed_urls: Vec<String>,
    pub metadata_api_key_configured: bool,
    pub metadata_language: String,
    pub proxy: SanitizedProxySettings,
    pub auto_sync_enabled: bool,
    pub sync_interval_minutes: u32,
    pub webhook_url_configured: bool,
    pub notifications_enabled: bool,
    pub enhanced_notifications_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProxySettings {
    pub enabled: bool,
    pub protocol: String,
    pub host: String,
    pub port: Option<u16>,
    pub username: String,
    pub password_configured: bool,
}

impl From<&SyncSettings> for SanitizedSettings {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            feed_url: settings.feed_url.clone(),
            additional_feed_urls: settings.additional_feed_urls.clone(),
            metadata_api_key_configured: !settings.metadata_api_key.is_empty(),
            metadata_language: settings.metadata_language.clone(),
            proxy: SanitizedProxySettings {
                enabled: settings.proxy.enabled,
                protocol: settings.proxy.protocol.as_str().to_string(),
                host: settings.proxy.host.clone(),
                port: settings.proxy.port,
                username: settings.proxy.username.clone(),
                password_configured: !settings.proxy.password.is_empty(),
            },
            auto_sync_enabled: settings.auto_sync_enabled,
            sync_interval_minutes: settings.sync_interval_minutes,
            webhook_url_configured: !settings.webhook_url.is_empty(),
            notifications_enabled: settings.notifications_enabled,
            enhanced_notifications_enabled: settings.enhanced_notifications_enabled,
        }
    }
}
