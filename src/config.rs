use crate::domain::value_objects::DnsFailurePolicy;

/// Which database reader to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ip2Location,
    MaxMind,
}

impl ProviderKind {
    /// Parse a provider name. Unknown names fall back to IP2Location with a
    /// warning.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "maxmind" | "mmdb" | "geoip2" => Self::MaxMind,
            "ip2location" | "bin" | "" => Self::Ip2Location,
            other => {
                tracing::warn!(
                    "unknown IPLOCATE_PROVIDER {:?}, using ip2location",
                    other
                );
                Self::Ip2Location
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: String,
    pub provider: ProviderKind,

    // Reverse DNS settings
    pub dns_timeout_ms: u64,
    pub dns_attempts: usize,
    pub dns_failure_policy: DnsFailurePolicy,
    pub hostname_separator: String,

    // Handle pool settings
    pub cache_handles: bool,
    pub handle_max_lifetime_secs: u64,

    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "./data/".to_string(),
            provider: ProviderKind::Ip2Location,
            dns_timeout_ms: 5000,
            dns_attempts: 2,
            dns_failure_policy: DnsFailurePolicy::KeepGeo,
            hostname_separator: ".".to_string(),
            cache_handles: false,
            handle_max_lifetime_secs: 3600,
            json_output: false,
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let data_dir = std::env::var("IPLOCATE_DATA_DIR")
        .unwrap_or_else(|_| "./data/".to_string());

    let provider = std::env::var("IPLOCATE_PROVIDER")
        .map(|v| ProviderKind::from_str(&v))
        .unwrap_or(ProviderKind::Ip2Location);

    // Reverse DNS settings
    let dns_timeout_ms = std::env::var("IPLOCATE_DNS_TIMEOUT_MS")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .unwrap_or(5000);

    let dns_attempts = std::env::var("IPLOCATE_DNS_ATTEMPTS")
        .unwrap_or_else(|_| "2".to_string())
        .parse()
        .unwrap_or(2);

    let dns_failure_policy = std::env::var("IPLOCATE_DNS_FAILURE_POLICY")
        .map(|v| DnsFailurePolicy::from_str(&v))
        .unwrap_or_default();

    let hostname_separator = std::env::var("IPLOCATE_HOSTNAME_SEPARATOR")
        .unwrap_or_else(|_| ".".to_string());

    // Handle pool settings
    let cache_handles = std::env::var("IPLOCATE_CACHE_HANDLES")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);

    let handle_max_lifetime_secs = std::env::var("IPLOCATE_HANDLE_MAX_LIFETIME_SECS")
        .unwrap_or_else(|_| "3600".to_string())
        .parse()
        .unwrap_or(3600);

    let json_output = std::env::var("IPLOCATE_OUTPUT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    Ok(Config {
        data_dir,
        provider,
        dns_timeout_ms,
        dns_attempts,
        dns_failure_policy,
        hostname_separator,
        cache_handles,
        handle_max_lifetime_secs,
        json_output,
    })
}

/// Debug logging is on when `DEBUG` is set. Read separately from
/// [`load_config`] so logging can be installed before the config is parsed.
pub fn debug_logging() -> bool {
    std::env::var("DEBUG").is_ok()
}
