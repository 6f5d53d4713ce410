//! iplocate - IP geolocation lookup
//!
//! This is the composition root that wires together all the components.

use iplocate::domain::ports::{GeoDatabaseProvider, ReverseDnsResolver};
use iplocate::{
    debug_logging, load_config, HandlePool, HickoryReverseDns, Ip2LocationProvider, LookupOptions,
    LookupService, MaxMindProvider, PoolConfig, ProviderKind,
};
use std::sync::Arc;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    // Setup logging
    let log_level = if debug_logging() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration from environment
    let cfg = load_config()?;

    let addresses: Vec<String> = std::env::args().skip(1).collect();
    if addresses.is_empty() {
        anyhow::bail!("usage: iplocate <ip-address>...");
    }

    // ===== COMPOSITION ROOT =====

    // Database provider
    let provider: Arc<dyn GeoDatabaseProvider> = match cfg.provider {
        ProviderKind::Ip2Location => Arc::new(Ip2LocationProvider::new()),
        ProviderKind::MaxMind => Arc::new(MaxMindProvider::new()),
    };

    // Reverse DNS (hickory, system resolver config)
    let reverse_dns: Arc<dyn ReverseDnsResolver> = Arc::new(HickoryReverseDns::from_system_conf(
        Duration::from_millis(cfg.dns_timeout_ms),
        cfg.dns_attempts,
    )?);

    let options = LookupOptions {
        dns_failure_policy: cfg.dns_failure_policy,
        hostname_separator: cfg.hostname_separator.clone(),
    };

    let mut service = LookupService::new(provider, reverse_dns, options);
    if cfg.cache_handles {
        service = service.with_handle_pool(HandlePool::new(PoolConfig {
            max_lifetime: Duration::from_secs(cfg.handle_max_lifetime_secs),
        }));
    }

    let files = service.configure(&cfg.data_dir)?;
    tracing::info!(
        "starting iplocate provider={:?} data_dir={} ipv4={:?} ipv6={:?}",
        cfg.provider,
        cfg.data_dir,
        files.ipv4,
        files.ipv6
    );

    for address in &addresses {
        let record = service.resolve(address);
        if cfg.json_output {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            println!("{record}");
        }
    }

    Ok(())
}
