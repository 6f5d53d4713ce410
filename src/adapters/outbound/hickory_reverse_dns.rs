//! Hickory Reverse DNS Resolver
//!
//! Implements ReverseDnsResolver with hickory's blocking resolver. PTR
//! names keep their trailing dot.

use crate::domain::errors::LookupError;
use crate::domain::ports::ReverseDnsResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::Resolver;
use std::net::IpAddr;
use std::time::Duration;

/// Reverse DNS over hickory-resolver.
pub struct HickoryReverseDns {
    resolver: Resolver,
}

impl HickoryReverseDns {
    /// Resolver using the system configuration (`/etc/resolv.conf` on
    /// Unix), falling back to hickory's defaults if it cannot be read.
    pub fn from_system_conf(timeout: Duration, attempts: usize) -> anyhow::Result<Self> {
        let (config, opts) = match hickory_resolver::system_conf::read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                tracing::warn!("cannot read system resolver config, using defaults: {}", e);
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self::with_opts(config, opts, timeout, attempts)
    }

    /// Resolver with an explicit upstream configuration.
    pub fn new(config: ResolverConfig, timeout: Duration, attempts: usize) -> anyhow::Result<Self> {
        Self::with_opts(config, ResolverOpts::default(), timeout, attempts)
    }

    fn with_opts(
        config: ResolverConfig,
        mut opts: ResolverOpts,
        timeout: Duration,
        attempts: usize,
    ) -> anyhow::Result<Self> {
        opts.timeout = timeout;
        opts.attempts = attempts;
        let resolver = Resolver::new(config, opts)?;
        Ok(Self { resolver })
    }
}

impl ReverseDnsResolver for HickoryReverseDns {
    fn reverse_lookup(&self, ip: IpAddr) -> Result<Vec<String>, LookupError> {
        match self.resolver.reverse_lookup(ip) {
            Ok(lookup) => {
                let names: Vec<String> = lookup.iter().map(|ptr| ptr.to_string()).collect();
                tracing::debug!("reverse lookup {} -> {:?}", ip, names);
                Ok(names)
            }
            Err(e) => {
                let reason = match e.kind() {
                    ResolveErrorKind::NoRecordsFound { .. } => format!("no PTR records: {e}"),
                    _ => e.to_string(),
                };
                Err(LookupError::ReverseDns {
                    address: ip,
                    reason,
                })
            }
        }
    }
}
