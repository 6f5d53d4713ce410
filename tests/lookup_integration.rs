//! Integration tests for data file discovery and lookups
//!
//! Uses temporary data directories with placeholder database files and
//! in-memory database/resolver implementations.

use iplocate::domain::ports::{FileLayout, GeoDatabase, GeoDatabaseProvider, ReverseDnsResolver};
use iplocate::{
    AddressFamily, DataFiles, DnsFailurePolicy, GeoFields, HandlePool, Ip2LocationProvider,
    LookupError, LookupOptions, LookupService,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::File;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_test::traced_test;

/// Database whose contents are keyed by address, shared by every handle.
struct TableDb {
    rows: Arc<HashMap<IpAddr, GeoFields>>,
}

impl GeoDatabase for TableDb {
    fn query(&self, ip: IpAddr) -> Result<Option<GeoFields>, LookupError> {
        Ok(self.rows.get(&ip).cloned())
    }
}

/// Provider that only opens files that exist on disk, like a real reader.
struct TableProvider {
    rows: Arc<HashMap<IpAddr, GeoFields>>,
    opened: Mutex<Vec<PathBuf>>,
}

impl TableProvider {
    fn new(rows: Vec<(&str, GeoFields)>) -> Self {
        let rows = rows
            .into_iter()
            .map(|(ip, fields)| (ip.parse().unwrap(), fields))
            .collect();
        Self {
            rows: Arc::new(rows),
            opened: Mutex::new(Vec::new()),
        }
    }

    fn opened_names(&self) -> Vec<String> {
        self.opened
            .lock()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}

impl GeoDatabaseProvider for TableProvider {
    fn name(&self) -> &'static str {
        "table"
    }

    fn layout(&self) -> FileLayout {
        Ip2LocationProvider::new().layout()
    }

    fn open(&self, path: &Path) -> Result<Arc<dyn GeoDatabase>, LookupError> {
        if !path.is_file() {
            return Err(LookupError::DatabaseOpen {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            });
        }
        self.opened.lock().push(path.to_path_buf());
        Ok(Arc::new(TableDb {
            rows: self.rows.clone(),
        }))
    }
}

struct StaticDns(Result<Vec<String>, LookupError>);

impl ReverseDnsResolver for StaticDns {
    fn reverse_lookup(&self, _ip: IpAddr) -> Result<Vec<String>, LookupError> {
        self.0.clone()
    }
}

fn fields(country: &str, city: &str) -> GeoFields {
    GeoFields {
        country_short: country.to_string(),
        country_long: format!("{country} (long)"),
        region: "Region".to_string(),
        city: city.to_string(),
        latitude: 1.5,
        longitude: -2.25,
        zipcode: "00000".to_string(),
        timezone: "+00:00".to_string(),
        elevation: 10.0,
    }
}

fn data_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        File::create(dir.path().join(name)).unwrap();
    }
    dir
}

fn rows() -> Vec<(&'static str, GeoFields)> {
    vec![
        ("8.8.8.8", fields("US", "Mountain View")),
        ("2001:4860:4860::8888", fields("US", "Mountain View")),
        ("1.1.1.1", fields("AU", "Brisbane")),
    ]
}

fn dns_ok() -> Arc<StaticDns> {
    Arc::new(StaticDns(Ok(vec!["dns.google.".to_string()])))
}

/// Configure, then resolve both families against the discovered files
#[test]
fn test_configure_and_resolve_both_families() {
    let dir = data_dir(&[
        "IP2LOCATION-LITE-DB11.IPV6.BIN",
        "IP2LOCATION-LITE-DB11.BIN",
        "README_LITE.TXT",
    ]);
    let provider = Arc::new(TableProvider::new(rows()));
    let service = LookupService::new(provider.clone(), dns_ok(), LookupOptions::default());

    let files = service.configure(dir.path()).unwrap();
    assert_eq!(files.ipv4, "IP2LOCATION-LITE-DB11.BIN");
    assert_eq!(files.ipv6, "IP2LOCATION-LITE-DB11.IPV6.BIN");

    let v4 = service.resolve("8.8.8.8");
    assert_eq!(v4.address, "8.8.8.8");
    assert_eq!(v4.family, Some(AddressFamily::Ipv4));
    assert_eq!(v4.city, "Mountain View");
    assert_eq!(v4.hostname, "dns.google.");

    let v6 = service.resolve("2001:4860:4860::8888");
    assert_eq!(v6.family, Some(AddressFamily::Ipv6));
    assert_eq!(v6.country_short, "US");

    assert_eq!(
        provider.opened_names(),
        vec![
            "IP2LOCATION-LITE-DB11.BIN".to_string(),
            "IP2LOCATION-LITE-DB11.IPV6.BIN".to_string()
        ]
    );
}

/// Country lookups short-circuit local addresses
#[test]
fn test_lookup_country_sentinels_and_codes() {
    let dir = data_dir(&["DB.BIN", "DB.IPV6.BIN"]);
    let provider = Arc::new(TableProvider::new(rows()));
    let service = LookupService::new(provider.clone(), dns_ok(), LookupOptions::default());
    service.configure(dir.path()).unwrap();

    assert_eq!(service.lookup_country("127.0.0.1").unwrap().to_string(), "Loopback address");
    assert_eq!(service.lookup_country("::1").unwrap().to_string(), "Loopback address");
    assert_eq!(service.lookup_country("192.168.1.1").unwrap().to_string(), "Private address");
    assert_eq!(service.lookup_country("fd00::1").unwrap().to_string(), "Private address");
    assert!(provider.opened_names().is_empty());

    assert_eq!(service.lookup_country("1.1.1.1").unwrap().to_string(), "AU");
    assert!(matches!(
        service.lookup_country("not-an-ip"),
        Err(LookupError::InvalidAddress(_))
    ));
}

/// A directory without database files configures but cannot resolve
#[test]
fn test_directory_without_databases() {
    let dir = data_dir(&["notes.txt"]);
    let service = LookupService::new(
        Arc::new(TableProvider::new(rows())),
        dns_ok(),
        LookupOptions::default(),
    );

    let files = service.configure(dir.path()).unwrap();
    assert!(files.ipv4.is_empty());
    assert!(files.ipv6.is_empty());

    assert!(matches!(
        service.try_resolve("8.8.8.8"),
        Err(LookupError::Configuration(_))
    ));
    assert!(service.resolve("8.8.8.8").is_empty());
}

/// An unreadable directory surfaces a configuration error and leaves the
/// service unusable
#[test]
fn test_unreadable_directory() {
    let service = LookupService::new(
        Arc::new(TableProvider::new(rows())),
        dns_ok(),
        LookupOptions::default(),
    );

    let result = service.configure("/nonexistent/iplocate-data");
    assert!(matches!(result, Err(LookupError::Configuration(_))));
    assert_eq!(
        service.data_files(),
        DataFiles::unconfigured("/nonexistent/iplocate-data")
    );
    assert!(service.resolve("8.8.8.8").is_empty());
}

/// Reconfiguring switches databases for subsequent lookups
#[test]
fn test_reconfigure_switches_files() {
    let first = data_dir(&["OLD-DB1.BIN"]);
    let second = data_dir(&["NEW-DB11.BIN"]);
    let provider = Arc::new(TableProvider::new(rows()));
    let service = LookupService::new(provider.clone(), dns_ok(), LookupOptions::default())
        .with_handle_pool(HandlePool::default());

    service.configure(first.path()).unwrap();
    service.resolve("8.8.8.8");
    service.resolve("1.1.1.1");

    service.configure(second.path()).unwrap();
    service.resolve("8.8.8.8");

    assert_eq!(
        provider.opened_names(),
        vec!["OLD-DB1.BIN".to_string(), "NEW-DB11.BIN".to_string()]
    );
}

/// Database file vanishing after discovery fails at open time
#[test]
fn test_database_removed_after_configure() {
    let dir = data_dir(&["DB.BIN"]);
    let service = LookupService::new(
        Arc::new(TableProvider::new(rows())),
        dns_ok(),
        LookupOptions::default(),
    );
    service.configure(dir.path()).unwrap();

    std::fs::remove_file(dir.path().join("DB.BIN")).unwrap();

    assert!(matches!(
        service.try_resolve("8.8.8.8"),
        Err(LookupError::DatabaseOpen { .. })
    ));
}

/// Address without a database row is "not found", not an error
#[test]
fn test_unknown_address_is_not_found() {
    let dir = data_dir(&["DB.BIN"]);
    let service = LookupService::new(
        Arc::new(TableProvider::new(rows())),
        dns_ok(),
        LookupOptions::default(),
    );
    service.configure(dir.path()).unwrap();

    assert_eq!(service.try_resolve("9.9.9.9").unwrap(), None);
}

/// Reverse DNS failure with the default policy keeps geo data
#[test]
#[traced_test]
fn test_dns_failure_keeps_geo_by_default() {
    let dir = data_dir(&["DB.BIN"]);
    let dns = Arc::new(StaticDns(Err(LookupError::ReverseDns {
        address: "8.8.8.8".parse().unwrap(),
        reason: "timed out".to_string(),
    })));
    let service = LookupService::new(
        Arc::new(TableProvider::new(rows())),
        dns,
        LookupOptions::default(),
    );
    service.configure(dir.path()).unwrap();

    let record = service.resolve("8.8.8.8");
    assert_eq!(record.country_short, "US");
    assert!(record.hostname.is_empty());
    assert!(logs_contain("without hostname"));
}

/// Reverse DNS failure with the discard policy zeroes the record
#[test]
#[traced_test]
fn test_dns_failure_discard_policy() {
    let dir = data_dir(&["DB.BIN"]);
    let dns = Arc::new(StaticDns(Err(LookupError::ReverseDns {
        address: "8.8.8.8".parse().unwrap(),
        reason: "timed out".to_string(),
    })));
    let service = LookupService::new(
        Arc::new(TableProvider::new(rows())),
        dns,
        LookupOptions {
            dns_failure_policy: DnsFailurePolicy::Discard,
            ..Default::default()
        },
    );
    service.configure(dir.path()).unwrap();

    assert!(service.resolve("8.8.8.8").is_empty());
    assert!(logs_contain("reverse DNS lookup for 8.8.8.8 failed"));
}

/// Lookups and reconfiguration from several threads
#[test]
fn test_concurrent_lookups_and_reconfigure() {
    let dir = data_dir(&["DB.BIN", "DB.IPV6.BIN"]);
    let service = Arc::new(LookupService::new(
        Arc::new(TableProvider::new(rows())),
        dns_ok(),
        LookupOptions::default(),
    ));
    service.configure(dir.path()).unwrap();

    let mut threads = Vec::new();
    for i in 0..4 {
        let service = service.clone();
        let path = dir.path().to_path_buf();
        threads.push(std::thread::spawn(move || {
            for _ in 0..25 {
                if i == 0 {
                    service.configure(&path).unwrap();
                }
                let record = service.resolve("1.1.1.1");
                assert_eq!(record.city, "Brisbane");
            }
        }));
    }

    for t in threads {
        t.join().unwrap();
    }
}
