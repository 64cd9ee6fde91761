//! Test doubles and common utilities for reconciliation contract tests
//!
//! The in-memory provider behaves like a real zone store and records every
//! call, so tests can assert on exactly which provider operations happened.

#![allow(dead_code)]

use hostdns_core::error::{Error, Result};
use hostdns_core::resolver::select_external_ipv4;
use hostdns_core::traits::{DnsProvider, DnsRecord, IpSource, NetInterface, RecordFilter};
use hostdns_core::{EngineConfig, EngineEvent, HostIdentity};
use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// A provider call, as observed by [`InMemoryProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ZoneLookup {
        name: String,
    },
    List {
        zone_id: String,
        name: Option<String>,
    },
    Create {
        zone_id: String,
        record: DnsRecord,
    },
    Update {
        zone_id: String,
        record_id: String,
        record: DnsRecord,
    },
}

/// Provider call to fail on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    ZoneLookup,
    List,
    Create,
    Update,
}

#[derive(Default)]
struct ProviderState {
    zones: HashMap<String, String>,
    records: Vec<(String, DnsRecord)>,
    next_id: usize,
    calls: Vec<ProviderCall>,
    fail_on: Option<FailOn>,
    list_delays: VecDeque<Duration>,
}

/// In-memory DNS provider; clones share state
#[derive(Clone, Default)]
pub struct InMemoryProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone
    pub fn with_zone(self, name: &str, id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .zones
            .insert(name.to_string(), id.to_string());
        self
    }

    /// Store a record without counting it as a call; returns the assigned ID
    pub fn insert_record(&self, zone_id: &str, name: &str, record_type: &str, content: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("rec-{}", state.next_id);
        state.records.push((
            zone_id.to_string(),
            DnsRecord {
                id: Some(id.clone()),
                name: name.to_string(),
                record_type: record_type.to_string(),
                content: content.to_string(),
                ttl: 3600,
            },
        ));
        id
    }

    /// Make every call of the given kind fail
    pub fn fail_on(&self, fail_on: FailOn) {
        self.state.lock().unwrap().fail_on = Some(fail_on);
    }

    /// Delay the next list calls by the given durations, in order
    pub fn delay_lists(&self, delays: impl IntoIterator<Item = Duration>) {
        self.state.lock().unwrap().list_delays.extend(delays);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn zone_lookups(&self) -> usize {
        self.count(|c| matches!(c, ProviderCall::ZoneLookup { .. }))
    }

    pub fn list_calls(&self) -> usize {
        self.count(|c| matches!(c, ProviderCall::List { .. }))
    }

    pub fn creates(&self) -> Vec<DnsRecord> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ProviderCall::Create { record, .. } => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(String, DnsRecord)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ProviderCall::Update {
                    record_id, record, ..
                } => Some((record_id, record)),
                _ => None,
            })
            .collect()
    }

    /// Records currently stored for a name
    pub fn stored(&self, name: &str) -> Vec<DnsRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|(_, r)| r.name == name)
            .map(|(_, r)| r.clone())
            .collect()
    }

    fn count(&self, pred: impl Fn(&ProviderCall) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    fn record_call(&self, call: ProviderCall, kind: FailOn) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.fail_on == Some(kind) {
            return Err(Error::provider("memory", format!("injected {:?} failure", kind)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsProvider for InMemoryProvider {
    async fn zone_id_by_name(&self, zone_name: &str) -> Result<String> {
        self.record_call(
            ProviderCall::ZoneLookup {
                name: zone_name.to_string(),
            },
            FailOn::ZoneLookup,
        )?;
        self.state
            .lock()
            .unwrap()
            .zones
            .get(zone_name)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone_name)))
    }

    async fn list_records(&self, zone_id: &str, filter: &RecordFilter) -> Result<Vec<DnsRecord>> {
        let delay = self.state.lock().unwrap().list_delays.pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.record_call(
            ProviderCall::List {
                zone_id: zone_id.to_string(),
                name: filter.name.clone(),
            },
            FailOn::List,
        )?;

        let state = self.state.lock().unwrap();
        Ok(state
            .records
            .iter()
            .filter(|(zone, r)| zone == zone_id && filter.name.as_ref().is_none_or(|n| &r.name == n))
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn create_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord> {
        self.record_call(
            ProviderCall::Create {
                zone_id: zone_id.to_string(),
                record: record.clone(),
            },
            FailOn::Create,
        )?;

        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = DnsRecord {
            id: Some(format!("rec-{}", state.next_id)),
            ..record.clone()
        };
        state.records.push((zone_id.to_string(), created.clone()));
        Ok(created)
    }

    async fn update_record(&self, zone_id: &str, record_id: &str, record: &DnsRecord) -> Result<()> {
        self.record_call(
            ProviderCall::Update {
                zone_id: zone_id.to_string(),
                record_id: record_id.to_string(),
                record: record.clone(),
            },
            FailOn::Update,
        )?;

        let mut state = self.state.lock().unwrap();
        let stored = state
            .records
            .iter_mut()
            .find(|(zone, r)| zone == zone_id && r.id.as_deref() == Some(record_id))
            .ok_or_else(|| Error::not_found(format!("DNS record not found: {}", record_id)))?;
        stored.1 = DnsRecord {
            id: Some(record_id.to_string()),
            ..record.clone()
        };
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

/// IP source returning a settable address; clones share state
#[derive(Clone)]
pub struct FixedIpSource {
    ip: Arc<Mutex<Ipv4Addr>>,
    call_count: Arc<AtomicUsize>,
}

impl FixedIpSource {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip: Arc::new(Mutex::new(ip)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set(&self, ip: Ipv4Addr) {
        *self.ip.lock().unwrap() = ip;
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(*self.ip.lock().unwrap())
    }

    fn source_name(&self) -> &'static str {
        "fixed"
    }
}

/// IP source selecting from a canned interface table
pub struct InterfaceListIpSource {
    interfaces: Vec<NetInterface>,
}

impl InterfaceListIpSource {
    pub fn new(interfaces: Vec<NetInterface>) -> Self {
        Self { interfaces }
    }

    /// Host with only a loopback device
    pub fn loopback_only() -> Self {
        Self::new(vec![NetInterface::new(
            "lo",
            vec![IpAddr::from([127, 0, 0, 1]), IpAddr::from([0u16, 0, 0, 0, 0, 0, 0, 1])],
        )
        .with_loopback(true)])
    }

    /// Host whose only external interface carries IPv6
    pub fn ipv6_only() -> Self {
        Self::new(vec![NetInterface::new(
            "eth0",
            vec![IpAddr::from([0x2001u16, 0xdb8, 0, 0, 0, 0, 0, 1])],
        )])
    }
}

#[async_trait::async_trait]
impl IpSource for InterfaceListIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        select_external_ipv4(&self.interfaces, None)
    }

    fn source_name(&self) -> &'static str {
        "interface-list"
    }
}

pub const ZONE_NAME: &str = "example.com";
pub const ZONE_ID: &str = "zone-123";
pub const FQDN: &str = "box.example.com";

/// Identity publishing `box.example.com`
pub fn identity() -> HostIdentity {
    HostIdentity::new("box", ZONE_NAME).expect("valid identity")
}

/// Provider with the `example.com` zone registered
pub fn provider_with_zone() -> InMemoryProvider {
    InMemoryProvider::new().with_zone(ZONE_NAME, ZONE_ID)
}

/// Engine config with the given interval and default TTL
pub fn engine_config(interval_secs: u64) -> EngineConfig {
    EngineConfig {
        interval_secs,
        ..EngineConfig::default()
    }
}

/// Collect all events currently buffered in the receiver
pub fn drain(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
