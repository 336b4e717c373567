//! # Cluster Configuration
//!
//! Tunables for a cluster, built in code with consuming `with_*` methods or
//! loaded from a TOML document. Every value has a default; durations in files
//! are given in milliseconds.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cluster::kind::{Kind, KindRegistry};
use crate::cluster::strategy::{MemberStrategy, RoundRobinStrategy};
use crate::cluster::Cluster;
use crate::errors::ConfigError;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:0";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUESTS_LOG_THROTTLE_PERIOD: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_EVENTS_IN_REQUEST_LOG_THROTTLE_PERIOD: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_GOSSIP_INTERVAL: Duration = Duration::from_millis(300);
pub const DEFAULT_GOSSIP_REQUEST_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_GOSSIP_FAN_OUT: u32 = 3;
pub const DEFAULT_GOSSIP_MAX_SEND: u32 = 50;

/// Builds the member strategy for a kind that did not bring its own.
pub type MemberStrategyBuilder = Arc<dyn Fn(&Cluster, &str) -> Arc<dyn MemberStrategy> + Send + Sync>;

/// Strategy used when neither the kind nor the config provide one: a
/// round-robin over this member alone.
pub fn default_member_strategy(cluster: &Cluster, _kind: &str) -> Arc<dyn MemberStrategy> {
    Arc::new(RoundRobinStrategy::with_member(cluster.address()))
}

#[derive(Clone)]
pub struct ClusterConfig {
    pub name: String,
    pub address: String,
    pub request_timeout: Duration,
    pub requests_log_throttle_period: Duration,
    pub max_number_of_events_in_request_log_throttle_period: u32,
    pub member_strategy_builder: MemberStrategyBuilder,
    pub kinds: KindRegistry,
    pub timeout: Duration,
    pub gossip_interval: Duration,
    pub gossip_request_timeout: Duration,
    pub gossip_fan_out: u32,
    pub gossip_max_send: u32,
}

impl ClusterConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: DEFAULT_ADDRESS.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            requests_log_throttle_period: DEFAULT_REQUESTS_LOG_THROTTLE_PERIOD,
            max_number_of_events_in_request_log_throttle_period:
                DEFAULT_MAX_EVENTS_IN_REQUEST_LOG_THROTTLE_PERIOD,
            member_strategy_builder: Arc::new(default_member_strategy),
            kinds: KindRegistry::new(),
            timeout: DEFAULT_TIMEOUT,
            gossip_interval: DEFAULT_GOSSIP_INTERVAL,
            gossip_request_timeout: DEFAULT_GOSSIP_REQUEST_TIMEOUT,
            gossip_fan_out: DEFAULT_GOSSIP_FAN_OUT,
            gossip_max_send: DEFAULT_GOSSIP_MAX_SEND,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_requests_log_throttle_period(mut self, period: Duration) -> Self {
        self.requests_log_throttle_period = period;
        self
    }

    pub fn with_max_number_of_events_in_request_log_throttle_period(mut self, max: u32) -> Self {
        self.max_number_of_events_in_request_log_throttle_period = max;
        self
    }

    pub fn with_member_strategy_builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(&Cluster, &str) -> Arc<dyn MemberStrategy> + Send + Sync + 'static,
    {
        self.member_strategy_builder = Arc::new(builder);
        self
    }

    /// Registers each kind in order; a later kind replaces an earlier one with
    /// the same name.
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = Kind>) -> Self {
        for kind in kinds {
            self.kinds.register(kind);
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_gossip_interval(mut self, interval: Duration) -> Self {
        self.gossip_interval = interval;
        self
    }

    pub fn with_gossip_request_timeout(mut self, timeout: Duration) -> Self {
        self.gossip_request_timeout = timeout;
        self
    }

    pub fn with_gossip_fan_out(mut self, fan_out: u32) -> Self {
        self.gossip_fan_out = fan_out;
        self
    }

    pub fn with_gossip_max_send(mut self, max_send: u32) -> Self {
        self.gossip_max_send = max_send;
        self
    }

    /// The request-related subset of the config.
    pub fn to_cluster_context_config(&self) -> ClusterContextConfig {
        ClusterContextConfig {
            request_timeout: self.request_timeout,
            requests_log_throttle_period: self.requests_log_throttle_period,
            max_number_of_events_in_request_log_throttle_period: self
                .max_number_of_events_in_request_log_throttle_period,
        }
    }

    /// Parses tunables from TOML. Kinds and the member strategy builder are
    /// code-only and keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ClusterConfigFile = toml::from_str(content)?;
        Ok(file.into_config())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading cluster config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

impl fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("request_timeout", &self.request_timeout)
            .field("requests_log_throttle_period", &self.requests_log_throttle_period)
            .field(
                "max_number_of_events_in_request_log_throttle_period",
                &self.max_number_of_events_in_request_log_throttle_period,
            )
            .field("kinds", &self.kinds.names())
            .field("timeout", &self.timeout)
            .field("gossip_interval", &self.gossip_interval)
            .field("gossip_request_timeout", &self.gossip_request_timeout)
            .field("gossip_fan_out", &self.gossip_fan_out)
            .field("gossip_max_send", &self.gossip_max_send)
            .finish()
    }
}

/// Settings the request path needs, projected out of [`ClusterConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterContextConfig {
    pub request_timeout: Duration,
    pub requests_log_throttle_period: Duration,
    pub max_number_of_events_in_request_log_throttle_period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ClusterConfigFile {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_address")]
    address: String,
    #[serde(default = "default_request_timeout_ms")]
    request_timeout_ms: u64,
    #[serde(default = "default_requests_log_throttle_period_ms")]
    requests_log_throttle_period_ms: u64,
    #[serde(default = "default_max_events")]
    max_number_of_events_in_request_log_throttle_period: u32,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
    #[serde(default = "default_gossip_interval_ms")]
    gossip_interval_ms: u64,
    #[serde(default = "default_gossip_request_timeout_ms")]
    gossip_request_timeout_ms: u64,
    #[serde(default = "default_gossip_fan_out")]
    gossip_fan_out: u32,
    #[serde(default = "default_gossip_max_send")]
    gossip_max_send: u32,
}

impl ClusterConfigFile {
    fn into_config(self) -> ClusterConfig {
        ClusterConfig::new(self.name)
            .with_address(self.address)
            .with_request_timeout(Duration::from_millis(self.request_timeout_ms))
            .with_requests_log_throttle_period(Duration::from_millis(
                self.requests_log_throttle_period_ms,
            ))
            .with_max_number_of_events_in_request_log_throttle_period(
                self.max_number_of_events_in_request_log_throttle_period,
            )
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_gossip_interval(Duration::from_millis(self.gossip_interval_ms))
            .with_gossip_request_timeout(Duration::from_millis(self.gossip_request_timeout_ms))
            .with_gossip_fan_out(self.gossip_fan_out)
            .with_gossip_max_send(self.gossip_max_send)
    }
}

fn default_name() -> String {
    "cluster".to_string()
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}

fn default_requests_log_throttle_period_ms() -> u64 {
    DEFAULT_REQUESTS_LOG_THROTTLE_PERIOD.as_millis() as u64
}

fn default_max_events() -> u32 {
    DEFAULT_MAX_EVENTS_IN_REQUEST_LOG_THROTTLE_PERIOD
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_gossip_interval_ms() -> u64 {
    DEFAULT_GOSSIP_INTERVAL.as_millis() as u64
}

fn default_gossip_request_timeout_ms() -> u64 {
    DEFAULT_GOSSIP_REQUEST_TIMEOUT.as_millis() as u64
}

fn default_gossip_fan_out() -> u32 {
    DEFAULT_GOSSIP_FAN_OUT
}

fn default_gossip_max_send() -> u32 {
    DEFAULT_GOSSIP_MAX_SEND
}
