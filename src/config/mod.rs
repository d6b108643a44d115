//! Configuration for the beacon engine
//!
//! Loads and validates the dashboard `config.yaml`: SuperOps connection
//! settings, cache TTLs, closed statuses, the section status mapping, and the
//! per-view tech group assignments.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Full engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SuperOps API connection settings
    pub superops: SuperOpsConfig,

    /// Technician fetch settings
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Statuses excluded server-side from every ticket listing
    #[serde(default = "default_closed_statuses")]
    pub closed_statuses: Vec<String>,

    /// Status-to-section mapping rules
    #[serde(default)]
    pub status_mapping: StatusMapping,

    /// Dashboard views keyed by slug
    #[serde(default)]
    pub views: BTreeMap<String, ViewConfig>,
}

/// SuperOps API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperOpsConfig {
    /// GraphQL endpoint URL
    #[serde(default)]
    pub api_url: String,

    /// Bearer token for the API
    #[serde(default)]
    pub api_key: String,

    /// Tenant subdomain sent with every request
    #[serde(default)]
    pub customer_subdomain: String,

    /// Items per page for listing queries
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Ticket cache TTL in seconds
    #[serde(default = "default_ticket_ttl")]
    pub cache_ttl_seconds: u64,
}

/// Technician fetch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Whether the web layer should fetch the agent dropdown at all
    #[serde(default = "default_true")]
    pub auto_fetch: bool,

    /// Technician cache TTL in seconds (independent of the ticket TTL)
    #[serde(default = "default_agent_ttl")]
    pub cache_ttl_seconds: u64,
}

/// Per-section classification rules as they appear in the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Status strings belonging to this section (matched case-insensitively)
    #[serde(default)]
    pub statuses: Vec<String>,

    /// Pull in tickets that have no first response yet (open section)
    #[serde(default)]
    pub include_no_first_response: bool,

    /// Pull in tickets with no assigned agent (open section)
    #[serde(default)]
    pub include_unassigned: bool,

    /// Pull in SLA-violated tickets regardless of status (needs-agent section)
    #[serde(default)]
    pub include_sla_violated: bool,
}

/// The four-section status mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMapping {
    #[serde(default)]
    pub open: SectionConfig,

    #[serde(default)]
    pub customer_replied: SectionConfig,

    #[serde(default)]
    pub needs_agent: SectionConfig,

    #[serde(default)]
    pub other_active: SectionConfig,
}

/// A dashboard view and the tech groups it covers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Human-readable view name
    #[serde(default)]
    pub display_name: String,

    /// Icon slug for the view switcher
    #[serde(default = "default_icon")]
    pub icon: String,

    /// Tech group ids shown in this view; empty means catch-all
    #[serde(default)]
    pub tech_group_ids: Vec<String>,
}

fn default_page_size() -> usize {
    100
}

fn default_ticket_ttl() -> u64 {
    60
}

fn default_agent_ttl() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_icon() -> String {
    "ticket".to_string()
}

fn default_closed_statuses() -> Vec<String> {
    vec!["Resolved".to_string(), "Closed".to_string()]
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            auto_fetch: true,
            cache_ttl_seconds: default_agent_ttl(),
        }
    }
}

impl Default for StatusMapping {
    /// Mapping used when the config file has no `status_mapping` section at all
    fn default() -> Self {
        Self {
            open: SectionConfig {
                statuses: vec!["Open".to_string()],
                include_no_first_response: true,
                include_unassigned: true,
                include_sla_violated: false,
            },
            customer_replied: SectionConfig {
                statuses: vec!["Customer Reply".to_string()],
                ..SectionConfig::default()
            },
            needs_agent: SectionConfig {
                statuses: vec!["Pending".to_string()],
                include_sla_violated: true,
                ..SectionConfig::default()
            },
            other_active: SectionConfig {
                statuses: vec!["In Progress".to_string(), "On Hold".to_string()],
                ..SectionConfig::default()
            },
        }
    }
}

impl Config {
    /// Load and validate configuration from a YAML file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate required sections and reject placeholder credentials
    pub fn validate(&self) -> Result<()> {
        if self.superops.api_url.is_empty() {
            return Err(ConfigError::Invalid("missing superops.api_url".to_string()).into());
        }
        if self.superops.api_key.is_empty() {
            return Err(ConfigError::Invalid("missing superops.api_key".to_string()).into());
        }
        if self.superops.api_key.starts_with("YOUR_") {
            return Err(ConfigError::Invalid(
                "superops.api_key still has its placeholder value".to_string(),
            )
            .into());
        }
        if self.superops.customer_subdomain.is_empty() {
            return Err(
                ConfigError::Invalid("missing superops.customer_subdomain".to_string()).into(),
            );
        }
        if self.views.is_empty() {
            return Err(ConfigError::Invalid("missing 'views' section".to_string()).into());
        }
        Ok(())
    }

    /// Ticket cache TTL as a `Duration`
    pub fn ticket_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.superops.cache_ttl_seconds)
    }

    /// Technician cache TTL as a `Duration`
    pub fn technician_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.agents.cache_ttl_seconds)
    }
}
