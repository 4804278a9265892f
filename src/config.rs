//! Audit tuning: timeouts, throttling, caps

use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; StorefrontAudit/1.0)";

/// Configuration for one audit run
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Storefront API version segment, e.g. `2024-01`
    pub api_version: String,
    /// Pages requested per API call (the API caps this at 250)
    pub api_page_size: u32,
    pub api_timeout: Duration,
    /// Pause after each API page
    pub api_delay: Duration,
    pub sitemap_timeout: Duration,
    /// Timeout for known-handle existence probes
    pub probe_timeout: Duration,
    /// Timeout for link and page checks
    pub check_timeout: Duration,
    /// Pause after each link check
    pub check_delay: Duration,
    /// Ceiling on links verified per run
    pub max_links: usize,
    /// Link checks in flight at once
    pub concurrency: usize,
    /// Wall-clock budget for the link verification pass
    pub run_budget: Duration,
    pub user_agent: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            api_version: "2024-01".to_string(),
            api_page_size: 250,
            api_timeout: Duration::from_secs(30),
            api_delay: Duration::from_millis(500),
            sitemap_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(5),
            check_timeout: Duration::from_secs(10),
            check_delay: Duration::from_millis(200),
            max_links: 100,
            concurrency: 5,
            run_budget: Duration::from_secs(600),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl AuditConfig {
    /// Same limits with every sleep removed (tests, local mirrors)
    pub fn without_delays(mut self) -> Self {
        self.api_delay = Duration::ZERO;
        self.check_delay = Duration::ZERO;
        self
    }

    pub fn api_page_size(&self) -> u32 {
        self.api_page_size.clamp(1, 250)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuditConfig::default();
        assert_eq!(config.api_page_size(), 250);
        assert_eq!(config.max_links, 100);
        assert_eq!(config.check_delay, Duration::from_millis(200));
    }

    #[test]
    fn test_page_size_capped() {
        let config = AuditConfig {
            api_page_size: 1000,
            ..AuditConfig::default()
        };
        assert_eq!(config.api_page_size(), 250);
    }

    #[test]
    fn test_without_delays() {
        let config = AuditConfig::default().without_delays();
        assert!(config.api_delay.is_zero());
        assert!(config.check_delay.is_zero());
        assert_eq!(config.check_timeout, Duration::from_secs(10));
    }
}
