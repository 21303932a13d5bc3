use comparator::DEFAULT_CHAIN_BAND;
use market_data::yahoo;

pub fn default_enabled() -> bool {
    true
}

pub fn default_service_name() -> String {
    "CallTrack API".to_string()
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_http_port() -> u16 {
    5001
}

pub fn default_base_url() -> String {
    yahoo::DEFAULT_BASE_URL.to_string()
}

pub fn default_cookie_url() -> Option<String> {
    Some(yahoo::DEFAULT_COOKIE_URL.to_string())
}

pub fn default_crumb_url() -> Option<String> {
    Some(yahoo::DEFAULT_CRUMB_URL.to_string())
}

pub fn default_user_agent() -> String {
    yahoo::DEFAULT_USER_AGENT.to_string()
}

pub fn default_timeout_seconds() -> u64 {
    15
}

pub fn default_chain_band() -> f64 {
    DEFAULT_CHAIN_BAND
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_metrics_port() -> u16 {
    9090
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_data::YahooConfig;

    #[test]
    fn test_provider_defaults_match_client_defaults() {
        let client = YahooConfig::default();
        assert_eq!(default_base_url(), client.base_url);
        assert_eq!(default_cookie_url(), client.cookie_url);
        assert_eq!(default_crumb_url(), client.crumb_url);
        assert_eq!(default_user_agent(), client.user_agent);
        assert_eq!(
            std::time::Duration::from_secs(default_timeout_seconds()),
            client.timeout
        );
        assert_eq!(default_chain_band(), DEFAULT_CHAIN_BAND);
    }
}
