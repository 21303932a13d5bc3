use crate::*;
use thiserror::Error;
use url::Url;

const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Service name is required")]
    MissingServiceName,

    #[error("Server host is required")]
    MissingHost,

    #[error("{field} must be between 1 and 65535, got: {port}")]
    InvalidPort { field: String, port: u16 },

    #[error("{field} is not a valid http(s) URL '{value}': {message}")]
    InvalidUrl {
        field: String,
        value: String,
        message: String,
    },

    #[error("provider.timeout_seconds must be a positive integer")]
    InvalidTimeout,

    #[error("comparator.chain_band must be between 0 and 1 (exclusive), got: {0}")]
    InvalidChainBand(f64),

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("metrics.port {0} conflicts with server.port")]
    PortConflict(u16),

    #[error("Environment variable '{var}' is missing or invalid: {message}")]
    InvalidEnvVar { var: String, message: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

pub fn validate_config(config: &CallTrackConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_service(&config.service, &mut report);
    validate_server(&config.server, &mut report);
    validate_provider(&config.provider, &mut report);
    validate_comparator(&config.comparator, &mut report);
    validate_logging(&config.logging, &mut report);
    validate_metrics(&config.metrics, &config.server, &mut report);

    report
}

fn check_env_placeholders(field: &str, value: &str, report: &mut ValidationReport) -> bool {
    let unresolved = unresolved_env_vars(value);
    for var in &unresolved {
        report.add_error(ValidationError::InvalidEnvVar {
            var: var.clone(),
            message: format!("referenced by {} but not set", field),
        });
    }
    unresolved.is_empty()
}

fn validate_service(service: &ServiceConfig, report: &mut ValidationReport) {
    if service.name.trim().is_empty() {
        report.add_error(ValidationError::MissingServiceName);
    }
}

fn validate_server(server: &ServerSection, report: &mut ValidationReport) {
    if server.host.trim().is_empty() {
        report.add_error(ValidationError::MissingHost);
    } else {
        check_env_placeholders("server.host", &server.host, report);
    }

    if server.port == 0 {
        report.add_error(ValidationError::InvalidPort {
            field: "server.port".to_string(),
            port: server.port,
        });
    } else if server.port < 1024 {
        report.add_warning("server.port", "Privileged port (requires root/admin privileges)");
    }

    if !server.cors_permissive {
        report.add_warning(
            "server.cors_permissive",
            "CORS is disabled; a web UI served from another origin cannot call the API",
        );
    }
}

fn validate_url(field: &str, value: &str, report: &mut ValidationReport) {
    if !check_env_placeholders(field, value, report) {
        return;
    }
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => report.add_error(ValidationError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => report.add_error(ValidationError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        }),
    }
}

fn validate_provider(provider: &ProviderConfig, report: &mut ValidationReport) {
    validate_url("provider.base_url", &provider.base_url, report);

    match (&provider.cookie_url, &provider.crumb_url) {
        (Some(cookie), Some(crumb)) => {
            validate_url("provider.cookie_url", cookie, report);
            validate_url("provider.crumb_url", crumb, report);
        }
        (None, None) => {
            report.add_default("provider.crumb_url", "none (crumb handshake disabled)");
        }
        _ => report.add_warning(
            "provider.cookie_url",
            "cookie_url and crumb_url must both be set for the crumb handshake; it is disabled",
        ),
    }

    if provider.user_agent.trim().is_empty() {
        report.add_warning(
            "provider.user_agent",
            "Empty User-Agent; the upstream commonly rejects such requests",
        );
    }

    if provider.timeout_seconds == 0 {
        report.add_error(ValidationError::InvalidTimeout);
    } else if provider.timeout_seconds > 60 {
        report.add_warning(
            "provider.timeout_seconds",
            "Timeouts above 60s hold API requests open for a long time",
        );
    }
}

fn validate_comparator(comparator: &ComparatorConfig, report: &mut ValidationReport) {
    let band = comparator.chain_band;
    if !(band.is_finite() && band > 0.0 && band < 1.0) {
        report.add_error(ValidationError::InvalidChainBand(band));
    }
}

fn validate_logging(logging: &LoggingConfig, report: &mut ValidationReport) {
    if !LOG_FORMATS.contains(&logging.format.trim().to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(logging.format.clone()));
    }
    if logging.level.trim().is_empty() {
        report.add_default("logging.level", &default_log_level());
    }
}

fn validate_metrics(metrics: &MetricsConfig, server: &ServerSection, report: &mut ValidationReport) {
    if !metrics.enabled {
        return;
    }
    if metrics.port == 0 {
        report.add_error(ValidationError::InvalidPort {
            field: "metrics.port".to_string(),
            port: metrics.port,
        });
    } else if metrics.port == server.port {
        report.add_error(ValidationError::PortConflict(metrics.port));
    }
}
