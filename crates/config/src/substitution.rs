use anyhow::Result;
use regex::{Captures, Regex};
use std::env;
use tracing::{debug, warn};

const PLACEHOLDER: &str = r"\$\{(\w+)(?::-([^}]*))?\}";

/// Replace `${VAR}` and `${VAR:-default}` with environment values.
///
/// An unset variable with a default takes the default; without one the
/// placeholder is left in place for the validator to report.
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(PLACEHOLDER)?;
    let mut missing_vars = Vec::new();

    let result = re.replace_all(content, |caps: &Captures| {
        let var_name = &caps[1];
        match (env::var(var_name), caps.get(2)) {
            (Ok(value), _) => {
                debug!("Substituting environment variable: {}", var_name);
                value
            }
            (Err(_), Some(default)) => {
                debug!("Environment variable '{}' not set, using default", var_name);
                default.as_str().to_string()
            }
            (Err(_), None) => {
                warn!("Environment variable '{}' not set", var_name);
                missing_vars.push(var_name.to_string());
                caps[0].to_string()
            }
        }
    });

    if !missing_vars.is_empty() {
        debug!("Unresolved environment variables: {:?}", missing_vars);
    }

    Ok(result.into_owned())
}

/// Names of placeholders still present in `content`
pub fn unresolved_env_vars(content: &str) -> Vec<String> {
    match Regex::new(PLACEHOLDER) {
        Ok(re) => re.captures_iter(content).map(|c| c[1].to_string()).collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_set_and_default() {
        env::set_var("CALLTRACK_TEST_PORT", "6001");
        env::remove_var("CALLTRACK_TEST_UNSET");

        let out = substitute_env_vars(
            "port: ${CALLTRACK_TEST_PORT}\nhost: ${CALLTRACK_TEST_UNSET:-127.0.0.1}\n",
        )
        .unwrap();
        assert_eq!(out, "port: 6001\nhost: 127.0.0.1\n");
    }

    #[test]
    fn test_unset_without_default_is_kept() {
        env::remove_var("CALLTRACK_TEST_MISSING");
        let out = substitute_env_vars("url: ${CALLTRACK_TEST_MISSING}").unwrap();
        assert_eq!(out, "url: ${CALLTRACK_TEST_MISSING}");
        assert_eq!(unresolved_env_vars(&out), vec!["CALLTRACK_TEST_MISSING"]);
    }
}
