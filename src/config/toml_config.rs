use crate::utils::error::{CleanerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub cleanup: CleanupConfig,
    pub openstack: Option<OpenStackConfig>,
    pub kubernetes: Option<KubernetesConfig>,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupConfig {
    pub cluster_tag: Option<String>,
    pub dry_run: Option<bool>,
    pub floating_ip_timeout_seconds: Option<u64>,
    pub poll_interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenStackConfig {
    pub clouds_file: Option<String>,
    pub cloud: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KubernetesConfig {
    pub namespace: Option<String>,
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    pub path: String,
    pub format: Option<String>,
}

impl TomlConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CleanerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses a TOML document, substituting `${VAR}` references first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CleanerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CleanerError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[cleanup]
cluster_tag = "abc12"
dry_run = true
floating_ip_timeout_seconds = 30

[openstack]
clouds_file = "/etc/openstack/clouds.yaml"
cloud = "prod"
region = "RegionTwo"

[report]
path = "./cleanup.csv"
format = "csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.cleanup.cluster_tag.as_deref(), Some("abc12"));
        assert_eq!(config.cleanup.dry_run, Some(true));
        assert_eq!(config.cleanup.poll_interval_seconds, None);
        let openstack = config.openstack.unwrap();
        assert_eq!(openstack.cloud.as_deref(), Some("prod"));
        assert!(config.kubernetes.is_none());
        assert_eq!(config.report.unwrap().path, "./cleanup.csv");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LB_CLEANER_TEST_CLUSTER_TAG", "xyz99");

        let toml_content = r#"
[cleanup]
cluster_tag = "${LB_CLEANER_TEST_CLUSTER_TAG}"

[kubernetes]
namespace = "org-acme"
cluster = "${LB_CLEANER_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.cleanup.cluster_tag.as_deref(), Some("xyz99"));
        // unknown variables are left untouched
        assert_eq!(
            config.kubernetes.unwrap().cluster.as_deref(),
            Some("${LB_CLEANER_TEST_UNSET_VAR}")
        );

        std::env::remove_var("LB_CLEANER_TEST_CLUSTER_TAG");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = TomlConfig::from_toml_str("[cleanup\ncluster_tag = 1");
        assert!(matches!(result, Err(CleanerError::ConfigError { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[cleanup]\ncluster_tag = \"abc12\"\n").unwrap();

        let config = TomlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cleanup.cluster_tag.as_deref(), Some("abc12"));
        assert!(config.openstack.is_none());
    }
}
