use crate::utils::error::{CleanerError, Result};
use crate::utils::validation::{validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_CLOUD_NAME: &str = "openstack";
pub const DEFAULT_INTERFACE: &str = "public";

/// A `clouds.yaml` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudsFile {
    #[serde(default)]
    pub clouds: HashMap<String, CloudConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudConfig {
    pub auth: AuthConfig,
    pub auth_type: Option<String>,
    pub region_name: Option<String>,
    pub interface: Option<String>,
    pub verify: Option<bool>,
    pub cacert: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub auth_url: String,
    pub username: Option<String>,
    pub user_id: Option<String>,
    pub password: Option<String>,
    pub project_name: Option<String>,
    pub project_id: Option<String>,
    pub user_domain_name: Option<String>,
    pub user_domain_id: Option<String>,
    pub project_domain_name: Option<String>,
    pub project_domain_id: Option<String>,
    pub domain_name: Option<String>,
    pub domain_id: Option<String>,
    pub application_credential_id: Option<String>,
    pub application_credential_name: Option<String>,
    pub application_credential_secret: Option<String>,
}

/// How the Keystone token request authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    Password,
    ApplicationCredential,
}

/// Everything needed to talk to one OpenStack cloud.
#[derive(Debug, Clone, Default)]
pub struct CloudCredentials {
    pub cloud: CloudConfig,
    pub ca_cert_pem: Option<Vec<u8>>,
}

impl CloudsFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CleanerError::IoError)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn cloud(&self, name: &str) -> Result<&CloudConfig> {
        self.clouds
            .get(name)
            .ok_or_else(|| CleanerError::ConfigError {
                message: format!("cloud '{}' not found in clouds.yaml", name),
            })
    }
}

impl CloudConfig {
    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or(DEFAULT_INTERFACE)
    }

    pub fn verify_tls(&self) -> bool {
        self.verify.unwrap_or(true)
    }

    pub fn auth_method(&self) -> Result<AuthMethod> {
        let auth = &self.auth;
        let wants_app_cred = self
            .auth_type
            .as_deref()
            .is_some_and(|t| t.contains("applicationcredential"))
            || auth.application_credential_secret.is_some();

        if wants_app_cred {
            if auth.application_credential_secret.is_none() {
                return Err(CleanerError::MissingConfigError {
                    field: "auth.application_credential_secret".to_string(),
                });
            }
            if auth.application_credential_id.is_none()
                && auth.application_credential_name.is_none()
            {
                return Err(CleanerError::MissingConfigError {
                    field: "auth.application_credential_id".to_string(),
                });
            }
            return Ok(AuthMethod::ApplicationCredential);
        }

        if auth.username.is_none() && auth.user_id.is_none() {
            return Err(CleanerError::MissingConfigError {
                field: "auth.username".to_string(),
            });
        }
        if auth.password.is_none() {
            return Err(CleanerError::MissingConfigError {
                field: "auth.password".to_string(),
            });
        }
        Ok(AuthMethod::Password)
    }
}

impl Validate for CloudConfig {
    fn validate(&self) -> Result<()> {
        validate_url("auth.auth_url", &self.auth.auth_url)?;
        self.auth_method()?;
        Ok(())
    }
}

impl CloudCredentials {
    pub fn new(cloud: CloudConfig, ca_cert_pem: Option<Vec<u8>>) -> Self {
        Self { cloud, ca_cert_pem }
    }

    /// Loads the named cloud from a `clouds.yaml` on disk. A relative
    /// `cacert` path is resolved against the file's directory.
    pub fn from_clouds_file<P: AsRef<Path>>(path: P, cloud_name: &str) -> Result<Self> {
        let path = path.as_ref();
        let clouds = CloudsFile::from_file(path)?;
        let cloud = clouds.cloud(cloud_name)?.clone();

        let ca_cert_pem = match &cloud.cacert {
            Some(cacert) => {
                let ca_path = Path::new(cacert);
                let ca_path = if ca_path.is_relative() {
                    path.parent().unwrap_or(Path::new(".")).join(ca_path)
                } else {
                    ca_path.to_path_buf()
                };
                tracing::debug!("Reading CA certificate from {}", ca_path.display());
                Some(std::fs::read(ca_path)?)
            }
            None => None,
        };

        Ok(Self::new(cloud, ca_cert_pem))
    }

    pub fn region(&self) -> Option<&str> {
        self.cloud.region_name.as_deref().filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const CLOUDS_YAML: &str = r#"
clouds:
  openstack:
    auth:
      auth_url: https://keystone.example.com:5000/v3
      username: capo
      password: s3cret
      project_name: k8s
      user_domain_name: Default
      project_domain_name: Default
    region_name: RegionOne
    interface: internal
    verify: false
  appcred:
    auth_type: v3applicationcredential
    auth:
      auth_url: https://keystone.example.com:5000
      application_credential_id: 0123abcd
      application_credential_secret: xyz
"#;

    #[test]
    fn test_parse_clouds_yaml() {
        let clouds = CloudsFile::from_yaml_str(CLOUDS_YAML).unwrap();
        let cloud = clouds.cloud("openstack").unwrap();

        assert_eq!(cloud.auth.username.as_deref(), Some("capo"));
        assert_eq!(cloud.region_name.as_deref(), Some("RegionOne"));
        assert_eq!(cloud.interface(), "internal");
        assert!(!cloud.verify_tls());
        assert_eq!(cloud.auth_method().unwrap(), AuthMethod::Password);
        assert!(cloud.validate().is_ok());
    }

    #[test]
    fn test_application_credential_cloud() {
        let clouds = CloudsFile::from_yaml_str(CLOUDS_YAML).unwrap();
        let cloud = clouds.cloud("appcred").unwrap();

        assert_eq!(cloud.interface(), DEFAULT_INTERFACE);
        assert!(cloud.verify_tls());
        assert_eq!(cloud.auth_method().unwrap(), AuthMethod::ApplicationCredential);
    }

    #[test]
    fn test_unknown_cloud_is_config_error() {
        let clouds = CloudsFile::from_yaml_str(CLOUDS_YAML).unwrap();
        assert!(matches!(
            clouds.cloud("missing"),
            Err(CleanerError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_password_auth_requires_password() {
        let mut cloud = CloudsFile::from_yaml_str(CLOUDS_YAML)
            .unwrap()
            .cloud("openstack")
            .unwrap()
            .clone();
        cloud.auth.password = None;

        assert!(matches!(
            cloud.auth_method(),
            Err(CleanerError::MissingConfigError { ref field }) if field == "auth.password"
        ));
    }

    #[test]
    fn test_relative_cacert_is_resolved_next_to_clouds_file() {
        let dir = TempDir::new().unwrap();
        let mut ca = std::fs::File::create(dir.path().join("ca.pem")).unwrap();
        ca.write_all(b"-----BEGIN CERTIFICATE-----\n").unwrap();

        // appended under the last cloud entry ("appcred")
        let yaml = format!("{}\n    cacert: ca.pem\n", CLOUDS_YAML.trim_end());
        let clouds_path = dir.path().join("clouds.yaml");
        std::fs::write(&clouds_path, yaml).unwrap();

        let creds = CloudCredentials::from_clouds_file(&clouds_path, "appcred").unwrap();
        assert_eq!(
            creds.ca_cert_pem.as_deref(),
            Some(&b"-----BEGIN CERTIFICATE-----\n"[..])
        );
        assert_eq!(creds.region(), None);
    }
}
