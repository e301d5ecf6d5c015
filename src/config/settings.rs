use crate::config::clouds::DEFAULT_CLOUD_NAME;
use crate::config::toml_config::TomlConfig;
use crate::domain::model::ClusterRef;
use crate::utils::error::{CleanerError, Result};
use crate::utils::validation::{
    validate_cluster_tag, validate_min_duration, validate_non_empty_string, validate_one_of,
    Validate,
};
use std::time::Duration;

pub const DEFAULT_FLOATING_IP_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 1;
pub const REPORT_FORMATS: [&str; 2] = ["csv", "json"];

/// Where provider credentials come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    CloudsFile { path: String, cloud: String },
    Cluster(ClusterRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub path: String,
    pub format: String,
}

/// Fully resolved run settings: file values overlaid with command line
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanerSettings {
    pub cluster_tag: String,
    pub credentials: CredentialSource,
    pub region: Option<String>,
    pub dry_run: bool,
    pub floating_ip_timeout: Duration,
    pub poll_interval: Duration,
    pub report: Option<ReportSettings>,
}

/// Values that may override the file configuration. Mirrors the CLI
/// flags without depending on clap.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub cluster_tag: Option<String>,
    pub clouds_file: Option<String>,
    pub cloud: Option<String>,
    pub region: Option<String>,
    pub namespace: Option<String>,
    pub cluster: Option<String>,
    pub dry_run: bool,
    pub floating_ip_timeout_seconds: Option<u64>,
    pub poll_interval_seconds: Option<u64>,
    pub report: Option<String>,
    pub report_format: Option<String>,
}

impl CleanerSettings {
    pub fn resolve(file: Option<TomlConfig>, overrides: Overrides) -> Result<Self> {
        let file = file.unwrap_or_default();
        let openstack = file.openstack.unwrap_or_default();
        let kubernetes = file.kubernetes.unwrap_or_default();

        let cluster_tag = overrides
            .cluster_tag
            .or(file.cleanup.cluster_tag)
            .ok_or_else(|| CleanerError::MissingConfigError {
                field: "cleanup.cluster_tag".to_string(),
            })?;

        let clouds_file = overrides.clouds_file.or(openstack.clouds_file);
        let namespace = overrides.namespace.or(kubernetes.namespace);
        let cluster = overrides.cluster.or(kubernetes.cluster);

        let credentials = match (clouds_file, namespace, cluster) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(CleanerError::ConfigError {
                    message: "use either a clouds.yaml file or a Kubernetes cluster reference, not both"
                        .to_string(),
                })
            }
            (Some(path), None, None) => CredentialSource::CloudsFile {
                path,
                cloud: overrides
                    .cloud
                    .or(openstack.cloud)
                    .unwrap_or_else(|| DEFAULT_CLOUD_NAME.to_string()),
            },
            (None, Some(namespace), Some(name)) => {
                CredentialSource::Cluster(ClusterRef { namespace, name })
            }
            (None, None, Some(_)) => {
                return Err(CleanerError::MissingConfigError {
                    field: "kubernetes.namespace".to_string(),
                })
            }
            (None, Some(_), None) => {
                return Err(CleanerError::MissingConfigError {
                    field: "kubernetes.cluster".to_string(),
                })
            }
            (None, None, None) => {
                return Err(CleanerError::MissingConfigError {
                    field: "openstack.clouds_file or kubernetes.cluster".to_string(),
                })
            }
        };

        let report = match overrides.report.or(file.report.as_ref().map(|r| r.path.clone())) {
            Some(path) => {
                let format = overrides
                    .report_format
                    .or(file.report.and_then(|r| r.format))
                    .unwrap_or_else(|| infer_report_format(&path).to_string());
                Some(ReportSettings { path, format })
            }
            None => None,
        };

        let settings = Self {
            cluster_tag,
            credentials,
            region: overrides.region.or(openstack.region),
            dry_run: overrides.dry_run || file.cleanup.dry_run.unwrap_or(false),
            floating_ip_timeout: Duration::from_secs(
                overrides
                    .floating_ip_timeout_seconds
                    .or(file.cleanup.floating_ip_timeout_seconds)
                    .unwrap_or(DEFAULT_FLOATING_IP_TIMEOUT_SECONDS),
            ),
            poll_interval: Duration::from_secs(
                overrides
                    .poll_interval_seconds
                    .or(file.cleanup.poll_interval_seconds)
                    .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS),
            ),
            report,
        };
        settings.validate()?;
        Ok(settings)
    }
}

fn infer_report_format(path: &str) -> &'static str {
    if path.ends_with(".json") {
        "json"
    } else {
        "csv"
    }
}

impl Validate for CleanerSettings {
    fn validate(&self) -> Result<()> {
        let second = Duration::from_secs(1);
        validate_cluster_tag("cleanup.cluster_tag", &self.cluster_tag)?;
        validate_min_duration(
            "cleanup.floating_ip_timeout_seconds",
            self.floating_ip_timeout,
            second,
        )?;
        validate_min_duration("cleanup.poll_interval_seconds", self.poll_interval, second)?;

        match &self.credentials {
            CredentialSource::CloudsFile { path, cloud } => {
                validate_non_empty_string("openstack.clouds_file", path)?;
                validate_non_empty_string("openstack.cloud", cloud)?;
            }
            CredentialSource::Cluster(cluster) => {
                validate_non_empty_string("kubernetes.namespace", &cluster.namespace)?;
                validate_non_empty_string("kubernetes.cluster", &cluster.name)?;
            }
        }

        if let Some(report) = &self.report {
            validate_non_empty_string("report.path", &report.path)?;
            validate_one_of("report.format", &report.format, &REPORT_FORMATS)?;
        }

        Ok(())
    }
}
