use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Report writing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Kubernetes API error: {message}")]
    KubeError { message: String },

    #[error("{service} API returned {status}: {message}")]
    ApiError {
        service: String,
        status: u16,
        message: String,
    },

    #[error("Authentication failed: {message}")]
    AuthError { message: String },

    #[error("No {service_type} endpoint found for interface '{interface}' in region '{region}'")]
    EndpointNotFound {
        service_type: String,
        interface: String,
        region: String,
    },

    #[error("There are multiple floating IPs for port {port_id}")]
    MultipleFloatingIps { port_id: String },

    #[error("Timed out waiting for {resource} to reach {status}")]
    Timeout { resource: String, status: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Provider,
    Kubernetes,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl CleanerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CleanerError::HttpError(_) | CleanerError::Timeout { .. } => ErrorCategory::Network,
            CleanerError::ApiError { .. }
            | CleanerError::AuthError { .. }
            | CleanerError::EndpointNotFound { .. }
            | CleanerError::MultipleFloatingIps { .. } => ErrorCategory::Provider,
            CleanerError::KubeError { .. } => ErrorCategory::Kubernetes,
            CleanerError::ConfigError { .. }
            | CleanerError::InvalidConfigValueError { .. }
            | CleanerError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CleanerError::IoError(_)
            | CleanerError::SerializationError(_)
            | CleanerError::YamlError(_)
            | CleanerError::CsvError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Provider | ErrorCategory::Kubernetes => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Data => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CleanerError::HttpError(_) => "Check network connectivity to the OpenStack endpoints",
            CleanerError::Timeout { .. } => {
                "Increase floating_ip_timeout_seconds or check the Neutron agent health"
            }
            CleanerError::AuthError { .. } => "Verify the credentials in clouds.yaml",
            CleanerError::EndpointNotFound { .. } => {
                "Check region_name and interface against the Keystone service catalog"
            }
            CleanerError::MultipleFloatingIps { .. } => {
                "Remove the duplicate floating IPs manually, then run the cleaner again"
            }
            CleanerError::ApiError { status: 401, .. } | CleanerError::ApiError { status: 403, .. } => {
                "The token was rejected; make sure the project has load-balancer and network roles"
            }
            CleanerError::ApiError { status: 409, .. } => {
                "The resource is in an immutable state; wait for it to settle and retry"
            }
            CleanerError::ApiError { .. } => "Inspect the provider API response and retry",
            CleanerError::KubeError { .. } => {
                "Check the kubeconfig context and that the OpenStackCluster exists"
            }
            CleanerError::ConfigError { .. }
            | CleanerError::InvalidConfigValueError { .. }
            | CleanerError::MissingConfigError { .. } => "Fix the configuration and try again",
            CleanerError::IoError(_) => "Check file paths and permissions",
            CleanerError::SerializationError(_)
            | CleanerError::YamlError(_)
            | CleanerError::CsvError(_) => "Check the input files for malformed content",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach OpenStack: {}", self),
            ErrorCategory::Provider => format!("OpenStack rejected the request: {}", self),
            ErrorCategory::Kubernetes => format!("Could not read cluster credentials: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Could not process data: {}", self),
        }
    }
}

#[cfg(feature = "kube")]
impl From<kube::Error> for CleanerError {
    fn from(e: kube::Error) -> Self {
        CleanerError::KubeError {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_critical() {
        let err = CleanerError::MissingConfigError {
            field: "cleanup.cluster_tag".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("cleanup.cluster_tag"));
    }

    #[test]
    fn test_api_error_display() {
        let err = CleanerError::ApiError {
            service: "load-balancer".to_string(),
            status: 409,
            message: "Invalid state PENDING_UPDATE".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "load-balancer API returned 409: Invalid state PENDING_UPDATE"
        );
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("immutable"));
    }
}
