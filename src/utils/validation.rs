use crate::utils::error::{CleanerError, Result};
use std::time::Duration;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> CleanerError {
    CleanerError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Keystone and service URLs must be absolute http(s) URLs.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("OpenStack endpoints are served over http(s), not {}", scheme),
            )),
        },
        Err(e) => Err(invalid(field_name, url_str, format!("Invalid URL format: {}", e))),
    }
}

/// An empty tag would widen the `kube_service_` prefix to every cluster's
/// load balancers, so it is refused outright.
pub fn validate_cluster_tag(field_name: &str, tag: &str) -> Result<()> {
    if tag.trim().is_empty() {
        return Err(invalid(
            field_name,
            tag,
            "Cluster tag cannot be empty; it would select the load balancers of every cluster",
        ));
    }
    if tag.chars().any(char::is_whitespace) {
        return Err(invalid(
            field_name,
            tag,
            "Cluster tag cannot contain whitespace",
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_min_duration(field_name: &str, value: Duration, min: Duration) -> Result<()> {
    if value < min {
        return Err(invalid(
            field_name,
            value.as_secs(),
            format!("Must be at least {} second(s)", min.as_secs()),
        ));
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(invalid(
            field_name,
            value,
            format!("Valid values: {}", allowed.join(", ")),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("auth_url", "https://keystone.example.com:5000/v3").is_ok());
        assert!(validate_url("auth_url", "http://10.0.0.1:5000").is_ok());
        assert!(validate_url("auth_url", "").is_err());
        assert!(validate_url("auth_url", "keystone").is_err());
        assert!(validate_url("auth_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_cluster_tag() {
        assert!(validate_cluster_tag("cleanup.cluster_tag", "abc12").is_ok());
        assert!(validate_cluster_tag("cleanup.cluster_tag", "").is_err());
        assert!(validate_cluster_tag("cleanup.cluster_tag", "abc 12").is_err());

        let err = validate_cluster_tag("cleanup.cluster_tag", "  ").unwrap_err();
        assert!(err.to_string().contains("every cluster"));
    }

    #[test]
    fn test_validate_min_duration() {
        let second = Duration::from_secs(1);
        assert!(validate_min_duration("cleanup.poll_interval_seconds", second, second).is_ok());

        let err = validate_min_duration("cleanup.poll_interval_seconds", Duration::ZERO, second)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value '0' for cleanup.poll_interval_seconds: Must be at least 1 second(s)"
        );
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("kubernetes.namespace", "org-acme").is_ok());
        assert!(validate_non_empty_string("kubernetes.namespace", "   ").is_err());
    }

    #[test]
    fn test_validate_one_of() {
        assert!(validate_one_of("report.format", "csv", &["csv", "json"]).is_ok());
        assert!(validate_one_of("report.format", "xml", &["csv", "json"]).is_err());
    }
}
