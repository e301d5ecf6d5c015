// OpenStack REST clients: Keystone authentication, Octavia load balancers
// and Neutron floating IPs.

pub mod auth;
pub mod loadbalancer;
pub mod networking;

pub use auth::ProviderClient;
pub use loadbalancer::LoadBalancerClient;
pub use networking::{NetworkingClient, WaitOptions};

use crate::utils::error::{CleanerError, Result};
use reqwest::Response;

pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Base URL for versioned resources under a catalog endpoint, e.g.
/// `https://octavia:9876` -> `https://octavia:9876/v2.0/`.
pub(crate) fn resource_base(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    if trimmed.ends_with("/v2.0") {
        format!("{}/", trimmed)
    } else {
        format!("{}/v2.0/", trimmed)
    }
}

/// Passes 2xx responses through; anything else becomes an `ApiError`
/// carrying the service's own fault message when one can be found.
pub(crate) async fn check_response(service: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!("{} API error body: {}", service, body);

    Err(CleanerError::ApiError {
        service: service.to_string(),
        status: status.as_u16(),
        message: extract_fault_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        }),
    })
}

fn extract_fault_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    // Octavia: {"faultstring": ...}; Neutron: {"NeutronError": {"message": ...}};
    // Keystone: {"error": {"message": ...}}
    value
        .get("faultstring")
        .or_else(|| value.pointer("/NeutronError/message"))
        .or_else(|| value.pointer("/error/message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_base() {
        assert_eq!(resource_base("https://octavia:9876"), "https://octavia:9876/v2.0/");
        assert_eq!(resource_base("https://octavia:9876/"), "https://octavia:9876/v2.0/");
        assert_eq!(
            resource_base("https://cloud.example.com/network/v2.0/"),
            "https://cloud.example.com/network/v2.0/"
        );
    }

    #[test]
    fn test_extract_fault_message() {
        assert_eq!(
            extract_fault_message(r#"{"faultcode": "Client", "faultstring": "Invalid state"}"#),
            Some("Invalid state".to_string())
        );
        assert_eq!(
            extract_fault_message(r#"{"NeutronError": {"type": "FloatingIPNotFound", "message": "not found"}}"#),
            Some("not found".to_string())
        );
        assert_eq!(extract_fault_message("<html>502</html>"), None);
    }
}
