use crate::domain::model::FloatingIp;
use crate::domain::ports::NetworkingApi;
use crate::openstack::auth::{ProviderClient, NETWORK_SERVICE};
use crate::openstack::{check_response, resource_base, AUTH_TOKEN_HEADER};
use crate::utils::error::{CleanerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

pub const FLOATING_IP_DOWN: &str = "DOWN";

#[derive(Debug, Deserialize)]
struct FloatingIpList {
    #[serde(default)]
    floatingips: Vec<FloatingIp>,
}

#[derive(Debug, Deserialize)]
struct FloatingIpEnvelope {
    floatingip: FloatingIp,
}

/// How long to wait for a disassociated floating IP to go `DOWN`.
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Neutron v2.0 client, limited to floating IPs.
#[derive(Clone)]
pub struct NetworkingClient {
    http: Client,
    token: String,
    base_url: String,
    wait: WaitOptions,
}

impl NetworkingClient {
    pub fn new(provider: &ProviderClient, wait: WaitOptions) -> Result<Self> {
        let endpoint = provider.endpoint_for(NETWORK_SERVICE)?;
        tracing::debug!("Using network endpoint {}", endpoint);
        Ok(Self::with_endpoint(
            provider.http().clone(),
            provider.token(),
            &endpoint,
            wait,
        ))
    }

    pub fn with_endpoint(http: Client, token: &str, endpoint: &str, wait: WaitOptions) -> Self {
        Self {
            http,
            token: token.to_string(),
            base_url: resource_base(endpoint),
            wait,
        }
    }

    async fn list_floating_ips(&self, filter: (&str, &str)) -> Result<Vec<FloatingIp>> {
        let response = self
            .http
            .get(format!("{}floatingips", self.base_url))
            .header(AUTH_TOKEN_HEADER, &self.token)
            .query(&[filter])
            .send()
            .await?;
        let list: FloatingIpList = check_response(NETWORK_SERVICE, response)
            .await?
            .json()
            .await?;
        Ok(list.floatingips)
    }

    /// First floating IP with the given address, if any.
    pub async fn get_floating_ip(&self, address: &str) -> Result<Option<FloatingIp>> {
        let mut fips = self
            .list_floating_ips(("floating_ip_address", address))
            .await?;
        if fips.is_empty() {
            return Ok(None);
        }
        Ok(Some(fips.swap_remove(0)))
    }

    async fn get_floating_ip_by_id(&self, id: &str) -> Result<FloatingIp> {
        let response = self
            .http
            .get(format!("{}floatingips/{}", self.base_url, id))
            .header(AUTH_TOKEN_HEADER, &self.token)
            .send()
            .await?;
        let envelope: FloatingIpEnvelope = check_response(NETWORK_SERVICE, response)
            .await?
            .json()
            .await?;
        Ok(envelope.floatingip)
    }

    async fn wait_for_status(&self, id: &str, status: &str) -> Result<()> {
        let deadline = Instant::now() + self.wait.timeout;
        loop {
            let fip = self.get_floating_ip_by_id(id).await?;
            if fip.status == status {
                return Ok(());
            }
            if Instant::now() + self.wait.poll_interval > deadline {
                return Err(CleanerError::Timeout {
                    resource: format!("floating IP {}", fip.floating_ip_address),
                    status: status.to_string(),
                });
            }
            tracing::debug!(
                "Floating IP {} is {}, waiting for {}",
                fip.floating_ip_address,
                fip.status,
                status
            );
            tokio::time::sleep(self.wait.poll_interval).await;
        }
    }
}

impl fmt::Debug for NetworkingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkingClient")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NetworkingApi for NetworkingClient {
    async fn get_floating_ip_by_port_id(&self, port_id: &str) -> Result<Option<FloatingIp>> {
        let mut fips = self.list_floating_ips(("port_id", port_id)).await?;
        match fips.len() {
            0 => Ok(None),
            1 => Ok(fips.pop()),
            _ => Err(CleanerError::MultipleFloatingIps {
                port_id: port_id.to_string(),
            }),
        }
    }

    async fn disassociate_floating_ip(&self, address: &str) -> Result<()> {
        let fip = match self.get_floating_ip(address).await? {
            Some(fip) => fip,
            None => return Ok(()),
        };
        if !fip.is_associated() {
            tracing::debug!("Floating IP {} is not associated", address);
            return Ok(());
        }

        let response = self
            .http
            .put(format!("{}floatingips/{}", self.base_url, fip.id))
            .header(AUTH_TOKEN_HEADER, &self.token)
            .json(&json!({ "floatingip": { "port_id": null } }))
            .send()
            .await?;
        check_response(NETWORK_SERVICE, response).await?;

        self.wait_for_status(&fip.id, FLOATING_IP_DOWN).await
    }

    async fn delete_floating_ip(&self, address: &str) -> Result<()> {
        let fip = match self.get_floating_ip(address).await? {
            Some(fip) => fip,
            None => return Ok(()),
        };

        let response = self
            .http
            .delete(format!("{}floatingips/{}", self.base_url, fip.id))
            .header(AUTH_TOKEN_HEADER, &self.token)
            .send()
            .await?;
        check_response(NETWORK_SERVICE, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_hides_token() {
        let client = NetworkingClient::with_endpoint(
            Client::new(),
            "gAAAAABsecret-token",
            "https://neutron.example.com:9696/v2.0",
            WaitOptions::default(),
        );

        let debug = format!("{:?}", client);
        assert!(!debug.contains("gAAAAABsecret-token"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("https://neutron.example.com:9696/v2.0/"));
    }
}
