use crate::domain::model::LoadBalancer;
use crate::domain::ports::LoadBalancerApi;
use crate::openstack::auth::{ProviderClient, LOAD_BALANCER_SERVICE};
use crate::openstack::{check_response, resource_base, AUTH_TOKEN_HEADER};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Deserialize)]
struct LoadBalancerPage {
    #[serde(default)]
    loadbalancers: Vec<LoadBalancer>,
    #[serde(default)]
    loadbalancers_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    rel: String,
}

/// Octavia v2 client.
#[derive(Clone)]
pub struct LoadBalancerClient {
    http: Client,
    token: String,
    base_url: String,
}

impl LoadBalancerClient {
    pub fn new(provider: &ProviderClient) -> Result<Self> {
        let endpoint = provider.endpoint_for(LOAD_BALANCER_SERVICE)?;
        tracing::debug!("Using load-balancer endpoint {}", endpoint);
        Ok(Self::with_endpoint(
            provider.http().clone(),
            provider.token(),
            &endpoint,
        ))
    }

    pub fn with_endpoint(http: Client, token: &str, endpoint: &str) -> Self {
        Self {
            http,
            token: token.to_string(),
            base_url: resource_base(endpoint),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl fmt::Debug for LoadBalancerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadBalancerClient")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LoadBalancerApi for LoadBalancerClient {
    async fn list_load_balancers(&self) -> Result<Vec<LoadBalancer>> {
        let mut load_balancers = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(self.url("lbaas/loadbalancers"));

        while let Some(url) = next.take() {
            visited.insert(url.clone());
            tracing::debug!("Listing load balancers: {}", url);
            let response = self
                .http
                .get(&url)
                .header(AUTH_TOKEN_HEADER, &self.token)
                .send()
                .await?;
            let page: LoadBalancerPage = check_response(LOAD_BALANCER_SERVICE, response)
                .await?
                .json()
                .await?;

            let page_was_empty = page.loadbalancers.is_empty();
            load_balancers.extend(page.loadbalancers);

            next = page
                .loadbalancers_links
                .into_iter()
                .find(|link| link.rel == "next")
                .map(|link| link.href)
                .filter(|href| !page_was_empty && !visited.contains(href));
        }

        tracing::debug!("Found {} load balancers", load_balancers.len());
        Ok(load_balancers)
    }

    async fn delete_load_balancer(&self, id: &str, cascade: bool) -> Result<()> {
        let mut request = self
            .http
            .delete(self.url(&format!("lbaas/loadbalancers/{}", id)))
            .header(AUTH_TOKEN_HEADER, &self.token);
        if cascade {
            request = request.query(&[("cascade", "true")]);
        }

        check_response(LOAD_BALANCER_SERVICE, request.send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_hides_token() {
        let client = LoadBalancerClient::with_endpoint(
            Client::new(),
            "gAAAAABsecret-token",
            "https://octavia.example.com:9876",
        );

        let debug = format!("{:?}", client);
        assert!(!debug.contains("gAAAAABsecret-token"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("https://octavia.example.com:9876/v2.0/"));
    }
}
