use crate::config::clouds::{AuthConfig, AuthMethod, CloudCredentials};
use crate::openstack::{check_response, SUBJECT_TOKEN_HEADER};
use crate::utils::error::{CleanerError, Result};
use crate::utils::validation::Validate;
use reqwest::{Certificate, Client};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;

pub const LOAD_BALANCER_SERVICE: &str = "load-balancer";
pub const NETWORK_SERVICE: &str = "network";

#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    token: TokenBody,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenBody {
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    pub interface: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_id: Option<String>,
    pub url: String,
}

/// An authenticated session against one OpenStack cloud.
#[derive(Clone)]
pub struct ProviderClient {
    http: Client,
    token: String,
    catalog: Vec<CatalogEntry>,
    interface: String,
    region: Option<String>,
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("token", &"<redacted>")
            .field("services", &self.catalog.len())
            .field("interface", &self.interface)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl ProviderClient {
    /// Issues a Keystone v3 token. `region_override` takes precedence over
    /// the cloud's `region_name`.
    pub async fn authenticate(
        credentials: &CloudCredentials,
        region_override: Option<&str>,
    ) -> Result<Self> {
        let cloud = &credentials.cloud;
        cloud.validate()?;

        let http = build_http_client(credentials)?;
        let url = token_url(&cloud.auth.auth_url);
        let body = token_request_body(&cloud.auth, &cloud.auth_method()?);

        tracing::debug!("Requesting Keystone token from {}", url);
        let response = http.post(&url).json(&body).send().await?;
        let response = match check_response("identity", response).await {
            Ok(response) => response,
            Err(CleanerError::ApiError { status, message, .. }) => {
                return Err(CleanerError::AuthError {
                    message: format!("{} ({})", message, status),
                })
            }
            Err(e) => return Err(e),
        };

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| CleanerError::AuthError {
                message: format!("response has no {} header", SUBJECT_TOKEN_HEADER),
            })?;

        let token_response: TokenResponse = response.json().await?;
        tracing::debug!(
            "Authenticated; catalog has {} services",
            token_response.token.catalog.len()
        );

        Ok(Self {
            http,
            token,
            catalog: token_response.token.catalog,
            interface: cloud.interface().to_string(),
            region: region_override
                .map(str::to_string)
                .or_else(|| credentials.region().map(str::to_string)),
        })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Finds the catalog URL for `service_type` on the configured interface
    /// and region.
    pub fn endpoint_for(&self, service_type: &str) -> Result<String> {
        self.catalog
            .iter()
            .filter(|entry| entry.service_type == service_type)
            .flat_map(|entry| entry.endpoints.iter())
            .find(|endpoint| {
                endpoint.interface == self.interface
                    && self.region.as_deref().map_or(true, |region| {
                        endpoint.region.as_deref() == Some(region)
                            || endpoint.region_id.as_deref() == Some(region)
                    })
            })
            .map(|endpoint| endpoint.url.clone())
            .ok_or_else(|| CleanerError::EndpointNotFound {
                service_type: service_type.to_string(),
                interface: self.interface.clone(),
                region: self.region.clone().unwrap_or_else(|| "*".to_string()),
            })
    }
}

fn build_http_client(credentials: &CloudCredentials) -> Result<Client> {
    let mut builder = Client::builder();

    if !credentials.cloud.verify_tls() {
        tracing::warn!("TLS certificate verification is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(pem) = &credentials.ca_cert_pem {
        builder = builder.add_root_certificate(Certificate::from_pem(pem)?);
    }

    Ok(builder.build()?)
}

fn token_url(auth_url: &str) -> String {
    let base = auth_url.trim_end_matches('/');
    if base.ends_with("/v3") {
        format!("{}/auth/tokens", base)
    } else {
        format!("{}/v3/auth/tokens", base)
    }
}

fn domain(id: &Option<String>, name: &Option<String>) -> Option<Value> {
    match (id, name) {
        (Some(id), _) => Some(json!({ "id": id })),
        (None, Some(name)) => Some(json!({ "name": name })),
        (None, None) => None,
    }
}

fn token_request_body(auth: &AuthConfig, method: &AuthMethod) -> Value {
    match method {
        AuthMethod::ApplicationCredential => {
            let mut credential = json!({ "secret": auth.application_credential_secret });
            if let Some(id) = &auth.application_credential_id {
                credential["id"] = json!(id);
            } else {
                credential["name"] = json!(auth.application_credential_name);
                let mut user = json!({});
                if let Some(user_id) = &auth.user_id {
                    user["id"] = json!(user_id);
                } else {
                    user["name"] = json!(auth.username);
                }
                if let Some(d) = domain(&auth.user_domain_id, &auth.user_domain_name) {
                    user["domain"] = d;
                }
                credential["user"] = user;
            }
            // application credentials carry their own scope
            json!({
                "auth": {
                    "identity": {
                        "methods": ["application_credential"],
                        "application_credential": credential,
                    }
                }
            })
        }
        AuthMethod::Password => {
            let mut user = json!({ "password": auth.password });
            if let Some(user_id) = &auth.user_id {
                user["id"] = json!(user_id);
            } else {
                user["name"] = json!(auth.username);
                let user_domain = domain(&auth.user_domain_id, &auth.user_domain_name)
                    .or_else(|| domain(&auth.domain_id, &auth.domain_name));
                if let Some(d) = user_domain {
                    user["domain"] = d;
                }
            }

            let mut body = json!({
                "auth": {
                    "identity": {
                        "methods": ["password"],
                        "password": { "user": user },
                    }
                }
            });

            let scope = match (&auth.project_id, &auth.project_name) {
                (Some(id), _) => Some(json!({ "project": { "id": id } })),
                (None, Some(name)) => {
                    let mut project = json!({ "name": name });
                    let project_domain =
                        domain(&auth.project_domain_id, &auth.project_domain_name)
                            .or_else(|| domain(&auth.domain_id, &auth.domain_name));
                    if let Some(d) = project_domain {
                        project["domain"] = d;
                    }
                    Some(json!({ "project": project }))
                }
                (None, None) => None,
            };
            if let Some(scope) = scope {
                body["auth"]["scope"] = scope;
            }
            body
        }
    }
}
