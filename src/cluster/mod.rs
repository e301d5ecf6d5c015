//! Reads OpenStack credentials from a Cluster API `OpenStackCluster`.
//!
//! The cluster's `spec.identityRef` names a Secret in the same namespace
//! holding a `clouds.yaml` (and optionally a `cacert`); `spec.cloudName`
//! selects the entry.

use crate::config::clouds::{CloudCredentials, CloudsFile, DEFAULT_CLOUD_NAME};
use crate::domain::model::ClusterRef;
use crate::utils::error::{CleanerError, Result};
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, DynamicObject};
use kube::core::GroupVersionKind;
use kube::discovery::ApiResource;
use kube::Client;
use serde::Deserialize;

pub const CAPO_GROUP: &str = "infrastructure.cluster.x-k8s.io";
pub const CAPO_VERSION: &str = "v1alpha4";
pub const CAPO_KIND: &str = "OpenStackCluster";

pub const CLOUDS_SECRET_KEY: &str = "clouds.yaml";
pub const CA_CERT_SECRET_KEY: &str = "cacert";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenStackClusterSpec {
    #[serde(default)]
    pub cloud_name: Option<String>,
    #[serde(default)]
    pub identity_ref: Option<IdentityRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityRef {
    #[serde(default)]
    pub kind: String,
    pub name: String,
}

impl OpenStackClusterSpec {
    pub fn cloud_name(&self) -> &str {
        self.cloud_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_CLOUD_NAME)
    }

    /// Name of the identity Secret. Only `Secret` identities are supported.
    pub fn identity_secret(&self) -> Result<&str> {
        let identity = self
            .identity_ref
            .as_ref()
            .ok_or_else(|| CleanerError::MissingConfigError {
                field: "spec.identityRef".to_string(),
            })?;

        if !identity.kind.is_empty() && identity.kind != "Secret" {
            return Err(CleanerError::InvalidConfigValueError {
                field: "spec.identityRef.kind".to_string(),
                value: identity.kind.clone(),
                reason: "only Secret identities are supported".to_string(),
            });
        }
        Ok(&identity.name)
    }
}

pub fn parse_spec(object: &serde_json::Value) -> Result<OpenStackClusterSpec> {
    let spec = object
        .get("spec")
        .cloned()
        .ok_or_else(|| CleanerError::MissingConfigError {
            field: "spec".to_string(),
        })?;
    Ok(serde_json::from_value(spec)?)
}

pub async fn credentials_from_cluster(client: Client, cluster: &ClusterRef) -> Result<CloudCredentials> {
    let gvk = GroupVersionKind::gvk(CAPO_GROUP, CAPO_VERSION, CAPO_KIND);
    let ar = ApiResource::from_gvk(&gvk);
    let clusters: Api<DynamicObject> = Api::namespaced_with(client.clone(), &cluster.namespace, &ar);

    tracing::debug!(
        "Fetching {} {}/{}",
        CAPO_KIND,
        cluster.namespace,
        cluster.name
    );
    let openstack_cluster = clusters.get(&cluster.name).await?;
    let spec = parse_spec(&openstack_cluster.data)?;
    let secret_name = spec.identity_secret()?;

    let secrets: Api<Secret> = Api::namespaced(client, &cluster.namespace);
    let secret = secrets.get(secret_name).await?;

    credentials_from_secret(&secret, spec.cloud_name())
}

pub fn credentials_from_secret(secret: &Secret, cloud_name: &str) -> Result<CloudCredentials> {
    let secret_name = secret.metadata.name.clone().unwrap_or_default();
    let data = secret.data.as_ref().ok_or_else(|| CleanerError::ConfigError {
        message: format!("secret '{}' has no data", secret_name),
    })?;

    let clouds_yaml = data
        .get(CLOUDS_SECRET_KEY)
        .ok_or_else(|| CleanerError::ConfigError {
            message: format!("secret '{}' has no {} key", secret_name, CLOUDS_SECRET_KEY),
        })?;
    let content = std::str::from_utf8(&clouds_yaml.0).map_err(|e| CleanerError::ConfigError {
        message: format!("{} in secret '{}' is not UTF-8: {}", CLOUDS_SECRET_KEY, secret_name, e),
    })?;

    let cloud = CloudsFile::from_yaml_str(content)?.cloud(cloud_name)?.clone();
    let ca_cert_pem = data
        .get(CA_CERT_SECRET_KEY)
        .map(|ca| ca.0.clone())
        .filter(|ca| !ca.is_empty());

    Ok(CloudCredentials::new(cloud, ca_cert_pem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use k8s_openapi::ByteString;
    use serde_json::json;
    use std::collections::BTreeMap;

    const CLOUDS_YAML: &str = r#"
clouds:
  openstack:
    auth:
      auth_url: https://keystone.example.com:5000/v3
      application_credential_id: 0123abcd
      application_credential_secret: xyz
    region_name: RegionOne
"#;

    fn secret(entries: &[(&str, &str)]) -> Secret {
        let data: BTreeMap<String, ByteString> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
            .collect();
        Secret {
            metadata: ObjectMeta {
                name: Some("abc12-cloud-config".to_string()),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_spec() {
        let object = json!({
            "spec": {
                "cloudName": "prod",
                "identityRef": { "kind": "Secret", "name": "abc12-cloud-config" },
                "managedSecurityGroups": true
            }
        });

        let spec = parse_spec(&object).unwrap();
        assert_eq!(spec.cloud_name(), "prod");
        assert_eq!(spec.identity_secret().unwrap(), "abc12-cloud-config");
    }

    #[test]
    fn test_spec_defaults_and_missing_identity() {
        let spec = parse_spec(&json!({ "spec": {} })).unwrap();
        assert_eq!(spec.cloud_name(), DEFAULT_CLOUD_NAME);
        assert!(matches!(
            spec.identity_secret(),
            Err(CleanerError::MissingConfigError { .. })
        ));

        let spec = parse_spec(&json!({
            "spec": { "identityRef": { "kind": "ConfigMap", "name": "x" } }
        }))
        .unwrap();
        assert!(spec.identity_secret().is_err());
    }

    #[test]
    fn test_credentials_from_secret() {
        let secret = secret(&[(CLOUDS_SECRET_KEY, CLOUDS_YAML), (CA_CERT_SECRET_KEY, "PEM")]);

        let creds = credentials_from_secret(&secret, "openstack").unwrap();
        assert_eq!(creds.region(), Some("RegionOne"));
        assert_eq!(creds.ca_cert_pem.as_deref(), Some(&b"PEM"[..]));
    }

    #[test]
    fn test_empty_cacert_is_ignored() {
        let secret = secret(&[(CLOUDS_SECRET_KEY, CLOUDS_YAML), (CA_CERT_SECRET_KEY, "")]);
        let creds = credentials_from_secret(&secret, "openstack").unwrap();
        assert!(creds.ca_cert_pem.is_none());
    }

    #[test]
    fn test_secret_without_clouds_yaml() {
        let secret = secret(&[(CA_CERT_SECRET_KEY, "PEM")]);
        assert!(matches!(
            credentials_from_secret(&secret, "openstack"),
            Err(CleanerError::ConfigError { .. })
        ));
    }
}
