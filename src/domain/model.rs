use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Octavia load balancer as returned by `GET /v2.0/lbaas/loadbalancers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vip_port_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vip_address: String,
    #[serde(default)]
    pub provisioning_status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// Neutron floating IP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloatingIp {
    pub id: String,
    #[serde(default)]
    pub floating_ip_address: String,
    #[serde(default)]
    pub port_id: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl FloatingIp {
    pub fn is_associated(&self) -> bool {
        self.port_id.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Identifies the `OpenStackCluster` whose identity secret holds the
/// provider credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRef {
    pub namespace: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    DisassociateFloatingIp,
    DeleteFloatingIp,
    DeleteLoadBalancer,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::DisassociateFloatingIp => "disassociate_floating_ip",
            ActionKind::DeleteFloatingIp => "delete_floating_ip",
            ActionKind::DeleteLoadBalancer => "delete_load_balancer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupAction {
    pub kind: ActionKind,
    pub resource_id: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub cluster_tag: String,
    pub dry_run: bool,
    pub actions: Vec<CleanupAction>,
}

impl CleanupReport {
    pub fn new(cluster_tag: &str, dry_run: bool) -> Self {
        Self {
            cluster_tag: cluster_tag.to_string(),
            dry_run,
            actions: Vec::new(),
        }
    }

    pub fn record(&mut self, kind: ActionKind, resource_id: &str, detail: impl Into<String>) {
        self.actions.push(CleanupAction {
            kind,
            resource_id: resource_id.to_string(),
            detail: detail.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind == kind).count()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_balancer_tolerates_null_fields() {
        let lb: LoadBalancer = serde_json::from_value(serde_json::json!({
            "id": "lb-1",
            "name": "kube_service_abc12_default_web",
            "vip_port_id": null,
            "tags": null
        }))
        .unwrap();

        assert_eq!(lb.vip_port_id, "");
        assert!(lb.tags.is_empty());
    }

    #[test]
    fn test_floating_ip_association() {
        let mut fip = FloatingIp {
            id: "fip-1".to_string(),
            floating_ip_address: "203.0.113.10".to_string(),
            port_id: Some("port-1".to_string()),
            status: "ACTIVE".to_string(),
        };
        assert!(fip.is_associated());

        fip.port_id = None;
        assert!(!fip.is_associated());
    }

    #[test]
    fn test_report_counts_actions() {
        let mut report = CleanupReport::new("abc12", false);
        report.record(ActionKind::DeleteFloatingIp, "fip-1", "203.0.113.10");
        report.record(ActionKind::DeleteLoadBalancer, "lb-1", "");
        report.record(ActionKind::DeleteLoadBalancer, "lb-2", "");

        assert_eq!(report.count(ActionKind::DeleteLoadBalancer), 2);
        assert_eq!(report.count(ActionKind::DisassociateFloatingIp), 0);
    }
}
