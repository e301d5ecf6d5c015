use crate::domain::model::{CleanupReport, FloatingIp, LoadBalancer};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait LoadBalancerApi: Send + Sync {
    async fn list_load_balancers(&self) -> Result<Vec<LoadBalancer>>;
    async fn delete_load_balancer(&self, id: &str, cascade: bool) -> Result<()>;
}

#[async_trait]
pub trait NetworkingApi: Send + Sync {
    async fn get_floating_ip_by_port_id(&self, port_id: &str) -> Result<Option<FloatingIp>>;
    async fn disassociate_floating_ip(&self, address: &str) -> Result<()>;
    async fn delete_floating_ip(&self, address: &str) -> Result<()>;
}

/// Removes provider resources owned by a cluster.
#[async_trait]
pub trait Cleaner: Send + Sync {
    async fn clean(&self, cluster_tag: &str) -> Result<CleanupReport>;
}
