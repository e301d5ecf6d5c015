use crate::domain::model::{ActionKind, CleanupReport, FloatingIp, LoadBalancer};
use crate::domain::ports::{Cleaner, LoadBalancerApi, NetworkingApi};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Tag prefix the Kubernetes cloud provider puts on load balancers it
/// creates for `Service` objects.
pub const SERVICE_TAG_PREFIX: &str = "kube_service_";

/// Deletes the load balancers a cluster's services left behind, together
/// with the floating IPs on their VIP ports.
pub struct LoadBalancerCleaner<L: LoadBalancerApi, N: NetworkingApi> {
    load_balancers: L,
    networking: N,
    dry_run: bool,
}

impl<L: LoadBalancerApi, N: NetworkingApi> LoadBalancerCleaner<L, N> {
    pub fn new(load_balancers: L, networking: N) -> Self {
        Self {
            load_balancers,
            networking,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    async fn clean_floating_ip(
        &self,
        fip: &FloatingIp,
        lb: &LoadBalancer,
        report: &mut CleanupReport,
    ) -> Result<()> {
        let address = &fip.floating_ip_address;
        let detail = format!("{} (loadbalancer {})", address, lb.id);

        if !self.dry_run {
            self.networking.disassociate_floating_ip(address).await?;
        }
        report.record(ActionKind::DisassociateFloatingIp, &fip.id, detail.clone());

        if !self.dry_run {
            self.networking.delete_floating_ip(address).await?;
        }
        report.record(ActionKind::DeleteFloatingIp, &fip.id, detail);
        Ok(())
    }
}

#[async_trait]
impl<L: LoadBalancerApi, N: NetworkingApi> Cleaner for LoadBalancerCleaner<L, N> {
    async fn clean(&self, cluster_tag: &str) -> Result<CleanupReport> {
        let mut report = CleanupReport::new(cluster_tag, self.dry_run);

        let lb_list = self.load_balancers.list_load_balancers().await?;

        for lb in lb_list.iter().filter(|lb| must_be_deleted(lb, cluster_tag)) {
            if !lb.vip_port_id.is_empty() {
                let fip = self
                    .networking
                    .get_floating_ip_by_port_id(&lb.vip_port_id)
                    .await?;

                if let Some(fip) = fip.filter(|f| !f.floating_ip_address.is_empty()) {
                    tracing::info!(
                        ip = %fip.floating_ip_address,
                        loadbalancer = %lb.id,
                        dry_run = self.dry_run,
                        "Cleaning floating IP"
                    );
                    self.clean_floating_ip(&fip, lb, &mut report).await?;
                }
            }

            tracing::info!(id = %lb.id, dry_run = self.dry_run, "Cleaning load balancer");
            if !self.dry_run {
                self.load_balancers.delete_load_balancer(&lb.id, true).await?;
            }
            report.record(ActionKind::DeleteLoadBalancer, &lb.id, lb.name.clone());
        }

        Ok(report)
    }
}

/// True when one of the load balancer's tags starts with
/// `kube_service_<cluster_tag>`.
pub fn must_be_deleted(lb: &LoadBalancer, cluster_tag: &str) -> bool {
    let prefix = format!("{}{}", SERVICE_TAG_PREFIX, cluster_tag);
    lb.tags.iter().any(|tag| tag.starts_with(&prefix))
}
