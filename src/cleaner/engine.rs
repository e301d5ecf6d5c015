use crate::cleaner::loadbalancers::LoadBalancerCleaner;
use crate::cleaner::report::write_report;
use crate::config::clouds::CloudCredentials;
use crate::config::settings::{CleanerSettings, CredentialSource, ReportSettings};
use crate::domain::model::{ActionKind, CleanupReport};
use crate::domain::ports::Cleaner;
use crate::openstack::{LoadBalancerClient, NetworkingClient, ProviderClient, WaitOptions};
use crate::utils::error::Result;

pub type OpenStackLoadBalancerCleaner = LoadBalancerCleaner<LoadBalancerClient, NetworkingClient>;

pub struct CleanupEngine<C: Cleaner> {
    cleaner: C,
}

impl<C: Cleaner> CleanupEngine<C> {
    pub fn new(cleaner: C) -> Self {
        Self { cleaner }
    }

    pub async fn run(&self, cluster_tag: &str, report: Option<&ReportSettings>) -> Result<CleanupReport> {
        tracing::info!(cluster_tag, "Starting load balancer cleanup");

        let result = self.cleaner.clean(cluster_tag).await?;

        tracing::info!(
            load_balancers = result.count(ActionKind::DeleteLoadBalancer),
            floating_ips = result.count(ActionKind::DeleteFloatingIp),
            dry_run = result.dry_run,
            "Cleanup finished"
        );

        if let Some(report) = report {
            write_report(&result, &report.path, &report.format)?;
            tracing::info!("Report saved to: {}", report.path);
        }

        Ok(result)
    }
}

/// Resolves provider credentials from the configured source.
pub async fn load_credentials(settings: &CleanerSettings) -> Result<CloudCredentials> {
    match &settings.credentials {
        CredentialSource::CloudsFile { path, cloud } => {
            tracing::info!("Loading cloud '{}' from {}", cloud, path);
            CloudCredentials::from_clouds_file(path, cloud)
        }
        #[cfg(feature = "kube")]
        CredentialSource::Cluster(cluster) => {
            tracing::info!(
                "Reading credentials from OpenStackCluster {}/{}",
                cluster.namespace,
                cluster.name
            );
            let client = kube::Client::try_default().await?;
            crate::cluster::credentials_from_cluster(client, cluster).await
        }
        #[cfg(not(feature = "kube"))]
        CredentialSource::Cluster(_) => Err(crate::utils::error::CleanerError::ConfigError {
            message: "reading credentials from a cluster requires the 'kube' feature".to_string(),
        }),
    }
}

/// Authenticates and builds the OpenStack-backed cleaner.
pub async fn connect(
    settings: &CleanerSettings,
    credentials: &CloudCredentials,
) -> Result<OpenStackLoadBalancerCleaner> {
    let provider = ProviderClient::authenticate(credentials, settings.region.as_deref()).await?;

    let load_balancers = LoadBalancerClient::new(&provider)?;
    let networking = NetworkingClient::new(
        &provider,
        WaitOptions {
            timeout: settings.floating_ip_timeout,
            poll_interval: settings.poll_interval,
        },
    )?;

    Ok(LoadBalancerCleaner::new(load_balancers, networking).with_dry_run(settings.dry_run))
}
