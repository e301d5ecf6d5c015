pub mod clouds;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use settings::Overrides;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "lb-cleaner")]
#[command(about = "Removes OpenStack load balancers left behind by a deleted Kubernetes cluster")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Cluster tag; load balancers tagged kube_service_<tag>* are removed
    #[arg(long)]
    pub cluster_tag: Option<String>,

    /// clouds.yaml holding the OpenStack credentials
    #[arg(long)]
    pub clouds_file: Option<String>,

    /// Cloud entry to use from clouds.yaml
    #[arg(long)]
    pub cloud: Option<String>,

    /// Override the region from clouds.yaml
    #[arg(long)]
    pub region: Option<String>,

    /// Namespace of the OpenStackCluster to read credentials from
    #[arg(long)]
    pub namespace: Option<String>,

    /// Name of the OpenStackCluster to read credentials from
    #[arg(long)]
    pub cluster: Option<String>,

    /// List what would be removed without changing anything
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long)]
    pub floating_ip_timeout: Option<u64>,

    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Write a report of the performed actions to this path
    #[arg(long)]
    pub report: Option<String>,

    /// Report format: csv or json
    #[arg(long)]
    pub report_format: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            cluster_tag: self.cluster_tag.clone(),
            clouds_file: self.clouds_file.clone(),
            cloud: self.cloud.clone(),
            region: self.region.clone(),
            namespace: self.namespace.clone(),
            cluster: self.cluster.clone(),
            dry_run: self.dry_run,
            floating_ip_timeout_seconds: self.floating_ip_timeout,
            poll_interval_seconds: self.poll_interval,
            report: self.report.clone(),
            report_format: self.report_format.clone(),
        }
    }
}
