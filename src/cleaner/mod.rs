pub mod engine;
pub mod loadbalancers;
pub mod report;

pub use crate::domain::ports::Cleaner;
pub use engine::{connect, load_credentials, CleanupEngine, OpenStackLoadBalancerCleaner};
pub use loadbalancers::{must_be_deleted, LoadBalancerCleaner, SERVICE_TAG_PREFIX};
