//! Collector trait
//!
//! Every discovery path (files, live cluster, Helm releases) implements
//! [`Collector`]. The scanner only needs a name for logging and a list of
//! discovered resources; it is agnostic to where they came from.

use async_trait::async_trait;
use kubesunset_core::DiscoveredResource;

use crate::error::Result;

/// A source of resources to judge
///
/// Implementations must be Send + Sync so they can run as separate tasks.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Short name used in logs (`file`, `cluster`, `helm3`)
    fn name(&self) -> &str;

    /// Enumerate resources from this source
    async fn collect(&self) -> Result<Vec<DiscoveredResource>>;
}
