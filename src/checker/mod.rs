mod cached;
mod github;

pub use cached::CachedAdvisorySource;
pub use github::{GitHubAdvisoryClient, HttpResponse, HttpTransport, ReqwestTransport};

use crate::model::AdvisoryQueryResult;
use async_trait::async_trait;

/// A source of vulnerability advisories for a single package.
///
/// Implementations never fail: every transport or status problem is folded
/// into [`AdvisoryQueryResult`], with a warning when the source could not be
/// reliably queried.
#[async_trait]
pub trait AdvisorySource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn query(&self, name: &str, version: &str) -> AdvisoryQueryResult;
}
