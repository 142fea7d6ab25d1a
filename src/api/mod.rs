pub mod client;
pub mod endpoints;
pub mod models;

#[cfg(test)]
pub mod fake;

use crate::error::SourceError;
use crate::model::{Identity, IdentityInfo, MatchRecord, RankedStanding};

/// Everything the analysis core needs from the match-history backend.
///
/// Implementations must be shareable across worker threads; any request
/// pacing is the implementation's job.
pub trait RemoteDataSource: Send + Sync {
    fn fetch_identity_info(&self, identity: &Identity) -> Result<IdentityInfo, SourceError>;

    fn fetch_ranked_standing(&self, summoner_id: &str) -> Result<RankedStanding, SourceError>;

    fn fetch_match_id_page(
        &self,
        puuid: &str,
        offset: usize,
        count: usize,
    ) -> Result<Vec<String>, SourceError>;

    fn fetch_match(&self, match_id: &str) -> Result<MatchRecord, SourceError>;
}
