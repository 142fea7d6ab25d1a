use crate::config::Config;
use crate::error::SourceError;
use crate::model::{Identity, IdentityInfo, MatchRecord, RankedEntry, RankedStanding};
use crate::rate_limit::Pacer;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::endpoints;
use super::models::*;
use super::RemoteDataSource;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RiotApiClient {
    config: Config,
    agent: ureq::Agent,
    pacer: Arc<Pacer>,
}

impl RiotApiClient {
    pub fn new(config: Config, pacer: Arc<Pacer>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("league_signals/0.1.0")
            .build();
        RiotApiClient {
            config,
            agent,
            pacer,
        }
    }

    fn execute_request(&self, url: &str, what: &str) -> Result<String, SourceError> {
        let mut retry_count = 0;

        loop {
            self.pacer.wait();
            debug!(what, "GET");

            match self.agent.get(url).call() {
                Ok(resp) => {
                    return resp
                        .into_string()
                        .map_err(|e| SourceError::Transport(e.to_string()));
                }
                Err(ureq::Error::Status(404, _)) => {
                    return Err(SourceError::NotFound(what.to_string()));
                }
                Err(ureq::Error::Status(429, _)) => {
                    // Rate limited - wait and retry
                    if retry_count >= MAX_RETRIES {
                        return Err(SourceError::RateLimited);
                    }
                    let wait_ms = 2000 * (retry_count + 1) as u64;
                    warn!(what, wait_ms, "rate limited, backing off");
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(ureq::Error::Status(code, _)) => {
                    return Err(SourceError::Transport(format!("{}: HTTP {}", what, code)));
                }
                Err(e) => {
                    return Err(SourceError::Transport(e.to_string()));
                }
            }
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T, SourceError> {
        let body = self.execute_request(url, what)?;
        serde_json::from_str(&body).map_err(|e| SourceError::Malformed(format!("{}: {}", what, e)))
    }
}

impl RemoteDataSource for RiotApiClient {
    fn fetch_identity_info(&self, identity: &Identity) -> Result<IdentityInfo, SourceError> {
        let url = endpoints::summoner_by_name(
            &self.config.region,
            identity.as_str(),
            &self.config.api_key,
        );
        let summoner: SummonerDto = self.get_json(&url, &format!("summoner {}", identity))?;
        Ok(summoner.into_identity_info(identity))
    }

    fn fetch_ranked_standing(&self, summoner_id: &str) -> Result<RankedStanding, SourceError> {
        let url = endpoints::league_entries(&self.config.region, summoner_id, &self.config.api_key);
        let entries: Vec<LeagueEntryDto> =
            self.get_json(&url, &format!("league entries {}", summoner_id))?;
        Ok(RankedStanding::new(
            entries.into_iter().map(RankedEntry::from).collect(),
        ))
    }

    fn fetch_match_id_page(
        &self,
        puuid: &str,
        offset: usize,
        count: usize,
    ) -> Result<Vec<String>, SourceError> {
        let url = endpoints::match_id_page(
            &self.config.region,
            puuid,
            offset,
            count,
            &self.config.api_key,
        );
        self.get_json(&url, "match id page")
    }

    fn fetch_match(&self, match_id: &str) -> Result<MatchRecord, SourceError> {
        let url = endpoints::match_by_id(&self.config.region, match_id, &self.config.api_key);
        let dto: MatchDto = self.get_json(&url, &format!("match {}", match_id))?;
        MatchRecord::try_from(dto)
    }
}
