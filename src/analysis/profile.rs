use chrono::Duration;
use tracing::{debug, warn};

use super::stats::{fraction, mean, median};
use crate::api::RemoteDataSource;
use crate::error::{AppError, SourceError};
use crate::model::{Identity, IdentityInfo, MatchRecord, Participant, QueueType, RankedStanding};

/// Match-id pages start here so a game still in progress is never counted.
pub const LIVE_GAME_OFFSET: usize = 1;
pub const PAGE_SIZE: usize = 30;

const ONE_TRICK_SHARE: f64 = 0.60;
const OFF_MODE_SHARE: f64 = 0.60;

/// How far back and how stubbornly a profile scans match history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPolicy {
    pub page_size: usize,
    pub max_pages: usize,
    /// Extra attempts for a match that failed with a transport or decode error.
    pub match_retries: u32,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        ScanPolicy {
            page_size: PAGE_SIZE,
            max_pages: 1,
            match_retries: 1,
        }
    }
}

/// How complete the match scan was.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchTally {
    pub fetched: usize,
    pub skipped: usize,
    pub retried: usize,
    pub page_failures: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileWarning {
    StandingUnavailable(String),
    /// Fewer primary-mode matches than requested were found; metrics cover what was found.
    ShortWindow { wanted: usize, found: usize },
}

#[derive(Debug, Clone)]
pub struct PlayerProfile {
    info: IdentityInfo,
    standing: RankedStanding,
    filtered: Vec<MatchRecord>,
    recent: Vec<MatchRecord>,
    tally: FetchTally,
    warnings: Vec<ProfileWarning>,
}

impl PlayerProfile {
    pub fn resolve(
        source: &dyn RemoteDataSource,
        identity: &Identity,
        window_size: usize,
    ) -> Result<Self, AppError> {
        Self::resolve_with(source, identity, window_size, &ScanPolicy::default())
    }

    pub fn resolve_with(
        source: &dyn RemoteDataSource,
        identity: &Identity,
        window_size: usize,
        policy: &ScanPolicy,
    ) -> Result<Self, AppError> {
        if window_size == 0 {
            return Err(AppError::ConfigError(
                "window size must be greater than zero".to_string(),
            ));
        }

        let info = source.fetch_identity_info(identity).map_err(|e| match e {
            SourceError::NotFound(_) => AppError::IdentityNotFound(identity.to_string()),
            other => AppError::Source(other),
        })?;

        let mut warnings = Vec::new();
        let standing = match source.fetch_ranked_standing(&info.summoner_id) {
            Ok(standing) => standing,
            Err(e) => {
                warn!(player = %identity, error = %e, "ranked standing unavailable");
                warnings.push(ProfileWarning::StandingUnavailable(e.to_string()));
                RankedStanding::default()
            }
        };

        let (filtered, recent, tally) = collect_matches(source, &info, window_size, policy);
        if filtered.len() < window_size {
            warnings.push(ProfileWarning::ShortWindow {
                wanted: window_size,
                found: filtered.len(),
            });
        }

        debug!(
            player = %identity,
            filtered = filtered.len(),
            recent = recent.len(),
            skipped = tally.skipped,
            "profile resolved"
        );

        Ok(PlayerProfile {
            info,
            standing,
            filtered,
            recent,
            tally,
            warnings,
        })
    }

    /// Builds a profile from data that was already fetched.
    pub fn from_parts(
        info: IdentityInfo,
        standing: RankedStanding,
        filtered: Vec<MatchRecord>,
        recent: Vec<MatchRecord>,
    ) -> Self {
        PlayerProfile {
            info,
            standing,
            filtered,
            recent,
            tally: FetchTally::default(),
            warnings: Vec::new(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.info.identity
    }

    pub fn info(&self) -> &IdentityInfo {
        &self.info
    }

    pub fn standing(&self) -> &RankedStanding {
        &self.standing
    }

    /// Primary-mode matches, most recent first.
    pub fn filtered_matches(&self) -> &[MatchRecord] {
        &self.filtered
    }

    /// Matches of any mode, most recent first.
    pub fn recent_matches(&self) -> &[MatchRecord] {
        &self.recent
    }

    pub fn tally(&self) -> FetchTally {
        self.tally
    }

    pub fn warnings(&self) -> &[ProfileWarning] {
        &self.warnings
    }

    fn entry<'a>(&self, record: &'a MatchRecord) -> Option<&'a Participant> {
        record.participant_by_puuid(&self.info.puuid)
    }

    /// Solo/duo win rate, falling back to flex when solo has no decided games.
    pub fn ranked_win_rate(&self) -> Option<f64> {
        self.standing
            .queue(&QueueType::RankedSolo)
            .and_then(|e| e.win_rate())
            .or_else(|| {
                self.standing
                    .queue(&QueueType::RankedFlex)
                    .and_then(|e| e.win_rate())
            })
    }

    pub fn is_veteran(&self) -> bool {
        self.standing.entries.iter().any(|e| e.veteran)
    }

    pub fn is_hot_streak(&self) -> bool {
        self.standing.entries.iter().any(|e| e.hot_streak)
    }

    /// +n for n straight wins leading up to now, -n for n straight losses.
    pub fn win_streak_score(&self) -> Option<i32> {
        let outcomes: Vec<bool> = self
            .recent
            .iter()
            .filter_map(|m| self.entry(m))
            .map(|p| p.win)
            .collect();

        let latest = *outcomes.first()?;
        let run = outcomes.iter().take_while(|&&won| won == latest).count() as i32;
        Some(if latest { run } else { -run })
    }

    /// Mean share of each primary-mode game spent dead.
    pub fn average_incapacitation_ratio(&self) -> Option<f64> {
        let ratios: Vec<f64> = self
            .filtered
            .iter()
            .filter_map(|m| {
                let p = self.entry(m)?;
                let played = if p.time_played_secs > 0 {
                    p.time_played_secs as i64
                } else {
                    m.duration_secs
                };
                (played > 0).then(|| p.time_dead_secs as f64 / played as f64)
            })
            .collect();
        mean(&ratios)
    }

    /// No primary-mode history means "not a one-trick", never "unknown".
    pub fn is_one_trick(&self, champion: &str) -> bool {
        let hits = self
            .filtered
            .iter()
            .filter_map(|m| self.entry(m))
            .filter(|p| p.champion == champion)
            .count();
        fraction(hits, self.filtered.len()).is_some_and(|share| share > ONE_TRICK_SHARE)
    }

    pub fn is_off_mode_heavy(&self) -> Option<bool> {
        let off_mode = self.recent.iter().filter(|m| !m.mode.is_primary()).count();
        fraction(off_mode, self.recent.len()).map(|share| share > OFF_MODE_SHARE)
    }

    /// Largest gap between consecutive primary-mode games.
    pub fn longest_inactivity_gap(&self) -> Duration {
        self.filtered
            .windows(2)
            .map(|pair| {
                let gap = pair[0].created_at - pair[1].created_at;
                if gap < Duration::zero() {
                    -gap
                } else {
                    gap
                }
            })
            .max()
            .unwrap_or_else(Duration::zero)
    }

    /// Median of (kills + assists) / max(deaths, 1) over primary-mode games.
    pub fn median_kda(&self) -> Option<f64> {
        let kdas: Vec<f64> = self
            .filtered
            .iter()
            .filter_map(|m| self.entry(m))
            .map(Participant::kda)
            .collect();
        median(&kdas)
    }

    pub fn recent_win_rate(&self) -> Option<f64> {
        let outcomes: Vec<bool> = self
            .filtered
            .iter()
            .filter_map(|m| self.entry(m))
            .map(|p| p.win)
            .collect();
        let wins = outcomes.iter().filter(|&&won| won).count();
        fraction(wins, outcomes.len())
    }
}

fn collect_matches(
    source: &dyn RemoteDataSource,
    info: &IdentityInfo,
    window_size: usize,
    policy: &ScanPolicy,
) -> (Vec<MatchRecord>, Vec<MatchRecord>, FetchTally) {
    let mut filtered = Vec::new();
    let mut recent = Vec::new();
    let mut tally = FetchTally::default();
    let mut offset = LIVE_GAME_OFFSET;

    'pages: for _ in 0..policy.max_pages {
        let page = match source.fetch_match_id_page(&info.puuid, offset, policy.page_size) {
            Ok(page) => page,
            Err(e) => {
                warn!(player = %info.identity, offset, error = %e, "match id page unavailable");
                tally.page_failures += 1;
                break;
            }
        };

        for match_id in &page {
            let Some(record) = fetch_match(source, match_id, policy.match_retries, &mut tally)
            else {
                continue;
            };

            if record.mode.is_primary() {
                filtered.push(record.clone());
            }
            if recent.len() < window_size {
                recent.push(record);
            }
            if filtered.len() >= window_size {
                break 'pages;
            }
        }

        if page.len() < policy.page_size {
            break;
        }
        offset += page.len();
    }

    (filtered, recent, tally)
}

fn fetch_match(
    source: &dyn RemoteDataSource,
    match_id: &str,
    retries: u32,
    tally: &mut FetchTally,
) -> Option<MatchRecord> {
    let mut attempt = 0;
    loop {
        match source.fetch_match(match_id) {
            Ok(record) => {
                tally.fetched += 1;
                return Some(record);
            }
            Err(e) if !e.is_not_found() && attempt < retries => {
                attempt += 1;
                tally.retried += 1;
                debug!(match_id, error = %e, attempt, "retrying match");
            }
            Err(e) => {
                warn!(match_id, error = %e, "skipping match");
                tally.skipped += 1;
                return None;
            }
        }
    }
}
