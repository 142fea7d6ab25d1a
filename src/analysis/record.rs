use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};

use super::profile::{PlayerProfile, ProfileWarning};
use super::roster::MatchRoster;
use super::signals::{TeamSignalAggregator, TeamSignals};
use crate::cache::PlayerRegistry;
use crate::error::AppError;
use crate::model::Identity;

type Resolution = Result<Arc<PlayerProfile>, AppError>;

/// One exported row per (match, player). `None` means the metric could
/// not be computed and is exported as an empty cell (CSV) or null (JSONL),
/// never as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub match_id: String,
    pub player: String,
    pub champion: String,
    pub own_side_won: bool,
    pub player_ranked_win_rate: Option<f64>,
    pub player_incapacitation_ratio: Option<f64>,
    pub player_one_trick: bool,
    pub player_off_mode_heavy: Option<bool>,
    pub player_win_streak: Option<i32>,
    pub player_filtered_matches: usize,
    pub smurf_count_own: usize,
    pub smurf_count_opposing: usize,
    pub hot_streak_count_own: usize,
    pub hot_streak_count_opposing: usize,
    pub veteran_count_own: usize,
    pub veteran_count_opposing: usize,
    pub inter_count_own: usize,
    pub inter_count_opposing: usize,
    pub break_count_own: usize,
    pub break_count_opposing: usize,
    pub off_mode_count_own: usize,
    pub off_mode_count_opposing: usize,
    pub ranked_wr_median_own: Option<f64>,
    pub ranked_wr_min_own: Option<f64>,
    pub ranked_wr_max_own: Option<f64>,
    pub ranked_wr_median_opposing: Option<f64>,
    pub ranked_wr_min_opposing: Option<f64>,
    pub ranked_wr_max_opposing: Option<f64>,
    pub highest_median_kda_own: Option<f64>,
    pub highest_median_kda_opposing: Option<f64>,
    pub skipped_match_fetches: usize,
    pub short_window_profiles: usize,
    pub standing_unavailable_profiles: usize,
}

impl AnalysisRecord {
    /// Export column order; matches the field order above.
    pub const COLUMNS: [&'static str; 33] = [
        "match_id",
        "player",
        "champion",
        "own_side_won",
        "player_ranked_win_rate",
        "player_incapacitation_ratio",
        "player_one_trick",
        "player_off_mode_heavy",
        "player_win_streak",
        "player_filtered_matches",
        "smurf_count_own",
        "smurf_count_opposing",
        "hot_streak_count_own",
        "hot_streak_count_opposing",
        "veteran_count_own",
        "veteran_count_opposing",
        "inter_count_own",
        "inter_count_opposing",
        "break_count_own",
        "break_count_opposing",
        "off_mode_count_own",
        "off_mode_count_opposing",
        "ranked_wr_median_own",
        "ranked_wr_min_own",
        "ranked_wr_max_own",
        "ranked_wr_median_opposing",
        "ranked_wr_min_opposing",
        "ranked_wr_max_opposing",
        "highest_median_kda_own",
        "highest_median_kda_opposing",
        "skipped_match_fetches",
        "short_window_profiles",
        "standing_unavailable_profiles",
    ];

    fn assemble(
        roster: &MatchRoster,
        champion: String,
        own_side_won: bool,
        requester: &PlayerProfile,
        signals: &TeamSignals,
        health: RosterHealth,
    ) -> Self {
        let (own, opp) = (&signals.own, &signals.opposing);
        AnalysisRecord {
            match_id: roster.match_id.clone(),
            player: roster.requester.to_string(),
            player_one_trick: requester.is_one_trick(&champion),
            champion,
            own_side_won,
            player_ranked_win_rate: requester.ranked_win_rate(),
            player_incapacitation_ratio: requester.average_incapacitation_ratio(),
            player_off_mode_heavy: requester.is_off_mode_heavy(),
            player_win_streak: requester.win_streak_score(),
            player_filtered_matches: requester.filtered_matches().len(),
            smurf_count_own: own.smurf_count,
            smurf_count_opposing: opp.smurf_count,
            hot_streak_count_own: own.hot_streak_count,
            hot_streak_count_opposing: opp.hot_streak_count,
            veteran_count_own: own.veteran_count,
            veteran_count_opposing: opp.veteran_count,
            inter_count_own: own.inter_count,
            inter_count_opposing: opp.inter_count,
            break_count_own: own.break_count,
            break_count_opposing: opp.break_count,
            off_mode_count_own: own.off_mode_count,
            off_mode_count_opposing: opp.off_mode_count,
            ranked_wr_median_own: own.ranked_win_rate.median,
            ranked_wr_min_own: own.ranked_win_rate.min,
            ranked_wr_max_own: own.ranked_win_rate.max,
            ranked_wr_median_opposing: opp.ranked_win_rate.median,
            ranked_wr_min_opposing: opp.ranked_win_rate.min,
            ranked_wr_max_opposing: opp.ranked_win_rate.max,
            highest_median_kda_own: own.highest_median_kda,
            highest_median_kda_opposing: opp.highest_median_kda,
            skipped_match_fetches: health.skipped_match_fetches,
            short_window_profiles: health.short_window_profiles,
            standing_unavailable_profiles: health.standing_unavailable_profiles,
        }
    }
}

/// Data-quality counts over the ten resolved profiles.
#[derive(Debug, Clone, Copy, Default)]
struct RosterHealth {
    skipped_match_fetches: usize,
    short_window_profiles: usize,
    standing_unavailable_profiles: usize,
}

impl RosterHealth {
    fn of<'a>(profiles: impl IntoIterator<Item = &'a Arc<PlayerProfile>>) -> Self {
        let mut health = RosterHealth::default();
        for profile in profiles {
            health.skipped_match_fetches += profile.tally().skipped;
            for warning in profile.warnings() {
                match warning {
                    ProfileWarning::ShortWindow { .. } => health.short_window_profiles += 1,
                    ProfileWarning::StandingUnavailable(_) => {
                        health.standing_unavailable_profiles += 1
                    }
                }
            }
        }
        health
    }
}

/// Turns (match, player) requests into records, sharing one registry.
pub struct RecordBuilder {
    registry: Arc<PlayerRegistry>,
    workers: usize,
}

impl RecordBuilder {
    pub fn new(registry: Arc<PlayerRegistry>, workers: usize) -> Self {
        RecordBuilder {
            registry,
            workers: workers.max(1),
        }
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn build(
        &self,
        match_id: &str,
        requester: &Identity,
        window_size: usize,
    ) -> Result<AnalysisRecord, AppError> {
        let roster = MatchRoster::load(self.registry.source(), match_id, requester)?;
        roster.ensure_valid()?;

        let identities: Vec<Identity> = roster.entries().map(|(_, p)| p.identity.clone()).collect();
        let mut profiles = Vec::with_capacity(identities.len());
        for resolution in self.resolve_all(&identities, window_size) {
            profiles.push(resolution?);
        }
        let opposing = profiles.split_off(roster.own.len());
        let own = profiles;

        let (requester_entry, requester_profile) = roster
            .own
            .iter()
            .zip(&own)
            .find(|(entry, _)| &entry.identity == requester)
            .ok_or_else(|| AppError::RosterInvalid {
                match_id: match_id.to_string(),
                reason: "requesting player is not in the match".to_string(),
            })?;

        let signals = TeamSignalAggregator::aggregate(&own, &opposing);
        let health = RosterHealth::of(own.iter().chain(&opposing));

        let record = AnalysisRecord::assemble(
            &roster,
            requester_entry.champion.clone(),
            requester_entry.win,
            requester_profile,
            &signals,
            health,
        );
        info!(match_id, player = %requester, "record built");
        Ok(record)
    }

    /// Resolves every identity on a bounded pool; results keep input order.
    fn resolve_all(&self, identities: &[Identity], window_size: usize) -> Vec<Resolution> {
        let next = AtomicUsize::new(0);
        let pool = self.workers.min(identities.len()).max(1);
        debug!(players = identities.len(), pool, "resolving roster");

        let mut resolved: Vec<(usize, Resolution)> = thread::scope(|s| {
            let handles: Vec<_> = (0..pool)
                .map(|_| {
                    s.spawn(|| {
                        let mut out = Vec::new();
                        loop {
                            let i = next.fetch_add(1, Ordering::SeqCst);
                            let Some(identity) = identities.get(i) else {
                                break;
                            };
                            out.push((i, self.registry.get_or_create(identity, window_size)));
                        }
                        out
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        resolved.sort_by_key(|(i, _)| *i);
        resolved.into_iter().map(|(_, r)| r).collect()
    }
}
