use chrono::Duration;
use std::sync::Arc;

use super::profile::PlayerProfile;
use super::stats::Spread;

pub const SMURF_KDA: f64 = 4.5;
pub const INTER_WIN_RATE: f64 = 0.35;

pub fn break_threshold() -> Duration {
    Duration::days(20)
}

/// Behavioural signals for one five-player side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideSignals {
    pub smurf_count: usize,
    pub inter_count: usize,
    pub break_count: usize,
    pub veteran_count: usize,
    pub hot_streak_count: usize,
    pub off_mode_count: usize,
    pub highest_median_kda: Option<f64>,
    pub ranked_win_rate: Spread,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamSignals {
    pub own: SideSignals,
    pub opposing: SideSignals,
}

pub struct TeamSignalAggregator;

impl TeamSignalAggregator {
    /// Each side is aggregated on its own; players whose metric is
    /// unavailable are left out of that metric.
    pub fn aggregate(own: &[Arc<PlayerProfile>], opposing: &[Arc<PlayerProfile>]) -> TeamSignals {
        TeamSignals {
            own: Self::side(own),
            opposing: Self::side(opposing),
        }
    }

    pub fn side(players: &[Arc<PlayerProfile>]) -> SideSignals {
        let median_kdas: Vec<f64> = players.iter().filter_map(|p| p.median_kda()).collect();

        SideSignals {
            smurf_count: median_kdas.iter().filter(|&&kda| kda > SMURF_KDA).count(),
            inter_count: players
                .iter()
                .filter_map(|p| p.recent_win_rate())
                .filter(|&wr| wr < INTER_WIN_RATE)
                .count(),
            break_count: players
                .iter()
                .filter(|p| p.longest_inactivity_gap() > break_threshold())
                .count(),
            veteran_count: players.iter().filter(|p| p.is_veteran()).count(),
            hot_streak_count: players.iter().filter(|p| p.is_hot_streak()).count(),
            off_mode_count: players
                .iter()
                .filter(|p| p.is_off_mode_heavy() == Some(true))
                .count(),
            highest_median_kda: median_kdas.iter().copied().reduce(f64::max),
            ranked_win_rate: Spread::of(players.iter().map(|p| p.ranked_win_rate())),
        }
    }
}
