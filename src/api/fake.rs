//! In-memory `RemoteDataSource` for tests.

use chrono::DateTime;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use super::RemoteDataSource;
use crate::error::SourceError;
use crate::model::{
    GameMode, Identity, IdentityInfo, MatchRecord, Participant, QueueType, RankedEntry,
    RankedStanding,
};

#[derive(Default)]
pub struct FakeSource {
    players: HashMap<Identity, IdentityInfo>,
    standings: HashMap<String, RankedStanding>,
    histories: HashMap<String, Vec<String>>,
    matches: HashMap<String, MatchRecord>,
    transient_failures: Mutex<HashMap<String, u32>>,
    identity_delay: Duration,
    pub identity_calls: AtomicUsize,
    pub standing_calls: AtomicUsize,
    pub page_calls: AtomicUsize,
    pub match_calls: AtomicUsize,
}

pub fn puuid_of(name: &str) -> String {
    format!("puuid-{}", Identity::new(name))
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a player whose puuid is `puuid_of(name)`.
    pub fn with_player(mut self, name: &str, standing: Vec<RankedEntry>) -> Self {
        let identity = Identity::new(name);
        let info = IdentityInfo {
            identity: identity.clone(),
            summoner_id: format!("sid-{}", identity),
            puuid: puuid_of(name),
        };
        self.standings
            .insert(info.summoner_id.clone(), RankedStanding::new(standing));
        self.players.insert(identity, info);
        self
    }

    /// Registers a player with no ranked entries on record at all.
    pub fn with_unranked_player(mut self, name: &str) -> Self {
        let identity = Identity::new(name);
        self.players.insert(
            identity.clone(),
            IdentityInfo {
                identity: identity.clone(),
                summoner_id: format!("sid-{}", identity),
                puuid: puuid_of(name),
            },
        );
        self
    }

    /// Match ids most recent first, including the live slot at index 0.
    pub fn with_history(mut self, name: &str, match_ids: &[&str]) -> Self {
        self.histories.insert(
            puuid_of(name),
            match_ids.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    pub fn with_match(mut self, record: MatchRecord) -> Self {
        self.matches.insert(record.match_id.clone(), record);
        self
    }

    pub fn with_transient_failures(self, match_id: &str, times: u32) -> Self {
        if let Ok(mut failures) = self.transient_failures.lock() {
            failures.insert(match_id.to_string(), times);
        }
        self
    }

    pub fn with_identity_delay(mut self, delay: Duration) -> Self {
        self.identity_delay = delay;
        self
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl RemoteDataSource for FakeSource {
    fn fetch_identity_info(&self, identity: &Identity) -> Result<IdentityInfo, SourceError> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        if !self.identity_delay.is_zero() {
            thread::sleep(self.identity_delay);
        }
        self.players
            .get(identity)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(identity.to_string()))
    }

    fn fetch_ranked_standing(&self, summoner_id: &str) -> Result<RankedStanding, SourceError> {
        self.standing_calls.fetch_add(1, Ordering::SeqCst);
        self.standings
            .get(summoner_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(summoner_id.to_string()))
    }

    fn fetch_match_id_page(
        &self,
        puuid: &str,
        offset: usize,
        count: usize,
    ) -> Result<Vec<String>, SourceError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        let history = self
            .histories
            .get(puuid)
            .ok_or_else(|| SourceError::NotFound(puuid.to_string()))?;
        Ok(history.iter().skip(offset).take(count).cloned().collect())
    }

    fn fetch_match(&self, match_id: &str) -> Result<MatchRecord, SourceError> {
        self.match_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut failures) = self.transient_failures.lock() {
            if let Some(left) = failures.get_mut(match_id) {
                if *left > 0 {
                    *left -= 1;
                    return Err(SourceError::Transport("connection reset".to_string()));
                }
            }
        }
        self.matches
            .get(match_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(match_id.to_string()))
    }
}

pub fn solo(wins: u32, losses: u32) -> RankedEntry {
    RankedEntry {
        queue: QueueType::RankedSolo,
        wins,
        losses,
        veteran: false,
        hot_streak: false,
    }
}

pub fn flex(wins: u32, losses: u32) -> RankedEntry {
    RankedEntry {
        queue: QueueType::RankedFlex,
        ..solo(wins, losses)
    }
}

/// Participant line as (name, champion, team, k, d, a, win).
pub type Line<'a> = (&'a str, &'a str, i32, u32, u32, u32, bool);

pub fn participant(line: Line<'_>) -> Participant {
    let (name, champion, team_id, kills, deaths, assists, win) = line;
    Participant {
        identity: Identity::new(name),
        puuid: puuid_of(name),
        champion: champion.to_string(),
        team_id,
        kills,
        deaths,
        assists,
        win,
        time_dead_secs: 0,
        time_played_secs: 1800,
    }
}

pub fn game(match_id: &str, mode: &str, created_secs: i64, lines: &[Line<'_>]) -> MatchRecord {
    MatchRecord {
        match_id: match_id.to_string(),
        mode: GameMode::from_tag(mode),
        created_at: DateTime::from_timestamp(created_secs, 0).unwrap_or_default(),
        duration_secs: 1800,
        participants: lines.iter().copied().map(participant).collect(),
    }
}
