use chrono::{DateTime, Utc};
use std::fmt;

/// A player handle with every whitespace character removed.
///
/// Build it once at ingestion; after that identities compare exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    pub fn new(raw: &str) -> Self {
        Identity(raw.chars().filter(|c| !c.is_whitespace()).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityInfo {
    pub identity: Identity,
    pub summoner_id: String,
    pub puuid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueueType {
    RankedSolo,
    RankedFlex,
    Other(String),
}

impl QueueType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "RANKED_SOLO_5x5" => QueueType::RankedSolo,
            "RANKED_FLEX_SR" => QueueType::RankedFlex,
            other => QueueType::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub queue: QueueType,
    pub wins: u32,
    pub losses: u32,
    pub veteran: bool,
    pub hot_streak: bool,
}

impl RankedEntry {
    pub fn decided_games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> Option<f64> {
        match self.decided_games() {
            0 => None,
            total => Some(self.wins as f64 / total as f64),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedStanding {
    pub entries: Vec<RankedEntry>,
}

impl RankedStanding {
    pub fn new(entries: Vec<RankedEntry>) -> Self {
        RankedStanding { entries }
    }

    pub fn queue(&self, queue: &QueueType) -> Option<&RankedEntry> {
        self.entries.iter().find(|e| &e.queue == queue)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameMode {
    /// Summoner's Rift 5v5, the only mode counted in a filtered window.
    Classic,
    Other(String),
}

impl GameMode {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "CLASSIC" => GameMode::Classic,
            other => GameMode::Other(other.to_string()),
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, GameMode::Classic)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub identity: Identity,
    pub puuid: String,
    pub champion: String,
    pub team_id: i32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub win: bool,
    pub time_dead_secs: u32,
    pub time_played_secs: u32,
}

impl Participant {
    /// (kills + assists) / max(deaths, 1)
    pub fn kda(&self) -> f64 {
        (self.kills + self.assists) as f64 / self.deaths.max(1) as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub match_id: String,
    pub mode: GameMode,
    pub created_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub participants: Vec<Participant>,
}

impl MatchRecord {
    pub fn participant_by_puuid(&self, puuid: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.puuid == puuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_strips_all_whitespace() {
        assert_eq!(Identity::new("Foo Bar"), Identity::new("FooBar"));
        assert_eq!(Identity::new(" TL\tDa Baby\n").as_str(), "TLDaBaby");
    }

    #[test]
    fn test_identity_is_case_sensitive() {
        assert_ne!(Identity::new("foobar"), Identity::new("FooBar"));
    }

    #[test]
    fn test_queue_and_mode_tags() {
        assert_eq!(QueueType::from_tag("RANKED_SOLO_5x5"), QueueType::RankedSolo);
        assert_eq!(QueueType::from_tag("RANKED_FLEX_SR"), QueueType::RankedFlex);
        assert!(GameMode::from_tag("CLASSIC").is_primary());
        assert!(!GameMode::from_tag("ARAM").is_primary());
    }

    #[test]
    fn test_kda_floors_deaths_at_one() {
        let p = Participant {
            identity: Identity::new("a"),
            puuid: "p".to_string(),
            champion: "Brand".to_string(),
            team_id: 100,
            kills: 3,
            deaths: 0,
            assists: 2,
            win: true,
            time_dead_secs: 0,
            time_played_secs: 1500,
        };
        assert_eq!(p.kda(), 5.0);
    }
}
