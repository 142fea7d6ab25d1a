use chrono::DateTime;
use serde::Deserialize;

use crate::error::SourceError;
use crate::model::{
    GameMode, Identity, IdentityInfo, MatchRecord, Participant, QueueType, RankedEntry,
};

// Summoner V4 response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    pub id: String,
    pub puuid: String,
}

impl SummonerDto {
    pub fn into_identity_info(self, requested: &Identity) -> IdentityInfo {
        IdentityInfo {
            identity: requested.clone(),
            summoner_id: self.id,
            puuid: self.puuid,
        }
    }
}

// League V4 response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntryDto {
    pub queue_type: String,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub veteran: bool,
    #[serde(default)]
    pub hot_streak: bool,
}

impl From<LeagueEntryDto> for RankedEntry {
    fn from(dto: LeagueEntryDto) -> Self {
        RankedEntry {
            queue: QueueType::from_tag(&dto.queue_type),
            wins: dto.wins,
            losses: dto.losses,
            veteran: dto.veteran,
            hot_streak: dto.hot_streak,
        }
    }
}

// Match V5 response
#[derive(Debug, Deserialize)]
pub struct MatchDto {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub match_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    pub game_mode: String,
    pub game_creation: i64,
    pub game_duration: i64,
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub puuid: String,
    #[serde(default)]
    pub summoner_name: String,
    pub champion_name: String,
    pub team_id: i32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub win: bool,
    #[serde(default)]
    pub total_time_spent_dead: u32,
    #[serde(default)]
    pub time_played: u32,
}

impl From<ParticipantDto> for Participant {
    fn from(dto: ParticipantDto) -> Self {
        Participant {
            identity: Identity::new(&dto.summoner_name),
            puuid: dto.puuid,
            champion: dto.champion_name,
            team_id: dto.team_id,
            kills: dto.kills,
            deaths: dto.deaths,
            assists: dto.assists,
            win: dto.win,
            time_dead_secs: dto.total_time_spent_dead,
            time_played_secs: dto.time_played,
        }
    }
}

impl TryFrom<MatchDto> for MatchRecord {
    type Error = SourceError;

    fn try_from(dto: MatchDto) -> Result<Self, Self::Error> {
        let created_at = DateTime::from_timestamp_millis(dto.info.game_creation).ok_or_else(|| {
            SourceError::Malformed(format!(
                "{}: gameCreation {} out of range",
                dto.metadata.match_id, dto.info.game_creation
            ))
        })?;

        Ok(MatchRecord {
            match_id: dto.metadata.match_id,
            mode: GameMode::from_tag(&dto.info.game_mode),
            created_at,
            duration_secs: dto.info.game_duration,
            participants: dto.info.participants.into_iter().map(Participant::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATCH_JSON: &str = r#"{
        "metadata": {"matchId": "NA1_3931766940", "participants": ["p1"]},
        "info": {
            "gameMode": "CLASSIC",
            "gameCreation": 1620000000000,
            "gameDuration": 1800,
            "participants": [{
                "puuid": "p1",
                "summonerName": "TL DaBaby",
                "championName": "Brand",
                "teamId": 100,
                "kills": 4,
                "deaths": 2,
                "assists": 9,
                "win": true,
                "totalTimeSpentDead": 60,
                "timePlayed": 1800
            }]
        }
    }"#;

    #[test]
    fn test_match_dto_converts_to_record() {
        let dto: MatchDto = serde_json::from_str(MATCH_JSON).unwrap();
        let record = MatchRecord::try_from(dto).unwrap();

        assert_eq!(record.match_id, "NA1_3931766940");
        assert_eq!(record.mode, GameMode::Classic);
        assert_eq!(record.created_at.timestamp(), 1_620_000_000);
        assert_eq!(record.participants[0].identity, Identity::new("TLDaBaby"));
        assert_eq!(record.participants[0].time_dead_secs, 60);
    }

    #[test]
    fn test_league_entry_flags() {
        let dto: LeagueEntryDto = serde_json::from_str(
            r#"{"queueType":"RANKED_FLEX_SR","tier":"BRONZE","wins":4,"losses":6,
                "veteran":true,"hotStreak":false}"#,
        )
        .unwrap();
        let entry = RankedEntry::from(dto);
        assert_eq!(entry.queue, QueueType::RankedFlex);
        assert!(entry.veteran);
        assert!(!entry.hot_streak);
    }
}
