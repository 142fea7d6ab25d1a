use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

use crate::api::RemoteDataSource;
use crate::error::{AppError, SourceError};
use crate::model::{Identity, MatchRecord, Participant};

pub const SIDE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Own,
    Opposing,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Own => f.write_str("own"),
            Side::Opposing => f.write_str("opposing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterIssue {
    RequesterMissing,
    TeamCount(usize),
    SideSize { side: Side, count: usize },
}

impl fmt::Display for RosterIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterIssue::RequesterMissing => f.write_str("requesting player is not in the match"),
            RosterIssue::TeamCount(n) => write!(f, "expected 2 teams, found {}", n),
            RosterIssue::SideSize { side, count } => {
                write!(f, "{} side has {} players, expected {}", side, count, SIDE_SIZE)
            }
        }
    }
}

/// Both line-ups of one match, seen from the requesting player's side.
#[derive(Debug, Clone)]
pub struct MatchRoster {
    pub match_id: String,
    pub requester: Identity,
    pub record: MatchRecord,
    pub own: Vec<Participant>,
    pub opposing: Vec<Participant>,
    pub issues: Vec<RosterIssue>,
}

impl MatchRoster {
    pub fn load(
        source: &dyn RemoteDataSource,
        match_id: &str,
        requester: &Identity,
    ) -> Result<Self, AppError> {
        let record = source.fetch_match(match_id).map_err(|e| match e {
            SourceError::NotFound(_) => AppError::MatchNotFound(match_id.to_string()),
            other => AppError::Source(other),
        })?;

        let roster = Self::from_record(record, requester);
        if !roster.is_valid() {
            warn!(
                match_id,
                player = %requester,
                issues = %roster.describe_issues(),
                "roster is invalid"
            );
        }
        Ok(roster)
    }

    pub fn from_record(record: MatchRecord, requester: &Identity) -> Self {
        let mut teams: BTreeMap<i32, Vec<Participant>> = BTreeMap::new();
        for p in &record.participants {
            teams.entry(p.team_id).or_default().push(p.clone());
        }

        let mut issues = Vec::new();
        if teams.len() != 2 {
            issues.push(RosterIssue::TeamCount(teams.len()));
        }

        let own_team = match record.participants.iter().find(|p| &p.identity == requester) {
            Some(p) => Some(p.team_id),
            None => {
                issues.push(RosterIssue::RequesterMissing);
                teams.keys().next().copied()
            }
        };

        let mut own = Vec::new();
        let mut opposing = Vec::new();
        for (team_id, members) in teams {
            if Some(team_id) == own_team {
                own = members;
            } else {
                opposing.extend(members);
            }
        }

        for (side, members) in [(Side::Own, &own), (Side::Opposing, &opposing)] {
            if members.len() != SIDE_SIZE {
                issues.push(RosterIssue::SideSize {
                    side,
                    count: members.len(),
                });
            }
        }

        MatchRoster {
            match_id: record.match_id.clone(),
            requester: requester.clone(),
            record,
            own,
            opposing,
            issues,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn ensure_valid(&self) -> Result<(), AppError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(AppError::RosterInvalid {
                match_id: self.match_id.clone(),
                reason: self.describe_issues(),
            })
        }
    }

    pub fn describe_issues(&self) -> String {
        self.issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn side(&self, side: Side) -> &[Participant] {
        match side {
            Side::Own => &self.own,
            Side::Opposing => &self.opposing,
        }
    }

    pub fn requester_entry(&self) -> Option<&Participant> {
        self.own.iter().find(|p| p.identity == self.requester)
    }

    /// Every participant with the side it played on, own side first.
    pub fn entries(&self) -> impl Iterator<Item = (Side, &Participant)> {
        self.own
            .iter()
            .map(|p| (Side::Own, p))
            .chain(self.opposing.iter().map(|p| (Side::Opposing, p)))
    }
}
