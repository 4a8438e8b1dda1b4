//! Rows read from and written to the backend.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Minimum number of distinct teams a user needs before stats are seeded.
pub const MIN_TEAMS: usize = 2;

/// Upper bound on `minutes_played` for a single match.
pub const MATCH_MINUTES: u8 = 90;

/// Projection of a `users` row.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
}

/// Projection of a `team_members` row.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamMembershipRow {
    pub team_id: Uuid,
}

/// A `player_stats` row to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub goals: u32,
    pub assists: u32,
    pub minutes_played: u8,
}

/// One fixed sample line: which team (by position) and the match numbers.
#[derive(Debug, Clone, Copy)]
struct SampleLine {
    team: usize,
    goals: u32,
    assists: u32,
    minutes_played: u8,
}

const SAMPLE_LINES: [SampleLine; 3] = [
    SampleLine {
        team: 0,
        goals: 2,
        assists: 1,
        minutes_played: 90,
    },
    SampleLine {
        team: 0,
        goals: 1,
        assists: 2,
        minutes_played: 85,
    },
    SampleLine {
        team: 1,
        goals: 3,
        assists: 0,
        minutes_played: 90,
    },
];

/// Builds the sample stats for `user_id` across the first two teams.
///
/// Returns `None` when fewer than [`MIN_TEAMS`] teams are given.
pub fn sample_stats(user_id: Uuid, team_ids: &[Uuid]) -> Option<Vec<PlayerStat>> {
    if team_ids.len() < MIN_TEAMS {
        return None;
    }

    let stats = SAMPLE_LINES
        .iter()
        .map(|line| PlayerStat {
            user_id,
            team_id: team_ids[line.team],
            goals: line.goals,
            assists: line.assists,
            minutes_played: line.minutes_played,
        })
        .collect();
    Some(stats)
}

/// A row of the `user_dashboard_stats` view.
///
/// Fields the view omits or returns as null read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DashboardAggregate {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub matches_played: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub goals_scored: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub assists: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub teams_joined: i64,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_default())
}
