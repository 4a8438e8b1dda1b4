//! The seeding run: probe, look up, insert, verify.
//!
//! Each step is awaited before the next starts and the run stops at the
//! first step that comes back empty or rejected. Nothing is retried.

use reqwest::StatusCode;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::{Query, RestClient};
use crate::config::SeedConfig;
use crate::models::{
    DashboardAggregate, MIN_TEAMS, TeamMembershipRow, UserRow, sample_stats,
};

pub const PLAYER_STATS: &str = "player_stats";
pub const USERS: &str = "users";
pub const TEAM_MEMBERS: &str = "team_members";
pub const USER_DASHBOARD_STATS: &str = "user_dashboard_stats";

/// PostgREST's message prefix for an unknown relation.
const TABLE_MISSING_MARKER: &str = "Could not find";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("player_stats table does not exist: {0}")]
    TableMissing(String),
    #[error("Unknown response from player_stats probe: status {status}: {body}")]
    ProbeFailed { status: u16, body: String },
    #[error("Backend not reachable: {0}")]
    Unreachable(String),
    #[error("Could not get user ID for {0}")]
    UserNotFound(String),
    #[error("User needs at least 2 teams, found {0}")]
    NotEnoughTeams(usize),
    #[error("Failed to create sample stats")]
    InsertRejected,
    #[error("Dashboard view returned no record for user {0}")]
    AggregateMissing(Uuid),
}

/// Outcome of probing the `player_stats` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableProbe {
    /// The table answered a read with 200.
    Present,
    /// The backend reported the table as unknown.
    Missing { body: String },
    /// Any other status; the schema or the service is in an unknown state.
    Unexpected { status: u16, body: String },
    /// The request never got a response.
    Unreachable(String),
}

impl TableProbe {
    pub fn is_present(&self) -> bool {
        matches!(self, TableProbe::Present)
    }

    /// Converts a non-present probe into the error that aborts the run.
    pub fn into_result(self) -> Result<(), SeedError> {
        match self {
            TableProbe::Present => Ok(()),
            TableProbe::Missing { body } => Err(SeedError::TableMissing(body)),
            TableProbe::Unexpected { status, body } => {
                Err(SeedError::ProbeFailed { status, body })
            }
            TableProbe::Unreachable(reason) => Err(SeedError::Unreachable(reason)),
        }
    }
}

/// Seeds sample stats for one user and checks the dashboard view.
pub struct SeedingWorkflow {
    client: RestClient,
    user_email: String,
}

impl SeedingWorkflow {
    pub fn new(config: &SeedConfig) -> Self {
        Self {
            client: RestClient::new(config),
            user_email: config.user_email.clone(),
        }
    }

    /// Reads one row of `player_stats` and classifies the answer.
    pub async fn probe(&self) -> TableProbe {
        info!("Checking if {PLAYER_STATS} table exists...");

        let resp = match self
            .client
            .get(PLAYER_STATS, &Query::new().limit(1))
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("Could not reach {}: {e}", self.client.base_url());
                return TableProbe::Unreachable(e.to_string());
            }
        };

        if resp.status == StatusCode::OK {
            info!("{PLAYER_STATS} table exists");
            TableProbe::Present
        } else if resp.body.contains(TABLE_MISSING_MARKER) {
            error!("{PLAYER_STATS} table does not exist");
            TableProbe::Missing { body: resp.body }
        } else {
            warn!("Unknown response: {} - {}", resp.status, resp.body);
            TableProbe::Unexpected {
                status: resp.status.as_u16(),
                body: resp.body,
            }
        }
    }

    /// Returns true when the `player_stats` table is readable.
    pub async fn probe_table(&self) -> bool {
        self.probe().await.is_present()
    }

    /// Looks up the id of the user with exactly this email.
    pub async fn resolve_user(&self, email: &str) -> Option<Uuid> {
        info!("Getting user ID for {email}...");

        let query = Query::new().eq("email", email).select("id");
        match self.client.select::<UserRow>(USERS, &query).await {
            Ok(users) => match users.first() {
                Some(user) => {
                    info!("Found user ID: {}", user.id);
                    Some(user.id)
                }
                None => {
                    error!("Could not get user ID: no user with email {email}");
                    None
                }
            },
            Err(e) => {
                error!("Could not get user ID: {e}");
                None
            }
        }
    }

    /// Returns the user's active team ids in the order the backend lists them.
    ///
    /// Duplicate memberships of the same team collapse to one entry.
    pub async fn resolve_teams(&self, user_id: Uuid) -> Vec<Uuid> {
        info!("Getting teams for user {user_id}...");

        let query = Query::new()
            .eq("user_id", user_id)
            .eq("is_active", true)
            .select("team_id");
        match self
            .client
            .select::<TeamMembershipRow>(TEAM_MEMBERS, &query)
            .await
        {
            Ok(rows) => {
                let mut team_ids: Vec<Uuid> = Vec::with_capacity(rows.len());
                for row in rows {
                    if !team_ids.contains(&row.team_id) {
                        team_ids.push(row.team_id);
                    }
                }
                info!("Found {} teams: {:?}", team_ids.len(), team_ids);
                team_ids
            }
            Err(e) => {
                error!("Could not get teams: {e}");
                Vec::new()
            }
        }
    }

    /// Inserts the three sample stat rows in one request.
    ///
    /// Refuses without sending anything when fewer than two teams are given.
    pub async fn insert_sample_stats(&self, user_id: Uuid, team_ids: &[Uuid]) -> bool {
        let Some(stats) = sample_stats(user_id, team_ids) else {
            error!(
                "User needs at least {MIN_TEAMS} teams, found {}",
                team_ids.len()
            );
            return false;
        };

        info!("Creating {} sample player stats...", stats.len());
        match self.client.post(PLAYER_STATS, &stats).await {
            Ok(resp) if resp.is_ok_or_created() => {
                info!("Sample player stats created");
                true
            }
            Ok(resp) => {
                error!(
                    "Failed to create sample stats: status {}: {}",
                    resp.status, resp.body
                );
                false
            }
            Err(e) => {
                error!("Failed to create sample stats: {e}");
                false
            }
        }
    }

    /// Reads the dashboard aggregate for the user.
    pub async fn verify_aggregate(&self, user_id: Uuid) -> Option<DashboardAggregate> {
        info!("Testing {USER_DASHBOARD_STATS} view...");

        let query = Query::new().eq("user_id", user_id);
        match self
            .client
            .select::<DashboardAggregate>(USER_DASHBOARD_STATS, &query)
            .await
        {
            Ok(rows) => {
                let first = rows.into_iter().next();
                if first.is_none() {
                    error!("Dashboard view test failed: no row for user {user_id}");
                }
                first
            }
            Err(e) => {
                error!("Dashboard view test failed: {e}");
                None
            }
        }
    }

    /// Runs all five steps in order and returns the aggregate read back.
    pub async fn run(&self) -> Result<DashboardAggregate, SeedError> {
        let probe = self.probe().await;
        if let TableProbe::Missing { .. } = probe {
            error!("Cannot create sample data - {PLAYER_STATS} table doesn't exist");
            info!("Please run the {PLAYER_STATS} SQL migration in the Supabase dashboard first");
        }
        probe.into_result()?;
        info!("Adding sample data...");

        let user_id = self
            .resolve_user(&self.user_email)
            .await
            .ok_or_else(|| SeedError::UserNotFound(self.user_email.clone()))?;

        let team_ids = self.resolve_teams(user_id).await;

        if !self.insert_sample_stats(user_id, &team_ids).await {
            return Err(if team_ids.len() < MIN_TEAMS {
                SeedError::NotEnoughTeams(team_ids.len())
            } else {
                SeedError::InsertRejected
            });
        }

        let aggregate = self
            .verify_aggregate(user_id)
            .await
            .ok_or(SeedError::AggregateMissing(user_id))?;

        info!("SUCCESS! Dashboard shows:");
        info!("  - Matches Played: {}", aggregate.matches_played);
        info!("  - Goals Scored: {}", aggregate.goals_scored);
        info!("  - Assists: {}", aggregate.assists);
        info!("  - Teams Joined: {}", aggregate.teams_joined);

        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_into_result() {
        assert_eq!(TableProbe::Present.into_result(), Ok(()));
        assert_eq!(
            TableProbe::Missing {
                body: "Could not find the table".to_string()
            }
            .into_result(),
            Err(SeedError::TableMissing("Could not find the table".to_string()))
        );
        assert_eq!(
            TableProbe::Unexpected {
                status: 503,
                body: "down".to_string()
            }
            .into_result(),
            Err(SeedError::ProbeFailed {
                status: 503,
                body: "down".to_string()
            })
        );
    }

    #[test]
    fn test_only_present_counts_as_present() {
        assert!(TableProbe::Present.is_present());
        assert!(!TableProbe::Unreachable("refused".to_string()).is_present());
        assert!(
            !TableProbe::Missing {
                body: String::new()
            }
            .is_present()
        );
    }

    #[test]
    fn test_error_messages_carry_body() {
        let err = SeedError::ProbeFailed {
            status: 500,
            body: "{\"message\":\"boom\"}".to_string(),
        };
        assert!(err.to_string().contains("boom"));
        assert_eq!(
            SeedError::NotEnoughTeams(1).to_string(),
            "User needs at least 2 teams, found 1"
        );
    }
}
