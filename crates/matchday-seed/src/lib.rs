//! Sample-data seeding for the MatchDay player dashboard.
//!
//! Inserts a fixed set of `player_stats` rows for a demo player through the
//! Supabase REST API, then reads the `user_dashboard_stats` view back so the
//! dashboard can be checked by hand.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use matchday_seed::prelude::*;
//!
//! let config = SeedConfig::resolve(Some(url), Some(service_key))?
//!     .with_user_email("player@matchday.com");
//! let aggregate = SeedingWorkflow::new(&config).run().await?;
//! println!("goals: {}", aggregate.goals_scored);
//! ```

pub mod api;
pub mod config;
pub mod models;
pub mod workflow;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::api::{ApiError, Query, RestClient, RestResponse};
    pub use crate::config::{ConfigError, SeedConfig};
    pub use crate::models::{DashboardAggregate, PlayerStat, sample_stats};
    pub use crate::workflow::{SeedError, SeedingWorkflow, TableProbe};
}
