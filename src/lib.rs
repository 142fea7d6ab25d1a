//! # League Signals
//!
//! Collects recent match history for the ten players of a League of Legends
//! match and derives behavioural signals (streaks, smurfs, inters, breaks,
//! one-tricks) into one flat record per (match, player).
//!
//! - **api**: the `RemoteDataSource` contract and the Riot HTTP client
//! - **analysis**: player profiles, rosters, team signals, record assembly
//! - **cache**: run-scoped player registry
//! - **run** / **storage**: batch runner and JSONL export

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod rate_limit;
pub mod run;
pub mod storage;
