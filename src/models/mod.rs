//! Data models for Torn and FFScouter entities.
//!
//! This module contains the data structures mirroring upstream JSON:
//!
//! - `User`: the player's own profile, bars and cooldowns
//! - `Faction`, `Member`, `FactionChain`: faction basic data, roster
//!   entries and live chain state
//! - `FfScouterData`: third-party battle stat estimates

pub mod faction;
pub mod scouter;
pub mod user;

pub use faction::{
    ChainResponse, Faction, FactionChain, LastAction, Member, MemberState, OnlineStatus, Status,
};
pub use scouter::FfScouterData;
pub use user::{Bar, Cooldowns, User, UserFaction};
