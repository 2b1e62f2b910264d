// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Online indicator from a player's last action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum OnlineStatus {
    Online,
    Idle,
    Offline,
    Unknown,
}

impl From<String> for OnlineStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Online" => OnlineStatus::Online,
            "Idle" => OnlineStatus::Idle,
            "Offline" => OnlineStatus::Offline,
            _ => OnlineStatus::Unknown,
        }
    }
}

impl OnlineStatus {
    /// Numeric order for sorting: Online > Idle > Offline.
    pub fn sort_order(&self) -> u8 {
        match self {
            OnlineStatus::Online => 1,
            OnlineStatus::Idle => 2,
            OnlineStatus::Offline => 3,
            OnlineStatus::Unknown => 99,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OnlineStatus::Online => "Online",
            OnlineStatus::Idle => "Idle",
            OnlineStatus::Offline => "Offline",
            OnlineStatus::Unknown => "Unknown",
        }
    }
}

/// Physical state of a player as reported by the faction roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum MemberState {
    Okay,
    Hospital,
    Traveling,
    Abroad,
    Federal,
    Jail,
    Unknown,
}

impl From<String> for MemberState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Okay" => MemberState::Okay,
            "Hospital" => MemberState::Hospital,
            "Traveling" => MemberState::Traveling,
            "Abroad" => MemberState::Abroad,
            "Federal" => MemberState::Federal,
            "Jail" => MemberState::Jail,
            _ => MemberState::Unknown,
        }
    }
}

impl MemberState {
    /// Numeric order for the Status column: Okay > Hospital > Traveling > Abroad.
    pub fn sort_order(&self) -> u8 {
        match self {
            MemberState::Okay => 1,
            MemberState::Hospital => 2,
            MemberState::Traveling => 3,
            MemberState::Abroad => 4,
            _ => 99,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MemberState::Okay => "Okay",
            MemberState::Hospital => "Hospital",
            MemberState::Traveling => "Traveling",
            MemberState::Abroad => "Abroad",
            MemberState::Federal => "Federal",
            MemberState::Jail => "Jail",
            MemberState::Unknown => "Unknown",
        }
    }
}

/// Last action timestamps attached to users and roster members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastAction {
    pub status: OnlineStatus,
    pub timestamp: i64,
    #[serde(default)]
    pub relative: String,
}

/// Player status block shared by the user profile and roster members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: String,
    pub state: MemberState,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub until: i64,
    #[serde(default)]
    pub travel_type: Option<String>,
}

impl Status {
    /// Seconds until the state ends (hospital release, flight landing),
    /// clamped to zero. `until` is a unix timestamp.
    pub fn seconds_remaining(&self, now: i64) -> i64 {
        (self.until - now).max(0)
    }

    /// Trim trailing detail from a hospital description, e.g.
    /// "In hospital for 2 hrs 14 mins" becomes "In hospital".
    pub fn clean_description(&self) -> String {
        if let Some(idx) = self.description.find("hospital") {
            self.description[..idx + "hospital".len()].trim().to_string()
        } else {
            self.description.clone()
        }
    }

    /// Whether a traveling player is on the way back to Torn.
    pub fn is_returning(&self) -> bool {
        if self.state != MemberState::Traveling {
            return false;
        }
        if let Some(ref travel_type) = self.travel_type {
            let t = travel_type.to_lowercase();
            if t.contains("return") || t.contains("back") {
                return true;
            }
        }
        self.description.contains("Returning")
    }
}

/// One member of a faction roster. The roster is keyed by player id,
/// so the id lives outside this struct until enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub level: i64,
    #[serde(default)]
    pub days_in_faction: i64,
    #[serde(default)]
    pub position: String,
    pub last_action: LastAction,
    pub status: Status,
}

/// Faction basic data from `/faction/?selections=basic`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    #[serde(rename = "ID")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub respect: i64,
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub best_chain: i64,
    #[serde(default)]
    pub members: HashMap<String, Member>,
    #[serde(default)]
    pub ranked_wars: HashMap<String, RankedWar>,
}

impl Faction {
    /// Find the opposing faction id in the current ranked war, if any.
    /// The war's `factions` map holds both sides keyed by faction id.
    pub fn enemy_faction_id(&self) -> Option<i64> {
        let own = self.id.to_string();
        self.ranked_wars.values().find_map(|war| {
            war.factions
                .keys()
                .find(|key| **key != own)
                .and_then(|key| key.parse().ok())
        })
    }

    /// Roster entries as (player id, member) pairs; entries whose key
    /// fails to parse as an id are dropped.
    pub fn members_with_ids(&self) -> Vec<(i64, &Member)> {
        self.members
            .iter()
            .filter_map(|(key, member)| key.parse().ok().map(|id| (id, member)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedWar {
    #[serde(default)]
    pub factions: HashMap<String, WarFaction>,
    pub war: War,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarFaction {
    pub name: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub chain: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct War {
    pub start: i64,
    #[serde(default)]
    pub end: i64,
    #[serde(default)]
    pub target: i64,
    #[serde(default)]
    pub winner: i64,
}

/// Live chain data from `/v2/faction/chain`. `timeout` is the number
/// of seconds left before the chain drops, `current`/`max` track
/// progress toward the next bonus milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionChain {
    pub id: i64,
    pub current: i64,
    pub max: i64,
    #[serde(default)]
    pub timeout: i64,
    #[serde(default)]
    pub modifier: f64,
    #[serde(default)]
    pub cooldown: i64,
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub end: i64,
}

impl FactionChain {
    /// Progress toward the next milestone as 0..=100.
    pub fn percent(&self) -> f64 {
        if self.max > 0 {
            (self.current as f64 / self.max as f64) * 100.0
        } else {
            0.0
        }
    }

    /// A chain with no hits is idle, not active.
    pub fn is_active(&self) -> bool {
        self.current > 0 && self.timeout > 0
    }

    /// Advance the chain clock by `elapsed` seconds of wall time.
    /// `timeout` and `cooldown` never go below zero.
    pub fn tick(&mut self, elapsed: i64) {
        if elapsed <= 0 {
            return;
        }
        self.timeout = (self.timeout - elapsed).max(0);
        self.cooldown = (self.cooldown - elapsed).max(0);
    }
}

/// The v2 chain endpoints wrap the payload in a `chain` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: FactionChain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_status_from_string() {
        assert_eq!(OnlineStatus::from("Online".to_string()), OnlineStatus::Online);
        assert_eq!(OnlineStatus::from("Idle".to_string()), OnlineStatus::Idle);
        assert_eq!(OnlineStatus::from("Offline".to_string()), OnlineStatus::Offline);
        assert_eq!(OnlineStatus::from("???".to_string()), OnlineStatus::Unknown);
    }

    #[test]
    fn test_member_state_sort_order() {
        assert!(MemberState::Okay.sort_order() < MemberState::Hospital.sort_order());
        assert!(MemberState::Hospital.sort_order() < MemberState::Traveling.sort_order());
        assert!(MemberState::Traveling.sort_order() < MemberState::Abroad.sort_order());
        assert_eq!(MemberState::Federal.sort_order(), 99);
    }

    #[test]
    fn test_status_clean_description() {
        let status = Status {
            description: "In hospital for 2 hrs 14 mins".to_string(),
            details: String::new(),
            state: MemberState::Hospital,
            color: "red".to_string(),
            until: 0,
            travel_type: None,
        };
        assert_eq!(status.clean_description(), "In hospital");

        let okay = Status {
            description: "Okay".to_string(),
            details: String::new(),
            state: MemberState::Okay,
            color: "green".to_string(),
            until: 0,
            travel_type: None,
        };
        assert_eq!(okay.clean_description(), "Okay");
    }

    #[test]
    fn test_status_is_returning() {
        let mut status = Status {
            description: "Returning to Torn from Mexico".to_string(),
            details: String::new(),
            state: MemberState::Traveling,
            color: "blue".to_string(),
            until: 0,
            travel_type: None,
        };
        assert!(status.is_returning());

        status.description = "Traveling to Mexico".to_string();
        assert!(!status.is_returning());

        status.travel_type = Some("Return flight".to_string());
        assert!(status.is_returning());

        // Only meaningful while traveling
        status.state = MemberState::Okay;
        assert!(!status.is_returning());
    }

    #[test]
    fn test_faction_enemy_id_from_ranked_war() {
        let json = r#"{
            "ID": 100,
            "name": "Us",
            "tag": "US",
            "members": {},
            "ranked_wars": {
                "777": {
                    "factions": {
                        "100": {"name": "Us", "score": 10, "chain": 0},
                        "46144": {"name": "Them", "score": 12, "chain": 5}
                    },
                    "war": {"start": 1700000000, "end": 0, "target": 5000, "winner": 0}
                }
            }
        }"#;
        let faction: Faction = serde_json::from_str(json).unwrap();
        assert_eq!(faction.enemy_faction_id(), Some(46144));
    }

    #[test]
    fn test_faction_no_war_no_enemy() {
        let json = r#"{"ID": 100, "name": "Us", "members": {}}"#;
        let faction: Faction = serde_json::from_str(json).unwrap();
        assert_eq!(faction.enemy_faction_id(), None);
    }

    #[test]
    fn test_member_deserialization() {
        let json = r#"{
            "name": "Duke",
            "level": 74,
            "days_in_faction": 312,
            "position": "Member",
            "last_action": {"status": "Online", "timestamp": 1700000000, "relative": "2 minutes ago"},
            "status": {
                "description": "Okay",
                "details": "",
                "state": "Okay",
                "color": "green",
                "until": 0
            }
        }"#;
        let member: Member = serde_json::from_str(json).unwrap();
        assert_eq!(member.name, "Duke");
        assert_eq!(member.last_action.status, OnlineStatus::Online);
        assert_eq!(member.status.state, MemberState::Okay);
    }

    #[test]
    fn test_chain_percent() {
        let chain = FactionChain {
            id: 1,
            current: 25,
            max: 100,
            timeout: 180,
            modifier: 1.25,
            cooldown: 0,
            start: 0,
            end: 0,
        };
        assert_eq!(chain.percent(), 25.0);
        assert!(chain.is_active());

        let idle = FactionChain { current: 0, max: 10, timeout: 0, ..chain };
        assert_eq!(idle.percent(), 0.0);
        assert!(!idle.is_active());
    }

    #[test]
    fn test_chain_tick_clamps_at_zero() {
        let mut chain = FactionChain {
            id: 1,
            current: 10,
            max: 25,
            timeout: 120,
            modifier: 1.0,
            cooldown: 0,
            start: 0,
            end: 0,
        };
        chain.tick(30);
        assert_eq!(chain.timeout, 90);

        chain.tick(500);
        assert_eq!(chain.timeout, 0);
        assert!(!chain.is_active());

        // Negative elapsed (clock skew) must not rewind the countdown
        chain.tick(-5);
        assert_eq!(chain.timeout, 0);
    }

    #[test]
    fn test_chain_response_envelope() {
        let json = r#"{"chain": {"id": 5, "current": 12, "max": 25, "timeout": 170,
            "modifier": 1.0, "cooldown": 0, "start": 1700000000, "end": 0}}"#;
        let parsed: ChainResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.chain.current, 12);
    }
}
