// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use super::faction::{LastAction, MemberState, Status};

/// User profile from `/user/?selections=profile,cooldowns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub player_id: i64,
    pub level: i64,
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: i64,
    #[serde(default)]
    pub awards: i64,
    pub status: Status,
    pub life: Bar,
    #[serde(default)]
    pub energy: Option<Bar>,
    #[serde(default)]
    pub nerve: Option<Bar>,
    #[serde(default)]
    pub happy: Option<Bar>,
    #[serde(default)]
    pub cooldowns: Cooldowns,
    pub last_action: LastAction,
    #[serde(default)]
    pub faction: Option<UserFaction>,
}

impl User {
    /// The user's current location description, used to rank enemies in
    /// the same place first. Only meaningful while the user is Okay.
    pub fn location(&self) -> Option<&str> {
        if self.status.state == MemberState::Okay {
            Some(self.status.description.as_str())
        } else {
            None
        }
    }
}

/// A regenerating bar (life, energy, nerve, happy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub current: i64,
    pub maximum: i64,
    #[serde(default)]
    pub increment: i64,
    #[serde(default)]
    pub interval: i64,
}

impl Bar {
    pub fn percent(&self) -> f64 {
        if self.maximum > 0 {
            (self.current as f64 / self.maximum as f64) * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cooldowns {
    #[serde(default)]
    pub drug: i64,
    #[serde(default)]
    pub medical: i64,
    #[serde(default)]
    pub booster: i64,
}

/// Standard medical cooldown is 8 hours; longer remaining times mean the
/// cooldown started above the standard total.
pub const STANDARD_MEDICAL_COOLDOWN_SECS: i64 = 8 * 3600;

impl Cooldowns {
    /// Medical cooldown progress as (elapsed-equivalent, total) seconds
    /// for bar display.
    pub fn medical_progress(&self) -> (i64, i64) {
        let total = STANDARD_MEDICAL_COOLDOWN_SECS.max(self.medical);
        (self.medical, total)
    }
}

/// Faction block embedded in the user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFaction {
    #[serde(default)]
    pub position: String,
    pub faction_id: i64,
    #[serde(default)]
    pub days_in_faction: i64,
    #[serde(default)]
    pub faction_name: String,
    #[serde(default)]
    pub faction_tag: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_location_only_when_okay() {
        let json = r#"{
            "name": "Duke",
            "player_id": 4,
            "level": 74,
            "status": {"description": "Okay", "details": "", "state": "Okay", "color": "green", "until": 0},
            "life": {"current": 7000, "maximum": 7500, "increment": 375, "interval": 300},
            "energy": {"current": 150, "maximum": 150, "increment": 5, "interval": 600},
            "cooldowns": {"drug": 0, "medical": 3600, "booster": 0},
            "last_action": {"status": "Online", "timestamp": 1700000000, "relative": "0 minutes ago"}
        }"#;
        let mut user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.location(), Some("Okay"));

        user.status.state = MemberState::Hospital;
        assert_eq!(user.location(), None);
    }

    #[test]
    fn test_bar_percent() {
        let bar = Bar { current: 75, maximum: 150, increment: 5, interval: 600 };
        assert_eq!(bar.percent(), 50.0);

        let empty = Bar { current: 0, maximum: 0, increment: 0, interval: 0 };
        assert_eq!(empty.percent(), 0.0);
    }

    #[test]
    fn test_medical_progress_extends_past_standard() {
        let short = Cooldowns { drug: 0, medical: 3600, booster: 0 };
        assert_eq!(short.medical_progress(), (3600, STANDARD_MEDICAL_COOLDOWN_SECS));

        // A cooldown longer than 8h becomes its own total
        let long = Cooldowns { drug: 0, medical: 40_000, booster: 0 };
        assert_eq!(long.medical_progress(), (40_000, 40_000));
    }
}
