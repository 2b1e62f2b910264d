// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// Battle stat estimate for one player from the FFScouter
/// `get-stats` endpoint. Estimate fields are null for players the
/// service has never scouted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FfScouterData {
    pub player_id: i64,
    #[serde(default)]
    pub fair_fight: Option<f64>,
    #[serde(default)]
    pub bs_estimate: Option<i64>,
    #[serde(default)]
    pub bs_estimate_human: Option<String>,
    #[serde(default)]
    pub bss_public: Option<i64>,
    #[serde(default)]
    pub last_updated: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scouter_data_full() {
        let json = r#"{
            "player_id": 12345,
            "fair_fight": 3.12,
            "bs_estimate": 425000000,
            "bs_estimate_human": "425m",
            "bss_public": 20615,
            "last_updated": 1700000000
        }"#;
        let data: FfScouterData = serde_json::from_str(json).unwrap();
        assert_eq!(data.player_id, 12345);
        assert_eq!(data.fair_fight, Some(3.12));
        assert_eq!(data.bs_estimate_human.as_deref(), Some("425m"));
    }

    #[test]
    fn test_scouter_data_unscouted_player() {
        // Unknown targets come back with null estimates
        let json = r#"{"player_id": 99, "fair_fight": null, "bs_estimate": null,
            "bs_estimate_human": null, "bss_public": null, "last_updated": null}"#;
        let data: FfScouterData = serde_json::from_str(json).unwrap();
        assert_eq!(data.fair_fight, None);
        assert_eq!(data.bs_estimate, None);
    }
}
