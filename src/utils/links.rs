//! Torn site URLs shown in the detail pane.

pub fn player_profile_link(player_id: i64) -> String {
    format!("https://www.torn.com/profiles.php?XID={}", player_id)
}

pub fn player_attack_link(player_id: i64) -> String {
    format!("https://www.torn.com/loader.php?sid=attack&user2ID={}", player_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links() {
        assert_eq!(
            player_profile_link(4),
            "https://www.torn.com/profiles.php?XID=4"
        );
        assert_eq!(
            player_attack_link(4),
            "https://www.torn.com/loader.php?sid=attack&user2ID=4"
        );
    }
}
