use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::models::{Faction, FactionChain, FfScouterData, User};

/// Consider a snapshot stale after 5 minutes. Snapshots only bridge the
/// gap until the first live refresh lands, so the bar is low.
const CACHE_STALE_MINUTES: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Covers clock skew too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// Disk snapshots of the last fetched data, so the dashboard can paint
/// something meaningful before the first refresh completes.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    // ===== User =====

    pub fn load_user(&self) -> Result<Option<CachedData<User>>> {
        self.load("user")
    }

    pub fn save_user(&self, user: &User) -> Result<()> {
        self.save("user", user)
    }

    // ===== Factions =====

    pub fn load_own_faction(&self) -> Result<Option<CachedData<Faction>>> {
        self.load("own_faction")
    }

    pub fn save_own_faction(&self, faction: &Faction) -> Result<()> {
        self.save("own_faction", faction)
    }

    pub fn load_enemy_faction(&self) -> Result<Option<CachedData<Faction>>> {
        self.load("enemy_faction")
    }

    pub fn save_enemy_faction(&self, faction: &Faction) -> Result<()> {
        self.save("enemy_faction", faction)
    }

    // ===== Chains =====

    pub fn load_own_chain(&self) -> Result<Option<CachedData<FactionChain>>> {
        self.load("own_chain")
    }

    pub fn save_own_chain(&self, chain: &FactionChain) -> Result<()> {
        self.save("own_chain", chain)
    }

    pub fn load_enemy_chain(&self) -> Result<Option<CachedData<FactionChain>>> {
        self.load("enemy_chain")
    }

    pub fn save_enemy_chain(&self, chain: &FactionChain) -> Result<()> {
        self.save("enemy_chain", chain)
    }

    // ===== Stat estimates =====

    pub fn load_scouter_stats(&self) -> Result<Option<CachedData<Vec<FfScouterData>>>> {
        self.load("scouter_stats")
    }

    pub fn save_scouter_stats(&self, stats: &[FfScouterData]) -> Result<()> {
        self.save("scouter_stats", &stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_buckets() {
        let mut cached = CachedData::new(vec![1]);
        cached.cached_at = Utc::now() - Duration::minutes(12);
        assert_eq!(cached.age_display(), "12m ago");

        cached.cached_at = Utc::now() - Duration::hours(3);
        assert_eq!(cached.age_display(), "3h ago");

        cached.cached_at = Utc::now() - Duration::days(2);
        assert_eq!(cached.age_display(), "2d ago");
    }

    #[test]
    fn test_cached_data_is_stale() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(6);
        assert!(old.is_stale());
    }
}
