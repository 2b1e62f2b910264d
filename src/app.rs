//! Application state management for Tornwatch.
//!
//! This module contains the core `App` struct that manages all application
//! state, including UI state, fetched data, credentials, and background
//! refresh coordination.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{FfScouterClient, TornClient};
use crate::auth::Credentials;
use crate::cache::CacheManager;
use crate::config::Config;
use crate::models::{Faction, FactionChain, FfScouterData, MemberState, OnlineStatus, User};
use crate::roster::{self, EnemyMember, FfBucket, FilterState, SortColumn};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A full refresh produces at most ~8 messages, so 32 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for API key input. Torn keys are 16 characters, but
/// allow room for other key formats.
const MAX_KEY_LENGTH: usize = 64;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    EditingCredentials,
    Filtering,
    ConfirmingQuit,
    Quitting,
}

/// Credentials form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFocus {
    TornKey,
    FfScouterKey,
    Button,
}

/// Lifecycle of an API key check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    Idle,
    Validating,
    Valid,
    Invalid,
}

impl ValidationState {
    pub fn label(&self) -> &'static str {
        match self {
            ValidationState::Idle => "",
            ValidationState::Validating => "checking...",
            ValidationState::Valid => "valid",
            ValidationState::Invalid => "invalid",
        }
    }
}

/// One toggleable entry in the filter overlay. The overlay presents the
/// three groups as a single flat checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOption {
    Online(OnlineStatus),
    State(MemberState),
    Ff(FfBucket),
}

impl FilterOption {
    pub const ALL: [FilterOption; 10] = [
        FilterOption::Online(OnlineStatus::Online),
        FilterOption::Online(OnlineStatus::Idle),
        FilterOption::Online(OnlineStatus::Offline),
        FilterOption::State(MemberState::Okay),
        FilterOption::State(MemberState::Hospital),
        FilterOption::State(MemberState::Abroad),
        FilterOption::State(MemberState::Traveling),
        FilterOption::Ff(FfBucket::Under2),
        FilterOption::Ff(FfBucket::Under4),
        FilterOption::Ff(FfBucket::Under6),
    ];

    pub fn group(&self) -> &'static str {
        match self {
            FilterOption::Online(_) => "Online Status",
            FilterOption::State(_) => "State",
            FilterOption::Ff(_) => "Fair Fight",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterOption::Online(status) => status.label(),
            FilterOption::State(state) => state.label(),
            FilterOption::Ff(bucket) => bucket.label(),
        }
    }

    pub fn is_active(&self, filters: &FilterState) -> bool {
        match self {
            FilterOption::Online(status) => filters.online_status.contains(status),
            FilterOption::State(state) => filters.state.contains(state),
            FilterOption::Ff(bucket) => filters.ff.contains(bucket),
        }
    }

    pub fn toggle(&self, filters: &mut FilterState) {
        match self {
            FilterOption::Online(status) => {
                if !filters.online_status.remove(status) {
                    filters.online_status.insert(*status);
                }
            }
            FilterOption::State(state) => {
                if !filters.state.remove(state) {
                    filters.state.insert(*state);
                }
            }
            FilterOption::Ff(bucket) => {
                if !filters.ff.remove(bucket) {
                    filters.ff.insert(*bucket);
                }
            }
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background tasks, sent through an MPSC channel
/// back to the main loop.
enum RefreshResult {
    User(User),
    OwnFaction(Faction),
    OwnChain(FactionChain),
    EnemyFaction(Faction),
    EnemyChain(FactionChain),
    ScouterStats(Vec<FfScouterData>),
    /// Torn key validation verdict (key, accepted)
    TornKeyValidated(String, bool),
    /// FFScouter key validation verdict (key, accepted)
    FfScouterKeyValidated(String, bool),
    /// Signal that a full refresh cycle has finished
    RefreshComplete,
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub credentials: Credentials,
    pub cache: CacheManager,

    // UI state
    pub state: AppState,
    pub roster_selection: usize,
    pub sort_column: SortColumn,
    pub sort_ascending: bool,
    pub filter_selection: usize,
    pub collapsed_cards: bool,

    // Credentials form state
    pub torn_key_input: String,
    pub ffscouter_key_input: String,
    pub credential_focus: CredentialFocus,
    pub torn_key_validation: ValidationState,
    pub ffscouter_key_validation: ValidationState,
    pub credential_error: Option<String>,

    // Fetched data
    pub user: Option<User>,
    pub own_faction: Option<Faction>,
    pub enemy_faction: Option<Faction>,
    pub own_chain: Option<FactionChain>,
    pub enemy_chain: Option<FactionChain>,
    // When each chain payload arrived, so the countdown keeps ticking
    // between refreshes
    own_chain_at: Option<DateTime<Utc>>,
    enemy_chain_at: Option<DateTime<Utc>>,
    pub scouter_stats: HashMap<i64, FfScouterData>,
    pub pinned: HashSet<i64>,

    // Refresh timing
    pub last_refresh: Option<DateTime<Utc>>,
    refresh_in_flight: bool,

    // Background task channel
    refresh_rx: Option<mpsc::Receiver<RefreshResult>>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = Config::load();
        debug!(
            interval = config.refresh_interval_secs,
            enemy = ?config.enemy_faction_id,
            "Config loaded"
        );

        let cache_dir = Config::cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        let cache = CacheManager::new(cache_dir)?;

        let credentials = Credentials::load();
        debug!(
            torn = credentials.has_torn_key(),
            ffscouter = credentials.has_ffscouter_key(),
            "Credentials resolved"
        );

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let pinned: HashSet<i64> = config.pinned.iter().copied().collect();
        let collapsed_cards = config.collapsed_cards;
        let torn_key_input = credentials.torn_key.clone().unwrap_or_default();
        let ffscouter_key_input = credentials.ffscouter_key.clone().unwrap_or_default();

        Ok(Self {
            config,
            credentials,
            cache,

            state: AppState::Normal,
            roster_selection: 0,
            sort_column: SortColumn::Priority,
            sort_ascending: true,
            filter_selection: 0,
            collapsed_cards,

            torn_key_input,
            ffscouter_key_input,
            credential_focus: CredentialFocus::TornKey,
            torn_key_validation: ValidationState::Idle,
            ffscouter_key_validation: ValidationState::Idle,
            credential_error: None,

            user: None,
            own_faction: None,
            enemy_faction: None,
            own_chain: None,
            enemy_chain: None,
            own_chain_at: None,
            enemy_chain_at: None,
            scouter_stats: HashMap::new(),
            pinned,

            last_refresh: None,
            refresh_in_flight: false,

            refresh_rx: Some(rx),
            refresh_tx: tx,

            status_message: None,
        })
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Paint from the last on-disk snapshot before the first live refresh.
    pub fn load_from_cache(&mut self) {
        let mut snapshot: Option<(String, bool)> = None;

        if let Ok(Some(cached)) = self.cache.load_user() {
            snapshot = Some((cached.age_display(), cached.is_stale()));
            self.user = Some(cached.data);
        }

        if let Ok(Some(cached)) = self.cache.load_own_faction() {
            self.own_faction = Some(cached.data);
        }

        if let Ok(Some(cached)) = self.cache.load_enemy_faction() {
            // The roster snapshot is the one worth dating in the status bar
            snapshot = Some((cached.age_display(), cached.is_stale()));
            self.enemy_faction = Some(cached.data);
        }

        if let Ok(Some(cached)) = self.cache.load_own_chain() {
            self.own_chain_at = Some(cached.cached_at);
            self.own_chain = Some(cached.data);
        }

        if let Ok(Some(cached)) = self.cache.load_enemy_chain() {
            self.enemy_chain_at = Some(cached.cached_at);
            self.enemy_chain = Some(cached.data);
        }

        if let Ok(Some(cached)) = self.cache.load_scouter_stats() {
            self.scouter_stats = cached
                .data
                .into_iter()
                .map(|s| (s.player_id, s))
                .collect();
        }

        if let Some((age, stale)) = snapshot {
            self.status_message = Some(if stale {
                format!("Showing stale cached data from {}", age)
            } else {
                format!("Showing cached data from {}", age)
            });
        }
    }

    /// The user's chain with `timeout` ticked down since the payload
    /// arrived, so the countdown stays live between refreshes.
    pub fn own_chain_now(&self) -> Option<FactionChain> {
        Self::chain_now(self.own_chain.as_ref(), self.own_chain_at)
    }

    /// Same for the opposing faction's chain.
    pub fn enemy_chain_now(&self) -> Option<FactionChain> {
        Self::chain_now(self.enemy_chain.as_ref(), self.enemy_chain_at)
    }

    fn chain_now(
        chain: Option<&FactionChain>,
        fetched_at: Option<DateTime<Utc>>,
    ) -> Option<FactionChain> {
        let mut chain = chain?.clone();
        if let Some(at) = fetched_at {
            chain.tick((Utc::now() - at).num_seconds());
        }
        Some(chain)
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Seconds until the next scheduled refresh, for the status bar.
    pub fn seconds_until_refresh(&self) -> i64 {
        match self.last_refresh {
            Some(last) => {
                let next = last + chrono::Duration::seconds(self.config.refresh_interval_secs as i64);
                (next - Utc::now()).num_seconds().max(0)
            }
            None => 0,
        }
    }

    /// Kick off a background refresh if one is due and none is running.
    /// All data sources share the one timer.
    pub fn maybe_refresh(&mut self) {
        if self.refresh_in_flight || !self.credentials.has_torn_key() {
            return;
        }

        let due = match self.last_refresh {
            Some(last) => {
                (Utc::now() - last).num_seconds() >= self.config.refresh_interval_secs as i64
            }
            None => true,
        };

        if due {
            self.refresh_background();
        }
    }

    /// Force a refresh on the next tick.
    pub fn request_refresh(&mut self) {
        self.last_refresh = None;
    }

    /// Spawn the background refresh task.
    fn refresh_background(&mut self) {
        let torn_key = match self.credentials.torn_key.clone() {
            Some(key) => key,
            None => return,
        };
        let ffscouter_key = self.credentials.ffscouter_key.clone();
        let enemy_override = self.config.enemy_faction_id;
        let tx = self.refresh_tx.clone();

        self.refresh_in_flight = true;

        tokio::spawn(async move {
            Self::execute_background_refresh(tx, torn_key, ffscouter_key, enemy_override).await;
        });
    }

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    /// Execute one refresh cycle in a spawned Tokio task.
    ///
    /// Fetches the user profile, own faction, and own chain in parallel,
    /// then resolves the opposing faction (manual override first, ranked
    /// war otherwise) and fetches its roster, chain, and stat estimates.
    async fn execute_background_refresh(
        tx: mpsc::Sender<RefreshResult>,
        torn_key: String,
        ffscouter_key: Option<String>,
        enemy_override: Option<i64>,
    ) {
        debug!("Background refresh started");

        let torn = match TornClient::new(torn_key) {
            Ok(client) => client,
            Err(e) => {
                error!(error = %e, "Failed to create API client");
                Self::send_result(&tx, RefreshResult::Error("Failed to create API client".to_string())).await;
                Self::send_result(&tx, RefreshResult::RefreshComplete).await;
                return;
            }
        };

        let (user_res, faction_res, chain_res) = tokio::join!(
            torn.fetch_user(),
            torn.fetch_own_faction(),
            torn.fetch_own_chain(),
        );

        match user_res {
            Ok(user) => Self::send_result(&tx, RefreshResult::User(user)).await,
            Err(e) => {
                error!(error = %e, "User fetch failed");
                Self::send_result(&tx, RefreshResult::Error(format!("User: {}", e))).await;
            }
        }

        match chain_res {
            Ok(chain) => Self::send_result(&tx, RefreshResult::OwnChain(chain)).await,
            Err(e) => debug!(error = %e, "Own chain fetch failed"),
        }

        // A live ranked war names the opponent; the configured id is the
        // fallback for when no war is listed.
        let enemy_id = match faction_res {
            Ok(faction) => {
                let derived = faction.enemy_faction_id();
                Self::send_result(&tx, RefreshResult::OwnFaction(faction)).await;
                derived.or(enemy_override)
            }
            Err(e) => {
                error!(error = %e, "Own faction fetch failed");
                Self::send_result(&tx, RefreshResult::Error(format!("Faction: {}", e))).await;
                enemy_override
            }
        };

        let Some(enemy_id) = enemy_id else {
            debug!("No opposing faction resolved, skipping enemy fetches");
            Self::send_result(&tx, RefreshResult::RefreshComplete).await;
            return;
        };

        let (enemy_res, enemy_chain_res) =
            tokio::join!(torn.fetch_faction(enemy_id), torn.fetch_chain(enemy_id));

        match enemy_chain_res {
            Ok(chain) => Self::send_result(&tx, RefreshResult::EnemyChain(chain)).await,
            Err(e) => debug!(error = %e, "Enemy chain fetch failed"),
        }

        let member_ids: Vec<i64> = match enemy_res {
            Ok(faction) => {
                let ids = faction
                    .members_with_ids()
                    .iter()
                    .map(|(id, _)| *id)
                    .collect();
                Self::send_result(&tx, RefreshResult::EnemyFaction(faction)).await;
                ids
            }
            Err(e) => {
                error!(error = %e, "Enemy faction fetch failed");
                Self::send_result(&tx, RefreshResult::Error(format!("Enemy faction: {}", e))).await;
                Vec::new()
            }
        };

        // Stat estimates ride the same cycle so roster and stats stay
        // in step.
        if let Some(key) = ffscouter_key {
            if !member_ids.is_empty() {
                match FfScouterClient::new(key) {
                    Ok(scouter) => match scouter.fetch_stats(&member_ids).await {
                        Ok(stats) => {
                            debug!(count = stats.len(), "Stat estimates fetched");
                            Self::send_result(&tx, RefreshResult::ScouterStats(stats)).await;
                        }
                        Err(e) => debug!(error = %e, "Stat estimate fetch failed"),
                    },
                    Err(e) => debug!(error = %e, "Failed to create stat client"),
                }
            }
        }

        debug!("Background refresh complete");
        Self::send_result(&tx, RefreshResult::RefreshComplete).await;
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        // Collect all pending results first to avoid borrow conflicts
        let results: Vec<RefreshResult> = {
            if let Some(ref mut rx) = self.refresh_rx {
                let mut results = Vec::new();
                while let Ok(result) = rx.try_recv() {
                    results.push(result);
                }
                results
            } else {
                Vec::new()
            }
        };

        for result in results {
            self.process_refresh_result(result);
        }
    }

    /// Process a single refresh result from the background task.
    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::User(user) => {
                if let Err(e) = self.cache.save_user(&user) {
                    warn!(error = %e, "Failed to cache user");
                }
                self.user = Some(user);
            }
            RefreshResult::OwnFaction(faction) => {
                if let Err(e) = self.cache.save_own_faction(&faction) {
                    warn!(error = %e, "Failed to cache own faction");
                }

                // Remember a war-derived opponent so it survives the war
                // listing disappearing mid-fight.
                if let Some(enemy_id) = faction.enemy_faction_id() {
                    if self.config.enemy_faction_id != Some(enemy_id) {
                        info!(enemy_id, "Opposing faction derived from ranked war");
                        self.config.enemy_faction_id = Some(enemy_id);
                        if let Err(e) = self.config.save() {
                            warn!(error = %e, "Failed to save config");
                        }
                    }
                }

                self.own_faction = Some(faction);
            }
            RefreshResult::OwnChain(chain) => {
                if let Err(e) = self.cache.save_own_chain(&chain) {
                    warn!(error = %e, "Failed to cache own chain");
                }
                self.own_chain_at = Some(Utc::now());
                self.own_chain = Some(chain);
            }
            RefreshResult::EnemyFaction(faction) => {
                if let Err(e) = self.cache.save_enemy_faction(&faction) {
                    warn!(error = %e, "Failed to cache enemy faction");
                }
                self.enemy_faction = Some(faction);
                self.clamp_selection();
            }
            RefreshResult::EnemyChain(chain) => {
                if let Err(e) = self.cache.save_enemy_chain(&chain) {
                    warn!(error = %e, "Failed to cache enemy chain");
                }
                self.enemy_chain_at = Some(Utc::now());
                self.enemy_chain = Some(chain);
            }
            RefreshResult::ScouterStats(stats) => {
                if let Err(e) = self.cache.save_scouter_stats(&stats) {
                    warn!(error = %e, "Failed to cache stat estimates");
                }
                self.scouter_stats = stats.into_iter().map(|s| (s.player_id, s)).collect();
            }
            RefreshResult::TornKeyValidated(key, accepted) => {
                if accepted {
                    self.torn_key_validation = ValidationState::Valid;
                    self.credentials.set_torn_key(key);
                } else {
                    self.torn_key_validation = ValidationState::Invalid;
                    self.credential_error = Some("Torn API key was rejected".to_string());
                }
                self.finish_credential_validation();
            }
            RefreshResult::FfScouterKeyValidated(key, accepted) => {
                if accepted {
                    self.ffscouter_key_validation = ValidationState::Valid;
                    self.credentials.set_ffscouter_key(Some(key));
                } else {
                    self.ffscouter_key_validation = ValidationState::Invalid;
                    self.credential_error = Some("FFScouter API key was rejected".to_string());
                }
                self.finish_credential_validation();
            }
            RefreshResult::RefreshComplete => {
                self.refresh_in_flight = false;
                self.last_refresh = Some(Utc::now());
                // Only clear progress messages, keep errors visible
                if let Some(ref msg) = self.status_message {
                    if !msg.starts_with("Error") {
                        self.status_message = None;
                    }
                }
            }
            RefreshResult::Error(msg) => {
                error!(error = %msg, "Background task error");
                let user_message = if msg.to_lowercase().contains("rate limit") {
                    "API is busy. Backing off until the next cycle.".to_string()
                } else if msg.to_lowercase().contains("key") {
                    "Error: API key rejected. Press 'k' to update it.".to_string()
                } else {
                    format!("Error: {}", msg)
                };
                self.status_message = Some(user_message);
            }
        }
    }

    // =========================================================================
    // Roster
    // =========================================================================

    /// The user's location, used for targeting priority. Only known
    /// while the user is in the Okay state.
    pub fn user_location(&self) -> Option<String> {
        self.user
            .as_ref()
            .and_then(|u| u.location().map(|l| l.to_string()))
    }

    /// Produce the roster rows in display order.
    pub fn roster_rows(&self) -> Vec<EnemyMember> {
        let Some(ref faction) = self.enemy_faction else {
            return Vec::new();
        };

        let members: Vec<(i64, crate::models::Member)> = faction
            .members_with_ids()
            .into_iter()
            .map(|(id, member)| (id, member.clone()))
            .collect();

        let rows = roster::enrich(members, &self.scouter_stats, &self.pinned);
        roster::display_order(
            rows,
            &self.config.filters,
            self.sort_column,
            self.sort_ascending,
            self.user_location().as_deref(),
        )
    }

    pub fn selected_row(&self) -> Option<EnemyMember> {
        self.roster_rows().into_iter().nth(self.roster_selection)
    }

    /// Toggle sorting by the given column. Re-selecting the active
    /// column flips direction; picking a new one starts ascending.
    pub fn toggle_sort(&mut self, column: SortColumn) {
        if self.sort_column == column {
            if column == SortColumn::Priority {
                return;
            }
            self.sort_ascending = !self.sort_ascending;
        } else {
            self.sort_column = column;
            self.sort_ascending = true;
        }
    }

    /// Pin or unpin the selected member and persist the set.
    pub fn toggle_pin(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };

        if !self.pinned.remove(&row.id) {
            self.pinned.insert(row.id);
        }

        self.config.pinned = self.pinned.iter().copied().collect();
        self.config.pinned.sort_unstable();
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    pub fn toggle_collapsed_cards(&mut self) {
        self.collapsed_cards = !self.collapsed_cards;
        self.config.collapsed_cards = self.collapsed_cards;
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    /// Step the refresh interval and persist it.
    pub fn adjust_interval(&mut self, delta: i64) {
        self.config.adjust_interval(delta);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
        self.status_message = Some(format!(
            "Refresh interval: {}s",
            self.config.refresh_interval_secs
        ));
    }

    // ===== Selection movement =====

    fn row_count(&self) -> usize {
        self.roster_rows().len()
    }

    fn clamp_selection(&mut self) {
        let count = self.row_count();
        if count == 0 {
            self.roster_selection = 0;
        } else if self.roster_selection >= count {
            self.roster_selection = count - 1;
        }
    }

    pub fn select_next(&mut self) {
        let count = self.row_count();
        if count > 0 && self.roster_selection + 1 < count {
            self.roster_selection += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.roster_selection = self.roster_selection.saturating_sub(1);
    }

    pub fn select_page_down(&mut self) {
        let count = self.row_count();
        if count > 0 {
            self.roster_selection = (self.roster_selection + PAGE_SCROLL_SIZE).min(count - 1);
        }
    }

    pub fn select_page_up(&mut self) {
        self.roster_selection = self.roster_selection.saturating_sub(PAGE_SCROLL_SIZE);
    }

    pub fn select_first(&mut self) {
        self.roster_selection = 0;
    }

    pub fn select_last(&mut self) {
        let count = self.row_count();
        self.roster_selection = count.saturating_sub(1);
    }

    // =========================================================================
    // Filters
    // =========================================================================

    pub fn filter_select_next(&mut self) {
        if self.filter_selection + 1 < FilterOption::ALL.len() {
            self.filter_selection += 1;
        }
    }

    pub fn filter_select_prev(&mut self) {
        self.filter_selection = self.filter_selection.saturating_sub(1);
    }

    /// Toggle the highlighted filter option and persist the new state.
    pub fn toggle_filter_option(&mut self) {
        let option = FilterOption::ALL[self.filter_selection];
        option.toggle(&mut self.config.filters);
        self.clamp_selection();
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    pub fn clear_filters(&mut self) {
        self.config.filters.clear();
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Credentials
    // =========================================================================

    /// Open the credentials overlay, pre-filled with the current keys.
    pub fn start_editing_credentials(&mut self) {
        self.state = AppState::EditingCredentials;
        self.torn_key_input = self.credentials.torn_key.clone().unwrap_or_default();
        self.ffscouter_key_input = self.credentials.ffscouter_key.clone().unwrap_or_default();
        self.credential_focus = if self.torn_key_input.is_empty() {
            CredentialFocus::TornKey
        } else {
            CredentialFocus::FfScouterKey
        };
        self.torn_key_validation = ValidationState::Idle;
        self.ffscouter_key_validation = ValidationState::Idle;
        self.credential_error = None;
    }

    pub fn can_add_key_char(current_len: usize, c: char) -> bool {
        current_len < MAX_KEY_LENGTH && c.is_ascii_alphanumeric()
    }

    /// Validate the entered keys against their services. Each key is
    /// stored only once its service accepts it.
    pub fn submit_credentials(&mut self) {
        let torn_key = self.torn_key_input.trim().to_string();
        let ffscouter_key = self.ffscouter_key_input.trim().to_string();

        if torn_key.is_empty() {
            self.credential_error = Some("A Torn API key is required".to_string());
            return;
        }

        self.credential_error = None;
        self.torn_key_validation = ValidationState::Validating;

        let tx = self.refresh_tx.clone();
        let key = torn_key.clone();
        tokio::spawn(async move {
            let accepted = match TornClient::new(key.clone()) {
                Ok(client) => client.validate_key().await,
                Err(_) => false,
            };
            Self::send_result(&tx, RefreshResult::TornKeyValidated(key, accepted)).await;
        });

        if ffscouter_key.is_empty() {
            // An empty field clears the optional key.
            self.credentials.set_ffscouter_key(None);
            self.ffscouter_key_validation = ValidationState::Idle;
        } else {
            self.ffscouter_key_validation = ValidationState::Validating;
            let tx = self.refresh_tx.clone();
            let key = ffscouter_key;
            tokio::spawn(async move {
                let accepted = match FfScouterClient::new(key.clone()) {
                    Ok(client) => client.validate_key().await,
                    Err(_) => false,
                };
                Self::send_result(&tx, RefreshResult::FfScouterKeyValidated(key, accepted)).await;
            });
        }
    }

    /// Close the overlay once every pending validation has settled and
    /// the required key is good.
    fn finish_credential_validation(&mut self) {
        if self.torn_key_validation == ValidationState::Validating
            || self.ffscouter_key_validation == ValidationState::Validating
        {
            return;
        }

        if self.torn_key_validation == ValidationState::Valid
            && self.ffscouter_key_validation != ValidationState::Invalid
        {
            self.state = AppState::Normal;
            self.status_message = Some("API keys saved".to_string());
            self.request_refresh();
        }
    }
}

#[cfg(test)]
impl App {
    /// Isolated instance on a scratch directory. Never reads the real
    /// config file or the OS keychain, and config saves land in the
    /// scratch directory too.
    pub(crate) fn test_instance() -> App {
        use std::sync::atomic::{AtomicU32, Ordering};
        static NEXT_ID: AtomicU32 = AtomicU32::new(0);

        let scratch = std::env::temp_dir().join(format!(
            "tornwatch-test-{}-{}",
            std::process::id(),
            NEXT_ID.fetch_add(1, Ordering::Relaxed)
        ));
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        App {
            config: Config::scratch(scratch.join("config.json")),
            credentials: Credentials::default(),
            cache: CacheManager::new(scratch).unwrap(),

            state: AppState::Normal,
            roster_selection: 0,
            sort_column: SortColumn::Priority,
            sort_ascending: true,
            filter_selection: 0,
            collapsed_cards: false,

            torn_key_input: String::new(),
            ffscouter_key_input: String::new(),
            credential_focus: CredentialFocus::TornKey,
            torn_key_validation: ValidationState::Idle,
            ffscouter_key_validation: ValidationState::Idle,
            credential_error: None,

            user: None,
            own_faction: None,
            enemy_faction: None,
            own_chain: None,
            enemy_chain: None,
            own_chain_at: None,
            enemy_chain_at: None,
            scouter_stats: HashMap::new(),
            pinned: HashSet::new(),

            last_refresh: None,
            refresh_in_flight: false,

            refresh_rx: Some(rx),
            refresh_tx: tx,

            status_message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_toggle_sort_flips_direction() {
        let mut app = App::test_instance();
        app.toggle_sort(SortColumn::Name);
        assert_eq!(app.sort_column, SortColumn::Name);
        assert!(app.sort_ascending);

        app.toggle_sort(SortColumn::Name);
        assert!(!app.sort_ascending);

        app.toggle_sort(SortColumn::Level);
        assert_eq!(app.sort_column, SortColumn::Level);
        assert!(app.sort_ascending);
    }

    #[test]
    fn test_priority_sort_never_flips() {
        let mut app = App::test_instance();
        app.toggle_sort(SortColumn::Priority);
        assert!(app.sort_ascending);
        app.toggle_sort(SortColumn::Priority);
        assert!(app.sort_ascending);
    }

    #[test]
    fn test_filter_option_toggle_round_trip() {
        let mut filters = FilterState::default();
        let option = FilterOption::State(MemberState::Hospital);

        assert!(!option.is_active(&filters));
        option.toggle(&mut filters);
        assert!(option.is_active(&filters));
        option.toggle(&mut filters);
        assert!(!option.is_active(&filters));
    }

    #[test]
    fn test_filter_selection_stays_in_bounds() {
        let mut app = App::test_instance();
        for _ in 0..20 {
            app.filter_select_next();
        }
        assert_eq!(app.filter_selection, FilterOption::ALL.len() - 1);

        for _ in 0..20 {
            app.filter_select_prev();
        }
        assert_eq!(app.filter_selection, 0);
    }

    #[test]
    fn test_can_add_key_char() {
        assert!(App::can_add_key_char(0, 'a'));
        assert!(App::can_add_key_char(10, '7'));
        assert!(!App::can_add_key_char(MAX_KEY_LENGTH, 'a'));
        assert!(!App::can_add_key_char(0, ' '));
    }

    #[test]
    fn test_seconds_until_refresh_counts_down() {
        let mut app = App::test_instance();
        assert_eq!(app.seconds_until_refresh(), 0);

        app.last_refresh = Some(Utc::now());
        let remaining = app.seconds_until_refresh();
        assert!(remaining > 0 && remaining <= app.config.refresh_interval_secs as i64);
    }

    #[test]
    fn test_empty_roster_selection_is_safe() {
        let mut app = App::test_instance();
        app.select_next();
        app.select_last();
        app.select_page_down();
        assert_eq!(app.roster_selection, 0);
        assert!(app.selected_row().is_none());
    }

    #[test]
    fn test_chain_countdown_ticks_between_refreshes() {
        let mut app = App::test_instance();
        app.own_chain = Some(FactionChain {
            id: 1,
            current: 20,
            max: 25,
            timeout: 180,
            modifier: 1.1,
            cooldown: 0,
            start: 0,
            end: 0,
        });

        // Fetched 50 seconds ago, so roughly 130 seconds should remain
        app.own_chain_at = Some(Utc::now() - Duration::seconds(50));
        let ticked = app.own_chain_now().unwrap();
        assert!((129..=130).contains(&ticked.timeout));
        assert!(ticked.is_active());

        // A payload older than the timeout renders as dropped, not negative
        app.own_chain_at = Some(Utc::now() - Duration::seconds(500));
        let dropped = app.own_chain_now().unwrap();
        assert_eq!(dropped.timeout, 0);
        assert!(!dropped.is_active());
    }

    #[test]
    fn test_load_from_cache_reports_snapshot_age() {
        let mut app = App::test_instance();
        let faction: Faction =
            serde_json::from_str(r#"{"ID": 200, "name": "Them", "members": {}}"#).unwrap();
        app.cache.save_enemy_faction(&faction).unwrap();

        app.load_from_cache();
        assert!(app.enemy_faction.is_some());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Showing cached data from just now")
        );
    }
}
