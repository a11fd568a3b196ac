//! Application state management for campuscache.
//!
//! `App` wires the two lookup engines to the terminal frontend: it owns the
//! UI state (tab, focus, highlights), executes the engines' pending fetches
//! on the tokio runtime, and routes completions back through the engines'
//! generation check via an MPSC channel.

use std::path::PathBuf;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use campuscache_core::api::ApiClient;
use campuscache_core::cache::CacheManager;
use campuscache_core::config::Config;
use campuscache_core::directory::{
    Choice, FetchState, LookupEvent, StaffLookup, StaffQuery, Suggestion, TimetableLookup,
    ViewState,
};
use campuscache_core::models::{Role, StaffRecord};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// 32 covers a full prefetch round plus interactive lookups with headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum concurrent requests during a roster prefetch.
/// The directory backend is small; two parallel requests is plenty.
const PREFETCH_CONCURRENCY: usize = 2;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Timings,
    Staff,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Timings => "Class Timings",
            Tab::Staff => "Staff Directory",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Timings => Tab::Staff,
            Tab::Staff => Tab::Timings,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        self.next()
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned network tasks back to the main loop.
enum RefreshResult {
    /// Outcome of an interactive staff lookup; the generation ties it to the
    /// query it belongs to so superseded responses are dropped.
    Roster {
        generation: u64,
        query: StaffQuery,
        result: std::result::Result<Vec<StaffRecord>, String>,
    },
    /// One role's organization-wide roster arrived during a prefetch
    PrefetchedRole { role: Role, records: Vec<StaffRecord> },
    /// One role's prefetch failed
    PrefetchFailed { role: Role, reason: String },
    /// The whole prefetch round finished
    PrefetchComplete,
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    pub cache: CacheManager,

    // Lookup engines
    pub timings: TimetableLookup,
    pub staff: StaffLookup,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    /// Cascade column the arrow keys act on
    pub focus_level: usize,
    /// Highlighted row inside the focused column
    pub option_selection: usize,
    /// Highlighted row of the search suggestion list
    pub suggestion_selection: usize,

    // Background task channel
    refresh_rx: Option<mpsc::Receiver<RefreshResult>>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    // Status message
    pub status_message: Option<String>,

    // A roster prefetch round is underway
    pub prefetching: bool,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");
        let cache = CacheManager::new(cache_dir)?;

        let api = ApiClient::new(config.resolved_api_url())?;
        debug!(url = api.base_url(), "API client ready");

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let mut app = Self {
            config,
            api,
            cache,
            timings: TimetableLookup::bundled(),
            staff: StaffLookup::bundled(),
            state: AppState::Normal,
            current_tab: Tab::Timings,
            focus_level: 0,
            option_selection: 0,
            suggestion_selection: 0,
            refresh_rx: Some(rx),
            refresh_tx: tx,
            status_message: None,
            prefetching: false,
        };

        // Pre-highlight (never auto-select) the zone browsed last time
        if let Some(ref zone) = app.config.last_zone {
            if let Some(idx) = app
                .timings
                .options(0)
                .iter()
                .position(|c| &c.value == zone)
            {
                app.option_selection = idx;
            }
        }

        if app.cache.any_role_stale() {
            app.status_message =
                Some("Staff cache is stale - [p] refreshes all roles".to_string());
        }

        Ok(app)
    }

    // =========================================================================
    // Cascade navigation
    // =========================================================================

    pub fn level_count(&self) -> usize {
        match self.current_tab {
            Tab::Timings => self.timings.level_count(),
            Tab::Staff => self.staff.level_count(),
        }
    }

    pub fn options_at(&self, level: usize) -> Vec<Choice> {
        match self.current_tab {
            Tab::Timings => self.timings.options(level),
            Tab::Staff => self.staff.options(level),
        }
    }

    pub fn focused_options(&self) -> Vec<Choice> {
        self.options_at(self.focus_level)
    }

    pub fn chain_key(&self, level: usize) -> Option<String> {
        let key = match self.current_tab {
            Tab::Timings => self.timings.chain().key(level),
            Tab::Staff => self.staff.chain().key(level),
        };
        key.map(str::to_string)
    }

    /// Deepest column the user can focus: one past the selected prefix,
    /// capped at the last level.
    fn max_focus_level(&self) -> usize {
        let depth = match self.current_tab {
            Tab::Timings => self.timings.chain().depth(),
            Tab::Staff => self.staff.chain().depth(),
        };
        depth.min(self.level_count() - 1)
    }

    pub fn move_focus(&mut self, delta: isize) {
        let max = self.max_focus_level() as isize;
        let next = (self.focus_level as isize + delta).clamp(0, max);
        if next as usize != self.focus_level {
            self.focus_level = next as usize;
            self.option_selection = self.highlight_for_level(self.focus_level);
        }
    }

    /// Start the highlight on the already-selected key, if there is one.
    fn highlight_for_level(&self, level: usize) -> usize {
        let options = self.options_at(level);
        self.chain_key(level)
            .and_then(|key| options.iter().position(|c| c.value == key))
            .unwrap_or(0)
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.focused_options().len();
        if len == 0 {
            return;
        }
        let next = (self.option_selection as isize + delta).clamp(0, len as isize - 1);
        self.option_selection = next as usize;
    }

    /// Apply the highlighted choice of the focused column.
    pub fn pick_focused(&mut self) {
        let options = self.focused_options();
        let Some(choice) = options.get(self.option_selection).cloned() else {
            return;
        };
        let level = self.focus_level;

        let result = match self.current_tab {
            Tab::Timings => self.timings.set_level(level, &choice.value),
            Tab::Staff => self.staff.set_level(level, &choice.value),
        };

        match result {
            Ok(()) => {
                if level == 0 {
                    self.remember_zone(&choice.value);
                }
                // Move on to the next column when it has anything to offer
                let next = level + 1;
                if next < self.level_count() && !self.options_at(next).is_empty() {
                    self.focus_level = next;
                    self.option_selection = 0;
                }
            }
            Err(e) => {
                // Should not happen from our own UI; degrade to a message
                warn!(error = %e, level, key = %choice.value, "Selection rejected");
                self.status_message = Some(format!("Selection rejected: {}", e));
            }
        }
    }

    /// Organization-wide role lookup from the number keys.
    pub fn quick_role(&mut self, index: usize) {
        if let Some(role) = Role::ALL.get(index).copied() {
            info!(%role, "Quick role lookup");
            self.staff.quick_role(role);
        }
    }

    fn remember_zone(&mut self, zone: &str) {
        if self.config.last_zone.as_deref() == Some(zone) {
            return;
        }
        self.config.last_zone = Some(zone.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Returns false (with a hint) when search has nothing to run against.
    pub fn enter_search(&mut self) -> bool {
        if self.current_tab == Tab::Staff && !self.staff.has_search_universe() {
            self.status_message =
                Some("Pick a role first ([1]-[4]) to enable name search".to_string());
            return false;
        }
        self.state = AppState::Searching;
        self.suggestion_selection = 0;
        true
    }

    pub fn search_text(&self) -> &str {
        match self.current_tab {
            Tab::Timings => self.timings.search_text(),
            Tab::Staff => self.staff.search_text(),
        }
    }

    pub fn matches_len(&self) -> usize {
        match self.current_tab {
            Tab::Timings => self.timings.matches().len(),
            Tab::Staff => self.staff.matches().len(),
        }
    }

    /// Labels of the current suggestions, for the dropdown list.
    pub fn match_labels(&self) -> Vec<String> {
        let matches = match self.current_tab {
            Tab::Timings => self.timings.matches(),
            Tab::Staff => self.staff.matches(),
        };
        matches.iter().map(|s| s.label().to_string()).collect()
    }

    /// Number of leading cascade levels already selected on this tab.
    pub fn level_depth(&self) -> usize {
        match self.current_tab {
            Tab::Timings => self.timings.chain().depth(),
            Tab::Staff => self.staff.chain().depth(),
        }
    }

    pub fn search_push(&mut self, c: char) {
        let mut text = self.search_text().to_string();
        text.push(c);
        self.run_search(&text);
    }

    pub fn search_pop(&mut self) {
        let mut text = self.search_text().to_string();
        text.pop();
        self.run_search(&text);
    }

    fn run_search(&mut self, text: &str) {
        match self.current_tab {
            Tab::Timings => self.timings.search(text),
            Tab::Staff => self.staff.search(text),
        }
        self.suggestion_selection = 0;
    }

    pub fn move_suggestion(&mut self, delta: isize) {
        let len = self.matches_len();
        if len == 0 {
            return;
        }
        let next = (self.suggestion_selection as isize + delta).clamp(0, len as isize - 1);
        self.suggestion_selection = next as usize;
    }

    /// Commit the highlighted suggestion. Returns false when there is none.
    pub fn commit_suggestion(&mut self) -> bool {
        let suggestion: Option<Suggestion> = match self.current_tab {
            Tab::Timings => self.timings.matches().get(self.suggestion_selection).cloned(),
            Tab::Staff => self.staff.matches().get(self.suggestion_selection).cloned(),
        };
        let Some(suggestion) = suggestion else {
            return false;
        };

        let applied = match self.current_tab {
            Tab::Timings => self.timings.select_suggestion(&suggestion),
            Tab::Staff => self.staff.select_suggestion(&suggestion),
        };
        if !applied {
            return false;
        }

        self.state = AppState::Normal;
        if let Suggestion::School { ref zone, .. } = suggestion {
            self.remember_zone(zone);
            // Zone and school are now locked in; continue at the grade column
            self.focus_level = self.max_focus_level();
            self.option_selection = 0;
        }
        true
    }

    pub fn cancel_search(&mut self) {
        match self.current_tab {
            Tab::Timings => self.timings.clear_search(),
            Tab::Staff => self.staff.clear_search(),
        }
        self.suggestion_selection = 0;
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Tabs
    // =========================================================================

    pub fn switch_tab(&mut self, tab: Tab) {
        if tab == self.current_tab {
            return;
        }
        self.current_tab = tab;
        self.focus_level = 0;
        self.option_selection = self.highlight_for_level(0);
        self.suggestion_selection = 0;
        self.state = AppState::Normal;
    }

    pub fn view(&self) -> ViewState {
        match self.current_tab {
            Tab::Timings => self.timings.view(),
            Tab::Staff => self.staff.view(),
        }
    }

    // =========================================================================
    // Background lookups
    // =========================================================================

    /// Hand any fetch the engine has queued over to the tokio runtime.
    pub fn dispatch_pending_fetch(&mut self) {
        let Some(ticket) = self.staff.take_pending_fetch() else {
            return;
        };
        info!(
            query = %ticket.query.describe(),
            generation = ticket.generation,
            "Dispatching staff lookup"
        );
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            let result = api
                .fetch_staff(&ticket.query)
                .await
                .map_err(|e| format!("{:#}", e));
            let outcome = RefreshResult::Roster {
                generation: ticket.generation,
                query: ticket.query,
                result,
            };
            if let Err(e) = tx.send(outcome).await {
                error!(error = %e, "Failed to send lookup result - channel closed");
            }
        });
    }

    /// Warm the cache with every role's organization-wide roster.
    pub fn prefetch_all_roles(&mut self) {
        if self.prefetching {
            return;
        }
        self.prefetching = true;
        self.status_message = Some("Refreshing roster cache...".to_string());
        info!("Starting roster prefetch for all roles");

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            stream::iter(Role::ALL)
                .map(|role| {
                    let api = api.clone();
                    async move {
                        let result = api.fetch_staff(&StaffQuery::for_role(role.label())).await;
                        (role, result)
                    }
                })
                .buffer_unordered(PREFETCH_CONCURRENCY)
                .for_each(|(role, result)| {
                    let tx = tx.clone();
                    async move {
                        let msg = match result {
                            Ok(records) => RefreshResult::PrefetchedRole { role, records },
                            Err(e) => RefreshResult::PrefetchFailed {
                                role,
                                reason: format!("{:#}", e),
                            },
                        };
                        if let Err(e) = tx.send(msg).await {
                            error!(error = %e, "Failed to send prefetch result - channel closed");
                        }
                    }
                })
                .await;
            let _ = tx.send(RefreshResult::PrefetchComplete).await;
        });
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

    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::Roster {
                generation,
                query,
                result,
            } => {
                let applied = self.staff.complete_fetch(generation, result);
                if !applied {
                    debug!(generation, "Stale lookup outcome ignored");
                    return;
                }
                if let FetchState::Loaded { records, .. } = self.staff.fetch_state() {
                    let records = records.clone();
                    if let Err(e) = self.cache.save_roster(&query, &records) {
                        warn!(error = %e, "Failed to cache staff roster");
                    }
                }
            }
            RefreshResult::PrefetchedRole { role, records } => {
                if let Err(e) =
                    self.cache.save_roster(&StaffQuery::for_role(role.label()), &records)
                {
                    warn!(error = %e, %role, "Failed to cache prefetched roster");
                }
                self.status_message =
                    Some(format!("Cached {} roster ({} records)", role, records.len()));
            }
            RefreshResult::PrefetchFailed { role, reason } => {
                error!(%role, error = %reason, "Roster prefetch failed");
                self.status_message = Some(format!("Prefetch failed for {}: {}", role, reason));
            }
            RefreshResult::PrefetchComplete => {
                self.prefetching = false;
                // Only clear progress messages, preserve errors
                if let Some(ref msg) = self.status_message {
                    if !msg.contains("failed") {
                        self.status_message = Some("Roster cache refreshed".to_string());
                    }
                }
            }
        }
    }

    /// Drain engine notifications into UI adjustments and the status bar.
    pub fn drain_engine_events(&mut self) {
        for event in self.timings.take_events() {
            self.apply_event(Tab::Timings, event);
        }
        for event in self.staff.take_events() {
            self.apply_event(Tab::Staff, event);
        }
    }

    fn apply_event(&mut self, tab: Tab, event: LookupEvent) {
        match event {
            LookupEvent::OptionsChanged { level, choices } => {
                debug!(tab = tab.title(), level, count = choices.len(), "Options changed");
                if tab == self.current_tab && level == self.focus_level {
                    self.option_selection = 0;
                }
            }
            LookupEvent::SearchMatches(matches) => {
                debug!(tab = tab.title(), count = matches.len(), "Search matches updated");
            }
            LookupEvent::Resolved(view) => match view {
                ViewState::Timings(pairs) => {
                    self.status_message = Some(format!("{} subjects scheduled", pairs.len()));
                }
                ViewState::StaffList(records) => {
                    self.status_message = Some(format!("{} records found", records.len()));
                }
                _ => {}
            },
            LookupEvent::FetchStateChanged(state) => match state {
                FetchState::Loading { query } => {
                    self.status_message = Some(format!("Looking up {}...", query.describe()));
                }
                FetchState::Failed { query, reason } => {
                    error!(query = %query.describe(), error = %reason, "Staff lookup failed");
                    let hint = self
                        .cache
                        .roster_age(&query)
                        .map(|age| format!(" (cached copy from {})", age))
                        .unwrap_or_default();
                    self.status_message = Some(format!("Lookup failed: {}{}", reason, hint));
                }
                FetchState::Loaded { .. } => {
                    // The Resolved event right behind this one carries the message
                    self.status_message = None;
                }
                FetchState::Idle => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Timings.next(), Tab::Staff);
        assert_eq!(Tab::Staff.next(), Tab::Timings);
        assert_eq!(Tab::Timings.prev(), Tab::Staff);
    }
}
