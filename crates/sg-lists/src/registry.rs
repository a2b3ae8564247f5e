//! Ownership and refresh lifecycle for the five classification lists.
//!
//! The registry is the only writer of list state. A refresh fetches all
//! sources concurrently, parses and normalizes each into a candidate set,
//! replaces the affected entries wholesale, persists them, and then swaps
//! in a freshly compiled [`ListSnapshot`] as one commit. Readers keep
//! classifying against the previous snapshot until the swap; a failed
//! source leaves its entry's cached candidates in effect.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sg_core::snapshot::{CompiledList, ListSnapshot};
use sg_core::types::{ListKind, SourceFormat};
use sg_core::url::normalize;

use crate::parser;
use crate::schedule::{RefreshSchedule, UpdateFrequency};
use crate::storage::{keys, KeyValueStore};

/// Bound on a single source fetch so one unreachable host cannot stall
/// the whole refresh.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Starred entries present regardless of what the source returns.
const PINNED_STARRED: [&str; 1] = ["https://fmhy.net"];

// =============================================================================
// Sources
// =============================================================================

/// One upstream list location.
#[derive(Debug, Clone)]
pub struct ListSource {
    pub kind: ListKind,
    pub format: SourceFormat,
    pub location: String,
}

impl ListSource {
    pub fn new(kind: ListKind, format: SourceFormat, location: impl Into<String>) -> Self {
        Self {
            kind,
            format,
            location: location.into(),
        }
    }
}

/// The stock upstream sources, one per list kind.
pub fn default_sources() -> Vec<ListSource> {
    vec![
        ListSource::new(
            ListKind::Unsafe,
            SourceFormat::FilterList,
            "https://raw.githubusercontent.com/fmhy/FMHYFilterlist/refs/heads/main/sitelist.txt",
        ),
        ListSource::new(
            ListKind::PotentiallyUnsafe,
            SourceFormat::FilterList,
            "https://raw.githubusercontent.com/fmhy/FMHYFilterlist/refs/heads/main/sitelist-plus.txt",
        ),
        ListSource::new(
            ListKind::CommunityKnown,
            SourceFormat::FilterList,
            "https://raw.githubusercontent.com/fmhy/FMHYFilterlist/refs/heads/main/fmhy-filterlist.txt",
        ),
        ListSource::new(
            ListKind::Safe,
            SourceFormat::Markdown,
            "https://api.fmhy.net/single-page",
        ),
        ListSource::new(
            ListKind::Starred,
            SourceFormat::HtmlBookmarks,
            "https://raw.githubusercontent.com/fmhy/bookmarks/refs/heads/main/fmhy_in_bookmarks_starred_only.html",
        ),
    ]
}

// =============================================================================
// List Entries
// =============================================================================

/// Fetch lifecycle of one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchState {
    /// No fetch attempted and nothing in the cache.
    NeverFetched,
    /// Populated by a successful fetch this session.
    Fresh,
    /// Rehydrated from the durable cache; serving until the next refresh.
    Stale,
    /// Last fetch failed; prior candidates remain in effect.
    FetchFailed,
}

impl FetchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeverFetched => "never_fetched",
            Self::Fresh => "fresh",
            Self::Stale => "stale",
            Self::FetchFailed => "fetch_failed",
        }
    }
}

/// One classification list's owned state.
#[derive(Debug, Clone)]
pub struct ListEntry {
    pub kind: ListKind,
    pub format: SourceFormat,
    pub location: String,
    pub candidates: BTreeSet<String>,
    pub fetch_state: FetchState,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl ListEntry {
    fn new(source: &ListSource) -> Self {
        Self {
            kind: source.kind,
            format: source.format,
            location: source.location.clone(),
            candidates: BTreeSet::new(),
            fetch_state: FetchState::NeverFetched,
            last_fetched_at: None,
        }
    }
}

/// Persisted cache record for one list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedList {
    candidates: Vec<String>,
    count: usize,
    last_fetched_at: Option<DateTime<Utc>>,
}

/// Per-list statistics for the settings surface.
#[derive(Debug, Clone)]
pub struct ListStats {
    pub kind: ListKind,
    pub candidate_count: usize,
    pub fetch_state: FetchState,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Refresh Reports
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Every source fetched and committed.
    Success,
    /// Some sources failed; their cached candidates remain in effect.
    Partial,
    /// No source could be fetched.
    Failed,
    /// Scheduled refresh skipped: the frequency threshold has not elapsed.
    NotDue,
}

#[derive(Debug, Clone)]
pub struct ListRefreshStatus {
    pub kind: ListKind,
    pub fetched: bool,
    pub candidate_count: usize,
}

#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub outcome: RefreshOutcome,
    pub lists: Vec<ListRefreshStatus>,
}

impl RefreshReport {
    fn not_due() -> Self {
        Self {
            outcome: RefreshOutcome::NotDue,
            lists: Vec::new(),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected response status: {0}")]
    Status(u16),
    #[error("fetch task failed: {0}")]
    Join(String),
}

// =============================================================================
// Registry
// =============================================================================

struct Inner {
    entries: HashMap<ListKind, ListEntry>,
    snapshot: Arc<ListSnapshot>,
    schedule: RefreshSchedule,
}

/// Owns all five list entries, their compiled snapshot, and the refresh
/// schedule.
pub struct ListRegistry<S: KeyValueStore> {
    store: S,
    http: reqwest::Client,
    sources: Vec<ListSource>,
    inner: RwLock<Inner>,
}

impl<S: KeyValueStore> ListRegistry<S> {
    /// Create a registry over the given store and sources. Lists start
    /// empty (`NeverFetched`); call [`Self::load_from_cache`] and/or
    /// [`Self::refresh_all`] to populate them.
    pub fn new(
        store: S,
        sources: Vec<ListSource>,
        frequency: UpdateFrequency,
        fetch_timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder().timeout(fetch_timeout).build()?;
        let entries: HashMap<ListKind, ListEntry> = sources
            .iter()
            .map(|source| (source.kind, ListEntry::new(source)))
            .collect();
        let snapshot = Arc::new(build_snapshot(&entries));
        Ok(Self {
            store,
            http,
            sources,
            inner: RwLock::new(Inner {
                entries,
                snapshot,
                schedule: RefreshSchedule::new(frequency),
            }),
        })
    }

    fn read_inner(&self) -> RwLockReadGuard<'_, Inner> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, Inner> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// The last-committed compiled snapshot.
    pub fn snapshot(&self) -> Arc<ListSnapshot> {
        Arc::clone(&self.read_inner().snapshot)
    }

    /// Per-list statistics, in stable kind order.
    pub fn stats(&self) -> Vec<ListStats> {
        let inner = self.read_inner();
        ListKind::ALL
            .iter()
            .filter_map(|kind| inner.entries.get(kind))
            .map(|entry| ListStats {
                kind: entry.kind,
                candidate_count: entry.candidates.len(),
                fetch_state: entry.fetch_state,
                last_fetched_at: entry.last_fetched_at,
            })
            .collect()
    }

    pub fn last_refresh_at(&self) -> Option<DateTime<Utc>> {
        self.read_inner().schedule.last_refresh_at
    }

    pub fn frequency(&self) -> UpdateFrequency {
        self.read_inner().schedule.frequency
    }

    /// Adopt a new refresh cadence (settings update).
    pub fn set_frequency(&self, frequency: UpdateFrequency) {
        self.write_inner().schedule.frequency = frequency;
    }

    fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.read_inner().schedule.is_due(now)
    }

    /// Rehydrate entries from the durable cache. Returns true when every
    /// configured list was present; on false the caller should follow up
    /// with `refresh_all(true)`.
    pub fn load_from_cache(&self) -> bool {
        let mut complete = true;
        let mut loaded: Vec<(ListKind, CachedList)> = Vec::new();

        for source in &self.sources {
            let key = keys::list(source.kind);
            match self.store.get(&key) {
                Ok(Some(json)) => match serde_json::from_str::<CachedList>(&json) {
                    Ok(cached) => loaded.push((source.kind, cached)),
                    Err(err) => {
                        log::warn!("discarding corrupt cache record '{key}': {err}");
                        complete = false;
                    }
                },
                Ok(None) => complete = false,
                Err(err) => {
                    log::warn!("cache read failed for '{key}': {err}");
                    complete = false;
                }
            }
        }

        let last_refresh = match self.store.get(keys::LAST_REFRESH) {
            Ok(Some(json)) => serde_json::from_str::<DateTime<Utc>>(&json).ok(),
            _ => None,
        };

        let loaded_count = loaded.len();
        let mut inner = self.write_inner();
        for (kind, cached) in loaded {
            let Some(entry) = inner.entries.get_mut(&kind) else {
                continue;
            };
            entry.candidates = cached.candidates.into_iter().collect();
            if kind == ListKind::Starred {
                pin_starred(&mut entry.candidates);
            }
            entry.fetch_state = FetchState::Stale;
            entry.last_fetched_at = cached.last_fetched_at;
        }
        if last_refresh.is_some() {
            inner.schedule.last_refresh_at = last_refresh;
        }
        inner.snapshot = Arc::new(build_snapshot(&inner.entries));
        drop(inner);

        log::info!(
            "rehydrated {loaded_count} of {} lists from cache",
            self.sources.len()
        );
        complete
    }

    /// Fetch and commit every source. `force` bypasses the frequency
    /// threshold; a scheduled call that is not yet due reports `NotDue`
    /// without touching the network.
    ///
    /// Sources are fetched concurrently and fail independently. An
    /// overlapping refresh simply commits last; there is no out-of-order
    /// reconciliation.
    pub async fn refresh_all(&self, force: bool) -> RefreshReport {
        if !force && !self.is_due(Utc::now()) {
            log::debug!("refresh not due, skipping");
            return RefreshReport::not_due();
        }

        log::info!("refreshing {} list sources", self.sources.len());

        let mut handles = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let client = self.http.clone();
            let source = source.clone();
            handles.push((source.kind, tokio::spawn(fetch_candidates(client, source))));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (kind, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => Err(FetchError::Join(err.to_string())),
            };
            results.push((kind, result));
        }

        self.commit_refresh(results, Utc::now())
    }

    /// Timer-tick entry point: refresh only when the schedule says so.
    pub async fn maybe_refresh(&self) -> Option<RefreshReport> {
        if !self.is_due(Utc::now()) {
            return None;
        }
        Some(self.refresh_all(false).await)
    }

    /// Commit fetch results: replace successful entries wholesale, mark
    /// failures, advance the schedule, persist, and swap the snapshot.
    fn commit_refresh(
        &self,
        results: Vec<(ListKind, Result<BTreeSet<String>, FetchError>)>,
        now: DateTime<Utc>,
    ) -> RefreshReport {
        let mut statuses = Vec::with_capacity(results.len());

        let mut inner = self.write_inner();
        for (kind, result) in results {
            let Some(entry) = inner.entries.get_mut(&kind) else {
                continue;
            };
            match result {
                Ok(mut candidates) => {
                    if kind == ListKind::Starred {
                        pin_starred(&mut candidates);
                    }
                    entry.candidates = candidates;
                    entry.fetch_state = FetchState::Fresh;
                    entry.last_fetched_at = Some(now);
                    self.persist_list(entry);
                    statuses.push(ListRefreshStatus {
                        kind,
                        fetched: true,
                        candidate_count: entry.candidates.len(),
                    });
                }
                Err(err) => {
                    log::warn!("fetch failed for {} list: {err}", kind.as_str());
                    entry.fetch_state = FetchState::FetchFailed;
                    statuses.push(ListRefreshStatus {
                        kind,
                        fetched: false,
                        candidate_count: entry.candidates.len(),
                    });
                }
            }
        }

        // The clock advances even after a failed attempt so a broken
        // source is retried on the next tick, not in a tight loop.
        inner.schedule.mark_attempted(now);
        self.persist_last_refresh(now);
        inner.snapshot = Arc::new(build_snapshot(&inner.entries));
        drop(inner);

        let fetched = statuses.iter().filter(|s| s.fetched).count();
        let outcome = if fetched == statuses.len() {
            RefreshOutcome::Success
        } else if fetched > 0 {
            RefreshOutcome::Partial
        } else {
            RefreshOutcome::Failed
        };

        log::info!("refresh committed: {fetched}/{} sources fetched", statuses.len());

        RefreshReport {
            outcome,
            lists: statuses,
        }
    }

    fn persist_list(&self, entry: &ListEntry) {
        let record = CachedList {
            candidates: entry.candidates.iter().cloned().collect(),
            count: entry.candidates.len(),
            last_fetched_at: entry.last_fetched_at,
        };
        let key = keys::list(entry.kind);
        match serde_json::to_string(&record) {
            Ok(json) => {
                if let Err(err) = self.store.set(&key, &json) {
                    log::warn!("cache write failed for '{key}': {err}");
                }
            }
            Err(err) => log::warn!("cache encode failed for '{key}': {err}"),
        }
    }

    fn persist_last_refresh(&self, now: DateTime<Utc>) {
        match serde_json::to_string(&now) {
            Ok(json) => {
                if let Err(err) = self.store.set(keys::LAST_REFRESH, &json) {
                    log::warn!("cache write failed for '{}': {err}", keys::LAST_REFRESH);
                }
            }
            Err(err) => log::warn!("timestamp encode failed: {err}"),
        }
    }
}

// =============================================================================
// Fetch and Parse
// =============================================================================

async fn fetch_candidates(
    client: reqwest::Client,
    source: ListSource,
) -> Result<BTreeSet<String>, FetchError> {
    let response = client.get(&source.location).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    let text = response.text().await?;
    Ok(extract_candidates(&source, &text))
}

/// Parse raw source text per its format and normalize every candidate;
/// lines that fail normalization are dropped.
fn extract_candidates(source: &ListSource, text: &str) -> BTreeSet<String> {
    let raw: Vec<String> = match source.format {
        SourceFormat::FilterList => parser::parse_filter_list(text)
            .lines_for(source.kind)
            .to_vec(),
        SourceFormat::Markdown => parser::parse_markdown_links(text),
        SourceFormat::HtmlBookmarks => parser::parse_html_bookmarks(text),
    };
    raw.iter()
        .filter_map(|candidate| normalize(candidate))
        .map(|normalized| normalized.as_str().to_string())
        .collect()
}

fn pin_starred(candidates: &mut BTreeSet<String>) {
    for pinned in PINNED_STARRED {
        if let Some(normalized) = normalize(pinned) {
            candidates.insert(normalized.as_str().to_string());
        }
    }
}

fn build_snapshot(entries: &HashMap<ListKind, ListEntry>) -> ListSnapshot {
    ListSnapshot::from_lists(
        entries
            .values()
            .map(|entry| CompiledList::new(entry.kind, entry.candidates.iter())),
    )
}
