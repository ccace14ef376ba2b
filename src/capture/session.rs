use std::collections::HashMap;

/// Durable storage key for the session identifier.
pub const SESSION_ID_KEY: &str = "pagepulse_session_id";
/// Durable storage key for the last-activity timestamp (ms since epoch).
pub const SESSION_TS_KEY: &str = "pagepulse_session_ts";
/// Tab-scoped storage key for the first-touch channel.
pub const CHANNEL_KEY: &str = "pagepulse_channel";

/// Idle timeout after which the next event mints a fresh session (30 min).
pub const SESSION_IDLE_TIMEOUT_MS: u64 = 30 * 60 * 1000;

/// Channel used when no query parameter or cached value exists.
pub const DIRECT_CHANNEL: &str = "direct";

/// Minimal key-value storage seam standing in for browser storage.
///
/// The session uses a durable instance (survives tab close); the channel uses
/// a tab-scoped one. Two tabs racing on the durable store may briefly split a
/// session, which is accepted as harmless.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store for tests and embedding hosts without real storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// Generate a session identifier with UUID-quality randomness.
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Timestamp + random-suffix scheme for hosts without a secure UUID source.
pub fn fallback_session_id(now_ms: u64) -> String {
    use rand::Rng;
    let suffix: u64 = rand::rng().random();
    format!("sess_{now_ms}_{suffix:x}")
}

/// Resolve the session identifier for the current visit.
///
/// Reuses the persisted id unless it is missing or idle longer than
/// [`SESSION_IDLE_TIMEOUT_MS`], in which case `mint` produces a fresh one.
/// Always persists `(id, now)`, sliding the expiry window forward.
pub fn resolve_session(
    store: &mut dyn KvStore,
    now_ms: u64,
    mint: &mut dyn FnMut() -> String,
) -> String {
    let previous = store.get(SESSION_ID_KEY).filter(|id| !id.is_empty());
    let last_active = store
        .get(SESSION_TS_KEY)
        .and_then(|ts| ts.parse::<u64>().ok())
        .unwrap_or(0);
    let expired = last_active == 0 || now_ms.saturating_sub(last_active) > SESSION_IDLE_TIMEOUT_MS;

    let session_id = match previous {
        Some(id) if !expired => id,
        _ => mint(),
    };

    store.set(SESSION_ID_KEY, &session_id);
    store.set(SESSION_TS_KEY, &now_ms.to_string());
    session_id
}

/// Refresh the session's last-activity timestamp after a tracked event.
pub fn touch_session(store: &mut dyn KvStore, session_id: &str, now_ms: u64) {
    if session_id.is_empty() {
        return;
    }
    store.set(SESSION_ID_KEY, session_id);
    store.set(SESSION_TS_KEY, &now_ms.to_string());
}

/// Resolve the traffic channel: `ch` query parameter first, then the cached
/// tab value, else `"direct"`. The result is cached, so attribution is
/// first-touch for the lifetime of the tab.
pub fn resolve_channel(query: &str, tab_store: &mut dyn KvStore) -> String {
    let from_url = channel_param(query);
    let cached = tab_store.get(CHANNEL_KEY).filter(|c| !c.is_empty());

    let channel = from_url
        .or(cached)
        .unwrap_or_else(|| DIRECT_CHANNEL.to_string());
    tab_store.set(CHANNEL_KEY, &channel);
    channel
}

/// Extract a non-empty `ch` value from a raw query string.
fn channel_param(query: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == "ch").then(|| value.trim())
        })
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
