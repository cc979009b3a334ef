//! Application State

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use swap_core::{Catalog, CatalogLoader, SwapConfig, SwapExecutor, SwapPhase, SwapSession};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration
    pub config: Arc<SwapConfig>,

    /// Price catalog loader (HTTP source in production)
    pub loader: Arc<CatalogLoader>,

    /// Swap executor (simulated settlement)
    pub executor: Arc<SwapExecutor>,

    /// Catalog used by the stateless quote endpoints
    pub catalog: Arc<RwLock<Catalog>>,

    /// Open form sessions, keyed by form id
    pub forms: Arc<Mutex<FormStore>>,
}

impl AppState {
    pub fn new(config: SwapConfig, loader: CatalogLoader, executor: SwapExecutor) -> Self {
        let forms = FormStore::new(config.form_idle_ttl());
        Self {
            config: Arc::new(config),
            loader: Arc::new(loader),
            executor: Arc::new(executor),
            catalog: Arc::new(RwLock::new(Catalog::empty())),
            forms: Arc::new(Mutex::new(forms)),
        }
    }
}

#[derive(Debug)]
struct FormEntry {
    session: SwapSession,
    last_touched: Instant,
}

/// Form sessions with idle expiry.
///
/// Every lookup refreshes the session's idle clock. Sessions that are waiting
/// on settlement are never evicted.
#[derive(Debug)]
pub struct FormStore {
    entries: HashMap<Uuid, FormEntry>,
    idle_ttl: Duration,
}

impl FormStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            idle_ttl,
        }
    }

    pub fn insert(&mut self, id: Uuid, session: SwapSession) {
        self.entries.insert(
            id,
            FormEntry {
                session,
                last_touched: Instant::now(),
            },
        );
    }

    pub fn get(&mut self, id: &Uuid) -> Option<&SwapSession> {
        self.get_mut(id).map(|session| &*session)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut SwapSession> {
        self.entries.get_mut(id).map(|entry| {
            entry.last_touched = Instant::now();
            &mut entry.session
        })
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<SwapSession> {
        self.entries.remove(id).map(|entry| entry.session)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evict sessions idle for longer than the TTL. Returns how many went.
    pub fn sweep_idle(&mut self) -> usize {
        let now = Instant::now();
        let ttl = self.idle_ttl;
        let before = self.entries.len();

        self.entries.retain(|_, entry| {
            entry.session.phase() == SwapPhase::Submitting
                || now.duration_since(entry.last_touched) < ttl
        });

        before - self.entries.len()
    }
}

/// Periodically evict idle form sessions.
pub fn spawn_form_sweeper(state: &AppState, every: Duration) -> JoinHandle<()> {
    let forms = Arc::clone(&state.forms);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let evicted = forms.lock().await.sweep_idle();
            if evicted > 0 {
                tracing::info!(evicted, "evicted idle swap forms");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_idle_forms_are_evicted() {
        let mut store = FormStore::new(Duration::from_secs(60));
        let stale = Uuid::new_v4();
        let active = Uuid::new_v4();
        store.insert(stale, SwapSession::default());
        store.insert(active, SwapSession::default());

        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(store.get(&active).is_some());

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(store.sweep_idle(), 1);
        assert!(!store.contains(&stale));
        assert!(store.contains(&active));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settling_form_survives_sweep() {
        let loader = CatalogLoader::new(Arc::new(swap_core::StaticPriceSource::sample()));
        let mut session = SwapSession::default();
        session.load(&loader).await;
        session.set_source_amount("1");
        let _pending = session.begin_submit().unwrap();

        let mut store = FormStore::new(Duration::from_secs(60));
        let id = Uuid::new_v4();
        store.insert(id, session);

        tokio::time::advance(Duration::from_secs(600)).await;
        assert_eq!(store.sweep_idle(), 0);
        assert!(store.contains(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_task_evicts_in_background() {
        let config = SwapConfig {
            form_idle_ttl_secs: 10,
            ..SwapConfig::default()
        };
        let state = AppState::new(
            config,
            CatalogLoader::new(Arc::new(swap_core::StaticPriceSource::sample())),
            SwapExecutor::new(Arc::new(swap_core::SimulatedSettlement::default())),
        );
        state.forms.lock().await.insert(Uuid::new_v4(), SwapSession::default());

        let sweeper = spawn_form_sweeper(&state, Duration::from_secs(5));
        tokio::time::sleep(Duration::from_secs(16)).await;

        assert!(state.forms.lock().await.is_empty());
        sweeper.abort();
    }
}
