// src/state.rs
use crate::config::Config;
use crate::db::MockStore;
use crate::listing::{PortfolioField, SortState, StockField};
use crate::preferences::{LocalStorage, Preferences};
use tokio::sync::Mutex;

pub struct AppState {
    pub store: MockStore,
    pub prefs: Mutex<Preferences>,
    /// Column the stock table was last sorted on.
    pub stock_sort: Mutex<SortState<StockField>>,
    pub portfolio_sort: Mutex<SortState<PortfolioField>>,
}

impl AppState {
    pub fn new(store: MockStore, prefs: Preferences) -> Self {
        AppState {
            store,
            prefs: Mutex::new(prefs),
            stock_sort: Mutex::new(SortState::new(StockField::Symbol)),
            portfolio_sort: Mutex::new(SortState::new(PortfolioField::Value)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let store = MockStore::init(config);
        let prefs = Preferences::new(LocalStorage::open(&config.prefs_path));
        AppState::new(store, prefs)
    }

    pub async fn watchlist(&self) -> Vec<String> {
        self.prefs.lock().await.watchlist()
    }
}
