// src/db.rs
//! In-memory stand-in for the market and brokerage backends. Every call
//! waits a fixed delay before answering from the seeded catalogue.
use crate::config::Config;
use crate::mock_data;
use crate::models::{
    EducationalResource, NewsItem, PortfolioItem, PricePoint, ResourceLevel, ResourceType, Stock,
    StockWithHistory, Trade, TradeSide, UserAccount,
};
use crate::portfolio::{account_for, shares_held};
use crate::trading::{build_trade, validate_trade, TradeError, TradeTicket};
use chrono::{NaiveDate, Utc};
use log::{debug, info};
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};

const ALL_STOCKS_DELAY: Duration = Duration::from_millis(500);
const STOCK_DETAIL_DELAY: Duration = Duration::from_millis(500);
const SEARCH_STOCKS_DELAY: Duration = Duration::from_millis(300);
const MARKET_NEWS_DELAY: Duration = Duration::from_millis(700);
const STOCK_NEWS_DELAY: Duration = Duration::from_millis(500);
const PORTFOLIO_DELAY: Duration = Duration::from_millis(500);
const TRADE_HISTORY_DELAY: Duration = Duration::from_millis(600);
const EXECUTE_TRADE_DELAY: Duration = Duration::from_millis(800);
const ACCOUNT_DELAY: Duration = Duration::from_millis(400);
const ALL_RESOURCES_DELAY: Duration = Duration::from_millis(500);
const FILTER_RESOURCES_DELAY: Duration = Duration::from_millis(300);
const SEARCH_RESOURCES_DELAY: Duration = Duration::from_millis(400);

pub struct MockStore {
    stocks: Vec<Stock>,
    histories: HashMap<String, Vec<PricePoint>>,
    portfolio: Vec<PortfolioItem>,
    account: UserAccount,
    news: Vec<NewsItem>,
    resources: Vec<EducationalResource>,
    /// Seeded history plus anything executed since startup.
    trades: RwLock<Vec<Trade>>,
    trade_seq: AtomicU64,
    latency: bool,
}

impl MockStore {
    pub fn seeded<R: Rng>(
        rng: &mut R,
        history_days: u32,
        today: NaiveDate,
        latency: bool,
    ) -> Self {
        let stocks = mock_data::stocks();
        let histories = stocks
            .iter()
            .map(|s| {
                let history = mock_data::generate_price_history(rng, s.price, history_days, today);
                (s.symbol.clone(), history)
            })
            .collect();
        let portfolio = mock_data::portfolio(&stocks);
        let account = account_for(mock_data::STARTING_BALANCE, &portfolio);

        MockStore {
            stocks,
            histories,
            portfolio,
            account,
            news: mock_data::news(),
            resources: mock_data::resources(),
            trades: RwLock::new(mock_data::trades()),
            trade_seq: AtomicU64::new(0),
            latency,
        }
    }

    pub fn init(config: &Config) -> Self {
        let store = MockStore::seeded(
            &mut rand::thread_rng(),
            config.history_days,
            Utc::now().date_naive(),
            config.latency,
        );
        info!(
            "Seeded {} stocks with {} days of history.",
            store.stocks.len(),
            config.history_days
        );
        store
    }

    async fn delay(&self, duration: Duration) {
        if self.latency {
            sleep(duration).await;
        }
    }

    fn stock(&self, symbol: &str) -> Option<&Stock> {
        self.stocks.iter().find(|s| s.symbol == symbol)
    }

    pub fn has_stock(&self, symbol: &str) -> bool {
        self.stock(symbol).is_some()
    }
}

pub async fn get_all_stocks(store: &MockStore) -> Vec<Stock> {
    store.delay(ALL_STOCKS_DELAY).await;
    store.stocks.clone()
}

pub async fn get_stock_by_symbol(store: &MockStore, symbol: &str) -> Option<StockWithHistory> {
    store.delay(STOCK_DETAIL_DELAY).await;
    let stock = store.stock(symbol)?.clone();
    let history = store.histories.get(symbol).cloned().unwrap_or_default();
    Some(StockWithHistory { stock, history })
}

pub async fn search_stocks(store: &MockStore, query: &str) -> Vec<Stock> {
    store.delay(SEARCH_STOCKS_DELAY).await;
    let query = query.to_lowercase();
    store
        .stocks
        .iter()
        .filter(|s| {
            s.symbol.to_lowercase().contains(&query) || s.name.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

pub async fn get_market_news(store: &MockStore) -> Vec<NewsItem> {
    store.delay(MARKET_NEWS_DELAY).await;
    store.news.clone()
}

pub async fn get_stock_news(store: &MockStore, symbol: &str) -> Vec<NewsItem> {
    store.delay(STOCK_NEWS_DELAY).await;
    store
        .news
        .iter()
        .filter(|n| n.related_symbols.iter().any(|s| s == symbol))
        .cloned()
        .collect()
}

pub async fn get_portfolio(store: &MockStore) -> Vec<PortfolioItem> {
    store.delay(PORTFOLIO_DELAY).await;
    store.portfolio.clone()
}

pub async fn get_trade_history(store: &MockStore) -> Vec<Trade> {
    store.delay(TRADE_HISTORY_DELAY).await;
    store.trades.read().await.clone()
}

pub async fn get_user_account(store: &MockStore) -> UserAccount {
    store.delay(ACCOUNT_DELAY).await;
    store.account.clone()
}

async fn execute_trade(
    store: &MockStore,
    side: TradeSide,
    symbol: &str,
    shares: f64,
    price: f64,
) -> Trade {
    store.delay(EXECUTE_TRADE_DELAY).await;
    let name = store.stock(symbol).map_or(symbol, |s| s.name.as_str());
    let seq = store.trade_seq.fetch_add(1, Ordering::Relaxed);
    let trade = build_trade(symbol, name, side, shares, price, Utc::now(), seq);
    store.trades.write().await.push(trade.clone());
    debug!("Recorded {} trade {} for {}", side, trade.id, symbol);
    trade
}

pub async fn execute_buy_trade(
    store: &MockStore,
    symbol: &str,
    shares: f64,
    price: f64,
) -> Trade {
    execute_trade(store, TradeSide::Buy, symbol, shares, price).await
}

pub async fn execute_sell_trade(
    store: &MockStore,
    symbol: &str,
    shares: f64,
    price: f64,
) -> Trade {
    execute_trade(store, TradeSide::Sell, symbol, shares, price).await
}

/// Validates a trade form against the current quote, balance and holdings,
/// then executes it at the quoted price.
pub async fn submit_trade(
    store: &MockStore,
    symbol: &str,
    side: TradeSide,
    shares: &str,
) -> Result<Trade, TradeError> {
    let stock = store
        .stock(symbol)
        .ok_or_else(|| TradeError::UnknownSymbol(symbol.to_string()))?;
    let price = stock.price;

    let ticket = TradeTicket {
        shares,
        side,
        price,
        cash_balance: store.account.balance,
        shares_owned: shares_held(&store.portfolio, symbol),
    };
    let shares = validate_trade(&ticket)?;

    let trade = match side {
        TradeSide::Buy => execute_buy_trade(store, symbol, shares, price).await,
        TradeSide::Sell => execute_sell_trade(store, symbol, shares, price).await,
    };
    Ok(trade)
}

pub async fn get_all_resources(store: &MockStore) -> Vec<EducationalResource> {
    store.delay(ALL_RESOURCES_DELAY).await;
    store.resources.clone()
}

pub async fn get_resources_by_level(
    store: &MockStore,
    level: ResourceLevel,
) -> Vec<EducationalResource> {
    store.delay(FILTER_RESOURCES_DELAY).await;
    store
        .resources
        .iter()
        .filter(|r| r.level == level)
        .cloned()
        .collect()
}

pub async fn get_resources_by_type(
    store: &MockStore,
    resource_type: ResourceType,
) -> Vec<EducationalResource> {
    store.delay(FILTER_RESOURCES_DELAY).await;
    store
        .resources
        .iter()
        .filter(|r| r.resource_type == resource_type)
        .cloned()
        .collect()
}

pub async fn search_resources(store: &MockStore, query: &str) -> Vec<EducationalResource> {
    store.delay(SEARCH_RESOURCES_DELAY).await;
    let query = query.to_lowercase();
    store
        .resources
        .iter()
        .filter(|r| {
            r.title.to_lowercase().contains(&query)
                || r.description.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub stocks: Vec<Stock>,
    pub portfolio: Vec<PortfolioItem>,
    pub account: UserAccount,
}

/// Loads stocks, holdings and the account side by side.
pub async fn refresh_data(store: &MockStore) -> MarketSnapshot {
    let (stocks, portfolio, account) = tokio::join!(
        get_all_stocks(store),
        get_portfolio(store),
        get_user_account(store)
    );
    debug!(
        "Refreshed {} stocks and {} holdings",
        stocks.len(),
        portfolio.len()
    );
    MarketSnapshot {
        stocks,
        portfolio,
        account,
    }
}
