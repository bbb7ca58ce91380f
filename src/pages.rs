// src/pages.rs
//! In-app routes and the data each page needs to render.
use crate::db::{self, MockStore};
use crate::listing::{sectors, PortfolioField, SortState, StockField};
use crate::models::{
    EducationalResource, NewsItem, PortfolioItem, Stock, StockWithHistory, Trade, UserAccount,
    WatchlistItem,
};
use crate::portfolio::{
    aggregate, market_overview, shares_held, top_holdings, MarketOverview, PortfolioMetrics,
};
use crate::preferences::resolve_watchlist;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

const TOP_HOLDINGS: usize = 3;
const WATCHLIST_SUGGESTIONS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Stocks,
    StockDetail(String),
    Portfolio,
    Trading { symbol: Option<String> },
    Learn,
    NotFound(String),
}

impl Route {
    pub fn parse(location: &str) -> Route {
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (location, None),
        };
        let path = path.trim_start_matches('#');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["stocks"] => Route::Stocks,
            ["stocks", symbol] => Route::StockDetail(symbol.to_string()),
            ["portfolio"] => Route::Portfolio,
            ["trading"] => Route::Trading {
                symbol: query.and_then(|q| query_param(q, "symbol")),
            },
            ["learn"] => Route::Learn,
            _ => Route::NotFound(location.to_string()),
        }
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Stocks => write!(f, "/stocks"),
            Route::StockDetail(symbol) => write!(f, "/stocks/{}", symbol),
            Route::Portfolio => write!(f, "/portfolio"),
            Route::Trading { symbol: Some(symbol) } => write!(f, "/trading?symbol={}", symbol),
            Route::Trading { symbol: None } => write!(f, "/trading"),
            Route::Learn => write!(f, "/learn"),
            Route::NotFound(location) => write!(f, "{}", location),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageError {
    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Stock not found")]
    StockNotFound(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    #[serde(flatten)]
    pub metrics: PortfolioMetrics,
    pub top_holdings: Vec<PortfolioItem>,
}

impl PortfolioSummary {
    pub fn from_holdings(holdings: &[PortfolioItem]) -> Self {
        PortfolioSummary {
            metrics: aggregate(holdings),
            top_holdings: top_holdings(holdings, TOP_HOLDINGS),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub market: MarketOverview,
    pub portfolio: PortfolioSummary,
    pub account: UserAccount,
    pub watchlist: Vec<WatchlistItem>,
    /// Offered when the watchlist is empty.
    pub suggestions: Vec<WatchlistItem>,
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StocksPage {
    pub stocks: Vec<Stock>,
    pub sectors: Vec<String>,
    pub watchlist: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDetailPage {
    pub stock: StockWithHistory,
    pub news: Vec<NewsItem>,
    pub in_watchlist: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPage {
    pub holdings: Vec<PortfolioItem>,
    pub metrics: PortfolioMetrics,
    pub account: UserAccount,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingPage {
    pub stocks: Vec<Stock>,
    pub selected: Option<Stock>,
    pub holdings: Vec<PortfolioItem>,
    pub account: UserAccount,
    pub shares_owned: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnPage {
    pub resources: Vec<EducationalResource>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "page", rename_all = "camelCase")]
pub enum Page {
    Home(HomePage),
    Stocks(StocksPage),
    StockDetail(StockDetailPage),
    Portfolio(PortfolioPage),
    Trading(TradingPage),
    Learn(LearnPage),
}

pub async fn load_page(
    route: &Route,
    store: &MockStore,
    watchlist: &[String],
) -> Result<Page, PageError> {
    match route {
        Route::Home => {
            let (snapshot, news) =
                tokio::join!(db::refresh_data(store), db::get_market_news(store));
            let watched: Vec<WatchlistItem> = resolve_watchlist(&snapshot.stocks, watchlist)
                .iter()
                .map(WatchlistItem::from)
                .collect();
            let suggestions = if watched.is_empty() {
                snapshot
                    .stocks
                    .iter()
                    .take(WATCHLIST_SUGGESTIONS)
                    .map(WatchlistItem::from)
                    .collect()
            } else {
                Vec::new()
            };

            Ok(Page::Home(HomePage {
                market: market_overview(&snapshot.stocks),
                portfolio: PortfolioSummary::from_holdings(&snapshot.portfolio),
                account: snapshot.account,
                watchlist: watched,
                suggestions,
                news,
            }))
        }
        Route::Stocks => {
            let mut stocks = db::get_all_stocks(store).await;
            SortState::new(StockField::Symbol).sort(&mut stocks);
            Ok(Page::Stocks(StocksPage {
                sectors: sectors(&stocks),
                stocks,
                watchlist: watchlist.to_vec(),
            }))
        }
        Route::StockDetail(symbol) => {
            let (stock, news) = tokio::join!(
                db::get_stock_by_symbol(store, symbol),
                db::get_stock_news(store, symbol)
            );
            let stock = stock.ok_or_else(|| PageError::StockNotFound(symbol.clone()))?;
            Ok(Page::StockDetail(StockDetailPage {
                stock,
                news,
                in_watchlist: watchlist.contains(symbol),
            }))
        }
        Route::Portfolio => {
            let (mut holdings, account, trades) = tokio::join!(
                db::get_portfolio(store),
                db::get_user_account(store),
                db::get_trade_history(store)
            );
            SortState::new(PortfolioField::Value).sort(&mut holdings);
            Ok(Page::Portfolio(PortfolioPage {
                metrics: aggregate(&holdings),
                holdings,
                account,
                trades,
            }))
        }
        Route::Trading { symbol } => {
            let snapshot = db::refresh_data(store).await;
            let selected = symbol
                .as_ref()
                .and_then(|symbol| snapshot.stocks.iter().find(|s| s.symbol == *symbol))
                .cloned();
            let shares_owned = selected
                .as_ref()
                .map_or(0.0, |s| shares_held(&snapshot.portfolio, &s.symbol));

            Ok(Page::Trading(TradingPage {
                stocks: snapshot.stocks,
                selected,
                holdings: snapshot.portfolio,
                account: snapshot.account,
                shares_owned,
            }))
        }
        Route::Learn => Ok(Page::Learn(LearnPage {
            resources: db::get_all_resources(store).await,
        })),
        Route::NotFound(location) => Err(PageError::NotFound(location.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn store() -> MockStore {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        MockStore::seeded(&mut StdRng::seed_from_u64(3), 30, today, false)
    }

    #[test]
    fn parses_every_route() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("#/stocks"), Route::Stocks);
        assert_eq!(
            Route::parse("/stocks/AAPL"),
            Route::StockDetail("AAPL".to_string())
        );
        assert_eq!(Route::parse("/portfolio/"), Route::Portfolio);
        assert_eq!(
            Route::parse("/trading?symbol=TSLA"),
            Route::Trading {
                symbol: Some("TSLA".to_string())
            }
        );
        assert_eq!(Route::parse("/trading"), Route::Trading { symbol: None });
        assert_eq!(Route::parse("/learn"), Route::Learn);
        assert_eq!(
            Route::parse("/stocks/AAPL/extra"),
            Route::NotFound("/stocks/AAPL/extra".to_string())
        );
    }

    #[test]
    fn routes_display_as_paths() {
        for path in ["/", "/stocks", "/stocks/V", "/portfolio", "/trading?symbol=V", "/learn"] {
            assert_eq!(Route::parse(path).to_string(), path);
        }
    }

    #[tokio::test]
    async fn home_suggests_stocks_until_something_is_watched() {
        let store = store();
        let Page::Home(home) = load_page(&Route::Home, &store, &[]).await.unwrap() else {
            panic!("expected home page");
        };
        assert!(home.watchlist.is_empty());
        assert_eq!(home.suggestions.len(), 4);
        assert_eq!(home.portfolio.top_holdings.len(), 3);
        assert_eq!(home.portfolio.top_holdings[0].symbol, "AAPL");
        assert_eq!(home.news.len(), 4);

        let watched = vec!["META".to_string()];
        let Page::Home(home) = load_page(&Route::Home, &store, &watched).await.unwrap() else {
            panic!("expected home page");
        };
        assert_eq!(home.watchlist.len(), 1);
        assert!(home.suggestions.is_empty());
    }

    #[tokio::test]
    async fn missing_stock_is_reported() {
        let store = store();
        let err = load_page(&Route::StockDetail("NOPE".to_string()), &store, &[])
            .await
            .unwrap_err();
        assert_eq!(err, PageError::StockNotFound("NOPE".to_string()));
        assert_eq!(err.to_string(), "Stock not found");
    }

    #[tokio::test]
    async fn trading_page_selects_the_requested_stock() {
        let store = store();
        let route = Route::parse("/trading?symbol=MSFT");
        let Page::Trading(page) = load_page(&route, &store, &[]).await.unwrap() else {
            panic!("expected trading page");
        };
        assert_eq!(page.selected.map(|s| s.symbol), Some("MSFT".to_string()));
        assert_eq!(page.shares_owned, 5.0);
    }

    #[tokio::test]
    async fn portfolio_page_orders_by_value() {
        let store = store();
        let Page::Portfolio(page) = load_page(&Route::Portfolio, &store, &[]).await.unwrap() else {
            panic!("expected portfolio page");
        };
        let order: Vec<&str> = page.holdings.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "MSFT", "AMZN", "TSLA"]);
        assert_eq!(page.trades.len(), 5);
    }

    #[tokio::test]
    async fn pages_serialize_with_a_tag() {
        let store = store();
        let page = load_page(&Route::Learn, &store, &[]).await.unwrap();
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["page"], "learn");
        assert_eq!(value["resources"].as_array().map(Vec::len), Some(5));
    }
}
