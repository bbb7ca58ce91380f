// src/api.rs
use crate::chart::{render_svg, tooltip_at, ChartOptions, Scale};
use crate::db;
use crate::error::{handle_rejection, ApiError};
use crate::listing::{
    filter_sorted, sectors, PerformanceFilter, PortfolioField, ResourceFilter, SortDirection,
    SortState, StockField, StockFilter, TradeFilter,
};
use crate::models::{ResourceLevel, ResourceType, TradeSide, WatchlistItem};
use crate::pages::{load_page, PortfolioSummary, Route};
use crate::portfolio::market_overview;
use crate::preferences::resolve_watchlist;
use crate::state::AppState;
use crate::trading::TradeConfirmation;
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Default, Deserialize)]
struct StockQuery {
    q: Option<String>,
    sector: Option<String>,
    sort: Option<StockField>,
    dir: Option<SortDirection>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuery {
    /// Pointer offset, used by the tooltip route.
    x: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    grid: Option<bool>,
    tooltip: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct PortfolioQuery {
    #[serde(default)]
    filter: PerformanceFilter,
    sort: Option<PortfolioField>,
    dir: Option<SortDirection>,
}

#[derive(Debug, Default, Deserialize)]
struct TradeQuery {
    #[serde(rename = "type", default)]
    side: TradeFilter,
}

#[derive(Debug, Default, Deserialize)]
struct ResourceQuery {
    #[serde(rename = "type")]
    resource_type: Option<ResourceType>,
    level: Option<ResourceLevel>,
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    path: String,
}

#[derive(Debug, Deserialize)]
struct SortRequest<F> {
    field: F,
}

#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    /// Raw text from the shares field.
    pub shares: String,
}

pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let stocks = warp::path!("api" / "stocks")
        .and(warp::get())
        .and(warp::query::<StockQuery>())
        .and(with_state(state.clone()))
        .and_then(list_stocks_handler);

    let search = warp::path!("api" / "stocks" / "search")
        .and(warp::get())
        .and(warp::query::<SearchQuery>())
        .and(with_state(state.clone()))
        .and_then(search_stocks_handler);

    let stock_sort = warp::path!("api" / "stocks" / "sort")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(select_stock_sort_handler);

    let stock = warp::path!("api" / "stocks" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(get_stock_handler);

    let stock_news = warp::path!("api" / "stocks" / String / "news")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(stock_news_handler);

    let chart = warp::path!("api" / "stocks" / String / "chart")
        .and(warp::get())
        .and(warp::query::<ChartQuery>())
        .and(with_state(state.clone()))
        .and_then(chart_handler);

    let tooltip = warp::path!("api" / "stocks" / String / "chart" / "tooltip")
        .and(warp::get())
        .and(warp::query::<ChartQuery>())
        .and(with_state(state.clone()))
        .and_then(tooltip_handler);

    let sector_list = warp::path!("api" / "sectors")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(sectors_handler);

    let news = warp::path!("api" / "news")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(market_news_handler);

    let overview = warp::path!("api" / "market" / "overview")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(market_overview_handler);

    let portfolio = warp::path!("api" / "portfolio")
        .and(warp::get())
        .and(warp::query::<PortfolioQuery>())
        .and(with_state(state.clone()))
        .and_then(portfolio_handler);

    let portfolio_sort = warp::path!("api" / "portfolio" / "sort")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(select_portfolio_sort_handler);

    let summary = warp::path!("api" / "portfolio" / "summary")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(portfolio_summary_handler);

    let trades = warp::path!("api" / "trades")
        .and(warp::get())
        .and(warp::query::<TradeQuery>())
        .and(with_state(state.clone()))
        .and_then(trade_history_handler);

    let submit = warp::path!("api" / "trades")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(submit_trade_handler);

    let account = warp::path!("api" / "account")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(account_handler);

    let resources = warp::path!("api" / "resources")
        .and(warp::get())
        .and(warp::query::<ResourceQuery>())
        .and(with_state(state.clone()))
        .and_then(resources_handler);

    let watchlist = warp::path!("api" / "watchlist")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(watchlist_handler);

    let watch = warp::path!("api" / "watchlist" / String)
        .and(warp::put())
        .and(with_state(state.clone()))
        .and_then(add_to_watchlist_handler);

    let unwatch = warp::path!("api" / "watchlist" / String)
        .and(warp::delete())
        .and(with_state(state.clone()))
        .and_then(remove_from_watchlist_handler);

    let preferences = warp::path!("api" / "preferences")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(preferences_handler);

    let dark_mode = warp::path!("api" / "preferences" / "dark-mode")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and_then(toggle_dark_mode_handler);

    let page = warp::path!("api" / "pages")
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_state(state))
        .and_then(page_handler);

    stocks
        .or(search)
        .or(stock_sort)
        .or(stock)
        .or(stock_news)
        .or(chart)
        .or(tooltip)
        .or(sector_list)
        .or(news)
        .or(overview)
        .or(portfolio)
        .or(portfolio_sort)
        .or(summary)
        .or(trades)
        .or(submit)
        .or(account)
        .or(resources)
        .or(watchlist)
        .or(watch)
        .or(unwatch)
        .or(preferences)
        .or(dark_mode)
        .or(page)
        .recover(handle_rejection)
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn reject(e: impl Into<ApiError>) -> Rejection {
    warp::reject::custom(e.into())
}

async fn list_stocks_handler(
    query: StockQuery,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let stocks = db::get_all_stocks(&state.store).await;
    let filter = StockFilter {
        query: query.q.unwrap_or_default(),
        sector: query.sector,
    };
    let mut sort = match query.sort {
        Some(field) => SortState::new(field),
        None => *state.stock_sort.lock().await,
    };
    if let Some(direction) = query.dir {
        sort.direction = direction;
    }

    let listed = filter_sorted(&stocks, |s| filter.matches(s), sort);
    info!("Listed {} of {} stocks.", listed.len(), stocks.len());
    Ok(warp::reply::json(&listed))
}

async fn search_stocks_handler(
    query: SearchQuery,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let results = db::search_stocks(&state.store, &query.q).await;
    info!("Search {:?} matched {} stocks.", query.q, results.len());
    Ok(warp::reply::json(&results))
}

async fn get_stock_handler(symbol: String, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    match db::get_stock_by_symbol(&state.store, &symbol).await {
        Some(stock) => {
            info!("Stock {} retrieved successfully.", symbol);
            Ok(warp::reply::json(&stock))
        }
        None => {
            warn!("Stock {} not found.", symbol);
            Err(reject(ApiError::not_found("Stock not found")))
        }
    }
}

async fn stock_news_handler(
    symbol: String,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let news = db::get_stock_news(&state.store, &symbol).await;
    Ok(warp::reply::json(&news))
}

fn chart_options(query: &ChartQuery) -> Result<ChartOptions, ApiError> {
    let defaults = ChartOptions::default();
    let width = query.width.unwrap_or(defaults.width);
    let height = query.height.unwrap_or(defaults.height);
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(ApiError::bad_request("Chart dimensions must be positive numbers"));
    }

    Ok(ChartOptions {
        width,
        height,
        show_grid: query.grid.unwrap_or(defaults.show_grid),
        show_tooltip: query.tooltip.unwrap_or(defaults.show_tooltip),
        ..defaults
    })
}

async fn chart_handler(
    symbol: String,
    query: ChartQuery,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let options = chart_options(&query).map_err(reject)?;
    let stock = db::get_stock_by_symbol(&state.store, &symbol)
        .await
        .ok_or_else(|| reject(ApiError::not_found("Stock not found")))?;

    match render_svg(&stock.history, &options) {
        Some(svg) => Ok(warp::reply::with_header(svg, "content-type", "image/svg+xml")),
        None => {
            error!("No price history to chart for {}.", symbol);
            Err(reject(ApiError::not_found("No price history")))
        }
    }
}

async fn tooltip_handler(
    symbol: String,
    query: ChartQuery,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let options = chart_options(&query).map_err(reject)?;
    let pointer_x = match query.x {
        Some(x) if x.is_finite() => x,
        _ => {
            return Err(reject(ApiError::bad_request("Pointer position must be a number")));
        }
    };
    let stock = db::get_stock_by_symbol(&state.store, &symbol)
        .await
        .ok_or_else(|| reject(ApiError::not_found("Stock not found")))?;

    let tooltip = Scale::new(&stock.history, options.width, options.height)
        .and_then(|scale| tooltip_at(&stock.history, &scale, pointer_x));
    match tooltip {
        Some(tooltip) => Ok(warp::reply::json(&tooltip)),
        None => Err(reject(ApiError::not_found("No point at that position"))),
    }
}

async fn select_stock_sort_handler(
    request: SortRequest<StockField>,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let mut sort = state.stock_sort.lock().await;
    *sort = sort.select(request.field);
    info!("Stocks sorted by {:?} {:?}.", sort.field, sort.direction);
    Ok(warp::reply::json(&*sort))
}

async fn select_portfolio_sort_handler(
    request: SortRequest<PortfolioField>,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let mut sort = state.portfolio_sort.lock().await;
    *sort = sort.select(request.field);
    info!("Portfolio sorted by {:?} {:?}.", sort.field, sort.direction);
    Ok(warp::reply::json(&*sort))
}

async fn sectors_handler(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let stocks = db::get_all_stocks(&state.store).await;
    Ok(warp::reply::json(&sectors(&stocks)))
}

async fn market_news_handler(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let news = db::get_market_news(&state.store).await;
    Ok(warp::reply::json(&news))
}

async fn market_overview_handler(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let stocks = db::get_all_stocks(&state.store).await;
    Ok(warp::reply::json(&market_overview(&stocks)))
}

async fn portfolio_handler(
    query: PortfolioQuery,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let holdings = db::get_portfolio(&state.store).await;
    let mut sort = match query.sort {
        Some(field) => SortState::new(field),
        None => *state.portfolio_sort.lock().await,
    };
    if let Some(direction) = query.dir {
        sort.direction = direction;
    }

    let listed = filter_sorted(&holdings, |h| query.filter.matches(h), sort);
    info!("Portfolio retrieved successfully.");
    Ok(warp::reply::json(&listed))
}

async fn portfolio_summary_handler(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let holdings = db::get_portfolio(&state.store).await;
    let summary = PortfolioSummary::from_holdings(&holdings);
    Ok(warp::reply::json(&summary))
}

async fn trade_history_handler(
    query: TradeQuery,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let trades = db::get_trade_history(&state.store).await;
    Ok(warp::reply::json(&query.side.apply(&trades)))
}

async fn submit_trade_handler(
    request: TradeRequest,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    match db::submit_trade(&state.store, &request.symbol, request.side, &request.shares).await {
        Ok(trade) => {
            let confirmation = TradeConfirmation::from(trade);
            info!("{}", confirmation.message);
            Ok(warp::reply::with_status(
                warp::reply::json(&confirmation),
                StatusCode::CREATED,
            ))
        }
        Err(e) => {
            warn!(
                "Rejected {} of {:?} {}: {}",
                request.side, request.shares, request.symbol, e
            );
            Err(reject(e))
        }
    }
}

async fn account_handler(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let account = db::get_user_account(&state.store).await;
    Ok(warp::reply::json(&account))
}

async fn resources_handler(
    query: ResourceQuery,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let filter = ResourceFilter {
        resource_type: query.resource_type,
        level: query.level,
        query: query.q,
    };

    // Let the narrowest service call do the first pass.
    let candidates = match (filter.level, filter.resource_type) {
        (Some(level), _) => db::get_resources_by_level(&state.store, level).await,
        (None, Some(resource_type)) => db::get_resources_by_type(&state.store, resource_type).await,
        (None, None) if !filter.query.is_empty() => {
            db::search_resources(&state.store, &filter.query).await
        }
        (None, None) => db::get_all_resources(&state.store).await,
    };

    Ok(warp::reply::json(&filter.apply(&candidates)))
}

async fn watchlist_reply(state: &AppState) -> serde_json::Value {
    let symbols = state.watchlist().await;
    let stocks = db::get_all_stocks(&state.store).await;
    let items: Vec<WatchlistItem> = resolve_watchlist(&stocks, &symbols)
        .iter()
        .map(WatchlistItem::from)
        .collect();
    json!({ "symbols": symbols, "stocks": items })
}

async fn watchlist_handler(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&watchlist_reply(&state).await))
}

async fn add_to_watchlist_handler(
    symbol: String,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    if !state.store.has_stock(&symbol) {
        warn!("Refusing to watch unknown symbol {}.", symbol);
        return Err(reject(ApiError::not_found("Stock not found")));
    }

    let added = {
        let mut prefs = state.prefs.lock().await;
        prefs.add_to_watchlist(&symbol)
    };
    match added {
        Ok(added) => {
            info!("Watchlist add {}: changed={}", symbol, added);
            let mut body = watchlist_reply(&state).await;
            body["added"] = json!(added);
            Ok(warp::reply::json(&body))
        }
        Err(e) => {
            error!("Failed to update watchlist: {}", e);
            Err(reject(e))
        }
    }
}

async fn remove_from_watchlist_handler(
    symbol: String,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let removed = {
        let mut prefs = state.prefs.lock().await;
        prefs.remove_from_watchlist(&symbol)
    };
    match removed {
        Ok(removed) => {
            info!("Watchlist remove {}: changed={}", symbol, removed);
            let mut body = watchlist_reply(&state).await;
            body["removed"] = json!(removed);
            Ok(warp::reply::json(&body))
        }
        Err(e) => {
            error!("Failed to update watchlist: {}", e);
            Err(reject(e))
        }
    }
}

async fn preferences_handler(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let snapshot = state.prefs.lock().await.snapshot();
    Ok(warp::reply::json(&snapshot))
}

async fn toggle_dark_mode_handler(state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let toggled = state.prefs.lock().await.toggle_dark_mode();
    match toggled {
        Ok(dark_mode) => {
            info!("Dark mode is now {}.", if dark_mode { "on" } else { "off" });
            Ok(warp::reply::json(&json!({ "darkMode": dark_mode })))
        }
        Err(e) => {
            error!("Failed to toggle dark mode: {}", e);
            Err(reject(e))
        }
    }
}

async fn page_handler(query: PageQuery, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let route = Route::parse(&query.path);
    let watchlist = state.watchlist().await;

    match load_page(&route, &state.store, &watchlist).await {
        Ok(page) => {
            info!("Page {} loaded successfully.", route);
            Ok(warp::reply::json(&page))
        }
        Err(e) => {
            warn!("Failed to load page {}: {}", query.path, e);
            Err(reject(e))
        }
    }
}
