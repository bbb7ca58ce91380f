// src/listing.rs
//! Filtering and sorting of the tables the pages show.
use crate::models::{
    EducationalResource, PortfolioItem, ResourceLevel, ResourceType, Stock, Trade, TradeSide,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl SortValue<'_> {
    fn compare(&self, other: &SortValue<'_>) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            _ => Ordering::Equal,
        }
    }
}

/// A column a table can be sorted on.
pub trait SortField: Copy + PartialEq {
    type Item;

    /// Direction used when the column is first selected.
    const DEFAULT_DIRECTION: SortDirection;

    fn value<'a>(&self, item: &'a Self::Item) -> SortValue<'a>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StockField {
    Symbol,
    Name,
    Price,
    Change,
    ChangePercent,
    Volume,
    MarketCap,
    Sector,
}

impl SortField for StockField {
    type Item = Stock;
    const DEFAULT_DIRECTION: SortDirection = SortDirection::Asc;

    fn value<'a>(&self, stock: &'a Stock) -> SortValue<'a> {
        match self {
            StockField::Symbol => SortValue::Text(&stock.symbol),
            StockField::Name => SortValue::Text(&stock.name),
            StockField::Sector => SortValue::Text(&stock.sector),
            StockField::Price => SortValue::Number(stock.price),
            StockField::Change => SortValue::Number(stock.change),
            StockField::ChangePercent => SortValue::Number(stock.change_percent),
            StockField::Volume => SortValue::Number(stock.volume as f64),
            StockField::MarketCap => SortValue::Number(stock.market_cap as f64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortfolioField {
    Symbol,
    Name,
    Shares,
    AvgPrice,
    CurrentPrice,
    Change,
    ChangePercent,
    Value,
    Profit,
    ProfitPercent,
}

impl SortField for PortfolioField {
    type Item = PortfolioItem;
    const DEFAULT_DIRECTION: SortDirection = SortDirection::Desc;

    fn value<'a>(&self, item: &'a PortfolioItem) -> SortValue<'a> {
        match self {
            PortfolioField::Symbol => SortValue::Text(&item.symbol),
            PortfolioField::Name => SortValue::Text(&item.name),
            PortfolioField::Shares => SortValue::Number(item.shares),
            PortfolioField::AvgPrice => SortValue::Number(item.avg_price),
            PortfolioField::CurrentPrice => SortValue::Number(item.current_price),
            PortfolioField::Change => SortValue::Number(item.change),
            PortfolioField::ChangePercent => SortValue::Number(item.change_percent),
            PortfolioField::Value => SortValue::Number(item.value),
            PortfolioField::Profit => SortValue::Number(item.profit),
            PortfolioField::ProfitPercent => SortValue::Number(item.profit_percent),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortState<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: SortField> SortState<F> {
    pub fn new(field: F) -> Self {
        SortState {
            field,
            direction: F::DEFAULT_DIRECTION,
        }
    }

    /// Clicking the active column flips it; any other column starts over
    /// at the table's default direction.
    pub fn select(self, field: F) -> Self {
        if self.field == field {
            SortState {
                field,
                direction: self.direction.flipped(),
            }
        } else {
            SortState::new(field)
        }
    }

    pub fn sort(&self, items: &mut [F::Item]) {
        items.sort_by(|a, b| {
            let ordering = self.field.value(a).compare(&self.field.value(b));
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }
}

pub fn filter_sorted<F, P>(items: &[F::Item], keep: P, state: SortState<F>) -> Vec<F::Item>
where
    F: SortField,
    F::Item: Clone,
    P: Fn(&F::Item) -> bool,
{
    let mut selected: Vec<F::Item> = items.iter().filter(|item| keep(*item)).cloned().collect();
    state.sort(&mut selected);
    selected
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockFilter {
    pub query: String,
    pub sector: Option<String>,
}

impl StockFilter {
    pub fn matches(&self, stock: &Stock) -> bool {
        let matches_search = contains_ignore_case(&stock.symbol, &self.query)
            || contains_ignore_case(&stock.name, &self.query);
        let matches_sector = match &self.sector {
            Some(sector) if !sector.is_empty() => stock.sector == *sector,
            _ => true,
        };
        matches_search && matches_sector
    }
}

/// Distinct non-empty sectors in alphabetical order.
pub fn sectors(stocks: &[Stock]) -> Vec<String> {
    stocks
        .iter()
        .filter(|s| !s.sector.is_empty())
        .map(|s| s.sector.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceFilter {
    #[default]
    All,
    Gainers,
    Losers,
}

impl PerformanceFilter {
    pub fn matches(&self, item: &PortfolioItem) -> bool {
        match self {
            PerformanceFilter::All => true,
            PerformanceFilter::Gainers => item.profit > 0.0,
            PerformanceFilter::Losers => item.profit < 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeFilter {
    #[default]
    All,
    Buy,
    Sell,
}

impl TradeFilter {
    pub fn matches(&self, trade: &Trade) -> bool {
        match self {
            TradeFilter::All => true,
            TradeFilter::Buy => trade.side == TradeSide::Buy,
            TradeFilter::Sell => trade.side == TradeSide::Sell,
        }
    }

    pub fn apply(&self, trades: &[Trade]) -> Vec<Trade> {
        trades.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceFilter {
    pub resource_type: Option<ResourceType>,
    pub level: Option<ResourceLevel>,
    pub query: String,
}

impl ResourceFilter {
    pub fn matches(&self, resource: &EducationalResource) -> bool {
        let matches_type = self
            .resource_type
            .map_or(true, |t| resource.resource_type == t);
        let matches_level = self.level.map_or(true, |l| resource.level == l);
        let matches_search = contains_ignore_case(&resource.title, &self.query)
            || contains_ignore_case(&resource.description, &self.query);
        matches_type && matches_level && matches_search
    }

    pub fn apply(&self, resources: &[EducationalResource]) -> Vec<EducationalResource> {
        resources
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_data;

    fn symbols(stocks: &[Stock]) -> Vec<&str> {
        stocks.iter().map(|s| s.symbol.as_str()).collect()
    }

    #[test]
    fn numeric_sort_reverses_when_direction_flips() {
        let stocks = mock_data::stocks();
        let asc = SortState::new(StockField::Price);
        let desc = asc.select(StockField::Price);
        assert_eq!(desc.direction, SortDirection::Desc);

        let mut ascending = stocks.clone();
        asc.sort(&mut ascending);
        let mut descending = ascending.clone();
        desc.sort(&mut descending);

        let mut reversed = symbols(&ascending);
        reversed.reverse();
        assert_eq!(symbols(&descending), reversed);
        assert_eq!(ascending[0].symbol, "GOOGL");
    }

    #[test]
    fn selecting_another_field_resets_direction() {
        let state = SortState::new(PortfolioField::Value);
        assert_eq!(state.direction, SortDirection::Desc);
        let state = state.select(PortfolioField::Value);
        assert_eq!(state.direction, SortDirection::Asc);
        let state = state.select(PortfolioField::Profit);
        assert_eq!(state.field, PortfolioField::Profit);
        assert_eq!(state.direction, SortDirection::Desc);
    }

    #[test]
    fn text_sort_ignores_case() {
        let mut stocks = mock_data::stocks();
        stocks[0].name = "apple lowercase".to_string();
        SortState::new(StockField::Name).sort(&mut stocks);
        assert_eq!(stocks[0].name, "Alphabet Inc.");
        assert_eq!(stocks[2].name, "apple lowercase");
    }

    #[test]
    fn stock_filter_combines_search_and_sector() {
        let stocks = mock_data::stocks();
        let filter = StockFilter {
            query: "inc".to_string(),
            sector: Some("Technology".to_string()),
        };
        let found = filter_sorted(
            &stocks,
            |s| filter.matches(s),
            SortState::new(StockField::Symbol),
        );
        assert_eq!(symbols(&found), vec!["AAPL", "GOOGL", "META"]);

        let everything = StockFilter::default();
        assert!(stocks.iter().all(|s| everything.matches(s)));
    }

    #[test]
    fn sectors_are_distinct_and_sorted() {
        assert_eq!(
            sectors(&mock_data::stocks()),
            vec![
                "Automotive",
                "Consumer Cyclical",
                "Entertainment",
                "Financial Services",
                "Technology"
            ]
        );
    }

    #[test]
    fn performance_filter_splits_gainers_and_losers() {
        let stocks = mock_data::stocks();
        let holdings = mock_data::portfolio(&stocks);
        let losers = filter_sorted(
            &holdings,
            |h| PerformanceFilter::Losers.matches(h),
            SortState::new(PortfolioField::Value),
        );
        assert_eq!(losers.len(), 1);
        assert_eq!(losers[0].symbol, "TSLA");

        let gainers = filter_sorted(
            &holdings,
            |h| PerformanceFilter::Gainers.matches(h),
            SortState::new(PortfolioField::Value),
        );
        let order: Vec<&str> = gainers.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "MSFT", "AMZN"]);
    }

    #[test]
    fn trade_filter_by_side() {
        let mut trades = mock_data::trades();
        trades[0].side = TradeSide::Sell;
        assert_eq!(TradeFilter::Sell.apply(&trades).len(), 1);
        assert_eq!(TradeFilter::Buy.apply(&trades).len(), 4);
        assert_eq!(TradeFilter::All.apply(&trades).len(), 5);
    }

    #[test]
    fn resource_filter_matches_all_criteria() {
        let resources = mock_data::resources();
        let filter = ResourceFilter {
            resource_type: Some(ResourceType::Article),
            level: None,
            query: "DIVERSIFICATION".to_string(),
        };
        let found = filter.apply(&resources);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "edu-004");

        let beginner = ResourceFilter {
            level: Some(ResourceLevel::Beginner),
            ..ResourceFilter::default()
        };
        assert_eq!(beginner.apply(&resources).len(), 2);
    }
}
