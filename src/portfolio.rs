// src/portfolio.rs
use crate::models::{PortfolioItem, Stock, UserAccount};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub total_value: f64,
    pub total_profit: f64,
    pub total_profit_percent: f64,
}

/// Sums value and profit across holdings. The percent is measured against
/// the aggregate cost basis and is 0 for an empty list or a zero basis.
pub fn aggregate(items: &[PortfolioItem]) -> PortfolioMetrics {
    if items.is_empty() {
        return PortfolioMetrics::default();
    }

    let total_value: f64 = items.iter().map(|item| item.value).sum();
    let total_profit: f64 = items.iter().map(|item| item.profit).sum();
    let cost_basis = total_value - total_profit;
    let total_profit_percent = if cost_basis != 0.0 {
        total_profit / cost_basis * 100.0
    } else {
        0.0
    };

    PortfolioMetrics {
        total_value,
        total_profit,
        total_profit_percent,
    }
}

/// Largest positions by value, at most `limit` of them.
pub fn top_holdings(items: &[PortfolioItem], limit: usize) -> Vec<PortfolioItem> {
    let mut ranked = items.to_vec();
    ranked.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    ranked.truncate(limit);
    ranked
}

pub fn account_for(balance: f64, items: &[PortfolioItem]) -> UserAccount {
    let metrics = aggregate(items);
    UserAccount {
        balance,
        portfolio_value: metrics.total_value,
        total_profit: metrics.total_profit,
        total_profit_percent: metrics.total_profit_percent,
    }
}

pub fn shares_held(items: &[PortfolioItem], symbol: &str) -> f64 {
    items
        .iter()
        .find(|item| item.symbol == symbol)
        .map(|item| item.shares)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    pub gainers: usize,
    pub losers: usize,
    pub avg_change: f64,
    pub avg_volume: f64,
}

pub fn market_overview(stocks: &[Stock]) -> MarketOverview {
    if stocks.is_empty() {
        return MarketOverview::default();
    }

    let count = stocks.len() as f64;
    let gainers = stocks.iter().filter(|s| s.change > 0.0).count();
    let losers = stocks.iter().filter(|s| s.change < 0.0).count();
    let total_change: f64 = stocks.iter().map(|s| s.change_percent).sum();
    let total_volume: f64 = stocks.iter().map(|s| s.volume as f64).sum();

    MarketOverview {
        gainers,
        losers,
        avg_change: total_change / count,
        avg_volume: total_volume / count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_data;

    fn holding(symbol: &str, value: f64, profit: f64) -> PortfolioItem {
        PortfolioItem {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            shares: 1.0,
            avg_price: value - profit,
            current_price: value,
            change: 0.0,
            change_percent: 0.0,
            value,
            profit,
            profit_percent: 0.0,
        }
    }

    #[test]
    fn single_holding_percent_uses_cost_basis() {
        let metrics = aggregate(&[holding("A", 100.0, 10.0)]);
        assert_eq!(metrics.total_value, 100.0);
        assert_eq!(metrics.total_profit, 10.0);
        assert!((metrics.total_profit_percent - 11.111).abs() < 0.001);
    }

    #[test]
    fn empty_portfolio_is_all_zero() {
        assert_eq!(aggregate(&[]), PortfolioMetrics::default());
    }

    #[test]
    fn zero_cost_basis_does_not_divide() {
        let metrics = aggregate(&[holding("A", 50.0, 50.0)]);
        assert_eq!(metrics.total_profit_percent, 0.0);
    }

    #[test]
    fn total_value_matches_sum_of_values() {
        let stocks = mock_data::stocks();
        let holdings = mock_data::portfolio(&stocks);
        let metrics = aggregate(&holdings);
        let sum: f64 = holdings.iter().map(|h| h.shares * h.current_price).sum();
        assert!((metrics.total_value - sum).abs() < 1e-9);
    }

    #[test]
    fn top_holdings_ranks_by_value() {
        let items = vec![
            holding("A", 10.0, 0.0),
            holding("B", 30.0, 0.0),
            holding("C", 20.0, 0.0),
            holding("D", 5.0, 0.0),
        ];
        let top: Vec<String> = top_holdings(&items, 3)
            .into_iter()
            .map(|h| h.symbol)
            .collect();
        assert_eq!(top, vec!["B", "C", "A"]);
    }

    #[test]
    fn account_reflects_holdings() {
        let account = account_for(90.0, &[holding("A", 100.0, 10.0)]);
        assert_eq!(account.balance, 90.0);
        assert_eq!(account.portfolio_value, 100.0);
        assert_eq!(account.total_profit, 10.0);
    }

    #[test]
    fn held_shares_default_to_zero() {
        let items = vec![holding("A", 10.0, 0.0)];
        assert_eq!(shares_held(&items, "A"), 1.0);
        assert_eq!(shares_held(&items, "Z"), 0.0);
    }

    #[test]
    fn overview_counts_movers() {
        let overview = market_overview(&mock_data::stocks());
        assert_eq!(overview.gainers, 6);
        assert_eq!(overview.losers, 2);
        assert!(overview.avg_volume > 0.0);
        assert_eq!(market_overview(&[]), MarketOverview::default());
    }
}
