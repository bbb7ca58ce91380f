// src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub market_cap: u64,
    pub sector: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockWithHistory {
    #[serde(flatten)]
    pub stock: Stock,
    pub history: Vec<PricePoint>,
}

/// A position held in the portfolio, valued at the stock's current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub symbol: String,
    pub name: String,
    pub shares: f64,
    pub avg_price: f64,
    pub current_price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub value: f64,
    pub profit: f64,
    pub profit_percent: f64,
}

impl PortfolioItem {
    /// Builds a position from a quote, deriving value, profit and
    /// profit percent. A zero cost basis reports a profit percent of 0.
    pub fn from_position(stock: &Stock, shares: f64, avg_price: f64) -> Self {
        let value = shares * stock.price;
        let cost_basis = shares * avg_price;
        let profit = value - cost_basis;
        let profit_percent = if cost_basis != 0.0 {
            profit / cost_basis * 100.0
        } else {
            0.0
        };

        PortfolioItem {
            symbol: stock.symbol.clone(),
            name: stock.name.clone(),
            shares,
            avg_price,
            current_price: stock.price,
            change: stock.change,
            change_percent: stock.change_percent,
            value,
            profit,
            profit_percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub shares: f64,
    pub price: f64,
    pub total: f64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl From<&Stock> for WatchlistItem {
    fn from(stock: &Stock) -> Self {
        WatchlistItem {
            symbol: stock.symbol.clone(),
            name: stock.name.clone(),
            price: stock.price,
            change: stock.change,
            change_percent: stock.change_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    pub image_url: String,
    pub date: String,
    pub related_symbols: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Article,
    Video,
    Course,
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(ResourceType::Article),
            "video" => Ok(ResourceType::Video),
            "course" => Ok(ResourceType::Course),
            other => Err(format!("unknown resource type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl FromStr for ResourceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(ResourceLevel::Beginner),
            "intermediate" => Ok(ResourceLevel::Intermediate),
            "advanced" => Ok(ResourceLevel::Advanced),
            other => Err(format!("unknown resource level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationalResource {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub level: ResourceLevel,
    pub url: String,
    pub image_url: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub balance: f64,
    pub portfolio_value: f64,
    pub total_profit: f64,
    pub total_profit_percent: f64,
}
