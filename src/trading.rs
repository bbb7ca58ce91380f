// src/trading.rs
use crate::models::{Trade, TradeSide};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("Please enter a valid number of shares")]
    InvalidShares,

    #[error("Insufficient funds for this purchase")]
    InsufficientFunds,

    #[error("You cannot sell more shares than you own")]
    InsufficientShares,

    #[error("Unknown stock symbol: {0}")]
    UnknownSymbol(String),
}

/// Everything the form knows when the user submits.
#[derive(Debug, Clone, Copy)]
pub struct TradeTicket<'a> {
    pub shares: &'a str,
    pub side: TradeSide,
    pub price: f64,
    pub cash_balance: f64,
    pub shares_owned: f64,
}

/// Whether `input` has the shape the share field accepts while typing:
/// digits with at most one decimal point. The empty string is allowed here.
pub fn is_share_input(input: &str) -> bool {
    let mut seen_point = false;
    input.chars().all(|c| match c {
        '0'..='9' => true,
        '.' if !seen_point => {
            seen_point = true;
            true
        }
        _ => false,
    })
}

pub fn parse_shares(input: &str) -> Result<f64, TradeError> {
    if input.is_empty() || !is_share_input(input) {
        return Err(TradeError::InvalidShares);
    }

    match input.parse::<f64>() {
        Ok(shares) if shares.is_finite() && shares > 0.0 => Ok(shares),
        _ => Err(TradeError::InvalidShares),
    }
}

/// Returns the accepted share count. Checks run in order: share count,
/// then cash for buys, then holdings for sells.
pub fn validate_trade(ticket: &TradeTicket<'_>) -> Result<f64, TradeError> {
    let shares = parse_shares(ticket.shares)?;

    match ticket.side {
        TradeSide::Buy if shares * ticket.price > ticket.cash_balance => {
            Err(TradeError::InsufficientFunds)
        }
        TradeSide::Sell if shares > ticket.shares_owned => Err(TradeError::InsufficientShares),
        _ => Ok(shares),
    }
}

/// `trade-<unix millis>-<seq>`. The sequence keeps ids distinct when two
/// trades land in the same millisecond.
pub fn trade_id(now: DateTime<Utc>, seq: u64) -> String {
    format!("trade-{}-{}", now.timestamp_millis(), seq)
}

pub fn build_trade(
    symbol: &str,
    name: &str,
    side: TradeSide,
    shares: f64,
    price: f64,
    now: DateTime<Utc>,
    seq: u64,
) -> Trade {
    Trade {
        id: trade_id(now, seq),
        symbol: symbol.to_string(),
        name: name.to_string(),
        side,
        shares,
        price,
        total: shares * price,
        date: now.format("%Y-%m-%d").to_string(),
    }
}

pub fn success_message(trade: &Trade) -> String {
    match trade.side {
        TradeSide::Buy => format!(
            "Successfully purchased {} shares of {}",
            trade.shares, trade.symbol
        ),
        TradeSide::Sell => format!(
            "Successfully sold {} shares of {}",
            trade.shares, trade.symbol
        ),
    }
}

/// What the form shows after an accepted trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeConfirmation {
    pub trade: Trade,
    pub message: String,
}

impl From<Trade> for TradeConfirmation {
    fn from(trade: Trade) -> Self {
        let message = success_message(&trade);
        TradeConfirmation { trade, message }
    }
}
