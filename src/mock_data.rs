// src/mock_data.rs
use crate::models::{
    EducationalResource, NewsItem, PortfolioItem, PricePoint, ResourceLevel, ResourceType, Stock,
    Trade, TradeSide,
};
use chrono::{Duration, NaiveDate};
use rand::Rng;

pub const STARTING_BALANCE: f64 = 10000.00;

const IMAGE_CDN: &str =
    "https://pub-cdn.sider.ai/u/U0E5HL6G32W/web-coder/68566df8d4661edfdb03fedb/resource";

/// Random walk of daily closes ending at `today`, `days + 1` points long.
/// Each day moves the running price by up to 3% either way.
pub fn generate_price_history<R: Rng>(
    rng: &mut R,
    base_price: f64,
    days: u32,
    today: NaiveDate,
) -> Vec<PricePoint> {
    let mut history = Vec::with_capacity(days as usize + 1);
    let mut current_price = base_price;

    for i in (0..=days).rev() {
        let date = today - Duration::days(i64::from(i));
        current_price += current_price * rng.gen_range(-0.03..0.03);

        history.push(PricePoint {
            date: date.format("%Y-%m-%d").to_string(),
            price: round_cents(current_price),
            volume: rng.gen_range(500_000..10_500_000),
        });
    }

    history
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[allow(clippy::too_many_arguments)]
fn stock(
    symbol: &str,
    name: &str,
    price: f64,
    change: f64,
    change_percent: f64,
    volume: u64,
    market_cap: u64,
    sector: &str,
) -> Stock {
    Stock {
        symbol: symbol.to_string(),
        name: name.to_string(),
        price,
        change,
        change_percent,
        volume,
        market_cap,
        sector: sector.to_string(),
    }
}

pub fn stocks() -> Vec<Stock> {
    vec![
        stock(
            "AAPL",
            "Apple Inc.",
            178.72,
            2.35,
            1.33,
            48_572_100,
            2_812_000_000_000,
            "Technology",
        ),
        stock(
            "MSFT",
            "Microsoft Corporation",
            328.79,
            1.41,
            0.43,
            21_256_700,
            2_445_000_000_000,
            "Technology",
        ),
        stock(
            "GOOGL",
            "Alphabet Inc.",
            142.65,
            -0.30,
            -0.21,
            20_123_400,
            1_791_000_000_000,
            "Technology",
        ),
        stock(
            "AMZN",
            "Amazon.com Inc.",
            145.68,
            1.68,
            1.17,
            32_145_600,
            1_507_000_000_000,
            "Consumer Cyclical",
        ),
        stock(
            "TSLA",
            "Tesla, Inc.",
            237.49,
            -3.28,
            -1.36,
            97_123_800,
            753_000_000_000,
            "Automotive",
        ),
        stock(
            "META",
            "Meta Platforms, Inc.",
            334.92,
            3.74,
            1.13,
            15_628_900,
            859_000_000_000,
            "Technology",
        ),
        stock(
            "NFLX",
            "Netflix, Inc.",
            615.12,
            10.23,
            1.69,
            6_782_300,
            267_000_000_000,
            "Entertainment",
        ),
        stock(
            "V",
            "Visa Inc.",
            248.36,
            0.89,
            0.36,
            5_421_900,
            506_000_000_000,
            "Financial Services",
        ),
    ]
}

/// Holdings as (symbol, shares, average price), valued against `stocks`.
pub fn portfolio(stocks: &[Stock]) -> Vec<PortfolioItem> {
    let positions = [
        ("AAPL", 10.0, 165.32),
        ("MSFT", 5.0, 305.67),
        ("TSLA", 3.0, 252.33),
        ("AMZN", 8.0, 135.27),
    ];

    positions
        .iter()
        .filter_map(|(symbol, shares, avg_price)| {
            stocks
                .iter()
                .find(|s| s.symbol == *symbol)
                .map(|s| PortfolioItem::from_position(s, *shares, *avg_price))
        })
        .collect()
}

fn trade(id: &str, symbol: &str, name: &str, shares: f64, price: f64, date: &str) -> Trade {
    Trade {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        side: TradeSide::Buy,
        shares,
        price,
        total: round_cents(shares * price),
        date: date.to_string(),
    }
}

pub fn trades() -> Vec<Trade> {
    vec![
        trade("trade-001", "AAPL", "Apple Inc.", 5.0, 162.34, "2023-06-10"),
        trade("trade-002", "AAPL", "Apple Inc.", 5.0, 168.30, "2023-07-15"),
        trade("trade-003", "MSFT", "Microsoft Corporation", 5.0, 305.67, "2023-08-22"),
        trade("trade-004", "TSLA", "Tesla, Inc.", 3.0, 252.33, "2023-09-05"),
        trade("trade-005", "AMZN", "Amazon.com Inc.", 8.0, 135.27, "2023-10-17"),
    ]
}

fn news_item(
    id: &str,
    title: &str,
    summary: &str,
    source: &str,
    image: &str,
    date: &str,
    symbol: &str,
) -> NewsItem {
    NewsItem {
        id: id.to_string(),
        title: title.to_string(),
        summary: summary.to_string(),
        source: source.to_string(),
        url: "#".to_string(),
        image_url: format!("{}/{}.jpg", IMAGE_CDN, image),
        date: date.to_string(),
        related_symbols: vec![symbol.to_string()],
    }
}

pub fn news() -> Vec<NewsItem> {
    vec![
        news_item(
            "news-001",
            "Apple Unveils New iPhone 15 with Advanced AI Features",
            "Apple's latest iPhone includes groundbreaking AI capabilities and improved battery life.",
            "Tech Today",
            "2caae43e-729a-48c6-bfb6-31c90acb6ea5",
            "2023-11-01",
            "AAPL",
        ),
        news_item(
            "news-002",
            "Tesla Reports Record Q3 Deliveries Despite Supply Chain Challenges",
            "Tesla beats delivery estimates and maintains its growth trajectory despite ongoing supply chain issues.",
            "Auto Insights",
            "8c396c37-072b-43c9-a8f4-9a7dcc3be433",
            "2023-10-28",
            "TSLA",
        ),
        news_item(
            "news-003",
            "Microsoft Expands Cloud Services with New AI Integration",
            "New AI-driven features coming to Microsoft Azure as the company strengthens its cloud offerings.",
            "Cloud Computing News",
            "be64f002-f651-4907-ab45-bd7f7bde11d6",
            "2023-10-25",
            "MSFT",
        ),
        news_item(
            "news-004",
            "Amazon Announces New Fulfillment Centers to Support Holiday Season",
            "Amazon expands its logistics network with new facilities ahead of expected record holiday sales.",
            "Retail Business Weekly",
            "4756d160-3ab3-40b5-8437-457cc44714cf",
            "2023-10-22",
            "AMZN",
        ),
    ]
}

fn resource(
    id: &str,
    title: &str,
    description: &str,
    resource_type: ResourceType,
    level: ResourceLevel,
    image: &str,
    duration: &str,
) -> EducationalResource {
    EducationalResource {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        resource_type,
        level,
        url: "#".to_string(),
        image_url: format!("{}/{}.jpg", IMAGE_CDN, image),
        duration: duration.to_string(),
    }
}

pub fn resources() -> Vec<EducationalResource> {
    vec![
        resource(
            "edu-001",
            "Understanding Stock Market Basics",
            "Learn the fundamentals of how the stock market works, key terminology, and basic investment strategies.",
            ResourceType::Article,
            ResourceLevel::Beginner,
            "4420236a-a443-4f52-bd16-7f14bb43c622",
            "10 min read",
        ),
        resource(
            "edu-002",
            "Technical Analysis for Beginners",
            "Introduction to reading charts, recognizing patterns, and using technical indicators to make trading decisions.",
            ResourceType::Video,
            ResourceLevel::Beginner,
            "3c3a3edd-a79f-4cb4-8db1-305d807792b8",
            "25 min",
        ),
        resource(
            "edu-003",
            "Fundamental Analysis: Evaluating Company Health",
            "How to analyze financial statements, understand key metrics, and evaluate a company's long-term potential.",
            ResourceType::Course,
            ResourceLevel::Intermediate,
            "37c9679e-5f66-49f3-963d-9fc224bb46ff",
            "1.5 hours",
        ),
        resource(
            "edu-004",
            "Portfolio Diversification Strategies",
            "Learn how to balance risk and reward through proper diversification across asset classes and sectors.",
            ResourceType::Article,
            ResourceLevel::Intermediate,
            "765779ea-32ed-4d84-b542-f8dbfe2420e7",
            "15 min read",
        ),
        resource(
            "edu-005",
            "Advanced Options Trading Techniques",
            "Explore complex options strategies for generating income and hedging risk in various market conditions.",
            ResourceType::Course,
            ResourceLevel::Advanced,
            "4a938acc-e1a0-4576-bf06-b09d6ff23eb6",
            "3 hours",
        ),
    ]
}
