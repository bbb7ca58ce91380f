// src/lib.rs
pub mod api;
pub mod chart;
pub mod config;
pub mod db;
pub mod error;
pub mod listing;
pub mod mock_data;
pub mod models;
pub mod pages;
pub mod portfolio;
pub mod preferences;
pub mod state;
pub mod trading;
