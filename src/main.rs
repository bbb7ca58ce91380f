// src/main.rs
use env_logger::Builder;
use log::info;
use std::sync::Arc;
use stock_desk::api;
use stock_desk::config::Config;
use stock_desk::state::AppState;
use warp::Filter;

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    Builder::new()
        .filter_level(config.log_level)
        .format_timestamp_secs()
        .init();

    info!("Starting the stock desk application...");
    if !config.latency {
        info!("Simulated latency disabled.");
    }

    let state = Arc::new(AppState::from_config(&config));
    info!("Preferences stored in {}", config.prefs_path.display());

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allow_header("content-type");
    let routes = api::routes(state)
        .with(cors)
        .with(warp::log("stock_desk::access"));

    info!("Server running on http://{}", config.addr);
    warp::serve(routes).run(config.addr).await;
}
