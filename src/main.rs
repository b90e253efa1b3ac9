mod app;
mod audit;
mod auth;
mod clock;
mod config;
mod envelope;
mod error;
mod friends;
mod ledger;
mod mail;
mod seed;
mod state;
mod storage;
mod store;
mod users;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "dompetku=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    // rows written before phone_digits existed
    let backfill_state = app_state.clone();
    tokio::spawn(async move {
        match users::services::backfill_phone_digits(&backfill_state).await {
            Ok(0) => {}
            Ok(n) => tracing::info!(updated = n, "backfilled phone digits"),
            Err(e) => tracing::warn!(error = %e, "phone digits backfill failed"),
        }
    });

    if app_state.config.dev_seed {
        if let Err(e) = seed::seed_dev(&app_state).await {
            tracing::warn!(error = %e, "dev seed failed");
        }
    }

    app::serve(app::build_app(app_state)).await
}
