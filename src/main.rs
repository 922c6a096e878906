use quiz_engine::{
    config::{get_config, init_config},
    services::catalog_service::difficulty_color,
    AppState,
};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();

    let subscriber = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(documents = %config.documents_dir.display(), "Loading quiz catalog");
    let app_state = AppState::from_config(config)?;
    let locale = app_state.current_locale();

    let quizzes: Vec<_> = app_state
        .catalog_service
        .metadata()
        .await
        .into_iter()
        .map(|meta| {
            let color = difficulty_color(&meta.difficulty);
            json!({ "quiz": meta, "difficultyColor": color })
        })
        .collect();
    let stats = app_state.catalog_service.stats().await;
    info!(%locale, quizzes = quizzes.len(), "Catalog ready");

    let report = json!({
        "locale": locale,
        "stats": stats,
        "quizzes": quizzes,
        "categories": app_state.catalog_service.available_categories().await,
        "difficulties": app_state.catalog_service.available_difficulties().await,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
