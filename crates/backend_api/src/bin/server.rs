use backend_api::{run_server, AppState};
use settings_loader::ThemeId;
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);
    let default_theme = env::var("DEFAULT_THEME")
        .map(|raw| ThemeId::parse_or_default(&raw))
        .unwrap_or_default();

    println!("Budget API Server");
    println!("=================");
    println!("Listening on: {}:{}", host, port);
    println!("Default theme: {}", default_theme);
    println!();

    let state = Arc::new(AppState { default_theme });
    run_server(state, &host, port).await?;

    Ok(())
}
