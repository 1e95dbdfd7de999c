use std::sync::Arc;

use dotenv::dotenv;
use quizforge::quiz::generator::{OpenAiGenerator, QuestionSource};
use quizforge::server::{self, AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting quiz server...");

    // A missing or broken credential must not take the process down; requests
    // fail individually instead.
    let source: Option<Arc<dyn QuestionSource>> = match std::env::var("OPENAI_API_KEY") {
        Ok(key) => match OpenAiGenerator::new(key) {
            Ok(generator) => Some(Arc::new(generator)),
            Err(err) => {
                log::error!("Could not build OpenAI client: {err}");
                None
            }
        },
        Err(_) => {
            log::error!("OPENAI_API_KEY is not set; generation requests will fail");
            None
        }
    };

    let app = server::app(AppState { source });

    let addr =
        std::env::var("QUIZFORGE_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listener");
    log::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("server error");
}
