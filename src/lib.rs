pub mod api;
pub mod cli;
pub mod directory;
pub mod models;
pub mod render;
pub mod reply;
pub mod repl;
pub mod session;
pub mod shell;
pub mod thread;

use api::HttpBackend;
use cli::Args;
use log::info;
use session::initialize_session;
use shell::ChatShell;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("API Base URL: {}", args.api_base_url);
    info!("Session File: {}", args.session_file.as_deref().unwrap_or("(none)"));
    info!("Access Token Configured: {}", args.access_token.is_some());
    info!("Initial Conversation: {}", args.conversation_id.as_deref().unwrap_or("(none)"));
    info!("Viewport Width: {}", args.viewport_width);
    info!("-------------------------");

    let session = initialize_session(&args);
    let backend = Arc::new(HttpBackend::new(args.api_base_url.clone(), session.clone()));
    let mut shell = ChatShell::new(backend, session, args.viewport_width);
    shell.mount().await;

    if let Some(id) = &args.conversation_id {
        shell.open_conversation(id.clone()).await;
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    repl::run(&mut shell, stdin, tokio::io::stdout()).await?;

    Ok(())
}
