use boardhall::infrastructure::logging::init_tracing;

#[cfg(feature = "api")]
#[tokio::main]
async fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("failed to initialise logging: {}", e);
    }
    if let Err(e) = boardhall::api::start_server().await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "api"))]
fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("failed to initialise logging: {}", e);
    }
    if let Err(e) = run_cli() {
        tracing::error!(error = %e, "console stopped");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "api"))]
fn run_cli() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use std::io;
    use std::sync::Arc;

    use boardhall::application::game_service::GameService;
    use boardhall::config::AppConfig;
    use boardhall::domain::models::GameKind;
    use boardhall::infrastructure::clock::SystemClock;
    use boardhall::infrastructure::persistence::StateFile;
    use boardhall::interface::console::ConsoleInterface;

    let game = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<GameKind>()?,
        None => GameKind::Chess,
    };
    let config = AppConfig::load()?;
    let storage = StateFile::new(config.storage.state_file.clone());
    let service = GameService::open(storage, Arc::new(SystemClock), config.session);

    ConsoleInterface::new(&service, game).run(io::stdin().lock(), io::stdout().lock())?;
    Ok(())
}
