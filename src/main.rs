use treta_store::{config::Config, db::connect, AppError};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let (pool, report) = connect(&config).await?;

    tracing::info!(
        path = %config.database_path,
        current_version = report.current_version,
        applied = ?report.applied,
        "Schema is up to date"
    );

    pool.close().await;
    Ok(())
}
