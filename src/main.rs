use clap::Parser;
use honeypipes::utils::{logger, validation::Validate};
use honeypipes::{AppState, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置
    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(cli.verbose, config.logging.format);

    tracing::info!(
        environment = %config.server.environment,
        "Starting honeypipes webhook processor"
    );

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let state = AppState::from_config(config)?;
    honeypipes::start_server(state).await?;

    Ok(())
}
