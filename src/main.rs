use clap::Parser;
use cms_probe::utils::logger;
use cms_probe::CliConfig;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(&config.log_format, config.verbose);

    tracing::info!("Starting cms-probe");
    let exit_code = cms_probe::app::run(&config).await;
    std::process::exit(exit_code);
}
