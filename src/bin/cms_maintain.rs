use clap::Parser;
use cms_probe::utils::logger;
use cms_probe::CliConfig;

/// Runs the built-in maintenance suite: content migration, course
/// visibility sync and a count check on the public course list.
#[tokio::main]
async fn main() {
    let mut config = CliConfig::parse();
    if config.suite.is_some() || config.builtin != "cms" {
        eprintln!(
            "⚠️ cms_maintain always runs the maintenance suite; --suite/--builtin ignored"
        );
    }
    config.suite = None;
    config.builtin = "maintenance".to_string();

    logger::init_logger(&config.log_format, config.verbose);

    tracing::info!("🛠️ Starting CMS maintenance run");
    let exit_code = cms_probe::app::run(&config).await;
    std::process::exit(exit_code);
}
