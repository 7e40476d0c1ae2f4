//! Shared driver for the command line binaries.

use crate::config::target::RunSettings;
use crate::config::CliConfig;
use crate::core::engine::ProbeEngine;
use crate::utils::error::ProbeError;
use crate::utils::validation::Validate;
use crate::LocalReportStore;

fn report_setup_error(stage: &str, e: &ProbeError) {
    tracing::error!("❌ {} failed: {}", stage, e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}

/// Runs the suite selected by `config` and returns the process exit code.
pub async fn run(config: &CliConfig) -> i32 {
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        report_setup_error("Configuration validation", &e);
        return 1;
    }

    let suite = match config.load_suite() {
        Ok(suite) => suite,
        Err(e) => {
            report_setup_error("Loading suite", &e);
            return 1;
        }
    };

    let settings = match RunSettings::resolve(
        &suite,
        config.base_url.as_deref(),
        config.env_file.as_deref(),
        config.timeout,
    ) {
        Ok(settings) => settings,
        Err(e) => {
            report_setup_error("Resolving target", &e);
            return 1;
        }
    };

    tracing::info!("🎯 Target: {} (timeout {}s)", settings.base_url, settings.timeout_seconds);
    let engine = ProbeEngine::new(suite, settings);

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no requests will be sent");
        println!("📋 Plan for suite '{}':", engine.suite().suite.name);
        for line in engine.plan() {
            println!("  {}", line);
        }
        return 0;
    }

    let summary = match engine.run().await {
        Ok(summary) => summary,
        Err(e) => {
            report_setup_error("Suite run", &e);
            return 1;
        }
    };

    summary.print_summary();

    if let Some(output) = &config.output {
        let store = LocalReportStore::new(".");
        match summary.save(&store, output).await {
            Ok(path) => println!("📁 Results saved to: {}", path),
            Err(e) => {
                report_setup_error("Writing results", &e);
                return 1;
            }
        }
    }

    if summary.is_success() {
        println!("✅ All checks passed");
    } else {
        println!("❌ {} check(s) failed", summary.failed);
    }
    summary.exit_code()
}
