use clap::Parser;
use lb_cleaner::cleaner::{connect, load_credentials};
use lb_cleaner::config::toml_config::TomlConfig;
use lb_cleaner::domain::model::ActionKind;
use lb_cleaner::utils::error::{CleanerError, ErrorSeverity};
use lb_cleaner::utils::logger;
use lb_cleaner::{CleanerSettings, CleanupEngine, CliConfig};

fn exit_code(e: &CleanerError) -> i32 {
    match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: CleanerError) -> ! {
    tracing::error!(
        "❌ Cleanup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(&e));
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting lb-cleaner");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let file = match cli.config.as_deref().map(TomlConfig::from_file).transpose() {
        Ok(file) => file,
        Err(e) => fail(e),
    };

    let settings = match CleanerSettings::resolve(file, cli.overrides()) {
        Ok(settings) => settings,
        Err(e) => fail(e),
    };

    if settings.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be deleted");
    }

    let credentials = match load_credentials(&settings).await {
        Ok(credentials) => credentials,
        Err(e) => fail(e),
    };

    let cleaner = match connect(&settings, &credentials).await {
        Ok(cleaner) => cleaner,
        Err(e) => fail(e),
    };

    let engine = CleanupEngine::new(cleaner);
    match engine
        .run(&settings.cluster_tag, settings.report.as_ref())
        .await
    {
        Ok(report) => {
            let verb = if report.dry_run { "Would remove" } else { "Removed" };
            println!(
                "✅ {} {} load balancer(s) and {} floating IP(s) for cluster tag '{}'",
                verb,
                report.count(ActionKind::DeleteLoadBalancer),
                report.count(ActionKind::DeleteFloatingIp),
                report.cluster_tag
            );
        }
        Err(e) => fail(e),
    }
}
