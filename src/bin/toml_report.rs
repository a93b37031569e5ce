use clap::Parser;
use member_report::config::toml_config::TomlConfig;
use member_report::core::ConfigProvider;
use member_report::domain::model::ReportSource;
use member_report::utils::error::ErrorSeverity;
use member_report::utils::{logger, validation::Validate};
use member_report::{EtlEngine, LocalStorage, ReportPipeline};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Member Report bundler driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "report-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override strict mode from config
    #[arg(long)]
    strict: Option<bool>,

    /// Log how long each phase took
    #[arg(long)]
    timing: bool,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置，日誌格式取決於設定檔，所以錯誤先直接輸出
    let (mut config, warnings) = match TomlConfig::from_file(&args.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.verbose_logging();
    if config.json_logging() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("🚀 Starting TOML-based member report tool");
    tracing::info!("📁 Loaded configuration from: {}", args.config);
    for warning in &warnings {
        tracing::warn!("⚠️ {}", warning);
    }

    // 應用命令列覆蓋設定
    if let Some(strict) = args.strict {
        config.decode.strict = Some(strict);
        tracing::info!("🔧 Strict mode overridden to: {}", strict);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        perform_dry_run(&config);
        return Ok(());
    }

    let storage = LocalStorage::new(config.load.output_path.clone());
    tracing::debug!("Output directory: {}", storage.base_path().display());
    let pipeline = ReportPipeline::new(storage, config)?;
    let engine = EtlEngine::new_with_timing(pipeline, args.timing);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Member reports bundled successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Report run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Sources: {}", config.endpoints().len());
    println!("  Output: {}/{}", config.load.output_path, config.archive_name());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    println!("  Max schema version: {}", config.max_supported_version());
    println!("  Strict: {}", config.is_strict());
    println!("  Concurrent Requests: {}", config.concurrent_requests());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Report Sources:");
    for endpoint in config.endpoints() {
        match ReportSource::parse(endpoint) {
            ReportSource::Http(url) => println!("  GET  {}", url),
            ReportSource::File(path) => println!("  FILE {}", path.display()),
        }
    }

    if let Some(headers) = config.request_headers() {
        println!("  Headers: {} custom headers", headers.len());
    }
    if let Some(timeout) = config.timeout_seconds() {
        println!("  Timeout: {}s", timeout);
    }

    println!();
    println!("⚙️ Decoding:");
    println!(
        "  Reports newer than version {} are rejected",
        config.max_supported_version()
    );
    if config.is_strict() {
        println!("  The first rejected report aborts the run");
    } else {
        println!("  Rejected reports are listed in rejected.json");
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
