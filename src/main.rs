use clap::Parser;
use native_bridge::utils::logger;
use native_bridge::{BridgeError, CliConfig, Harness, HarnessReport};

fn main() {
    let cli = CliConfig::parse();

    // 載入並驗證配置（設定檔 + 命令列覆寫）
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            report_failure(&e);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(cli.verbose_or(&config));
    } else {
        logger::init_cli_logger(cli.verbose_or(&config));
    }

    tracing::info!("Starting native-bridge");
    tracing::debug!("Resolved config: {:?}", config);

    let harness = Harness::new(config);
    let mut report = HarnessReport::default();

    if !cli.skip_binding {
        // SAFETY: the operator names a `Coordinate2D -> Coordinate2D` symbol in the configuration.
        match unsafe { harness.run_binding() } {
            Ok(binding) => report.binding = Some(binding),
            Err(e) => report_failure(&e),
        }
    }

    if !cli.skip_syscall {
        // SAFETY: number and arguments come from the operator's own configuration.
        match unsafe { harness.run_syscall() } {
            Ok(syscall) => report.syscall = Some(syscall),
            Err(e) => report_failure(&e),
        }
    }

    if cli.json {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => report_failure(&e),
        }
    } else {
        print!("{}", report);
    }
}

fn report_failure(e: &BridgeError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
