use clap::Parser;
use disassembly_recipe::app::commands;
use disassembly_recipe::utils::error::{ErrorSeverity, RecipeError};
use disassembly_recipe::utils::{logger, validation::Validate};
use disassembly_recipe::{CliConfig, EditorConfig};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match EditorConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file is valid TOML");
            std::process::exit(1);
        }
    };

    logger::init_cli_logger(cli.verbose, config.log_level(), config.log_format());
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.validate().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    match commands::run(&cli, &config).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            exit_with(&e);
        }
    }
}

fn exit_with(e: &RecipeError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
