use clap::Parser;
use outseta_demos::app::{change_plan, create_plan, generate_jwt, register_account, track_usage, verify_jwt};
use outseta_demos::utils::error::OutsetaError;
use outseta_demos::utils::prompt::TerminalPrompter;
use outseta_demos::utils::{logger, validation::Validate};
use outseta_demos::{Cli, Command, OutsetaClient, OutsetaConfig, TokenVerifier};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    // Ctrl+C 在任何提示或請求中都直接結束
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nExited.");
            std::process::exit(0);
        }
    });

    let label = cli.command.failure_label();
    if let Err(e) = run(cli).await {
        exit_with(label, e);
    }
}

async fn run(cli: Cli) -> Result<(), OutsetaError> {
    let config = OutsetaConfig::load(cli.config.as_deref())?;
    tracing::debug!("Configuration: {:?}", config);
    config.validate()?;

    let client = OutsetaClient::from_config(&config)?;
    let mut prompter = TerminalPrompter::stdio();

    let rendered = match cli.command {
        Command::VerifyJwt(args) => {
            let verifier = TokenVerifier::for_tenant(client);
            verify_jwt::run(&verifier, &mut prompter, args).await?.to_string()
        }
        Command::GenerateJwt(args) => generate_jwt::run(&client, &mut prompter, args).await?.to_string(),
        Command::RegisterAccount(args) => {
            register_account::run(&client, &mut prompter, args).await?.to_string()
        }
        Command::ChangePlan(args) => change_plan::run(&client, &mut prompter, args).await?.to_string(),
        Command::TrackUsage(args) => track_usage::run(&client, &mut prompter, args).await?.to_string(),
        Command::CreatePlan(args) => create_plan::run(&client, &mut prompter, args).await?.to_string(),
    };

    println!();
    println!("{}", rendered);
    Ok(())
}

fn exit_with(label: &str, e: OutsetaError) -> ! {
    if matches!(e, OutsetaError::Interrupted) {
        println!("\n{}", e);
        std::process::exit(e.exit_code());
    }

    tracing::error!("{} (Category: {:?})", e, e.category());
    eprintln!("💥 {}: {}", label, e);
    for line in e.validation_errors().iter().flat_map(|entity| entity.describe()) {
        eprintln!("   • {}", line);
    }
    std::process::exit(e.exit_code());
}
