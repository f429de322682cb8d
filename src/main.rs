use clap::Parser;
use tracing_subscriber::EnvFilter;

use pocforge::cli::{self, AppContext, Commands};
use pocforge::config;
use pocforge::errors::PocForgeError;
use pocforge::render::renderer::render_version;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let result = match cli.command {
        Commands::Validate(args) => handle_validate(args).await,
        Commands::Version => {
            println!("{}", render_version());
            Ok(())
        }
        command => run(command, cli.config.as_deref(), cli.api_base.as_deref()).await,
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}

async fn run(command: Commands, config_path: Option<&str>, api_base: Option<&str>) -> Result<(), i32> {
    let ctx = match AppContext::load(config_path, api_base).await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(exit_code(&e));
        }
    };

    let result = match command {
        Commands::Generate(args) => cli::generate::handle_generate(&ctx, args).await,
        Commands::Library(args) => cli::library::handle_library(&ctx, args).await,
        Commands::Show(args) => cli::library::handle_show(&ctx, args).await,
        Commands::Guide(args) => cli::library::handle_guide(&ctx, args).await,
        Commands::Code(args) => cli::library::handle_code(&ctx, args).await,
        Commands::Download(args) => cli::library::handle_download(&ctx, args).await,
        Commands::Delete(args) => cli::library::handle_delete(&ctx, args).await,
        Commands::Execute(args) => cli::execute::handle_execute(&ctx, args).await,
        Commands::Stats(args) => cli::health::handle_stats(&ctx, args).await,
        Commands::Health => cli::health::handle_health(&ctx).await,
        Commands::Validate(_) | Commands::Version => Ok(()),
    };

    result.map_err(|e| {
        ctx.report_error(&e);
        exit_code(&e)
    })
}

fn exit_code(e: &PocForgeError) -> i32 {
    match e {
        PocForgeError::Config(_) | PocForgeError::Yaml(_) => 2,
        PocForgeError::Validation(_) | PocForgeError::SessionBusy => 3,
        PocForgeError::Transport { .. } => 4,
        PocForgeError::Application(_) | PocForgeError::NotFound(_) => 5,
        _ => 1,
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), i32> {
    let path = std::path::PathBuf::from(&args.config);
    match config::parse_config(&path).await {
        Ok(_) => {
            println!("Configuration is valid: {}", args.config);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(exit_code(&e))
        }
    }
}
