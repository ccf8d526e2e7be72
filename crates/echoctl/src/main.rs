mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use echoctl_core::Dispatcher;

use crate::cli::{Cli, Command};
use crate::commands::RenderOpts;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Completions need neither config nor a session.
    if let Command::Completions(args) = &cli.command {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        generate(args.shell, &mut cmd, "echoctl", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config()?;
    let opts = RenderOpts::new(
        config::output_format(&cli.global, &cfg),
        config::color_mode(&cli.global, &cfg),
        cli.global.quiet,
    );

    match cli.command {
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global, &cfg, &opts),

        // Everything else talks to the console API.
        cmd => {
            let action = commands::to_action(cmd)?;
            let client_config = config::resolve_client_config(&cli.global, &cfg)?;
            let account = client_config.connect()?;
            let dispatcher = Dispatcher::new(account);

            commands::dispatch(action, &dispatcher, &cli.global, &opts).await
        }
    }
}
