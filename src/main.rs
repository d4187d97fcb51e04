//! Tinier CLI entry point

use std::process::ExitCode;

use clap::Parser;

use tinier::cli::{
    app::{run, BuildInfo, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use tinier::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { action }) => {
            let presenter = Presenter::new();
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        None => {
            let build = BuildInfo::new(
                env!("CARGO_PKG_VERSION"),
                option_env!("TINIER_COMMIT"),
                option_env!("TINIER_BUILD_DATE"),
            );
            run(build, cli.options).await
        }
    }
}
