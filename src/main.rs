use anyhow::Result;
use clap::Parser;

use basebase::cli::commands::{self, Command as _};
use basebase::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    basebase::config::init_config()?;
    basebase::telemetry::init_telemetry()?;

    match cli.command {
        None => {
            commands::show_welcome();
            Ok(())
        }
        Some(Commands::Login { username, phone }) => {
            commands::login::LoginCommand { username, phone }.execute().await
        }
        Some(Commands::Logout) => commands::logout::LogoutCommand.execute().await,
        Some(Commands::Status) => commands::status::StatusCommand.execute().await,
        Some(Commands::Projects { search, refresh }) => {
            commands::projects::ProjectsCommand { search, refresh }
                .execute()
                .await
        }
        Some(Commands::Create {
            name,
            id,
            description,
            categories,
        }) => {
            commands::create::CreateCommand {
                name,
                id,
                description,
                categories,
            }
            .execute()
            .await
        }
        Some(Commands::Edit {
            id,
            name,
            description,
            categories,
        }) => {
            commands::edit::EditCommand {
                id,
                name,
                description,
                categories,
            }
            .execute()
            .await
        }
    }
}
