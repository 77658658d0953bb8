use anyhow::Result;
use std::sync::Arc;

pub mod create;
pub mod edit;
pub mod login;
pub mod logout;
pub mod projects;
pub mod status;

use crate::config::{config, BasebaseConfig};
use crate::platform::PlatformClient;
use crate::session::{FileSessionStorage, SessionStore};

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Shared wiring for commands that talk to the platform
pub struct AppContext {
    pub config: &'static BasebaseConfig,
    pub sessions: Arc<SessionStore>,
    pub client: Arc<PlatformClient>,
}

pub fn app_context() -> Result<AppContext> {
    let config = config()?;
    let storage = Arc::new(FileSessionStorage::new(&config.session.state_file_path));
    let sessions = Arc::new(SessionStore::open(storage));
    let client = Arc::new(PlatformClient::from_config(
        &config.api,
        Arc::clone(&sessions),
    )?);
    Ok(AppContext {
        config,
        sessions,
        client,
    })
}

pub fn show_welcome() {
    println!("🏗️  BaseBase - build apps with your community");
    println!();
    println!("To get started:");
    println!("  🔍 basebase projects   # Explore published apps");
    println!("  📱 basebase login      # Sign in with your phone");
    println!("  🚀 basebase create     # Provision a new app");
    println!("  📊 basebase status     # Show the current session");
    println!();
    println!("💡 Run 'basebase <command> --help' for the full set of options.");
}
