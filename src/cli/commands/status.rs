use anyhow::Result;

use super::{app_context, Command};

pub struct StatusCommand;

impl Command for StatusCommand {
    async fn execute(&self) -> Result<()> {
        let ctx = app_context()?;
        let session = ctx.sessions.get();

        match session.user {
            Some(user) => {
                println!("✅ Signed in as {} ({})", user.name, user.phone);
                println!("   Platform: {}", ctx.config.app.url);
            }
            None => {
                println!("Not signed in.");
                println!("   Run 'basebase login --username <name> --phone <phone>' to get started.");
            }
        }
        Ok(())
    }
}
