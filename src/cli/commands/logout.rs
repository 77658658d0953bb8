use anyhow::Result;
use std::sync::Arc;

use crate::auth::AuthFlow;
use crate::platform::AuthApi;

use super::{app_context, Command};

pub struct LogoutCommand;

impl Command for LogoutCommand {
    async fn execute(&self) -> Result<()> {
        let ctx = app_context()?;

        if !ctx.sessions.get().is_authenticated {
            println!("Not signed in.");
            return Ok(());
        }

        let api: Arc<dyn AuthApi> = Arc::clone(&ctx.client) as Arc<dyn AuthApi>;
        let mut flow = AuthFlow::new(api, Arc::clone(&ctx.sessions));
        flow.sign_out()?;

        println!("👋 Signed out.");
        Ok(())
    }
}
