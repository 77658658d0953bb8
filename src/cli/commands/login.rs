use anyhow::Result;
use std::io::{self, Write};
use std::sync::Arc;

use crate::auth::AuthFlow;
use crate::platform::AuthApi;

use super::{app_context, Command};

pub struct LoginCommand {
    pub username: String,
    pub phone: String,
}

impl Command for LoginCommand {
    async fn execute(&self) -> Result<()> {
        let ctx = app_context()?;

        if ctx.sessions.get().is_authenticated {
            println!("✅ Already signed in. Run 'basebase logout' first to switch accounts.");
            return Ok(());
        }

        let api: Arc<dyn AuthApi> = Arc::clone(&ctx.client) as Arc<dyn AuthApi>;
        let mut flow = AuthFlow::new(api, Arc::clone(&ctx.sessions));

        flow.request_code(&self.username, &self.phone).await?;
        println!("📱 Verification code sent to {}", self.phone);

        // Verification failures keep the flow awaiting, so the user can
        // correct the code without restarting
        loop {
            print!("Enter verification code (blank to cancel): ");
            io::stdout().flush()?;

            let mut code = String::new();
            io::stdin().read_line(&mut code)?;
            let code = code.trim();
            if code.is_empty() {
                println!("Sign-in cancelled.");
                return Ok(());
            }

            match flow
                .verify_code(&self.phone, code, &ctx.config.auth.default_project_id)
                .await
            {
                Ok(()) => break,
                Err(e) => println!("❌ {e}"),
            }
        }

        let session = ctx.sessions.get();
        let name = session.user.map(|user| user.name).unwrap_or_default();
        println!("✅ Signed in as {name}");
        Ok(())
    }
}
