use anyhow::Result;
use std::sync::Arc;

use crate::platform::ProvisioningApi;
use crate::provision::{
    parse_categories, ProvisionMode, ProvisioningOrchestrator, ProvisioningRequest,
};

use super::{app_context, Command};

pub struct EditCommand {
    pub id: String,
    pub name: String,
    pub description: String,
    pub categories: Option<String>,
}

impl Command for EditCommand {
    async fn execute(&self) -> Result<()> {
        let ctx = app_context()?;

        if !ctx.sessions.get().is_authenticated {
            anyhow::bail!(
                "Sign in first: basebase login --username <name> --phone <phone>"
            );
        }

        let categories = self
            .categories
            .as_deref()
            .map(parse_categories)
            .unwrap_or_default();
        let request = ProvisioningRequest::new(
            self.id.clone(),
            &self.name,
            &self.description,
            categories,
        );

        let api: Arc<dyn ProvisioningApi> = Arc::clone(&ctx.client) as Arc<dyn ProvisioningApi>;
        let orchestrator = ProvisioningOrchestrator::new(
            api,
            Arc::clone(&ctx.sessions),
            ctx.config.api.editor_base_url.clone(),
        );

        let progress = |message: &str| println!("⏳ {message}");
        orchestrator
            .provision(&request, ProvisionMode::Edit, &progress)
            .await?;

        println!("✅ App '{}' updated.", self.id);
        Ok(())
    }
}
