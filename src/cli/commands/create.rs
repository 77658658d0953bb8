use anyhow::Result;
use std::sync::Arc;

use crate::platform::ProvisioningApi;
use crate::provision::{
    parse_categories, slugify_project_id, ProvisionMode, ProvisionOutcome,
    ProvisioningOrchestrator, ProvisioningRequest,
};

use super::{app_context, Command};

pub struct CreateCommand {
    pub name: String,
    pub id: Option<String>,
    pub description: String,
    pub categories: Option<String>,
}

impl Command for CreateCommand {
    async fn execute(&self) -> Result<()> {
        let ctx = app_context()?;

        if !ctx.sessions.get().is_authenticated {
            anyhow::bail!(
                "Sign in first: basebase login --username <name> --phone <phone>"
            );
        }

        let project_id = self
            .id
            .clone()
            .unwrap_or_else(|| slugify_project_id(&self.name));
        let categories = self
            .categories
            .as_deref()
            .map(parse_categories)
            .unwrap_or_default();

        let request =
            ProvisioningRequest::new(project_id, &self.name, &self.description, categories);

        let api: Arc<dyn ProvisioningApi> = Arc::clone(&ctx.client) as Arc<dyn ProvisioningApi>;
        let orchestrator = ProvisioningOrchestrator::new(
            api,
            Arc::clone(&ctx.sessions),
            ctx.config.api.editor_base_url.clone(),
        );

        let progress = |message: &str| println!("⏳ {message}");
        let outcome = orchestrator
            .provision(&request, ProvisionMode::Create, &progress)
            .await?;

        if let ProvisionOutcome::Created {
            repository_url,
            deployment_url,
            editor_url,
        } = outcome
        {
            println!();
            println!("🎉 Your new app is ready!");
            println!("   Start editing: {editor_url}");
            println!("   GitHub repository: {repository_url}");
            println!("   Deployment (in progress): {deployment_url}");
            println!("   May take up to 3 minutes to deploy");
        }
        Ok(())
    }
}
