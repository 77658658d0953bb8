use anyhow::Result;
use std::sync::Arc;

use crate::directory::{can_edit, search, ProjectDirectory};
use crate::platform::DirectoryApi;

use super::{app_context, Command};

pub struct ProjectsCommand {
    pub search: Option<String>,
    pub refresh: bool,
}

impl Command for ProjectsCommand {
    async fn execute(&self) -> Result<()> {
        let ctx = app_context()?;

        if self.refresh {
            ctx.client.invalidate_project_cache().await;
        }

        let api: Arc<dyn DirectoryApi> = Arc::clone(&ctx.client) as Arc<dyn DirectoryApi>;
        let directory = ProjectDirectory::new(api);
        let records = directory.fetch(1).await?;

        let query = self.search.as_deref().unwrap_or("");
        let matches = search(&records, query);

        if matches.is_empty() {
            if query.is_empty() {
                println!("No apps published yet. Be the first: basebase create");
            } else {
                println!("No apps matched '{query}'.");
            }
            return Ok(());
        }

        let session = ctx.sessions.get();
        for record in &matches {
            let marker = if can_edit(record, &session) {
                "  ✏️ yours"
            } else {
                ""
            };
            println!("📦 {} [{}]{}", record.name, record.id, marker);

            let categories = record.displayed_categories();
            if !categories.is_empty() {
                println!("   {}", categories.join(", "));
            }
            println!("   {}", record.description);
            println!("   👥 {} users  🔱 {} forks", record.users, record.forks);
            if let Some(url) = &record.github_url {
                println!("   GitHub: {url}");
            }
            if let Some(url) = &record.production_url {
                println!("   Live: {url}");
            }
            println!();
        }
        println!("{} app(s)", matches.len());
        Ok(())
    }
}
