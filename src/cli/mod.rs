use clap::{Parser, Subcommand};

pub mod commands;

#[derive(Parser)]
#[command(name = "basebase")]
#[command(about = "BaseBase platform client - sign in, explore apps, and provision your own")]
#[command(long_about = "BaseBase is a community app-building platform. This client signs you in \
                       with a one-time SMS code, browses the published app directory, and \
                       provisions new apps (document, repository, and deployment). Get started \
                       with 'basebase projects' to see what the community has built.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with your username and phone number
    Login {
        /// Account username
        #[arg(long, help = "Username (letters, numbers, and underscores only)")]
        username: String,
        /// Phone number to receive the one-time code
        #[arg(long, help = "Phone number including country code (e.g. +1 for US)")]
        phone: String,
    },
    /// Sign out and clear the persisted session
    Logout,
    /// Show the current session
    Status,
    /// List and search published apps
    Projects {
        /// Filter the listing
        #[arg(long, help = "Case-insensitive match on name, description, and categories")]
        search: Option<String>,
        /// Skip the cached listing
        #[arg(long, help = "Fetch a fresh project list instead of the cached one")]
        refresh: bool,
    },
    /// Create a new app (project document, repository, and deployment)
    Create {
        /// Display name for the app
        #[arg(long, help = "Display name for your app")]
        name: String,
        /// Project ID
        #[arg(
            long,
            help = "Lowercase letters, numbers, and hyphens; generated from the name when omitted"
        )]
        id: Option<String>,
        /// What the app does
        #[arg(long, help = "A brief description of your app's purpose")]
        description: String,
        /// Categories
        #[arg(
            long,
            help = "Comma-separated list of categories (e.g. social, productivity, games)"
        )]
        categories: Option<String>,
    },
    /// Update an existing app's metadata
    Edit {
        /// Project ID of the app to update
        #[arg(long, help = "Project ID of the app to update (cannot be changed)")]
        id: String,
        /// Display name for the app
        #[arg(long, help = "Display name for your app")]
        name: String,
        /// What the app does
        #[arg(long, help = "A brief description of your app's purpose")]
        description: String,
        /// Categories
        #[arg(
            long,
            help = "Comma-separated list of categories (e.g. social, productivity, games)"
        )]
        categories: Option<String>,
    },
}
