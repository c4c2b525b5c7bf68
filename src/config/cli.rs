use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "zipgate")]
#[command(about = "Service-area ZIP gating for contact-form leads")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "zipgate.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate a ZIP against the configured service areas
    Check { zip: String },

    /// Distance in miles between two ZIP codes
    Distance { from: String, to: String },

    /// Manage service-area ZIP codes
    #[command(subcommand)]
    Zips(ZipsCommand),

    /// Submit a contact-form lead
    Contact(ContactArgs),

    /// View and export leads
    #[command(subcommand)]
    Leads(LeadsCommand),
}

#[derive(Debug, Subcommand)]
pub enum ZipsCommand {
    List,
    /// Add a ZIP or replace its radius (20, 40, 60 or 80; anything else becomes 20)
    Add {
        zip: String,
        #[arg(long, default_value = "20")]
        radius: String,
    },
    /// Change the radius of a configured ZIP
    Update {
        zip: String,
        #[arg(long)]
        radius: String,
    },
    Remove { zip: String },
}

#[derive(Debug, Args)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub zip: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub service: Option<String>,
    #[arg(long)]
    pub message: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum LeadsCommand {
    /// Newest first, with completed/rejected/subscriber counts
    List {
        /// active, completed, rejected, subscribers or all
        #[arg(long, default_value = "active")]
        filter: String,
    },
    /// complete, reject, tomorrow (schedule a follow-up) or weekly (toggle subscription)
    Action { id: u64, action: String },
    /// Write leads as CSV (stdout when no output path is given)
    Export {
        #[arg(short, long)]
        output: Option<String>,
    },
}
