use clap::Parser;
use zipgate::config::cli::{Command, ContactArgs, LeadsCommand, ZipsCommand};
use zipgate::core::export::write_leads_csv;
use zipgate::utils::error::ErrorSeverity;
use zipgate::utils::{logger, validation::Validate};
use zipgate::{
    AppConfig, Cli, ContactSubmission, DecisionReason, GateError, IntakeOutcome, LeadAction,
    LeadFilter, LeadIntake, ProximityGate, Radius, Result,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }
    tracing::debug!("Loaded configuration from {}", cli.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(cli.command, &config).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!(
                "❌ {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

/// Returns the process exit code.
async fn run(command: Command, config: &AppConfig) -> Result<i32> {
    match command {
        Command::Check { zip } => check(config, zip.trim()).await,
        Command::Distance { from, to } => {
            let gate = ProximityGate::with_shared(config.build_resolver()?);
            let miles = gate.distance(from.trim(), to.trim()).await?;
            println!("{} → {}: {:.1} miles", from.trim(), to.trim(), miles);
            Ok(0)
        }
        Command::Zips(command) => zips(config, command).await,
        Command::Contact(args) => contact(config, args).await,
        Command::Leads(command) => leads(config, command).await,
    }
}

async fn check(config: &AppConfig, zip: &str) -> Result<i32> {
    let gate = ProximityGate::with_shared(config.build_resolver()?);
    let areas = config.service_area_store().load().await?;

    let decision = gate.evaluate(zip, &areas).await?;
    match (&decision.matched_entry, decision.distance_miles) {
        (Some(entry), Some(miles)) => {
            println!(
                "✅ {} accepted: {:.1} miles from {} (radius {} mi)",
                zip, miles, entry.zip_code, entry.radius_miles
            );
            Ok(0)
        }
        _ if decision.reason == DecisionReason::ConfigEmpty => {
            println!("❌ {} rejected: {}", zip, GateError::ConfigEmpty.user_friendly_message());
            Ok(1)
        }
        _ => {
            println!("❌ {} rejected: outside every service area", zip);
            Ok(1)
        }
    }
}

async fn zips(config: &AppConfig, command: ZipsCommand) -> Result<i32> {
    let store = config.service_area_store();

    match command {
        ZipsCommand::List => {
            let areas = store.load().await?;
            if areas.is_empty() {
                println!("No service-area ZIPs configured");
            }
            for entry in areas.entries() {
                println!("{}\t{} mi", entry.zip_code, entry.radius_miles);
            }
        }
        ZipsCommand::Add { zip, radius } => {
            let entry = store.upsert(&zip, Radius::from_form(&radius)).await?;
            println!(
                "ZIP {} added/updated with {} miles.",
                entry.zip_code, entry.radius_miles
            );
        }
        ZipsCommand::Update { zip, radius } => {
            let entry = store.update_radius(&zip, Radius::from_form(&radius)).await?;
            println!(
                "ZIP {} radius updated to {} miles.",
                entry.zip_code, entry.radius_miles
            );
        }
        ZipsCommand::Remove { zip } => {
            if store.remove(&zip).await? {
                println!("ZIP {} removed.", zip.trim());
            } else {
                println!("ZIP {} was not configured.", zip.trim());
            }
        }
    }
    Ok(0)
}

async fn contact(config: &AppConfig, args: ContactArgs) -> Result<i32> {
    let intake = LeadIntake::new(
        ProximityGate::with_shared(config.build_resolver()?),
        config.service_area_store(),
        config.lead_store(),
    );

    let submission = ContactSubmission {
        name: args.name,
        email: args.email,
        phone: args.phone,
        zip: args.zip,
        address: args.address,
        service: args.service,
        message: args.message,
    };

    match intake.submit(submission).await? {
        IntakeOutcome::Accepted(lead) => {
            println!("✅ Thanks {}! Lead #{} received.", lead.name, lead.id);
            Ok(0)
        }
        IntakeOutcome::Rejected(reason) => {
            println!("❌ {} ({})", reason.message(), reason.code());
            Ok(1)
        }
    }
}

async fn leads(config: &AppConfig, command: LeadsCommand) -> Result<i32> {
    let store = config.lead_store();

    match command {
        LeadsCommand::List { filter } => {
            let filter: LeadFilter = filter.parse()?;
            let stats = store.stats().await?;
            println!(
                "📊 completed: {}  rejected: {}  subscribers: {}",
                stats.completed, stats.rejected, stats.subscribers
            );
            for lead in store.list_recent(filter).await? {
                println!(
                    "#{}\t{}\t{}{}\t{}\t{}\t{}",
                    lead.id,
                    lead.created_at.format("%Y-%m-%d %H:%M"),
                    lead.status,
                    if lead.recurring { " (weekly)" } else { "" },
                    lead.zip,
                    lead.name,
                    lead.email
                );
            }
        }
        LeadsCommand::Action { id, action } => {
            let action: LeadAction = action.parse()?;
            let result = store.apply(id, action).await?;
            let lead = result.lead;
            match (action, result.next_visit) {
                (LeadAction::Weekly, _) => println!(
                    "Lead #{} {} weekly schedule.",
                    lead.id,
                    if lead.recurring { "added to" } else { "removed from" }
                ),
                (LeadAction::Tomorrow, _) => println!(
                    "Lead #{} scheduled for {}.",
                    lead.id,
                    lead.follow_up_date
                        .map(|date| date.to_string())
                        .unwrap_or_else(|| "tomorrow".to_string())
                ),
                (_, Some(next)) => println!(
                    "Lead #{} completed; next week scheduled for {} (lead #{}).",
                    lead.id, lead.name, next.id
                ),
                _ => println!("Lead #{} marked as {}.", lead.id, lead.status),
            }
        }
        LeadsCommand::Export { output } => {
            let all = store.list().await?;
            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)?;
                    write_leads_csv(&all, file)?;
                    println!("📁 {} leads exported to {}", all.len(), path);
                }
                None => write_leads_csv(&all, std::io::stdout().lock())?,
            }
        }
    }
    Ok(0)
}
