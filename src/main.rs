use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use lead_capture::config::AppConfig;
use lead_capture::crm::{CrmClient, CrmGateway};
use lead_capture::error::AppError;
use lead_capture::telemetry;
use lead_capture::workflows::lead_capture::{
    ConvertOutcome, Lead, LeadCaptureService, LeadFormState, LogNotifier,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "lead-capture",
    about = "Capture, save, and convert real-estate leads against the CRM",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a lead draft to the CRM
    Save(LeadArgs),
    /// Submit a lead draft and hand it over to the signup flow
    Convert(LeadArgs),
    /// Look up address suggestions for a partial address
    Autocomplete {
        /// Partial billing address to complete
        #[arg(long)]
        query: String,
    },
}

#[derive(Args, Debug)]
struct LeadArgs {
    /// Lead JSON file to hydrate the form from; omit for a blank draft
    #[arg(long)]
    lead: Option<PathBuf>,
    /// Override the lease start date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    lease_start: Option<NaiveDate>,
    /// Print the payload instead of submitting it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let client = Arc::new(CrmClient::new(&config.crm));
    info!(
        ?config.environment,
        base_url = config.crm.base_url(),
        "lead capture client ready"
    );

    match cli.command {
        Command::Save(args) => run_save(client, args).await,
        Command::Convert(args) => run_convert(client, args).await,
        Command::Autocomplete { query } => run_autocomplete(client, &query).await,
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn load_form(args: &LeadArgs) -> Result<LeadFormState, AppError> {
    let today = Local::now().date_naive();

    let mut form = match &args.lead {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let lead: Lead = serde_json::from_str(&raw)?;
            LeadFormState::from_lead(&lead, today)
        }
        None => LeadFormState::new(today),
    };

    if let Some(date) = args.lease_start {
        form.set_lease_start(date);
    }

    Ok(form)
}

async fn run_save(client: Arc<CrmClient>, args: LeadArgs) -> Result<(), AppError> {
    let form = load_form(&args)?;

    if args.dry_run {
        let payload = form.create_payload(chrono::Utc::now());
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let service = LeadCaptureService::new(client, Arc::new(LogNotifier));
    service.save(&form, false).await;
    Ok(())
}

async fn run_convert(client: Arc<CrmClient>, args: LeadArgs) -> Result<(), AppError> {
    let form = load_form(&args)?;

    if args.dry_run {
        let payload = form.create_payload(chrono::Utc::now());
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let service = LeadCaptureService::new(client, Arc::new(LogNotifier));
    match service.convert(&form).await {
        ConvertOutcome::Navigate { path, state } => {
            println!("Lead converted; continue signup at {path}");
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        ConvertOutcome::Stay => {
            println!("Lead was not converted");
        }
    }
    Ok(())
}

async fn run_autocomplete(client: Arc<CrmClient>, query: &str) -> Result<(), AppError> {
    let suggestions = client.address_autocomplete(query).await?;

    if suggestions.is_empty() {
        println!("No suggestions for '{query}'");
        return Ok(());
    }

    for suggestion in suggestions {
        println!("- {}", suggestion.display_name);
    }
    Ok(())
}
