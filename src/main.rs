use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod db;
mod models;
mod report;
mod stats;

use models::{CompanyPatch, NewCompany};

#[derive(Parser)]
#[command(name = "placement-tracker")]
#[command(about = "Campus placement drive tracker and statistics engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load the sample placement drives
    Seed,
    /// Import drives from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// List recorded drives
    List {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Show a single drive
    Show { id: i64 },
    /// Record a new drive
    Add {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        company: String,
        #[arg(long)]
        offer: String,
        #[arg(long)]
        branches: Option<String>,
        #[arg(long)]
        cgpa: Option<String>,
        #[arg(long)]
        roles: String,
        #[arg(long, default_value = "")]
        compensation: String,
        #[arg(long, default_value_t = 0)]
        selected: i32,
        #[arg(long, default_value = "Completed")]
        process: String,
    },
    /// Update fields of an existing drive
    Update {
        id: i64,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        offer: Option<String>,
        #[arg(long)]
        branches: Option<String>,
        #[arg(long)]
        cgpa: Option<String>,
        #[arg(long)]
        roles: Option<String>,
        #[arg(long)]
        compensation: Option<String>,
        #[arg(long)]
        selected: Option<i32>,
        #[arg(long)]
        process: Option<String>,
    },
    /// Delete a drive
    Delete { id: i64 },
    /// Compute placement statistics over all recorded drives
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let inserted = db::seed(&pool).await?;
            println!("Inserted {inserted} sample drives.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} drives from {}.", csv.display());
        }
        Commands::List { limit } => {
            let companies = db::fetch_companies(&pool).await?;
            if companies.is_empty() {
                println!("No drives recorded.");
                return Ok(());
            }
            for company in companies.iter().take(limit) {
                println!(
                    "[{}] {} ({}) on {}: {} selected",
                    company.id,
                    company.company_name,
                    company.type_of_offer,
                    company.notification_date,
                    company.students_selected
                );
            }
        }
        Commands::Show { id } => match db::fetch_company(&pool, id).await? {
            Some(company) => {
                println!("{}", serde_json::to_string_pretty(&company)?);
            }
            None => println!("No drive with id {id}."),
        },
        Commands::Add {
            date,
            company,
            offer,
            branches,
            cgpa,
            roles,
            compensation,
            selected,
            process,
        } => {
            let record = NewCompany {
                notification_date: date,
                company_name: company,
                type_of_offer: offer,
                branches_allowed: branches,
                eligibility_cgpa: cgpa,
                job_roles: roles,
                ctc_stipend: compensation,
                students_selected: selected,
                process,
                source_key: None,
            };
            match db::insert_company(&pool, &record).await? {
                Some(id) => println!("Recorded drive with id {id}."),
                None => println!("Drive already recorded."),
            }
        }
        Commands::Update {
            id,
            date,
            company,
            offer,
            branches,
            cgpa,
            roles,
            compensation,
            selected,
            process,
        } => {
            let patch = CompanyPatch {
                notification_date: date,
                company_name: company,
                type_of_offer: offer,
                branches_allowed: branches,
                eligibility_cgpa: cgpa,
                job_roles: roles,
                ctc_stipend: compensation,
                students_selected: selected,
                process,
            };
            match db::update_company(&pool, id, patch).await? {
                Some(company) => println!(
                    "Updated [{}] {} ({}).",
                    company.id, company.company_name, company.type_of_offer
                ),
                None => println!("No drive with id {id}."),
            }
        }
        Commands::Delete { id } => {
            if db::delete_company(&pool, id).await? {
                println!("Deleted drive {id}.");
            } else {
                println!("No drive with id {id}.");
            }
        }
        Commands::Stats { json } => {
            let companies = db::fetch_companies(&pool).await?;
            let stats = stats::compute_stats(&companies);

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }

            println!("Unique companies: {}", stats.total_unique_companies);
            println!("  On-campus: {}", stats.on_campus);
            println!("  PPO: {}", stats.ppo);
            println!("Students selected: {}", stats.students_selected);
            println!(
                "  Intern / FTE / Intern+FTE: {} / {} / {}",
                stats.intern_count, stats.fte_count, stats.intern_fte_count
            );
            println!("Average CTC: {:.2}", stats.average_ctc);
            println!("Average package secured (weighted): {:.2}", stats.average_ctc_weighted);
            println!("Median package secured: {:.2}", stats.median_ctc);
            println!("Average stipend (weighted): {:.2}", stats.average_stipend);
        }
        Commands::Report { out } => {
            let companies = db::fetch_companies(&pool).await?;
            let report = report::build_report(&companies);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
