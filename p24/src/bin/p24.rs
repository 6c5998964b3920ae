use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use p24::{BalanceOpts, Client, ClientConfig, StatementsOpts};
use std::path::PathBuf;
use tracing::info;

/// Privat24 merchant API command-line client
#[derive(Parser)]
#[command(name = "p24")]
#[command(version)]
#[command(about = "Query card balance and statements through the Privat24 merchant API", long_about = None)]
struct Cli {
    /// TOML config file (merchant_id, merchant_password, ...); P24_* env vars override it
    #[arg(short, long, global = true, env = "P24_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current card balance
    Balance {
        /// Card number (16 digits)
        #[arg(long)]
        card: String,

        /// Country code
        #[arg(long, default_value = "UA")]
        country: String,
    },

    /// List card transactions for a date range (at most 90 days)
    Statements {
        /// Card number (16 digits)
        #[arg(long)]
        card: String,

        /// First day, YYYY-MM-DD
        #[arg(long)]
        from: NaiveDate,

        /// Last day, YYYY-MM-DD
        #[arg(long)]
        to: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, results to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::load(cli.config.as_deref()).context("loading configuration")?;
    info!("Merchant {} configured", config.merchant_id);

    let client = Client::from_config(&config)?;

    match cli.command {
        Commands::Balance { card, country } => {
            let opts = BalanceOpts {
                card_number: card,
                country,
                opts: None,
            };
            let balance = client.card_balance(&opts).await?;
            info!("Balance received for card {}", opts.card_number);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&balance)?);
            } else {
                let currency = &balance.card.currency;
                println!("date:        {}", balance.date.format("%Y-%m-%d %H:%M %Z"));
                println!("card:        {}", balance.card.number);
                println!("balance:     {} {}", balance.balance, currency);
                println!("available:   {} {}", balance.available, currency);
                println!("fin limit:   {} {}", balance.fin_limit, currency);
                println!("trade limit: {} {}", balance.trade_limit, currency);
            }
        }
        Commands::Statements { card, from, to } => {
            let opts = StatementsOpts {
                start_date: from,
                end_date: to,
                card_number: card,
                opts: None,
            };
            let statements = client.statements(&opts).await?;
            info!(
                "{} statements received for card {}",
                statements.statements.len(),
                opts.card_number
            );

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&statements)?);
            } else {
                println!(
                    "status: {}, credit: {}, debit: {}",
                    statements.status, statements.credit, statements.debet
                );
                for statement in &statements.statements {
                    println!(
                        "{} {}  {:>14}  {:>14}  {}",
                        statement.tran_date,
                        statement.tran_time,
                        statement.amount.to_string(),
                        statement.rest.to_string(),
                        statement.description
                    );
                }
            }
        }
    }

    Ok(())
}
