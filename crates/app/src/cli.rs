use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::MoneyCents;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "pennywise")]
#[command(about = "Track income and spending, and summarize it by period")]
pub struct Cli {
    /// Settings file name without extension (`settings` loads `settings.toml`).
    #[arg(long, default_value = "settings")]
    pub config: String,

    /// Database connection string, overrides the settings file.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Income entries.
    #[command(subcommand)]
    Income(IncomeCommand),
    /// Spending entries.
    #[command(subcommand)]
    Spending(SpendingCommand),
    /// Spending categories.
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Aggregated totals.
    #[command(subcommand)]
    Summary(SummaryCommand),
    /// Stored application settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args, Debug)]
pub struct RangeArgs {
    #[arg(long)]
    pub from: NaiveDate,
    #[arg(long)]
    pub to: NaiveDate,
}

#[derive(Subcommand, Debug)]
pub enum IncomeCommand {
    Add {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        amount: MoneyCents,
        #[arg(long)]
        description: Option<String>,
    },
    List(RangeArgs),
    Show {
        id: Uuid,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        amount: MoneyCents,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: Uuid,
    },
    DeleteRange(RangeArgs),
}

#[derive(Subcommand, Debug)]
pub enum SpendingCommand {
    Add {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        amount: MoneyCents,
        #[arg(long)]
        category: Uuid,
        #[arg(long)]
        description: Option<String>,
    },
    List {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        category: Option<Uuid>,
    },
    /// List one page, newest first.
    Page {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        category: Option<Uuid>,
        #[arg(long, default_value_t = 50)]
        limit: u64,
        #[arg(long)]
        cursor: Option<String>,
    },
    Show {
        id: Uuid,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        amount: MoneyCents,
        #[arg(long)]
        category: Uuid,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: Uuid,
    },
    DeleteRange {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        category: Option<Uuid>,
    },
    /// Delete every entry of one category.
    DeleteCategory {
        category: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Add {
        name: String,
        #[arg(long)]
        order: Option<i32>,
    },
    List {
        /// Include inactive categories.
        #[arg(long)]
        all: bool,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        order: i32,
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        active: bool,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum SummaryCommand {
    Budget(RangeArgs),
    /// Bank-statement period containing `--date` (default: today).
    Statement {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Trend(RangeArgs),
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show or set the bank-statement anchor day.
    StatementDay {
        #[arg(long)]
        set: Option<u32>,
    },
}
