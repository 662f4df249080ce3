use std::error::Error;

use chrono::Local;
use clap::Parser;
use engine::{
    DateRange, Engine, EngineError, ErrorKind, Outcome,
    commands::{
        AddCategory, AddIncome, AddSpending, DeleteCategory, DeleteIncome, DeleteIncomeInRange,
        DeleteSpending, DeleteSpendingByCategory, DeleteSpendingInRange, GetBudgetSummary,
        GetCategories, GetIncome, GetIncomeById, GetSpending, GetSpendingById, GetStatementDay,
        GetStatementSummary, GetWeeklyTrend, ListSpendingPage, SetStatementDay, UpdateCategory,
        UpdateIncome, UpdateSpending,
    },
};
use migration::{Migrator, MigratorTrait};

use cli::{
    CategoryCommand, Cli, Command, IncomeCommand, RangeArgs, SettingsCommand, SpendingCommand,
    SummaryCommand,
};

mod cli;
mod output;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pennywise={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database_url());
    let database = connect_db(&url).await?;
    let engine = Engine::builder()
        .database(database)
        .cache_ttls(settings.cache.ttls())
        .build()
        .await?;

    let outcome = run(&engine, cli.command)
        .await
        .on_failure(|err| tracing::debug!(code = %err.code, "command failed"));
    if let Err(err) = outcome {
        output::print_error(&err);
        std::process::exit(exit_code(&err));
    }

    Ok(())
}

async fn connect_db(
    database_url: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn Error + Send + Sync>> {
    tracing::info!("opening database {database_url}");
    let database = sea_orm::Database::connect(database_url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

fn exit_code(err: &EngineError) -> i32 {
    match err.kind {
        ErrorKind::Validation => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Business | ErrorKind::Conflict => 4,
        ErrorKind::Unauthorized | ErrorKind::System => 1,
    }
}

fn range(args: RangeArgs) -> Result<DateRange, EngineError> {
    DateRange::new(args.from, args.to)
}

async fn run(engine: &Engine, command: Command) -> Result<(), EngineError> {
    match command {
        Command::Income(command) => run_income(engine, command).await,
        Command::Spending(command) => run_spending(engine, command).await,
        Command::Category(command) => run_category(engine, command).await,
        Command::Summary(command) => run_summary(engine, command).await,
        Command::Settings(SettingsCommand::StatementDay { set }) => {
            if let Some(day) = set {
                engine.send(SetStatementDay { day }).await?;
            }
            let day = engine.send(GetStatementDay).await?;
            println!("statement day: {day}");
            Ok(())
        }
    }
}

async fn run_income(engine: &Engine, command: IncomeCommand) -> Result<(), EngineError> {
    match command {
        IncomeCommand::Add {
            date,
            amount,
            description,
        } => {
            let income = engine
                .send(AddIncome {
                    date,
                    amount,
                    description,
                })
                .await?;
            println!("added income {}", income.id);
        }
        IncomeCommand::List(args) => {
            let items = engine.send(GetIncome { range: range(args)? }).await?;
            output::print_income(&items);
        }
        IncomeCommand::Show { id } => {
            let income = engine.send(GetIncomeById { id }).await?;
            output::print_income(std::slice::from_ref(&income));
        }
        IncomeCommand::Update {
            id,
            date,
            amount,
            description,
        } => {
            let income = engine
                .send(UpdateIncome {
                    id,
                    date,
                    amount,
                    description,
                })
                .await?;
            println!("updated income {}", income.id);
        }
        IncomeCommand::Delete { id } => {
            engine.send(DeleteIncome { id }).await?;
            println!("deleted income {id}");
        }
        IncomeCommand::DeleteRange(args) => {
            let deleted = engine
                .send(DeleteIncomeInRange { range: range(args)? })
                .await?;
            println!("deleted {deleted} income entries");
        }
    }
    Ok(())
}

async fn run_spending(engine: &Engine, command: SpendingCommand) -> Result<(), EngineError> {
    match command {
        SpendingCommand::Add {
            date,
            amount,
            category,
            description,
        } => {
            let spending = engine
                .send(AddSpending {
                    date,
                    amount,
                    description,
                    category_id: category,
                })
                .await?;
            println!("added spending {}", spending.id);
        }
        SpendingCommand::List { range: args, category } => {
            let items = engine
                .send(GetSpending {
                    range: range(args)?,
                    category_id: category,
                })
                .await?;
            output::print_spending(&items);
        }
        SpendingCommand::Page {
            range: args,
            category,
            limit,
            cursor,
        } => {
            let page = engine
                .send(ListSpendingPage {
                    range: range(args)?,
                    category_id: category,
                    limit,
                    cursor,
                })
                .await?;
            output::print_spending(&page.items);
            if let Some(next) = page.next_cursor {
                println!("next cursor: {next}");
            }
        }
        SpendingCommand::Show { id } => {
            let spending = engine.send(GetSpendingById { id }).await?;
            output::print_spending(std::slice::from_ref(&spending));
        }
        SpendingCommand::Update {
            id,
            date,
            amount,
            category,
            description,
        } => {
            let spending = engine
                .send(UpdateSpending {
                    id,
                    date,
                    amount,
                    description,
                    category_id: category,
                })
                .await?;
            println!("updated spending {}", spending.id);
        }
        SpendingCommand::Delete { id } => {
            engine.send(DeleteSpending { id }).await?;
            println!("deleted spending {id}");
        }
        SpendingCommand::DeleteRange { range: args, category } => {
            let deleted = engine
                .send(DeleteSpendingInRange {
                    range: range(args)?,
                    category_id: category,
                })
                .await?;
            println!("deleted {deleted} spending entries");
        }
        SpendingCommand::DeleteCategory { category } => {
            let deleted = engine
                .send(DeleteSpendingByCategory {
                    category_id: category,
                })
                .await?;
            println!("deleted {deleted} spending entries");
        }
    }
    Ok(())
}

async fn run_category(engine: &Engine, command: CategoryCommand) -> Result<(), EngineError> {
    match command {
        CategoryCommand::Add { name, order } => {
            let category = engine
                .send(AddCategory {
                    name,
                    display_order: order,
                })
                .await?;
            println!("added category {} ({})", category.name, category.id);
        }
        CategoryCommand::List { all } => {
            let items = engine
                .send(GetCategories {
                    include_inactive: all,
                })
                .await?;
            output::print_categories(&items);
        }
        CategoryCommand::Update {
            id,
            name,
            order,
            active,
        } => {
            let category = engine
                .send(UpdateCategory {
                    id,
                    name,
                    display_order: order,
                    is_active: active,
                })
                .await?;
            println!("updated category {} ({})", category.name, category.id);
        }
        CategoryCommand::Delete { id } => {
            engine.send(DeleteCategory { id }).await?;
            println!("deleted category {id}");
        }
    }
    Ok(())
}

async fn run_summary(engine: &Engine, command: SummaryCommand) -> Result<(), EngineError> {
    match command {
        SummaryCommand::Budget(args) => {
            let summary = engine
                .send(GetBudgetSummary { range: range(args)? })
                .await?;
            output::print_budget(&summary);
        }
        SummaryCommand::Statement { date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let summary = engine.send(GetStatementSummary { date }).await?;
            output::print_statement(&summary);
        }
        SummaryCommand::Trend(args) => {
            let points = engine.send(GetWeeklyTrend { range: range(args)? }).await?;
            output::print_trend(&points);
        }
    }
    Ok(())
}
