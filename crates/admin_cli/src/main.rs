use std::error::Error;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{AccountCmd, Domain, Engine, EngineError, FundCmd, Money};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "hospital_admin")]
#[command(about = "Admin utilities for the hospital fund ledgers")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./hospital_ledger.db?mode=rwc"
    )]
    database_url: String,

    /// Actor recorded on every write.
    #[arg(long, env = "HOSPITAL_ACTOR", default_value = "admin")]
    actor: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current balance of a domain.
    Balance(DomainArg),
    /// Inject capital.
    FundIn(FundArgs),
    /// Withdraw capital.
    FundOut(FundArgs),
    /// Record an operating expense.
    Expense(AccountArgs),
    /// Record an operating income.
    Income(AccountArgs),
    Report(Report),
    Category(Category),
}

#[derive(Args, Debug)]
struct DomainArg {
    /// medicine, operation or house_security
    #[arg(long)]
    domain: Domain,
}

#[derive(Args, Debug)]
struct FundArgs {
    #[arg(long)]
    domain: Domain,
    /// Decimal amount, e.g. `1250.50`.
    #[arg(long)]
    amount: Money,
    #[arg(long)]
    purpose: String,
    #[arg(long)]
    description: Option<String>,
    /// `YYYY-MM-DD`
    #[arg(long, value_parser = parse_date)]
    date: NaiveDate,
}

#[derive(Args, Debug)]
struct AccountArgs {
    #[arg(long)]
    domain: Domain,
    #[arg(long)]
    amount: Money,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    category_id: Option<i64>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, value_parser = parse_date)]
    date: NaiveDate,
}

#[derive(Args, Debug)]
struct Report {
    #[command(subcommand)]
    command: ReportCommand,
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    Monthly(MonthlyArgs),
}

#[derive(Args, Debug)]
struct MonthlyArgs {
    #[arg(long)]
    domain: Domain,
    #[arg(long)]
    year: i32,
    #[arg(long)]
    month: u32,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create {
        #[arg(long)]
        name: String,
    },
    List {
        /// Include deactivated categories.
        #[arg(long)]
        all: bool,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, EngineError> {
    engine::parse_transaction_date("date", raw)
}

fn fund_cmd(actor: &str, args: FundArgs) -> FundCmd {
    let mut cmd = FundCmd::new(args.domain, actor, args.amount, args.purpose, args.date);
    cmd.description = args.description;
    cmd
}

fn account_cmd(actor: &str, args: AccountArgs) -> AccountCmd {
    let mut cmd = AccountCmd::new(args.domain, actor, args.amount, args.date);
    cmd.category = args.category;
    cmd.category_id = args.category_id;
    cmd.description = args.description;
    cmd
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Balance(DomainArg { domain }) => {
            let balance = engine.balance(domain).await?;
            println!("{domain}: {balance}");
        }
        Command::FundIn(args) => {
            let tx = engine.add_fund(fund_cmd(&cli.actor, args)).await?;
            println!("recorded fund in #{}: {}", tx.id, tx.amount);
        }
        Command::FundOut(args) => {
            let tx = engine.withdraw_fund(fund_cmd(&cli.actor, args)).await?;
            println!("recorded fund out #{}: {}", tx.id, tx.amount);
        }
        Command::Expense(args) => {
            let tx = engine.add_expense(account_cmd(&cli.actor, args)).await?;
            println!(
                "recorded expense {} ({}): {}",
                tx.transaction_number, tx.category, tx.amount
            );
        }
        Command::Income(args) => {
            let tx = engine.add_income(account_cmd(&cli.actor, args)).await?;
            println!(
                "recorded income {} ({}): {}",
                tx.transaction_number, tx.category, tx.amount
            );
        }
        Command::Report(Report {
            command: ReportCommand::Monthly(args),
        }) => {
            let report = engine
                .monthly_report(args.domain, args.year, args.month)
                .await?;
            println!("{} {:04}-{:02}", args.domain, report.year, report.month);
            println!("  opening   {}", report.opening);
            println!("  fund in   {}", report.fund_in);
            println!("  fund out  {}", report.fund_out);
            println!("  income    {}", report.income);
            println!("  expense   {}", report.expense);
            println!("  net       {}", report.net);
            println!("  closing   {}", report.closing);
            println!("  records   {}", report.count);
            println!("  margin    {:.2}%", report.profit_margin());
        }
        Command::Category(Category {
            command: CategoryCommand::Create { name },
        }) => {
            let category = engine.create_category(&name).await?;
            println!("created category: {} ({})", category.name, category.id);
        }
        Command::Category(Category {
            command: CategoryCommand::List { all },
        }) => {
            for category in engine.categories(all).await? {
                let state = if category.active { "" } else { " [inactive]" };
                println!("{:>5}  {}{state}", category.id, category.name);
            }
        }
    }

    Ok(())
}
