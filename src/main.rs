mod categories;
mod dashboard;
mod display;
mod init;
mod projection;
mod settings;
mod statement;
mod txn;
mod upstream;

use anyhow::Result;
use clap::{arg, ArgMatches, Command};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::settings::Settings;

static CLIENT_NAME: &str = "finpal";

fn month_arg() -> clap::Arg<'static> {
    arg!(month: -m --month [MONTH] "The reference month as YYYY-MM, defaults to the current month.")
}

fn type_arg() -> clap::Arg<'static> {
    clap::Arg::new("type")
        .long("type")
        .takes_value(true)
        .value_name("TYPE")
        .help("One of expense, income or investment.")
}

pub(crate) fn cli() -> Command<'static> {
    Command::new(CLIENT_NAME)
        .about("The finpal utility records expenses, income and investments against a \
         personal finance API and summarizes them month by month.")
        .version("0.1.0")
        .subcommand_required(true)
        .allow_external_subcommands(false)
        .arg(arg!(CONFIG: -c --config [FILE] "Sets a custom config file"))
        .arg(arg!(verbose: -v --verbose "Logs requests to stderr"))
        .subcommand(Command::new("init").about("Writes a configuration file interactively."))
        .subcommand(Command::new("add")
            .about("Records a new transaction.")
            .arg(arg!(<TYPE> "One of expense, income or investment."))
            .arg(arg!(amount: -a --amount <AMOUNT> "A positive amount, either . or , as decimal separator."))
            .arg(arg!(description: -d --description <TEXT> "What the money was for."))
            .arg(arg!(category: -k --category <ID> "The category ID, see the categories command."))
            .arg(arg!(date: -t --date [DATE] "When it happened, as DD/MM/YYYY HH:mm. Digits alone are masked, defaults to now.")))
        .subcommand(Command::new("projections")
            .subcommand_required(true)
            .about("Budgeted transactions, optionally repeating every month.")
            .subcommand(Command::new("add")
                .about("Projects a new transaction starting this month.")
                .arg(arg!(amount: -a --amount <AMOUNT> "A positive amount."))
                .arg(arg!(description: -d --description <TEXT> "What the money is for."))
                .arg(type_arg().required(true))
                .arg(arg!(category: -k --category <ID> "The category ID."))
                .arg(arg!(recurring: -r --recurring "Repeat the projection every month."))
                .arg(arg!(until: -u --until [MONTH] "Last month of a recurring projection, as YYYY-MM.")
                    .requires("recurring")))
            .subcommand(Command::new("list")
                .about("Prints projections, only those falling in --month when given.")
                .arg(arg!(month: -m --month [MONTH] "Only projections occurring in this month, as YYYY-MM."))))
        .subcommand(Command::new("categories")
            .about("Prints the available categories.")
            .arg(type_arg()))
        .subcommand(Command::new("dashboard")
            .about("Prints monthly totals, the balance and per-category totals.")
            .arg(month_arg())
            .arg(arg!(previous: --previous "Show the month before the reference month.").conflicts_with("next"))
            .arg(arg!(next: --next "Show the month after the reference month.")))
        .subcommand(Command::new("statement")
            .about("Prints the transactions of a month grouped by category.")
            .arg(month_arg()))
}

fn init_tracing(matches: &ArgMatches) {
    if matches.is_present("verbose") {
        tracing_subscriber::registry()
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(&matches);

    let config = matches.value_of("CONFIG");
    match matches.subcommand() {
        Some(("init", _)) => {
            init::run(config).await?;
        }
        Some(("add", add_matches)) => {
            txn::run(add_matches, Settings::new(config)?).await?;
        }
        Some(("projections", projection_matches)) => {
            projection::run(projection_matches, Settings::new(config)?).await?;
        }
        Some(("categories", category_matches)) => {
            categories::run(category_matches, Settings::new(config)?).await?;
        }
        Some(("dashboard", dashboard_matches)) => {
            dashboard::run(dashboard_matches, Settings::new(config)?).await?;
        }
        Some(("statement", statement_matches)) => {
            statement::run(statement_matches, Settings::new(config)?).await?;
        }
        None => unreachable!("subcommand is required"),
        _ => unreachable!(),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        println!("{:#}", err);
        std::process::exit(1);
    }
}
