use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use modiscat::{
    cli::{self, DaySelector},
    config::{self, Settings},
    error,
    search::SearchQuery,
    tile::TilePosition,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List archive collections
    Collections(RefreshOpts),

    /// List products of a collection
    Products(ProductsOptions),

    /// List years available for a product
    Years(YearsOptions),

    /// List days available for a product year
    Days(DaysOptions),

    /// List the images of one product day
    Images(ImagesOptions),

    /// Search product days by date, range or year, optionally by tile
    Search(SearchOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct RefreshOpts {
    /// Re-fetch the listing even if it is cached
    #[clap(long)]
    pub refresh: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ProductsOptions {
    /// Collection name, e.g. 61
    pub collection: String,

    #[clap(flatten)]
    pub refresh: RefreshOpts,
}

#[derive(Parser, Debug, Clone)]
pub struct YearsOptions {
    pub collection: String,

    /// Product code, e.g. MOD09A1
    pub product: String,

    #[clap(flatten)]
    pub refresh: RefreshOpts,
}

#[derive(Parser, Debug, Clone)]
pub struct DaysOptions {
    pub collection: String,
    pub product: String,
    pub year: i32,

    #[clap(flatten)]
    pub refresh: RefreshOpts,
}

#[derive(Parser, Debug, Clone)]
pub struct ImagesOptions {
    pub collection: String,
    pub product: String,

    /// Calendar date (YYYY-MM-DD)
    #[clap(long, conflicts_with_all = ["year", "day_of_year"])]
    pub date: Option<String>,

    #[clap(long, requires = "day_of_year")]
    pub year: Option<i32>,

    #[clap(long, requires = "year")]
    pub day_of_year: Option<u16>,

    #[clap(flatten)]
    pub refresh: RefreshOpts,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    #[clap(long)]
    pub collection: String,

    #[clap(long)]
    pub product: String,

    /// Single date (YYYY-MM-DD)
    #[clap(long)]
    pub date: Option<String>,

    /// First date of an inclusive range (YYYY-MM-DD)
    #[clap(long)]
    pub start_date: Option<String>,

    /// Last date of an inclusive range (YYYY-MM-DD)
    #[clap(long)]
    pub end_date: Option<String>,

    /// Whole year, or one day of it with --day-of-year
    #[clap(long)]
    pub year: Option<i32>,

    #[clap(long)]
    pub day_of_year: Option<u16>,

    /// Tile position as H,V or hHHvVV
    #[clap(long)]
    pub position: Option<TilePosition>,

    /// Download matched tiles, into the given directory or MODISCAT_DOWNLOAD_DIR
    #[clap(long)]
    pub download: Option<Option<PathBuf>>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(config::LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    if let Err(e) = config::load_env() {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let settings = Settings::from_env();
    let session = cli::connect(settings);

    match cli.command {
        Command::Collections(opt) => cli::collections(&session, opt.refresh),
        Command::Products(opt) => cli::products(&session, &opt.collection, opt.refresh.refresh),
        Command::Years(opt) => cli::years(
            &session,
            &opt.collection,
            &opt.product,
            opt.refresh.refresh,
        ),
        Command::Days(opt) => cli::days(
            &session,
            &opt.collection,
            &opt.product,
            opt.year,
            opt.refresh.refresh,
        ),
        Command::Images(opt) => {
            let selector = match (opt.date, opt.year, opt.day_of_year) {
                (Some(date), _, _) => DaySelector::Date(date),
                (None, Some(year), Some(day)) => DaySelector::DayOfYear { year, day },
                _ => error!("Pass either --date or --year with --day-of-year"),
            };
            cli::images(
                &session,
                &opt.collection,
                &opt.product,
                selector,
                opt.refresh.refresh,
            )
        }
        Command::Search(opt) => {
            let query = SearchQuery {
                collection: Some(opt.collection),
                product: Some(opt.product),
                date: opt.date,
                start_date: opt.start_date,
                end_date: opt.end_date,
                year: opt.year,
                day_of_year: opt.day_of_year,
                position: opt.position,
            };
            let download = opt
                .download
                .map(|dir| dir.unwrap_or_else(|| session.settings.download_dir.clone()));
            cli::search(&session, query, download)
        }
        Command::Completions(_) => {}
    }
}
