use std::fmt;
use std::time::Duration;

use flashcards_core::TriState;
use flashcards_core::model::{CategoryId, Flashcard};
use gateway::{GatewayConfig, parse_timeout_secs};
use services::{ClientServices, Outcome};
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingCategoryId,
    UnknownArg(String),
    UnknownCommand(String),
    InvalidCategoryId { raw: String },
    InvalidFilter { flag: &'static str, raw: String },
    InvalidApiUrl { raw: String },
    InvalidTimeout { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingCategoryId => write!(f, "a category id is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidCategoryId { raw } => write!(f, "invalid category id: {raw}"),
            ArgsError::InvalidFilter { flag, raw } => {
                write!(f, "invalid {flag} value: {raw} (expected true, false or both)")
            }
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api-url value: {raw}"),
            ArgsError::InvalidTimeout { raw } => write!(f, "invalid --timeout-secs value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- categories [--search <text>]");
    eprintln!(
        "  cargo run -p app -- category <id> [--search <text>] [--known <f>] [--bookmarked <f>]"
    );
    eprintln!("  cargo run -p app -- study <id> [--shuffle]");
    eprintln!();
    eprintln!("Filters <f>: true | false | both (default both)");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  --api-url <url>        (default http://localhost:3333)");
    eprintln!("  --timeout-secs <secs>  (default 10)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FLASHCARDS_API_URL, FLASHCARDS_API_TIMEOUT_SECS, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Categories {
        search: String,
    },
    Category {
        id: CategoryId,
        search: String,
        known: TriState,
        bookmarked: TriState,
    },
    Study {
        id: CategoryId,
        shuffle: bool,
    },
}

/// Flag overrides for the gateway configuration.
#[derive(Debug, Default, PartialEq, Eq)]
struct ApiOverrides {
    api_url: Option<String>,
    timeout: Option<Duration>,
}

impl ApiOverrides {
    fn apply(self, mut config: GatewayConfig) -> Result<GatewayConfig, ArgsError> {
        if let Some(raw) = self.api_url {
            config = config
                .with_base_url(&raw)
                .map_err(|_| ArgsError::InvalidApiUrl { raw })?;
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        Ok(config)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    command: Command,
    api: ApiOverrides,
}

impl Args {
    fn parse(argv: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter();
        let Some(first) = args.next() else {
            return Ok(Self::help());
        };

        let mut api = ApiOverrides::default();
        let mut search = String::new();
        let mut known = TriState::Either;
        let mut bookmarked = TriState::Either;
        let mut shuffle = false;

        let needs_id = match first.as_str() {
            "--help" | "-h" => return Ok(Self::help()),
            "categories" => false,
            "category" | "study" => true,
            _ => return Err(ArgsError::UnknownCommand(first)),
        };
        let id = if needs_id {
            let raw = args.next().ok_or(ArgsError::MissingCategoryId)?;
            Some(
                raw.parse::<CategoryId>()
                    .map_err(|_| ArgsError::InvalidCategoryId { raw: raw.clone() })?,
            )
        } else {
            None
        };

        while let Some(arg) = args.next() {
            match (first.as_str(), arg.as_str()) {
                (_, "--help" | "-h") => return Ok(Self::help()),
                (_, "--api-url") => api.api_url = Some(require_value(&mut args, "--api-url")?),
                (_, "--timeout-secs") => {
                    let raw = require_value(&mut args, "--timeout-secs")?;
                    let timeout =
                        parse_timeout_secs(&raw).map_err(|_| ArgsError::InvalidTimeout { raw })?;
                    api.timeout = Some(timeout);
                }
                ("categories" | "category", "--search") => {
                    search = require_value(&mut args, "--search")?;
                }
                ("category", "--known") => known = parse_filter(&mut args, "--known")?,
                ("category", "--bookmarked") => {
                    bookmarked = parse_filter(&mut args, "--bookmarked")?;
                }
                ("study", "--shuffle") => shuffle = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match (first.as_str(), id) {
            ("category", Some(id)) => Command::Category {
                id,
                search,
                known,
                bookmarked,
            },
            ("study", Some(id)) => Command::Study { id, shuffle },
            _ => Command::Categories { search },
        };
        Ok(Self { command, api })
    }

    fn help() -> Self {
        Self {
            command: Command::Help,
            api: ApiOverrides::default(),
        }
    }
}

fn parse_filter(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<TriState, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.parse()
        .map_err(|_| ArgsError::InvalidFilter { flag, raw })
}

fn flags(flashcard: &Flashcard) -> String {
    format!(
        "{}{}",
        if flashcard.is_known() { 'K' } else { '-' },
        if flashcard.is_bookmarked() { 'B' } else { '-' }
    )
}

/// Turns a settled page action into a CLI error. The reporter has already
/// logged gateway failures.
fn committed<T>(outcome: Outcome<T>) -> Result<T, Box<dyn std::error::Error>> {
    match outcome {
        Outcome::Committed(value) => Ok(value),
        Outcome::Failed(err) => Err(err.into()),
        Outcome::Detached => Err("page dropped before the response arrived".into()),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if parsed.command == Command::Help {
        print_usage();
        return Ok(());
    }

    let config = parsed.api.apply(GatewayConfig::from_env()?)?;
    tracing::info!(base_url = config.base_url(), "using flashcards API");
    let services = ClientServices::http(&config)?;

    match parsed.command {
        Command::Help => Ok(()),
        Command::Categories { search } => {
            let page = services.categories_page();
            committed(page.load().await)?;
            page.set_search(search);
            for category in page.visible() {
                println!(
                    "{}\t{}\t{}/{}",
                    category.id(),
                    category.name(),
                    category.known_flashcards_count(),
                    category.flashcards_count()
                );
            }
            Ok(())
        }
        Command::Category {
            id,
            search,
            known,
            bookmarked,
        } => {
            let page = services.category_page(id);
            committed(page.load().await)?;
            page.set_search(search);
            page.set_known_filter(known);
            page.set_bookmarked_filter(bookmarked);
            if let Some(category) = page.category() {
                println!("# {}", category.name());
            }
            for flashcard in page.visible() {
                println!(
                    "{}\t{}\t{}\t{}",
                    flashcard.id(),
                    flags(&flashcard),
                    flashcard.question(),
                    flashcard.answer()
                );
            }
            Ok(())
        }
        Command::Study { id, shuffle } => {
            let page = services.with_shuffle_study(shuffle).category_page(id);
            committed(page.load().await)?;
            let len = page.enter_study().unwrap_or(0);
            if len == 0 {
                println!("nothing to study: every flashcard is known");
                return Ok(());
            }
            for step in 1..=len {
                if let Some(flashcard) = page.study_card() {
                    println!(
                        "{step}/{len}\t{}\t{}\t{}",
                        flashcard.id(),
                        flashcard.question(),
                        flashcard.answer()
                    );
                }
                page.next_study_card();
            }
            page.exit_study();
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
