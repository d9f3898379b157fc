use anyhow::{Context, Result};
use raspical::cache::CachedFetcher;
use raspical::cipher::CipherKey;
use raspical::cli::{self, CliArgs, Command};
use raspical::client::{HttpFetcher, PageFetcher};
use raspical::config::Config;
use raspical::converter::RaspConverter;
use raspical::model::Calendar;
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let parsed = match cli::parse_args(&args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!();
            cli::print_help("raspical");
            std::process::exit(2);
        }
    };

    if parsed.command == Command::Help {
        cli::print_help("raspical");
        return Ok(());
    }

    cli::init_logger(parsed.verbose);

    let config = match &parsed.config_path {
        Some(path) => Config::load(path)?,
        None => Config::load_default_location()?,
    };

    let http = HttpFetcher::new(&config).context("Failed to set up HTTP client")?;
    if config.cache_ttl_secs > 0 {
        let cached = CachedFetcher::new(http, Duration::from_secs(config.cache_ttl_secs));
        run(RaspConverter::new(cached, &config), parsed).await
    } else {
        run(RaspConverter::new(http, &config), parsed).await
    }
}

async fn run<F: PageFetcher>(converter: RaspConverter<F>, args: CliArgs) -> Result<()> {
    let calendar = match args.command {
        Command::Link { url, range } => converter.get_by_link(&url, range).await?,
        Command::Hash { hash, range } => converter.get_by_hash(&hash, range).await?,
        Command::Query { text, range } => match converter.get_by_query(&text, range).await? {
            Some(calendar) => calendar,
            None => {
                eprintln!("Nothing found for '{}'", text);
                std::process::exit(1);
            }
        },
        Command::Search { text } => {
            for item in converter.get_search_results(&text).await? {
                println!("{}\t{}", item.text, item.url);
            }
            return Ok(());
        }
        Command::File { path, key } => {
            let html = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            let key = key.as_deref().map(CipherKey::from_chars).transpose()?;
            converter.get_by_html(&html, key.as_ref()).await?
        }
        Command::Help => return Ok(()),
    };

    print_calendar(&calendar, args.ics);
    Ok(())
}

fn print_calendar(calendar: &Calendar, ics: bool) {
    if ics {
        println!("{}", calendar.to_ics());
    } else {
        print!("{}", cli::render_listing(calendar));
    }
}
