// File: ./src/cli.rs
//! Command-line parsing, help text and output formatting for the binary.
use crate::model::Calendar;
use crate::urls::WeekRange;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Link { url: String, range: WeekRange },
    Hash { hash: String, range: WeekRange },
    Query { text: String, range: WeekRange },
    Search { text: String },
    File { path: PathBuf, key: Option<String> },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: Command,
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
    pub ics: bool,
}

fn flag_value<'a>(flag: &str, iter: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, String> {
    iter.next()
        .ok_or_else(|| format!("Missing value for {}", flag))
}

fn parse_u8(flag: &str, raw: &str) -> Result<u8, String> {
    raw.parse::<u8>()
        .map_err(|_| format!("{} expects a number from 0 to 255, got '{}'", flag, raw))
}

/// Parses `args` without the program name.
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut config_path = None;
    let mut verbose = false;
    let mut ics = false;
    let mut range = WeekRange::default();
    let mut key = None;
    let mut positional: Vec<&String> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" | "help" => {
                return Ok(CliArgs {
                    command: Command::Help,
                    config_path,
                    verbose,
                    ics,
                });
            }
            "-v" | "--verbose" => verbose = true,
            "--ics" => ics = true,
            "-c" | "--config" => config_path = Some(PathBuf::from(flag_value(arg, &mut iter)?)),
            "--before" => range.before = parse_u8(arg, flag_value(arg, &mut iter)?)?,
            "--skip" => range.skip = parse_u8(arg, flag_value(arg, &mut iter)?)?,
            "--after" => range.after = parse_u8(arg, flag_value(arg, &mut iter)?)?,
            "--key" => key = Some(flag_value(arg, &mut iter)?.clone()),
            s if s.starts_with('-') && s.len() > 1 => return Err(format!("Unknown option '{}'", s)),
            _ => positional.push(arg),
        }
    }

    let (name, value) = match positional.as_slice() {
        [] => ("help", None),
        [name] => (name.as_str(), None),
        [name, value] => (name.as_str(), Some((*value).clone())),
        [_, _, extra, ..] => return Err(format!("Unexpected argument '{}'", extra)),
    };
    let need = |what: &str| value.clone().ok_or_else(|| format!("'{}' needs {}", name, what));

    let command = match name {
        "help" => Command::Help,
        "link" => Command::Link { url: need("a url")?, range },
        "hash" => Command::Hash { hash: need("a hash")?, range },
        "query" => Command::Query { text: need("a search text")?, range },
        "search" => Command::Search { text: need("a search text")? },
        "file" => Command::File {
            path: PathBuf::from(need("a path to an html page")?),
            key,
        },
        other => return Err(format!("Unknown command '{}'", other)),
    };

    Ok(CliArgs {
        command,
        config_path,
        verbose,
        ics,
    })
}

pub fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str("raspical")
        .build();
    // A second init (tests, embedding) is harmless.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

pub fn print_help(binary_name: &str) {
    println!(
        "Raspical v{} - rasp.tpu.ru schedules as calendars",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [OPTIONS] link <url>        Schedule page (absolute or site-relative)", binary_name);
    println!("    {} [OPTIONS] hash <hash>       Schedule behind a calendar hash", binary_name);
    println!("    {} [OPTIONS] query <text>      First exact search match", binary_name);
    println!("    {} search <text>               List search results", binary_name);
    println!("    {} file <page.html> [--key K]  Parse a saved page", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    --before N            Also include N weeks before the page.");
    println!("    --skip N              Leave out the first N weeks after it.");
    println!("    --after N             Include weeks up to N after it.");
    println!("    --ics                 Print iCalendar instead of a listing.");
    println!("    -c, --config <path>   Use a different config file.");
    println!("    -v, --verbose         Debug logging on stderr.");
    println!("    -h, --help            Show this help message.");
}

/// Human-readable listing of a calendar.
pub fn render_listing(calendar: &Calendar) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", calendar.name));
    let times: Vec<String> = calendar.lessons_times.iter().map(|t| t.to_string()).collect();
    out.push_str(&format!("Lessons: {}\n", times.join(", ")));
    for ev in &calendar.events {
        out.push_str(&format!(
            "{}  {} [{}] {}",
            ev.start.format("%a %Y-%m-%d %H:%M"),
            ev.name,
            ev.kind(),
            ev.teacher()
        ));
        if !ev.location.is_empty() {
            out.push_str(&format!(" @ {}", ev.location));
        }
        out.push('\n');
    }
    out
}
