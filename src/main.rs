use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tabchord::{
    parse_document, recognize_document, ChordDatabase, Config, MatchOutcome, Recognition,
};

/// tabchord - recognize chords in ASCII guitar tablature
#[derive(Parser, Debug)]
#[command(name = "tabchord", version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recognize chords in a tab file
    Recognize(RecognizeArgs),

    /// Print the notes parsed from a tab file
    Parse(ParseArgs),

    /// Load the chord database and report rejected records
    CheckDb(CheckDbArgs),
}

#[derive(Args, Debug)]
struct DatabaseArgs {
    /// Chord database (YAML list of name/voicing records)
    #[arg(short, long, env = "TABCHORD_DATABASE")]
    database: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RecognizeArgs {
    /// Tab file to read; stdin when omitted or "-"
    tab_file: Option<PathBuf>,

    #[command(flatten)]
    db: DatabaseArgs,

    /// Minimum number of strings played together to count as a chord
    #[arg(long)]
    min_strings: Option<usize>,

    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Tab file to read; stdin when omitted or "-"
    tab_file: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct CheckDbArgs {
    #[command(flatten)]
    db: DatabaseArgs,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "tabchord=warn",
        1 => "tabchord=info",
        _ => "tabchord=debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Recognize(args) => handle_recognize(&args, &config),
        Command::Parse(args) => handle_parse(&args),
        Command::CheckDb(args) => handle_check_db(&args, &config),
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read tab file: {}", p.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read tab from stdin")?;
            Ok(text)
        }
    }
}

fn load_database(path: Option<&Path>) -> Result<ChordDatabase> {
    match path {
        Some(path) => ChordDatabase::load(path)
            .with_context(|| format!("failed to load chord database: {}", path.display())),
        None => ChordDatabase::reference().context("failed to load built-in chord database"),
    }
}

fn handle_recognize(args: &RecognizeArgs, config: &Config) -> Result<ExitCode> {
    let source = read_input(args.tab_file.as_ref())?;
    let path = config.database_path(args.db.database.as_ref());
    let db = load_database(path.as_deref())?;
    let options = config.match_options(args.min_strings);

    let recognitions = recognize_document(&source, &db, &options)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recognitions)?),
        OutputFormat::Text => {
            for (i, recognition) in recognitions.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_recognition(recognition);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_recognition(recognition: &Recognition) {
    println!(
        "Tab at line {} (tuning {})",
        recognition.first_line, recognition.tuning
    );
    for result in &recognition.results {
        match &result.outcome {
            MatchOutcome::Unrecognized => {
                println!(
                    "column {}: unrecognized shape ({})",
                    result.column, result.signature
                );
            }
            MatchOutcome::Chord(name) => {
                println!("column {}: {} ({})", result.column, name, result.signature);
            }
            MatchOutcome::Ambiguous(names) => {
                let names: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
                println!(
                    "column {}: ambiguous, one of {} ({})",
                    result.column,
                    names.join(", "),
                    result.signature
                );
            }
        }
        for (name, voicings) in &result.alternates {
            for voicing in voicings {
                println!("  alternate fingering for {}: {}", name, voicing);
            }
        }
    }
    if !recognition.skipped_columns.is_empty() {
        let columns: Vec<String> = recognition
            .skipped_columns
            .iter()
            .map(|c| c.to_string())
            .collect();
        println!("single notes at columns: {}", columns.join(", "));
    }
}

fn handle_parse(args: &ParseArgs) -> Result<ExitCode> {
    let source = read_input(args.tab_file.as_ref())?;
    let blocks = parse_document(&source)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&blocks)?),
        OutputFormat::Text => {
            for (i, tab) in blocks.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("Tab at line {} (tuning {})", tab.first_line, tab.tuning);
                for note in &tab.notes {
                    println!(
                        "column {:>3}  string {} ({})  fret {}",
                        note.column,
                        note.string_index,
                        tab.tuning.strings[note.string_index],
                        note.fret
                    );
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_check_db(args: &CheckDbArgs, config: &Config) -> Result<ExitCode> {
    let path = config.database_path(args.db.database.as_ref());
    let db = load_database(path.as_deref())?;

    let source = match &path {
        Some(path) => path.display().to_string(),
        None => "built-in database".to_string(),
    };
    println!(
        "{}: {} chords, {} voicings",
        source,
        db.chord_names().count(),
        db.len()
    );
    for rejected in db.rejected() {
        println!("{}", rejected);
    }

    if db.rejected().is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{} records rejected", db.rejected().len());
        Ok(ExitCode::FAILURE)
    }
}
