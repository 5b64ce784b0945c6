use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use flowspell::checker::dictionary::Dictionary;
use flowspell::cli::output::OutputFormat;
use flowspell::error::FlowError;
use flowspell::fixed::element::FixedPage;
use flowspell::speller::document::TextTree;
use flowspell::{cli, dict, parser, CheckResult, Config, DictionaryEngine, FixedTextContainer, LocatedError, Speller};
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "flowspell")]
#[command(version, about = "Reading-order reconstruction and incremental spell checking", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding compiled dictionaries
    #[arg(long, env = "FLOWSPELL_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Spell check Markdown or plain text files
    Check {
        /// Files to check
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Exit with code 0 even if errors are found
        #[arg(long)]
        no_fail: bool,

        /// Language/dictionary to use (e.g., en_US, en_GB)
        #[arg(short, long, default_value = "en_US")]
        language: String,

        /// Output format (text, json)
        #[arg(short = 'o', long, default_value = "text")]
        format: OutputFormat,

        /// Pattern to ignore (regex)
        #[arg(long)]
        ignore_pattern: Vec<String>,

        /// Personal dictionary file
        #[arg(long)]
        personal_dict: Option<PathBuf>,

        /// Compiled dictionary to use instead of the installed one
        #[arg(long)]
        dictionary: Option<PathBuf>,
    },
    /// Print the reading-order flow reconstructed from fixed page descriptions
    Flow {
        /// JSON page descriptions (one page or an array of pages per file)
        #[arg(value_name = "PAGES", required = true)]
        files: Vec<PathBuf>,

        /// Only this page (1-based)
        #[arg(short, long)]
        page: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Output format (text, json)
        #[arg(short = 'o', long, default_value = "text")]
        format: OutputFormat,
    },
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DictCommands {
    /// List installed dictionaries
    List,
    /// Compile a word list into an installed dictionary
    Build {
        /// Language code (e.g., en_US, en_GB, fr_FR)
        language: String,
        /// Word list, one word or phrase per line
        wordlist: PathBuf,
    },
    /// Show dictionary info
    Info {
        /// Language code
        language: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "flowspell", &mut io::stdout());
        return Ok(());
    }

    let data_dir = cli.data_dir.clone().or_else(Config::data_dir);

    match cli.command {
        Some(Commands::Check {
            files,
            no_color,
            no_fail,
            language,
            format,
            ignore_pattern,
            personal_dict,
            dictionary,
        }) => {
            if no_color {
                colored::control::set_override(false);
            }
            let config = Config::load(language, personal_dict, ignore_pattern)?;
            let total_errors = check_files(&files, &config, data_dir.as_deref(), dictionary.as_deref(), !no_color, format)?;

            if format == OutputFormat::Text {
                cli::output::print_check_summary(total_errors, &files, !no_color);
            }
            if total_errors > 0 && !no_fail {
                std::process::exit(1);
            }
        }
        Some(Commands::Flow {
            files,
            page,
            no_color,
            format,
        }) => {
            if no_color {
                colored::control::set_override(false);
            }
            let config = Config::load(Config::default().language, None, Vec::new())?;
            for file in &files {
                print_file_flow(file, page, &config, !no_color, format)?;
            }
        }
        Some(Commands::Dict { action }) => {
            let data_dir = data_dir.context("Could not determine data directory")?;
            match action {
                DictCommands::List => dict::manager::list_dictionaries(&data_dir)?,
                DictCommands::Build { language, wordlist } => {
                    dict::manager::build_dictionary(&language, &wordlist, &data_dir)?;
                }
                DictCommands::Info { language } => dict::manager::show_info(&language, &data_dir)?,
            }
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

fn load_engine(config: &Config, data_dir: Option<&Path>, dictionary: Option<&Path>) -> Result<DictionaryEngine> {
    match dictionary {
        Some(path) => DictionaryEngine::with_dictionary(Dictionary::load_from_path(path)?, config),
        None => DictionaryEngine::from_config(config, data_dir),
    }
}

fn check_files(
    files: &[PathBuf],
    config: &Config,
    data_dir: Option<&Path>,
    dictionary: Option<&Path>,
    colored: bool,
    format: OutputFormat,
) -> Result<usize> {
    let mut total_errors = 0;

    for file_path in files {
        if !file_path.exists() {
            eprintln!("Error: File not found: {}", file_path.display());
            continue;
        }

        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;
        let loaded = parser::load_file(file_path, &content, &config.language)?;
        debug!(
            "{}: {} symbols",
            file_path.display(),
            loaded.document.symbol_count()
        );

        let engine = load_engine(config, data_dir, dictionary)?;
        let mut speller = Speller::new(Box::new(engine), loaded.document.symbol_count(), config.scan.clone());
        if speller.has_failed() {
            warn!("{}: skipped, no usable dictionary", file_path.display());
            continue;
        }
        speller.scan_to_completion(&loaded.document);

        let mut result = CheckResult::default();
        for error in speller.errors(&loaded.document) {
            let (line, column) = loaded.locate(error.start);
            let suggestions = speller.get_suggestions_for_error(&loaded.document, &error);
            result.errors.push(LocatedError {
                context: loaded.context(error.start, error.word.chars().count()),
                word: error.word,
                line,
                column,
                suggestions,
            });
        }
        result.error_count = result.errors.len();
        info!("{}: {} errors", file_path.display(), result.error_count);

        cli::output::print_errors(file_path, &result, colored, format)?;
        total_errors += result.error_count;
    }

    Ok(total_errors)
}

fn read_pages(path: &Path) -> Result<Vec<FixedPage>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read page file: {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| FlowError::MalformedPage(format!("{}: {}", path.display(), e)))?;
    let pages: Result<Vec<FixedPage>, serde_json::Error> = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|page| vec![page])
    };
    pages.map_err(|e| FlowError::MalformedPage(format!("{}: {}", path.display(), e)).into())
}

fn print_file_flow(path: &Path, page: Option<usize>, config: &Config, colored: bool, format: OutputFormat) -> Result<()> {
    let pages = read_pages(path)?;
    let mut container = FixedTextContainer::new(pages, config.flow.clone());

    match page {
        Some(number) => {
            let index = number.checked_sub(1).ok_or(FlowError::PageOutOfRange {
                page: 0,
                count: container.page_count(),
            })?;
            let flow = container.ensure_page(index)?;
            cli::output::print_flow(path, index, flow, colored, format)?;
        }
        None => {
            container.build_all_parallel();
            for index in 0..container.page_count() {
                let flow = container.ensure_page(index)?;
                cli::output::print_flow(path, index, flow, colored, format)?;
            }
        }
    }

    Ok(())
}
