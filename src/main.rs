//! MCIF: interactive self-assessment quiz CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use mcif::config::{build_ignore_set, load_config, Config, ExportFormat, CONFIG_FILENAME};
use mcif::history::{append_run, format_delta, load_history, previous_result, save_history};
use mcif::quiz::QuizRunner;
use mcif::reporter::{export_result, ConsoleReporter, JsonReporter};
use mcif::schema::{
    default_schema_json, discover_schemas, load_schema_or_default, validate_files, LoadedSchema,
    Schema, SchemaSource,
};
use mcif::session::{clear_session, load_answers, load_session, restore};
use mcif::terminal::{Outcome, Prompter};
use mcif::{QuizError, QuizResult};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// MCIF: multi-phase cognitive self-assessment
#[derive(Parser, Debug)]
#[command(name = "mcif")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: search .mcifrc.json in current dir and parents)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (debug logging, answers on the results screen)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Take the quiz interactively, resuming a saved session if there is one
    Run {
        /// Schema file (default: config `schema`, else the built-in schema)
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Session file (default: .mcif-session.json)
        #[arg(long)]
        session: Option<PathBuf>,

        /// Ignore and discard any saved session
        #[arg(long)]
        fresh: bool,

        /// Only save the session on :save, :quit or end of input
        #[arg(long)]
        no_autosave: bool,

        /// Write the result to this file when the quiz completes
        #[arg(long)]
        export: Option<PathBuf>,

        /// Export format: json or text (default: from the file extension)
        #[arg(long)]
        format: Option<String>,

        /// Print the result as JSON instead of the results screen
        #[arg(long, short)]
        json: bool,
    },

    /// Score a saved session or answers file without prompting
    Score {
        /// Session snapshot, exported result or JSON array of answers
        #[arg(long)]
        answers: PathBuf,

        #[arg(long)]
        schema: Option<PathBuf>,

        #[arg(long, short)]
        json: bool,

        /// One line: schema, archetype and composite percent
        #[arg(long, short, conflicts_with = "json")]
        quiet: bool,
    },

    /// Export the result of a completed session
    Export {
        #[arg(long)]
        session: PathBuf,

        #[arg(long, short)]
        output: PathBuf,

        /// json or text (default: from the output extension)
        #[arg(long)]
        format: Option<String>,

        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// Validate a schema file or every schema in a directory
    Validate {
        /// File or directory (default: current directory)
        path: Option<PathBuf>,
    },

    /// Print the built-in schema
    Schema,

    /// Create .mcifrc.json with sensible defaults
    Init {
        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = load_config(&cwd, args.config.as_deref())?;
    if args.no_color || !config.colors() {
        colored::control::set_override(false);
    }

    match args.command {
        Commands::Run {
            schema,
            session,
            fresh,
            no_autosave,
            export,
            format,
            json,
        } => {
            let config = config.merge_with_cli(schema.as_deref(), session.as_deref());
            let options = RunOptions {
                fresh,
                autosave: config.autosave() && !no_autosave,
                export,
                format: parse_format(format.as_deref())?,
                json,
                verbose: args.verbose,
            };
            run_quiz(&config, &options)
        }
        Commands::Score {
            answers,
            schema,
            json,
            quiet,
        } => {
            let config = config.merge_with_cli(schema.as_deref(), None);
            let style = if json {
                ScoreOutput::Json
            } else if quiet {
                ScoreOutput::Quiet
            } else {
                ScoreOutput::Screen {
                    verbose: args.verbose,
                }
            };
            run_score(&config, &answers, style)
        }
        Commands::Export {
            session,
            output,
            format,
            schema,
        } => {
            let config = config.merge_with_cli(schema.as_deref(), Some(&session));
            let format = parse_format(format.as_deref())?;
            run_export(&config, &output, format)
        }
        Commands::Validate { path } => run_validate(&config, path.as_deref().unwrap_or(&cwd)),
        Commands::Schema => {
            println!("{}", default_schema_json().trim_end());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { dir } => run_init(dir.as_deref().unwrap_or(&cwd)),
    }
}

/// `MCIF_LOG` sets the filter; `--verbose` raises it to debug
fn init_logging(verbose: bool) {
    let env = env_logger::Env::new().filter_or("MCIF_LOG", "warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

struct RunOptions {
    fresh: bool,
    autosave: bool,
    export: Option<PathBuf>,
    format: Option<ExportFormat>,
    json: bool,
    verbose: bool,
}

fn run_quiz(config: &Config, options: &RunOptions) -> Result<ExitCode> {
    let schema = load_schema_reporting(config);
    let session_path = config.session_path();

    let mut runner = if options.fresh {
        clear_session(&session_path)?;
        QuizRunner::new(schema)
    } else {
        match load_session(&session_path)? {
            Some(snapshot) => {
                let restored = restore(schema, &snapshot);
                eprintln!(
                    "{}: Resuming session saved {}",
                    "Info".blue(),
                    snapshot.saved_at.format("%Y-%m-%d %H:%M UTC")
                );
                if restored.dropped > 0 {
                    eprintln!(
                        "{}: The schema changed; {} saved answer(s) no longer apply",
                        "Warning".yellow(),
                        restored.dropped
                    );
                }
                restored.runner
            }
            None => QuizRunner::new(schema),
        }
    };

    let stdin = std::io::stdin();
    let prompter = Prompter::new(stdin.lock(), std::io::stdout());
    let mut prompter = if options.autosave {
        prompter.with_autosave(session_path.clone())
    } else {
        prompter.with_session(session_path.clone())
    };

    match prompter.run(&mut runner)? {
        Outcome::Completed(result) => {
            if let Err(e) = clear_session(&session_path) {
                log::warn!("{:#}", e);
            }
            let delta = record_history(config, &result);
            if options.json {
                println!("{}", JsonReporter::new().pretty().report(&result));
            } else {
                console_reporter(options.verbose).report(runner.schema(), &result, &delta);
            }
            if let Some(ref export) = options.export {
                let path = export_target(config, export);
                let format = options.format.or(config.export.format);
                let written = export_result(runner.schema(), &result, &path, format)?;
                eprintln!(
                    "{}: Exported {:?} result to {}",
                    "Info".blue(),
                    written,
                    path.display()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Suspended if prompter.progress_saved() => {
            eprintln!(
                "{}: Progress saved to {}; run `mcif run` to resume",
                "Info".blue(),
                session_path.display()
            );
            Ok(ExitCode::from(1))
        }
        Outcome::Suspended => {
            eprintln!(
                "{}: Progress could not be saved to {}",
                "Warning".yellow(),
                session_path.display()
            );
            Ok(ExitCode::from(1))
        }
    }
}

enum ScoreOutput {
    Json,
    Quiet,
    Screen { verbose: bool },
}

fn run_score(config: &Config, answers_path: &Path, output: ScoreOutput) -> Result<ExitCode> {
    let schema = load_schema_reporting(config);
    let answers = load_answers(answers_path)?;

    let mut runner = QuizRunner::new(schema);
    for answer in answers {
        let id = answer.question_id.clone();
        if let Err(e) = runner.record(answer) {
            eprintln!("{}: Skipping answer for '{}': {}", "Warning".yellow(), id, e);
        }
    }

    let Some(result) = finish_or_report(&runner)? else {
        return Ok(ExitCode::from(1));
    };
    match output {
        ScoreOutput::Json => println!("{}", JsonReporter::new().pretty().report(&result)),
        ScoreOutput::Quiet => console_reporter(false).report_quiet(&result),
        ScoreOutput::Screen { verbose } => {
            console_reporter(verbose).report(runner.schema(), &result, "")
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_export(config: &Config, output: &Path, format: Option<ExportFormat>) -> Result<ExitCode> {
    let schema = load_schema_reporting(config);
    let session_path = config.session_path();
    let snapshot = load_session(&session_path)?
        .with_context(|| format!("No usable session at {}", session_path.display()))?;
    let restored = restore(schema, &snapshot);
    if restored.dropped > 0 {
        eprintln!(
            "{}: {} saved answer(s) no longer apply to the schema",
            "Warning".yellow(),
            restored.dropped
        );
    }

    let Some(result) = finish_or_report(&restored.runner)? else {
        return Ok(ExitCode::from(1));
    };
    let path = export_target(config, output);
    let written = export_result(
        restored.runner.schema(),
        &result,
        &path,
        format.or(config.export.format),
    )?;
    println!(
        "{}: Exported {:?} result to {}",
        "Done".green().bold(),
        written,
        path.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn run_validate(config: &Config, path: &Path) -> Result<ExitCode> {
    let files = if path.is_dir() {
        let ignore_set = if config.ignore.is_empty() {
            None
        } else {
            Some(build_ignore_set(&config.ignore)?)
        };
        discover_schemas(path, ignore_set.as_ref())
    } else if path.exists() {
        vec![path.to_path_buf()]
    } else {
        anyhow::bail!("Path not found: {}", path.display());
    };

    if files.is_empty() {
        eprintln!("{}: No schema files found in {}", "Warning".yellow(), path.display());
        return Ok(ExitCode::from(2));
    }

    let reports = validate_files(&files);
    let mut failed = 0;
    for report in &reports {
        match &report.outcome {
            Ok(summary) => println!(
                "{} {}: {} ({}) {} phases, {} questions, {} axes",
                "✓".green(),
                report.path.display(),
                summary.title,
                summary.id,
                summary.phases,
                summary.questions,
                summary.axes
            ),
            Err(reason) => {
                failed += 1;
                println!("{} {}: {}", "✗".red(), report.path.display(), reason);
            }
        }
    }

    if reports.len() > 1 {
        println!(
            "\n{} of {} schema files valid",
            reports.len() - failed,
            reports.len()
        );
    }
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn run_init(dir: &Path) -> Result<ExitCode> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let json = r#"{
  "sessionFile": ".mcif-session.json",
  "historyFile": ".mcif-history.json",
  "autosave": true,
  "colors": true,
  "export": {
    "format": "json"
  },
  "ignore": [
    "**/node_modules/**",
    "**/target/**"
  ]
}
"#;

    std::fs::write(&config_path, json)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!(
        "{}: Created {}",
        "Done".green().bold(),
        config_path.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Load the configured schema, telling the user when the built-in one stands in
fn load_schema_reporting(config: &Config) -> Schema {
    let schema_path = config.schema_path();
    let LoadedSchema { schema, source } = load_schema_or_default(schema_path.as_deref());
    match source {
        SchemaSource::Fallback { path, reason } => {
            eprintln!(
                "{}: Could not use schema {} ({}); using the built-in schema",
                "Warning".yellow(),
                path.display(),
                reason
            );
        }
        source => log::debug!("schema '{}' from {}", schema.id, source),
    }
    schema
}

/// Score the runner's answers, or explain what is missing
fn finish_or_report(runner: &QuizRunner) -> Result<Option<QuizResult>> {
    match runner.finish() {
        Ok(result) => Ok(Some(result)),
        Err(QuizError::Incomplete(missing)) => {
            eprintln!(
                "{}: Quiz is incomplete; unanswered: {}",
                "Warning".yellow(),
                missing.join(", ")
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Append to history and return the composite delta against the previous run
fn record_history(config: &Config, result: &QuizResult) -> String {
    let path = config.history_path();
    let mut history = load_history(&path);
    let previous = previous_result(&history, &result.schema_id).map(|run| run.composite);
    let delta = format_delta(previous, result.scores.composite.percent);
    append_run(&mut history, result);
    if let Err(e) = save_history(&path, &history) {
        eprintln!("{}: Failed to save history: {}", "Warning".yellow(), e);
    }
    delta
}

fn console_reporter(verbose: bool) -> ConsoleReporter {
    let mut reporter = ConsoleReporter::new();
    if !colored::control::SHOULD_COLORIZE.should_colorize() {
        reporter = reporter.without_colors();
    }
    if verbose {
        reporter = reporter.verbose();
    }
    reporter
}

/// Relative export paths land in the configured export directory
fn export_target(config: &Config, path: &Path) -> PathBuf {
    match config.export.dir {
        Some(ref dir) if path.is_relative() => Path::new(dir).join(path),
        _ => path.to_path_buf(),
    }
}

fn parse_format(value: Option<&str>) -> Result<Option<ExportFormat>> {
    value
        .map(|v| {
            ExportFormat::parse(v)
                .with_context(|| format!("Unknown export format '{}' (expected json or text)", v))
        })
        .transpose()
}
