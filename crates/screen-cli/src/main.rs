use clap::{Parser, Subcommand, ValueEnum};
use component_screen::{render_json_ui, render_text};
use screen_spec::{AnswerMap, QuestionnaireSpec, ScreenValidationResult, check_questionnaire};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "INTAKE_LOG";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Intake screen validation CLI",
    long_about = "Validates answers, checks completeness and renders screens of an intake questionnaire"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run submit validation for one screen.
    Validate {
        /// Path to the questionnaire JSON.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        /// Screen id within the questionnaire.
        #[arg(long, value_name = "SCREEN")]
        screen: String,
        /// Answers file (JSON, or a CBOR snapshot when it ends in .cbor).
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Report whether every visible required field is answered.
    Complete {
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        #[arg(long, value_name = "SCREEN")]
        screen: String,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Validate a single field the way a blur event does.
    Field {
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        #[arg(long, value_name = "SCREEN")]
        screen: String,
        /// Field id, looked up anywhere in the screen's field tree.
        #[arg(long, value_name = "FIELD")]
        field: String,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Render a screen for the current answers.
    Render {
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        #[arg(long, value_name = "SCREEN")]
        screen: String,
        /// Optional answers file; defaults to no answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Show submit errors next to their fields.
        #[arg(long)]
        with_errors: bool,
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Run authoring checks over a questionnaire.
    Check {
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
    },
    /// Print the JSON Schema of the questionnaire format.
    Schema,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> CliResult<()> {
    match command {
        Command::Validate {
            spec,
            screen,
            answers,
        } => run_validate(&spec, &screen, &answers),
        Command::Complete {
            spec,
            screen,
            answers,
        } => run_complete(&spec, &screen, &answers),
        Command::Field {
            spec,
            screen,
            field,
            answers,
        } => run_field(&spec, &screen, &field, &answers),
        Command::Render {
            spec,
            screen,
            answers,
            with_errors,
            format,
        } => run_render(&spec, &screen, answers.as_deref(), with_errors, format),
        Command::Check { spec } => run_check(&spec),
        Command::Schema => run_schema(),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_spec(path: &Path) -> CliResult<QuestionnaireSpec> {
    let contents = fs::read_to_string(path)?;
    let spec = QuestionnaireSpec::from_json(&contents)?;
    tracing::debug!(path = %path.display(), screens = spec.screens.len(), "questionnaire loaded");
    Ok(spec)
}

fn load_answers(path: &Path) -> CliResult<AnswerMap> {
    if is_cbor(path) {
        let bytes = fs::read(path)?;
        return Ok(AnswerMap::from_cbor(&bytes)?);
    }
    let contents = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;
    if !value.is_object() {
        return Err(format!("answers in {} must be a JSON object", path.display()).into());
    }
    Ok(AnswerMap::from_value(value))
}

fn is_cbor(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("cbor"))
}

fn run_validate(spec_path: &Path, screen_id: &str, answers_path: &Path) -> CliResult<()> {
    let spec = load_spec(spec_path)?;
    let screen = spec.require_screen(screen_id)?;
    let answers = load_answers(answers_path)?;

    let result = screen.validate(&answers);
    println!(
        "Validation result: {}",
        if result.all_valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.all_valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ScreenValidationResult) {
    if result.errors.is_empty() {
        return;
    }
    println!("Errors:");
    for (field_id, message) in result.errors.iter() {
        println!("  {} - {}", field_id, message);
    }
}

fn run_complete(spec_path: &Path, screen_id: &str, answers_path: &Path) -> CliResult<()> {
    let spec = load_spec(spec_path)?;
    let screen = spec.require_screen(screen_id)?;
    let answers = load_answers(answers_path)?;

    let progress = screen.progress(&answers);
    println!(
        "{} ({}/{})",
        if screen.is_complete(&answers) {
            "complete"
        } else {
            "incomplete"
        },
        progress.answered,
        progress.total
    );
    Ok(())
}

fn run_field(
    spec_path: &Path,
    screen_id: &str,
    field_id: &str,
    answers_path: &Path,
) -> CliResult<()> {
    let spec = load_spec(spec_path)?;
    let screen = spec.require_screen(screen_id)?;
    let answers = load_answers(answers_path)?;

    match screen.validate_field(field_id, &answers) {
        Some(message) => println!("{}: {}", field_id, message),
        None => println!("{}: ok", field_id),
    }
    Ok(())
}

fn run_render(
    spec_path: &Path,
    screen_id: &str,
    answers_path: Option<&Path>,
    with_errors: bool,
    format: RenderMode,
) -> CliResult<()> {
    let spec_json = fs::read_to_string(spec_path)?;
    let answers = match answers_path {
        Some(path) => load_answers(path)?,
        None => AnswerMap::new(),
    };
    let errors_json = if with_errors {
        let spec = QuestionnaireSpec::from_json(&spec_json)?;
        let screen = spec.require_screen(screen_id)?;
        serde_json::to_string(&screen.validate(&answers).errors)?
    } else {
        String::new()
    };

    let config = json!({ "questionnaire_json": spec_json }).to_string();
    let answers_json = serde_json::to_string(&answers)?;
    let output = match format {
        RenderMode::Text => render_text(&config, screen_id, &answers_json, &errors_json),
        RenderMode::Json => {
            let value: serde_json::Value =
                serde_json::from_str(&render_json_ui(&config, screen_id, &answers_json, &errors_json))?;
            serde_json::to_string_pretty(&value)?
        }
    };
    println!("{}", output);
    Ok(())
}

fn run_check(spec_path: &Path) -> CliResult<()> {
    let spec = load_spec(spec_path)?;
    check_questionnaire(&spec)?;
    println!(
        "Schema OK: {} ({} screens)",
        spec.id,
        spec.screens.len()
    );
    Ok(())
}

fn run_schema() -> CliResult<()> {
    let schema = schemars::schema_for!(QuestionnaireSpec);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
