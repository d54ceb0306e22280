//! Reading Questions CLI
//!
//! Usage:
//!   reading-questions generate --input <FILE> [OPTIONS]
//!   reading-questions render <TEMPLATE> [--context <FILE>] [--check]
//!
//! Options:
//!   -o, --output <FILE>          Output YAML file (default: questions.yaml)
//!   -d, --difficulty <LEVEL>     beginner, intermediate or advanced
//!   -n, --question-count <N>     Number of questions, 1-20 (default: 8)
//!   -f, --focus <CATEGORY>       Grammar focus, e.g. passé_composé
//!   -v, --verbose                More logging (-vv for debug)

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reading_questions::prompt::{DEFAULT_QUESTIONS, MAX_QUESTIONS, MIN_QUESTIONS};
use reading_questions::{
    generate_questions, AnthropicClient, ApiKey, AppError, Context, Difficulty, GeneratorConfig,
    QuestionRequest, Template, PROMPT_TEMPLATE,
};

#[derive(Parser)]
#[command(name = "reading-questions")]
#[command(about = "Generate French reading-comprehension questions with an LLM")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG is used otherwise
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate questions for a French text
    Generate(GenerateArgs),
    /// Render a template against a TOML context file
    Render(RenderArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// French text file
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the generated questions
    #[arg(short, long, default_value = "questions.yaml")]
    output: PathBuf,

    /// Question difficulty
    #[arg(short, long, value_enum, default_value_t = Difficulty::Intermediate)]
    difficulty: Difficulty,

    /// Number of questions
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_QUESTIONS,
        value_parser = clap::value_parser!(u8).range(i64::from(MIN_QUESTIONS)..=i64::from(MAX_QUESTIONS))
    )]
    question_count: u8,

    /// Grammar point to focus on, e.g. passé_composé or subjonctif
    #[arg(short, long)]
    focus: Option<String>,

    /// Prompt template to use instead of the built-in one
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Generator settings (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API key for the generation service
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Print the rendered prompt instead of calling the service
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct RenderArgs {
    /// Template file
    template: PathBuf,

    /// Context values (TOML table)
    #[arg(short, long)]
    context: Option<PathBuf>,

    /// Report template problems and missing keys on stderr
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => generate(args).await,
        Command::Render(args) => render(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn read_file(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::Input {
            path: path.to_path_buf(),
            source,
        })
}

async fn load_template(path: Option<&Path>) -> Result<Template, AppError> {
    let template = match path {
        Some(path) => {
            info!(path = %path.display(), "loading template");
            Template::parse(read_file(path).await?)
        }
        None => Template::parse(PROMPT_TEMPLATE),
    };

    for diagnostic in template.diagnostics() {
        warn!("template: {}", diagnostic);
    }
    Ok(template)
}

async fn generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };

    info!(path = %args.input.display(), "reading French text");
    let text = read_file(&args.input).await?;
    if text.trim().is_empty() {
        return Err(AppError::EmptyInput { path: args.input });
    }

    let template = load_template(args.template.as_deref()).await?;
    let request = QuestionRequest::new(text)
        .with_difficulty(args.difficulty)
        .with_question_count(args.question_count)
        .with_focus(args.focus);

    if args.dry_run {
        println!("{}", request.render_prompt(&template));
        return Ok(());
    }

    let api_key = args
        .api_key
        .and_then(ApiKey::new)
        .ok_or(AppError::MissingApiKey)?;
    let client = AnthropicClient::new(api_key, config)?;

    info!(
        questions = request.question_count,
        difficulty = %request.difficulty,
        words = request.word_count(),
        focus = request.focus.as_deref().unwrap_or("-"),
        model = %client.config().model,
        "generating questions"
    );
    let questions = generate_questions(&client, &template, &request).await?;

    tokio::fs::write(&args.output, &questions)
        .await
        .map_err(|source| AppError::Output {
            path: args.output.clone(),
            source,
        })?;

    print_summary(&args.input, &args.output, &request);
    Ok(())
}

fn print_summary(input: &Path, output: &Path, request: &QuestionRequest) {
    println!("\n✓ Questions generated successfully!");
    println!("  Output: {}", output.display());
    println!("  Questions: {}", request.question_count);
    println!("  Difficulty: {}", request.difficulty);
    if let Some(focus) = &request.focus {
        println!("  Focus: {}", focus);
    }
    println!("\nNext steps:");
    println!("  1. Read the French text: {}", input.display());
    println!("  2. Answer the questions from: {}", output.display());
    println!("  3. Check your answers against the provided explanations");
}

async fn render(args: RenderArgs) -> Result<(), AppError> {
    let template = Template::parse(read_file(&args.template).await?);
    let ctx = match &args.context {
        Some(path) => Context::from_file(path).map_err(|source| AppError::Context {
            path: path.clone(),
            source,
        })?,
        None => Context::new(),
    };

    if args.check {
        let filename = args.template.display().to_string();
        for diagnostic in template.diagnostics() {
            eprint!("{}", diagnostic.format(template.source(), &filename));
        }
        for key in template.unresolved(&ctx) {
            eprintln!("warning: {}", key);
        }
    }

    print!("{}", template.render(&ctx));
    Ok(())
}
