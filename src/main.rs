// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use tixobot::app_config::{self, Config, LlmProvider};
use tixobot::assistant::{Assistant, Conversation, LlmService};
use tixobot::{FaqCatalog, Language};

/// CLI Wrapper for LlmProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLlmProvider {
    OpenAI,
    Anthropic,
    Ollama,
    LMStudio,
}

impl From<CliLlmProvider> for LlmProvider {
    fn from(cli_provider: CliLlmProvider) -> Self {
        match cli_provider {
            CliLlmProvider::OpenAI => LlmProvider::OpenAI,
            CliLlmProvider::Anthropic => LlmProvider::Anthropic,
            CliLlmProvider::Ollama => LlmProvider::Ollama,
            CliLlmProvider::LMStudio => LlmProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a single message and exit
    Ask {
        /// The customer's message
        #[arg(value_name = "MESSAGE", required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Start an interactive chat session (default command)
    Chat {
        /// Continue a conversation saved with /save
        #[arg(long, value_name = "FILE")]
        resume: Option<PathBuf>,
    },

    /// List the FAQ catalog
    Faqs {
        /// Only list entries in this language
        #[arg(long = "only", value_name = "LANG")]
        only: Option<Language>,
    },

    /// Show the FAQ engine's best match for an utterance
    Match {
        /// The utterance to look up
        #[arg(value_name = "UTTERANCE", required = true, num_args = 1..)]
        utterance: Vec<String>,
    },

    /// Check that the configured LLM provider is reachable
    Check,

    /// Generate shell completions for tixobot
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// tixobot - Tix.do customer support assistant
///
/// Answers questions about Tix.do events and tickets in Spanish or English from
/// an FAQ catalog, with an optional LLM fallback.
#[derive(Parser, Debug)]
#[command(name = "tixobot")]
#[command(version)]
#[command(about = "Bilingual FAQ support assistant for Tix.do")]
#[command(long_about = "tixobot answers customer questions about Tix.do from an FAQ catalog, falling back to an LLM when no FAQ fits.

EXAMPLES:
    tixobot                                     # Interactive chat using conf.json
    tixobot ask \"¿Cómo compro entradas?\"        # One-shot answer
    tixobot --lang en ask \"How do I buy tickets?\"
    tixobot match \"como compro entradas\"        # Show the FAQ match and confidence
    tixobot faqs --only en                      # List the English FAQs
    tixobot -p ollama -m llama3.2:3b chat       # Use a local model for the fallback
    tixobot completions bash > tixobot.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. OPENAI_API_KEY and ANTHROPIC_API_KEY fill in
    missing API keys.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    ollama    - Local Ollama server (default: llama3.2:3b)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: PathBuf,

    /// Conversation language code (e.g., 'es', 'en')
    #[arg(long = "lang", global = true)]
    language: Option<Language>,

    /// LLM provider to use for the fallback
    #[arg(short, long, global = true, value_enum)]
    provider: Option<CliLlmProvider>,

    /// Model name to use for the fallback
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Disable the LLM fallback
    #[arg(long, global = true)]
    no_llm: bool,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("[x]", "1;31"),
            Level::Warn => ("[!]", "1;33"),
            Level::Info => ("   ", "1;32"),
            Level::Debug => ("[?]", "1;36"),
            Level::Trace => ("[.]", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (marker, color) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, marker, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger with the most verbose level; the effective level
    // is applied with set_max_level once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "tixobot", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd_log_level) = &cli.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let config = load_config(&cli)?;

    if cli.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    match cli.command {
        Some(Commands::Ask { message }) => run_ask(&config, &message.join(" "), cli.language).await,
        Some(Commands::Faqs { only }) => run_faqs(&config, only),
        Some(Commands::Match { utterance }) => run_match(&config, &utterance.join(" "), cli.language),
        Some(Commands::Check) => run_check(&config).await,
        Some(Commands::Chat { resume }) => run_chat(&config, cli.language, resume).await,
        None => run_chat(&config, cli.language, None).await,
        Some(Commands::Completions { .. }) => Ok(()),
    }
}

/// Load or create the configuration and apply environment and CLI overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config_path)?;
    config.apply_env_overrides();

    if let Some(provider) = &cli.provider {
        config.llm.provider = provider.clone().into();
    }

    if let Some(model) = &cli.model {
        match config.llm.get_active_provider_config_mut() {
            Some(provider_config) => provider_config.model = model.clone(),
            None => warn!(
                "No provider entry for {} in config; ignoring --model",
                config.llm.provider.display_name()
            ),
        }
    }

    if cli.no_llm {
        config.llm.enabled = false;
    }

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn build_assistant(config: &Config) -> Result<Assistant> {
    let assistant = Assistant::from_config(config).context("Failed to initialize the assistant")?;
    if !assistant.has_llm() && config.llm.enabled {
        warn!("Running in limited mode: answers come from the FAQ catalog and canned replies only");
    }
    Ok(assistant)
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message("...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

async fn run_ask(config: &Config, message: &str, language: Option<Language>) -> Result<()> {
    let assistant = build_assistant(config)?;
    let spinner = thinking_spinner();
    let reply = assistant.respond(message, language).await;
    spinner.finish_and_clear();

    info!("Answered via {}", reply.source);
    println!("{}", reply.text);
    Ok(())
}

fn run_faqs(config: &Config, only: Option<Language>) -> Result<()> {
    let catalog = match &config.matching.catalog_path {
        Some(path) => FaqCatalog::load(path)?,
        None => FaqCatalog::builtin(),
    };

    let mut shown = 0;
    for entry in catalog.iter().filter(|e| only.is_none_or(|l| e.language() == l)) {
        println!("[{}] {}\n     {}\n", entry.language(), entry.question(), entry.answer());
        shown += 1;
    }
    info!("{} of {} FAQ entries", shown, catalog.len());
    Ok(())
}

fn run_match(config: &Config, utterance: &str, language: Option<Language>) -> Result<()> {
    let assistant = build_assistant(config)?;
    let result = assistant.find_faq(utterance, language);
    println!("{}", serde_json::to_string_pretty(&result)?);
    if result.is_trusted(config.matching.trust_threshold) {
        info!("The assistant would answer with this FAQ");
    }
    Ok(())
}

async fn run_check(config: &Config) -> Result<()> {
    let service = LlmService::from_config(&config.llm)
        .ok_or_else(|| anyhow!("The LLM fallback is disabled or missing an API key"))?;

    let spinner = thinking_spinner();
    let result = service.test_connection().await;
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            info!("{} is reachable with model {}", config.llm.provider.display_name(), service.model());
            Ok(())
        }
        Err(e) => {
            error!("{} connection failed: {}", config.llm.provider.display_name(), e);
            Err(anyhow!("Failed to connect to {}: {}", config.llm.provider.display_name(), e))
        }
    }
}

async fn run_chat(config: &Config, language: Option<Language>, resume: Option<PathBuf>) -> Result<()> {
    let assistant = build_assistant(config)?;
    let mut language = language.unwrap_or(assistant.default_language());

    if let Some(path) = resume {
        let conversation = Conversation::load(&path);
        info!("Resuming conversation {} ({} turns)", conversation.id(), conversation.len());
        assistant.restore_conversation(conversation);
    }

    println!("{}: {}", assistant.name(), assistant.welcome_message(Some(language)));
    println!("(/lang es|en, /reset, /save <file>, /quit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let (name, argument) = command.split_once(' ').unwrap_or((command, ""));
            match name {
                "quit" | "exit" => break,
                "reset" => {
                    assistant.reset();
                    println!("{}: {}", assistant.name(), assistant.welcome_message(Some(language)));
                }
                "lang" => match argument.trim().parse::<Language>() {
                    Ok(new_language) => {
                        language = new_language;
                        info!("Conversation language set to {}", language.name());
                    }
                    Err(e) => warn!("{}", e),
                },
                "save" if !argument.trim().is_empty() => match assistant.save_conversation(argument.trim()) {
                    Ok(()) => info!("Conversation saved to {}", argument.trim()),
                    Err(e) => error!("{:#}", e),
                },
                _ => warn!("Unknown command: /{}", command),
            }
            continue;
        }

        let spinner = thinking_spinner();
        let reply = assistant.respond(line, Some(language)).await;
        spinner.finish_and_clear();
        println!("{}: {}", assistant.name(), reply.text);
    }

    Ok(())
}
