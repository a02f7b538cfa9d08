#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use super::repl::help_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::models::DocumentInput;
use crate::domain::models::LanguageSelection;
use crate::domain::models::SummarizationLevel;

/// What the binary should do once configuration is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Run {
    Analyze {
        document: DocumentInput,
        save_history: Option<path::PathBuf>,
    },
    Chat {
        document: Option<DocumentInput>,
    },
    Citations {
        document: DocumentInput,
    },
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!(
        "Created default config file at {}",
        config_file_path.display()
    );
    return Ok(());
}

async fn read_stdin() -> Result<String> {
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    return Ok(text);
}

/// Resolves where the case text comes from. `None` when neither a document
/// nor text was given.
pub fn document_input(matches: &ArgMatches) -> Option<DocumentInput> {
    if let Ok(Some(document)) = matches.try_get_one::<String>("document") {
        return Some(DocumentInput::File(path::PathBuf::from(document)));
    }

    if let Ok(Some(text)) = matches.try_get_one::<String>("text") {
        return Some(DocumentInput::Text(text.to_string()));
    }

    return None;
}

/// `--save-history` without a value falls back to the configured history
/// file.
fn save_history_path(matches: &ArgMatches) -> Option<path::PathBuf> {
    let file_path = matches.get_one::<String>("save-history")?;
    if file_path.is_empty() {
        return Some(path::PathBuf::from(Config::get(ConfigKey::HistoryFile)));
    }

    return Some(path::PathBuf::from(file_path));
}

fn arg_document() -> Arg {
    return Arg::new("document")
        .short('d')
        .long("document")
        .num_args(1)
        .help("Path to a legal document. PDF, DOCX and plain text files are supported.");
}

fn arg_text() -> Arg {
    return Arg::new("text")
        .long("text")
        .num_args(1)
        .help("Case text to analyze instead of a document.");
}

fn document_group(required: bool) -> ArgGroup {
    return ArgGroup::new("input")
        .args(["document", "text"])
        .required(required);
}

fn subcommand_analyze() -> Command {
    return Command::new("analyze")
        .about("Summarizes a legal document and lists its citations. Reads the case text from stdin when no document or text is given.")
        .arg(arg_document())
        .arg(arg_text())
        .group(document_group(false))
        .arg(
            Arg::new("save-history")
                .long("save-history")
                .num_args(0..=1)
                .default_missing_value("")
                .help(format!(
                    "Saves the chat history once the analysis is done. [default: {}]",
                    Config::default(ConfigKey::HistoryFile)
                )),
        );
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start a chat session, optionally analyzing a document first.")
        .arg(arg_document())
        .arg(arg_text())
        .group(document_group(false));
}

fn subcommand_citations() -> Command {
    return Command::new("citations")
        .about("Lists the legal citations found in a document with search links.")
        .arg(arg_document())
        .arg(arg_text())
        .group(document_group(true));
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn arg_backend() -> Arg {
    return Arg::new(ConfigKey::Backend.to_string())
        .short('b')
        .long(ConfigKey::Backend.to_string())
        .env("CASENOTE_BACKEND")
        .num_args(1)
        .help(format!(
            "The backend hosting the chat model. [default: {}]",
            Config::default(ConfigKey::Backend)
        ))
        .value_parser(PossibleValuesParser::new(BackendName::VARIANTS))
        .global(true);
}

fn arg_backend_health_check_timeout() -> Arg {
    return Arg::new(ConfigKey::BackendHealthCheckTimeout.to_string())
        .long(ConfigKey::BackendHealthCheckTimeout.to_string())
        .env("CASENOTE_BACKEND_HEALTH_CHECK_TIMEOUT")
        .num_args(1)
        .help(
            format!("Time to wait in milliseconds before timing out when doing a healthcheck for a backend. [default: {}]", Config::default(ConfigKey::BackendHealthCheckTimeout)),
        )
        .global(true);
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("CASENOTE_MODEL")
        .num_args(1)
        .help("The model on the backend to consume. Defaults to gemini-1.5-flash for Gemini and gpt-3.5-turbo for OpenAI.")
        .global(true);
}

fn arg_language() -> Arg {
    return Arg::new(ConfigKey::Language.to_string())
        .short('l')
        .long(ConfigKey::Language.to_string())
        .env("CASENOTE_LANGUAGE")
        .num_args(1)
        .help(format!(
            "Language the case text is written in. [default: {}]",
            Config::default(ConfigKey::Language)
        ))
        .value_parser(PossibleValuesParser::new(LanguageSelection::VARIANTS))
        .global(true);
}

fn arg_summarization_level() -> Arg {
    return Arg::new(ConfigKey::SummarizationLevel.to_string())
        .long(ConfigKey::SummarizationLevel.to_string())
        .env("CASENOTE_SUMMARIZATION_LEVEL")
        .num_args(1)
        .help(format!(
            "How detailed English summaries should be. [default: {}]",
            Config::default(ConfigKey::SummarizationLevel)
        ))
        .value_parser(PossibleValuesParser::new(SummarizationLevel::VARIANTS))
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("casenote")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_analyze())
        .subcommand(subcommand_chat())
        .subcommand(subcommand_citations())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .arg(arg_backend())
        .arg(arg_backend_health_check_timeout())
        .arg(arg_model())
        .arg(arg_language())
        .arg(arg_summarization_level())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("CASENOTE_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::HistoryFile.to_string())
                .long(ConfigKey::HistoryFile.to_string())
                .env("CASENOTE_HISTORY_FILE")
                .num_args(1)
                .help(format!("Default file chat history is saved to and loaded from. [default: {}]", Config::default(ConfigKey::HistoryFile)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::TranslationMaxLength.to_string())
                .long(ConfigKey::TranslationMaxLength.to_string())
                .env("CASENOTE_TRANSLATION_MAX_LENGTH")
                .num_args(1)
                .help(format!("Maximum number of characters sent to the translator in a single request. [default: {}]", Config::default(ConfigKey::TranslationMaxLength)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GeminiToken.to_string())
                .long(ConfigKey::GeminiToken.to_string())
                .env("CASENOTE_GEMINI_TOKEN")
                .num_args(1)
                .help("Google Gemini API token when using the Gemini backend.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OpenAiURL.to_string())
                .long(ConfigKey::OpenAiURL.to_string())
                .env("CASENOTE_OPENAI_URL")
                .num_args(1)
                .help(format!("OpenAI API URL when using the OpenAI backend. Can be swapped to a compatible proxy. [default: {}]", Config::default(ConfigKey::OpenAiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OpenAiToken.to_string())
                .long(ConfigKey::OpenAiToken.to_string())
                .env("CASENOTE_OPENAI_TOKEN")
                .num_args(1)
                .help("OpenAI API token when using the OpenAI backend.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::TranslatorURL.to_string())
                .long(ConfigKey::TranslatorURL.to_string())
                .env("CASENOTE_TRANSLATOR_URL")
                .num_args(1)
                .help(format!("Google Cloud Translation API URL. [default: {}]", Config::default(ConfigKey::TranslatorURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::TranslatorToken.to_string())
                .long(ConfigKey::TranslatorToken.to_string())
                .env("CASENOTE_TRANSLATOR_TOKEN")
                .num_args(1)
                .help("Google Cloud Translation API key, used for non-English documents and language detection.")
                .global(true),
        );
}

/// Parses arguments, loads configuration and handles the subcommands that
/// finish immediately. Returns what is left to run, if anything.
pub async fn parse() -> Result<Option<Run>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("analyze", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            let document = match document_input(subcmd_matches) {
                Some(document) => document,
                None => DocumentInput::Text(read_stdin().await?),
            };

            return Ok(Some(Run::Analyze {
                document,
                save_history: save_history_path(subcmd_matches),
            }));
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(Run::Chat {
                document: document_input(subcmd_matches),
            }));
        }
        Some(("citations", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            match document_input(subcmd_matches) {
                Some(document) => return Ok(Some(Run::Citations { document })),
                None => bail!("A document or text is required"),
            }
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        _ => {
            Config::load(build(), vec![&matches]).await?;
            return Ok(Some(Run::Chat { document: None }));
        }
    }
}
