#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;

use std::io::IsTerminal;
use std::io::Write;
use std::path;

use anyhow::bail;
use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Password;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use yansi::Paint;

use super::cli::Run;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;
use crate::domain::models::DocumentInput;
use crate::domain::models::Event;
use crate::domain::models::LanguageSelection;
use crate::domain::models::SlashCommand;
use crate::domain::models::SummarizationLevel;
use crate::domain::models::TranslatorBox;
use crate::domain::services::CaseReport;
use crate::domain::services::CaseSession;
use crate::domain::services::Citations;
use crate::domain::services::ChunkedTranslator;
use crate::domain::services::LegalAssistant;
use crate::infrastructure::backends::BackendManager;
use crate::infrastructure::documents::DocumentLoader;
use crate::infrastructure::translators::TranslatorManager;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /save [PATH] (/s) - Saves the chat history as JSON. Defaults to the configured history file.
- /load [PATH] (/l) - Replaces the chat history with one saved earlier.
- /clear - Clears the chat history.
- /history - Prints the chat history.
- /citations (/c) - Lists the citations found in the analyzed document.
- /feedback yes|no [COMMENT] (/f) - Tells us whether the last answer was helpful.
- /help (/h) - Prints this message.
- /quit (/q) - Ends the session. The chat history is discarded unless saved.

Anything else is sent to the assistant as a question about the case.
    "#;

    return text.trim().to_string();
}

fn token_key(name: &BackendName) -> ConfigKey {
    match name {
        BackendName::Gemini => return ConfigKey::GeminiToken,
        BackendName::OpenAI => return ConfigKey::OpenAiToken,
    }
}

/// Makes sure the selected backend has an API key, prompting for one with
/// hidden input when running interactively.
fn ensure_api_key(name: &BackendName) -> Result<bool> {
    let key = token_key(name);
    if !Config::get(key).is_empty() {
        return Ok(true);
    }

    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }

    let token = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your API key")
        .allow_empty_password(true)
        .interact()?;

    let token = token.trim();
    if token.is_empty() {
        return Ok(false);
    }

    Config::set(key, token);
    return Ok(true);
}

pub fn format_event(event: &Event) -> String {
    match event {
        Event::Error(err) => return Paint::red(err.to_string()).to_string(),
        Event::Warning(msg) => return Paint::yellow(msg).to_string(),
        Event::Success(msg) => return Paint::green(msg).to_string(),
    }
}

pub fn format_report(report: &CaseReport, level: SummarizationLevel) -> String {
    let mut sections: Vec<String> = vec![];

    if let Some(translated_text) = &report.translated_text {
        sections.push(format!("Translated Case Text: {translated_text}"));
    }

    if let Some(translated_summary) = &report.translated_summary {
        sections.push(format!("Case Summary (Translated): {translated_summary}"));
    } else if report.translated_text.is_some() {
        sections.push(format!("Case Summary: {}", report.summary));
    } else {
        sections.push(format!("Case Summary ({level}): {}", report.summary));
    }

    sections.push(Citations::format(&report.citations));

    return sections.join("\n\n");
}

/// Drives a case session from terminal input. Output is returned as text
/// rather than printed so the loop stays testable.
pub struct Repl {
    session: CaseSession,
    events: mpsc::UnboundedReceiver<Event>,
    citations: Option<Vec<String>>,
}

impl Repl {
    pub fn new(backend: BackendBox, translator: TranslatorBox, max_length: usize) -> Result<Repl> {
        let (tx, events) = mpsc::unbounded_channel::<Event>();
        let session = CaseSession::new(
            LegalAssistant::new(backend),
            ChunkedTranslator::new(translator, max_length)?,
            tx,
        );

        return Ok(Repl {
            session,
            events,
            citations: None,
        });
    }

    /// Notices queued by the session since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        let mut events = vec![];
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }

        return events;
    }

    pub async fn analyze(
        &mut self,
        case_text: &str,
        selection: LanguageSelection,
        level: SummarizationLevel,
    ) -> Result<Option<String>> {
        let report = self.session.analyze(case_text, selection, level).await?;

        return Ok(report.map(|report| {
            self.citations = Some(report.citations.clone());
            return format_report(&report, level);
        }));
    }

    fn render_history(&self) -> String {
        let messages = self.session.assistant().history().all();
        if messages.is_empty() {
            return "No chat history yet.".to_string();
        }

        return messages
            .iter()
            .map(|message| return format!("{}: {}", message.role().to_string(), message.content()))
            .collect::<Vec<String>>()
            .join("\n\n");
    }

    fn feedback(&self, command: &SlashCommand) -> String {
        let helpful = match command.path_arg().map(|e| return e.to_lowercase()) {
            Some(answer) if answer == "yes" || answer == "y" => true,
            Some(answer) if answer == "no" || answer == "n" => false,
            _ => return "Usage: /feedback yes|no [COMMENT]".to_string(),
        };

        let comment = command.args[1..].join(" ");
        tracing::info!(helpful = helpful, comment = %comment, "Feedback received");

        if !helpful && comment.is_empty() {
            return "Thank you for your feedback! Add a comment after /feedback no to tell us how we can improve.".to_string();
        }

        return "Thank you for your feedback!".to_string();
    }

    fn history_path(command: &SlashCommand) -> path::PathBuf {
        if let Some(file_path) = command.path_arg() {
            return path::PathBuf::from(file_path);
        }

        return path::PathBuf::from(Config::get(ConfigKey::HistoryFile));
    }

    /// Handles one line of input. Returns `None` once the user asks to quit.
    pub async fn handle_line(&mut self, line: &str) -> Result<Option<String>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Some("".to_string()));
        }

        if let Some(command) = SlashCommand::parse(line) {
            if command.is_quit() {
                return Ok(None);
            }

            if command.is_save() {
                self.session
                    .save_history(&Repl::history_path(&command))
                    .await?;
                return Ok(Some("".to_string()));
            }

            if command.is_load() {
                self.session
                    .load_history(&Repl::history_path(&command))
                    .await?;
                return Ok(Some("".to_string()));
            }

            if command.is_clear() {
                self.session.clear_history();
                return Ok(Some("Chat history cleared.".to_string()));
            }

            if command.is_history() {
                return Ok(Some(self.render_history()));
            }

            if command.is_citations() {
                match &self.citations {
                    Some(citations) => return Ok(Some(Citations::format(citations))),
                    None => return Ok(Some("No document has been analyzed yet.".to_string())),
                }
            }

            if command.is_feedback() {
                return Ok(Some(self.feedback(&command)));
            }

            if command.is_help() {
                return Ok(Some(help_text()));
            }
        }

        let answer = self.session.ask(line).await?;
        if answer.is_empty() {
            return Ok(Some("".to_string()));
        }

        return Ok(Some(format!("Answer: {answer}")));
    }

    pub async fn save_history(&self, file_path: &path::Path) -> Result<()> {
        return self.session.save_history(file_path).await;
    }

    pub fn end(self) {
        self.session.end();
    }
}

fn print_output(repl: &mut Repl, output: &str) {
    for event in repl.take_events() {
        eprintln!("{}", format_event(&event));
    }

    if !output.is_empty() {
        println!("{output}\n");
    }
}

fn selection_from_config() -> Result<(LanguageSelection, SummarizationLevel)> {
    let selection = LanguageSelection::parse(&Config::get(ConfigKey::Language))?;
    let level = SummarizationLevel::parse(&Config::get(ConfigKey::SummarizationLevel))
        .unwrap_or(SummarizationLevel::Brief);

    return Ok((selection, level));
}

async fn print_citations(document: DocumentInput) -> Result<()> {
    let case_text = DocumentLoader::load(document).await?;
    println!("{}", Citations::format(&Citations::find(&case_text)));

    return Ok(());
}

async fn build_repl() -> Result<Option<Repl>> {
    let backend_name = match BackendName::parse(Config::get(ConfigKey::Backend)) {
        Some(backend_name) => backend_name,
        None => bail!(format!(
            "Unknown backend '{}'",
            Config::get(ConfigKey::Backend)
        )),
    };

    if !ensure_api_key(&backend_name)? {
        eprintln!("{}", Paint::yellow("Please enter your API key."));
        return Ok(None);
    }

    let backend = BackendManager::get(backend_name)?;
    if let Err(err) = backend.health_check().await {
        tracing::warn!(error = ?err, backend = %backend.name(), "Backend health check failed");
        eprintln!(
            "{}",
            Paint::yellow(format!("Backend health check failed: {err}"))
        );
    }

    let max_length = Config::get(ConfigKey::TranslationMaxLength).parse::<usize>()?;
    let repl = Repl::new(backend, TranslatorManager::get(), max_length)?;

    return Ok(Some(repl));
}

async fn analyze_document(repl: &mut Repl, document: DocumentInput) -> Result<()> {
    let (selection, level) = selection_from_config()?;
    let case_text = DocumentLoader::load(document).await?;
    let output = repl.analyze(&case_text, selection, level).await?;
    print_output(repl, &output.unwrap_or_default());

    return Ok(());
}

async fn chat(repl: &mut Repl, document: Option<DocumentInput>) -> Result<()> {
    println!("Welcome! This assistant helps you analyze and interact with legal cases.");
    println!("Type /help for the list of commands.\n");

    if let Some(document) = document {
        if let Err(err) = analyze_document(repl, document).await {
            eprintln!("{}", Paint::red(format!("Failed to analyze document: {err:#}")));
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", Paint::cyan(">").bold());
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };

        match repl.handle_line(&line).await? {
            Some(output) => print_output(repl, &output),
            None => break,
        }
    }

    return Ok(());
}

async fn analyze_once(
    repl: &mut Repl,
    document: DocumentInput,
    save_history: Option<path::PathBuf>,
) -> Result<()> {
    analyze_document(repl, document).await?;

    if let Some(file_path) = save_history {
        repl.save_history(&file_path).await?;
        print_output(repl, "");
    }

    return Ok(());
}

pub async fn start(run: Run) -> Result<()> {
    match run {
        Run::Citations { document } => return print_citations(document).await,
        Run::Analyze {
            document,
            save_history,
        } => {
            let mut repl = match build_repl().await? {
                Some(repl) => repl,
                None => return Ok(()),
            };
            let res = analyze_once(&mut repl, document, save_history).await;
            repl.end();
            return res;
        }
        Run::Chat { document } => {
            let mut repl = match build_repl().await? {
                Some(repl) => repl,
                None => return Ok(()),
            };
            let res = chat(&mut repl, document).await;
            repl.end();
            return res;
        }
    }
}
