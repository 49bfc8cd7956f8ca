use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use quotype::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    quote::{FixedQuoteSource, HttpQuoteSource, QuoteSource},
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    theme::ThemeMode,
    TICK_RATE_MS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

/// typing speed test on random quotes
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Fetches a random quote, times how long you take to retype it exactly, and reports your words per minute."
)]
pub struct Cli {
    /// quote service to fetch text from (GET, JSON body with a "quote" field)
    #[clap(short = 'e', long)]
    endpoint: Option<String>,

    /// give up on the quote service after this many seconds
    #[clap(long)]
    timeout_secs: Option<u64>,

    /// type this text instead of fetching a quote
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// colour theme to start with
    #[clap(short = 't', long, value_enum)]
    theme: Option<ThemeMode>,

    /// read settings from this file instead of the default config location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// write logs to a file (defaults to the state directory)
    #[clap(long, num_args = 0..=1, value_name = "PATH")]
    log_file: Option<Option<PathBuf>>,

    /// save the effective settings to the config file and exit
    #[clap(long)]
    write_config: bool,
}

impl Cli {
    /// Command line flags take precedence over the config file
    fn merge(&self, config: Config) -> Config {
        Config {
            endpoint: self.endpoint.clone().unwrap_or(config.endpoint),
            timeout_secs: self.timeout_secs.unwrap_or(config.timeout_secs),
            theme: self.theme.unwrap_or(config.theme),
        }
    }

    fn config_store(&self) -> FileConfigStore {
        self.config
            .as_ref()
            .map(FileConfigStore::with_path)
            .unwrap_or_default()
    }

    fn quote_source(&self, config: &Config) -> Arc<dyn QuoteSource> {
        match &self.prompt {
            Some(prompt) => Arc::new(FixedQuoteSource::new(prompt.clone())),
            None => Arc::new(HttpQuoteSource::new(
                config.endpoint.clone(),
                Duration::from_secs(config.timeout_secs),
            )),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(log_file) = &cli.log_file {
        let path = log_file
            .clone()
            .or_else(AppDirs::log_path)
            .ok_or("could not resolve a log file location")?;
        logging::init(&path)?;
    }

    let store = cli.config_store();
    let config = cli.merge(store.load());

    if cli.write_config {
        store.save(&config)?;
        println!("wrote {}", store.path().display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    tracing::info!(endpoint = %config.endpoint, theme = %config.theme, "starting");
    let source = cli.quote_source(&config);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, source, config.theme);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    source: Arc<dyn QuoteSource>,
    theme: ThemeMode,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    let mut app = App::new(source, theme, runner.sender());
    app.activate();
    terminal.draw(|f| f.render_widget(&app, f.area()))?;

    while !app.should_quit() {
        let event = runner.step();
        if app.handle_event(event) && !app.should_quit() {
            terminal.draw(|f| f.render_widget(&app, f.area()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["quotype"]);

        assert_eq!(cli.endpoint, None);
        assert_eq!(cli.timeout_secs, None);
        assert_eq!(cli.prompt, None);
        assert_eq!(cli.theme, None);
        assert_eq!(cli.log_file, None);
        assert!(!cli.write_config);
    }

    #[test]
    fn test_cli_theme() {
        let cli = Cli::parse_from(["quotype", "-t", "dark"]);
        assert_eq!(cli.theme, Some(ThemeMode::Dark));

        let cli = Cli::parse_from(["quotype", "--theme", "light"]);
        assert_eq!(cli.theme, Some(ThemeMode::Light));
    }

    #[test]
    fn test_cli_custom_prompt() {
        let cli = Cli::parse_from(["quotype", "-p", "hello world"]);
        assert_eq!(cli.prompt, Some("hello world".to_string()));
    }

    #[test]
    fn test_cli_log_file_optional_value() {
        let cli = Cli::parse_from(["quotype", "--log-file"]);
        assert_eq!(cli.log_file, Some(None));

        let cli = Cli::parse_from(["quotype", "--log-file", "/tmp/q.log"]);
        assert_eq!(cli.log_file, Some(Some(PathBuf::from("/tmp/q.log"))));
    }

    #[test]
    fn test_merge_prefers_flags() {
        let cli = Cli::parse_from([
            "quotype",
            "--endpoint",
            "http://localhost/quote",
            "--timeout-secs",
            "2",
        ]);
        let config = Config {
            theme: ThemeMode::Dark,
            ..Config::default()
        };

        let merged = cli.merge(config);
        assert_eq!(merged.endpoint, "http://localhost/quote");
        assert_eq!(merged.timeout_secs, 2);
        assert_eq!(merged.theme, ThemeMode::Dark);
    }

    #[test]
    fn test_merge_keeps_config_without_flags() {
        let cli = Cli::parse_from(["quotype"]);
        assert_eq!(cli.merge(Config::default()), Config::default());
    }

    #[test]
    fn test_prompt_uses_fixed_source() {
        let cli = Cli::parse_from(["quotype", "-p", "offline text"]);
        let source = cli.quote_source(&Config::default());
        assert_eq!(source.fetch_random_quote().unwrap(), "offline text");
    }
}
