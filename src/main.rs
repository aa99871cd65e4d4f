mod app;
mod assets;
mod config;
mod debounce;
mod filter;
mod loader;
mod logging;
mod ui;
mod view;

use app::{App, InputMode, LoadState};
use assets::Assets;
use clap::Parser;
use config::Config;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use filter::Facet;
use loader::Source;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Browse a people directory published as CSV
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// CSV source: an http(s) URL or a local file path
    #[arg(short, long)]
    source: Option<String>,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding assets/flags/*.svg and the placeholder image
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Quiet period before search input is applied
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Where to write the log (defaults to the cache directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

/// How often the loop wakes up to check the search debounce.
const TICK: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(source) = cli.source {
        config.source = source;
    }
    if let Some(ms) = cli.debounce_ms {
        config.debounce_ms = ms;
    }
    if let Some(dir) = cli.assets {
        config.assets_dir = Some(dir);
    }

    let log_path = match cli.log_file {
        Some(p) => p,
        None => config::project_dirs()?.cache_dir().join("people-directory.log"),
    };
    logging::init_file_logger(&log_path, cli.verbose)?;
    tracing::info!("starting people-directory with source {}", config.source);

    let source: Source = config.source.parse()?;
    let mut app = App::new(
        source,
        config.timeout(),
        config.debounce(),
        Assets::new(config.assets_dir.clone()),
    );

    // Init terminal
    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    app.update_page_size(size.height);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    ratatui::restore();

    if let Err(e) = result {
        tracing::error!("exiting on error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            app.cancel_load();
            return Ok(());
        }

        // Startup or retry: the fetch runs in the background while keys
        // are still read below.
        app.start_load();
        if app.poll_load().await {
            continue;
        }

        if app.tick(Instant::now()) {
            continue;
        }

        if crossterm::event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    handle_key(app, key);
                }
                Event::Resize(_, height) => {
                    app.update_page_size(height);
                }
                _ => {}
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Help toggle (global)
    if key.code == KeyCode::Char('?') && app.input_mode == InputMode::Normal {
        app.show_help = !app.show_help;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match app.load_state {
        LoadState::Loading => {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                app.should_quit = true;
            }
        }
        LoadState::Failed(_) => handle_failed_key(app, key),
        LoadState::Ready => {
            if app.input_mode == InputMode::Editing {
                handle_search_input(app, key);
            } else if app.picker.is_some() {
                handle_picker_key(app, key);
            } else {
                handle_list_key(app, key);
            }
        }
    }
}

fn handle_failed_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => {
            tracing::info!("retrying load on user request");
            app.begin_reload();
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
        }
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            app.finish_search();
        }
        KeyCode::Backspace => {
            app.pop_search_char(Instant::now());
        }
        KeyCode::Char(c) => {
            app.push_search_char(c, Instant::now());
        }
        _ => {}
    }
}

fn handle_picker_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
            app.close_picker();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.picker_next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.picker_prev();
        }
        KeyCode::Char(' ') => {
            app.picker_toggle();
        }
        _ => {}
    }
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('/') => {
            app.start_search();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_prev();
        }
        KeyCode::PageDown => {
            app.select_page_down();
        }
        KeyCode::PageUp => {
            app.select_page_up();
        }
        KeyCode::Char('g') => {
            app.select_first();
        }
        KeyCode::Char('G') => {
            app.select_last();
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            app.toggle_expand();
        }
        KeyCode::Char('c') => {
            app.open_picker(Facet::Country);
        }
        KeyCode::Char('t') => {
            app.open_picker(Facet::Category);
        }
        KeyCode::Char('x') => {
            app.clear_filters();
        }
        KeyCode::Esc => {
            if !app.criteria.is_empty() || !app.search_input.is_empty() {
                app.clear_filters();
            }
        }
        KeyCode::Char('o') => {
            if let Some(link) = app.profile_link() {
                open_link(app, &link);
            }
        }
        KeyCode::Char('w') => {
            if let Some(link) = app.company_link() {
                open_link(app, &link);
            }
        }
        _ => {}
    }
}

fn open_link(app: &mut App, link: &str) {
    let spawned = if cfg!(target_os = "macos") {
        std::process::Command::new("open").arg(link).spawn()
    } else if cfg!(target_os = "windows") {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", link])
            .spawn()
    } else {
        std::process::Command::new("xdg-open").arg(link).spawn()
    };
    match spawned {
        Ok(_) => app.status_msg = format!("Opening: {}", link),
        Err(e) => {
            tracing::warn!("could not open {}: {}", link, e);
            app.status_msg = format!("Link: {} (no opener available)", link);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{LoadError, ParsedDataset, Row};

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ready_app() -> App {
        let mut app = App::new(
            Source::File("people.csv".into()),
            Duration::from_secs(1),
            Duration::from_millis(300),
            Assets::default(),
        );
        let rows = ["Ada", "Grace"]
            .iter()
            .map(|n| Row {
                name: n.to_string(),
                country: Some("Vietnam".to_string()),
                ..Row::default()
            })
            .collect();
        app.finish_load(Ok(ParsedDataset {
            rows,
            warnings: Vec::new(),
        }));
        app
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = ready_app();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_toggle_and_dismiss() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('j'));
        assert!(!app.show_help);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_search_keys_route_to_input() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.search_input, "q");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.filtered_indices, vec![1]);
    }

    #[test]
    fn test_space_toggles_selected_card() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.expansion.state(1), crate::view::CardState::Expanded);
        assert_eq!(app.expansion.state(0), crate::view::CardState::Collapsed);
    }

    #[test]
    fn test_picker_keys() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('c'));
        assert!(app.picker.is_some());
        press(&mut app, KeyCode::Char(' '));
        assert!(app.criteria.selected_countries.contains("Vietnam"));
        press(&mut app, KeyCode::Esc);
        assert!(app.picker.is_none());
        press(&mut app, KeyCode::Char('x'));
        assert!(app.criteria.is_empty());
    }

    #[test]
    fn test_quit_while_loading() {
        let mut app = App::new(
            Source::File("people.csv".into()),
            Duration::from_secs(1),
            Duration::from_millis(300),
            Assets::default(),
        );
        assert_eq!(app.load_state, LoadState::Loading);
        press(&mut app, KeyCode::Char('j'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = App::new(
            Source::File("people.csv".into()),
            Duration::from_secs(1),
            Duration::from_millis(300),
            Assets::default(),
        );
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_retry_only_from_failed_state() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.load_state, LoadState::Ready);

        app.finish_load(Err(LoadError::Status {
            status: 500,
            url: "https://example.com".to_string(),
        }));
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.load_state, LoadState::Loading);
    }
}
