use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use tracing::{error, info};

use geo_dashboard::analytics;
use geo_dashboard::api::{GeoApi, HttpApi, MockApi};
use geo_dashboard::app::{Action, Dashboard, DashboardDeps};
use geo_dashboard::auth::{AuthSession, OAuthCallback};
use geo_dashboard::collector::evaluations::spawn_evaluation_poller;
use geo_dashboard::collector::health::spawn_health_monitor;
use geo_dashboard::collector::Shutdown;
use geo_dashboard::config::{Cli, Command, DashboardConfig, ExportKind};
use geo_dashboard::export;
use geo_dashboard::filters::{FilterPatch, FilterStore};
use geo_dashboard::logging;
use geo_dashboard::model::{LoginCredentials, RegisterData};
use geo_dashboard::query::{self, BrandsQuery, Query, ScoreHistoryQuery};
use geo_dashboard::storage::{LocalStore, TokenStore};
use geo_dashboard::ui;
use geo_dashboard::ui::theme::ColorScheme;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = DashboardConfig::from_cli(&cli);
    let command = cli.command.clone().unwrap_or(Command::Ui);

    let store = LocalStore::open(&config.data_dir)
        .with_context(|| format!("cannot open data dir {}", config.data_dir.display()))?;
    let _log_guard = logging::init(&config.data_dir, command != Command::Ui);

    let tokens = TokenStore::new(store.clone());
    let api: Arc<dyn GeoApi> = if config.demo {
        info!("using built-in demo data");
        Arc::new(MockApi::new(tokens.clone()))
    } else {
        Arc::new(HttpApi::new(&config.api_url, &config.workspace_id, config.timeout, tokens.clone())?)
    };

    match command {
        Command::Ui => run_ui(&config, api, tokens, store),
        Command::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let session = AuthSession::new(api, tokens);
            let user = session.login(&LoginCredentials { email, password })?;
            println!("Signed in as {}", user.display_name());
            Ok(())
        }
        Command::Register { email, name, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let data = RegisterData {
                email,
                password,
                full_name: name,
            };
            let user = AuthSession::new(api, tokens).register(&data)?;
            println!("Registered {}; sign in with `login`", user.display_name());
            Ok(())
        }
        Command::Logout => {
            AuthSession::new(api, tokens).logout();
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => {
            let session = AuthSession::new(api, tokens);
            match session.initialize().user {
                Some(user) => println!("{} <{}>", user.display_name(), user.email),
                None => println!("Not signed in"),
            }
            Ok(())
        }
        Command::Callback { url } => {
            let session = AuthSession::new(api, tokens);
            let user = session.complete_oauth(&OAuthCallback::parse(&url))?;
            println!("Signed in as {}", user.display_name());
            Ok(())
        }
        Command::Export { kind, brand, out } => {
            let dir = match out {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let path = run_export(api.as_ref(), store, kind, brand, &dir)?;
            println!("{}", path.display());
            Ok(())
        }
        Command::NewRun { name, models, brands } => {
            let run = query::start_evaluation(api.as_ref(), name, models, brands)?;
            println!("{} {} ({})", run.id, run.label(), run.status.as_str());
            Ok(())
        }
    }
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string())
}

/// Write one CSV using the saved dashboard filters.
fn run_export(
    api: &dyn GeoApi,
    store: LocalStore,
    kind: ExportKind,
    brand: Option<String>,
    dir: &std::path::Path,
) -> Result<PathBuf> {
    let today = Local::now().date_naive();
    let filters = FilterStore::open(Some(store), today, FilterPatch::default());

    let path = match kind {
        ExportKind::Brands => {
            let brands = BrandsQuery::default().run(api)?;
            let rows = analytics::visible_brands(filters.filters(), &brands);
            export::save_brands(dir, &rows, today)?
        }
        ExportKind::Trends => {
            let Some(brand_id) = brand else {
                bail!("--brand is required for trend exports");
            };
            let history = ScoreHistoryQuery::for_brand(Some(brand_id)).run(api)?;
            let points = analytics::history_in_range(&history, &filters.filters().date_range);
            export::save_time_series(dir, &points, today)?
        }
        ExportKind::Models => {
            let Some(brand_id) = brand else {
                bail!("--brand is required for model exports");
            };
            let Some(card) = api.latest_score(&brand_id)? else {
                bail!("brand {} has no scores yet", brand_id);
            };
            let bars = analytics::model_comparison(&card, filters.filters());
            export::save_model_comparison(dir, &bars, today)?
        }
        ExportKind::Heatmap => {
            let brands = BrandsQuery::default().run(api)?;
            let rows = analytics::visible_brands(filters.filters(), &brands);
            let cells = analytics::heatmap(&rows, filters.filters());
            export::save_heatmap(dir, &cells, today)?
        }
    };
    info!(path = %path.display(), "export written");
    Ok(path)
}

fn run_ui(config: &DashboardConfig, api: Arc<dyn GeoApi>, tokens: TokenStore, store: LocalStore) -> Result<()> {
    let colors = ColorScheme::for_choice(config.theme);
    let api_label = if config.demo { "demo".to_string() } else { config.api_url.clone() };

    let deps = DashboardDeps {
        api: Arc::clone(&api),
        tokens,
        store: Some(store),
        today: Local::now().date_naive(),
        locale: config.locale,
        export_dir: std::env::current_dir()?,
    };
    let mut dashboard = Dashboard::new(deps, config.route.clone());
    dashboard.open();

    // Background collectors
    let shutdown = Shutdown::new();
    let _health_handle = spawn_health_monitor(
        Arc::clone(&api),
        config.interval,
        Arc::clone(&dashboard.health),
        shutdown.clone(),
    );
    let _poller_handle = spawn_evaluation_poller(
        Arc::clone(&api),
        Arc::clone(&dashboard.runs),
        dashboard.notifications.clone(),
        dashboard.translator.clone(),
        config.interval,
        shutdown.clone(),
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut dashboard, &api_label, &colors);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    shutdown.trigger();
    if let Err(e) = &result {
        error!(error = %e, "dashboard exited with an error");
    }
    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    dashboard: &mut Dashboard,
    api_label: &str,
    colors: &ColorScheme,
) -> Result<()> {
    let poll_timeout = Duration::from_millis(200);

    loop {
        dashboard.tick();
        terminal.draw(|frame| ui::draw(frame, dashboard, api_label, colors))?;

        if event::poll(poll_timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && dashboard.handle_key(key) == Action::Quit {
                    return Ok(());
                }
            }
        }
    }
}
