mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use ratatui::backend::TestBackend;
use ratatui::Terminal;

use common::{card, FakeApi};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use geo_dashboard::api::MockApi;
use geo_dashboard::app::{Dashboard, DashboardDeps};
use geo_dashboard::route::Route;
use geo_dashboard::storage::TokenStore;
use geo_dashboard::ui;
use geo_dashboard::ui::theme::ColorScheme;

fn dashboard(api: Arc<FakeApi>, dir: &tempfile::TempDir) -> Dashboard {
    let deps = DashboardDeps {
        api,
        tokens: TokenStore::in_memory(),
        store: None,
        today: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        locale: None,
        export_dir: dir.path().to_path_buf(),
    };
    Dashboard::new(deps, Route::Dashboard)
}

fn demo(route: Route, dir: &tempfile::TempDir) -> Dashboard {
    let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let tokens = TokenStore::in_memory();
    let deps = DashboardDeps {
        api: Arc::new(MockApi::with_seed(tokens.clone(), today, 7)),
        tokens,
        store: None,
        today,
        locale: None,
        export_dir: dir.path().to_path_buf(),
    };
    let mut app = Dashboard::new(deps, route);
    app.refresh_blocking();
    app
}

fn press(app: &mut Dashboard, c: char) {
    let _ = app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
}

fn render(app: &Dashboard) -> String {
    let mut terminal = Terminal::new(TestBackend::new(180, 50)).unwrap();
    terminal
        .draw(|frame| ui::draw(frame, app, "http://api.test", &ColorScheme::dark()))
        .unwrap();
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn composite_is_a_number_and_dimensions_are_percentages() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(FakeApi::with_brands(&["TinyThreads"]));
    api.set_score(card("1", "2024-06-15", 78.0, 85.0));
    let mut app = dashboard(api, &dir);
    app.refresh_blocking();

    let screen = render(&app);
    assert!(screen.contains("TinyThreads"));
    assert!(screen.contains("Composite 78  Grade B"), "{}", screen);
    assert!(screen.contains("85%"));
    assert!(!screen.contains("78%"));
}

#[test]
fn routed_brand_beyond_the_first_page_is_fetched_directly() {
    let dir = tempfile::tempdir().unwrap();
    let names: Vec<String> = (1..=120).map(|i| format!("Label{:03}", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let api = Arc::new(FakeApi::with_brands(&refs));
    api.set_score(card("115", "2024-06-15", 64.0, 70.0));

    let deps = DashboardDeps {
        api,
        tokens: TokenStore::in_memory(),
        store: None,
        today: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        locale: None,
        export_dir: dir.path().to_path_buf(),
    };
    let mut app = Dashboard::new(deps, Route::Brand("115".into()));
    app.refresh_blocking();

    assert_eq!(app.brands.state().data.len(), 100);
    let selected = app.selected_brand().unwrap();
    assert_eq!(selected.brand.name, "Label115");
    assert_eq!(selected.composite(), Some(64.0));
    assert_eq!(app.history.params().brand_id.as_deref(), Some("115"));

    let screen = render(&app);
    assert!(screen.contains("Label115"));
    assert!(screen.contains("Composite 64"));
}

#[test]
fn first_load_shows_loading() {
    let dir = tempfile::tempdir().unwrap();
    let app = dashboard(Arc::new(FakeApi::with_brands(&["A"])), &dir);
    let screen = render(&app);
    assert!(screen.contains("Loading"));
}

#[test]
fn failed_load_shows_the_error() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(FakeApi::with_brands(&["A"]));
    api.set_failing(true);
    let mut app = dashboard(api, &dir);
    app.refresh_blocking();

    let screen = render(&app);
    assert!(screen.contains("Failed to fetch brands"));
}

#[test]
fn empty_workspace_shows_empty_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = dashboard(Arc::new(FakeApi::new()), &dir);
    app.refresh_blocking();
    let screen = render(&app);
    assert!(screen.contains("Nothing to show"));
}

#[test]
fn locale_switch_changes_labels() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = dashboard(Arc::new(FakeApi::new()), &dir);
    app.refresh_blocking();
    app.translator.toggle();
    // wide glyphs are followed by a blank cell
    let screen = render(&app).replace(' ', "");
    assert!(screen.contains("暂无数据"));
}

#[test]
fn overview_compares_the_top_brands_per_dimension() {
    let dir = tempfile::tempdir().unwrap();
    let app = demo(Route::Dashboard, &dir);
    let screen = render(&app);

    assert!(screen.contains("Brand Comparison"), "{}", screen);
    let header = screen
        .lines()
        .find(|l| l.contains("Carter's") && l.contains("TinyThreads") && l.contains("OshKosh"))
        .unwrap_or_else(|| panic!("no comparison header in\n{}", screen));
    assert!(header.find("Carter's") < header.find("TinyThreads"));
    assert!(screen.lines().any(|l| l.contains("Citation") && l.contains("78%") && l.contains("60%")));
}

#[test]
fn run_detail_shows_counts_sentiment_response_and_funnel() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = demo(Route::Evaluation("run-1".into()), &dir);
    let screen = render(&app);

    assert!(screen.contains("Results 8"), "{}", screen);
    assert!(screen.contains("Prompts 8"));
    assert!(screen.contains("Sentiment"));
    assert!(screen.contains("positive"));
    assert!(screen.contains("Mention Funnel"));
    assert!(screen.contains("Queries"));
    assert!(screen.contains("Response"));
    assert!(screen.contains("popular choice") || screen.contains("Other brands to consider"));

    press(&mut app, 'b');
    app.refresh_blocking();
    let screen = render(&app);
    assert!(screen.contains("[Brand: Carter's]"), "{}", screen);
}
