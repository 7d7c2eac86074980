//! Dashboard composition: routes, stores, fetchers and key handling.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use crate::analytics::{self, history_in_range};
use crate::api::GeoApi;
use crate::auth::AuthSession;
use crate::collector::health::HealthSnapshot;
use crate::export;
use crate::filters::{FilterPatch, FilterStore, FilterUpdate};
use crate::i18n::{Locale, Translator};
use crate::model::{BrandWithScore, EvaluationResult, EvaluationStatus, ScoreCard};
use crate::notifications::{NotificationKind, NotificationStore};
use crate::query::{
    start_evaluation, ArticlesQuery, BrandQuery, BrandsQuery, DiagnosisHistoryQuery, EvaluationDetailQuery,
    EvaluationResultsQuery, EvaluationRunsQuery, Fetcher, IndustryCategoriesQuery, Loader, ModelsQuery,
    PromptCategoriesQuery, PromptsQuery, Query, ReportQuery, ScoreHistoryQuery,
};
use crate::route::{Route, View};
use crate::storage::{LocalStore, TokenStore};

/// Which overview or evaluations panel has the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Cursor and overlay state that only the UI cares about.
#[derive(Clone, Debug)]
pub struct UiState {
    pub focus: Focus,
    pub input_mode: InputMode,
    pub search_buffer: String,
    pub show_notifications: bool,
    pub brand_selected: usize,
    pub run_selected: usize,
    pub result_selected: usize,
    pub history_selected: usize,
    pub prompt_selected: usize,
    pub article_selected: usize,
    pub status_filter: Option<EvaluationStatus>,
    /// Narrows the open run's results to one brand.
    pub result_brand: Option<String>,
    /// Prompt text filter for the open run's results.
    pub result_search: String,
    pub prompt_category: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::List,
            input_mode: InputMode::Normal,
            search_buffer: String::new(),
            show_notifications: false,
            brand_selected: 0,
            run_selected: 0,
            result_selected: 0,
            history_selected: 0,
            prompt_selected: 0,
            article_selected: 0,
            status_filter: None,
            result_brand: None,
            result_search: String::new(),
            prompt_category: None,
        }
    }
}

/// Everything the dashboard is built from.
pub struct DashboardDeps {
    pub api: Arc<dyn GeoApi>,
    pub tokens: TokenStore,
    pub store: Option<LocalStore>,
    pub today: NaiveDate,
    pub locale: Option<Locale>,
    pub export_dir: PathBuf,
}

pub struct Dashboard {
    pub route: Route,
    pub ui: UiState,
    pub filters: FilterStore,
    pub notifications: NotificationStore,
    pub translator: Translator,
    pub auth: Arc<AuthSession>,
    pub health: Arc<Mutex<HealthSnapshot>>,
    pub export_dir: PathBuf,
    api: Arc<dyn GeoApi>,

    pub brands: Arc<Fetcher<BrandsQuery>>,
    /// The routed brand, for ids outside the loaded brand list.
    pub brand: Arc<Fetcher<BrandQuery>>,
    pub history: Arc<Fetcher<ScoreHistoryQuery>>,
    pub runs: Arc<Fetcher<EvaluationRunsQuery>>,
    pub run_detail: Arc<Fetcher<EvaluationDetailQuery>>,
    pub results: Arc<Fetcher<EvaluationResultsQuery>>,
    pub models: Arc<Fetcher<ModelsQuery>>,
    pub prompts: Arc<Fetcher<PromptsQuery>>,
    pub prompt_categories: Arc<Fetcher<PromptCategoriesQuery>>,
    pub industry: Arc<Fetcher<IndustryCategoriesQuery>>,
    pub articles: Arc<Fetcher<ArticlesQuery>>,
    pub report: Arc<Fetcher<ReportQuery>>,
    pub diagnosis_history: Arc<Fetcher<DiagnosisHistoryQuery>>,
}

impl Dashboard {
    /// Build every store and fetcher. Nothing is fetched until
    /// [`open`](Self::open) or [`refresh_blocking`](Self::refresh_blocking).
    pub fn new(deps: DashboardDeps, route: Route) -> Self {
        let api = deps.api;
        let mut translator = Translator::load(deps.store.clone(), deps.locale.unwrap_or_default());
        if let Some(locale) = deps.locale {
            translator.set_locale(locale);
        }

        Self {
            route,
            ui: UiState::default(),
            filters: FilterStore::open(deps.store, deps.today, FilterPatch::default()),
            notifications: NotificationStore::new(),
            translator,
            auth: Arc::new(AuthSession::new(Arc::clone(&api), deps.tokens)),
            health: Arc::new(Mutex::new(HealthSnapshot::default())),
            export_dir: deps.export_dir,

            brands: Fetcher::new(Arc::clone(&api), BrandsQuery::default()),
            brand: Fetcher::new(Arc::clone(&api), BrandQuery::default()),
            history: Fetcher::new(Arc::clone(&api), ScoreHistoryQuery::for_brand(None)),
            runs: Fetcher::new(Arc::clone(&api), EvaluationRunsQuery::default()),
            run_detail: Fetcher::new(Arc::clone(&api), EvaluationDetailQuery::default()),
            results: Fetcher::new(Arc::clone(&api), EvaluationResultsQuery::default()),
            models: Fetcher::new(Arc::clone(&api), ModelsQuery),
            prompts: Fetcher::new(Arc::clone(&api), PromptsQuery::default()),
            prompt_categories: Fetcher::new(Arc::clone(&api), PromptCategoriesQuery),
            industry: Fetcher::new(Arc::clone(&api), IndustryCategoriesQuery),
            articles: Fetcher::new(Arc::clone(&api), ArticlesQuery::default()),
            report: Fetcher::new(Arc::clone(&api), ReportQuery::default()),
            diagnosis_history: Fetcher::new(Arc::clone(&api), DiagnosisHistoryQuery),
            api,
        }
    }

    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        self.translator.t(key)
    }

    pub fn view(&self) -> View {
        self.route.view()
    }

    pub fn connected(&self) -> bool {
        self.health.lock().unwrap_or_else(PoisonError::into_inner).connected
    }

    /// Start the session check and mount the initial page in the
    /// background. An OAuth callback route is completed here.
    pub fn open(&mut self) {
        let auth = Arc::clone(&self.auth);
        if let Route::AuthCallback(callback) = self.route.clone() {
            match auth.complete_oauth(&callback) {
                Ok(user) => info!(email = %user.email, "oauth sign-in complete"),
                Err(e) => {
                    let title = self.t("notify.signin_failed");
                    self.notifications
                        .add_notification(NotificationKind::Error, title, &e.to_string());
                }
            }
            self.route = Route::Dashboard;
        } else {
            thread::spawn(move || {
                auth.initialize();
            });
        }
        for loader in self.loaders(self.view()) {
            loader.load();
        }
        self.sync();
    }

    /// Mount the current page and wait for every fetch, dependent ones
    /// included.
    pub fn refresh_blocking(&mut self) {
        for loader in self.loaders(self.view()) {
            loader.load_blocking();
        }
        for handle in self.sync() {
            let _ = handle.join();
        }
    }

    /// Per-frame housekeeping: keep dependent fetchers pointed at the
    /// current selection.
    pub fn tick(&mut self) {
        self.clamp_selection();
        self.sync();
    }

    fn loaders(&self, view: View) -> Vec<Arc<dyn Loader>> {
        match view {
            View::Overview => vec![loader(&self.brands), loader(&self.brand), loader(&self.history)],
            View::Evaluations => vec![
                loader(&self.runs),
                loader(&self.run_detail),
                loader(&self.results),
                loader(&self.brands),
            ],
            View::History => vec![loader(&self.diagnosis_history)],
            View::Prompts => vec![
                loader(&self.prompts),
                loader(&self.prompt_categories),
                loader(&self.models),
                loader(&self.industry),
            ],
            View::Learn => vec![loader(&self.articles)],
            View::Report => vec![loader(&self.report)],
        }
    }

    /// Switch pages: the old page's in-flight loads are dropped and the
    /// new page fetches on mount.
    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        let (from, to) = (self.view(), route.view());
        debug!(from = %self.route, to = %route, "navigate");
        self.route = route;
        if from != to {
            for loader in self.loaders(from) {
                loader.cancel();
            }
            self.ui.focus = Focus::List;
            for loader in self.loaders(to) {
                loader.load();
            }
        }
        self.sync();
    }

    /// Point dependent fetchers at the current selection. Returns handles
    /// for any fetch this started.
    fn sync(&mut self) -> Vec<JoinHandle<()>> {
        let mut started = Vec::new();
        match self.view() {
            View::Overview => {
                let routed = self.route.brand_id().unwrap_or_default().to_string();
                started.extend(self.brand.set_params(BrandQuery { brand_id: routed }));
                let brand_id = match self.route.brand_id() {
                    Some(id) => Some(id.to_string()),
                    None => self.selected_brand().map(|b| b.brand.id),
                };
                started.extend(self.history.set_params(ScoreHistoryQuery::for_brand(brand_id)));
            }
            View::Evaluations => {
                started.extend(self.runs.set_params(EvaluationRunsQuery {
                    status: self.ui.status_filter,
                }));
                let run_id = match self.route.run_id() {
                    Some(id) => Some(id.to_string()),
                    None => self
                        .runs
                        .state()
                        .data
                        .get(self.ui.run_selected)
                        .map(|r| r.id.clone()),
                };
                started.extend(self.run_detail.set_params(EvaluationDetailQuery { run_id: run_id.clone() }));
                let models = &self.filters.filters().models;
                let model_name = (models.len() == 1).then(|| models[0].clone());
                started.extend(self.results.set_params(EvaluationResultsQuery {
                    run_id,
                    brand_id: self.ui.result_brand.clone(),
                    model_name,
                }));
            }
            View::Prompts => {
                let search = self.filters.filters().search.clone();
                started.extend(self.prompts.set_params(PromptsQuery {
                    category: self.ui.prompt_category.clone(),
                    search: (!search.is_empty()).then_some(search),
                }));
            }
            View::Report => {
                let report_id = self.route.report_id().map(str::to_string);
                started.extend(self.report.set_params(ReportQuery { report_id }));
            }
            View::History | View::Learn => {}
        }
        started
    }

    // --- derived data ---

    /// Brands after pinning, search and sort.
    pub fn brand_rows(&self) -> Vec<BrandWithScore> {
        let state = self.brands.state();
        analytics::visible_brands(self.filters.filters(), &state.data)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The routed brand if there is one, else the highlighted row. A routed
    /// id missing from the brand list comes from its own fetch.
    pub fn selected_brand(&self) -> Option<BrandWithScore> {
        match self.route.brand_id() {
            Some(id) => self
                .brands
                .state()
                .data
                .into_iter()
                .find(|b| b.brand.id == id)
                .or_else(|| self.brand.state().data.filter(|b| b.brand.id == id)),
            None => self.brand_rows().get(self.ui.brand_selected).cloned(),
        }
    }

    /// The open run's results after the prompt filter. Brand and model
    /// narrowing happen in the results query.
    pub fn result_rows(&self) -> Vec<EvaluationResult> {
        let state = self.results.state();
        analytics::filter_results(&state.data, &self.ui.result_search)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Display name for a brand id, falling back to the id.
    pub fn brand_name(&self, brand_id: &str) -> String {
        self.brands
            .state()
            .data
            .iter()
            .find(|b| b.brand.id == brand_id)
            .map_or_else(|| brand_id.to_string(), |b| b.brand.name.clone())
    }

    /// Score history of the selected brand inside the date filter.
    pub fn history_rows(&self) -> Vec<ScoreCard> {
        let state = self.history.state();
        history_in_range(&state.data, &self.filters.filters().date_range)
            .into_iter()
            .cloned()
            .collect()
    }

    fn list_len(&self) -> usize {
        match self.view() {
            View::Overview => self.brand_rows().len(),
            View::Evaluations => match self.ui.focus {
                Focus::List => self.runs.state().data.len(),
                Focus::Detail => self.result_rows().len(),
            },
            View::History => self.diagnosis_history.state().data.len(),
            View::Prompts => self.prompts.state().data.prompts.len(),
            View::Learn => self.articles.state().data.len(),
            View::Report => 0,
        }
    }

    fn cursor(&mut self) -> Option<&mut usize> {
        match self.view() {
            View::Overview => Some(&mut self.ui.brand_selected),
            View::Evaluations => match self.ui.focus {
                Focus::List => Some(&mut self.ui.run_selected),
                Focus::Detail => Some(&mut self.ui.result_selected),
            },
            View::History => Some(&mut self.ui.history_selected),
            View::Prompts => Some(&mut self.ui.prompt_selected),
            View::Learn => Some(&mut self.ui.article_selected),
            View::Report => None,
        }
    }

    /// Keep cursors inside their lists after data changes.
    pub fn clamp_selection(&mut self) {
        let len = self.list_len();
        if let Some(cursor) = self.cursor() {
            if len == 0 {
                *cursor = 0;
            } else if *cursor >= len {
                *cursor = len - 1;
            }
        }
    }

    fn move_cursor(&mut self, down: bool) {
        let len = self.list_len();
        if let Some(cursor) = self.cursor() {
            if down {
                if len > 0 && *cursor < len - 1 {
                    *cursor += 1;
                }
            } else if *cursor > 0 {
                *cursor -= 1;
            }
        }
        if self.view() == View::Evaluations && self.ui.focus == Focus::List {
            self.ui.result_selected = 0;
            self.ui.result_brand = None;
        }
    }

    // --- input ---

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if self.ui.input_mode == InputMode::Search {
            self.handle_search_key(key);
            return Action::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match key.code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Esc => {
                if self.ui.show_notifications {
                    self.ui.show_notifications = false;
                } else {
                    return Action::Quit;
                }
            }
            KeyCode::Char(c @ '1'..='6') => self.jump_to_view(c as usize - '1' as usize),
            KeyCode::Tab | KeyCode::BackTab => {
                self.ui.focus = match self.ui.focus {
                    Focus::List => Focus::Detail,
                    Focus::Detail => Focus::List,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(true),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Backspace => {
                let parent = self.route.parent();
                self.navigate(parent);
            }
            KeyCode::Char('r') => {
                for loader in self.loaders(self.view()) {
                    loader.load();
                }
            }
            KeyCode::Char('/') => {
                self.ui.search_buffer = match self.view() {
                    View::Evaluations => self.ui.result_search.clone(),
                    _ => self.filters.filters().search.clone(),
                };
                self.ui.input_mode = InputMode::Search;
            }
            KeyCode::Char('o') => self.filters.cycle_sort(),
            KeyCode::Char('x') => {
                self.filters.reset_filters();
                self.ui.brand_selected = 0;
            }
            KeyCode::Char('g') => self.filters.cycle_date_preset(),
            KeyCode::Char('m') => self.filters.cycle_model(),
            KeyCode::Char('d') => self.filters.cycle_dimension(),
            KeyCode::Char('p') => {
                if let Some(b) = self.selected_brand() {
                    self.filters.toggle_brand(&b.brand.id);
                }
            }
            KeyCode::Char('f') => self.cycle_list_filter(),
            KeyCode::Char('b') if self.view() == View::Evaluations => self.cycle_result_brand(),
            KeyCode::Char('N') if self.view() == View::Evaluations => self.start_run(),
            KeyCode::Char('n') => self.ui.show_notifications = !self.ui.show_notifications,
            KeyCode::Char('a') => self.notifications.mark_all_as_read(),
            KeyCode::Char('c') if self.ui.show_notifications => self.notifications.clear_all(),
            KeyCode::Char('L') => self.translator.toggle(),
            KeyCode::Char('e') => self.export_current(),
            _ => {}
        }
        self.clamp_selection();
        self.sync();
        Action::Continue
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.ui.input_mode = InputMode::Normal;
                self.ui.search_buffer.clear();
            }
            KeyCode::Enter => {
                self.ui.input_mode = InputMode::Normal;
                let text = std::mem::take(&mut self.ui.search_buffer);
                if self.view() == View::Evaluations {
                    self.ui.result_search = text;
                    self.ui.result_selected = 0;
                } else {
                    self.filters.update_filter(FilterUpdate::Search(text));
                    self.ui.brand_selected = 0;
                    self.ui.prompt_selected = 0;
                }
                self.sync();
            }
            KeyCode::Backspace => {
                self.ui.search_buffer.pop();
            }
            KeyCode::Char(c) => self.ui.search_buffer.push(c),
            _ => {}
        }
    }

    fn jump_to_view(&mut self, index: usize) {
        let Some(&view) = View::ALL.get(index) else { return };
        let route = if view == View::Report {
            // latest diagnosis, if the history page has loaded one
            match self.diagnosis_history.state().data.first() {
                Some(item) => Route::Report(item.id.clone()),
                None => Route::History,
            }
        } else {
            Route::for_view(view)
        };
        self.navigate(route);
    }

    fn open_selected(&mut self) {
        let route = match self.view() {
            View::Overview => self.selected_brand().map(|b| Route::Brand(b.brand.id)),
            View::Evaluations => self
                .runs
                .state()
                .data
                .get(self.ui.run_selected)
                .map(|r| Route::Evaluation(r.id.clone())),
            View::History => self
                .diagnosis_history
                .state()
                .data
                .get(self.ui.history_selected)
                .map(|h| Route::Report(h.id.clone())),
            View::Prompts | View::Learn | View::Report => None,
        };
        if let Some(route) = route {
            self.navigate(route);
        }
    }

    fn cycle_list_filter(&mut self) {
        match self.view() {
            View::Evaluations => {
                self.ui.status_filter = match self.ui.status_filter {
                    None => Some(EvaluationStatus::Running),
                    Some(EvaluationStatus::Running) => Some(EvaluationStatus::Completed),
                    Some(EvaluationStatus::Completed) => Some(EvaluationStatus::Failed),
                    Some(EvaluationStatus::Failed) | Some(EvaluationStatus::Pending) => None,
                };
                self.ui.run_selected = 0;
            }
            View::Prompts => {
                let categories = self.prompt_categories.state().data;
                let next = match &self.ui.prompt_category {
                    None => categories.first(),
                    Some(current) => categories
                        .iter()
                        .position(|c| &c.category == current)
                        .and_then(|i| categories.get(i + 1)),
                };
                self.ui.prompt_category = next.map(|c| c.category.clone());
                self.ui.prompt_selected = 0;
            }
            _ => {}
        }
    }

    /// Step the results brand filter through the brands in the open run,
    /// then back to all.
    fn cycle_result_brand(&mut self) {
        let ids = self
            .run_detail
            .state()
            .data
            .map(|d| analytics::result_brand_ids(&d.results))
            .unwrap_or_default();
        self.ui.result_brand = match &self.ui.result_brand {
            None => ids.first().cloned(),
            Some(current) => ids
                .iter()
                .position(|id| id == current)
                .and_then(|i| ids.get(i + 1))
                .cloned(),
        };
        self.ui.result_selected = 0;
    }

    /// Queue a run over the pinned brands with the selected models.
    fn start_run(&self) {
        let filters = self.filters.filters();
        let name = format!("Dashboard run {}", self.filters.today());
        match start_evaluation(
            self.api.as_ref(),
            Some(name),
            filters.models.clone(),
            filters.brands.clone(),
        ) {
            Ok(run) => {
                let title = self.t("notify.run_started");
                let message = format!("{} ({})", run.label(), run.models_used.join(", "));
                self.notifications
                    .add_notification(NotificationKind::Info, title, &message);
                self.runs.refetch();
            }
            Err(e) => {
                warn!(error = %e, "could not start evaluation");
                let title = self.t("notify.run_start_failed");
                self.notifications
                    .add_notification(NotificationKind::Error, title, &e.to_string());
            }
        }
    }

    /// CSV of the brand table, plus the selected brand's history when
    /// there is one.
    fn export_current(&mut self) {
        let rows = self.brand_rows();
        let refs: Vec<&BrandWithScore> = rows.iter().collect();
        let today = self.filters.today();
        let mut saved = Vec::new();

        match export::save_brands(&self.export_dir, &refs, today) {
            Ok(path) => saved.push(path),
            Err(e) => {
                warn!(error = %e, "brand export failed");
                let title = self.t("notify.export_failed");
                self.notifications
                    .add_notification(NotificationKind::Error, title, &e.to_string());
                return;
            }
        }

        let history = self.history_rows();
        if !history.is_empty() {
            let refs: Vec<&ScoreCard> = history.iter().collect();
            match export::save_time_series(&self.export_dir, &refs, today) {
                Ok(path) => saved.push(path),
                Err(e) => warn!(error = %e, "history export failed"),
            }
        }

        let message = saved
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let title = self.t("notify.export");
        self.notifications
            .add_notification(NotificationKind::Success, title, &message);
    }
}

fn loader<Q: Query>(fetcher: &Arc<Fetcher<Q>>) -> Arc<dyn Loader> {
    Arc::clone(fetcher) as Arc<dyn Loader>
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn dashboard(route: Route) -> (Dashboard, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let tokens = TokenStore::in_memory();
        let api = Arc::new(MockApi::with_seed(tokens.clone(), today, 7));
        let deps = DashboardDeps {
            api,
            tokens,
            store: None,
            today,
            locale: None,
            export_dir: dir.path().to_path_buf(),
        };
        let mut d = Dashboard::new(deps, route);
        d.refresh_blocking();
        (d, dir)
    }

    #[test]
    fn overview_loads_brands_and_selected_history() {
        let (d, _dir) = dashboard(Route::Dashboard);
        let rows = d.brand_rows();
        assert_eq!(rows.len(), 7);
        // default sort is composite descending
        assert_eq!(rows[0].brand.name, "Carter's");
        assert_eq!(d.history.params().brand_id.as_deref(), Some(rows[0].brand.id.as_str()));
        assert!(!d.history.state().data.is_empty());
    }

    #[test]
    fn search_mode_updates_the_filter() {
        let (mut d, _dir) = dashboard(Route::Dashboard);
        d.handle_key(key(KeyCode::Char('/')));
        for c in "tiny".chars() {
            d.handle_key(key(KeyCode::Char(c)));
        }
        // still typing: nothing applied yet
        assert_eq!(d.filters.filters().search, "");
        d.handle_key(key(KeyCode::Enter));
        assert_eq!(d.filters.filters().search, "tiny");
        assert_eq!(d.brand_rows().len(), 1);
    }

    #[test]
    fn enter_opens_brand_and_backspace_returns() {
        let (mut d, _dir) = dashboard(Route::Dashboard);
        d.handle_key(key(KeyCode::Down));
        let expected = d.brand_rows()[1].brand.id.clone();
        d.handle_key(key(KeyCode::Enter));
        assert_eq!(d.route, Route::Brand(expected));
        d.handle_key(key(KeyCode::Backspace));
        assert_eq!(d.route, Route::Brands);
    }

    #[test]
    fn number_keys_switch_views() {
        let (mut d, _dir) = dashboard(Route::Dashboard);
        d.handle_key(key(KeyCode::Char('2')));
        assert_eq!(d.view(), View::Evaluations);
        d.handle_key(key(KeyCode::Char('5')));
        assert_eq!(d.route, Route::Learn);
        assert_eq!(d.handle_key(key(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn export_writes_files_and_notifies() {
        let (mut d, dir) = dashboard(Route::Dashboard);
        d.handle_key(key(KeyCode::Char('e')));
        let n = d.notifications.notifications();
        assert_eq!(n[0].kind, NotificationKind::Success);
        assert!(dir.path().join("geo-insights-brands-2024-06-30.csv").exists());
    }

    #[test]
    fn notification_keys() {
        let (mut d, _dir) = dashboard(Route::Dashboard);
        d.notifications.add_notification(NotificationKind::Info, "a", "");
        d.handle_key(key(KeyCode::Char('n')));
        assert!(d.ui.show_notifications);
        d.handle_key(key(KeyCode::Char('a')));
        assert_eq!(d.notifications.unread_count(), 0);
        d.handle_key(key(KeyCode::Char('c')));
        assert!(d.notifications.notifications().is_empty());
        assert_eq!(d.handle_key(key(KeyCode::Esc)), Action::Continue);
        assert!(!d.ui.show_notifications);
    }

    #[test]
    fn new_run_key_queues_an_evaluation() {
        let (mut d, _dir) = dashboard(Route::Evaluations);
        let before = d.runs.state().data.len();
        d.handle_key(key(KeyCode::Char('N')));

        let n = d.notifications.notifications();
        assert_eq!(n[0].kind, NotificationKind::Info);
        assert!(n[0].message.starts_with("Dashboard run 2024-06-30"));
        d.runs.refetch_blocking();
        assert_eq!(d.runs.state().data.len(), before + 1);
    }

    #[test]
    fn run_results_follow_brand_model_and_prompt_filters() {
        let (mut d, _dir) = dashboard(Route::Evaluation("run-1".into()));
        let all = d.result_rows();
        assert!(!all.is_empty());
        assert!(d.run_detail.state().data.is_some());

        // a single focused model narrows the results query
        d.handle_key(key(KeyCode::Char('m')));
        d.refresh_blocking();
        let focused = d.filters.filters().models[0].clone();
        assert_eq!(d.results.params().model_name.as_deref(), Some(focused.as_str()));
        assert!(d.result_rows().iter().all(|r| r.model_name == focused));
        d.filters.reset_filters();

        d.handle_key(key(KeyCode::Char('b')));
        assert_eq!(d.ui.result_brand.as_deref(), Some("1"));
        d.refresh_blocking();
        assert_eq!(d.results.params().brand_id.as_deref(), Some("1"));
        d.handle_key(key(KeyCode::Char('b')));
        assert_eq!(d.ui.result_brand, None);

        d.handle_key(key(KeyCode::Char('/')));
        for c in "ORGANIC".chars() {
            d.handle_key(key(KeyCode::Char(c)));
        }
        d.handle_key(key(KeyCode::Enter));
        d.refresh_blocking();
        assert_eq!(d.ui.result_search, "ORGANIC");
        // the brand search is left alone
        assert_eq!(d.filters.filters().search, "");
        let rows = d.result_rows();
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.prompt_text.to_lowercase().contains("organic")));
    }
}
