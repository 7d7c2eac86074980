#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use geo_dashboard::api::{GeoApi, PromptQuery};
use geo_dashboard::error::{ApiError, Result};
use geo_dashboard::model::{
    AiModelInfo, Article, AuthToken, Brand, CategoryInfo, DiagnosisHistoryItem, DiagnosisReport,
    EvaluationCreate, EvaluationResult, EvaluationRun, EvaluationRunDetail, EvaluationStatus,
    GeoScore, LoginCredentials, Page, Prompt, PromptCategory, RegisterData, ScoreCard, User,
};

/// Scriptable backend: fixed brands and scores, an optional failure
/// switch, and per-brand latency on score history.
#[derive(Default)]
pub struct FakeApi {
    pub brands: Mutex<Vec<Brand>>,
    pub scores: Mutex<HashMap<String, ScoreCard>>,
    pub history_delay: Mutex<HashMap<String, Duration>>,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

pub fn brand(id: &str, name: &str) -> Brand {
    Brand {
        id: id.to_string(),
        workspace_id: "ws-test".to_string(),
        name: name.to_string(),
        category: "Kids Fashion".to_string(),
        ..Brand::default()
    }
}

pub fn card(brand_id: &str, date: &str, composite: f64, visibility: f64) -> ScoreCard {
    ScoreCard {
        id: format!("{}-{}", brand_id, date),
        brand_id: brand_id.to_string(),
        score: GeoScore {
            composite_score: composite,
            visibility_score: visibility,
            citation_score: 60.0,
            representation_score: 75.0,
            intent_score: 90.0,
        },
        total_mentions: 100,
        created_at: date.to_string(),
        ..ScoreCard::default()
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        message: format!("{} not found", what),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brands named after `names`, with ids "1", "2", ...
    pub fn with_brands(names: &[&str]) -> Self {
        let api = Self::new();
        *api.brands.lock().unwrap() = names
            .iter()
            .enumerate()
            .map(|(i, n)| brand(&(i + 1).to_string(), n))
            .collect();
        api
    }

    pub fn set_score(&self, card: ScoreCard) {
        self.scores.lock().unwrap().insert(card.brand_id.clone(), card);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn delay_history(&self, brand_id: &str, delay: Duration) {
        self.history_delay.lock().unwrap().insert(brand_id.to_string(), delay);
    }

    fn check(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                message: "Internal Server Error".into(),
            });
        }
        Ok(())
    }
}

impl GeoApi for FakeApi {
    fn login(&self, _credentials: &LoginCredentials) -> Result<AuthToken> {
        Err(ApiError::Unauthorized("Incorrect email or password".into()))
    }

    fn register(&self, _data: &RegisterData) -> Result<User> {
        Err(not_found("register"))
    }

    fn logout(&self) -> Result<()> {
        Ok(())
    }

    fn me(&self) -> Result<User> {
        Err(ApiError::Unauthorized("Not authenticated".into()))
    }

    fn list_brands(&self, page: u32, page_size: u32) -> Result<Page<Brand>> {
        self.check()?;
        let all = self.brands.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let skip = (page.saturating_sub(1) * page_size) as usize;
        let items = all.iter().skip(skip).take(page_size as usize).cloned().collect();
        Ok(Page {
            total: all.len() as u64,
            items,
            page,
            page_size,
        })
    }

    fn get_brand(&self, brand_id: &str) -> Result<Brand> {
        self.check()?;
        self.brands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|b| b.id == brand_id)
            .cloned()
            .ok_or_else(|| not_found("Brand"))
    }

    fn latest_score(&self, brand_id: &str) -> Result<Option<ScoreCard>> {
        self.check()?;
        Ok(self
            .scores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(brand_id)
            .cloned())
    }

    fn score_history(&self, brand_id: &str, _limit: u32) -> Result<Vec<ScoreCard>> {
        let delay = self
            .history_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(brand_id)
            .copied();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        self.check()?;
        Ok(vec![
            card(brand_id, "2024-06-01", 70.0, 80.0),
            card(brand_id, "2024-06-15", 74.0, 82.0),
        ])
    }

    fn list_evaluations(&self, _status: Option<EvaluationStatus>) -> Result<Vec<EvaluationRun>> {
        self.check()?;
        Ok(Vec::new())
    }

    fn get_evaluation(&self, _run_id: &str) -> Result<EvaluationRunDetail> {
        Err(not_found("Evaluation run"))
    }

    fn create_evaluation(&self, _request: &EvaluationCreate) -> Result<EvaluationRun> {
        Err(not_found("create"))
    }

    fn evaluation_results(
        &self,
        _run_id: &str,
        _brand_id: Option<&str>,
        _model_name: Option<&str>,
    ) -> Result<Vec<EvaluationResult>> {
        Ok(Vec::new())
    }

    fn list_models(&self) -> Result<Vec<AiModelInfo>> {
        Ok(Vec::new())
    }

    fn list_prompts(&self, query: &PromptQuery) -> Result<Page<Prompt>> {
        Ok(Page {
            items: Vec::new(),
            total: 0,
            page: query.page,
            page_size: query.page_size,
        })
    }

    fn prompt_categories(&self) -> Result<Vec<PromptCategory>> {
        Ok(Vec::new())
    }

    fn industry_categories(&self) -> Result<Vec<CategoryInfo>> {
        Ok(Vec::new())
    }

    fn list_articles(&self, _category: Option<&str>, page_size: u32) -> Result<Page<Article>> {
        Ok(Page {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size,
        })
    }

    fn diagnosis_report(&self, _report_id: &str) -> Result<DiagnosisReport> {
        Err(not_found("Report"))
    }

    fn diagnosis_history(&self) -> Result<Vec<DiagnosisHistoryItem>> {
        Ok(Vec::new())
    }

    fn health(&self) -> bool {
        !self.fail.load(Ordering::SeqCst)
    }
}
