// Demo backend used by `--demo`: a fixed brand set, score history with
// random jitter, and evaluation runs that advance every time they are polled.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Days, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{GeoApi, PromptQuery};
use crate::analytics;
use crate::error::{ApiError, Result};
use crate::model::{
    AiModelInfo, Article, AuthToken, Brand, CategoryInfo, DiagnosisHistoryItem, DiagnosisReport,
    EvaluationCreate, EvaluationResult, EvaluationRun, EvaluationRunDetail, EvaluationStatus,
    GeoScore, LoginCredentials, ModelScoreEntry, Page, Prompt, PromptCategory, RegisterData,
    ScoreCard, User,
};
use crate::storage::TokenStore;

pub const DEMO_PASSWORD: &str = "demo";
pub const DEMO_TOKEN: &str = "demo-token";

const WORKSPACE: &str = "ws-demo-001";
const MODELS: [&str; 4] = ["ChatGPT", "Gemini", "Claude", "Perplexity"];

// name, domain, composite, visibility, citation, representation, intent, mentions
const BRANDS: [(&str, &str, f64, f64, f64, f64, f64, u64); 7] = [
    ("Carter's", "carters.com", 82.0, 85.0, 78.0, 80.0, 84.0, 156),
    ("OshKosh B'Gosh", "oshkosh.com", 76.0, 79.0, 72.0, 75.0, 78.0, 134),
    ("TinyThreads", "tinythreads.com", 78.0, 85.0, 60.0, 75.0, 90.0, 121),
    ("Primary", "primary.com", 74.0, 72.0, 76.0, 78.0, 70.0, 112),
    ("Hanna Andersson", "hannaandersson.com", 71.0, 68.0, 74.0, 76.0, 65.0, 89),
    ("Gymboree", "gymboree.com", 68.0, 70.0, 62.0, 72.0, 66.0, 98),
    ("Tea Collection", "teacollection.com", 65.0, 62.0, 68.0, 70.0, 58.0, 76),
];

const PROMPTS: [(&str, &str); 8] = [
    ("Best sustainable kids clothing brands", "Product Discovery"),
    ("Where to buy organic baby clothes", "Purchase Decision"),
    ("Affordable kids fashion for school", "Price Research"),
    ("Premium children's clothing recommendations", "Brand Comparison"),
    ("Eco-friendly toddler clothing options", "Sustainability"),
    ("High-quality kids wear brands", "Quality Assessment"),
    ("Durable kids clothing for active children", "Quality Assessment"),
    ("Trendy kids fashion on a budget", "Trend Information"),
];

pub struct MockApi {
    tokens: TokenStore,
    today: NaiveDate,
    rng: Mutex<StdRng>,
    runs: Mutex<Vec<EvaluationRun>>,
}

impl MockApi {
    pub fn new(tokens: TokenStore) -> Self {
        Self::with_seed(tokens, Local::now().date_naive(), rand::random())
    }

    /// Deterministic demo data, for tests.
    pub fn with_seed(tokens: TokenStore, today: NaiveDate, seed: u64) -> Self {
        Self {
            tokens,
            today,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            runs: Mutex::new(initial_runs(today)),
        }
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn authorized(&self) -> Result<()> {
        match self.tokens.get() {
            Some(token) if token == DEMO_TOKEN => Ok(()),
            _ => Err(ApiError::Unauthorized("Could not validate credentials".into())),
        }
    }

    /// Advance pending and running runs by one poll.
    fn advance_runs(&self) -> Vec<EvaluationRun> {
        let mut rng = self.rng();
        let mut runs = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        for run in runs.iter_mut() {
            match run.status {
                EvaluationStatus::Pending => {
                    if rng.gen_ratio(1, 3) {
                        run.status = EvaluationStatus::Running;
                        run.started_at = Some(now.clone());
                    }
                }
                EvaluationStatus::Running => {
                    run.progress = (run.progress + rng.gen_range(5.0..15.0)).min(100.0).round();
                    if run.progress >= 100.0 {
                        run.status = EvaluationStatus::Completed;
                        run.completed_at = Some(now.clone());
                    }
                }
                _ => {}
            }
        }
        runs.clone()
    }
}

fn brand(index: usize) -> Brand {
    let (name, domain, ..) = BRANDS[index];
    Brand {
        id: (index + 1).to_string(),
        workspace_id: WORKSPACE.to_string(),
        name: name.to_string(),
        slug: domain.trim_end_matches(".com").to_string(),
        domain: Some(domain.to_string()),
        category: "Kids Fashion".to_string(),
        price_tier: Some("mid".to_string()),
        created_at: "2024-01-01".to_string(),
        updated_at: "2024-01-15".to_string(),
        ..Brand::default()
    }
}

fn base_score(index: usize) -> (GeoScore, u64) {
    let (_, _, composite, visibility, citation, representation, intent, mentions) = BRANDS[index];
    (
        GeoScore {
            composite_score: composite,
            visibility_score: visibility,
            citation_score: citation,
            representation_score: representation,
            intent_score: intent,
        },
        mentions,
    )
}

fn brand_index(brand_id: &str) -> Result<usize> {
    brand_id
        .parse::<usize>()
        .ok()
        .filter(|i| (1..=BRANDS.len()).contains(i))
        .map(|i| i - 1)
        .ok_or_else(|| ApiError::Status {
            status: 404,
            message: "Brand not found".into(),
        })
}

fn jitter(rng: &mut StdRng, base: f64, spread: f64) -> f64 {
    (base + rng.gen_range(-spread..spread)).clamp(0.0, 100.0).round()
}

fn initial_runs(today: NaiveDate) -> Vec<EvaluationRun> {
    let statuses = [
        EvaluationStatus::Completed,
        EvaluationStatus::Completed,
        EvaluationStatus::Failed,
        EvaluationStatus::Running,
        EvaluationStatus::Pending,
    ];
    let names = [
        "Weekly Brand Check",
        "Monthly Deep Analysis",
        "Competitor Analysis",
        "New Brand Evaluation",
        "Sustainability Prompts",
    ];
    statuses
        .iter()
        .zip(names)
        .enumerate()
        .map(|(i, (status, name))| {
            let started = today - Days::new((statuses.len() - i) as u64);
            EvaluationRun {
                id: format!("run-{}", i + 1),
                workspace_id: WORKSPACE.to_string(),
                name: Some(name.to_string()),
                brand_name: Some(BRANDS[i % BRANDS.len()].0.to_string()),
                models_used: MODELS[..2 + i % 3].iter().map(|m| m.to_string()).collect(),
                status: *status,
                progress: match status {
                    EvaluationStatus::Completed => 100.0,
                    EvaluationStatus::Running => 60.0,
                    EvaluationStatus::Failed => 35.0,
                    EvaluationStatus::Pending => 0.0,
                },
                prompt_count: 25,
                started_at: (*status != EvaluationStatus::Pending).then(|| format!("{}T09:00:00", started)),
                completed_at: (*status == EvaluationStatus::Completed).then(|| format!("{}T09:02:34", started)),
                error_message: (*status == EvaluationStatus::Failed)
                    .then(|| "Gemini quota exceeded".to_string()),
                created_at: format!("{}T08:59:00", started),
            }
        })
        .collect()
}

impl GeoApi for MockApi {
    fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken> {
        if credentials.password != DEMO_PASSWORD || !credentials.email.contains('@') {
            return Err(ApiError::Unauthorized("Incorrect email or password".into()));
        }
        Ok(AuthToken {
            access_token: DEMO_TOKEN.to_string(),
            token_type: "bearer".to_string(),
        })
    }

    fn register(&self, data: &RegisterData) -> Result<User> {
        if data.password.len() < 8 {
            return Err(ApiError::Status {
                status: 422,
                message: "Password must be at least 8 characters".into(),
            });
        }
        Ok(User {
            id: 2,
            email: data.email.clone(),
            full_name: data.full_name.clone(),
            workspace_id: Some(WORKSPACE.to_string()),
            is_active: true,
            is_superuser: false,
        })
    }

    fn logout(&self) -> Result<()> {
        Ok(())
    }

    fn me(&self) -> Result<User> {
        self.authorized()?;
        Ok(User {
            id: 1,
            email: "demo@geo-insights.dev".to_string(),
            full_name: Some("Demo User".to_string()),
            workspace_id: Some(WORKSPACE.to_string()),
            is_active: true,
            is_superuser: false,
        })
    }

    fn list_brands(&self, page: u32, page_size: u32) -> Result<Page<Brand>> {
        let page = page.max(1);
        let start = ((page - 1) * page_size) as usize;
        let items: Vec<Brand> = (0..BRANDS.len()).skip(start).take(page_size as usize).map(brand).collect();
        Ok(Page {
            items,
            total: BRANDS.len() as u64,
            page,
            page_size,
        })
    }

    fn get_brand(&self, brand_id: &str) -> Result<Brand> {
        brand_index(brand_id).map(brand)
    }

    fn latest_score(&self, brand_id: &str) -> Result<Option<ScoreCard>> {
        let index = brand_index(brand_id)?;
        let (score, mentions) = base_score(index);
        let mut rng = StdRng::seed_from_u64(index as u64);
        let model_scores: BTreeMap<String, ModelScoreEntry> = MODELS
            .iter()
            .map(|m| {
                let entry = ModelScoreEntry {
                    score: jitter(&mut rng, score.composite_score, 15.0),
                    mentions: rng.gen_range(5..25),
                };
                (m.to_string(), entry)
            })
            .collect();
        Ok(Some(ScoreCard {
            id: format!("s{}", index + 1),
            brand_id: brand_id.to_string(),
            evaluation_run_id: Some("run-1".to_string()),
            score,
            total_mentions: mentions,
            avg_rank: Some(1.5 + index as f64 * 0.4),
            citation_rate: score.citation_score / 120.0,
            intent_coverage: score.intent_score / 100.0,
            model_scores,
            evaluation_count: 12,
            last_evaluation_date: Some(self.today.to_string()),
            created_at: self.today.to_string(),
            updated_at: self.today.to_string(),
        }))
    }

    fn score_history(&self, brand_id: &str, limit: u32) -> Result<Vec<ScoreCard>> {
        let index = brand_index(brand_id)?;
        let (base, mentions) = base_score(index);
        let mut rng = self.rng();
        // weekly points, oldest first
        let points = (limit as u64).min(27);
        Ok((0..points)
            .rev()
            .map(|weeks_ago| {
                let date = self.today - Days::new(weeks_ago * 7);
                let mut score = GeoScore {
                    composite_score: 0.0,
                    visibility_score: jitter(&mut rng, base.visibility_score, 10.0),
                    citation_score: jitter(&mut rng, base.citation_score, 10.0),
                    representation_score: jitter(&mut rng, base.representation_score, 10.0),
                    intent_score: jitter(&mut rng, base.intent_score, 10.0),
                };
                score.composite_score = analytics::weighted_composite(&score);
                ScoreCard {
                    id: format!("s{}-{}", index + 1, weeks_ago),
                    brand_id: brand_id.to_string(),
                    score,
                    total_mentions: mentions,
                    created_at: date.to_string(),
                    updated_at: date.to_string(),
                    ..ScoreCard::default()
                }
            })
            .collect())
    }

    fn list_evaluations(&self, status: Option<EvaluationStatus>) -> Result<Vec<EvaluationRun>> {
        let runs = self.advance_runs();
        Ok(runs
            .into_iter()
            .rev()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .collect())
    }

    fn get_evaluation(&self, run_id: &str) -> Result<EvaluationRunDetail> {
        let run = self
            .runs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|r| r.id == run_id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "Evaluation run not found".into(),
            })?;
        let results = self.evaluation_results(run_id, None, None)?;
        Ok(EvaluationRunDetail { run, results })
    }

    fn create_evaluation(&self, request: &EvaluationCreate) -> Result<EvaluationRun> {
        let mut runs = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
        let run = EvaluationRun {
            id: format!("run-{}", runs.len() + 1),
            workspace_id: WORKSPACE.to_string(),
            name: request.name.clone(),
            brand_name: None,
            models_used: request.models.clone(),
            status: EvaluationStatus::Pending,
            progress: 0.0,
            prompt_count: request.prompt_ids.as_ref().map_or(PROMPTS.len(), Vec::len) as u64,
            started_at: None,
            completed_at: None,
            error_message: None,
            created_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        };
        runs.push(run.clone());
        Ok(run)
    }

    fn evaluation_results(
        &self,
        run_id: &str,
        brand_id: Option<&str>,
        model_name: Option<&str>,
    ) -> Result<Vec<EvaluationResult>> {
        let brand_index = match brand_id {
            Some(id) => brand_index(id)?,
            None => 0,
        };
        let brand_name = BRANDS[brand_index].0;
        let mut rng = StdRng::seed_from_u64(run_id.len() as u64 * 31 + brand_index as u64);
        Ok(PROMPTS
            .iter()
            .enumerate()
            .map(|(i, (prompt, intent))| {
                let mentioned = rng.gen_bool(0.7);
                let cited = mentioned && rng.gen_bool(0.6);
                let model = MODELS[i % MODELS.len()];
                EvaluationResult {
                    id: format!("{}-{}", run_id, i),
                    evaluation_run_id: run_id.to_string(),
                    brand_id: (brand_index + 1).to_string(),
                    prompt_id: format!("p{}", i + 1),
                    model_name: model.to_string(),
                    prompt_text: prompt.to_string(),
                    intent_category: intent.to_string(),
                    response_text: if mentioned {
                        format!("{} is a popular choice for children's clothing.", brand_name)
                    } else {
                        "Other brands to consider include CompetitorA and CompetitorB.".to_string()
                    },
                    is_mentioned: mentioned,
                    mention_rank: mentioned.then(|| rng.gen_range(1..6)),
                    is_cited: cited,
                    citation_urls: if cited {
                        vec![format!("https://{}", BRANDS[brand_index].1)]
                    } else {
                        Vec::new()
                    },
                    representation_score: if mentioned { rng.gen_range(0.0..3.0_f64).round() } else { 0.0 },
                    sentiment: mentioned.then(|| "positive".to_string()),
                    response_time_ms: Some(rng.gen_range(400.0..2400.0_f64).round()),
                    evaluated_at: self.today.to_string(),
                    ..EvaluationResult::default()
                }
            })
            .filter(|r| model_name.map_or(true, |m| r.model_name == m))
            .collect())
    }

    fn list_models(&self) -> Result<Vec<AiModelInfo>> {
        let catalog = [
            ("Gemini", "Google Gemini", "gemini-2.0-flash", true, "Google's multimodal AI model", "G"),
            ("ChatGPT", "OpenAI ChatGPT", "gpt-4o-mini", true, "OpenAI's GPT-4 language model", "O"),
            ("Claude", "Anthropic Claude", "claude-3-haiku", true, "Anthropic's AI assistant", "A"),
            ("Perplexity", "Perplexity AI", "pplx-70b-online", false, "Real-time search AI", "P"),
        ];
        Ok(catalog
            .iter()
            .map(|(id, name, model, available, description, icon)| AiModelInfo {
                id: id.to_string(),
                name: name.to_string(),
                model: model.to_string(),
                available: *available,
                description: description.to_string(),
                icon: icon.to_string(),
            })
            .collect())
    }

    fn list_prompts(&self, query: &PromptQuery) -> Result<Page<Prompt>> {
        let needle = query.search.as_deref().map(str::to_lowercase);
        let items: Vec<Prompt> = PROMPTS
            .iter()
            .enumerate()
            .filter(|(_, (_, intent))| query.category.as_deref().map_or(true, |c| c == *intent))
            .filter(|(_, (text, _))| {
                needle.as_deref().map_or(true, |n| text.to_lowercase().contains(n))
            })
            .map(|(i, (text, intent))| Prompt {
                id: format!("p{}", i + 1),
                text: text.to_string(),
                intent_category: intent.to_string(),
                weight: 5 + (i % 5) as u8,
                description: None,
                created_at: "2024-01-01".to_string(),
                updated_at: "2024-01-01".to_string(),
            })
            .collect();
        Ok(Page {
            total: items.len() as u64,
            page: query.page.max(1),
            page_size: query.page_size,
            items,
        })
    }

    fn prompt_categories(&self) -> Result<Vec<PromptCategory>> {
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for (_, intent) in PROMPTS {
            *counts.entry(intent).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(category, count)| PromptCategory {
                category: category.to_string(),
                count,
            })
            .collect())
    }

    fn industry_categories(&self) -> Result<Vec<CategoryInfo>> {
        let avg = BRANDS.iter().map(|b| b.2).sum::<f64>() / BRANDS.len() as f64;
        Ok(vec![
            CategoryInfo {
                category: "Kids Fashion".to_string(),
                brand_count: BRANDS.len() as u64,
                eval_count: 5,
                avg_composite: avg.round(),
            },
            CategoryInfo {
                category: "SaaS".to_string(),
                brand_count: 0,
                eval_count: 0,
                avg_composite: 0.0,
            },
        ])
    }

    fn list_articles(&self, category: Option<&str>, page_size: u32) -> Result<Page<Article>> {
        let articles = [
            ("What is Generative Engine Optimization?", "tip", 6, true),
            ("How AI assistants choose which brands to cite", "report", 9, false),
            ("Kids fashion: share of voice across four AI platforms", "lab", 12, true),
            ("Structured data and AI visibility", "tip", 5, false),
        ];
        let items: Vec<Article> = articles
            .iter()
            .enumerate()
            .filter(|(_, a)| category.map_or(true, |c| c == a.1))
            .take(page_size as usize)
            .map(|(i, (title, cat, minutes, featured))| Article {
                id: i as i64 + 1,
                title: title.to_string(),
                summary: format!("{}: a short read for brand teams.", title),
                content: None,
                source_url: None,
                source_name: Some("GEO Lab".to_string()),
                category: cat.to_string(),
                tags: None,
                reading_time_min: *minutes,
                is_featured: *featured,
                published_at: (self.today - Days::new(i as u64 * 9)).to_string(),
            })
            .collect();
        Ok(Page {
            total: items.len() as u64,
            page: 1,
            page_size,
            items,
        })
    }

    fn diagnosis_report(&self, report_id: &str) -> Result<DiagnosisReport> {
        let index = report_id
            .strip_prefix("diag-")
            .and_then(|i| brand_index(i).ok())
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "Report not found".into(),
            })?;
        let (score, _) = base_score(index);
        let (name, domain, ..) = BRANDS[index];
        Ok(DiagnosisReport {
            id: report_id.to_string(),
            brand_name: name.to_string(),
            domain: Some(domain.to_string()),
            category: "Kids Fashion".to_string(),
            score,
            insights: vec![
                format!("{} is mentioned in most product-discovery answers.", name),
                "Citation links are rarely included by Gemini.".to_string(),
            ],
            recommendations: vec![
                "Publish comparison pages that AI assistants can cite.".to_string(),
                "Add structured product data to category pages.".to_string(),
            ],
        })
    }

    fn diagnosis_history(&self) -> Result<Vec<DiagnosisHistoryItem>> {
        Ok((0..3)
            .map(|i| {
                let (score, _) = base_score(i);
                DiagnosisHistoryItem {
                    id: format!("diag-{}", i + 1),
                    brand_name: BRANDS[i].0.to_string(),
                    composite_score: score.composite_score,
                    models_used: vec!["gemini".to_string(), "openai".to_string()],
                    created_at: format!("{}T10:00:00", self.today - Days::new(i as u64 * 3)),
                    category: Some("Kids Fashion".to_string()),
                }
            })
            .collect())
    }

    fn health(&self) -> bool {
        true
    }
}
