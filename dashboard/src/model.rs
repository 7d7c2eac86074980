use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// --- auth ---

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.email)
    }
}

#[derive(Clone, Debug)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AuthToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

// --- /brands ---

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
pub struct Brand {
    pub id: String,
    #[serde(default)]
    pub workspace_id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub positioning: Option<String>,
    #[serde(default)]
    pub price_tier: Option<String>,
    #[serde(default)]
    pub target_age_range: Option<String>,
    #[serde(default)]
    pub target_keywords: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

// --- /scores ---

/// The four GEO dimensions plus their composite. The backend sends
/// `*_score` names; report and diagnosis payloads use the short forms.
#[derive(Deserialize, Serialize, Clone, Copy, Default, Debug, PartialEq)]
pub struct GeoScore {
    #[serde(alias = "composite")]
    pub composite_score: f64,
    #[serde(alias = "visibility")]
    pub visibility_score: f64,
    #[serde(alias = "citation")]
    pub citation_score: f64,
    #[serde(alias = "representation")]
    pub representation_score: f64,
    #[serde(alias = "intent")]
    pub intent_score: f64,
}

#[derive(Deserialize, Serialize, Clone, Copy, Default, Debug, PartialEq)]
pub struct ModelScoreEntry {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub mentions: u64,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
pub struct ScoreCard {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub brand_id: String,
    #[serde(default)]
    pub evaluation_run_id: Option<String>,
    #[serde(flatten)]
    pub score: GeoScore,
    #[serde(default)]
    pub total_mentions: u64,
    #[serde(default)]
    pub avg_rank: Option<f64>,
    #[serde(default)]
    pub citation_rate: f64,
    #[serde(default)]
    pub intent_coverage: f64,
    #[serde(default)]
    pub model_scores: BTreeMap<String, ModelScoreEntry>,
    #[serde(default)]
    pub evaluation_count: u64,
    #[serde(default)]
    pub last_evaluation_date: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
pub struct BrandWithScore {
    #[serde(flatten)]
    pub brand: Brand,
    #[serde(default)]
    pub score: Option<ScoreCard>,
}

impl BrandWithScore {
    pub fn composite(&self) -> Option<f64> {
        self.score.as_ref().map(|s| s.score.composite_score)
    }
}

// --- /evaluations ---

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl EvaluationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationStatus::Pending => "pending",
            EvaluationStatus::Running => "running",
            EvaluationStatus::Completed => "completed",
            EvaluationStatus::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, EvaluationStatus::Completed | EvaluationStatus::Failed)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct EvaluationRun {
    pub id: String,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub models_used: Vec<String>,
    pub status: EvaluationStatus,
    /// 0-100
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub prompt_count: u64,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl EvaluationRun {
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.brand_name.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
pub struct EvaluationResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub evaluation_run_id: String,
    #[serde(default)]
    pub brand_id: String,
    #[serde(default)]
    pub prompt_id: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub prompt_text: String,
    #[serde(default)]
    pub intent_category: String,
    #[serde(default)]
    pub response_text: String,
    #[serde(default)]
    pub is_mentioned: bool,
    #[serde(default)]
    pub mention_rank: Option<u32>,
    #[serde(default)]
    pub mention_context: Option<String>,
    #[serde(default)]
    pub is_cited: bool,
    #[serde(default)]
    pub citation_urls: Vec<String>,
    #[serde(default)]
    pub representation_score: f64,
    #[serde(default)]
    pub description_text: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub intent_fit_score: Option<f64>,
    #[serde(default)]
    pub response_time_ms: Option<f64>,
    #[serde(default)]
    pub evaluated_at: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct EvaluationRunDetail {
    #[serde(flatten)]
    pub run: EvaluationRun,
    #[serde(default)]
    pub results: Vec<EvaluationResult>,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct EvaluationCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_ids: Option<Vec<String>>,
}

// --- /prompts, /models, /industry ---

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Prompt {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub intent_category: String,
    #[serde(default = "default_prompt_weight")]
    pub weight: u8,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn default_prompt_weight() -> u8 {
    5
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct PromptCategory {
    pub category: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct AiModelInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct CategoryInfo {
    pub category: String,
    #[serde(default)]
    pub brand_count: u64,
    #[serde(default)]
    pub eval_count: u64,
    #[serde(default)]
    pub avg_composite: f64,
}

// --- /articles, /diagnosis ---

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Article {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub reading_time_min: u32,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub published_at: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct DiagnosisReport {
    pub id: String,
    pub brand_name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(flatten)]
    pub score: GeoScore,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct DiagnosisHistoryItem {
    pub id: String,
    pub brand_name: String,
    #[serde(default)]
    pub composite_score: f64,
    #[serde(default)]
    pub models_used: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub category: Option<String>,
}

// --- pagination ---

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_card_accepts_long_and_short_dimension_names() {
        let long: ScoreCard = serde_json::from_str(
            r#"{"composite_score":78,"visibility_score":85,"citation_score":60,
                "representation_score":75,"intent_score":90,"total_mentions":12}"#,
        )
        .unwrap();
        let short: GeoScore = serde_json::from_str(
            r#"{"composite":78,"visibility":85,"citation":60,"representation":75,"intent":90}"#,
        )
        .unwrap();
        assert_eq!(long.score, short);
        assert_eq!(long.total_mentions, 12);
        assert!(long.model_scores.is_empty());
    }

    #[test]
    fn brand_with_score_flattens_brand_fields() {
        let b: BrandWithScore = serde_json::from_str(
            r#"{"id":"b1","name":"TinyThreads","category":"Kids Fashion"}"#,
        )
        .unwrap();
        assert_eq!(b.brand.name, "TinyThreads");
        assert!(b.score.is_none());
        assert_eq!(b.composite(), None);
    }

    #[test]
    fn evaluation_status_is_lowercase_on_the_wire() {
        let run: EvaluationRun =
            serde_json::from_str(r#"{"id":"r1","status":"running","progress":40}"#).unwrap();
        assert_eq!(run.status, EvaluationStatus::Running);
        assert!(!run.status.is_finished());
        assert_eq!(run.label(), "r1");
    }

    #[test]
    fn user_display_name_prefers_full_name() {
        let mut user = User {
            id: 1,
            email: "ana@example.com".into(),
            full_name: None,
            workspace_id: None,
            is_active: true,
            is_superuser: false,
        };
        assert_eq!(user.display_name(), "ana@example.com");
        user.full_name = Some("Ana".into());
        assert_eq!(user.display_name(), "Ana");
    }
}
