use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope::decode_list;
use super::{GeoApi, PromptQuery};
use crate::error::{ApiError, Result};
use crate::model::{
    AiModelInfo, Article, AuthToken, Brand, CategoryInfo, DiagnosisHistoryItem, DiagnosisReport,
    EvaluationCreate, EvaluationResult, EvaluationRun, EvaluationRunDetail, EvaluationStatus,
    LoginCredentials, Page, Prompt, PromptCategory, RegisterData, ScoreCard, User,
};
use crate::storage::TokenStore;

type Params = Vec<(&'static str, String)>;

/// Blocking client for the GEO backend's `/api/v1` surface.
pub struct HttpApi {
    client: Client,
    base_url: String,
    workspace_id: String,
    tokens: TokenStore,
}

impl HttpApi {
    pub fn new(base_url: &str, workspace_id: &str, timeout: Duration, tokens: TokenStore) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            workspace_id: workspace_id.to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn workspace(&self) -> Params {
        vec![("workspace_id", self.workspace_id.clone())]
    }

    /// Send a request, attaching the bearer token when one is stored.
    /// Empty 2xx bodies come back as `Value::Null`.
    fn execute(&self, path: &str, request: RequestBuilder) -> Result<Value> {
        let request = match self.tokens.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        debug!(path, "api request");
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let message = error_detail(&body).unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            warn!(path, status = status.as_u16(), %message, "api request failed");
            if status == StatusCode::UNAUTHORIZED {
                return Err(ApiError::Unauthorized(message));
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, params: &Params) -> Result<T> {
        let request = self.client.get(self.endpoint(path)).query(params);
        decode(path, self.execute(path, request)?)
    }

    fn get_list<T: DeserializeOwned>(&self, path: &str, params: &Params) -> Result<Page<T>> {
        let request = self.client.get(self.endpoint(path)).query(params);
        decode_list(path, self.execute(path, request)?)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, params: &Params, body: &B) -> Result<T> {
        let request = self.client.post(self.endpoint(path)).query(params).json(body);
        decode(path, self.execute(path, request)?)
    }
}

impl GeoApi for HttpApi {
    fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken> {
        let path = "/auth/login";
        let request = self.client.post(self.endpoint(path)).form(&[
            ("username", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
        ]);
        decode(path, self.execute(path, request)?)
    }

    fn register(&self, data: &RegisterData) -> Result<User> {
        self.post("/auth/register", &Params::new(), data)
    }

    fn logout(&self) -> Result<()> {
        let path = "/auth/logout";
        self.execute(path, self.client.post(self.endpoint(path)))?;
        Ok(())
    }

    fn me(&self) -> Result<User> {
        self.get("/auth/me", &Params::new())
    }

    fn list_brands(&self, page: u32, page_size: u32) -> Result<Page<Brand>> {
        let mut params = self.workspace();
        params.push(("page", page.to_string()));
        params.push(("page_size", page_size.to_string()));
        self.get_list("/brands", &params)
    }

    fn get_brand(&self, brand_id: &str) -> Result<Brand> {
        self.get(&format!("/brands/{}", brand_id), &self.workspace())
    }

    fn latest_score(&self, brand_id: &str) -> Result<Option<ScoreCard>> {
        match self.get(&format!("/scores/brand/{}/latest", brand_id), &self.workspace()) {
            Ok(card) => Ok(Some(card)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn score_history(&self, brand_id: &str, limit: u32) -> Result<Vec<ScoreCard>> {
        let mut params = self.workspace();
        params.push(("limit", limit.to_string()));
        Ok(self.get_list(&format!("/scores/brand/{}", brand_id), &params)?.items)
    }

    fn list_evaluations(&self, status: Option<EvaluationStatus>) -> Result<Vec<EvaluationRun>> {
        let mut params = self.workspace();
        if let Some(status) = status {
            params.push(("status", status.as_str().to_string()));
        }
        Ok(self.get_list("/evaluations", &params)?.items)
    }

    fn get_evaluation(&self, run_id: &str) -> Result<EvaluationRunDetail> {
        self.get(&format!("/evaluations/{}", run_id), &self.workspace())
    }

    fn create_evaluation(&self, request: &EvaluationCreate) -> Result<EvaluationRun> {
        self.post("/evaluations", &self.workspace(), request)
    }

    fn evaluation_results(
        &self,
        run_id: &str,
        brand_id: Option<&str>,
        model_name: Option<&str>,
    ) -> Result<Vec<EvaluationResult>> {
        let mut params = self.workspace();
        if let Some(brand_id) = brand_id {
            params.push(("brand_id", brand_id.to_string()));
        }
        if let Some(model_name) = model_name {
            params.push(("model_name", model_name.to_string()));
        }
        Ok(self
            .get_list(&format!("/evaluations/{}/results", run_id), &params)?
            .items)
    }

    fn list_models(&self) -> Result<Vec<AiModelInfo>> {
        Ok(self.get_list("/models/", &Params::new())?.items)
    }

    fn list_prompts(&self, query: &PromptQuery) -> Result<Page<Prompt>> {
        let mut params: Params = vec![
            ("page", query.page.max(1).to_string()),
            ("page_size", query.page_size.to_string()),
        ];
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        self.get_list("/prompts/", &params)
    }

    fn prompt_categories(&self) -> Result<Vec<PromptCategory>> {
        Ok(self.get_list("/prompts/categories", &Params::new())?.items)
    }

    fn industry_categories(&self) -> Result<Vec<CategoryInfo>> {
        Ok(self.get_list("/industry/categories", &Params::new())?.items)
    }

    fn list_articles(&self, category: Option<&str>, page_size: u32) -> Result<Page<Article>> {
        let mut params: Params = vec![("page_size", page_size.to_string())];
        if let Some(category) = category {
            params.push(("category", category.to_string()));
        }
        self.get_list("/articles", &params)
    }

    fn diagnosis_report(&self, report_id: &str) -> Result<DiagnosisReport> {
        self.get(&format!("/diagnosis/{}", report_id), &Params::new())
    }

    fn diagnosis_history(&self) -> Result<Vec<DiagnosisHistoryItem>> {
        Ok(self.get_list("/diagnosis/history", &Params::new())?.items)
    }

    fn health(&self) -> bool {
        match self.client.get(format!("{}/health", self.base_url)).send() {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        }
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// FastAPI puts the reason under `detail`, either as a string or as a list
/// of validation errors.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_is_used_verbatim() {
        assert_eq!(
            error_detail(r#"{"detail":"Brand not found"}"#).as_deref(),
            Some("Brand not found")
        );
    }

    #[test]
    fn non_json_error_body_has_no_detail() {
        assert_eq!(error_detail("<html>502</html>"), None);
        assert_eq!(error_detail(r#"{"error":"x"}"#), None);
    }

    #[test]
    fn endpoint_is_versioned_under_base() {
        let api = HttpApi::new(
            "http://localhost:8000/",
            "ws-demo-001",
            Duration::from_secs(1),
            TokenStore::in_memory(),
        )
        .unwrap();
        assert_eq!(api.endpoint("/brands"), "http://localhost:8000/api/v1/brands");
    }
}
