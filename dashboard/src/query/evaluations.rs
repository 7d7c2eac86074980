use tracing::info;

use super::Query;
use crate::api::GeoApi;
use crate::error::Result;
use crate::filters::AI_MODELS;
use crate::model::{EvaluationCreate, EvaluationResult, EvaluationRun, EvaluationRunDetail, EvaluationStatus};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvaluationRunsQuery {
    pub status: Option<EvaluationStatus>,
}

impl Query for EvaluationRunsQuery {
    type Output = Vec<EvaluationRun>;
    const FAILURE: &'static str = "Failed to fetch evaluations";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        api.list_evaluations(self.status)
    }
}

/// Detail for one run; idle until a run is selected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvaluationDetailQuery {
    pub run_id: Option<String>,
}

impl Query for EvaluationDetailQuery {
    type Output = Option<EvaluationRunDetail>;
    const FAILURE: &'static str = "Failed to fetch evaluation details";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        match &self.run_id {
            Some(run_id) => api.get_evaluation(run_id).map(Some),
            None => Ok(None),
        }
    }

    fn enabled(&self) -> bool {
        self.run_id.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvaluationResultsQuery {
    pub run_id: Option<String>,
    pub brand_id: Option<String>,
    pub model_name: Option<String>,
}

impl Query for EvaluationResultsQuery {
    type Output = Vec<EvaluationResult>;
    const FAILURE: &'static str = "Failed to fetch evaluation results";

    fn run(&self, api: &dyn GeoApi) -> Result<Self::Output> {
        match &self.run_id {
            Some(run_id) => api.evaluation_results(
                run_id,
                self.brand_id.as_deref(),
                self.model_name.as_deref(),
            ),
            None => Ok(Vec::new()),
        }
    }

    fn enabled(&self) -> bool {
        self.run_id.is_some()
    }
}

/// Queue a new evaluation run. No models means every model; no brands
/// leaves the choice to the backend (the whole workspace).
pub fn start_evaluation(
    api: &dyn GeoApi,
    name: Option<String>,
    models: Vec<String>,
    brand_ids: Vec<String>,
) -> Result<EvaluationRun> {
    let models = if models.is_empty() {
        AI_MODELS.iter().map(|m| m.to_string()).collect()
    } else {
        models
    };
    let request = EvaluationCreate {
        name,
        models,
        brand_ids: (!brand_ids.is_empty()).then_some(brand_ids),
        prompt_ids: None,
    };
    let run = api.create_evaluation(&request)?;
    info!(run_id = %run.id, models = request.models.len(), "evaluation queued");
    Ok(run)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::MockApi;
    use crate::query::Fetcher;
    use crate::storage::TokenStore;

    fn api() -> Arc<dyn GeoApi> {
        Arc::new(MockApi::new(TokenStore::in_memory()))
    }

    #[test]
    fn results_wait_for_a_run() {
        let results = Fetcher::new(api(), EvaluationResultsQuery::default());
        assert!(!results.state().loading);
        results.refetch_blocking();
        assert!(results.state().data.is_empty());
    }

    #[test]
    fn results_narrow_by_model() {
        let results = Fetcher::new(
            api(),
            EvaluationResultsQuery {
                run_id: Some("run-1".into()),
                brand_id: Some("1".into()),
                model_name: Some("Claude".into()),
            },
        );
        results.refetch_blocking();
        let state = results.state();
        assert_eq!(state.error, None);
        assert!(!state.data.is_empty());
        assert!(state
            .data
            .iter()
            .all(|r| r.model_name == "Claude" && r.evaluation_run_id == "run-1"));
    }

    #[test]
    fn new_run_defaults_to_every_model() {
        let api = api();
        let run = start_evaluation(api.as_ref(), Some("Nightly".into()), Vec::new(), Vec::new()).unwrap();
        assert_eq!(run.status, EvaluationStatus::Pending);
        assert_eq!(run.models_used.len(), AI_MODELS.len());
        assert_eq!(run.label(), "Nightly");

        let runs = Fetcher::new(api, EvaluationRunsQuery::default());
        runs.refetch_blocking();
        assert!(runs.state().data.iter().any(|r| r.id == run.id));
    }
}
