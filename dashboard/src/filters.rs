//! Dashboard filter state and its persistent store.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::GeoScore;
use crate::storage::{LocalStore, FILTERS_KEY};

pub const AI_MODELS: [&str; 4] = ["ChatGPT", "Gemini", "Claude", "Perplexity"];

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Visibility,
    Citation,
    Representation,
    Intent,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Visibility,
        Dimension::Citation,
        Dimension::Representation,
        Dimension::Intent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Visibility => "Visibility",
            Dimension::Citation => "Citation",
            Dimension::Representation => "Representation",
            Dimension::Intent => "Intent",
        }
    }

    pub fn value(&self, score: &GeoScore) -> f64 {
        match self {
            Dimension::Visibility => score.visibility_score,
            Dimension::Citation => score.citation_score,
            Dimension::Representation => score.representation_score,
            Dimension::Intent => score.intent_score,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn months_back(end: NaiveDate, months: u32) -> Self {
        Self {
            start: end.checked_sub_months(Months::new(months)).unwrap_or(end),
            end,
        }
    }

    /// Inclusive on both ends. A reversed range contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    CompositeDesc,
    CompositeAsc,
    NameAsc,
    VisibilityDesc,
}

impl SortOrder {
    pub fn next(self) -> Self {
        match self {
            SortOrder::CompositeDesc => SortOrder::CompositeAsc,
            SortOrder::CompositeAsc => SortOrder::NameAsc,
            SortOrder::NameAsc => SortOrder::VisibilityDesc,
            SortOrder::VisibilityDesc => SortOrder::CompositeDesc,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::CompositeDesc => "score \u{2193}",
            SortOrder::CompositeAsc => "score \u{2191}",
            SortOrder::NameAsc => "name",
            SortOrder::VisibilityDesc => "visibility \u{2193}",
        }
    }
}

/// Quick picks for the date range selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatePreset {
    LastMonth,
    Last3Months,
    Last6Months,
    LastYear,
}

impl DatePreset {
    pub const ALL: [DatePreset; 4] = [
        DatePreset::LastMonth,
        DatePreset::Last3Months,
        DatePreset::Last6Months,
        DatePreset::LastYear,
    ];

    pub fn months(&self) -> u32 {
        match self {
            DatePreset::LastMonth => 1,
            DatePreset::Last3Months => 3,
            DatePreset::Last6Months => 6,
            DatePreset::LastYear => 12,
        }
    }

    pub fn range(&self, today: NaiveDate) -> DateRange {
        DateRange::months_back(today, self.months())
    }

    /// The preset a range corresponds to, if any.
    pub fn matching(range: &DateRange) -> Option<DatePreset> {
        Self::ALL.into_iter().find(|p| p.range(range.end) == *range)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub date_range: DateRange,
    pub brands: Vec<String>,
    pub models: Vec<String>,
    pub dimensions: Vec<Dimension>,
    pub search: String,
    pub sort: SortOrder,
}

impl FilterState {
    /// Last six months ending `today`, every model and dimension selected.
    pub fn defaults(today: NaiveDate) -> Self {
        Self {
            date_range: DatePreset::Last6Months.range(today),
            brands: Vec::new(),
            models: AI_MODELS.iter().map(|m| m.to_string()).collect(),
            dimensions: Dimension::ALL.to_vec(),
            search: String::new(),
            sort: SortOrder::default(),
        }
    }

    /// Replace exactly one field.
    pub fn apply(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::DateRange(v) => self.date_range = v,
            FilterUpdate::Brands(v) => self.brands = v,
            FilterUpdate::Models(v) => self.models = v,
            FilterUpdate::Dimensions(v) => self.dimensions = v,
            FilterUpdate::Search(v) => self.search = v,
            FilterUpdate::Sort(v) => self.sort = v,
        }
    }

    /// Overlay every field the patch sets.
    pub fn merge(&mut self, patch: FilterPatch) {
        for update in patch.into_updates() {
            self.apply(update);
        }
    }

    pub fn includes_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m.eq_ignore_ascii_case(model))
    }
}

/// One field's new value.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterUpdate {
    DateRange(DateRange),
    Brands(Vec<String>),
    Models(Vec<String>),
    Dimensions(Vec<Dimension>),
    Search(String),
    Sort(SortOrder),
}

/// A partial [`FilterState`], as persisted or passed by a caller.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterPatch {
    pub date_range: Option<DateRange>,
    pub brands: Option<Vec<String>>,
    pub models: Option<Vec<String>>,
    pub dimensions: Option<Vec<Dimension>>,
    pub search: Option<String>,
    pub sort: Option<SortOrder>,
}

impl FilterPatch {
    pub fn into_updates(self) -> Vec<FilterUpdate> {
        let mut updates = Vec::new();
        if let Some(v) = self.date_range {
            updates.push(FilterUpdate::DateRange(v));
        }
        if let Some(v) = self.brands {
            updates.push(FilterUpdate::Brands(v));
        }
        if let Some(v) = self.models {
            updates.push(FilterUpdate::Models(v));
        }
        if let Some(v) = self.dimensions {
            updates.push(FilterUpdate::Dimensions(v));
        }
        if let Some(v) = self.search {
            updates.push(FilterUpdate::Search(v));
        }
        if let Some(v) = self.sort {
            updates.push(FilterUpdate::Sort(v));
        }
        updates
    }
}

/// Owns the live [`FilterState`] and writes every change back to the
/// local store.
#[derive(Debug)]
pub struct FilterStore {
    state: FilterState,
    defaults: FilterState,
    today: NaiveDate,
    store: Option<LocalStore>,
}

impl FilterStore {
    /// Rehydrate: defaults, then whatever was persisted, then `overrides`.
    /// An unreadable persisted value is logged and ignored.
    pub fn open(store: Option<LocalStore>, today: NaiveDate, overrides: FilterPatch) -> Self {
        let defaults = FilterState::defaults(today);
        let mut state = defaults.clone();

        if let Some(raw) = store.as_ref().and_then(|s| s.get(FILTERS_KEY)) {
            match serde_json::from_str::<FilterPatch>(&raw) {
                Ok(saved) => state.merge(saved),
                Err(e) => warn!(
                    key = FILTERS_KEY,
                    error = %e,
                    discarded = %raw,
                    "ignoring malformed saved filters"
                ),
            }
        }
        state.merge(overrides);

        let filters = Self {
            state,
            defaults,
            today,
            store,
        };
        filters.persist();
        filters
    }

    /// A store that never touches disk.
    pub fn in_memory(today: NaiveDate) -> Self {
        Self::open(None, today, FilterPatch::default())
    }

    pub fn filters(&self) -> &FilterState {
        &self.state
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn update_filter(&mut self, update: FilterUpdate) {
        self.state.apply(update);
        self.persist();
    }

    pub fn reset_filters(&mut self) {
        self.state = self.defaults.clone();
        self.persist();
    }

    /// All models, then each model alone in turn, then back to all.
    pub fn cycle_model(&mut self) {
        let next = cycle_focus(self.state.models.as_slice(), &AI_MODELS.map(String::from)[..]);
        self.update_filter(FilterUpdate::Models(next));
    }

    /// Same walk as [`cycle_model`](Self::cycle_model), over dimensions.
    pub fn cycle_dimension(&mut self) {
        let next = cycle_focus(self.state.dimensions.as_slice(), &Dimension::ALL[..]);
        self.update_filter(FilterUpdate::Dimensions(next));
    }

    /// Pin or unpin a brand.
    pub fn toggle_brand(&mut self, brand_id: &str) {
        let mut brands = self.state.brands.clone();
        match brands.iter().position(|b| b == brand_id) {
            Some(i) => {
                brands.remove(i);
            }
            None => brands.push(brand_id.to_string()),
        }
        self.update_filter(FilterUpdate::Brands(brands));
    }

    pub fn cycle_sort(&mut self) {
        let next = self.state.sort.next();
        self.update_filter(FilterUpdate::Sort(next));
    }

    pub fn apply_date_preset(&mut self, preset: DatePreset) {
        self.update_filter(FilterUpdate::DateRange(preset.range(self.today)));
    }

    /// Step to the next wider preset, wrapping from a year back to a month.
    pub fn cycle_date_preset(&mut self) {
        let next = match DatePreset::matching(&self.state.date_range) {
            Some(DatePreset::LastMonth) => DatePreset::Last3Months,
            Some(DatePreset::Last3Months) => DatePreset::Last6Months,
            Some(DatePreset::Last6Months) => DatePreset::LastYear,
            Some(DatePreset::LastYear) | None => DatePreset::LastMonth,
        };
        self.apply_date_preset(next);
    }

    fn persist(&self) {
        let Some(store) = &self.store else { return };
        match serde_json::to_string(&self.state) {
            Ok(json) => {
                match store.set(FILTERS_KEY, &json) {
                    Ok(()) => debug!(key = FILTERS_KEY, "filters saved"),
                    Err(e) => warn!(key = FILTERS_KEY, error = %e, "failed to save filters"),
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize filters"),
        }
    }
}

fn cycle_focus<T: Clone + PartialEq>(current: &[T], all: &[T]) -> Vec<T> {
    if current.len() == 1 {
        match all.iter().position(|x| *x == current[0]) {
            Some(i) if i + 1 < all.len() => vec![all[i + 1].clone()],
            _ => all.to_vec(),
        }
    } else {
        all.first().map(|x| vec![x.clone()]).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 31).unwrap()
    }

    #[test]
    fn defaults_cover_six_months_and_everything_selected() {
        let f = FilterState::defaults(today());
        assert_eq!(f.date_range.start, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(f.date_range.end, today());
        assert!(f.brands.is_empty());
        assert_eq!(f.models, vec!["ChatGPT", "Gemini", "Claude", "Perplexity"]);
        assert_eq!(f.dimensions.len(), 4);
        assert_eq!(f.sort, SortOrder::CompositeDesc);
    }

    #[test]
    fn update_touches_only_its_field() {
        let mut store = FilterStore::in_memory(today());
        store.update_filter(FilterUpdate::Brands(vec!["3".into()]));
        let before = store.filters().clone();

        store.update_filter(FilterUpdate::Search("tiny".into()));
        let after = store.filters();
        assert_eq!(after.search, "tiny");
        assert_eq!(after.date_range, before.date_range);
        assert_eq!(after.brands, before.brands);
        assert_eq!(after.models, before.models);
        assert_eq!(after.dimensions, before.dimensions);
        assert_eq!(after.sort, before.sort);
    }

    #[test]
    fn reversed_date_range_is_accepted() {
        let mut store = FilterStore::in_memory(today());
        let range = DateRange {
            start: today(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        store.update_filter(FilterUpdate::DateRange(range));
        assert_eq!(store.filters().date_range, range);
        assert!(!range.contains(today()));
    }

    #[test]
    fn reset_restores_defaults_from_any_state() {
        let mut store = FilterStore::in_memory(today());
        store.cycle_model();
        store.cycle_dimension();
        store.toggle_brand("1");
        store.cycle_sort();
        store.apply_date_preset(DatePreset::LastYear);
        store.reset_filters();
        assert_eq!(*store.filters(), FilterState::defaults(today()));
    }

    #[test]
    fn saved_partial_filters_are_merged_and_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();
        local
            .set(FILTERS_KEY, r#"{"brands":["2"],"search":"kids"}"#)
            .unwrap();

        let overrides = FilterPatch {
            search: Some("threads".into()),
            ..FilterPatch::default()
        };
        let store = FilterStore::open(Some(local), today(), overrides);
        assert_eq!(store.filters().brands, vec!["2"]);
        assert_eq!(store.filters().search, "threads");
        assert_eq!(store.filters().models.len(), 4);
    }

    #[test]
    fn malformed_saved_filters_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();
        local.set(FILTERS_KEY, "{not json").unwrap();

        let store = FilterStore::open(Some(local.clone()), today(), FilterPatch::default());
        assert_eq!(*store.filters(), FilterState::defaults(today()));
        // the bad value is replaced by a readable one
        let saved = local.get(FILTERS_KEY).unwrap();
        assert!(serde_json::from_str::<FilterPatch>(&saved).is_ok());
    }

    #[test]
    fn changes_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();
        let mut store = FilterStore::open(Some(local.clone()), today(), FilterPatch::default());
        store.toggle_brand("5");
        store.cycle_sort();

        let reopened = FilterStore::open(Some(local), today(), FilterPatch::default());
        assert_eq!(reopened.filters().brands, vec!["5"]);
        assert_eq!(reopened.filters().sort, SortOrder::CompositeAsc);
    }

    #[test]
    fn model_focus_walks_each_model_then_all() {
        let mut store = FilterStore::in_memory(today());
        let mut seen = Vec::new();
        for _ in 0..5 {
            store.cycle_model();
            seen.push(store.filters().models.clone());
        }
        assert_eq!(seen[0], vec!["ChatGPT"]);
        assert_eq!(seen[3], vec!["Perplexity"]);
        assert_eq!(seen[4].len(), 4);
    }

    #[test]
    fn toggling_a_brand_twice_unpins_it() {
        let mut store = FilterStore::in_memory(today());
        store.toggle_brand("3");
        assert_eq!(store.filters().brands, vec!["3"]);
        store.toggle_brand("3");
        assert!(store.filters().brands.is_empty());
    }

    #[test]
    fn date_presets_cycle_from_the_default() {
        let mut store = FilterStore::in_memory(today());
        assert_eq!(DatePreset::matching(&store.filters().date_range), Some(DatePreset::Last6Months));
        store.cycle_date_preset();
        assert_eq!(DatePreset::matching(&store.filters().date_range), Some(DatePreset::LastYear));
        store.cycle_date_preset();
        assert_eq!(DatePreset::matching(&store.filters().date_range), Some(DatePreset::LastMonth));
    }
}
