//! Turns fetched brands and score cards into chart-ready shapes.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::filters::{DateRange, Dimension, FilterState, SortOrder};
use crate::model::{BrandWithScore, EvaluationResult, GeoScore, ScoreCard};

pub const DIMENSION_WEIGHTS: [(Dimension, f64); 4] = [
    (Dimension::Visibility, 0.35),
    (Dimension::Citation, 0.25),
    (Dimension::Representation, 0.25),
    (Dimension::Intent, 0.15),
];

/// Display strings for one score: the composite is a bare number, the
/// dimensions are percentages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreDisplay {
    pub composite: String,
    pub visibility: String,
    pub citation: String,
    pub representation: String,
    pub intent: String,
    pub grade: char,
}

impl ScoreDisplay {
    pub fn new(score: &GeoScore) -> Self {
        Self {
            composite: format!("{:.0}", score.composite_score),
            visibility: percent(score.visibility_score),
            citation: percent(score.citation_score),
            representation: percent(score.representation_score),
            intent: percent(score.intent_score),
            grade: grade(score.composite_score),
        }
    }

    pub fn dimension(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Visibility => &self.visibility,
            Dimension::Citation => &self.citation,
            Dimension::Representation => &self.representation,
            Dimension::Intent => &self.intent,
        }
    }
}

pub fn percent(value: f64) -> String {
    format!("{:.0}%", value)
}

pub fn grade(score: f64) -> char {
    if score >= 80.0 {
        'A'
    } else if score >= 60.0 {
        'B'
    } else if score >= 40.0 {
        'C'
    } else if score >= 20.0 {
        'D'
    } else {
        'F'
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreTier {
    Strong,
    Moderate,
    Weak,
}

impl ScoreTier {
    pub fn of(score: f64) -> Self {
        if score >= 80.0 {
            ScoreTier::Strong
        } else if score >= 50.0 {
            ScoreTier::Moderate
        } else {
            ScoreTier::Weak
        }
    }
}

/// Composite recomputed from the dimensions, rounded.
pub fn weighted_composite(score: &GeoScore) -> f64 {
    DIMENSION_WEIGHTS
        .iter()
        .map(|(d, w)| d.value(score) * w)
        .sum::<f64>()
        .round()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            TrendDirection::Up => "\u{25b2}",
            TrendDirection::Down => "\u{25bc}",
            TrendDirection::Stable => "\u{25ac}",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trend {
    pub direction: TrendDirection,
    pub change: f64,
}

/// Moves smaller than one point count as stable. `change` is absolute,
/// rounded to one decimal.
pub fn trend(current: f64, previous: f64) -> Trend {
    let change = current - previous;
    if change.abs() < 1.0 {
        return Trend {
            direction: TrendDirection::Stable,
            change: 0.0,
        };
    }
    Trend {
        direction: if change > 0.0 { TrendDirection::Up } else { TrendDirection::Down },
        change: (change.abs() * 10.0).round() / 10.0,
    }
}

/// Trend between the last two points of a composite history.
pub fn history_trend(history: &[&ScoreCard]) -> Option<Trend> {
    match history {
        [.., prev, last] => Some(trend(last.score.composite_score, prev.score.composite_score)),
        _ => None,
    }
}

/// Brands to show: pinned brands only (when any are pinned), matching the
/// search text, in the selected order. Unscored brands sort last.
pub fn visible_brands<'a>(filters: &FilterState, brands: &'a [BrandWithScore]) -> Vec<&'a BrandWithScore> {
    let needle = filters.search.trim().to_lowercase();
    let mut out: Vec<&BrandWithScore> = brands
        .iter()
        .filter(|b| filters.brands.is_empty() || filters.brands.contains(&b.brand.id))
        .filter(|b| needle.is_empty() || matches_search(b, &needle))
        .collect();

    match filters.sort {
        SortOrder::CompositeDesc => out.sort_by(|a, b| by_score(a.composite(), b.composite(), true)),
        SortOrder::CompositeAsc => out.sort_by(|a, b| by_score(a.composite(), b.composite(), false)),
        SortOrder::NameAsc => out.sort_by_key(|b| b.brand.name.to_lowercase()),
        SortOrder::VisibilityDesc => out.sort_by(|a, b| {
            let v = |x: &BrandWithScore| x.score.as_ref().map(|s| s.score.visibility_score);
            by_score(v(a), v(b), true)
        }),
    }
    out
}

fn matches_search(b: &BrandWithScore, needle: &str) -> bool {
    b.brand.name.to_lowercase().contains(needle)
        || b.brand.category.to_lowercase().contains(needle)
        || b.brand
            .domain
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

/// Unscored entries go last whichever way the scores run.
fn by_score(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let order = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending {
                order.reverse()
            } else {
                order
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoiceShare {
    pub name: String,
    pub mentions: u64,
    pub percentage: f64,
}

/// Each brand's share of total mentions, largest first. Brands beyond
/// `top` are folded into "Others".
pub fn share_of_voice(brands: &[&BrandWithScore], top: usize) -> Vec<VoiceShare> {
    let mut counts: Vec<(String, u64)> = brands
        .iter()
        .filter_map(|b| {
            b.score
                .as_ref()
                .map(|s| (b.brand.name.clone(), s.total_mentions))
        })
        .filter(|(_, m)| *m > 0)
        .collect();
    let total: u64 = counts.iter().map(|(_, m)| m).sum();
    if total == 0 {
        return Vec::new();
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let others: u64 = counts.iter().skip(top).map(|(_, m)| m).sum();
    counts.truncate(top);
    if others > 0 {
        counts.push(("Others".to_string(), others));
    }

    counts
        .into_iter()
        .map(|(name, mentions)| VoiceShare {
            name,
            mentions,
            percentage: (mentions as f64 * 1000.0 / total as f64).round() / 10.0,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelBar {
    pub model: String,
    pub score: f64,
    pub mentions: u64,
}

/// Per-model scores from one card, restricted to the selected models.
pub fn model_comparison(card: &ScoreCard, filters: &FilterState) -> Vec<ModelBar> {
    card.model_scores
        .iter()
        .filter(|(model, _)| filters.includes_model(model))
        .map(|(model, entry)| ModelBar {
            model: model.clone(),
            score: entry.score,
            mentions: entry.mentions,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapCell {
    pub brand: String,
    pub model: String,
    pub score: Option<f64>,
}

/// Brand × selected-model grid. A model missing from a card is `None`.
pub fn heatmap(brands: &[&BrandWithScore], filters: &FilterState) -> Vec<HeatmapCell> {
    let mut cells = Vec::with_capacity(brands.len() * filters.models.len());
    for b in brands {
        for model in &filters.models {
            let score = b
                .score
                .as_ref()
                .and_then(|s| s.model_scores.get(model))
                .map(|e| e.score);
            cells.push(HeatmapCell {
                brand: b.brand.name.clone(),
                model: model.clone(),
                score,
            });
        }
    }
    cells
}

/// Leading `YYYY-MM-DD` of a timestamp.
pub fn card_date(card: &ScoreCard) -> Option<NaiveDate> {
    card.created_at
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// History points whose date falls in the range. Undated points are dropped.
pub fn history_in_range<'a>(history: &'a [ScoreCard], range: &DateRange) -> Vec<&'a ScoreCard> {
    history
        .iter()
        .filter(|c| card_date(c).is_some_and(|d| range.contains(d)))
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub name: &'static str,
    pub points: Vec<(f64, f64)>,
}

/// Composite plus one line per selected dimension, x = point index.
pub fn dimension_series(history: &[&ScoreCard], dimensions: &[Dimension]) -> Vec<Series> {
    let mut series = vec![Series {
        name: "Composite",
        points: history
            .iter()
            .enumerate()
            .map(|(i, c)| (i as f64, c.score.composite_score))
            .collect(),
    }];
    for dimension in Dimension::ALL.iter().filter(|d| dimensions.contains(d)) {
        series.push(Series {
            name: dimension.label(),
            points: history
                .iter()
                .enumerate()
                .map(|(i, c)| (i as f64, dimension.value(&c.score)))
                .collect(),
        });
    }
    series
}

#[derive(Clone, Debug, PartialEq)]
pub struct RadarPoint {
    pub dimension: Dimension,
    /// (brand name, value) in the order the brands were given.
    pub values: Vec<(String, f64)>,
}

/// One point per dimension with every scored brand's value, for comparing
/// brands side by side. Unscored brands are left out.
pub fn radar(brands: &[&BrandWithScore]) -> Vec<RadarPoint> {
    Dimension::ALL
        .iter()
        .map(|&dimension| RadarPoint {
            dimension,
            values: brands
                .iter()
                .filter_map(|b| {
                    b.score
                        .as_ref()
                        .map(|card| (b.brand.name.clone(), dimension.value(&card.score)))
                })
                .collect(),
        })
        .collect()
}

/// Brands to compare: the pinned ones, or else the first `fallback` rows.
pub fn comparison_brands<'a>(
    filters: &FilterState,
    rows: &'a [BrandWithScore],
    fallback: usize,
) -> Vec<&'a BrandWithScore> {
    if filters.brands.is_empty() {
        rows.iter().take(fallback).collect()
    } else {
        rows.iter().filter(|b| filters.brands.contains(&b.brand.id)).collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunnelStage {
    /// Translation key of the stage label.
    pub key: &'static str,
    pub count: usize,
    pub percentage: f64,
}

fn is_recommended(r: &EvaluationResult) -> bool {
    r.is_mentioned
        && r.sentiment
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("positive"))
}

fn count_where(results: &[&EvaluationResult], f: impl Fn(&EvaluationResult) -> bool) -> usize {
    results.iter().copied().filter(|r| f(*r)).count()
}

/// Query → mentioned → top 3 → cited → recommended, as shares of all
/// results. Empty input gives no stages.
pub fn mention_funnel(results: &[&EvaluationResult]) -> Vec<FunnelStage> {
    let total = results.len();
    if total == 0 {
        return Vec::new();
    }
    [
        ("funnel.queries", total),
        ("funnel.mentioned", count_where(results, |r| r.is_mentioned)),
        (
            "funnel.top3",
            count_where(results, |r| r.is_mentioned && r.mention_rank.is_some_and(|n| n <= 3)),
        ),
        ("funnel.cited", count_where(results, |r| r.is_cited)),
        ("funnel.recommended", count_where(results, is_recommended)),
    ]
    .into_iter()
    .map(|(key, count)| FunnelStage {
        key,
        count,
        percentage: (count as f64 * 1000.0 / total as f64).round() / 10.0,
    })
    .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultSummary {
    pub total: usize,
    pub mentioned: usize,
    pub cited: usize,
    pub brands: usize,
    pub prompts: usize,
}

pub fn result_summary(results: &[EvaluationResult]) -> ResultSummary {
    ResultSummary {
        total: results.len(),
        mentioned: results.iter().filter(|r| r.is_mentioned).count(),
        cited: results.iter().filter(|r| r.is_cited).count(),
        brands: results.iter().map(|r| &r.brand_id).collect::<BTreeSet<_>>().len(),
        prompts: results.iter().map(|r| &r.prompt_text).collect::<BTreeSet<_>>().len(),
    }
}

/// Results whose prompt contains `search`, ignoring case.
pub fn filter_results<'a>(results: &'a [EvaluationResult], search: &str) -> Vec<&'a EvaluationResult> {
    let needle = search.trim().to_lowercase();
    results
        .iter()
        .filter(|r| needle.is_empty() || r.prompt_text.to_lowercase().contains(&needle))
        .collect()
}

/// Distinct brand ids in a run's results, in first-seen order.
pub fn result_brand_ids(results: &[EvaluationResult]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for r in results {
        if !ids.contains(&r.brand_id) {
            ids.push(r.brand_id.clone());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Brand, ModelScoreEntry};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn brand(id: &str, name: &str, composite: Option<f64>, mentions: u64) -> BrandWithScore {
        BrandWithScore {
            brand: Brand {
                id: id.into(),
                name: name.into(),
                category: "Kids Fashion".into(),
                domain: Some(format!("{}.com", name.to_lowercase())),
                ..Brand::default()
            },
            score: composite.map(|c| ScoreCard {
                brand_id: id.into(),
                score: GeoScore {
                    composite_score: c,
                    visibility_score: c + 5.0,
                    ..GeoScore::default()
                },
                total_mentions: mentions,
                model_scores: [("ChatGPT", 80.0), ("Claude", 70.0)]
                    .into_iter()
                    .map(|(m, s)| (m.to_string(), ModelScoreEntry { score: s, mentions: 3 }))
                    .collect(),
                ..ScoreCard::default()
            }),
        }
    }

    #[test]
    fn display_matches_dashboard_format() {
        let score = GeoScore {
            composite_score: 78.0,
            visibility_score: 85.0,
            citation_score: 60.0,
            representation_score: 75.0,
            intent_score: 90.0,
        };
        let d = ScoreDisplay::new(&score);
        assert_eq!(d.composite, "78");
        assert_eq!(d.visibility, "85%");
        assert_eq!(d.dimension(Dimension::Intent), "90%");
        assert_eq!(d.grade, 'B');
    }

    #[test]
    fn grade_and_tier_boundaries() {
        assert_eq!(grade(80.0), 'A');
        assert_eq!(grade(79.9), 'B');
        assert_eq!(grade(40.0), 'C');
        assert_eq!(grade(20.0), 'D');
        assert_eq!(grade(19.9), 'F');
        assert_eq!(ScoreTier::of(50.0), ScoreTier::Moderate);
        assert_eq!(ScoreTier::of(49.0), ScoreTier::Weak);
    }

    #[test]
    fn weighted_composite_uses_dimension_weights() {
        let score = GeoScore {
            composite_score: 0.0,
            visibility_score: 85.0,
            citation_score: 60.0,
            representation_score: 75.0,
            intent_score: 90.0,
        };
        // 29.75 + 15 + 18.75 + 13.5
        assert_eq!(weighted_composite(&score), 77.0);
    }

    #[test]
    fn small_moves_are_stable() {
        assert_eq!(trend(70.5, 70.0).direction, TrendDirection::Stable);
        let t = trend(68.0, 72.4);
        assert_eq!(t.direction, TrendDirection::Down);
        assert_eq!(t.change, 4.4);
    }

    #[test]
    fn pinned_search_and_sort() {
        let brands = vec![
            brand("1", "Carters", Some(82.0), 10),
            brand("2", "Primary", None, 0),
            brand("3", "TinyThreads", Some(78.0), 5),
        ];
        let mut f = FilterState::defaults(today());

        let ids: Vec<&str> = visible_brands(&f, &brands).iter().map(|b| b.brand.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "2"]);

        f.sort = SortOrder::CompositeAsc;
        let ids: Vec<&str> = visible_brands(&f, &brands).iter().map(|b| b.brand.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);

        f.search = "TINY".into();
        assert_eq!(visible_brands(&f, &brands).len(), 1);

        f.search.clear();
        f.brands = vec!["2".into()];
        assert_eq!(visible_brands(&f, &brands)[0].brand.name, "Primary");
    }

    #[test]
    fn share_of_voice_folds_the_tail() {
        let brands = [
            brand("1", "A", Some(80.0), 60),
            brand("2", "B", Some(70.0), 30),
            brand("3", "C", Some(60.0), 10),
        ];
        let refs: Vec<&BrandWithScore> = brands.iter().collect();
        let sov = share_of_voice(&refs, 2);
        assert_eq!(sov.len(), 3);
        assert_eq!(sov[0].percentage, 60.0);
        assert_eq!(sov[2].name, "Others");
        assert_eq!(sov[2].mentions, 10);
        assert!(share_of_voice(&[], 5).is_empty());
    }

    #[test]
    fn model_views_follow_the_model_filter() {
        let b = brand("1", "A", Some(80.0), 1);
        let mut f = FilterState::defaults(today());
        f.models = vec!["Claude".into(), "Gemini".into()];

        let bars = model_comparison(b.score.as_ref().unwrap(), &f);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].model, "Claude");

        let cells = heatmap(&[&b], &f);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].score, Some(70.0));
        assert_eq!(cells[1].score, None);
    }

    #[test]
    fn history_filter_and_series() {
        let history: Vec<ScoreCard> = ["2023-12-01", "2024-03-01T10:00:00", "2024-06-01", "bad"]
            .iter()
            .enumerate()
            .map(|(i, d)| ScoreCard {
                created_at: d.to_string(),
                score: GeoScore {
                    composite_score: 60.0 + i as f64,
                    ..GeoScore::default()
                },
                ..ScoreCard::default()
            })
            .collect();
        let range = FilterState::defaults(today()).date_range;
        let kept = history_in_range(&history, &range);
        assert_eq!(kept.len(), 2);

        let series = dimension_series(&kept, &[Dimension::Citation]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].points, vec![(0.0, 61.0), (1.0, 62.0)]);
        assert_eq!(series[1].name, "Citation");
        assert_eq!(history_trend(&kept).map(|t| t.direction), Some(TrendDirection::Up));
    }

    fn result(prompt: &str, mentioned: bool, rank: Option<u32>, cited: bool, sentiment: Option<&str>) -> EvaluationResult {
        EvaluationResult {
            brand_id: "1".into(),
            prompt_text: prompt.into(),
            is_mentioned: mentioned,
            mention_rank: rank,
            is_cited: cited,
            sentiment: sentiment.map(str::to_string),
            ..EvaluationResult::default()
        }
    }

    #[test]
    fn radar_lines_up_brands_per_dimension() {
        let a = brand("1", "A", Some(80.0), 1);
        let b = brand("2", "B", None, 0);
        let points = radar(&[&a, &b]);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].dimension, Dimension::Visibility);
        assert_eq!(points[0].values, vec![("A".to_string(), a.score.as_ref().unwrap().score.visibility_score)]);

        let mut f = FilterState::defaults(today());
        let rows = vec![a.clone(), b.clone()];
        assert_eq!(comparison_brands(&f, &rows, 1).len(), 1);
        f.brands = vec!["2".into()];
        assert_eq!(comparison_brands(&f, &rows, 1)[0].brand.name, "B");
    }

    #[test]
    fn funnel_narrows_from_queries_to_recommendations() {
        let results = [
            result("best kids brands", true, Some(1), true, Some("positive")),
            result("organic baby", true, Some(5), false, Some("neutral")),
            result("school clothes", true, Some(2), false, Some("Positive")),
            result("budget fashion", false, None, false, None),
        ];
        let refs: Vec<&EvaluationResult> = results.iter().collect();
        let stages = mention_funnel(&refs);
        let counts: Vec<usize> = stages.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![4, 3, 2, 1, 2]);
        assert_eq!(stages[0].percentage, 100.0);
        assert_eq!(stages[1].percentage, 75.0);
        assert_eq!(stages[3].key, "funnel.cited");
        assert!(mention_funnel(&[]).is_empty());
    }

    #[test]
    fn result_summary_and_prompt_filter() {
        let mut results = vec![
            result("Best kids brands", true, Some(1), true, None),
            result("best kids brands", false, None, false, None),
            result("Organic baby", true, Some(2), false, None),
        ];
        results[1].brand_id = "2".into();

        let summary = result_summary(&results);
        assert_eq!(
            summary,
            ResultSummary {
                total: 3,
                mentioned: 2,
                cited: 1,
                brands: 2,
                prompts: 3,
            }
        );
        assert_eq!(filter_results(&results, "KIDS").len(), 2);
        assert_eq!(filter_results(&results, "  ").len(), 3);
        assert_eq!(result_brand_ids(&results), vec!["1".to_string(), "2".to_string()]);
    }
}
