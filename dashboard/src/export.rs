use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::Writer;
use thiserror::Error;
use tracing::info;

use crate::analytics::{HeatmapCell, ModelBar};
use crate::model::{BrandWithScore, ScoreCard};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

const NA: &str = "N/A";

fn score_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| NA.to_string(), |v| format!("{}", v))
}

fn rate_or_na(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 => format!("{:.1}%", v * 100.0),
        _ => NA.to_string(),
    }
}

/// `geo-insights-<kind>-<date>.csv`
pub fn file_name(kind: &str, date: NaiveDate) -> String {
    format!("geo-insights-{}-{}.csv", kind, date)
}

pub fn write_brands<W: io::Write>(out: W, brands: &[&BrandWithScore]) -> Result<(), ExportError> {
    let mut writer = Writer::from_writer(out);
    writer.write_record([
        "Name",
        "Category",
        "Domain",
        "Composite Score",
        "Visibility Score",
        "Citation Score",
        "Representation Score",
        "Intent Score",
        "Total Mentions",
        "Avg Rank",
        "Citation Rate",
        "Intent Coverage",
    ])?;

    for b in brands {
        let s = b.score.as_ref();
        writer.write_record(&[
            b.brand.name.clone(),
            b.brand.category.clone(),
            b.brand.domain.clone().unwrap_or_default(),
            score_or_na(s.map(|c| c.score.composite_score)),
            score_or_na(s.map(|c| c.score.visibility_score)),
            score_or_na(s.map(|c| c.score.citation_score)),
            score_or_na(s.map(|c| c.score.representation_score)),
            score_or_na(s.map(|c| c.score.intent_score)),
            s.map_or(0, |c| c.total_mentions).to_string(),
            s.and_then(|c| c.avg_rank)
                .map_or_else(|| NA.to_string(), |r| format!("{:.1}", r)),
            rate_or_na(s.map(|c| c.citation_rate)),
            rate_or_na(s.map(|c| c.intent_coverage)),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_time_series<W: io::Write>(out: W, history: &[&ScoreCard]) -> Result<(), ExportError> {
    let mut writer = Writer::from_writer(out);
    writer.write_record([
        "Date",
        "Composite Score",
        "Visibility Score",
        "Citation Score",
        "Representation Score",
        "Intent Score",
    ])?;
    for card in history {
        let s = &card.score;
        writer.write_record(&[
            card.created_at.get(..10).unwrap_or(&card.created_at).to_string(),
            s.composite_score.to_string(),
            s.visibility_score.to_string(),
            s.citation_score.to_string(),
            s.representation_score.to_string(),
            s.intent_score.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_model_comparison<W: io::Write>(out: W, bars: &[ModelBar]) -> Result<(), ExportError> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(["Model", "Score", "Mentions"])?;
    for bar in bars {
        writer.write_record(&[bar.model.clone(), bar.score.to_string(), bar.mentions.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_heatmap<W: io::Write>(out: W, cells: &[HeatmapCell]) -> Result<(), ExportError> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(["Brand", "Model", "Score"])?;
    for cell in cells {
        writer.write_record(&[cell.brand.clone(), cell.model.clone(), score_or_na(cell.score)])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the brand table into `dir`, returning the file's path.
pub fn save_brands(dir: &Path, brands: &[&BrandWithScore], date: NaiveDate) -> Result<PathBuf, ExportError> {
    let path = dir.join(file_name("brands", date));
    write_brands(File::create(&path)?, brands)?;
    info!(path = %path.display(), rows = brands.len(), "exported brands");
    Ok(path)
}

pub fn save_time_series(dir: &Path, history: &[&ScoreCard], date: NaiveDate) -> Result<PathBuf, ExportError> {
    let path = dir.join(file_name("trends", date));
    write_time_series(File::create(&path)?, history)?;
    info!(path = %path.display(), rows = history.len(), "exported score history");
    Ok(path)
}

pub fn save_model_comparison(dir: &Path, bars: &[ModelBar], date: NaiveDate) -> Result<PathBuf, ExportError> {
    let path = dir.join(file_name("models", date));
    write_model_comparison(File::create(&path)?, bars)?;
    info!(path = %path.display(), rows = bars.len(), "exported model comparison");
    Ok(path)
}

pub fn save_heatmap(dir: &Path, cells: &[HeatmapCell], date: NaiveDate) -> Result<PathBuf, ExportError> {
    let path = dir.join(file_name("heatmap", date));
    write_heatmap(File::create(&path)?, cells)?;
    info!(path = %path.display(), rows = cells.len(), "exported heatmap");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Brand, GeoScore};

    fn tiny_threads() -> BrandWithScore {
        BrandWithScore {
            brand: Brand {
                id: "3".into(),
                name: "TinyThreads, Inc.".into(),
                category: "Kids Fashion".into(),
                ..Brand::default()
            },
            score: Some(ScoreCard {
                score: GeoScore {
                    composite_score: 78.0,
                    visibility_score: 85.0,
                    citation_score: 60.0,
                    representation_score: 75.0,
                    intent_score: 90.0,
                },
                total_mentions: 121,
                avg_rank: Some(2.4),
                citation_rate: 0.42,
                ..ScoreCard::default()
            }),
        }
    }

    #[test]
    fn brand_rows_quote_commas_and_mark_missing_values() {
        let scored = tiny_threads();
        let unscored = BrandWithScore {
            brand: Brand {
                name: "Primary".into(),
                ..Brand::default()
            },
            score: None,
        };
        let mut buf = Vec::new();
        write_brands(&mut buf, &[&scored, &unscored]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Name,Category,Domain,Composite Score"));
        assert_eq!(
            lines[1],
            "\"TinyThreads, Inc.\",Kids Fashion,,78,85,60,75,90,121,2.4,42.0%,N/A"
        );
        assert_eq!(lines[2], "Primary,,,N/A,N/A,N/A,N/A,N/A,0,N/A,N/A,N/A");
    }

    #[test]
    fn time_series_uses_the_date_part() {
        let mut card = tiny_threads().score.unwrap();
        card.created_at = "2024-05-01T09:30:00".into();
        let mut buf = Vec::new();
        write_time_series(&mut buf, &[&card]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().nth(1), Some("2024-05-01,78,85,60,75,90"));
    }

    #[test]
    fn save_writes_a_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let b = tiny_threads();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let path = save_brands(dir.path(), &[&b], date).unwrap();
        assert!(path.ends_with("geo-insights-brands-2024-06-01.csv"));
        assert!(std::fs::read_to_string(path).unwrap().contains("TinyThreads"));
    }

    #[test]
    fn model_and_heatmap_tables() {
        let b = tiny_threads();
        let bars = vec![ModelBar {
            model: "ChatGPT".into(),
            score: 72.5,
            mentions: 40,
        }];
        let mut buf = Vec::new();
        write_model_comparison(&mut buf, &bars).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["Model,Score,Mentions", "ChatGPT,72.5,40"]);

        let cells = vec![
            HeatmapCell {
                brand: b.brand.name.clone(),
                model: "Claude".into(),
                score: Some(70.0),
            },
            HeatmapCell {
                brand: b.brand.name.clone(),
                model: "Gemini".into(),
                score: None,
            },
        ];
        let mut buf = Vec::new();
        write_heatmap(&mut buf, &cells).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().nth(2), Some("\"TinyThreads, Inc.\",Gemini,N/A"));
    }
}
