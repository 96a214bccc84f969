//! crates/seo_booster_core/src/export.rs
//!
//! CSV rendering of a single analysis result, with mode-specific headers.

use crate::domain::{AnalysisResult, AnalysisType};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV output was not valid UTF-8")]
    Encoding,
}

/// Suggested download name, e.g. `seo_booster_export_keywords.csv`.
pub fn csv_file_name(analysis_type: AnalysisType) -> String {
    format!(
        "seo_booster_export_{}.csv",
        analysis_type.as_str().to_lowercase()
    )
}

/// Renders `result` as CSV with CRLF line endings.
pub fn result_to_csv(result: &AnalysisResult) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    match result {
        AnalysisResult::Keywords(keywords) => {
            writer.write_record(["Keyword", "Category", "Reason"])?;
            for keyword in keywords {
                writer.write_record([
                    keyword.word.as_str(),
                    keyword.category.as_str(),
                    keyword.reason.as_str(),
                ])?;
            }
        }
        AnalysisResult::Competitors(competitors) => {
            writer.write_record(["Competitor", "Strategy", "Keywords", "Weakness"])?;
            for competitor in competitors {
                let keywords = competitor.keywords.join(", ");
                writer.write_record([
                    competitor.name.as_str(),
                    competitor.strategy.as_str(),
                    keywords.as_str(),
                    competitor.weakness.as_str(),
                ])?;
            }
        }
        AnalysisResult::ImprovedText(text) => {
            writer.write_record(["Improved Text"])?;
            writer.write_record([text.as_str()])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    String::from_utf8(bytes).map_err(|_| ExportError::Encoding)
}
