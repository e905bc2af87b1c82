//! Persisted artifacts: a tabular CSV and a line-delimited JSON export.
//!
//! Both exports drop duplicates by (reviewer name, review text, review
//! date), looser than the session's in-memory identity, matching what the
//! downstream spreadsheet consumers expect. The JSONL variant additionally
//! pushes every string field through the legacy-encoding sanitizer so the
//! file stays byte-stable for non-Unicode-aware tooling.

use crate::error::ScrapeError;
use crate::normalize::sanitize_for_legacy_encoding;
use crate::scrape::types::Review;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

/// Write the deduplicated reviews as CSV. Returns how many rows were
/// written.
pub fn save_csv(reviews: &[Review], path: &Path) -> Result<usize, ScrapeError> {
    let deduped = dedup_for_export(reviews);
    let mut writer = csv::Writer::from_path(path)?;
    for review in &deduped {
        writer.serialize(review)?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = deduped.len(), "csv export written");
    Ok(deduped.len())
}

/// Write the deduplicated reviews as sanitized JSONL. Returns how many
/// lines were written.
pub fn save_jsonl(reviews: &[Review], path: &Path) -> Result<usize, ScrapeError> {
    let deduped = dedup_for_export(reviews);
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    for review in &deduped {
        let line = serde_json::to_string(&sanitize_review(review))
            .map_err(std::io::Error::from)?;
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), lines = deduped.len(), "jsonl export written");
    Ok(deduped.len())
}

/// Export-level dedup key: (name, text, date).
fn dedup_for_export(reviews: &[Review]) -> Vec<Review> {
    let mut seen = HashSet::new();
    reviews
        .iter()
        .filter(|r| {
            seen.insert((
                r.reviewer_name.clone(),
                r.review_text.clone(),
                r.review_date.clone(),
            ))
        })
        .cloned()
        .collect()
}

fn sanitize_review(review: &Review) -> Review {
    let mut out = review.clone();
    for field in [
        &mut out.reviewer_name,
        &mut out.reviewer_name_normalized,
        &mut out.review_text,
        &mut out.review_text_normalized,
        &mut out.review_date,
        &mut out.review_date_normalized,
        &mut out.variant,
        &mut out.variant_normalized,
    ] {
        *field = sanitize_for_legacy_encoding(field);
    }
    out
}
