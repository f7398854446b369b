//! Candidate selection: filter and rank the scored universe.

use crate::domain::scoring::AssetRecord;

/// Selection filters. `min_quality_score = 0` and `min_value_score = 0.0`
/// are sentinels that disable the respective filter; `top_n = 0` disables
/// the top-N truncation.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionFilters {
    pub min_quality_score: i64,
    pub min_value_score: f64,
    pub top_n: usize,
    pub max_assets: usize,
}

impl Default for SelectionFilters {
    fn default() -> Self {
        SelectionFilters {
            min_quality_score: 0,
            min_value_score: 0.0,
            top_n: 0,
            max_assets: 10,
        }
    }
}

/// Filter and rank scored records into the candidate list.
///
/// Records failing the minimum-score filters drop out; the survivors are
/// sorted by value score descending (stable, so ties keep provider order)
/// and truncated to `top_n` (when set) and then `max_assets`. An empty
/// result is a valid outcome, not an error.
pub fn select_candidates(records: &[AssetRecord], filters: &SelectionFilters) -> Vec<AssetRecord> {
    let mut candidates: Vec<AssetRecord> = records
        .iter()
        .filter(|r| filters.min_quality_score == 0 || r.quality_score >= filters.min_quality_score)
        .filter(|r| filters.min_value_score == 0.0 || r.value_score >= filters.min_value_score)
        .cloned()
        .collect();

    candidates.sort_by(|a, b| {
        b.value_score
            .partial_cmp(&a.value_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if filters.top_n > 0 {
        candidates.truncate(filters.top_n);
    }
    candidates.truncate(filters.max_assets);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ticker: &str, quality: i64, value: f64) -> AssetRecord {
        AssetRecord {
            ticker: ticker.to_string(),
            quality_score: quality,
            value_score: value,
        }
    }

    fn sample_records() -> Vec<AssetRecord> {
        vec![
            record("AAA", 8, 0.90),
            record("BBB", 3, 0.85),
            record("CCC", 7, 0.60),
            record("DDD", 2, 0.95),
            record("EEE", 6, 0.70),
        ]
    }

    #[test]
    fn quality_filter_drops_failing_records() {
        let filters = SelectionFilters {
            min_quality_score: 5,
            ..Default::default()
        };
        let out = select_candidates(&sample_records(), &filters);
        let tickers: Vec<&str> = out.iter().map(|r| r.ticker.as_str()).collect();
        // BBB and DDD fail; remainder ordered by value score descending.
        assert_eq!(tickers, vec!["AAA", "EEE", "CCC"]);
    }

    #[test]
    fn zero_sentinels_disable_min_filters() {
        let filters = SelectionFilters {
            min_quality_score: 0,
            min_value_score: 0.0,
            top_n: 0,
            max_assets: 10,
        };
        let out = select_candidates(&sample_records(), &filters);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0].ticker, "DDD");
    }

    #[test]
    fn value_filter() {
        let filters = SelectionFilters {
            min_value_score: 0.8,
            ..Default::default()
        };
        let out = select_candidates(&sample_records(), &filters);
        let tickers: Vec<&str> = out.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["DDD", "AAA", "BBB"]);
    }

    #[test]
    fn top_n_one_yields_highest_value_score() {
        let filters = SelectionFilters {
            min_quality_score: 5,
            top_n: 1,
            ..Default::default()
        };
        let out = select_candidates(&sample_records(), &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ticker, "AAA");
    }

    #[test]
    fn max_assets_truncates_after_sort() {
        let filters = SelectionFilters {
            max_assets: 2,
            ..Default::default()
        };
        let out = select_candidates(&sample_records(), &filters);
        let tickers: Vec<&str> = out.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["DDD", "AAA"]);
    }

    #[test]
    fn ties_keep_provider_order() {
        let records = vec![
            record("XXX", 5, 0.5),
            record("YYY", 5, 0.5),
            record("ZZZ", 5, 0.5),
        ];
        let out = select_candidates(&records, &SelectionFilters::default());
        let tickers: Vec<&str> = out.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["XXX", "YYY", "ZZZ"]);
    }

    #[test]
    fn empty_output_is_valid() {
        let filters = SelectionFilters {
            min_quality_score: 9,
            ..Default::default()
        };
        let out = select_candidates(&sample_records(), &filters);
        assert!(out.is_empty());
    }
}
