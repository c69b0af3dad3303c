//! Per-document aggregation of pairwise similarity records.
//!
//! Summaries are always rebuilt from the session's records; nothing here
//! holds state between calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::risk::{classify, RiskClass};
use crate::error::{ReviewError, ReviewResult};
use crate::records::{document_names, DocumentSide, SimilarityRecord};

/// One comparison as seen from a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// The document on the other side.
    pub compared_to: String,
    pub similarity: f64,
    /// Id of the underlying record.
    pub record_id: String,
    pub doc1_name: String,
    pub doc2_name: String,
}

impl Comparison {
    fn from_record(record: &SimilarityRecord, file_name: &str) -> Self {
        Self {
            compared_to: record.counterpart(file_name).to_string(),
            similarity: record.similarity,
            record_id: record.id.clone(),
            doc1_name: record.doc1_name.clone(),
            doc2_name: record.doc2_name.clone(),
        }
    }

    /// Name of the document on `side` of the record.
    pub fn name_on(&self, side: DocumentSide) -> &str {
        match side {
            DocumentSide::Doc1 => &self.doc1_name,
            DocumentSide::Doc2 => &self.doc2_name,
        }
    }

    pub fn risk(&self) -> ReviewResult<RiskClass> {
        classify(self.similarity)
    }
}

/// Aggregate view of one document within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub file_name: String,
    /// Sum of the document's similarities divided by `documents - 1`.
    pub average_similarity: f64,
    /// Comparisons in record order; see [`DocumentSummary::sorted_comparisons`].
    pub comparisons: Vec<Comparison>,
}

impl DocumentSummary {
    pub fn risk(&self) -> ReviewResult<RiskClass> {
        classify(self.average_similarity)
    }

    /// Comparisons by similarity descending, ties by compared-to name.
    pub fn sorted_comparisons(&self) -> Vec<Comparison> {
        let mut sorted = self.comparisons.clone();
        sorted.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.compared_to.cmp(&b.compared_to))
        });
        sorted
    }

    /// Copy of this summary with comparisons already sorted for display.
    pub fn for_detail_view(&self) -> Self {
        Self {
            file_name: self.file_name.clone(),
            average_similarity: self.average_similarity,
            comparisons: self.sorted_comparisons(),
        }
    }
}

/// A data-quality problem in a session's record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityIssue {
    /// The same unordered pair was compared more than once.
    DuplicatePair {
        first: String,
        second: String,
        count: usize,
    },
    /// A record compares a document with itself.
    SelfComparison { name: String, record_id: String },
}

impl std::fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataQualityIssue::DuplicatePair {
                first,
                second,
                count,
            } => write!(f, "pair ({}, {}) compared {} times", first, second, count),
            DataQualityIssue::SelfComparison { name, record_id } => {
                write!(f, "record {} compares {} with itself", record_id, name)
            }
        }
    }
}

/// Distinct document names, or `DegenerateInput` when fewer than two exist.
pub fn comparable_documents(records: &[SimilarityRecord]) -> ReviewResult<Vec<String>> {
    let names = document_names(records);
    if names.len() < 2 {
        return Err(ReviewError::DegenerateInput {
            message: format!(
                "{} distinct document(s); averages need at least 2",
                names.len()
            ),
        });
    }
    Ok(names)
}

/// Build one summary per distinct document.
///
/// Missing pairs contribute nothing to the sum, so they lower the average.
/// A degenerate session (fewer than two documents) yields no summaries.
/// Output order is unspecified; use [`sort_by_risk`] for display.
pub fn summarize(records: &[SimilarityRecord]) -> Vec<DocumentSummary> {
    let names = match comparable_documents(records) {
        Ok(names) => names,
        Err(_) => return Vec::new(),
    };
    let divisor = (names.len() - 1) as f64;

    names
        .into_iter()
        .map(|name| {
            let comparisons: Vec<Comparison> = records
                .iter()
                .filter(|r| r.involves(&name))
                .map(|r| Comparison::from_record(r, &name))
                .collect();
            let total: f64 = comparisons.iter().map(|c| c.similarity).sum();

            DocumentSummary {
                file_name: name,
                average_similarity: total / divisor,
                comparisons,
            }
        })
        .collect()
}

/// Order summaries for display: highest average first, ties by name.
pub fn sort_by_risk(summaries: &mut [DocumentSummary]) {
    summaries.sort_by(|a, b| {
        b.average_similarity
            .total_cmp(&a.average_similarity)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
}

/// Report duplicate pairs and self-comparisons in a record set.
pub fn audit_pairs(records: &[SimilarityRecord]) -> Vec<DataQualityIssue> {
    let mut issues = Vec::new();
    let mut pairs: BTreeMap<(&str, &str), usize> = BTreeMap::new();

    for record in records {
        if record.doc1_name == record.doc2_name {
            issues.push(DataQualityIssue::SelfComparison {
                name: record.doc1_name.clone(),
                record_id: record.id.clone(),
            });
            continue;
        }
        let key = if record.doc1_name <= record.doc2_name {
            (record.doc1_name.as_str(), record.doc2_name.as_str())
        } else {
            (record.doc2_name.as_str(), record.doc1_name.as_str())
        };
        *pairs.entry(key).or_insert(0) += 1;
    }

    issues.extend(
        pairs
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|((first, second), count)| DataQualityIssue::DuplicatePair {
                first: first.to_string(),
                second: second.to_string(),
                count,
            }),
    );
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RiskTier;
    use pretty_assertions::assert_eq;

    fn record(id: &str, a: &str, b: &str, similarity: f64) -> SimilarityRecord {
        SimilarityRecord::new(id, a, b, similarity).unwrap()
    }

    fn three_way() -> Vec<SimilarityRecord> {
        vec![
            record("1", "A", "B", 10.0),
            record("2", "A", "C", 20.0),
            record("3", "B", "C", 30.0),
        ]
    }

    fn find<'a>(summaries: &'a [DocumentSummary], name: &str) -> &'a DocumentSummary {
        summaries.iter().find(|s| s.file_name == name).unwrap()
    }

    #[test]
    fn test_three_document_scenario() {
        let summaries = summarize(&three_way());
        assert_eq!(summaries.len(), 3);

        let a = find(&summaries, "A");
        assert_eq!(a.average_similarity, 15.0);
        assert_eq!(a.risk().unwrap().tier, RiskTier::Review);

        let b = find(&summaries, "B");
        assert_eq!(b.average_similarity, 20.0);
        assert_eq!(b.risk().unwrap().tier, RiskTier::Plagiarized);

        let c = find(&summaries, "C");
        assert_eq!(c.average_similarity, 25.0);
        assert_eq!(c.risk().unwrap().tier, RiskTier::Plagiarized);
    }

    #[test]
    fn test_comparisons_point_at_counterpart() {
        let summaries = summarize(&three_way());
        let b = find(&summaries, "B");
        let names: Vec<&str> = b.comparisons.iter().map(|c| c.compared_to.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(b.comparisons[0].record_id, "1");
        assert_eq!(b.comparisons[0].name_on(DocumentSide::Doc1), "A");
    }

    #[test]
    fn test_sum_property() {
        let records = vec![
            record("1", "A", "B", 3.5),
            record("2", "A", "C", 17.25),
            record("3", "A", "D", 0.0),
            record("4", "B", "C", 42.0),
            record("5", "B", "D", 8.125),
            record("6", "C", "D", 99.0),
        ];
        let n = 4.0;
        let summaries = summarize(&records);
        let lhs: f64 = summaries.iter().map(|s| s.average_similarity * (n - 1.0)).sum();
        let rhs: f64 = 2.0 * records.iter().map(|r| r.similarity).sum::<f64>();
        assert!((lhs - rhs).abs() < 1e-9, "{} != {}", lhs, rhs);
    }

    #[test]
    fn test_idempotent() {
        let records = three_way();
        assert_eq!(summarize(&records), summarize(&records));
    }

    #[test]
    fn test_degenerate_input_excluded() {
        assert!(summarize(&[]).is_empty());
        let only_self = vec![record("1", "A", "A", 50.0)];
        assert!(summarize(&only_self).is_empty());
        assert!(matches!(
            comparable_documents(&only_self),
            Err(ReviewError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_missing_pairs_tolerated() {
        // B-C never compared
        let records = vec![record("1", "A", "B", 10.0), record("2", "A", "C", 20.0)];
        let summaries = summarize(&records);
        assert_eq!(find(&summaries, "A").average_similarity, 15.0);
        assert_eq!(find(&summaries, "B").average_similarity, 5.0);
        assert_eq!(find(&summaries, "C").average_similarity, 10.0);
    }

    #[test]
    fn test_sort_by_risk() {
        let mut summaries = summarize(&three_way());
        sort_by_risk(&mut summaries);
        let order: Vec<&str> = summaries.iter().map(|s| s.file_name.as_str()).collect();
        assert_eq!(order, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_sort_ties_by_name() {
        let records = vec![record("1", "Z", "Y", 10.0)];
        let mut summaries = summarize(&records);
        sort_by_risk(&mut summaries);
        let order: Vec<&str> = summaries.iter().map(|s| s.file_name.as_str()).collect();
        assert_eq!(order, vec!["Y", "Z"]);
    }

    #[test]
    fn test_sorted_comparisons() {
        let summaries = summarize(&three_way());
        let c = find(&summaries, "C").for_detail_view();
        let values: Vec<f64> = c.comparisons.iter().map(|x| x.similarity).collect();
        assert_eq!(values, vec![30.0, 20.0]);
    }

    #[test]
    fn test_audit_pairs() {
        let records = vec![
            record("1", "A", "B", 10.0),
            record("2", "B", "A", 12.0),
            record("3", "C", "C", 100.0),
            record("4", "A", "C", 1.0),
        ];
        let issues = audit_pairs(&records);
        assert_eq!(
            issues,
            vec![
                DataQualityIssue::SelfComparison {
                    name: "C".to_string(),
                    record_id: "3".to_string()
                },
                DataQualityIssue::DuplicatePair {
                    first: "A".to_string(),
                    second: "B".to_string(),
                    count: 2
                },
            ]
        );
        assert!(audit_pairs(&three_way()).is_empty());
    }
}
