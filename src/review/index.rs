//! In-memory index of checking sessions.
//!
//! At most one session is expanded at a time, and only the expanded
//! session has its document summaries materialized.

use tracing::{debug, warn};

use crate::analysis::{audit_pairs, sort_by_risk, summarize, DataQualityIssue, DocumentSummary};
use crate::error::{ReviewError, ReviewResult};
use crate::records::Session;

/// The single expanded session and its freshly computed summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedSession {
    pub session_id: String,
    /// Sorted by risk, highest average first.
    pub summaries: Vec<DocumentSummary>,
    /// Duplicate pairs and self-comparisons that went into the averages.
    pub issues: Vec<DataQualityIssue>,
}

/// Sessions ordered newest first, with single-expansion state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionIndex {
    sessions: Vec<Session>,
    expanded: Option<ExpandedSession>,
}

impl SessionIndex {
    /// Build an index from the collaborator's history payload.
    pub fn new(sessions: Vec<Session>) -> Self {
        let mut index = Self::default();
        index.replace_all(sessions);
        index
    }

    /// Sessions by timestamp, newest first.
    ///
    /// Ids that do not parse as a time sort after all parseable ones;
    /// ties fall back to the id, descending.
    pub fn list_sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.session_id == session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn expanded(&self) -> Option<&ExpandedSession> {
        self.expanded.as_ref()
    }

    pub fn expanded_session_id(&self) -> Option<&str> {
        self.expanded.as_ref().map(|e| e.session_id.as_str())
    }

    pub fn is_expanded(&self, session_id: &str) -> bool {
        self.expanded_session_id() == Some(session_id)
    }

    /// Expand `session_id`, or collapse it if it is already expanded.
    ///
    /// Expanding collapses any other session and recomputes summaries from
    /// the held records. Returns whether the session is now expanded.
    pub fn toggle_expansion(&mut self, session_id: &str) -> ReviewResult<bool> {
        if self.is_expanded(session_id) {
            debug!(session_id = %session_id, "Collapsing session");
            self.expanded = None;
            return Ok(false);
        }

        let session = self
            .get(session_id)
            .ok_or_else(|| ReviewError::UnknownSession {
                session_id: session_id.to_string(),
            })?;

        debug!(
            session_id = %session_id,
            previous = ?self.expanded_session_id(),
            "Expanding session"
        );
        self.expanded = Some(materialize(session));
        Ok(true)
    }

    /// Collapse whatever is expanded.
    pub fn collapse(&mut self) {
        self.expanded = None;
    }

    /// Remove a session locally, collapsing it if expanded.
    ///
    /// Only call this once the remote deletion has succeeded.
    pub fn remove_session(&mut self, session_id: &str) -> ReviewResult<Session> {
        let position = self
            .sessions
            .iter()
            .position(|s| s.session_id == session_id)
            .ok_or_else(|| ReviewError::UnknownSession {
                session_id: session_id.to_string(),
            })?;

        if self.is_expanded(session_id) {
            self.expanded = None;
        }
        Ok(self.sessions.remove(position))
    }

    /// Swap in a complete new history.
    ///
    /// The expanded session stays expanded (with recomputed summaries) if it
    /// is still present; otherwise everything is collapsed.
    pub fn replace_all(&mut self, mut sessions: Vec<Session>) {
        sessions.sort_by(|a, b| {
            b.timestamp()
                .cmp(&a.timestamp())
                .then_with(|| b.session_id.cmp(&a.session_id))
        });
        self.sessions = sessions;

        self.expanded = self
            .expanded
            .take()
            .and_then(|e| self.get(&e.session_id).map(materialize));
    }
}

fn materialize(session: &Session) -> ExpandedSession {
    let issues = audit_pairs(&session.records);
    for issue in &issues {
        warn!(session_id = %session.session_id, issue = %issue, "Session data quality issue");
    }

    let mut summaries = summarize(&session.records);
    sort_by_risk(&mut summaries);
    ExpandedSession {
        session_id: session.session_id.clone(),
        summaries,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SimilarityRecord;

    fn session(id: &str, records: &[(&str, &str, f64)]) -> Session {
        Session::new(
            id,
            records
                .iter()
                .enumerate()
                .map(|(i, (a, b, s))| SimilarityRecord::new(i.to_string(), *a, *b, *s).unwrap())
                .collect(),
        )
    }

    fn index() -> SessionIndex {
        SessionIndex::new(vec![
            session("2024-01-01T08:00:00Z", &[("a", "b", 1.0)]),
            session("garbage", &[("x", "y", 2.0)]),
            session(
                "2024-03-01T08:00:00Z",
                &[("A", "B", 10.0), ("A", "C", 20.0), ("B", "C", 30.0)],
            ),
            session("2024-02-01T08:00:00Z", &[("p", "q", 3.0)]),
        ])
    }

    #[test]
    fn test_sessions_sorted_newest_first() {
        let index = index();
        let ids: Vec<&str> = index
            .list_sessions()
            .iter()
            .map(|s| s.session_id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec![
                "2024-03-01T08:00:00Z",
                "2024-02-01T08:00:00Z",
                "2024-01-01T08:00:00Z",
                "garbage"
            ]
        );
    }

    #[test]
    fn test_toggle_twice_collapses() {
        let mut index = index();
        assert!(index.toggle_expansion("2024-03-01T08:00:00Z").unwrap());
        assert!(!index.toggle_expansion("2024-03-01T08:00:00Z").unwrap());
        assert!(index.expanded().is_none());
    }

    #[test]
    fn test_single_expansion() {
        let mut index = index();
        index.toggle_expansion("2024-03-01T08:00:00Z").unwrap();
        index.toggle_expansion("2024-01-01T08:00:00Z").unwrap();
        assert_eq!(index.expanded_session_id(), Some("2024-01-01T08:00:00Z"));
        assert!(!index.is_expanded("2024-03-01T08:00:00Z"));
    }

    #[test]
    fn test_expansion_materializes_sorted_summaries() {
        let mut index = index();
        index.toggle_expansion("2024-03-01T08:00:00Z").unwrap();
        let names: Vec<&str> = index
            .expanded()
            .unwrap()
            .summaries
            .iter()
            .map(|s| s.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_unknown_session() {
        let mut index = index();
        assert!(matches!(
            index.toggle_expansion("nope"),
            Err(ReviewError::UnknownSession { .. })
        ));
        assert!(index.remove_session("nope").is_err());
    }

    #[test]
    fn test_remove_expanded_session_collapses() {
        let mut index = index();
        index.toggle_expansion("2024-02-01T08:00:00Z").unwrap();
        let removed = index.remove_session("2024-02-01T08:00:00Z").unwrap();
        assert_eq!(removed.session_id, "2024-02-01T08:00:00Z");
        assert_eq!(index.len(), 3);
        assert!(index.expanded().is_none());
    }

    #[test]
    fn test_replace_all_keeps_expansion_when_present() {
        let mut index = index();
        index.toggle_expansion("2024-03-01T08:00:00Z").unwrap();

        index.replace_all(vec![session(
            "2024-03-01T08:00:00Z",
            &[("A", "B", 50.0)],
        )]);
        let expanded = index.expanded().unwrap();
        assert_eq!(expanded.summaries.len(), 2);
        assert_eq!(expanded.summaries[0].average_similarity, 50.0);

        index.replace_all(vec![]);
        assert!(index.expanded().is_none());
        assert!(index.is_empty());
    }

    #[test]
    fn test_expansion_carries_data_quality_issues() {
        let mut index = SessionIndex::new(vec![session(
            "2024-03-01T08:00:00Z",
            &[("A", "B", 10.0), ("B", "A", 30.0), ("A", "C", 5.0)],
        )]);
        index.toggle_expansion("2024-03-01T08:00:00Z").unwrap();

        let expanded = index.expanded().unwrap();
        assert_eq!(
            expanded.issues,
            vec![DataQualityIssue::DuplicatePair {
                first: "A".to_string(),
                second: "B".to_string(),
                count: 2,
            }]
        );

        let mut clean = SessionIndex::new(vec![session(
            "2024-01-01T08:00:00Z",
            &[("a", "b", 1.0)],
        )]);
        clean.toggle_expansion("2024-01-01T08:00:00Z").unwrap();
        assert!(clean.expanded().unwrap().issues.is_empty());
    }
}
