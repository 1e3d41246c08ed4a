use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ApiTimestamp, ClientId, FlowId, ScheduledFlowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowState {
    Running,
    Finished,
    Error,
    /// Backends may omit the state entirely or send tags this build does
    /// not know about; both decode to `Unset`.
    #[default]
    #[serde(other)]
    Unset,
}

/// A single flow execution on a client, as listed by the backend.
///
/// `args` and `progress` are opaque to the console: their shape depends on
/// the flow name and is rendered generically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub flow_id: FlowId,
    pub client_id: ClientId,
    pub name: String,
    #[serde(default)]
    pub creator: String,
    pub started_at: ApiTimestamp,
    pub last_active_at: ApiTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Value>,
    #[serde(default)]
    pub state: FlowState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowResult {
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub tag: String,
    pub timestamp: ApiTimestamp,
}

/// Pagination window and optional payload filters for one result fetch.
///
/// Two queries describe the same result set exactly when their filter keys
/// match; offset and count only move the window inside that set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowResultsQuery {
    pub offset: i64,
    pub count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_tag: Option<String>,
}

impl FlowResultsQuery {
    pub fn new(offset: i64, count: i64) -> Self {
        Self {
            offset,
            count,
            with_type: None,
            with_tag: None,
        }
    }

    pub fn with_type(mut self, with_type: impl Into<String>) -> Self {
        self.with_type = Some(with_type.into());
        self
    }

    pub fn with_tag(mut self, with_tag: impl Into<String>) -> Self {
        self.with_tag = Some(with_tag.into());
        self
    }

    pub fn filter_key(&self) -> (Option<&str>, Option<&str>) {
        (self.with_type.as_deref(), self.with_tag.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowResultSetState {
    InProgress,
    Fetched,
}

/// The results cached for one filter key of one flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowResultSet {
    pub query: FlowResultsQuery,
    pub state: FlowResultSetState,
    #[serde(default)]
    pub items: Vec<FlowResult>,
}

impl FlowResultSet {
    pub fn in_progress(query: FlowResultsQuery) -> Self {
        Self {
            query,
            state: FlowResultSetState::InProgress,
            items: Vec::new(),
        }
    }

    pub fn fetched(query: FlowResultsQuery, items: Vec<FlowResult>) -> Self {
        Self {
            query,
            state: FlowResultSetState::Fetched,
            items,
        }
    }
}

/// A flow plus every result set fetched for it so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowListEntry {
    pub flow: Flow,
    #[serde(default)]
    pub result_sets: Vec<FlowResultSet>,
}

impl FlowListEntry {
    pub fn from_flow(flow: Flow) -> Self {
        Self {
            flow,
            result_sets: Vec::new(),
        }
    }

    /// Looks up the cached result set whose query filters match exactly.
    pub fn find_result_set(
        &self,
        with_type: Option<&str>,
        with_tag: Option<&str>,
    ) -> Option<&FlowResultSet> {
        self.result_sets
            .iter()
            .find(|set| set.query.filter_key() == (with_type, with_tag))
    }

    /// Returns a copy of the entry with `result_set` merged in: it replaces
    /// the existing set with the same filter key, or is appended when no
    /// set with that key exists yet. The entry itself is left untouched.
    pub fn update_result_set(&self, result_set: FlowResultSet) -> Self {
        let mut updated = self.clone();
        let key = result_set.query.filter_key();
        match updated
            .result_sets
            .iter_mut()
            .find(|set| set.query.filter_key() == key)
        {
            Some(existing) => *existing = result_set,
            None => updated.result_sets.push(result_set),
        }
        updated
    }
}

/// A flow that has been approved for a client but not started yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledFlow {
    pub scheduled_flow_id: ScheduledFlowId,
    pub client_id: ClientId,
    pub creator: String,
    pub flow_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_args: Option<Value>,
    pub create_time: ApiTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_flow() -> Flow {
        Flow {
            flow_id: FlowId::new("F.1122334455667788"),
            client_id: ClientId::new("C.1234567890abcdef"),
            name: "ListProcesses".to_string(),
            creator: "analyst".to_string(),
            started_at: ApiTimestamp(1_700_000_000_000_000),
            last_active_at: ApiTimestamp(1_700_000_600_000_000),
            args: None,
            progress: None,
            state: FlowState::Running,
        }
    }

    fn fetched_set(
        with_type: Option<&str>,
        with_tag: Option<&str>,
        payloads: &[&str],
    ) -> FlowResultSet {
        let mut query = FlowResultsQuery::new(0, 100);
        query.with_type = with_type.map(str::to_string);
        query.with_tag = with_tag.map(str::to_string);
        let items = payloads
            .iter()
            .map(|payload| FlowResult {
                payload: json!({ "name": payload }),
                tag: String::new(),
                timestamp: ApiTimestamp(1_700_000_300_000_000),
            })
            .collect();
        FlowResultSet::fetched(query, items)
    }

    #[test]
    fn new_entry_starts_with_no_result_sets() {
        let entry = FlowListEntry::from_flow(sample_flow());
        assert!(entry.result_sets.is_empty());
        assert!(entry.find_result_set(None, None).is_none());
    }

    #[test]
    fn update_appends_sets_with_distinct_filter_keys() {
        let entry = FlowListEntry::from_flow(sample_flow())
            .update_result_set(fetched_set(None, None, &["a"]))
            .update_result_set(fetched_set(Some("Process"), None, &["b"]))
            .update_result_set(fetched_set(Some("Process"), Some("dead"), &["c"]));
        assert_eq!(entry.result_sets.len(), 3);
    }

    #[test]
    fn update_replaces_the_set_with_a_matching_filter_key() {
        let entry = FlowListEntry::from_flow(sample_flow())
            .update_result_set(fetched_set(Some("Process"), None, &["stale"]))
            .update_result_set(fetched_set(None, Some("quarantined"), &["other"]));

        let updated = entry.update_result_set(fetched_set(Some("Process"), None, &["fresh"]));

        assert_eq!(updated.result_sets.len(), 2);
        let replaced = updated
            .find_result_set(Some("Process"), None)
            .expect("replaced set should still be present");
        assert_eq!(replaced.items[0].payload, json!({ "name": "fresh" }));
        let untouched = updated
            .find_result_set(None, Some("quarantined"))
            .expect("other set should be untouched");
        assert_eq!(untouched.items[0].payload, json!({ "name": "other" }));
    }

    #[test]
    fn update_with_the_same_set_twice_is_idempotent() {
        let base = FlowListEntry::from_flow(sample_flow())
            .update_result_set(fetched_set(Some("Process"), Some("dead"), &["a", "b"]));

        let once = base.update_result_set(fetched_set(Some("Process"), Some("dead"), &["a", "b"]));
        let twice = once.update_result_set(fetched_set(Some("Process"), Some("dead"), &["a", "b"]));

        assert_eq!(once, twice);
        assert_eq!(once.result_sets.len(), 1);
    }

    #[test]
    fn update_does_not_mutate_the_original_entry() {
        let entry = FlowListEntry::from_flow(sample_flow());
        let _updated = entry.update_result_set(fetched_set(None, None, &["a"]));
        assert!(entry.result_sets.is_empty());
    }

    #[test]
    fn find_requires_both_filters_to_match() {
        let entry = FlowListEntry::from_flow(sample_flow())
            .update_result_set(fetched_set(Some("Process"), Some("dead"), &["a"]));

        assert!(entry.find_result_set(Some("Process"), Some("dead")).is_some());
        assert!(entry.find_result_set(Some("Process"), None).is_none());
        assert!(entry.find_result_set(None, Some("dead")).is_none());
        assert!(entry.find_result_set(None, None).is_none());
    }

    #[test]
    fn flow_states_keep_their_screaming_wire_tags() {
        assert_eq!(
            serde_json::to_value(FlowState::Running).expect("encode"),
            json!("RUNNING")
        );
        assert_eq!(
            serde_json::to_value(FlowState::Unset).expect("encode"),
            json!("UNSET")
        );
    }

    #[test]
    fn missing_and_unknown_flow_states_decode_as_unset() {
        let missing: Flow = serde_json::from_value(json!({
            "flow_id": "F.1",
            "client_id": "C.1",
            "name": "Interrogate",
            "started_at": 1_700_000_000_000_000_i64,
            "last_active_at": 1_700_000_000_000_000_i64,
        }))
        .expect("flow without state should decode");
        assert_eq!(missing.state, FlowState::Unset);

        let unknown: FlowState =
            serde_json::from_value(json!("WAITING_FOR_APPROVAL")).expect("unknown tag");
        assert_eq!(unknown, FlowState::Unset);
    }
}
