use models::domain::{ApiDuration, ApiTimestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::warn;

use crate::ConsoleClient;

/// Window used when the caller clears the time range: the thirty days
/// leading up to now.
pub const DEFAULT_REPORT_WINDOW: ApiDuration = ApiDuration::from_days(30);

/// Externally-bound report parameters. `None` means the binding is absent
/// or was cleared by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportInputs {
    pub name: Option<String>,
    pub start_time: Option<ApiTimestamp>,
    pub duration: Option<ApiDuration>,
    pub client_label: Option<String>,
}

/// Fully-resolved fetch parameters. Serializes directly into the query
/// string of a report request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportParams {
    pub start_time: ApiTimestamp,
    pub duration: ApiDuration,
    pub client_label: String,
}

/// Report response body after type-stripping: free-form chart data plus
/// the descriptor the backend rendered it from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportPayload {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub desc: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFetchState {
    /// No fetch has been issued yet.
    Initial,
    /// A fetch is underway, or the last one failed.
    Loading,
    /// The most recent fetch completed and its data is displayable.
    Loaded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSnapshot {
    pub name: String,
    pub title: Option<String>,
    pub data: Value,
    pub desc: Value,
    pub params: ReportParams,
}

#[derive(Debug, Clone)]
pub enum ReportEvent {
    FetchStarted { name: String, params: ReportParams },
    FetchCompleted(ReportSnapshot),
}

/// Fills cleared parameters with their defaults: a window ending now,
/// thirty days long, over clients of every label.
pub fn resolve_params(inputs: &ReportInputs) -> ReportParams {
    ReportParams {
        start_time: inputs
            .start_time
            .unwrap_or_else(|| ApiTimestamp::now() - DEFAULT_REPORT_WINDOW),
        duration: inputs.duration.unwrap_or(DEFAULT_REPORT_WINDOW),
        client_label: inputs.client_label.clone().unwrap_or_default(),
    }
}

/// Turns a `SCREAMING_SNAKE` type tag such as `PIE_CHART` into a heading
/// like `Pie Chart`.
pub fn title_from_type_tag(tag: &str) -> String {
    tag.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// View state for a single report panel.
///
/// Parameter changes arrive through [`ReportView::apply_inputs`]; edits to
/// the time-range and label controls are staged with the `stage_*` methods
/// and only take effect on [`ReportView::refresh`]. Observers follow the
/// fetch lifecycle through [`ReportView::subscribe`].
pub struct ReportView {
    client: ConsoleClient,
    name: Option<String>,
    params: ReportParams,
    edited_start_time: ApiTimestamp,
    edited_duration: ApiDuration,
    edited_client_label: String,
    state: ReportFetchState,
    snapshot: Option<ReportSnapshot>,
    events: broadcast::Sender<ReportEvent>,
}

impl ReportView {
    pub fn new(client: ConsoleClient) -> Self {
        let params = resolve_params(&ReportInputs::default());
        let (events, _) = broadcast::channel(64);
        Self {
            client,
            name: None,
            edited_start_time: params.start_time,
            edited_duration: params.duration,
            edited_client_label: params.client_label.clone(),
            params,
            state: ReportFetchState::Initial,
            snapshot: None,
            events,
        }
    }

    /// Applies a new set of bound parameters. Cleared values fall back to
    /// their defaults, the staged edit fields are re-synced from the
    /// resolved result, and a fetch is issued when a report name is set.
    pub async fn apply_inputs(&mut self, inputs: ReportInputs) {
        self.name = inputs.name.clone().filter(|name| !name.is_empty());
        self.params = resolve_params(&inputs);
        self.edited_start_time = self.params.start_time;
        self.edited_duration = self.params.duration;
        self.edited_client_label = self.params.client_label.clone();
        self.fetch_if_named().await;
    }

    pub fn stage_start_time(&mut self, start_time: ApiTimestamp) {
        self.edited_start_time = start_time;
    }

    pub fn stage_duration(&mut self, duration: ApiDuration) {
        self.edited_duration = duration;
    }

    pub fn stage_client_label(&mut self, client_label: impl Into<String>) {
        self.edited_client_label = client_label.into();
    }

    /// Commits the staged time-range and label edits and refetches.
    pub async fn refresh(&mut self) {
        let inputs = ReportInputs {
            name: self.name.clone(),
            start_time: Some(self.edited_start_time),
            duration: Some(self.edited_duration),
            client_label: Some(self.edited_client_label.clone()),
        };
        self.apply_inputs(inputs).await;
    }

    async fn fetch_if_named(&mut self) {
        let Some(name) = self.name.clone() else {
            return;
        };
        self.state = ReportFetchState::Loading;
        let _ = self.events.send(ReportEvent::FetchStarted {
            name: name.clone(),
            params: self.params.clone(),
        });
        match self.client.fetch_report(&name, &self.params).await {
            Ok(payload) => {
                let title = payload
                    .desc
                    .get("type")
                    .and_then(Value::as_str)
                    .map(title_from_type_tag);
                let snapshot = ReportSnapshot {
                    name,
                    title,
                    data: payload.data,
                    desc: payload.desc,
                    params: self.params.clone(),
                };
                self.state = ReportFetchState::Loaded;
                let _ = self
                    .events
                    .send(ReportEvent::FetchCompleted(snapshot.clone()));
                self.snapshot = Some(snapshot);
            }
            Err(err) => {
                // There is no error state: the view keeps showing the
                // loading indicator until a later fetch succeeds.
                warn!(report = name.as_str(), "report fetch failed: {err}");
            }
        }
    }

    pub fn state(&self) -> ReportFetchState {
        self.state
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn params(&self) -> &ReportParams {
        &self.params
    }

    pub fn snapshot(&self) -> Option<&ReportSnapshot> {
        self.snapshot.as_ref()
    }

    /// Heading derived from the loaded report's type tag.
    pub fn title(&self) -> Option<&str> {
        self.snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.title.as_deref())
    }

    pub fn data(&self) -> Option<&Value> {
        self.snapshot.as_ref().map(|snapshot| &snapshot.data)
    }

    pub fn desc(&self) -> Option<&Value> {
        self.snapshot.as_ref().map(|snapshot| &snapshot.desc)
    }

    pub fn edited_start_time(&self) -> ApiTimestamp {
        self.edited_start_time
    }

    pub fn edited_duration(&self) -> ApiDuration {
        self.edited_duration
    }

    pub fn edited_client_label(&self) -> &str {
        &self.edited_client_label
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReportEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/report_tests.rs"]
mod tests;
