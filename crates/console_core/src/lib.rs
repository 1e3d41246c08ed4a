use anyhow::{anyhow, Context, Result};
use models::{
    artifact::ArtifactDescriptor,
    domain::{ClientId, FlowId},
    error::ApiError,
    flow::{Flow, FlowResult, FlowResultSet, FlowResultsQuery, ScheduledFlow},
    report::{ClientLabel, ReportDescriptor},
};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

pub mod report;
pub mod wire;

pub use report::{
    ReportEvent, ReportFetchState, ReportInputs, ReportParams, ReportPayload, ReportSnapshot,
    ReportView, DEFAULT_REPORT_WINDOW,
};
pub use wire::strip_type_info;

/// List responses arrive as `{"items": [...]}`; a missing key means the
/// backend had nothing to return.
#[derive(Deserialize)]
struct ItemsEnvelope<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

async fn check_api_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => Err(anyhow!("backend returned {status}: {api_error}")),
        Err(_) => Err(anyhow!("backend returned {status}")),
    }
}

/// Typed client for the console's REST API.
///
/// Every response passes through [`strip_type_info`] before it is decoded,
/// so callers only ever see plain JSON shapes.
#[derive(Clone)]
pub struct ConsoleClient {
    http: Client,
    api_base_url: String,
}

impl ConsoleClient {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self::new_with_http_client(api_base_url, Client::new())
    }

    /// Accepts a preconfigured `reqwest` client, e.g. one carrying the
    /// request timeout from the app settings.
    pub fn new_with_http_client(api_base_url: impl Into<String>, http: Client) -> Self {
        Self {
            http,
            api_base_url: api_base_url.into(),
        }
    }

    async fn get_stripped(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let response = self
            .http
            .get(format!("{}/{path}", self.api_base_url))
            .query(query)
            .send()
            .await?;
        let body: Value = check_api_status(response).await?.json().await?;
        Ok(strip_type_info(body))
    }

    async fn get_items<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let body = self.get_stripped(path, query).await?;
        let envelope: ItemsEnvelope<T> = serde_json::from_value(body)
            .with_context(|| format!("malformed list payload from {path}"))?;
        Ok(envelope.items)
    }

    /// Lists the reports the backend can render.
    pub async fn list_reports(&self) -> Result<Vec<ReportDescriptor>> {
        self.get_items("stats/reports", &[]).await
    }

    /// Fetches one report's data. All three parameters are always sent,
    /// even when they still hold their defaults.
    pub async fn fetch_report(&self, name: &str, params: &ReportParams) -> Result<ReportPayload> {
        let response = self
            .http
            .get(format!("{}/stats/reports/{name}", self.api_base_url))
            .query(params)
            .send()
            .await?;
        let body: Value = check_api_status(response).await?.json().await?;
        serde_json::from_value(strip_type_info(body))
            .with_context(|| format!("malformed report payload for {name}"))
    }

    /// Lists every label currently attached to any client.
    pub async fn list_client_labels(&self) -> Result<Vec<ClientLabel>> {
        self.get_items("clients/labels", &[]).await
    }

    pub async fn list_flows(&self, client_id: &ClientId) -> Result<Vec<Flow>> {
        self.get_items(&format!("clients/{client_id}/flows"), &[])
            .await
    }

    /// Fetches one page of a flow's results. Filters that are `None` are
    /// left off the request entirely.
    pub async fn list_flow_results(
        &self,
        client_id: &ClientId,
        flow_id: &FlowId,
        query: &FlowResultsQuery,
    ) -> Result<Vec<FlowResult>> {
        let response = self
            .http
            .get(format!(
                "{}/clients/{client_id}/flows/{flow_id}/results",
                self.api_base_url
            ))
            .query(query)
            .send()
            .await?;
        let body: Value = check_api_status(response).await?.json().await?;
        let envelope: ItemsEnvelope<FlowResult> = serde_json::from_value(strip_type_info(body))
            .with_context(|| format!("malformed results payload for flow {flow_id}"))?;
        Ok(envelope.items)
    }

    /// Fetches one page of results and packages it as a fetched result set,
    /// ready to merge into a `FlowListEntry`.
    pub async fn fetch_result_set(
        &self,
        client_id: &ClientId,
        flow_id: &FlowId,
        query: FlowResultsQuery,
    ) -> Result<FlowResultSet> {
        let items = self.list_flow_results(client_id, flow_id, &query).await?;
        Ok(FlowResultSet::fetched(query, items))
    }

    /// Lists the flows a user has scheduled on a client but that have not
    /// started yet.
    pub async fn list_scheduled_flows(
        &self,
        client_id: &ClientId,
        creator: &str,
    ) -> Result<Vec<ScheduledFlow>> {
        self.get_items(
            &format!("clients/{client_id}/scheduled-flows"),
            &[("creator", creator.to_string())],
        )
        .await
    }

    pub async fn list_artifacts(&self) -> Result<Vec<ArtifactDescriptor>> {
        self.get_items("artifacts", &[]).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
