//! Widget tabular export.
//!
//! The vendor has no stable, documented endpoint for widget data; which URL
//! answers depends on the deployment version. The probing lives behind a
//! single capability trait so callers only ever ask for "the table for
//! widget X" and the endpoint list can change without touching them.

use async_trait::async_trait;
use cubeflow_core::AccessToken;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::SisenseClient;
use crate::error::{Result, SisenseError};
use crate::types::WidgetTable;

#[async_trait]
pub trait TabularExport {
    /// Fetch the tabular content of one dashboard widget.
    async fn fetch_widget_table(
        &self,
        token: &AccessToken,
        dashboard_id: &str,
        widget_id: &str,
    ) -> Result<WidgetTable>;
}

#[async_trait]
impl TabularExport for SisenseClient {
    async fn fetch_widget_table(
        &self,
        token: &AccessToken,
        dashboard_id: &str,
        widget_id: &str,
    ) -> Result<WidgetTable> {
        let base = self.base_url();

        // Widget/dashboard definition endpoints; some versions inline the
        // data here.
        let metadata_urls = [
            format!("{base}/api/v1/dashboards/{dashboard_id}"),
            format!("{base}/api/v1/dashboards/{dashboard_id}/widgets"),
            format!("{base}/api/v1/dashboards/{dashboard_id}/widgets/{widget_id}"),
            format!("{base}/api/v1/widgets/{widget_id}"),
        ];

        // Data endpoints the UI calls after loading widget metadata.
        let data_urls = [
            format!("{base}/api/v1/dashboards/{dashboard_id}/widgets/{widget_id}/data"),
            format!("{base}/api/v1/widgets/{widget_id}/data"),
            format!("{base}/api/v1/dashboards/{dashboard_id}/widgets/{widget_id}/pivot"),
            format!("{base}/api/v1/widgets/{widget_id}/pivot"),
        ];

        let metadata = self.probe(token, &metadata_urls).await;
        let data = self.probe(token, &data_urls).await;

        let source = data
            .or_else(|| metadata.as_ref().and_then(inline_content).cloned())
            .ok_or_else(|| {
                SisenseError::InvalidResponse(format!(
                    "no known endpoint returned data for widget {widget_id}"
                ))
            })?;

        WidgetTable::from_payload(&source).ok_or_else(|| {
            SisenseError::InvalidResponse(
                "fetched widget data but could not parse a table shape".to_string(),
            )
        })
    }
}

impl SisenseClient {
    /// First URL that answers 200 with JSON wins. Errors are logged and the
    /// probe moves on.
    async fn probe(&self, token: &AccessToken, urls: &[String]) -> Option<Value> {
        for url in urls {
            match self.get_json(token, url).await {
                Ok(payload) => {
                    debug!(url, "Probe hit");
                    return Some(payload);
                }
                Err(e) => {
                    warn!(url, error = %e, "Probe miss");
                }
            }
        }
        None
    }
}

/// Tabular content some endpoints inline in the definition payload.
fn inline_content(payload: &Value) -> Option<&Value> {
    let map = payload.as_object()?;
    map.get("data")
        .or_else(|| map.get("result"))
        .filter(|v| v.is_array() || v.is_object())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_probing_falls_through_to_data_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/widgets/w1/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "site": "A", "calls": 3 },
            ])))
            .mount(&server)
            .await;
        // Every metadata endpoint is missing on this deployment.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = SisenseClient::new(server.uri());
        let token = AccessToken::new("t");
        let table = client.fetch_widget_table(&token, "d1", "w1").await.unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_inline_metadata_content_is_used() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/dashboards/d1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Ops",
                "data": { "headers": ["site"], "rows": [["A"], ["B"]] },
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = SisenseClient::new(server.uri());
        let token = AccessToken::new("t");
        let table = client.fetch_widget_table(&token, "d1", "w1").await.unwrap();
        assert_eq!(table.columns, vec!["site"]);
        assert_eq!(table.rows.len(), 2);
    }

    #[tokio::test]
    async fn test_no_endpoint_answers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = SisenseClient::new(server.uri());
        let token = AccessToken::new("t");
        let err = client
            .fetch_widget_table(&token, "d1", "w1")
            .await
            .unwrap_err();
        assert!(matches!(err, SisenseError::InvalidResponse(_)));
    }
}
