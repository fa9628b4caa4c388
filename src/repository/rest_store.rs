//! REST Remote Store
//!
//! Client for the hosted backend's PostgREST-style table API
//! (`/rest/v1/<table>`). One `reqwest::Client` is built up front and
//! reused for every call.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::traits::RemoteStore;
use crate::domain::{DomainError, DomainResult, Record};

pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn select_request(&self, table: &str, order_by: &str) -> RequestBuilder {
        self.request(Method::GET, table)
            .query(&[("select", "*".to_string()), ("order", format!("{}.asc", order_by))])
    }

    /// One statement on the server side, so the batch lands as a whole
    fn upsert_request(&self, table: &str, records: Vec<Record>, conflict_key: &str) -> RequestBuilder {
        let body: Vec<Value> = records.into_iter().map(Value::Object).collect();
        self.request(Method::POST, table)
            .query(&[("on_conflict", conflict_key)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body)
    }

    async fn send(&self, request: RequestBuilder) -> DomainResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Internal(format!("request failed: {}", e)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }

    async fn rows(&self, response: Response) -> DomainResult<Vec<Record>> {
        let body: Vec<Value> = response
            .json()
            .await
            .map_err(|e| DomainError::Internal(format!("bad response body: {}", e)))?;
        body.into_iter()
            .map(|row| match row {
                Value::Object(map) => Ok(map),
                other => Err(DomainError::Internal(format!("expected a row object, got {}", other))),
            })
            .collect()
    }
}

/// Map a failed response to the domain error the caller can act on
fn status_error(status: StatusCode, body: &str) -> DomainError {
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    };
    match status {
        StatusCode::NOT_FOUND => DomainError::NotFound(detail),
        StatusCode::CONFLICT => DomainError::Conflict(detail),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => DomainError::InvalidInput(detail),
        _ => DomainError::Internal(detail),
    }
}

fn eq_filter(id: &str) -> String {
    format!("eq.{}", id)
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn select(&self, table: &str, order_by: &str) -> DomainResult<Vec<Record>> {
        let response = self.send(self.select_request(table, order_by)).await?;
        self.rows(response).await
    }

    async fn insert(&self, table: &str, record: Record) -> DomainResult<Record> {
        let request = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&[Value::Object(record)]);
        let response = self.send(request).await?;
        self.rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::Internal(format!("insert into {} returned no row", table)))
    }

    async fn update(&self, table: &str, id: &str, mut patch: Record) -> DomainResult<Record> {
        patch.remove("id");
        let request = self
            .request(Method::PATCH, table)
            .query(&[("id", eq_filter(id))])
            .header("Prefer", "return=representation")
            .json(&Value::Object(patch));
        let response = self.send(request).await?;
        self.rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::NotFound(format!("{} {} not found", table, id)))
    }

    async fn upsert_batch(
        &self,
        table: &str,
        records: Vec<Record>,
        conflict_key: &str,
    ) -> DomainResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.send(self.upsert_request(table, records, conflict_key)).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> DomainResult<()> {
        let request = self
            .request(Method::DELETE, table)
            .query(&[("id", eq_filter(id))]);
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let store = RestStore::new("https://db.example.com/", "key", Duration::from_secs(5)).unwrap();
        assert_eq!(store.table_url("client_logos"), "https://db.example.com/rest/v1/client_logos");
    }

    #[test]
    fn test_request_carries_auth_and_filters() {
        let store = RestStore::new("https://db.example.com", "secret", Duration::from_secs(5)).unwrap();
        let request = store
            .request(Method::DELETE, "projects")
            .query(&[("id", eq_filter("abc"))])
            .build()
            .unwrap();

        assert_eq!(request.url().as_str(), "https://db.example.com/rest/v1/projects?id=eq.abc");
        assert_eq!(request.headers()["apikey"], "secret");
        assert_eq!(request.headers()["authorization"], "Bearer secret");
    }

    fn store() -> RestStore {
        RestStore::new("https://db.example.com", "secret", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_select_request_orders_by_column() {
        let request = store().select_request("client_logos", "position").build().unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.url().path(), "/rest/v1/client_logos");
        let query: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![
                ("select".to_string(), "*".to_string()),
                ("order".to_string(), "position.asc".to_string()),
            ]
        );
        assert_eq!(request.headers()["apikey"], "secret");
    }

    #[test]
    fn test_upsert_request_merges_on_conflict_key() {
        let mut row = Record::new();
        row.insert("id".to_string(), Value::from("abc"));
        row.insert("position".to_string(), Value::from(0));
        let request = store()
            .upsert_request("client_logos", vec![row], "id")
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://db.example.com/rest/v1/client_logos?on_conflict=id"
        );
        assert_eq!(request.headers()["prefer"], "resolution=merge-duplicates,return=minimal");
        assert_eq!(request.headers()["authorization"], "Bearer secret");

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let sent: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(sent, serde_json::json!([{ "id": "abc", "position": 0 }]));
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(status_error(StatusCode::NOT_FOUND, ""), DomainError::NotFound(_)));
        assert!(matches!(status_error(StatusCode::CONFLICT, "dup"), DomainError::Conflict(_)));
        assert!(matches!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, "bad"),
            DomainError::InvalidInput(_)
        ));
        match status_error(StatusCode::BAD_GATEWAY, "upstream") {
            DomainError::Internal(msg) => assert!(msg.contains("upstream")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
