//! Client for the pizza factory that fulfils placed orders.
//!
//! The factory is an external HTTP service: `POST {url}/api/order` with the
//! diner and order, authorized by a static API key. It answers with a signed
//! pizza JWT and a report URL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Order;

/// Diner identity sent along with an order.
#[derive(Debug, Clone, Serialize)]
pub struct DinerRef {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// Successful factory answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryReceipt {
    pub jwt: String,
    #[serde(default)]
    pub report_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("factory url is not configured")]
    NotConfigured,

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("factory returned HTTP {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
        report_url: Option<String>,
    },

    #[error("decode: {0}")]
    Decode(String),
}

impl FactoryError {
    /// Report link the factory attached to a rejection, if any.
    pub fn report_url(&self) -> Option<&str> {
        match self {
            FactoryError::Rejected { report_url, .. } => report_url.as_deref(),
            _ => None,
        }
    }
}

/// Order fulfilment backend.
#[async_trait]
pub trait Factory: Send + Sync + 'static {
    async fn submit(&self, diner: &DinerRef, order: &Order) -> Result<FactoryReceipt, FactoryError>;
}

/// Factory reached over HTTP.
pub struct HttpFactory {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpFactory {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Serialize)]
struct FactoryRequest<'a> {
    diner: &'a DinerRef,
    order: &'a Order,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FactoryErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    report_url: Option<String>,
}

#[async_trait]
impl Factory for HttpFactory {
    async fn submit(&self, diner: &DinerRef, order: &Order) -> Result<FactoryReceipt, FactoryError> {
        if self.url.is_empty() {
            return Err(FactoryError::NotConfigured);
        }

        let url = format!("{}/api/order", self.url);
        debug!("submitting order {} to {}", order.id, url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&FactoryRequest { diner, order })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body: FactoryErrorBody = resp.json().await.unwrap_or_default();
            return Err(FactoryError::Rejected {
                status,
                message: body.message,
                report_url: body.report_url,
            });
        }

        resp.json()
            .await
            .map_err(|e| FactoryError::Decode(format!("factory response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_wire_format() {
        let receipt: FactoryReceipt = serde_json::from_value(serde_json::json!({
            "jwt": "a.b.c",
            "reportUrl": "https://factory.example/report/1",
        }))
        .unwrap();
        assert_eq!(receipt.jwt, "a.b.c");
        assert_eq!(receipt.report_url.as_deref(), Some("https://factory.example/report/1"));
    }

    #[test]
    fn only_rejections_carry_report_url() {
        let err = FactoryError::Rejected {
            status: 500,
            message: "chaos".into(),
            report_url: Some("r".into()),
        };
        assert_eq!(err.report_url(), Some("r"));
        assert_eq!(FactoryError::NotConfigured.report_url(), None);
    }

    #[tokio::test]
    async fn unconfigured_factory_fails_fast() {
        let factory = HttpFactory::new("", "key");
        let order = Order {
            id: 1,
            diner_id: 1,
            franchise_id: 1,
            store_id: 1,
            date: String::new(),
            items: vec![],
        };
        let diner = DinerRef { id: 1, name: "d".into(), email: "d@jwt.com".into() };
        assert!(matches!(
            factory.submit(&diner, &order).await,
            Err(FactoryError::NotConfigured)
        ));
    }
}
