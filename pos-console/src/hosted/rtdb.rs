//! Realtime database over its REST API
//!
//! Every path maps to `{base_url}/{path}.json`; the access token rides along as the
//! `auth` query parameter.

use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::Snapshot;

use super::{HostedError, HostedResult, RealtimeDb, check_status, validate_path};

#[derive(Clone)]
pub struct RestDb {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RestDb {
    pub fn new(client: reqwest::Client, base_url: &str, auth_token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    fn url(&self, path: &str) -> HostedResult<String> {
        validate_path(path)?;
        Ok(format!("{}/{}.json", self.base_url, path))
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token.as_str())]),
            None => request,
        }
    }
}

#[async_trait]
impl RealtimeDb for RestDb {
    async fn get(&self, path: &str) -> HostedResult<Option<Value>> {
        let url = self.url(path)?;
        let resp = self.with_auth(self.client.get(&url)).send().await?;
        let value: Value = check_status(resp).await?.json().await?;
        Ok((!value.is_null()).then_some(value))
    }

    async fn query_by_child(
        &self,
        path: &str,
        child: &str,
        value: &Value,
    ) -> HostedResult<Snapshot> {
        let url = self.url(path)?;
        // Both parameters are JSON-encoded: orderBy="branchId"&equalTo="-Nabc"
        let order_by = serde_json::to_string(child)?;
        let equal_to = serde_json::to_string(value)?;
        let request = self
            .client
            .get(&url)
            .query(&[("orderBy", order_by.as_str()), ("equalTo", equal_to.as_str())]);
        let resp = self.with_auth(request).send().await?;
        let value: Value = check_status(resp).await?.json().await?;
        Ok(Snapshot::new(value))
    }

    async fn push(&self, path: &str, value: Value) -> HostedResult<String> {
        let url = self.url(path)?;
        let resp = self.with_auth(self.client.post(&url)).json(&value).send().await?;
        let body: Value = check_status(resp).await?.json().await?;
        body["name"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| HostedError::Decode(format!("push response without key: {body}")))
    }

    async fn set(&self, path: &str, value: Value) -> HostedResult<()> {
        let url = self.url(path)?;
        let resp = self.with_auth(self.client.put(&url)).json(&value).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> HostedResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let url = self.url(path)?;
        let resp = self
            .with_auth(self.client.patch(&url))
            .json(&Value::Object(fields))
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> HostedResult<()> {
        let url = self.url(path)?;
        let resp = self.with_auth(self.client.delete(&url)).send().await?;
        check_status(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let db = RestDb::new(
            reqwest::Client::new(),
            "https://shop-pos.example-rtdb.app/",
            None,
        );
        assert_eq!(
            db.url("products/-Nabc").unwrap(),
            "https://shop-pos.example-rtdb.app/products/-Nabc.json"
        );
        assert!(matches!(db.url("bad.path"), Err(HostedError::InvalidPath(_))));
    }
}
