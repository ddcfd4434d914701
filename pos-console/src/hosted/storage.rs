//! Hosted file storage over its REST API (`/v0/b/{bucket}/o`)

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use super::{FileStorage, HostedError, HostedResult, StoredObject, check_status};

const DEFAULT_ENDPOINT: &str = "https://firebasestorage.googleapis.com";

#[derive(Clone)]
pub struct RestStorage {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    auth_token: Option<String>,
}

impl RestStorage {
    pub fn new(client: reqwest::Client, bucket: &str, auth_token: Option<String>) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            bucket: bucket.to_string(),
            auth_token,
        }
    }

    /// Collection URL: `{endpoint}/v0/b/{bucket}/o`
    fn objects_url(&self) -> HostedResult<Url> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| HostedError::InvalidPath(format!("storage endpoint: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| HostedError::InvalidPath("storage endpoint cannot be a base".into()))?
            .extend(["v0", "b", self.bucket.as_str(), "o"]);
        Ok(url)
    }

    /// Object URL; the whole object name is one segment, so `/` is encoded as `%2F`
    fn object_url(&self, path: &str) -> HostedResult<Url> {
        if path.is_empty() {
            return Err(HostedError::InvalidPath("empty object name".into()));
        }
        let mut url = self.objects_url()?;
        url.path_segments_mut()
            .map_err(|_| HostedError::InvalidPath("storage endpoint cannot be a base".into()))?
            .push(path);
        Ok(url)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn download_url(&self, path: &str, token: Option<&str>) -> HostedResult<String> {
        let mut url = self.object_url(path)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("alt", "media");
            if let Some(token) = token {
                query.append_pair("token", token);
            }
        }
        Ok(url.into())
    }
}

#[async_trait]
impl FileStorage for RestStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> HostedResult<StoredObject> {
        let mut url = self.objects_url()?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", path);

        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        let resp = self.with_auth(request).send().await?;
        let meta: Value = check_status(resp).await?.json().await?;

        // Several tokens may come back comma-separated; any one works
        let token = meta["downloadTokens"]
            .as_str()
            .and_then(|t| t.split(',').next())
            .filter(|t| !t.is_empty());
        if token.is_none() {
            tracing::warn!(path = %path, "Upload response carried no download token");
        }

        Ok(StoredObject {
            path: path.to_string(),
            url: self.download_url(path, token)?,
        })
    }

    async fn download(&self, url: &str) -> HostedResult<Vec<u8>> {
        let resp = self.with_auth(self.client.get(url)).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(HostedError::NotFound(url.to_string()));
        }
        let bytes = check_status(resp).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, path: &str) -> HostedResult<()> {
        let url = self.object_url(path)?;
        let resp = self.with_auth(self.client.delete(url)).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(HostedError::NotFound(path.to_string()));
        }
        check_status(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> RestStorage {
        RestStorage::new(reqwest::Client::new(), "shop-pos.appspot.com", None)
    }

    #[test]
    fn test_object_url_encodes_slashes() {
        let url = storage().object_url("backups/1700000000000_nightly.json").unwrap();
        assert_eq!(
            url.as_str(),
            "https://firebasestorage.googleapis.com/v0/b/shop-pos.appspot.com/o/backups%2F1700000000000_nightly.json"
        );
    }

    #[test]
    fn test_download_url_carries_token() {
        let url = storage()
            .download_url("backups/a.json", Some("tok-123"))
            .unwrap();
        assert!(url.ends_with("/o/backups%2Fa.json?alt=media&token=tok-123"));
    }

    #[test]
    fn test_empty_object_name_rejected() {
        assert!(matches!(
            storage().object_url(""),
            Err(HostedError::InvalidPath(_))
        ));
    }
}
