//! Low-level HTTP plumbing for the router's `goform` API.
//!
//! The API has a few non-negotiable quirks: reads and writes go through two
//! fixed endpoints, every request carries `isTest=false` plus a millisecond
//! cache-buster, multi-field reads need `multi_data=1`, and the router's
//! self-signed certificate never validates. All of that lives here so the
//! client above can speak in commands.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, REFERER};

use crate::error::RouterError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const GET_ENDPOINT: &str = "goform/goform_get_cmd_process";
const SET_ENDPOINT: &str = "goform/goform_set_cmd_process";

/// HTTP connection to one router, protocol already probed.
#[derive(Debug)]
pub struct RouterHttp {
    client: reqwest::Client,
    ip: String,
    protocol: &'static str,
}

impl RouterHttp {
    /// Probe whether the router speaks https or http, then build a client
    /// with the session headers the firmware insists on.
    pub async fn connect(ip: &str) -> Result<Self, RouterError> {
        let probe = Self::builder().build()?;

        let protocol = match probe.get(format!("https://{ip}/index.html")).send().await {
            Ok(resp) if resp.status().is_success() => "https",
            _ => "http",
        };
        tracing::debug!(ip, protocol, "router protocol probed");

        let referer = format!("{protocol}://{ip}/index.html");
        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_str(&referer).map_err(|_| RouterError::BadAddress(ip.to_string()))?,
        );
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));

        let client = Self::builder().default_headers(headers).build()?;

        Ok(Self { client, ip: ip.to_string(), protocol })
    }

    fn builder() -> reqwest::ClientBuilder {
        // The router serves a self-signed certificate; there is nothing to
        // validate against.
        reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
    }

    fn url(&self, path: &str) -> String {
        format!("{}://{}/{}", self.protocol, self.ip, path)
    }

    fn cache_buster() -> String {
        format!("isTest=false&_={}", chrono::Utc::now().timestamp_millis())
    }

    /// Plain GET of any router path, returning the body on a 2xx status.
    pub async fn get_raw(&self, path: &str) -> Result<String, RouterError> {
        let resp = self.client.get(self.url(path)).send().await?;
        if !resp.status().is_success() {
            return Err(RouterError::Status(resp.status()));
        }
        Ok(resp.text().await?)
    }

    /// Read one or more fields through the get endpoint. A comma in `cmd`
    /// means a multi-field read and needs `multi_data=1` or the router
    /// answers with only the first field.
    pub async fn get_cmd(&self, cmd: &str) -> Result<serde_json::Value, RouterError> {
        let mut path = format!("{GET_ENDPOINT}?cmd={cmd}&{}", Self::cache_buster());
        if cmd.contains(',') {
            path.push_str("&multi_data=1");
        }
        let body = self.get_raw(&path).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST a url-encoded set request; `isTest=false` is injected like on
    /// every other request.
    pub async fn set_cmd(
        &self,
        form: &[(&'static str, String)],
    ) -> Result<serde_json::Value, RouterError> {
        let mut form = form.to_vec();
        form.push(("isTest", "false".to_string()));

        let resp = self
            .client
            .post(self.url(SET_ENDPOINT))
            .form(&form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(RouterError::Status(resp.status()));
        }
        Ok(serde_json::from_str(&resp.text().await?)?)
    }

    /// Like [`RouterHttp::set_cmd`] but requires the router's
    /// `"result": "success"` acknowledgement.
    pub async fn set_ok(&self, form: &[(&'static str, String)]) -> Result<(), RouterError> {
        let json = self.set_cmd(form).await?;
        match json.get("result").and_then(|v| v.as_str()) {
            Some("success") => Ok(()),
            other => {
                tracing::warn!(result = ?other, "set request rejected");
                Err(RouterError::SetRejected)
            }
        }
    }
}
