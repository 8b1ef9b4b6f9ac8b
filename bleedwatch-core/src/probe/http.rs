use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{ProbeReport, ProbeSignal, Prober};
use crate::types::Target;

/// [`Prober`] that hands the heartbeat exchange to an external probe service.
///
/// The service receives `{"host", "service", "payload", "skip"}` as JSON and
/// answers with `{"signal", "data", "error"}` where `signal` is one of
/// `vulnerable`, `safe`, `closed` or `error`. Transport failures, timeouts,
/// non-success statuses and undecodable bodies all become
/// [`ProbeSignal::Failed`].
#[derive(Clone)]
pub struct HttpProber {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl fmt::Debug for HttpProber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpProber")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ProbeRequest<'a> {
    host: &'a str,
    service: &'a str,
    payload: String,
    skip: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WireSignal {
    Vulnerable,
    Safe,
    Closed,
    Error,
}

#[derive(Debug, Deserialize)]
struct ProbeResponse {
    signal: WireSignal,
    #[serde(default)]
    data: String,
    #[serde(default)]
    error: String,
}

impl From<ProbeResponse> for ProbeReport {
    fn from(response: ProbeResponse) -> Self {
        let signal = match response.signal {
            WireSignal::Vulnerable => ProbeSignal::Vulnerable,
            WireSignal::Safe => ProbeSignal::Safe,
            WireSignal::Closed => ProbeSignal::Closed,
            WireSignal::Error => ProbeSignal::Failed(response.error),
        };
        ProbeReport::new(response.data, signal)
    }
}

impl HttpProber {
    /// Client posting to `endpoint`; each request is bounded by `timeout`.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    fn describe(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("probe timed out after {}s", self.timeout.as_secs_f64())
        } else if err.is_connect() {
            format!("probe endpoint unreachable: {err}")
        } else if err.is_decode() {
            format!("invalid probe response: {err}")
        } else {
            format!("probe request failed: {err}")
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &Target, payload: &[u8], skip: bool) -> ProbeReport {
        let request = ProbeRequest {
            host: &target.host,
            service: &target.service,
            payload: String::from_utf8_lossy(payload).into_owned(),
            skip,
        };

        debug!(endpoint = %self.endpoint, host = %target.host, "dispatching probe");

        let response = match self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return ProbeReport::signal(ProbeSignal::Failed(self.describe(&err))),
        };

        let status = response.status();
        if !status.is_success() {
            return ProbeReport::signal(ProbeSignal::Failed(format!(
                "probe endpoint returned {status}"
            )));
        }

        match response.json::<ProbeResponse>().await {
            Ok(body) => body.into(),
            Err(err) => ProbeReport::signal(ProbeSignal::Failed(self.describe(&err))),
        }
    }
}
