//! Classification endpoints.

use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::PathRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use bleedwatch_core::{ScanResult, Target};
use percent_encoding::percent_decode_str;
use tracing::debug;
use url::form_urlencoded;

use crate::infra::app_state::AppState;

/// Prefix stripped from the request path to get the host.
const BLEED_PREFIX: &str = "/bleed/";

/// `GET /bleed/{host}`: the path remainder is the host, probed over https
/// without a confirmation round.
///
/// `/bleed/` itself classifies the empty host. A remainder that does not
/// decode to UTF-8 is decoded lossily instead of being rejected.
pub async fn bleed_host_handler(
    State(state): State<AppState>,
    uri: Uri,
    host: Result<Path<String>, PathRejection>,
) -> Json<ScanResult> {
    let host = match host {
        Ok(Path(host)) => host,
        Err(rejection) => {
            let host = lossy_path_host(uri.path());
            debug!(%rejection, %host, "host taken from the raw request path");
            host
        }
    };

    let target = Target::https(host);
    Json(state.orchestrator.classify(&target, true).await)
}

fn lossy_path_host(path: &str) -> String {
    let raw = path.strip_prefix(BLEED_PREFIX).unwrap_or_default();
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// `GET /bleed/query?u=<host-or-url>&skip`
///
/// Without exactly one `u` the request is acknowledged with an empty body and
/// nothing is probed, cached or counted.
pub async fn bleed_query_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = BleedQuery::parse(query.as_deref().unwrap_or_default());

    let Some(raw_target) = params.single_target() else {
        debug!(targets = params.targets.len(), "ignoring query without a single u parameter");
        return StatusCode::OK.into_response();
    };

    let target = Target::from_query_value(raw_target);
    Json(state.orchestrator.classify(&target, params.skip()).await)
        .into_response()
}

/// The parts of the query string the classification endpoint reads.
///
/// Repeated keys are kept so that duplicates can be told apart from a single
/// occurrence, which a map-based extractor would hide.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BleedQuery {
    pub targets: Vec<String>,
    pub skip_flags: usize,
}

impl BleedQuery {
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "u" => parsed.targets.push(value.into_owned()),
                "skip" => parsed.skip_flags += 1,
                _ => {}
            }
        }
        parsed
    }

    pub fn single_target(&self) -> Option<&str> {
        match self.targets.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    /// The value is ignored; a lone `skip` key is enough.
    pub fn skip(&self) -> bool {
        self.skip_flags == 1
    }
}
