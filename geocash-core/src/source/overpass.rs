use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use geocash_model::{GeoBounds, GeoPoint, PointOfInterest, TerminalId};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::PoiSource;
use crate::error::FetchError;

pub const DEFAULT_OVERPASS_ENDPOINT: &str =
    "https://overpass-api.de/api/interpreter";

const UNKNOWN_BANK: &str = "Unknown";

/// Lists ATMs and bank branches from the OpenStreetMap Overpass API.
#[derive(Debug, Clone)]
pub struct OverpassSource {
    client: reqwest::Client,
    endpoint: Url,
    bounds: GeoBounds,
    timeout: Duration,
}

impl OverpassSource {
    pub fn new(
        endpoint: Url,
        bounds: GeoBounds,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            bounds,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Overpass QL selecting `amenity=atm` and `amenity=bank` nodes.
    pub fn query(&self) -> String {
        let bbox = self.bounds.to_overpass_bbox();
        format!(
            "[out:json][timeout:25];\n(\n  node[\"amenity\"=\"atm\"]({bbox});\n  node[\"amenity\"=\"bank\"]({bbox});\n);\nout body;"
        )
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Network(err)
        }
    }
}

#[async_trait]
impl PoiSource for OverpassSource {
    async fn fetch_all(&self) -> Result<Vec<PointOfInterest>, FetchError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(self.query())
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|err| self.classify(err))?;
        let points = parse_elements(&body)?;
        debug!(count = points.len(), endpoint = %self.endpoint, "overpass fetch");
        Ok(points)
    }

    fn name(&self) -> &'static str {
        "overpass"
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    id: i64,
    lat: f64,
    lon: f64,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

/// Decodes an Overpass JSON body into points of interest.
///
/// The bank is the first of the `brand`, `operator` and `name` tags present;
/// the display name is the `name` tag or `"<bank> ATM"`.
pub fn parse_elements(body: &[u8]) -> Result<Vec<PointOfInterest>, FetchError> {
    let response: OverpassResponse = serde_json::from_slice(body)
        .map_err(|err| FetchError::Malformed(err.to_string()))?;

    Ok(response
        .elements
        .into_iter()
        .map(|element| {
            let bank = ["brand", "operator", "name"]
                .iter()
                .find_map(|key| element.tags.get(*key))
                .cloned()
                .unwrap_or_else(|| UNKNOWN_BANK.to_string());
            let name = element
                .tags
                .get("name")
                .cloned()
                .unwrap_or_else(|| format!("{bank} ATM"));

            PointOfInterest {
                id: TerminalId(element.id),
                name,
                bank,
                position: GeoPoint::new(element.lat, element.lon),
                tags: element.tags,
            }
        })
        .collect())
}
