use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::fetch_error::FetchError;
use crate::grid::GridPoint;
use crate::observation::ObservationItem;

const NOWCAST_PATH: &str = "/getUltraSrtNcst";
const NUM_OF_ROWS: &str = "10";
const PAGE_NO: &str = "1";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client for the ultra-short-term nowcast endpoint. Base URL and service
/// key are injected at construction, never read from ambient state.
#[derive(Clone)]
pub struct NowcastFetcher {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

// Response envelope of the nowcast API. Only category/obsrValue are
// consumed; error responses carry a header but no body.
#[derive(Debug, Deserialize)]
struct NowcastResponse {
    response: ResponseEnvelope,
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    body: Option<ResponseBody>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    items: Option<ResponseItems>,
}

#[derive(Debug, Deserialize)]
struct ResponseItems {
    item: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    category: String,
    #[serde(rename = "obsrValue")]
    obsr_value: String,
}

impl NowcastFetcher {
    pub fn new(base_url: String, service_key: String) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url,
            service_key,
        })
    }

    #[instrument(skip(self, base_date, base_time), fields(base_url = %self.base_url))]
    pub async fn fetch_observations(
        &self,
        point: GridPoint,
        base_date: &str,
        base_time: &str,
    ) -> Result<Vec<ObservationItem>, FetchError> {
        let url = format!("{}{}", self.base_url, NOWCAST_PATH);
        let nx = point.x.to_string();
        let ny = point.y.to_string();

        debug!("Requesting nowcast for grid ({}, {}) at {} {}", nx, ny, base_date, base_time);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("serviceKey", self.service_key.as_str()),
                ("numOfRows", NUM_OF_ROWS),
                ("pageNo", PAGE_NO),
                ("dataType", "JSON"),
                ("base_date", base_date),
                ("base_time", base_time),
                ("nx", nx.as_str()),
                ("ny", ny.as_str()),
            ])
            .send()
            .await?;
        debug!("Received HTTP response with status: {}", response.status());

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        debug!("Retrieved response body, size: {} bytes", body.len());

        parse_items(&body)
    }
}

/// Pull the raw (category, obsrValue) pairs out of a response body.
/// A missing body or an empty item list is a fetch failure, not an empty
/// observation set.
fn parse_items(body: &str) -> Result<Vec<ObservationItem>, FetchError> {
    let parsed: NowcastResponse = serde_json::from_str(body)?;

    let items = parsed
        .response
        .body
        .and_then(|body| body.items)
        .map(|items| items.item)
        .unwrap_or_default();

    if items.is_empty() {
        return Err(FetchError::NoData);
    }

    Ok(items
        .into_iter()
        .map(|raw| ObservationItem {
            category: raw.category,
            value: raw.obsr_value,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_items_success() {
        let body = r#"{
            "response": {
                "header": {"resultCode": "00", "resultMsg": "NORMAL_SERVICE"},
                "body": {
                    "dataType": "JSON",
                    "items": {
                        "item": [
                            {"baseDate": "20251014", "baseTime": "1400", "category": "T1H", "nx": 60, "ny": 127, "obsrValue": "13.2"},
                            {"baseDate": "20251014", "baseTime": "1400", "category": "REH", "nx": 60, "ny": 127, "obsrValue": "55"}
                        ]
                    },
                    "numOfRows": 10,
                    "pageNo": 1,
                    "totalCount": 2
                }
            }
        }"#;

        let items = parse_items(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, "T1H");
        assert_eq!(items[0].value, "13.2");
        assert_eq!(items[1].category, "REH");
        assert_eq!(items[1].value, "55");
    }

    #[test]
    fn test_parse_items_header_only_is_no_data() {
        // Error responses from the API carry a header but no body.
        let body = r#"{
            "response": {
                "header": {"resultCode": "03", "resultMsg": "NO_DATA"}
            }
        }"#;

        let result = parse_items(body);
        assert!(matches!(result, Err(FetchError::NoData)));
    }

    #[test]
    fn test_parse_items_empty_list_is_no_data() {
        let body = r#"{
            "response": {
                "header": {"resultCode": "00", "resultMsg": "NORMAL_SERVICE"},
                "body": {"items": {"item": []}}
            }
        }"#;

        let result = parse_items(body);
        assert!(matches!(result, Err(FetchError::NoData)));
    }

    #[test]
    fn test_parse_items_malformed_body() {
        let result = parse_items("<html>not json</html>");
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }
}
