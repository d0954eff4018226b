//! Public geocoding APIs
//!
//! Zippopotam for ZIP codes, Nominatim (OpenStreetMap) for place names.

use async_trait::async_trait;
use serde::Deserialize;

use super::{Geocoder, PlaceMatch, ZipPlace};
use crate::error::{LocationError, Result};

const ZIPPOPOTAM_URL: &str = "https://api.zippopotam.us";
const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("windload-velocity-finder/", env!("CARGO_PKG_VERSION"));
const SEARCH_LIMIT: &str = "3";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeocoderConfig {
    pub zip_api_url: String,
    pub search_api_url: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            zip_api_url: ZIPPOPOTAM_URL.into(),
            search_api_url: NOMINATIM_URL.into(),
        }
    }
}

#[derive(Deserialize)]
struct ZipResponse {
    #[serde(default)]
    places: Vec<ZipResponsePlace>,
}

#[derive(Deserialize)]
struct ZipResponsePlace {
    #[serde(rename = "place name")]
    place_name: String,
    #[serde(rename = "state abbreviation")]
    state_abbreviation: String,
    latitude: String,
    longitude: String,
}

#[derive(Deserialize)]
struct SearchResult {
    display_name: String,
    lat: String,
    lon: String,
}

fn parse_coord(raw: &str, what: &str) -> Result<f64> {
    raw.trim()
        .parse()
        .map_err(|_| LocationError::Parse(format!("{what} {raw:?}")))
}

pub struct HttpGeocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
}

impl HttpGeocoder {
    pub fn new() -> Result<Self> {
        Self::with_config(GeocoderConfig::default())
    }

    pub fn with_config(config: GeocoderConfig) -> Result<Self> {
        // Nominatim rejects requests without an identifying agent.
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client, config })
    }

    async fn search_once(&self, query: &str) -> Result<Vec<PlaceMatch>> {
        let url = format!("{}/search", self.config.search_api_url.trim_end_matches('/'));
        let results: Vec<SearchResult> = self
            .client
            .get(url)
            .query(&[
                ("format", "json"),
                ("q", query),
                ("countrycodes", "us"),
                ("limit", SEARCH_LIMIT),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        results
            .into_iter()
            .map(|r| {
                Ok(PlaceMatch {
                    lat: parse_coord(&r.lat, "latitude")?,
                    lng: parse_coord(&r.lon, "longitude")?,
                    display_name: r.display_name,
                })
            })
            .collect()
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn locate_zip(&self, zip: &str) -> Result<ZipPlace> {
        // The +4 suffix isn't understood by the lookup service.
        let zip5 = zip.get(..5).unwrap_or(zip);
        let url = format!("{}/us/{zip5}", self.config.zip_api_url.trim_end_matches('/'));

        let response = self.client.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LocationError::NotFound(zip.into()));
        }

        let body: ZipResponse = response.error_for_status()?.json().await?;
        let place = body
            .places
            .into_iter()
            .next()
            .ok_or_else(|| LocationError::NotFound(zip.into()))?;

        Ok(ZipPlace {
            lat: parse_coord(&place.latitude, "latitude")?,
            lng: parse_coord(&place.longitude, "longitude")?,
            place_name: place.place_name,
            state: place.state_abbreviation,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<PlaceMatch>> {
        let query = query.trim();
        let matches = self.search_once(&format!("{query}, United States")).await?;
        if !matches.is_empty() {
            return Ok(matches);
        }
        self.search_once(query).await
    }

    fn name(&self) -> &str {
        "zippopotam+nominatim"
    }
}
