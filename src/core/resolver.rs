//! Free-text location lookup
//!
//! Local landmarks always win: the remote geocoder is only asked when the
//! gazetteer has no substring match, and its failures turn into an empty
//! suggestion list rather than an error.

use log::{debug, warn};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::core::config::GeocodingConfig;
use crate::core::error::{suggest_correction, Error, Result};
use crate::core::http::shared_client;
use crate::core::landmark::{Landmark, LANDMARKS};
use crate::core::map::{Bounds, LngLat};
use crate::core::selection::Role;

/// A suggestion shown under an input
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub label: String,
    pub coordinate: LngLat,
}

impl From<&Landmark> for Candidate {
    fn from(landmark: &Landmark) -> Self {
        Self {
            label: landmark.name.to_string(),
            coordinate: landmark.coordinate,
        }
    }
}

/// Remote place search
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<Candidate>>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    place_name: String,
    geometry: PointGeometry,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: LngLat,
}

/// Mapbox places search restricted to the campus bounding box
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    client: Client,
    base_url: String,
    access_token: String,
    bbox: Bounds,
    limit: usize,
}

impl MapboxGeocoder {
    pub fn new(config: &GeocodingConfig) -> Self {
        Self::with_client(shared_client(), config)
    }

    pub fn with_client(client: Client, config: &GeocodingConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
            bbox: config.bbox,
            limit: config.limit,
        }
    }

    /// `{base}/{query}.json?access_token=..&limit=..&bbox=W,S,E,N`
    pub fn request_url(&self, query: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::ConfigError(format!("invalid geocoding URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| Error::ConfigError(format!("geocoding URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push(&format!("{query}.json"));
        url.query_pairs_mut()
            .clear()
            .append_pair("access_token", &self.access_token)
            .append_pair("limit", &self.limit.to_string());
        // bbox keeps its literal commas
        let query = format!(
            "{}&bbox={}",
            url.query().unwrap_or_default(),
            self.bbox.to_query_value()
        );
        url.set_query(Some(&query));
        Ok(url)
    }
}

impl Geocoder for MapboxGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<Candidate>> {
        let url = self.request_url(query)?;
        debug!("Geocoding \"{query}\" remotely");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::GeocodeUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::GeocodeUnavailable(format!("HTTP {status}")));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| Error::GeocodeUnavailable(format!("unreadable response: {e}")))?;

        Ok(body
            .features
            .into_iter()
            .map(|f| Candidate {
                label: f.place_name,
                coordinate: f.geometry.coordinates,
            })
            .collect())
    }
}

/// Turns typed text into candidate locations
#[derive(Debug)]
pub struct LocationResolver<G> {
    gazetteer: &'static [Landmark],
    geocoder: G,
}

impl<G: Geocoder> LocationResolver<G> {
    /// Resolver over the built-in campus landmarks
    pub fn new(geocoder: G) -> Self {
        Self::with_gazetteer(&LANDMARKS, geocoder)
    }

    pub fn with_gazetteer(gazetteer: &'static [Landmark], geocoder: G) -> Self {
        Self {
            gazetteer,
            geocoder,
        }
    }

    pub fn gazetteer(&self) -> &'static [Landmark] {
        self.gazetteer
    }

    /// Trim and case-fold input text
    pub fn normalize(text: &str) -> String {
        text.trim().to_lowercase()
    }

    /// Landmarks whose name contains the normalized query, in dataset order
    pub fn local_matches<'a>(&'a self, normalized: &'a str) -> impl Iterator<Item = Candidate> + 'a {
        self.gazetteer
            .iter()
            .filter(move |l| l.name.to_lowercase().contains(normalized))
            .map(Candidate::from)
    }

    /// Candidates for `text` typed into the `role` input
    ///
    /// Blank text yields nothing without any lookup. Local matches are
    /// returned as-is; otherwise one remote query is issued and any failure
    /// becomes an empty list.
    pub async fn resolve(&self, role: Role, text: &str) -> Vec<Candidate> {
        let query = Self::normalize(text);
        if query.is_empty() {
            return Vec::new();
        }

        let local: Vec<Candidate> = self.local_matches(&query).collect();
        if !local.is_empty() {
            debug!("{} local match(es) for {role} query \"{query}\"", local.len());
            return local;
        }

        match self.geocoder.geocode(&query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("No suggestions for {role} query \"{query}\": {e}");
                Vec::new()
            }
        }
    }

    /// Closest landmark name for a query that matched nothing
    pub fn suggest(&self, text: &str) -> Option<String> {
        suggest_correction(text, self.gazetteer.iter().map(|l| l.name))
    }
}
