//! Route computation pipeline
//!
//! Validates the selection, asks the routing backend of the chosen profile
//! for a walking route, caches and draws the result, fits the camera and
//! reports distance and duration.

use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::core::config::{AppConfig, RoutingEndpoints};
use crate::core::error::{suggest_correction, Error, Result};
use crate::core::http::shared_client;
use crate::core::layers::{RouteKind, RouteLayers};
use crate::core::locale::Locale;
use crate::core::map::{Bounds, LineGeometry, LngLat, MapSurface};
use crate::core::selection::Selection;

/// Routing backend; each one has its own base URL and route kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingProfile {
    #[default]
    AllAccess,
    StepFree,
}

impl RoutingProfile {
    pub const ALL: [RoutingProfile; 2] = [RoutingProfile::AllAccess, RoutingProfile::StepFree];

    pub fn name(self) -> &'static str {
        match self {
            RoutingProfile::AllAccess => "all-access",
            RoutingProfile::StepFree => "step-free",
        }
    }

    /// Cache slot and styling used for this profile's routes
    pub fn kind(self) -> RouteKind {
        match self {
            RoutingProfile::AllAccess => RouteKind::AllAccess,
            RoutingProfile::StepFree => RouteKind::StepFree,
        }
    }

    pub fn base_url(self, endpoints: &RoutingEndpoints) -> &str {
        match self {
            RoutingProfile::AllAccess => &endpoints.all_access,
            RoutingProfile::StepFree => &endpoints.step_free,
        }
    }
}

impl fmt::Display for RoutingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoutingProfile {
    type Err = Error;

    /// Accepts the profile names, their short forms and the legacy port
    /// numbers of the two backends
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all-access" | "all" | "5000" => Ok(RoutingProfile::AllAccess),
            "step-free" | "step" | "5001" => Ok(RoutingProfile::StepFree),
            _ => Err(Error::UnsupportedProfile {
                value: s.to_string(),
                suggestion: suggest_correction(s, RoutingProfile::ALL.iter().map(|p| p.name())),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
struct RouteEntry {
    #[serde(default)]
    geometry: Option<LineGeometry>,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

/// Length and walking time of a computed route
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub distance_m: f64,
    pub duration_s: f64,
}

impl RouteSummary {
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }

    /// Kilometres to two decimals, halves rounded away from zero
    ///
    /// Plain `{:.2}` rounds exact ties to even, so 125 m would read 0.12 km.
    fn display_km(&self) -> f64 {
        (self.distance_m / 10.0).round() / 100.0
    }

    /// Whole minutes, rounded to nearest
    pub fn duration_min(&self) -> u64 {
        (self.duration_s / 60.0).round().max(0.0) as u64
    }

    /// Summary line with localized labels
    pub fn localized(&self, locale: &Locale) -> String {
        format!(
            "{}: {:.2} km | {}: {} min",
            locale.localize("distance"),
            self.display_km(),
            locale.localize("duration"),
            self.duration_min()
        )
    }
}

impl fmt::Display for RouteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Distance: {:.2} km | Duration: {} min",
            self.display_km(),
            self.duration_min()
        )
    }
}

/// HTTP client for the OSRM-style routing backends
#[derive(Debug, Clone)]
pub struct RoutingClient {
    client: Client,
    endpoints: RoutingEndpoints,
}

impl RoutingClient {
    pub fn new(endpoints: RoutingEndpoints) -> Self {
        Self::with_client(shared_client(), endpoints)
    }

    pub fn with_client(client: Client, endpoints: RoutingEndpoints) -> Self {
        Self { client, endpoints }
    }

    /// `{base}/route/v1/foot/{lng},{lat};{lng},{lat}?geometries=geojson`
    pub fn route_url(&self, profile: RoutingProfile, from: LngLat, to: LngLat) -> String {
        format!(
            "{}/route/v1/foot/{},{};{},{}?geometries=geojson",
            profile.base_url(&self.endpoints).trim_end_matches('/'),
            from.lng,
            from.lat,
            to.lng,
            to.lat
        )
    }

    /// One request, no retry
    ///
    /// Transport errors and non-success statuses are `RouteFetchFailed`; a
    /// well-formed answer without a usable first route is `NoRouteFound`.
    pub async fn fetch(
        &self,
        profile: RoutingProfile,
        from: LngLat,
        to: LngLat,
    ) -> Result<(LineGeometry, RouteSummary)> {
        let url = self.route_url(profile, from, to);
        debug!("Requesting {profile} route: {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::RouteFetchFailed(format!("HTTP {status}")));
        }

        let body: RouteResponse = response
            .json()
            .await
            .map_err(|e| Error::RouteFetchFailed(format!("unreadable response: {e}")))?;

        let route = body.routes.into_iter().next().ok_or(Error::NoRouteFound)?;
        let geometry = route
            .geometry
            .filter(|g| !g.coordinates.is_empty())
            .ok_or(Error::NoRouteFound)?;

        Ok((
            geometry,
            RouteSummary {
                distance_m: route.distance,
                duration_s: route.duration,
            },
        ))
    }
}

/// A route that was cached, drawn and fitted
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedRoute {
    pub kind: RouteKind,
    pub geometry: LineGeometry,
    pub summary: RouteSummary,
    pub bounds: Bounds,
}

#[derive(Debug, Clone)]
pub struct RoutePipeline {
    routing: RoutingClient,
    fit_padding: u32,
}

impl RoutePipeline {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(RoutingClient::new(config.routing.clone()), config.fit_padding)
    }

    pub fn with_client(routing: RoutingClient, fit_padding: u32) -> Self {
        Self {
            routing,
            fit_padding,
        }
    }

    pub fn routing(&self) -> &RoutingClient {
        &self.routing
    }

    /// Compute, cache, draw and fit the route between the selected endpoints
    ///
    /// A failed fetch leaves the cache and the drawn layers as they were.
    pub async fn compute<M: MapSurface>(
        &self,
        selection: &Selection,
        profile: RoutingProfile,
        layers: &mut RouteLayers,
        map: &mut M,
    ) -> Result<ComputedRoute> {
        let (origin, destination) = selection.endpoints()?;
        let kind = profile.kind();

        let (geometry, summary) = self
            .routing
            .fetch(profile, origin.coordinate, destination.coordinate)
            .await
            .inspect_err(|e| {
                warn!("{kind} route {} -> {} failed: {e}", origin.label, destination.label)
            })?;

        layers.set_route(kind, geometry.clone(), map).await?;

        let bounds = geometry.bounds().ok_or(Error::NoRouteFound)?;
        map.fit_bounds(bounds, self.fit_padding);

        info!("{kind} route {} -> {}: {summary}", origin.label, destination.label);
        Ok(ComputedRoute {
            kind,
            geometry,
            summary,
            bounds,
        })
    }
}
