//! # Campus-route Library
//!
//! Accessible walking routes on the University of Glasgow's Gilmorehill
//! campus. The crate holds the state-coherence core of an interactive map:
//!
//! - **Location resolver**: landmark gazetteer first, bounded remote
//!   geocoding as a silent fallback
//! - **Route pipeline**: one request per plan to the all-access or step-free
//!   routing backend, with distance and duration reporting
//! - **Route cache & layers**: one cached line per route kind, drawn with
//!   fixed IDs using remove-then-add
//! - **Style transitions**: basemap swaps that keep the camera, the
//!   controls and every drawn route
//! - **Locale projection**: English and Chinese UI strings with fallback
//!
//! Rendering is delegated to whatever implements [`MapSurface`];
//! [`HeadlessMap`] is an in-memory implementation.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use campus_route::RoutingProfile;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let route = campus_route::route(
//!         "Boyd Orr Building",
//!         "Fraser Building",
//!         RoutingProfile::StepFree,
//!     )
//!     .await?;
//!     println!("{}", route.summary);
//!     Ok(())
//! }
//! ```

mod core;

pub use crate::core::config::{AppConfig, GeocodingConfig, RoutingEndpoints, StyleUrls};
pub use crate::core::error::{suggest_correction, Error, Result};
pub use crate::core::headless::{FitRequest, HeadlessMap};
pub use crate::core::landmark::{
    refresh_popups, render_landmarks, Access, Category, Landmark, LocalizedText, PlacedLandmark,
    LANDMARKS,
};
pub use crate::core::layers::{RouteKind, RouteLayerConfig, RouteLayers};
pub use crate::core::locale::{Language, LegendEntry, Locale, UiText};
pub use crate::core::map::{
    attach_controls, safe_remove_layer, safe_remove_source, wait_style_ready, Bounds, Control,
    Feature, LayerSpec, LineGeometry, LineLayout, LinePaint, LngLat, MapSurface, MapViewState,
    MarkerId, MarkerSpec, MarkerStyle, SourceSpec, StyleEvent, DEFAULT_CONTROLS,
};
pub use crate::core::pipeline::{
    ComputedRoute, RoutePipeline, RouteSummary, RoutingClient, RoutingProfile,
};
pub use crate::core::resolver::{Candidate, Geocoder, LocationResolver, MapboxGeocoder};
pub use crate::core::selection::{Autocomplete, QueryTicket, Role, Selection, Waypoint, BLUR_GRACE};
pub use crate::core::session::CampusMap;
pub use crate::core::store::{
    dismiss_welcome, welcome_should_show, FileStore, MemoryStore, PreferenceStore, LANGUAGE_KEY,
    WELCOME_KEY,
};
pub use crate::core::style::{
    BasemapStyle, StyleTransitionController, SwapOutcome, TransitionState,
};

/// Suggestions for `text`, as the origin input would show them
///
/// Uses the default configuration with environment overrides.
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// for candidate in campus_route::search("kelvin").await? {
///     println!("{} {:?}", candidate.label, candidate.coordinate);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(text: &str) -> Result<Vec<Candidate>> {
    let config = AppConfig::load(None)?;
    let resolver = LocationResolver::new(MapboxGeocoder::new(&config.geocoding));
    Ok(resolver.resolve(Role::Origin, text).await)
}

/// Route between the first matches of two free-text locations
///
/// Runs a full session on a [`HeadlessMap`] with the default configuration
/// and environment overrides.
pub async fn route(from: &str, to: &str, profile: RoutingProfile) -> Result<ComputedRoute> {
    let config = AppConfig::load(None)?;
    let mut session = headless_session(&config, Box::new(MemoryStore::default()));
    session.set_profile(profile);
    session.locate(Role::Origin, from).await?;
    session.locate(Role::Destination, to).await?;
    session.plan_route().await
}

/// Session on an in-memory map showing the detailed basemap
pub fn headless_session(
    config: &AppConfig,
    store: Box<dyn PreferenceStore>,
) -> CampusMap<HeadlessMap, MapboxGeocoder> {
    let map = HeadlessMap::new(&config.styles.detailed, config.initial_view);
    CampusMap::new(config, map, MapboxGeocoder::new(&config.geocoding), store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_session_starts_on_detailed_style() {
        let config = AppConfig::default();
        let session = headless_session(&config, Box::new(MemoryStore::default()));
        assert_eq!(session.map().style_url(), config.styles.detailed);
        assert_eq!(session.style().active(), BasemapStyle::Detailed);
        assert_eq!(session.map().center(), config.initial_view.center);
    }
}
