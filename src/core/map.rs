//! Map library boundary for campus-route
//!
//! The rendering engine is an external collaborator. The routing core only
//! talks to it through [`MapSurface`], using fixed source/layer IDs and
//! camera-fit requests.

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// A `[longitude, latitude]` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(point: LngLat) -> Self {
        [point.lng, point.lat]
    }
}

/// Axis-aligned geographic box, serialized as `[west, south, east, north]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    /// Degenerate box around a single point
    pub fn around(point: LngLat) -> Self {
        Self {
            west: point.lng,
            south: point.lat,
            east: point.lng,
            north: point.lat,
        }
    }

    /// Grow the box so it contains `point`
    pub fn extend(&mut self, point: LngLat) {
        self.west = self.west.min(point.lng);
        self.south = self.south.min(point.lat);
        self.east = self.east.max(point.lng);
        self.north = self.north.max(point.lat);
    }

    pub fn contains(&self, point: LngLat) -> bool {
        point.lng >= self.west
            && point.lng <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }

    /// `W,S,E,N` as expected by geocoding query strings
    pub fn to_query_value(&self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

impl From<[f64; 4]> for Bounds {
    fn from(v: [f64; 4]) -> Self {
        Self {
            west: v[0],
            south: v[1],
            east: v[2],
            north: v[3],
        }
    }
}

impl From<Bounds> for [f64; 4] {
    fn from(b: Bounds) -> Self {
        [b.west, b.south, b.east, b.north]
    }
}

/// GeoJSON geometry type tag; only line strings are rendered as routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeometryType {
    #[default]
    LineString,
}

/// A GeoJSON `LineString`: ordered `[longitude, latitude]` pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineGeometry {
    #[serde(rename = "type", default)]
    pub kind: GeometryType,
    pub coordinates: Vec<LngLat>,
}

impl LineGeometry {
    pub fn new(coordinates: Vec<LngLat>) -> Self {
        Self {
            kind: GeometryType::LineString,
            coordinates,
        }
    }

    /// Bounding box of all vertices, `None` for an empty line
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.coordinates.iter();
        let mut bounds = Bounds::around(*points.next()?);
        for point in points {
            bounds.extend(*point);
        }
        Some(bounds)
    }
}

/// Camera position captured before a style swap and restored after it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewState {
    pub center: LngLat,
    pub zoom: f64,
}

impl MapViewState {
    pub fn capture<M: MapSurface>(map: &M) -> Self {
        Self {
            center: map.center(),
            zoom: map.zoom(),
        }
    }

    pub fn restore<M: MapSurface>(&self, map: &mut M) {
        map.set_center(self.center);
        map.set_zoom(self.zoom);
    }
}

/// Single-feature GeoJSON source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSpec {
    pub id: String,
    pub data: Feature,
}

/// GeoJSON `Feature` wrapping a route line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: LineGeometry,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Feature {
    pub fn line(geometry: LineGeometry) -> Self {
        Self {
            geometry,
            properties: serde_json::Map::new(),
        }
    }
}

/// Layout of a line layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineLayout {
    #[serde(rename = "line-join")]
    pub join: &'static str,
    #[serde(rename = "line-cap")]
    pub cap: &'static str,
}

impl Default for LineLayout {
    fn default() -> Self {
        Self {
            join: "round",
            cap: "round",
        }
    }
}

/// Paint of a line layer; the dash array is omitted when not configured
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePaint {
    #[serde(rename = "line-color")]
    pub color: String,
    #[serde(rename = "line-width")]
    pub width: f64,
    #[serde(rename = "line-dasharray", skip_serializing_if = "Option::is_none")]
    pub dash: Option<Vec<f64>>,
}

/// Line layer drawing one source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub source: String,
    pub layout: LineLayout,
    pub paint: LinePaint,
}

/// Overlay controls attached to the map chrome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Navigation,
    /// High-accuracy geolocation that keeps tracking the user
    Geolocate,
}

/// Controls attached at startup and after every style swap
pub const DEFAULT_CONTROLS: [Control; 2] = [Control::Navigation, Control::Geolocate];

/// Handle of a marker placed on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

/// How a marker is drawn
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerStyle {
    /// Colored pin, used for the chosen origin and destination
    Pin { color: &'static str },
    /// Glyph with a hover title, used for landmarks
    Glyph { glyph: &'static str, title: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub at: LngLat,
    pub style: MarkerStyle,
    pub popup: Option<String>,
}

/// Style lifecycle signals emitted by the map library
#[derive(Debug, Clone, PartialEq)]
pub enum StyleEvent {
    /// The new style's data has begun loading
    StyleData,
    /// No pending tiles or resources remain
    Idle,
    /// The style could not be loaded
    Error(String),
}

/// Operations the routing core needs from the map library
///
/// Mutations mirror the underlying library: adding an ID that already
/// exists or removing one that does not is an error, so callers go through
/// [`safe_remove_layer`] and [`safe_remove_source`].
#[allow(async_fn_in_trait)]
pub trait MapSurface {
    fn add_source(&mut self, source: SourceSpec) -> Result<()>;
    fn remove_source(&mut self, id: &str) -> Result<()>;
    fn has_source(&self, id: &str) -> bool;

    fn add_layer(&mut self, layer: LayerSpec) -> Result<()>;
    fn remove_layer(&mut self, id: &str) -> Result<()>;
    fn has_layer(&self, id: &str) -> bool;

    fn center(&self) -> LngLat;
    fn set_center(&mut self, center: LngLat);
    fn zoom(&self) -> f64;
    fn set_zoom(&mut self, zoom: f64);
    fn fit_bounds(&mut self, bounds: Bounds, padding: u32);

    /// Replace the basemap. Every overlay source and layer is invalidated.
    fn set_style(&mut self, url: &str);
    fn is_style_loaded(&self) -> bool;
    /// Wait for the next style lifecycle signal
    async fn next_style_event(&mut self) -> StyleEvent;

    fn add_control(&mut self, control: Control);
    /// Remove every overlay control currently attached
    fn remove_controls(&mut self);

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId;
    fn remove_marker(&mut self, id: MarkerId);
    fn set_popup(&mut self, id: MarkerId, text: &str);
}

/// Remove a layer if it exists
pub fn safe_remove_layer<M: MapSurface>(map: &mut M, id: &str) -> Result<()> {
    if map.has_layer(id) {
        map.remove_layer(id)?;
    }
    Ok(())
}

/// Remove a source if it exists
pub fn safe_remove_source<M: MapSurface>(map: &mut M, id: &str) -> Result<()> {
    if map.has_source(id) {
        map.remove_source(id)?;
    }
    Ok(())
}

/// Attach the default overlay controls
pub fn attach_controls<M: MapSurface>(map: &mut M) {
    for control in DEFAULT_CONTROLS {
        map.add_control(control);
    }
}

/// Resolve once the active style can accept new sources and layers
///
/// Returns immediately when the style is already loaded, otherwise waits for
/// the next `Idle` signal.
pub async fn wait_style_ready<M: MapSurface>(map: &mut M) -> Result<()> {
    if map.is_style_loaded() {
        return Ok(());
    }
    loop {
        match map.next_style_event().await {
            StyleEvent::Idle => return Ok(()),
            StyleEvent::StyleData => continue,
            StyleEvent::Error(reason) => return Err(Error::StyleLoadFailed(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_bounds() {
        let line = LineGeometry::new(vec![
            LngLat::new(-4.2927, 55.87355),
            LngLat::new(-4.2900, 55.8740),
            LngLat::new(-4.2878, 55.8731),
        ]);
        let bounds = line.bounds().unwrap();
        assert_eq!(bounds.west, -4.2927);
        assert_eq!(bounds.east, -4.2878);
        assert_eq!(bounds.south, 55.8731);
        assert_eq!(bounds.north, 55.8740);
        assert!(LineGeometry::new(Vec::new()).bounds().is_none());
    }

    #[test]
    fn test_line_geometry_geojson_shape() {
        let json = r#"{"type":"LineString","coordinates":[[-4.29,55.87],[-4.28,55.873]]}"#;
        let line: LineGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(line.coordinates[1], LngLat::new(-4.28, 55.873));

        let back = serde_json::to_value(&line).unwrap();
        assert_eq!(back["type"], "LineString");
        assert_eq!(back["coordinates"][0][0], -4.29);
    }

    #[test]
    fn test_rejects_non_line_geometry() {
        let json = r#"{"type":"Point","coordinates":[[-4.29,55.87]]}"#;
        assert!(serde_json::from_str::<LineGeometry>(json).is_err());
    }

    #[test]
    fn test_bbox_query_value() {
        let bbox = Bounds::from([-4.35, 55.83, -4.2, 55.9]);
        assert_eq!(bbox.to_query_value(), "-4.35,55.83,-4.2,55.9");
        assert!(bbox.contains(LngLat::new(-4.289, 55.873)));
        assert!(!bbox.contains(LngLat::new(-3.19, 55.95)));
    }
}
