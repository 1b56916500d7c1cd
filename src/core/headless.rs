//! In-memory map surface
//!
//! Behaves like the browser map library as far as the routing core can
//! observe: duplicate IDs are rejected, removing an unknown ID fails, a
//! source cannot be removed while a layer still draws it, and a style swap
//! drops every overlay and resets the camera. Used by the CLI to export the
//! rendered route layers and by the tests.

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde_json::json;

use crate::core::error::{Error, Result};
use crate::core::map::{
    Bounds, Control, LayerSpec, LngLat, MapSurface, MapViewState, MarkerId, MarkerSpec,
    SourceSpec, StyleEvent,
};

/// Fit-bounds request recorded by the headless map
#[derive(Debug, Clone, PartialEq)]
pub struct FitRequest {
    pub bounds: Bounds,
    pub padding: u32,
}

/// In-memory [`MapSurface`]
#[derive(Debug)]
pub struct HeadlessMap {
    style_url: String,
    initial_view: MapViewState,
    view: MapViewState,
    sources: BTreeMap<String, SourceSpec>,
    layers: Vec<LayerSpec>,
    controls: Vec<Control>,
    markers: HashMap<MarkerId, MarkerSpec>,
    next_marker: u64,
    events: VecDeque<StyleEvent>,
    loading: bool,
    broken: Option<String>,
    fail_next_style: Option<String>,
    fits: Vec<FitRequest>,
    style_history: Vec<String>,
}

impl HeadlessMap {
    /// Create a map showing `style_url`, fully loaded, at `initial_view`
    pub fn new(style_url: &str, initial_view: MapViewState) -> Self {
        Self {
            style_url: style_url.to_string(),
            initial_view,
            view: initial_view,
            sources: BTreeMap::new(),
            layers: Vec::new(),
            controls: Vec::new(),
            markers: HashMap::new(),
            next_marker: 0,
            events: VecDeque::new(),
            loading: false,
            broken: None,
            fail_next_style: None,
            fits: Vec::new(),
            style_history: vec![style_url.to_string()],
        }
    }

    /// Make the next `set_style` call fail with `reason`
    pub fn fail_next_style_load(&mut self, reason: &str) {
        self.fail_next_style = Some(reason.to_string());
    }

    pub fn style_url(&self) -> &str {
        &self.style_url
    }

    /// Every style URL requested so far, starting with the initial one
    pub fn style_history(&self) -> &[String] {
        &self.style_history
    }

    pub fn source(&self, id: &str) -> Option<&SourceSpec> {
        self.sources.get(id)
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn marker(&self, id: MarkerId) -> Option<&MarkerSpec> {
        self.markers.get(&id)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn fit_requests(&self) -> &[FitRequest] {
        &self.fits
    }

    /// Rendered line layers as a GeoJSON `FeatureCollection`
    ///
    /// Each feature carries its layer ID and paint so the output can be
    /// styled the same way in another viewer.
    pub fn to_feature_collection(&self) -> serde_json::Value {
        let features: Vec<serde_json::Value> = self
            .layers
            .iter()
            .filter_map(|layer| {
                let source = self.sources.get(&layer.source)?;
                Some(json!({
                    "type": "Feature",
                    "geometry": source.data.geometry,
                    "properties": {
                        "layer": layer.id,
                        "line-color": layer.paint.color,
                        "line-width": layer.paint.width,
                        "line-dasharray": layer.paint.dash,
                    },
                }))
            })
            .collect();

        json!({ "type": "FeatureCollection", "features": features })
    }
}

impl MapSurface for HeadlessMap {
    fn add_source(&mut self, source: SourceSpec) -> Result<()> {
        if self.sources.contains_key(&source.id) {
            return Err(Error::MapError(format!(
                "There is already a source with ID \"{}\"",
                source.id
            )));
        }
        self.sources.insert(source.id.clone(), source);
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<()> {
        if let Some(layer) = self.layers.iter().find(|l| l.source == id) {
            return Err(Error::MapError(format!(
                "Source \"{id}\" cannot be removed while layer \"{}\" is using it",
                layer.id
            )));
        }
        self.sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::MapError(format!("There is no source with ID \"{id}\"")))
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<()> {
        if self.has_layer(&layer.id) {
            return Err(Error::MapError(format!(
                "Layer with id \"{}\" already exists on this map",
                layer.id
            )));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(Error::MapError(format!(
                "Source \"{}\" not found for layer \"{}\"",
                layer.source, layer.id
            )));
        }
        if self.loading {
            return Err(Error::MapError("Style is not done loading".to_string()));
        }
        self.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<()> {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        if self.layers.len() == before {
            return Err(Error::MapError(format!(
                "The layer '{id}' does not exist in the map's style"
            )));
        }
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    fn center(&self) -> LngLat {
        self.view.center
    }

    fn set_center(&mut self, center: LngLat) {
        self.view.center = center;
    }

    fn zoom(&self) -> f64 {
        self.view.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.view.zoom = zoom;
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding: u32) {
        self.view.center = LngLat::new(
            (bounds.west + bounds.east) / 2.0,
            (bounds.south + bounds.north) / 2.0,
        );
        self.fits.push(FitRequest { bounds, padding });
    }

    fn set_style(&mut self, url: &str) {
        self.style_url = url.to_string();
        self.style_history.push(url.to_string());
        self.sources.clear();
        self.layers.clear();
        self.view = self.initial_view;
        self.loading = true;
        self.broken = None;
        self.events.clear();

        match self.fail_next_style.take() {
            Some(reason) => {
                self.broken = Some(reason.clone());
                self.events.push_back(StyleEvent::Error(reason));
            }
            None => {
                self.events.push_back(StyleEvent::StyleData);
                self.events.push_back(StyleEvent::Idle);
            }
        }
    }

    fn is_style_loaded(&self) -> bool {
        !self.loading
    }

    async fn next_style_event(&mut self) -> StyleEvent {
        match self.events.pop_front() {
            Some(StyleEvent::Idle) => {
                self.loading = false;
                StyleEvent::Idle
            }
            Some(event) => event,
            None => match &self.broken {
                Some(reason) => StyleEvent::Error(reason.clone()),
                None => {
                    self.loading = false;
                    StyleEvent::Idle
                }
            },
        }
    }

    fn add_control(&mut self, control: Control) {
        self.controls.push(control);
    }

    fn remove_controls(&mut self) {
        self.controls.clear();
    }

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId {
        self.next_marker += 1;
        let id = MarkerId(self.next_marker);
        self.markers.insert(id, marker);
        id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
    }

    fn set_popup(&mut self, id: MarkerId, text: &str) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.popup = Some(text.to_string());
        }
    }
}
