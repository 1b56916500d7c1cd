//! Route cache and layer management
//!
//! Owns the last computed geometry per [`RouteKind`] and the map source and
//! layer that draw it. Every mutation removes the kind's fixed IDs before
//! adding them again, so repeated or re-entrant calls never leave duplicates
//! or orphans behind.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::map::{
    safe_remove_layer, safe_remove_source, wait_style_ready, Feature, LayerSpec, LineGeometry,
    LineLayout, LinePaint, MapSurface, SourceSpec,
};

/// Walking route category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteKind {
    AllAccess,
    StepFree,
}

impl RouteKind {
    /// Every kind, in replay order
    pub const ALL: [RouteKind; 2] = [RouteKind::AllAccess, RouteKind::StepFree];

    /// Rendering configuration of this kind
    pub fn layer_config(self) -> &'static RouteLayerConfig {
        match self {
            RouteKind::AllAccess => &ALL_ACCESS_LAYER,
            RouteKind::StepFree => &STEP_FREE_LAYER,
        }
    }

    /// Locale key of the legend label
    pub fn legend_key(self) -> &'static str {
        match self {
            RouteKind::AllAccess => "legendAll",
            RouteKind::StepFree => "legendStep",
        }
    }

    fn slot(self) -> usize {
        match self {
            RouteKind::AllAccess => 0,
            RouteKind::StepFree => 1,
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::AllAccess => write!(f, "all-access"),
            RouteKind::StepFree => write!(f, "step-free"),
        }
    }
}

/// How a cached route of one kind is drawn
#[derive(Debug, PartialEq)]
pub struct RouteLayerConfig {
    pub source_id: &'static str,
    pub layer_id: &'static str,
    pub color: &'static str,
    pub dash: Option<&'static [f64]>,
    pub width: f64,
}

static ALL_ACCESS_LAYER: RouteLayerConfig = RouteLayerConfig {
    source_id: "route-all",
    layer_id: "route-all-layer",
    color: "#1da1f2",
    dash: None,
    width: 6.0,
};

static STEP_FREE_LAYER: RouteLayerConfig = RouteLayerConfig {
    source_id: "route-step",
    layer_id: "route-step-layer",
    color: "#34c759",
    dash: Some(&[2.0, 2.0]),
    width: 6.0,
};

impl RouteLayerConfig {
    pub fn source_spec(&self, geometry: &LineGeometry) -> SourceSpec {
        SourceSpec {
            id: self.source_id.to_string(),
            data: Feature::line(geometry.clone()),
        }
    }

    pub fn layer_spec(&self) -> LayerSpec {
        LayerSpec {
            id: self.layer_id.to_string(),
            kind: "line",
            source: self.source_id.to_string(),
            layout: LineLayout::default(),
            paint: LinePaint {
                color: self.color.to_string(),
                width: self.width,
                dash: self.dash.map(|d| d.to_vec()),
            },
        }
    }
}

/// Per-kind route cache bound to the map's layer registry
#[derive(Debug, Default)]
pub struct RouteLayers {
    cache: [Option<LineGeometry>; 2],
}

impl RouteLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last geometry computed for `kind`
    pub fn cached(&self, kind: RouteKind) -> Option<&LineGeometry> {
        self.cache[kind.slot()].as_ref()
    }

    /// Draw the cached geometry of `kind`, replacing whatever is drawn now
    ///
    /// No-op when nothing is cached. Waits for the active style first since
    /// layers cannot be added to a style that is still loading.
    pub async fn ensure_rendered<M: MapSurface>(
        &self,
        kind: RouteKind,
        map: &mut M,
    ) -> Result<()> {
        let Some(geometry) = self.cached(kind) else {
            return Ok(());
        };
        wait_style_ready(map).await?;
        draw(kind.layer_config(), geometry, map)
    }

    /// Overwrite the cached geometry of `kind` and draw it immediately
    pub async fn set_route<M: MapSurface>(
        &mut self,
        kind: RouteKind,
        geometry: LineGeometry,
        map: &mut M,
    ) -> Result<()> {
        debug!(
            "Caching {kind} route with {} vertices",
            geometry.coordinates.len()
        );
        self.cache[kind.slot()] = Some(geometry);
        self.ensure_rendered(kind, map).await
    }

    /// Re-provision every cached kind, e.g. after a style swap
    pub async fn replay_all<M: MapSurface>(&self, map: &mut M) -> Result<()> {
        for kind in RouteKind::ALL {
            self.ensure_rendered(kind, map).await?;
        }
        Ok(())
    }
}

/// Remove-then-add for one kind's fixed IDs
fn draw<M: MapSurface>(
    config: &RouteLayerConfig,
    geometry: &LineGeometry,
    map: &mut M,
) -> Result<()> {
    // Layer first: a source cannot go while a layer still draws it
    safe_remove_layer(map, config.layer_id)?;
    safe_remove_source(map, config.source_id)?;
    map.add_source(config.source_spec(geometry))?;
    map.add_layer(config.layer_spec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::headless::HeadlessMap;
    use crate::core::map::{LngLat, MapViewState};

    fn map() -> HeadlessMap {
        HeadlessMap::new(
            "style://detailed",
            MapViewState {
                center: LngLat::new(-4.289, 55.873),
                zoom: 15.0,
            },
        )
    }

    fn line(offset: f64) -> LineGeometry {
        LineGeometry::new(vec![
            LngLat::new(-4.2927 + offset, 55.87355),
            LngLat::new(-4.2900, 55.8738),
            LngLat::new(-4.2878, 55.8731),
        ])
    }

    #[tokio::test]
    async fn test_ensure_rendered_without_cache_is_noop() {
        let mut map = map();
        let layers = RouteLayers::new();
        layers
            .ensure_rendered(RouteKind::StepFree, &mut map)
            .await
            .unwrap();
        assert_eq!(map.layer_count(), 0);
        assert_eq!(map.source_count(), 0);
    }

    #[tokio::test]
    async fn test_repeated_rendering_keeps_one_layer_per_kind() {
        let mut map = map();
        let mut layers = RouteLayers::new();
        layers
            .set_route(RouteKind::AllAccess, line(0.0), &mut map)
            .await
            .unwrap();

        let once = map.to_feature_collection();
        for _ in 0..3 {
            layers
                .ensure_rendered(RouteKind::AllAccess, &mut map)
                .await
                .unwrap();
        }

        assert_eq!(map.layer_count(), 1);
        assert_eq!(map.source_count(), 1);
        assert_eq!(map.to_feature_collection(), once);
        assert_eq!(
            map.source("route-all").unwrap().data.geometry,
            line(0.0)
        );
    }

    #[tokio::test]
    async fn test_set_route_overwrites_instead_of_merging() {
        let mut map = map();
        let mut layers = RouteLayers::new();
        layers
            .set_route(RouteKind::StepFree, line(0.0), &mut map)
            .await
            .unwrap();
        layers
            .set_route(RouteKind::StepFree, line(0.001), &mut map)
            .await
            .unwrap();

        assert_eq!(layers.cached(RouteKind::StepFree), Some(&line(0.001)));
        assert_eq!(map.layer_count(), 1);
        assert_eq!(
            map.source("route-step").unwrap().data.geometry,
            line(0.001)
        );
        assert!(layers.cached(RouteKind::AllAccess).is_none());
    }

    #[tokio::test]
    async fn test_step_free_layer_is_dashed() {
        let mut map = map();
        let mut layers = RouteLayers::new();
        layers
            .set_route(RouteKind::StepFree, line(0.0), &mut map)
            .await
            .unwrap();
        layers
            .set_route(RouteKind::AllAccess, line(0.0), &mut map)
            .await
            .unwrap();

        let step = map.layer("route-step-layer").unwrap();
        assert_eq!(step.paint.dash, Some(vec![2.0, 2.0]));
        assert_eq!(step.paint.color, "#34c759");
        assert_eq!(step.layout.join, "round");

        let all = map.layer("route-all-layer").unwrap();
        assert_eq!(all.paint.dash, None);
        let json = serde_json::to_value(all).unwrap();
        assert!(json["paint"].get("line-dasharray").is_none());
    }

    #[tokio::test]
    async fn test_replay_after_destructive_swap() {
        let mut map = map();
        let mut layers = RouteLayers::new();
        layers
            .set_route(RouteKind::AllAccess, line(0.0), &mut map)
            .await
            .unwrap();
        layers
            .set_route(RouteKind::StepFree, line(0.002), &mut map)
            .await
            .unwrap();

        map.set_style("style://satellite");
        assert_eq!(map.layer_count(), 0);

        layers.replay_all(&mut map).await.unwrap();
        assert_eq!(map.layer_count(), 2);
        assert!(map.has_layer("route-all-layer"));
        assert!(map.has_layer("route-step-layer"));
    }
}
