//! One campus map session
//!
//! [`CampusMap`] owns the map surface together with every piece of routing
//! state (route cache, style controller, selection, locale) and hands each
//! component the borrows it needs. Errors from user actions end up as a
//! localized notice; the methods still return them for callers that want
//! to react programmatically.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Instant;

use log::{debug, info};

use crate::core::config::AppConfig;
use crate::core::error::{Error, Result};
use crate::core::landmark::{refresh_popups, render_landmarks, PlacedLandmark, LANDMARKS};
use crate::core::layers::RouteLayers;
use crate::core::locale::{Language, Locale, UiText};
use crate::core::map::{attach_controls, MapSurface};
use crate::core::pipeline::{ComputedRoute, RoutePipeline, RouteSummary, RoutingProfile};
use crate::core::resolver::{Candidate, Geocoder, LocationResolver};
use crate::core::selection::{Role, Selection};
use crate::core::store::{self, PreferenceStore};
use crate::core::style::{BasemapStyle, StyleTransitionController, SwapOutcome};

/// Notice shown when a failure has no dedicated message
const GENERIC_NOTICE: &str = "noticeFetchFailed";
const STYLE_NOTICE: &str = "noticeStyleFailed";

pub struct CampusMap<M, G> {
    map: M,
    layers: RouteLayers,
    style: StyleTransitionController,
    selection: Selection,
    locale: Locale,
    resolver: LocationResolver<G>,
    pipeline: RoutePipeline,
    store: Box<dyn PreferenceStore>,
    landmarks: Vec<PlacedLandmark>,
    ui: Rc<RefCell<UiText>>,
    profile: RoutingProfile,
    notice: Option<&'static str>,
    summary: Option<RouteSummary>,
}

impl<M: MapSurface, G: Geocoder> CampusMap<M, G> {
    /// Set up a session on a freshly created map showing the default style
    ///
    /// Restores the saved language, attaches the overlay controls and places
    /// the landmark markers.
    pub fn new(config: &AppConfig, mut map: M, geocoder: G, store: Box<dyn PreferenceStore>) -> Self {
        let mut locale = Locale::load(store.as_ref());
        attach_controls(&mut map);
        let landmarks = render_landmarks(&LANDMARKS, &mut map, &locale);

        let ui = Rc::new(RefCell::new(UiText::project(&locale)));
        let projected = Rc::clone(&ui);
        locale.subscribe(move |language| {
            *projected.borrow_mut() = UiText::project(&Locale::new(language));
        });
        debug!(
            "Session ready: {} landmarks, language {}",
            landmarks.len(),
            locale.language()
        );

        Self {
            map,
            layers: RouteLayers::new(),
            style: StyleTransitionController::new(BasemapStyle::default(), config.styles.clone()),
            selection: Selection::new(),
            locale,
            resolver: LocationResolver::new(geocoder),
            pipeline: RoutePipeline::new(config),
            store,
            landmarks,
            ui,
            profile: RoutingProfile::default(),
            notice: None,
            summary: None,
        }
    }

    /// Replace the route pipeline, e.g. to point at different backends
    pub fn with_pipeline(mut self, pipeline: RoutePipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn into_map(self) -> M {
        self.map
    }

    pub fn layers(&self) -> &RouteLayers {
        &self.layers
    }

    pub fn style(&self) -> &StyleTransitionController {
        &self.style
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn resolver(&self) -> &LocationResolver<G> {
        &self.resolver
    }

    /// Every localized string currently displayed
    pub fn ui(&self) -> Ref<'_, UiText> {
        self.ui.borrow()
    }

    pub fn profile(&self) -> RoutingProfile {
        self.profile
    }

    pub fn set_profile(&mut self, profile: RoutingProfile) {
        self.profile = profile;
    }

    /// Pending user-facing notice in the current language
    pub fn notice(&self) -> Option<&str> {
        self.notice.map(|key| self.locale.localize(key))
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Distance and duration of the last computed route
    pub fn info(&self) -> Option<String> {
        self.summary.map(|s| s.localized(&self.locale))
    }

    /// Switch language and re-render every localized string and popup
    ///
    /// The displayed text follows through the locale subscription; popups
    /// live on the map surface and are refreshed here.
    pub fn set_language(&mut self, language: Language) {
        self.locale.set_language(language, self.store.as_mut());
        refresh_popups(&self.landmarks, &mut self.map, &self.locale);
    }

    /// Text typed into the `role` input: resolve it and fill the dropdown
    ///
    /// Returns the suggestions now shown.
    pub async fn type_query(&mut self, role: Role, text: &str) -> &[Candidate] {
        if let Some(ticket) = self.selection.input_mut(role).begin_query(text) {
            let candidates = self.resolver.resolve(role, text).await;
            self.selection.input_mut(role).complete(ticket, candidates);
        }
        self.selection.input(role).items()
    }

    /// Type `text` and take its first suggestion as the `role` waypoint
    ///
    /// Fails with `InvalidInput` when nothing matches, naming the closest
    /// landmark if there is one.
    pub async fn locate(&mut self, role: Role, text: &str) -> Result<Candidate> {
        if self.type_query(role, text).await.is_empty() {
            let mut message = format!("no {role} location matches '{}'", text.trim());
            if let Some(suggestion) = self.resolver.suggest(text) {
                message.push_str(&format!(". Did you mean '{suggestion}'?"));
            }
            return Err(Error::InvalidInput(message));
        }
        self.choose(role, 0)?;
        self.selection
            .waypoint(role)
            .map(|w| Candidate {
                label: w.label.clone(),
                coordinate: w.coordinate,
            })
            .ok_or(Error::MissingWaypoint(role))
    }

    /// Pick the `index`-th suggestion shown under the `role` input
    pub fn choose(&mut self, role: Role, index: usize) -> Result<()> {
        self.selection.choose(role, index, &mut self.map)
    }

    /// Set a waypoint directly
    pub fn select(&mut self, role: Role, candidate: Candidate) {
        self.selection.select(role, candidate, &mut self.map);
    }

    pub fn outside_click(&mut self, role: Role) {
        self.selection.input_mut(role).outside_click();
    }

    pub fn blur(&mut self, role: Role, now: Instant) {
        self.selection.input_mut(role).blur(now);
    }

    /// Apply elapsed blur delays on both inputs
    pub fn tick(&mut self, now: Instant) {
        for role in [Role::Origin, Role::Destination] {
            self.selection.input_mut(role).tick(now);
        }
    }

    /// Plan a route with the current profile between the selected waypoints
    pub async fn plan_route(&mut self) -> Result<ComputedRoute> {
        let result = self
            .pipeline
            .compute(&self.selection, self.profile, &mut self.layers, &mut self.map)
            .await;
        match &result {
            Ok(route) => {
                self.summary = Some(route.summary);
                self.notice = None;
            }
            Err(e) => self.notice = Some(e.notice_key().unwrap_or(GENERIC_NOTICE)),
        }
        result
    }

    /// Swap the basemap, keeping camera, controls and drawn routes
    pub async fn switch_style(&mut self, style: BasemapStyle) -> Result<SwapOutcome> {
        let result = self
            .style
            .swap_style(style, &self.layers, &mut self.map)
            .await;
        self.note_style_result(result.as_ref().err());
        result
    }

    /// Retry a basemap swap that failed to load
    pub async fn retry_style(&mut self) -> Result<()> {
        let result = self.style.retry(&self.layers, &mut self.map).await;
        self.note_style_result(result.as_ref().err());
        result
    }

    fn note_style_result(&mut self, error: Option<&Error>) {
        match error {
            Some(e @ Error::StyleLoadFailed(_)) => self.notice = e.notice_key(),
            Some(_) => {}
            None if self.notice == Some(STYLE_NOTICE) => self.notice = None,
            None => {}
        }
    }

    /// Whether the first-visit welcome dialog should open
    pub fn welcome_should_show(&self) -> bool {
        store::welcome_should_show(self.store.as_ref())
    }

    pub fn dismiss_welcome(&mut self, dont_show_again: bool) -> Result<()> {
        info!("Welcome dismissed (don't show again: {dont_show_again})");
        store::dismiss_welcome(self.store.as_mut(), dont_show_again)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::headless::HeadlessMap;
    use crate::core::layers::RouteKind;
    use crate::core::map::LngLat;
    use crate::core::store::MemoryStore;

    struct NoGeocoder;

    impl Geocoder for NoGeocoder {
        async fn geocode(&self, _query: &str) -> Result<Vec<Candidate>> {
            Ok(Vec::new())
        }
    }

    fn session() -> CampusMap<HeadlessMap, NoGeocoder> {
        let config = AppConfig::default();
        let map = HeadlessMap::new(&config.styles.detailed, config.initial_view);
        CampusMap::new(&config, map, NoGeocoder, Box::new(MemoryStore::default()))
    }

    #[test]
    fn test_new_session_places_landmarks_and_controls() {
        let session = session();
        assert_eq!(session.map().marker_count(), LANDMARKS.len());
        assert_eq!(session.map().controls().len(), 2);
        assert_eq!(session.locale().language(), Language::En);
        assert!(session.welcome_should_show());
    }

    #[tokio::test]
    async fn test_type_then_choose() {
        let mut session = session();
        let shown = session.type_query(Role::Origin, "boyd").await.len();
        assert_eq!(shown, 1);

        session.choose(Role::Origin, 0).unwrap();
        let origin = session.selection().waypoint(Role::Origin).unwrap();
        assert_eq!(origin.coordinate, LngLat::new(-4.2927, 55.87355));
        assert!(!session.selection().input(Role::Origin).is_visible());
        assert_eq!(session.map().marker_count(), LANDMARKS.len() + 1);
    }

    #[tokio::test]
    async fn test_locate_reports_suggestion() {
        let mut session = session();
        let found = session.locate(Role::Destination, "fraser").await.unwrap();
        assert_eq!(found.label, "Fraser Building");

        match session.locate(Role::Origin, "Fraser Bulding").await {
            Err(Error::InvalidInput(message)) => assert!(message.contains("Fraser Building")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(session.selection().waypoint(Role::Origin).is_none());
    }

    #[tokio::test]
    async fn test_plan_without_waypoints_sets_localized_notice() {
        let mut session = session();
        session.set_language(Language::Zh);

        let err = session.plan_route().await.unwrap_err();
        assert!(matches!(err, Error::MissingWaypoint(Role::Origin)));
        assert_eq!(session.notice(), Some("请选择起点和终点。"));

        session.set_language(Language::En);
        assert_eq!(
            session.notice(),
            Some("Please select both start and end locations.")
        );
        assert!(session.layers().cached(RouteKind::AllAccess).is_none());
    }

    #[tokio::test]
    async fn test_language_switch_reprojects_ui() {
        let mut session = session();
        session.set_language(Language::Zh);
        assert_eq!(session.ui().plan_button, "开始规划");
        assert_eq!(session.ui().legend[0].label, "通行优先路径");
        assert!(format!("{:?}", session.locale()).contains("subscribers: 1"));

        session.set_language(Language::En);
        assert_eq!(session.ui().start_placeholder, "Start location");
    }

    #[tokio::test]
    async fn test_style_failure_notice_cleared_by_retry() {
        let mut session = session();
        session.map.fail_next_style_load("tiles unavailable");

        assert!(session.switch_style(BasemapStyle::Satellite).await.is_err());
        assert_eq!(
            session.notice(),
            Some("The map style failed to load. Retry?")
        );

        session.retry_style().await.unwrap();
        assert!(session.notice().is_none());
        assert_eq!(session.style().active(), BasemapStyle::Satellite);
    }

    #[test]
    fn test_welcome_dismissal() {
        let mut session = session();
        session.dismiss_welcome(true).unwrap();
        assert!(!session.welcome_should_show());
    }
}
