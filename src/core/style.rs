//! Basemap style transitions
//!
//! A style swap wipes every overlay the map carries. [`StyleTransitionController`]
//! runs the swap as a small state machine so the camera, the overlay
//! controls and every cached route come back afterwards:
//!
//! ```text
//! Idle --request_swap--> Swapping --StyleData--> Replaying --Idle--> Idle
//!                           |                        |
//!                           +------ Error -----------+--> Failed --retry--> Swapping
//! ```
//!
//! A second request while a swap is running is rejected with
//! [`Error::StyleSwapInProgress`].

use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};

use crate::core::config::StyleUrls;
use crate::core::error::{suggest_correction, Error, Result};
use crate::core::layers::RouteLayers;
use crate::core::map::{attach_controls, wait_style_ready, MapSurface, MapViewState, StyleEvent};

/// Selectable basemap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BasemapStyle {
    #[default]
    Detailed,
    HighContrast,
    Satellite,
}

impl BasemapStyle {
    pub const ALL: [BasemapStyle; 3] = [
        BasemapStyle::Detailed,
        BasemapStyle::HighContrast,
        BasemapStyle::Satellite,
    ];

    /// Command-line name
    pub fn name(self) -> &'static str {
        match self {
            BasemapStyle::Detailed => "detailed",
            BasemapStyle::HighContrast => "high-contrast",
            BasemapStyle::Satellite => "satellite",
        }
    }

    /// Locale key of the option label
    pub fn label_key(self) -> &'static str {
        match self {
            BasemapStyle::Detailed => "detailed",
            BasemapStyle::HighContrast => "highContrast",
            BasemapStyle::Satellite => "satellite",
        }
    }

    pub fn url(self, urls: &StyleUrls) -> &str {
        match self {
            BasemapStyle::Detailed => &urls.detailed,
            BasemapStyle::HighContrast => &urls.high_contrast,
            BasemapStyle::Satellite => &urls.satellite,
        }
    }
}

impl fmt::Display for BasemapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BasemapStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "detailed" | "default" => Ok(BasemapStyle::Detailed),
            "high-contrast" | "highcontrast" => Ok(BasemapStyle::HighContrast),
            "satellite" => Ok(BasemapStyle::Satellite),
            _ => Err(Error::UnsupportedStyle {
                value: s.to_string(),
                suggestion: suggest_correction(s, BasemapStyle::ALL.iter().map(|b| b.name())),
            }),
        }
    }
}

/// Where the controller is in a swap
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionState {
    Idle,
    /// The new style was requested; `view` is the camera to restore
    Swapping {
        target: BasemapStyle,
        view: MapViewState,
    },
    /// Camera and controls are back; waiting to replay cached routes
    Replaying {
        target: BasemapStyle,
        view: MapViewState,
    },
    /// The style did not load; `retry` requests it again
    Failed {
        target: BasemapStyle,
        view: MapViewState,
        reason: String,
    },
}

/// Result of a swap request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Swapped,
    /// The requested style was already showing; nothing happened
    AlreadyActive,
}

#[derive(Debug)]
pub struct StyleTransitionController {
    urls: StyleUrls,
    active: BasemapStyle,
    state: TransitionState,
}

impl StyleTransitionController {
    pub fn new(active: BasemapStyle, urls: StyleUrls) -> Self {
        Self {
            urls,
            active,
            state: TransitionState::Idle,
        }
    }

    /// The style most recently requested
    pub fn active(&self) -> BasemapStyle {
        self.active
    }

    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == TransitionState::Idle
    }

    /// Leave `Idle` (or `Failed`) and ask the map for `target`
    ///
    /// Captures the camera, detaches the overlay controls and requests the
    /// style. Recovering from `Failed` reuses the camera saved before the
    /// failed attempt, since the broken style already reset it.
    pub fn request_swap<M: MapSurface>(
        &mut self,
        target: BasemapStyle,
        map: &mut M,
    ) -> Result<SwapOutcome> {
        let view = match &self.state {
            TransitionState::Idle if target == self.active => {
                debug!("Basemap {target} already active");
                return Ok(SwapOutcome::AlreadyActive);
            }
            TransitionState::Idle => MapViewState::capture(&*map),
            TransitionState::Failed { view, .. } => *view,
            TransitionState::Swapping { .. } | TransitionState::Replaying { .. } => {
                warn!("Ignoring switch to {target}: a style change is in progress");
                return Err(Error::StyleSwapInProgress);
            }
        };

        info!("Switching basemap {} -> {target}", self.active);
        self.begin(target, view, map);
        Ok(SwapOutcome::Swapped)
    }

    fn begin<M: MapSurface>(&mut self, target: BasemapStyle, view: MapViewState, map: &mut M) {
        map.remove_controls();
        map.set_style(target.url(&self.urls));
        self.active = target;
        self.state = TransitionState::Swapping { target, view };
    }

    /// The new style's data began loading: restore camera and controls
    pub fn on_style_data<M: MapSurface>(&mut self, map: &mut M) {
        if let TransitionState::Swapping { target, view } = self.state {
            view.restore(map);
            attach_controls(map);
            debug!("Basemap {target} loading; camera restored");
            self.state = TransitionState::Replaying { target, view };
        }
    }

    /// The map reported a load error for the style being swapped in
    pub fn on_style_error(&mut self, reason: &str) {
        let (target, view) = match &self.state {
            TransitionState::Swapping { target, view }
            | TransitionState::Replaying { target, view } => (*target, *view),
            TransitionState::Idle | TransitionState::Failed { .. } => return,
        };
        warn!("Basemap {target} failed to load: {reason}");
        self.state = TransitionState::Failed {
            target,
            view,
            reason: reason.to_string(),
        };
    }

    /// Run the pending swap to completion
    ///
    /// Consumes style events until the new style is idle, then replays every
    /// cached route. No-op when no swap is pending.
    pub async fn drive<M: MapSurface>(&mut self, layers: &RouteLayers, map: &mut M) -> Result<()> {
        loop {
            match self.state.clone() {
                TransitionState::Swapping { .. } => match map.next_style_event().await {
                    // Idle implies the data arrived as well
                    StyleEvent::StyleData | StyleEvent::Idle => self.on_style_data(map),
                    StyleEvent::Error(reason) => {
                        self.on_style_error(&reason);
                        return Err(Error::StyleLoadFailed(reason));
                    }
                },
                TransitionState::Replaying { target, .. } => {
                    let replayed = match wait_style_ready(map).await {
                        Ok(()) => layers.replay_all(map).await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = replayed {
                        let reason = match &e {
                            Error::StyleLoadFailed(reason) => reason.clone(),
                            other => other.to_string(),
                        };
                        self.on_style_error(&reason);
                        return Err(e);
                    }
                    info!("Basemap {target} ready");
                    self.state = TransitionState::Idle;
                    return Ok(());
                }
                TransitionState::Idle | TransitionState::Failed { .. } => return Ok(()),
            }
        }
    }

    /// Request `target` and wait for the swap to finish
    pub async fn swap_style<M: MapSurface>(
        &mut self,
        target: BasemapStyle,
        layers: &RouteLayers,
        map: &mut M,
    ) -> Result<SwapOutcome> {
        let outcome = self.request_swap(target, map)?;
        if outcome == SwapOutcome::Swapped {
            self.drive(layers, map).await?;
        }
        Ok(outcome)
    }

    /// Request the style of a failed swap again
    pub async fn retry<M: MapSurface>(&mut self, layers: &RouteLayers, map: &mut M) -> Result<()> {
        let TransitionState::Failed { target, view, .. } = self.state.clone() else {
            return Err(Error::InvalidInput(
                "there is no failed basemap change to retry".to_string(),
            ));
        };
        info!("Retrying basemap {target}");
        self.begin(target, view, map);
        self.drive(layers, map).await
    }
}
