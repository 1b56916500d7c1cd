//! Session selection: the chosen origin and destination
//!
//! Each role owns one autocomplete input with its dropdown and at most one
//! waypoint marker on the map.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use log::debug;

use crate::core::error::{Error, Result};
use crate::core::map::{LngLat, MapSurface, MarkerId, MarkerSpec, MarkerStyle};
use crate::core::resolver::Candidate;

/// Delay between losing focus and hiding the dropdown, so a click on a
/// suggestion still lands
pub const BLUR_GRACE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Origin,
    Destination,
}

impl Role {
    /// Pin color of this role's marker
    pub fn marker_color(self) -> &'static str {
        match self {
            Role::Origin => "#3bb2d0",
            Role::Destination => "#f30",
        }
    }

    fn slot(self) -> usize {
        match self {
            Role::Origin => 0,
            Role::Destination => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Origin => write!(f, "origin"),
            Role::Destination => write!(f, "destination"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "origin" | "start" | "from" => Ok(Role::Origin),
            "destination" | "end" | "to" => Ok(Role::Destination),
            other => Err(Error::InvalidInput(format!(
                "unknown input '{other}' (expected 'origin' or 'destination')"
            ))),
        }
    }
}

/// A user-selected endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub role: Role,
    pub label: String,
    pub coordinate: LngLat,
}

/// Identifies one autocomplete query; only the latest one may fill the dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket(u64);

/// Suggestion list under one input
#[derive(Debug, Default)]
pub struct Autocomplete {
    text: String,
    items: Vec<Candidate>,
    visible: bool,
    generation: u64,
    blur_deadline: Option<Instant>,
}

impl Autocomplete {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn items(&self) -> &[Candidate] {
        &self.items
    }

    /// Record new input text and start a query for it
    ///
    /// Clears the current suggestions. Returns `None` (and hides the
    /// dropdown) when the text is blank, so no lookup is issued.
    pub fn begin_query(&mut self, text: &str) -> Option<QueryTicket> {
        self.text = text.to_string();
        self.generation += 1;
        self.items.clear();
        if text.trim().is_empty() {
            self.hide();
            return None;
        }
        Some(QueryTicket(self.generation))
    }

    /// Fill the dropdown with the results of `ticket`
    ///
    /// Results of a query superseded by later input are discarded and
    /// `false` is returned. An empty result hides the dropdown.
    pub fn complete(&mut self, ticket: QueryTicket, candidates: Vec<Candidate>) -> bool {
        if ticket.0 != self.generation {
            debug!(
                "Discarding stale suggestions (query {} superseded by {})",
                ticket.0, self.generation
            );
            return false;
        }
        if candidates.is_empty() {
            self.hide();
        } else {
            self.items = candidates;
            self.visible = true;
        }
        true
    }

    /// A click landed outside the input's container
    pub fn outside_click(&mut self) {
        self.hide();
    }

    /// The input lost focus at `now`; the dropdown hides after [`BLUR_GRACE`]
    pub fn blur(&mut self, now: Instant) {
        self.blur_deadline = Some(now + BLUR_GRACE);
    }

    /// Apply a pending blur whose grace period has elapsed by `now`
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.blur_deadline {
            if now >= deadline {
                self.hide();
            }
        }
    }

    fn hide(&mut self) {
        self.visible = false;
        self.items.clear();
        self.blur_deadline = None;
    }
}

#[derive(Debug)]
struct Slot {
    waypoint: Waypoint,
    marker: MarkerId,
}

/// Origin/destination inputs and their markers
#[derive(Debug, Default)]
pub struct Selection {
    inputs: [Autocomplete; 2],
    slots: [Option<Slot>; 2],
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self, role: Role) -> &Autocomplete {
        &self.inputs[role.slot()]
    }

    pub fn input_mut(&mut self, role: Role) -> &mut Autocomplete {
        &mut self.inputs[role.slot()]
    }

    pub fn waypoint(&self, role: Role) -> Option<&Waypoint> {
        self.slots[role.slot()].as_ref().map(|slot| &slot.waypoint)
    }

    pub fn marker(&self, role: Role) -> Option<MarkerId> {
        self.slots[role.slot()].as_ref().map(|slot| slot.marker)
    }

    /// Both endpoints, or `MissingWaypoint` naming the first absent role
    pub fn endpoints(&self) -> Result<(&Waypoint, &Waypoint)> {
        let origin = self
            .waypoint(Role::Origin)
            .ok_or(Error::MissingWaypoint(Role::Origin))?;
        let destination = self
            .waypoint(Role::Destination)
            .ok_or(Error::MissingWaypoint(Role::Destination))?;
        Ok((origin, destination))
    }

    /// Make `candidate` the waypoint of `role`
    ///
    /// The previous marker of that role is removed before the new one is
    /// placed. The input shows the candidate's label and its dropdown closes.
    pub fn select<M: MapSurface>(&mut self, role: Role, candidate: Candidate, map: &mut M) {
        if let Some(previous) = self.slots[role.slot()].take() {
            map.remove_marker(previous.marker);
        }
        let marker = map.add_marker(MarkerSpec {
            at: candidate.coordinate,
            style: MarkerStyle::Pin {
                color: role.marker_color(),
            },
            popup: None,
        });

        let input = &mut self.inputs[role.slot()];
        input.text = candidate.label.clone();
        input.generation += 1;
        input.hide();

        debug!("Selected {role}: {}", candidate.label);
        self.slots[role.slot()] = Some(Slot {
            waypoint: Waypoint {
                role,
                label: candidate.label,
                coordinate: candidate.coordinate,
            },
            marker,
        });
    }

    /// Select the `index`-th suggestion currently shown for `role`
    pub fn choose<M: MapSurface>(&mut self, role: Role, index: usize, map: &mut M) -> Result<()> {
        let candidate = self
            .input(role)
            .items()
            .get(index)
            .cloned()
            .ok_or_else(|| {
                Error::InvalidInput(format!("no suggestion #{index} for the {role} input"))
            })?;
        self.select(role, candidate, map);
        Ok(())
    }
}
