//! Append-only store of registered tracks.
//! Built once at startup and shared via Arc with every request handler.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

use crate::track::Track;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("track '{0}' is already registered")]
    Duplicate(String),
    #[error("no track registered with id '{0}'")]
    NotFound(String),
    #[error("unknown track field '{0}'")]
    UnknownField(String),
}

/// Fields addressable through `GET /api/igc/{id}/{field}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackField {
    Pilot,
    Glider,
    GliderId,
    TrackLength,
    HDate,
}

impl TrackField {
    pub const ALL: [TrackField; 5] = [
        TrackField::Pilot,
        TrackField::Glider,
        TrackField::GliderId,
        TrackField::TrackLength,
        TrackField::HDate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TrackField::Pilot => "pilot",
            TrackField::Glider => "glider",
            TrackField::GliderId => "glider_id",
            TrackField::TrackLength => "track_length",
            TrackField::HDate => "H_date",
        }
    }

    /// Render this field of `track` as plain text.
    pub fn render(self, track: &Track) -> String {
        match self {
            TrackField::Pilot => track.pilot.clone(),
            TrackField::Glider => track.glider_type.clone(),
            TrackField::GliderId => track.glider_id.clone(),
            TrackField::TrackLength => track.length_km().to_string(),
            TrackField::HDate => format_timestamp(&track.recorded_at),
        }
    }
}

impl FromStr for TrackField {
    type Err = RegistryError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        TrackField::ALL
            .into_iter()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| RegistryError::UnknownField(name.to_string()))
    }
}

impl fmt::Display for TrackField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Metadata view of one track, as served by `GET /api/igc/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    #[serde(rename = "H_date")]
    pub h_date: DateTime<Utc>,
    pub pilot: String,
    pub glider: String,
    pub glider_id: String,
    pub track_length: f64,
}

impl From<&Track> for TrackSummary {
    fn from(track: &Track) -> Self {
        TrackSummary {
            h_date: track.recorded_at,
            pilot: track.pilot.clone(),
            glider: track.glider_type.clone(),
            glider_id: track.glider_id.clone(),
            track_length: track.length_km(),
        }
    }
}

#[derive(Debug, Default)]
struct Store {
    by_id: HashMap<String, Arc<Track>>,
    /// Registration order, for listing.
    order: Vec<String>,
}

/// In-memory track store. Uniqueness check and insert happen under one write lock.
#[derive(Debug, Default)]
pub struct TrackRegistry {
    store: RwLock<Store>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `track` unless its id is already present. Returns the id on success;
    /// a duplicate leaves the store untouched.
    pub fn register(&self, track: Track) -> Result<String, RegistryError> {
        let mut store = self.store.write();
        if store.by_id.contains_key(&track.id) {
            return Err(RegistryError::Duplicate(track.id));
        }
        let id = track.id.clone();
        store.order.push(id.clone());
        store.by_id.insert(id.clone(), Arc::new(track));
        tracing::info!(track_id = %id, total = store.order.len(), "track registered");
        Ok(id)
    }

    /// All ids in registration order. Empty when nothing is registered.
    pub fn list_ids(&self) -> Vec<String> {
        self.store.read().order.clone()
    }

    pub fn get(&self, id: &str) -> Result<Arc<Track>, RegistryError> {
        self.store
            .read()
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Plain-text value of one named field. The id is resolved before the field name,
    /// so an unknown id wins over an unknown field.
    pub fn get_field(&self, id: &str, field_name: &str) -> Result<String, RegistryError> {
        let track = self.get(id)?;
        let field = field_name.parse::<TrackField>()?;
        Ok(field.render(&track))
    }

    pub fn summary(&self, id: &str) -> Result<TrackSummary, RegistryError> {
        let track = self.get(id)?;
        Ok(TrackSummary::from(track.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.store.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
