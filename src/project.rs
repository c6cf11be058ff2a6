//! Project file persistence.
//!
//! A project is saved as pretty-printed JSON so it stays readable and
//! diffable:
//!
//! ```json
//! {
//!   "layout": "2x2",
//!   "caption_prefix": "Photo",
//!   "current_page": 0,
//!   "photos": ["/photos/a.jpg", "/photos/b.jpg"],
//!   "assignments": [
//!     { "page": 0, "slot": 0, "photo": "/photos/a.jpg", "caption": "Photo 1" }
//!   ],
//!   "titles": { "0": "Ground floor" }
//! }
//! ```
//!
//! Files can be edited by hand, so loading never trusts them: entries that
//! break the store's invariants are dropped with a warning instead of
//! failing the whole load.

use crate::config::Settings;
use crate::layout::LayoutMode;
use crate::session::Session;
use crate::slots::Coordinate;
use crate::store::PhotoRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub page: usize,
    pub slot: usize,
    pub photo: PhotoRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// On-disk shape of a [`Session`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub layout: LayoutMode,
    pub caption_prefix: String,
    #[serde(default)]
    pub current_page: usize,
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
    #[serde(default)]
    pub assignments: Vec<AssignmentRecord>,
    #[serde(default)]
    pub titles: BTreeMap<usize, String>,
}

impl ProjectFile {
    pub fn from_session(session: &Session) -> Self {
        Self {
            layout: session.layout(),
            caption_prefix: session.caption_prefix().to_string(),
            current_page: session.current_page(),
            photos: session.store().sequence().to_vec(),
            assignments: session
                .store()
                .entries()
                .map(|e| AssignmentRecord {
                    page: e.coord.page,
                    slot: e.coord.slot,
                    photo: e.photo.clone(),
                    caption: e.caption.map(str::to_string),
                })
                .collect(),
            titles: session.titles().clone(),
        }
    }

    /// Rebuild a session, dropping entries that violate store invariants.
    ///
    /// Returns the session and the number of dropped entries.
    pub fn into_session(self) -> (Session, usize) {
        let mut session = Session::new(self.layout, self.caption_prefix);
        let capacity = session.capacity();
        let mut dropped = 0;

        for photo in self.photos {
            if !session.store.add_photo(photo) {
                dropped += 1;
            }
        }

        for record in self.assignments {
            let coord = Coordinate::new(record.page, record.slot);
            let conflict = if !coord.fits(capacity) {
                Some("slot outside layout")
            } else if session.store.photo_at(coord).is_some() {
                Some("coordinate assigned twice")
            } else if session.store.coordinate_of(&record.photo).is_some() {
                Some("photo assigned twice")
            } else {
                None
            };
            if let Some(reason) = conflict {
                tracing::warn!(%coord, photo = %record.photo, reason, "dropping project entry");
                dropped += 1;
                continue;
            }
            session.store.assign(coord, record.photo);
            if let Some(caption) = record.caption {
                session.store.set_caption(coord, caption);
            }
        }

        session.titles = self.titles;
        session.go_to_page(self.current_page);
        (session, dropped)
    }
}

/// Load a project, or start an empty one seeded from `settings` when the
/// file does not exist yet.
pub fn load_project(path: &Path, settings: &Settings) -> Result<Session, ProjectError> {
    if !path.exists() {
        return Ok(Session::new(settings.layout, settings.caption.prefix.clone()));
    }
    let content = fs::read_to_string(path)?;
    let file: ProjectFile = serde_json::from_str(&content)?;
    let (session, dropped) = file.into_session();
    if dropped > 0 {
        tracing::warn!(path = %path.display(), dropped, "project file had invalid entries");
    }
    Ok(session)
}

/// Save a project as pretty-printed JSON, creating parent directories.
pub fn save_project(path: &Path, session: &Session) -> Result<(), ProjectError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&ProjectFile::from_session(session))?;
    fs::write(path, json)?;
    Ok(())
}
