//! Loading and saving the calendar file.

use std::collections::HashSet;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::calendar::{CalendarFile, CalendarMetadata};
use crate::error::SleepcalResult;
use crate::ics::{generate_calendar, parse_events};

/// A calendar stored as a single .ics file
#[derive(Debug, Clone)]
pub struct CalendarStore {
    path: PathBuf,
    metadata: CalendarMetadata,
}

impl CalendarStore {
    pub fn new(path: impl Into<PathBuf>, metadata: CalendarMetadata) -> Self {
        CalendarStore {
            path: path.into(),
            metadata,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the calendar and the UIDs of its events.
    ///
    /// A missing or unreadable file yields an empty calendar. The metadata is
    /// always the store's own, whatever the file says.
    pub fn load(&self) -> (CalendarFile, HashSet<String>) {
        let mut calendar = CalendarFile::new(self.metadata.clone());

        match std::fs::read_to_string(&self.path) {
            Ok(content) => match parse_events(&content) {
                Ok(events) => calendar.events = events,
                Err(e) => warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Existing calendar could not be parsed, starting from an empty calendar"
                ),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No existing calendar, starting a new one");
            }
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Existing calendar could not be read, starting from an empty calendar"
            ),
        }

        let uids = calendar.uids();
        (calendar, uids)
    }

    /// Overwrite the file with the full calendar.
    ///
    /// Content is written to a temporary file next to the target and renamed
    /// over it, so readers never see a half-written calendar.
    pub fn save(&self, calendar: &CalendarFile) -> SleepcalResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let content = generate_calendar(calendar);

        let mut file = NamedTempFile::new_in(&dir)?;
        file.write_all(content.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;

        info!(
            path = %self.path.display(),
            events = calendar.len(),
            "Saved calendar"
        );
        Ok(())
    }
}
