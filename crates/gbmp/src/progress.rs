//! # Progress Events
//!
//! What the pipeline reports between units of work. Each stage starts with
//! `completed = 0` and finishes with `completed == total` exactly once.

use std::fmt;

use gbmp_mesh::GeometryBatch;

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Walking the container; unit: bytes.
    Parsing,
    /// Expanding columns; unit: grid rows.
    Decompressing,
    /// Building geometry; unit: batches.
    Building,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parsing => "parsing",
            Self::Decompressing => "decompressing",
            Self::Building => "building",
        })
    }
}

/// Progress snapshot within a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Current stage.
    pub stage: Stage,
    /// Units done.
    pub completed: usize,
    /// Units in the stage.
    pub total: usize,
    /// Human-readable status line.
    pub text: String,
}

impl Progress {
    pub(crate) fn parsing(completed: usize, total: usize) -> Self {
        Self {
            stage: Stage::Parsing,
            completed,
            total,
            text: "Parsing map".to_string(),
        }
    }

    pub(crate) fn decompressing(completed: usize, total: usize) -> Self {
        Self {
            stage: Stage::Decompressing,
            completed,
            total,
            text: "Decompressing map".to_string(),
        }
    }

    pub(crate) fn building(completed: usize, total: usize) -> Self {
        Self {
            stage: Stage::Building,
            completed,
            total,
            text: format!("Creating map models {completed}"),
        }
    }

    /// True once the stage is finished.
    #[inline]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed >= self.total
    }

    /// Completion in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Totals for a finished load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Chunks in the container.
    pub chunks: usize,
    /// Batches emitted, empty ones included.
    pub batches: usize,
    /// Batches with at least one vertex.
    pub non_empty_batches: usize,
    /// Vertices across all batches.
    pub vertices: usize,
}

/// One step of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    /// Work advanced inside a stage.
    Progress(Progress),
    /// A geometry batch is ready.
    Batch {
        /// The batch.
        batch: GeometryBatch,
        /// Building progress including this batch.
        progress: Progress,
    },
    /// The load is complete. Always the last event.
    Finished(LoadSummary),
}

impl LoadEvent {
    /// Progress carried by the event, if any.
    #[must_use]
    pub const fn progress(&self) -> Option<&Progress> {
        match self {
            Self::Progress(progress) | Self::Batch { progress, .. } => Some(progress),
            Self::Finished(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texts() {
        assert_eq!(Progress::parsing(0, 10).text, "Parsing map");
        assert_eq!(Progress::decompressing(3, 256).text, "Decompressing map");
        assert_eq!(Progress::building(5, 64).text, "Creating map models 5");
    }

    #[test]
    fn test_fraction() {
        assert!((Progress::decompressing(64, 256).fraction() - 0.25).abs() < f64::EPSILON);
        assert!(Progress::building(64, 64).is_complete());
        assert!(!Progress::building(63, 64).is_complete());
    }

    #[test]
    fn test_finished_has_no_progress() {
        assert!(LoadEvent::Finished(LoadSummary::default()).progress().is_none());
        let event = LoadEvent::Progress(Progress::parsing(1, 2));
        assert_eq!(event.progress().map(|p| p.completed), Some(1));
    }
}
