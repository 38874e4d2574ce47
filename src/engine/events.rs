// ==========================================
// Fieldwork costing - project change notifications
// ==========================================
// The project model owns an observer list and fans every
// mutation out synchronously before the intent returns.
// Observers must not mutate the model from inside a callback.
// ==========================================

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// Changed section
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectSection {
    /// Whole document replaced (reset / load)
    Document,
    General,
    SamplingMethods,
    Samples,
    CltSettings,
    HutSettings,
    CostToggles,
    Settings,
    QcMethods,
    Travel,
    Assignments,
    AdditionalCosts,
    Subcontracts,
}

impl ProjectSection {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectSection::Document => "document",
            ProjectSection::General => "general",
            ProjectSection::SamplingMethods => "sampling_methods",
            ProjectSection::Samples => "samples",
            ProjectSection::CltSettings => "clt_settings",
            ProjectSection::HutSettings => "hut_settings",
            ProjectSection::CostToggles => "cost_toggles",
            ProjectSection::Settings => "settings",
            ProjectSection::QcMethods => "qc_methods",
            ProjectSection::Travel => "travel",
            ProjectSection::Assignments => "assignments",
            ProjectSection::AdditionalCosts => "additional_costs",
            ProjectSection::Subcontracts => "subcontracts",
        }
    }
}

/// One "data changed" notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectChange {
    /// Sections touched by the intent (derived sections included)
    pub sections: Vec<ProjectSection>,
    /// Intent that caused the change
    pub source: String,
    pub changed_at: NaiveDateTime,
}

impl ProjectChange {
    pub fn new(source: impl Into<String>, sections: Vec<ProjectSection>) -> Self {
        Self {
            sections,
            source: source.into(),
            changed_at: Local::now().naive_local(),
        }
    }

    pub fn touches(&self, section: ProjectSection) -> bool {
        self.sections.contains(&section) || self.sections.contains(&ProjectSection::Document)
    }
}

// ==========================================
// Observer trait
// ==========================================
pub trait ProjectObserver: Send + Sync {
    fn on_project_changed(&self, change: &ProjectChange);
}

/// Observer that only logs; used where nobody listens
#[derive(Debug, Clone, Default)]
pub struct NoOpObserver;

impl ProjectObserver for NoOpObserver {
    fn on_project_changed(&self, change: &ProjectChange) {
        tracing::debug!(source = %change.source, sections = change.sections.len(), "change ignored");
    }
}

/// Synchronous fan-out list owned by the model
#[derive(Default, Clone)]
pub struct ObserverList {
    observers: Vec<Arc<dyn ProjectObserver>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Arc<dyn ProjectObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver to every observer in registration order
    pub fn notify(&self, change: &ProjectChange) {
        tracing::debug!(
            source = %change.source,
            observers = self.observers.len(),
            "project changed"
        );
        for observer in &self.observers {
            observer.on_project_changed(change);
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}
