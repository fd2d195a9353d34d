//! Reference data: tuning systems and jins / maqam templates
//!
//! The analysis core only reads these. A [`Catalogue`] is normally loaded
//! from a JSON document with camelCase field names.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::lattice::note_name::standardize;
use crate::lattice::pitch_value::ValueKind;

/// Reference frequency used when a tuning system documents none for a
/// starting note (G2, the usual pitch of yegāh).
pub const DEFAULT_REFERENCE_FREQUENCY: f64 = 97.999;

/// A tuning system: one octave of pitch values plus the note-name
/// assignments documented for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuningSystem {
    /// Identifier
    pub id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Pitch values of one octave, starting with the tonic
    pub pitch_values: Vec<String>,
    /// Notation of `pitch_values`; detected from the values when absent
    #[serde(default)]
    pub value_kind: Option<ValueKind>,
    /// Note-name assignments, each starting on a different note
    pub note_name_sets: Vec<Vec<String>>,
    /// Open string length the string-length values relate to
    #[serde(default)]
    pub string_length: f64,
    /// Reference frequency of the tonic, keyed by starting note
    #[serde(default)]
    pub reference_frequencies: BTreeMap<String, f64>,
    /// Reference frequency for starting notes missing from `reference_frequencies`
    #[serde(default = "default_reference_frequency")]
    pub default_reference_frequency: f64,
}

fn default_reference_frequency() -> f64 {
    DEFAULT_REFERENCE_FREQUENCY
}

impl TuningSystem {
    /// Starting notes of the documented note-name assignments
    pub fn starting_notes(&self) -> impl Iterator<Item = &str> {
        self.note_name_sets.iter().filter_map(|set| set.first().map(String::as_str))
    }

    /// The note-name assignment starting on `starting_note`
    pub fn note_names_for(&self, starting_note: &str) -> Option<&[String]> {
        let wanted = standardize(starting_note);
        self.note_name_sets
            .iter()
            .find(|set| set.first().is_some_and(|first| standardize(first) == wanted))
            .map(Vec::as_slice)
    }

    /// Reference frequency of the tonic when starting on `starting_note`
    pub fn reference_frequency(&self, starting_note: &str) -> f64 {
        let wanted = standardize(starting_note);
        self.reference_frequencies
            .iter()
            .find(|(note, _)| standardize(note) == wanted)
            .map(|(_, &frequency)| frequency)
            .unwrap_or(self.default_reference_frequency)
    }
}

/// A jins template: a short ascending fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JinsTemplate {
    /// Identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Notes of the documented realization, ascending
    pub note_names: Vec<String>,
}

/// A maqam template; the descending sequence is listed from the top down and
/// may differ from the ascending one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaqamTemplate {
    /// Identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Ascending notes of the documented realization
    pub ascending: Vec<String>,
    /// Descending notes of the documented realization, highest first
    pub descending: Vec<String>,
}

impl MaqamTemplate {
    /// Documented tonic
    pub fn tonic(&self) -> Option<&str> {
        self.ascending.first().map(String::as_str)
    }

    /// Whether the template is symmetric (descending is ascending reversed)
    pub fn is_symmetric(&self) -> bool {
        self.ascending.iter().eq(self.descending.iter().rev())
    }
}

/// Everything the analysis reads: tuning systems and both template kinds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalogue {
    /// Tuning systems
    #[serde(default)]
    pub tuning_systems: Vec<TuningSystem>,
    /// Jins templates
    #[serde(default)]
    pub ajnas: Vec<JinsTemplate>,
    /// Maqam templates
    #[serde(default)]
    pub maqamat: Vec<MaqamTemplate>,
}

impl Catalogue {
    /// Parse a catalogue from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalogue: Catalogue = serde_json::from_str(json).context("Invalid catalogue JSON")?;
        catalogue.check_unique_ids()?;
        debug!(
            "Loaded catalogue: {} tuning systems, {} ajnas, {} maqamat",
            catalogue.tuning_systems.len(),
            catalogue.ajnas.len(),
            catalogue.maqamat.len()
        );
        Ok(catalogue)
    }

    /// Read and parse a catalogue file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Error reading catalogue file '{}'", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Error loading catalogue '{}'", path.display()))
    }

    /// Find a tuning system by id (diacritics and case ignored)
    pub fn tuning_system(&self, id: &str) -> Option<&TuningSystem> {
        let wanted = standardize(id);
        self.tuning_systems.iter().find(|ts| standardize(&ts.id) == wanted)
    }

    /// Find a jins by id or name (diacritics and case ignored)
    pub fn jins(&self, id: &str) -> Option<&JinsTemplate> {
        let wanted = standardize(id);
        self.ajnas
            .iter()
            .find(|j| standardize(&j.id) == wanted || standardize(&j.name) == wanted)
    }

    /// Find a maqam by id or name (diacritics and case ignored)
    pub fn maqam(&self, id: &str) -> Option<&MaqamTemplate> {
        let wanted = standardize(id);
        self.maqamat
            .iter()
            .find(|m| standardize(&m.id) == wanted || standardize(&m.name) == wanted)
    }

    fn check_unique_ids(&self) -> Result<()> {
        fn check<'a>(kind: &str, ids: impl Iterator<Item = &'a String>) -> Result<()> {
            let mut seen = std::collections::HashSet::new();
            for id in ids {
                if !seen.insert(standardize(id)) {
                    return Err(anyhow!("Duplicate {} id '{}'", kind, id));
                }
            }
            Ok(())
        }

        check("tuning system", self.tuning_systems.iter().map(|t| &t.id))?;
        check("jins", self.ajnas.iter().map(|j| &j.id))?;
        check("maqam", self.maqamat.iter().map(|m| &m.id))
    }
}
