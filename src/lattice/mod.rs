//! Pitch lattices
//!
//! A lattice spreads one documented octave of a tuning system over four
//! octaves: octave 0 below the tonic's octave, octave 1 as documented and
//! octaves 2 and 3 above. Every point carries all four value notations, a
//! frequency, a MIDI-equivalent pitch and a twelve-tone reference note.

pub mod note_name;
pub mod pitch_value;
pub mod spelling;

use log::debug;
use num::rational::Ratio;
use serde::Serialize;

use crate::catalogue::TuningSystem;

use note_name::{ipn_name, name_in_octave, NONE};
use pitch_value::{decimal_to_cents, serialize_ratio, PitchValue, ValueKind};
use spelling::{assign_reference_notes, ReferenceNote};

/// Octaves generated per lattice
pub const LATTICE_OCTAVES: usize = 4;

/// One point of a pitch lattice
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchPoint {
    /// Transliterated note name, or "none"
    pub note_name: String,
    /// Slot within the documented octave
    pub pitch_class_index: usize,
    /// Lattice octave, 0..=3
    pub octave: usize,
    /// Documented value shifted into this octave
    pub original_value: PitchValue,
    /// Exact or approximated frequency ratio to the tonic
    #[serde(serialize_with = "serialize_ratio")]
    pub fraction: Ratio<u64>,
    /// Cents above the tonic
    pub cents: f64,
    /// Decimal frequency ratio to the tonic
    pub decimal_ratio: f64,
    /// String length
    pub string_length: f64,
    /// Frequency in Hz
    pub frequency: f64,
    /// Open string length minus this point's string length
    pub fret_division: f64,
    /// Real-valued MIDI note number (A4 = 69 = 440 Hz)
    pub midi_note: f64,
    /// IPN spelling of the note name when it is known
    pub english_name: Option<String>,
    /// Nearest twelve-tone key
    pub reference_note: ReferenceNote,
    /// Cents from the reference note
    pub cents_deviation: f64,
}

impl PitchPoint {
    /// Whether the point has a known note name
    pub fn is_named(&self) -> bool {
        self.note_name != NONE
    }
}

/// A four-octave pitch lattice in ascending pitch order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lattice {
    kind: Option<ValueKind>,
    pitch_classes: usize,
    points: Vec<PitchPoint>,
}

impl Lattice {
    /// The empty lattice, returned for unsupported input
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the lattice has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Points in ascending pitch order
    pub fn points(&self) -> &[PitchPoint] {
        &self.points
    }

    /// Point at `index`
    pub fn get(&self, index: usize) -> Option<&PitchPoint> {
        self.points.get(index)
    }

    /// Notation of the underlying values; `None` for the empty lattice
    pub fn kind(&self) -> Option<ValueKind> {
        self.kind
    }

    /// Whether intervals compare as exact ratios
    pub fn uses_ratios(&self) -> bool {
        self.kind.is_some_and(ValueKind::is_ratio)
    }

    /// Pitch-class slots per octave
    pub fn pitch_classes_per_octave(&self) -> usize {
        self.pitch_classes
    }

    /// Index of the first point named `note_name`
    pub fn index_of(&self, note_name: &str) -> Option<usize> {
        self.points.iter().position(|p| p.note_name == note_name)
    }

    /// Whether every name in `note_names` is somewhere in the lattice
    pub fn contains_all<S: AsRef<str>>(&self, note_names: &[S]) -> bool {
        note_names.iter().all(|n| self.index_of(n.as_ref()).is_some())
    }

    /// Index of the same slot `octaves` octaves away, if still inside the
    /// lattice.
    pub fn shift(&self, index: usize, octaves: isize) -> Option<usize> {
        let shifted = index as isize + octaves * self.pitch_classes as isize;
        usize::try_from(shifted).ok().filter(|&i| i < self.points.len())
    }

    /// Note names in lattice order
    pub fn note_names(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|p| p.note_name.as_str())
    }
}

/// Build a lattice from one octave of pitch values.
///
/// `kind` is detected from the values when `None`. Values that cannot be
/// read in that notation produce an empty lattice. `note_names` is the
/// note-name assignment for the documented octave; slots without a name
/// become "none".
pub fn build_lattice<V: AsRef<str>, N: AsRef<str>>(
    values: &[V],
    kind: Option<ValueKind>,
    reference_string_length: f64,
    reference_frequency: f64,
    note_names: &[N],
) -> Lattice {
    let Some(kind) = kind.or_else(|| ValueKind::detect(values)) else {
        debug!("Unsupported pitch value format, {} values", values.len());
        return Lattice::empty();
    };

    let Some(base) = values
        .iter()
        .map(|v| PitchValue::parse(v.as_ref(), kind))
        .collect::<Option<Vec<_>>>()
    else {
        debug!("Pitch values are not all of kind {}", kind);
        return Lattice::empty();
    };

    let Some(first) = base.first() else {
        return Lattice::empty();
    };

    // string lengths need an open string to relate to
    let reference_string_length = match first {
        PitchValue::StringLength(open) if reference_string_length <= 0.0 => *open,
        _ => reference_string_length,
    };
    let open_string_length = reference_string_length / first.decimal_ratio(reference_string_length);

    let pitch_classes = base.len();
    let mut points = Vec::with_capacity(pitch_classes * LATTICE_OCTAVES);
    for octave in 0..LATTICE_OCTAVES {
        for (slot, value) in base.iter().enumerate() {
            let shifted = value.shift_octaves(octave as i32 - 1);
            let decimal_ratio = shifted.decimal_ratio(reference_string_length);
            let cents = match shifted {
                PitchValue::Cents(c) => c,
                _ => decimal_to_cents(decimal_ratio),
            };
            let string_length = match shifted {
                PitchValue::StringLength(l) => l,
                _ => reference_string_length / decimal_ratio,
            };
            let frequency = reference_frequency * decimal_ratio;
            let note_name = note_names
                .get(slot)
                .map(|n| name_in_octave(n.as_ref(), octave))
                .unwrap_or(NONE);

            points.push(PitchPoint {
                note_name: note_name.to_string(),
                pitch_class_index: slot,
                octave,
                original_value: shifted,
                fraction: shifted.fraction(reference_string_length),
                cents,
                decimal_ratio,
                string_length,
                frequency,
                fret_division: open_string_length - string_length,
                midi_note: frequency_to_midi(frequency),
                english_name: ipn_name(note_name),
                reference_note: placeholder_reference(),
                cents_deviation: 0.0,
            });
        }
    }

    let pitches: Vec<(f64, Option<&str>)> = points
        .iter()
        .map(|p| (p.midi_note, p.english_name.as_deref()))
        .collect();
    let references = assign_reference_notes(&pitches, pitch_classes);

    for (point, reference) in points.iter_mut().zip(references) {
        point.cents_deviation = (point.midi_note - reference.midi as f64) * 100.0;
        point.reference_note = reference;
    }

    debug!(
        "Built {} lattice: {} slots x {} octaves",
        kind, pitch_classes, LATTICE_OCTAVES
    );

    Lattice {
        kind: Some(kind),
        pitch_classes,
        points,
    }
}

/// Build the lattice of `tuning_system` for the note-name assignment that
/// starts on `starting_note`. An unknown starting note gives an empty
/// lattice.
pub fn build_lattice_for(tuning_system: &TuningSystem, starting_note: &str) -> Lattice {
    let Some(note_names) = tuning_system.note_names_for(starting_note) else {
        debug!(
            "Starting note '{}' is not documented for tuning system '{}'",
            starting_note, tuning_system.id
        );
        return Lattice::empty();
    };

    build_lattice(
        &tuning_system.pitch_values,
        tuning_system.value_kind,
        tuning_system.string_length,
        tuning_system.reference_frequency(starting_note),
        note_names,
    )
}

/// MIDI note number of a frequency, fractional for microtones
pub fn frequency_to_midi(frequency: f64) -> f64 {
    69.0 + 12.0 * (frequency / 440.0).log2()
}

fn placeholder_reference() -> ReferenceNote {
    ReferenceNote {
        letter: spelling::Letter::A,
        accidental: spelling::Accidental::Natural,
        midi: 69,
    }
}
