//! Twelve-tone reference notes for lattice points
//!
//! Every lattice point is labelled with the nearest equal-tempered note,
//! counted in semitones from the tonic's own reference note. Half-way cases
//! follow the point's IPN spelling. Afterwards the lattice is walked in pitch
//! order so that no two neighbouring points share a letter: an enharmonic
//! respelling of the same key is tried first, and only if none exists does
//! the point move on to the next letter.

use std::fmt;

use serde::Serialize;

const TIE_EPSILON: f64 = 1e-6;

/// Note letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Letter {
    /// C
    C,
    /// D
    D,
    /// E
    E,
    /// F
    F,
    /// G
    G,
    /// A
    A,
    /// B
    B,
}

impl Letter {
    /// Semitones above C of the natural note
    pub const fn natural_semitone(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// Following letter in the musical alphabet
    pub const fn next(self) -> Letter {
        match self {
            Letter::C => Letter::D,
            Letter::D => Letter::E,
            Letter::E => Letter::F,
            Letter::F => Letter::G,
            Letter::G => Letter::A,
            Letter::A => Letter::B,
            Letter::B => Letter::C,
        }
    }

    fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    fn natural_at(pitch_class: i32) -> Option<Letter> {
        [Letter::C, Letter::D, Letter::E, Letter::F, Letter::G, Letter::A, Letter::B]
            .into_iter()
            .find(|l| l.natural_semitone() == pitch_class)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Single accidental of a reference note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Accidental {
    /// ♭
    Flat,
    /// ♮
    Natural,
    /// ♯
    Sharp,
}

impl Accidental {
    /// Semitone offset from the natural
    pub const fn offset(self) -> i32 {
        match self {
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Accidental::Flat => "b",
            Accidental::Natural => "",
            Accidental::Sharp => "#",
        }
    }
}

/// Twelve-tone-equal-tempered label of a lattice point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReferenceNote {
    /// Letter name
    pub letter: Letter,
    /// Accidental applied to the letter
    pub accidental: Accidental,
    /// MIDI note number of the labelled key
    pub midi: i32,
}

impl ReferenceNote {
    fn new(letter: Letter, accidental: Accidental, midi: i32) -> Self {
        Self {
            letter,
            accidental,
            midi,
        }
    }

    /// Octave number of the letter (C4 = middle C, so B#3 and Cb4 keep
    /// the octave of their letter).
    pub fn octave(&self) -> i32 {
        (self.midi - self.accidental.offset()).div_euclid(12) - 1
    }

    /// The other single-accidental spelling of the same key, if any.
    pub fn enharmonic(&self) -> Option<ReferenceNote> {
        use Accidental::*;
        use Letter::*;

        let (letter, accidental) = match (self.letter, self.accidental) {
            (C, Sharp) => (D, Flat),
            (D, Flat) => (C, Sharp),
            (D, Sharp) => (E, Flat),
            (E, Flat) => (D, Sharp),
            (F, Sharp) => (G, Flat),
            (G, Flat) => (F, Sharp),
            (G, Sharp) => (A, Flat),
            (A, Flat) => (G, Sharp),
            (A, Sharp) => (B, Flat),
            (B, Flat) => (A, Sharp),
            (E, Natural) => (F, Flat),
            (F, Flat) => (E, Natural),
            (F, Natural) => (E, Sharp),
            (E, Sharp) => (F, Natural),
            (B, Natural) => (C, Flat),
            (C, Flat) => (B, Natural),
            (C, Natural) => (B, Sharp),
            (B, Sharp) => (C, Natural),
            _ => return None,
        };
        Some(ReferenceNote::new(letter, accidental, self.midi))
    }

    /// Natural note of the letter after this one, above it.
    fn advance(&self) -> ReferenceNote {
        let next = self.letter.next();
        let natural_midi = self.midi - self.accidental.offset();
        let step = (next.natural_semitone() - self.letter.natural_semitone()).rem_euclid(12);
        ReferenceNote::new(next, Accidental::Natural, natural_midi + step)
    }
}

impl fmt::Display for ReferenceNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.letter, self.accidental.symbol(), self.octave())
    }
}

/// Direction an IPN microtonal modifier bends its note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lean {
    Down,
    None,
    Up,
}

/// The parts of an IPN spelling such as "Ab-2" or "E-b3" that matter for
/// resolving reference notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IpnSpelling {
    letter: Letter,
    accidental: Accidental,
    lean: Lean,
}

impl IpnSpelling {
    fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let letter = Letter::from_char(chars.next()?)?;
        let rest: String = chars.take_while(|c| !c.is_ascii_digit()).collect();

        let (accidental, modifiers) = match rest.chars().next() {
            Some('b') => (Accidental::Flat, &rest[1..]),
            Some('#') => (Accidental::Sharp, &rest[1..]),
            _ => (Accidental::Natural, rest.as_str()),
        };

        // "-#" and "-b" are half sharps and half flats
        let lean = if modifiers.contains('#') || modifiers.contains('+') {
            Lean::Up
        } else if modifiers.contains('b') || modifiers.contains('-') {
            Lean::Down
        } else {
            Lean::None
        };

        Some(Self {
            letter,
            accidental,
            lean,
        })
    }

    fn pitch_class(&self) -> i32 {
        (self.letter.natural_semitone() + self.accidental.offset()).rem_euclid(12)
    }
}

/// Assign reference notes to a pitch-ordered list of `(midi_note, ipn)`
/// pairs. `tonic` indexes the point whose spelling anchors the count.
pub fn assign_reference_notes(pitches: &[(f64, Option<&str>)], tonic: usize) -> Vec<ReferenceNote> {
    let Some(&(tonic_midi, tonic_ipn)) = pitches.get(tonic) else {
        return Vec::new();
    };

    let tonic_reference = match tonic_ipn.and_then(IpnSpelling::parse) {
        Some(spelling) => {
            let base = tonic_midi.round() as i32;
            let mut diff = (spelling.pitch_class() - base).rem_euclid(12);
            if diff > 6 {
                diff -= 12;
            }
            ReferenceNote::new(spelling.letter, spelling.accidental, base + diff)
        }
        None => label_key(tonic_midi.round() as i32, None),
    };

    let mut notes: Vec<ReferenceNote> = pitches
        .iter()
        .map(|&(midi_note, ipn)| {
            let spelling = ipn.and_then(IpnSpelling::parse);
            let distance = midi_note - tonic_reference.midi as f64;
            let semitones = round_semitones(distance, tonic_reference.midi, spelling);
            label_key(tonic_reference.midi + semitones, spelling)
        })
        .collect();

    for i in 1..notes.len() {
        let previous = notes[i - 1];
        let current = notes[i];
        if current.letter != previous.letter {
            continue;
        }
        notes[i] = match current.enharmonic() {
            Some(respelled) => respelled,
            None => current.advance(),
        };
    }

    notes
}

fn round_semitones(distance: f64, tonic_midi: i32, spelling: Option<IpnSpelling>) -> i32 {
    let lower = distance.floor();
    if ((distance - lower) - 0.5).abs() > TIE_EPSILON {
        return distance.round() as i32;
    }

    let lower = lower as i32;
    let upper = lower + 1;
    let Some(spelling) = spelling else {
        return upper;
    };

    if (tonic_midi + lower).rem_euclid(12) == spelling.pitch_class() {
        lower
    } else if (tonic_midi + upper).rem_euclid(12) == spelling.pitch_class() {
        upper
    } else if spelling.lean == Lean::Down {
        lower
    } else {
        upper
    }
}

fn label_key(midi: i32, spelling: Option<IpnSpelling>) -> ReferenceNote {
    let pitch_class = midi.rem_euclid(12);
    if let Some(letter) = Letter::natural_at(pitch_class) {
        return ReferenceNote::new(letter, Accidental::Natural, midi);
    }

    // black key: the natural below sharpened or the natural above flattened
    let sharp = ReferenceNote::new(
        Letter::natural_at(pitch_class - 1).unwrap_or(Letter::C),
        Accidental::Sharp,
        midi,
    );
    let flat = ReferenceNote::new(
        Letter::natural_at((pitch_class + 1) % 12).unwrap_or(Letter::C),
        Accidental::Flat,
        midi,
    );

    let Some(spelling) = spelling else {
        return sharp;
    };
    if spelling.letter == flat.letter {
        flat
    } else if spelling.letter == sharp.letter {
        sharp
    } else if spelling.accidental == Accidental::Flat || spelling.lean == Lean::Down {
        flat
    } else {
        sharp
    }
}
