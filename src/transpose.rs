//! Transpositions of jins and maqam templates over a lattice
//!
//! A template's documented notes define an interval pattern. Every start
//! point of the lattice is then tried: the sequence grows one interval at a
//! time, scanning forward in pitch order for a point at the right interval.
//! Greedy search takes the first such point and gives up on this start if the
//! rest of the pattern does not follow. On a validated, strictly increasing
//! lattice there is only one point at an exact ratio, so nothing is lost. For
//! cents lattices with wide tolerances [`SearchStrategy::Backtracking`] tries
//! every point within tolerance instead.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::catalogue::{JinsTemplate, MaqamTemplate};
use crate::error::{check_range, CoreError};
use crate::interval::{interval_pattern, patterns_match, Direction, Interval};
use crate::lattice::{Lattice, PitchPoint, LATTICE_OCTAVES};

/// Cents tolerance used when none is given
pub const DEFAULT_TOLERANCE_CENTS: f64 = 5.0;

/// Largest accepted cents tolerance
pub const MAX_TOLERANCE_CENTS: f64 = 50.0;

/// How candidate points are explored while extending a sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchStrategy {
    /// Accept the first point at the right interval
    #[default]
    Greedy,
    /// Explore every point at the right interval
    Backtracking,
}

/// Matching parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Cents tolerance for non-ratio lattices
    pub tolerance_cents: f64,
    /// Candidate exploration
    pub strategy: SearchStrategy,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            tolerance_cents: DEFAULT_TOLERANCE_CENTS,
            strategy: SearchStrategy::Greedy,
        }
    }
}

impl MatchOptions {
    /// Options with a validated tolerance
    pub fn new(tolerance_cents: f64, strategy: SearchStrategy) -> Result<Self, CoreError> {
        Ok(Self {
            tolerance_cents: validate_tolerance(tolerance_cents)?,
            strategy,
        })
    }
}

/// Reject tolerances outside 0..=50 cents.
pub fn validate_tolerance(tolerance_cents: f64) -> Result<f64, CoreError> {
    check_range("tolerance", tolerance_cents, 0.0, MAX_TOLERANCE_CENTS)
}

/// Whether a transposition is the documented realization or another one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TranspositionKind {
    /// Starts on the template's documented first note
    Tahlil,
    /// Starts anywhere else
    Transposition,
}

/// A jins realized over a lattice
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JinsTransposition {
    /// Template id
    pub jins_id: String,
    /// Display name, "<name> al-<tonic>" for transpositions
    pub name: String,
    /// Tahlil or transposition
    pub kind: TranspositionKind,
    /// Points, ascending
    pub points: Vec<PitchPoint>,
    /// Successive intervals of `points`
    pub intervals: Vec<Interval>,
}

impl JinsTransposition {
    /// Note name of the first point
    pub fn tonic(&self) -> &str {
        self.points.first().map(|p| p.note_name.as_str()).unwrap_or_default()
    }

    /// Note names in order
    pub fn note_names(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.note_name.as_str()).collect()
    }

    /// Whether this is the tahlil
    pub fn is_tahlil(&self) -> bool {
        self.kind == TranspositionKind::Tahlil
    }
}

/// A maqam realized over a lattice
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaqamTransposition {
    /// Template id
    pub maqam_id: String,
    /// Display name, "<name> al-<tonic>" for transpositions
    pub name: String,
    /// Tahlil or transposition
    pub kind: TranspositionKind,
    /// Ascending points
    pub ascending: Vec<PitchPoint>,
    /// Descending points, highest first
    pub descending: Vec<PitchPoint>,
    /// Successive intervals of `ascending`
    pub ascending_intervals: Vec<Interval>,
    /// Successive intervals of `descending`
    pub descending_intervals: Vec<Interval>,
    /// Jins starting on each ascending degree, if any
    pub ascending_ajnas: Vec<Option<JinsTransposition>>,
    /// Jins found on each descending degree, if any, highest first
    pub descending_ajnas: Vec<Option<JinsTransposition>>,
}

impl MaqamTransposition {
    /// Note name of the tonic
    pub fn tonic(&self) -> &str {
        self.ascending.first().map(|p| p.note_name.as_str()).unwrap_or_default()
    }

    /// Ascending note names
    pub fn ascending_note_names(&self) -> Vec<&str> {
        self.ascending.iter().map(|p| p.note_name.as_str()).collect()
    }

    /// Descending note names, highest first
    pub fn descending_note_names(&self) -> Vec<&str> {
        self.descending.iter().map(|p| p.note_name.as_str()).collect()
    }

    /// Whether this is the tahlil
    pub fn is_tahlil(&self) -> bool {
        self.kind == TranspositionKind::Tahlil
    }
}

/// Whether a template with these notes can be realized in `lattice`
pub fn is_realizable<S: AsRef<str>>(lattice: &Lattice, note_names: &[S]) -> bool {
    note_names.len() >= 2 && lattice.contains_all(note_names)
}

struct Search<'a> {
    points: &'a [PitchPoint],
    order: Vec<usize>,
    pattern: Vec<Interval>,
    exact: bool,
    direction: Direction,
    options: &'a MatchOptions,
}

impl Search<'_> {
    fn extend(&self, position: usize, sequence: &mut Vec<usize>, results: &mut Vec<Vec<usize>>) {
        let step = sequence.len() - 1;
        let Some(target) = self.pattern.get(step) else {
            results.push(sequence.clone());
            return;
        };
        let previous = &self.points[sequence[step]];

        for next_position in position + 1..self.order.len() {
            let candidate = self.order[next_position];
            let interval = Interval::between(previous, &self.points[candidate], self.exact);

            if interval.matches(target, self.options.tolerance_cents) {
                sequence.push(candidate);
                self.extend(next_position, sequence, results);
                sequence.pop();
                if self.options.strategy == SearchStrategy::Greedy {
                    break;
                }
            } else if interval.overshoots(target, self.options.tolerance_cents, self.direction) {
                break;
            }
        }
    }
}

/// Find every run of lattice points reproducing the interval pattern of
/// `note_names`, returned as lattice indices.
///
/// Descending runs are listed from the top down. Runs whose tonic (first
/// point ascending, last point descending) lies in the highest lattice
/// octave are dropped. Templates with fewer than two notes or notes missing
/// from the lattice have no transpositions.
pub fn match_transpositions<S: AsRef<str>>(
    lattice: &Lattice,
    note_names: &[S],
    direction: Direction,
    options: &MatchOptions,
) -> Vec<Vec<usize>> {
    let Some(documented) = documented_indices(lattice, note_names) else {
        return Vec::new();
    };
    if documented.len() < 2 {
        return Vec::new();
    }

    let points = lattice.points();
    let exact = lattice.uses_ratios();
    let order: Vec<usize> = match direction {
        Direction::Ascending => (0..points.len()).collect(),
        Direction::Descending => (0..points.len()).rev().collect(),
    };

    let search = Search {
        points,
        pattern: interval_pattern(documented.iter().map(|&i| &points[i]), exact),
        order,
        exact,
        direction,
        options,
    };

    let mut results = Vec::new();
    for start in 0..search.order.len() {
        let mut sequence = vec![search.order[start]];
        search.extend(start, &mut sequence, &mut results);
    }

    let top_octave = LATTICE_OCTAVES - 1;
    results.retain(|sequence| {
        let tonic = match direction {
            Direction::Ascending => sequence.first(),
            Direction::Descending => sequence.last(),
        };
        tonic.is_some_and(|&i| points[i].octave != top_octave)
    });

    trace!(
        "{} {:?} transpositions of {:?}",
        results.len(),
        direction,
        note_names.iter().map(AsRef::as_ref).collect::<Vec<_>>()
    );
    results
}

fn documented_indices<S: AsRef<str>>(lattice: &Lattice, note_names: &[S]) -> Option<Vec<usize>> {
    note_names.iter().map(|n| lattice.index_of(n.as_ref())).collect()
}

/// Ensure the documented realization is among `sequences`, keyed on the
/// position of its tonic.
fn with_documented(mut sequences: Vec<Vec<usize>>, documented: Vec<usize>, tonic_at_end: bool) -> Vec<Vec<usize>> {
    let tonic = |s: &Vec<usize>| if tonic_at_end { s.last().copied() } else { s.first().copied() };
    let documented_tonic = tonic(&documented);
    if !sequences.iter().any(|s| tonic(s) == documented_tonic) {
        sequences.insert(0, documented);
    }
    sequences
}

fn transposed_name(name: &str, kind: TranspositionKind, tonic: &str) -> String {
    match kind {
        TranspositionKind::Tahlil => name.to_string(),
        TranspositionKind::Transposition => format!("{} al-{}", name, tonic),
    }
}

fn jins_at(lattice: &Lattice, jins: &JinsTemplate, indices: &[usize]) -> JinsTransposition {
    let points: Vec<PitchPoint> = indices.iter().map(|&i| lattice.points()[i].clone()).collect();
    let tonic = points.first().map(|p| p.note_name.as_str()).unwrap_or_default();
    let kind = if jins.note_names.first().is_some_and(|first| first == tonic) {
        TranspositionKind::Tahlil
    } else {
        TranspositionKind::Transposition
    };

    JinsTransposition {
        jins_id: jins.id.clone(),
        name: transposed_name(&jins.name, kind, tonic),
        kind,
        intervals: interval_pattern(&points, lattice.uses_ratios()),
        points,
    }
}

/// All transpositions of a jins, tahlil first.
pub fn jins_transpositions(lattice: &Lattice, jins: &JinsTemplate, options: &MatchOptions) -> Vec<JinsTransposition> {
    if !is_realizable(lattice, &jins.note_names) {
        debug!("Jins '{}' is not realizable in this lattice", jins.id);
        return Vec::new();
    }
    let Some(documented) = documented_indices(lattice, &jins.note_names) else {
        return Vec::new();
    };

    let sequences = match_transpositions(lattice, &jins.note_names, Direction::Ascending, options);
    let sequences = with_documented(sequences, documented, false);

    let mut transpositions: Vec<JinsTransposition> = sequences.iter().map(|s| jins_at(lattice, jins, s)).collect();
    keep_one_tahlil_first(&mut transpositions, &jins.name);
    transpositions
}

/// A jins together with its documented interval pattern, for locating ajnas
/// inside maqam transpositions.
struct JinsPattern<'a> {
    jins: &'a JinsTemplate,
    pattern: Vec<Interval>,
}

fn jins_patterns<'a>(lattice: &Lattice, ajnas: &'a [JinsTemplate]) -> Vec<JinsPattern<'a>> {
    let exact = lattice.uses_ratios();
    ajnas
        .iter()
        .filter(|jins| is_realizable(lattice, &jins.note_names))
        .filter_map(|jins| {
            let documented = documented_indices(lattice, &jins.note_names)?;
            Some(JinsPattern {
                jins,
                pattern: interval_pattern(documented.iter().map(|&i| &lattice.points()[i]), exact),
            })
        })
        .collect()
}

/// For each degree of an ascending run, the first catalogue jins whose
/// pattern starts there. The run is extended by its own notes an octave up
/// so upper degrees can carry a jins too.
fn embedded_ajnas(
    lattice: &Lattice,
    ascending: &[usize],
    patterns: &[JinsPattern<'_>],
    options: &MatchOptions,
) -> Vec<Option<JinsTransposition>> {
    let points = lattice.points();
    let Some(&top) = ascending.last() else {
        return Vec::new();
    };
    let top_frequency = points[top].frequency;

    let mut extended = ascending.to_vec();
    for &index in ascending {
        let Some(upper) = lattice.shift(index, 1) else {
            break;
        };
        if points[upper].frequency > top_frequency * (1.0 + 1e-9) {
            extended.push(upper);
        }
    }

    let intervals = interval_pattern(extended.iter().map(|&i| &points[i]), lattice.uses_ratios());

    (0..ascending.len())
        .map(|degree| {
            patterns.iter().find_map(|p| {
                let end = degree + p.pattern.len();
                if end > intervals.len() || !patterns_match(&intervals[degree..end], &p.pattern, options.tolerance_cents) {
                    return None;
                }
                Some(jins_at(lattice, p.jins, &extended[degree..=end]))
            })
        })
        .collect()
}

/// All transpositions of a maqam, tahlil first. Ascending and descending
/// runs are matched separately and paired on their shared tonic; a tonic
/// reachable in only one direction yields nothing. `ajnas` is the catalogue
/// searched for the jins on each degree.
pub fn maqam_transpositions(
    lattice: &Lattice,
    maqam: &MaqamTemplate,
    ajnas: &[JinsTemplate],
    options: &MatchOptions,
) -> Vec<MaqamTransposition> {
    if !is_realizable(lattice, &maqam.ascending) || !is_realizable(lattice, &maqam.descending) {
        debug!("Maqam '{}' is not realizable in this lattice", maqam.id);
        return Vec::new();
    }
    let (Some(documented_up), Some(documented_down)) = (
        documented_indices(lattice, &maqam.ascending),
        documented_indices(lattice, &maqam.descending),
    ) else {
        return Vec::new();
    };

    let ascending = match_transpositions(lattice, &maqam.ascending, Direction::Ascending, options);
    let ascending = with_documented(ascending, documented_up, false);
    let descending = match_transpositions(lattice, &maqam.descending, Direction::Descending, options);
    let descending = with_documented(descending, documented_down, true);

    let patterns = jins_patterns(lattice, ajnas);
    let exact = lattice.uses_ratios();
    let points = lattice.points();

    let mut transpositions = Vec::new();
    for up in &ascending {
        let Some(down) = descending.iter().find(|down| down.last() == up.first()) else {
            continue;
        };

        let ascending_points: Vec<PitchPoint> = up.iter().map(|&i| points[i].clone()).collect();
        let descending_points: Vec<PitchPoint> = down.iter().map(|&i| points[i].clone()).collect();
        let tonic = ascending_points[0].note_name.clone();
        let kind = if maqam.tonic() == Some(tonic.as_str()) {
            TranspositionKind::Tahlil
        } else {
            TranspositionKind::Transposition
        };

        let down_from_bottom: Vec<usize> = down.iter().rev().copied().collect();
        let mut descending_ajnas = embedded_ajnas(lattice, &down_from_bottom, &patterns, options);
        descending_ajnas.reverse();

        transpositions.push(MaqamTransposition {
            maqam_id: maqam.id.clone(),
            name: transposed_name(&maqam.name, kind, &tonic),
            kind,
            ascending_intervals: interval_pattern(&ascending_points, exact),
            descending_intervals: interval_pattern(&descending_points, exact),
            ascending_ajnas: embedded_ajnas(lattice, up, &patterns, options),
            descending_ajnas,
            ascending: ascending_points,
            descending: descending_points,
        });
    }

    keep_one_tahlil_first(&mut transpositions, &maqam.name);
    transpositions
}

/// Transpositions carrying a tahlil tag
trait Tagged {
    fn kind_mut(&mut self) -> &mut TranspositionKind;
    fn demote(&mut self, template_name: &str);
}

impl Tagged for JinsTransposition {
    fn kind_mut(&mut self) -> &mut TranspositionKind {
        &mut self.kind
    }

    fn demote(&mut self, template_name: &str) {
        self.kind = TranspositionKind::Transposition;
        self.name = transposed_name(template_name, self.kind, self.tonic());
    }
}

impl Tagged for MaqamTransposition {
    fn kind_mut(&mut self) -> &mut TranspositionKind {
        &mut self.kind
    }

    fn demote(&mut self, template_name: &str) {
        self.kind = TranspositionKind::Transposition;
        self.name = transposed_name(template_name, self.kind, self.tonic());
    }
}

/// Move the first tahlil to the front and demote any further ones (only
/// possible under backtracking, where one tonic can start several runs).
fn keep_one_tahlil_first<T: Tagged>(items: &mut Vec<T>, template_name: &str) {
    let Some(position) = items
        .iter_mut()
        .position(|item| *item.kind_mut() == TranspositionKind::Tahlil)
    else {
        return;
    };

    let tahlil = items.remove(position);
    items.insert(0, tahlil);
    for item in items.iter_mut().skip(1) {
        if *item.kind_mut() == TranspositionKind::Tahlil {
            item.demote(template_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::build_lattice;

    const NAMES: [&str; 7] = ["rāst", "dūgāh", "segāh", "chahargāh", "nawā", "ḥusaynī", "awj"];

    fn cents_lattice() -> Lattice {
        build_lattice(&["0", "200", "350", "500", "700", "900", "1050"], None, 0.0, 130.81, &NAMES)
    }

    fn jins(id: &str, notes: &[&str]) -> JinsTemplate {
        JinsTemplate {
            id: id.to_string(),
            name: id.to_string(),
            note_names: notes.iter().map(|n| n.to_string()).collect(),
        }
    }

    fn names(lattice: &Lattice, sequence: &[usize]) -> Vec<String> {
        sequence.iter().map(|&i| lattice.points()[i].note_name.clone()).collect()
    }

    #[test]
    fn test_tolerance_validation() {
        assert!(validate_tolerance(0.0).is_ok());
        assert!(validate_tolerance(50.0).is_ok());
        assert!(validate_tolerance(50.1).is_err());
        assert!(MatchOptions::new(-1.0, SearchStrategy::Greedy).is_err());
        assert_eq!(MatchOptions::default().tolerance_cents, DEFAULT_TOLERANCE_CENTS);
    }

    #[test]
    fn test_ascending_matches() {
        let lattice = cents_lattice();
        // 200 then 150 cents: rāst and nawā in every octave below the top one
        let found = match_transpositions(&lattice, &["rāst", "dūgāh", "segāh"], Direction::Ascending, &MatchOptions::default());
        let starts: Vec<String> = found.iter().map(|s| names(&lattice, s)[0].clone()).collect();
        assert!(starts.contains(&"rāst".to_string()));
        assert!(starts.contains(&"qarār rāst".to_string()));
        assert!(!starts.iter().any(|s| s.starts_with("jawāb")));
        for sequence in &found {
            assert_eq!(sequence.len(), 3);
        }
    }

    #[test]
    fn test_descending_matches_list_top_down() {
        let lattice = cents_lattice();
        let found = match_transpositions(&lattice, &["segāh", "dūgāh", "rāst"], Direction::Descending, &MatchOptions::default());
        let rast = lattice.index_of("rāst").unwrap();
        let sequence = found.iter().find(|s| s.last() == Some(&rast)).unwrap();
        assert_eq!(names(&lattice, sequence), ["segāh", "dūgāh", "rāst"]);
    }

    #[test]
    fn test_tolerance_bounds_are_inclusive() {
        // the documented pattern is two 200 cent steps; from dūgāh the second
        // step is 205 (or 195) cents
        let names = ["rāst", "dūgāh", "segāh", "chahargāh"];
        let template = ["rāst", "dūgāh", "segāh"];
        let wide = MatchOptions::new(5.0, SearchStrategy::Greedy).unwrap();
        let narrow = MatchOptions::new(4.0, SearchStrategy::Greedy).unwrap();

        for values in [["0", "200", "400", "605"], ["0", "200", "400", "595"]] {
            let lattice = build_lattice(&values, None, 0.0, 100.0, &names);
            let dugah = lattice.index_of("dūgāh").unwrap();
            let found = match_transpositions(&lattice, &template, Direction::Ascending, &wide);
            assert!(found.iter().any(|s| s[0] == dugah), "{values:?} at 5 cents");
            let found = match_transpositions(&lattice, &template, Direction::Ascending, &narrow);
            assert!(!found.iter().any(|s| s[0] == dugah), "{values:?} at 4 cents");
        }
    }

    #[test]
    fn test_backtracking_finds_alternatives() {
        // 95 and 105 cents are both within 10 of the 100 cent step
        let names = ["rāst", "tīk rāst", "zirguleh", "dūgāh"];
        let lattice = build_lattice(&["0", "95", "100", "105"], None, 0.0, 100.0, &names);
        let greedy = MatchOptions::new(10.0, SearchStrategy::Greedy).unwrap();
        let full = MatchOptions::new(10.0, SearchStrategy::Backtracking).unwrap();
        let template = ["rāst", "zirguleh"];

        let start = lattice.index_of("rāst").unwrap();
        let from_start = |found: &Vec<Vec<usize>>| found.iter().filter(|s| s[0] == start).count();

        assert_eq!(from_start(&match_transpositions(&lattice, &template, Direction::Ascending, &greedy)), 1);
        assert_eq!(from_start(&match_transpositions(&lattice, &template, Direction::Ascending, &full)), 3);
    }

    #[test]
    fn test_unrealizable_templates() {
        let lattice = cents_lattice();
        let options = MatchOptions::default();
        assert!(match_transpositions(&lattice, &["rāst"], Direction::Ascending, &options).is_empty());
        assert!(match_transpositions(&lattice, &["rāst", "kurdī"], Direction::Ascending, &options).is_empty());
        assert!(jins_transpositions(&lattice, &jins("j", &["rāst", "kurdī"]), &options).is_empty());
        assert!(match_transpositions(&Lattice::empty(), &["rāst", "dūgāh"], Direction::Ascending, &options).is_empty());
    }

    #[test]
    fn test_jins_tahlil_first() {
        let lattice = cents_lattice();
        let found = jins_transpositions(&lattice, &jins("jins rāst", &["rāst", "dūgāh", "segāh"]), &MatchOptions::default());
        assert!(found.len() > 1);
        assert!(found[0].is_tahlil());
        assert_eq!(found[0].name, "jins rāst");
        assert_eq!(found[0].note_names(), ["rāst", "dūgāh", "segāh"]);
        assert_eq!(found.iter().filter(|t| t.is_tahlil()).count(), 1);
        let other = &found[1];
        assert_eq!(other.name, format!("jins rāst al-{}", other.tonic()));
    }

    #[test]
    fn test_maqam_needs_both_directions() {
        let lattice = cents_lattice();
        let maqam = MaqamTemplate {
            id: "m".to_string(),
            name: "m".to_string(),
            ascending: vec!["rāst".into(), "dūgāh".into(), "segāh".into()],
            descending: vec!["segāh".into(), "dūgāh".into(), "rāst".into()],
        };
        let found = maqam_transpositions(&lattice, &maqam, &[], &MatchOptions::default());
        assert!(found[0].is_tahlil());
        for t in &found {
            assert_eq!(t.ascending.first(), t.descending.last());
            assert_eq!(t.ascending_ajnas.len(), 3);
            assert_eq!(t.descending_ajnas.len(), 3);
        }
    }
}
