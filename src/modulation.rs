//! Modulations reachable from a maqam transposition
//!
//! Follows Sāmī al-Shawwā's degree rules: a jins or maqam may follow the
//! source when it starts on the source's first, third, fourth, fifth or
//! sixth degree, with extra conditions on the third and sixth taken from the
//! natural / one-part / two-part classification of the note names.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalogue::Catalogue;
use crate::lattice::note_name::{shawwa_class, shawwa_index, ShawwaClass};
use crate::lattice::Lattice;
use crate::transpose::{jins_transpositions, maqam_transpositions, JinsTransposition, MatchOptions, MaqamTransposition};

/// Scale degree (and direction) a modulation starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModulationCategory {
    /// Same tonic
    FirstDegree,
    /// Third degree
    ThirdDegree,
    /// Two-part note below the third degree, when the third itself is unusable
    AltThirdDegree,
    /// Fourth degree
    FourthDegree,
    /// Fifth degree
    FifthDegree,
    /// Sixth ascending degree between naturals
    SixthDegreeAsc,
    /// Sixth descending degree between naturals
    SixthDegreeDesc,
    /// Sixth degree when no third-degree modulation exists
    SixthDegreeIfNoThird,
}

impl ModulationCategory {
    /// Every category in canonical order
    pub const ALL: [ModulationCategory; 8] = [
        ModulationCategory::FirstDegree,
        ModulationCategory::ThirdDegree,
        ModulationCategory::AltThirdDegree,
        ModulationCategory::FourthDegree,
        ModulationCategory::FifthDegree,
        ModulationCategory::SixthDegreeAsc,
        ModulationCategory::SixthDegreeDesc,
        ModulationCategory::SixthDegreeIfNoThird,
    ];

    /// Roman numeral of the degree
    pub fn degree(self) -> &'static str {
        match self {
            ModulationCategory::FirstDegree => "I",
            ModulationCategory::ThirdDegree | ModulationCategory::AltThirdDegree => "III",
            ModulationCategory::FourthDegree => "IV",
            ModulationCategory::FifthDegree => "V",
            ModulationCategory::SixthDegreeAsc
            | ModulationCategory::SixthDegreeDesc
            | ModulationCategory::SixthDegreeIfNoThird => "VI",
        }
    }
}

impl fmt::Display for ModulationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModulationCategory::FirstDegree => "firstDegree",
            ModulationCategory::ThirdDegree => "thirdDegree",
            ModulationCategory::AltThirdDegree => "altThirdDegree",
            ModulationCategory::FourthDegree => "fourthDegree",
            ModulationCategory::FifthDegree => "fifthDegree",
            ModulationCategory::SixthDegreeAsc => "sixthDegreeAsc",
            ModulationCategory::SixthDegreeDesc => "sixthDegreeDesc",
            ModulationCategory::SixthDegreeIfNoThird => "sixthDegreeIfNoThird",
        };
        f.write_str(s)
    }
}

/// A reachable jins or maqam
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ModulationTarget {
    /// Jins transposition
    Jins(JinsTransposition),
    /// Maqam transposition
    Maqam(MaqamTransposition),
}

impl ModulationTarget {
    /// Note name the target starts on
    pub fn tonic(&self) -> &str {
        match self {
            ModulationTarget::Jins(j) => j.tonic(),
            ModulationTarget::Maqam(m) => m.tonic(),
        }
    }

    /// Display name of the transposition
    pub fn name(&self) -> &str {
        match self {
            ModulationTarget::Jins(j) => &j.name,
            ModulationTarget::Maqam(m) => &m.name,
        }
    }

    /// Template id
    pub fn template_id(&self) -> &str {
        match self {
            ModulationTarget::Jins(j) => &j.jins_id,
            ModulationTarget::Maqam(m) => &m.maqam_id,
        }
    }

    /// The maqam transposition, if this is one
    pub fn as_maqam(&self) -> Option<&MaqamTransposition> {
        match self {
            ModulationTarget::Maqam(m) => Some(m),
            ModulationTarget::Jins(_) => None,
        }
    }
}

/// Modulations from one maqam transposition, by category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulationSet {
    first_degree: Vec<ModulationTarget>,
    third_degree: Vec<ModulationTarget>,
    alt_third_degree: Vec<ModulationTarget>,
    fourth_degree: Vec<ModulationTarget>,
    fifth_degree: Vec<ModulationTarget>,
    sixth_degree_asc: Vec<ModulationTarget>,
    sixth_degree_desc: Vec<ModulationTarget>,
    sixth_degree_if_no_third: Vec<ModulationTarget>,
    /// Two-part note found below the third degree, if any
    pub alt_third_note_name: Option<String>,
}

impl ModulationSet {
    /// Targets in `category`
    pub fn get(&self, category: ModulationCategory) -> &[ModulationTarget] {
        match category {
            ModulationCategory::FirstDegree => &self.first_degree,
            ModulationCategory::ThirdDegree => &self.third_degree,
            ModulationCategory::AltThirdDegree => &self.alt_third_degree,
            ModulationCategory::FourthDegree => &self.fourth_degree,
            ModulationCategory::FifthDegree => &self.fifth_degree,
            ModulationCategory::SixthDegreeAsc => &self.sixth_degree_asc,
            ModulationCategory::SixthDegreeDesc => &self.sixth_degree_desc,
            ModulationCategory::SixthDegreeIfNoThird => &self.sixth_degree_if_no_third,
        }
    }

    fn get_mut(&mut self, category: ModulationCategory) -> &mut Vec<ModulationTarget> {
        match category {
            ModulationCategory::FirstDegree => &mut self.first_degree,
            ModulationCategory::ThirdDegree => &mut self.third_degree,
            ModulationCategory::AltThirdDegree => &mut self.alt_third_degree,
            ModulationCategory::FourthDegree => &mut self.fourth_degree,
            ModulationCategory::FifthDegree => &mut self.fifth_degree,
            ModulationCategory::SixthDegreeAsc => &mut self.sixth_degree_asc,
            ModulationCategory::SixthDegreeDesc => &mut self.sixth_degree_desc,
            ModulationCategory::SixthDegreeIfNoThird => &mut self.sixth_degree_if_no_third,
        }
    }

    /// All (category, target) pairs in canonical category order
    pub fn iter(&self) -> impl Iterator<Item = (ModulationCategory, &ModulationTarget)> {
        ModulationCategory::ALL
            .into_iter()
            .flat_map(move |category| self.get(category).iter().map(move |target| (category, target)))
    }

    /// Total number of entries over all categories
    pub fn len(&self) -> usize {
        ModulationCategory::ALL.iter().map(|&c| self.get(c).len()).sum()
    }

    /// Whether no category has an entry
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn append(&mut self, mut other: ModulationSet) {
        for category in ModulationCategory::ALL {
            self.get_mut(category).append(other.get_mut(category));
        }
        if self.alt_third_note_name.is_none() {
            self.alt_third_note_name = other.alt_third_note_name;
        }
    }
}

/// Degree facts of the source that the rules consult
struct DegreeRules {
    ascending: Vec<String>,
    descending_from_bottom: Vec<String>,
    alt_third: Option<String>,
    alt_third_allowed: bool,
    sixth_ascending: bool,
    sixth_descending: bool,
    sixth_without_third: bool,
}

fn class_at(notes: &[String], degree: usize) -> ShawwaClass {
    notes.get(degree).map_or(ShawwaClass::Outside, |n| shawwa_class(n))
}

fn distance(from: Option<usize>, to: Option<usize>) -> Option<isize> {
    Some(to? as isize - from? as isize)
}

impl DegreeRules {
    fn new(source: &MaqamTransposition, lattice: &Lattice) -> Self {
        let ascending: Vec<String> = source.ascending.iter().map(|p| p.note_name.clone()).collect();
        let descending_from_bottom: Vec<String> = source.descending.iter().rev().map(|p| p.note_name.clone()).collect();

        let tonic = ascending.first().and_then(|n| shawwa_index(n));
        let second = ascending.get(1).and_then(|n| shawwa_index(n));

        // nearest two-part note at or below the third degree, from the main octave up
        let octave_start = lattice.pitch_classes_per_octave();
        let third = ascending.get(2).and_then(|n| lattice.index_of(n));
        let mut alt_third = None;
        let mut alt_third_allowed = false;
        if let Some(third) = third.filter(|&t| t >= octave_start) {
            let below_third = &lattice.points()[octave_start..=third];
            if let Some(point) = below_third
                .iter()
                .rev()
                .find(|p| shawwa_class(&p.note_name) == ShawwaClass::TwoPart)
            {
                let candidate = shawwa_index(&point.note_name);
                alt_third_allowed = distance(tonic, candidate) == Some(6) && distance(second, candidate) == Some(2);
                alt_third = Some(point.note_name.clone());
            }
        }

        let sixth_ascending = class_at(&ascending, 4) == ShawwaClass::Natural && class_at(&ascending, 6) == ShawwaClass::Natural;
        let sixth_descending = class_at(&descending_from_bottom, 4) == ShawwaClass::Natural
            && class_at(&descending_from_bottom, 6) == ShawwaClass::Natural;

        let sixth = ascending.get(5).and_then(|n| shawwa_index(n));
        let sixth_without_third =
            matches!(distance(tonic, sixth), Some(16 | 17)) && class_at(&ascending, 5) == ShawwaClass::Natural;

        Self {
            ascending,
            descending_from_bottom,
            alt_third,
            alt_third_allowed,
            sixth_ascending,
            sixth_descending,
            sixth_without_third,
        }
    }

    fn degree(&self, degree: usize) -> Option<&str> {
        self.ascending.get(degree).map(String::as_str)
    }

    /// The degree's note, provided it is within al-Shawwā's framework
    fn classified_degree(&self, degree: usize) -> Option<&str> {
        self.degree(degree).filter(|n| shawwa_class(n) != ShawwaClass::Outside)
    }

    fn categories(&self, start: &str) -> Vec<ModulationCategory> {
        let start = Some(start);
        let mut categories = Vec::new();

        if self.degree(0) == start {
            categories.push(ModulationCategory::FirstDegree);
        }
        if self.classified_degree(3) == start {
            categories.push(ModulationCategory::FourthDegree);
        }
        if self.classified_degree(4) == start {
            categories.push(ModulationCategory::FifthDegree);
        }

        if self.classified_degree(2) == start {
            categories.push(ModulationCategory::ThirdDegree);
        } else if self.alt_third_allowed && self.alt_third.as_deref() == start {
            categories.push(ModulationCategory::AltThirdDegree);
        } else if self.sixth_without_third && self.degree(5) == start {
            categories.push(ModulationCategory::SixthDegreeIfNoThird);
        }

        if self.sixth_ascending && self.degree(5) == start {
            categories.push(ModulationCategory::SixthDegreeAsc);
        }
        if self.sixth_descending && self.descending_from_bottom.get(5).map(String::as_str) == start {
            categories.push(ModulationCategory::SixthDegreeDesc);
        }

        categories
    }

    /// Candidate positions per category, in candidate order, with the third
    /// and sixth precedence applied. Candidates repeating the source's
    /// ascending notes are skipped.
    fn categorize<C: Candidate>(&self, candidates: &[C]) -> Categorized {
        let mut categorized = Categorized::default();
        for (position, candidate) in candidates.iter().enumerate() {
            if candidate.ascending_note_names().iter().eq(self.ascending.iter()) {
                continue;
            }
            for category in self.categories(candidate.start()) {
                categorized.get_mut(category).push(position);
            }
        }
        categorized.apply_precedence();
        categorized
    }
}

/// Anything the degree rules can place
trait Candidate: Clone {
    fn start(&self) -> &str;
    fn ascending_note_names(&self) -> Vec<&str>;
    fn into_target(self) -> ModulationTarget;
}

impl Candidate for JinsTransposition {
    fn start(&self) -> &str {
        self.tonic()
    }

    fn ascending_note_names(&self) -> Vec<&str> {
        self.note_names()
    }

    fn into_target(self) -> ModulationTarget {
        ModulationTarget::Jins(self)
    }
}

impl Candidate for MaqamTransposition {
    fn start(&self) -> &str {
        self.tonic()
    }

    fn ascending_note_names(&self) -> Vec<&str> {
        MaqamTransposition::ascending_note_names(self)
    }

    fn into_target(self) -> ModulationTarget {
        ModulationTarget::Maqam(self)
    }
}

#[derive(Debug, Default)]
struct Categorized([Vec<usize>; 8]);

impl Categorized {
    fn get(&self, category: ModulationCategory) -> &[usize] {
        &self.0[category as usize]
    }

    fn get_mut(&mut self, category: ModulationCategory) -> &mut Vec<usize> {
        &mut self.0[category as usize]
    }

    /// Drop the alternative third when a third exists, and the sixth-without-
    /// third when either third exists.
    fn apply_precedence(&mut self) {
        if !self.get(ModulationCategory::ThirdDegree).is_empty() {
            self.get_mut(ModulationCategory::AltThirdDegree).clear();
        }
        if !self.get(ModulationCategory::ThirdDegree).is_empty()
            || !self.get(ModulationCategory::AltThirdDegree).is_empty()
        {
            self.get_mut(ModulationCategory::SixthDegreeIfNoThird).clear();
        }
    }

    fn flatten(&self) -> impl Iterator<Item = (ModulationCategory, usize)> + '_ {
        ModulationCategory::ALL
            .into_iter()
            .flat_map(move |category| self.get(category).iter().map(move |&position| (category, position)))
    }

    fn into_set<C: Candidate>(self, candidates: &[C], alt_third_note_name: Option<String>) -> ModulationSet {
        let mut set = ModulationSet {
            alt_third_note_name,
            ..ModulationSet::default()
        };
        for (category, position) in self.flatten() {
            set.get_mut(category).push(candidates[position].clone().into_target());
        }
        set
    }
}

fn analyze<C: Candidate>(source: &MaqamTransposition, lattice: &Lattice, candidates: &[C]) -> ModulationSet {
    if source.ascending.is_empty() || lattice.is_empty() {
        return ModulationSet::default();
    }
    let rules = DegreeRules::new(source, lattice);
    let categorized = rules.categorize(candidates);
    categorized.into_set(candidates, rules.alt_third)
}

/// Maqam modulations from `source` among precomputed `candidates`, as
/// (category, candidate position) pairs in canonical category order.
pub(crate) fn maqam_modulation_edges(
    source: &MaqamTransposition,
    lattice: &Lattice,
    candidates: &[MaqamTransposition],
) -> Vec<(ModulationCategory, usize)> {
    if source.ascending.is_empty() || lattice.is_empty() {
        return Vec::new();
    }
    DegreeRules::new(source, lattice).categorize(candidates).flatten().collect()
}

/// Ajnas reachable from `source`.
pub fn analyze_jins_modulations(
    source: &MaqamTransposition,
    catalogue: &Catalogue,
    lattice: &Lattice,
    options: &MatchOptions,
) -> ModulationSet {
    let candidates: Vec<JinsTransposition> = catalogue
        .ajnas
        .iter()
        .flat_map(|jins| jins_transpositions(lattice, jins, options))
        .collect();
    analyze(source, lattice, &candidates)
}

/// Maqamat reachable from `source`.
pub fn analyze_maqam_modulations(
    source: &MaqamTransposition,
    catalogue: &Catalogue,
    lattice: &Lattice,
    options: &MatchOptions,
) -> ModulationSet {
    let candidates: Vec<MaqamTransposition> = catalogue
        .maqamat
        .iter()
        .flat_map(|maqam| maqam_transpositions(lattice, maqam, &catalogue.ajnas, options))
        .collect();
    analyze(source, lattice, &candidates)
}

/// Ajnas and maqamat reachable from `source`. Precedence between the third
/// and sixth categories is decided separately for each kind, ajnas listed
/// before maqamat within a category.
pub fn analyze_modulations(
    source: &MaqamTransposition,
    catalogue: &Catalogue,
    lattice: &Lattice,
    options: &MatchOptions,
) -> ModulationSet {
    let mut set = analyze_jins_modulations(source, catalogue, lattice, options);
    set.append(analyze_maqam_modulations(source, catalogue, lattice, options));
    debug!("{} modulations from '{}'", set.len(), source.name);
    set
}
