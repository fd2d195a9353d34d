//! Maqam family classification
//!
//! A maqam belongs to the family of the jins on its first degree. Used for
//! grouping; it plays no part in modulation analysis.

use serde::Serialize;

use crate::transpose::MaqamTransposition;

/// Family of maqamat with no identifiable jins
pub const NO_JINS: &str = "no jins";

/// Compound jins names that form their own family
const COMPOUND_FAMILIES: [(&str, &str); 4] = [
    ("ṣabā zamzam", "ṣabā zamzam"),
    ("athar kurd", "athar kurd"),
    ("awj ʾārāʾ", "awj ʾārāʾ"),
    ("awj araa", "awj ʾārāʾ"),
];

/// Words that collapse any other name containing them
const COLLAPSING_WORDS: [&str; 3] = ["ṣabā", "athar", "awj"];

/// Where the jins used for classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FamilySource {
    /// First ascending jins
    Ascending,
    /// Last descending jins
    Descending,
    /// No jins found
    None,
}

/// Family of a maqam transposition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyClassification {
    /// Family name
    pub family: String,
    /// Full name of the jins the family was taken from
    pub jins_name: Option<String>,
    /// Which sequence `jins_name` came from
    pub source: FamilySource,
}

/// Classify `maqam` by the jins on its first ascending degree, falling back
/// to the last jins of the descending sequence.
pub fn classify_family(maqam: &MaqamTransposition) -> FamilyClassification {
    let ascending = maqam.ascending_ajnas.first().and_then(Option::as_ref);
    let descending = maqam.descending_ajnas.last().and_then(Option::as_ref);

    let (jins, source) = match (ascending, descending) {
        (Some(jins), _) => (jins, FamilySource::Ascending),
        (None, Some(jins)) => (jins, FamilySource::Descending),
        (None, None) => {
            return FamilyClassification {
                family: NO_JINS.to_string(),
                jins_name: None,
                source: FamilySource::None,
            }
        }
    };

    FamilyClassification {
        family: family_of(&jins.name),
        jins_name: Some(jins.name.clone()),
        source,
    }
}

/// Family name for a jins name
pub fn family_of(jins_name: &str) -> String {
    let base = base_name(jins_name);
    if base.is_empty() {
        return NO_JINS.to_string();
    }

    if let Some((_, family)) = COMPOUND_FAMILIES.iter().find(|(compound, _)| base.contains(compound)) {
        return family.to_string();
    }
    if let Some(word) = COLLAPSING_WORDS.iter().find(|word| base.contains(*word)) {
        return word.to_string();
    }

    base.split_whitespace().next().unwrap_or(NO_JINS).to_string()
}

/// Lowercased name without the `jins ` prefix or an ` al-<tonic>` suffix
fn base_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let without_suffix = match lower.find(" al-") {
        Some(at) => &lower[..at],
        None => &lower,
    };
    without_suffix
        .strip_prefix("jins ")
        .unwrap_or(without_suffix)
        .trim()
        .to_string()
}
