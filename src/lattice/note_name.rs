//! Transliterated note names
//!
//! Five fixed octave tables of the Arab-Ottoman-Persian note names, their
//! International Pitch Notation spellings and Sāmī al-Shawwā's classification
//! of each position into natural, one-part and two-part notes.

/// Sentinel used for lattice slots without a known note name.
pub const NONE: &str = "none";

/// qarār octave
pub const OCTAVE_ZERO: [&str; 37] = [
    "qarār yegāh",
    "qarār qarār nīm ḥiṣār",
    "qarār shūrī",
    "qarār qarār ḥiṣār",
    "qarār qarār tīk ḥiṣār/shūrī",
    "qarār nīm ʿushayrān",
    "qarār ʿushayrān",
    "qarār nīm ʿajam ʿushayrān",
    "qarār ʿajam ʿushayrān",
    "qarār nairūz",
    "qarār tīk ʿajam ʿushayrān",
    "qarār ʿirāq",
    "qarār rahāwī",
    "qarār nīm kawasht/rahāwī",
    "qarār kawasht",
    "qarār tīk kawasht",
    "qarār rāst",
    "qarār tīk rāst",
    "qarār nīm zirguleh",
    "qarār zirguleh",
    "qarār tīk zirguleh",
    "qarār dūgāh",
    "qarār nīm kurdī/nahāwand",
    "qarār nahāwand",
    "qarār kurdī",
    "qarār tīk kūrdī",
    "qarār segāh",
    "qarār nīm buselīk",
    "qarār buselīk/ʿushshāq",
    "qarār tīk buselīk",
    "qarār chahargāh",
    "qarār tīk chahargāh",
    "qarār nīm ḥijāz",
    "qarār ṣabā",
    "qarār ḥijāz",
    "qarār tīk ḥijāz/ṣabā",
    "nīm yegāh",
];

/// Main octave, starting on yegāh
pub const OCTAVE_ONE: [&str; 37] = [
    "yegāh",
    "qarār nīm ḥiṣār",
    "shūrī",
    "qarār ḥiṣār",
    "qarār tīk ḥiṣār/shūrī",
    "nīm ʿushayrān",
    "ʿushayrān",
    "nīm ʿajam ʿushayrān",
    "ʿajam ʿushayrān",
    "nairūz",
    "tīk ʿajam ʿushayrān",
    "ʿirāq",
    "rahāwī",
    "nīm kawasht",
    "kawasht",
    "tīk kawasht",
    "rāst",
    "tīk rāst",
    "nīm zirguleh",
    "zirguleh",
    "tīk zirguleh",
    "dūgāh",
    "nīm kurdī/nahāwand",
    "nahāwand",
    "kurdī",
    "tīk kūrdī",
    "segāh",
    "nīm buselīk",
    "buselīk/ʿushshāq",
    "tīk buselīk",
    "chahargāh",
    "tīk chahargāh",
    "nīm ḥijāz",
    "ṣabā",
    "ḥijāz",
    "tīk ḥijāz/ṣabā",
    "nīm nawā",
];

/// jawāb octave, starting on nawā
pub const OCTAVE_TWO: [&str; 37] = [
    "nawā",
    "nīm ḥiṣār",
    "jawāb shūrī",
    "ḥiṣār",
    "tīk ḥiṣār",
    "nīm ḥusaynī",
    "ḥusaynī",
    "nīm ʿajam",
    "ʿajam",
    "jawāb nairūz",
    "tīk ʿajam",
    "awj",
    "jawāb rahāwī",
    "nīm māhūr",
    "māhūr",
    "tīk māhūr",
    "kurdān",
    "tīk kurdān",
    "nīm shahnāz",
    "shahnāz",
    "jawāb tīk zirguleh",
    "muḥayyar",
    "nīm sunbuleh",
    "jawāb nahāwand",
    "sunbuleh/zawāl",
    "jawāb tīk kūrdī",
    "buzurk",
    "jawāb nīm buselīk",
    "jawāb buselīk",
    "jawāb tīk buselīk",
    "mahurān",
    "tīk mahurān",
    "jawāb nīm ḥijāz",
    "jawāb ṣabā",
    "jawāb ḥijāz",
    "jawāb tīk ḥijāz",
    "nīm saham/ramal tūtī",
];

/// jawāb jawāb octave
pub const OCTAVE_THREE: [&str; 37] = [
    "saham/ramal tūtī",
    "jawāb nīm ḥiṣār",
    "jawāb jawāb shūrī",
    "jawāb ḥiṣār",
    "jawāb tīk ḥiṣār",
    "jawāb nīm ḥusaynī",
    "jawāb ḥusaynī",
    "jawāb nīm ʿajam",
    "jawāb ʿajam",
    "jawāb jawāb nairūz",
    "jawāb tīk ʿajam",
    "jawāb awj",
    "jawāb jawāb rahāwī",
    "jawāb nīm māhūr",
    "jawāb māhūr",
    "jawāb tīk māhūr",
    "jawāb kurdān",
    "jawāb tīk kurdān",
    "jawāb nīm shahnāz",
    "jawāb shahnāz",
    "jawāb jawāb tīk zirguleh",
    "jawāb muḥayyar",
    "jawāb nīm sunbuleh",
    "jawāb jawāb nahāwand",
    "jawāb sunbuleh/zawāl",
    "jawāb jawāb tīk kūrdī",
    "jawāb buzurk",
    "jawāb jawāb nīm buselīk",
    "jawāb jawāb buselīk",
    "jawāb jawāb tīk buselīk",
    "jawāb mahurān",
    "jawāb tīk mahurān",
    "jawāb jawāb nīm ḥijāz",
    "jawāb jawāb ṣabā",
    "jawāb jawāb ḥijāz",
    "jawāb jawāb tīk ḥijāz",
    "jawāb saham/ramal tūtī",
];

/// Extended fourth octave, only reached by names that start in [`OCTAVE_TWO`]
pub const OCTAVE_FOUR: [&str; 36] = [
    "jawāb saham/ramal tūtī",
    "jawāb jawāb nīm ḥiṣār",
    "jawāb jawāb jawāb shūrī",
    "jawāb jawāb ḥiṣār",
    "jawāb jawāb tīk ḥiṣār",
    "jawāb jawāb nīm ḥusaynī",
    "jawāb jawāb ḥusaynī",
    "jawāb jawāb nīm ʿajam",
    "jawāb jawāb ʿajam",
    "jawāb jawāb jawāb nairūz",
    "jawāb jawāb tīk ʿajam",
    "jawāb jawāb awj",
    "jawāb jawāb jawāb rahāwī",
    "jawāb jawāb nīm māhūr",
    "jawāb jawāb māhūr",
    "jawāb jawāb tīk māhūr",
    "jawāb jawāb kurdān",
    "jawāb jawāb nīm shahnāz",
    "jawāb jawāb shahnāz",
    "jawāb jawāb jawāb tīk zirguleh",
    "jawāb jawāb muḥayyar",
    "jawāb jawāb nīm sunbuleh",
    "jawāb jawāb jawāb nahāwand",
    "jawāb jawāb sunbuleh/zawāl",
    "jawāb jawāb jawāb tīk kūrdī",
    "jawāb jawāb buzurk",
    "jawāb jawāb jawāb nīm buselīk",
    "jawāb jawāb jawāb buselīk",
    "jawāb jawāb jawāb tīk buselīk",
    "jawāb jawāb mahurān",
    "jawāb jawāb tīk mahurān",
    "jawāb jawāb jawāb nīm ḥijāz",
    "jawāb jawāb jawāb ṣabā",
    "jawāb jawāb jawāb ḥijāz",
    "jawāb jawāb jawāb tīk ḥijāz",
    "jawāb jawāb saham/ramal tūtī",
];

const OCTAVE_TABLES: [&[&str]; 5] = [&OCTAVE_ZERO, &OCTAVE_ONE, &OCTAVE_TWO, &OCTAVE_THREE, &OCTAVE_FOUR];

/// IPN spellings per table position, without octave number. Positions up to
/// [`LAST_POSITION_BELOW_C`] belong to the octave below the C that follows.
const IPN_SPELLINGS: [&str; 37] = [
    "G", "G-#", "Ab-", "Ab", "A-b", "A-", "A", "A-#", "Bb", "Bb+", "Bb++", "B-b", "B--", "B-", "B", "C-b", "C", "C+",
    "C-#", "C#", "D-b", "D", "D-#", "Eb-", "Eb", "Eb+", "E-b", "E-", "E", "F-b", "F", "F+", "F-#", "F#-", "F#", "G-b",
    "G-",
];

const LAST_POSITION_BELOW_C: usize = 14;

const NATURAL_POSITIONS: [usize; 7] = [0, 6, 11, 16, 21, 26, 30];
const ONE_PART_POSITIONS: [usize; 10] = [1, 4, 7, 13, 18, 20, 22, 27, 32, 35];
const TWO_PART_POSITIONS: [usize; 7] = [3, 8, 14, 19, 24, 28, 34];

/// Locate a note name in the octave tables, returning (table octave, position).
///
/// Tables are searched from the lowest octave up; the first hit wins.
pub fn locate(name: &str) -> Option<(usize, usize)> {
    OCTAVE_TABLES
        .iter()
        .enumerate()
        .find_map(|(octave, table)| table.iter().position(|n| *n == name).map(|pos| (octave, pos)))
}

/// Name of `base_name` (an assignment name from the main or jawāb octave)
/// when shifted into lattice octave `octave` (0..=3, 1 being unshifted).
///
/// Returns [`NONE`] when the name is unknown or the shift leaves the tables.
pub fn name_in_octave(base_name: &str, octave: usize) -> &'static str {
    let (first_table, position) = if let Some(pos) = OCTAVE_ONE.iter().position(|n| *n == base_name) {
        (0, pos)
    } else if let Some(pos) = OCTAVE_TWO.iter().position(|n| *n == base_name) {
        (1, pos)
    } else {
        return NONE;
    };

    OCTAVE_TABLES
        .get(first_table + octave)
        .and_then(|table| table.get(position))
        .copied()
        .unwrap_or(NONE)
}

/// International Pitch Notation spelling of a note name, e.g. "rāst" -> "C3".
pub fn ipn_name(name: &str) -> Option<String> {
    let (octave, position) = locate(name)?;
    let number = if position <= LAST_POSITION_BELOW_C {
        octave + 1
    } else {
        octave + 2
    };
    Some(format!("{}{}", IPN_SPELLINGS[position], number))
}

/// Al-Shawwā's classification of a note position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShawwaClass {
    /// aṣlīya / ṭabīʿīya
    Natural,
    /// arbāʿ, a quarter-tone alteration
    OnePart,
    /// anṣāf, a half-tone alteration
    TwoPart,
    /// Outside the 24-tone framework
    Outside,
}

/// Classify a note name by its position within its octave table.
pub fn shawwa_class(name: &str) -> ShawwaClass {
    if name == NONE {
        return ShawwaClass::Outside;
    }
    let Some((_, position)) = locate(name) else {
        return ShawwaClass::Outside;
    };
    if NATURAL_POSITIONS.contains(&position) {
        ShawwaClass::Natural
    } else if ONE_PART_POSITIONS.contains(&position) {
        ShawwaClass::OnePart
    } else if TWO_PART_POSITIONS.contains(&position) {
        ShawwaClass::TwoPart
    } else {
        ShawwaClass::Outside
    }
}

/// Index of a note in al-Shawwā's two-octave list of classified notes
/// (main octave followed by the jawāb octave, unclassified notes removed).
pub fn shawwa_index(name: &str) -> Option<usize> {
    OCTAVE_ONE
        .iter()
        .chain(OCTAVE_TWO.iter())
        .filter(|n| shawwa_class(n) != ShawwaClass::Outside)
        .position(|n| *n == name)
}

/// Normalize a name or identifier for lookups: lowercase, transliteration
/// diacritics folded to ASCII, ʿayn/hamza and other non-ASCII dropped, runs of
/// whitespace collapsed to a single `_`.
pub fn standardize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.trim().chars().flat_map(char::to_lowercase) {
        let folded = match c {
            'ā' | 'á' | 'à' | 'â' | 'ä' => 'a',
            'ī' | 'í' | 'ì' | 'î' | 'ï' => 'i',
            'ū' | 'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ē' | 'é' | 'è' | 'ê' => 'e',
            'ō' | 'ó' | 'ò' | 'ô' | 'ö' => 'o',
            'ḥ' | 'ḫ' => 'h',
            'ṣ' | 'š' => 's',
            'ḍ' => 'd',
            'ṭ' => 't',
            'ẓ' | 'ž' => 'z',
            'ġ' => 'g',
            'ç' => 'c',
            c if c.is_whitespace() => ' ',
            c if c.is_ascii() => c,
            _ => continue,
        };
        if folded == ' ' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(folded);
        }
    }
    if out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate() {
        assert_eq!(locate("yegāh"), Some((1, 0)));
        assert_eq!(locate("rāst"), Some((1, 16)));
        assert_eq!(locate("nawā"), Some((2, 0)));
        assert_eq!(locate("qarār rāst"), Some((0, 16)));
        assert_eq!(locate("not a note"), None);
    }

    #[test]
    fn test_name_in_octave() {
        assert_eq!(name_in_octave("rāst", 0), "qarār rāst");
        assert_eq!(name_in_octave("rāst", 1), "rāst");
        assert_eq!(name_in_octave("rāst", 2), "kurdān");
        assert_eq!(name_in_octave("rāst", 3), "jawāb kurdān");
        assert_eq!(name_in_octave("nawā", 0), "yegāh");
        assert_eq!(name_in_octave("nawā", 3), "jawāb saham/ramal tūtī");
        // octave four is one entry short
        assert_eq!(name_in_octave("nīm saham/ramal tūtī", 3), NONE);
        assert_eq!(name_in_octave("unknown", 1), NONE);
    }

    #[test]
    fn test_ipn_names() {
        assert_eq!(ipn_name("yegāh").as_deref(), Some("G2"));
        assert_eq!(ipn_name("kawasht").as_deref(), Some("B2"));
        assert_eq!(ipn_name("rāst").as_deref(), Some("C3"));
        assert_eq!(ipn_name("segāh").as_deref(), Some("E-b3"));
        assert_eq!(ipn_name("nawā").as_deref(), Some("G3"));
        assert_eq!(ipn_name("qarār rāst").as_deref(), Some("C2"));
        assert_eq!(ipn_name("none"), None);
    }

    #[test]
    fn test_shawwa_classes() {
        assert_eq!(shawwa_class("rāst"), ShawwaClass::Natural);
        assert_eq!(shawwa_class("segāh"), ShawwaClass::Natural);
        assert_eq!(shawwa_class("kurdī"), ShawwaClass::TwoPart);
        assert_eq!(shawwa_class("nīm zirguleh"), ShawwaClass::OnePart);
        assert_eq!(shawwa_class("shūrī"), ShawwaClass::Outside);
        assert_eq!(shawwa_class(NONE), ShawwaClass::Outside);
        assert_eq!(shawwa_class("kurdān"), ShawwaClass::Natural);
    }

    #[test]
    fn test_shawwa_index() {
        // 24 classified positions per octave
        assert_eq!(shawwa_index("yegāh"), Some(0));
        assert_eq!(shawwa_index("nawā"), Some(24));
        assert_eq!(shawwa_index("shūrī"), None);
        assert_eq!(shawwa_index("rāst").map(|i| shawwa_index("kurdān").unwrap() - i), Some(24));
    }

    #[test]
    fn test_standardize() {
        assert_eq!(standardize("Rāst"), "rast");
        assert_eq!(standardize("ʿajam ʿushayrān"), "ajam_ushayran");
        assert_eq!(standardize("  ḥijāz  kār "), "hijaz_kar");
        assert_eq!(standardize("ṣabā"), "saba");
        assert_eq!(standardize("maqam_rast"), "maqam_rast");
    }
}
