#![allow(dead_code)]

use maqamat::lattice::Lattice;
use maqamat::{build_lattice_for, Catalogue, MaqamTransposition, MatchOptions};

/// Twelve-note Pythagorean tuning on yegāh (a chain of fifths from Gb to
/// B), plus a seven-note cents tuning with neutral thirds.
pub const CATALOGUE: &str = r#"{
    "tuningSystems": [
        {
            "id": "pythagorean_yegah",
            "title": "Pythagorean chain of fifths",
            "pitchValues": ["1/1", "256/243", "9/8", "32/27", "81/64", "4/3", "1024/729", "3/2", "128/81", "27/16", "16/9", "4096/2187"],
            "noteNameSets": [[
                "yegāh", "qarār ḥiṣār", "ʿushayrān", "ʿajam ʿushayrān", "kawasht", "rāst",
                "zirguleh", "dūgāh", "kurdī", "buselīk/ʿushshāq", "chahargāh", "ḥijāz"
            ]],
            "referenceFrequencies": { "yegāh": 97.999 }
        },
        {
            "id": "neutral_yegah",
            "title": "Seven neutral steps",
            "pitchValues": ["0", "204", "355", "498", "702", "853", "996"],
            "noteNameSets": [["yegāh", "ʿushayrān", "ʿirāq", "rāst", "dūgāh", "segāh", "chahargāh"]]
        }
    ],
    "ajnas": [
        { "id": "jins_kurd", "name": "jins kurd", "noteNames": ["dūgāh", "kurdī", "chahargāh", "nawā"] },
        { "id": "jins_nahawand", "name": "jins nahāwand", "noteNames": ["rāst", "dūgāh", "kurdī", "chahargāh", "nawā"] },
        { "id": "jins_ajam", "name": "jins ʿajam", "noteNames": ["ʿajam ʿushayrān", "rāst", "dūgāh", "kurdī"] },
        { "id": "jins_rast", "name": "jins rāst", "noteNames": ["rāst", "dūgāh", "segāh", "chahargāh"] },
        { "id": "jins_sikah", "name": "jins sīkāh", "noteNames": ["segāh", "chahargāh", "nawā"] }
    ],
    "maqamat": [
        {
            "id": "maqam_kurd",
            "name": "kurd",
            "ascending": ["dūgāh", "kurdī", "chahargāh", "nawā", "ḥusaynī", "ʿajam", "kurdān", "muḥayyar"],
            "descending": ["muḥayyar", "kurdān", "ʿajam", "ḥusaynī", "nawā", "chahargāh", "kurdī", "dūgāh"]
        },
        {
            "id": "maqam_nahawand",
            "name": "nahāwand",
            "ascending": ["dūgāh", "buselīk/ʿushshāq", "chahargāh", "nawā", "ḥusaynī", "māhūr", "kurdān", "muḥayyar"],
            "descending": ["muḥayyar", "kurdān", "ʿajam", "ḥusaynī", "nawā", "chahargāh", "buselīk/ʿushshāq", "dūgāh"]
        },
        {
            "id": "maqam_rast",
            "name": "rāst",
            "ascending": ["rāst", "dūgāh", "segāh", "chahargāh", "nawā", "ḥusaynī", "awj", "kurdān"],
            "descending": ["kurdān", "awj", "ḥusaynī", "nawā", "chahargāh", "segāh", "dūgāh", "rāst"]
        }
    ]
}"#;

pub fn catalogue() -> Catalogue {
    Catalogue::from_json_str(CATALOGUE).expect("test catalogue")
}

pub fn pythagorean() -> Lattice {
    let catalogue = catalogue();
    let tuning = catalogue.tuning_system("pythagorean_yegah").expect("pythagorean tuning");
    build_lattice_for(tuning, "yegāh")
}

pub fn neutral() -> Lattice {
    let catalogue = catalogue();
    let tuning = catalogue.tuning_system("neutral_yegah").expect("neutral tuning");
    build_lattice_for(tuning, "yegāh")
}

/// The transposition of `maqam` starting on `tonic`
pub fn maqam_on(catalogue: &Catalogue, lattice: &Lattice, maqam: &str, tonic: &str) -> MaqamTransposition {
    let template = catalogue.maqam(maqam).expect("maqam in catalogue");
    maqamat::maqam_transpositions(lattice, template, &catalogue.ajnas, &MatchOptions::default())
        .into_iter()
        .find(|t| t.tonic() == tonic)
        .unwrap_or_else(|| panic!("{} has no transposition on {}", maqam, tonic))
}
