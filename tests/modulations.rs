use maqamat::family::FamilySource;
use maqamat::{
    analyze_jins_modulations, analyze_maqam_modulations, analyze_modulations, classify_family, MatchOptions,
    ModulationCategory, ModulationSet, ModulationTarget,
};

mod common;

fn names(set: &ModulationSet, category: ModulationCategory) -> Vec<&str> {
    set.get(category).iter().map(ModulationTarget::name).collect()
}

#[test]
fn test_kurd_modulations() {
    let _ = env_logger::try_init();

    let catalogue = common::catalogue();
    let lattice = common::pythagorean();
    let kurd = common::maqam_on(&catalogue, &lattice, "maqam_kurd", "dūgāh");

    let set = analyze_modulations(&kurd, &catalogue, &lattice, &MatchOptions::default());

    assert_eq!(
        names(&set, ModulationCategory::FirstDegree),
        ["jins kurd", "jins nahāwand al-dūgāh", "nahāwand"]
    );
    assert_eq!(
        names(&set, ModulationCategory::ThirdDegree),
        [
            "jins kurd al-chahargāh",
            "jins nahāwand al-chahargāh",
            "jins ʿajam al-chahargāh",
            "kurd al-chahargāh",
            "nahāwand al-chahargāh"
        ]
    );
    assert_eq!(
        names(&set, ModulationCategory::FourthDegree),
        [
            "jins kurd al-nawā",
            "jins nahāwand al-nawā",
            "jins ʿajam al-nawā",
            "kurd al-nawā",
            "nahāwand al-nawā"
        ]
    );
    assert_eq!(
        names(&set, ModulationCategory::FifthDegree),
        ["jins kurd al-ḥusaynī", "jins nahāwand al-ḥusaynī", "kurd al-ḥusaynī"]
    );

    let sixth = ["jins nahāwand al-ʿajam", "jins ʿajam al-ʿajam", "nahāwand al-ʿajam"];
    assert_eq!(names(&set, ModulationCategory::SixthDegreeAsc), sixth);
    assert_eq!(names(&set, ModulationCategory::SixthDegreeDesc), sixth);

    // a usable third rules out both fallbacks
    assert!(set.get(ModulationCategory::AltThirdDegree).is_empty());
    assert!(set.get(ModulationCategory::SixthDegreeIfNoThird).is_empty());
    assert_eq!(set.alt_third_note_name.as_deref(), Some("buselīk/ʿushshāq"));

    assert_eq!(set.len(), 22);
    assert_eq!(set.iter().count(), set.len());
}

#[test]
fn test_source_is_never_its_own_modulation() {
    let catalogue = common::catalogue();
    let lattice = common::pythagorean();
    let kurd = common::maqam_on(&catalogue, &lattice, "maqam_kurd", "dūgāh");

    let set = analyze_maqam_modulations(&kurd, &catalogue, &lattice, &MatchOptions::default());
    assert!(set
        .iter()
        .filter_map(|(_, target)| target.as_maqam())
        .all(|m| m.ascending_note_names() != kurd.ascending_note_names()));
    assert!(set.iter().all(|(_, target)| target.template_id() != "maqam_kurd" || target.tonic() != "dūgāh"));
}

#[test]
fn test_kinds_are_analyzed_separately() {
    let catalogue = common::catalogue();
    let lattice = common::pythagorean();
    let options = MatchOptions::default();
    let nahawand = common::maqam_on(&catalogue, &lattice, "maqam_nahawand", "dūgāh");

    let ajnas = analyze_jins_modulations(&nahawand, &catalogue, &lattice, &options);
    let maqamat = analyze_maqam_modulations(&nahawand, &catalogue, &lattice, &options);
    let all = analyze_modulations(&nahawand, &catalogue, &lattice, &options);

    assert!(ajnas.iter().all(|(_, t)| matches!(t, ModulationTarget::Jins(_))));
    assert!(maqamat.iter().all(|(_, t)| matches!(t, ModulationTarget::Maqam(_))));
    assert_eq!(all.len(), ajnas.len() + maqamat.len());

    for category in ModulationCategory::ALL {
        let combined = all.get(category);
        let split = ajnas.get(category).len();
        assert_eq!(&combined[..split], ajnas.get(category), "{category}");
        assert_eq!(&combined[split..], maqamat.get(category), "{category}");
    }

    // kurd on dūgāh is a first-degree modulation from nahāwand on dūgāh
    assert!(maqamat
        .get(ModulationCategory::FirstDegree)
        .iter()
        .any(|t| t.template_id() == "maqam_kurd"));
}

#[test]
fn test_neutral_rast_modulations() {
    let catalogue = common::catalogue();
    let lattice = common::neutral();
    let rast = common::maqam_on(&catalogue, &lattice, "maqam_rast", "rāst");

    let set = analyze_modulations(&rast, &catalogue, &lattice, &MatchOptions::default());

    assert_eq!(names(&set, ModulationCategory::FirstDegree), ["jins rāst"]);
    assert_eq!(names(&set, ModulationCategory::ThirdDegree), ["jins sīkāh"]);
    assert_eq!(names(&set, ModulationCategory::FifthDegree), ["jins rāst al-nawā"]);
    assert!(set.get(ModulationCategory::FourthDegree).is_empty());
    assert!(set.get(ModulationCategory::SixthDegreeAsc).is_empty());
    assert_eq!(set.len(), 3);
}

#[test]
fn test_modulation_set_serializes_by_category() {
    let catalogue = common::catalogue();
    let lattice = common::pythagorean();
    let kurd = common::maqam_on(&catalogue, &lattice, "maqam_kurd", "dūgāh");

    let set = analyze_modulations(&kurd, &catalogue, &lattice, &MatchOptions::default());
    let json = serde_json::to_value(&set).unwrap();

    assert_eq!(json["firstDegree"][0]["type"], "jins");
    assert_eq!(json["firstDegree"][2]["type"], "maqam");
    assert_eq!(json["firstDegree"][2]["name"], "nahāwand");
    assert_eq!(json["altThirdNoteName"], "buselīk/ʿushshāq");
    assert_eq!(json["sixthDegreeIfNoThird"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_families() {
    let catalogue = common::catalogue();
    let lattice = common::pythagorean();

    let kurd = classify_family(&common::maqam_on(&catalogue, &lattice, "maqam_kurd", "dūgāh"));
    assert_eq!(kurd.family, "kurd");
    assert_eq!(kurd.jins_name.as_deref(), Some("jins kurd"));
    assert_eq!(kurd.source, FamilySource::Ascending);

    let nahawand = classify_family(&common::maqam_on(&catalogue, &lattice, "maqam_nahawand", "dūgāh"));
    assert_eq!(nahawand.family, "nahāwand");
    assert_eq!(nahawand.jins_name.as_deref(), Some("jins nahāwand al-dūgāh"));

    // transposing keeps the family
    let on_nawa = classify_family(&common::maqam_on(&catalogue, &lattice, "maqam_kurd", "nawā"));
    assert_eq!(on_nawa.family, "kurd");
    assert_eq!(on_nawa.jins_name.as_deref(), Some("jins kurd al-nawā"));
}
