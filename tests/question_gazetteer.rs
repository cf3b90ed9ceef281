// tests/question_gazetteer.rs
use newsbot::question::ner::{EntityCategory, Gazetteer};
use newsbot::question::select::FixedSelector;
use newsbot::question::{QuestionSynthesizer, QuestionType, Tier};
use std::path::PathBuf;

fn shipped() -> Gazetteer {
    Gazetteer::from_dir(&PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/ner"))
}

#[test]
fn shipped_patterns_load() {
    assert!(!shipped().is_empty());
}

#[test]
fn gazetteer_match_claims_its_span() {
    let ents = shipped().extract("The Federal Reserve held rates steady on Wednesday.");
    assert_eq!(ents.len(), 1);
    assert_eq!(ents[0].text, "Federal Reserve");
    assert_eq!(ents[0].category, EntityCategory::Organization);
    assert_eq!(ents[0].keyword.as_deref(), Some("central bank"));
}

#[test]
fn gazetteer_entities_drive_the_question() {
    let q = QuestionSynthesizer::new(QuestionType::default_set(), shipped());
    let out = q.synthesize_detailed(
        "Delegates at COP28 argued over the final text.",
        &mut FixedSelector(0),
    );
    assert_eq!(out.tier, Tier::Entity);
    assert!(out.text.contains("COP28"), "{}", out.text);
    assert!(out.text.ends_with('?'));
}
