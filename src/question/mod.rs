// src/question/mod.rs
//! Discussion-question synthesis.
//!
//! Three tiers, the first with data wins: a named entity fills a
//! category template, else a common noun fills a question-type template, else
//! a generic prompt is chosen. All choices go through a [`Selector`].

pub mod ner;
pub mod nouns;
pub mod select;

use serde::{Deserialize, Serialize};

use self::ner::{Entity, EntityCategory, Gazetteer};
use self::select::{choose, Selector};

/// Placeholder replaced by the entity text or noun.
const SLOT: &str = "{x}";

const PERSON_TEMPLATES: &[&str] = &[
    "What role did {x} play in this situation?",
    "Why is {x} significant in this context?",
    "How might {x}'s actions impact future developments?",
];

const ORGANIZATION_TEMPLATES: &[&str] = &[
    "What are the implications of {x}'s involvement?",
    "How might {x}'s position evolve in the future?",
    "Why is {x}'s role important in this context?",
];

const PLACE_TEMPLATES: &[&str] = &[
    "How might these developments affect {x}?",
    "What are the broader implications for {x}?",
    "Why is {x} significant in this situation?",
];

const EVENT_TEMPLATES: &[&str] = &[
    "What might be the long-term consequences of {x}?",
    "How could {x} shape future developments?",
    "Why is {x} considered significant?",
];

const OTHER_TEMPLATES: &[&str] = &[
    "What makes {x} significant in this context?",
    "How might {x} influence future developments?",
    "Why is {x} important to consider?",
];

const WHAT_TEMPLATES: &[&str] = &[
    "What are the broader implications of this {x}?",
    "What might be the next developments in this {x}?",
    "What do you think about this {x}?",
];

const WHY_TEMPLATES: &[&str] = &[
    "Why is this {x} significant?",
    "Why might this {x} matter in the long run?",
    "Why should we pay attention to this {x}?",
];

const HOW_TEMPLATES: &[&str] = &[
    "How might this {x} affect future developments?",
    "How could this {x} change our understanding?",
    "How do you see this {x} evolving?",
];

const YES_NO_TEMPLATES: &[&str] = &[
    "Do you think this {x} will have lasting impact?",
    "Is this {x} as important as it seems?",
    "Could this {x} lead to significant changes?",
];

/// Context-free prompts used when the text offers nothing to anchor on.
pub const GENERIC_PROMPTS: &[&str] = &[
    "What do you think about this development?",
    "How might this news impact the broader context?",
    "Why is this news significant?",
    "What could be the long-term implications?",
    "How might this situation evolve in the future?",
    "Do you see this as a positive or negative development?",
    "What other factors might be influencing this situation?",
    "How does this compare to similar situations in the past?",
    "What questions does this raise for you?",
    "What might be missing from this story?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    What,
    Why,
    How,
    YesNo,
}

impl QuestionType {
    fn templates(self) -> &'static [&'static str] {
        match self {
            Self::What => WHAT_TEMPLATES,
            Self::Why => WHY_TEMPLATES,
            Self::How => HOW_TEMPLATES,
            Self::YesNo => YES_NO_TEMPLATES,
        }
    }

    pub fn default_set() -> Vec<QuestionType> {
        vec![Self::What, Self::Why, Self::How]
    }
}

fn category_templates(cat: EntityCategory) -> &'static [&'static str] {
    match cat {
        EntityCategory::Person => PERSON_TEMPLATES,
        EntityCategory::Organization => ORGANIZATION_TEMPLATES,
        EntityCategory::Place => PLACE_TEMPLATES,
        EntityCategory::Event => EVENT_TEMPLATES,
        EntityCategory::Product | EntityCategory::CreativeWork | EntityCategory::Misc => {
            OTHER_TEMPLATES
        }
    }
}

/// Which tier produced a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Entity,
    Noun,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub tier: Tier,
}

pub struct QuestionSynthesizer {
    question_types: Vec<QuestionType>,
    gazetteer: Gazetteer,
}

impl Default for QuestionSynthesizer {
    fn default() -> Self {
        Self::new(QuestionType::default_set(), Gazetteer::empty())
    }
}

impl QuestionSynthesizer {
    /// An empty `question_types` list falls back to what/why/how.
    pub fn new(question_types: Vec<QuestionType>, gazetteer: Gazetteer) -> Self {
        let question_types = if question_types.is_empty() {
            QuestionType::default_set()
        } else {
            question_types
        };
        Self {
            question_types,
            gazetteer,
        }
    }

    /// One question about `text`, always ending in `?`.
    pub fn synthesize(&self, text: &str, sel: &mut dyn Selector) -> String {
        self.synthesize_detailed(text, sel).text
    }

    pub fn synthesize_detailed(&self, text: &str, sel: &mut dyn Selector) -> Question {
        let q = self
            .from_entities(text, sel)
            .or_else(|| self.from_nouns(text, sel))
            .unwrap_or_else(|| Question {
                text: choose(sel, GENERIC_PROMPTS)
                    .copied()
                    .unwrap_or(GENERIC_PROMPTS[0])
                    .to_string(),
                tier: Tier::Generic,
            });
        tracing::debug!(target: "question", tier = ?q.tier, question = %q.text, "question synthesized");
        q
    }

    fn from_entities(&self, text: &str, sel: &mut dyn Selector) -> Option<Question> {
        let entities = self.gazetteer.extract(text);
        let salient: Vec<&Entity> = entities.iter().filter(|e| e.category.is_salient()).collect();
        let pool: Vec<&Entity> = if salient.is_empty() {
            entities.iter().collect()
        } else {
            salient
        };
        let entity = *choose(sel, &pool)?;
        let template = choose(sel, category_templates(entity.category))?;
        Some(Question {
            text: fill(template, &entity.text),
            tier: Tier::Entity,
        })
    }

    fn from_nouns(&self, text: &str, sel: &mut dyn Selector) -> Option<Question> {
        let nouns = nouns::extract_nouns(text);
        let noun = choose(sel, &nouns)?;
        let qtype = *choose(sel, &self.question_types)?;
        let template = choose(sel, qtype.templates())?;
        Some(Question {
            text: fill(template, noun),
            tier: Tier::Noun,
        })
    }
}

fn fill(template: &str, value: &str) -> String {
    template.replace(SLOT, value)
}
