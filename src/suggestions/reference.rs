//! Curated condition vocabularies used by the suggestion scorers.
//!
//! Everything here is keyword policy: plain tables, matched by lowercase
//! substring, no inference.

use crate::models::Drug;

// ─── Description-similarity expansion ───

/// Condition keyword → extra terms appended before vectorisation.
pub const CONDITION_EXPANSIONS: &[(&str, &str)] = &[
    ("headache", "headache pain head ache migraine tension analgesic"),
    ("pain", "pain ache sore hurt discomfort analgesic painkiller"),
    ("fever", "fever temperature pyrexia hot antipyretic"),
    ("infection", "infection bacterial viral microbial antibiotic"),
    ("hypertension", "hypertension high blood pressure bp antihypertensive"),
    ("diabetes", "diabetes diabetic sugar glucose antidiabetic"),
    ("anxiety", "anxiety anxious stress nervous anxiolytic"),
    ("depression", "depression depressed mood sad antidepressant"),
    ("nausea", "nausea nauseous sick vomiting antiemetic"),
    ("dizziness", "dizziness dizzy vertigo antivertigo"),
    ("fatigue", "fatigue tired exhaustion weak stimulant"),
    ("inflammation", "inflammation inflammatory swelling anti-inflammatory"),
    ("cough", "cough coughing throat respiratory antitussive"),
    ("cold", "cold flu influenza respiratory decongestant"),
    ("allergy", "allergy allergic reaction hypersensitivity antihistamine"),
];

/// Suffix cues that pull in generic pain-relief vocabulary.
const PAIN_CUES: &[&str] = &["ache", "pain", "itis", "osis"];
const PAIN_TERMS: &[&str] = &["analgesic", "painkiller", "anti-inflammatory"];

/// Common English words dropped before term-frequency vectorisation.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "before", "but", "by", "can", "daily", "do", "during", "each", "every", "for", "from", "has",
    "have", "if", "in", "into", "is", "it", "its", "may", "more", "most", "no", "not", "of", "on",
    "once", "or", "other", "per", "should", "some", "such", "than", "that", "the", "their", "them",
    "then", "there", "these", "they", "this", "to", "twice", "up", "very", "was", "were", "when",
    "which", "while", "who", "will", "with", "within", "without", "you", "your",
];

/// The condition text followed by the expansion terms it triggers.
pub fn expand_condition(condition: &str) -> String {
    let lower = condition.to_lowercase();
    let mut parts = vec![condition.to_string()];
    for (key, terms) in CONDITION_EXPANSIONS {
        if lower.contains(key) {
            parts.push((*terms).to_string());
        }
    }
    if PAIN_CUES.iter().any(|cue| lower.contains(cue)) {
        parts.extend(PAIN_TERMS.iter().map(|t| t.to_string()));
    }
    parts.join(" ")
}

// ─── Keyword/semantic expansion ───

/// Larger condition → related-term table for the keyword/semantic scorer.
pub const SEMANTIC_MAPPINGS: &[(&str, &[&str])] = &[
    ("headache", &["migraine", "tension", "cluster", "pain", "analgesic", "acetaminophen", "ibuprofen", "aspirin"]),
    ("fever", &["fever", "temperature", "pyrexia", "antipyretic", "acetaminophen", "ibuprofen"]),
    ("pain", &["pain", "ache", "analgesic", "acetaminophen", "ibuprofen", "morphine", "tramadol"]),
    ("infection", &["infection", "bacterial", "viral", "antibiotic", "antimicrobial", "amoxicillin", "penicillin"]),
    ("hypertension", &["hypertension", "blood pressure", "cardiovascular", "antihypertensive", "amlodipine", "lisinopril"]),
    ("diabetes", &["diabetes", "diabetic", "glucose", "insulin", "metformin", "antidiabetic"]),
    ("anxiety", &["anxiety", "anxiolytic", "stress", "alprazolam", "lorazepam", "diazepam"]),
    ("depression", &["depression", "antidepressant", "mood", "fluoxetine", "sertraline", "citalopram"]),
    ("asthma", &["asthma", "respiratory", "bronchodilator", "albuterol", "inhaler", "breathing"]),
    ("allergy", &["allergy", "antihistamine", "allergic", "diphenhydramine", "loratadine", "cetirizine"]),
    ("nausea", &["nausea", "vomiting", "antiemetic", "ondansetron", "metoclopramide"]),
    ("cough", &["cough", "antitussive", "dextromethorphan", "codeine", "respiratory"]),
    ("inflammation", &["inflammation", "anti-inflammatory", "ibuprofen", "naproxen", "corticosteroid"]),
];

/// Lowercased condition followed by every related term it triggers.
pub fn expand_semantic(condition: &str) -> String {
    let mut expanded = condition.to_lowercase();
    let lower = expanded.clone();
    for (key, terms) in SEMANTIC_MAPPINGS {
        if lower.contains(key) {
            expanded.push(' ');
            expanded.push_str(&terms.join(" "));
        }
    }
    expanded
}

// ─── Condition profiles ───

/// How a condition relates to drug classes and well-known drug names.
pub struct ConditionProfile {
    /// Any of these in the condition text selects the profile.
    pub triggers: &'static [&'static str],
    /// Therapeutic-class fragments that make a drug a strong match.
    pub strong_classes: &'static [&'static str],
    /// Drug-name fragments that make a drug a strong match.
    pub strong_names: &'static [&'static str],
    /// Therapeutic-class fragment for a partial match.
    pub partial_class: &'static str,
    /// Reasoning prefix for a strong match, followed by the drug's class.
    pub strong_reason: &'static str,
    pub partial_reason: &'static str,
}

/// Checked in order; the first profile whose trigger appears wins.
pub const CONDITION_PROFILES: &[ConditionProfile] = &[
    ConditionProfile {
        triggers: &["headache", "migraine"],
        strong_classes: &["analgesic"],
        strong_names: &["acetaminophen", "ibuprofen", "aspirin"],
        partial_class: "pain",
        strong_reason: "Recommended for headache relief",
        partial_reason: "Pain management medication suitable for headaches",
    },
    ConditionProfile {
        triggers: &["fever"],
        strong_classes: &["antipyretic"],
        strong_names: &["acetaminophen", "ibuprofen"],
        partial_class: "analgesic",
        strong_reason: "Fever reducer",
        partial_reason: "Analgesic with antipyretic properties for fever",
    },
    ConditionProfile {
        triggers: &["pain"],
        strong_classes: &["analgesic"],
        strong_names: &["acetaminophen", "ibuprofen", "morphine", "tramadol"],
        partial_class: "pain",
        strong_reason: "Pain relief medication",
        partial_reason: "Effective pain management drug",
    },
    ConditionProfile {
        triggers: &["diabetes"],
        strong_classes: &["antidiabetic"],
        strong_names: &["metformin", "insulin", "glipizide"],
        partial_class: "glucose",
        strong_reason: "Diabetes management medication",
        partial_reason: "Glucose control medication for diabetes",
    },
    ConditionProfile {
        triggers: &["hypertension", "blood pressure"],
        strong_classes: &["antihypertensive"],
        strong_names: &["amlodipine", "lisinopril", "losartan"],
        partial_class: "cardiovascular",
        strong_reason: "Blood pressure medication",
        partial_reason: "Cardiovascular medication for hypertension",
    },
    ConditionProfile {
        triggers: &["anxiety"],
        strong_classes: &["anxiolytic"],
        strong_names: &["alprazolam", "lorazepam", "diazepam"],
        partial_class: "anxiety",
        strong_reason: "Anxiety medication",
        partial_reason: "Anti-anxiety medication",
    },
    ConditionProfile {
        triggers: &["depression"],
        strong_classes: &["antidepressant"],
        strong_names: &["fluoxetine", "sertraline", "citalopram"],
        partial_class: "ssri",
        strong_reason: "Antidepressant medication",
        partial_reason: "SSRI antidepressant for depression",
    },
    ConditionProfile {
        triggers: &["asthma", "breathing"],
        strong_classes: &["bronchodilator"],
        strong_names: &["albuterol", "formoterol"],
        partial_class: "respiratory",
        strong_reason: "Respiratory medication for asthma",
        partial_reason: "Respiratory medication for breathing issues",
    },
    ConditionProfile {
        triggers: &["allergy"],
        strong_classes: &["antihistamine"],
        strong_names: &["diphenhydramine", "loratadine", "cetirizine"],
        partial_class: "allergic",
        strong_reason: "Allergy medication",
        partial_reason: "Anti-allergy medication",
    },
    ConditionProfile {
        triggers: &["infection"],
        strong_classes: &["antibiotic"],
        strong_names: &["amoxicillin", "penicillin", "clarithromycin"],
        partial_class: "antimicrobial",
        strong_reason: "Antibiotic for infection",
        partial_reason: "Antimicrobial medication for infection",
    },
];

/// Classes that are off-target for any condition outside their own area.
pub const SPECIALIST_CLASSES: &[&str] = &[
    "antihypertensive",
    "antidiabetic",
    "anxiolytic",
    "antidepressant",
    "bronchodilator",
    "antihistamine",
    "antibiotic",
];

pub const STRONG_RELEVANCE: f64 = 1.5;
pub const PARTIAL_RELEVANCE: f64 = 1.2;
pub const NEUTRAL_RELEVANCE: f64 = 1.0;
pub const OFF_TARGET_RELEVANCE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileMatch {
    Strong,
    Partial,
    None,
}

pub fn condition_profile(condition_lower: &str) -> Option<&'static ConditionProfile> {
    CONDITION_PROFILES
        .iter()
        .find(|p| p.triggers.iter().any(|t| condition_lower.contains(t)))
}

impl ConditionProfile {
    pub fn classify(&self, drug: &Drug) -> ProfileMatch {
        let class = drug.class_lower();
        let name = drug.name.to_lowercase();
        if self.strong_classes.iter().any(|c| class.contains(c))
            || self.strong_names.iter().any(|n| name.contains(n))
        {
            ProfileMatch::Strong
        } else if class.contains(self.partial_class) {
            ProfileMatch::Partial
        } else {
            ProfileMatch::None
        }
    }
}

/// Relevance multiplier for the safety-optimized scorer.
///
/// A known condition scores its profile match; a drug matching neither
/// tier of a known condition is off-target. For unrecognised conditions
/// only specialist classes are marked off-target.
pub fn condition_relevance(drug: &Drug, condition: &str) -> f64 {
    match condition_profile(&condition.to_lowercase()) {
        Some(profile) => match profile.classify(drug) {
            ProfileMatch::Strong => STRONG_RELEVANCE,
            ProfileMatch::Partial => PARTIAL_RELEVANCE,
            ProfileMatch::None => OFF_TARGET_RELEVANCE,
        },
        None => {
            let class = drug.class_lower();
            if SPECIALIST_CLASSES.iter().any(|c| class.contains(c)) {
                OFF_TARGET_RELEVANCE
            } else {
                NEUTRAL_RELEVANCE
            }
        }
    }
}

/// Reasoning line for a description-similarity match.
pub fn condition_reasoning(condition: &str, drug: &Drug) -> String {
    let label = drug
        .therapeutic_class
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| drug.category.to_lowercase());

    if let Some(profile) = condition_profile(&condition.to_lowercase()) {
        match profile.classify(drug) {
            ProfileMatch::Strong => return format!("{} - {label}", profile.strong_reason),
            ProfileMatch::Partial => return profile.partial_reason.to_string(),
            ProfileMatch::None => {}
        }
    }
    format!("Content-based match for {condition} - {label}")
}

// ─── Contextual boost ───

/// Chronic condition in history → class/name terms that treat it.
pub const CONTEXTUAL_BOOSTS: &[(&str, &[&str])] = &[
    ("diabetes", &["antidiabetic", "insulin", "metformin", "glucose", "diabetic"]),
    ("hypertension", &["antihypertensive", "ace inhibitor", "beta blocker", "calcium channel blocker"]),
    ("heart", &["cardiac", "cardiovascular", "heart", "cardio", "beta blocker", "ace inhibitor"]),
    ("asthma", &["bronchodilator", "respiratory", "asthma", "inhaler", "corticosteroid"]),
    ("copd", &["bronchodilator", "respiratory", "copd", "inhaler", "corticosteroid"]),
    ("depression", &["antidepressant", "ssri", "mood", "mental health"]),
    ("anxiety", &["anxiolytic", "anxiety", "mental health", "benzodiazepine"]),
];

/// Multiplier for a contextual match: `1.15 + 0.05 × term_list_length`.
pub fn contextual_boost_factor(term_count: usize) -> f64 {
    1.15 + 0.05 * term_count as f64
}

/// Chronic conditions counted toward patient complexity when weighting methods.
pub const WEIGHTING_CHRONIC_CONDITIONS: &[&str] = &[
    "diabetes",
    "hypertension",
    "heart",
    "kidney",
    "liver",
    "asthma",
    "copd",
];
