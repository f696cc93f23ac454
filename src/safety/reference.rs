//! Curated keyword tables used by the safety checks and the safety score.
//!
//! These are lookup tables, not inferred knowledge: each entry is matched
//! case-insensitively as a substring against free text.

/// A cross-reactivity family: allergen names that trigger it, and drug name
/// fragments that belong to it.
pub struct AllergyFamily {
    pub label: &'static str,
    pub allergens: &'static [&'static str],
    pub members: &'static [&'static str],
}

pub const ALLERGY_FAMILIES: &[AllergyFamily] = &[
    AllergyFamily {
        label: "penicillin",
        allergens: &["penicillin"],
        members: &["amoxicillin", "ampicillin", "penicillin", "benzylpenicillin"],
    },
    AllergyFamily {
        label: "NSAID",
        allergens: &["aspirin", "nsaid"],
        members: &["ibuprofen", "naproxen", "diclofenac", "aspirin", "nsaid"],
    },
    AllergyFamily {
        label: "sulfonamide",
        allergens: &["sulfa", "sulfonamide"],
        members: &["sulfamethoxazole", "sulfasalazine", "sulfadiazine", "sulfisoxazole"],
    },
];

/// Condition keywords → the drug category expected to treat them. First match wins.
pub const EXPECTED_CATEGORIES: &[(&[&str], &str)] = &[
    (&["headache", "migraine", "pain"], "analgesic"),
    (&["fever"], "antipyretic"),
    (&["diabetes", "diabetic"], "antidiabetic"),
    (&["hypertension", "blood pressure"], "antihypertensive"),
    (&["anxiety"], "antianxiety"),
    (&["depression"], "antidepressant"),
    (&["asthma", "breathing"], "bronchodilator"),
    (&["allergy", "allergic"], "antihistamine"),
    (&["infection", "bacterial"], "antibiotic"),
    (&["viral"], "antiviral"),
    (&["inflammation"], "anti-inflammatory"),
    (&["cough"], "antitussive"),
    (&["nausea", "vomiting"], "antiemetic"),
];

/// Comorbidity keyword and the multiplier applied when both the patient
/// history and the drug contraindications mention it.
pub const COMORBIDITY_PENALTIES: &[(&str, f64)] = &[
    ("liver", 0.3),
    ("kidney", 0.4),
    ("heart", 0.5),
    ("diabetes", 0.7),
    ("hypertension", 0.8),
];

pub const SEVERE_SIDE_EFFECT_KEYWORDS: &[&str] = &["severe", "serious", "life-threatening", "fatal"];

pub const MODERATE_SIDE_EFFECT_KEYWORDS: &[&str] = &["moderate", "significant", "common"];

/// Chronic conditions counted toward patient complexity.
pub const CHRONIC_CONDITIONS: &[&str] = &[
    "diabetes",
    "hypertension",
    "heart",
    "kidney",
    "liver",
    "asthma",
    "copd",
];

/// Duplicate-therapy severity policy. This is a prescribing policy table,
/// not something derived from the catalog.
pub const HIGH_RISK_DUPLICATE_CLASSES: &[&str] = &["antibiotic", "anticoagulant", "antidepressant"];
pub const LOW_RISK_DUPLICATE_CLASSES: &[&str] = &["vitamin", "supplement"];

pub const PEDIATRIC_AGE_LIMIT: u32 = 18;
pub const GERIATRIC_AGE_LIMIT: u32 = 65;

/// Symptom families recognised in condition text.
pub const SYMPTOM_KEYWORDS: &[(&str, &[&str])] = &[
    ("pain", &["pain", "ache", "sore", "tender"]),
    ("fever", &["fever", "temperature", "hot", "burning"]),
    ("nausea", &["nausea", "sick", "vomit", "queasy"]),
    ("fatigue", &["tired", "exhausted", "weak", "fatigue"]),
    ("headache", &["headache", "head pain", "migraine"]),
    ("cough", &["cough", "coughing", "hack"]),
    ("shortness of breath", &["breath", "breathing", "wheeze", "asthma"]),
];

/// Body-system categories recognised in condition text. First match wins.
pub const CONDITION_CATEGORIES: &[(&str, &[&str])] = &[
    ("cardiovascular", &["heart", "blood pressure", "chest", "cardiac"]),
    ("respiratory", &["breath", "lung", "cough", "asthma", "respiratory"]),
    ("neurological", &["headache", "migraine", "seizure", "neurological"]),
    ("gastrointestinal", &["stomach", "nausea", "vomit", "digestive", "gut"]),
    ("musculoskeletal", &["pain", "joint", "muscle", "bone", "back"]),
    ("infectious", &["infection", "fever", "viral", "bacterial"]),
];

/// Severity cues in condition text, checked severe first.
pub const SEVERE_CONDITION_KEYWORDS: &[&str] = &[
    "severe", "acute", "intense", "excruciating", "unbearable", "worst", "emergency",
];
pub const MILD_CONDITION_KEYWORDS: &[&str] = &["mild", "slight", "minor", "occasional"];

/// Expected drug category for a condition, if any keyword matches.
pub fn expected_category(condition_lower: &str) -> Option<&'static str> {
    EXPECTED_CATEGORIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| condition_lower.contains(k)))
        .map(|(_, category)| *category)
}
