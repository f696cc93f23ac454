use std::collections::BTreeSet;

use uuid::Uuid;

use crate::models::enums::{CheckStatus, InteractionSeverity, WarningSeverity, WarningType};
use crate::models::{Drug, DrugRef, Interaction, Patient};

use super::helpers::contains_any;
use super::messages::MessageTemplates;
use super::reference::{HIGH_RISK_DUPLICATE_CLASSES, LOW_RISK_DUPLICATE_CLASSES};
use super::types::{DuplicateTherapy, InteractionMatch, PairInteraction, PrescriptionCheck, Warning};

/// Active medications plus the candidate, as distinct drug ids.
pub fn effective_medication_set(patient: &Patient, candidate: &Drug) -> BTreeSet<Uuid> {
    patient
        .active_medications
        .iter()
        .map(|d| d.id)
        .chain(std::iter::once(candidate.id))
        .collect()
}

/// Interaction rules fully contained in `effective`, with lower-order rules
/// suppressed when an accepted rule's drug set strictly contains theirs.
///
/// Rules are evaluated largest first regardless of input order. Fewer than
/// two effective drugs never match anything.
pub fn match_interactions(effective: &BTreeSet<Uuid>, rules: &[Interaction]) -> Vec<InteractionMatch> {
    if effective.len() < 2 {
        return Vec::new();
    }

    let mut candidates: Vec<(BTreeSet<Uuid>, &Interaction)> = rules
        .iter()
        .map(|rule| (rule.drug_ids(), rule))
        .filter(|(ids, _)| ids.len() >= 2 && ids.len() <= effective.len())
        .collect();
    // Stable: ties keep the store's order.
    candidates.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut accepted: Vec<BTreeSet<Uuid>> = Vec::new();
    let mut matches = Vec::new();
    for (ids, rule) in candidates {
        if !ids.is_subset(effective) {
            continue;
        }
        if accepted.iter().any(|prev| prev.is_superset(&ids) && prev.len() > ids.len()) {
            tracing::debug!(interaction = %rule.name, "suppressed by higher-order interaction");
            continue;
        }
        matches.push(InteractionMatch {
            interaction_id: rule.id,
            name: rule.name.clone(),
            description: rule.description.clone(),
            severity: rule.severity,
            drugs: rule.drugs.clone(),
        });
        accepted.push(ids);
    }
    matches
}

pub fn interaction_warning(m: &InteractionMatch) -> Warning {
    let names: Vec<String> = m.drugs.iter().map(|d| d.name.clone()).collect();
    Warning {
        warning_type: WarningType::MultiDrugInteraction,
        severity: m.severity.warning_severity(),
        message: MessageTemplates::interaction(&m.name, &names, &m.description),
        allergen: None,
        drugs_involved: m.drugs.clone(),
        interaction_severity: Some(m.severity),
    }
}

/// Interaction warnings for adding `candidate` to the patient's regimen.
pub fn check_interactions(patient: &Patient, candidate: &Drug, rules: &[Interaction]) -> Vec<Warning> {
    let effective = effective_medication_set(patient, candidate);
    match_interactions(&effective, rules)
        .iter()
        .map(interaction_warning)
        .collect()
}

/// Risk in [0, 1] of the most severe match, 0.0 when nothing matched.
pub fn max_interaction_risk(matches: &[InteractionMatch]) -> f64 {
    matches
        .iter()
        .map(|m| m.severity.risk())
        .fold(0.0, f64::max)
}

pub fn most_severe(matches: &[InteractionMatch]) -> Option<InteractionSeverity> {
    matches.iter().map(|m| m.severity).max()
}

// ─── Prescription list ───

/// Duplicate-therapy severity by class keyword.
pub fn duplicate_therapy_severity(class: &str) -> WarningSeverity {
    let lower = class.to_lowercase();
    if contains_any(&lower, HIGH_RISK_DUPLICATE_CLASSES) {
        WarningSeverity::High
    } else if contains_any(&lower, LOW_RISK_DUPLICATE_CLASSES) {
        WarningSeverity::Low
    } else {
        WarningSeverity::Moderate
    }
}

/// Pairwise two-drug interactions and same-class duplicates within a list.
/// `drugs` is taken in the caller's order; repeated ids are checked once.
pub fn check_prescription_list(drugs: &[Drug], rules: &[Interaction]) -> PrescriptionCheck {
    let mut unique: Vec<&Drug> = Vec::new();
    for drug in drugs {
        if !unique.iter().any(|d| d.id == drug.id) {
            unique.push(drug);
        }
    }
    if unique.len() < 2 {
        return PrescriptionCheck::empty();
    }

    let pair_rules: Vec<(BTreeSet<Uuid>, &Interaction)> = rules
        .iter()
        .map(|r| (r.drug_ids(), r))
        .filter(|(ids, _)| ids.len() == 2)
        .collect();

    let mut interactions = Vec::new();
    for (i, first) in unique.iter().enumerate() {
        for second in unique.iter().skip(i + 1) {
            let pair: BTreeSet<Uuid> = [first.id, second.id].into_iter().collect();
            for (_, rule) in pair_rules.iter().filter(|(ids, _)| *ids == pair) {
                interactions.push(PairInteraction {
                    medication1_id: first.id,
                    medication1_name: first.name.clone(),
                    medication2_id: second.id,
                    medication2_name: second.name.clone(),
                    interaction_name: rule.name.clone(),
                    severity: rule.severity,
                    description: rule.description.clone(),
                });
            }
        }
    }

    // Group by trimmed class, case-insensitively, in first-seen order.
    let mut groups: Vec<(String, Vec<DrugRef>)> = Vec::new();
    for drug in &unique {
        let Some(class) = drug.therapeutic_class.as_deref().map(str::trim) else {
            continue;
        };
        if class.is_empty() {
            continue;
        }
        match groups.iter_mut().find(|(c, _)| c.eq_ignore_ascii_case(class)) {
            Some((_, members)) => members.push(drug.reference()),
            None => groups.push((class.to_string(), vec![drug.reference()])),
        }
    }
    let duplicate_therapy: Vec<DuplicateTherapy> = groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(class, medications)| DuplicateTherapy {
            severity: duplicate_therapy_severity(&class),
            description: MessageTemplates::duplicate_therapy(&class),
            therapeutic_class: class,
            medications,
        })
        .collect();

    let status = if interactions.is_empty() && duplicate_therapy.is_empty() {
        CheckStatus::Ok
    } else {
        CheckStatus::Conflict
    };
    PrescriptionCheck {
        status,
        interactions,
        duplicate_therapy,
    }
}
