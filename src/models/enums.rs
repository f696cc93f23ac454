use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form doubles as the serde representation and the stored column value.
/// Variants are declared in ascending order so the derived `Ord` is meaningful.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Gender {
    Male => "M",
    Female => "F",
    Other => "O",
});

str_enum!(Availability {
    Available => "available",
    OutOfStock => "out_of_stock",
    Discontinued => "discontinued",
});

str_enum!(InteractionSeverity {
    Minor => "minor",
    Moderate => "moderate",
    Major => "major",
    Contraindicated => "contraindicated",
});

str_enum!(AllergySeverity {
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
    LifeThreatening => "life_threatening",
});

str_enum!(PrescriptionStatus {
    Pending => "pending",
    Active => "active",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(WarningSeverity {
    Low => "Low",
    Moderate => "Moderate",
    High => "High",
    Critical => "Critical",
});

str_enum!(WarningType {
    Allergy => "Allergy",
    MultiDrugInteraction => "Multi-Drug Interaction",
});

str_enum!(CheckStatus {
    Ok => "ok",
    Conflict => "conflict",
});

impl InteractionSeverity {
    /// Risk weight used by the safety scorer.
    pub fn risk(&self) -> f64 {
        match self {
            Self::Minor => 0.2,
            Self::Moderate => 0.5,
            Self::Major => 0.8,
            Self::Contraindicated => 1.0,
        }
    }

    /// Severity carried onto a conflict warning for this interaction.
    pub fn warning_severity(&self) -> WarningSeverity {
        match self {
            Self::Minor => WarningSeverity::Low,
            Self::Moderate => WarningSeverity::Moderate,
            Self::Major => WarningSeverity::High,
            Self::Contraindicated => WarningSeverity::Critical,
        }
    }
}

impl PrescriptionStatus {
    /// Only active prescriptions make up the patient's current regimen.
    pub fn is_current(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Prescriptions counted in population history.
    pub fn counts_as_history(&self) -> bool {
        matches!(self, Self::Active | Self::Completed)
    }
}

impl CheckStatus {
    pub fn from_warning_count(count: usize) -> Self {
        if count == 0 {
            Self::Ok
        } else {
            Self::Conflict
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn severity_round_trips_through_str() {
        for s in ["minor", "moderate", "major", "contraindicated"] {
            assert_eq!(InteractionSeverity::from_str(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn unknown_value_is_invalid_enum() {
        let err = Availability::from_str("recalled").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn interaction_severity_orders_by_risk() {
        assert!(InteractionSeverity::Minor < InteractionSeverity::Moderate);
        assert!(InteractionSeverity::Major < InteractionSeverity::Contraindicated);
        assert!(InteractionSeverity::Major.risk() > InteractionSeverity::Moderate.risk());
        assert_eq!(InteractionSeverity::Contraindicated.risk(), 1.0);
    }

    #[test]
    fn warning_type_serializes_as_label() {
        let json = serde_json::to_string(&WarningType::MultiDrugInteraction).unwrap();
        assert_eq!(json, "\"Multi-Drug Interaction\"");
        let json = serde_json::to_string(&WarningSeverity::High).unwrap();
        assert_eq!(json, "\"High\"");
    }

    #[test]
    fn gender_uses_single_letter_codes() {
        assert_eq!(Gender::from_str("F").unwrap(), Gender::Female);
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"M\"");
    }

    #[test]
    fn status_from_warning_count() {
        assert_eq!(CheckStatus::from_warning_count(0), CheckStatus::Ok);
        assert_eq!(CheckStatus::from_warning_count(2), CheckStatus::Conflict);
    }

    #[test]
    fn prescription_status_membership() {
        assert!(PrescriptionStatus::Active.is_current());
        assert!(!PrescriptionStatus::Pending.is_current());
        assert!(!PrescriptionStatus::Completed.is_current());
        assert!(PrescriptionStatus::Completed.counts_as_history());
        assert!(!PrescriptionStatus::Cancelled.counts_as_history());
    }
}
