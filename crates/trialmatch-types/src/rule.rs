//! The closed set of eligibility rules

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a rule name is not part of the closed set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown eligibility rule: {0}")]
pub struct UnknownRuleError(pub String);

macro_rules! eligibility_rules {
    ($($(#[$meta:meta])* $variant:ident => $name:literal,)+) => {
        /// Identifier of a composite combinator or a leaf predicate
        ///
        /// The set is closed; the function registry must provide exactly one
        /// evaluator for every variant listed in [`EligibilityRule::ALL`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum EligibilityRule {
            $($(#[$meta])* $variant,)+
        }

        impl EligibilityRule {
            /// Every declared rule
            pub const ALL: &'static [EligibilityRule] = &[$(Self::$variant,)+];

            /// Upper snake case name, as used in textual rule syntax
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl FromStr for EligibilityRule {
            type Err = UnknownRuleError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(UnknownRuleError(s.to_string())),
                }
            }
        }
    };
}

eligibility_rules! {
    // === Composite ===
    And => "AND",
    Or => "OR",
    Not => "NOT",
    WarnIf => "WARN_IF",

    // === General ===
    IsAtLeastXYearsOld => "IS_AT_LEAST_X_YEARS_OLD",
    IsMale => "IS_MALE",
    IsFemale => "IS_FEMALE",
    HasWhoStatusOfAtMostX => "HAS_WHO_STATUS_OF_AT_MOST_X",
    CanGiveAdequateInformedConsent => "CAN_GIVE_ADEQUATE_INFORMED_CONSENT",
    IsInvolvedInStudyProcedures => "IS_INVOLVED_IN_STUDY_PROCEDURES",

    // === Tumor ===
    HasSolidPrimaryTumor => "HAS_SOLID_PRIMARY_TUMOR",
    HasPrimaryTumorBelongingToDoidX => "HAS_PRIMARY_TUMOR_BELONGING_TO_DOID_X",
    HasPrimaryTumorBelongingToDoidTermX => "HAS_PRIMARY_TUMOR_BELONGING_TO_DOID_TERM_X",
    HasMeasurableDisease => "HAS_MEASURABLE_DISEASE",
    HasKnownActiveCnsMetastases => "HAS_KNOWN_ACTIVE_CNS_METASTASES",
    HasKnownBrainMetastases => "HAS_KNOWN_BRAIN_METASTASES",
    HasKnownLiverMetastases => "HAS_KNOWN_LIVER_METASTASES",

    // === Treatment history ===
    HasHadTreatmentNameX => "HAS_HAD_TREATMENT_NAME_X",
    HasHadAtMostXSystemicTreatmentLines => "HAS_HAD_AT_MOST_X_SYSTEMIC_TREATMENT_LINES",
    HasHistoryOfSecondMalignancy => "HAS_HISTORY_OF_SECOND_MALIGNANCY",

    // === Clinical status and laboratory ===
    HasActiveInfection => "HAS_ACTIVE_INFECTION",
    HasHemoglobinGPerDlOfAtLeastX => "HAS_HEMOGLOBIN_G_PER_DL_OF_AT_LEAST_X",
    HasHadOrganTransplant => "HAS_HAD_ORGAN_TRANSPLANT",

    // === Molecular ===
    ActivationOrAmplificationOfGeneX => "ACTIVATION_OR_AMPLIFICATION_OF_GENE_X",
    AmplificationOfGeneX => "AMPLIFICATION_OF_GENE_X",
    MutationInGeneX => "MUTATION_IN_GENE_X",
    FusionInGeneX => "FUSION_IN_GENE_X",
    InactivationOfGeneX => "INACTIVATION_OF_GENE_X",
}

impl fmt::Display for EligibilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EligibilityRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EligibilityRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
