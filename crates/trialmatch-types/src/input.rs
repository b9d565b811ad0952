//! Declared input shape of every eligibility rule

use crate::rule::EligibilityRule;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What parameters a rule expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionInput {
    None,
    OneInteger,
    OneDecimal,
    OneString,
    OneGene,
    OneDoid,
    OneDoidTerm,
    OneTreatmentName,
    /// Exactly one nested function
    OneCompositeInput,
    /// Two or more nested functions
    AtLeastTwoCompositeInputs,
}

impl FunctionInput {
    /// Whether the input is made of nested functions
    pub const fn is_composite(self) -> bool {
        matches!(
            self,
            Self::OneCompositeInput | Self::AtLeastTwoCompositeInputs
        )
    }

    /// Number of primitive values a leaf with this input takes
    pub const fn value_count(self) -> usize {
        match self {
            Self::None | Self::OneCompositeInput | Self::AtLeastTwoCompositeInputs => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for FunctionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::None => "no input",
            Self::OneInteger => "one integer",
            Self::OneDecimal => "one decimal",
            Self::OneString => "one string",
            Self::OneGene => "one gene",
            Self::OneDoid => "one DOID",
            Self::OneDoidTerm => "one DOID term",
            Self::OneTreatmentName => "one treatment name",
            Self::OneCompositeInput => "exactly one function",
            Self::AtLeastTwoCompositeInputs => "at least two functions",
        };
        f.write_str(text)
    }
}

impl EligibilityRule {
    /// Declared input shape
    pub const fn input(self) -> FunctionInput {
        match self {
            Self::And | Self::Or => FunctionInput::AtLeastTwoCompositeInputs,
            Self::Not | Self::WarnIf => FunctionInput::OneCompositeInput,

            Self::IsAtLeastXYearsOld
            | Self::HasWhoStatusOfAtMostX
            | Self::HasHadAtMostXSystemicTreatmentLines => FunctionInput::OneInteger,
            Self::HasHemoglobinGPerDlOfAtLeastX => FunctionInput::OneDecimal,
            Self::HasPrimaryTumorBelongingToDoidX => FunctionInput::OneDoid,
            Self::HasPrimaryTumorBelongingToDoidTermX => FunctionInput::OneDoidTerm,
            Self::HasHadTreatmentNameX => FunctionInput::OneTreatmentName,
            Self::ActivationOrAmplificationOfGeneX
            | Self::AmplificationOfGeneX
            | Self::MutationInGeneX
            | Self::FusionInGeneX
            | Self::InactivationOfGeneX => FunctionInput::OneGene,

            Self::IsMale
            | Self::IsFemale
            | Self::CanGiveAdequateInformedConsent
            | Self::IsInvolvedInStudyProcedures
            | Self::HasSolidPrimaryTumor
            | Self::HasMeasurableDisease
            | Self::HasKnownActiveCnsMetastases
            | Self::HasKnownBrainMetastases
            | Self::HasKnownLiverMetastases
            | Self::HasHistoryOfSecondMalignancy
            | Self::HasActiveInfection
            | Self::HasHadOrganTransplant => FunctionInput::None,
        }
    }
}
