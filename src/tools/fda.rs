//! Drug label lookups. The label service itself is not wired up yet, so
//! every lookup answers with a placeholder that names what it would return.

use serde::{Deserialize, Serialize};

use super::PENDING;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugLabelInput {
    pub drug_name: String,
    /// Label sections to return. All sections when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugLabelOutput {
    pub label_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdverseEffectsInput {
    pub drug_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdverseEffect {
    pub reaction: String,
    pub seriousness: String,
    pub outcomes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdverseEffectsOutput {
    pub effects: Vec<AdverseEffect>,
}

/// Input shared by every single-drug lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugInput {
    pub drug_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialPopulationsOutput {
    pub pregnancy: String,
    pub pediatric: String,
    pub geriatric: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxedWarningOutput {
    pub boxed_warning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugInteractionsOutput {
    pub interactions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOutput {
    pub information: String,
}

pub async fn search_drug_label(input: DrugLabelInput) -> DrugLabelOutput {
    let scope = match &input.fields {
        Some(fields) if !fields.is_empty() => format!(" (sections: {})", fields.join(", ")),
        _ => String::new(),
    };
    DrugLabelOutput {
        label_data: format!("Label data for {}{scope}. {PENDING}", input.drug_name),
    }
}

pub async fn search_adverse_effects(input: AdverseEffectsInput) -> AdverseEffectsOutput {
    let effect = AdverseEffect {
        reaction: format!("Adverse reactions for {}. {PENDING}", input.drug_name),
        seriousness: String::from("unknown"),
        outcomes: Vec::new(),
    };
    let limit = input.limit.unwrap_or(10) as usize;
    AdverseEffectsOutput {
        effects: std::iter::once(effect).take(limit).collect(),
    }
}

pub async fn get_special_populations(input: DrugInput) -> SpecialPopulationsOutput {
    let name = &input.drug_name;
    SpecialPopulationsOutput {
        pregnancy: format!("Pregnancy information for {name}. {PENDING}"),
        pediatric: format!("Pediatric use for {name}. {PENDING}"),
        geriatric: format!("Geriatric use for {name}. {PENDING}"),
    }
}

pub async fn get_boxed_warning(input: DrugInput) -> BoxedWarningOutput {
    BoxedWarningOutput {
        boxed_warning: format!("Boxed warning for {}. {PENDING}", input.drug_name),
    }
}

pub async fn get_drug_interactions(input: DrugInput) -> DrugInteractionsOutput {
    DrugInteractionsOutput {
        interactions: format!("Drug interactions for {}. {PENDING}", input.drug_name),
    }
}

/// Individually addressable drug label sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelSection {
    Abuse,
    AbuseTable,
    ActiveIngredient,
    AdverseReactions,
    ClinicalPharmacology,
    Contraindications,
    Description,
    DosageAndAdministration,
    Warnings,
    Pregnancy,
    PediatricUse,
    GeriatricUse,
    IndicationsAndUsage,
    MechanismOfAction,
    Overdosage,
    Pharmacokinetics,
    ControlledSubstance,
    NursingMothers,
}

impl LabelSection {
    pub const ALL: [LabelSection; 18] = [
        LabelSection::Abuse,
        LabelSection::AbuseTable,
        LabelSection::ActiveIngredient,
        LabelSection::AdverseReactions,
        LabelSection::ClinicalPharmacology,
        LabelSection::Contraindications,
        LabelSection::Description,
        LabelSection::DosageAndAdministration,
        LabelSection::Warnings,
        LabelSection::Pregnancy,
        LabelSection::PediatricUse,
        LabelSection::GeriatricUse,
        LabelSection::IndicationsAndUsage,
        LabelSection::MechanismOfAction,
        LabelSection::Overdosage,
        LabelSection::Pharmacokinetics,
        LabelSection::ControlledSubstance,
        LabelSection::NursingMothers,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            LabelSection::Abuse => "Abuse",
            LabelSection::AbuseTable => "Abuse Table",
            LabelSection::ActiveIngredient => "Active Ingredient",
            LabelSection::AdverseReactions => "Adverse Reactions",
            LabelSection::ClinicalPharmacology => "Clinical Pharmacology",
            LabelSection::Contraindications => "Contraindications",
            LabelSection::Description => "Description",
            LabelSection::DosageAndAdministration => "Dosage and Administration",
            LabelSection::Warnings => "Warnings",
            LabelSection::Pregnancy => "Pregnancy",
            LabelSection::PediatricUse => "Pediatric Use",
            LabelSection::GeriatricUse => "Geriatric Use",
            LabelSection::IndicationsAndUsage => "Indications and Usage",
            LabelSection::MechanismOfAction => "Mechanism of Action",
            LabelSection::Overdosage => "Overdosage",
            LabelSection::Pharmacokinetics => "Pharmacokinetics",
            LabelSection::ControlledSubstance => "Controlled Substance",
            LabelSection::NursingMothers => "Nursing Mothers",
        }
    }

    /// Registry name, e.g. `getDosageAndAdministration`.
    pub fn tool_name(&self) -> String {
        let compact: String = self
            .title()
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect();
        format!("get{compact}")
    }

    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.tool_name() == name)
    }

    pub fn description(&self) -> String {
        format!(
            "Retrieves the {} section of a drug label.",
            self.title().to_lowercase()
        )
    }
}

pub async fn get_label_section(section: LabelSection, input: DrugInput) -> SectionOutput {
    SectionOutput {
        information: format!("{} for {}. {PENDING}", section.title(), input.drug_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn placeholders_name_the_drug() {
        let label = search_drug_label(DrugLabelInput {
            drug_name: "metformin".into(),
            fields: Some(vec!["warnings".into()]),
        })
        .await;
        assert!(label.label_data.contains("metformin"));
        assert!(label.label_data.contains("warnings"));
        assert!(label.label_data.ends_with(PENDING));

        let warning = get_boxed_warning(DrugInput {
            drug_name: "warfarin".into(),
        })
        .await;
        assert!(warning.boxed_warning.ends_with(PENDING));
    }

    #[tokio::test]
    async fn adverse_effects_honour_zero_limit() {
        let none = search_adverse_effects(AdverseEffectsInput {
            drug_name: "x".into(),
            limit: Some(0),
        })
        .await;
        assert!(none.effects.is_empty());

        let some = search_adverse_effects(AdverseEffectsInput {
            drug_name: "x".into(),
            limit: None,
        })
        .await;
        assert_eq!(some.effects.len(), 1);
    }

    #[test]
    fn section_tool_names_are_unique_and_reversible() {
        let names: std::collections::HashSet<String> =
            LabelSection::ALL.iter().map(|s| s.tool_name()).collect();
        assert_eq!(names.len(), LabelSection::ALL.len());
        assert_eq!(
            LabelSection::DosageAndAdministration.tool_name(),
            "getDosageAndAdministration"
        );
        assert_eq!(
            LabelSection::from_tool_name("getNursingMothers"),
            Some(LabelSection::NursingMothers)
        );
        assert_eq!(LabelSection::from_tool_name("getNothing"), None);
    }

    #[tokio::test]
    async fn section_lookup_uses_section_title() {
        let output = get_label_section(
            LabelSection::MechanismOfAction,
            DrugInput {
                drug_name: "aspirin".into(),
            },
        )
        .await;
        assert_eq!(
            output.information,
            "Mechanism of Action for aspirin. Implementation pending."
        );
    }
}
