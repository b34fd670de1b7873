//! The tier reclassification decision procedure.
//!
//! Everything in this module is a pure function of its inputs: no I/O, no
//! observable side effects, no failures for well-formed input.

use std::str::FromStr as _;
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::case::ds::VariantConsequence;
use crate::panelapp::{GeneMatch, Panel};

use super::ds::ReportEvent;

/// Tier labels assigned by reclassification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    serde::Deserialize,
    serde::Serialize,
)]
pub enum Tier {
    /// Green gene, matching inheritance, high impact evidence.
    #[strum(serialize = "tier_1")]
    #[serde(rename = "tier_1")]
    Tier1,
    /// Green gene, matching inheritance, but no high impact evidence.
    #[strum(serialize = "tier_2")]
    #[serde(rename = "tier_2")]
    Tier2,
    /// The gene is not on the current panel.
    #[strum(serialize = "tier_3_not_in_panel")]
    #[serde(rename = "tier_3_not_in_panel")]
    Tier3NotInPanel,
    /// The gene is on the panel below green confidence.
    #[strum(serialize = "tier_3_red_or_amber")]
    #[serde(rename = "tier_3_red_or_amber")]
    Tier3RedOrAmber,
    /// Green gene, but the declared inheritance conflicts with the panel.
    #[strum(serialize = "tier_3_green_moi_mismatch")]
    #[serde(rename = "tier_3_green_moi_mismatch")]
    Tier3GreenMoiMismatch,
}

/// Recognized modes of inheritance of the tiering pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum TieringMoi {
    Biallelic,
    XlinkedBiallelic,
    Denovo,
    XlinkedMonoallelic,
    Monoallelic,
    MonoallelicNotImprinted,
    MonoallelicPaternallyImprinted,
    MonoallelicMaternallyImprinted,
    Mitochondrial,
}

/// Sequence ontology terms regarded as high impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum HighImpactTerm {
    #[strum(serialize = "SO:0001893")]
    TranscriptAblation,
    #[strum(serialize = "SO:0001574")]
    SpliceAcceptorVariant,
    #[strum(serialize = "SO:0001575")]
    SpliceDonorVariant,
    #[strum(serialize = "SO:0001587")]
    StopGained,
    #[strum(serialize = "SO:0001589")]
    FrameshiftVariant,
    #[strum(serialize = "SO:0001578")]
    StopLost,
    #[strum(serialize = "SO:0001582")]
    InitiatorCodonVariant,
}

/// Acceptable panel inheritance patterns per recognized tiering mode.
///
/// Patterns are applied to the normalized panel text, cf.
/// [`normalize_panel_moi`].
static MOI_TABLE: LazyLock<FxHashMap<TieringMoi, Vec<Regex>>> = LazyLock::new(|| {
    let table: &[(TieringMoi, &[&str])] = &[
        (TieringMoi::Biallelic, &[r"^biallelic", r"^both"]),
        (TieringMoi::XlinkedBiallelic, &[r"^x-linked.*biallelic"]),
        (
            TieringMoi::Denovo,
            &[
                r"^monoallelic",
                r"^biallelic",
                r"^both",
                r"^x-linked",
                r"^mitochondrial",
            ],
        ),
        (TieringMoi::XlinkedMonoallelic, &[r"^x-linked"]),
        (TieringMoi::Monoallelic, &[r"^monoallelic", r"^both"]),
        (
            TieringMoi::MonoallelicNotImprinted,
            &[
                r"^monoallelic.*not_imprinted",
                r"^monoallelic.*imprinted_status_unknown",
                r"^both",
            ],
        ),
        (
            TieringMoi::MonoallelicPaternallyImprinted,
            &[
                r"^monoallelic.*paternally_imprinted",
                r"^monoallelic.*imprinted_status_unknown",
                r"^both",
            ],
        ),
        (
            TieringMoi::MonoallelicMaternallyImprinted,
            &[
                r"^monoallelic.*maternally_imprinted",
                r"^monoallelic.*imprinted_status_unknown",
                r"^both",
            ],
        ),
        (TieringMoi::Mitochondrial, &[r"^mitochondrial"]),
    ];
    table
        .iter()
        .map(|(key, patterns)| {
            (
                *key,
                patterns
                    .iter()
                    .map(|pattern| Regex::new(pattern).expect("static regex compiles"))
                    .collect(),
            )
        })
        .collect()
});

/// Result of reclassifying one report event.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Reclassification {
    /// The newly computed tier.
    pub tier: Tier,
    /// The panel gene metadata the decision was based on, if the gene is on
    /// the panel.
    pub gene: Option<GeneMatch>,
}

/// Reclassify one report event against current panel data.
///
/// Evaluated as an ordered rule list; the first matching rule determines
/// the result.
pub fn retier(event: &ReportEvent, panel: &Panel) -> Reclassification {
    let gene = event
        .ensembl_id
        .as_deref()
        .and_then(|ensembl_id| panel.query(ensembl_id));
    let tier = match &gene {
        None => Tier::Tier3NotInPanel,
        Some(gene) if !gene.is_green() => Tier::Tier3RedOrAmber,
        Some(gene)
            if !moi_match(
                event.mode_of_inheritance.as_deref(),
                gene.mode_of_inheritance.as_deref(),
            ) =>
        {
            Tier::Tier3GreenMoiMismatch
        }
        Some(_)
            if !is_high_impact(event.segregation_pattern.as_deref(), &event.consequences) =>
        {
            Tier::Tier2
        }
        Some(_) => Tier::Tier1,
    };
    Reclassification { tier, gene }
}

/// Whether the declared mode of inheritance is compatible with the panel's.
///
/// Missing or unrecognized inheritance information is treated as "no
/// conflict" rather than as a mismatch.
pub fn moi_match(tiering_moi: Option<&str>, panel_moi: Option<&str>) -> bool {
    let (Some(tiering), Some(panel)) = (tiering_moi, panel_moi) else {
        return true;
    };
    let Ok(key) = TieringMoi::from_str(&tiering.to_lowercase()) else {
        return true;
    };
    let normalized = normalize_panel_moi(panel);
    if normalized.starts_with("unknown") || normalized.starts_with("other") {
        return true;
    }
    MOI_TABLE
        .get(&key)
        .map(|patterns| patterns.iter().any(|re| re.is_match(&normalized)))
        .unwrap_or(true)
}

/// Normalize panel inheritance text for pattern matching.
fn normalize_panel_moi(text: &str) -> String {
    text.trim().to_lowercase().replace(',', "").replace(' ', "_")
}

/// Whether the variant's evidence is high impact.
///
/// True for de novo segregation or any consequence from the fixed set of
/// high impact sequence ontology terms.
pub fn is_high_impact(segregation: Option<&str>, consequences: &[VariantConsequence]) -> bool {
    if segregation
        .map(|text| text.to_lowercase().contains("denovo"))
        .unwrap_or(false)
    {
        return true;
    }
    consequences
        .iter()
        .any(|consequence| HighImpactTerm::from_str(&consequence.id).is_ok())
}
