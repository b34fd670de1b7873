//! Typed data structures for v6 interpretation request records.
//!
//! All parsing of the loosely structured case JSON happens here, once, at the
//! input boundary.  Downstream code only ever sees these typed records.

use std::collections::BTreeMap;

/// Top-level v6 interpretation request record.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CaseRecord {
    /// Status events for the case, in chronological order.
    #[serde(default)]
    pub status: Vec<StatusEvent>,
    /// Clinical reports issued for the case so far.
    #[serde(default)]
    pub clinical_report: Vec<ClinicalReport>,
    /// Interpreted genomes attached to the case, one per interpretation
    /// service run.
    pub interpreted_genome: Vec<InterpretedGenomeEntry>,
    /// The original request payload with pedigree and panel metadata.
    pub interpretation_request_data: InterpretationRequestData,
    /// Declared genome assembly for the case.
    pub assembly: String,
}

impl CaseRecord {
    /// Parse a case record from raw JSON.
    ///
    /// # Errors
    ///
    /// If the value does not have the expected v6 shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, anyhow::Error> {
        serde_json::from_value(value)
            .map_err(|e| anyhow::anyhow!("not a v6 interpretation request: {}", e))
    }
}

/// One entry of the case status history.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct StatusEvent {
    /// Status label, e.g. `sent_to_gmcs`.
    pub status: String,
}

/// An issued clinical report, optionally with its exit questionnaire.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ClinicalReport {
    /// Exit questionnaire recorded when the report was closed.
    #[serde(default)]
    pub exit_questionnaire: Option<ExitQuestionnaire>,
}

/// Exit questionnaire wrapper.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ExitQuestionnaire {
    /// The questionnaire payload.
    pub exit_questionnaire_data: ExitQuestionnaireData,
}

/// Exit questionnaire payload.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitQuestionnaireData {
    /// Family-level outcome answers.
    pub family_level_questions: FamilyLevelQuestions,
}

/// Family-level questions of the exit questionnaire.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyLevelQuestions {
    /// Whether the case was solved for the family (`yes`/`no`/`unknown`).
    pub case_solved_family: String,
}

/// One interpreted genome attached to the case.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct InterpretedGenomeEntry {
    /// Creation timestamp, e.g. `2019-04-01T12:00:00.000Z`.
    pub created_at: String,
    /// The interpreted genome payload.
    pub interpreted_genome_data: InterpretedGenomeData,
}

/// Payload of an interpreted genome.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpretedGenomeData {
    /// Name of the service that produced this genome, e.g.
    /// `genomics_england_tiering`.
    pub interpretation_service: String,
    /// Full interpretation request identifier, e.g. `1234-1`.
    pub interpretation_request_id: String,
    /// Versions of the software components used by the service.
    #[serde(default)]
    pub software_versions: BTreeMap<String, String>,
    /// Versions of the reference databases used by the service.
    #[serde(default)]
    pub reference_database_versions: BTreeMap<String, String>,
    /// The tiered small variants.
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// A small variant with its genotype calls and report events.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Genomic coordinates of the variant.
    pub variant_coordinates: VariantCoordinates,
    /// Per-participant genotype calls.
    #[serde(default)]
    pub variant_calls: Vec<VariantCall>,
    /// Gene-level interpretations of this variant.
    #[serde(default)]
    pub report_events: Vec<RawReportEvent>,
}

/// Genomic coordinates.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantCoordinates {
    /// Genome assembly, e.g. `GRCh38`.
    pub assembly: String,
    /// Chromosome name without `chr` prefix.
    pub chromosome: String,
    /// 1-based position.
    pub position: u64,
    /// Reference allele.
    pub reference: String,
    /// Alternate allele.
    pub alternate: String,
}

/// Genotype call of one participant.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantCall {
    /// Participant identifier.
    pub participant_id: String,
    /// Zygosity of the call, e.g. `heterozygous`.
    #[serde(default)]
    pub zygosity: Option<String>,
}

/// One report event as recorded by the tiering pipeline.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReportEvent {
    /// Report event identifier.
    pub report_event_id: String,
    /// Tier assigned by the pipeline, e.g. `TIER3`.
    #[serde(default)]
    pub tier: Option<String>,
    /// The panel under which the event was evaluated.
    #[serde(default)]
    pub gene_panel: Option<GenePanelRef>,
    /// Genomic entities the event refers to.
    #[serde(default)]
    pub genomic_entities: Vec<GenomicEntity>,
    /// Mode of inheritance assumed by the pipeline.
    #[serde(default)]
    pub mode_of_inheritance: Option<String>,
    /// Observed segregation pattern.
    #[serde(default)]
    pub segregation_pattern: Option<String>,
    /// Variant consequence annotations.
    #[serde(default)]
    pub variant_consequences: Vec<VariantConsequence>,
    /// Free-text justification recorded by the pipeline.
    #[serde(default)]
    pub event_justification: Option<String>,
    /// Penetrance assumption.
    #[serde(default)]
    pub penetrance: Option<String>,
    /// De novo quality score.
    #[serde(default)]
    pub de_novo_quality_score: Option<f64>,
    /// Report event score.
    #[serde(default)]
    pub score: Option<f64>,
    /// Identifier grouping compound heterozygous variants.
    #[serde(default)]
    pub group_of_variants: Option<i64>,
}

/// Reference to the panel a report event was evaluated under.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenePanelRef {
    /// Panel name at the time of analysis.
    pub panel_name: String,
    /// Panel identifier at the time of analysis.
    #[serde(default)]
    pub panel_identifier: Option<String>,
    /// Panel version at the time of analysis.
    #[serde(default)]
    pub panel_version: Option<String>,
    /// Source of the panel.
    #[serde(default)]
    pub source: Option<String>,
}

/// A genomic entity referenced by a report event.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomicEntity {
    /// Entity type, e.g. `gene`.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// HGNC gene symbol.
    #[serde(default)]
    pub gene_symbol: Option<String>,
    /// Ensembl gene identifier.
    #[serde(default)]
    pub ensembl_id: Option<String>,
}

/// Variant consequence annotation.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VariantConsequence {
    /// Sequence ontology identifier, e.g. `SO:0001587`.
    pub id: String,
    /// Human readable consequence name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Container for the original request payload.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct InterpretationRequestData {
    /// The nested request document.
    pub json_request: JsonRequest,
}

/// The nested request document.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct JsonRequest {
    /// Pedigree and analysis panel metadata.
    pub pedigree: Pedigree,
}

/// Pedigree of the case family.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pedigree {
    /// Family members.
    #[serde(default)]
    pub members: Vec<PedigreeMember>,
    /// Panels declared for the analysis of this case.
    #[serde(default)]
    pub analysis_panels: Vec<AnalysisPanel>,
}

/// One member of the pedigree.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PedigreeMember {
    /// Participant identifier.
    pub participant_id: String,
    /// Whether this member is the proband.
    #[serde(default)]
    pub is_proband: bool,
}

/// A panel declared for the analysis of a case.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPanel {
    /// Panel name as declared at analysis time.
    pub panel_name: String,
    /// Panel version as declared at analysis time.
    #[serde(default)]
    pub panel_version: Option<String>,
}
