//! Output records of a reanalysis run.

use itertools::Itertools as _;

use crate::case::Case;
use crate::panelapp::Panel;

use super::ds::ReportEvent;
use super::eval::{Reclassification, Tier};

/// One output record, combining the reclassification outcome with variant,
/// panel and run provenance.
///
/// Field order is the column order of the report files.  The first column
/// name carries a comment marker so the header row can be filtered by
/// downstream tooling.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Record {
    /// Case identifier and version.
    #[serde(rename = "#case_id")]
    pub case_id: String,
    /// Genome assembly of the variant coordinates.
    pub assembly: String,
    /// Chromosome.
    pub chromosome: String,
    /// 1-based position.
    pub position: u64,
    /// Reference allele.
    pub reference: String,
    /// Alternate allele.
    pub alternate: String,
    /// Tier originally assigned by the pipeline.
    pub tier: String,
    /// Tier computed against current panel data.
    pub new_tier: Tier,
    /// Gene symbol recorded with the report event.
    pub gene: Option<String>,
    /// Zygosity of the proband's call.
    pub zygosity: Option<String>,
    /// Observed segregation pattern.
    pub segregation: Option<String>,
    /// Mode of inheritance assumed by the pipeline.
    pub inheritance: Option<String>,
    /// Penetrance assumption.
    pub penetrance: Option<String>,
    /// De novo quality score.
    pub denovo_score: Option<f64>,
    /// Report event score.
    pub score: Option<f64>,
    /// Report event identifier.
    pub event_id: String,
    /// Identifier grouping compound heterozygous variants.
    pub group: Option<i64>,
    /// Free-text justification recorded by the pipeline.
    pub justification: Option<String>,
    /// Variant consequence names, comma separated.
    pub consequences: String,
    /// Panel identifier at analysis time.
    pub event_panel_id: Option<String>,
    /// Panel name at analysis time.
    pub event_panel_name: String,
    /// Panel version at analysis time.
    pub event_panel_version: Option<String>,
    /// Panel source at analysis time.
    pub event_panel_source: Option<String>,
    /// Current panel identifier.
    pub panel_id: i64,
    /// Current panel name.
    pub panel_name: String,
    /// Current panel version.
    pub panel_version: String,
    /// Current panel content hash.
    pub panel_hash: Option<String>,
    /// Creation timestamp of the current panel version.
    pub panel_created: String,
    /// HGNC identifier resolved from the current panel.
    pub hgnc_id: Option<String>,
    /// HGNC symbol resolved from the current panel.
    pub hgnc_symbol: Option<String>,
    /// Confidence level resolved from the current panel.
    pub confidence: Option<String>,
    /// Ensembl identifier the gene was matched on.
    pub ensembl_id: Option<String>,
    /// Mode of inheritance recorded by the current panel.
    pub panel_moi: Option<String>,
    /// Panel substitutions applied during reconciliation.
    pub panel_substitutions: String,
    /// Creation timestamp of the tiering report.
    pub created_at: String,
    /// Software versions recorded by the tiering pipeline.
    pub software_versions: String,
    /// Reference database versions recorded by the tiering pipeline.
    pub reference_db_versions: String,
    /// Number of tier 1 report events on the case.
    pub tier1_count: usize,
    /// Number of tier 2 report events on the case.
    pub tier2_count: usize,
    /// Number of tier 3 report events on the case.
    pub tier3_count: usize,
    /// Timestamp of the reanalysis run.
    pub run_time: String,
    /// Version of this tool.
    pub tool_version: String,
}

/// Column names in output order, used to write the header row.
pub const COLUMNS: &[&str] = &[
    "#case_id",
    "assembly",
    "chromosome",
    "position",
    "reference",
    "alternate",
    "tier",
    "new_tier",
    "gene",
    "zygosity",
    "segregation",
    "inheritance",
    "penetrance",
    "denovo_score",
    "score",
    "event_id",
    "group",
    "justification",
    "consequences",
    "event_panel_id",
    "event_panel_name",
    "event_panel_version",
    "event_panel_source",
    "panel_id",
    "panel_name",
    "panel_version",
    "panel_hash",
    "panel_created",
    "hgnc_id",
    "hgnc_symbol",
    "confidence",
    "ensembl_id",
    "panel_moi",
    "panel_substitutions",
    "created_at",
    "software_versions",
    "reference_db_versions",
    "tier1_count",
    "tier2_count",
    "tier3_count",
    "run_time",
    "tool_version",
];

impl Record {
    /// Assemble the output record for one reclassified report event.
    pub fn new(
        case: &Case,
        event: &ReportEvent,
        panel: &Panel,
        reclassification: &Reclassification,
        run_time: &str,
    ) -> Self {
        let gene = reclassification.gene.as_ref();
        let data = &case.tiering.interpreted_genome_data;
        Self {
            case_id: case.id.clone(),
            assembly: event.coordinates.assembly.clone(),
            chromosome: event.coordinates.chromosome.clone(),
            position: event.coordinates.position,
            reference: event.coordinates.reference.clone(),
            alternate: event.coordinates.alternate.clone(),
            tier: event.tier.clone(),
            new_tier: reclassification.tier,
            gene: event.gene_symbol.clone(),
            zygosity: event.zygosity.clone(),
            segregation: event.segregation_pattern.clone(),
            inheritance: event.mode_of_inheritance.clone(),
            penetrance: event.penetrance.clone(),
            denovo_score: event.de_novo_quality_score,
            score: event.score,
            event_id: event.event_id.clone(),
            group: event.group_of_variants,
            justification: event.justification.clone(),
            consequences: event
                .consequences
                .iter()
                .map(|c| c.name.clone().unwrap_or_else(|| c.id.clone()))
                .join(", "),
            event_panel_id: event.panel.panel_identifier.clone(),
            event_panel_name: event.panel.panel_name.clone(),
            event_panel_version: event.panel.panel_version.clone(),
            event_panel_source: event.panel.source.clone(),
            panel_id: panel.id,
            panel_name: panel.name.clone(),
            panel_version: panel.version.clone(),
            panel_hash: panel.hash_id.clone(),
            panel_created: panel.version_created.clone(),
            hgnc_id: gene.and_then(|g| g.hgnc_id.clone()),
            hgnc_symbol: gene.and_then(|g| g.hgnc_symbol.clone()),
            confidence: gene.map(|g| g.confidence_level.clone()),
            ensembl_id: gene.map(|g| g.ensembl_id.clone()),
            panel_moi: gene.and_then(|g| g.mode_of_inheritance.clone()),
            panel_substitutions: case
                .substitutions
                .iter()
                .map(|s| format!("{}, {}", s.name, s.id))
                .join("; "),
            created_at: case.tiering.created_at.clone(),
            software_versions: data
                .software_versions
                .iter()
                .map(|(name, version)| format!("{}:{}", name, version))
                .join("; "),
            reference_db_versions: data
                .reference_database_versions
                .iter()
                .map(|(name, version)| format!("{}:{}", name, version))
                .join("; "),
            tier1_count: case.tier_counts.tier1,
            tier2_count: case.tier_counts.tier2,
            tier3_count: case.tier_counts.tier3,
            run_time: run_time.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Whether the resolved gene is curated with green confidence.
    pub fn is_green(&self) -> bool {
        matches!(self.confidence.as_deref(), Some("3") | Some("4"))
    }
}
