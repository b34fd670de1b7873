//! Case model wrapping a v6 interpretation request for reanalysis.

pub mod ds;
pub mod validate;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::panelapp::{Panel, PanelProvider};

use self::ds::{CaseRecord, InterpretedGenomeEntry};

/// Interpretation service name of the automated tiering pipeline.
const TIERING_SERVICE: &str = "genomics_england_tiering";

/// Timestamp format of `created_at` fields.
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

static CASE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+-\d+").expect("static regex compiles"));

/// A panel substitution made during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct PanelSubstitution {
    /// Panel name as referenced by report events.
    pub name: String,
    /// Catalog identifier the name was resolved to.
    pub id: i64,
}

/// Counts of report events per original tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct TierCounts {
    /// Number of tier 1 report events.
    pub tier1: usize,
    /// Number of tier 2 report events.
    pub tier2: usize,
    /// Number of tier 3 report events.
    pub tier3: usize,
}

/// A case under reanalysis.
///
/// Wraps a validated case record together with the selected tiering report
/// and the resolved panel set.  The panel mapping is exclusively owned by
/// the case; after construction it only ever gains entries through
/// [`Case::update_panel`].
#[derive(Debug)]
pub struct Case {
    /// Case identifier and version, e.g. `1234-1`.
    pub id: String,
    /// Participant identifier of the proband.
    pub proband_id: String,
    /// The selected tiering report, the latest one produced by the
    /// automated tiering service.
    pub tiering: InterpretedGenomeEntry,
    /// Mapping of panel name to current panel data.
    pub panels: FxHashMap<String, Panel>,
    /// Audit log of panel substitutions, append-only.
    pub substitutions: Vec<PanelSubstitution>,
    /// Report event counts per original tier.
    pub tier_counts: TierCounts,
    /// The underlying case record.
    #[allow(dead_code)]
    pub record: CaseRecord,
}

impl Case {
    /// Construct a case from a validated record, resolving its declared
    /// panels through the given provider.
    ///
    /// Panels that the provider no longer knows under their declared name
    /// are logged and omitted; report events under such panels are skipped
    /// later unless reconciliation resolves a replacement identifier.
    ///
    /// # Errors
    ///
    /// If validation fails, if no tiering report is attached to the case,
    /// if no pedigree member is flagged as proband, or if the provider
    /// fails with anything other than a missing panel.
    pub fn new(record: CaseRecord, provider: &dyn PanelProvider) -> Result<Self, anyhow::Error> {
        validate::validate(&record)?;
        let tiering = select_tiering(&record)?;
        let id = case_id(&tiering)?;
        let proband_id = find_proband(&record)?;
        let tier_counts = count_tiers(&tiering);
        let panels = resolve_panels(&record, provider)?;
        Ok(Self {
            id,
            proband_id,
            tiering,
            panels,
            substitutions: Vec::new(),
            tier_counts,
            record,
        })
    }

    /// Assign a panel fetched by catalog identifier to the given name.
    ///
    /// This is the only mutation path of the panel mapping after
    /// construction.  The substitution is appended to the audit log.
    ///
    /// # Errors
    ///
    /// If the provider fails or knows no panel under `id`.
    pub fn update_panel(
        &mut self,
        provider: &dyn PanelProvider,
        name: &str,
        id: i64,
    ) -> Result<(), anyhow::Error> {
        let panel = provider
            .get_panel(&id.to_string(), None)?
            .ok_or_else(|| anyhow::anyhow!("no panel with identifier {} in the catalog", id))?;
        self.panels.insert(name.to_string(), panel);
        self.substitutions.push(PanelSubstitution {
            name: name.to_string(),
            id,
        });
        Ok(())
    }

    /// Names of the panels referenced by any report event of the tiering
    /// report.
    pub fn event_panel_names(&self) -> impl Iterator<Item = &str> {
        self.tiering
            .interpreted_genome_data
            .variants
            .iter()
            .flat_map(|variant| variant.report_events.iter())
            .filter_map(|event| event.gene_panel.as_ref())
            .map(|panel| panel.panel_name.as_str())
    }
}

/// Read a case record from a JSON file.
///
/// # Errors
///
/// If the file cannot be read or does not contain a v6 record.
pub fn read_record<P: AsRef<Path>>(path: P) -> Result<CaseRecord, anyhow::Error> {
    let value = read_raw(path)?;
    CaseRecord::from_value(value)
}

/// Read raw case JSON from a file.
///
/// # Errors
///
/// If the file cannot be read or parsed.
pub fn read_raw<P: AsRef<Path>>(path: P) -> Result<serde_json::Value, anyhow::Error> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| anyhow::anyhow!("problem opening case file: {}", e))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| anyhow::anyhow!("problem parsing case file: {}", e))
}

/// Save raw case JSON next to the reanalysis outputs.
///
/// # Errors
///
/// If the file cannot be written.
pub fn save_raw<P: AsRef<Path>>(value: &serde_json::Value, path: P) -> Result<(), anyhow::Error> {
    let file = std::fs::File::create(path.as_ref())
        .map_err(|e| anyhow::anyhow!("problem creating case file: {}", e))?;
    serde_json::to_writer(std::io::BufWriter::new(file), value)
        .map_err(|e| anyhow::anyhow!("problem writing case file: {}", e))
}

/// Select the latest report produced by the automated tiering service.
fn select_tiering(record: &CaseRecord) -> Result<InterpretedGenomeEntry, anyhow::Error> {
    let mut latest: Option<(chrono::NaiveDateTime, &InterpretedGenomeEntry)> = None;
    for entry in record
        .interpreted_genome
        .iter()
        .filter(|entry| entry.interpreted_genome_data.interpretation_service == TIERING_SERVICE)
    {
        let created = chrono::NaiveDateTime::parse_from_str(&entry.created_at, CREATED_AT_FORMAT)
            .map_err(|e| {
                anyhow::anyhow!("unparseable created_at {:?}: {}", &entry.created_at, e)
            })?;
        if latest.map(|(ts, _)| created > ts).unwrap_or(true) {
            latest = Some((created, entry));
        }
    }
    latest
        .map(|(_, entry)| entry.clone())
        .ok_or_else(|| anyhow::anyhow!("case has no report from the tiering service"))
}

/// Extract the numeric `id-version` part of the case identifier.
fn case_id(tiering: &InterpretedGenomeEntry) -> Result<String, anyhow::Error> {
    let full = &tiering.interpreted_genome_data.interpretation_request_id;
    CASE_ID_RE
        .find(full)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| anyhow::anyhow!("malformed interpretation request id: {:?}", full))
}

/// Find the proband among the pedigree members.
fn find_proband(record: &CaseRecord) -> Result<String, anyhow::Error> {
    record
        .interpretation_request_data
        .json_request
        .pedigree
        .members
        .iter()
        .find(|member| member.is_proband)
        .map(|member| member.participant_id.clone())
        .ok_or_else(|| anyhow::anyhow!("no pedigree member is flagged as proband"))
}

/// Tally report events per original tier.
fn count_tiers(tiering: &InterpretedGenomeEntry) -> TierCounts {
    let mut counts = TierCounts::default();
    for variant in &tiering.interpreted_genome_data.variants {
        for event in &variant.report_events {
            match event.tier.as_deref() {
                Some("TIER1") => counts.tier1 += 1,
                Some("TIER2") => counts.tier2 += 1,
                Some("TIER3") => counts.tier3 += 1,
                _ => (),
            }
        }
    }
    counts
}

/// Resolve the declared analysis panels through the provider.
///
/// The mapping is keyed by the name the provider currently reports for the
/// panel.  Declared panels the provider does not know are logged and
/// omitted.
fn resolve_panels(
    record: &CaseRecord,
    provider: &dyn PanelProvider,
) -> Result<FxHashMap<String, Panel>, anyhow::Error> {
    let mut panels = FxHashMap::default();
    for declared in &record
        .interpretation_request_data
        .json_request
        .pedigree
        .analysis_panels
    {
        match provider.get_panel(&declared.panel_name, None)? {
            Some(panel) => {
                panels.insert(panel.name.clone(), panel);
            }
            None => {
                tracing::warn!("no panel found for declared panel {:?}", &declared.panel_name);
            }
        }
    }
    Ok(panels)
}

#[cfg(test)]
pub mod test {
    use crate::panelapp::testutil::FixtureProvider;

    use super::ds::CaseRecord;
    use super::Case;

    pub fn fixture_record() -> CaseRecord {
        let text = std::fs::read_to_string("tests/data/case.json").expect("fixture exists");
        CaseRecord::from_value(serde_json::from_str(&text).expect("valid JSON"))
            .expect("valid v6 record")
    }

    #[test]
    fn construction_selects_latest_tiering_report() -> Result<(), anyhow::Error> {
        let case = Case::new(fixture_record(), &FixtureProvider::new())?;
        // The fixture holds two tiering reports and one exomiser report;
        // the newest tiering report is from 2019.
        assert_eq!(case.tiering.created_at, "2019-04-01T12:00:00.000Z");
        assert_eq!(
            case.tiering.interpreted_genome_data.interpretation_service,
            "genomics_england_tiering"
        );
        Ok(())
    }

    #[test]
    fn construction_resolves_proband_and_id() -> Result<(), anyhow::Error> {
        let case = Case::new(fixture_record(), &FixtureProvider::new())?;
        assert_eq!(case.id, "1234-1");
        assert_eq!(case.proband_id, "115000123");
        Ok(())
    }

    #[test]
    fn construction_counts_tiers() -> Result<(), anyhow::Error> {
        let case = Case::new(fixture_record(), &FixtureProvider::new())?;
        assert_eq!(case.tier_counts.tier1, 0);
        assert_eq!(case.tier_counts.tier2, 1);
        assert_eq!(case.tier_counts.tier3, 4);
        Ok(())
    }

    #[test]
    fn unknown_declared_panels_are_omitted() -> Result<(), anyhow::Error> {
        let case = Case::new(fixture_record(), &FixtureProvider::new())?;
        // The fixture declares one panel the provider knows and one it
        // does not.
        assert_eq!(case.panels.len(), 1);
        assert!(case.panels.contains_key("Intellectual disability"));
        Ok(())
    }

    #[test]
    fn update_panel_records_substitution() -> Result<(), anyhow::Error> {
        let mut case = Case::new(fixture_record(), &FixtureProvider::new())?;
        case.update_panel(&FixtureProvider::new(), "Old panel name", 123)?;

        assert!(case.panels.contains_key("Old panel name"));
        assert_eq!(case.substitutions.len(), 1);
        assert_eq!(case.substitutions[0].name, "Old panel name");
        assert_eq!(case.substitutions[0].id, 123);
        Ok(())
    }

    #[test]
    fn update_panel_fails_for_unknown_identifier() -> Result<(), anyhow::Error> {
        let mut case = Case::new(fixture_record(), &FixtureProvider::new())?;
        let err = case
            .update_panel(&FixtureProvider::new(), "Old panel name", 999)
            .unwrap_err();
        assert!(err.to_string().contains("no panel with identifier 999"));
        Ok(())
    }
}
