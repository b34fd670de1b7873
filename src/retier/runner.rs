//! Orchestration of one reanalysis run.

use crate::case::Case;

use super::ds::ReportEvent;
use super::eval;
use super::result::Record;

/// Runs the reclassification over a case's report events.
pub struct Runner {
    /// Timestamp stamped into every record of this run.
    run_time: String,
}

impl Runner {
    /// Create a runner, stamping the run time.
    pub fn new() -> Self {
        Self {
            run_time: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Produce the output records for one case.
    ///
    /// The sequence is lazy and single-pass: one traversal of the tiering
    /// report.  Report events whose panel is missing from the case's panel
    /// mapping are logged and dropped; the run continues.  Exhausting the
    /// sequence does not mutate the case, so calling `run` again re-derives
    /// the same records.
    ///
    /// A yielded error means malformed upstream data (a report event naming
    /// zero or more than one gene) and should abort consumption.
    pub fn run<'c>(
        &self,
        case: &'c Case,
    ) -> impl Iterator<Item = Result<Record, anyhow::Error>> + 'c {
        let run_time = self.run_time.clone();
        tier_three_events(case).filter_map(move |event| match event {
            Err(e) => Some(Err(e)),
            Ok(event) => match case.panels.get(event.panel_name()) {
                None => {
                    tracing::warn!(
                        "no current panel for {:?}; dropping report event {}",
                        event.panel_name(),
                        &event.event_id
                    );
                    None
                }
                Some(panel) => {
                    let reclassification = eval::retier(&event, panel);
                    Some(Ok(Record::new(
                        case,
                        &event,
                        panel,
                        &reclassification,
                        &run_time,
                    )))
                }
            },
        })
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

/// Report events of tier 3 variants that carry a genotype call for the
/// case's proband.
fn tier_three_events(
    case: &Case,
) -> impl Iterator<Item = Result<ReportEvent, anyhow::Error>> + '_ {
    case.tiering
        .interpreted_genome_data
        .variants
        .iter()
        .flat_map(move |variant| {
            variant
                .report_events
                .iter()
                .filter(|event| event.tier.as_deref() == Some("TIER3"))
                .filter_map(move |event| {
                    variant
                        .variant_calls
                        .iter()
                        .find(|call| call.participant_id == case.proband_id)
                        .map(|call| ReportEvent::new(event, variant, call))
                })
        })
}

#[cfg(test)]
mod test {
    use crate::case::ds::GenomicEntity;
    use crate::case::Case;
    use crate::panelapp::testutil::{load_panel, FixtureProvider};
    use crate::panelapp::CatalogPanel;
    use crate::retier::eval::Tier;
    use crate::retier::reconcile;

    use super::Runner;

    fn full_provider() -> FixtureProvider {
        let mut provider = FixtureProvider::new();
        provider.panels.push(load_panel("tests/data/panel_456.json"));
        provider.catalog = vec![CatalogPanel {
            id: 456,
            name: "Dystonia".into(),
            relevant_disorders: vec!["Early onset dystonia".into()],
        }];
        provider
    }

    fn reconciled_case() -> Case {
        let provider = full_provider();
        let mut case =
            Case::new(crate::case::test::fixture_record(), &provider).expect("valid fixture");
        reconcile::reconcile(&provider, &mut case).expect("reconciliation succeeds");
        case
    }

    #[test]
    fn run_reclassifies_all_resolvable_events() -> Result<(), anyhow::Error> {
        let case = reconciled_case();
        let records = Runner::new().run(&case).collect::<Result<Vec<_>, _>>()?;

        // Three tier 3 events have a proband call and a resolvable panel;
        // the event on the variant without a proband call is not among them.
        assert_eq!(records.len(), 3);
        let tiers = records
            .iter()
            .map(|r| (r.event_id.as_str(), r.new_tier))
            .collect::<Vec<_>>();
        assert_eq!(
            tiers,
            vec![
                ("RE_A1", Tier::Tier1),
                ("RE_B1", Tier::Tier3RedOrAmber),
                ("RE_C1", Tier::Tier1),
            ]
        );
        Ok(())
    }

    #[test]
    fn records_carry_case_and_panel_provenance() -> Result<(), anyhow::Error> {
        let case = reconciled_case();
        let records = Runner::new().run(&case).collect::<Result<Vec<_>, _>>()?;

        let first = &records[0];
        assert_eq!(first.case_id, "1234-1");
        assert_eq!(first.tier, "TIER3");
        assert_eq!(first.gene.as_deref(), Some("ACVRL1"));
        assert_eq!(first.panel_id, 123);
        assert_eq!(first.panel_name, "Intellectual disability");
        assert_eq!(first.hgnc_id.as_deref(), Some("HGNC:175"));
        assert_eq!(first.confidence.as_deref(), Some("3"));
        assert_eq!(first.panel_substitutions, "Early onset dystonia, 456");
        assert_eq!(first.tier3_count, 4);
        assert_eq!(first.tool_version, env!("CARGO_PKG_VERSION"));

        // The reconciled event reports the replacement panel's provenance.
        let last = &records[2];
        assert_eq!(last.event_panel_name, "Early onset dystonia");
        assert_eq!(last.panel_id, 456);
        assert_eq!(last.panel_name, "Dystonia");
        Ok(())
    }

    #[test]
    fn events_under_unresolvable_panels_are_dropped() -> Result<(), anyhow::Error> {
        // Without reconciliation, the "Early onset dystonia" event has no
        // panel in the mapping and is silently skipped.
        let provider = FixtureProvider::new();
        let case = Case::new(crate::case::test::fixture_record(), &provider)?;
        let records = Runner::new().run(&case).collect::<Result<Vec<_>, _>>()?;

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.event_id != "RE_C1"));
        Ok(())
    }

    #[test]
    fn case_with_zero_report_events_yields_zero_records() -> Result<(), anyhow::Error> {
        let mut record = crate::case::test::fixture_record();
        for genome in &mut record.interpreted_genome {
            genome.interpreted_genome_data.variants.clear();
        }
        let case = Case::new(record, &FixtureProvider::new())?;
        let records = Runner::new().run(&case).collect::<Result<Vec<_>, _>>()?;
        assert!(records.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_gene_entities_error_the_run() -> Result<(), anyhow::Error> {
        let mut record = crate::case::test::fixture_record();
        for genome in &mut record.interpreted_genome {
            for variant in &mut genome.interpreted_genome_data.variants {
                for event in &mut variant.report_events {
                    if event.report_event_id == "RE_A1" {
                        event.genomic_entities.push(GenomicEntity {
                            entity_type: "gene".into(),
                            gene_symbol: Some("EXTRA".into()),
                            ensembl_id: None,
                        });
                    }
                }
            }
        }
        let case = Case::new(record, &FixtureProvider::new())?;
        let result = Runner::new().run(&case).collect::<Result<Vec<_>, _>>();
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn run_is_repeatable_on_the_same_case() -> Result<(), anyhow::Error> {
        let case = reconciled_case();
        let runner = Runner::new();
        let first = runner.run(&case).collect::<Result<Vec<_>, _>>()?;
        let second = runner.run(&case).collect::<Result<Vec<_>, _>>()?;
        assert_eq!(first, second);
        Ok(())
    }
}
