//! Shared data structures for `retier`.

use crate::case::ds::{
    GenePanelRef, RawReportEvent, Variant, VariantCall, VariantConsequence, VariantCoordinates,
};

/// One gene-level interpretation bundled with its variant context and the
/// proband's genotype call.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEvent {
    /// Report event identifier.
    pub event_id: String,
    /// Tier originally assigned by the pipeline.
    pub tier: String,
    /// HGNC symbol of the gene the event refers to.
    pub gene_symbol: Option<String>,
    /// Ensembl identifier of the gene the event refers to.
    pub ensembl_id: Option<String>,
    /// Zygosity of the proband's call.
    pub zygosity: Option<String>,
    /// Mode of inheritance assumed by the pipeline.
    pub mode_of_inheritance: Option<String>,
    /// Observed segregation pattern.
    pub segregation_pattern: Option<String>,
    /// Variant consequence annotations.
    pub consequences: Vec<VariantConsequence>,
    /// The panel the event was evaluated under at analysis time.
    pub panel: GenePanelRef,
    /// Coordinates of the parent variant.
    pub coordinates: VariantCoordinates,
    /// Free-text justification recorded by the pipeline.
    pub justification: Option<String>,
    /// Penetrance assumption.
    pub penetrance: Option<String>,
    /// De novo quality score.
    pub de_novo_quality_score: Option<f64>,
    /// Report event score.
    pub score: Option<f64>,
    /// Identifier grouping compound heterozygous variants.
    pub group_of_variants: Option<i64>,
}

impl ReportEvent {
    /// Build the value object for one report event.
    ///
    /// # Errors
    ///
    /// If the underlying data names zero or more than one genomic entity of
    /// type gene, or carries no panel reference.  Both signal malformed
    /// upstream data and are treated as hard contract violations.
    pub fn new(
        event: &RawReportEvent,
        variant: &Variant,
        call: &VariantCall,
    ) -> Result<Self, anyhow::Error> {
        let genes = event
            .genomic_entities
            .iter()
            .filter(|entity| entity.entity_type == "gene")
            .collect::<Vec<_>>();
        let gene = match genes.as_slice() {
            [gene] => *gene,
            _ => anyhow::bail!(
                "report event {} names {} genomic entities of type gene, expected exactly one",
                &event.report_event_id,
                genes.len()
            ),
        };
        let panel = event.gene_panel.clone().ok_or_else(|| {
            anyhow::anyhow!("report event {} has no gene panel", &event.report_event_id)
        })?;

        Ok(Self {
            event_id: event.report_event_id.clone(),
            tier: event.tier.clone().unwrap_or_default(),
            gene_symbol: gene.gene_symbol.clone(),
            ensembl_id: gene.ensembl_id.clone(),
            zygosity: call.zygosity.clone(),
            mode_of_inheritance: event.mode_of_inheritance.clone(),
            segregation_pattern: event.segregation_pattern.clone(),
            consequences: event.variant_consequences.clone(),
            panel,
            coordinates: variant.variant_coordinates.clone(),
            justification: event.event_justification.clone(),
            penetrance: event.penetrance.clone(),
            de_novo_quality_score: event.de_novo_quality_score,
            score: event.score,
            group_of_variants: event.group_of_variants,
        })
    }

    /// Name of the panel the event was evaluated under.
    pub fn panel_name(&self) -> &str {
        &self.panel.panel_name
    }
}

#[cfg(test)]
mod test {
    use crate::case::ds::{
        GenePanelRef, GenomicEntity, RawReportEvent, Variant, VariantCall, VariantCoordinates,
    };

    use super::ReportEvent;

    fn gene_entity(symbol: &str) -> GenomicEntity {
        GenomicEntity {
            entity_type: "gene".into(),
            gene_symbol: Some(symbol.into()),
            ensembl_id: Some("ENSG00000139567".into()),
        }
    }

    fn raw_event(entities: Vec<GenomicEntity>) -> RawReportEvent {
        RawReportEvent {
            report_event_id: "RE_1".into(),
            tier: Some("TIER3".into()),
            gene_panel: Some(GenePanelRef {
                panel_name: "Intellectual disability".into(),
                panel_identifier: None,
                panel_version: None,
                source: None,
            }),
            genomic_entities: entities,
            mode_of_inheritance: None,
            segregation_pattern: None,
            variant_consequences: Vec::new(),
            event_justification: None,
            penetrance: None,
            de_novo_quality_score: None,
            score: None,
            group_of_variants: None,
        }
    }

    fn variant() -> Variant {
        Variant {
            variant_coordinates: VariantCoordinates {
                assembly: "GRCh38".into(),
                chromosome: "12".into(),
                position: 52300000,
                reference: "C".into(),
                alternate: "T".into(),
            },
            variant_calls: Vec::new(),
            report_events: Vec::new(),
        }
    }

    fn call() -> VariantCall {
        VariantCall {
            participant_id: "115000123".into(),
            zygosity: Some("heterozygous".into()),
        }
    }

    #[test]
    fn exactly_one_gene_entity_is_accepted() -> Result<(), anyhow::Error> {
        let event = ReportEvent::new(&raw_event(vec![gene_entity("ACVRL1")]), &variant(), &call())?;
        assert_eq!(event.gene_symbol.as_deref(), Some("ACVRL1"));
        assert_eq!(event.panel_name(), "Intellectual disability");
        Ok(())
    }

    #[test]
    fn zero_gene_entities_are_a_contract_violation() {
        let err = ReportEvent::new(&raw_event(Vec::new()), &variant(), &call()).unwrap_err();
        assert!(err.to_string().contains("expected exactly one"), "{}", err);
    }

    #[test]
    fn multiple_gene_entities_are_a_contract_violation() {
        let entities = vec![gene_entity("ACVRL1"), gene_entity("ENO4")];
        let err = ReportEvent::new(&raw_event(entities), &variant(), &call()).unwrap_err();
        assert!(err.to_string().contains("expected exactly one"), "{}", err);
    }

    #[test]
    fn non_gene_entities_are_ignored() -> Result<(), anyhow::Error> {
        let mut entities = vec![gene_entity("ACVRL1")];
        entities.push(GenomicEntity {
            entity_type: "regulatory_region".into(),
            gene_symbol: None,
            ensembl_id: None,
        });
        let event = ReportEvent::new(&raw_event(entities), &variant(), &call())?;
        assert_eq!(event.gene_symbol.as_deref(), Some("ACVRL1"));
        Ok(())
    }
}
