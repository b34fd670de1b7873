//! Gene panel metadata and the panel catalog provider contract.

pub mod client;

use rustc_hash::FxHashMap;

/// A curated gene panel.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Panel {
    /// Panel identifier.
    pub id: i64,
    /// Current panel name.
    pub name: String,
    /// Content hash of the panel.
    #[serde(default)]
    pub hash_id: Option<String>,
    /// Panel version, e.g. `3.2`.
    pub version: String,
    /// Timestamp the version was created.
    pub version_created: String,
    /// Genes on the panel.
    #[serde(default)]
    pub genes: Vec<PanelGene>,
}

/// One gene entry of a panel.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PanelGene {
    /// Identifiers of the gene.
    pub gene_data: GeneData,
    /// Curated confidence level, `0`..`4`.
    pub confidence_level: String,
    /// Curated mode of inheritance, free text.
    #[serde(default)]
    pub mode_of_inheritance: Option<String>,
}

/// Identifiers of a panel gene.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct GeneData {
    /// HGNC identifier.
    #[serde(default)]
    pub hgnc_id: Option<String>,
    /// Official HGNC gene symbol.
    #[serde(default)]
    pub hgnc_symbol: Option<String>,
    /// Ensembl identifiers, keyed by genome build and then build version.
    #[serde(default)]
    pub ensembl_genes: FxHashMap<String, FxHashMap<String, EnsemblGene>>,
}

/// Ensembl identifier entry for one genome build version.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct EnsemblGene {
    /// Ensembl gene identifier, e.g. `ENSG00000139567`.
    pub ensembl_id: String,
}

/// Gene metadata resolved by [`Panel::query`].
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct GeneMatch {
    /// HGNC identifier.
    pub hgnc_id: Option<String>,
    /// Official HGNC gene symbol.
    pub hgnc_symbol: Option<String>,
    /// Curated confidence level.
    pub confidence_level: String,
    /// The Ensembl identifier the gene was matched on.
    pub ensembl_id: String,
    /// Curated mode of inheritance.
    pub mode_of_inheritance: Option<String>,
}

impl GeneMatch {
    /// Whether the gene is curated with high confidence ("green").
    pub fn is_green(&self) -> bool {
        matches!(self.confidence_level.as_str(), "3" | "4")
    }
}

impl Panel {
    /// Query the panel for gene metadata by Ensembl identifier.
    ///
    /// The identifier is compared against the Ensembl identifiers recorded
    /// for every genome build of every panel gene.  This is a pure lookup
    /// into the gene list; network access only happens when the panel is
    /// fetched by a provider.
    ///
    /// # Returns
    ///
    /// Metadata of the first matching gene, or `None` if the gene is not on
    /// the panel.
    pub fn query(&self, ensembl_id: &str) -> Option<GeneMatch> {
        self.genes
            .iter()
            .find(|gene| {
                gene.gene_data
                    .ensembl_genes
                    .values()
                    .flat_map(|builds| builds.values())
                    .any(|entry| entry.ensembl_id == ensembl_id)
            })
            .map(|gene| GeneMatch {
                hgnc_id: gene.gene_data.hgnc_id.clone(),
                hgnc_symbol: gene.gene_data.hgnc_symbol.clone(),
                confidence_level: gene.confidence_level.clone(),
                ensembl_id: ensembl_id.to_string(),
                mode_of_inheritance: gene.mode_of_inheritance.clone(),
            })
    }
}

/// An entry of the paginated panel catalog listing.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CatalogPanel {
    /// Panel identifier.
    pub id: i64,
    /// Current panel name.
    pub name: String,
    /// Previous names and disorders the panel is relevant for.
    #[serde(default)]
    pub relevant_disorders: Vec<String>,
}

/// Access to panel metadata and the panel catalog.
///
/// Implementations perform the network access; callers remain free of
/// pagination, retry and authentication concerns.
pub trait PanelProvider {
    /// Fetch a panel by identifier or name, optionally pinned to a version.
    ///
    /// # Returns
    ///
    /// The panel, or `None` if the catalog has no panel under the given
    /// identifier.
    ///
    /// # Errors
    ///
    /// If the catalog cannot be reached.
    fn get_panel(&self, panel: &str, version: Option<&str>) -> Result<Option<Panel>, anyhow::Error>;

    /// Enumerate the full panel catalog.
    ///
    /// The order of the returned entries is the catalog serving order and is
    /// load-bearing: panel reconciliation resolves ambiguous names by first
    /// match.
    ///
    /// # Errors
    ///
    /// If the catalog cannot be reached.
    fn list_panels(&self) -> Result<Vec<CatalogPanel>, anyhow::Error>;
}

#[cfg(test)]
pub mod testutil {
    //! In-memory provider over fixture panels, shared by the unit tests.

    use super::{CatalogPanel, Panel, PanelProvider};

    /// Provider backed by a fixed set of panels.
    pub struct FixtureProvider {
        /// Panels served by the provider.
        pub panels: Vec<Panel>,
        /// Catalog listing served by the provider.
        pub catalog: Vec<CatalogPanel>,
    }

    impl FixtureProvider {
        /// Provider serving the `tests/data` panels.
        pub fn new() -> Self {
            Self {
                panels: vec![load_panel("tests/data/panel_123.json")],
                catalog: Vec::new(),
            }
        }
    }

    impl PanelProvider for FixtureProvider {
        fn get_panel(
            &self,
            panel: &str,
            _version: Option<&str>,
        ) -> Result<Option<Panel>, anyhow::Error> {
            Ok(self
                .panels
                .iter()
                .find(|p| p.name == panel || p.id.to_string() == panel)
                .cloned())
        }

        fn list_panels(&self) -> Result<Vec<CatalogPanel>, anyhow::Error> {
            Ok(self.catalog.clone())
        }
    }

    /// Load a panel fixture from a JSON file.
    pub fn load_panel(path: &str) -> Panel {
        let text = std::fs::read_to_string(path).expect("fixture exists");
        serde_json::from_str(&text).expect("valid panel JSON")
    }
}

#[cfg(test)]
mod test {
    use super::testutil::load_panel;

    #[test]
    fn query_returns_gene_metadata() {
        let panel = load_panel("tests/data/panel_123.json");
        let gene = panel.query("ENSG00000139567").expect("gene is on the panel");

        assert_eq!(gene.hgnc_id.as_deref(), Some("HGNC:175"));
        assert_eq!(gene.hgnc_symbol.as_deref(), Some("ACVRL1"));
        assert_eq!(gene.confidence_level, "3");
        assert_eq!(gene.ensembl_id, "ENSG00000139567");
        assert!(gene.is_green());
    }

    #[test]
    fn query_matches_identifiers_of_any_build() {
        let panel = load_panel("tests/data/panel_123.json");
        // ENO4 is recorded under a GRCh37-only identifier in the fixture.
        let gene = panel.query("ENSG00000188316").expect("gene is on the panel");
        assert_eq!(gene.hgnc_symbol.as_deref(), Some("ENO4"));
        assert!(!gene.is_green());
    }

    #[test]
    fn query_returns_none_for_absent_gene() {
        let panel = load_panel("tests/data/panel_123.json");
        assert_eq!(panel.query("ENSG00000000000"), None);
    }
}
