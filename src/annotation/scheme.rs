//! Registry of identifier families per annotation database.

use super::patterns::{
    category_of, IdentifierPattern, SourceField, CAZY_FAMILY, KEGG_ORTHOLOG, KEGG_PATHWAY,
};
use indexmap::IndexMap;

/// Description used for class prefixes missing from a lookup.
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// One kind of identifier pulled from every retained hit.
#[derive(Debug, Clone)]
pub struct IdentifierFamily {
    /// Short name, used in summary file names (`<prefix>_<name>_summary.txt`).
    pub name: &'static str,
    /// Column header in the detailed annotation table.
    pub column: &'static str,
    /// Key header in the frequency summary.
    pub label: &'static str,
    /// Plural display name for run summaries (e.g. "CAZy families").
    pub plural: &'static str,
    pub source: SourceField,
    pattern: IdentifierPattern,
}

impl IdentifierFamily {
    pub fn new(
        name: &'static str,
        column: &'static str,
        label: &'static str,
        plural: &'static str,
        source: SourceField,
        pattern: IdentifierPattern,
    ) -> Self {
        IdentifierFamily {
            name,
            column,
            label,
            plural,
            source,
            pattern,
        }
    }

    pub fn extract(&self, text: &str) -> Option<String> {
        self.pattern.extract(text)
    }
}

/// Coarser aggregation over the class prefix of one family's identifiers.
#[derive(Debug, Clone)]
pub struct CategoryTier {
    pub name: &'static str,
    pub column: &'static str,
    pub label: &'static str,
    pub plural: &'static str,
    /// Index of the family whose identifiers are projected to classes.
    pub family: usize,
    /// Class prefix -> (short, long) description.
    descriptions: IndexMap<&'static str, (&'static str, &'static str)>,
}

impl CategoryTier {
    pub fn short_description(&self, class: &str) -> &'static str {
        self.descriptions
            .get(class)
            .map_or(UNKNOWN_DESCRIPTION, |d| d.0)
    }

    pub fn long_description(&self, class: &str) -> &'static str {
        self.descriptions
            .get(class)
            .map_or(UNKNOWN_DESCRIPTION, |d| d.1)
    }
}

/// The set of patterns and lookups that drive one annotation run.
#[derive(Debug, Clone)]
pub struct AnnotationScheme {
    pub name: &'static str,
    /// Identity threshold applied when the caller does not give one.
    pub default_identity: f64,
    families: Vec<IdentifierFamily>,
    category: Option<CategoryTier>,
}

/// E-value threshold applied when the caller does not give one.
pub const DEFAULT_MAX_EVALUE: f64 = 1e-5;

impl AnnotationScheme {
    pub fn new(
        name: &'static str,
        default_identity: f64,
        families: Vec<IdentifierFamily>,
        category: Option<CategoryTier>,
    ) -> Self {
        AnnotationScheme {
            name,
            default_identity,
            families,
            category,
        }
    }

    /// Carbohydrate-active enzymes: family codes from the subject id, with a
    /// class tier (GH, GT, PL, CE, AA, CBM).
    pub fn cazy() -> Result<Self, regex::Error> {
        let family = IdentifierFamily::new(
            "family",
            "cazy_family",
            "CAZy_Family",
            "CAZy families",
            SourceField::Subject,
            IdentifierPattern::new(CAZY_FAMILY, 0)?,
        );
        let descriptions = IndexMap::from([
            (
                "GH",
                (
                    "Glycoside Hydrolases",
                    "Glycoside Hydrolases - enzymes that hydrolyze glycosidic bonds",
                ),
            ),
            (
                "GT",
                (
                    "Glycosyltransferases",
                    "Glycosyltransferases - enzymes that form glycosidic bonds",
                ),
            ),
            (
                "PL",
                (
                    "Polysaccharide Lyases",
                    "Polysaccharide Lyases - enzymes that cleave polysaccharides",
                ),
            ),
            (
                "CE",
                (
                    "Carbohydrate Esterases",
                    "Carbohydrate Esterases - enzymes that remove ester modifications",
                ),
            ),
            (
                "AA",
                (
                    "Auxiliary Activities",
                    "Auxiliary Activities - redox enzymes acting on lignin and polysaccharides",
                ),
            ),
            (
                "CBM",
                (
                    "Carbohydrate-Binding Modules",
                    "Carbohydrate-Binding Modules - modules that bind carbohydrates",
                ),
            ),
        ]);
        let tier = CategoryTier {
            name: "class",
            column: "cazy_class",
            label: "CAZy_Class",
            plural: "CAZy classes",
            family: 0,
            descriptions,
        };
        Ok(AnnotationScheme::new(
            "CAZy",
            40.0,
            vec![family],
            Some(tier),
        ))
    }

    /// KEGG orthology from the subject id and pathway maps from the description.
    pub fn kegg() -> Result<Self, regex::Error> {
        let ko = IdentifierFamily::new(
            "ko",
            "ko_id",
            "KO_ID",
            "KOs",
            SourceField::Subject,
            IdentifierPattern::new(KEGG_ORTHOLOG, 0)?,
        );
        let pathway = IdentifierFamily::new(
            "pathway",
            "pathway",
            "Pathway_ID",
            "pathways",
            SourceField::Title,
            IdentifierPattern::new(KEGG_PATHWAY, 1)?,
        );
        Ok(AnnotationScheme::new("KEGG", 50.0, vec![ko, pathway], None))
    }

    pub fn families(&self) -> &[IdentifierFamily] {
        &self.families
    }

    pub fn category(&self) -> Option<&CategoryTier> {
        self.category.as_ref()
    }

    /// Whether summaries for `family` carry a description column.
    pub fn describes(&self, family: &str) -> bool {
        self.category
            .as_ref()
            .and_then(|tier| self.families.get(tier.family))
            .map_or(false, |f| f.name == family)
    }

    /// Short description of an identifier's class, or [`UNKNOWN_DESCRIPTION`].
    pub fn short_description(&self, identifier: &str) -> &'static str {
        match (&self.category, category_of(identifier)) {
            (Some(tier), Some(class)) => tier.short_description(class),
            _ => UNKNOWN_DESCRIPTION,
        }
    }
}
