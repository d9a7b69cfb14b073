//! Taxonomic rank utilities.
//!
//! Ranks are recognised purely by the MetaPhlAn clade-string markers
//! (`k__`, `p__`, ... `t__`); no taxonomy database is consulted.

use log::warn;

/// Taxonomic classification levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomicLevel {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
    Strain,
}

/// Level used when a requested name is not recognised.
pub const DEFAULT_LEVEL: TaxonomicLevel = TaxonomicLevel::Species;

impl TaxonomicLevel {
    /// Returns a string representation of the taxonomic level.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomicLevel::Kingdom => "kingdom",
            TaxonomicLevel::Phylum => "phylum",
            TaxonomicLevel::Class => "class",
            TaxonomicLevel::Order => "order",
            TaxonomicLevel::Family => "family",
            TaxonomicLevel::Genus => "genus",
            TaxonomicLevel::Species => "species",
            TaxonomicLevel::Strain => "strain",
        }
    }

    /// Clade-string marker that introduces a taxon at this level.
    pub fn marker(&self) -> &'static str {
        match self {
            TaxonomicLevel::Kingdom => "k__",
            TaxonomicLevel::Phylum => "p__",
            TaxonomicLevel::Class => "c__",
            TaxonomicLevel::Order => "o__",
            TaxonomicLevel::Family => "f__",
            TaxonomicLevel::Genus => "g__",
            TaxonomicLevel::Species => "s__",
            TaxonomicLevel::Strain => "t__",
        }
    }

    /// True for the deepest level.
    pub fn is_terminal(&self) -> bool {
        *self == TaxonomicLevel::Strain
    }

    /// Returns all taxonomic levels in hierarchical order.
    pub fn all_levels() -> Vec<TaxonomicLevel> {
        vec![
            TaxonomicLevel::Kingdom,
            TaxonomicLevel::Phylum,
            TaxonomicLevel::Class,
            TaxonomicLevel::Order,
            TaxonomicLevel::Family,
            TaxonomicLevel::Genus,
            TaxonomicLevel::Species,
            TaxonomicLevel::Strain,
        ]
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<TaxonomicLevel> {
        let name = name.trim();
        Self::all_levels()
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
    }

    /// Whether a clade string sits at this level.
    ///
    /// Non-terminal levels reject clades that also carry a strain segment.
    pub fn matches(&self, clade: &str) -> bool {
        let has_segment = |marker: &str| clade.split('|').any(|seg| seg.starts_with(marker));
        has_segment(self.marker())
            && (self.is_terminal() || !has_segment(TaxonomicLevel::Strain.marker()))
    }
}

/// Which rows of a merged table to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelRequest {
    All,
    Level(TaxonomicLevel),
}

/// Outcome of resolving a user-supplied level name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLevel {
    pub request: LevelRequest,
    /// The requested name when it was not recognised and the default was used.
    pub unrecognized: Option<String>,
}

/// Resolves `all` or a rank name; unknown names fall back to [`DEFAULT_LEVEL`].
pub fn resolve_level(name: &str) -> ResolvedLevel {
    if name.trim().eq_ignore_ascii_case("all") {
        return ResolvedLevel {
            request: LevelRequest::All,
            unrecognized: None,
        };
    }
    match TaxonomicLevel::from_name(name) {
        Some(level) => ResolvedLevel {
            request: LevelRequest::Level(level),
            unrecognized: None,
        },
        None => {
            warn!(
                "Unknown level '{}', using '{}'",
                name,
                DEFAULT_LEVEL.as_str()
            );
            ResolvedLevel {
                request: LevelRequest::Level(DEFAULT_LEVEL),
                unrecognized: Some(name.to_string()),
            }
        }
    }
}
