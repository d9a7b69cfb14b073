//! Identifier extraction primitives.

use crate::io::hits::HitRecord;
use regex::Regex;

/// CAZy families: class code followed by the family number (`GH13`, `CBM48`).
pub const CAZY_FAMILY: &str = r"(?:GH|GT|PL|CE|AA|CBM)\d+";

/// KEGG orthology identifiers (`K00001`).
pub const KEGG_ORTHOLOG: &str = r"K\d{5}";

/// KEGG pathway references embedded in a description (`[PATH:ko00010]`).
pub const KEGG_PATHWAY: &str = r"\[PATH:(ko\d{5})\]";

/// Which field of a hit an identifier family is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceField {
    Subject,
    Title,
}

impl SourceField {
    pub fn of<'a>(&self, record: &'a HitRecord) -> &'a str {
        match self {
            SourceField::Subject => &record.subject,
            SourceField::Title => &record.subject_title,
        }
    }
}

/// A compiled pattern and the capture group that forms the identifier.
#[derive(Debug, Clone)]
pub struct IdentifierPattern {
    regex: Regex,
    group: usize,
}

impl IdentifierPattern {
    pub fn new(pattern: &str, group: usize) -> Result<Self, regex::Error> {
        Ok(IdentifierPattern {
            regex: Regex::new(pattern)?,
            group,
        })
    }

    /// Returns the leftmost match, or `None` when the text carries no identifier.
    pub fn extract(&self, text: &str) -> Option<String> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(self.group))
            .map(|m| m.as_str().to_string())
    }
}

/// The class prefix of an identifier: its leading alphabetic run.
pub fn category_of(identifier: &str) -> Option<&str> {
    let end = identifier
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(identifier.len());
    (end > 0).then(|| &identifier[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cazy() -> IdentifierPattern {
        IdentifierPattern::new(CAZY_FAMILY, 0).unwrap()
    }

    #[test]
    fn test_cazy_family_extraction() {
        let pattern = cazy();
        assert_eq!(pattern.extract("ref|GH13.4|").as_deref(), Some("GH13"));
        assert_eq!(pattern.extract("AAB12345.1|CBM48|GH13_9").as_deref(), Some("CBM48"));
        assert_eq!(pattern.extract("WP_000123.1|AA10").as_deref(), Some("AA10"));
        assert_eq!(pattern.extract("no family here"), None);
        assert_eq!(pattern.extract("GH"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let pattern = cazy();
        assert_eq!(pattern.extract("GT2|GH5").as_deref(), Some("GT2"));
        assert_eq!(pattern.extract("x|PL1|CE4|").as_deref(), Some("PL1"));
    }

    #[test]
    fn test_kegg_patterns() {
        let ko = IdentifierPattern::new(KEGG_ORTHOLOG, 0).unwrap();
        assert_eq!(ko.extract("ko:K00001").as_deref(), Some("K00001"));
        assert_eq!(ko.extract("K0001"), None);

        let pathway = IdentifierPattern::new(KEGG_PATHWAY, 1).unwrap();
        assert_eq!(
            pathway.extract("alcohol dehydrogenase [EC:1.1.1.1] [PATH:ko00010] [PATH:ko00071]").as_deref(),
            Some("ko00010")
        );
        assert_eq!(pathway.extract("hypothetical protein"), None);
        assert_eq!(pathway.extract("[PATH:map00010]"), None);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let pattern = cazy();
        let subjects = ["ref|GH13.4|", "CE1|x", "none", "CBM50"];
        let first: Vec<_> = subjects.iter().map(|s| pattern.extract(s)).collect();
        let second: Vec<_> = subjects.iter().rev().map(|s| pattern.extract(s)).collect();
        assert_eq!(first, second.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_category_is_prefix() {
        assert_eq!(category_of("GH13"), Some("GH"));
        assert_eq!(category_of("CBM48"), Some("CBM"));
        assert_eq!(category_of("K00001"), Some("K"));
        assert_eq!(category_of("13"), None);

        let pattern = cazy();
        for subject in ["ref|GH13.4|", "GT2", "x|PL22|", "AA9", "CE16", "CBM1"] {
            let id = pattern.extract(subject).unwrap();
            let class = category_of(&id).unwrap();
            assert!(!class.is_empty());
            assert!(id.starts_with(class));
        }
    }
}
