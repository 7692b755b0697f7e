//! Taxonomic annotations of nodes and the fields they can be compared by.

use std::fmt;

// =#========================================================================#=
// TAXONOMY
// =#========================================================================#=
/// Taxonomic annotation of a node: scientific name, code and numeric id,
/// each optional.
///
/// `PartialEq`/`Hash` are full structural equality, as needed for set
/// membership. For the looser "do these denote the same taxon" question use
/// [Taxonomy::is_equal].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Taxonomy {
    scientific_name: Option<String>,
    code: Option<String>,
    id: Option<u64>,
}

impl Taxonomy {
    /// Creates an empty taxonomy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a taxonomy with only a scientific name, e.g. `"Apteryx haastii"`.
    pub fn with_scientific_name(name: impl Into<String>) -> Self {
        Taxonomy {
            scientific_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Creates a taxonomy with only a code, e.g. `"APTHA"`.
    pub fn with_code(code: impl Into<String>) -> Self {
        Taxonomy {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Creates a taxonomy with only a numeric id.
    pub fn with_id(id: u64) -> Self {
        Taxonomy {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Returns the scientific name, if set.
    pub fn scientific_name(&self) -> Option<&str> {
        self.scientific_name.as_deref()
    }

    /// Returns the taxonomy code, if set.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns the numeric taxonomy id, if set.
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Sets the scientific name; empty strings unset it.
    pub fn set_scientific_name(&mut self, name: impl Into<String>) {
        self.scientific_name = non_empty(name.into());
    }

    /// Sets the code; empty strings unset it.
    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = non_empty(code.into());
    }

    /// Sets or unsets the numeric id.
    pub fn set_id(&mut self, id: Option<u64>) {
        self.id = id;
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.scientific_name.is_none() && self.code.is_none() && self.id.is_none()
    }

    /// Returns `true` if at least one field is set on both and has the same value.
    ///
    /// Strings are compared exactly (case-sensitive), ids numerically.
    pub fn is_equal(&self, other: &Taxonomy) -> bool {
        fn same<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
            matches!((a, b), (Some(x), Some(y)) if x == y)
        }
        same(&self.scientific_name, &other.scientific_name)
            || same(&self.code, &other.code)
            || same(&self.id, &other.id)
    }

    /// Returns the key of this taxonomy for the given comparison base, if the
    /// corresponding field is set.
    pub fn key(&self, base: TaxonomyComparisonBase) -> Option<TaxonomyKey> {
        match base {
            TaxonomyComparisonBase::ScientificName => {
                self.scientific_name.clone().map(TaxonomyKey::Text)
            }
            TaxonomyComparisonBase::Code => self.code.clone().map(TaxonomyKey::Text),
            TaxonomyComparisonBase::Id => self.id.map(TaxonomyKey::Id),
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Scientific name, then code, then id.
impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.scientific_name {
            write!(f, "{}", name)
        } else if let Some(code) = &self.code {
            write!(f, "{}", code)
        } else if let Some(id) = self.id {
            write!(f, "{}", id)
        } else {
            Ok(())
        }
    }
}


// =#========================================================================#=
// COMPARISON BASE
// =#========================================================================#=
/// The taxonomy field by which gene tree leaves are matched to species tree leaves.
///
/// Variants are listed in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomyComparisonBase {
    ScientificName,
    Code,
    Id,
}

impl TaxonomyComparisonBase {
    /// All bases in order of preference.
    pub const PRIORITY: [TaxonomyComparisonBase; 3] = [
        TaxonomyComparisonBase::ScientificName,
        TaxonomyComparisonBase::Code,
        TaxonomyComparisonBase::Id,
    ];

    /// Returns `true` if `taxonomy` has the field this base compares by.
    pub fn is_present(&self, taxonomy: &Taxonomy) -> bool {
        match self {
            TaxonomyComparisonBase::ScientificName => taxonomy.scientific_name.is_some(),
            TaxonomyComparisonBase::Code => taxonomy.code.is_some(),
            TaxonomyComparisonBase::Id => taxonomy.id.is_some(),
        }
    }
}

impl fmt::Display for TaxonomyComparisonBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaxonomyComparisonBase::ScientificName => "scientific name",
            TaxonomyComparisonBase::Code => "taxonomy code",
            TaxonomyComparisonBase::Id => "taxonomy id",
        };
        f.write_str(s)
    }
}

/// Value of a single taxonomy field, used as lookup key when mapping leaves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaxonomyKey {
    /// Scientific name or code
    Text(String),
    /// Numeric id
    Id(u64),
}

impl fmt::Display for TaxonomyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxonomyKey::Text(s) => write!(f, "{}", s),
            TaxonomyKey::Id(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_equal_any_field() {
        let mut a = Taxonomy::with_scientific_name("Apteryx owenii");
        a.set_code("APTOW");
        let b = Taxonomy::with_code("APTOW");
        assert!(a.is_equal(&b));
        assert_ne!(a, b);
        assert!(!a.is_equal(&Taxonomy::with_code("aptow")));
        assert!(!Taxonomy::new().is_equal(&Taxonomy::new()));
    }

    #[test]
    fn test_display_priority() {
        let mut t = Taxonomy::with_id(8822);
        assert_eq!(t.to_string(), "8822");
        t.set_code("APTHA");
        assert_eq!(t.to_string(), "APTHA");
        t.set_scientific_name("Apteryx haastii");
        assert_eq!(t.to_string(), "Apteryx haastii");
    }
}
