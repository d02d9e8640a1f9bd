use std::collections::BTreeMap;

/// Case-normalize a field or sublist id
pub fn normalize_field_id(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

/// Which fields of a sublist's lines to return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelection {
    /// Every field present on each line
    All,
    /// Only the named fields
    Named(Vec<String>),
}

impl FieldSelection {
    /// An empty id list selects every field
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let named = normalized_ids(ids);
        if named.is_empty() {
            FieldSelection::All
        } else {
            FieldSelection::Named(named)
        }
    }
}

/// What to project out of a loaded record
///
/// `fields` empty means only the primary key is returned. Sublists are keyed
/// by normalized sublist id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionSpec {
    pub fields: Vec<String>,
    pub sublists: BTreeMap<String, FieldSelection>,
}

impl ProjectionSpec {
    /// Key-only projection
    pub fn key_only() -> Self {
        Self::default()
    }

    pub fn with_fields<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fields = normalized_ids(ids);
        self
    }

    pub fn with_sublist<I, S>(mut self, sublist_id: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sublists
            .insert(normalize_field_id(sublist_id), FieldSelection::from_ids(ids));
        self
    }

    pub fn is_key_only(&self) -> bool {
        self.fields.is_empty() && self.sublists.is_empty()
    }
}

/// Normalize, drop blanks and drop repeats while keeping request order
fn normalized_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        let id = normalize_field_id(id.as_ref());
        if !id.is_empty() && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sublist_selection_means_all() {
        assert_eq!(FieldSelection::from_ids(Vec::<String>::new()), FieldSelection::All);
        assert_eq!(FieldSelection::from_ids([" "]), FieldSelection::All);
    }

    #[test]
    fn test_fields_are_normalized_and_deduplicated() {
        let spec = ProjectionSpec::key_only().with_fields(["Email", "email", " CompanyName "]);
        assert_eq!(spec.fields, vec!["email", "companyname"]);
    }

    #[test]
    fn test_key_only() {
        assert!(ProjectionSpec::key_only().is_key_only());
        let spec = ProjectionSpec::key_only().with_sublist("AddressBook", ["city"]);
        assert!(!spec.is_key_only());
        assert_eq!(
            spec.sublists.get("addressbook"),
            Some(&FieldSelection::Named(vec!["city".to_string()]))
        );
    }
}
