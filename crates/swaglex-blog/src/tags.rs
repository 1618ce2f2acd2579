//! Grouping of tagged entries by tag name.

use std::collections::HashMap;

/// Entries grouped under every tag they carry.
///
/// Tags keep the order in which they were first seen and entries keep their
/// insertion order within a tag. Tag identity is exact, case-sensitive
/// string equality.
#[derive(Debug, Clone, PartialEq)]
pub struct TagIndex<T> {
    groups: Vec<TagGroup<T>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagGroup<T> {
    pub name: String,
    pub entries: Vec<T>,
}

impl<T> TagGroup<T> {
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

impl<T: Clone> TagIndex<T> {
    /// Builds the index from `(tags, entry)` pairs. An entry carrying the same
    /// tag twice is counted once for that tag.
    pub fn build<'a, I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: IntoIterator<Item = &'a String>,
    {
        let mut positions: HashMap<&'a str, usize> = HashMap::new();
        let mut groups: Vec<TagGroup<T>> = Vec::new();

        for (tags, entry) in items {
            let mut seen_here: Vec<usize> = Vec::new();

            for tag in tags {
                let position = *positions.entry(tag.as_str()).or_insert_with(|| {
                    groups.push(TagGroup {
                        name: tag.clone(),
                        entries: Vec::new(),
                    });
                    groups.len() - 1
                });

                if !seen_here.contains(&position) {
                    seen_here.push(position);
                    groups[position].entries.push(entry.clone());
                }
            }
        }

        Self { groups }
    }
}

impl<T> TagIndex<T> {
    pub fn get(&self, name: &str) -> Option<&TagGroup<T>> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_groups(self) -> Vec<TagGroup<T>> {
        self.groups
    }
}

impl<T> IntoIterator for TagIndex<T> {
    type Item = TagGroup<T>;
    type IntoIter = std::vec::IntoIter<TagGroup<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_counts_per_tag() {
        let items = [tags(&["a", "b"]), tags(&["a"])];
        let index = TagIndex::build(items.iter().enumerate().map(|(i, t)| (t, i)));

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a").map(TagGroup::count), Some(2));
        assert_eq!(index.get("b").map(TagGroup::count), Some(1));
        assert!(index.get("c").is_none());
        assert_eq!(index.get("a").unwrap().entries, vec![0, 1]);
    }

    #[test]
    fn test_tags_are_case_sensitive_and_ordered() {
        let items = [tags(&["Rust", "api"]), tags(&["rust"])];
        let index = TagIndex::build(items.iter().map(|t| (t, ())));
        assert_eq!(index.names().collect::<Vec<_>>(), vec!["Rust", "api", "rust"]);
    }

    #[test]
    fn test_duplicate_tag_on_one_entry_counts_once() {
        let items = [tags(&["a", "a"])];
        let index = TagIndex::build(items.iter().map(|t| (t, "x")));
        assert_eq!(index.get("a").map(TagGroup::count), Some(1));
    }

    #[test]
    fn test_empty_input() {
        let items: Vec<Vec<String>> = Vec::new();
        let index = TagIndex::build(items.iter().map(|t| (t, ())));
        assert!(index.is_empty());
    }
}
