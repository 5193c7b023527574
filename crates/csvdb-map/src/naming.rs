//! Identifier derivation and collision-free column naming.

use std::collections::BTreeSet;
use std::path::Path;

/// Collapse every run of non-alphanumeric characters into a single `_`.
///
/// Leading and trailing whitespace is dropped first, so `" First  Name "`
/// becomes `First_Name`.
pub fn sanitize_identifier(raw: &str) -> String {
    let mut sanitized = String::with_capacity(raw.len());
    let mut in_run = false;
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            sanitized.push(ch);
            in_run = false;
        } else if !in_run {
            sanitized.push('_');
            in_run = true;
        }
    }
    sanitized
}

/// Name given to a column that has neither an explicit name nor a header.
pub fn synthesized_column_name(index: usize) -> String {
    format!("column_{index}")
}

/// Default table name for an input file: its sanitized file stem.
pub fn derive_table_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|stem| sanitize_identifier(&stem.to_string_lossy()))
        .unwrap_or_default();
    if stem.is_empty() {
        "data".to_string()
    } else {
        stem
    }
}

/// Hands out unique names in request order.
///
/// The first request for a name gets it unchanged. Later requests get
/// `<name>_<n>` with the smallest `n >= 1` not handed out (or reserved) yet.
#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    used: BTreeSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as taken without handing it out.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.used.insert(name.into());
    }

    pub fn allocate(&mut self, name: &str) -> String {
        if self.used.insert(name.to_string()) {
            return name.to_string();
        }
        let mut suffix = 1usize;
        loop {
            let candidate = format!("{name}_{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn sanitizes_runs() {
        assert_eq!(sanitize_identifier("First Name"), "First_Name");
        assert_eq!(sanitize_identifier(" e-mail  address "), "e_mail_address");
        assert_eq!(sanitize_identifier("a--//b"), "a_b");
        assert_eq!(sanitize_identifier("(%)"), "_");
        assert_eq!(sanitize_identifier("   "), "");
    }

    #[test]
    fn deduplicates_in_order() {
        let mut names = NameAllocator::new();
        let resolved: Vec<String> = ["Name", "Name_1", "Name", "Animal", "Animal"]
            .iter()
            .map(|name| names.allocate(name))
            .collect();
        assert_eq!(resolved, ["Name", "Name_1", "Name_2", "Animal", "Animal_1"]);
    }

    #[test]
    fn reserved_names_are_skipped() {
        let mut names = NameAllocator::new();
        names.reserve("id");
        assert_eq!(names.allocate("id"), "id_1");
        assert_eq!(names.allocate("id"), "id_2");
    }

    #[test]
    fn table_name_from_file_stem() {
        assert_eq!(derive_table_name(Path::new("/data/sales 2024.csv")), "sales_2024");
        assert_eq!(derive_table_name(Path::new("/data/.csv")), "_csv");
        assert_eq!(derive_table_name(Path::new("/")), "data");
    }

    proptest! {
        #[test]
        fn allocated_names_are_unique(raw in prop::collection::vec("[ab](_[12])?", 0..30)) {
            let mut names = NameAllocator::new();
            let resolved: Vec<String> = raw.iter().map(|name| names.allocate(name)).collect();
            let unique: BTreeSet<&String> = resolved.iter().collect();
            prop_assert_eq!(unique.len(), resolved.len());
        }

        #[test]
        fn first_occurrence_keeps_its_name(raw in prop::collection::vec("[abc]", 1..20)) {
            let mut names = NameAllocator::new();
            let resolved: Vec<String> = raw.iter().map(|name| names.allocate(name)).collect();
            prop_assert_eq!(&resolved[0], &raw[0]);
        }
    }
}
