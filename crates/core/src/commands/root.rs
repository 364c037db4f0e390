//! Root command sub-label tables

use std::collections::BTreeMap;

use super::group::SubcommandKind;
use super::registered::{CommandKey, GroupKey};

/// Table key for default sub-commands
pub const DEFAULT_LABEL: &str = "__default";

/// Table key for catch-unknown sub-commands
pub const CATCH_UNKNOWN_LABEL: &str = "__catchunknown";

/// A top-level label and every sub-command registered under it
#[derive(Debug, Clone, Default)]
pub struct RootCommand {
    name: String,
    subcommands: BTreeMap<String, Vec<CommandKey>>,
    groups: Vec<GroupKey>,
}

impl RootCommand {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Lowercased root label
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn add(&mut self, label: &str, key: CommandKey) {
        let keys = self.subcommands.entry(label.to_string()).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    pub(crate) fn add_group(&mut self, group: GroupKey) {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }

    /// Remove every entry of a registration. Returns true if anything changed.
    pub(crate) fn remove_group(&mut self, group: GroupKey, keys: &[CommandKey]) -> bool {
        let before = self.len();
        for entries in self.subcommands.values_mut() {
            entries.retain(|k| !keys.contains(k));
        }
        self.subcommands.retain(|_, entries| !entries.is_empty());
        self.groups.retain(|g| *g != group);
        before != self.len()
    }

    /// Candidates under a table label, in registration order
    pub fn get(&self, label: &str) -> &[CommandKey] {
        self.subcommands.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn defaults(&self) -> &[CommandKey] {
        self.get(DEFAULT_LABEL)
    }

    pub fn catch_unknowns(&self) -> &[CommandKey] {
        self.get(CATCH_UNKNOWN_LABEL)
    }

    /// Literal sub-labels, sorted
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.subcommands
            .keys()
            .map(String::as_str)
            .filter(|l| *l != DEFAULT_LABEL && *l != CATCH_UNKNOWN_LABEL)
    }

    /// Every table entry, including the special labels
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[CommandKey])> {
        self.subcommands
            .iter()
            .map(|(label, keys)| (label.as_str(), keys.as_slice()))
    }

    /// Registrations that contributed to this root
    pub fn groups(&self) -> &[GroupKey] {
        &self.groups
    }

    /// Number of (label, sub-command) entries
    pub fn len(&self) -> usize {
        self.subcommands.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subcommands.is_empty()
    }
}

/// Table label a sub-command kind is filed under
pub(crate) fn table_labels(kind: SubcommandKind, labels: &[String]) -> Vec<String> {
    match kind {
        SubcommandKind::Labeled => labels.to_vec(),
        SubcommandKind::Default => vec![DEFAULT_LABEL.to_string()],
        SubcommandKind::CatchUnknown => vec![CATCH_UNKNOWN_LABEL.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut commands: SlotMap<CommandKey, ()> = SlotMap::with_key();
        let mut groups: SlotMap<GroupKey, ()> = SlotMap::with_key();
        let a = commands.insert(());
        let b = commands.insert(());
        let g1 = groups.insert(());
        let g2 = groups.insert(());

        let mut root = RootCommand::new("tag");
        root.add("add", a);
        root.add("add", a);
        root.add(DEFAULT_LABEL, b);
        root.add_group(g1);
        root.add_group(g2);

        assert_eq!(root.get("add"), [a]);
        assert_eq!(root.defaults(), [b]);
        assert_eq!(root.labels().collect::<Vec<_>>(), vec!["add"]);
        assert_eq!(root.len(), 2);

        assert!(root.remove_group(g1, &[a]));
        assert!(root.get("add").is_empty());
        assert_eq!(root.groups(), [g2]);
        assert!(!root.is_empty());

        assert!(!root.remove_group(g1, &[a]));
        assert!(root.remove_group(g2, &[b]));
        assert!(root.is_empty());
    }

    #[test]
    fn test_table_labels() {
        let labels = vec!["add".to_string(), "a".to_string()];
        assert_eq!(table_labels(SubcommandKind::Labeled, &labels), labels);
        assert_eq!(
            table_labels(SubcommandKind::Default, &labels),
            vec![DEFAULT_LABEL]
        );
    }
}
