//! Paginated, searchable help listings
//!
//! A [`CommandHelp`] is a snapshot of the sub-commands of one root that the
//! issuer may run. It can be searched and paged, then handed to the
//! manager's [`CommandHelpFormatter`] for display.

mod formatter;

use std::cmp::Reverse;

pub use formatter::{CommandHelpFormatter, DefaultHelpFormatter};

use crate::commands::{CommandExecutionContext, CommandManager, RegisteredCommand};
use crate::error::ArgumentError;
use crate::issuer::CommandIssuer;
use crate::messages::{MessageKey, MessageType};
use crate::util::is_integer;

/// One listed sub-command
#[derive(Debug, Clone, PartialEq)]
pub struct HelpEntry {
    command: String,
    labels: Vec<String>,
    syntax: String,
    description: String,
    search_tags: Option<String>,
    search_score: u32,
}

impl HelpEntry {
    pub(crate) fn new(command: &RegisteredCommand) -> Self {
        Self {
            command: command.command(),
            labels: command.labels().to_vec(),
            syntax: command.syntax_text(),
            description: command.description().unwrap_or_default().to_string(),
            search_tags: command.search_tags().map(str::to_string),
            search_score: 1,
        }
    }

    /// Full command text, e.g. `tag add`
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn syntax(&self) -> &str {
        &self.syntax
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn search_tags(&self) -> Option<&str> {
        self.search_tags.as_deref()
    }

    /// Relevance to the current search; entries scoring 0 are hidden
    pub fn search_score(&self) -> u32 {
        self.search_score
    }

    fn score(&self, term: &str) -> u32 {
        let term = term.to_lowercase();
        let matches = |text: &str| text.to_lowercase().contains(&term);

        let mut score = 0;
        for label in &self.labels {
            let label = label.to_lowercase();
            if label.contains(&term) {
                score += 3;
            } else if !label.is_empty() && term.contains(&label) {
                score += 1;
            }
        }
        if matches(&self.description) {
            score += 2;
        }
        if matches(&self.syntax) {
            score += 1;
        }
        if self.search_tags.as_deref().is_some_and(matches) {
            score += 2;
        }
        score
    }
}

/// One page of a help listing
#[derive(Debug, Clone, PartialEq)]
pub struct HelpResults {
    pub entries: Vec<HelpEntry>,
    pub page: usize,
    pub per_page: usize,
    pub total_results: usize,
    pub total_pages: usize,
    pub last_page: bool,
    pub search: Option<Vec<String>>,
    /// False when a search matched nothing and every entry is listed instead
    pub search_matched: bool,
}

/// Outcome of paging a listing
#[derive(Debug, Clone, PartialEq)]
pub enum HelpPage {
    Results(HelpResults),
    /// The requested page starts past the last entry
    NoResults,
}

/// Help listing for one root
#[derive(Debug, Clone)]
pub struct CommandHelp {
    command_name: String,
    command_prefix: String,
    entries: Vec<HelpEntry>,
    page: usize,
    per_page: usize,
    search: Option<Vec<String>>,
}

impl CommandHelp {
    pub fn new(
        command_name: impl Into<String>,
        command_prefix: impl Into<String>,
        mut entries: Vec<HelpEntry>,
        per_page: usize,
    ) -> Self {
        entries.sort_by(|a, b| a.command.cmp(&b.command).then_with(|| a.syntax.cmp(&b.syntax)));
        Self {
            command_name: command_name.into(),
            command_prefix: command_prefix.into(),
            entries,
            page: 1,
            per_page: per_page.max(1),
            search: None,
        }
    }

    /// Root label the listing is for
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// `/` for players, empty for the console
    pub fn command_prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Every entry, alphabetical
    pub fn entries(&self) -> &[HelpEntry] {
        &self.entries
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn search(&self) -> Option<&[String]> {
        self.search.as_deref()
    }

    /// 1-based page number
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
    }

    /// Score every entry against `search`; `None` clears the search
    pub fn set_search(&mut self, search: Option<Vec<String>>) {
        for entry in &mut self.entries {
            entry.search_score = match &search {
                Some(terms) => terms.iter().map(|t| entry.score(t)).sum(),
                None => 1,
            };
        }
        self.search = search;
    }

    /// Cut out the current page
    pub fn page_view(&self) -> HelpPage {
        let mut listed: Vec<&HelpEntry> = self.entries.iter().filter(|e| e.search_score > 0).collect();
        let mut search_matched = true;
        if self.search.is_some() {
            if listed.is_empty() {
                search_matched = false;
                listed = self.entries.iter().collect();
            } else {
                listed.sort_by_key(|e| Reverse(e.search_score));
            }
        }

        let total_results = listed.len();
        let min = match self.page.saturating_sub(1).checked_mul(self.per_page) {
            Some(min) if min < total_results => min,
            _ => return HelpPage::NoResults,
        };
        let max = min.saturating_add(self.per_page);

        HelpPage::Results(HelpResults {
            entries: listed[min..max.min(total_results)].iter().map(|e| (*e).clone()).collect(),
            page: self.page,
            per_page: self.per_page,
            total_results,
            total_pages: total_results.div_ceil(self.per_page),
            last_page: max >= total_results,
            search: self.search.clone(),
            search_matched,
        })
    }

    /// Render the current page to `issuer` with the manager's formatter
    pub fn show_help(&self, manager: &CommandManager, issuer: &dyn CommandIssuer) {
        let results = match self.page_view() {
            HelpPage::Results(results) => results,
            HelpPage::NoResults => {
                manager.send_key(issuer, MessageType::Info, MessageKey::NoResults, &[]);
                return;
            }
        };

        if !results.search_matched {
            let search = self.search.as_deref().unwrap_or_default().join(" ");
            manager.send_key(
                issuer,
                MessageType::Error,
                MessageKey::NoCommandsMatchedSearch,
                &[("<search>", search.as_str())],
            );
        }

        let formatter = manager.help_formatter();
        if self.search.is_some() && results.search_matched {
            formatter.show_search_results(manager, issuer, self, &results);
        } else {
            formatter.show_all_results(manager, issuer, self, &results);
        }
    }
}

/// Resolver for `CommandHelp` parameters: `[page] [search...]` or `[search...] [page]`.
///
/// A `perpage` flag or modifier overrides the configured page size.
pub(crate) fn resolve_command_help(
    ctx: &mut CommandExecutionContext<'_>,
) -> Result<CommandHelp, ArgumentError> {
    let page = if ctx.last_arg().is_some_and(is_integer) {
        ctx.pop_last_arg()
    } else if ctx.first_arg().is_some_and(is_integer) {
        ctx.pop_first_arg()
    } else {
        None
    };
    let search = ctx.drain_args();

    let mut help = ctx
        .manager()
        .generate_command_help(ctx.issuer(), ctx.command().root_name());
    help.set_page(page.and_then(|p| p.parse().ok()).unwrap_or(1));

    let per_page = ctx
        .flag_value("perpage")
        .or_else(|| ctx.modifier_value("perpage"))
        .and_then(|p| p.trim().parse().ok());
    if let Some(per_page) = per_page {
        help.set_per_page(per_page);
    }
    if !search.is_empty() {
        help.set_search(Some(search));
    }
    Ok(help)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(command: &str, description: &str) -> HelpEntry {
        HelpEntry {
            command: command.to_string(),
            labels: command.split_once(' ').map(|(_, l)| vec![l.to_string()]).unwrap_or_default(),
            syntax: "<name>".to_string(),
            description: description.to_string(),
            search_tags: None,
            search_score: 1,
        }
    }

    fn listing(count: usize) -> CommandHelp {
        let entries = (0..count)
            .map(|i| entry(&format!("tag sub{i:02}"), ""))
            .collect();
        CommandHelp::new("tag", "/", entries, 10)
    }

    #[test]
    fn test_pagination() {
        let mut help = listing(25);

        help.set_page(1);
        let HelpPage::Results(first) = help.page_view() else {
            panic!("page 1 should have results");
        };
        assert_eq!(first.entries.len(), 10);
        assert_eq!(first.total_pages, 3);
        assert!(!first.last_page);

        help.set_page(3);
        let HelpPage::Results(third) = help.page_view() else {
            panic!("page 3 should have results");
        };
        assert_eq!(third.entries.len(), 5);
        assert!(third.last_page);
        assert_eq!(third.total_results, 25);
        assert_eq!(third.entries[0].command(), "tag sub20");

        help.set_page(4);
        assert_eq!(help.page_view(), HelpPage::NoResults);
    }

    #[test]
    fn test_huge_page_has_no_results() {
        let mut help = listing(25);
        help.set_page(usize::MAX);
        assert_eq!(help.page_view(), HelpPage::NoResults);

        help.set_per_page(usize::MAX);
        help.set_page(2);
        assert_eq!(help.page_view(), HelpPage::NoResults);

        help.set_page(1);
        let HelpPage::Results(all) = help.page_view() else {
            panic!("page 1 should have results");
        };
        assert_eq!(all.entries.len(), 25);
        assert!(all.last_page);
    }

    #[test]
    fn test_entries_sorted() {
        let help = CommandHelp::new(
            "tag",
            "",
            vec![entry("tag remove", ""), entry("tag add", ""), entry("tag", "")],
            10,
        );
        let names: Vec<_> = help.entries().iter().map(HelpEntry::command).collect();
        assert_eq!(names, vec!["tag", "tag add", "tag remove"]);
    }

    #[test]
    fn test_search_scores() {
        let mut help = CommandHelp::new(
            "tag",
            "",
            vec![
                entry("tag add", "Create a tag"),
                entry("tag remove", "Delete a tag"),
                entry("tag list", "Show every tag you added"),
            ],
            10,
        );
        help.set_search(Some(vec!["add".to_string()]));

        let HelpPage::Results(results) = help.page_view() else {
            panic!("search should have results");
        };
        assert!(results.search_matched);
        assert_eq!(results.entries.len(), 2);
        // label match (+3) outranks description match (+2)
        assert_eq!(results.entries[0].command(), "tag add");
        assert_eq!(results.entries[0].search_score(), 3);
        assert_eq!(results.entries[1].command(), "tag list");
        assert_eq!(results.entries[1].search_score(), 2);
    }

    #[test]
    fn test_search_term_containing_label() {
        let mut help = CommandHelp::new(
            "tag",
            "",
            vec![entry("tag add", "Create a tag"), entry("tag remove", "Delete a tag")],
            10,
        );
        help.set_search(Some(vec!["adding".to_string()]));

        let HelpPage::Results(results) = help.page_view() else {
            panic!("search should have results");
        };
        assert!(results.search_matched);
        assert_eq!(results.entries.len(), 1);
        assert_eq!(results.entries[0].command(), "tag add");
        assert_eq!(results.entries[0].search_score(), 1);
    }

    #[test]
    fn test_unmatched_search_lists_everything() {
        let mut help = listing(3);
        help.set_search(Some(vec!["zzz".to_string()]));
        let HelpPage::Results(results) = help.page_view() else {
            panic!("fallback listing should have results");
        };
        assert!(!results.search_matched);
        assert_eq!(results.total_results, 3);
    }
}
