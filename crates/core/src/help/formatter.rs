//! Rendering a help page to an issuer

use super::{CommandHelp, HelpEntry, HelpResults};
use crate::commands::CommandManager;
use crate::issuer::CommandIssuer;
use crate::messages::{MessageKey, MessageType};

/// Turns a page of help into messages
///
/// Every method has a default built on the `help.*` message templates, so an
/// implementation only overrides the parts it wants to change.
pub trait CommandHelpFormatter: Send + Sync {
    fn show_all_results(
        &self,
        manager: &CommandManager,
        issuer: &dyn CommandIssuer,
        help: &CommandHelp,
        results: &HelpResults,
    ) {
        self.print_header(manager, issuer, help, results, MessageKey::HelpHeader);
        for entry in &results.entries {
            self.print_entry(manager, issuer, help, entry);
        }
        self.print_footer(manager, issuer, help, results);
    }

    fn show_search_results(
        &self,
        manager: &CommandManager,
        issuer: &dyn CommandIssuer,
        help: &CommandHelp,
        results: &HelpResults,
    ) {
        self.print_header(manager, issuer, help, results, MessageKey::HelpSearchHeader);
        for entry in &results.entries {
            self.print_entry(manager, issuer, help, entry);
        }
        self.print_footer(manager, issuer, help, results);
    }

    fn print_header(
        &self,
        manager: &CommandManager,
        issuer: &dyn CommandIssuer,
        help: &CommandHelp,
        results: &HelpResults,
        key: MessageKey,
    ) {
        let search = results.search.as_deref().unwrap_or_default().join(" ");
        manager.send_key(
            issuer,
            MessageType::Info,
            key,
            &[
                ("<commandPrefix>", help.command_prefix()),
                ("<command>", help.command_name()),
                ("<search>", search.as_str()),
            ],
        );
    }

    fn print_entry(
        &self,
        manager: &CommandManager,
        issuer: &dyn CommandIssuer,
        help: &CommandHelp,
        entry: &HelpEntry,
    ) {
        let command = format!("{}{}", help.command_prefix(), entry.command());
        let key = if entry.description().is_empty() {
            MessageKey::HelpFormat
        } else {
            MessageKey::HelpFormatWithDescription
        };
        let line = manager.format_message(
            Some(issuer),
            key,
            &[
                ("<command>", command.as_str()),
                ("<parameters>", entry.syntax()),
                ("<description>", entry.description()),
            ],
        );
        // Commands without parameters leave a double space behind
        manager.send_message(issuer, MessageType::Plain, &line.replace("  ", " "));
    }

    fn print_footer(
        &self,
        manager: &CommandManager,
        issuer: &dyn CommandIssuer,
        _help: &CommandHelp,
        results: &HelpResults,
    ) {
        if results.last_page && results.page == 1 {
            return;
        }
        manager.send_key(
            issuer,
            MessageType::Info,
            MessageKey::HelpFooter,
            &[
                ("<page>", results.page.to_string().as_str()),
                ("<totalPages>", results.total_pages.to_string().as_str()),
                ("<results>", results.total_results.to_string().as_str()),
            ],
        );
    }
}

/// The stock formatter
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHelpFormatter;

impl CommandHelpFormatter for DefaultHelpFormatter {}
