//! Default message catalog
//!
//! Stored as TOML at `<base>/plugins/<plugin>/acf-messages.toml` with one
//! table per section:
//!
//! ```toml
//! [error]
//! no_permission = "I'm sorry, but you do not have permission to perform this command."
//!
//! [custom]
//! "myplugin.greeting" = "Hello <name>!"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::MessageProvider;
use crate::config::TomlConfig;
use crate::issuer::CommandIssuer;

/// `error.*` templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorMessages {
    pub no_permission: String,
    pub generic_error_logged: String,
    pub unknown_command: String,
    pub invalid_syntax: String,
    pub error_performing_command: String,
    pub please_specify_one_of: String,
    pub must_be_a_number: String,
    pub must_be_min_length: String,
    pub must_be_max_length: String,
    pub please_specify_at_most: String,
    pub please_specify_at_least: String,
    pub invalid_uuid: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            no_permission: "I'm sorry, but you do not have permission to perform this command."
                .to_string(),
            generic_error_logged:
                "An error occurred. This problem has been logged. Sorry for the inconvenience."
                    .to_string(),
            unknown_command: "Unknown Command, please type /help".to_string(),
            invalid_syntax: "Usage: <command> <syntax>".to_string(),
            error_performing_command:
                "I'm sorry, but there was an error performing this command.".to_string(),
            please_specify_one_of: "Please specify one of (<valid>).".to_string(),
            must_be_a_number: "<num> must be a number.".to_string(),
            must_be_min_length: "Must be at least <min> characters long.".to_string(),
            must_be_max_length: "Must be at most <max> characters long.".to_string(),
            please_specify_at_most: "Please specify a value at most <max>.".to_string(),
            please_specify_at_least: "Please specify a value at least <min>.".to_string(),
            invalid_uuid: "<value> is not a valid UUID.".to_string(),
        }
    }
}

/// `player.*` templates, used by platform resolvers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerMessages {
    pub username_too_short: String,
    pub invalid_username: String,
    pub multiple_players_match: String,
    pub no_online_player_found: String,
    pub no_offline_player_found: String,
    pub no_player_found: String,
    pub player_not_found: String,
    pub player_only: String,
}

impl Default for PlayerMessages {
    fn default() -> Self {
        Self {
            username_too_short: "Username too short, must be at least three characters."
                .to_string(),
            invalid_username: "<name> is not a valid username.".to_string(),
            multiple_players_match:
                "Multiple players matched <search> (<all>), please be more specific.".to_string(),
            no_online_player_found: "No player matching <search> is connected to this server."
                .to_string(),
            no_offline_player_found: "No player matching <search> could be found.".to_string(),
            no_player_found: "No player matching <search> could be found.".to_string(),
            player_not_found: "Could not find a player by the name: <search>".to_string(),
            player_only: "Console may not execute this command.".to_string(),
        }
    }
}

/// `formats.*` wrappers applied by `send_error` / `send_info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatMessages {
    pub error_message: String,
    pub info_message: String,
}

impl Default for FormatMessages {
    fn default() -> Self {
        Self {
            error_message: "Error: <message>".to_string(),
            info_message: "<message>".to_string(),
        }
    }
}

/// `help.*` templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpMessages {
    pub no_commands_matched_search: String,
    pub no_results: String,
    pub header: String,
    pub search_header: String,
    pub format: String,
    pub format_with_description: String,
    pub footer: String,
}

impl Default for HelpMessages {
    fn default() -> Self {
        Self {
            no_commands_matched_search: "No command matched <search>.".to_string(),
            no_results: "No more results.".to_string(),
            header: "=== Showing help for <commandPrefix><command>. ===".to_string(),
            search_header: "=== Search results for <commandPrefix><command> <search> ==="
                .to_string(),
            format: "<command> <parameters>".to_string(),
            format_with_description: "<command> <parameters> (<description>)".to_string(),
            footer: "Showing page <page> of <totalPages> (<results> results).".to_string(),
        }
    }
}

/// The TOML-backed default catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub error: ErrorMessages,
    pub player: PlayerMessages,
    pub formats: FormatMessages,
    pub help: HelpMessages,
    /// Plugin-defined keys, addressed by their full dotted name
    pub custom: BTreeMap<String, String>,
}

impl Messages {
    /// Look up a template by dotted key
    pub fn get(&self, key: &str) -> Option<&str> {
        if let Some(custom) = self.custom.get(key) {
            return Some(custom);
        }

        let (section, field) = key.split_once('.')?;
        let text = match section {
            "error" => match field {
                "no_permission" => &self.error.no_permission,
                "generic_error_logged" => &self.error.generic_error_logged,
                "unknown_command" => &self.error.unknown_command,
                "invalid_syntax" => &self.error.invalid_syntax,
                "error_performing_command" => &self.error.error_performing_command,
                "please_specify_one_of" => &self.error.please_specify_one_of,
                "must_be_a_number" => &self.error.must_be_a_number,
                "must_be_min_length" => &self.error.must_be_min_length,
                "must_be_max_length" => &self.error.must_be_max_length,
                "please_specify_at_most" => &self.error.please_specify_at_most,
                "please_specify_at_least" => &self.error.please_specify_at_least,
                "invalid_uuid" => &self.error.invalid_uuid,
                _ => return None,
            },
            "player" => match field {
                "username_too_short" => &self.player.username_too_short,
                "invalid_username" => &self.player.invalid_username,
                "multiple_players_match" => &self.player.multiple_players_match,
                "no_online_player_found" => &self.player.no_online_player_found,
                "no_offline_player_found" => &self.player.no_offline_player_found,
                "no_player_found" => &self.player.no_player_found,
                "player_not_found" => &self.player.player_not_found,
                "player_only" => &self.player.player_only,
                _ => return None,
            },
            "formats" => match field {
                "error_message" => &self.formats.error_message,
                "info_message" => &self.formats.info_message,
                _ => return None,
            },
            "help" => match field {
                "no_commands_matched_search" => &self.help.no_commands_matched_search,
                "no_results" => &self.help.no_results,
                "header" => &self.help.header,
                "search_header" => &self.help.search_header,
                "format" => &self.help.format,
                "format_with_description" => &self.help.format_with_description,
                "footer" => &self.help.footer,
                _ => return None,
            },
            _ => return None,
        };
        Some(text)
    }

    /// Add or replace a plugin-defined key
    pub fn set_custom(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.custom.insert(key.into(), template.into());
    }
}

impl MessageProvider for Messages {
    fn message(&self, _issuer: Option<&dyn CommandIssuer>, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }
}

impl TomlConfig for Messages {}
