//! Message keys, catalogs and template rendering
//!
//! Every user-facing string the framework sends is looked up by a
//! [`MessageKey`] through a [`MessageProvider`]. The default provider is the
//! TOML-backed [`Messages`] catalog; platforms may install their own to add
//! per-issuer localization.
//!
//! Templates use `<placeholder>` markers, substituted by [`render`].

mod catalog;

use std::fmt;

pub use catalog::{ErrorMessages, FormatMessages, HelpMessages, Messages, PlayerMessages};

use crate::issuer::CommandIssuer;

/// Built-in message keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    // error.*
    NoPermission,
    GenericErrorLogged,
    UnknownCommand,
    InvalidSyntax,
    ErrorPerformingCommand,
    PleaseSpecifyOneOf,
    MustBeANumber,
    MustBeMinLength,
    MustBeMaxLength,
    PleaseSpecifyAtMost,
    PleaseSpecifyAtLeast,
    InvalidUuid,
    // player.*
    UsernameTooShort,
    InvalidUsername,
    MultiplePlayersMatch,
    NoOnlinePlayerFound,
    NoOfflinePlayerFound,
    NoPlayerFound,
    PlayerNotFound,
    PlayerOnly,
    // formats.*
    ErrorMessage,
    InfoMessage,
    // help.*
    NoCommandsMatchedSearch,
    NoResults,
    HelpHeader,
    HelpSearchHeader,
    HelpFormat,
    HelpFormatWithDescription,
    HelpFooter,
}

impl MessageKey {
    /// Every built-in key
    pub const ALL: &'static [MessageKey] = &[
        Self::NoPermission,
        Self::GenericErrorLogged,
        Self::UnknownCommand,
        Self::InvalidSyntax,
        Self::ErrorPerformingCommand,
        Self::PleaseSpecifyOneOf,
        Self::MustBeANumber,
        Self::MustBeMinLength,
        Self::MustBeMaxLength,
        Self::PleaseSpecifyAtMost,
        Self::PleaseSpecifyAtLeast,
        Self::InvalidUuid,
        Self::UsernameTooShort,
        Self::InvalidUsername,
        Self::MultiplePlayersMatch,
        Self::NoOnlinePlayerFound,
        Self::NoOfflinePlayerFound,
        Self::NoPlayerFound,
        Self::PlayerNotFound,
        Self::PlayerOnly,
        Self::ErrorMessage,
        Self::InfoMessage,
        Self::NoCommandsMatchedSearch,
        Self::NoResults,
        Self::HelpHeader,
        Self::HelpSearchHeader,
        Self::HelpFormat,
        Self::HelpFormatWithDescription,
        Self::HelpFooter,
    ];

    /// Dotted catalog path of this key
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoPermission => "error.no_permission",
            Self::GenericErrorLogged => "error.generic_error_logged",
            Self::UnknownCommand => "error.unknown_command",
            Self::InvalidSyntax => "error.invalid_syntax",
            Self::ErrorPerformingCommand => "error.error_performing_command",
            Self::PleaseSpecifyOneOf => "error.please_specify_one_of",
            Self::MustBeANumber => "error.must_be_a_number",
            Self::MustBeMinLength => "error.must_be_min_length",
            Self::MustBeMaxLength => "error.must_be_max_length",
            Self::PleaseSpecifyAtMost => "error.please_specify_at_most",
            Self::PleaseSpecifyAtLeast => "error.please_specify_at_least",
            Self::InvalidUuid => "error.invalid_uuid",
            Self::UsernameTooShort => "player.username_too_short",
            Self::InvalidUsername => "player.invalid_username",
            Self::MultiplePlayersMatch => "player.multiple_players_match",
            Self::NoOnlinePlayerFound => "player.no_online_player_found",
            Self::NoOfflinePlayerFound => "player.no_offline_player_found",
            Self::NoPlayerFound => "player.no_player_found",
            Self::PlayerNotFound => "player.player_not_found",
            Self::PlayerOnly => "player.player_only",
            Self::ErrorMessage => "formats.error_message",
            Self::InfoMessage => "formats.info_message",
            Self::NoCommandsMatchedSearch => "help.no_commands_matched_search",
            Self::NoResults => "help.no_results",
            Self::HelpHeader => "help.header",
            Self::HelpSearchHeader => "help.search_header",
            Self::HelpFormat => "help.format",
            Self::HelpFormatWithDescription => "help.format_with_description",
            Self::HelpFooter => "help.footer",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of message templates
///
/// `issuer` is the recipient when known, so providers can pick a locale.
pub trait MessageProvider: Send + Sync {
    /// Look up a template by dotted key
    fn message(&self, issuer: Option<&dyn CommandIssuer>, key: &str) -> Option<String>;
}

/// How a message should be framed when sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Sent as-is
    Plain,
    /// Wrapped in `formats.info_message`
    Info,
    /// Wrapped in `formats.error_message`
    Error,
}

/// Substitute `<placeholder>` markers in a template.
///
/// Placeholders are given with their angle brackets, e.g. `("<num>", "12")`.
pub fn render<K: AsRef<str>, V: AsRef<str>>(template: &str, replacements: &[(K, V)]) -> String {
    let mut out = template.to_string();
    for (placeholder, value) in replacements {
        let placeholder = placeholder.as_ref();
        if placeholder.is_empty() {
            continue;
        }
        out = out.replace(placeholder, value.as_ref());
    }
    out
}

/// Text shown for a key no provider knows
pub fn missing_key(key: &str) -> String {
    format!("<MISSING_LANGUAGE_KEY:{key}>")
}
