//! Per-candidate resolution cursor handed to context resolvers

use std::collections::VecDeque;

use super::invocation::CommandArgs;
use super::parameter::CommandParameter;
use super::registered::RegisteredCommand;
use super::CommandManager;
use crate::contexts::ArgValue;
use crate::issuer::IssuerRef;

/// Flags pulled out of the token list before positional binding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: Vec<(String, Option<String>)>,
}

impl FlagSet {
    /// Split `tokens` into positional tokens and flags.
    ///
    /// `--name` and `--name=value` (for prefix `--`) are flags wherever they
    /// appear. A bare prefix token ends flag parsing; it is dropped and every
    /// later token is positional. An empty prefix disables flags.
    pub fn extract(tokens: &[String], prefix: &str) -> (Vec<String>, FlagSet) {
        let mut positional = Vec::with_capacity(tokens.len());
        let mut set = FlagSet::default();
        if prefix.is_empty() {
            positional.extend(tokens.iter().cloned());
            return (positional, set);
        }

        let mut parsing = true;
        for token in tokens {
            if parsing && token == prefix {
                parsing = false;
                continue;
            }
            let body = match token.strip_prefix(prefix) {
                Some(body) if parsing && !body.is_empty() && !looks_numeric(body) => body,
                _ => {
                    positional.push(token.clone());
                    continue;
                }
            };
            let (name, value) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (body, None),
            };
            set.insert(name.to_ascii_lowercase(), value);
        }
        (positional, set)
    }

    fn insert(&mut self, name: String, value: Option<String>) {
        if let Some(existing) = self.flags.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = value;
        } else {
            self.flags.push((name, value));
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flags.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Value attached with `=`, if any
    pub fn value(&self, name: &str) -> Option<&str> {
        self.flags
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_deref())
    }

    /// Presence and value of the first of `names` that was given
    pub fn find(&self, names: &[String]) -> Option<Option<&str>> {
        names.iter().find_map(|name| {
            self.flags
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_deref())
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

// `-5` is a negative number, not a flag named "5"
fn looks_numeric(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

/// Resolution state for one candidate sub-command
///
/// Resolvers read the issuer and pop tokens from the front (or back) of the
/// remaining positional arguments. Flags have already been removed.
pub struct CommandExecutionContext<'a> {
    manager: &'a CommandManager,
    command: &'a RegisteredCommand,
    issuer: &'a IssuerRef,
    original_args: &'a [String],
    args: VecDeque<String>,
    positional_len: usize,
    flags: FlagSet,
    param_index: usize,
    resolved: CommandArgs,
}

impl<'a> CommandExecutionContext<'a> {
    pub(crate) fn new(
        manager: &'a CommandManager,
        command: &'a RegisteredCommand,
        issuer: &'a IssuerRef,
        original_args: &'a [String],
    ) -> Self {
        let (positional, flags) = FlagSet::extract(original_args, &manager.flag_prefix());
        Self {
            manager,
            command,
            issuer,
            original_args,
            positional_len: positional.len(),
            args: positional.into(),
            flags,
            param_index: 0,
            resolved: CommandArgs::default(),
        }
    }

    pub fn manager(&self) -> &'a CommandManager {
        self.manager
    }

    pub fn command(&self) -> &'a RegisteredCommand {
        self.command
    }

    pub fn issuer(&self) -> &'a IssuerRef {
        self.issuer
    }

    /// Parameter currently being resolved
    pub fn parameter(&self) -> &'a CommandParameter {
        let command: &'a RegisteredCommand = self.command;
        &command.parameters()[self.param_index]
    }

    pub fn index(&self) -> usize {
        self.param_index
    }

    pub(crate) fn set_parameter(&mut self, index: usize) {
        self.param_index = index;
    }

    /// Whether the current parameter is the last positional one
    pub fn is_last_arg(&self) -> bool {
        self.parameter().is_last()
    }

    pub fn is_optional(&self) -> bool {
        self.parameter().is_optional()
    }

    pub fn consumes_rest(&self) -> bool {
        self.parameter().consumes_rest()
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    pub fn first_arg(&self) -> Option<&str> {
        self.args.front().map(String::as_str)
    }

    pub fn last_arg(&self) -> Option<&str> {
        self.args.back().map(String::as_str)
    }

    pub fn pop_first_arg(&mut self) -> Option<String> {
        self.args.pop_front()
    }

    pub fn pop_last_arg(&mut self) -> Option<String> {
        self.args.pop_back()
    }

    pub(crate) fn push_front_arg(&mut self, token: String) {
        self.args.push_front(token);
    }

    /// Take every remaining token
    pub fn drain_args(&mut self) -> Vec<String> {
        self.args.drain(..).collect()
    }

    /// Remaining positional tokens
    pub fn args(&self) -> &VecDeque<String> {
        &self.args
    }

    pub fn remaining(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Positional tokens consumed so far
    pub fn consumed(&self) -> usize {
        self.positional_len.saturating_sub(self.args.len())
    }

    /// Full token list, flags included
    pub fn original_args(&self) -> &'a [String] {
        self.original_args
    }

    // ------------------------------------------------------------------
    // Flags and modifiers
    // ------------------------------------------------------------------

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    pub fn flag_value(&self, name: &str) -> Option<&str> {
        self.flags.value(name)
    }

    /// Whether the current parameter carries a resolver modifier
    pub fn has_modifier(&self, name: &str) -> bool {
        self.parameter().modifier(name).is_some()
    }

    pub fn modifier_value(&self, name: &str) -> Option<&'a str> {
        self.parameter().modifier(name).flatten()
    }

    pub fn modifier_int(&self, name: &str) -> Option<i64> {
        self.modifier_value(name)?.trim().parse().ok()
    }

    pub fn modifier_number(&self, name: &str) -> Option<f64> {
        self.modifier_value(name)?.trim().parse().ok()
    }

    // ------------------------------------------------------------------
    // Bound values
    // ------------------------------------------------------------------

    /// Values bound to earlier parameters
    pub fn resolved_args(&self) -> &CommandArgs {
        &self.resolved
    }

    pub(crate) fn bind(&mut self, name: &str, value: Option<ArgValue>) {
        self.resolved.push(name, value);
    }

    pub(crate) fn into_args(self) -> CommandArgs {
        self.resolved
    }
}
