//! Command manager - registration and dispatch

use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use slotmap::SlotMap;
use tracing::{debug, error, warn};

use super::binding::{bind, BindFailure};
use super::completion::{filter_prefix, CommandCompletions};
use super::conditions::CommandConditions;
use super::dependencies::Dependencies;
use super::execution::FlagSet;
use super::group::{CommandGroup, ExceptionHandler, SubcommandKind};
use super::invocation::{CommandArgs, CommandInvocation, ExceptionContext};
use super::operation::{current_operation, push_operation, CommandOperationContext};
use super::parameter::CommandParameter;
use super::registered::{CommandKey, GroupDefaults, GroupKey, RegisteredCommand};
use super::replacements::CommandReplacements;
use super::root::{table_labels, RootCommand};
use super::router::route;
use crate::config::{ConfigError, ManagerConfig};
use crate::contexts::{CommandContexts, ContextResolver};
use crate::error::{ArgumentError, CommandError, HandlerError, HandlerPanic, RegistrationError};
use crate::help::{CommandHelp, CommandHelpFormatter, DefaultHelpFormatter, HelpEntry};
use crate::issuer::{CommandIssuer, IssuerRef};
use crate::messages::{missing_key, render, MessageKey, MessageProvider, MessageType, Messages};
use crate::permissions::{has_all_permissions, missing_permissions};
use crate::util::split_aliases;

/// What one `register_command` call added
struct GroupEntry {
    roots: Vec<String>,
    commands: Vec<CommandKey>,
}

#[derive(Default)]
struct CommandTable {
    roots: HashMap<String, RootCommand>,
    commands: SlotMap<CommandKey, Arc<RegisteredCommand>>,
    groups: SlotMap<GroupKey, GroupEntry>,
}

/// Owns every registry and runs dispatch
///
/// Registration takes the table write lock for the duration of one group;
/// dispatch only holds the read lock while picking candidates, never while
/// binding or running a handler, so handlers may dispatch other commands.
pub struct CommandManager {
    config: RwLock<ManagerConfig>,
    contexts: CommandContexts,
    conditions: CommandConditions,
    completions: CommandCompletions,
    replacements: CommandReplacements,
    dependencies: Dependencies,
    messages: RwLock<Arc<dyn MessageProvider>>,
    help_formatter: RwLock<Arc<dyn CommandHelpFormatter>>,
    default_exception_handler: RwLock<Option<ExceptionHandler>>,
    table: RwLock<CommandTable>,
    next_seq: AtomicU64,
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandManager {
    pub fn new() -> Self {
        Self {
            config: RwLock::new(ManagerConfig::default()),
            contexts: CommandContexts::new(),
            conditions: CommandConditions::new(),
            completions: CommandCompletions::new(),
            replacements: CommandReplacements::new(),
            dependencies: Dependencies::new(),
            messages: RwLock::new(Arc::new(Messages::default())),
            help_formatter: RwLock::new(Arc::new(DefaultHelpFormatter)),
            default_exception_handler: RwLock::new(None),
            table: RwLock::new(CommandTable::default()),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Manager with validated settings
    pub fn with_config(config: ManagerConfig) -> Result<Self, ConfigError> {
        let manager = Self::new();
        manager.set_config(config)?;
        Ok(manager)
    }

    // ------------------------------------------------------------------
    // Registries and settings
    // ------------------------------------------------------------------

    pub fn config(&self) -> ManagerConfig {
        self.config.read().clone()
    }

    pub fn set_config(&self, config: ManagerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.config.write() = config;
        Ok(())
    }

    pub fn flag_prefix(&self) -> String {
        self.config.read().flag_prefix.clone()
    }

    pub fn contexts(&self) -> &CommandContexts {
        &self.contexts
    }

    pub fn conditions(&self) -> &CommandConditions {
        &self.conditions
    }

    pub fn completions(&self) -> &CommandCompletions {
        &self.completions
    }

    pub fn replacements(&self) -> &CommandReplacements {
        &self.replacements
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    pub fn help_formatter(&self) -> Arc<dyn CommandHelpFormatter> {
        Arc::clone(&self.help_formatter.read())
    }

    pub fn set_help_formatter<F: CommandHelpFormatter + 'static>(&self, formatter: F) {
        *self.help_formatter.write() = Arc::new(formatter);
    }

    pub fn set_message_provider(&self, provider: Arc<dyn MessageProvider>) {
        *self.messages.write() = provider;
    }

    /// Install the handler for errors no group handler claims.
    ///
    /// Passing `None` with logging disabled would drop errors silently and
    /// is rejected.
    pub fn set_default_exception_handler(
        &self,
        handler: Option<ExceptionHandler>,
        log_exceptions: bool,
    ) -> Result<(), ConfigError> {
        if handler.is_none() && !log_exceptions {
            return Err(ConfigError::InvalidSetting(
                "cannot disable both the default exception handler and exception logging"
                    .to_string(),
            ));
        }
        *self.default_exception_handler.write() = handler;
        self.config.write().log_unhandled_exceptions = log_exceptions;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a command group.
    ///
    /// Either every sub-command is added or, on error, none is.
    pub fn register_command(&self, mut group: CommandGroup) -> Result<GroupKey, RegistrationError> {
        group.apply_replacements(&self.replacements);

        let roots = split_aliases(&group.name);
        let Some(root_name) = roots.first().cloned() else {
            return Err(RegistrationError::EmptyName);
        };
        let defaults = GroupDefaults {
            root_name: &root_name,
            permission: group.permission.as_deref(),
            conditions: group.conditions.as_deref(),
            description: group.description.as_deref(),
            exception_handler: group.exception_handler.clone(),
        };

        let mut guard = self.table.write();
        let table = &mut *guard;
        let group_key = table.groups.insert(GroupEntry {
            roots: roots.clone(),
            commands: Vec::new(),
        });

        let mut built = Vec::with_capacity(group.subcommands.len());
        for spec in group.subcommands {
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            match RegisteredCommand::new(spec, &defaults, group_key, seq, &self.contexts) {
                Ok(command) => built.push(command),
                Err(e) => {
                    table.groups.remove(group_key);
                    return Err(e);
                }
            }
        }

        let mut keys = Vec::with_capacity(built.len());
        for mut command in built {
            let labels = table_labels(command.kind(), command.labels());
            let key = table.commands.insert_with_key(|key| {
                command.key = key;
                Arc::new(command)
            });
            keys.push(key);

            for name in &roots {
                let root = table
                    .roots
                    .entry(name.clone())
                    .or_insert_with(|| RootCommand::new(name));
                for label in &labels {
                    warn_if_shadowed(root, &table.commands, label, key);
                    root.add(label, key);
                }
                root.add_group(group_key);
            }
        }

        debug!(
            "Registered command group '{}' with {} sub-commands",
            root_name,
            keys.len()
        );
        if let Some(entry) = table.groups.get_mut(group_key) {
            entry.commands = keys;
        }
        Ok(group_key)
    }

    /// Build a group from registered dependencies, then register it
    pub fn register_with<F>(&self, factory: F) -> Result<GroupKey, RegistrationError>
    where
        F: FnOnce(&Dependencies) -> Result<CommandGroup, RegistrationError>,
    {
        let group = factory(&self.dependencies)?;
        self.register_command(group)
    }

    /// Remove everything a registration added. Roots left empty are dropped.
    pub fn unregister_command(&self, key: GroupKey) -> bool {
        let mut guard = self.table.write();
        let table = &mut *guard;
        let Some(entry) = table.groups.remove(key) else {
            return false;
        };

        for name in &entry.roots {
            let now_empty = match table.roots.get_mut(name) {
                Some(root) => {
                    root.remove_group(key, &entry.commands);
                    root.is_empty()
                }
                None => false,
            };
            if now_empty {
                table.roots.remove(name);
            }
        }
        for command in &entry.commands {
            table.commands.remove(*command);
        }

        debug!(
            "Unregistered {} sub-commands from {}",
            entry.commands.len(),
            entry.roots.join("|")
        );
        true
    }

    pub fn register_dependency<T: std::any::Any + Send + Sync>(
        &self,
        instance: Arc<T>,
    ) -> Result<(), RegistrationError> {
        self.dependencies.register(instance)
    }

    pub fn register_dependency_keyed<T: std::any::Any + Send + Sync>(
        &self,
        key: &str,
        instance: Arc<T>,
    ) -> Result<(), RegistrationError> {
        self.dependencies.register_keyed(key, instance)
    }

    /// Snapshot of a root's sub-command table
    pub fn root_command(&self, name: &str) -> Option<RootCommand> {
        self.table.read().roots.get(&name.to_lowercase()).cloned()
    }

    /// Every root label, aliases included, sorted
    pub fn registered_root_commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.read().roots.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn registered_command(&self, key: CommandKey) -> Option<Arc<RegisteredCommand>> {
        self.table.read().commands.get(key).cloned()
    }

    /// Distinct sub-commands under a root, in registration order
    pub fn root_subcommands(&self, name: &str) -> Vec<Arc<RegisteredCommand>> {
        let table = self.table.read();
        let Some(root) = table.roots.get(&name.to_lowercase()) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut commands: Vec<Arc<RegisteredCommand>> = root
            .entries()
            .flat_map(|(_, keys)| keys.iter())
            .filter(|key| seen.insert(**key))
            .filter_map(|key| table.commands.get(*key).cloned())
            .collect();
        commands.sort_by_key(|c| c.seq());
        commands
    }

    /// Replace the resolver of one parameter of a registered sub-command.
    ///
    /// Dispatches already running keep the previous resolver.
    pub fn set_parameter_resolver(
        &self,
        key: CommandKey,
        parameter: &str,
        resolver: ContextResolver,
    ) -> bool {
        let mut table = self.table.write();
        let Some(command) = table.commands.get_mut(key) else {
            return false;
        };
        let changed = Arc::make_mut(command).set_parameter_resolver(parameter, resolver);
        if changed {
            debug!("Replaced resolver of '{}' on '{}'", parameter, command.command());
        }
        changed
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Run one command line as `issuer`
    pub fn dispatch(&self, issuer: &IssuerRef, command_line: &str) -> Result<(), CommandError> {
        self.dispatch_line(issuer, command_line, false)
    }

    pub(crate) fn dispatch_line(
        &self,
        issuer: &IssuerRef,
        command_line: &str,
        is_async: bool,
    ) -> Result<(), CommandError> {
        let line = command_line.trim();
        let line = if self.config.read().strip_leading_slash {
            line.strip_prefix('/').unwrap_or(line)
        } else {
            line
        };

        let mut tokens = line.split_whitespace().map(str::to_string);
        let Some(label) = tokens.next() else {
            let error = CommandError::UnknownCommand(String::new());
            self.report_failure(issuer.as_ref(), None, &error);
            return Err(error);
        };
        let args: Vec<String> = tokens.collect();
        self.execute(issuer, &label, &args, is_async)
    }

    /// Run `label args...` as `issuer`.
    ///
    /// Candidates are tried in routing order. The first one that passes its
    /// permission check and binds runs; later ones are never tried. When all
    /// fail, the failure that consumed the most tokens is reported, the
    /// earliest candidate winning ties.
    pub fn execute(
        &self,
        issuer: &IssuerRef,
        label: &str,
        args: &[String],
        is_async: bool,
    ) -> Result<(), CommandError> {
        let search = {
            let table = self.table.read();
            table
                .roots
                .get(&label.to_lowercase())
                .map(|root| route(root, &table.commands, args, &self.flag_prefix()))
        };
        let Some(search) = search.filter(|s| !s.candidates.is_empty()) else {
            debug!("Unknown command '{}'", label);
            let error = CommandError::UnknownCommand(label.to_string());
            self.report_failure(issuer.as_ref(), None, &error);
            return Err(error);
        };

        let mut best: Option<(BindFailure, &Arc<RegisteredCommand>)> = None;
        for candidate in &search.candidates {
            let failure = match self.check_permission(issuer.as_ref(), candidate) {
                Err(failure) => failure,
                Ok(()) => match bind(self, candidate, issuer, &search.args) {
                    Ok(bound) => {
                        return self.invoke(issuer, label, args, candidate, bound, is_async)
                    }
                    Err(failure) => failure,
                },
            };
            debug!(
                "Candidate '{}' rejected after {} tokens: {}",
                candidate.command(),
                failure.consumed,
                failure.error
            );
            if best.as_ref().map_or(true, |(b, _)| failure.consumed > b.consumed) {
                best = Some((failure, candidate));
            }
        }

        let Some((failure, command)) = best else {
            let error = CommandError::UnknownCommand(label.to_string());
            self.report_failure(issuer.as_ref(), None, &error);
            return Err(error);
        };
        self.report_failure(issuer.as_ref(), Some(&**command), &failure.error);
        Err(failure.error)
    }

    fn check_permission(
        &self,
        issuer: &dyn CommandIssuer,
        command: &RegisteredCommand,
    ) -> Result<(), BindFailure> {
        let missing = missing_permissions(issuer, command.permissions());
        if missing.is_empty() {
            return Ok(());
        }
        Err(BindFailure {
            error: CommandError::PermissionDenied { required: missing },
            consumed: 0,
        })
    }

    fn invoke(
        &self,
        issuer: &IssuerRef,
        label: &str,
        args: &[String],
        command: &Arc<RegisteredCommand>,
        bound: CommandArgs,
        is_async: bool,
    ) -> Result<(), CommandError> {
        for conditions in command.conditions() {
            if let Err(source) = self.conditions.validate_command(issuer.as_ref(), conditions) {
                let error = CommandError::InvalidArgument {
                    parameter: None,
                    source,
                };
                self.report_failure(issuer.as_ref(), Some(&**command), &error);
                return Err(error);
            }
        }

        let operation =
            CommandOperationContext::new(issuer.clone(), label, args, command.key(), is_async);
        let _guard = push_operation(operation.clone());
        let invocation = CommandInvocation {
            manager: self,
            command,
            operation: &operation,
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| (command.handler())(&invocation, &bound)));
        let error: HandlerError = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(error)) => error,
            Err(payload) => Box::new(HandlerPanic::from_payload(payload)) as HandlerError,
        };

        if let Some(argument) = error.downcast_ref::<ArgumentError>() {
            let error = CommandError::InvalidArgument {
                parameter: None,
                source: argument.clone(),
            };
            self.report_failure(issuer.as_ref(), Some(&**command), &error);
            return Err(error);
        }

        let handled = self.handle_exception(command, issuer.as_ref(), args, &error);
        Err(CommandError::Handler {
            handled,
            source: error,
        })
    }

    /// Group handler, then the default handler, then log and apologize
    fn handle_exception(
        &self,
        command: &RegisteredCommand,
        issuer: &dyn CommandIssuer,
        args: &[String],
        error: &HandlerError,
    ) -> bool {
        let ctx = ExceptionContext {
            manager: self,
            command,
            issuer,
            args,
        };
        if let Some(handler) = command.exception_handler() {
            if handler(&ctx, error) {
                return true;
            }
        }
        let default = self.default_exception_handler.read().clone();
        if let Some(handler) = default {
            if handler(&ctx, error) {
                return true;
            }
        }

        if self.config.read().log_unhandled_exceptions {
            error!(
                command = %command.command(),
                args = ?args,
                "Exception in command: {}",
                error_chain(&**error)
            );
        }
        self.send_key(issuer, MessageType::Error, MessageKey::GenericErrorLogged, &[]);
        false
    }

    /// Send the one message a failed dispatch produces
    fn report_failure(
        &self,
        issuer: &dyn CommandIssuer,
        command: Option<&RegisteredCommand>,
        error: &CommandError,
    ) {
        match (error, command) {
            (CommandError::MissingRequiredArgument { .. }, Some(command))
            | (CommandError::TooManyArguments { .. }, Some(command))
            | (
                CommandError::InvalidArgument {
                    source: ArgumentError::Syntax,
                    ..
                },
                Some(command),
            ) => self.show_syntax(issuer, command),
            (CommandError::InvalidArgument { source, .. }, _) => match source {
                ArgumentError::Message { key, replacements } => {
                    let pairs: Vec<(&str, &str)> = replacements
                        .iter()
                        .map(|(k, v)| (k.as_str(), v.as_str()))
                        .collect();
                    self.send_key(issuer, MessageType::Error, *key, &pairs);
                }
                ArgumentError::Literal(text) => self.send_message(issuer, MessageType::Error, text),
                ArgumentError::Syntax => {
                    self.send_key(issuer, MessageType::Error, MessageKey::InvalidSyntax, &[])
                }
            },
            (CommandError::PermissionDenied { .. }, _) => {
                self.send_key(issuer, MessageType::Error, MessageKey::NoPermission, &[]);
            }
            (CommandError::Handler { .. }, _) => {}
            _ => self.send_key(issuer, MessageType::Error, MessageKey::UnknownCommand, &[]),
        }
    }

    // ------------------------------------------------------------------
    // Completion
    // ------------------------------------------------------------------

    /// Suggestions for the last token of a partial command line
    pub fn complete(&self, issuer: &IssuerRef, buffer: &str) -> Vec<String> {
        let buffer = buffer.trim_start();
        let buffer = if self.config.read().strip_leading_slash {
            buffer.strip_prefix('/').unwrap_or(buffer)
        } else {
            buffer
        };

        let mut tokens: Vec<String> = buffer.split_whitespace().map(str::to_string).collect();
        if buffer.is_empty() || buffer.ends_with(char::is_whitespace) {
            tokens.push(String::new());
        }
        let input = tokens.pop().unwrap_or_default();
        let permitted = |c: &RegisteredCommand| {
            !c.is_private() && has_all_permissions(issuer.as_ref(), c.permissions())
        };

        let flag_prefix = self.flag_prefix();
        let mut suggestions = Vec::new();
        let candidates = {
            let table = self.table.read();
            if tokens.is_empty() {
                let mut roots: Vec<String> = table
                    .roots
                    .iter()
                    .filter(|(_, root)| {
                        root.entries()
                            .flat_map(|(_, keys)| keys.iter())
                            .filter_map(|k| table.commands.get(*k))
                            .any(|c| permitted(c))
                    })
                    .map(|(name, _)| name.clone())
                    .collect();
                roots.sort();
                return filter_prefix(roots, &input);
            }

            let Some(root) = table.roots.get(&tokens[0].to_lowercase()) else {
                return Vec::new();
            };
            let args = &tokens[1..];
            for label in root.labels() {
                let words: Vec<&str> = label.split(' ').collect();
                if words.len() <= args.len()
                    || !words.iter().zip(args).all(|(w, a)| w.eq_ignore_ascii_case(a))
                {
                    continue;
                }
                let visible = root
                    .get(label)
                    .iter()
                    .filter_map(|k| table.commands.get(*k))
                    .any(|c| permitted(c));
                if visible {
                    suggestions.push(words[args.len()].to_string());
                }
            }
            route(root, &table.commands, args, &flag_prefix)
        };

        let (positional, _) = FlagSet::extract(&candidates.args, &flag_prefix);
        let before = &tokens[1..];
        for command in candidates.candidates.iter().filter(|c| permitted(c)) {
            if !flag_prefix.is_empty() && input.starts_with(&flag_prefix) {
                for param in command.parameters().iter().filter(|p| p.is_flag()) {
                    suggestions.extend(param.flag_names().iter().map(|n| format!("{flag_prefix}{n}")));
                }
                continue;
            }
            if let Some(param) = completion_parameter(command, positional.len()) {
                suggestions.extend(self.parameter_suggestions(param, issuer.as_ref(), &input, before));
            }
        }
        filter_prefix(suggestions, &input)
    }

    fn parameter_suggestions(
        &self,
        param: &CommandParameter,
        issuer: &dyn CommandIssuer,
        input: &str,
        args: &[String],
    ) -> Vec<String> {
        if !param.values().is_empty() {
            return param.values().to_vec();
        }
        if let Some(source) = param.completion() {
            return self.completions.suggest(source, issuer, input, args);
        }
        if let Some(values) = param.arg_type().enum_values() {
            return values.iter().map(|v| v.to_lowercase()).collect();
        }
        if param.arg_type().is::<bool>() {
            return vec!["true".to_string(), "false".to_string()];
        }
        Vec::new()
    }

    // ------------------------------------------------------------------
    // Help
    // ------------------------------------------------------------------

    /// Help listing for `root` as seen by `issuer`.
    ///
    /// Private and catch-unknown sub-commands are left out, as is the default
    /// sub-command when the root has a help command. Entries the issuer lacks
    /// permission for are hidden.
    pub fn generate_command_help(&self, issuer: &IssuerRef, root: &str) -> CommandHelp {
        let root_name = root.to_lowercase();
        let commands = self.root_subcommands(&root_name);
        let has_help_command = commands.iter().any(|c| c.is_help_command());

        let entries = commands
            .iter()
            .filter(|c| match c.kind() {
                SubcommandKind::Labeled => !c.is_private(),
                SubcommandKind::Default => !has_help_command && !c.is_private(),
                SubcommandKind::CatchUnknown => false,
            })
            .filter(|c| has_all_permissions(issuer.as_ref(), c.permissions()))
            .map(|c| HelpEntry::new(c))
            .collect();

        CommandHelp::new(
            root_name,
            self.command_prefix(issuer.as_ref()),
            entries,
            self.config.read().help_per_page,
        )
    }

    /// Help for the root of the innermost running invocation on this thread
    pub fn generate_command_help_current(&self) -> Option<CommandHelp> {
        let operation = current_operation()?;
        let root = self
            .registered_command(operation.command())
            .map(|c| c.root_name().to_string())
            .unwrap_or_else(|| operation.label().to_string());
        Some(self.generate_command_help(operation.issuer(), &root))
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    /// Template for `key`, or a visible placeholder when no provider knows it
    pub fn message(&self, issuer: Option<&dyn CommandIssuer>, key: &str) -> String {
        let provider = Arc::clone(&self.messages.read());
        match provider.message(issuer, key) {
            Some(template) => template,
            None => {
                error!("Missing message key '{}'", key);
                missing_key(key)
            }
        }
    }

    pub fn format_message(
        &self,
        issuer: Option<&dyn CommandIssuer>,
        key: MessageKey,
        replacements: &[(&str, &str)],
    ) -> String {
        render(&self.message(issuer, key.as_str()), replacements)
    }

    /// Deliver text line by line, framed according to `kind`
    pub fn send_message(&self, issuer: &dyn CommandIssuer, kind: MessageType, text: &str) {
        let text = self.replacements.replace(text);
        let frame = match kind {
            MessageType::Plain => None,
            MessageType::Info => Some(self.message(Some(issuer), MessageKey::InfoMessage.as_str())),
            MessageType::Error => Some(self.message(Some(issuer), MessageKey::ErrorMessage.as_str())),
        };

        for line in text.split('\n') {
            let line = line.trim_end();
            match (&frame, kind) {
                (Some(frame), MessageType::Error) => {
                    issuer.send_error(render(frame, &[("<message>", line)]).trim_end())
                }
                (Some(frame), _) => issuer.send_info(render(frame, &[("<message>", line)]).trim_end()),
                (None, _) => issuer.send_message(line),
            }
        }
    }

    pub fn send_key(
        &self,
        issuer: &dyn CommandIssuer,
        kind: MessageType,
        key: MessageKey,
        replacements: &[(&str, &str)],
    ) {
        let text = self.format_message(Some(issuer), key, replacements);
        self.send_message(issuer, kind, &text);
    }

    /// Send the usage line of a sub-command
    pub fn show_syntax(&self, issuer: &dyn CommandIssuer, command: &RegisteredCommand) {
        let usage = format!("{}{}", self.command_prefix(issuer), command.command());
        let syntax = command.syntax_text();
        self.send_key(
            issuer,
            MessageType::Error,
            MessageKey::InvalidSyntax,
            &[("<command>", usage.as_str()), ("<syntax>", syntax.as_str())],
        );
    }

    /// What players type before a root label
    pub fn command_prefix(&self, issuer: &dyn CommandIssuer) -> &'static str {
        if issuer.is_player() {
            "/"
        } else {
            ""
        }
    }
}

/// Parameter the next positional token would bind to
fn completion_parameter(command: &RegisteredCommand, index: usize) -> Option<&CommandParameter> {
    let mut inputs = command
        .parameters()
        .iter()
        .filter(|p| !p.is_flag() && p.can_consume_input());
    let last = inputs.clone().last();
    inputs
        .nth(index)
        .or_else(|| last.filter(|p| p.consumes_rest()))
}

fn warn_if_shadowed(
    root: &RootCommand,
    commands: &SlotMap<CommandKey, Arc<RegisteredCommand>>,
    label: &str,
    key: CommandKey,
) {
    let Some(new) = commands.get(key) else {
        return;
    };
    let shadowed = root
        .get(label)
        .iter()
        .filter_map(|k| commands.get(*k))
        .any(|c| c.min_args() == new.min_args() && c.max_args() == new.max_args());
    if shadowed && new.kind() == SubcommandKind::Labeled {
        warn!(
            "'{}' has the same arity as an existing sub-command and will only run if that one fails",
            new.command()
        );
    }
}

fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::commands::group::{ParameterSpec, SubcommandSpec};
    use crate::commands::operation::operation_depth;
    use crate::contexts::CommandEnum;
    use crate::issuer::testing::RecordingIssuer;

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn counting(
        hits: &Arc<AtomicUsize>,
    ) -> impl Fn(&CommandInvocation<'_>, &CommandArgs) -> crate::error::HandlerResult + Send + Sync + 'static
    {
        let hits = Arc::clone(hits);
        move |_, _| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn as_issuer(issuer: &Arc<RecordingIssuer>) -> IssuerRef {
        issuer.clone()
    }

    /// `tag add <name>` (needs tag.add) and `tag <name>` as the default
    fn tag_manager(add_hits: &Arc<AtomicUsize>, default_hits: &Arc<AtomicUsize>) -> CommandManager {
        let manager = CommandManager::new();
        manager
            .register_command(
                CommandGroup::new("tag")
                    .subcommand(
                        SubcommandSpec::new("add")
                            .permission("tag.add")
                            .param(ParameterSpec::string("name").single())
                            .handler(counting(add_hits)),
                    )
                    .subcommand(
                        SubcommandSpec::default_command()
                            .param(ParameterSpec::string("name").single())
                            .handler(counting(default_hits)),
                    ),
            )
            .unwrap();
        manager
    }

    #[test]
    fn test_tag_add_missing_name() {
        let (add, default) = (counter(), counter());
        let manager = tag_manager(&add, &default);
        let player = RecordingIssuer::player(&["tag.add"]);

        let err = manager.dispatch(&as_issuer(&player), "tag add").unwrap_err();
        assert!(matches!(
            err,
            CommandError::MissingRequiredArgument { ref parameter } if parameter == "name"
        ));
        assert_eq!(player.take(), vec!["Error: Usage: /tag add <name>"]);
        assert_eq!(add.load(Ordering::SeqCst), 0);
        assert_eq!(default.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_tag_default_without_permission() {
        let (add, default) = (counter(), counter());
        let manager = tag_manager(&add, &default);
        let player = RecordingIssuer::player(&[]);

        manager.dispatch(&as_issuer(&player), "tag foo").unwrap();
        assert_eq!(default.load(Ordering::SeqCst), 1);
        assert_eq!(add.load(Ordering::SeqCst), 0);
        assert!(player.take().is_empty());
    }

    #[test]
    fn test_permission_denied_is_reported() {
        let (add, default) = (counter(), counter());
        let manager = tag_manager(&add, &default);
        let player = RecordingIssuer::player(&[]);

        let err = manager.dispatch(&as_issuer(&player), "/tag add bob").unwrap_err();
        assert!(matches!(err, CommandError::PermissionDenied { ref required } if required == &["tag.add"]));
        assert_eq!(
            player.take(),
            vec!["Error: I'm sorry, but you do not have permission to perform this command."]
        );
    }

    #[test]
    fn test_permission_aggregation() {
        let hits = counter();
        let manager = CommandManager::new();
        manager
            .register_command(
                CommandGroup::new("secure").permission("a").subcommand(
                    SubcommandSpec::default_command()
                        .permission("b")
                        .handler(counting(&hits)),
                ),
            )
            .unwrap();

        let partial = RecordingIssuer::player(&["a"]);
        assert!(matches!(
            manager.dispatch(&as_issuer(&partial), "secure"),
            Err(CommandError::PermissionDenied { .. })
        ));
        let full = RecordingIssuer::player(&["a", "b", "c"]);
        manager.dispatch(&as_issuer(&full), "secure").unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_single_fitting_candidate_runs_once() {
        let (one, two) = (counter(), counter());
        let manager = CommandManager::new();
        manager
            .register_command(
                CommandGroup::new("give")
                    .subcommand(
                        SubcommandSpec::default_command()
                            .param(ParameterSpec::string("item").single())
                            .handler(counting(&one)),
                    )
                    .subcommand(
                        SubcommandSpec::default_command()
                            .param(ParameterSpec::string("item").single())
                            .param(ParameterSpec::of::<i32>("amount"))
                            .handler(counting(&two)),
                    ),
            )
            .unwrap();
        let console = as_issuer(&RecordingIssuer::console());

        manager.dispatch(&console, "give apple 3").unwrap();
        assert_eq!((one.load(Ordering::SeqCst), two.load(Ordering::SeqCst)), (0, 1));
        manager.dispatch(&console, "give apple").unwrap();
        assert_eq!((one.load(Ordering::SeqCst), two.load(Ordering::SeqCst)), (1, 1));
    }

    #[test]
    fn test_rest_never_too_many() {
        let said = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&said);
        let manager = CommandManager::new();
        manager
            .register_command(
                CommandGroup::new("say").subcommand(
                    SubcommandSpec::default_command()
                        .param(ParameterSpec::of::<i32>("times"))
                        .param(ParameterSpec::string("message"))
                        .handler(move |_, args| {
                            sink.lock().push(args.value::<String>("message")?.clone());
                            Ok(())
                        }),
                ),
            )
            .unwrap();
        let console = as_issuer(&RecordingIssuer::console());

        for line in ["say 1 hi", "say 1 hi there", "say 2 a b c d e f"] {
            manager.dispatch(&console, line).unwrap();
        }
        assert_eq!(*said.lock(), vec!["hi", "hi there", "a b c d e f"]);
    }

    #[test]
    fn test_too_many_arguments() {
        let hits = counter();
        let manager = CommandManager::new();
        manager
            .register_command(
                CommandGroup::new("ping").subcommand(SubcommandSpec::default_command().handler(counting(&hits))),
            )
            .unwrap();
        let console = RecordingIssuer::console();

        let err = manager.dispatch(&as_issuer(&console), "ping extra").unwrap_err();
        assert!(matches!(err, CommandError::TooManyArguments { extra: 1 }));
        assert_eq!(console.take(), vec!["Error: Usage: ping"]);
    }

    #[test]
    fn test_flags_in_any_position() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let manager = CommandManager::new();
        manager
            .register_command(
                CommandGroup::new("inspect").subcommand(
                    SubcommandSpec::default_command()
                        .param(ParameterSpec::string("target").single())
                        .param(ParameterSpec::flag("verbose|v"))
                        .handler(move |_, args| {
                            sink.lock().push((
                                args.value::<String>("target")?.clone(),
                                args.flag("verbose"),
                            ));
                            Ok(())
                        }),
                ),
            )
            .unwrap();
        let console = as_issuer(&RecordingIssuer::console());

        manager.dispatch(&console, "inspect target --verbose").unwrap();
        manager.dispatch(&console, "inspect --verbose target").unwrap();
        manager.dispatch(&console, "inspect --v target").unwrap();
        manager.dispatch(&console, "inspect target").unwrap();

        let expected = ("target".to_string(), true);
        assert_eq!(
            *seen.lock(),
            vec![
                expected.clone(),
                expected.clone(),
                expected,
                ("target".to_string(), false)
            ]
        );
    }

    #[test]
    fn test_register_unregister_restores_state() {
        let manager = CommandManager::new();
        let base = manager
            .register_command(
                CommandGroup::new("tag").subcommand(
                    SubcommandSpec::new("list").handler(|_, _| Ok(())),
                ),
            )
            .unwrap();
        let before = manager.root_command("tag").unwrap();
        let roots_before = manager.registered_root_commands();

        let extra = manager
            .register_command(
                CommandGroup::new("tag|t")
                    .permission("tag.admin")
                    .subcommand(SubcommandSpec::new("purge").handler(|_, _| Ok(()))),
            )
            .unwrap();
        assert_eq!(manager.root_command("tag").unwrap().len(), 2);
        assert!(manager.root_command("t").is_some());

        assert!(manager.unregister_command(extra));
        assert!(!manager.unregister_command(extra));
        let after = manager.root_command("tag").unwrap();
        assert_eq!(after.len(), before.len());
        assert_eq!(after.labels().collect::<Vec<_>>(), vec!["list"]);
        assert_eq!(after.groups(), before.groups());
        assert_eq!(manager.registered_root_commands(), roots_before);

        assert!(manager.unregister_command(base));
        assert!(manager.root_command("tag").is_none());
    }

    #[test]
    fn test_registration_is_atomic() {
        struct Unknown;

        let manager = CommandManager::new();
        let err = manager
            .register_command(
                CommandGroup::new("broken")
                    .subcommand(SubcommandSpec::new("ok").handler(|_, _| Ok(())))
                    .subcommand(
                        SubcommandSpec::new("bad")
                            .param(ParameterSpec::of::<Unknown>("thing"))
                            .handler(|_, _| Ok(())),
                    ),
            )
            .unwrap_err();
        assert!(matches!(err, RegistrationError::UnresolvableType { .. }));
        assert!(manager.root_command("broken").is_none());
        assert!(manager.registered_root_commands().is_empty());
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Color {
        Red,
        Green,
    }

    impl CommandEnum for Color {
        const VARIANTS: &'static [&'static str] = &["Red", "Green"];

        fn from_index(index: usize) -> Option<Self> {
            [Self::Red, Self::Green].get(index).copied()
        }

        fn index(&self) -> usize {
            *self as usize
        }
    }

    #[test]
    fn test_enum_fallback() {
        let picked = Arc::new(parking_lot::Mutex::new(None));
        let sink = Arc::clone(&picked);
        let manager = CommandManager::new();
        manager
            .register_command(
                CommandGroup::new("paint").subcommand(
                    SubcommandSpec::default_command()
                        .param(ParameterSpec::enumeration::<Color>("color"))
                        .handler(move |_, args| {
                            *sink.lock() = args.get::<Color>("color").copied();
                            Ok(())
                        }),
                ),
            )
            .unwrap();
        let console = RecordingIssuer::console();

        manager.dispatch(&as_issuer(&console), "paint GREEN").unwrap();
        assert_eq!(*picked.lock(), Some(Color::Green));

        let err = manager.dispatch(&as_issuer(&console), "paint blue").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { .. }));
        assert_eq!(console.take(), vec!["Error: Please specify one of (Red, Green)."]);
    }

    #[test]
    fn test_unknown_command() {
        let manager = CommandManager::new();
        let console = RecordingIssuer::console();
        let err = manager.dispatch(&as_issuer(&console), "nothing here").unwrap_err();
        assert!(matches!(err, CommandError::UnknownCommand(ref l) if l == "nothing"));
        assert_eq!(console.take(), vec!["Error: Unknown Command, please type /help"]);
    }

    #[test]
    fn test_handler_errors() {
        let manager = CommandManager::new();
        manager
            .register_command(
                CommandGroup::new("boom")
                    .subcommand(SubcommandSpec::new("panic").handler(|_, _| panic!("kaboom")))
                    .subcommand(
                        SubcommandSpec::new("fail").handler(|_, _| Err("database offline".into())),
                    )
                    .subcommand(SubcommandSpec::new("arg").handler(|_, _| {
                        Err(ArgumentError::literal("Not today").into())
                    })),
            )
            .unwrap();
        let console = RecordingIssuer::console();
        let issuer = as_issuer(&console);

        let err = manager.dispatch(&issuer, "boom panic").unwrap_err();
        assert!(matches!(err, CommandError::Handler { handled: false, .. }));
        assert_eq!(operation_depth(), 0);
        assert_eq!(
            console.take(),
            vec!["Error: An error occurred. This problem has been logged. Sorry for the inconvenience."]
        );

        let err = manager.dispatch(&issuer, "boom fail").unwrap_err();
        assert!(matches!(err, CommandError::Handler { handled: false, .. }));
        console.take();

        let err = manager.dispatch(&issuer, "boom arg").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { parameter: None, .. }));
        assert_eq!(console.take(), vec!["Error: Not today"]);
    }

    #[test]
    fn test_exception_handler_order() {
        let group_calls = counter();
        let default_calls = counter();
        let manager = CommandManager::new();
        let calls = Arc::clone(&group_calls);
        manager
            .register_command(
                CommandGroup::new("job")
                    .exception_handler(move |_, _| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        false
                    })
                    .subcommand(SubcommandSpec::default_command().handler(|_, _| Err("nope".into()))),
            )
            .unwrap();
        let calls = Arc::clone(&default_calls);
        manager
            .set_default_exception_handler(
                Some(Arc::new(move |ctx: &ExceptionContext<'_>, _: &HandlerError| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    ctx.issuer.send_message("handled");
                    true
                })),
                false,
            )
            .unwrap();
        let console = RecordingIssuer::console();

        let err = manager.dispatch(&as_issuer(&console), "job").unwrap_err();
        assert!(matches!(err, CommandError::Handler { handled: true, .. }));
        assert_eq!(group_calls.load(Ordering::SeqCst), 1);
        assert_eq!(default_calls.load(Ordering::SeqCst), 1);
        assert_eq!(console.take(), vec!["handled"]);

        assert!(manager.set_default_exception_handler(None, false).is_err());
    }

    #[test]
    fn test_nested_dispatch() {
        let depths = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let manager = CommandManager::new();
        let sink = Arc::clone(&depths);
        manager
            .register_command(CommandGroup::new("inner").subcommand(
                SubcommandSpec::default_command().handler(move |inv, _| {
                    sink.lock().push((operation_depth(), inv.label().to_string()));
                    Ok(())
                }),
            ))
            .unwrap();
        let sink = Arc::clone(&depths);
        manager
            .register_command(CommandGroup::new("outer").subcommand(
                SubcommandSpec::default_command().handler(move |inv, _| {
                    inv.manager().dispatch(inv.issuer(), "inner")?;
                    let current = current_operation().map(|op| op.label().to_string());
                    sink.lock().push((operation_depth(), current.unwrap_or_default()));
                    Ok(())
                }),
            ))
            .unwrap();

        manager
            .dispatch(&as_issuer(&RecordingIssuer::console()), "outer")
            .unwrap();
        assert_eq!(
            *depths.lock(),
            vec![(2, "inner".to_string()), (1, "outer".to_string())]
        );
        assert_eq!(operation_depth(), 0);
    }

    #[test]
    fn test_command_conditions() {
        let hits = counter();
        let manager = CommandManager::new();
        manager.conditions().register_condition("player", |ctx| {
            if ctx.issuer().is_player() {
                Ok(())
            } else {
                Err(ArgumentError::new(MessageKey::PlayerOnly))
            }
        });
        manager
            .register_command(
                CommandGroup::new("home").subcommand(
                    SubcommandSpec::default_command()
                        .conditions("player")
                        .handler(counting(&hits)),
                ),
            )
            .unwrap();

        let console = RecordingIssuer::console();
        assert!(manager.dispatch(&as_issuer(&console), "home").is_err());
        assert_eq!(console.take().len(), 1);
        manager.dispatch(&as_issuer(&RecordingIssuer::player(&[])), "home").unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_register_with_dependencies() {
        struct Greeting(String);

        let manager = CommandManager::new();
        let err = manager
            .register_with(|deps| {
                let greeting = deps.get::<Greeting>()?;
                Ok(CommandGroup::new("hello").subcommand(
                    SubcommandSpec::default_command().handler(move |inv, _| {
                        inv.reply(&greeting.0);
                        Ok(())
                    }),
                ))
            })
            .unwrap_err();
        assert!(matches!(err, RegistrationError::UnresolvedDependency { .. }));

        manager
            .register_dependency(Arc::new(Greeting("hi there".to_string())))
            .unwrap();
        manager
            .register_with(|deps| {
                let greeting = deps.get::<Greeting>()?;
                Ok(CommandGroup::new("hello").subcommand(
                    SubcommandSpec::default_command().handler(move |inv, _| {
                        inv.reply(&greeting.0);
                        Ok(())
                    }),
                ))
            })
            .unwrap();
        let console = RecordingIssuer::console();
        manager.dispatch(&as_issuer(&console), "hello").unwrap();
        assert_eq!(console.take(), vec!["hi there"]);
    }

    #[test]
    fn test_help_listing() {
        let manager = CommandManager::new();
        manager
            .register_command(
                CommandGroup::new("tag")
                    .subcommand(
                        SubcommandSpec::new("add")
                            .description("Create a tag")
                            .param(ParameterSpec::string("name").single())
                            .handler(|_, _| Ok(())),
                    )
                    .subcommand(SubcommandSpec::new("secret").private().handler(|_, _| Ok(())))
                    .subcommand(SubcommandSpec::catch_unknown().handler(|_, _| Ok(())))
                    .subcommand(
                        SubcommandSpec::new("help")
                            .help_command()
                            .param(ParameterSpec::of::<CommandHelp>("help"))
                            .handler(|_, args| {
                                let help = args.value::<CommandHelp>("help")?;
                                assert_eq!(help.page(), 1);
                                Ok(())
                            }),
                    ),
            )
            .unwrap();
        let console = as_issuer(&RecordingIssuer::console());

        let help = manager.generate_command_help(&console, "TAG");
        let names: Vec<_> = help.entries().iter().map(HelpEntry::command).collect();
        assert_eq!(names, vec!["tag add", "tag help"]);
        assert_eq!(help.command_prefix(), "");

        manager.dispatch(&console, "tag help").unwrap();
        assert!(manager.generate_command_help_current().is_none());
    }

    #[test]
    fn test_show_help_output() {
        let manager = CommandManager::new();
        manager
            .register_command(
                CommandGroup::new("tag")
                    .subcommand(
                        SubcommandSpec::new("add")
                            .description("Create a tag")
                            .param(ParameterSpec::string("name").single())
                            .handler(|_, _| Ok(())),
                    )
                    .subcommand(SubcommandSpec::new("list").handler(|_, _| Ok(()))),
            )
            .unwrap();
        let player = RecordingIssuer::player(&[]);

        let help = manager.generate_command_help(&as_issuer(&player), "tag");
        help.show_help(&manager, &*player);
        assert_eq!(
            player.take(),
            vec![
                "=== Showing help for /tag. ===",
                "/tag add <name> (Create a tag)",
                "/tag list",
            ]
        );
    }

    #[test]
    fn test_complete() {
        let manager = CommandManager::new();
        manager.completions().register_completion("colors", |_| {
            vec!["red".to_string(), "green".to_string()]
        });
        manager
            .register_command(
                CommandGroup::new("tag")
                    .subcommand(
                        SubcommandSpec::new("add")
                            .param(ParameterSpec::string("name").single().completion("@colors"))
                            .param(ParameterSpec::flag("silent"))
                            .handler(|_, _| Ok(())),
                    )
                    .subcommand(
                        SubcommandSpec::new("admin")
                            .permission("tag.admin")
                            .handler(|_, _| Ok(())),
                    ),
            )
            .unwrap();
        let player = as_issuer(&RecordingIssuer::player(&[]));

        assert_eq!(manager.complete(&player, "t"), vec!["tag"]);
        assert_eq!(manager.complete(&player, "tag a"), vec!["add"]);
        assert_eq!(manager.complete(&player, "tag add "), vec!["red", "green"]);
        assert_eq!(manager.complete(&player, "tag add g"), vec!["green"]);
        assert_eq!(manager.complete(&player, "tag add red --s"), vec!["--silent"]);
        assert!(manager.complete(&player, "nope ").is_empty());
    }

    #[test]
    fn test_replacements_apply_at_registration() {
        let manager = CommandManager::new();
        manager.replacements().add("shop", "store");
        manager
            .register_command(
                CommandGroup::new("%shop")
                    .subcommand(SubcommandSpec::new("buy").handler(|inv, _| {
                        inv.reply("Welcome to the %shop");
                        Ok(())
                    })),
            )
            .unwrap();
        let console = RecordingIssuer::console();
        manager.dispatch(&as_issuer(&console), "store buy").unwrap();
        assert_eq!(console.take(), vec!["Welcome to the store"]);
    }

    #[test]
    fn test_set_parameter_resolver() {
        let manager = CommandManager::new();
        let key = manager
            .register_command(
                CommandGroup::new("who").subcommand(
                    SubcommandSpec::default_command()
                        .param(ParameterSpec::string("name").single())
                        .handler(|inv, args| {
                            inv.reply(args.value::<String>("name")?);
                            Ok(())
                        }),
                ),
            )
            .unwrap();
        let command = manager.root_subcommands("who")[0].key();
        assert!(manager.set_parameter_resolver(
            command,
            "name",
            ContextResolver::issuer_only(|ctx| Ok(format!("id {}", ctx.issuer().unique_id()))),
        ));
        assert!(!manager.set_parameter_resolver(command, "missing", ContextResolver::issuer_only(|_| Ok(0u8))));

        let console = RecordingIssuer::console();
        manager.dispatch(&as_issuer(&console), "who").unwrap();
        assert_eq!(console.take(), vec![format!("id {}", uuid::Uuid::nil())]);
        assert!(manager.unregister_command(key));
    }

    /// Manager with a single default sub-command under `root`
    fn single_command(
        root: &str,
        params: Vec<ParameterSpec>,
        handler: impl Fn(&CommandInvocation<'_>, &CommandArgs) -> crate::error::HandlerResult
            + Send
            + Sync
            + 'static,
    ) -> CommandManager {
        let manager = CommandManager::new();
        let mut spec = SubcommandSpec::default_command();
        for param in params {
            spec = spec.param(param);
        }
        manager
            .register_command(CommandGroup::new(root).subcommand(spec.handler(handler)))
            .unwrap();
        manager
    }

    #[test]
    fn test_empty_rest_array_binds_empty_vec() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let manager = single_command("echo", vec![ParameterSpec::string_array("words")], move |_, args| {
            sink.lock().push(args.value::<Vec<String>>("words")?.clone());
            Ok(())
        });
        let console = as_issuer(&RecordingIssuer::console());

        manager.dispatch(&console, "echo").unwrap();
        manager.dispatch(&console, "echo a b").unwrap();
        assert_eq!(
            *seen.lock(),
            vec![Vec::<String>::new(), vec!["a".to_string(), "b".to_string()]]
        );
    }

    #[test]
    fn test_array_fallback() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let manager = single_command("pick", vec![ParameterSpec::array::<i32>("ids")], move |_, args| {
            sink.lock().push(args.value::<Vec<i32>>("ids")?.clone());
            Ok(())
        });
        let console = RecordingIssuer::console();
        let issuer = as_issuer(&console);

        manager.dispatch(&issuer, "pick 1,2,,3").unwrap();
        manager.dispatch(&issuer, "pick 7").unwrap();
        assert_eq!(*seen.lock(), vec![vec![1, 2, 3], vec![7]]);

        let err = manager.dispatch(&issuer, "pick 1,x").unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidArgument { parameter: Some(ref p), .. } if p == "ids"
        ));
        assert_eq!(console.take(), vec!["Error: x must be a number."]);
    }

    #[test]
    fn test_value_flag() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let manager = single_command(
            "list",
            vec![
                ParameterSpec::value_flag::<i32>("limit|l"),
                ParameterSpec::value_flag::<i32>("offset").default_value("0"),
            ],
            move |_, args| {
                sink.lock().push((args.get::<i32>("limit").copied(), *args.value::<i32>("offset")?));
                Ok(())
            },
        );
        let console = RecordingIssuer::console();
        let issuer = as_issuer(&console);

        manager.dispatch(&issuer, "list --limit=5").unwrap();
        manager.dispatch(&issuer, "list --offset=3 --l=2").unwrap();
        manager.dispatch(&issuer, "list").unwrap();
        assert_eq!(*seen.lock(), vec![(Some(5), 0), (Some(2), 3), (None, 0)]);

        assert!(matches!(
            manager.dispatch(&issuer, "list --limit=many"),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert_eq!(console.take(), vec!["Error: many must be a number."]);
    }

    #[test]
    fn test_min_max_modifiers() {
        let hits = counter();
        let manager = single_command(
            "stack",
            vec![ParameterSpec::of::<i32>("amount").modifiers("min=1,max=64")],
            counting(&hits),
        );
        let console = RecordingIssuer::console();
        let issuer = as_issuer(&console);

        manager.dispatch(&issuer, "stack 64").unwrap();
        assert!(manager.dispatch(&issuer, "stack 65").is_err());
        assert!(manager.dispatch(&issuer, "stack 0").is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(
            console.take(),
            vec![
                "Error: Please specify a value at most 64.",
                "Error: Please specify a value at least 1.",
            ]
        );
    }

    #[test]
    fn test_suffixes_modifier() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let manager = single_command(
            "pay",
            vec![ParameterSpec::of::<i64>("amount").modifiers("suffixes")],
            move |_, args| {
                sink.lock().push(*args.value::<i64>("amount")?);
                Ok(())
            },
        );
        let strict = single_command("fine", vec![ParameterSpec::of::<i64>("amount")], |_, _| Ok(()));
        let console = RecordingIssuer::console();
        let issuer = as_issuer(&console);

        manager.dispatch(&issuer, "pay 2k").unwrap();
        manager.dispatch(&issuer, "pay 1.5m").unwrap();
        manager.dispatch(&issuer, "pay 12").unwrap();
        assert_eq!(*seen.lock(), vec![2_000, 1_500_000, 12]);

        assert!(strict.dispatch(&issuer, "fine 2k").is_err());
        assert_eq!(console.take(), vec!["Error: 2k must be a number."]);
    }

    #[test]
    fn test_values_restriction() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let manager = single_command(
            "color",
            vec![ParameterSpec::string("name").single().values(&["red", "green"])],
            move |_, args| {
                sink.lock().push(args.value::<String>("name")?.clone());
                Ok(())
            },
        );
        let console = RecordingIssuer::console();
        let issuer = as_issuer(&console);

        manager.dispatch(&issuer, "color GREEN").unwrap();
        assert_eq!(*seen.lock(), vec!["GREEN"]);

        let err = manager.dispatch(&issuer, "color blue").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { .. }));
        assert_eq!(console.take(), vec!["Error: Please specify one of (red, green)."]);
    }

    #[test]
    fn test_default_value_when_skipped() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let manager = single_command(
            "send",
            vec![
                ParameterSpec::of::<i32>("amount").default_value("5"),
                ParameterSpec::string("target").single(),
            ],
            move |_, args| {
                sink.lock().push((*args.value::<i32>("amount")?, args.value::<String>("target")?.clone()));
                Ok(())
            },
        );
        let console = as_issuer(&RecordingIssuer::console());

        manager.dispatch(&console, "send bob").unwrap();
        manager.dispatch(&console, "send 7 bob").unwrap();
        assert!(matches!(
            manager.dispatch(&console, "send"),
            Err(CommandError::MissingRequiredArgument { ref parameter }) if parameter == "target"
        ));
        assert_eq!(
            *seen.lock(),
            vec![(5, "bob".to_string()), (7, "bob".to_string())]
        );
    }

    #[test]
    fn test_parameter_condition() {
        let hits = counter();
        let manager = single_command(
            "split",
            vec![ParameterSpec::of::<i32>("amount").conditions("even")],
            counting(&hits),
        );
        manager
            .conditions()
            .register_parameter_condition::<i32, _>("even", |_, _, value| {
                if value % 2 == 0 {
                    Ok(())
                } else {
                    Err(ArgumentError::literal("Amount must be even"))
                }
            });
        let console = RecordingIssuer::console();
        let issuer = as_issuer(&console);

        manager.dispatch(&issuer, "split 4").unwrap();
        let err = manager.dispatch(&issuer, "split 3").unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidArgument { parameter: Some(ref p), .. } if p == "amount"
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(console.take(), vec!["Error: Amount must be even"]);
    }

    #[test]
    fn test_help_page_out_of_range() {
        let manager = CommandManager::new();
        manager
            .register_command(
                CommandGroup::new("tag")
                    .subcommand(SubcommandSpec::new("add").handler(|_, _| Ok(())))
                    .subcommand(
                        SubcommandSpec::new("help")
                            .help_command()
                            .param(ParameterSpec::of::<CommandHelp>("help"))
                            .handler(|inv, args| {
                                let help = args.value::<CommandHelp>("help")?;
                                help.show_help(inv.manager(), inv.issuer().as_ref());
                                Ok(())
                            }),
                    ),
            )
            .unwrap();
        let console = RecordingIssuer::console();

        manager
            .dispatch(&as_issuer(&console), "tag help 18446744073709551615")
            .unwrap();
        assert_eq!(console.take(), vec!["No more results."]);
    }
}
