//! A sub-command bound into a root's table

use std::collections::BTreeSet;

use slotmap::new_key_type;

use super::group::{CommandHandler, ExceptionHandler, SubcommandKind, SubcommandSpec};
use super::parameter::CommandParameter;
use crate::contexts::{CommandContexts, ContextResolver};
use crate::error::RegistrationError;
use crate::permissions::parse_nodes;

new_key_type! {
    /// Handle for a registered sub-command
    pub struct CommandKey;
}

new_key_type! {
    /// Handle for one `register_command` call
    pub struct GroupKey;
}

/// Group-level settings every sub-command inherits
pub(crate) struct GroupDefaults<'a> {
    pub root_name: &'a str,
    pub permission: Option<&'a str>,
    pub conditions: Option<&'a str>,
    pub description: Option<&'a str>,
    pub exception_handler: Option<ExceptionHandler>,
}

/// One handler reachable under a root
#[derive(Clone)]
pub struct RegisteredCommand {
    pub(crate) key: CommandKey,
    group: GroupKey,
    seq: u64,
    kind: SubcommandKind,
    root_name: String,
    labels: Vec<String>,
    parameters: Vec<CommandParameter>,
    permissions: BTreeSet<String>,
    required_resolvers: usize,
    optional_resolvers: usize,
    consumes_rest: bool,
    private: bool,
    help_command: bool,
    description: Option<String>,
    syntax_override: Option<String>,
    search_tags: Option<String>,
    group_conditions: Option<String>,
    conditions: Option<String>,
    handler: CommandHandler,
    exception_handler: Option<ExceptionHandler>,
}

impl RegisteredCommand {
    pub(crate) fn new(
        spec: SubcommandSpec,
        defaults: &GroupDefaults<'_>,
        group: GroupKey,
        seq: u64,
        contexts: &CommandContexts,
    ) -> Result<Self, RegistrationError> {
        let labels = match (spec.kind, &spec.label) {
            (SubcommandKind::Labeled, Some(label)) => crate::util::split_aliases(label),
            _ => Vec::new(),
        };
        let display = match labels.first() {
            Some(label) => format!("{} {}", defaults.root_name, label),
            None => defaults.root_name.to_string(),
        };
        if spec.kind == SubcommandKind::Labeled && labels.is_empty() {
            return Err(RegistrationError::InvalidParameter {
                command: display,
                parameter: String::new(),
                reason: "sub-command label is empty".to_string(),
            });
        }
        let handler = spec
            .handler
            .ok_or_else(|| RegistrationError::MissingHandler {
                command: display.clone(),
            })?;

        let last_positional = spec.params.iter().rposition(|p| p.flag.is_none());
        let mut parameters = Vec::with_capacity(spec.params.len());
        for (index, param) in spec.params.into_iter().enumerate() {
            let is_last = Some(index) == last_positional;
            parameters.push(CommandParameter::new(param, index, is_last, contexts, &display)?);
        }
        link_parameters(&mut parameters);

        let mut permissions = BTreeSet::new();
        if let Some(p) = defaults.permission {
            permissions.extend(parse_nodes(p));
        }
        if let Some(p) = &spec.permission {
            permissions.extend(parse_nodes(p));
        }
        for param in &parameters {
            permissions.extend(param.permissions().iter().cloned());
        }

        let mut command = Self {
            key: CommandKey::default(),
            group,
            seq,
            kind: spec.kind,
            root_name: defaults.root_name.to_string(),
            labels,
            parameters,
            permissions,
            required_resolvers: 0,
            optional_resolvers: 0,
            consumes_rest: false,
            private: spec.private,
            help_command: spec.help_command,
            description: spec.description.or_else(|| {
                (spec.kind != SubcommandKind::Labeled)
                    .then(|| defaults.description.map(str::to_string))
                    .flatten()
            }),
            syntax_override: spec.syntax,
            search_tags: spec.search_tags,
            group_conditions: defaults.conditions.map(str::to_string),
            conditions: spec.conditions,
            handler,
            exception_handler: defaults.exception_handler.clone(),
        };
        command.count_resolvers();
        Ok(command)
    }

    fn count_resolvers(&mut self) {
        let positional = self.parameters.iter().filter(|p| !p.is_flag());
        self.required_resolvers = positional.clone().filter(|p| p.requires_input()).count();
        self.optional_resolvers = positional.filter(|p| p.is_optional_input()).count();
        self.consumes_rest = self.parameters.iter().any(CommandParameter::consumes_rest);
    }

    /// Swap one parameter's resolver and recompute everything derived from it
    pub(crate) fn set_parameter_resolver(&mut self, name: &str, resolver: ContextResolver) -> bool {
        let Some(param) = self.parameters.iter_mut().find(|p| p.name() == name) else {
            return false;
        };
        param.set_resolver(resolver);
        link_parameters(&mut self.parameters);
        self.count_resolvers();
        true
    }

    pub fn key(&self) -> CommandKey {
        self.key
    }

    pub fn group(&self) -> GroupKey {
        self.group
    }

    /// Registration order, used to break ties
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn kind(&self) -> SubcommandKind {
        self.kind
    }

    /// Primary root label
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Primary sub-label, `None` for default and catch-unknown
    pub fn sub_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    /// Sub-label and aliases
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Full command text without parameters, e.g. `tag add`
    pub fn command(&self) -> String {
        match self.sub_label() {
            Some(label) => format!("{} {}", self.root_name, label),
            None => self.root_name.clone(),
        }
    }

    pub fn parameters(&self) -> &[CommandParameter] {
        &self.parameters
    }

    /// Every node required to run this sub-command
    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    /// Fewest positional tokens that can bind
    pub fn min_args(&self) -> usize {
        self.required_resolvers
    }

    /// Most positional tokens that can bind, `None` when unbounded
    pub fn max_args(&self) -> Option<usize> {
        if self.consumes_rest {
            None
        } else {
            Some(self.required_resolvers + self.optional_resolvers)
        }
    }

    pub fn consumes_rest(&self) -> bool {
        self.consumes_rest
    }

    /// Whether `count` positional tokens fit this sub-command's arity
    pub fn accepts_arg_count(&self, count: usize) -> bool {
        if count == 0 {
            return self.can_execute_without_input();
        }
        count >= self.min_args() && self.max_args().map_or(true, |max| count <= max)
    }

    /// Whether every parameter can bind with no input at all
    pub fn can_execute_without_input(&self) -> bool {
        self.parameters
            .first()
            .map_or(true, CommandParameter::can_execute_without_input)
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn is_help_command(&self) -> bool {
        self.help_command
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn search_tags(&self) -> Option<&str> {
        self.search_tags.as_deref()
    }

    /// Group and sub-command conditions, group first
    pub fn conditions(&self) -> impl Iterator<Item = &str> {
        self.group_conditions
            .as_deref()
            .into_iter()
            .chain(self.conditions.as_deref())
    }

    /// Parameter syntax, e.g. `<name> [count]`
    pub fn syntax_text(&self) -> String {
        if let Some(syntax) = &self.syntax_override {
            return syntax.clone();
        }
        self.parameters
            .iter()
            .filter_map(CommandParameter::syntax)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn handler(&self) -> &CommandHandler {
        &self.handler
    }

    pub(crate) fn exception_handler(&self) -> Option<&ExceptionHandler> {
        self.exception_handler.as_ref()
    }
}

impl std::fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("command", &self.command())
            .field("kind", &self.kind)
            .field("seq", &self.seq)
            .field("parameters", &self.parameters.len())
            .finish_non_exhaustive()
    }
}

/// Mark each parameter that, together with everything after it, binds
/// without further input.
fn link_parameters(parameters: &mut [CommandParameter]) {
    let mut tail = true;
    for param in parameters.iter_mut().rev() {
        tail = tail && param.binds_without_input();
        param.set_executes_without_input(tail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::group::ParameterSpec;

    fn defaults() -> GroupDefaults<'static> {
        GroupDefaults {
            root_name: "tag",
            permission: Some("tag.use"),
            conditions: None,
            description: Some("Tags"),
            exception_handler: None,
        }
    }

    fn build(spec: SubcommandSpec) -> RegisteredCommand {
        RegisteredCommand::new(spec, &defaults(), GroupKey::default(), 0, &CommandContexts::new())
            .unwrap()
    }

    #[test]
    fn test_arity_and_syntax() {
        let cmd = build(
            SubcommandSpec::new("add|a")
                .permission("tag.add")
                .param(ParameterSpec::issuer("sender"))
                .param(ParameterSpec::string("name").single())
                .param(ParameterSpec::of::<i32>("count").default_value("1"))
                .param(ParameterSpec::flag("silent"))
                .handler(|_, _| Ok(())),
        );

        assert_eq!(cmd.command(), "tag add");
        assert_eq!(cmd.labels(), ["add", "a"]);
        assert_eq!(cmd.min_args(), 1);
        assert_eq!(cmd.max_args(), Some(2));
        assert!(!cmd.accepts_arg_count(0));
        assert!(cmd.accepts_arg_count(1));
        assert!(cmd.accepts_arg_count(2));
        assert!(!cmd.accepts_arg_count(3));
        assert_eq!(cmd.syntax_text(), "<name> [count] (-silent)");
        assert!(cmd.permissions().contains("tag.use"));
        assert!(cmd.permissions().contains("tag.add"));
    }

    #[test]
    fn test_rest_is_unbounded() {
        let cmd = build(
            SubcommandSpec::new("say")
                .param(ParameterSpec::string("message"))
                .handler(|_, _| Ok(())),
        );
        assert!(cmd.consumes_rest());
        assert_eq!(cmd.max_args(), None);
        assert!(cmd.accepts_arg_count(7));
    }

    #[test]
    fn test_lookahead_tail() {
        let cmd = build(
            SubcommandSpec::new("list")
                .param(ParameterSpec::of::<i32>("page").optional())
                .param(ParameterSpec::string("filter").optional())
                .handler(|_, _| Ok(())),
        );
        assert!(cmd.can_execute_without_input());
        assert!(cmd.accepts_arg_count(0));

        let cmd = build(
            SubcommandSpec::new("set")
                .param(ParameterSpec::of::<i32>("page").optional())
                .param(ParameterSpec::string("value"))
                .handler(|_, _| Ok(())),
        );
        assert!(!cmd.can_execute_without_input());
        assert!(!cmd.parameters()[0].can_execute_without_input());
        assert!(!cmd.parameters()[1].can_execute_without_input());
    }

    #[test]
    fn test_default_inherits_group_description() {
        let cmd = build(SubcommandSpec::default_command().handler(|_, _| Ok(())));
        assert_eq!(cmd.command(), "tag");
        assert_eq!(cmd.sub_label(), None);
        assert_eq!(cmd.description(), Some("Tags"));
    }

    #[test]
    fn test_missing_handler() {
        let err = RegisteredCommand::new(
            SubcommandSpec::new("x"),
            &defaults(),
            GroupKey::default(),
            0,
            &CommandContexts::new(),
        )
        .unwrap_err();
        assert!(matches!(err, RegistrationError::MissingHandler { .. }));
    }
}
