//! Declarative command registration
//!
//! A [`CommandGroup`] is what a plugin hands to
//! [`CommandManager::register_command`](super::CommandManager::register_command):
//! a root label plus its sub-commands, each with a parameter list and a
//! handler.
//!
//! # Example
//!
//! ```ignore
//! let group = CommandGroup::new("tag|t")
//!     .description("Manage tags")
//!     .subcommand(
//!         SubcommandSpec::new("add")
//!             .permission("tag.add")
//!             .param(ParameterSpec::issuer("sender"))
//!             .param(ParameterSpec::string("name").single())
//!             .handler(|inv, args| {
//!                 let name: &String = args.value("name")?;
//!                 inv.reply(&format!("Added {name}"));
//!                 Ok(())
//!             }),
//!     );
//! manager.register_command(group)?;
//! ```

use std::any::Any;
use std::sync::Arc;

use super::invocation::{CommandArgs, CommandInvocation, ExceptionContext};
use super::parameter::FlagKind;
use super::replacements::CommandReplacements;
use crate::contexts::{ArgType, CommandEnum};
use crate::error::{HandlerError, HandlerResult};
use crate::issuer::IssuerRef;

/// Handler body of a sub-command
pub type CommandHandler =
    Arc<dyn Fn(&CommandInvocation<'_>, &CommandArgs) -> HandlerResult + Send + Sync>;

/// Exception handler. Returns true when it dealt with the error.
pub type ExceptionHandler =
    Arc<dyn Fn(&ExceptionContext<'_>, &HandlerError) -> bool + Send + Sync>;

/// How a sub-command is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubcommandKind {
    /// Reached through a literal sub-label
    Labeled,
    /// Runs when no sub-label matched
    Default,
    /// Last resort when no sub-label matched
    CatchUnknown,
}

/// Declaration of one parameter
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub(crate) name: String,
    pub(crate) arg_type: ArgType,
    pub(crate) flag: Option<FlagKind>,
    pub(crate) optional: bool,
    pub(crate) default_value: Option<String>,
    pub(crate) permission: Option<String>,
    pub(crate) single: bool,
    pub(crate) syntax: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) values: Vec<String>,
    pub(crate) modifiers: Option<String>,
    pub(crate) conditions: Option<String>,
    pub(crate) completion: Option<String>,
}

impl ParameterSpec {
    fn with_type(name: impl Into<String>, arg_type: ArgType) -> Self {
        Self {
            name: name.into(),
            arg_type,
            flag: None,
            optional: false,
            default_value: None,
            permission: None,
            single: false,
            syntax: None,
            description: None,
            values: Vec::new(),
            modifiers: None,
            conditions: None,
            completion: None,
        }
    }

    /// Positional parameter of any registered type
    pub fn of<T: Any + Send + Sync>(name: impl Into<String>) -> Self {
        Self::with_type(name, ArgType::of::<T>())
    }

    /// `String` parameter. Consumes the rest of the line when last, unless [`single`](Self::single).
    pub fn string(name: impl Into<String>) -> Self {
        Self::of::<String>(name)
    }

    /// `Vec<String>` holding every remaining token
    pub fn string_array(name: impl Into<String>) -> Self {
        Self::of::<Vec<String>>(name)
    }

    /// Enum parameter matched by name
    pub fn enumeration<E: CommandEnum>(name: impl Into<String>) -> Self {
        Self::with_type(name, ArgType::enumeration::<E>())
    }

    /// `Vec<T>` read from one comma separated token
    pub fn array<T: Any + Send + Sync>(name: impl Into<String>) -> Self {
        Self::with_type(name, ArgType::array::<T>())
    }

    /// `Vec<E>` of enum values read from one comma separated token
    pub fn enum_array<E: CommandEnum>(name: impl Into<String>) -> Self {
        Self::with_type(name, ArgType::enum_array::<E>())
    }

    /// The issuer pseudo-parameter, bound as [`IssuerRef`]
    pub fn issuer(name: impl Into<String>) -> Self {
        Self::of::<IssuerRef>(name)
    }

    /// Boolean switch. `names` is `name|alias|...`.
    pub fn flag(names: impl Into<String>) -> Self {
        let mut spec = Self::of::<bool>(names);
        spec.flag = Some(FlagKind::Switch);
        spec
    }

    /// Flag carrying a value (`--count=3`), resolved as `T`
    pub fn value_flag<T: Any + Send + Sync>(names: impl Into<String>) -> Self {
        let mut spec = Self::of::<T>(names);
        spec.flag = Some(FlagKind::Value);
        spec
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Token used when the input has none for this parameter
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Comma separated nodes required to use the command at all
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Limit a trailing string to one token
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    pub fn syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = Some(syntax.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restrict input to these values (case-insensitive)
    pub fn values(mut self, values: &[&str]) -> Self {
        self.values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    /// Resolver configuration, e.g. `min=1,max=10` or `suffixes`
    pub fn modifiers(mut self, modifiers: impl Into<String>) -> Self {
        self.modifiers = Some(modifiers.into());
        self
    }

    /// `id[:config]|id2` conditions checked after this parameter resolves
    pub fn conditions(mut self, conditions: impl Into<String>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }

    /// Completion source: `@id[:config]` or `a|b|c`
    pub fn completion(mut self, completion: impl Into<String>) -> Self {
        self.completion = Some(completion.into());
        self
    }

    pub(crate) fn apply_replacements(&mut self, r: &CommandReplacements) {
        self.name = r.replace(&self.name);
        r.replace_opt(&mut self.default_value);
        r.replace_opt(&mut self.permission);
        r.replace_opt(&mut self.syntax);
        r.replace_opt(&mut self.description);
        r.replace_opt(&mut self.conditions);
        r.replace_opt(&mut self.completion);
        r.replace_opt(&mut self.modifiers);
    }
}

/// Declaration of one sub-command
#[derive(Clone)]
pub struct SubcommandSpec {
    pub(crate) kind: SubcommandKind,
    pub(crate) label: Option<String>,
    pub(crate) permission: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) syntax: Option<String>,
    pub(crate) private: bool,
    pub(crate) help_command: bool,
    pub(crate) search_tags: Option<String>,
    pub(crate) conditions: Option<String>,
    pub(crate) params: Vec<ParameterSpec>,
    pub(crate) handler: Option<CommandHandler>,
}

impl SubcommandSpec {
    fn with_kind(kind: SubcommandKind, label: Option<String>) -> Self {
        Self {
            kind,
            label,
            permission: None,
            description: None,
            syntax: None,
            private: false,
            help_command: false,
            search_tags: None,
            conditions: None,
            params: Vec::new(),
            handler: None,
        }
    }

    /// Sub-command reached through `label` (`add|a`, multi-word labels allowed)
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_kind(SubcommandKind::Labeled, Some(label.into()))
    }

    /// Sub-command run when no sub-label matches
    pub fn default_command() -> Self {
        Self::with_kind(SubcommandKind::Default, None)
    }

    /// Last-resort sub-command for unknown sub-labels
    pub fn catch_unknown() -> Self {
        Self::with_kind(SubcommandKind::CatchUnknown, None)
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the generated parameter syntax in usage and help
    pub fn syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = Some(syntax.into());
        self
    }

    /// Hide from help and completion
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Mark as the root's help command
    pub fn help_command(mut self) -> Self {
        self.help_command = true;
        self
    }

    /// Extra words matched by help search
    pub fn search_tags(mut self, tags: impl Into<String>) -> Self {
        self.search_tags = Some(tags.into());
        self
    }

    pub fn conditions(mut self, conditions: impl Into<String>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }

    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CommandInvocation<'_>, &CommandArgs) -> HandlerResult + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn kind(&self) -> SubcommandKind {
        self.kind
    }

    pub(crate) fn apply_replacements(&mut self, r: &CommandReplacements) {
        r.replace_opt(&mut self.label);
        r.replace_opt(&mut self.permission);
        r.replace_opt(&mut self.description);
        r.replace_opt(&mut self.syntax);
        r.replace_opt(&mut self.search_tags);
        r.replace_opt(&mut self.conditions);
        for param in &mut self.params {
            param.apply_replacements(r);
        }
    }
}

/// A root label and the sub-commands it contributes
#[derive(Clone)]
pub struct CommandGroup {
    pub(crate) name: String,
    pub(crate) permission: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) conditions: Option<String>,
    pub(crate) exception_handler: Option<ExceptionHandler>,
    pub(crate) subcommands: Vec<SubcommandSpec>,
}

impl CommandGroup {
    /// `name` is `root|alias|...`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permission: None,
            description: None,
            conditions: None,
            exception_handler: None,
            subcommands: Vec::new(),
        }
    }

    /// Nodes required by every sub-command of this group
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn conditions(mut self, conditions: impl Into<String>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }

    /// Handler for errors escaping this group's handlers
    pub fn exception_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ExceptionContext<'_>, &HandlerError) -> bool + Send + Sync + 'static,
    {
        self.exception_handler = Some(Arc::new(handler));
        self
    }

    pub fn subcommand(mut self, subcommand: SubcommandSpec) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn apply_replacements(&mut self, r: &CommandReplacements) {
        self.name = r.replace(&self.name);
        r.replace_opt(&mut self.permission);
        r.replace_opt(&mut self.description);
        r.replace_opt(&mut self.conditions);
        for sub in &mut self.subcommands {
            sub.apply_replacements(r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let group = CommandGroup::new("tag|t")
            .permission("tag.use")
            .subcommand(
                SubcommandSpec::new("add")
                    .param(ParameterSpec::string("name").single())
                    .handler(|_, _| Ok(())),
            )
            .subcommand(SubcommandSpec::default_command().private());

        assert_eq!(group.name(), "tag|t");
        assert_eq!(group.subcommands.len(), 2);
        assert_eq!(group.subcommands[0].kind(), SubcommandKind::Labeled);
        assert!(group.subcommands[0].handler.is_some());
        assert!(group.subcommands[0].params[0].single);
        assert_eq!(group.subcommands[1].kind(), SubcommandKind::Default);
        assert!(group.subcommands[1].private);
    }

    #[test]
    fn test_flag_specs() {
        let switch = ParameterSpec::flag("verbose|v");
        assert_eq!(switch.flag, Some(FlagKind::Switch));
        assert!(switch.arg_type.is::<bool>());

        let value = ParameterSpec::value_flag::<i32>("count");
        assert_eq!(value.flag, Some(FlagKind::Value));
        assert!(value.arg_type.is::<i32>());
    }

    #[test]
    fn test_apply_replacements() {
        let replacements = CommandReplacements::new();
        replacements.add("base", "shop");

        let mut group = CommandGroup::new("%base").subcommand(
            SubcommandSpec::new("buy")
                .permission("%{base}.buy")
                .param(ParameterSpec::string("item").description("Item from %base")),
        );
        group.apply_replacements(&replacements);

        assert_eq!(group.name, "shop");
        assert_eq!(group.subcommands[0].permission.as_deref(), Some("shop.buy"));
        assert_eq!(
            group.subcommands[0].params[0].description.as_deref(),
            Some("Item from shop")
        );
    }
}
