//! Per-parameter facts precomputed at registration

use std::collections::BTreeSet;

use bitflags::bitflags;

use super::group::ParameterSpec;
use crate::contexts::{ArgType, CommandContexts, ContextResolver, ResolverKind};
use crate::error::RegistrationError;
use crate::issuer::IssuerRef;
use crate::permissions::parse_nodes;
use crate::util::parse_config_pairs;

bitflags! {
    /// What the router needs to know about a parameter
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u32 {
        /// May be left unbound
        const OPTIONAL = 0x0001;
        /// Resolver is issuer-aware or issuer-only
        const OPTIONAL_RESOLVER = 0x0002;
        /// Binding fails without a token for it
        const REQUIRES_INPUT = 0x0004;
        /// Reads from the token stream
        const CAN_CONSUME_INPUT = 0x0008;
        /// Takes a token if one is there
        const OPTIONAL_INPUT = 0x0010;
        /// Absorbs every remaining token
        const CONSUMES_REST = 0x0020;
        /// The issuer pseudo-parameter
        const COMMAND_ISSUER = 0x0040;
        /// A `--name` switch or value flag
        const FLAG = 0x0080;
        /// Last positional parameter
        const LAST = 0x0100;
        /// String parameter limited to one token
        const SINGLE = 0x0200;
        /// This parameter and all after it can bind with no tokens left
        const EXECUTES_WITHOUT_INPUT = 0x0400;
    }
}

/// Kind of a flag parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// `--verbose`, bound as `bool`
    Switch,
    /// `--count=3`, value resolved with the parameter's type
    Value,
}

/// One formal parameter of a registered sub-command
#[derive(Debug, Clone)]
pub struct CommandParameter {
    name: String,
    index: usize,
    arg_type: ArgType,
    resolver: ContextResolver,
    flags: ParamFlags,
    explicit_optional: bool,
    default_value: Option<String>,
    permissions: BTreeSet<String>,
    description: Option<String>,
    syntax_override: Option<String>,
    values: Vec<String>,
    modifiers: Vec<(String, Option<String>)>,
    conditions: Option<String>,
    completion: Option<String>,
    flag_kind: Option<FlagKind>,
    flag_names: Vec<String>,
}

impl CommandParameter {
    /// Build a parameter, failing if its type cannot be resolved
    pub(crate) fn new(
        spec: ParameterSpec,
        index: usize,
        is_last: bool,
        contexts: &CommandContexts,
        command: &str,
    ) -> Result<Self, RegistrationError> {
        let invalid = |reason: &str| RegistrationError::InvalidParameter {
            command: command.to_string(),
            parameter: spec.name.clone(),
            reason: reason.to_string(),
        };

        let is_flag = spec.flag.is_some();
        let is_issuer_type = spec.arg_type.is::<IssuerRef>();

        if is_issuer_type && index != 0 {
            return Err(invalid("the issuer parameter must be the first parameter"));
        }
        if spec.flag == Some(FlagKind::Switch) && !spec.arg_type.is::<bool>() {
            return Err(invalid("switch flags must be bool"));
        }
        if !is_flag && !is_last && spec.arg_type.is::<Vec<String>>() {
            return Err(invalid("a rest parameter must be the last positional parameter"));
        }

        let resolver = contexts.get_resolver(&spec.arg_type).ok_or_else(|| {
            RegistrationError::UnresolvableType {
                command: command.to_string(),
                parameter: spec.name.clone(),
                type_name: spec.arg_type.name(),
            }
        })?;

        // Empty defaults only make sense for strings
        let default_value = spec
            .default_value
            .filter(|d| !d.is_empty() || spec.arg_type.is::<String>());

        let flag_names: Vec<String> = if is_flag {
            crate::util::split_aliases(&spec.name)
        } else {
            Vec::new()
        };
        let name = flag_names
            .first()
            .cloned()
            .unwrap_or_else(|| spec.name.clone());

        let mut flags = ParamFlags::empty();
        flags.set(ParamFlags::FLAG, is_flag);
        flags.set(ParamFlags::LAST, is_last && !is_flag);
        flags.set(ParamFlags::SINGLE, spec.single);
        flags.set(ParamFlags::COMMAND_ISSUER, index == 0 && is_issuer_type);

        let mut param = Self {
            name,
            index,
            arg_type: spec.arg_type,
            resolver,
            flags,
            explicit_optional: spec.optional,
            default_value,
            permissions: spec.permission.as_deref().map(parse_nodes).unwrap_or_default(),
            description: spec.description,
            syntax_override: spec.syntax,
            values: spec.values,
            modifiers: spec.modifiers.as_deref().map(parse_config_pairs).unwrap_or_default(),
            conditions: spec.conditions,
            completion: spec.completion,
            flag_kind: spec.flag,
            flag_names,
        };
        param.derive_flags();
        Ok(param)
    }

    /// Recompute the facts that depend on the resolver
    fn derive_flags(&mut self) {
        let f = self.flags;
        let is_flag = f.contains(ParamFlags::FLAG);
        let is_last = f.contains(ParamFlags::LAST);
        let is_issuer = f.contains(ParamFlags::COMMAND_ISSUER);

        let optional = self.explicit_optional
            || self.default_value.is_some()
            || (is_last && self.arg_type.is::<Vec<String>>());
        let consumes_rest = !is_flag
            && is_last
            && ((self.arg_type.is::<String>() && !f.contains(ParamFlags::SINGLE))
                || self.arg_type.is::<Vec<String>>());
        let optional_resolver = self.resolver.is_optional_resolver();
        let requires_input = !optional && !optional_resolver && !is_flag;
        let can_consume =
            (!is_issuer && self.resolver.kind() != ResolverKind::IssuerOnly) || is_flag;

        let mut flags = f;
        flags.set(ParamFlags::OPTIONAL, optional);
        flags.set(ParamFlags::OPTIONAL_RESOLVER, optional_resolver);
        flags.set(ParamFlags::REQUIRES_INPUT, requires_input);
        flags.set(ParamFlags::CAN_CONSUME_INPUT, can_consume);
        flags.set(ParamFlags::OPTIONAL_INPUT, !requires_input && can_consume);
        flags.set(ParamFlags::CONSUMES_REST, consumes_rest);
        self.flags = flags;
    }

    /// Swap the resolver, e.g. for an administrative override
    pub(crate) fn set_resolver(&mut self, resolver: ContextResolver) {
        self.resolver = resolver;
        self.derive_flags();
    }

    pub(crate) fn set_executes_without_input(&mut self, value: bool) {
        self.flags.set(ParamFlags::EXECUTES_WITHOUT_INPUT, value);
    }

    /// Whether a parameter on its own needs no token
    pub(crate) fn binds_without_input(&self) -> bool {
        !self.flags.contains(ParamFlags::REQUIRES_INPUT)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn arg_type(&self) -> &ArgType {
        &self.arg_type
    }

    pub fn resolver(&self) -> &ContextResolver {
        &self.resolver
    }

    pub fn flags(&self) -> ParamFlags {
        self.flags
    }

    pub fn is_optional(&self) -> bool {
        self.flags.contains(ParamFlags::OPTIONAL)
    }

    pub fn requires_input(&self) -> bool {
        self.flags.contains(ParamFlags::REQUIRES_INPUT)
    }

    pub fn can_consume_input(&self) -> bool {
        self.flags.contains(ParamFlags::CAN_CONSUME_INPUT)
    }

    pub fn is_optional_input(&self) -> bool {
        self.flags.contains(ParamFlags::OPTIONAL_INPUT)
    }

    pub fn consumes_rest(&self) -> bool {
        self.flags.contains(ParamFlags::CONSUMES_REST)
    }

    pub fn is_command_issuer(&self) -> bool {
        self.flags.contains(ParamFlags::COMMAND_ISSUER)
    }

    pub fn is_flag(&self) -> bool {
        self.flags.contains(ParamFlags::FLAG)
    }

    pub fn is_last(&self) -> bool {
        self.flags.contains(ParamFlags::LAST)
    }

    /// This parameter and every one after it can bind with no tokens left
    pub fn can_execute_without_input(&self) -> bool {
        self.flags.contains(ParamFlags::EXECUTES_WITHOUT_INPUT)
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Allowed values, empty when unrestricted
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn conditions(&self) -> Option<&str> {
        self.conditions.as_deref()
    }

    pub fn completion(&self) -> Option<&str> {
        self.completion.as_deref()
    }

    pub fn flag_kind(&self) -> Option<FlagKind> {
        self.flag_kind
    }

    /// Flag name followed by its aliases
    pub fn flag_names(&self) -> &[String] {
        &self.flag_names
    }

    /// Check a (lowercased) flag name against this parameter
    pub fn matches_flag(&self, name: &str) -> bool {
        self.flag_names.iter().any(|n| n == name)
    }

    /// Look up a resolver modifier. The outer `Option` is presence.
    pub fn modifier(&self, name: &str) -> Option<Option<&str>> {
        let name = name.to_ascii_lowercase();
        self.modifiers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_deref())
    }

    /// Human syntax token: `<name>`, `[name]`, `(-flag)` or an override
    pub fn syntax(&self) -> Option<String> {
        if let Some(syntax) = &self.syntax_override {
            return Some(syntax.clone());
        }
        if self.is_command_issuer() {
            return None;
        }
        if self.is_flag() {
            Some(format!("(-{})", self.name))
        } else if self.requires_input() {
            Some(format!("<{}>", self.name))
        } else if self.is_optional_input() {
            Some(format!("[{}]", self.name))
        } else {
            None
        }
    }
}
