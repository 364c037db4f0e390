//! Named pre-execution checks
//!
//! A conditions string is `id[:config]|id2[:config]`, e.g.
//! `cooldown:secs=30|player`. The config part is `key=value,flag`.

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, error};

use super::execution::CommandExecutionContext;
use crate::error::ArgumentError;
use crate::issuer::CommandIssuer;
use crate::messages::MessageKey;
use crate::util::parse_config_pairs;

/// Command-level condition
pub type CommandConditionFn =
    Arc<dyn Fn(&ConditionContext<'_>) -> Result<(), ArgumentError> + Send + Sync>;

/// Parameter-level condition on a type-erased value
pub type ParameterConditionFn = Arc<
    dyn Fn(&ConditionContext<'_>, &CommandExecutionContext<'_>, &(dyn Any + Send + Sync)) -> Result<(), ArgumentError>
        + Send
        + Sync,
>;

/// What a condition is evaluated against
pub struct ConditionContext<'a> {
    issuer: &'a dyn CommandIssuer,
    id: &'a str,
    config: Option<&'a str>,
    pairs: Vec<(String, Option<String>)>,
}

impl<'a> ConditionContext<'a> {
    pub fn new(issuer: &'a dyn CommandIssuer, id: &'a str, config: Option<&'a str>) -> Self {
        Self {
            issuer,
            id,
            config,
            pairs: config.map(parse_config_pairs).unwrap_or_default(),
        }
    }

    pub fn issuer(&self) -> &'a dyn CommandIssuer {
        self.issuer
    }

    /// Condition id as written, lowercased
    pub fn id(&self) -> &'a str {
        self.id
    }

    /// Raw config text after `:`
    pub fn config(&self) -> Option<&'a str> {
        self.config
    }

    pub fn has_config(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        self.pairs.iter().any(|(k, _)| *k == key)
    }

    pub fn config_value(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Integer config value, or `default` when absent or not a number
    pub fn config_int(&self, key: &str, default: i64) -> i64 {
        self.config_value(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

/// Split a conditions string into `(id, config)` pairs
pub fn parse_conditions(conditions: &str) -> Vec<(String, Option<String>)> {
    conditions
        .split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| match c.split_once(':') {
            Some((id, config)) => (id.trim().to_ascii_lowercase(), Some(config.trim().to_string())),
            None => (c.to_ascii_lowercase(), None),
        })
        .collect()
}

fn unknown_condition(id: &str) -> ArgumentError {
    error!("Could not find command condition '{}'", id);
    ArgumentError::new(MessageKey::ErrorPerformingCommand)
}

/// Per-manager condition registry
#[derive(Default)]
pub struct CommandConditions {
    command: DashMap<String, CommandConditionFn>,
    parameter: DashMap<(TypeId, String), ParameterConditionFn>,
}

impl CommandConditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command-level condition
    pub fn register_condition<F>(&self, id: &str, condition: F)
    where
        F: Fn(&ConditionContext<'_>) -> Result<(), ArgumentError> + Send + Sync + 'static,
    {
        let id = id.to_ascii_lowercase();
        debug!("Registered command condition '{}'", id);
        self.command.insert(id, Arc::new(condition));
    }

    /// Register a condition on parameters of type `T`
    pub fn register_parameter_condition<T, F>(&self, id: &str, condition: F)
    where
        T: Any + Send + Sync,
        F: Fn(&ConditionContext<'_>, &CommandExecutionContext<'_>, &T) -> Result<(), ArgumentError>
            + Send
            + Sync
            + 'static,
    {
        let id = id.to_ascii_lowercase();
        debug!(
            "Registered parameter condition '{}' for {}",
            id,
            std::any::type_name::<T>()
        );
        let erased: ParameterConditionFn = Arc::new(
            move |cond: &ConditionContext<'_>,
                  ctx: &CommandExecutionContext<'_>,
                  value: &(dyn Any + Send + Sync)| {
                match value.downcast_ref::<T>() {
                    Some(value) => condition(cond, ctx, value),
                    None => Err(ArgumentError::new(MessageKey::ErrorPerformingCommand)),
                }
            },
        );
        self.parameter.insert((TypeId::of::<T>(), id), erased);
    }

    /// Check every condition in `conditions` for an issuer
    pub fn validate_command(
        &self,
        issuer: &dyn CommandIssuer,
        conditions: &str,
    ) -> Result<(), ArgumentError> {
        for (id, config) in parse_conditions(conditions) {
            let condition = self
                .command
                .get(&id)
                .map(|c| Arc::clone(c.value()))
                .ok_or_else(|| unknown_condition(&id))?;
            condition(&ConditionContext::new(issuer, &id, config.as_deref()))?;
        }
        Ok(())
    }

    /// Check the current parameter's conditions against its resolved value
    pub fn validate_parameter(
        &self,
        ctx: &CommandExecutionContext<'_>,
        conditions: &str,
        value: &(dyn Any + Send + Sync),
    ) -> Result<(), ArgumentError> {
        let type_id = ctx.parameter().arg_type().type_id();
        for (id, config) in parse_conditions(conditions) {
            let condition = self
                .parameter
                .get(&(type_id, id.clone()))
                .map(|c| Arc::clone(c.value()))
                .ok_or_else(|| unknown_condition(&id))?;
            let cond = ConditionContext::new(ctx.issuer().as_ref(), &id, config.as_deref());
            condition(&cond, ctx, value)?;
        }
        Ok(())
    }
}
