//! Resolvers registered on every new registry

use uuid::Uuid;

use super::CommandContexts;
use crate::commands::CommandExecutionContext;
use crate::error::ArgumentError;
use crate::help::{self, CommandHelp};
use crate::issuer::IssuerRef;
use crate::messages::MessageKey;
use crate::util::{is_truthy, parse_integer, parse_number};

macro_rules! register_integers {
    ($contexts:expr, $($ty:ty),* $(,)?) => {
        $(
            $contexts.register_context::<$ty, _>(|ctx| {
                let value = resolve_integer(ctx, <$ty>::MIN as i128, <$ty>::MAX as i128)?;
                <$ty>::try_from(value).map_err(|_| {
                    ArgumentError::new(MessageKey::MustBeANumber).with("<num>", value.to_string())
                })
            });
        )*
    };
}

pub(super) fn register_defaults(contexts: &CommandContexts) {
    contexts.register_context::<String, _>(resolve_string);
    contexts.register_context::<Vec<String>, _>(|ctx| Ok(ctx.drain_args()));
    contexts.register_context::<bool, _>(|ctx| {
        let token = ctx.pop_first_arg().ok_or_else(ArgumentError::syntax)?;
        Ok(is_truthy(&token))
    });
    contexts.register_context::<char, _>(|ctx| {
        let token = ctx.pop_first_arg().ok_or_else(ArgumentError::syntax)?;
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ArgumentError::new(MessageKey::MustBeMaxLength).with("<max>", "1")),
        }
    });
    contexts.register_context::<Uuid, _>(|ctx| {
        let token = ctx.pop_first_arg().ok_or_else(ArgumentError::syntax)?;
        Uuid::parse_str(&token)
            .map_err(|_| ArgumentError::new(MessageKey::InvalidUuid).with("<value>", token))
    });

    register_integers!(contexts, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

    contexts.register_context::<f64, _>(|ctx| resolve_float(ctx, f64::MIN, f64::MAX));
    contexts.register_context::<f32, _>(|ctx| {
        resolve_float(ctx, f32::MIN as f64, f32::MAX as f64).map(|v| v as f32)
    });

    contexts.register_issuer_only_context::<IssuerRef, _>(|ctx| Ok(ctx.issuer().clone()));
    contexts.register_issuer_aware_context::<CommandHelp, _>(help::resolve_command_help);
}

/// Single token, or the rest of the line when the parameter consumes rest.
///
/// Honors `minlen` / `maxlen` modifiers.
fn resolve_string(ctx: &mut CommandExecutionContext<'_>) -> Result<String, ArgumentError> {
    let value = if ctx.consumes_rest() {
        ctx.drain_args().join(" ")
    } else {
        ctx.pop_first_arg().ok_or_else(ArgumentError::syntax)?
    };

    let length = value.chars().count() as i64;
    if let Some(min) = ctx.modifier_int("minlen") {
        if length < min {
            return Err(ArgumentError::new(MessageKey::MustBeMinLength).with("<min>", min.to_string()));
        }
    }
    if let Some(max) = ctx.modifier_int("maxlen") {
        if length > max {
            return Err(ArgumentError::new(MessageKey::MustBeMaxLength).with("<max>", max.to_string()));
        }
    }
    Ok(value)
}

fn not_a_number(token: &str) -> ArgumentError {
    ArgumentError::new(MessageKey::MustBeANumber).with("<num>", token)
}

fn resolve_integer(
    ctx: &mut CommandExecutionContext<'_>,
    type_min: i128,
    type_max: i128,
) -> Result<i128, ArgumentError> {
    let token = ctx.pop_first_arg().ok_or_else(ArgumentError::syntax)?;
    let value = parse_integer(&token, ctx.has_modifier("suffixes"))
        .ok_or_else(|| not_a_number(&token))?;

    let min = ctx
        .modifier_int("min")
        .map(i128::from)
        .map_or(type_min, |m| m.max(type_min));
    let max = ctx
        .modifier_int("max")
        .map(i128::from)
        .map_or(type_max, |m| m.min(type_max));

    if value > max {
        return Err(ArgumentError::new(MessageKey::PleaseSpecifyAtMost).with("<max>", max.to_string()));
    }
    if value < min {
        return Err(ArgumentError::new(MessageKey::PleaseSpecifyAtLeast).with("<min>", min.to_string()));
    }
    Ok(value)
}

fn resolve_float(
    ctx: &mut CommandExecutionContext<'_>,
    type_min: f64,
    type_max: f64,
) -> Result<f64, ArgumentError> {
    let token = ctx.pop_first_arg().ok_or_else(ArgumentError::syntax)?;
    let value = parse_number(&token, ctx.has_modifier("suffixes")).ok_or_else(|| not_a_number(&token))?;

    let min = ctx.modifier_number("min").map_or(type_min, |m| m.max(type_min));
    let max = ctx.modifier_number("max").map_or(type_max, |m| m.min(type_max));

    if value > max {
        return Err(ArgumentError::new(MessageKey::PleaseSpecifyAtMost).with("<max>", max.to_string()));
    }
    if value < min {
        return Err(ArgumentError::new(MessageKey::PleaseSpecifyAtLeast).with("<min>", min.to_string()));
    }
    Ok(value)
}
