//! Binding input tokens to a candidate's parameters

use super::execution::CommandExecutionContext;
use super::invocation::CommandArgs;
use super::parameter::{CommandParameter, FlagKind};
use super::registered::RegisteredCommand;
use super::CommandManager;
use crate::contexts::ArgValue;
use crate::error::{ArgumentError, CommandError};
use crate::issuer::IssuerRef;
use crate::messages::MessageKey;

/// Why a candidate failed to bind, and how far it got
#[derive(Debug)]
pub(crate) struct BindFailure {
    pub error: CommandError,
    /// Positional tokens successfully consumed before the failure
    pub consumed: usize,
}

impl BindFailure {
    fn argument(param: &CommandParameter, source: ArgumentError, consumed: usize) -> Self {
        Self {
            error: CommandError::InvalidArgument {
                parameter: Some(param.name().to_string()),
                source,
            },
            consumed,
        }
    }
}

/// Bind `args` to every parameter of `command`, in declaration order
pub(crate) fn bind(
    manager: &CommandManager,
    command: &RegisteredCommand,
    issuer: &IssuerRef,
    args: &[String],
) -> Result<CommandArgs, BindFailure> {
    let mut ctx = CommandExecutionContext::new(manager, command, issuer, args);
    let params = command.parameters();

    for (index, param) in params.iter().enumerate() {
        ctx.set_parameter(index);

        if param.is_flag() {
            bind_flag(&mut ctx, param)?;
            continue;
        }
        if param.is_command_issuer() {
            ctx.bind(param.name(), Some(Box::new(issuer.clone())));
            continue;
        }

        let required_after = params[index + 1..]
            .iter()
            .filter(|p| !p.is_flag() && p.requires_input())
            .count();
        let rest_array = param.consumes_rest() && param.arg_type().is::<Vec<String>>();

        // Leave tokens for the required parameters that follow
        let skip_optional = param.is_optional()
            && !param.resolver().is_optional_resolver()
            && !rest_array
            && ctx.remaining() <= required_after;

        // An empty rest array still resolves, to an empty vec
        let drain_empty = rest_array && param.default_value().is_none();
        if (ctx.is_empty() && !drain_empty) || skip_optional {
            if let Some(default) = param.default_value() {
                ctx.push_front_arg(default.to_string());
            } else if param.is_optional() {
                let value = if param.resolver().is_optional_resolver() {
                    Some(resolve(&mut ctx, param)?)
                } else {
                    None
                };
                ctx.bind(param.name(), value);
                continue;
            } else if param.requires_input() {
                return Err(BindFailure {
                    error: CommandError::MissingRequiredArgument {
                        parameter: param.name().to_string(),
                    },
                    consumed: ctx.consumed(),
                });
            }
        }

        check_values(&ctx, param)?;
        let value = resolve(&mut ctx, param)?;
        ctx.bind(param.name(), Some(value));
    }

    if !ctx.is_empty() && !command.consumes_rest() {
        return Err(BindFailure {
            error: CommandError::TooManyArguments {
                extra: ctx.remaining(),
            },
            consumed: ctx.consumed(),
        });
    }
    Ok(ctx.into_args())
}

/// Run the parameter's resolver and its conditions
fn resolve(
    ctx: &mut CommandExecutionContext<'_>,
    param: &CommandParameter,
) -> Result<ArgValue, BindFailure> {
    let before = ctx.consumed();
    let value = param
        .resolver()
        .resolve(ctx)
        .map_err(|e| BindFailure::argument(param, e, before))?;

    if let Some(conditions) = param.conditions() {
        ctx.manager()
            .conditions()
            .validate_parameter(ctx, conditions, value.as_ref())
            .map_err(|e| BindFailure::argument(param, e, before))?;
    }
    Ok(value)
}

/// Reject tokens outside a parameter's allowed value list
fn check_values(ctx: &CommandExecutionContext<'_>, param: &CommandParameter) -> Result<(), BindFailure> {
    if param.values().is_empty() {
        return Ok(());
    }
    let token = ctx.first_arg().unwrap_or_default();
    if param.values().iter().any(|v| v.eq_ignore_ascii_case(token)) {
        return Ok(());
    }
    let error = ArgumentError::new(MessageKey::PleaseSpecifyOneOf)
        .with("<valid>", param.values().join(", "));
    Err(BindFailure::argument(param, error, ctx.consumed()))
}

fn bind_flag(ctx: &mut CommandExecutionContext<'_>, param: &CommandParameter) -> Result<(), BindFailure> {
    let given = ctx
        .flags()
        .find(param.flag_names())
        .map(|value| value.map(str::to_string));

    match (param.flag_kind(), given) {
        (Some(FlagKind::Switch), None) => {
            ctx.bind(param.name(), Some(Box::new(false)));
        }
        (Some(FlagKind::Switch), Some(value)) => {
            let on = value.as_deref().map_or(true, crate::util::is_truthy);
            ctx.bind(param.name(), Some(Box::new(on)));
        }
        (_, Some(Some(value))) => {
            ctx.push_front_arg(value);
            let value = resolve(ctx, param)?;
            ctx.bind(param.name(), Some(value));
        }
        (_, Some(None)) => {
            return Err(BindFailure::argument(param, ArgumentError::syntax(), ctx.consumed()));
        }
        (_, None) => match param.default_value() {
            Some(default) => {
                ctx.push_front_arg(default.to_string());
                let value = resolve(ctx, param)?;
                ctx.bind(param.name(), Some(value));
            }
            None => ctx.bind(param.name(), None),
        },
    }
    Ok(())
}
