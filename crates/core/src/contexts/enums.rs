//! Enum value sets and the fallback enum resolver

use std::any::Any;
use std::sync::Arc;

use super::{ArgValue, ContextResolver, EnumInfo, ResolverFn, ResolverKind};
use crate::commands::CommandExecutionContext;
use crate::error::ArgumentError;
use crate::messages::MessageKey;
use crate::util::simplify_string;

/// An enum usable as a command parameter without registering a resolver.
///
/// Usually derived with `#[derive(CommandEnum)]`:
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, CommandEnum)]
/// enum Color {
///     Red,
///     #[command_enum(rename = "dark_red")]
///     DarkRed,
/// }
/// ```
pub trait CommandEnum: Any + Send + Sync + Sized {
    /// Value names in declaration order
    const VARIANTS: &'static [&'static str];

    /// Value at a declaration index
    fn from_index(index: usize) -> Option<Self>;

    /// Declaration index of this value
    fn index(&self) -> usize;

    /// Declared name of this value
    fn name(&self) -> &'static str {
        Self::VARIANTS.get(self.index()).copied().unwrap_or_default()
    }

    /// Loose, case-insensitive lookup by name
    fn from_name(name: &str) -> Option<Self> {
        let wanted = simplify_string(name);
        Self::VARIANTS
            .iter()
            .position(|v| simplify_string(v) == wanted)
            .and_then(Self::from_index)
    }
}

fn construct<E: CommandEnum>(index: usize) -> Option<ArgValue> {
    E::from_index(index).map(|value| Box::new(value) as ArgValue)
}

pub(super) fn enum_info<E: CommandEnum>() -> EnumInfo {
    EnumInfo {
        variants: E::VARIANTS,
        construct: construct::<E>,
    }
}

/// Resolver matching one token against the declared names
pub(super) fn enum_resolver(info: EnumInfo) -> ContextResolver {
    let func: Arc<ResolverFn> = Arc::new(move |ctx: &mut CommandExecutionContext<'_>| {
        let token = ctx.pop_first_arg().ok_or_else(ArgumentError::syntax)?;
        let wanted = simplify_string(&token);
        info.variants
            .iter()
            .position(|v| simplify_string(v) == wanted)
            .and_then(info.construct)
            .ok_or_else(|| {
                ArgumentError::new(MessageKey::PleaseSpecifyOneOf)
                    .with("<valid>", info.variants.join(", "))
            })
    });
    ContextResolver::raw(ResolverKind::Token, func)
}
