//! Candidate selection for a root command

use std::sync::Arc;

use slotmap::SlotMap;

use super::execution::FlagSet;
use super::registered::{CommandKey, RegisteredCommand};
use super::root::RootCommand;

/// Ordered candidates for one input
#[derive(Debug)]
pub(crate) struct RouteSearch {
    pub candidates: Vec<Arc<RegisteredCommand>>,
    /// Tokens left after the matched sub-label
    pub args: Vec<String>,
    /// Matched literal sub-label, `None` when falling back
    pub sub_label: Option<String>,
}

/// Find the candidates for `args` under `root`.
///
/// The longest literal sub-label that prefixes the input wins outright.
/// Its sub-commands are tried arity-fitting first, each group in
/// registration order. With no literal match the fallbacks are: defaults
/// that fit, then catch-unknown handlers, then defaults that do not fit.
pub(crate) fn route(
    root: &RootCommand,
    commands: &SlotMap<CommandKey, Arc<RegisteredCommand>>,
    args: &[String],
    flag_prefix: &str,
) -> RouteSearch {
    let lookup = |keys: &[CommandKey]| -> Vec<Arc<RegisteredCommand>> {
        keys.iter().filter_map(|k| commands.get(*k).cloned()).collect()
    };

    for words in (1..=args.len()).rev() {
        let label = args[..words]
            .iter()
            .map(|a| a.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        let keys = root.get(&label);
        if keys.is_empty() {
            continue;
        }

        let rest = args[words..].to_vec();
        let count = positional_count(&rest, flag_prefix);
        let mut candidates = lookup(keys);
        candidates.sort_by_key(|c| (!c.accepts_arg_count(count), c.seq()));
        return RouteSearch {
            candidates,
            args: rest,
            sub_label: Some(label),
        };
    }

    let count = positional_count(args, flag_prefix);
    let mut defaults = lookup(root.defaults());
    defaults.sort_by_key(|c| c.seq());
    let (fitting, unfit): (Vec<_>, Vec<_>) =
        defaults.into_iter().partition(|c| c.accepts_arg_count(count));

    let mut catch_unknown = lookup(root.catch_unknowns());
    catch_unknown.sort_by_key(|c| c.seq());

    let mut candidates = fitting;
    candidates.extend(catch_unknown);
    candidates.extend(unfit);
    RouteSearch {
        candidates,
        args: args.to_vec(),
        sub_label: None,
    }
}

fn positional_count(args: &[String], flag_prefix: &str) -> usize {
    FlagSet::extract(args, flag_prefix).0.len()
}
