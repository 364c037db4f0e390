//! Tab completion sources
//!
//! A parameter's completion string is either a named provider, `@id[:config]`,
//! or a literal list `a|b|c`.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::issuer::CommandIssuer;
use crate::util::parse_config_pairs;

/// A named completion provider
pub type CompletionFn = Arc<dyn Fn(&CompletionContext<'_>) -> Vec<String> + Send + Sync>;

/// What a completion provider is asked about
pub struct CompletionContext<'a> {
    issuer: &'a dyn CommandIssuer,
    input: &'a str,
    config: Option<&'a str>,
    args: &'a [String],
}

impl<'a> CompletionContext<'a> {
    pub fn new(
        issuer: &'a dyn CommandIssuer,
        input: &'a str,
        config: Option<&'a str>,
        args: &'a [String],
    ) -> Self {
        Self {
            issuer,
            input,
            config,
            args,
        }
    }

    pub fn issuer(&self) -> &'a dyn CommandIssuer {
        self.issuer
    }

    /// Partial token being completed
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Raw config text after `:`
    pub fn config(&self) -> Option<&'a str> {
        self.config
    }

    pub fn config_value(&self, key: &str) -> Option<String> {
        let key = key.to_ascii_lowercase();
        parse_config_pairs(self.config?)
            .into_iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v)
    }

    /// Complete tokens before the one being completed
    pub fn args(&self) -> &'a [String] {
        self.args
    }
}

/// Per-manager completion provider registry
#[derive(Default)]
pub struct CommandCompletions {
    providers: DashMap<String, CompletionFn>,
}

impl CommandCompletions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under `id` (with or without the leading `@`)
    pub fn register_completion<F>(&self, id: &str, provider: F)
    where
        F: Fn(&CompletionContext<'_>) -> Vec<String> + Send + Sync + 'static,
    {
        let id = normalize_id(id);
        if self.providers.insert(id.clone(), Arc::new(provider)).is_some() {
            debug!("Replaced completion provider '@{}'", id);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(&normalize_id(id))
    }

    /// Suggestions from one completion string
    pub(crate) fn suggest(
        &self,
        source: &str,
        issuer: &dyn CommandIssuer,
        input: &str,
        args: &[String],
    ) -> Vec<String> {
        let source = source.trim();
        let Some(named) = source.strip_prefix('@') else {
            return source
                .split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        };

        let (id, config) = match named.split_once(':') {
            Some((id, config)) => (id, Some(config)),
            None => (named, None),
        };
        let provider = self
            .providers
            .get(&normalize_id(id))
            .map(|p| Arc::clone(p.value()));
        match provider {
            Some(provider) => provider(&CompletionContext::new(issuer, input, config, args)),
            None => {
                warn!("Unknown completion provider '@{}'", id);
                Vec::new()
            }
        }
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().trim_start_matches('@').to_ascii_lowercase()
}

/// Keep the suggestions starting with `input` (case-insensitive), without duplicates
pub(crate) fn filter_prefix(suggestions: Vec<String>, input: &str) -> Vec<String> {
    let input = input.to_lowercase();
    let mut out: Vec<String> = Vec::new();
    for suggestion in suggestions {
        if suggestion.to_lowercase().starts_with(&input) && !out.contains(&suggestion) {
            out.push(suggestion);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::testing::RecordingIssuer;

    #[test]
    fn test_literal_list() {
        let completions = CommandCompletions::new();
        let issuer = RecordingIssuer::console();
        assert_eq!(
            completions.suggest("red|green| blue", &*issuer, "", &[]),
            vec!["red", "green", "blue"]
        );
    }

    #[test]
    fn test_named_provider_with_config() {
        let completions = CommandCompletions::new();
        completions.register_completion("@range", |ctx| {
            let max: u32 = ctx
                .config_value("max")
                .and_then(|m| m.parse().ok())
                .unwrap_or(3);
            (1..=max).map(|n| n.to_string()).collect()
        });
        assert!(completions.contains("RANGE"));

        let issuer = RecordingIssuer::console();
        assert_eq!(
            completions.suggest("@range:max=2", &*issuer, "", &[]),
            vec!["1", "2"]
        );
        assert!(completions.suggest("@missing", &*issuer, "", &[]).is_empty());
    }

    #[test]
    fn test_filter_prefix() {
        let suggestions = vec!["Add".to_string(), "alpha".to_string(), "b".to_string(), "Add".to_string()];
        assert_eq!(filter_prefix(suggestions, "a"), vec!["Add", "alpha"]);
    }
}
