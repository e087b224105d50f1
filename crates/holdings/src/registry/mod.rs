//! Provider registry: maps provider keys and aliases to shared adapter
//! instances.
//!
//! One instance per adapter type is constructed at registry build time and
//! shared across every resolution, so adapter-local caches (the iShares
//! product index) are effective for the registry's lifetime. The registry
//! is an explicit object constructed once at startup and passed by
//! reference into call sites, not a global.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::HoldingsError;
use crate::provider::ark::ArkProvider;
use crate::provider::firsttrust::FirstTrustProvider;
use crate::provider::globalx::GlobalXProvider;
use crate::provider::invesco::InvescoProvider;
use crate::provider::ishares::ISharesProvider;
use crate::provider::pacer::PacerProvider;
use crate::provider::ssga::SsgaProvider;
use crate::provider::vaneck::VanEckProvider;
use crate::provider::HoldingsProvider;

/// Issuer legal names and parent brands accepted as provider keys.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("ishares etfs", "ishares"),
    ("blackrock", "ishares"),
    ("state street", "ssga"),
    ("state street (spdr)", "ssga"),
    ("state street global advisors", "ssga"),
    ("spdr", "ssga"),
    ("van eck", "vaneck"),
    ("vaneck vectors", "vaneck"),
    ("ark invest", "ark"),
    ("ark investment management", "ark"),
    ("global x", "globalx"),
    ("global x etfs", "globalx"),
    ("first trust", "firsttrust"),
    ("ft portfolios", "firsttrust"),
    ("pacer etfs", "pacer"),
];

/// Externally loaded location maps for the adapters that need one.
/// `None` keeps an adapter's compiled-in defaults.
#[derive(Clone, Debug, Default)]
pub struct RegistryConfig {
    pub vaneck_slugs: Option<HashMap<String, String>>,
    pub ark_filenames: Option<HashMap<String, String>>,
}

/// Registry of issuer adapters, resolvable by canonical key or alias.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn HoldingsProvider>>,
    aliases: HashMap<String, String>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    /// Registry with all built-in providers and default aliases.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Registry with externally loaded ticker→location maps.
    pub fn with_config(config: RegistryConfig) -> Self {
        let vaneck = match config.vaneck_slugs {
            Some(slugs) => VanEckProvider::with_slug_map(slugs),
            None => VanEckProvider::new(),
        };
        let ark = match config.ark_filenames {
            Some(filenames) => ArkProvider::with_filename_map(filenames),
            None => ArkProvider::new(),
        };

        let providers: Vec<Arc<dyn HoldingsProvider>> = vec![
            Arc::new(ISharesProvider::new()),
            Arc::new(SsgaProvider::new()),
            Arc::new(InvescoProvider::new()),
            Arc::new(vaneck),
            Arc::new(FirstTrustProvider::new()),
            Arc::new(ark),
            Arc::new(GlobalXProvider::new()),
            Arc::new(PacerProvider::new()),
        ];

        let mut provider_map = HashMap::new();
        for provider in providers {
            provider_map.insert(normalize_key(provider.id()), provider);
        }

        let mut registry = Self {
            providers: provider_map,
            aliases: HashMap::new(),
        };
        for (alias, canonical) in DEFAULT_ALIASES {
            registry.add_alias(alias, canonical);
        }
        registry
    }

    /// Register an additional alias for a canonical provider key.
    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases
            .insert(normalize_key(alias), normalize_key(canonical));
    }

    /// Resolve a provider by canonical key or alias, after whitespace and
    /// case normalization.
    pub fn resolve(&self, key: &str) -> Result<Arc<dyn HoldingsProvider>, HoldingsError> {
        let normalized = normalize_key(key);
        let canonical = self
            .aliases
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized);
        self.providers
            .get(&canonical)
            .cloned()
            .ok_or_else(|| HoldingsError::UnknownProvider(key.trim().to_string()))
    }

    /// Canonical provider keys, sorted.
    pub fn provider_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.providers.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Lowercase, trim, and collapse internal whitespace.
fn normalize_key(key: &str) -> String {
    key.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_canonical_keys() {
        let registry = ProviderRegistry::new();
        for key in [
            "ishares",
            "ssga",
            "invesco",
            "vaneck",
            "firsttrust",
            "ark",
            "globalx",
            "pacer",
        ] {
            let provider = registry.resolve(key).unwrap();
            assert_eq!(normalize_key(provider.id()), key);
        }
    }

    #[test]
    fn test_resolve_normalizes_case_and_whitespace() {
        let registry = ProviderRegistry::new();
        assert_eq!(registry.resolve("  iShares  ").unwrap().id(), "ISHARES");
        assert_eq!(registry.resolve("SSGA").unwrap().id(), "SSGA");
        assert_eq!(
            registry.resolve("State   Street").unwrap().id(),
            "SSGA"
        );
    }

    #[test]
    fn test_alias_resolves_to_same_instance() {
        let registry = ProviderRegistry::new();
        let canonical = registry.resolve("ishares").unwrap();
        let aliased = registry.resolve("BlackRock").unwrap();
        // identical instance, so adapter-local caches are shared
        assert!(Arc::ptr_eq(&canonical, &aliased));
    }

    #[test]
    fn test_default_aliases() {
        let registry = ProviderRegistry::new();
        assert_eq!(registry.resolve("State Street (SPDR)").unwrap().id(), "SSGA");
        assert_eq!(
            registry.resolve("ARK Investment Management").unwrap().id(),
            "ARK"
        );
        assert_eq!(registry.resolve("Global X").unwrap().id(), "GLOBALX");
        assert_eq!(registry.resolve("First Trust").unwrap().id(), "FIRSTTRUST");
        assert_eq!(registry.resolve("Pacer ETFs").unwrap().id(), "PACER");
    }

    #[test]
    fn test_unknown_provider_is_typed_error() {
        let registry = ProviderRegistry::new();
        let err = registry.resolve("vanguard").err().unwrap();
        assert!(matches!(err, HoldingsError::UnknownProvider(ref key) if key == "vanguard"));
    }

    #[test]
    fn test_custom_alias() {
        let mut registry = ProviderRegistry::new();
        registry.add_alias("my broker's name for ssga", "ssga");
        assert_eq!(
            registry.resolve("My Broker's Name For SSGA").unwrap().id(),
            "SSGA"
        );
    }

    #[test]
    fn test_provider_keys_sorted() {
        let registry = ProviderRegistry::new();
        assert_eq!(
            registry.provider_keys(),
            vec![
                "ark",
                "firsttrust",
                "globalx",
                "invesco",
                "ishares",
                "pacer",
                "ssga",
                "vaneck"
            ]
        );
    }

    #[test]
    fn test_registry_config_overrides_location_maps() {
        let config = RegistryConfig {
            vaneck_slugs: Some(HashMap::from([(
                "XYZ".to_string(),
                "new-fund-etf-xyz".to_string(),
            )])),
            ark_filenames: None,
        };
        let registry = ProviderRegistry::with_config(config);
        // resolution still works; the override only changes the map
        assert_eq!(registry.resolve("vaneck").unwrap().id(), "VANECK");
    }
}
