use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::addon::AddonDef;
use super::regime::Regime;
use crate::core::BillingError;

/// Read-only lookup of regimes by `(country, zone)` and addons by key.
///
/// Built once with [`RegistryBuilder`] and shared by reference; nothing
/// mutates it afterwards, so it can be read from any number of threads.
#[derive(Debug, Default)]
pub struct Registry {
    regimes: BTreeMap<(String, Option<String>), Regime>,
    addons: BTreeMap<String, AddonDef>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry with every bundled regime and addon enabled by features.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut builder = RegistryBuilder::new();
        #[cfg(feature = "regimes")]
        for regime in crate::regimes::all() {
            builder = builder.regime(regime);
        }
        #[cfg(feature = "en16931")]
        for addon in crate::addons::all() {
            builder = builder.addon(addon);
        }
        builder.build()
    }

    /// Process-wide registry with the bundled defaults, built on first use.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::with_defaults)
    }

    /// The regime for a country and zone, falling back to the country's
    /// regime without a zone.
    pub fn regime_for(&self, country: &str, zone: Option<&str>) -> Option<&Regime> {
        let country = country.to_string();
        if let Some(zone) = zone {
            if let Some(r) = self.regimes.get(&(country.clone(), Some(zone.to_string()))) {
                return Some(r);
            }
        }
        self.regimes.get(&(country, None))
    }

    pub fn addon(&self, key: &str) -> Option<&AddonDef> {
        self.addons.get(key)
    }

    /// Look up every key in order, failing on the first unknown one.
    pub fn addons_for(&self, keys: &[String]) -> Result<Vec<&AddonDef>, BillingError> {
        keys.iter()
            .map(|k| {
                self.addon(k)
                    .ok_or_else(|| BillingError::UnknownAddon(k.clone()))
            })
            .collect()
    }

    pub fn regimes(&self) -> impl Iterator<Item = &Regime> {
        self.regimes.values()
    }

    pub fn addons(&self) -> impl Iterator<Item = &AddonDef> {
        self.addons.values()
    }
}

/// Collects regimes and addons, then freezes them into a [`Registry`].
///
/// # Panics
///
/// Registering the same `(country, zone)` or addon key twice panics.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regime(mut self, regime: Regime) -> Self {
        let key = (regime.country.clone(), regime.zone.clone());
        if self.registry.regimes.contains_key(&key) {
            panic!(
                "regime already registered: {}{}",
                key.0,
                key.1.map(|z| format!("/{z}")).unwrap_or_default()
            );
        }
        self.registry.regimes.insert(key, regime);
        self
    }

    pub fn addon(mut self, addon: AddonDef) -> Self {
        if self.registry.addons.contains_key(&addon.key) {
            panic!("addon already registered: {}", addon.key);
        }
        self.registry.addons.insert(addon.key.clone(), addon);
        self
    }

    pub fn build(self) -> Registry {
        tracing::debug!(
            regimes = self.registry.regimes.len(),
            addons = self.registry.addons.len(),
            "registry built"
        );
        self.registry
    }
}
