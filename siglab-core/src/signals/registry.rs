//! Rule registry and strategy resolution.
//!
//! A `StrategyConfig` names rules with per-rule weight and enable overrides;
//! `Strategy::resolve` binds it against the registry exactly once, so an
//! unknown rule name fails at registration time and never mid-scoring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rules::{Rule, BUILTIN_RULES};
use crate::error::AnalysisError;

pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Registry with every built-in rule.
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_RULES.to_vec(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RuleSetting {
    pub weight: f64,
    pub enabled: bool,
}

/// Declarative strategy: a name plus rule overrides. Serializable so
/// strategies can live in config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    pub rules: BTreeMap<String, RuleSetting>,
}

impl StrategyConfig {
    /// Every built-in rule at its default weight.
    pub fn all_builtins(name: impl Into<String>) -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|r| {
                (
                    r.name.to_string(),
                    RuleSetting {
                        weight: r.default_weight,
                        enabled: true,
                    },
                )
            })
            .collect();
        Self {
            name: name.into(),
            rules,
        }
    }
}

/// A strategy resolved against a registry: only enabled rules, with their
/// effective weights, in deterministic (name) order.
#[derive(Debug)]
pub struct Strategy {
    name: String,
    rules: Vec<(Rule, f64)>,
    total_weight: f64,
}

impl Strategy {
    pub fn resolve(config: &StrategyConfig, registry: &RuleRegistry) -> Result<Self, AnalysisError> {
        let mut rules = Vec::new();
        let mut total_weight = 0.0;
        for (name, setting) in &config.rules {
            let rule = registry
                .get(name)
                .ok_or_else(|| AnalysisError::UnknownRule(name.clone()))?;
            if setting.weight < 0.0 || !setting.weight.is_finite() {
                return Err(AnalysisError::invalid_config(format!(
                    "rule {name} has invalid weight {}",
                    setting.weight
                )));
            }
            if setting.enabled && setting.weight > 0.0 {
                rules.push((*rule, setting.weight));
                total_weight += setting.weight;
            }
        }
        Ok(Self {
            name: config.name.clone(),
            rules,
            total_weight,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rules(&self) -> &[(Rule, f64)] {
        &self.rules
    }

    pub(crate) fn total_weight(&self) -> f64 {
        self.total_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_all_builtins() {
        let config = StrategyConfig::all_builtins("default");
        let strategy = Strategy::resolve(&config, &RuleRegistry::builtin()).unwrap();
        assert_eq!(strategy.rules().len(), BUILTIN_RULES.len());
        assert!(strategy.total_weight() > 0.0);
    }

    #[test]
    fn unknown_rule_fails_at_registration() {
        let mut config = StrategyConfig::all_builtins("broken");
        config.rules.insert(
            "definitely_not_a_rule".into(),
            RuleSetting {
                weight: 1.0,
                enabled: true,
            },
        );
        let err = Strategy::resolve(&config, &RuleRegistry::builtin()).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownRule(name) if name == "definitely_not_a_rule"));
    }

    #[test]
    fn disabled_rules_carry_no_weight() {
        let mut config = StrategyConfig::all_builtins("thin");
        for setting in config.rules.values_mut() {
            setting.enabled = false;
        }
        config
            .rules
            .get_mut("macd_bullish_cross")
            .unwrap()
            .enabled = true;
        let strategy = Strategy::resolve(&config, &RuleRegistry::builtin()).unwrap();
        assert_eq!(strategy.rules().len(), 1);
        assert_eq!(strategy.total_weight(), 2.5);
    }

    #[test]
    fn negative_weight_rejected() {
        let mut config = StrategyConfig::all_builtins("bad");
        config.rules.get_mut("stoch_oversold").unwrap().weight = -1.0;
        assert!(matches!(
            Strategy::resolve(&config, &RuleRegistry::builtin()),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn strategy_config_json_roundtrip() {
        let config = StrategyConfig::all_builtins("roundtrip");
        let json = serde_json::to_string(&config).unwrap();
        let back: StrategyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, config.name);
        assert_eq!(back.rules.len(), config.rules.len());
    }
}
