//! Weighted rule evaluation producing actionable trade signals.

mod engine;
mod registry;
mod rules;

pub use engine::{SignalConfig, SignalEngine};
pub use registry::{RuleRegistry, RuleSetting, Strategy, StrategyConfig};
pub use rules::{Polarity, Rule, RuleContext};
