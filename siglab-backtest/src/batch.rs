//! Parallel batch runner.
//!
//! Runs are independent: each job resolves its own strategy and replays its
//! own series, so rayon can fan them out with no shared mutable state.
//! Result order matches job order.

use rayon::prelude::*;

use siglab_core::error::AnalysisError;
use siglab_core::signals::{RuleRegistry, Strategy, StrategyConfig};
use siglab_core::Bar;

use crate::engine::{BacktestConfig, BacktestEngine};
use crate::trade::BacktestResult;

pub struct BacktestJob {
    pub bars: Vec<Bar>,
    pub strategy: StrategyConfig,
}

pub fn run_batch(
    jobs: &[BacktestJob],
    config: &BacktestConfig,
) -> Vec<Result<BacktestResult, AnalysisError>> {
    jobs.par_iter()
        .map(|job| {
            let strategy = Strategy::resolve(&job.strategy, &RuleRegistry::builtin())?;
            BacktestEngine::run(&job.bars, &strategy, config)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open = if i == 0 { close } else { closes[i - 1] };
                Bar {
                    timestamp: start + Duration::days(i as i64),
                    open,
                    high: open.max(close) + 1.0,
                    low: open.min(close) - 1.0,
                    close,
                    volume: 1000.0,
                }
            })
            .collect()
    }

    #[test]
    fn batch_results_align_with_jobs() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 * 0.4).sin() * 5.0)
            .collect();
        let good = BacktestJob {
            bars: bars(&closes),
            strategy: StrategyConfig::all_builtins("good"),
        };
        let short = BacktestJob {
            bars: bars(&closes[..10]),
            strategy: StrategyConfig::all_builtins("short"),
        };
        let mut unknown = BacktestJob {
            bars: bars(&closes),
            strategy: StrategyConfig::all_builtins("unknown"),
        };
        unknown.strategy.rules.insert(
            "no_such_rule".into(),
            siglab_core::signals::RuleSetting {
                weight: 1.0,
                enabled: true,
            },
        );

        let results = run_batch(&[good, short, unknown], &BacktestConfig::default());
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(AnalysisError::InsufficientData { .. })
        ));
        assert!(matches!(results[2], Err(AnalysisError::UnknownRule(_))));
    }

    #[test]
    fn batch_matches_sequential_runs() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 4.0 + i as f64 * 0.05)
            .collect();
        let config = BacktestConfig::default();
        let job = BacktestJob {
            bars: bars(&closes),
            strategy: StrategyConfig::all_builtins("solo"),
        };
        let strategy =
            Strategy::resolve(&job.strategy, &RuleRegistry::builtin()).unwrap();
        let sequential = BacktestEngine::run(&job.bars, &strategy, &config).unwrap();
        let batch = run_batch(&[job], &config).remove(0).unwrap();
        assert_eq!(batch.total_trades, sequential.total_trades);
        assert_eq!(batch.final_equity, sequential.final_equity);
    }
}
