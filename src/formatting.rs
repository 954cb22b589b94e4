//! Human-readable output for plans and evaluation reports.

use core::fmt;

use crate::evaluation::EvaluationReport;
use crate::planning::{BoundaryPlan, Look};

impl fmt::Display for Look {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "look {:>2}  t={:.3}  n={:>10}  futility={:>8.3}  efficacy={:>8.3}",
            self.look_index,
            self.information_fraction,
            self.planned_samples,
            self.futility_boundary,
            self.efficacy_boundary
        )
    }
}

impl fmt::Display for BoundaryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Required samples per arm: {} (fixed horizon {}, inflation {:.3})",
            self.max_samples_per_arm, self.fixed_horizon_samples, self.inflation_factor
        )?;
        writeln!(
            f,
            "Terminal critical value: {:.4}",
            self.terminal_critical_value
        )?;
        for look in &self.looks {
            writeln!(f, "  {}", look)?;
        }
        Ok(())
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at look {} (n={}, t={:.3}",
            self.decision, self.look_index, self.cumulative_samples, self.information_fraction
        )?;
        match self.statistic {
            Some(z) => write!(
                f,
                ", z={:.3} in [{:.3}, {:.3}]",
                z, self.futility_boundary, self.efficacy_boundary
            )?,
            None => write!(f, ", no samples")?,
        }
        if let Some(p) = self.crossing_probability {
            write!(f, ", crossing p={:.2e}", p)?;
        }
        if self.truncated_samples > 0 {
            write!(
                f,
                ", {} samples past the horizon ignored",
                self.truncated_samples
            )?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::evaluation::Batch;
    use crate::sequential::SequentialTest;

    #[test]
    fn test_plan_lists_every_look() {
        let test = SequentialTest::new(&Config::binary(0.1, 0.05).planned_looks(3)).unwrap();
        let text = test.plan().to_string();
        assert!(text.starts_with("Required samples per arm:"));
        assert_eq!(
            text.lines()
                .filter(|l| l.trim_start().starts_with("look"))
                .count(),
            3
        );
    }

    #[test]
    fn test_report_mentions_decision_and_truncation() {
        let mut test = SequentialTest::new(&Config::binary(0.6, 0.5)).unwrap();
        test.evaluate_batch(Batch::first(10.0, 10)).unwrap();
        let report = test.evaluate_batch(Batch::new(10.0, 30.0, 10, 40)).unwrap();
        let text = report.to_string();
        assert!(text.starts_with("superiority (1) at look"));
        assert!(text.contains("16 samples past the horizon ignored"));
    }

    #[test]
    fn test_empty_report() {
        let mut test = SequentialTest::new(&Config::binary(0.6, 0.5)).unwrap();
        let report = test.evaluate_batch(Batch::first(0.0, 0)).unwrap();
        assert!(report.to_string().contains("no samples"));
    }
}
