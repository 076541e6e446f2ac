//! Import outcome aggregation and rendering

use console::style;
use serde::Serialize;

/// Error lines kept for display; the failure count is never truncated
pub const MAX_REPORTED_ERRORS: usize = 10;

/// Result of submitting one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Success,
    Failure(String),
}

/// Final summary of one import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub success_count: usize,
    pub failed_count: usize,
    /// First [`MAX_REPORTED_ERRORS`] error lines, in row order
    pub errors: Vec<String>,
    /// Set when the run was stopped before every row was attempted
    pub cancelled: bool,
    /// Rows never attempted because of cancellation
    pub not_attempted: usize,
}

impl ImportReport {
    /// Collapse per-row outcomes, in input order
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a ImportOutcome>) -> Self {
        let mut report = ImportReport::default();
        for outcome in outcomes {
            report.record(outcome);
        }
        report
    }

    /// Report for a file that could not be parsed at all
    pub fn parse_failure(message: impl std::fmt::Display) -> Self {
        ImportReport {
            errors: vec![format!("CSV解析失败: {}", message)],
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, outcome: &ImportOutcome) {
        match outcome {
            ImportOutcome::Success => self.success_count += 1,
            ImportOutcome::Failure(message) => {
                self.failed_count += 1;
                if self.errors.len() < MAX_REPORTED_ERRORS {
                    self.errors.push(message.clone());
                }
            }
        }
    }

    pub(crate) fn mark_cancelled(&mut self, not_attempted: usize) {
        self.cancelled = true;
        self.not_attempted = not_attempted;
    }

    /// Rows that reached the API (or failed trying)
    pub fn attempted(&self) -> usize {
        self.success_count + self.failed_count
    }

    /// Failures whose message was not kept
    pub fn suppressed_errors(&self) -> usize {
        self.failed_count.saturating_sub(self.errors.len())
    }

    /// Whether the run ended with anything the user must look at
    pub fn has_failures(&self) -> bool {
        self.failed_count > 0 || (self.attempted() == 0 && !self.errors.is_empty())
    }

    /// Human-readable summary lines, without styling
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if self.success_count > 0 {
            lines.push(format!("成功导入 {} 条记录", self.success_count));
        }

        if self.failed_count > 0 {
            lines.push(format!("失败 {} 条记录", self.failed_count));
        }

        if self.failed_count > 0 || self.attempted() == 0 {
            for error in &self.errors {
                lines.push(format!("• {}", error));
            }
        }

        if self.suppressed_errors() > 0 {
            lines.push(format!("• ... 还有 {} 条错误", self.suppressed_errors()));
        }

        if self.cancelled {
            lines.push(format!("已取消，{} 条记录未导入", self.not_attempted));
        }

        lines
    }

    /// Print the summary to stdout
    pub fn print(&self) {
        if self.success_count > 0 {
            println!(
                "{} 成功导入 {} 条记录",
                style("✓").green(),
                style(self.success_count).green()
            );
        }

        if self.failed_count > 0 {
            println!(
                "{} 失败 {} 条记录",
                style("✗").red(),
                style(self.failed_count).red()
            );
        }

        if self.failed_count > 0 || self.attempted() == 0 {
            for error in &self.errors {
                println!("  • {}", error);
            }
        }

        if self.suppressed_errors() > 0 {
            println!(
                "  {}",
                style(format!("• ... 还有 {} 条错误", self.suppressed_errors())).dim()
            );
        }

        if self.cancelled {
            println!(
                "{} 已取消，{} 条记录未导入",
                style("!").yellow(),
                style(self.not_attempted).yellow()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failures(n: usize) -> Vec<ImportOutcome> {
        (1..=n)
            .map(|i| ImportOutcome::Failure(format!("第{}行: 导入失败", i)))
            .collect()
    }

    #[test]
    fn test_counts_and_order() {
        let outcomes = vec![
            ImportOutcome::Success,
            ImportOutcome::Failure("第2行: duplicate doi".into()),
            ImportOutcome::Success,
        ];
        let report = ImportReport::from_outcomes(&outcomes);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.errors, vec!["第2行: duplicate doi".to_string()]);
        assert_eq!(report.attempted(), 3);
    }

    #[test]
    fn test_error_list_capped_but_count_kept() {
        let report = ImportReport::from_outcomes(&failures(13));
        assert_eq!(report.failed_count, 13);
        assert_eq!(report.errors.len(), MAX_REPORTED_ERRORS);
        assert_eq!(report.errors[9], "第10行: 导入失败");
        assert_eq!(report.suppressed_errors(), 3);
    }

    #[test]
    fn test_error_invariant_holds_for_any_size() {
        for n in 0..25 {
            let report = ImportReport::from_outcomes(&failures(n));
            assert_eq!(report.errors.len(), n.min(MAX_REPORTED_ERRORS));
            assert_eq!(report.attempted(), n);
        }
    }

    #[test]
    fn test_parse_failure_report() {
        let report = ImportReport::parse_failure("no header row found");
        assert_eq!(report.success_count, 0);
        assert_eq!(report.failed_count, 0);
        assert_eq!(report.errors, vec!["CSV解析失败: no header row found".to_string()]);
        assert!(report.has_failures());
        assert_eq!(report.lines(), vec!["• CSV解析失败: no header row found".to_string()]);
    }

    #[test]
    fn test_lines_with_suppressed_errors() {
        let mut outcomes = vec![ImportOutcome::Success];
        outcomes.extend(failures(12));
        let lines = ImportReport::from_outcomes(&outcomes).lines();

        assert_eq!(lines[0], "成功导入 1 条记录");
        assert_eq!(lines[1], "失败 12 条记录");
        assert_eq!(lines[2], "• 第1行: 导入失败");
        assert_eq!(lines.last().unwrap(), "• ... 还有 2 条错误");
        assert_eq!(lines.len(), 2 + 10 + 1);
    }

    #[test]
    fn test_all_success_has_no_failure_banner() {
        let report = ImportReport::from_outcomes(&[ImportOutcome::Success, ImportOutcome::Success]);
        assert!(!report.has_failures());
        assert_eq!(report.lines(), vec!["成功导入 2 条记录".to_string()]);
    }

    #[test]
    fn test_serializes_for_json_output() {
        let report = ImportReport::from_outcomes(&[ImportOutcome::Success]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success_count"], 1);
        assert_eq!(json["failed_count"], 0);
        assert_eq!(json["cancelled"], false);
    }
}
