use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

use super::FileOutcome;

/// Outcome of one file as shown in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Decoded and fingerprinted
    Ok,
    /// Aborted; carries the failure category and message
    Failed {
        /// Category used for tallies
        category: &'static str,
        /// Human-readable error
        message: String,
    },
    /// Skipped after cancellation
    Cancelled,
}

impl FileStatus {
    /// Short label for tabular output
    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Ok => "ok",
            FileStatus::Failed { .. } => "failed",
            FileStatus::Cancelled => "cancelled",
        }
    }
}

/// One line of a [`BatchReport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Input path as displayed
    pub file: String,
    /// What happened to it
    pub status: FileStatus,
    /// Bands found (zero unless completed)
    pub bands: usize,
}

impl ReportEntry {
    /// Error message of a failed file
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            FileStatus::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Per-file summary of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// One entry per input, in input order
    pub entries: Vec<ReportEntry>,
}

impl BatchReport {
    /// Summarize outcomes in their given order.
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        let entries = outcomes
            .iter()
            .map(|outcome| {
                let file = outcome.path().display().to_string();
                match outcome {
                    FileOutcome::Completed { fingerprint, .. } => ReportEntry {
                        file,
                        status: FileStatus::Ok,
                        bands: fingerprint.len(),
                    },
                    FileOutcome::Failed { error, .. } => ReportEntry {
                        file,
                        status: FileStatus::Failed {
                            category: error.category(),
                            message: error.to_string(),
                        },
                        bands: 0,
                    },
                    FileOutcome::Cancelled { .. } => ReportEntry {
                        file,
                        status: FileStatus::Cancelled,
                        bands: 0,
                    },
                }
            })
            .collect();
        Self { entries }
    }

    /// Number of files processed successfully
    pub fn success_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == FileStatus::Ok)
            .count()
    }

    /// Number of files that failed
    pub fn failure_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, FileStatus::Failed { .. }))
            .count()
    }

    /// Number of files skipped after cancellation
    pub fn cancelled_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == FileStatus::Cancelled)
            .count()
    }

    /// Check if any file failed
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Total bands over all completed files
    pub fn total_bands(&self) -> usize {
        self.entries.iter().map(|e| e.bands).sum()
    }

    /// Failure counts keyed by category, in name order
    pub fn failures_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut tally = BTreeMap::new();
        for entry in &self.entries {
            if let FileStatus::Failed { category, .. } = entry.status {
                *tally.entry(category).or_insert(0) += 1;
            }
        }
        tally
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static SKIP: Emoji<'_, '_> = Emoji("-", "[SKIP]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let mut output = String::new();

            output.push_str(&format!("{}\n", style("Fingerprint Batch Report").bold().cyan()));
            output.push_str(&format!("{}\n\n", style("========================").cyan()));

            for entry in &self.entries {
                match &entry.status {
                    FileStatus::Ok => output.push_str(&format!(
                        "[{}] {} - {} bands\n",
                        OK,
                        style(&entry.file).green(),
                        entry.bands
                    )),
                    FileStatus::Failed { message, .. } => output.push_str(&format!(
                        "[{}] {} - {}: {}\n",
                        FAIL,
                        style(&entry.file).red(),
                        style("FAILED").red().bold(),
                        message
                    )),
                    FileStatus::Cancelled => output.push_str(&format!(
                        "[{}] {} - {}\n",
                        SKIP,
                        style(&entry.file).yellow(),
                        style("CANCELLED").yellow()
                    )),
                }
            }

            output.push('\n');
            output.push_str(&format!(
                "{}: {} succeeded, {} failed, {} cancelled, {} bands\n",
                style("Summary").bold(),
                style(self.success_count()).green(),
                style(self.failure_count()).red(),
                style(self.cancelled_count()).yellow(),
                self.total_bands()
            ));

            let tally = self.failures_by_kind();
            if !tally.is_empty() {
                output.push_str(&format!("{}:\n", style("Failures by kind").bold()));
                for (kind, count) in tally {
                    output.push_str(&format!("  {:<24} {}\n", kind, style(count).red()));
                }
            }

            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fingerprint Batch Report")?;
        writeln!(f, "========================")?;
        writeln!(f)?;

        for entry in &self.entries {
            match &entry.status {
                FileStatus::Ok => writeln!(f, "[✓] {} - {} bands", entry.file, entry.bands)?,
                FileStatus::Failed { message, .. } => {
                    writeln!(f, "[✗] {} - FAILED: {}", entry.file, message)?
                }
                FileStatus::Cancelled => writeln!(f, "[-] {} - CANCELLED", entry.file)?,
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} succeeded, {} failed, {} cancelled, {} bands",
            self.success_count(),
            self.failure_count(),
            self.cancelled_count(),
            self.total_bands()
        )?;

        let tally = self.failures_by_kind();
        if !tally.is_empty() {
            writeln!(f, "Failures by kind:")?;
            for (kind, count) in tally {
                writeln!(f, "  {:<24} {}", kind, count)?;
            }
        }

        Ok(())
    }
}
