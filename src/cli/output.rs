//! Output formatting for build reports
//!
//! Reports are rendered either as JSON for pipeline consumption or as
//! human-readable text on stdout. Logs always go to stderr.

use anyhow::{Context, Result};

use crate::artifact::Artifact;
use crate::layers::LayerFlags;
use crate::runner::BuildReport;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &BuildReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize build report to JSON"),
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_artifact(&self, artifact: &Artifact) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(artifact)
                .context("Failed to serialize artifact to JSON"),
            OutputFormat::Human => Ok(self.format_artifact_human(artifact)),
        }
    }

    fn format_report_human(&self, report: &BuildReport) -> String {
        let mut output = String::new();

        output.push_str("\u{2713} Application Layer Contributed\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Build System:  {}\n", report.build_system));
        output.push_str(&format!(
            "Application:   {}\n",
            report.application_root.display()
        ));
        output.push_str(&format!("Arguments:     {}\n\n", report.arguments.join(" ")));

        output.push_str("Artifact:\n");
        output.push_str(&format!(
            "\u{251C}\u{2500} Path:    {}\n",
            report.artifact.path.display()
        ));
        output.push_str(&format!(
            "\u{2514}\u{2500} Kind:    {}\n\n",
            report.artifact.kind
        ));

        output.push_str("Layer:\n");
        output.push_str(&format!(
            "\u{251C}\u{2500} Path:    {}\n",
            report.layer.display()
        ));
        output.push_str(&format!(
            "\u{251C}\u{2500} Flags:   {}\n",
            describe_flags(&report.flags)
        ));
        output.push_str(&format!(
            "\u{2514}\u{2500} Reused:  {}\n",
            if report.reused { "yes" } else { "no" }
        ));

        if let Some(cache) = &report.cache_layer {
            output.push_str(&format!("\nDependency Cache: {}\n", cache.display()));
        }

        output
    }

    fn format_artifact_human(&self, artifact: &Artifact) -> String {
        let mut output = String::new();
        output.push_str(&format!("Artifact: {}\n", artifact.path.display()));
        output.push_str(&format!("Kind:     {}\n", artifact.kind));
        if let Some(module) = &artifact.module {
            output.push_str(&format!("Module:   {}\n", module));
        }
        output
    }
}

fn describe_flags(flags: &LayerFlags) -> String {
    let set: Vec<&str> = [
        ("build", flags.build),
        ("cache", flags.cache),
        ("launch", flags.launch),
    ]
    .iter()
    .filter(|(_, on)| *on)
    .map(|(name, _)| *name)
    .collect();

    if set.is_empty() {
        "(none)".to_string()
    } else {
        set.join(", ")
    }
}
