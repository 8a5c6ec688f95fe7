//! `pwatch report`: evaluate every retailer and print the result.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pricewatch_io::SourceStatus;
use pricewatch_recon::{round2, ComplianceReport, NetworkSummary};
use serde::Serialize;

use crate::evaluate::{evaluate, Evaluation, RunMeta};
use crate::exit_codes::EXIT_REPORT_NONCOMPLIANT;
use crate::CliError;

#[derive(Serialize)]
struct ReportEnvelope<'a> {
    meta: RunMeta<'a>,
    network: NetworkSummary,
    report: &'a ComplianceReport,
}

pub fn cmd_report(
    config_path: &Path,
    date: Option<NaiveDate>,
    json_output: bool,
    output_file: Option<PathBuf>,
    strict: bool,
) -> Result<(), CliError> {
    let eval = evaluate(config_path, date)?;
    let summary = eval.report.network_summary();

    if json_output || output_file.is_some() {
        let envelope = ReportEnvelope {
            meta: eval.meta(),
            network: summary,
            report: &eval.report,
        };
        let json_str = serde_json::to_string_pretty(&envelope)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = output_file {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }

        if json_output {
            println!("{json_str}");
        }
    }

    // Human summary to stderr
    let stderr = io::stderr();
    render_summary(&eval, &summary, &mut stderr.lock())
        .map_err(|e| CliError::io(e.to_string()))?;

    if strict && summary.total_non_compliant > 0 {
        return Err(CliError {
            code: EXIT_REPORT_NONCOMPLIANT,
            message: format!(
                "{} non-compliant listing{} at {} retailer{}",
                summary.total_non_compliant,
                plural(summary.total_non_compliant),
                summary.offending_retailers,
                plural(summary.offending_retailers),
            ),
            hint: None,
        });
    }

    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn snapshot_note(status: Option<&SourceStatus>) -> String {
    match status.and_then(|s| s.snapshot.as_ref()) {
        None => "no snapshot".to_string(),
        Some(snapshot) if snapshot.stale => format!("snapshot {}, stale", snapshot.date),
        Some(snapshot) => format!("snapshot {}", snapshot.date),
    }
}

fn render_summary(
    eval: &Evaluation,
    summary: &NetworkSummary,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(
        out,
        "{} as of {} ({})",
        eval.config.name,
        eval.as_of,
        snapshot_note(Some(&eval.loaded.reference)),
    )?;
    writeln!(
        out,
        "{} retailers, {} deviated listings, {} non-compliant at {} retailer{}",
        summary.retailer_count,
        summary.total_deviated,
        summary.total_non_compliant,
        summary.offending_retailers,
        plural(summary.offending_retailers),
    )?;

    for (key, retailer) in eval.report.iter() {
        let counts = retailer.status_counts();
        writeln!(out)?;
        writeln!(
            out,
            "{} ({})",
            eval.label(key),
            snapshot_note(eval.loaded.retailers.get(key)),
        )?;
        writeln!(
            out,
            "  compliance rate {:.2}%, average deviation {:.2}%",
            round2(retailer.compliance_rate_percent),
            round2(retailer.average_absolute_deviation_percent),
        )?;
        writeln!(
            out,
            "  {} compliant, {} needs attention, {} non-compliant, {} undetermined",
            counts.compliant, counts.needs_attention, counts.non_compliant, counts.undetermined,
        )?;

        if retailer.top_offenders.is_empty() {
            continue;
        }
        writeln!(out, "  top offenders:")?;
        for offender in &retailer.top_offenders {
            let r = &offender.result;
            writeln!(
                out,
                "    #{:<3} {:<40} MSRP {:>10.2}  listed {:>10.2}  {:>+8.2}%",
                offender.position,
                r.product_name,
                round2(r.reference_price),
                round2(r.observed_price.unwrap_or_default()),
                round2(r.deviation_percent.unwrap_or_default()),
            )?;
        }
    }

    Ok(())
}
