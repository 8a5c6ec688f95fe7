//! Outbound notice drafts for retailers with non-compliant listings.
//! Composition only; delivery is up to the caller.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::model::{round2, RetailerReport};

/// Signature block for notices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoticeSender {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoticeDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Compose a notice listing the retailer's top offenders.
///
/// Returns `None` when the retailer has nothing non-compliant to report.
pub fn draft_notice(
    retailer_label: &str,
    contact: &str,
    report: &RetailerReport,
    sender: &NoticeSender,
) -> Option<NoticeDraft> {
    if report.top_offenders.is_empty() {
        return None;
    }

    let mut body = String::new();
    let _ = writeln!(body, "Dear {retailer_label} Team,");
    body.push('\n');
    body.push_str(
        "A recent review found pricing on your platform that does not align with our MSRP.\n\
         The listings below deviate the most; please review them and adjust pricing to\n\
         comply with our MSRP guidelines.\n",
    );
    body.push('\n');

    for (rank, offender) in report.top_offenders.iter().enumerate() {
        let r = &offender.result;
        let observed = r
            .observed_price
            .map(|p| format!("${:.2}", round2(p)))
            .unwrap_or_else(|| "n/a".into());
        let deviation = r
            .deviation_percent
            .map(|d| format!("{:+.2}%", round2(d)))
            .unwrap_or_else(|| "n/a".into());
        let _ = writeln!(
            body,
            "  {}. {}: MSRP ${:.2}, listed at {} ({})",
            rank + 1,
            r.product_name,
            round2(r.reference_price),
            observed,
            deviation,
        );
    }

    body.push('\n');
    let _ = writeln!(
        body,
        "{} of {} tracked products are currently within guidelines (compliance rate {:.2}%).",
        report.compliant_count,
        report.total_products,
        round2(report.compliance_rate_percent),
    );
    body.push('\n');
    body.push_str("Thank you for your prompt attention to this matter.\n\n");
    body.push_str("Best regards,\n\n");
    let _ = writeln!(body, "{}", sender.name);
    if let Some(ref title) = sender.title {
        let _ = writeln!(body, "{title}");
    }
    if let Some(ref organization) = sender.organization {
        let _ = writeln!(body, "{organization}");
    }

    Some(NoticeDraft {
        to: contact.to_string(),
        subject: format!("MSRP Compliance Report for {retailer_label}"),
        body,
    })
}
