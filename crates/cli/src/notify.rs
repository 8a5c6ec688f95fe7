//! `pwatch notify <retailer>`: draft a compliance notice. Nothing is sent.

use std::path::Path;

use chrono::NaiveDate;
use pricewatch_config::PriceWatchConfig;
use pricewatch_recon::{draft_notice, NoticeSender};

use crate::evaluate::evaluate;
use crate::CliError;

pub fn cmd_notify(
    config_path: &Path,
    retailer: &str,
    date: Option<NaiveDate>,
    json_output: bool,
) -> Result<(), CliError> {
    let eval = evaluate(config_path, date)?;

    let Some(retailer_config) = eval.config.retailers.get(retailer) else {
        let known: Vec<&str> = eval.config.retailers.keys().map(String::as_str).collect();
        return Err(CliError::usage(format!("unknown retailer '{retailer}'"))
            .with_hint(format!("configured retailers: {}", known.join(", "))));
    };

    let Some(contact) = retailer_config.contact.as_deref() else {
        return Err(CliError::usage(format!("retailer '{retailer}' has no contact address"))
            .with_hint(format!("set retailers.{retailer}.contact in {}", eval.config_path.display())));
    };

    let Some(report) = eval.report.get(retailer) else {
        return Err(CliError::io(format!("no report for retailer '{retailer}'")));
    };

    let label = eval.label(retailer);
    let Some(draft) = draft_notice(label, contact, report, &sender(&eval.config)) else {
        eprintln!("{label}: no non-compliant listings, nothing to send");
        return Ok(());
    };

    if json_output {
        let json_str = serde_json::to_string_pretty(&draft)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        println!("To: {}", draft.to);
        println!("Subject: {}", draft.subject);
        println!();
        print!("{}", draft.body);
    }

    Ok(())
}

/// Signature block from `[notice]`, or the config name when it is absent.
fn sender(config: &PriceWatchConfig) -> NoticeSender {
    match &config.notice {
        Some(notice) => NoticeSender {
            name: notice.sender_name.clone(),
            title: notice.sender_title.clone(),
            organization: notice.organization.clone(),
        },
        None => NoticeSender {
            name: config.name.clone(),
            ..NoticeSender::default()
        },
    }
}
