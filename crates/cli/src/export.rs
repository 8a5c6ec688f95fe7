//! `pwatch export`: top offenders as CSV.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pricewatch_io::export::write_offender_export;

use crate::evaluate::evaluate;
use crate::CliError;

pub fn cmd_export(
    config_path: &Path,
    date: Option<NaiveDate>,
    out: Option<PathBuf>,
) -> Result<(), CliError> {
    let eval = evaluate(config_path, date)?;
    let labels = eval.labels();

    let rows = match out {
        Some(ref path) => {
            let file = File::create(path)
                .map_err(|e| CliError::io(format!("cannot create {}: {e}", path.display())))?;
            let rows = write_offender_export(BufWriter::new(file), &eval.report, &labels)
                .map_err(CliError::source)?;
            eprintln!("wrote {} rows to {}", rows, path.display());
            rows
        }
        None => {
            let stdout = io::stdout();
            write_offender_export(stdout.lock(), &eval.report, &labels)
                .map_err(CliError::source)?
        }
    };

    tracing::info!(rows, "offender export written");
    Ok(())
}
