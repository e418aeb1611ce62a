//! pgBackRest info rendering, laid out like `pgbackrest info`.

use std::fmt::Write as _;

use chrono::DateTime;
use colored::Colorize;

use crate::client::types::{PgBackRestBackup, ShowBackrestDetail};

const SIZE_UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Scale a byte count down by 1024 until it is below 1024 or the largest
/// unit is reached.
pub fn size_and_unit(bytes: i64) -> (f64, &'static str) {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    (size, SIZE_UNITS[unit])
}

/// `12.3MiB` style size.
pub fn format_size(bytes: i64) -> String {
    let (size, unit) = size_and_unit(bytes);
    format!("{:.1}{}", size, unit)
}

/// Unix seconds as a UTC date-time; out-of-range values print raw.
pub fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn render_backrest(details: &[ShowBackrestDetail]) -> String {
    let mut out = String::new();
    if details.is_empty() {
        let _ = writeln!(out, "No pgBackRest found.");
        return out;
    }

    for detail in details {
        let _ = writeln!(out, "{} {}", "cluster:".bold(), detail.name);
        let _ = writeln!(out, "storage type: {}", detail.storage_type);
        let _ = writeln!(out);

        for stanza in &detail.info {
            let status = if stanza.status.code == 0 {
                stanza.status.message.green().to_string()
            } else {
                stanza.status.message.red().to_string()
            };
            let _ = writeln!(out, "stanza: {}", stanza.name);
            let _ = writeln!(out, "    status: {}", status);
            let _ = writeln!(out, "    cipher: {}", stanza.cipher);
            let _ = writeln!(out);

            for archive in &stanza.archives {
                let _ = writeln!(out, "    {} (current)", stanza.name);
                let _ = writeln!(
                    out,
                    "        wal archive min/max ({}): {}/{}",
                    archive.id, archive.min, archive.max
                );
                let _ = writeln!(out);

                for backup in &stanza.backups {
                    render_backup(&mut out, backup);
                }
            }
        }
    }

    out
}

fn render_backup(out: &mut String, backup: &PgBackRestBackup) {
    let _ = writeln!(out, "        {} backup: {}", backup.backup_type, backup.label);
    let _ = writeln!(
        out,
        "            timestamp start/stop: {} / {}",
        format_timestamp(backup.timestamp.start),
        format_timestamp(backup.timestamp.stop)
    );
    let _ = writeln!(
        out,
        "            wal start/stop: {} / {}",
        backup.archive.start, backup.archive.stop
    );
    let _ = writeln!(
        out,
        "            database size: {}, backup size: {}",
        format_size(backup.info.size),
        format_size(backup.info.delta)
    );
    let _ = writeln!(
        out,
        "            repository size: {}, repository backup size: {}",
        format_size(backup.info.repository.size),
        format_size(backup.info.repository.delta)
    );
    let _ = writeln!(
        out,
        "            backup reference list: {}",
        backup.reference.join(", ")
    );
    let _ = writeln!(out);
}
