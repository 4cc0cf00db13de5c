//! Work items and the input record file.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};

/// Digits with an optional leading `+`, 7 to 20 characters.
static PHONE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    let pattern = Regex::new(r"^\+?\d{7,20}$").unwrap();
    pattern
});

/// One registration attempt: a phone number bound to an execution unit.
///
/// Immutable for the lifetime of the attempt. The `port` and `iccid`
/// fields are opaque here; they are carried through unchanged into the
/// classification record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Number to register, country code included.
    pub phone_number: String,
    /// Serial of the device the attempt runs on.
    pub unit_id: String,
    /// Modem port the number was detected on.
    pub port: String,
    /// ICCID of the SIM, when known.
    pub iccid: String,
}

impl WorkItem {
    /// Splits the number into its country-code prefix and national part.
    ///
    /// The split is fixed-width: the first two characters are taken as
    /// the country code.
    // TODO: country codes are 1-3 digits; split against an ITU prefix
    // table instead of assuming two.
    #[must_use]
    pub fn split_number(&self) -> (&str, &str) {
        let cut = self.phone_number.len().min(2);
        self.phone_number.split_at(cut)
    }
}

/// True when the string looks like a dialable phone number.
#[must_use]
pub fn is_valid_phone_number(number: &str) -> bool {
    PHONE_NUMBER.is_match(number)
}

/// Parses the record file into work items.
///
/// The first line is a header; columns are resolved by name, so column
/// order and extra columns do not matter. Rows without a usable phone
/// number (placeholders from the detection phase included) are dropped
/// with a warning.
///
/// # Errors
///
/// Returns [`Error::Record`] if the header is missing a required column.
pub fn parse_records(text: &str) -> Result<Vec<WorkItem>> {
    let mut lines = text.lines();
    let header: Vec<&str> = lines
        .next()
        .ok_or_else(|| Error::Record("record file is empty".into()))?
        .split(',')
        .map(str::trim)
        .collect();

    let column = |name: &str| -> Result<usize> {
        header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| Error::Record(format!("missing column: {name}")))
    };

    let phone_col = column("phone_number")?;
    let unit_col = column("device_serial")?;
    let iccid_col = column("sim_number_icc_id")?;
    let port_col = column("modem_port")?;

    let mut items = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != header.len() {
            warn!(line, "skipping record with mismatched column count");
            continue;
        }
        let phone_number = fields[phone_col];
        if !is_valid_phone_number(phone_number) {
            warn!(entry = phone_number, "skipping record without a usable phone number");
            continue;
        }
        items.push(WorkItem {
            phone_number: phone_number.to_string(),
            unit_id: fields[unit_col].to_string(),
            port: fields[port_col].to_string(),
            iccid: fields[iccid_col].to_string(),
        });
    }

    Ok(items)
}
