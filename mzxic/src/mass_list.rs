//! Reading target mass lists, one value per line
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use tracing::debug;

use crate::error::XicError;

/// Read one floating point mass per line from `reader`.
///
/// Surrounding whitespace is ignored and blank lines are skipped. Any other
/// line that does not parse to a finite number aborts the whole read.
pub fn read_mass_list<R: BufRead>(reader: R) -> Result<Vec<f64>, XicError> {
    let mut masses = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let mass = text
            .parse::<f64>()
            .map_err(|source| XicError::MassListParseError {
                line: i + 1,
                text: text.to_string(),
                source,
            })?;
        if !mass.is_finite() {
            return Err(XicError::NonFiniteMass {
                line: i + 1,
                text: text.to_string(),
            });
        }
        masses.push(mass);
    }
    Ok(masses)
}

pub fn read_mass_list_path<P: AsRef<Path>>(path: P) -> Result<Vec<f64>, XicError> {
    let path = path.as_ref();
    let handle = io::BufReader::new(fs::File::open(path)?);
    let masses = read_mass_list(handle)?;
    debug!("Read {} masses from {}", masses.len(), path.display());
    Ok(masses)
}
