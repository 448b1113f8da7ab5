use std::fmt;
use std::io;
use std::path::Path;

use rand::Rng;

/// Parses a comma-separated list of integers, e.g. `"10, 20,30"`.
/// Empty entries are skipped; anything else that fails to parse is an error.
pub fn parse_values(input: &str) -> Result<Vec<i64>> {
    let mut values = Vec::new();
    for entry in input.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let value = entry
            .parse()
            .map_err(|_| Error::InvalidNumber(entry.to_string()))?;
        values.push(value);
    }
    Ok(values)
}

/// Extracts values from CSV text: per row, everything but digits and commas
/// is stripped, the first column is parsed and rows that still fail to parse
/// are skipped.
pub fn parse_csv(input: &str) -> Vec<i64> {
    let mut values = Vec::new();
    for row in input.lines() {
        let row: String = row
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == ',')
            .collect();
        let first = row.split(',').next().unwrap_or("");
        if let Ok(value) = first.parse() {
            values.push(value);
        }
    }
    values
}

/// Reads a CSV file and extracts its values via [`parse_csv`].
pub fn import_csv(path: impl AsRef<Path>) -> Result<Vec<i64>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_csv(&text))
}

/// Draws `count` uniform values from the half-open interval `(min, max]`.
/// Duplicates are possible; callers are expected to tolerate the resulting
/// duplicate-insert failures.
pub fn random_values(min: i64, max: i64, count: usize) -> Result<Vec<i64>> {
    if min >= max {
        return Err(Error::InvalidRange { min, max });
    }

    let mut rng = rand::thread_rng();
    Ok((0..count).map(|_| rng.gen_range(min + 1..=max)).collect())
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// An entry that should have been an integer.
    InvalidNumber(String),
    /// A random range with no values in it.
    InvalidRange { min: i64, max: i64 },
    Io(io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidNumber(entry) => write!(f, "\"{entry}\" is not an integer"),
            Error::InvalidRange { min, max } => {
                write!(f, "range ({min}, {max}] holds no values")
            }
            Error::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parse_value_list() {
        assert_eq!(parse_values("10, 20,30").unwrap(), [10, 20, 30]);
    }

    #[test]
    fn parse_skips_empty_entries() {
        assert_eq!(parse_values("10,,20,").unwrap(), [10, 20]);
        assert!(parse_values("").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_garbage() {
        let result = parse_values("10,x,20");
        assert!(matches!(result, Err(Error::InvalidNumber(entry)) if entry == "x"));
    }

    #[test]
    fn csv_takes_first_column() {
        let values = parse_csv("10,foo,bar\n20,baz\n30\n");
        assert_eq!(values, [10, 20, 30]);
    }

    #[test]
    fn csv_skips_unparsable_rows() {
        let values = parse_csv("10\nnot a number\n\n20\n");
        assert_eq!(values, [10, 20]);
    }

    #[test]
    fn csv_strips_stray_characters() {
        let values = parse_csv("\"10\";x\n 2 5,rest\n");
        assert_eq!(values, [10, 25]);
    }

    #[test]
    fn import_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "10,a\n20,b\n30\n").unwrap();

        let values = import_csv(file.path()).unwrap();
        assert_eq!(values, [10, 20, 30]);
    }

    #[test]
    fn import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = import_csv(dir.path().join("absent.csv"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn random_within_range() {
        let values = random_values(0, 100, 50).unwrap();
        assert_eq!(values.len(), 50);
        assert!(values.iter().all(|&value| value > 0 && value <= 100));
    }

    #[test]
    fn random_empty_range() {
        assert!(matches!(
            random_values(10, 10, 5),
            Err(Error::InvalidRange { min: 10, max: 10 })
        ));
    }
}
