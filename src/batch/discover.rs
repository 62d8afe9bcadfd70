// src/batch/discover.rs
use crate::error::Result;
use chrono::NaiveDate;
use log::trace;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of event log files.
pub const EVENT_PREFIX: &str = "Event";
/// Prefix of trend log files.
pub const TREND_PREFIX: &str = "Trend";

const EXTENSION: &str = ".tdms";
const DATE_FORMAT: &str = "%Y%m%d";

/// A file named `<prefix><yyyymmdd>.tdms`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DatedFile {
    pub date: NaiveDate,
    pub path: PathBuf,
}

/// Date encoded in `file_name`, if it is `<prefix><8 digits>.tdms` and the
/// digits form a valid calendar date.
pub fn parse_dated_name(file_name: &str, prefix: &str) -> Option<NaiveDate> {
    let rest = file_name.strip_prefix(prefix)?;
    if rest.len() != 8 + EXTENSION.len() || !rest.is_char_boundary(8) {
        return None;
    }
    let (digits, extension) = rest.split_at(8);
    if !extension.eq_ignore_ascii_case(EXTENSION) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(digits, DATE_FORMAT).ok()
}

/// File name for the given prefix and day.
///
/// ```
/// use tdms_decoder::batch::file_name_for;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// assert_eq!(file_name_for("Event", day), "Event20240131.tdms");
/// ```
pub fn file_name_for(prefix: &str, date: NaiveDate) -> String {
    format!("{}{}{}", prefix, date.format(DATE_FORMAT), EXTENSION)
}

/// List the dated files with `prefix` in `dir`, oldest first.
pub fn discover(dir: impl AsRef<Path>, prefix: &str) -> Result<Vec<DatedFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(date) = name.to_str().and_then(|n| parse_dated_name(n, prefix)) else {
            continue;
        };
        trace!("found {:?} for {}", name, date);
        files.push(DatedFile { date, path: entry.path() });
    }
    files.sort();
    Ok(files)
}

/// First and last date of a discovered list.
pub fn date_span(files: &[DatedFile]) -> Option<(NaiveDate, NaiveDate)> {
    let first = files.iter().map(|f| f.date).min()?;
    let last = files.iter().map(|f| f.date).max()?;
    Some((first, last))
}

/// Files dated within `from..=to`.
pub fn select(files: &[DatedFile], from: NaiveDate, to: NaiveDate) -> Vec<DatedFile> {
    files
        .iter()
        .filter(|f| f.date >= from && f.date <= to)
        .cloned()
        .collect()
}

/// Paths grouped by day, for one output per day.
pub fn split_by_day(files: &[DatedFile]) -> BTreeMap<NaiveDate, Vec<PathBuf>> {
    let mut days: BTreeMap<NaiveDate, Vec<PathBuf>> = BTreeMap::new();
    for file in files {
        days.entry(file.date).or_default().push(file.path.clone());
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_dated_name() {
        assert_eq!(parse_dated_name("Event20240131.tdms", "Event"), Some(day(2024, 1, 31)));
        assert_eq!(parse_dated_name("Trend20231201.TDMS", "Trend"), Some(day(2023, 12, 1)));
        assert_eq!(parse_dated_name("Trend20240131.tdms", "Event"), None);
        assert_eq!(parse_dated_name("Event20241331.tdms", "Event"), None);
        assert_eq!(parse_dated_name("Event2024013.tdms", "Event"), None);
        assert_eq!(parse_dated_name("Event20240131.tdms_index", "Event"), None);
        assert_eq!(parse_dated_name("Event2024-131.tdms", "Event"), None);
    }

    #[test]
    fn test_select_and_split() {
        let files: Vec<DatedFile> = [(1, "a"), (2, "b"), (2, "c"), (5, "d")]
            .iter()
            .map(|&(d, name)| DatedFile { date: day(2024, 3, d), path: PathBuf::from(name) })
            .collect();

        assert_eq!(date_span(&files), Some((day(2024, 3, 1), day(2024, 3, 5))));
        assert_eq!(date_span(&[]), None);

        let picked = select(&files, day(2024, 3, 2), day(2024, 3, 5));
        assert_eq!(picked.len(), 3);
        assert_eq!(picked[0].path, PathBuf::from("b"));

        let days = split_by_day(&files);
        assert_eq!(days.len(), 3);
        assert_eq!(days[&day(2024, 3, 2)], vec![PathBuf::from("b"), PathBuf::from("c")]);
    }
}
