//! Loading the domain list.
//!
//! Domains come either straight from the command line or from files in one of three
//! shapes:
//! - one domain per line
//! - two columns, `index,domain`
//! - CSV with a header row containing a `domain` column (an `index` column is
//!   optional, other columns are carried along as user info)

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use rand::seq::SliceRandom;

use crate::config::{InputRange, InputType};
use crate::error_handling::InputError;
use crate::models::DomainRecord;

/// `file` when every input names an existing file, `domain` otherwise.
pub fn deduce_input_type(inputs: &[String]) -> InputType {
    if !inputs.is_empty() && inputs.iter().all(|input| Path::new(input).is_file()) {
        InputType::File
    } else {
        InputType::Domain
    }
}

/// Records for domains given directly, indexed from 1 in argument order.
pub fn records_from_domains(domains: &[String]) -> Vec<DomainRecord> {
    domains
        .iter()
        .map(|domain| domain.trim())
        .filter(|domain| !domain.is_empty())
        .enumerate()
        .map(|(i, domain)| DomainRecord::new(i + 1, domain))
        .collect()
}

fn parse_index(field: &str, line: u64) -> Result<usize, InputError> {
    field.parse::<usize>().map_err(|_| InputError::InvalidIndex {
        line: line as usize,
        value: field.to_string(),
    })
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Parses the content of a domain list file.
///
/// `offset` is added to implicit (positional) indices so several files can be
/// concatenated; explicit indices are kept as written.
pub fn parse_domain_list(
    content: &str,
    source: &str,
    offset: usize,
) -> Result<Vec<DomainRecord>, InputError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let rows: Vec<StringRecord> = reader
        .records()
        .filter(|row| !matches!(row, Ok(r) if r.iter().all(str::is_empty)))
        .collect::<Result<_, _>>()?;

    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    if let Some(domain_col) = first.iter().position(|field| field == "domain") {
        let header: Vec<String> = first.iter().map(str::to_string).collect();
        let index_col = header.iter().position(|field| field == "index");
        let mut records = Vec::new();

        for (position, row) in rows[1..].iter().enumerate() {
            let domain = row.get(domain_col).unwrap_or_default();
            if domain.is_empty() {
                continue;
            }
            let index = match index_col.and_then(|col| row.get(col)) {
                Some(raw) => parse_index(raw, line_of(row))?,
                None => offset + position + 1,
            };
            let user_info = header
                .iter()
                .enumerate()
                .filter(|(col, _)| *col != domain_col && Some(*col) != index_col)
                .map(|(col, name)| (name.clone(), row.get(col).unwrap_or_default().to_string()))
                .collect();
            records.push(DomainRecord::new(index, domain).with_user_info(user_info));
        }
        return Ok(records);
    }

    match first.len() {
        1 => Ok(rows
            .iter()
            .enumerate()
            .filter_map(|(position, row)| {
                let domain = row.get(0).unwrap_or_default();
                (!domain.is_empty()).then(|| DomainRecord::new(offset + position + 1, domain))
            })
            .collect()),
        2 => {
            let mut records = Vec::new();
            for row in &rows {
                let domain = row.get(1).unwrap_or_default();
                if domain.is_empty() {
                    continue;
                }
                let index = parse_index(row.get(0).unwrap_or_default(), line_of(row))?;
                records.push(DomainRecord::new(index, domain));
            }
            Ok(records)
        }
        _ => Err(InputError::UnrecognizedStructure(source.to_string())),
    }
}

pub fn read_domain_file(path: &Path, offset: usize) -> Result<Vec<DomainRecord>, InputError> {
    let content = std::fs::read_to_string(path)?;
    let records = parse_domain_list(&content, &path.display().to_string(), offset)?;
    debug!("Read {} domains from {}", records.len(), path.display());
    Ok(records)
}

/// Keeps the entries selected by `range` (0-based, end-exclusive).
pub fn select_range(records: Vec<DomainRecord>, range: InputRange) -> Vec<DomainRecord> {
    let end = range.end.unwrap_or(usize::MAX);
    records
        .into_iter()
        .skip(range.start)
        .take(end.saturating_sub(range.start))
        .collect()
}

/// Loads, optionally shuffles, then slices the input list.
pub fn load_records(
    inputs: &[String],
    input_type: InputType,
    range: Option<InputRange>,
    random: bool,
) -> Result<Vec<DomainRecord>, InputError> {
    let mut records = match input_type {
        InputType::Domain => records_from_domains(inputs),
        InputType::File => {
            let mut records = Vec::new();
            for input in inputs {
                let offset = records.len();
                records.extend(read_domain_file(Path::new(input), offset)?);
            }
            records
        }
    };

    if random {
        records.shuffle(&mut rand::rng());
    }
    if let Some(range) = range {
        records = select_range(records, range);
    }

    info!("Loaded {} records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains(records: &[DomainRecord]) -> Vec<(usize, &str)> {
        records.iter().map(|r| (r.index, r.domain.as_str())).collect()
    }

    #[test]
    fn test_one_column() {
        let records = parse_domain_list("example.com\n\n  example.org \n", "list", 0).unwrap();
        assert_eq!(domains(&records), vec![(1, "example.com"), (2, "example.org")]);
    }

    #[test]
    fn test_two_columns() {
        let records = parse_domain_list("10,example.com\n20,example.org\n", "list", 0).unwrap();
        assert_eq!(domains(&records), vec![(10, "example.com"), (20, "example.org")]);
    }

    #[test]
    fn test_two_columns_bad_index() {
        let err = parse_domain_list("x,example.com\n", "list", 0).unwrap_err();
        assert!(matches!(err, InputError::InvalidIndex { line: 1, .. }));
    }

    #[test]
    fn test_header_with_user_info() {
        let content = "rank,domain,owner\n1,example.com,alice\n2,,bob\n3,example.org,carol\n";
        let records = parse_domain_list(content, "list.csv", 0).unwrap();
        assert_eq!(domains(&records), vec![(1, "example.com"), (3, "example.org")]);
        assert_eq!(
            records[0].user_info,
            vec![
                ("rank".to_string(), "1".to_string()),
                ("owner".to_string(), "alice".to_string())
            ]
        );
    }

    #[test]
    fn test_header_with_index_column() {
        let content = "domain,index\nexample.com,7\n";
        let records = parse_domain_list(content, "list.csv", 0).unwrap();
        assert_eq!(domains(&records), vec![(7, "example.com")]);
        assert!(records[0].user_info.is_empty());
    }

    #[test]
    fn test_unrecognized_structure() {
        let err = parse_domain_list("a,b,c\n", "list.csv", 0).unwrap_err();
        assert!(matches!(err, InputError::UnrecognizedStructure(_)));
    }

    #[test]
    fn test_offset_applies_to_implicit_indices() {
        let records = parse_domain_list("example.com\n", "list", 5).unwrap();
        assert_eq!(records[0].index, 6);
    }

    #[test]
    fn test_records_from_domains() {
        let records = records_from_domains(&["a.test".to_string(), " ".to_string(), "b.test".to_string()]);
        assert_eq!(domains(&records), vec![(1, "a.test"), (2, "b.test")]);
    }

    #[test]
    fn test_select_range() {
        let records = records_from_domains(
            &(1..=10).map(|i| format!("d{i}.test")).collect::<Vec<_>>(),
        );
        let picked = select_range(records.clone(), InputRange { start: 2, end: Some(4) });
        assert_eq!(domains(&picked), vec![(3, "d3.test"), (4, "d4.test")]);

        let all = select_range(records, InputRange { start: 8, end: None });
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_deduce_input_type() {
        assert_eq!(deduce_input_type(&["example.com".to_string()]), InputType::Domain);
        assert_eq!(deduce_input_type(&[]), InputType::Domain);
    }
}
