use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use thiserror::Error;
use tokio::fs::read_to_string;
use tracing::{debug, warn};

use crate::{
    format::{Delimiter, InputFormat, Layout},
    sample::{Configuration, Dataset, Sample},
};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Reading {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed delimited input")]
    Csv(#[from] csv::Error),
    #[error("Line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: {column} value {value:?} is not numeric")]
    NotNumeric {
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("Line {line}: {processes}p×{threads}t overflows the worker count")]
    Overflow {
        line: u64,
        processes: u32,
        threads: u32,
    },
    #[error("Header is missing column {0:?}")]
    MissingColumn(&'static str),
}

/// A non-blank line split into trimmed fields
#[derive(Debug)]
struct Row {
    line: u64,
    fields: Vec<String>,
}

/// Reads `path` to completion, then parses it
pub async fn load(path: &Path, format: &InputFormat) -> Result<Dataset, ParseError> {
    let text = read_to_string(path).await.map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {path:?}", text.len());
    parse(&text, format)
}

pub fn parse(text: &str, format: &InputFormat) -> Result<Dataset, ParseError> {
    let mut rows = split_rows(text, format.delimiter)?.into_iter();
    let header = if format.header { rows.next() } else { None };

    let dataset = match format.layout {
        Layout::Pair => rows.map(pair_sample).collect::<Result<Dataset, _>>()?,
        Layout::Hybrid => match header {
            Some(header) => {
                let columns = HybridColumns::from_header(&header.fields)?;
                rows.map(|row| columns.sample(row))
                    .collect::<Result<Dataset, _>>()?
            }
            None => rows
                .map(positional_hybrid_sample)
                .collect::<Result<Dataset, _>>()?,
        },
    };
    debug!("Parsed {} samples", dataset.len());
    Ok(dataset)
}

fn split_rows(text: &str, delimiter: Delimiter) -> Result<Vec<Row>, ParseError> {
    match delimiter {
        Delimiter::Whitespace => Ok(text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| Row {
                line: i as u64 + 1,
                fields: line.split_whitespace().map(str::to_owned).collect(),
            })
            .collect()),
        Delimiter::Comma => {
            let mut reader = ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .trim(Trim::All)
                .from_reader(text.as_bytes());
            let mut rows = Vec::new();
            for record in reader.records() {
                let record = record?;
                if record.iter().all(str::is_empty) {
                    continue;
                }
                rows.push(Row {
                    line: record.position().map(|p| p.line()).unwrap_or_default(),
                    fields: record.iter().map(str::to_owned).collect(),
                });
            }
            Ok(rows)
        }
    }
}

fn parse_count(line: u64, column: &'static str, value: &str) -> Result<u32, ParseError> {
    value.parse().map_err(|_| ParseError::NotNumeric {
        line,
        column,
        value: value.to_owned(),
    })
}

fn parse_duration(line: u64, column: &'static str, value: &str) -> Result<f64, ParseError> {
    match value.parse::<f64>() {
        Ok(secs) if secs.is_finite() => Ok(secs),
        _ => Err(ParseError::NotNumeric {
            line,
            column,
            value: value.to_owned(),
        }),
    }
}

fn pair_sample(row: Row) -> Result<Sample, ParseError> {
    if row.fields.len() != InputFormat::PAIR_FIELDS {
        return Err(ParseError::FieldCount {
            line: row.line,
            expected: InputFormat::PAIR_FIELDS,
            found: row.fields.len(),
        });
    }
    Ok(Sample::new(
        Configuration::Count(parse_count(row.line, "configuration", &row.fields[0])?),
        parse_duration(row.line, "duration", &row.fields[1])?,
    ))
}

/// `p t time` or `p t workers time`
fn positional_hybrid_sample(row: Row) -> Result<Sample, ParseError> {
    let (workers, time) = match row.fields.len() {
        3 => (None, 2),
        4 => (Some(2), 3),
        found => {
            return Err(ParseError::FieldCount {
                line: row.line,
                expected: 4,
                found,
            });
        }
    };
    hybrid_sample(&row, 0, 1, workers, time)
}

fn hybrid_sample(
    row: &Row,
    processes: usize,
    threads: usize,
    total_workers: Option<usize>,
    execution_time: usize,
) -> Result<Sample, ParseError> {
    let p = parse_count(row.line, "processes", &row.fields[processes])?;
    let t = parse_count(row.line, "threads", &row.fields[threads])?;
    let configuration = match total_workers {
        Some(idx) => {
            let total_workers = parse_count(row.line, "total_workers", &row.fields[idx])?;
            if p.checked_mul(t) != Some(total_workers) {
                warn!(
                    "Line {}: total_workers={total_workers} does not match {p}p×{t}t",
                    row.line
                );
            }
            Configuration::Hybrid {
                processes: p,
                threads: t,
                total_workers,
            }
        }
        None => Configuration::hybrid(p, t).ok_or(ParseError::Overflow {
            line: row.line,
            processes: p,
            threads: t,
        })?,
    };
    let duration = parse_duration(row.line, "execution_time", &row.fields[execution_time])?;
    Ok(Sample::new(configuration, duration))
}

/// Column positions of a labeled hybrid table
#[derive(Debug, Clone, Copy)]
struct HybridColumns {
    width: usize,
    processes: usize,
    threads: usize,
    total_workers: Option<usize>,
    execution_time: usize,
}

impl HybridColumns {
    fn from_header(header: &[String]) -> Result<Self, ParseError> {
        let find = |name: &'static str| {
            header
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name)
        };
        let require =
            |name: &'static str| find(name).ok_or(ParseError::MissingColumn(name));
        Ok(Self {
            width: header.len(),
            processes: require("processes")?,
            threads: require("threads")?,
            total_workers: find("total_workers"),
            execution_time: require("execution_time")?,
        })
    }

    fn sample(&self, row: Row) -> Result<Sample, ParseError> {
        if row.fields.len() != self.width {
            return Err(ParseError::FieldCount {
                line: row.line,
                expected: self.width,
                found: row.fields.len(),
            });
        }
        hybrid_sample(
            &row,
            self.processes,
            self.threads,
            self.total_workers,
            self.execution_time,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn counts(dataset: &Dataset) -> Vec<u32> {
        dataset
            .configurations()
            .iter()
            .map(Configuration::workers)
            .collect()
    }

    #[test]
    fn whitespace_pairs() {
        let dataset = parse("1 0.5\n2 0.25\n4 0.125\n", &InputFormat::whitespace_pair()).unwrap();
        assert_eq!(counts(&dataset), vec![1, 2, 4]);
        assert_eq!(dataset.durations(), vec![0.5, 0.25, 0.125]);
    }

    #[test]
    fn csv_pairs_skip_header() {
        let text = "processes,time\n1,2.000000\n2, 1.100000\n4,0.600000\n";
        let dataset = parse(text, &InputFormat::csv_pair()).unwrap();
        assert_eq!(counts(&dataset), vec![1, 2, 4]);
        assert_eq!(dataset.durations(), vec![2.0, 1.1, 0.6]);
    }

    #[test]
    fn header_only_is_empty() {
        let dataset = parse("threads,time\n", &InputFormat::csv_pair()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn blank_lines_are_not_samples() {
        let text = "\n1 0.5\n\n   \n2 0.25\n";
        let dataset = parse(text, &InputFormat::whitespace_pair()).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn count_matches_data_lines() {
        for n in [0usize, 1, 7, 64] {
            let mut text = String::from("threads,time\n");
            for i in 0..n {
                writeln!(text, "{},{}", i + 1, 1.0 / (i + 1) as f64).unwrap();
            }
            let dataset = parse(&text, &InputFormat::csv_pair()).unwrap();
            assert_eq!(dataset.len(), n);
        }
    }

    #[test]
    fn generated_rows_are_recovered_in_order() {
        let rows: Vec<(u32, f64)> = (0..32)
            .map(|i| ((i * 7 + 3) % 17, 0.001 * f64::from(i * i) + 0.25))
            .collect();
        let mut text = String::new();
        for (count, secs) in &rows {
            writeln!(text, "{count} {secs}").unwrap();
        }
        let dataset = parse(&text, &InputFormat::whitespace_pair()).unwrap();
        let recovered: Vec<(u32, f64)> = dataset
            .iter()
            .map(|s| (s.configuration.workers(), s.duration))
            .collect();
        assert_eq!(recovered, rows);
    }

    #[test]
    fn too_few_fields() {
        let err = parse("1 0.5\n2\n", &InputFormat::whitespace_pair()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldCount {
                line: 2,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn too_many_fields() {
        let err = parse("t,time\n1,0.5,9\n", &InputFormat::csv_pair()).unwrap_err();
        assert!(matches!(err, ParseError::FieldCount { found: 3, .. }));
    }

    #[test]
    fn non_numeric_duration() {
        let err = parse("1 fast\n", &InputFormat::whitespace_pair()).unwrap_err();
        match err {
            ParseError::NotNumeric {
                line,
                column,
                value,
            } => {
                assert_eq!(line, 1);
                assert_eq!(column, "duration");
                assert_eq!(value, "fast");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_finite_duration() {
        let err = parse("1 nan\n", &InputFormat::whitespace_pair()).unwrap_err();
        assert!(matches!(err, ParseError::NotNumeric { .. }));
    }

    #[test]
    fn non_numeric_configuration() {
        let err = parse("2.5 1.0\n", &InputFormat::whitespace_pair()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::NotNumeric {
                column: "configuration",
                ..
            }
        ));
    }

    #[test]
    fn header_is_data_without_flag() {
        let err = parse("threads,time\n1,0.5\n", &InputFormat {
            header: false,
            ..InputFormat::csv_pair()
        })
        .unwrap_err();
        assert!(matches!(err, ParseError::NotNumeric { line: 1, .. }));
    }

    #[test]
    fn hybrid_table_by_name() {
        let text = "\
execution_time,threads,processes,total_workers
0.9,2,1,2
0.5,1,4,4
";
        let dataset = parse(text, &InputFormat::hybrid_table()).unwrap();
        assert_eq!(
            dataset.configurations(),
            vec![
                Configuration::hybrid(1, 2).unwrap(),
                Configuration::hybrid(4, 1).unwrap()
            ]
        );
        assert_eq!(dataset.durations(), vec![0.9, 0.5]);
    }

    #[test]
    fn hybrid_table_derives_workers() {
        let text = "processes,threads,execution_time\n2,4,0.3\n";
        let dataset = parse(text, &InputFormat::hybrid_table()).unwrap();
        assert_eq!(dataset.samples()[0].configuration.workers(), 8);
    }

    #[test]
    fn hybrid_table_worker_overflow() {
        let text = "processes,threads,execution_time\n70000,70000,1.0\n";
        let err = parse(text, &InputFormat::hybrid_table()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Overflow {
                line: 2,
                processes: 70000,
                threads: 70000
            }
        ));
    }

    #[test]
    fn hybrid_table_explicit_total_skips_product() {
        let text = "processes,threads,total_workers,execution_time\n70000,70000,12,1.0\n";
        let dataset = parse(text, &InputFormat::hybrid_table()).unwrap();
        assert_eq!(dataset.samples()[0].configuration.workers(), 12);
    }

    #[test]
    fn hybrid_table_missing_column() {
        let err = parse("processes,total_workers,execution_time\n1,1,1.0\n", &InputFormat::hybrid_table())
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn("threads")));
    }

    #[test]
    fn hybrid_table_short_row() {
        let text = "processes,threads,total_workers,execution_time\n1,2,2\n";
        let err = parse(text, &InputFormat::hybrid_table()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldCount {
                line: 2,
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn hybrid_positional() {
        let format = InputFormat {
            delimiter: Delimiter::Whitespace,
            header: false,
            layout: Layout::Hybrid,
        };
        let dataset = parse("2 2 0.75\n4 1 4 0.5\n", &format).unwrap();
        assert_eq!(counts(&dataset), vec![4, 4]);
        assert_eq!(dataset.samples()[1].configuration.label(), "4p×1t");

        let err = parse("2 0.75\n", &format).unwrap_err();
        assert!(matches!(err, ParseError::FieldCount { found: 2, .. }));
    }
}
