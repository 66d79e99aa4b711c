//! Addressing entities from the command line.

use anyhow::{Result, anyhow, bail};
use dds_core::{DdsFile, DdsNode};
use std::fmt;
use std::str::FromStr;

/// What a subcommand operates on.
///
/// Written as a 1-based line number (`15`), a record name (`DETAIL`), a field inside a record
/// (`DETAIL.CUSTNO`) or `*` for the file-level keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The entity covering a 1-based source line.
    Line(usize),
    /// A record format by name.
    Record(String),
    /// A field by record and field name.
    Field {
        /// Record format name.
        record: String,
        /// Field name.
        field: String,
    },
    /// The lines before the first record.
    File,
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "*" {
            return Ok(Self::File);
        }
        if s.chars().all(|c| c.is_ascii_digit()) && !s.is_empty() {
            return match s.parse::<usize>() {
                Ok(0) | Err(_) => Err(format!("line numbers start at 1, got '{s}'")),
                Ok(line) => Ok(Self::Line(line)),
            };
        }
        match s.split_once('.') {
            Some((record, field)) if !record.is_empty() && !field.is_empty() => Ok(Self::Field {
                record: record.to_ascii_uppercase(),
                field: field.to_ascii_uppercase(),
            }),
            Some(_) => Err(format!("expected RECORD.FIELD, got '{s}'")),
            None if s.is_empty() => Err("empty target".to_string()),
            None => Ok(Self::Record(s.to_ascii_uppercase())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(line) => write!(f, "line {line}"),
            Self::Record(record) => f.write_str(record),
            Self::Field { record, field } => write!(f, "{record}.{field}"),
            Self::File => f.write_str("*"),
        }
    }
}

impl Target {
    /// Find the entity this target names in `file`.
    pub fn resolve<'a>(&self, file: &'a DdsFile) -> Result<DdsNode<'a>> {
        match self {
            Self::Line(line) => {
                if *line > file.line_count {
                    bail!("line {line} is past the end of the file ({} lines)", file.line_count);
                }
                Ok(file.node_at_line(line - 1))
            }
            Self::Record(name) => file
                .record(name)
                .map(DdsNode::Record)
                .ok_or_else(|| anyhow!("no record format named {name}")),
            Self::Field { record, field } => {
                let owner = file
                    .record(record)
                    .ok_or_else(|| anyhow!("no record format named {record}"))?;
                owner
                    .field(field)
                    .map(DdsNode::Field)
                    .ok_or_else(|| anyhow!("record {record} has no field {field}"))
            }
            Self::File => Ok(DdsNode::File(file)),
        }
    }

    /// 0-based line a workflow cursor should sit on for this target.
    pub fn cursor_line(&self, file: &DdsFile) -> Result<usize> {
        match self.resolve(file)? {
            DdsNode::File(_) => Ok(0),
            node => node
                .line_span()
                .map(|(start, _)| start)
                .ok_or_else(|| anyhow!("{self} does not map to a source line")),
        }
    }
}
