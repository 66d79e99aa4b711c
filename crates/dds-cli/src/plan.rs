//! Turning a parsed subcommand into edits.
//!
//! Everything here is pure: the source is read once, every check runs against that snapshot
//! and the result is a single [`EditSet`] the caller applies or prints.

use anyhow::{Result, anyhow, bail};
use dds_core::validate::is_valid_name;
use dds_core::{
    Anchor, Attribute, CommandContext, DdsDocument, DdsFile, DdsNode, EditSet, Indicator,
    Notification, Placement, Record, ScreenPosition, Settings, reconstruct, run_command,
    workflow::ScriptedPrompter,
};

use crate::app::{EditCommand, KeywordAction};
use crate::target::Target;

/// Compute the edits `command` makes to `document`.
pub fn plan(
    command: &EditCommand,
    document: &DdsDocument,
    file: &DdsFile,
    settings: &Settings,
) -> Result<EditSet> {
    match command {
        EditCommand::Rename { target, name, .. } => rename(document, file, target, name),
        EditCommand::Move {
            target,
            row,
            column,
            force,
            ..
        } => move_to(document, file, target, ScreenPosition::new(*row, *column), *force),
        EditCommand::Resize {
            target,
            length,
            decimals,
            force,
            ..
        } => resize(document, file, target, *length, *decimals, *force),
        EditCommand::Keyword { action } => match action {
            KeywordAction::Add {
                target,
                keyword,
                indicators,
                ..
            } => add_keyword(document, file, target, keyword, indicators),
            KeywordAction::Remove { target, names, .. } => {
                remove_keywords(document, file, target, names)
            }
        },
        EditCommand::Sort { target, .. } => {
            let record = record_of(file, target)?;
            Ok(reconstruct::sort_by_position(document, record)?)
        }
        EditCommand::Copy {
            target,
            name,
            row,
            column,
            text,
            force,
            ..
        } => copy(
            document,
            file,
            target,
            CopyRequest {
                name: name.as_deref(),
                row: *row,
                column: *column,
                text: text.as_deref(),
                force: *force,
            },
        ),
        EditCommand::Delete { target, .. } => {
            let node = target.resolve(file)?;
            if matches!(node, DdsNode::File(_)) {
                bail!("the file itself cannot be deleted; name a record, field or keyword line");
            }
            Ok(reconstruct::delete_entity(document, &node)?)
        }
        EditCommand::Run {
            command,
            at,
            answers,
            ..
        } => {
            let context = CommandContext {
                document,
                file,
                line: at.cursor_line(file)?,
                settings,
            };
            let mut prompter = ScriptedPrompter::new(answers.iter().cloned());
            match run_command(*command, &context, &mut prompter) {
                Notification::Applied { edits, .. } => Ok(edits),
                Notification::Cancelled => {
                    let asked = prompter.asked().last().cloned().unwrap_or_default();
                    bail!("{command} stopped at '{asked}': give one --answer per prompt")
                }
                Notification::Error(message) | Notification::Failed(message) => bail!(message),
            }
        }
    }
}

fn record_of<'a>(file: &'a DdsFile, target: &Target) -> Result<&'a Record> {
    match target.resolve(file)? {
        DdsNode::Record(record) => Ok(record),
        node => node
            .line_span()
            .and_then(|(start, _)| file.record_at_line(start))
            .filter(|_| !matches!(node, DdsNode::File(_)))
            .ok_or_else(|| anyhow!("{target} is not inside a record format")),
    }
}

fn checked_name(name: &str, taken: impl IntoIterator<Item = String>) -> Result<String> {
    let name = name.trim().to_ascii_uppercase();
    if !is_valid_name(&name) {
        bail!("'{name}' is not a valid name: use up to 10 letters, digits, _ # @ $, starting with a letter");
    }
    if taken.into_iter().any(|t| t.eq_ignore_ascii_case(&name)) {
        bail!("{name} already exists");
    }
    Ok(name)
}

fn rename(document: &DdsDocument, file: &DdsFile, target: &Target, name: &str) -> Result<EditSet> {
    match target.resolve(file)? {
        DdsNode::Record(record) => {
            let others = file
                .records
                .iter()
                .filter(|r| r.start_index != record.start_index)
                .map(|r| r.name.clone());
            let name = checked_name(name, others)?;
            Ok(reconstruct::rename(document, record.start_index, &name)?)
        }
        DdsNode::Field(field) => {
            let record = record_of(file, target)?;
            let others = record
                .fields
                .iter()
                .filter(|f| f.line_index != field.line_index)
                .map(|f| f.name.clone());
            let name = checked_name(name, others)?;
            Ok(reconstruct::rename(document, field.line_index, &name)?)
        }
        _ => bail!("{target} is not a record format or field"),
    }
}

fn check_placement(placement: Placement<'_>, position: ScreenPosition, force: bool) -> Result<()> {
    if force {
        return Ok(());
    }
    placement.check(position).map_err(anyhow::Error::msg)
}

fn move_to(
    document: &DdsDocument,
    file: &DdsFile,
    target: &Target,
    position: ScreenPosition,
    force: bool,
) -> Result<EditSet> {
    let (name, line, width, current) = match target.resolve(file)? {
        DdsNode::Field(field) => (&field.name, field.line_index, field.display_width(), field.position),
        DdsNode::Constant(constant) => {
            (&constant.name, constant.line_index, constant.length, constant.position)
        }
        _ => bail!("{target} is not a field or constant"),
    };
    if current.is_none() {
        bail!("{name} has no screen position");
    }
    let placement = Placement {
        record: record_of(file, target)?,
        screen: file.screen,
        width,
        exclude_line: Some(line),
    };
    check_placement(placement, position, force)?;
    Ok(reconstruct::reposition(document, line, position)?)
}

fn resize(
    document: &DdsDocument,
    file: &DdsFile,
    target: &Target,
    length: u32,
    decimals: Option<u8>,
    force: bool,
) -> Result<EditSet> {
    let DdsNode::Field(field) = target.resolve(file)? else {
        bail!("{target} is not a field");
    };
    if !field.data_type.has_length() {
        bail!(
            "{} is a {} field with a system-defined length",
            field.name,
            field.data_type.description()
        );
    }
    if decimals.is_some() && !field.data_type.has_decimals() {
        bail!("{} fields have no decimal positions", field.data_type.description());
    }
    if length == 0 {
        bail!("length must be at least 1");
    }
    if let Some(position) = field.position {
        let placement = Placement {
            record: record_of(file, target)?,
            screen: file.screen,
            width: length,
            exclude_line: Some(field.line_index),
        };
        check_placement(placement, position, force)?;
    }
    let decimals = decimals.or(field.decimals);
    Ok(reconstruct::resize(document, field.line_index, Some(length), decimals)?)
}

fn add_keyword(
    document: &DdsDocument,
    file: &DdsFile,
    target: &Target,
    keyword: &str,
    indicators: &[Indicator],
) -> Result<EditSet> {
    let edits = match target.resolve(file)? {
        DdsNode::File(_) | DdsNode::Attribute(_) => {
            reconstruct::add_keyword(document, file, keyword, indicators)
        }
        DdsNode::Record(record) => reconstruct::add_keyword(document, record, keyword, indicators),
        DdsNode::Field(field) => reconstruct::add_keyword(document, field, keyword, indicators),
        DdsNode::Constant(constant) => {
            reconstruct::add_keyword(document, constant, keyword, indicators)
        }
        DdsNode::Indicator(_) | DdsNode::Group(..) => bail!("{target} cannot carry keywords"),
    };
    Ok(edits?)
}

/// Keywords of the entity `target` names. Lines before the first record resolve to the file.
fn attributes_of<'a>(file: &'a DdsFile, target: &Target) -> Result<(String, &'a [Attribute])> {
    Ok(match target.resolve(file)? {
        DdsNode::File(_) | DdsNode::Attribute(_) => ("the file".to_string(), file.attributes.as_slice()),
        DdsNode::Record(record) => (record.name.clone(), record.attributes.as_slice()),
        DdsNode::Field(field) => (field.name.clone(), field.attributes.as_slice()),
        DdsNode::Constant(constant) => (constant.name.clone(), constant.attributes.as_slice()),
        DdsNode::Indicator(_) | DdsNode::Group(..) => bail!("{target} has no keywords"),
    })
}

fn remove_keywords(
    document: &DdsDocument,
    file: &DdsFile,
    target: &Target,
    names: &[String],
) -> Result<EditSet> {
    let (owner, attributes) = attributes_of(file, target)?;
    let mut selected: Vec<&Attribute> = Vec::new();
    for name in names {
        let name = name.trim().to_ascii_uppercase();
        let matching: Vec<&Attribute> = attributes.iter().filter(|a| a.has_keyword(&name)).collect();
        if matching.is_empty() {
            bail!("{owner} has no {name} keyword");
        }
        for attribute in matching {
            if !selected.iter().any(|s| std::ptr::eq(*s, attribute)) {
                selected.push(attribute);
            }
        }
    }
    Ok(reconstruct::remove_keywords(document, &selected)?)
}

struct CopyRequest<'a> {
    name: Option<&'a str>,
    row: Option<u32>,
    column: Option<u32>,
    text: Option<&'a str>,
    force: bool,
}

impl CopyRequest<'_> {
    /// Requested position; a missing row or column keeps the original's.
    fn position(&self, current: Option<ScreenPosition>) -> Result<Option<ScreenPosition>> {
        match (self.row, self.column, current) {
            (None, None, _) => Ok(None),
            (row, column, Some(current)) => Ok(Some(ScreenPosition::new(
                row.unwrap_or(current.row),
                column.unwrap_or(current.column),
            ))),
            (Some(row), Some(column), None) => Ok(Some(ScreenPosition::new(row, column))),
            _ => bail!("give both --row and --column for an element without a position"),
        }
    }
}

fn copy(
    document: &DdsDocument,
    file: &DdsFile,
    target: &Target,
    request: CopyRequest<'_>,
) -> Result<EditSet> {
    let node = target.resolve(file)?;
    if request.text.is_some() && !matches!(node, DdsNode::Constant(_)) {
        bail!("--text only applies to constants");
    }
    match node {
        DdsNode::Record(record) => {
            let name = request
                .name
                .ok_or_else(|| anyhow!("copying a record needs --name"))?;
            let name = checked_name(name, file.records.iter().map(|r| r.name.clone()))?;
            Ok(reconstruct::copy_record(
                document,
                record,
                Anchor::After(record.end_index),
                &name,
            )?)
        }
        DdsNode::Field(field) => {
            let record = record_of(file, target)?;
            let name = request
                .name
                .ok_or_else(|| anyhow!("copying a field needs --name"))?;
            let name = checked_name(name, record.fields.iter().map(|f| f.name.clone()))?;
            let position = request.position(field.position)?;
            if let Some(effective) = position.or(field.position) {
                let placement = Placement {
                    record,
                    screen: file.screen,
                    width: field.display_width(),
                    exclude_line: None,
                };
                check_placement(placement, effective, request.force)?;
            }
            Ok(reconstruct::copy_field(
                document,
                field,
                Anchor::After(record.last_element_line()),
                &name,
                position,
            )?)
        }
        DdsNode::Constant(constant) => {
            if request.name.is_some() {
                bail!("constants have no name; use --text to change the copy's text");
            }
            let record = record_of(file, target)?;
            let position = request.position(constant.position)?;
            if let Some(effective) = position.or(constant.position) {
                let width = request
                    .text
                    .map_or(constant.length, |text| {
                        u32::try_from(text.chars().count()).unwrap_or(u32::MAX)
                    });
                let placement = Placement {
                    record,
                    screen: file.screen,
                    width,
                    exclude_line: None,
                };
                check_placement(placement, effective, request.force)?;
            }
            Ok(reconstruct::copy_constant(
                document,
                constant,
                Anchor::After(record.last_element_line()),
                position,
                request.text,
            )?)
        }
        _ => bail!("{target} is not a record format, field or constant"),
    }
}
