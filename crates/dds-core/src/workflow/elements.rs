//! Commands that create, change, copy or delete records, fields and constants.

use super::prompt::{Cancelled, InputRequest, PickItem, PickRequest, Prompter, ask};
use super::questions::{
    ask_name, ask_number, ask_position, ask_text, pick_field_type, pick_usage,
};
use super::{CommandContext, WorkflowError};
use crate::document::DdsDocument;
use crate::edit::{EditSet, TextEdit};
use crate::model::{DdsNode, Record, quote_literal, split_keywords};
use crate::parser::last_content_line;
use crate::reconstruct::{self, Anchor, NewField, ReconstructError};
use crate::validate::{Placement, is_available_excluding};

const MAX_LENGTH: u32 = 9999;
const MAX_DECIMALS: u32 = 63;

fn field_names(record: &Record) -> Vec<String> {
    record.fields.iter().map(|f| f.name.clone()).collect()
}

fn record_names(context: &CommandContext<'_>) -> Vec<String> {
    context.file.records.iter().map(|r| r.name.clone()).collect()
}

fn placement<'a>(
    context: &CommandContext<'a>,
    record: &'a Record,
    width: u32,
    exclude_line: Option<usize>,
) -> Placement<'a> {
    Placement {
        record,
        screen: context.file.screen,
        width,
        exclude_line,
    }
}

/// Apply two rewrites of the same line one after the other and express the result as a single
/// replacement against the original snapshot.
fn combine_line_rewrites(
    document: &DdsDocument,
    line: usize,
    first: EditSet,
    second: impl FnOnce(&DdsDocument) -> Result<EditSet, ReconstructError>,
) -> Result<EditSet, WorkflowError> {
    let staged = document.apply(&first).map_err(ReconstructError::from)?;
    let edits = second(&staged)?;
    let staged = staged.apply(&edits).map_err(ReconstructError::from)?;
    let range = document
        .line_range(line)
        .ok_or(ReconstructError::LineOutOfBounds {
            line,
            line_count: document.line_count(),
        })?;
    let text = staged.line(line).unwrap_or_default();
    Ok(EditSet::single(TextEdit::replace(range, text)))
}

pub(super) fn add_field(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<EditSet, WorkflowError> {
    let record = context.record()?;
    let name = ask_name(prompter, "Field name", "", &field_names(record))?;
    let data_type = pick_field_type(prompter)?;
    let length = if data_type.has_length() {
        Some(ask_number(prompter, "Length", None, 1..=MAX_LENGTH)?)
    } else {
        None
    };
    let decimals = if data_type.has_decimals() {
        let max = length.unwrap_or(MAX_DECIMALS).min(MAX_DECIMALS);
        Some(ask_number(prompter, "Decimal positions", Some(0), 0..=max)? as u8)
    } else {
        None
    };
    let usage = pick_usage(prompter)?;
    let width = data_type.fixed_length().or(length).unwrap_or(1);
    let position = if usage.is_positioned() {
        let placement = placement(context, record, width, None);
        Some(ask_position(prompter, &placement, None)?)
    } else {
        None
    };

    let mut field = NewField::new(name, data_type);
    field.length = length;
    field.decimals = decimals;
    field.usage = usage;
    field.position = position;
    let lines = reconstruct::new_field_lines(&field)?;
    Ok(reconstruct::insert_block_after(
        context.document,
        Anchor::After(record.last_element_line()),
        &lines,
    )?)
}

pub(super) fn add_constant(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<EditSet, WorkflowError> {
    let record = context.record()?;
    let text = ask_text(prompter, "Constant text", "")?;
    let width = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    let position = ask_position(prompter, &placement(context, record, width, None), None)?;
    let lines = reconstruct::new_constant_lines(&quote_literal(&text), position, &[], &[])?;
    Ok(reconstruct::insert_block_after(
        context.document,
        Anchor::After(record.last_element_line()),
        &lines,
    )?)
}

pub(super) fn add_record(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<EditSet, WorkflowError> {
    let name = ask_name(prompter, "Record format name", "", &record_names(context))?;
    let keywords = ask(
        prompter,
        InputRequest::new("Record keywords (optional, e.g. OVERLAY CA03(03))"),
    )?;
    let keywords: Vec<String> = split_keywords(&keywords)
        .into_iter()
        .map(str::to_string)
        .collect();
    let lines = reconstruct::new_record_lines(&name, &keywords)?;
    let anchor = match context.file.records.last() {
        Some(record) => Anchor::After(record.end_index),
        None => Anchor::After(last_content_line(&context.document.lines())),
    };
    Ok(reconstruct::insert_block_after(context.document, anchor, &lines)?)
}

const EDIT_CHOICES: [&str; 5] = ["Name", "Length", "Type", "Usage", "Reference"];

pub(super) fn edit_field(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<EditSet, WorkflowError> {
    let (record, field) = context.field()?;
    let document = context.document;
    let items = EDIT_CHOICES.iter().map(|c| PickItem::new(*c)).collect();
    let choice = prompter.pick(&PickRequest::new(format!("Edit {}", field.name), items))?;
    let edits = match choice {
        0 => {
            let taken: Vec<String> = field_names(record)
                .into_iter()
                .filter(|n| !n.eq_ignore_ascii_case(&field.name))
                .collect();
            let name = ask_name(prompter, "Field name", &field.name, &taken)?;
            reconstruct::rename(document, field.line_index, &name)?
        }
        1 => {
            if !field.data_type.has_length() {
                return Err(WorkflowError::Unsupported("resized"));
            }
            let length = ask_number(prompter, "Length", Some(field.length), 1..=MAX_LENGTH)?;
            if let Some(position) = field.position {
                placement(context, record, length, Some(field.line_index))
                    .check(position)
                    .map_err(WorkflowError::Unavailable)?;
            }
            let decimals = match field.decimals {
                Some(current) if field.data_type.has_decimals() => {
                    let max = length.min(MAX_DECIMALS);
                    Some(ask_number(
                        prompter,
                        "Decimal positions",
                        Some(u32::from(current).min(max)),
                        0..=max,
                    )? as u8)
                }
                _ => None,
            };
            reconstruct::resize(document, field.line_index, Some(length), decimals)?
        }
        2 => {
            let data_type = pick_field_type(prompter)?;
            if let Some(position) = field.position {
                let width = data_type.fixed_length().unwrap_or(field.length);
                placement(context, record, width, Some(field.line_index))
                    .check(position)
                    .map_err(WorkflowError::Unavailable)?;
            }
            reconstruct::set_type(document, field.line_index, data_type)?
        }
        3 => {
            let usage = pick_usage(prompter)?;
            let first = reconstruct::set_usage(document, field.line_index, usage)?;
            if usage.is_positioned() && field.position.is_none() {
                let placement = placement(context, record, field.display_width(), None);
                let position = ask_position(prompter, &placement, None)?;
                combine_line_rewrites(document, field.line_index, first, |staged| {
                    reconstruct::reposition(staged, field.line_index, position)
                })?
            } else {
                first
            }
        }
        4 => reconstruct::set_reference(document, field.line_index, !field.referenced)?,
        _ => return Err(Cancelled.into()),
    };
    Ok(edits)
}

pub(super) fn rename(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<EditSet, WorkflowError> {
    match context.node() {
        DdsNode::Record(record) => {
            let taken: Vec<String> = record_names(context)
                .into_iter()
                .filter(|n| !n.eq_ignore_ascii_case(&record.name))
                .collect();
            let name = ask_name(prompter, "Record format name", &record.name, &taken)?;
            Ok(reconstruct::rename(context.document, record.start_index, &name)?)
        }
        DdsNode::Field(field) => {
            let record = context.record()?;
            let taken: Vec<String> = field_names(record)
                .into_iter()
                .filter(|n| !n.eq_ignore_ascii_case(&field.name))
                .collect();
            let name = ask_name(prompter, "Field name", &field.name, &taken)?;
            Ok(reconstruct::rename(context.document, field.line_index, &name)?)
        }
        _ => Err(WorkflowError::Unsupported("renamed")),
    }
}

pub(super) fn move_element(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<EditSet, WorkflowError> {
    let (record, line, width, position) = match context.node() {
        DdsNode::Field(field) => (
            context.record()?,
            field.line_index,
            field.display_width(),
            field.position.ok_or_else(|| WorkflowError::Hidden(field.name.clone()))?,
        ),
        DdsNode::Constant(constant) => (
            context.record()?,
            constant.line_index,
            constant.length,
            constant
                .position
                .ok_or_else(|| WorkflowError::Hidden(constant.name.clone()))?,
        ),
        _ => return Err(WorkflowError::Unsupported("moved")),
    };
    let placement = placement(context, record, width, Some(line));
    let target = ask_position(prompter, &placement, Some(position))?;
    Ok(reconstruct::reposition(context.document, line, target)?)
}

pub(super) fn copy_element(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<EditSet, WorkflowError> {
    let document = context.document;
    match context.node() {
        DdsNode::Record(record) => {
            let name = ask_name(prompter, "New record format name", "", &record_names(context))?;
            Ok(reconstruct::copy_record(
                document,
                record,
                Anchor::After(record.end_index),
                &name,
            )?)
        }
        DdsNode::Field(field) => {
            let record = context.record()?;
            let name = ask_name(prompter, "New field name", "", &field_names(record))?;
            let position = match field.position {
                Some(current) => {
                    let placement = placement(context, record, field.display_width(), None);
                    Some(ask_position(prompter, &placement, Some(current))?)
                }
                None => None,
            };
            Ok(reconstruct::copy_field(
                document,
                field,
                Anchor::After(record.last_element_line()),
                &name,
                position,
            )?)
        }
        DdsNode::Constant(constant) => {
            let record = context.record()?;
            let text = if constant.is_literal() {
                let current = constant.value();
                let text = ask_text(prompter, "Constant text", &current)?;
                (text != current).then_some(text)
            } else {
                None
            };
            let width = text.as_ref().map_or(constant.length, |t| {
                u32::try_from(t.chars().count()).unwrap_or(u32::MAX)
            });
            let placement = placement(context, record, width, None);
            let position = ask_position(prompter, &placement, constant.position)?;
            Ok(reconstruct::copy_constant(
                document,
                constant,
                Anchor::After(record.last_element_line()),
                Some(position),
                text.as_deref(),
            )?)
        }
        _ => Err(WorkflowError::Unsupported("copied")),
    }
}

pub(super) fn delete_element(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<EditSet, WorkflowError> {
    let node = context.node();
    let kind = match node {
        DdsNode::Record(_) => "record format",
        DdsNode::Field(_) => "field",
        DdsNode::Constant(_) => "constant",
        DdsNode::Attribute(_) => "keyword",
        DdsNode::File(_) | DdsNode::Indicator(_) | DdsNode::Group(..) => {
            return Err(WorkflowError::Unsupported("deleted"));
        }
    };
    if !prompter.confirm(&format!("Delete {kind} {}?", node.label()))? {
        return Err(Cancelled.into());
    }
    Ok(reconstruct::delete_entity(context.document, &node)?)
}

pub(super) fn sort_by_position(context: &CommandContext<'_>) -> Result<EditSet, WorkflowError> {
    let record = context.record()?;
    Ok(reconstruct::sort_by_position(context.document, record)?)
}

pub(super) fn center_constant(context: &CommandContext<'_>) -> Result<EditSet, WorkflowError> {
    let (record, constant) = context.constant()?;
    let screen = context.file.screen;
    let row = constant.position.map_or(1, |p| p.row);
    let column = reconstruct::centered_column(constant.length, screen.columns);
    if !is_available_excluding(record, row, column, constant.length, constant.line_index) {
        return Err(WorkflowError::Unavailable(format!(
            "centring {} on row {row} would overlap another element",
            constant.name
        )));
    }
    Ok(reconstruct::center_constant(context.document, constant, screen)?)
}
