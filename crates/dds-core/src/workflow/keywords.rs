//! Commands that add, remove or condition keywords.

use super::prompt::{Cancelled, InputRequest, PickItem, PickRequest, Prompter, ask};
use super::questions::{ask_indicators, ask_text};
use super::{CommandContext, WorkflowError};
use crate::edit::EditSet;
use crate::model::{Attribute, Constant, DdsFile, DdsNode, Field, Record, quote_literal};
use crate::reconstruct::{self, Anchor, KeywordOwner};

const INDICATORS_PER_LINE: usize = 3;
const MAX_KEYWORD_INDICATORS: usize = 9;

/// The entity whose keywords a command works on.
#[derive(Debug, Clone, Copy)]
enum Owner<'a> {
    File(&'a DdsFile),
    Record(&'a Record),
    Field(&'a Field),
    Constant(&'a Constant),
}

impl<'a> Owner<'a> {
    fn at(context: &CommandContext<'a>) -> Self {
        match context.node() {
            DdsNode::Record(record) | DdsNode::Group(record, _) => Self::Record(record),
            DdsNode::Field(field) => Self::Field(field),
            DdsNode::Constant(constant) => Self::Constant(constant),
            DdsNode::File(_) | DdsNode::Attribute(_) | DdsNode::Indicator(_) => {
                Self::File(context.file)
            }
        }
    }

    fn label(&self) -> String {
        match self {
            Self::File(_) => "the file".to_string(),
            Self::Record(record) => record.name.clone(),
            Self::Field(field) => field.name.clone(),
            Self::Constant(constant) => constant.name.clone(),
        }
    }
}

impl KeywordOwner for Owner<'_> {
    fn definition_line(&self) -> Option<usize> {
        match self {
            Self::File(file) => file.definition_line(),
            Self::Record(record) => record.definition_line(),
            Self::Field(field) => field.definition_line(),
            Self::Constant(constant) => constant.definition_line(),
        }
    }

    fn anchor(&self) -> Anchor {
        match self {
            Self::File(file) => file.anchor(),
            Self::Record(record) => record.anchor(),
            Self::Field(field) => field.anchor(),
            Self::Constant(constant) => constant.anchor(),
        }
    }

    fn attributes(&self) -> &[Attribute] {
        match self {
            Self::File(file) => &file.attributes,
            Self::Record(record) => &record.attributes,
            Self::Field(field) => &field.attributes,
            Self::Constant(constant) => &constant.attributes,
        }
    }
}

const KEYWORD_KINDS: [(&str, &str); 5] = [
    ("COLOR", "Colour"),
    ("DSPATR", "Display attribute"),
    ("TEXT", "Descriptive text"),
    ("EDTCDE", "Edit code"),
    ("Other", "Type any keyword"),
];

fn pick_value(
    prompter: &mut dyn Prompter,
    title: &str,
    values: &[String],
) -> Result<String, WorkflowError> {
    let items = values.iter().map(PickItem::new).collect();
    let index = prompter.pick(&PickRequest::new(title, items))?;
    values.get(index).cloned().ok_or(Cancelled.into())
}

fn ask_keyword(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<String, WorkflowError> {
    let items = KEYWORD_KINDS
        .iter()
        .map(|(name, detail)| PickItem::with_detail(*name, *detail))
        .collect();
    let kind = prompter.pick(&PickRequest::new("Keyword", items))?;
    let keywords = &context.settings.keywords;
    let keyword = match kind {
        0 => format!("COLOR({})", pick_value(prompter, "Colour", &keywords.colors)?),
        1 => format!(
            "DSPATR({})",
            pick_value(prompter, "Display attribute", &keywords.display_attributes)?
        ),
        2 => format!("TEXT({})", quote_literal(&ask_text(prompter, "Text", "")?)),
        3 => {
            let request = InputRequest::new("Edit code").validate(|answer| {
                let mut chars = answer.chars().map(|c| c.to_ascii_uppercase());
                match (chars.next(), chars.next()) {
                    (Some('1'..='4' | 'A'..='D' | 'J'..='Q' | 'W'..='Z'), None) => Ok(()),
                    _ => Err("edit codes are 1-4, A-D, J-Q or W-Z".to_string()),
                }
            });
            format!("EDTCDE({})", ask(prompter, request)?.to_ascii_uppercase())
        }
        _ => ask_text(prompter, "Keyword", "")?,
    };
    Ok(keyword)
}

pub(super) fn add_keyword(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<EditSet, WorkflowError> {
    let owner = Owner::at(context);
    let keyword = ask_keyword(context, prompter)?;
    let indicators = ask_indicators(prompter, &[], MAX_KEYWORD_INDICATORS)?;
    Ok(reconstruct::add_keyword(
        context.document,
        &owner,
        &keyword,
        &indicators,
    )?)
}

fn attribute_item(attribute: &Attribute) -> PickItem {
    if attribute.indicators.is_empty() {
        return PickItem::new(&attribute.value);
    }
    let indicators = attribute
        .indicators
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    PickItem::with_detail(&attribute.value, indicators)
}

pub(super) fn remove_keywords(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<EditSet, WorkflowError> {
    let owner = Owner::at(context);
    let attributes = owner.attributes();
    if attributes.is_empty() {
        return Err(WorkflowError::NoKeywords(owner.label()));
    }
    let items = attributes.iter().map(attribute_item).collect();
    let title = format!("Keywords to remove from {}", owner.label());
    let picked = prompter.pick_many(&PickRequest::new(title, items))?;
    let selected: Vec<&Attribute> = picked
        .into_iter()
        .filter_map(|index| attributes.get(index))
        .collect();
    if selected.is_empty() {
        return Err(Cancelled.into());
    }
    Ok(reconstruct::remove_keywords(context.document, &selected)?)
}

pub(super) fn edit_indicators(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<EditSet, WorkflowError> {
    let owner = Owner::at(context);
    let definition = match owner {
        Owner::Field(field) => Some((field.line_index, field.indicators.as_slice())),
        Owner::Constant(constant) => Some((constant.line_index, constant.indicators.as_slice())),
        Owner::Record(_) | Owner::File(_) => None,
    };
    let standalone: Vec<&Attribute> = owner
        .attributes()
        .iter()
        .filter(|attribute| !attribute.is_inline())
        .collect();

    let mut items: Vec<PickItem> = Vec::new();
    if definition.is_some() {
        items.push(PickItem::new(format!("{} definition", owner.label())));
    }
    items.extend(standalone.iter().map(|attribute| attribute_item(attribute)));
    if items.is_empty() {
        return Err(WorkflowError::NoKeywords(owner.label()));
    }
    let choice = prompter.pick(&PickRequest::new("Indicators of", items))?;

    match (definition, choice) {
        (Some((line, current)), 0) => {
            let indicators = ask_indicators(prompter, current, INDICATORS_PER_LINE)?;
            Ok(reconstruct::set_line_indicators(context.document, line, &indicators)?)
        }
        _ => {
            let index = choice - usize::from(definition.is_some());
            let attribute = standalone.get(index).ok_or(Cancelled)?;
            let indicators = ask_indicators(prompter, &attribute.indicators, INDICATORS_PER_LINE)?;
            Ok(reconstruct::set_attribute_indicators(
                context.document,
                attribute,
                &indicators,
            )?)
        }
    }
}

const DISPLAY_SIZES: [(&str, &str); 2] = [
    ("24 x 80", "DSPSIZ(24 80 *DS3)"),
    ("27 x 132", "DSPSIZ(27 132 *DS4 24 80 *DS3)"),
];

pub(super) fn change_display_size(
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<EditSet, WorkflowError> {
    let items = DISPLAY_SIZES
        .iter()
        .map(|(label, keyword)| PickItem::with_detail(*label, *keyword))
        .collect();
    let choice = prompter.pick(&PickRequest::new("Display size", items))?;
    let (_, keyword) = DISPLAY_SIZES.get(choice).ok_or(Cancelled)?;
    Ok(reconstruct::set_file_keyword(
        context.document,
        context.file,
        keyword,
    )?)
}
