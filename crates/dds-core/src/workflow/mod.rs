//! Interactive editing commands.
//!
//! Each command is a straight sequence of questions asked through a [`Prompter`], followed by
//! exactly one call into [`crate::reconstruct`]. Nothing is computed until every answer is in,
//! so a cancelled command never leaves a partial edit behind. [`run_command`] is the single
//! entry point hosts use; it turns every outcome into a [`Notification`].

mod elements;
mod keywords;
pub mod prompt;
mod questions;

pub use prompt::{
    Answer, Cancelled, InputRequest, PickItem, PickRequest, Prompter, ScriptedPrompter, ask,
};

use crate::document::DdsDocument;
use crate::edit::EditSet;
use crate::model::{Constant, DdsFile, DdsNode, Field, Record};
use crate::reconstruct::ReconstructError;
use crate::settings::Settings;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

/// Why a command did not produce edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// The user dismissed a prompt.
    #[error("cancelled")]
    Cancelled(#[from] Cancelled),
    /// The cursor is not inside a record format.
    #[error("place the cursor inside a record format")]
    NoRecord,
    /// The cursor is not on a field.
    #[error("place the cursor on a field")]
    NoField,
    /// The cursor is not on a constant.
    #[error("place the cursor on a constant")]
    NoConstant,
    /// The cursor is not on anything the command applies to.
    #[error("nothing at the cursor can be {0}")]
    Unsupported(&'static str),
    /// The element has no screen position.
    #[error("{0} has no screen position")]
    Hidden(String),
    /// The entity has no keywords to choose from.
    #[error("{0} has no keywords")]
    NoKeywords(String),
    /// The computed placement is taken.
    #[error("{0}")]
    Unavailable(String),
    /// The reconstructor refused the request.
    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),
}

/// Everything a command reads.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    /// Current text snapshot.
    pub document: &'a DdsDocument,
    /// Model parsed from `document`.
    pub file: &'a DdsFile,
    /// 0-based cursor line.
    pub line: usize,
    /// Editor settings.
    pub settings: &'a Settings,
}

impl<'a> CommandContext<'a> {
    /// The entity under the cursor.
    pub fn node(&self) -> DdsNode<'a> {
        let file: &'a DdsFile = self.file;
        file.node_at_line(self.line)
    }

    /// The record containing the cursor.
    pub fn record(&self) -> Result<&'a Record, WorkflowError> {
        let file: &'a DdsFile = self.file;
        file.record_at_line(self.line).ok_or(WorkflowError::NoRecord)
    }

    /// The field under the cursor with its record.
    pub fn field(&self) -> Result<(&'a Record, &'a Field), WorkflowError> {
        match self.node() {
            DdsNode::Field(field) => Ok((self.record()?, field)),
            _ => Err(WorkflowError::NoField),
        }
    }

    /// The constant under the cursor with its record.
    pub fn constant(&self) -> Result<(&'a Record, &'a Constant), WorkflowError> {
        match self.node() {
            DdsNode::Constant(constant) => Ok((self.record()?, constant)),
            _ => Err(WorkflowError::NoConstant),
        }
    }
}

/// The interactive commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Add a field to the record at the cursor.
    AddField,
    /// Add a constant to the record at the cursor.
    AddConstant,
    /// Add a record format at the end of the file.
    AddRecord,
    /// Change a field's name, length, type, usage or reference flag.
    EditField,
    /// Rename the record or field at the cursor.
    Rename,
    /// Move the field or constant at the cursor.
    Move,
    /// Copy the record, field or constant at the cursor.
    Copy,
    /// Delete the entity at the cursor.
    Delete,
    /// Add a keyword to the entity at the cursor.
    AddKeyword,
    /// Remove keywords from the entity at the cursor.
    RemoveKeywords,
    /// Change the indicators of a definition or keyword.
    EditIndicators,
    /// Sort the record's fields and constants by screen position.
    SortByPosition,
    /// Centre the constant at the cursor on its row.
    CenterConstant,
    /// Switch the file between 24×80 and 27×132.
    ChangeDisplaySize,
}

impl Command {
    /// Every command, in menu order.
    pub const ALL: [Command; 14] = [
        Self::AddField,
        Self::AddConstant,
        Self::AddRecord,
        Self::EditField,
        Self::Rename,
        Self::Move,
        Self::Copy,
        Self::Delete,
        Self::AddKeyword,
        Self::RemoveKeywords,
        Self::EditIndicators,
        Self::SortByPosition,
        Self::CenterConstant,
        Self::ChangeDisplaySize,
    ];

    /// Stable identifier, e.g. `add-field`.
    pub fn id(self) -> &'static str {
        match self {
            Self::AddField => "add-field",
            Self::AddConstant => "add-constant",
            Self::AddRecord => "add-record",
            Self::EditField => "edit-field",
            Self::Rename => "rename",
            Self::Move => "move",
            Self::Copy => "copy",
            Self::Delete => "delete",
            Self::AddKeyword => "add-keyword",
            Self::RemoveKeywords => "remove-keywords",
            Self::EditIndicators => "edit-indicators",
            Self::SortByPosition => "sort-by-position",
            Self::CenterConstant => "center-constant",
            Self::ChangeDisplaySize => "change-display-size",
        }
    }

    /// Menu title.
    pub fn title(self) -> &'static str {
        match self {
            Self::AddField => "Add Field",
            Self::AddConstant => "Add Constant",
            Self::AddRecord => "Add Record",
            Self::EditField => "Edit Field",
            Self::Rename => "Rename",
            Self::Move => "Move",
            Self::Copy => "Copy",
            Self::Delete => "Delete",
            Self::AddKeyword => "Add Keyword",
            Self::RemoveKeywords => "Remove Keywords",
            Self::EditIndicators => "Edit Indicators",
            Self::SortByPosition => "Sort by Position",
            Self::CenterConstant => "Center Constant",
            Self::ChangeDisplaySize => "Change Display Size",
        }
    }

    /// Ask the command's questions and compute its edits.
    pub fn run(
        self,
        context: &CommandContext<'_>,
        prompter: &mut dyn Prompter,
    ) -> Result<EditSet, WorkflowError> {
        match self {
            Self::AddField => elements::add_field(context, prompter),
            Self::AddConstant => elements::add_constant(context, prompter),
            Self::AddRecord => elements::add_record(context, prompter),
            Self::EditField => elements::edit_field(context, prompter),
            Self::Rename => elements::rename(context, prompter),
            Self::Move => elements::move_element(context, prompter),
            Self::Copy => elements::copy_element(context, prompter),
            Self::Delete => elements::delete_element(context, prompter),
            Self::AddKeyword => keywords::add_keyword(context, prompter),
            Self::RemoveKeywords => keywords::remove_keywords(context, prompter),
            Self::EditIndicators => keywords::edit_indicators(context, prompter),
            Self::SortByPosition => elements::sort_by_position(context),
            Self::CenterConstant => elements::center_constant(context),
            Self::ChangeDisplaySize => keywords::change_display_size(context, prompter),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned for an unknown command identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.id() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

/// What the host shows after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The command produced edits for the host to apply.
    Applied {
        /// Command that ran.
        command: Command,
        /// Edits against the snapshot the command saw.
        edits: EditSet,
    },
    /// The user cancelled; nothing changes.
    Cancelled,
    /// An expected problem with an actionable message.
    Error(String),
    /// An internal failure, reported generically.
    Failed(String),
}

/// Run a command and turn its outcome into a notification.
///
/// A panic while the command runs, including one raised by the prompter, is caught and
/// reported as [`Notification::Failed`].
pub fn run_command(
    command: Command,
    context: &CommandContext<'_>,
    prompter: &mut dyn Prompter,
) -> Notification {
    let run = AssertUnwindSafe(|| command.run(context, prompter));
    let Ok(outcome) = panic::catch_unwind(run) else {
        tracing::error!(command = command.id(), "command panicked");
        return Notification::Failed(format!(
            "{} failed; the document was not changed",
            command.title()
        ));
    };
    match outcome {
        Ok(edits) => {
            tracing::info!(command = command.id(), edits = edits.len(), "command completed");
            Notification::Applied { command, edits }
        }
        Err(WorkflowError::Cancelled(_)) => {
            tracing::debug!(command = command.id(), "command cancelled");
            Notification::Cancelled
        }
        Err(WorkflowError::Reconstruct(ReconstructError::Edit(err))) => {
            tracing::warn!(command = command.id(), error = %err, "command produced conflicting edits");
            Notification::Failed(format!("{} failed; the document was not changed", command.title()))
        }
        Err(err) => Notification::Error(err.to_string()),
    }
}
