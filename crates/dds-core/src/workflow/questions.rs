//! Questions shared by several workflows.

use super::prompt::{Answer, Cancelled, InputRequest, PickItem, PickRequest, Prompter, ask};
use crate::model::{FieldType, Indicator, ScreenPosition, Usage};
use crate::validate::{Placement, is_valid_name};
use std::ops::RangeInclusive;

/// Ask for a record or field name not in `taken`. The answer is upper-cased.
pub(crate) fn ask_name(
    prompter: &mut dyn Prompter,
    prompt: &str,
    current: &str,
    taken: &[String],
) -> Answer<String> {
    let request = InputRequest::new(prompt)
        .with_value(current)
        .validate(|answer| {
            let name = answer.to_ascii_uppercase();
            if !is_valid_name(&name) {
                Err("use up to 10 letters, digits, _ # @ $, starting with a letter".to_string())
            } else if taken.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
                Err(format!("{name} already exists"))
            } else {
                Ok(())
            }
        });
    ask(prompter, request).map(|name| name.to_ascii_uppercase())
}

/// Ask for a number within `range`.
pub(crate) fn ask_number(
    prompter: &mut dyn Prompter,
    prompt: &str,
    initial: Option<u32>,
    range: RangeInclusive<u32>,
) -> Answer<u32> {
    let (min, max) = (*range.start(), *range.end());
    let request = InputRequest::new(prompt)
        .with_value(initial.map(|v| v.to_string()).unwrap_or_default())
        .validate(move |answer| match answer.parse::<u32>() {
            Ok(value) if (min..=max).contains(&value) => Ok(()),
            _ => Err(format!("enter a number from {min} to {max}")),
        });
    let answer = ask(prompter, request)?;
    Ok(answer.parse().unwrap_or(min))
}

/// Ask for non-empty text.
pub(crate) fn ask_text(prompter: &mut dyn Prompter, prompt: &str, initial: &str) -> Answer<String> {
    let request = InputRequest::new(prompt)
        .with_value(initial)
        .validate(|answer| {
            if answer.is_empty() {
                Err("a value is required".to_string())
            } else {
                Ok(())
            }
        });
    ask(prompter, request)
}

fn parse_indicators(answer: &str) -> Result<Vec<Indicator>, String> {
    answer
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<Indicator>().map_err(|err| err.to_string()))
        .collect()
}

/// Ask for a blank-separated indicator list such as `03 N41`. An empty answer clears them.
pub(crate) fn ask_indicators(
    prompter: &mut dyn Prompter,
    current: &[Indicator],
    max: usize,
) -> Answer<Vec<Indicator>> {
    let initial = current
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    let request = InputRequest::new("Indicators (e.g. 03 N41, empty for none)")
        .with_value(initial)
        .validate(move |answer| {
            let indicators = parse_indicators(answer)?;
            if indicators.len() > max {
                return Err(format!("at most {max} indicators"));
            }
            Ok(())
        });
    let answer = ask(prompter, request)?;
    Ok(parse_indicators(&answer).unwrap_or_default())
}

/// Pick a data type.
pub(crate) fn pick_field_type(prompter: &mut dyn Prompter) -> Answer<FieldType> {
    let items = FieldType::ALL
        .iter()
        .map(|t| PickItem::with_detail(t.code().to_string(), t.description()))
        .collect();
    let index = prompter.pick(&PickRequest::new("Data type", items))?;
    FieldType::ALL.get(index).copied().ok_or(Cancelled)
}

/// Pick a usage.
pub(crate) fn pick_usage(prompter: &mut dyn Prompter) -> Answer<Usage> {
    let items = Usage::ALL
        .iter()
        .map(|u| PickItem::with_detail(u.code().to_string(), format!("{u:?}")))
        .collect();
    let index = prompter.pick(&PickRequest::new("Usage", items))?;
    Usage::ALL.get(index).copied().ok_or(Cancelled)
}

/// Ask for a row, then a column that passes the placement check.
pub(crate) fn ask_position(
    prompter: &mut dyn Prompter,
    placement: &Placement<'_>,
    initial: Option<ScreenPosition>,
) -> Answer<ScreenPosition> {
    let row = ask_number(
        prompter,
        "Row",
        initial.map(|p| p.row),
        1..=placement.screen.rows,
    )?;
    let columns = placement.screen.columns;
    let request = InputRequest::new("Column")
        .with_value(initial.map(|p| p.column.to_string()).unwrap_or_default())
        .validate(|answer| match answer.parse::<u32>() {
            Ok(column) if (1..=columns).contains(&column) => {
                placement.check(ScreenPosition::new(row, column))
            }
            _ => Err(format!("enter a number from 1 to {columns}")),
        });
    let column = ask(prompter, request)?.parse().unwrap_or(1);
    Ok(ScreenPosition::new(row, column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScreenSize;
    use crate::parser::parse;
    use crate::workflow::prompt::ScriptedPrompter;

    #[test]
    fn test_ask_name_uppercases_and_rejects_taken() {
        let taken = vec!["CUSNAM".to_string()];
        let mut prompter = ScriptedPrompter::new(["cusnam", "9X", "custno"]);
        assert_eq!(
            ask_name(&mut prompter, "Name", "", &taken),
            Ok("CUSTNO".to_string())
        );
    }

    #[test]
    fn test_ask_indicators() {
        let mut prompter = ScriptedPrompter::new(["03 N41 05 06", "03,N41", ""]);
        assert_eq!(
            ask_indicators(&mut prompter, &[], 3),
            Ok(vec![Indicator::on(3), Indicator::off(41)])
        );
        assert_eq!(ask_indicators(&mut prompter, &[], 3), Ok(Vec::new()));
        assert_eq!(ask_indicators(&mut prompter, &[], 3), Err(Cancelled));
    }

    #[test]
    fn test_ask_position_reasks_on_overlap() {
        let file = parse("     A          R MAIN\n     A            NAME          10A  B  2  5");
        let placement = Placement {
            record: &file.records[0],
            screen: ScreenSize::STANDARD,
            width: 4,
            exclude_line: None,
        };
        let mut prompter = ScriptedPrompter::new(["2", "10", "78", "20"]);
        assert_eq!(
            ask_position(&mut prompter, &placement, None),
            Ok(ScreenPosition::new(2, 20))
        );
    }
}
