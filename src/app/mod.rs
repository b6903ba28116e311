//! Interactive command flows: prompt for whatever the command line did not
//! supply, call the services in `core`, and return an outcome that renders
//! itself for the console.

pub mod change_plan;
pub mod create_plan;
pub mod generate_jwt;
pub mod register_account;
pub mod track_usage;
pub mod verify_jwt;

use crate::domain::ports::Prompter;
use crate::utils::error::{OutsetaError, Result};
use chrono::{DateTime, Local};
use std::fmt::Display;

/// Menu selection; an empty list fails with `empty_message`.
pub(crate) fn choose<'a, T, P, F>(
    prompter: &mut P,
    message: &str,
    items: &'a [T],
    empty_message: &str,
    label: F,
) -> Result<&'a T>
where
    P: Prompter + ?Sized,
    F: Fn(&T) -> String,
{
    if items.is_empty() {
        return Err(OutsetaError::precondition(empty_message));
    }
    let choices: Vec<String> = items.iter().map(label).collect();
    let index = prompter.select(message, &choices, 0)?;
    items
        .get(index)
        .ok_or_else(|| OutsetaError::validation(format!("Selection {} is out of range", index + 1)))
}

/// Renders a missing value as an empty string.
pub(crate) fn show<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

pub(crate) fn local_time(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_default()
}

pub(crate) fn millis_suffix() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::prompt::ScriptedPrompter;

    #[test]
    fn test_choose_returns_selected_item() {
        let mut prompter = ScriptedPrompter::new(["2"]);
        let items = vec!["basic", "pro"];
        let picked = choose(&mut prompter, "Select:", &items, "none", |s| s.to_string()).unwrap();
        assert_eq!(*picked, "pro");
    }

    #[test]
    fn test_choose_from_empty_list() {
        let mut prompter = ScriptedPrompter::new(["1"]);
        let items: Vec<&str> = vec![];
        let err = choose(&mut prompter, "Select:", &items, "No plans found.", |s| s.to_string())
            .unwrap_err();
        assert_eq!(err.to_string(), "No plans found.");
    }

    #[test]
    fn test_show_and_local_time() {
        assert_eq!(show(&Some(3)), "3");
        assert_eq!(show::<String>(&None), "");
        assert_eq!(local_time(None), "");
        assert!(!local_time(Some(1_700_000_000)).is_empty());
    }
}
