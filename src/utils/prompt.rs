use crate::domain::ports::Prompter;
use crate::utils::error::{OutsetaError, Result};
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// 終端機互動輸入；stdin 關閉 (EOF) 視為使用者中斷
pub struct TerminalPrompter<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl TerminalPrompter<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn read_answer(&mut self) -> Result<String> {
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(OutsetaError::Interrupted);
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        match default {
            Some(default) => write!(self.writer, "? {} ({}) ", message, default)?,
            None => write!(self.writer, "? {} ", message)?,
        }
        let answer = self.read_answer()?;
        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer)
    }

    fn select(&mut self, message: &str, choices: &[String], default: usize) -> Result<usize> {
        if choices.is_empty() {
            return Err(OutsetaError::validation(format!("{} (no choices)", message)));
        }

        writeln!(self.writer, "? {}", message)?;
        for (index, choice) in choices.iter().enumerate() {
            let marker = if index == default { '>' } else { ' ' };
            writeln!(self.writer, "  {} {}) {}", marker, index + 1, choice)?;
        }

        loop {
            write!(self.writer, "  Choose 1-{} ({}): ", choices.len(), default + 1)?;
            let answer = self.read_answer()?;
            if answer.is_empty() {
                return Ok(default.min(choices.len() - 1));
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(self.writer, "  > Please enter a number between 1 and {}", choices.len())?,
            }
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            write!(self.writer, "? {} ({}) ", message, hint)?;
            let answer = self.read_answer()?;
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.writer, "  > Please answer yes or no")?,
            }
        }
    }

    fn notify(&mut self, message: &str) {
        // 提示訊息寫入失敗不影響流程
        let _ = writeln!(self.writer, "{}", message);
    }
}

/// 預先排好的答案；答案用完視為中斷
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub transcript: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    fn next_answer(&mut self, message: &str) -> Result<String> {
        self.transcript.push(message.to_string());
        self.answers.pop_front().ok_or(OutsetaError::Interrupted)
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next_answer(message)?;
        if answer.trim().is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer.trim().to_string())
    }

    fn select(&mut self, message: &str, choices: &[String], default: usize) -> Result<usize> {
        let answer = self.next_answer(message)?;
        if answer.trim().is_empty() {
            return Ok(default);
        }
        match answer.trim().parse::<usize>() {
            Ok(n) if (1..=choices.len()).contains(&n) => Ok(n - 1),
            _ => Err(OutsetaError::validation(format!(
                "scripted answer {:?} is not a choice for {}",
                answer, message
            ))),
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let answer = self.next_answer(message)?;
        Ok(match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" => true,
            "n" | "no" | "false" => false,
            _ => default,
        })
    }

    fn notify(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }
}

/// 反覆詢問直到通過驗證
pub fn input_validated<P, F>(
    prompter: &mut P,
    message: &str,
    default: Option<&str>,
    check: F,
) -> Result<String>
where
    P: Prompter + ?Sized,
    F: Fn(&str) -> std::result::Result<(), String>,
{
    loop {
        let answer = prompter.input(message, default)?;
        match check(&answer) {
            Ok(()) => return Ok(answer.trim().to_string()),
            Err(reason) => prompter.notify(&format!("  > {}", reason)),
        }
    }
}

pub fn input_required<P>(prompter: &mut P, message: &str, field_name: &str) -> Result<String>
where
    P: Prompter + ?Sized,
{
    input_validated(prompter, message, None, |answer| {
        if answer.trim().is_empty() {
            Err(format!("{} is required", field_name))
        } else {
            Ok(())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_terminal_input_uses_default_on_empty_line() {
        let mut output = Vec::new();
        let mut prompter = TerminalPrompter::new(Cursor::new("\nBob\n"), &mut output);

        assert_eq!(prompter.input("First Name:", Some("Jane")).unwrap(), "Jane");
        assert_eq!(prompter.input("First Name:", Some("Jane")).unwrap(), "Bob");
    }

    #[test]
    fn test_terminal_eof_is_interrupt() {
        let mut output = Vec::new();
        let mut prompter = TerminalPrompter::new(Cursor::new(""), &mut output);
        assert!(matches!(
            prompter.input("Email:", None),
            Err(OutsetaError::Interrupted)
        ));
    }

    #[test]
    fn test_terminal_select_retries_until_in_range() {
        let mut output = Vec::new();
        let choices = vec!["Basic".to_string(), "Pro".to_string()];
        let mut prompter = TerminalPrompter::new(Cursor::new("7\nabc\n2\n"), &mut output);

        assert_eq!(prompter.select("Select a plan:", &choices, 0).unwrap(), 1);
        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("1) Basic"));
        assert!(rendered.contains("between 1 and 2"));
    }

    #[test]
    fn test_terminal_confirm() {
        let mut output = Vec::new();
        let mut prompter = TerminalPrompter::new(Cursor::new("\nmaybe\nn\n"), &mut output);
        assert!(prompter.confirm("Is Active?", true).unwrap());
        assert!(!prompter.confirm("Is Active?", true).unwrap());
    }

    #[test]
    fn test_input_validated_reprompts() {
        let mut prompter = ScriptedPrompter::new(["", "  ", "A1"]);
        let answer = input_required(&mut prompter, "Enter the Account UID:", "Account UID").unwrap();
        assert_eq!(answer, "A1");
        assert!(prompter
            .transcript
            .iter()
            .any(|line| line.contains("Account UID is required")));
    }

    #[test]
    fn test_scripted_prompter_runs_dry() {
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert!(matches!(
            prompter.confirm("Is Active?", true),
            Err(OutsetaError::Interrupted)
        ));
    }
}
