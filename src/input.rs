//! Argument and prompt validation, and the interactive prompt sequence.

use crate::core::rates::CurrencyCatalog;
use chrono::{Local, NaiveDate};
use console::style;
use std::io::{self, BufRead, Write};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Typing this at any prompt ends the whole session.
const SENTINEL: &str = "end";

/// Parses the CLI date argument. The rate API only serves historical data,
/// so the date must be well-formed and strictly in the past.
pub fn parse_past_date(text: &str) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|_| format!("not a valid date: {text:?}; expected format YYYY-MM-DD"))?;
    if date >= Local::now().date_naive() {
        return Err(format!(
            "not a valid date: {text:?}; the date must be in the past"
        ));
    }
    Ok(date)
}

/// One or more digits, optionally followed by a point and one or two
/// digits. No sign, no exponent, no separators.
pub fn is_valid_monetary_value(text: &str) -> bool {
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text, None),
    };
    if integer.is_empty() || !integer.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match fraction {
        None => true,
        Some(f) => !f.is_empty() && f.len() <= 2 && f.bytes().all(|b| b.is_ascii_digit()),
    }
}

/// Case-insensitive membership test against the catalog keys.
pub fn is_known_currency(code: &str, catalog: &CurrencyCatalog) -> bool {
    catalog.contains_key(&code.to_uppercase())
}

/// A fully validated conversion request. Currency codes are uppercased.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: String,
    pub source: String,
    pub target: String,
}

/// What one pass of the prompt sequence produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptOutcome {
    Request(ConversionRequest),
    End,
}

/// Interactive three-stage prompt: amount, then source code, then target
/// code. Each stage repeats until its input validates; the sentinel (any
/// case) or end-of-input at any stage ends the whole session.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn report(&mut self, line: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    pub fn read_request(&mut self, catalog: &CurrencyCatalog) -> io::Result<PromptOutcome> {
        let Some(amount) = self.ask_until(
            "Enter a monetary value (up to two decimal places): ",
            |entry| {
                if is_valid_monetary_value(entry) {
                    Ok(entry.to_string())
                } else {
                    Err("Invalid monetary value. Please try again.")
                }
            },
        )?
        else {
            return Ok(PromptOutcome::End);
        };
        self.report(format!("Valid monetary value: {amount}"))?;

        let prompt = "Enter the source currency code (ISO 4217 format): ";
        let Some(source) = self.ask_currency(prompt, catalog)? else {
            return Ok(PromptOutcome::End);
        };
        self.report(format!("Valid source currency code: {source}"))?;

        let prompt = "Enter the target currency code (ISO 4217 format): ";
        let Some(target) = self.ask_currency(prompt, catalog)? else {
            return Ok(PromptOutcome::End);
        };
        self.report(format!("Valid target currency code: {target}"))?;

        Ok(PromptOutcome::Request(ConversionRequest {
            amount,
            source,
            target,
        }))
    }

    fn ask_currency(
        &mut self,
        prompt: &str,
        catalog: &CurrencyCatalog,
    ) -> io::Result<Option<String>> {
        self.ask_until(prompt, |entry| {
            if is_known_currency(entry, catalog) {
                Ok(entry.to_uppercase())
            } else {
                Err("Invalid currency code. Please try again.")
            }
        })
    }

    /// Repeats `prompt` until `validate` accepts the entry. `None` means
    /// the session is over.
    fn ask_until<T>(
        &mut self,
        prompt: &str,
        validate: impl Fn(&str) -> Result<T, &'static str>,
    ) -> io::Result<Option<T>> {
        loop {
            let Some(entry) = self.ask(prompt)? else {
                return Ok(None);
            };
            match validate(&entry) {
                Ok(value) => return Ok(Some(value)),
                Err(message) => self.report(style(message).red())?,
            }
        }
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            // EOF behaves like the sentinel so piped input ends cleanly.
            return Ok(None);
        }
        let entry = line.trim().to_string();
        if entry.eq_ignore_ascii_case(SENTINEL) {
            return Ok(None);
        }
        Ok(Some(entry))
    }
}
