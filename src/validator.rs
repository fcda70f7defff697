use chrono::NaiveDate;
use url::Url;

pub const DATE_ERROR_MESSAGE: &str = "Invalid date, enter in the form YYYY-MM-DD";
pub const AMOUNT_ERROR_MESSAGE: &str = "Invalid amount: enter a non-negative number";
pub const URL_ERROR_MESSAGE: &str = "Invalid URL";

/// Raw text from an entry form, before any parsing.
#[derive(Debug, Clone, Default)]
pub struct EntryInput {
    pub date_text: String,
    pub amount_text: String,
    pub url_text: String,
}

impl EntryInput {
    pub fn builder() -> EntryInputBuilder {
        EntryInputBuilder::default()
    }
}

#[derive(Default)]
pub struct EntryInputBuilder {
    input: EntryInput,
}

impl EntryInputBuilder {
    pub fn date(mut self, text: &str) -> Self {
        self.input.date_text = text.to_string();
        self
    }

    pub fn amount(mut self, text: &str) -> Self {
        self.input.amount_text = text.to_string();
        self
    }

    pub fn url(mut self, text: &str) -> Self {
        self.input.url_text = text.to_string();
        self
    }

    pub fn build(self) -> EntryInput {
        self.input
    }
}

pub struct EntryValidator<'a> {
    input: &'a EntryInput,
}

impl<'a> EntryValidator<'a> {
    pub fn new(input: &'a EntryInput) -> Self {
        Self { input }
    }

    /// Every validation message that applies, in field order. Empty when
    /// the input is acceptable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if parse_date(&self.input.date_text).is_none() {
            errors.push(DATE_ERROR_MESSAGE.to_string());
        }
        if !is_valid_amount(&self.input.amount_text) {
            errors.push(AMOUNT_ERROR_MESSAGE.to_string());
        }
        if !is_valid_url(&self.input.url_text) {
            errors.push(URL_ERROR_MESSAGE.to_string());
        }
        errors
    }
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Parse an amount written with optional thousands separators (`1,234.56`).
pub fn parse_amount(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text, None),
    };
    if int_part.contains(',') {
        let groups: Vec<&str> = int_part.trim_start_matches('-').split(',').collect();
        let well_formed = !groups[0].is_empty()
            && groups[0].len() <= 3
            && groups[1..].iter().all(|g| g.len() == 3);
        if !well_formed {
            return None;
        }
    }
    if frac_part.is_some_and(|f| f.contains(',')) {
        return None;
    }
    let value: f64 = text.replace(',', "").parse().ok()?;
    value.is_finite().then_some(value)
}

/// Amount from form text, or 0.0 when it does not parse.
pub fn parse_amount_text(text: &str) -> f64 {
    parse_amount(text).unwrap_or(0.0)
}

pub fn parse_url(text: &str) -> Option<Url> {
    Url::parse(text.trim()).ok()
}

fn is_valid_amount(text: &str) -> bool {
    parse_amount(text).is_some_and(|v| v >= 0.0)
}

fn is_valid_url(text: &str) -> bool {
    text.trim().is_empty() || parse_url(text).is_some()
}
