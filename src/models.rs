use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use url::Url;

use crate::error::{HomeFinanceError, Result};

/// A named grouping for entries and budgets. An `id` of 0 means the
/// category has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub description: String,
}

impl Category {
    pub fn new(description: &str) -> Result<Self> {
        Self::with_id(0, description)
    }

    pub fn with_id(id: i64, description: &str) -> Result<Self> {
        if description.trim().is_empty() {
            return Err(HomeFinanceError::InvalidCategory(
                "description must not be empty".into(),
            ));
        }
        Ok(Self {
            id,
            description: description.to_string(),
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.id, self.description)
    }
}

/// Planned versus actual spending for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: i64,
    pub category: Category,
    pub budget_amount: f64,
    pub actual_amount: f64,
}

impl Budget {
    pub fn new(id: i64, category: Category, budget_amount: f64, actual_amount: f64) -> Result<Self> {
        if budget_amount < 0.0 {
            return Err(HomeFinanceError::InvalidBudget(
                "budget amount cannot be negative".into(),
            ));
        }
        if id < 0 {
            return Err(HomeFinanceError::InvalidBudget("id cannot be negative".into()));
        }
        Ok(Self {
            id,
            category,
            budget_amount,
            actual_amount,
        })
    }

    /// A zero budget for `category`, not yet stored.
    pub fn for_category(category: Category) -> Self {
        Self {
            id: 0,
            category,
            budget_amount: 0.0,
            actual_amount: 0.0,
        }
    }

    pub fn category_id(&self) -> i64 {
        self.category.id
    }

    pub fn category_description(&self) -> &str {
        &self.category.description
    }

    pub fn set_budget_amount(&mut self, amount: f64) -> Result<()> {
        if amount < 0.0 {
            return Err(HomeFinanceError::InvalidBudget(
                "budget amount cannot be negative".into(),
            ));
        }
        self.budget_amount = amount;
        Ok(())
    }

    pub fn add_to_actual(&mut self, amount: f64) {
        self.actual_amount += amount;
    }

    pub fn remaining(&self) -> f64 {
        self.budget_amount - self.actual_amount
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Budget for: {}", self.category.description)
    }
}

/// Discriminator stored in the `entry.type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Money going into the account, usually deposits.
    In,
    /// Money going out of the account, usually bills.
    Out,
    /// Balance carried forward from last month.
    Balance,
}

impl EntryType {
    pub const ALL: [EntryType; 3] = [EntryType::In, EntryType::Out, EntryType::Balance];

    pub fn tag(&self) -> &'static str {
        match self {
            EntryType::In => "in",
            EntryType::Out => "out",
            EntryType::Balance => "balance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntryType::In => "Deposit",
            EntryType::Out => "Expense",
            EntryType::Balance => "Balance forward",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for EntryType {
    type Err = HomeFinanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "in" => Ok(EntryType::In),
            "out" => Ok(EntryType::Out),
            "balance" | "bal" => Ok(EntryType::Balance),
            other => Err(HomeFinanceError::UnknownEntryType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: i64,
    pub entry_type: EntryType,
    pub description: String,
    pub recurring: bool,
    pub amount: f64,
    pub comment: String,
    pub url: Option<Url>,
    /// Paid (or, for deposits, cleared by the bank). Drives the available balance.
    pub paid: bool,
    pub date: NaiveDate,
    pub reconciled: bool,
    pub category: Option<Category>,
}

impl Entry {
    pub fn builder(entry_type: EntryType) -> EntryBuilder {
        EntryBuilder::new(entry_type)
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().map(|c| c.id)
    }

    pub fn category_description(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.description.as_str())
            .unwrap_or("")
    }

    /// Amount as it affects the account: expenses are negative.
    pub fn signed_amount(&self) -> f64 {
        match self.entry_type {
            EntryType::Out => -self.amount,
            EntryType::In | EntryType::Balance => self.amount,
        }
    }
}

pub struct EntryBuilder {
    entry: Entry,
}

impl EntryBuilder {
    fn new(entry_type: EntryType) -> Self {
        Self {
            entry: Entry {
                id: 0,
                entry_type,
                description: String::new(),
                recurring: false,
                amount: 0.0,
                comment: String::new(),
                url: None,
                paid: false,
                date: chrono::Local::now().date_naive(),
                reconciled: false,
                category: None,
            },
        }
    }

    pub fn id(mut self, id: i64) -> Self {
        self.entry.id = id;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.entry.description = description.into();
        self
    }

    pub fn recurring(mut self, recurring: bool) -> Self {
        self.entry.recurring = recurring;
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.entry.amount = amount;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.entry.comment = comment.into();
        self
    }

    pub fn url(mut self, url: Option<Url>) -> Self {
        self.entry.url = url;
        self
    }

    pub fn paid(mut self, paid: bool) -> Self {
        self.entry.paid = paid;
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.entry.date = date;
        self
    }

    pub fn reconciled(mut self, reconciled: bool) -> Self {
        self.entry.reconciled = reconciled;
        self
    }

    pub fn category(mut self, category: Option<Category>) -> Self {
        self.entry.category = category;
        self
    }

    pub fn build(self) -> Entry {
        self.entry
    }
}
