//! Declarative validation rules for commands.
//!
//! A [`Validator`] is a list of [`Rule`]s. Each rule names the field it guards,
//! the condition that must hold and the message shown when it does not.
//! Running the validator collects every failure into one `Validation` error,
//! keyed by field in the error metadata.

use chrono::NaiveDate;

use crate::{EngineError, MoneyCents, ResultEngine, money::MAX_AMOUNT};

pub const MAX_DESCRIPTION_LEN: usize = 200;
pub const MAX_CATEGORY_NAME_LEN: usize = 50;

type Check<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

pub struct Rule<T> {
    field: &'static str,
    check: Check<T>,
    message: String,
}

impl<T> Rule<T> {
    /// `check` returns `true` when the value is valid.
    pub fn new(
        field: &'static str,
        message: impl Into<String>,
        check: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            field,
            check: Box::new(check),
            message: message.into(),
        }
    }
}

pub struct Validator<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Default for Validator<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> Validator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rule(mut self, rule: Rule<T>) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn ensure(
        self,
        field: &'static str,
        message: impl Into<String>,
        check: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.rule(Rule::new(field, message, check))
    }

    /// Run all rules. The first message per field wins.
    pub fn validate(&self, value: &T) -> ResultEngine<()> {
        let mut error: Option<EngineError> = None;
        for rule in &self.rules {
            if (rule.check)(value) {
                continue;
            }
            let err = error.get_or_insert_with(|| {
                EngineError::validation("Validation.Failed", "one or more fields are invalid")
            });
            err.metadata
                .entry(rule.field.to_string())
                .or_insert_with(|| rule.message.clone());
        }
        match error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub fn amount_in_bounds(amount: MoneyCents) -> bool {
    !amount.is_negative() && amount <= MAX_AMOUNT
}

pub fn amount_message() -> String {
    format!("amount must be between 0.00 and {MAX_AMOUNT}")
}

pub fn description_fits(description: &Option<String>) -> bool {
    description
        .as_deref()
        .is_none_or(|d| d.chars().count() <= MAX_DESCRIPTION_LEN)
}

pub fn description_message() -> String {
    format!("description must be at most {MAX_DESCRIPTION_LEN} characters")
}

pub fn category_name_fits(name: &str) -> bool {
    let len = name.trim().chars().count();
    (1..=MAX_CATEGORY_NAME_LEN).contains(&len)
}

pub fn category_name_message() -> String {
    format!("name must be between 1 and {MAX_CATEGORY_NAME_LEN} characters")
}

/// Dates far outside any plausible ledger are rejected.
pub fn date_is_plausible(date: NaiveDate) -> bool {
    NaiveDate::from_ymd_opt(1900, 1, 1).is_some_and(|min| date >= min)
        && NaiveDate::from_ymd_opt(2200, 12, 31).is_some_and(|max| date <= max)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Draft {
        amount: MoneyCents,
        description: Option<String>,
    }

    fn draft_validator() -> Validator<Draft> {
        Validator::new()
            .ensure("amount", amount_message(), |d: &Draft| amount_in_bounds(d.amount))
            .ensure("description", description_message(), |d: &Draft| {
                description_fits(&d.description)
            })
    }

    #[test]
    fn valid_value_passes() {
        let draft = Draft {
            amount: MoneyCents::new(100),
            description: Some("coffee".into()),
        };
        assert!(draft_validator().validate(&draft).is_ok());
    }

    #[test]
    fn every_failing_field_is_reported() {
        let draft = Draft {
            amount: MoneyCents::new(-1),
            description: Some("x".repeat(MAX_DESCRIPTION_LEN + 1)),
        };
        let err = draft_validator().validate(&draft).unwrap_err();
        assert_eq!(err.code, "Validation.Failed");
        assert_eq!(err.metadata.len(), 2);
        assert!(err.metadata.contains_key("amount"));
        assert!(err.metadata.contains_key("description"));
    }

    #[test]
    fn amount_upper_bound_is_inclusive() {
        assert!(amount_in_bounds(MAX_AMOUNT));
        assert!(!amount_in_bounds(MAX_AMOUNT + MoneyCents::new(1)));
        assert!(amount_in_bounds(MoneyCents::ZERO));
    }

    #[test]
    fn category_names_are_trimmed_before_counting() {
        assert!(!category_name_fits("   "));
        assert!(category_name_fits("  Food "));
        assert!(!category_name_fits(&"a".repeat(MAX_CATEGORY_NAME_LEN + 1)));
    }
}
