//! Declarative payload schemas.
//!
//! A [`Schema`] is plain `const` data: a list of fields, each with the rules it
//! must satisfy. Validation first resolves the JSON payload into a per-field
//! view, then evaluates every rule against that view. Nothing is built or
//! mutated per request.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// A single constraint on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Must be present and non-empty.
    Required,
    /// Non-empty text must look like an email address.
    Email,
    /// Present text must have at least this many characters.
    MinLength(usize),
    /// Behaves as `Required` when the named field is set.
    RequiredWhen(&'static str),
    /// Must equal the named field when that field is set.
    MatchesWhen(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rules: &'static [Rule],
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [FieldSpec],
}

/// Identifies the rule a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub rule: &'static str,
}

impl Violation {
    fn new(field: &'static str, rule: &'static str) -> Self {
        Self { field, rule }
    }
}

pub const REGISTER_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec { name: "name", rules: &[Rule::Required] },
        FieldSpec { name: "email", rules: &[Rule::Required, Rule::Email] },
        FieldSpec { name: "password", rules: &[Rule::Required, Rule::MinLength(6)] },
    ],
};

pub const UPDATE_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec { name: "name", rules: &[] },
        FieldSpec { name: "email", rules: &[Rule::Email] },
        FieldSpec { name: "oldPassword", rules: &[Rule::MinLength(6)] },
        FieldSpec {
            name: "password",
            rules: &[Rule::MinLength(6), Rule::RequiredWhen("oldPassword")],
        },
        FieldSpec {
            name: "confirmPassword",
            rules: &[Rule::RequiredWhen("password"), Rule::MatchesWhen("password")],
        },
    ],
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved<'a> {
    Absent,
    Text(&'a str),
    Mistyped,
}

impl<'a> Resolved<'a> {
    fn of(value: Option<&'a Value>) -> Self {
        match value {
            None => Resolved::Absent,
            Some(Value::String(s)) => Resolved::Text(s),
            Some(_) => Resolved::Mistyped,
        }
    }

    fn set(self) -> Option<&'a str> {
        match self {
            Resolved::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// Field values that passed validation, keyed by field name.
#[derive(Debug, Default)]
pub struct Validated {
    values: HashMap<&'static str, String>,
}

impl Validated {
    /// Removes and returns the value of `field`, if it was submitted.
    pub fn take(&mut self, field: &str) -> Option<String> {
        self.values.remove(field)
    }
}

impl Schema {
    pub fn validate(&self, payload: &Value) -> Result<Validated, Vec<Violation>> {
        let Some(object) = payload.as_object() else {
            return Err(vec![Violation::new("$", "object")]);
        };

        let view: HashMap<&'static str, Resolved<'_>> = self
            .fields
            .iter()
            .map(|f| (f.name, Resolved::of(object.get(f.name))))
            .collect();
        let lookup = |name: &str| view.get(name).copied().unwrap_or(Resolved::Absent);

        let mut violations = Vec::new();
        for field in self.fields {
            let value = lookup(field.name);
            if value == Resolved::Mistyped {
                violations.push(Violation::new(field.name, "string"));
                continue;
            }
            for rule in field.rules {
                if let Some(v) = check(field.name, *rule, value, &lookup) {
                    violations.push(v);
                }
            }
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        let values = view
            .into_iter()
            .filter_map(|(name, v)| match v {
                Resolved::Text(s) => Some((name, s.to_owned())),
                _ => None,
            })
            .collect();
        Ok(Validated { values })
    }
}

fn check<'a>(
    field: &'static str,
    rule: Rule,
    value: Resolved<'a>,
    lookup: &dyn Fn(&str) -> Resolved<'a>,
) -> Option<Violation> {
    let failed = match rule {
        Rule::Required => value.set().is_none(),
        Rule::Email => value.set().is_some_and(|s| !is_valid_email(s)),
        Rule::MinLength(min) => matches!(value, Resolved::Text(s) if s.chars().count() < min),
        Rule::RequiredWhen(other) => lookup(other).set().is_some() && value.set().is_none(),
        Rule::MatchesWhen(other) => match (lookup(other).set(), value) {
            (Some(expected), Resolved::Text(s)) => s != expected,
            _ => false,
        },
    };
    failed.then(|| Violation::new(field, rule_name(rule)))
}

fn rule_name(rule: Rule) -> &'static str {
    match rule {
        Rule::Required | Rule::RequiredWhen(_) => "required",
        Rule::Email => "email",
        Rule::MinLength(_) => "min",
        Rule::MatchesWhen(_) => "matches",
    }
}
