//! Variable substitution engine for templates
//!
//! Placeholders have the form `{{identifier}}` where the identifier is one or
//! more word characters. Substitution is a single left-to-right pass over the
//! text: substituted values are never scanned again, and tokens with no value
//! are kept verbatim.

use std::collections::{BTreeSet, HashMap};

use chrono::{Local, NaiveDate};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{\{(\w+)\}\}").unwrap();
}

/// Identity of the user a template is resolved for
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

impl<'a> ResolveContext<'a> {
    pub fn new(name: &'a str, email: &'a str) -> Self {
        Self { name, email }
    }
}

/// Values derived without caller input: `name`, `email` and today's `date`
pub fn auto_fill_variables(ctx: &ResolveContext<'_>, today: NaiveDate) -> HashMap<String, String> {
    HashMap::from([
        ("name".to_string(), ctx.name.to_string()),
        ("email".to_string(), ctx.email.to_string()),
        ("date".to_string(), today.format("%Y-%m-%d").to_string()),
    ])
}

/// Resolve placeholders in `text` using today's local date
pub fn resolve(text: &str, overrides: &HashMap<String, String>, ctx: &ResolveContext<'_>) -> String {
    resolve_on(text, overrides, ctx, Local::now().date_naive())
}

/// Resolve placeholders in `text` as of `today`.
///
/// Caller-supplied `overrides` win over auto-filled values for the same key.
pub fn resolve_on(
    text: &str,
    overrides: &HashMap<String, String>,
    ctx: &ResolveContext<'_>,
    today: NaiveDate,
) -> String {
    let mut variables = auto_fill_variables(ctx, today);
    variables.extend(
        overrides
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    PLACEHOLDER_REGEX
        .replace_all(text, |caps: &Captures<'_>| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Distinct placeholder names appearing in `text`
pub fn extract_placeholders(text: &str) -> BTreeSet<String> {
    PLACEHOLDER_REGEX
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Placeholder names of a subject/body pair, sorted and de-duplicated
pub fn template_variables(subject: &str, body: &str) -> Vec<String> {
    let mut names = extract_placeholders(subject);
    names.extend(extract_placeholders(body));
    names.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ResolveContext<'static> {
        ResolveContext::new("Asha", "asha@example.com")
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_auto_fill_values() {
        let result = resolve_on("{{name}} <{{email}}> on {{date}}", &HashMap::new(), &ctx(), day());
        assert_eq!(result, "Asha <asha@example.com> on 2024-03-09");
    }

    #[test]
    fn test_override_wins_over_auto_fill() {
        let overrides = HashMap::from([("name".to_string(), "Warden".to_string())]);
        let result = resolve_on("Dear {{name}}", &overrides, &ctx(), day());
        assert_eq!(result, "Dear Warden");
    }

    #[test]
    fn test_unknown_placeholder_left_verbatim() {
        let overrides = HashMap::from([("reason".to_string(), "fever".to_string())]);
        let result = resolve_on(
            "Reason: {{reason}}, from {{from_date}}",
            &overrides,
            &ctx(),
            day(),
        );
        assert_eq!(result, "Reason: fever, from {{from_date}}");
    }

    #[test]
    fn test_text_without_tokens_is_unchanged() {
        let text = "Plain text with { braces } and {{ spaced }} and {single}";
        assert_eq!(resolve_on(text, &HashMap::new(), &ctx(), day()), text);
    }

    #[test]
    fn test_no_recursive_substitution() {
        let overrides = HashMap::from([
            ("a".to_string(), "{{b}}".to_string()),
            ("b".to_string(), "second".to_string()),
        ]);
        assert_eq!(resolve_on("{{a}}", &overrides, &ctx(), day()), "{{b}}");
    }

    #[test]
    fn test_repeated_tokens_all_replaced() {
        let result = resolve_on("{{name}}, {{name}}!", &HashMap::new(), &ctx(), day());
        assert_eq!(result, "Asha, Asha!");
    }

    #[test]
    fn test_extract_collapses_duplicates() {
        let names = extract_placeholders("{{a}} {{b}} {{a}}");
        assert_eq!(names.len(), 2);
        assert!(names.contains("a"));
        assert!(names.contains("b"));
    }

    #[test]
    fn test_extract_ignores_malformed_tokens() {
        let names = extract_placeholders("{{ a }} {{b-c}} {b} {{ok_1}}");
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["ok_1".to_string()]);
    }

    #[test]
    fn test_template_variables_union() {
        let vars = template_variables("Leave - {{date}}", "I, {{name}}, on {{date}}");
        assert_eq!(vars, vec!["date".to_string(), "name".to_string()]);
    }
}
