//! # Validation Expression Engine
//!
//! ## Purpose
//!
//! Named-rule validation with a boolean expression language over rule
//! names: `!` (NOT, unary, highest precedence), `&` (AND), `|` (OR,
//! lowest precedence), no grouping. Rules resolve through three tiers -
//! envelope-local definitions, envelope-global definitions, then the
//! persistent registry - and the first tier that knows the name wins,
//! remaining tiers unconsulted. That contract lets one envelope override
//! a shared rule without mutating shared state.
//!
//! An unknown rule name is a configuration bug and raises at any tier;
//! it never evaluates to a silent `false`.

use crate::error::ValidationError;
use crate::registry::TytxRegistry;
use regex::Regex;
use std::collections::HashMap;
use tytx_types::ValidationDef;

/// Apply one rule definition to a value
///
/// All constraints present on the definition are ANDed; an empty
/// definition always passes.
pub fn check_def(rule: &str, def: &ValidationDef, value: &str) -> Result<bool, ValidationError> {
    if let Some(pattern) = &def.pattern {
        let re = Regex::new(pattern).map_err(|e| ValidationError::BadPattern {
            rule: rule.to_string(),
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        if !re.is_match(value) {
            return Ok(false);
        }
    }
    let chars = value.chars().count();
    if let Some(len) = def.len {
        if chars != len {
            return Ok(false);
        }
    }
    if let Some(min) = def.min {
        if chars < min {
            return Ok(false);
        }
    }
    if let Some(max) = def.max {
        if chars > max {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Rule tables for one validation call
#[derive(Clone, Copy, Default)]
pub struct RuleTiers<'a> {
    /// Envelope-local rules, highest priority
    pub local: Option<&'a HashMap<String, ValidationDef>>,
    /// Envelope-global rules, consulted second
    pub global: Option<&'a HashMap<String, ValidationDef>>,
}

fn resolve(
    name: &str,
    tiers: RuleTiers<'_>,
    registry: &TytxRegistry,
) -> Result<ValidationDef, ValidationError> {
    if let Some(def) = tiers.local.and_then(|t| t.get(name)) {
        return Ok(def.clone());
    }
    if let Some(def) = tiers.global.and_then(|t| t.get(name)) {
        return Ok(def.clone());
    }
    registry
        .get_validation(name)
        .ok_or_else(|| ValidationError::UnknownRule {
            name: name.to_string(),
        })
}

/// Validate a value against one named rule
pub fn validate(
    registry: &TytxRegistry,
    value: &str,
    name: &str,
    tiers: RuleTiers<'_>,
) -> Result<bool, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyExpression);
    }
    let def = resolve(name, tiers, registry)?;
    check_def(name, &def, value)
}

/// Evaluate a boolean expression over rule names
///
/// Splits on `|` first (so OR binds loosest), then on `&`, then strips a
/// leading `!`. Every operand is evaluated - no short circuit - so an
/// unknown rule raises regardless of where it sits in the expression.
pub fn validate_expression(
    registry: &TytxRegistry,
    value: &str,
    expr: &str,
    tiers: RuleTiers<'_>,
) -> Result<bool, ValidationError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(ValidationError::EmptyExpression);
    }
    if expr.contains('|') {
        let mut result = false;
        for part in expr.split('|') {
            result = validate_expression(registry, value, part, tiers)? || result;
        }
        return Ok(result);
    }
    if expr.contains('&') {
        let mut result = true;
        for part in expr.split('&') {
            result = validate_expression(registry, value, part, tiers)? && result;
        }
        return Ok(result);
    }
    if let Some(rest) = expr.strip_prefix('!') {
        return Ok(!validate_expression(registry, value, rest, tiers)?);
    }
    validate(registry, value, expr, tiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_rules() -> TytxRegistry {
        let registry = TytxRegistry::new();
        registry.register_validation("upper", ValidationDef::pattern("^[A-Z]+$"));
        registry.register_validation("lower", ValidationDef::pattern("^[a-z]+$"));
        registry.register_validation("len3", ValidationDef::exact_len(3));
        registry
    }

    #[test]
    fn test_anded_constraints() {
        let def = ValidationDef {
            pattern: Some("^[a-z]+$".to_string()),
            min: Some(2),
            max: Some(4),
            ..ValidationDef::default()
        };
        assert!(check_def("r", &def, "abc").unwrap());
        assert!(!check_def("r", &def, "a").unwrap());
        assert!(!check_def("r", &def, "abcde").unwrap());
        assert!(!check_def("r", &def, "ABC").unwrap());
    }

    #[test]
    fn test_empty_def_always_passes() {
        assert!(check_def("r", &ValidationDef::default(), "anything").unwrap());
    }

    #[test]
    fn test_or_binds_loosest() {
        let registry = registry_with_rules();
        // false OR (true AND true) = true
        assert!(validate_expression(
            &registry,
            "abc",
            "upper|lower&len3",
            RuleTiers::default()
        )
        .unwrap());
    }

    #[test]
    fn test_not_is_unary_highest() {
        let registry = registry_with_rules();
        assert!(
            validate_expression(&registry, "abc", "!upper", RuleTiers::default()).unwrap()
        );
        assert!(
            !validate_expression(&registry, "abc", "!lower&len3", RuleTiers::default()).unwrap()
        );
    }

    #[test]
    fn test_whitespace_tolerated() {
        let registry = registry_with_rules();
        assert!(validate_expression(
            &registry,
            "abc",
            " upper | lower & len3 ",
            RuleTiers::default()
        )
        .unwrap());
    }

    #[test]
    fn test_unknown_rule_raises_never_false() {
        let registry = registry_with_rules();
        match validate_expression(&registry, "abc", "nope", RuleTiers::default()) {
            Err(ValidationError::UnknownRule { name }) => assert_eq!(name, "nope"),
            other => panic!("expected UnknownRule, got {other:?}"),
        }
        // Even when another operand would already decide the result
        assert!(matches!(
            validate_expression(&registry, "abc", "lower|nope", RuleTiers::default()),
            Err(ValidationError::UnknownRule { .. })
        ));
    }

    #[test]
    fn test_tier_resolution_first_match_wins() {
        let registry = registry_with_rules();
        let mut local = HashMap::new();
        // Local override: "upper" now means exactly one char
        local.insert("upper".to_string(), ValidationDef::exact_len(1));
        let tiers = RuleTiers {
            local: Some(&local),
            global: None,
        };
        assert!(validate(&registry, "z", "upper", tiers).unwrap());
        assert!(!validate(&registry, "ABC", "upper", tiers).unwrap());
        // Shared registry untouched
        assert!(validate(&registry, "ABC", "upper", RuleTiers::default()).unwrap());
    }

    #[test]
    fn test_bad_pattern_is_reported() {
        let registry = TytxRegistry::new();
        registry.register_validation("broken", ValidationDef::pattern("["));
        assert!(matches!(
            validate(&registry, "x", "broken", RuleTiers::default()),
            Err(ValidationError::BadPattern { .. })
        ));
    }
}
