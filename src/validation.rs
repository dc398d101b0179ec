//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy maps violations to actions.

use serde::{Deserialize, Serialize};

use crate::templates::TemplateVars;

pub const DEFAULT_MAX_RECURSION: i64 = 16;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    #[default]
    Block,
    Warn,
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ValidationPolicy {
    #[serde(default)]
    pub failure_mode: FailureMode,
    #[serde(default = "default_max_recursion")]
    pub max_recursion: i64,
}

fn default_max_recursion() -> i64 { DEFAULT_MAX_RECURSION }

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            failure_mode: FailureMode::Block,
            max_recursion: DEFAULT_MAX_RECURSION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn success(violations: Vec<ValidationViolation>) -> Self {
        Self { valid: true, violations }
    }

    pub fn failure(violations: Vec<ValidationViolation>) -> Self {
        Self { valid: false, violations }
    }

    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    /// One line per violation, `rule: message`
    pub fn summary(&self) -> String {
        self.violations.iter()
            .map(|v| format!("{}: {}", v.rule, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, input: &TemplateVars, policy: &ValidationPolicy) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

/// `version` is inserted verbatim into a JSON string literal, so anything
/// that would need escaping breaks the document.
pub struct JsonSafeVersionRule;

impl ValidationRule for JsonSafeVersionRule {
    fn name(&self) -> &'static str { "json_safe_version" }

    fn validate(&self, input: &TemplateVars, _policy: &ValidationPolicy) -> Vec<ValidationViolation> {
        if input.version.is_empty() {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Version is empty".to_string(),
                expected: Some("non-empty version string".to_string()),
                actual: Some(String::new()),
                remediation: vec!["Pass a version such as 1.2.3".to_string()],
            }];
        }

        let unsafe_chars: Vec<String> = input.version.chars()
            .filter(|c| *c == '"' || *c == '\\' || c.is_control())
            .map(|c| format!("{:?}", c))
            .collect();

        if unsafe_chars.is_empty() {
            vec![]
        } else {
            vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Version contains characters that need JSON escaping".to_string(),
                expected: Some("no quotes, backslashes or control characters".to_string()),
                actual: Some(unsafe_chars.join(", ")),
                remediation: vec!["Remove quotes, backslashes and control characters from the version".to_string()],
            }]
        }
    }
}

pub struct SemverVersionRule;

impl ValidationRule for SemverVersionRule {
    fn name(&self) -> &'static str { "semver_version" }

    fn validate(&self, input: &TemplateVars, _policy: &ValidationPolicy) -> Vec<ValidationViolation> {
        match semver::Version::parse(&input.version) {
            Ok(_) => vec![],
            Err(e) => vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: format!("Version is not a semantic version: {}", e),
                expected: Some("MAJOR.MINOR.PATCH".to_string()),
                actual: Some(input.version.clone()),
                remediation: vec!["Marketplace tooling expects semantic versions".to_string()],
            }],
        }
    }
}

pub struct RecursionDepthRule;

impl ValidationRule for RecursionDepthRule {
    fn name(&self) -> &'static str { "recursion_depth" }

    fn validate(&self, input: &TemplateVars, policy: &ValidationPolicy) -> Vec<ValidationViolation> {
        if input.nb_recurse < 0 {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Recursion count is negative".to_string(),
                expected: Some(">= 0".to_string()),
                actual: Some(input.nb_recurse.to_string()),
                remediation: vec!["Pass 0 for a flat regex schema".to_string()],
            }];
        }

        if input.nb_recurse > policy.max_recursion {
            vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: "Recursion count is unusually deep".to_string(),
                expected: Some(format!("<= {}", policy.max_recursion)),
                actual: Some(input.nb_recurse.to_string()),
                remediation: vec!["Raise max_recursion in the config if this is intended".to_string()],
            }]
        } else {
            vec![]
        }
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
    policy: ValidationPolicy,
}

impl Validator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            rules: vec![
                Box::new(JsonSafeVersionRule),
                Box::new(SemverVersionRule),
                Box::new(RecursionDepthRule),
            ],
            policy,
        }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn validate(&self, input: &TemplateVars) -> ValidationResult {
        let mut all_violations = vec![];

        for rule in &self.rules {
            let violations = rule.validate(input, &self.policy);
            all_violations.extend(violations);
        }

        for v in &all_violations {
            tracing::debug!(rule = %v.rule, severity = ?v.severity, "{}", v.message);
        }

        let has_errors = all_violations.iter()
            .any(|v| v.severity == ViolationSeverity::Error);

        match self.policy.failure_mode {
            FailureMode::Block if has_errors => {
                ValidationResult::failure(all_violations)
            }
            FailureMode::Block | FailureMode::Warn => {
                ValidationResult::success(all_violations)
            }
            FailureMode::Log => {
                // Recorded in the log only
                ValidationResult::success(vec![])
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationPolicy::default())
    }
}
