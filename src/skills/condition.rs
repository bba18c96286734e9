//! Skill trigger condition grammar.
//!
//! A condition is a list of OR groups separated by `@`; each group is a list of
//! AND clauses separated by `&`; each clause is `field<op>value` with an
//! integer value. The empty string is the always-true condition.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static CLAUSE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(==|!=|>=|<=|>|<)\s*(-?\d+)\s*$")
        .expect("clause pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("malformed clause '{clause}' in condition '{condition}'")]
    MalformedClause { clause: String, condition: String },
    #[error("empty clause in condition '{0}'")]
    EmptyClause(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl CompareOp {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub field: String,
    pub op: CompareOp,
    pub value: i64,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.op.as_str(), self.value)
    }
}

/// Parsed condition: OR over groups, AND within a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Condition {
    pub groups: Vec<Vec<Clause>>,
}

impl Condition {
    pub fn parse(raw: &str) -> Result<Self, ConditionError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let pattern = &*CLAUSE_PATTERN;

        let mut groups = Vec::new();
        for group in raw.split('@') {
            let mut clauses = Vec::new();
            for clause in group.split('&') {
                if clause.trim().is_empty() {
                    return Err(ConditionError::EmptyClause(raw.to_string()));
                }
                let malformed = || ConditionError::MalformedClause {
                    clause: clause.trim().to_string(),
                    condition: raw.to_string(),
                };
                let captures = pattern.captures(clause).ok_or_else(malformed)?;
                let op = CompareOp::parse(&captures[2]).ok_or_else(malformed)?;
                let value = captures[3].parse::<i64>().map_err(|_| malformed())?;
                clauses.push(Clause {
                    field: captures[1].to_string(),
                    op,
                    value,
                });
            }
            groups.push(clauses);
        }
        Ok(Self { groups })
    }

    pub fn is_always(&self) -> bool {
        self.groups.is_empty()
    }

    /// Value of the first non-zero `field==n` clause, else 0.
    pub fn trigger_value(&self, field: &str) -> i64 {
        self.groups
            .iter()
            .flatten()
            .find(|clause| clause.field == field && clause.op == CompareOp::Eq && clause.value != 0)
            .map(|clause| clause.value)
            .unwrap_or(0)
    }
}

/// Trigger value for `field`, treating unparseable conditions as untriggered.
pub fn trigger_value(raw: &str, field: &str) -> i64 {
    Condition::parse(raw)
        .map(|condition| condition.trigger_value(field))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clause_pattern_compiles() {
        let captures = CLAUSE_PATTERN.captures(" order_rate <= -50 ").expect("matches");
        assert_eq!(&captures[1], "order_rate");
        assert_eq!(&captures[3], "-50");
    }

    #[test]
    fn empty_condition_is_always_true() {
        let condition = Condition::parse("  ").expect("empty parses");
        assert!(condition.is_always());
    }

    #[test]
    fn parses_or_groups_of_and_clauses() {
        let condition =
            Condition::parse("distance_type==4&phase>=2@running_style==1").expect("parses");
        assert_eq!(condition.groups.len(), 2);
        assert_eq!(condition.groups[0].len(), 2);
        assert_eq!(condition.groups[0][1].op, CompareOp::Ge);
        assert_eq!(condition.groups[1][0].to_string(), "running_style==1");
    }

    #[test]
    fn rejects_malformed_clauses() {
        assert!(matches!(
            Condition::parse("phase~2"),
            Err(ConditionError::MalformedClause { .. })
        ));
        assert!(matches!(
            Condition::parse("phase==2&"),
            Err(ConditionError::EmptyClause(_))
        ));
        assert!(Condition::parse("phase==high").is_err());
    }

    #[test]
    fn trigger_value_reads_first_equality_clause() {
        assert_eq!(trigger_value("phase>=2&running_style==3", "running_style"), 3);
        assert_eq!(trigger_value("running_style!=3", "running_style"), 0);
        assert_eq!(trigger_value("phase==1@distance_type==2", "distance_type"), 2);
        assert_eq!(trigger_value("broken&&", "distance_type"), 0);
    }
}
