//! The closed set of comparison operators.

use std::fmt;

/// Comparison operators accepted in filters and join steps.
///
/// Operator names are matched against this fixed table only; nothing is
/// looked up dynamically, so no other store operator can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// Null-safe equality.
    Eq,
    /// Null-safe inequality.
    Ne,
    /// Membership in a list.
    In,
    /// Non-membership in a list.
    NotIn,
    /// SQL `LIKE` pattern match.
    Like,
    /// Negated pattern match.
    Unlike,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl CompareOp {
    /// Every operator, in canonical order.
    pub const ALL: [CompareOp; 10] = [
        CompareOp::Eq,
        CompareOp::Ne,
        CompareOp::In,
        CompareOp::NotIn,
        CompareOp::Like,
        CompareOp::Unlike,
        CompareOp::Lt,
        CompareOp::Le,
        CompareOp::Gt,
        CompareOp::Ge,
    ];

    /// Look up an operator by its request name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(CompareOp::Eq),
            "ne" => Some(CompareOp::Ne),
            "in" => Some(CompareOp::In),
            "not_in" => Some(CompareOp::NotIn),
            "like" => Some(CompareOp::Like),
            "unlike" => Some(CompareOp::Unlike),
            "lt" => Some(CompareOp::Lt),
            "le" => Some(CompareOp::Le),
            "gt" => Some(CompareOp::Gt),
            "ge" => Some(CompareOp::Ge),
            _ => None,
        }
    }

    /// The operator's request name.
    pub fn name(&self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::In => "in",
            CompareOp::NotIn => "not_in",
            CompareOp::Like => "like",
            CompareOp::Unlike => "unlike",
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
        }
    }

    /// SQL operator text.
    pub fn sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "IS",
            CompareOp::Ne => "IS NOT",
            CompareOp::In => "IN",
            CompareOp::NotIn => "NOT IN",
            CompareOp::Like => "LIKE",
            CompareOp::Unlike => "NOT LIKE",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Whether the right-hand side is a list of values.
    pub fn takes_list(&self) -> bool {
        matches!(self, CompareOp::In | CompareOp::NotIn)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for op in CompareOp::ALL {
            assert_eq!(CompareOp::parse(op.name()), Some(op));
        }
    }

    #[test]
    fn test_unknown_names_rejected() {
        assert_eq!(CompareOp::parse("is"), None);
        assert_eq!(CompareOp::parse("__eq__"), None);
        assert_eq!(CompareOp::parse("EQ"), None);
        assert_eq!(CompareOp::parse("or"), None);
    }
}
