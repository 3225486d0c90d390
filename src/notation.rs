//! Rewrites learner shorthand into the canonical text the parser reads.

use std::sync::OnceLock;

use regex::Regex;

/// One rewrite in the normalizer's ordered list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Plain substring replacement.
    Literal { from: String, to: String },
    /// `e^( ... )` with balanced parentheses becomes `exp( ... )`.
    ExpGroup,
    /// `e^token` with an alphanumeric token becomes `exp(token)`.
    ExpToken,
    /// A bare dependent name becomes an application to the independent variable.
    BareDependent { dependent: String, independent: String },
}

impl Rule {
    pub fn apply(&self, text: &str) -> String {
        match self {
            Rule::Literal { from, to } => text.replace(from.as_str(), to),
            Rule::ExpGroup => rewrite_exp_groups(text),
            Rule::ExpToken => exp_token_regex()
                .replace_all(text, "${1}exp(${2})")
                .into_owned(),
            Rule::BareDependent {
                dependent,
                independent,
            } => rewrite_bare_dependent(text, dependent, independent),
        }
    }
}

/// Ordered rewrite rules, longest marker first.
#[derive(Clone, Debug)]
pub struct Normalizer {
    rules: Vec<Rule>,
}

impl Normalizer {
    pub fn new(dependent: &str, independent: &str) -> Self {
        let derivative = |order: usize| {
            let vars = vec![independent; order].join(", ");
            format!("Derivative({dependent}({independent}), {vars})")
        };
        let literal = |from: String, to: String| Rule::Literal { from, to };
        let rules = vec![
            literal(format!("{dependent}'''"), derivative(3)),
            literal(format!("{dependent}''"), derivative(2)),
            literal(format!("{dependent}'"), derivative(1)),
            literal(format!("d²{dependent}/d{independent}²"), derivative(2)),
            literal(format!("d^2{dependent}/d{independent}^2"), derivative(2)),
            literal(format!("d{dependent}/d{independent}"), derivative(1)),
            Rule::ExpGroup,
            Rule::ExpToken,
            Rule::BareDependent {
                dependent: dependent.to_string(),
                independent: independent.to_string(),
            },
        ];
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Trims the input, then applies every rule once, in order. Never fails.
    pub fn normalize(&self, raw: &str) -> String {
        self.rules
            .iter()
            .fold(raw.trim().to_string(), |text, rule| rule.apply(&text))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::new("y", "x")
    }
}

/// Normalizes with the default `y`/`x` names.
pub fn normalize(raw: &str) -> String {
    static DEFAULT: OnceLock<Normalizer> = OnceLock::new();
    DEFAULT.get_or_init(Normalizer::default).normalize(raw)
}

fn exp_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(^|[^A-Za-z_])e\^([A-Za-z0-9]+)").expect("exponent regex must compile")
    })
}

/// Characters that make a preceding `e` or `y` part of a longer name.
fn continues_identifier(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Nested `e^(` groups rewritten before the remainder is left as typed.
const EXP_GROUP_DEPTH_LIMIT: usize = 32;

fn rewrite_exp_groups(text: &str) -> String {
    rewrite_exp_groups_within(text, 0)
}

fn rewrite_exp_groups_within(text: &str, depth: usize) -> String {
    const MARKER: &str = "e^(";
    if depth >= EXP_GROUP_DEPTH_LIMIT {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let found = rest.match_indices(MARKER).map(|(idx, _)| idx).find(|idx| {
            let prev = if *idx == 0 {
                out.chars().next_back()
            } else {
                rest[..*idx].chars().next_back()
            };
            !prev.is_some_and(continues_identifier)
        });
        let Some(pos) = found else {
            break;
        };
        let open = pos + MARKER.len() - 1;
        let Some(close) = matching_paren(&rest[open..]) else {
            break;
        };
        out.push_str(&rest[..pos]);
        out.push_str("exp(");
        let inner = &rest[open + 1..open + close];
        out.push_str(&rewrite_exp_groups_within(inner, depth + 1));
        out.push(')');
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

/// Byte offset of the parenthesis closing the one at the start of `text`.
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn rewrite_bare_dependent(text: &str, dependent: &str, independent: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(dependent) {
        let prev = if pos == 0 {
            out.chars().next_back()
        } else {
            rest[..pos].chars().next_back()
        };
        let after = &rest[pos + dependent.len()..];
        let next = after.chars().next();
        let bare = !prev.is_some_and(continues_identifier)
            && !next.is_some_and(|c| c == '(' || c == '\'' || c.is_alphabetic());
        out.push_str(&rest[..pos]);
        if bare {
            out.push_str(&format!("{dependent}({independent})"));
        } else {
            out.push_str(dependent);
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_run_longest_marker_first() {
        let normalizer = Normalizer::default();
        let froms: Vec<&str> = normalizer
            .rules()
            .iter()
            .filter_map(|rule| match rule {
                Rule::Literal { from, .. } => Some(from.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(froms[..3], ["y'''", "y''", "y'"]);
        assert!(matches!(
            normalizer.rules().last(),
            Some(Rule::BareDependent { .. })
        ));
    }

    #[test]
    fn nested_exponent_group() {
        assert_eq!(rewrite_exp_groups("e^(sin(x))+1"), "exp(sin(x))+1");
        assert_eq!(rewrite_exp_groups("2*e^(e^(x))"), "2*exp(exp(x))");
    }

    #[test]
    fn deeply_nested_groups_stop_rewriting() {
        let depth = 10_000;
        let text = format!("{}x{}", "e^(".repeat(depth), ")".repeat(depth));
        let rewritten = rewrite_exp_groups(&text);
        assert!(rewritten.starts_with(&"exp(".repeat(EXP_GROUP_DEPTH_LIMIT)));
        assert!(rewritten.contains("e^("));
    }

    #[test]
    fn unbalanced_group_is_left_alone() {
        assert_eq!(rewrite_exp_groups("e^(x"), "e^(x");
    }

    #[test]
    fn exponent_inside_identifier_is_kept() {
        assert_eq!(Rule::ExpToken.apply("the^x"), "the^x");
        assert_eq!(Rule::ExpToken.apply("2e^x"), "2exp(x)");
    }

    #[test]
    fn bare_dependent_respects_neighbours() {
        let rule = Rule::BareDependent {
            dependent: "y".into(),
            independent: "x".into(),
        };
        assert_eq!(rule.apply("2*y + y(x)"), "2*y(x) + y(x)");
        assert_eq!(rule.apply("xy"), "xy");
    }
}
