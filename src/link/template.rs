//! RFC 6570 URI templates (level 3 operators, string values).
//!
//! Hypermedia links may carry a template such as
//! `https://api.example.com/platform/tree/persons/{pid}{?access_token}` in
//! place of a concrete href. Expansion substitutes caller-supplied variables.
//!
//! # Required vs. optional variables
//!
//! Variables used with the simple (`{x}`), reserved (`{+x}`), label (`{.x}`)
//! and path (`{/x}`) operators identify the resource and are *required*:
//! omitting one is a caller error ([`LinkError::MissingVariable`]).
//! Variables used with the path-parameter (`{;x}`), query (`{?x}`),
//! query-continuation (`{&x}`) and fragment (`{#x}`) operators are optional
//! and are elided when absent.
//!
//! # Example
//!
//! ```
//! use gedcomx_client::link::{TemplateVars, UriTemplate};
//!
//! let template = UriTemplate::parse("https://api.example.com/persons/{pid}{?access_token}").unwrap();
//! let vars = TemplateVars::new().with("pid", "KWQS-BBQ");
//! assert_eq!(template.expand(&vars).unwrap(), "https://api.example.com/persons/KWQS-BBQ");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::LinkError;

#[allow(clippy::expect_used)]
static EXPRESSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([^{}]*)\}").expect("template expression regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static VARNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9_]|%[0-9A-Fa-f]{2})(?:\.?(?:[A-Za-z0-9_]|%[0-9A-Fa-f]{2}))*$")
        .expect("template varname regex is valid") // Static pattern, safe to panic
});

/// RFC 3986 reserved characters, passed through by `+` and `#` expansions.
const RESERVED: &str = ":/?#[]@!$&'()*+,;=";

/// Variable values supplied to a template expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars(BTreeMap<String, String>);

impl TemplateVars {
    /// Creates an empty variable set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable, returning the set.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Adds or replaces a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Looks up a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether no variables are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Simple,
    Reserved,
    Fragment,
    Label,
    Path,
    PathParam,
    Query,
    QueryContinuation,
}

impl Operator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Reserved),
            '#' => Some(Self::Fragment),
            '.' => Some(Self::Label),
            '/' => Some(Self::Path),
            ';' => Some(Self::PathParam),
            '?' => Some(Self::Query),
            '&' => Some(Self::QueryContinuation),
            _ => None,
        }
    }

    fn first(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved => "",
            Self::Fragment => "#",
            Self::Label => ".",
            Self::Path => "/",
            Self::PathParam => ";",
            Self::Query => "?",
            Self::QueryContinuation => "&",
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved | Self::Fragment => ",",
            Self::Label => ".",
            Self::Path => "/",
            Self::PathParam => ";",
            Self::Query | Self::QueryContinuation => "&",
        }
    }

    fn named(self) -> bool {
        matches!(self, Self::PathParam | Self::Query | Self::QueryContinuation)
    }

    fn if_empty(self) -> &'static str {
        match self {
            Self::Query | Self::QueryContinuation => "=",
            _ => "",
        }
    }

    fn allows_reserved(self) -> bool {
        matches!(self, Self::Reserved | Self::Fragment)
    }

    fn requires_values(self) -> bool {
        matches!(self, Self::Simple | Self::Reserved | Self::Label | Self::Path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct VarSpec {
    name: String,
    prefix: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Expression {
        operator: Operator,
        variables: Vec<VarSpec>,
    },
}

/// A parsed URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    source: String,
    parts: Vec<Part>,
}

impl UriTemplate {
    /// Parses a template.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Malformed`] for unbalanced braces, unknown
    /// operators, empty expressions or invalid variable names.
    pub fn parse(template: &str) -> Result<Self, LinkError> {
        let mut parts = Vec::new();
        let mut cursor = 0;

        for captures in EXPRESSION_PATTERN.captures_iter(template) {
            let (Some(whole), Some(body)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            push_literal(template, &template[cursor..whole.start()], &mut parts)?;
            parts.push(parse_expression(template, body.as_str())?);
            cursor = whole.end();
        }
        push_literal(template, &template[cursor..], &mut parts)?;

        Ok(Self {
            source: template.to_string(),
            parts,
        })
    }

    /// The template text as parsed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of every variable referenced by the template, in order.
    #[must_use]
    pub fn variable_names(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Expression { variables, .. } => Some(variables),
                Part::Literal(_) => None,
            })
            .flatten()
            .map(|spec| spec.name.as_str())
            .collect()
    }

    /// Expands the template with the supplied variables.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::MissingVariable`] when a required variable is absent.
    pub fn expand(&self, vars: &TemplateVars) -> Result<String, LinkError> {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Expression {
                    operator,
                    variables,
                } => self.expand_expression(*operator, variables, vars, &mut out)?,
            }
        }
        Ok(out)
    }

    fn expand_expression(
        &self,
        operator: Operator,
        variables: &[VarSpec],
        vars: &TemplateVars,
        out: &mut String,
    ) -> Result<(), LinkError> {
        let mut rendered = Vec::with_capacity(variables.len());
        for spec in variables {
            let Some(value) = vars.get(&spec.name) else {
                if operator.requires_values() {
                    return Err(LinkError::missing_variable(&self.source, &spec.name));
                }
                continue;
            };
            let value = match spec.prefix {
                Some(max) => value.chars().take(max).collect::<String>(),
                None => value.to_string(),
            };
            let encoded = encode(&value, operator.allows_reserved());
            let item = if operator.named() {
                if encoded.is_empty() {
                    format!("{}{}", spec.name, operator.if_empty())
                } else {
                    format!("{}={encoded}", spec.name)
                }
            } else {
                encoded
            };
            rendered.push(item);
        }

        if !rendered.is_empty() {
            out.push_str(operator.first());
            out.push_str(&rendered.join(operator.separator()));
        }
        Ok(())
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn push_literal(template: &str, literal: &str, parts: &mut Vec<Part>) -> Result<(), LinkError> {
    if literal.contains('{') || literal.contains('}') {
        return Err(LinkError::malformed(template, "unbalanced brace"));
    }
    if !literal.is_empty() {
        parts.push(Part::Literal(literal.to_string()));
    }
    Ok(())
}

fn parse_expression(template: &str, body: &str) -> Result<Part, LinkError> {
    let mut chars = body.chars();
    let (operator, list) = match chars.next() {
        None => return Err(LinkError::malformed(template, "empty expression")),
        Some(c) => match Operator::from_char(c) {
            Some(op) => (op, chars.as_str()),
            None if matches!(c, '=' | ',' | '!' | '@' | '|') => {
                return Err(LinkError::malformed(
                    template,
                    &format!("reserved operator '{c}'"),
                ));
            }
            None => (Operator::Simple, body),
        },
    };

    let mut variables = Vec::new();
    for raw in list.split(',') {
        let raw = raw.trim();
        // Explode has no effect on string values; accept and ignore it.
        let raw = raw.strip_suffix('*').unwrap_or(raw);
        let (name, prefix) = match raw.split_once(':') {
            Some((name, len)) => {
                let len = len.parse::<usize>().map_err(|_| {
                    LinkError::malformed(template, &format!("invalid prefix length in '{raw}'"))
                })?;
                (name, Some(len))
            }
            None => (raw, None),
        };
        if !VARNAME_PATTERN.is_match(name) {
            return Err(LinkError::malformed(
                template,
                &format!("invalid variable name '{name}'"),
            ));
        }
        variables.push(VarSpec {
            name: name.to_string(),
            prefix,
        });
    }

    Ok(Part::Expression {
        operator,
        variables,
    })
}

fn encode(value: &str, allow_reserved: bool) -> String {
    if !allow_reserved {
        return urlencoding::encode(value).into_owned();
    }

    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    for (index, ch) in value.char_indices() {
        let is_pct_triplet = ch == '%'
            && bytes.get(index + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(index + 2).is_some_and(u8::is_ascii_hexdigit);
        if ch.is_ascii_alphanumeric() || "-._~".contains(ch) || RESERVED.contains(ch) || is_pct_triplet
        {
            out.push(ch);
        } else {
            let mut buf = [0u8; 4];
            out.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }
    out
}
