//! Ordered line rules: first rule whose pattern matches a line wins and its
//! handler updates the per-document parse context.
//!
//! Patterns are anchored at the start of the line. Positions are reported as
//! character columns, not byte offsets, because layout alignment is counted in
//! printed characters and the German text contains umlauts.

use auszug_core::ParseError;
use regex::{Captures, Regex};
use tracing::debug;

/// Handler run when its rule matches.
pub type Handler<C> = fn(&mut C, &LineMatch<'_>) -> Result<(), ParseError>;

pub struct Rule<C> {
    name: &'static str,
    regex: Regex,
    handler: Handler<C>,
}

/// Captured fields of one matched line.
pub struct LineMatch<'l> {
    line: &'l str,
    caps: Captures<'l>,
}

impl<'l> LineMatch<'l> {
    pub fn line(&self) -> &'l str {
        self.line
    }

    /// Optional group text.
    pub fn get(&self, group: &str) -> Option<&'l str> {
        self.caps.name(group).map(|m| m.as_str())
    }

    /// Required group text. A missing group means the rule and its handler
    /// disagree, which is reported as structural.
    pub fn text(&self, group: &str) -> Result<&'l str, ParseError> {
        self.get(group)
            .ok_or_else(|| ParseError::structural(format!("rule has no '{group}' field")))
    }

    /// Character column where a group starts.
    pub fn start_column(&self, group: &str) -> Option<usize> {
        self.caps.name(group).map(|m| column(self.line, m.start()))
    }

    /// Character column just past the end of a group.
    pub fn end_column(&self, group: &str) -> Option<usize> {
        self.caps.name(group).map(|m| column(self.line, m.end()))
    }
}

fn column(line: &str, byte: usize) -> usize {
    line[..byte].chars().count()
}

/// A line no rule recognized, with the rules that were tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedLine<'l> {
    pub line: &'l str,
    pub dialect: &'static str,
    pub attempted: Vec<&'static str>,
}

/// What happened to one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<'l> {
    Handled(&'static str),
    Unmatched(UnmatchedLine<'l>),
}

/// Rules of one layout dialect, in priority order.
pub struct RuleSet<C> {
    dialect: &'static str,
    rules: Vec<Rule<C>>,
}

impl<C> RuleSet<C> {
    pub fn new(dialect: &'static str) -> Self {
        Self {
            dialect,
            rules: Vec::new(),
        }
    }

    /// Append a rule with lower priority than every rule added before it.
    pub fn rule(
        mut self,
        name: &'static str,
        pattern: &str,
        handler: Handler<C>,
    ) -> Result<Self, ParseError> {
        let regex = Regex::new(&format!("^(?:{pattern})"))?;
        self.rules.push(Rule {
            name,
            regex,
            handler,
        });
        Ok(self)
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// First matching rule and its fields.
    pub fn classify<'l>(&self, line: &'l str) -> Option<(&Rule<C>, LineMatch<'l>)> {
        self.rules.iter().find_map(|rule| {
            rule.regex
                .captures(line)
                .map(|caps| (rule, LineMatch { line, caps }))
        })
    }

    /// Run the winning rule's handler if any rule matches; misses are not
    /// logged. Returns whether a rule matched.
    pub fn apply(&self, ctx: &mut C, line: &str) -> Result<bool, ParseError> {
        match self.classify(line) {
            Some((rule, m)) => {
                debug!(dialect = self.dialect, rule = rule.name, line, "matched");
                (rule.handler)(ctx, &m)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Classify a line and run the winning rule's handler.
    pub fn dispatch<'l>(&self, ctx: &mut C, line: &'l str) -> Result<Dispatch<'l>, ParseError> {
        match self.classify(line) {
            Some((rule, m)) => {
                debug!(dialect = self.dialect, rule = rule.name, line, "matched");
                (rule.handler)(ctx, &m)?;
                Ok(Dispatch::Handled(rule.name))
            }
            None => {
                debug!(dialect = self.dialect, line, "not matched");
                Ok(Dispatch::Unmatched(UnmatchedLine {
                    line,
                    dialect: self.dialect,
                    attempted: self.rule_names(),
                }))
            }
        }
    }
}
