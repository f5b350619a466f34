//! Rule engine
//!
//! Named input-pattern -> output-pattern token rewrites. Rules are
//! declared with `new_rule!`, switched on per file with `use_rule!` (or
//! for the whole compilation with `dialect_rule!`) and applied to a
//! file's tokens until no firing rule matches anywhere.
//!
//! Matching engines form a closed set:
//!
//! | engine    | input pattern                                        |
//! |-----------|------------------------------------------------------|
//! | `literal` | token texts must match exactly                       |
//! | `capture` | as `literal`, `$name` matches any single token and   |
//! |           | is substituted into the output under the same name   |

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use super::lexer::Token;
use super::token_list::{NodeId, TokenList};
use crate::util::diagnostic::{CompileError, Result};
use crate::util::span::Location;

#[cfg(test)]
mod tests;

/// Rewrite engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleEngine {
    Literal,
    Capture,
}

impl RuleEngine {
    /// Look up an engine by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "literal" => Some(RuleEngine::Literal),
            "capture" => Some(RuleEngine::Capture),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RuleEngine::Literal => "literal",
            RuleEngine::Capture => "capture",
        }
    }
}

impl fmt::Display for RuleEngine {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A named token rewrite
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub engine: RuleEngine,
    pub input: Vec<Token>,
    pub output: Vec<Token>,
}

impl Rule {
    /// Create a rule from an engine name
    pub fn new(
        name: &str,
        engine: &str,
        input: Vec<Token>,
        output: Vec<Token>,
    ) -> Result<Self> {
        let engine = RuleEngine::from_name(engine).ok_or_else(|| CompileError::UnknownEngine {
            rule: name.to_string(),
            engine: engine.to_string(),
        })?;
        Ok(Self {
            name: name.to_string(),
            engine,
            input,
            output,
        })
    }

    fn is_capture(
        &self,
        token: &Token,
    ) -> bool {
        self.engine == RuleEngine::Capture && token.text.len() > 1 && token.text.starts_with('$')
    }

    /// Try to match at `at`; on success returns the bindings
    fn try_match(
        &self,
        tokens: &TokenList,
        at: NodeId,
    ) -> Option<HashMap<String, Token>> {
        let mut bindings: HashMap<String, Token> = HashMap::new();
        let mut cur = Some(at);

        for pattern in &self.input {
            let id = cur?;
            let token = tokens.get(id);
            if self.is_capture(pattern) {
                match bindings.get(&pattern.text) {
                    Some(bound) if bound != token => return None,
                    Some(_) => {}
                    None => {
                        bindings.insert(pattern.text.clone(), token.clone());
                    }
                }
            } else if pattern != token {
                return None;
            }
            cur = tokens.next(id);
        }

        Some(bindings)
    }

    /// Build the replacement tokens for a match
    fn produce(
        &self,
        bindings: &HashMap<String, Token>,
        origin: &Token,
    ) -> Vec<Token> {
        self.output
            .iter()
            .map(|t| match bindings.get(&t.text) {
                Some(bound) if self.is_capture(t) => bound.clone(),
                _ => Token::synthetic(t.text.clone(), origin),
            })
            .collect()
    }
}

/// All known rules plus the lists that decide which of them fire
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: IndexMap<String, Rule>,
    active: Vec<String>,
    dialect: Vec<String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.rules.contains_key(name)
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Add a rule; the name must be new
    pub fn define(
        &mut self,
        rule: Rule,
        location: &Location,
    ) -> Result<()> {
        if self.rules.contains_key(&rule.name) {
            return Err(CompileError::NameCollision {
                location: location.clone(),
                name: rule.name,
                existing: "rule",
            });
        }
        if rule.input.is_empty() {
            return Err(CompileError::MalformedMacro {
                location: location.clone(),
                message: format!("rule `{}` has an empty input pattern", rule.name),
            });
        }
        debug!("Defined {} rule `{}`", rule.engine, rule.name);
        self.rules.insert(rule.name.clone(), rule);
        Ok(())
    }

    /// Turn a rule on for the current file
    pub fn activate(
        &mut self,
        name: &str,
        location: &Location,
    ) -> Result<()> {
        self.require(name, location)?;
        if !self.active.iter().any(|n| n == name) {
            self.active.push(name.to_string());
        }
        Ok(())
    }

    /// Turn a rule off for the current file
    pub fn deactivate(
        &mut self,
        name: &str,
        location: &Location,
    ) -> Result<()> {
        self.require(name, location)?;
        self.active.retain(|n| n != name);
        Ok(())
    }

    /// Turn a rule on for every file of the compilation
    pub fn add_dialect(
        &mut self,
        name: &str,
        location: &Location,
    ) -> Result<()> {
        self.require(name, location)?;
        if !self.dialect.iter().any(|n| n == name) {
            self.dialect.push(name.to_string());
        }
        Ok(())
    }

    pub fn clear_active(&mut self) {
        self.active.clear();
    }

    /// Replace the active list, returning the previous one
    pub fn swap_active(
        &mut self,
        active: Vec<String>,
    ) -> Vec<String> {
        std::mem::replace(&mut self.active, active)
    }

    pub fn active(&self) -> &[String] {
        &self.active
    }

    pub fn dialect(&self) -> &[String] {
        &self.dialect
    }

    /// Rules currently firing: active ones first, then dialect ones
    pub fn firing(&self) -> Vec<&Rule> {
        let mut out: Vec<&Rule> = Vec::new();
        for name in self.active.iter().chain(self.dialect.iter()) {
            if let Some(rule) = self.rules.get(name) {
                if !out.iter().any(|r| r.name == rule.name) {
                    out.push(rule);
                }
            }
        }
        out
    }

    fn require(
        &self,
        name: &str,
        location: &Location,
    ) -> Result<()> {
        if self.rules.contains_key(name) {
            Ok(())
        } else {
            Err(CompileError::UnknownRule {
                location: location.clone(),
                name: name.to_string(),
            })
        }
    }
}

/// Rewrite `tokens` until no firing rule matches.
///
/// Each round replaces the earliest match and restarts from the front.
/// Returns the number of rewrites performed.
pub fn apply_rules(
    tokens: &mut TokenList,
    rules: &RuleSet,
) -> usize {
    let firing = rules.firing();
    if firing.is_empty() {
        return 0;
    }

    let mut rewrites = 0;
    'scan: loop {
        let mut cur = tokens.head();
        while let Some(at) = cur {
            for rule in &firing {
                if let Some(bindings) = rule.try_match(tokens, at) {
                    let replacement = rule.produce(&bindings, tokens.get(at));
                    debug!("Rule `{}` fired at {}", rule.name, tokens.get(at).location());
                    tokens.splice(at, rule.input.len(), replacement);
                    rewrites += 1;
                    continue 'scan;
                }
            }
            cur = tokens.next(at);
        }
        break;
    }
    rewrites
}
