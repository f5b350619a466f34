//! Compiler macros
//!
//! `name!` references the compiler handles itself instead of looking them
//! up among user defines and macros. Directives change compilation state
//! and disappear from the token stream; builtins stay in place for the
//! sequencer to lower.

use std::fmt;

/// Directive handled by the file driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    Include,
    Package,
    Link,
    Flag,
    Tag,
    NewRule,
    UseRule,
    RemRule,
    DialectRule,
    ClearRules,
    Erase,
}

/// Builtin lowered by the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Alloc,
    Free,
    Size,
    Type,
    RawC,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompilerMacro {
    Directive(Directive),
    Builtin(Builtin),
}

impl CompilerMacro {
    /// Classify a macro name (without the bang)
    pub fn from_name(name: &str) -> Option<Self> {
        use CompilerMacro::{Builtin as B, Directive as D};
        Some(match name {
            "include" => D(Directive::Include),
            "package" => D(Directive::Package),
            "link" => D(Directive::Link),
            "flag" => D(Directive::Flag),
            "tag" => D(Directive::Tag),
            "new_rule" => D(Directive::NewRule),
            "use_rule" => D(Directive::UseRule),
            "rem_rule" => D(Directive::RemRule),
            "dialect_rule" => D(Directive::DialectRule),
            "clear_rules" => D(Directive::ClearRules),
            "erase" => D(Directive::Erase),
            "alloc" => B(Builtin::Alloc),
            "free" => B(Builtin::Free),
            "size" => B(Builtin::Size),
            "type" => B(Builtin::Type),
            "raw_c" => B(Builtin::RawC),
            _ => return None,
        })
    }
}

impl Directive {
    pub fn name(&self) -> &'static str {
        match self {
            Directive::Include => "include",
            Directive::Package => "package",
            Directive::Link => "link",
            Directive::Flag => "flag",
            Directive::Tag => "tag",
            Directive::NewRule => "new_rule",
            Directive::UseRule => "use_rule",
            Directive::RemRule => "rem_rule",
            Directive::DialectRule => "dialect_rule",
            Directive::ClearRules => "clear_rules",
            Directive::Erase => "erase",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}!", self.name())
    }
}

impl Builtin {
    /// Classify a builtin from its `name!` token text
    pub fn from_token(text: &str) -> Option<Self> {
        match CompilerMacro::from_name(text.strip_suffix('!')?)? {
            CompilerMacro::Builtin(b) => Some(b),
            CompilerMacro::Directive(_) => None,
        }
    }
}

/// Context values substituted like defines
pub const PSEUDO_DEFINES: &[&str] = &["line", "file", "prev_file", "comp_time", "version", "host_os"];

/// Whether `name` is reserved by the compiler
pub fn is_reserved(name: &str) -> bool {
    CompilerMacro::from_name(name).is_some() || PSEUDO_DEFINES.contains(&name)
}
