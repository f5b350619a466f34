//! Symbol table
//!
//! Names map to overload lists. Symbols are never removed: leaving a scope
//! or `erase!` only sets the `erased` flag, so an AST that already refers
//! to a symbol keeps a valid target while lookups stop seeing it.

use std::collections::{BTreeSet, HashMap};

use super::ast::ASTNode;
use crate::frontend::types::{compare, Tier, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Function with a body
    Function,
    /// Function declared without a body, linked under its plain name
    Extern,
    Global,
    Local,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    /// Name used in the C output
    pub mangled: String,
    pub kind: SymbolKind,
    pub ty: Type,
    /// Function body or global initializer
    pub ast: Option<ASTNode>,
    pub file: String,
    pub line: usize,
    pub tags: BTreeSet<String>,
    pub frame: usize,
    pub erased: bool,
}

impl Symbol {
    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function | SymbolKind::Extern)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, SymbolKind::Global | SymbolKind::Local)
    }
}

/// Every symbol of a compilation, in definition order
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, Vec<usize>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol, returning its index
    pub fn add(
        &mut self,
        symbol: Symbol,
    ) -> usize {
        let index = self.symbols.len();
        self.by_name.entry(symbol.name.clone()).or_default().push(index);
        self.symbols.push(symbol);
        index
    }

    pub fn get(
        &self,
        index: usize,
    ) -> &Symbol {
        &self.symbols[index]
    }

    pub fn get_mut(
        &mut self,
        index: usize,
    ) -> &mut Symbol {
        &mut self.symbols[index]
    }

    /// Live symbols named `name`, oldest first
    pub fn live<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = (usize, &'a Symbol)> + 'a {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(move |&i| (i, &self.symbols[i]))
            .filter(|(_, s)| !s.erased)
    }

    /// Live function overloads of `name`
    pub fn overloads(
        &self,
        name: &str,
    ) -> Vec<(usize, &Symbol)> {
        self.live(name).filter(|(_, s)| s.is_function()).collect()
    }

    /// The innermost live variable called `name`: a local of one of the
    /// `visible` frames, or a global
    pub fn variable(
        &self,
        name: &str,
        visible: &[usize],
    ) -> Option<&Symbol> {
        self.live(name)
            .filter(|(_, s)| match s.kind {
                SymbolKind::Global => true,
                SymbolKind::Local => visible.contains(&s.frame),
                _ => false,
            })
            .last()
            .map(|(_, s)| s)
    }

    /// Live function overload whose parameters exactly equal `params`
    pub fn find_overload(
        &self,
        name: &str,
        params: &[Type],
    ) -> Option<usize> {
        self.overloads(name)
            .into_iter()
            .find(|(_, s)| {
                let declared = s.ty.params();
                declared.len() == params.len()
                    && declared
                        .iter()
                        .zip(params)
                        .all(|(d, p)| compare(d, p, Tier::Exact).is_some())
            })
            .map(|(i, _)| i)
    }

    /// Whether `name` is a live variable declared in `frame`
    pub fn declared_in_frame(
        &self,
        name: &str,
        frame: usize,
    ) -> bool {
        self.live(name).any(|(_, s)| s.is_variable() && s.frame == frame)
    }

    /// Soft-delete everything declared in `frame`
    pub fn erase_frame(
        &mut self,
        frame: usize,
    ) {
        for symbol in &mut self.symbols {
            if symbol.frame == frame && symbol.kind == SymbolKind::Local {
                symbol.erased = true;
            }
        }
    }

    /// Soft-delete every symbol named `name`, returning how many were live
    pub fn erase_name(
        &mut self,
        name: &str,
    ) -> usize {
        let indices = self.by_name.get(name).cloned().unwrap_or_default();
        let mut erased = 0;
        for i in indices {
            let symbol = &mut self.symbols[i];
            if !symbol.erased {
                symbol.erased = true;
                erased += 1;
            }
        }
        erased
    }

    /// All symbols in definition order, erased ones included
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A struct definition, generic instances under their mangled name
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub members: Vec<(String, Type)>,
    pub file: String,
}

impl StructDef {
    pub fn member(
        &self,
        name: &str,
    ) -> Option<&Type> {
        self.members.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

/// A tagged union; `unit` options carry no payload
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub options: Vec<(String, Type)>,
    pub file: String,
}

impl EnumDef {
    pub fn option(
        &self,
        name: &str,
    ) -> Option<(usize, &Type)> {
        self.options
            .iter()
            .enumerate()
            .find(|(_, (n, _))| n == name)
            .map(|(i, (_, t))| (i, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(
        name: &str,
        params: &[Type],
    ) -> Symbol {
        let named: Vec<(String, Type)> = params
            .iter()
            .enumerate()
            .map(|(i, t)| (format!("p{}", i), t.clone()))
            .collect();
        Symbol {
            name: name.to_string(),
            mangled: name.to_string(),
            kind: SymbolKind::Function,
            ty: Type::function(&named, &Type::atomic("void")),
            ast: None,
            file: "t.oak".to_string(),
            line: 1,
            tags: BTreeSet::new(),
            frame: 0,
            erased: false,
        }
    }

    fn local(
        name: &str,
        frame: usize,
    ) -> Symbol {
        Symbol {
            kind: SymbolKind::Local,
            ty: Type::atomic("i32"),
            frame,
            ..function(name, &[])
        }
    }

    #[test]
    fn test_overloads_and_exact_lookup() {
        let mut table = SymbolTable::new();
        table.add(function("f", &[Type::atomic("i32")]));
        let second = table.add(function("f", &[Type::atomic("u8").pointer_to()]));

        assert_eq!(table.overloads("f").len(), 2);
        assert_eq!(table.find_overload("f", &[Type::atomic("u8").pointer_to()]), Some(second));
        assert_eq!(table.find_overload("f", &[Type::atomic("u8")]), None);
    }

    #[test]
    fn test_erase_frame_hides_locals_only() {
        let mut table = SymbolTable::new();
        table.add(local("x", 1));
        table.add(local("x", 2));
        table.add(function("x", &[]));

        assert_eq!(table.variable("x", &[1, 2]).map(|s| s.frame), Some(2));
        assert_eq!(table.variable("x", &[1]).map(|s| s.frame), Some(1));
        assert!(table.variable("x", &[3]).is_none());
        table.erase_frame(2);
        assert_eq!(table.variable("x", &[1, 2]).map(|s| s.frame), Some(1));
        assert_eq!(table.overloads("x").len(), 1);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_erase_name_soft_deletes() {
        let mut table = SymbolTable::new();
        let idx = table.add(function("g", &[]));
        assert_eq!(table.erase_name("g"), 1);
        assert_eq!(table.erase_name("g"), 0);
        assert!(table.overloads("g").is_empty());
        assert!(table.get(idx).erased);
    }
}
