//! Compilation context
//!
//! One [`CompileContext`] lives for a whole compilation and is threaded by
//! `&mut` through every phase of every file. Macro programs are compiled
//! with a context of their own.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use indexmap::IndexMap;

use super::directives;
use super::host::OsHost;
use crate::frontend::lexer::Token;
use crate::frontend::preprocess::{CachedRuntime, Directive, ExpansionContext, MacroRuntime, MacroTable};
use crate::frontend::rules::RuleSet;
use crate::middle::generics::{GenericTable, InstanceIndex};
use crate::middle::sequence::{EnumDef, ScopeStack, StructDef, SymbolTable};
use crate::util::config::CompilerConfig;
use crate::util::diagnostic::{Result, WarningSink};
use crate::util::span::{FileName, Location, Position};

/// Where translation currently is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pub file: String,
    /// The file that included `file`
    pub prev_file: Option<String>,
    pub line: usize,
}

pub struct CompileContext {
    pub config: CompilerConfig,

    pub symbols: SymbolTable,
    pub structs: IndexMap<String, StructDef>,
    pub enums: IndexMap<String, EnumDef>,
    pub generics: GenericTable,
    /// Mangled generic type name to its generic and arguments
    pub instances: InstanceIndex,
    pub scopes: ScopeStack,

    pub macros: MacroTable,
    pub rules: RuleSet,
    pub runtime: Box<dyn MacroRuntime>,

    pub cursor: Cursor,
    /// Canonical paths of files already translated
    pub visited: HashSet<PathBuf>,

    pub raw_c: Vec<String>,
    pub links: Vec<String>,
    pub flags: Vec<String>,
    pub file_tags: HashMap<String, BTreeSet<String>>,
    pub warnings: WarningSink,
}

impl CompileContext {
    /// Context with the disk-cached macro runtime under the configured cache
    pub fn new(config: CompilerConfig) -> Self {
        let runtime = CachedRuntime::new(OsHost::new(config.clone()), config.macro_dir());
        Self::with_runtime(config, Box::new(runtime))
    }

    pub fn with_runtime(
        config: CompilerConfig,
        runtime: Box<dyn MacroRuntime>,
    ) -> Self {
        Self {
            config,
            symbols: SymbolTable::new(),
            structs: IndexMap::new(),
            enums: IndexMap::new(),
            generics: GenericTable::new(),
            instances: InstanceIndex::new(),
            scopes: ScopeStack::new(),
            macros: MacroTable::new(),
            rules: RuleSet::new(),
            runtime,
            cursor: Cursor::default(),
            visited: HashSet::new(),
            raw_c: Vec::new(),
            links: Vec::new(),
            flags: Vec::new(),
            file_tags: HashMap::new(),
            warnings: WarningSink::new(),
        }
    }

    /// Location of the cursor
    pub fn location(&self) -> Location {
        Location::new(FileName::new(&self.cursor.file), Position::new(self.cursor.line, 1))
    }

    /// Tags declared by the file being translated
    pub fn current_tags(&self) -> BTreeSet<String> {
        self.file_tags.get(&self.cursor.file).cloned().unwrap_or_default()
    }
}

impl ExpansionContext for CompileContext {
    fn macros(&mut self) -> &mut MacroTable {
        &mut self.macros
    }

    fn runtime(&mut self) -> &mut dyn MacroRuntime {
        self.runtime.as_mut()
    }

    fn previous_file(&self) -> Option<String> {
        self.cursor.prev_file.clone()
    }

    fn directive(
        &mut self,
        directive: Directive,
        args: &[Token],
        at: &Token,
    ) -> Result<()> {
        directives::run(self, directive, args, at)
    }
}
