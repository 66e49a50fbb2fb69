use std::fmt::Write as _;

use indexmap::IndexMap;
use psc_util::Position;
use rustc_hash::FxBuildHasher;

use crate::symbol::{DataType, Symbol, SymbolKind};

type SymbolMap = IndexMap<String, Symbol, FxBuildHasher>;

struct ScopeNode {
    name: String,
    level: u32,
    parent: Option<usize>,
    symbols: SymbolMap,
}

/// Lexically-scoped symbol table backed by an arena of scopes with
/// read-only parent links — entering a scope pushes a new arena slot,
/// exiting one only moves the "current" cursor back to its parent, so
/// every scope that ever existed stays inspectable (needed for the
/// full-program symbol table dump).
pub struct SymbolTable {
    scopes: Vec<ScopeNode>,
    current: usize,
    scope_counter: u32,
}

const BUILTIN_FUNCTIONS: &[(&str, &[&str])] = &[
    ("print", &["*args"]),
    ("input", &["prompt"]),
    ("len", &["obj"]),
    ("int", &["value"]),
    ("float", &["value"]),
    ("str", &["value"]),
    ("bool", &["value"]),
];

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = Self {
            scopes: vec![ScopeNode {
                name: "global".to_string(),
                level: 0,
                parent: None,
                symbols: SymbolMap::default(),
            }],
            current: 0,
            scope_counter: 0,
        };
        table.register_builtins();
        table
    }

    fn register_builtins(&mut self) {
        for (name, params) in BUILTIN_FUNCTIONS {
            let symbol = Symbol::new(
                *name,
                SymbolKind::Function,
                DataType::Function,
                Position::start(),
                0,
            )
            .with_parameters(params.iter().map(|p| p.to_string()).collect())
            .initialized();
            self.scopes[0].symbols.insert(symbol.name.clone(), symbol);
        }
    }

    pub fn enter_scope(&mut self, name: &str) -> usize {
        self.scope_counter += 1;
        let level = self.scopes[self.current].level + 1;
        let index = self.scopes.len();
        self.scopes.push(ScopeNode {
            name: format!("{name}_{}", self.scope_counter),
            level,
            parent: Some(self.current),
            symbols: SymbolMap::default(),
        });
        self.current = index;
        index
    }

    /// Returns to the parent scope. A no-op at the global scope — there
    /// is nothing above it to return to.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    pub fn current_level(&self) -> u32 {
        self.scopes[self.current].level
    }

    /// Define a symbol in the current scope. Fails (returns `false`)
    /// if a symbol of that name already exists in this scope — shadowing
    /// an outer scope's binding is fine, redefining a local one is not.
    pub fn define(
        &mut self,
        name: &str,
        kind: SymbolKind,
        data_type: DataType,
        position: Position,
    ) -> bool {
        self.define_with_parameters(name, kind, data_type, position, Vec::new())
    }

    pub fn define_with_parameters(
        &mut self,
        name: &str,
        kind: SymbolKind,
        data_type: DataType,
        position: Position,
        parameters: Vec<String>,
    ) -> bool {
        let scope = &mut self.scopes[self.current];
        if scope.symbols.contains_key(name) {
            return false;
        }
        let symbol = Symbol::new(name, kind, data_type, position, scope.level)
            .with_parameters(parameters);
        scope.symbols.insert(name.to_string(), symbol);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut index = Some(self.current);
        while let Some(i) = index {
            if let Some(symbol) = self.scopes[i].symbols.get(name) {
                return Some(symbol);
            }
            index = self.scopes[i].parent;
        }
        None
    }

    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes[self.current].symbols.get(name)
    }

    pub fn set_initialized(&mut self, name: &str) -> bool {
        let mut index = Some(self.current);
        while let Some(i) = index {
            if let Some(symbol) = self.scopes[i].symbols.get_mut(name) {
                symbol.is_initialized = true;
                return true;
            }
            index = self.scopes[i].parent;
        }
        false
    }

    pub fn is_initialized(&self, name: &str) -> bool {
        self.lookup(name).map(|s| s.is_initialized).unwrap_or(false)
    }

    /// Render every scope that has ever existed, in creation order, for
    /// the `<base>_symbols.txt` dump.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for scope in &self.scopes {
            writeln!(out, "Scope: {} (Level {})", scope.name, scope.level).unwrap();
            writeln!(
                out,
                "{:<15} {:<10} {:<10} {:<10} {:<6} {}",
                "Name", "Kind", "Type", "Position", "Init", "Params"
            )
            .unwrap();
            writeln!(out, "{}", "-".repeat(70)).unwrap();
            for symbol in scope.symbols.values() {
                let kind = match symbol.kind {
                    SymbolKind::Variable => "VARIABLE",
                    SymbolKind::Function => "FUNCTION",
                    SymbolKind::Parameter => "PARAMETER",
                };
                writeln!(
                    out,
                    "{:<15} {:<10} {:<10} {:<10} {:<6} {}",
                    symbol.name,
                    kind,
                    symbol.data_type.name(),
                    symbol.position.to_string(),
                    if symbol.is_initialized { "Yes" } else { "No" },
                    symbol.parameters.join(", ")
                )
                .unwrap();
            }
            out.push('\n');
        }
        out
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
