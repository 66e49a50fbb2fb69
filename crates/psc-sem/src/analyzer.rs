use std::fmt;

use psc_par::{BinOp, Expr, Literal, Program, Stmt, UnOp};
use psc_util::{Diagnostic, Position};
use thiserror::Error;

use crate::symbol::{DataType, SymbolKind};
use crate::table::SymbolTable;

/// A semantic error, built on the same [`Diagnostic`] the lexer and
/// parser use. Unlike those two stages, the analyzer never aborts on
/// the first one: it keeps walking and accumulates every violation.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct SemanticError {
    pub diagnostic: Diagnostic,
}

impl SemanticError {
    pub fn position(&self) -> Position {
        self.diagnostic.position
    }

    pub fn message(&self) -> &str {
        &self.diagnostic.message
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diagnostic)
    }
}

const ARITHMETIC: [BinOp; 6] = [
    BinOp::Add,
    BinOp::Sub,
    BinOp::Mul,
    BinOp::Div,
    BinOp::Mod,
    BinOp::Pow,
];

/// Component F. Walks the AST built by `psc-par`, threading a
/// [`SymbolTable`] through nested scopes while checking variable
/// initialization, function arity, and best-effort type compatibility.
/// Never aborts on the first problem: every violation becomes one more
/// entry in `errors` and analysis continues so a single pass reports
/// everything wrong with a program.
pub struct SemanticAnalyzer {
    pub symbols: SymbolTable,
    pub errors: Vec<SemanticError>,
    current_function: Option<String>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            errors: Vec::new(),
            current_function: None,
        }
    }

    /// Analyze the full program, returning `true` if no semantic error
    /// was recorded.
    pub fn analyze(&mut self, program: &Program) -> bool {
        for stmt in &program.statements {
            self.visit_stmt(stmt);
        }
        self.errors.is_empty()
    }

    fn error(&mut self, position: Position, message: impl Into<String>) {
        self.errors.push(SemanticError {
            diagnostic: Diagnostic::error(position, message),
        });
    }

    // --- Type inference, mirroring the closed set of expression forms. ---

    fn infer_type(&self, expr: &Expr) -> DataType {
        match expr {
            Expr::Literal { value, .. } => match value {
                Literal::Integer(_) => DataType::Integer,
                Literal::Float(_) => DataType::Float,
                Literal::Str(_) => DataType::Str,
                Literal::Boolean(_) => DataType::Boolean,
            },
            Expr::Variable { name, .. } => self
                .symbols
                .lookup(name)
                .map(|s| s.data_type)
                .unwrap_or(DataType::Unknown),
            Expr::Binary { left, op, right, .. } => {
                self.infer_binary_type(op, self.infer_type(left), self.infer_type(right))
            }
            Expr::Unary { op, operand, .. } => self.infer_unary_type(op, self.infer_type(operand)),
            Expr::Call { name, .. } => self.infer_call_type(name),
            Expr::List { .. } => DataType::List,
            Expr::Index { base, .. } => match self.infer_type(base) {
                DataType::List => DataType::Unknown,
                DataType::Str => DataType::Str,
                _ => DataType::Unknown,
            },
        }
    }

    fn infer_binary_type(&self, op: &BinOp, left: DataType, right: DataType) -> DataType {
        if ARITHMETIC.contains(op) {
            if left == DataType::Float || right == DataType::Float {
                DataType::Float
            } else if left == DataType::Integer && right == DataType::Integer {
                DataType::Integer
            } else if matches!(op, BinOp::Add) && (left == DataType::Str || right == DataType::Str)
            {
                DataType::Str
            } else {
                DataType::Unknown
            }
        } else {
            // comparisons and logical connectives all yield a boolean
            DataType::Boolean
        }
    }

    fn infer_unary_type(&self, op: &UnOp, operand: DataType) -> DataType {
        match op {
            UnOp::Not => DataType::Boolean,
            UnOp::Neg | UnOp::Pos if operand.is_numeric() => operand,
            UnOp::Neg | UnOp::Pos => DataType::Unknown,
        }
    }

    fn infer_call_type(&self, name: &str) -> DataType {
        match name {
            "print" => DataType::Unknown,
            "input" => DataType::Str,
            "len" => DataType::Integer,
            "int" => DataType::Integer,
            "float" => DataType::Float,
            "str" => DataType::Str,
            "bool" => DataType::Boolean,
            _ => DataType::Unknown,
        }
    }

    fn check_type_compatibility(
        &mut self,
        expected: DataType,
        actual: DataType,
        operation: &str,
        position: Position,
    ) -> bool {
        if expected == actual || expected == DataType::Unknown || actual == DataType::Unknown {
            return true;
        }
        if expected == DataType::Float && actual == DataType::Integer {
            return true;
        }
        self.error(
            position,
            format!(
                "Type mismatch in {operation}: expected {}, got {}",
                expected.name(),
                actual.name()
            ),
        );
        false
    }

    // --- Statements. ---

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assignment { name, value, position } => {
                self.visit_assignment(name, value, *position)
            }
            Stmt::If {
                condition,
                then_body,
                elif_clauses,
                else_body,
                position,
            } => self.visit_if(condition, then_body, elif_clauses, else_body, *position),
            Stmt::While { condition, body, position } => {
                self.visit_while(condition, body, *position)
            }
            Stmt::For { variable, iterable, body, position } => {
                self.visit_for(variable, iterable, body, *position)
            }
            Stmt::FunctionDef { name, params, body, position } => {
                self.visit_function_def(name, params, body, *position)
            }
            Stmt::Return { value, position } => self.visit_return(value.as_ref(), *position),
            Stmt::ExprStmt { expr, .. } => self.visit_expr(expr),
        }
    }

    fn visit_assignment(&mut self, name: &str, value: &Expr, position: Position) {
        self.visit_expr(value);
        let expr_type = self.infer_type(value);

        if self.symbols.lookup_local(name).is_none() {
            if !self.symbols.define(name, SymbolKind::Variable, expr_type, position) {
                self.error(position, format!("Cannot define variable '{name}'"));
            } else {
                self.symbols.set_initialized(name);
            }
        } else {
            let expected = self.symbols.lookup_local(name).unwrap().data_type;
            self.check_type_compatibility(expected, expr_type, "assignment", position);
            self.symbols.set_initialized(name);
        }
    }

    fn visit_if(
        &mut self,
        condition: &Expr,
        then_body: &[Stmt],
        elif_clauses: &[(Expr, Vec<Stmt>)],
        else_body: &Option<Vec<Stmt>>,
        position: Position,
    ) {
        self.visit_expr(condition);
        let condition_type = self.infer_type(condition);
        if condition_type != DataType::Boolean && condition_type != DataType::Unknown {
            self.error(
                position,
                format!("If condition must be boolean, got {}", condition_type.name()),
            );
        }

        self.symbols.enter_scope("if");
        for stmt in then_body {
            self.visit_stmt(stmt);
        }
        self.symbols.exit_scope();

        for (elif_condition, elif_body) in elif_clauses {
            self.visit_expr(elif_condition);
            let elif_type = self.infer_type(elif_condition);
            if elif_type != DataType::Boolean && elif_type != DataType::Unknown {
                self.error(
                    elif_condition.position(),
                    format!("Elif condition must be boolean, got {}", elif_type.name()),
                );
            }
            self.symbols.enter_scope("elif");
            for stmt in elif_body {
                self.visit_stmt(stmt);
            }
            self.symbols.exit_scope();
        }

        if let Some(else_body) = else_body {
            self.symbols.enter_scope("else");
            for stmt in else_body {
                self.visit_stmt(stmt);
            }
            self.symbols.exit_scope();
        }
    }

    fn visit_while(&mut self, condition: &Expr, body: &[Stmt], position: Position) {
        self.visit_expr(condition);
        let condition_type = self.infer_type(condition);
        if condition_type != DataType::Boolean && condition_type != DataType::Unknown {
            self.error(
                position,
                format!("While condition must be boolean, got {}", condition_type.name()),
            );
        }
        self.symbols.enter_scope("while");
        for stmt in body {
            self.visit_stmt(stmt);
        }
        self.symbols.exit_scope();
    }

    fn visit_for(&mut self, variable: &str, iterable: &Expr, body: &[Stmt], position: Position) {
        self.visit_expr(iterable);
        let iterable_type = self.infer_type(iterable);
        if !matches!(
            iterable_type,
            DataType::List | DataType::Str | DataType::Unknown
        ) {
            self.error(
                position,
                format!(
                    "For loop iterable must be list or string, got {}",
                    iterable_type.name()
                ),
            );
        }

        self.symbols.enter_scope("for");
        let var_type = if iterable_type == DataType::Str {
            DataType::Str
        } else {
            DataType::Unknown
        };
        if !self
            .symbols
            .define(variable, SymbolKind::Variable, var_type, position)
        {
            self.error(position, format!("Cannot define loop variable '{variable}'"));
        } else {
            self.symbols.set_initialized(variable);
        }

        for stmt in body {
            self.visit_stmt(stmt);
        }
        self.symbols.exit_scope();
    }

    fn visit_function_def(&mut self, name: &str, params: &[String], body: &[Stmt], position: Position) {
        if !self.symbols.define_with_parameters(
            name,
            SymbolKind::Function,
            DataType::Function,
            position,
            params.to_vec(),
        ) {
            self.error(position, format!("Function '{name}' already defined"));
            return;
        }

        self.symbols.enter_scope(&format!("function_{name}"));
        let previous_function = self.current_function.replace(name.to_string());

        for param in params {
            if !self
                .symbols
                .define(param, SymbolKind::Parameter, DataType::Unknown, position)
            {
                self.error(position, format!("Parameter '{param}' already defined"));
            } else {
                self.symbols.set_initialized(param);
            }
        }

        for stmt in body {
            self.visit_stmt(stmt);
        }

        self.symbols.exit_scope();
        self.current_function = previous_function;
    }

    fn visit_return(&mut self, value: Option<&Expr>, position: Position) {
        if self.current_function.is_none() {
            self.error(position, "Return statement outside function");
            return;
        }
        if let Some(value) = value {
            self.visit_expr(value);
        }
    }

    // --- Expressions. ---

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal { .. } => {}
            Expr::Variable { name, position } => self.visit_variable(name, *position),
            Expr::Binary { left, op, right, position } => {
                self.visit_binary(left, op, right, *position)
            }
            Expr::Unary { op, operand, position } => self.visit_unary(op, operand, *position),
            Expr::Call { name, args, position } => self.visit_call(name, args, *position),
            Expr::List { elements, .. } => {
                for element in elements {
                    self.visit_expr(element);
                }
            }
            Expr::Index { base, index, position } => self.visit_index(base, index, *position),
        }
    }

    fn visit_variable(&mut self, name: &str, position: Position) {
        match self.symbols.lookup(name) {
            None => self.error(position, format!("Undefined variable '{name}'")),
            Some(symbol) if !symbol.is_initialized => {
                self.error(position, format!("Variable '{name}' used before initialization"))
            }
            Some(_) => {}
        }
    }

    fn visit_binary(&mut self, left: &Expr, op: &BinOp, right: &Expr, position: Position) {
        self.visit_expr(left);
        self.visit_expr(right);

        if !ARITHMETIC.contains(op) {
            return;
        }
        let left_type = self.infer_type(left);
        let right_type = self.infer_type(right);

        if matches!(op, BinOp::Add) {
            let numeric_pair = left_type.is_numeric() && right_type.is_numeric();
            let string_pair = left_type == DataType::Str && right_type == DataType::Str;
            if !numeric_pair
                && !string_pair
                && left_type != DataType::Unknown
                && right_type != DataType::Unknown
            {
                self.error(
                    position,
                    format!(
                        "Invalid operand types for +: {} and {}",
                        left_type.name(),
                        right_type.name()
                    ),
                );
            }
        } else {
            let left_ok = left_type.is_numeric() || left_type == DataType::Unknown;
            let right_ok = right_type.is_numeric() || right_type == DataType::Unknown;
            if !left_ok || !right_ok {
                self.error(
                    position,
                    format!(
                        "Invalid operand types for {op:?}: {} and {}",
                        left_type.name(),
                        right_type.name()
                    ),
                );
            }
        }
    }

    fn visit_unary(&mut self, op: &UnOp, operand: &Expr, position: Position) {
        self.visit_expr(operand);
        if matches!(op, UnOp::Not) {
            return;
        }
        let operand_type = self.infer_type(operand);
        if !operand_type.is_numeric() && operand_type != DataType::Unknown {
            self.error(
                position,
                format!("Invalid operand type for {op:?}: {}", operand_type.name()),
            );
        }
    }

    fn visit_call(&mut self, name: &str, args: &[Expr], position: Position) {
        let Some(symbol) = self.symbols.lookup(name) else {
            self.error(position, format!("Undefined function '{name}'"));
            return;
        };
        if symbol.kind != SymbolKind::Function {
            self.error(position, format!("'{name}' is not a function"));
            return;
        }
        let variadic_builtin = symbol.parameters.first().map(|p| p == "*args").unwrap_or(false);
        if !variadic_builtin && symbol.parameters.len() != args.len() {
            self.error(
                position,
                format!(
                    "Function '{name}' expects {} arguments, got {}",
                    symbol.parameters.len(),
                    args.len()
                ),
            );
        }
        for arg in args {
            self.visit_expr(arg);
        }
    }

    fn visit_index(&mut self, base: &Expr, index: &Expr, position: Position) {
        self.visit_expr(base);
        self.visit_expr(index);
        let base_type = self.infer_type(base);
        let index_type = self.infer_type(index);

        if !matches!(
            base_type,
            DataType::List | DataType::Str | DataType::Unknown
        ) {
            self.error(position, format!("Cannot index into {}", base_type.name()));
        }
        if index_type != DataType::Integer && index_type != DataType::Unknown {
            self.error(
                position,
                format!("List index must be integer, got {}", index_type.name()),
            );
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
