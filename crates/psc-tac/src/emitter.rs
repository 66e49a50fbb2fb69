use psc_par::{self as ast, Program};

use crate::instruction::{BinOp, Instruction, Operand, UnOp};

/// Component G. Walks the AST once and linearizes it into a flat
/// instruction list, issuing fresh temporaries and labels as it goes.
/// Carries no error state: by the time code reaches this stage,
/// semantic analysis has already validated it, so every lowering here
/// is unconditional.
struct Emitter {
    instructions: Vec<Instruction>,
    temp_counter: u32,
    label_counter: u32,
}

/// Lower a fully-parsed program to three-address code.
pub fn emit(program: &Program) -> Vec<Instruction> {
    let mut emitter = Emitter::new();
    for stmt in &program.statements {
        emitter.emit_stmt(stmt);
    }
    emitter.instructions
}

fn lower_bin_op(op: &ast::BinOp) -> BinOp {
    match op {
        ast::BinOp::Add => BinOp::Add,
        ast::BinOp::Sub => BinOp::Sub,
        ast::BinOp::Mul => BinOp::Mul,
        ast::BinOp::Div => BinOp::Div,
        ast::BinOp::Mod => BinOp::Mod,
        ast::BinOp::Pow => BinOp::Pow,
        ast::BinOp::Eq => BinOp::Eq,
        ast::BinOp::NotEq => BinOp::NotEq,
        ast::BinOp::Lt => BinOp::Lt,
        ast::BinOp::LtEq => BinOp::LtEq,
        ast::BinOp::Gt => BinOp::Gt,
        ast::BinOp::GtEq => BinOp::GtEq,
        ast::BinOp::And => BinOp::And,
        ast::BinOp::Or => BinOp::Or,
    }
}

fn lower_un_op(op: &ast::UnOp) -> UnOp {
    match op {
        ast::UnOp::Neg => UnOp::Neg,
        ast::UnOp::Pos => UnOp::Pos,
        ast::UnOp::Not => UnOp::Not,
    }
}

fn lower_literal(literal: &ast::Literal) -> Operand {
    match literal {
        ast::Literal::Integer(v) => Operand::Integer(*v),
        ast::Literal::Float(v) => Operand::Float(*v),
        ast::Literal::Str(v) => Operand::Str(v.clone()),
        ast::Literal::Boolean(v) => Operand::Boolean(*v),
    }
}

impl Emitter {
    fn new() -> Self {
        Self {
            instructions: Vec::new(),
            temp_counter: 0,
            label_counter: 0,
        }
    }

    fn new_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("t{}", self.temp_counter)
    }

    fn new_label(&mut self) -> String {
        self.label_counter += 1;
        format!("L{}", self.label_counter)
    }

    fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn emit_stmt(&mut self, stmt: &ast::Stmt) {
        match stmt {
            ast::Stmt::Assignment { name, value, .. } => {
                let operand = self.emit_expr(value);
                self.push(Instruction::Assign {
                    result: name.clone(),
                    value: operand,
                });
            }
            ast::Stmt::If {
                condition,
                then_body,
                elif_clauses,
                else_body,
                ..
            } => self.emit_if(condition, then_body, elif_clauses, else_body),
            ast::Stmt::While { condition, body, .. } => self.emit_while(condition, body),
            ast::Stmt::For { variable, iterable, body, .. } => {
                self.emit_for(variable, iterable, body)
            }
            ast::Stmt::FunctionDef { name, body, .. } => {
                self.push(Instruction::Function(name.clone()));
                for stmt in body {
                    self.emit_stmt(stmt);
                }
                self.push(Instruction::EndFunction(name.clone()));
            }
            ast::Stmt::Return { value, .. } => {
                let operand = value.as_ref().map(|expr| self.emit_expr(expr));
                self.push(Instruction::Return(operand));
            }
            ast::Stmt::ExprStmt { expr, .. } => {
                self.emit_expr(expr);
            }
        }
    }

    fn emit_if(
        &mut self,
        condition: &ast::Expr,
        then_body: &[ast::Stmt],
        elif_clauses: &[(ast::Expr, Vec<ast::Stmt>)],
        else_body: &Option<Vec<ast::Stmt>>,
    ) {
        let condition_result = self.emit_expr(condition);
        let mut else_label = self.new_label();
        let end_label = self.new_label();
        self.push(Instruction::IfFalse {
            condition: condition_result,
            label: else_label.clone(),
        });

        for stmt in then_body {
            self.emit_stmt(stmt);
        }
        self.push(Instruction::Goto(end_label.clone()));

        for (elif_condition, elif_body) in elif_clauses {
            self.push(Instruction::Label(else_label.clone()));
            let elif_result = self.emit_expr(elif_condition);
            else_label = self.new_label();
            self.push(Instruction::IfFalse {
                condition: elif_result,
                label: else_label.clone(),
            });
            for stmt in elif_body {
                self.emit_stmt(stmt);
            }
            self.push(Instruction::Goto(end_label.clone()));
        }

        self.push(Instruction::Label(else_label));
        if let Some(else_body) = else_body {
            for stmt in else_body {
                self.emit_stmt(stmt);
            }
        }
        self.push(Instruction::Label(end_label));
    }

    fn emit_while(&mut self, condition: &ast::Expr, body: &[ast::Stmt]) {
        let start_label = self.new_label();
        let end_label = self.new_label();

        self.push(Instruction::Label(start_label.clone()));
        let condition_result = self.emit_expr(condition);
        self.push(Instruction::IfFalse {
            condition: condition_result,
            label: end_label.clone(),
        });
        for stmt in body {
            self.emit_stmt(stmt);
        }
        self.push(Instruction::Goto(start_label));
        self.push(Instruction::Label(end_label));
    }

    /// No separate TAC-level binding for the loop variable's per-iteration
    /// lifetime: each pass through the loop re-assigns the same name via
    /// `INDEX`, exactly as a single mutable slot would.
    fn emit_for(&mut self, variable: &str, iterable: &ast::Expr, body: &[ast::Stmt]) {
        let start_label = self.new_label();
        let end_label = self.new_label();

        let iterable_result = self.emit_expr(iterable);
        let index_var = self.new_temp();
        let length_var = self.new_temp();

        self.push(Instruction::Assign {
            result: index_var.clone(),
            value: Operand::Integer(0),
        });
        self.push(Instruction::Len {
            value: iterable_result.clone(),
            result: length_var.clone(),
        });

        self.push(Instruction::Label(start_label.clone()));
        let condition_temp = self.new_temp();
        self.push(Instruction::BinaryOp {
            op: BinOp::Lt,
            left: Operand::Name(index_var.clone()),
            right: Operand::Name(length_var),
            result: condition_temp.clone(),
        });
        self.push(Instruction::IfFalse {
            condition: Operand::Name(condition_temp),
            label: end_label.clone(),
        });

        self.push(Instruction::Index {
            base: iterable_result,
            index: Operand::Name(index_var.clone()),
            result: variable.to_string(),
        });

        for stmt in body {
            self.emit_stmt(stmt);
        }

        let incremented = self.new_temp();
        self.push(Instruction::BinaryOp {
            op: BinOp::Add,
            left: Operand::Name(index_var.clone()),
            right: Operand::Integer(1),
            result: incremented.clone(),
        });
        self.push(Instruction::Assign {
            result: index_var,
            value: Operand::Name(incremented),
        });

        self.push(Instruction::Goto(start_label));
        self.push(Instruction::Label(end_label));
    }

    fn emit_expr(&mut self, expr: &ast::Expr) -> Operand {
        match expr {
            ast::Expr::Literal { value, .. } => lower_literal(value),
            ast::Expr::Variable { name, .. } => Operand::Name(name.clone()),
            ast::Expr::Binary { left, op, right, .. } => {
                let left = self.emit_expr(left);
                let right = self.emit_expr(right);
                let result = self.new_temp();
                self.push(Instruction::BinaryOp {
                    op: lower_bin_op(op),
                    left,
                    right,
                    result: result.clone(),
                });
                Operand::Name(result)
            }
            ast::Expr::Unary { op, operand, .. } => {
                let operand = self.emit_expr(operand);
                let result = self.new_temp();
                self.push(Instruction::UnaryOp {
                    op: lower_un_op(op),
                    operand,
                    result: result.clone(),
                });
                Operand::Name(result)
            }
            ast::Expr::Call { name, args, .. } => self.emit_call(name, args),
            ast::Expr::List { elements, .. } => {
                let result = self.new_temp();
                self.push(Instruction::CreateList { result: result.clone() });
                for element in elements {
                    let value = self.emit_expr(element);
                    self.push(Instruction::Append {
                        list: result.clone(),
                        value,
                    });
                }
                Operand::Name(result)
            }
            ast::Expr::Index { base, index, .. } => {
                let base = self.emit_expr(base);
                let index = self.emit_expr(index);
                let result = self.new_temp();
                self.push(Instruction::Index {
                    base,
                    index,
                    result: result.clone(),
                });
                Operand::Name(result)
            }
        }
    }

    fn emit_call(&mut self, name: &str, args: &[ast::Expr]) -> Operand {
        if name == "print" {
            let operand = match args.first() {
                Some(arg) => self.emit_expr(arg),
                None => Operand::Str("\"\"".to_string()),
            };
            self.push(Instruction::Print(operand));
            return Operand::Name("None".to_string());
        }

        for arg in args {
            let operand = self.emit_expr(arg);
            self.push(Instruction::Param(operand));
        }
        let result = self.new_temp();
        self.push(Instruction::Call {
            name: name.to_string(),
            argc: args.len(),
            result: result.clone(),
        });
        Operand::Name(result)
    }
}
