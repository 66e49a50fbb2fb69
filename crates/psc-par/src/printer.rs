use std::fmt::Write as _;

use crate::ast::{BinOp, Expr, Literal, Program, Stmt, UnOp};

fn bin_op_str(op: &BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Pow => "**",
        BinOp::Eq => "==",
        BinOp::NotEq => "!=",
        BinOp::Lt => "<",
        BinOp::LtEq => "<=",
        BinOp::Gt => ">",
        BinOp::GtEq => ">=",
        BinOp::And => "and",
        BinOp::Or => "or",
    }
}

fn un_op_str(op: &UnOp) -> &'static str {
    match op {
        UnOp::Neg => "-",
        UnOp::Pos => "+",
        UnOp::Not => "not ",
    }
}

fn unparse_expr(expr: &Expr, out: &mut String) {
    match expr {
        Expr::Literal { value, .. } => match value {
            Literal::Integer(v) => {
                write!(out, "{v}").unwrap();
            }
            Literal::Float(v) => {
                write!(out, "{v}").unwrap();
            }
            Literal::Str(v) => {
                write!(out, "{v:?}").unwrap();
            }
            Literal::Boolean(v) => {
                out.push_str(if *v { "True" } else { "False" });
            }
        },
        Expr::Variable { name, .. } => out.push_str(name),
        Expr::Binary {
            left, op, right, ..
        } => {
            out.push('(');
            unparse_expr(left, out);
            write!(out, " {} ", bin_op_str(op)).unwrap();
            unparse_expr(right, out);
            out.push(')');
        }
        Expr::Unary { op, operand, .. } => {
            out.push_str(un_op_str(op));
            unparse_expr(operand, out);
        }
        Expr::Call { name, args, .. } => {
            write!(out, "{name}(").unwrap();
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                unparse_expr(arg, out);
            }
            out.push(')');
        }
        Expr::List { elements, .. } => {
            out.push('[');
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                unparse_expr(element, out);
            }
            out.push(']');
        }
        Expr::Index { base, index, .. } => {
            unparse_expr(base, out);
            out.push('[');
            unparse_expr(index, out);
            out.push(']');
        }
    }
}

fn unparse_block(body: &[Stmt], indent: usize, out: &mut String) {
    for stmt in body {
        unparse_stmt(stmt, indent, out);
    }
}

fn unparse_stmt(stmt: &Stmt, indent: usize, out: &mut String) {
    let pad = "    ".repeat(indent);
    match stmt {
        Stmt::Assignment { name, value, .. } => {
            write!(out, "{pad}{name} = ").unwrap();
            unparse_expr(value, out);
            out.push('\n');
        }
        Stmt::If {
            condition,
            then_body,
            elif_clauses,
            else_body,
            ..
        } => {
            write!(out, "{pad}if ").unwrap();
            unparse_expr(condition, out);
            out.push_str(":\n");
            unparse_block(then_body, indent + 1, out);
            for (elif_condition, elif_body) in elif_clauses {
                write!(out, "{pad}elif ").unwrap();
                unparse_expr(elif_condition, out);
                out.push_str(":\n");
                unparse_block(elif_body, indent + 1, out);
            }
            if let Some(else_body) = else_body {
                writeln!(out, "{pad}else:").unwrap();
                unparse_block(else_body, indent + 1, out);
            }
        }
        Stmt::While {
            condition, body, ..
        } => {
            write!(out, "{pad}while ").unwrap();
            unparse_expr(condition, out);
            out.push_str(":\n");
            unparse_block(body, indent + 1, out);
        }
        Stmt::For {
            variable,
            iterable,
            body,
            ..
        } => {
            write!(out, "{pad}for {variable} in ").unwrap();
            unparse_expr(iterable, out);
            out.push_str(":\n");
            unparse_block(body, indent + 1, out);
        }
        Stmt::FunctionDef {
            name, params, body, ..
        } => {
            writeln!(out, "{pad}def {name}({}):", params.join(", ")).unwrap();
            unparse_block(body, indent + 1, out);
        }
        Stmt::Return { value, .. } => {
            write!(out, "{pad}return").unwrap();
            if let Some(value) = value {
                out.push(' ');
                unparse_expr(value, out);
            }
            out.push('\n');
        }
        Stmt::ExprStmt { expr, .. } => {
            unparse_expr(expr, out);
            out.push('\n');
        }
    }
}

/// Reconstruct a textual program equivalent to the parsed [`Program`].
/// Used by the parse-unparse-parse round-trip property test; not meant
/// to preserve the original formatting, only its meaning.
pub fn unparse(program: &Program) -> String {
    let mut out = String::new();
    unparse_block(&program.statements, 0, &mut out);
    out
}

fn dump_expr(expr: &Expr, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    match expr {
        Expr::Literal { value, .. } => {
            writeln!(out, "{pad}Literal({value:?})").unwrap();
        }
        Expr::Variable { name, .. } => {
            writeln!(out, "{pad}Variable({name})").unwrap();
        }
        Expr::Binary {
            left, op, right, ..
        } => {
            writeln!(out, "{pad}Binary({})", bin_op_str(op)).unwrap();
            dump_expr(left, indent + 1, out);
            dump_expr(right, indent + 1, out);
        }
        Expr::Unary { op, operand, .. } => {
            writeln!(out, "{pad}Unary({})", un_op_str(op).trim()).unwrap();
            dump_expr(operand, indent + 1, out);
        }
        Expr::Call { name, args, .. } => {
            writeln!(out, "{pad}Call({name})").unwrap();
            for arg in args {
                dump_expr(arg, indent + 1, out);
            }
        }
        Expr::List { elements, .. } => {
            writeln!(out, "{pad}List").unwrap();
            for element in elements {
                dump_expr(element, indent + 1, out);
            }
        }
        Expr::Index { base, index, .. } => {
            writeln!(out, "{pad}Index").unwrap();
            dump_expr(base, indent + 1, out);
            dump_expr(index, indent + 1, out);
        }
    }
}

fn dump_stmt(stmt: &Stmt, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    match stmt {
        Stmt::Assignment { name, value, .. } => {
            writeln!(out, "{pad}Assignment({name})").unwrap();
            dump_expr(value, indent + 1, out);
        }
        Stmt::If {
            condition,
            then_body,
            elif_clauses,
            else_body,
            ..
        } => {
            writeln!(out, "{pad}If").unwrap();
            dump_expr(condition, indent + 1, out);
            for stmt in then_body {
                dump_stmt(stmt, indent + 1, out);
            }
            for (elif_condition, elif_body) in elif_clauses {
                writeln!(out, "{pad}Elif").unwrap();
                dump_expr(elif_condition, indent + 1, out);
                for stmt in elif_body {
                    dump_stmt(stmt, indent + 1, out);
                }
            }
            if let Some(else_body) = else_body {
                writeln!(out, "{pad}Else").unwrap();
                for stmt in else_body {
                    dump_stmt(stmt, indent + 1, out);
                }
            }
        }
        Stmt::While {
            condition, body, ..
        } => {
            writeln!(out, "{pad}While").unwrap();
            dump_expr(condition, indent + 1, out);
            for stmt in body {
                dump_stmt(stmt, indent + 1, out);
            }
        }
        Stmt::For {
            variable,
            iterable,
            body,
            ..
        } => {
            writeln!(out, "{pad}For({variable})").unwrap();
            dump_expr(iterable, indent + 1, out);
            for stmt in body {
                dump_stmt(stmt, indent + 1, out);
            }
        }
        Stmt::FunctionDef {
            name, params, body, ..
        } => {
            writeln!(out, "{pad}FunctionDef({name}, [{}])", params.join(", ")).unwrap();
            for stmt in body {
                dump_stmt(stmt, indent + 1, out);
            }
        }
        Stmt::Return { value, .. } => {
            writeln!(out, "{pad}Return").unwrap();
            if let Some(value) = value {
                dump_expr(value, indent + 1, out);
            }
        }
        Stmt::ExprStmt { expr, .. } => {
            writeln!(out, "{pad}ExprStmt").unwrap();
            dump_expr(expr, indent + 1, out);
        }
    }
}

/// The indented tree dump written to `<base>_ast.txt`.
pub fn dump(program: &Program) -> String {
    let mut out = String::new();
    for stmt in &program.statements {
        dump_stmt(stmt, 0, &mut out);
    }
    out
}
