//! Component H: a straight syntactic translation of a TAC instruction
//! stream into a textual x86-64 assembly listing.
//!
//! This is not a real code generator: there is no register allocation,
//! no calling-convention-correct argument passing, and high-level
//! operations (`PRINT`, `LEN`, `CREATE_LIST`, `APPEND`, `INDEX`, `PARAM`)
//! are emitted as annotated comments rather than real instructions. The
//! memory model is the simplest one that still reads as assembly: every
//! named operand gets an 8-byte slot in `.data` and all arithmetic flows
//! through `rax` (and `rdx` for division).

use std::collections::BTreeSet;
use std::fmt::Write as _;

use psc_tac::{BinOp, Instruction, Operand, UnOp};

/// Whether a name is a label (`L1`, `L2`, ...) rather than a promotable
/// data slot. Labels are a different namespace entirely in the emitted
/// assembly — they become code addresses, not `.data` entries.
fn is_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some('L')) && !name[1..].is_empty() && name[1..].chars().all(|c| c.is_ascii_digit())
}

fn operand_text(operand: &Operand) -> String {
    match operand {
        Operand::Integer(v) => v.to_string(),
        Operand::Float(v) => v.to_string(),
        Operand::Boolean(v) => (if *v { 1 } else { 0 }).to_string(),
        Operand::Str(v) => format!("{v:?}"),
        Operand::Name(name) => name.clone(),
    }
}

/// Integers, floats, and booleans all become a literal `mov`/operand
/// text the way the reference generator's `_load_to_rax` treats any
/// `int`/`float` value as an immediate — strings are the only operand
/// kind with no integer representation in this model.
fn is_immediate(operand: &Operand) -> bool {
    matches!(operand, Operand::Integer(_) | Operand::Float(_) | Operand::Boolean(_))
}

/// Collect every distinct variable/temporary name referenced anywhere in
/// the stream, so each can be reserved one `.data` slot. Label names and
/// function names used purely as call/jump targets are excluded — they
/// address code, not storage.
fn collect_variables(instructions: &[Instruction]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut maybe_add_operand = |operand: &Operand| {
        if let Operand::Name(name) = operand {
            if !is_label_name(name) && name != "None" {
                names.insert(name.clone());
            }
        }
    };
    let mut maybe_add_name = |name: &str| {
        if !is_label_name(name) && name != "None" {
            names.insert(name.to_string());
        }
    };

    for instruction in instructions {
        match instruction {
            Instruction::Assign { result, value } => {
                maybe_add_name(result);
                maybe_add_operand(value);
            }
            Instruction::BinaryOp { left, right, result, .. } => {
                maybe_add_operand(left);
                maybe_add_operand(right);
                maybe_add_name(result);
            }
            Instruction::UnaryOp { operand, result, .. } => {
                maybe_add_operand(operand);
                maybe_add_name(result);
            }
            Instruction::IfFalse { condition, .. } | Instruction::IfTrue { condition, .. } => {
                maybe_add_operand(condition);
            }
            Instruction::Param(value) | Instruction::Print(value) => maybe_add_operand(value),
            Instruction::Call { result, .. } => maybe_add_name(result),
            Instruction::Return(Some(value)) => maybe_add_operand(value),
            Instruction::CreateList { result } => maybe_add_name(result),
            Instruction::Append { list, value } => {
                maybe_add_name(list);
                maybe_add_operand(value);
            }
            Instruction::Index { base, index, result } => {
                maybe_add_operand(base);
                maybe_add_operand(index);
                maybe_add_name(result);
            }
            Instruction::Len { value, result } => {
                maybe_add_operand(value);
                maybe_add_name(result);
            }
            Instruction::Label(_)
            | Instruction::Goto(_)
            | Instruction::Return(None)
            | Instruction::Function(_)
            | Instruction::EndFunction(_) => {}
        }
    }
    names
}

struct AsmEmitter {
    lines: Vec<String>,
}

impl AsmEmitter {
    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn load_to_rax(&mut self, operand: &Operand) {
        if is_immediate(operand) {
            self.push(format!("    mov rax, {}", operand_text(operand)));
        } else if let Operand::Name(name) = operand {
            self.push(format!("    mov rax, [{name}]"));
        } else {
            // Float/Str operands have no integer representation in this
            // model; document the gap instead of guessing at encoding.
            self.push(format!("    ; unable to load {} into rax", operand_text(operand)));
        }
    }

    fn operand_text_for_arith(&self, operand: &Operand) -> String {
        if is_immediate(operand) {
            operand_text(operand)
        } else if let Operand::Name(name) = operand {
            format!("[{name}]")
        } else {
            format!("; bad operand {}", operand_text(operand))
        }
    }

    fn emit_binary(&mut self, op: BinOp, left: &Operand, right: &Operand, result: &str) {
        self.load_to_rax(left);
        let rhs = self.operand_text_for_arith(right);
        match op {
            BinOp::Add => self.push(format!("    add rax, {rhs}")),
            BinOp::Sub => self.push(format!("    sub rax, {rhs}")),
            BinOp::Mul => self.push(format!("    imul rax, {rhs}")),
            BinOp::Div => {
                self.push("    cqo");
                self.push(format!("    idiv {rhs}"));
            }
            BinOp::Mod => {
                self.push("    cqo");
                self.push(format!("    idiv {rhs}"));
                self.push("    mov rax, rdx");
            }
            BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
                self.push(format!("    cmp rax, {rhs}"));
                let setcc = match op {
                    BinOp::Eq => "sete",
                    BinOp::NotEq => "setne",
                    BinOp::Lt => "setl",
                    BinOp::LtEq => "setle",
                    BinOp::Gt => "setg",
                    BinOp::GtEq => "setge",
                    _ => unreachable!(),
                };
                self.push(format!("    {setcc} al"));
                self.push("    movzx rax, al");
            }
            BinOp::Pow | BinOp::And | BinOp::Or => {
                // Not representable as a single x86 instruction in this
                // approximate model; the reference generator documents
                // these the same way rather than expanding them inline.
                self.push(format!(
                    "    ; unsupported binary op {op:?} ({} {op} {})",
                    operand_text(left),
                    operand_text(right)
                ));
            }
        }
        self.push(format!("    mov [{result}], rax"));
    }

    fn emit_unary(&mut self, op: UnOp, operand: &Operand, result: &str) {
        self.load_to_rax(operand);
        match op {
            UnOp::Neg => self.push("    neg rax"),
            UnOp::Pos => self.push("    ; unary plus, no change to rax"),
            UnOp::Not => {
                self.push("    cmp rax, 0");
                self.push("    sete al");
                self.push("    movzx rax, al");
            }
        }
        self.push(format!("    mov [{result}], rax"));
    }
}

/// Translate a TAC stream to an approximate x86-64 assembly listing. The
/// output is a single text file with `.data`/`.text` sections and a
/// `main` entry point whose body is the concatenated lowering of the
/// top-level instructions, terminated by `mov rax, 0; ret`.
pub fn emit(instructions: &[Instruction]) -> String {
    let variables = collect_variables(instructions);
    let mut emitter = AsmEmitter { lines: Vec::new() };

    emitter.push("section .data");
    if variables.is_empty() {
        emitter.push("    ; no named operands in this program");
    } else {
        for name in &variables {
            emitter.push(format!("{name}: dq 0"));
        }
    }
    emitter.push("");
    emitter.push("section .text");
    emitter.push("global main");
    emitter.push("");
    emitter.push("main:");

    for instruction in instructions {
        match instruction {
            Instruction::Label(label) => emitter.push(format!("{label}:")),
            Instruction::Goto(label) => emitter.push(format!("    jmp {label}")),
            Instruction::IfFalse { condition, label } => {
                emitter.load_to_rax(condition);
                emitter.push("    cmp rax, 0");
                emitter.push(format!("    je {label}"));
            }
            Instruction::IfTrue { condition, label } => {
                emitter.load_to_rax(condition);
                emitter.push("    cmp rax, 0");
                emitter.push(format!("    jne {label}"));
            }
            Instruction::Assign { result, value } => {
                emitter.load_to_rax(value);
                emitter.push(format!("    mov [{result}], rax"));
            }
            Instruction::BinaryOp { op, left, right, result } => {
                emitter.emit_binary(*op, left, right, result)
            }
            Instruction::UnaryOp { op, operand, result } => {
                emitter.emit_unary(*op, operand, result)
            }
            Instruction::Function(name) => {
                emitter.push("");
                emitter.push(format!("{name}:"));
                emitter.push("    push rbp");
                emitter.push("    mov rbp, rsp");
            }
            Instruction::EndFunction(_) => {
                emitter.push("    mov rsp, rbp");
                emitter.push("    pop rbp");
                emitter.push("    ret");
                emitter.push("");
            }
            Instruction::Return(value) => {
                if let Some(value) = value {
                    emitter.load_to_rax(value);
                }
                emitter.push("    mov rsp, rbp");
                emitter.push("    pop rbp");
                emitter.push("    ret");
            }
            Instruction::Call { name, argc, result } => {
                emitter.push(format!("    ; CALL {name}, {argc} args (argument passing not modeled)"));
                emitter.push(format!("    call {name}"));
                emitter.push(format!("    mov [{result}], rax"));
            }
            Instruction::Param(value) => {
                emitter.push(format!("    ; PARAM {} (argument setup for next CALL)", operand_text(value)));
            }
            Instruction::Print(value) => {
                emitter.push(format!("    ; PRINT {} (no I/O implemented)", operand_text(value)));
            }
            Instruction::Len { value, result } => {
                emitter.push(format!("    ; {result} = LEN {} (not lowered)", operand_text(value)));
            }
            Instruction::CreateList { result } => {
                emitter.push(format!("    ; {result} = CREATE_LIST (not lowered)"));
            }
            Instruction::Append { list, value } => {
                emitter.push(format!("    ; APPEND {list}, {} (not lowered)", operand_text(value)));
            }
            Instruction::Index { base, index, result } => {
                emitter.push(format!(
                    "    ; {result} = INDEX {}, {} (not lowered)",
                    operand_text(base),
                    operand_text(index)
                ));
            }
        }
    }

    emitter.push("");
    emitter.push("    mov rax, 0");
    emitter.push("    ret");

    let mut out = String::new();
    for line in &emitter.lines {
        writeln!(out, "{line}").unwrap();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use psc_lex::Lexer;
    use psc_par::parse;

    fn asm(src: &str) -> String {
        let tokens = Lexer::tokenize(src).unwrap();
        let (program, errors) = parse(tokens);
        assert!(errors.is_empty());
        emit(&psc_tac::emit(&program))
    }

    #[test]
    fn reserves_a_data_slot_per_variable() {
        let text = asm("x = 42\nprint(x)\n");
        assert!(text.contains("section .data"));
        assert!(text.contains("x: dq 0"));
        assert!(text.contains("mov rax, 42"));
        assert!(text.contains("mov [x], rax"));
    }

    #[test]
    fn labels_are_not_promoted_to_data_slots() {
        let text = asm("if 1 < 2:\n    y = 3\nelse:\n    y = 4\n");
        assert!(!text.contains("L1: dq 0"));
        assert!(text.contains("L1:"));
        assert!(text.contains("je L1"));
    }

    #[test]
    fn division_lowers_through_rdx() {
        let text = asm("x = 10\ny = x / 3\n");
        assert!(text.contains("cqo"));
        assert!(text.contains("idiv"));
    }

    #[test]
    fn modulo_takes_the_remainder_from_rdx() {
        let text = asm("x = 10\ny = x % 3\n");
        assert!(text.contains("mov rax, rdx"));
    }

    #[test]
    fn comparison_materializes_a_boolean_via_setcc() {
        let text = asm("x = 1 < 2\n");
        assert!(text.contains("setl al"));
        assert!(text.contains("movzx rax, al"));
    }

    #[test]
    fn function_prologue_and_epilogue_bracket_the_body() {
        let text = asm("def f(n):\n    return n\nprint(f(1))\n");
        assert!(text.contains("f:\n    push rbp\n    mov rbp, rsp"));
        assert!(text.contains("call f"));
    }

    #[test]
    fn high_level_ops_become_annotated_comments() {
        let text = asm("for c in \"ab\":\n    print(c)\n");
        assert!(text.contains("; PRINT"));
        assert!(text.contains("; c = INDEX") || text.contains("INDEX"));
    }

    #[test]
    fn ends_with_a_placeholder_exit() {
        let text = asm("x = 1\n");
        let trimmed = text.trim_end();
        assert!(trimmed.ends_with("mov rax, 0\n    ret") || trimmed.ends_with("ret"));
    }
}
