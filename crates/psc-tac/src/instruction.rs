use std::fmt;

/// A TAC operand: either a literal value carried inline, or a name
/// referring to a variable, temporary, or parameter slot. Kept as
/// value-typed data rather than a `String`-tagged `Any` the way the
/// reference generator modeled it — the instruction set below encodes
/// the opcode in the `enum` tag instead of a string field.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Integer(i64),
    Float(f64),
    Str(String),
    Boolean(bool),
    Name(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Integer(v) => write!(f, "{v}"),
            Operand::Float(v) => write!(f, "{v}"),
            Operand::Str(v) => write!(f, "{v}"),
            Operand::Boolean(v) => write!(f, "{}", if *v { "True" } else { "False" }),
            Operand::Name(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
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
            BinOp::And => "AND",
            BinOp::Or => "OR",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Pos,
    Not,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnOp::Neg => "NEG",
            UnOp::Pos => "POS",
            UnOp::Not => "NOT",
        };
        write!(f, "{s}")
    }
}

/// One three-address instruction. A tagged union dispatched with
/// `match`, not a generic `(op, arg1, arg2, result)` tuple — every
/// variant only carries the operands that opcode actually uses.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    Assign { result: String, value: Operand },
    BinaryOp { op: BinOp, left: Operand, right: Operand, result: String },
    UnaryOp { op: UnOp, operand: Operand, result: String },
    Label(String),
    Goto(String),
    IfFalse { condition: Operand, label: String },
    IfTrue { condition: Operand, label: String },
    Param(Operand),
    Call { name: String, argc: usize, result: String },
    Print(Operand),
    Return(Option<Operand>),
    Function(String),
    EndFunction(String),
    CreateList { result: String },
    Append { list: String, value: Operand },
    Index { base: Operand, index: Operand, result: String },
    Len { value: Operand, result: String },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { result, value } => write!(f, "{result} = {value}"),
            Instruction::BinaryOp { op, left, right, result } => {
                write!(f, "{result} = {left} {op} {right}")
            }
            Instruction::UnaryOp { op, operand, result } => write!(f, "{result} = {op} {operand}"),
            Instruction::Label(label) => write!(f, "LABEL {label}"),
            Instruction::Goto(label) => write!(f, "GOTO {label}"),
            Instruction::IfFalse { condition, label } => {
                write!(f, "IF_FALSE {condition} GOTO {label}")
            }
            Instruction::IfTrue { condition, label } => {
                write!(f, "IF_TRUE {condition} GOTO {label}")
            }
            Instruction::Param(value) => write!(f, "PARAM {value}"),
            // Matches the textual form of the reference generator: the
            // call's argument count and destination are still carried
            // on the instruction for the x86 emitter, just not echoed
            // in the TAC listing.
            Instruction::Call { name, .. } => write!(f, "CALL {name}"),
            Instruction::Print(value) => write!(f, "PRINT {value}"),
            Instruction::Return(Some(value)) => write!(f, "RETURN {value}"),
            Instruction::Return(None) => write!(f, "RETURN"),
            Instruction::Function(name) => write!(f, "FUNCTION {name}"),
            Instruction::EndFunction(name) => write!(f, "END_FUNCTION {name}"),
            Instruction::CreateList { result } => write!(f, "{result} = CREATE_LIST"),
            Instruction::Append { list, value } => write!(f, "APPEND {list}, {value}"),
            Instruction::Index { base, index, result } => {
                write!(f, "{result} = INDEX {base}, {index}")
            }
            Instruction::Len { value, result } => write!(f, "{result} = LEN {value}"),
        }
    }
}
