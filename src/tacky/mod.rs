/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

pub mod emitter;

use std::fmt;

// The linear three-address IR between the AST and the assembly tree. A
// function is a flat instruction list; values are constants or named
// temporaries. Logical `&&`/`||` do not exist here: the emitter lowers
// them to jumps, which is why this BinaryOp set is two variants smaller
// than the AST's.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Complement,
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LeftShift,
    RightShift,
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Constant(i32),
    Var(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Return(Value),
    Unary {
        op: UnaryOp,
        src: Value,
        dst: String,
    },
    Binary {
        op: BinaryOp,
        lhs: Value,
        rhs: Value,
        dst: String,
    },
    Copy {
        src: Value,
        dst: String,
    },
    Jump(String),
    JumpIfZero {
        condition: Value,
        target: String,
    },
    JumpIfNotZero {
        condition: Value,
        target: String,
    },
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub function: Function,
}

// --- pretty printing (stable dump format used by tests) ---

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Complement => write!(f, "Complement"),
            UnaryOp::Negate => write!(f, "Negate"),
            UnaryOp::Not => write!(f, "Not"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOp::Add => "Add",
            BinaryOp::Subtract => "Subtract",
            BinaryOp::Multiply => "Multiply",
            BinaryOp::Divide => "Divide",
            BinaryOp::Remainder => "Remainder",
            BinaryOp::BitwiseAnd => "BitwiseAnd",
            BinaryOp::BitwiseOr => "BitwiseOr",
            BinaryOp::BitwiseXor => "BitwiseXor",
            BinaryOp::LeftShift => "LeftShift",
            BinaryOp::RightShift => "RightShift",
            BinaryOp::Equal => "Equal",
            BinaryOp::NotEqual => "NotEqual",
            BinaryOp::LessThan => "LessThan",
            BinaryOp::LessOrEqual => "LessOrEqual",
            BinaryOp::GreaterThan => "GreaterThan",
            BinaryOp::GreaterOrEqual => "GreaterOrEqual",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Constant(value) => write!(f, "LiteralConstant({value})"),
            Value::Var(name) => write!(f, "Variable(\"{name}\")"),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Return(value) => write!(f, "Return({value})"),
            Instruction::Unary { op, src, dst } => {
                write!(f, "Unary({op}, {src}, Variable(\"{dst}\"))")
            }
            Instruction::Binary { op, lhs, rhs, dst } => {
                write!(f, "Binary({op}, {lhs}, {rhs}, Variable(\"{dst}\"))")
            }
            Instruction::Copy { src, dst } => write!(f, "Copy({src}, Variable(\"{dst}\"))"),
            Instruction::Jump(target) => write!(f, "Jump(\"{target}\")"),
            Instruction::JumpIfZero { condition, target } => {
                write!(f, "JumpIfZero({condition}, \"{target}\")")
            }
            Instruction::JumpIfNotZero { condition, target } => {
                write!(f, "JumpIfNotZero({condition}, \"{target}\")")
            }
            Instruction::Label(name) => write!(f, "Label(\"{name}\")"),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Function: {}", self.name)?;
        for instruction in &self.instructions {
            writeln!(f, "  {instruction}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.function)
    }
}
