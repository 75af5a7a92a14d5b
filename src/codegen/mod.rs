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

pub mod fixup;
pub mod pseudo;

use crate::tacky;
use std::fmt;

// The pseudo-assembly tree. Operands may still name pseudo-registers
// after translation; `pseudo::replace_pseudo_registers` turns those into
// stack slots and `fixup::fix_up_instructions` rewrites anything the ISA
// will not encode.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    Ax,
    Cx,
    Dx,
    R10,
    R11,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Imm(i32),
    Reg(Reg),
    Pseudo(String),
    Stack(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mult,
    And,
    Or,
    Xor,
    Shl,
    Sar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondCode {
    E,
    Ne,
    L,
    Le,
    G,
    Ge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Mov { src: Operand, dst: Operand },
    // 8-bit move, used to stage shift counts into %cl.
    Movb { src: Operand, dst: Operand },
    Unary { op: UnaryOp, dst: Operand },
    Binary { op: BinaryOp, src: Operand, dst: Operand },
    Idiv(Operand),
    Cdq,
    Cmp { src: Operand, dst: Operand },
    Jmp(String),
    JmpCC { cond: CondCode, target: String },
    SetCC { cond: CondCode, dst: Operand },
    Label(String),
    AllocateStack(i64),
    Ret,
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

/// Translates TACKY into the pseudo-assembly tree, one instruction at a
/// time. Purely syntactic: temporaries become pseudo-registers and every
/// TACKY instruction expands to a fixed shape.
pub fn generate(program: &tacky::Program) -> Program {
    Program {
        function: generate_function(&program.function),
    }
}

fn generate_function(function: &tacky::Function) -> Function {
    let mut instructions = Vec::new();
    for instruction in &function.instructions {
        generate_instruction(instruction, &mut instructions);
    }
    Function {
        name: function.name.clone(),
        instructions,
    }
}

fn operand(value: &tacky::Value) -> Operand {
    match value {
        tacky::Value::Constant(value) => Operand::Imm(*value),
        tacky::Value::Var(name) => Operand::Pseudo(name.clone()),
    }
}

fn generate_instruction(instruction: &tacky::Instruction, out: &mut Vec<Instruction>) {
    match instruction {
        tacky::Instruction::Return(value) => {
            out.push(Instruction::Mov {
                src: operand(value),
                dst: Operand::Reg(Reg::Ax),
            });
            out.push(Instruction::Ret);
        }
        tacky::Instruction::Unary {
            op: tacky::UnaryOp::Not,
            src,
            dst,
        } => {
            // !x is a comparison against zero, not an x86 unary.
            let dst = Operand::Pseudo(dst.clone());
            out.push(Instruction::Cmp {
                src: Operand::Imm(0),
                dst: operand(src),
            });
            out.push(Instruction::Mov {
                src: Operand::Imm(0),
                dst: dst.clone(),
            });
            out.push(Instruction::SetCC {
                cond: CondCode::E,
                dst,
            });
        }
        tacky::Instruction::Unary { op, src, dst } => {
            let dst = Operand::Pseudo(dst.clone());
            out.push(Instruction::Mov {
                src: operand(src),
                dst: dst.clone(),
            });
            let op = match op {
                tacky::UnaryOp::Complement => UnaryOp::Not,
                tacky::UnaryOp::Negate => UnaryOp::Neg,
                tacky::UnaryOp::Not => unreachable!("handled above"),
            };
            out.push(Instruction::Unary { op, dst });
        }
        tacky::Instruction::Binary { op, lhs, rhs, dst } => {
            generate_binary(*op, lhs, rhs, dst, out);
        }
        tacky::Instruction::Copy { src, dst } => {
            out.push(Instruction::Mov {
                src: operand(src),
                dst: Operand::Pseudo(dst.clone()),
            });
        }
        tacky::Instruction::Jump(target) => {
            out.push(Instruction::Jmp(target.clone()));
        }
        tacky::Instruction::JumpIfZero { condition, target } => {
            out.push(Instruction::Cmp {
                src: Operand::Imm(0),
                dst: operand(condition),
            });
            out.push(Instruction::JmpCC {
                cond: CondCode::E,
                target: target.clone(),
            });
        }
        tacky::Instruction::JumpIfNotZero { condition, target } => {
            out.push(Instruction::Cmp {
                src: Operand::Imm(0),
                dst: operand(condition),
            });
            out.push(Instruction::JmpCC {
                cond: CondCode::Ne,
                target: target.clone(),
            });
        }
        tacky::Instruction::Label(name) => {
            out.push(Instruction::Label(name.clone()));
        }
    }
}

fn generate_binary(
    op: tacky::BinaryOp,
    lhs: &tacky::Value,
    rhs: &tacky::Value,
    dst: &str,
    out: &mut Vec<Instruction>,
) {
    let dst = Operand::Pseudo(dst.to_string());
    match op {
        // Division and remainder go through the idiv protocol: dividend
        // in eax, sign-extended into edx, quotient in eax, remainder in
        // edx.
        tacky::BinaryOp::Divide | tacky::BinaryOp::Remainder => {
            let result = if op == tacky::BinaryOp::Divide {
                Reg::Ax
            } else {
                Reg::Dx
            };
            out.push(Instruction::Mov {
                src: operand(lhs),
                dst: Operand::Reg(Reg::Ax),
            });
            out.push(Instruction::Cdq);
            out.push(Instruction::Idiv(operand(rhs)));
            out.push(Instruction::Mov {
                src: Operand::Reg(result),
                dst,
            });
        }
        // Relationals compare and capture the flag. The operands swap
        // relative to TACKY because AT&T `cmp b, a` computes a - b.
        tacky::BinaryOp::Equal
        | tacky::BinaryOp::NotEqual
        | tacky::BinaryOp::LessThan
        | tacky::BinaryOp::LessOrEqual
        | tacky::BinaryOp::GreaterThan
        | tacky::BinaryOp::GreaterOrEqual => {
            out.push(Instruction::Cmp {
                src: operand(rhs),
                dst: operand(lhs),
            });
            out.push(Instruction::Mov {
                src: Operand::Imm(0),
                dst: dst.clone(),
            });
            out.push(Instruction::SetCC {
                cond: condition_code(op),
                dst,
            });
        }
        _ => {
            let op = match op {
                tacky::BinaryOp::Add => BinaryOp::Add,
                tacky::BinaryOp::Subtract => BinaryOp::Sub,
                tacky::BinaryOp::Multiply => BinaryOp::Mult,
                tacky::BinaryOp::BitwiseAnd => BinaryOp::And,
                tacky::BinaryOp::BitwiseOr => BinaryOp::Or,
                tacky::BinaryOp::BitwiseXor => BinaryOp::Xor,
                tacky::BinaryOp::LeftShift => BinaryOp::Shl,
                tacky::BinaryOp::RightShift => BinaryOp::Sar,
                _ => unreachable!("handled above"),
            };
            out.push(Instruction::Mov {
                src: operand(lhs),
                dst: dst.clone(),
            });
            out.push(Instruction::Binary {
                op,
                src: operand(rhs),
                dst,
            });
        }
    }
}

fn condition_code(op: tacky::BinaryOp) -> CondCode {
    match op {
        tacky::BinaryOp::Equal => CondCode::E,
        tacky::BinaryOp::NotEqual => CondCode::Ne,
        tacky::BinaryOp::LessThan => CondCode::L,
        tacky::BinaryOp::LessOrEqual => CondCode::Le,
        tacky::BinaryOp::GreaterThan => CondCode::G,
        tacky::BinaryOp::GreaterOrEqual => CondCode::Ge,
        _ => unreachable!("not a relational operator"),
    }
}

// --- pretty printing (stable dump format used by tests) ---

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg::Ax => "%ax",
            Reg::Cx => "%cx",
            Reg::Dx => "%dx",
            Reg::R10 => "%r10",
            Reg::R11 => "%r11",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Imm(value) => write!(f, "ImmediateValue: {value}"),
            Operand::Reg(reg) => write!(f, "Register: {reg}"),
            Operand::Pseudo(name) => write!(f, "PseudoRegister: {name}"),
            Operand::Stack(offset) => write!(f, "StackOffset: {offset}"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "Neg"),
            UnaryOp::Not => write!(f, "Not"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOp::Add => "Add",
            BinaryOp::Sub => "Sub",
            BinaryOp::Mult => "Mult",
            BinaryOp::And => "And",
            BinaryOp::Or => "Or",
            BinaryOp::Xor => "Xor",
            BinaryOp::Shl => "Shl",
            BinaryOp::Sar => "Sar",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for CondCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CondCode::E => "E",
            CondCode::Ne => "NE",
            CondCode::L => "L",
            CondCode::Le => "LE",
            CondCode::G => "G",
            CondCode::Ge => "GE",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Mov { src, dst } => write!(f, "Instruction: Mov ({src}), ({dst})"),
            Instruction::Movb { src, dst } => write!(f, "Instruction: Movb ({src}), ({dst})"),
            Instruction::Unary { op, dst } => write!(f, "Instruction: Unary ({op}), ({dst})"),
            Instruction::Binary { op, src, dst } => {
                write!(f, "Instruction: Binary ({op}), ({src}), ({dst})")
            }
            Instruction::Idiv(operand) => write!(f, "Instruction: Idiv ({operand})"),
            Instruction::Cdq => write!(f, "Instruction: Cdq"),
            Instruction::Cmp { src, dst } => write!(f, "Instruction: Cmp ({src}), ({dst})"),
            Instruction::Jmp(target) => write!(f, "Instruction: Jmp ({target})"),
            Instruction::JmpCC { cond, target } => {
                write!(f, "Instruction: JmpCC ({cond}), ({target})")
            }
            Instruction::SetCC { cond, dst } => {
                write!(f, "Instruction: SetCC ({cond}), ({dst})")
            }
            Instruction::Label(name) => write!(f, "Instruction: Label ({name})"),
            Instruction::AllocateStack(size) => {
                write!(f, "Instruction: AllocateStack({size})")
            }
            Instruction::Ret => write!(f, "Instruction: Ret"),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Function: {}", self.name)?;
        for instruction in &self.instructions {
            writeln!(f, "    {instruction}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program:")?;
        write!(f, "{}", self.function)
    }
}

// ------------- unit tests –------------
