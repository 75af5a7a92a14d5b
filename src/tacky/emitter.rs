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

use super::{BinaryOp, Function, Instruction, Program, UnaryOp, Value};
use crate::ast;

/// Hands out `prefix.N` names from a single monotonic counter. One
/// generator is created per compilation, so compiling the same source
/// twice yields identical temporaries and labels.
pub struct NameGenerator {
    counter: usize,
}

impl NameGenerator {
    pub fn new() -> Self {
        NameGenerator { counter: 0 }
    }

    pub fn fresh(&mut self, prefix: &str) -> String {
        let name = format!("{}.{}", prefix, self.counter);
        self.counter += 1;
        name
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        NameGenerator::new()
    }
}

/// Lowers the AST to TACKY. Total over well-formed input; the only state
/// is the fresh-name counter.
pub fn emit_program(program: &ast::Program) -> Program {
    Program {
        function: emit_function(&program.function),
    }
}

fn emit_function(function: &ast::Function) -> Function {
    let mut names = NameGenerator::new();
    let mut instructions = Vec::new();
    let ast::Statement::Return(expression) = &function.body;
    let value = emit_expression(expression, &function.name, &mut names, &mut instructions);
    instructions.push(Instruction::Return(value));
    Function {
        name: function.name.clone(),
        instructions,
    }
}

fn emit_expression(
    expression: &ast::Expression,
    function: &str,
    names: &mut NameGenerator,
    out: &mut Vec<Instruction>,
) -> Value {
    match expression {
        ast::Expression::Constant(value) => Value::Constant(*value),
        ast::Expression::Unary(op, operand) => {
            let src = emit_expression(operand, function, names, out);
            let dst = names.fresh(function);
            out.push(Instruction::Unary {
                op: unary_op(*op),
                src,
                dst: dst.clone(),
            });
            Value::Var(dst)
        }
        ast::Expression::Binary(ast::BinaryOp::And, lhs, rhs) => {
            // Short circuit: the right operand only runs when the left
            // was nonzero.
            let lhs = emit_expression(lhs, function, names, out);
            let false_label = names.fresh("and_false");
            let end_label = names.fresh("and_end");
            let dst = names.fresh(function);
            out.push(Instruction::JumpIfZero {
                condition: lhs,
                target: false_label.clone(),
            });
            let rhs = emit_expression(rhs, function, names, out);
            out.push(Instruction::JumpIfZero {
                condition: rhs,
                target: false_label.clone(),
            });
            out.push(Instruction::Copy {
                src: Value::Constant(1),
                dst: dst.clone(),
            });
            out.push(Instruction::Jump(end_label.clone()));
            out.push(Instruction::Label(false_label));
            out.push(Instruction::Copy {
                src: Value::Constant(0),
                dst: dst.clone(),
            });
            out.push(Instruction::Label(end_label));
            Value::Var(dst)
        }
        ast::Expression::Binary(ast::BinaryOp::Or, lhs, rhs) => {
            let lhs = emit_expression(lhs, function, names, out);
            let true_label = names.fresh("or_true");
            let end_label = names.fresh("or_end");
            let dst = names.fresh(function);
            out.push(Instruction::JumpIfNotZero {
                condition: lhs,
                target: true_label.clone(),
            });
            let rhs = emit_expression(rhs, function, names, out);
            out.push(Instruction::JumpIfNotZero {
                condition: rhs,
                target: true_label.clone(),
            });
            out.push(Instruction::Copy {
                src: Value::Constant(0),
                dst: dst.clone(),
            });
            out.push(Instruction::Jump(end_label.clone()));
            out.push(Instruction::Label(true_label));
            out.push(Instruction::Copy {
                src: Value::Constant(1),
                dst: dst.clone(),
            });
            out.push(Instruction::Label(end_label));
            Value::Var(dst)
        }
        ast::Expression::Binary(op, lhs, rhs) => {
            let lhs = emit_expression(lhs, function, names, out);
            let rhs = emit_expression(rhs, function, names, out);
            let dst = names.fresh(function);
            out.push(Instruction::Binary {
                op: binary_op(*op),
                lhs,
                rhs,
                dst: dst.clone(),
            });
            Value::Var(dst)
        }
    }
}

fn unary_op(op: ast::UnaryOp) -> UnaryOp {
    match op {
        ast::UnaryOp::Complement => UnaryOp::Complement,
        ast::UnaryOp::Negate => UnaryOp::Negate,
        ast::UnaryOp::Not => UnaryOp::Not,
    }
}

fn binary_op(op: ast::BinaryOp) -> BinaryOp {
    match op {
        ast::BinaryOp::Add => BinaryOp::Add,
        ast::BinaryOp::Subtract => BinaryOp::Subtract,
        ast::BinaryOp::Multiply => BinaryOp::Multiply,
        ast::BinaryOp::Divide => BinaryOp::Divide,
        ast::BinaryOp::Remainder => BinaryOp::Remainder,
        ast::BinaryOp::BitwiseAnd => BinaryOp::BitwiseAnd,
        ast::BinaryOp::BitwiseOr => BinaryOp::BitwiseOr,
        ast::BinaryOp::BitwiseXor => BinaryOp::BitwiseXor,
        ast::BinaryOp::LeftShift => BinaryOp::LeftShift,
        ast::BinaryOp::RightShift => BinaryOp::RightShift,
        ast::BinaryOp::Equal => BinaryOp::Equal,
        ast::BinaryOp::NotEqual => BinaryOp::NotEqual,
        ast::BinaryOp::LessThan => BinaryOp::LessThan,
        ast::BinaryOp::LessOrEqual => BinaryOp::LessOrEqual,
        ast::BinaryOp::GreaterThan => BinaryOp::GreaterThan,
        ast::BinaryOp::GreaterOrEqual => BinaryOp::GreaterOrEqual,
        // Lowered to jumps by the arms above.
        ast::BinaryOp::And | ast::BinaryOp::Or => {
            unreachable!("logical operators lower to jumps")
        }
    }
}

// ------------- unit tests –------------
