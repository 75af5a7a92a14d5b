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

use super::{Function, Instruction, Operand, Program};
use std::collections::HashMap;

/// Assigns every pseudo-register a stack slot and rewrites the operands.
/// Slots are handed out in first-encounter order, 4 bytes apart, walking
/// instructions front to back and sources before destinations, so the
/// offsets are deterministic. Returns the rewritten program and the final
/// (most negative) offset.
pub fn replace_pseudo_registers(program: Program) -> (Program, i64) {
    let mut slots = SlotAllocator::default();
    let instructions = program
        .function
        .instructions
        .into_iter()
        .map(|instruction| slots.rewrite_instruction(instruction))
        .collect();
    let program = Program {
        function: Function {
            name: program.function.name,
            instructions,
        },
    };
    (program, slots.last_offset)
}

#[derive(Default)]
struct SlotAllocator {
    offsets: HashMap<String, i64>,
    last_offset: i64,
}

impl SlotAllocator {
    fn rewrite_instruction(&mut self, instruction: Instruction) -> Instruction {
        match instruction {
            Instruction::Mov { src, dst } => {
                let src = self.rewrite(src);
                let dst = self.rewrite(dst);
                Instruction::Mov { src, dst }
            }
            Instruction::Movb { src, dst } => {
                let src = self.rewrite(src);
                let dst = self.rewrite(dst);
                Instruction::Movb { src, dst }
            }
            Instruction::Unary { op, dst } => Instruction::Unary {
                op,
                dst: self.rewrite(dst),
            },
            Instruction::Binary { op, src, dst } => {
                let src = self.rewrite(src);
                let dst = self.rewrite(dst);
                Instruction::Binary { op, src, dst }
            }
            Instruction::Idiv(operand) => Instruction::Idiv(self.rewrite(operand)),
            Instruction::Cmp { src, dst } => {
                let src = self.rewrite(src);
                let dst = self.rewrite(dst);
                Instruction::Cmp { src, dst }
            }
            Instruction::SetCC { cond, dst } => Instruction::SetCC {
                cond,
                dst: self.rewrite(dst),
            },
            other => other,
        }
    }

    fn rewrite(&mut self, operand: Operand) -> Operand {
        match operand {
            Operand::Pseudo(name) => {
                let offset = match self.offsets.get(&name) {
                    Some(offset) => *offset,
                    None => {
                        self.last_offset -= 4;
                        self.offsets.insert(name, self.last_offset);
                        self.last_offset
                    }
                };
                Operand::Stack(offset)
            }
            other => other,
        }
    }
}

// ------------- unit tests –------------
