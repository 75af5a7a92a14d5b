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

use super::{BinaryOp, Function, Instruction, Operand, Program, Reg};

// Stack frames stay 16-byte aligned, as the ABI expects at call sites.
fn round_up_to_alignment(size: i64) -> i64 {
    (size + 15) / 16 * 16
}

/// Rewrites instructions into encodable forms and prepends the stack
/// allocation for the function's spill slots. The rules:
/// - no instruction may have two memory operands (bounce through %r10d);
/// - `imul` cannot write to memory (compute in %r11d, store after);
/// - shift counts live in %cl (staged via %r11b);
/// - `idiv` takes no immediates; `cmp` cannot compare *into* one.
pub fn fix_up_instructions(program: Program, last_offset: i64) -> Program {
    let Function { name, instructions } = program.function;
    let mut fixed = vec![Instruction::AllocateStack(round_up_to_alignment(
        last_offset.abs(),
    ))];
    for instruction in instructions {
        fix_up_instruction(instruction, &mut fixed);
    }
    Program {
        function: Function {
            name,
            instructions: fixed,
        },
    }
}

fn fix_up_instruction(instruction: Instruction, out: &mut Vec<Instruction>) {
    match instruction {
        Instruction::Mov {
            src: src @ Operand::Stack(_),
            dst: dst @ Operand::Stack(_),
        } => {
            out.push(Instruction::Mov {
                src,
                dst: Operand::Reg(Reg::R10),
            });
            out.push(Instruction::Mov {
                src: Operand::Reg(Reg::R10),
                dst,
            });
        }
        Instruction::Binary {
            op: op @ (BinaryOp::Shl | BinaryOp::Sar),
            src,
            dst,
        } => {
            // The count is staged through %r11b so a source that already
            // aliases %cl cannot be clobbered mid-sequence.
            out.push(Instruction::Movb {
                src,
                dst: Operand::Reg(Reg::R11),
            });
            out.push(Instruction::Movb {
                src: Operand::Reg(Reg::R11),
                dst: Operand::Reg(Reg::Cx),
            });
            out.push(Instruction::Binary {
                op,
                src: Operand::Reg(Reg::Cx),
                dst,
            });
        }
        Instruction::Binary {
            op: BinaryOp::Mult,
            src,
            dst: dst @ Operand::Stack(_),
        } => {
            out.push(Instruction::Mov {
                src: dst.clone(),
                dst: Operand::Reg(Reg::R11),
            });
            out.push(Instruction::Binary {
                op: BinaryOp::Mult,
                src,
                dst: Operand::Reg(Reg::R11),
            });
            out.push(Instruction::Mov {
                src: Operand::Reg(Reg::R11),
                dst,
            });
        }
        Instruction::Binary {
            op,
            src: src @ Operand::Stack(_),
            dst: dst @ Operand::Stack(_),
        } => {
            out.push(Instruction::Mov {
                src,
                dst: Operand::Reg(Reg::R10),
            });
            out.push(Instruction::Binary {
                op,
                src: Operand::Reg(Reg::R10),
                dst,
            });
        }
        Instruction::Idiv(operand @ Operand::Imm(_)) => {
            out.push(Instruction::Mov {
                src: operand,
                dst: Operand::Reg(Reg::R10),
            });
            out.push(Instruction::Idiv(Operand::Reg(Reg::R10)));
        }
        Instruction::Cmp {
            src: src @ Operand::Stack(_),
            dst: dst @ Operand::Stack(_),
        } => {
            out.push(Instruction::Mov {
                src,
                dst: Operand::Reg(Reg::R10),
            });
            out.push(Instruction::Cmp {
                src: Operand::Reg(Reg::R10),
                dst,
            });
        }
        Instruction::Cmp {
            src,
            dst: dst @ Operand::Imm(_),
        } => {
            out.push(Instruction::Mov {
                src: dst,
                dst: Operand::Reg(Reg::R11),
            });
            out.push(Instruction::Cmp {
                src,
                dst: Operand::Reg(Reg::R11),
            });
        }
        legal => out.push(legal),
    }
}

// ------------- unit tests –------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{CondCode, generate, pseudo::replace_pseudo_registers};
    use crate::{parser, tacky::emitter};

    fn lower(source: &str) -> Program {
        let assembly = generate(&emitter::emit_program(&parser::parse(source).unwrap()));
        let (assembly, last_offset) = replace_pseudo_registers(assembly);
        fix_up_instructions(assembly, last_offset)
    }

    #[test]
    fn test_stack_to_stack_moves_bounce_through_r10() {
        let program = lower("int main(void) {\n  return -(~2);\n}");
        assert_eq!(
            program.to_string(),
            "Program:\n\
             \x20 Function: main\n\
             \x20   Instruction: AllocateStack(16)\n\
             \x20   Instruction: Mov (ImmediateValue: 2), (StackOffset: -4)\n\
             \x20   Instruction: Unary (Not), (StackOffset: -4)\n\
             \x20   Instruction: Mov (StackOffset: -4), (Register: %r10)\n\
             \x20   Instruction: Mov (Register: %r10), (StackOffset: -8)\n\
             \x20   Instruction: Unary (Neg), (StackOffset: -8)\n\
             \x20   Instruction: Mov (StackOffset: -8), (Register: %ax)\n\
             \x20   Instruction: Ret\n"
        );
    }

    #[test]
    fn test_stack_allocation_is_rounded_up_to_sixteen_bytes() {
        let program = lower("int main(void) { return ~1; }");
        assert_eq!(
            program.function.instructions[0],
            Instruction::AllocateStack(16)
        );
        // Five temporaries: 20 bytes of slots round up to 32.
        let program = lower("int main(void) { return ~(~(~(~(~1)))); }");
        assert_eq!(
            program.function.instructions[0],
            Instruction::AllocateStack(32)
        );
    }

    #[test]
    fn test_a_function_without_slots_allocates_zero() {
        let program = lower("int main(void) { return 2; }");
        assert_eq!(
            program.function.instructions[0],
            Instruction::AllocateStack(0)
        );
    }

    #[test]
    fn test_add_with_two_stack_operands_bounces_through_r10() {
        let program = lower("int main(void) { return ~1 + ~2; }");
        let binaries: Vec<_> = program
            .function
            .instructions
            .iter()
            .filter(|instruction| matches!(instruction, Instruction::Binary { .. }))
            .collect();
        assert_eq!(
            binaries,
            vec![&Instruction::Binary {
                op: BinaryOp::Add,
                src: Operand::Reg(Reg::R10),
                dst: Operand::Stack(-12),
            }]
        );
    }

    #[test]
    fn test_multiply_never_writes_to_a_stack_destination() {
        let program = lower("int main(void) { return 3 * 4; }");
        // Mov dst -> r11, imul into r11, store back.
        assert_eq!(
            program.function.instructions[1..5],
            [
                Instruction::Mov {
                    src: Operand::Imm(3),
                    dst: Operand::Stack(-4),
                },
                Instruction::Mov {
                    src: Operand::Stack(-4),
                    dst: Operand::Reg(Reg::R11),
                },
                Instruction::Binary {
                    op: BinaryOp::Mult,
                    src: Operand::Imm(4),
                    dst: Operand::Reg(Reg::R11),
                },
                Instruction::Mov {
                    src: Operand::Reg(Reg::R11),
                    dst: Operand::Stack(-4),
                },
            ]
        );
    }

    #[test]
    fn test_shift_counts_are_staged_into_cl() {
        let program = lower("int main(void) { return 1 << 2; }");
        assert_eq!(
            program.function.instructions[2..5],
            [
                Instruction::Movb {
                    src: Operand::Imm(2),
                    dst: Operand::Reg(Reg::R11),
                },
                Instruction::Movb {
                    src: Operand::Reg(Reg::R11),
                    dst: Operand::Reg(Reg::Cx),
                },
                Instruction::Binary {
                    op: BinaryOp::Shl,
                    src: Operand::Reg(Reg::Cx),
                    dst: Operand::Stack(-4),
                },
            ]
        );
    }

    #[test]
    fn test_idiv_never_takes_an_immediate() {
        let program = lower("int main(void) { return 7 / 2; }");
        // AllocateStack, Mov into %eax, Cdq, then the bounced divisor.
        assert_eq!(
            program.function.instructions[3..5],
            [
                Instruction::Mov {
                    src: Operand::Imm(2),
                    dst: Operand::Reg(Reg::R10),
                },
                Instruction::Idiv(Operand::Reg(Reg::R10)),
            ]
        );
    }

    #[test]
    fn test_cmp_with_an_immediate_destination_bounces_through_r11() {
        let program = lower("int main(void) { return 1 < 2; }");
        assert_eq!(
            program.function.instructions[1..3],
            [
                Instruction::Mov {
                    src: Operand::Imm(1),
                    dst: Operand::Reg(Reg::R11),
                },
                Instruction::Cmp {
                    src: Operand::Imm(2),
                    dst: Operand::Reg(Reg::R11),
                },
            ]
        );
    }

    #[test]
    fn test_cmp_with_two_stack_operands_bounces_through_r10() {
        let program = lower("int main(void) { return ~1 == ~2; }");
        let cmps: Vec<_> = program
            .function
            .instructions
            .iter()
            .filter(|instruction| matches!(instruction, Instruction::Cmp { .. }))
            .collect();
        assert_eq!(
            cmps,
            vec![&Instruction::Cmp {
                src: Operand::Reg(Reg::R10),
                dst: Operand::Stack(-4),
            }]
        );
        assert!(program.function.instructions.contains(&Instruction::SetCC {
            cond: CondCode::E,
            dst: Operand::Stack(-12),
        }));
    }

    #[test]
    fn test_every_fixed_instruction_is_encodable() {
        let program = lower(
            "int main(void) { return ((1 + 2 * 3) % 4 << 2 & 5 | ~6 ^ 7) && (8 / 2 > 3); }",
        );
        for instruction in &program.function.instructions {
            match instruction {
                Instruction::Mov { src, dst }
                | Instruction::Cmp { src, dst }
                | Instruction::Binary { src, dst, .. } => {
                    assert!(
                        !(matches!(src, Operand::Stack(_)) && matches!(dst, Operand::Stack(_))),
                        "two memory operands in {instruction}"
                    );
                }
                _ => {}
            }
            if let Instruction::Binary {
                op: BinaryOp::Mult,
                dst,
                ..
            } = instruction
            {
                assert!(
                    !matches!(dst, Operand::Stack(_)),
                    "imul writing to memory in {instruction}"
                );
            }
            if let Instruction::Binary {
                op: BinaryOp::Shl | BinaryOp::Sar,
                src,
                ..
            } = instruction
            {
                assert_eq!(src, &Operand::Reg(Reg::Cx), "shift count not in %cl");
            }
            if let Instruction::Idiv(operand) = instruction {
                assert!(!matches!(operand, Operand::Imm(_)), "idiv on an immediate");
            }
            if let Instruction::Cmp { dst, .. } = instruction {
                assert!(
                    !matches!(dst, Operand::Imm(_)),
                    "cmp into an immediate in {instruction}"
                );
            }
        }
    }
}
