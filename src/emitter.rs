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

use crate::codegen::{BinaryOp, CondCode, Instruction, Operand, Program, Reg, UnaryOp};
use std::fmt::Write;

/// Assembly dialect knobs that differ between the supported platforms.
/// The driver uses `Target::host()`; tests pick a target explicitly so
/// their expectations do not depend on the build machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Linux,
    MacOs,
}

impl Target {
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Target::MacOs
        } else {
            Target::Linux
        }
    }

    fn symbol(self, name: &str) -> String {
        match self {
            Target::Linux => name.to_string(),
            Target::MacOs => format!("_{name}"),
        }
    }

    fn local_label(self, name: &str) -> String {
        match self {
            Target::Linux => format!(".L{name}"),
            Target::MacOs => format!("L{name}"),
        }
    }
}

impl Reg {
    fn name_32(self) -> &'static str {
        match self {
            Reg::Ax => "eax",
            Reg::Cx => "ecx",
            Reg::Dx => "edx",
            Reg::R10 => "r10d",
            Reg::R11 => "r11d",
        }
    }

    fn name_8(self) -> &'static str {
        match self {
            Reg::Ax => "al",
            Reg::Cx => "cl",
            Reg::Dx => "dl",
            Reg::R10 => "r10b",
            Reg::R11 => "r11b",
        }
    }
}

#[derive(Clone, Copy)]
enum Width {
    Byte,
    Long,
}

fn operand(operand: &Operand, width: Width) -> String {
    match operand {
        Operand::Imm(value) => format!("${value}"),
        Operand::Reg(reg) => match width {
            Width::Byte => format!("%{}", reg.name_8()),
            Width::Long => format!("%{}", reg.name_32()),
        },
        Operand::Stack(offset) => format!("{offset}(%rbp)"),
        Operand::Pseudo(name) => {
            unreachable!("pseudo-register {name} survived replacement")
        }
    }
}

fn condition_suffix(cond: CondCode) -> &'static str {
    match cond {
        CondCode::E => "e",
        CondCode::Ne => "ne",
        CondCode::L => "l",
        CondCode::Le => "le",
        CondCode::G => "g",
        CondCode::Ge => "ge",
    }
}

/// Prints the fixed-up assembly tree as AT&T-syntax text.
pub fn emit_program(program: &Program, target: Target) -> String {
    let mut out = String::new();
    emit_function(program, target, &mut out);
    if target == Target::Linux {
        out.push_str(".section .note.GNU-stack,\"\",@progbits\n");
    }
    out
}

fn emit_function(program: &Program, target: Target, out: &mut String) {
    let name = target.symbol(&program.function.name);
    let _ = writeln!(out, "  .globl {name}");
    let _ = writeln!(out, "{name}:");
    out.push_str("  pushq %rbp\n");
    out.push_str("  movq %rsp, %rbp\n");
    for instruction in &program.function.instructions {
        emit_instruction(instruction, target, out);
    }
}

fn emit_instruction(instruction: &Instruction, target: Target, out: &mut String) {
    let _ = match instruction {
        Instruction::Mov { src, dst } => writeln!(
            out,
            "  movl {}, {}",
            operand(src, Width::Long),
            operand(dst, Width::Long)
        ),
        Instruction::Movb { src, dst } => writeln!(
            out,
            "  movb {}, {}",
            operand(src, Width::Byte),
            operand(dst, Width::Byte)
        ),
        Instruction::Unary { op, dst } => {
            let mnemonic = match op {
                UnaryOp::Neg => "negl",
                UnaryOp::Not => "notl",
            };
            writeln!(out, "  {mnemonic} {}", operand(dst, Width::Long))
        }
        Instruction::Binary { op, src, dst } => {
            let (mnemonic, src_width) = match op {
                BinaryOp::Add => ("addl", Width::Long),
                BinaryOp::Sub => ("subl", Width::Long),
                BinaryOp::Mult => ("imull", Width::Long),
                BinaryOp::And => ("andl", Width::Long),
                BinaryOp::Or => ("orl", Width::Long),
                BinaryOp::Xor => ("xorl", Width::Long),
                // The count operand of a variable shift is %cl.
                BinaryOp::Shl => ("shll", Width::Byte),
                BinaryOp::Sar => ("sarl", Width::Byte),
            };
            writeln!(
                out,
                "  {mnemonic} {}, {}",
                operand(src, src_width),
                operand(dst, Width::Long)
            )
        }
        Instruction::Idiv(divisor) => {
            writeln!(out, "  idivl {}", operand(divisor, Width::Long))
        }
        Instruction::Cdq => writeln!(out, "  cdq"),
        Instruction::Cmp { src, dst } => writeln!(
            out,
            "  cmpl {}, {}",
            operand(src, Width::Long),
            operand(dst, Width::Long)
        ),
        Instruction::Jmp(label) => writeln!(out, "  jmp {}", target.local_label(label)),
        Instruction::JmpCC { cond, target: label } => writeln!(
            out,
            "  j{} {}",
            condition_suffix(*cond),
            target.local_label(label)
        ),
        Instruction::SetCC { cond, dst } => writeln!(
            out,
            "  set{} {}",
            condition_suffix(*cond),
            operand(dst, Width::Byte)
        ),
        Instruction::Label(name) => writeln!(out, "{}:", target.local_label(name)),
        Instruction::AllocateStack(size) => writeln!(out, "  subq ${size}, %rsp"),
        Instruction::Ret => {
            out.push_str("  movq %rbp, %rsp\n");
            out.push_str("  popq %rbp\n");
            out.push_str("  ret\n");
            Ok(())
        }
    };
}

// ------------- unit tests –------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{fixup, generate, pseudo};
    use crate::{parser, tacky};

    fn emit(source: &str, target: Target) -> String {
        let assembly = generate(&tacky::emitter::emit_program(
            &parser::parse(source).unwrap(),
        ));
        let (assembly, last_offset) = pseudo::replace_pseudo_registers(assembly);
        let assembly = fixup::fix_up_instructions(assembly, last_offset);
        emit_program(&assembly, target)
    }

    #[test]
    fn test_a_basic_program_emits_the_standard_frame() {
        assert_eq!(
            emit("int main(void) {\n  return 2;\n}", Target::Linux),
            "  .globl main\n\
             main:\n\
             \x20 pushq %rbp\n\
             \x20 movq %rsp, %rbp\n\
             \x20 subq $0, %rsp\n\
             \x20 movl $2, %eax\n\
             \x20 movq %rbp, %rsp\n\
             \x20 popq %rbp\n\
             \x20 ret\n\
             .section .note.GNU-stack,\"\",@progbits\n"
        );
    }

    #[test]
    fn test_unary_chain_with_stack_slots_and_r10_bounce() {
        assert_eq!(
            emit("int main(void) {\n  return -(~2);\n}", Target::Linux),
            "  .globl main\n\
             main:\n\
             \x20 pushq %rbp\n\
             \x20 movq %rsp, %rbp\n\
             \x20 subq $16, %rsp\n\
             \x20 movl $2, -4(%rbp)\n\
             \x20 notl -4(%rbp)\n\
             \x20 movl -4(%rbp), %r10d\n\
             \x20 movl %r10d, -8(%rbp)\n\
             \x20 negl -8(%rbp)\n\
             \x20 movl -8(%rbp), %eax\n\
             \x20 movq %rbp, %rsp\n\
             \x20 popq %rbp\n\
             \x20 ret\n\
             .section .note.GNU-stack,\"\",@progbits\n"
        );
    }

    #[test]
    fn test_macos_mangles_names_and_omits_the_gnu_stack_note() {
        let text = emit("int main(void) {\n  return 2;\n}", Target::MacOs);
        assert!(text.starts_with("  .globl _main\n_main:\n"));
        assert!(!text.contains(".note.GNU-stack"));
    }

    #[test]
    fn test_short_circuit_labels_use_the_local_prefix() {
        let text = emit("int main(void) { return 1 && 0; }", Target::Linux);
        assert!(text.contains("  je .Land_false.0\n"));
        assert!(text.contains("  jmp .Land_end.1\n"));
        assert!(text.contains(".Land_false.0:\n"));
        assert!(text.contains(".Land_end.1:\n"));

        let text = emit("int main(void) { return 1 && 0; }", Target::MacOs);
        assert!(text.contains("  je Land_false.0\n"));
        assert!(text.contains("Land_end.1:\n"));
    }

    #[test]
    fn test_comparisons_emit_cmp_and_setcc() {
        let text = emit("int main(void) { return 1 < 2; }", Target::Linux);
        assert!(text.contains("  movl $1, %r11d\n"));
        assert!(text.contains("  cmpl $2, %r11d\n"));
        assert!(text.contains("  movl $0, -4(%rbp)\n"));
        assert!(text.contains("  setl -4(%rbp)\n"));
    }

    #[test]
    fn test_shifts_emit_their_count_from_cl() {
        let text = emit("int main(void) { return 1 << 2; }", Target::Linux);
        assert!(text.contains("  movb $2, %r11b\n"));
        assert!(text.contains("  movb %r11b, %cl\n"));
        assert!(text.contains("  shll %cl, -4(%rbp)\n"));
    }

    #[test]
    fn test_division_emits_the_idiv_protocol() {
        let text = emit("int main(void) { return 7 / 2; }", Target::Linux);
        assert!(text.contains("  movl $7, %eax\n"));
        assert!(text.contains("  cdq\n"));
        assert!(text.contains("  movl $2, %r10d\n"));
        assert!(text.contains("  idivl %r10d\n"));
    }

    #[test]
    fn test_logical_not_emits_sete() {
        let text = emit("int main(void) { return !5; }", Target::Linux);
        assert!(text.contains("  cmpl $0, %r11d\n"));
        assert!(text.contains("  sete -4(%rbp)\n"));
    }
}
