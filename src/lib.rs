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

pub mod ast;
pub mod codegen;
pub mod emitter;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod tacky;
pub mod tokens;

use emitter::Target;
use errors::CompilerError;

/// Runs the pipeline up to the fixed-up assembly tree: parse, lower to
/// TACKY, translate, assign stack slots, legalize.
pub fn generate_assembly(source: &str) -> Result<codegen::Program, CompilerError> {
    let program = parser::parse(source)?;
    let tacky = tacky::emitter::emit_program(&program);
    let assembly = codegen::generate(&tacky);
    let (assembly, last_offset) = codegen::pseudo::replace_pseudo_registers(assembly);
    Ok(codegen::fixup::fix_up_instructions(assembly, last_offset))
}

/// Compiles preprocessed source text to AT&T-syntax assembly.
pub fn compile(source: &str, target: Target) -> Result<String, CompilerError> {
    let assembly = generate_assembly(source)?;
    Ok(emitter::emit_program(&assembly, target))
}
