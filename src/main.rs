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

use anyhow::{Context, Result};
use cicc::emitter::Target;
use cicc::lexer::Lexer;
use clap::{ArgGroup, Parser as clap_parser};
use std::fs;
use std::path::PathBuf;

#[derive(clap_parser)]
#[clap(version, about = "Compiles a minimal C subset to x86-64 assembly")]
#[clap(group(ArgGroup::new("stage").args(["lex", "parse", "codegen", "assembly"])))]
struct Opts {
    /// Path to the preprocessed source file
    input: PathBuf,
    /// Stop after lexing; produce no output
    #[arg(long)]
    lex: bool,
    /// Stop after parsing; produce no output
    #[arg(long)]
    parse: bool,
    /// Stop once the assembly tree is ready, before emission
    #[arg(long)]
    codegen: bool,
    /// Emit assembly but do not assemble or link
    #[arg(short = 'S')]
    assembly: bool,
    /// Output path (defaults to the input with extension .s)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let opts: Opts = Opts::parse();

    let source = fs::read_to_string(&opts.input)
        .with_context(|| format!("Failed to read input file: {}", opts.input.display()))?;

    if opts.lex {
        for token in Lexer::new(&source) {
            token?;
        }
        return Ok(());
    }
    if opts.parse {
        cicc::parser::parse(&source)?;
        return Ok(());
    }
    if opts.codegen {
        cicc::generate_assembly(&source)?;
        return Ok(());
    }

    let assembly = cicc::compile(&source, Target::host())?;
    let output = opts
        .output
        .unwrap_or_else(|| opts.input.with_extension("s"));
    fs::write(&output, assembly)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;
    println!(
        "Successfully compiled {} to {}",
        opts.input.display(),
        output.display()
    );

    Ok(())
}
