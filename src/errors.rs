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

use crate::tokens::Token;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("Lexer error: Invalid token: {0}")]
    InvalidToken(String),

    #[error("Lexer error: Literal constant does not fit into domain of int: {0}")]
    OverflowedLiteral(String),
}

// Parser errors nest: every grammar rule wraps the error of whatever failed
// beneath it in a NonTerminal frame, so the rendered message reads as a
// stack of grammar rules ending in the concrete failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("Parser error: invalid non-terminal <{rule}>:\n{child}")]
    NonTerminal {
        rule: &'static str,
        child: Box<ParserError>,
    },

    #[error("Parser error: Expected ({expected}) but got ({actual})")]
    UnexpectedToken { expected: Token, actual: Token },

    #[error("Parser error: Cannot create ({wanted}) from ({found})")]
    TokenCreation {
        wanted: &'static str,
        found: Token,
    },

    #[error("Parser error: Extraneous token: ({0})")]
    ExtraneousToken(Token),

    #[error("Parser error: unmatched parentheses")]
    UnmatchedParentheses,

    #[error("Parser error: reached end of file")]
    UnexpectedEof,

    #[error(transparent)]
    Lexer(#[from] LexerError),
}

impl ParserError {
    pub fn non_terminal(rule: &'static str, child: ParserError) -> Self {
        ParserError::NonTerminal {
            rule,
            child: Box::new(child),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompilerError {
    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    Parser(#[from] ParserError),
}
