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

use crate::errors::LexerError;
use crate::tokens::Token;

// Operator and punctuation patterns, longest first so maximal munch falls
// out of a linear scan: `<<=` must be tried before `<<`, which must be
// tried before `<`.
const OPERATORS: &[(&str, Token)] = &[
    ("<<=", Token::LeftShiftAssign),
    (">>=", Token::RightShiftAssign),
    ("--", Token::Decrement),
    ("++", Token::Increment),
    ("+=", Token::PlusAssign),
    ("-=", Token::MinusAssign),
    ("*=", Token::StarAssign),
    ("/=", Token::SlashAssign),
    ("%=", Token::PercentAssign),
    ("&=", Token::AmpAssign),
    ("|=", Token::PipeAssign),
    ("^=", Token::CaretAssign),
    ("<<", Token::LeftShift),
    (">>", Token::RightShift),
    ("&&", Token::DoubleAmpersand),
    ("||", Token::DoublePipe),
    ("==", Token::EqualEqual),
    ("!=", Token::BangEqual),
    ("<=", Token::LessEqual),
    (">=", Token::GreaterEqual),
    ("(", Token::OpenParen),
    (")", Token::CloseParen),
    ("{", Token::OpenBrace),
    ("}", Token::CloseBrace),
    (";", Token::Semicolon),
    (",", Token::Comma),
    ("~", Token::Tilde),
    ("-", Token::Hyphen),
    ("+", Token::Plus),
    ("*", Token::Asterisk),
    ("/", Token::Slash),
    ("%", Token::Percent),
    ("&", Token::Ampersand),
    ("|", Token::Pipe),
    ("^", Token::Caret),
    ("!", Token::Bang),
    ("<", Token::Less),
    (">", Token::Greater),
    ("=", Token::Assign),
];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A lazy, single-pass scanner over preprocessed source text. Tokens come
/// out one at a time through the `Iterator` impl; the first invalid token
/// ends the useful part of the stream.
pub struct Lexer<'a> {
    rest: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer { rest: source }
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start_matches([' ', '\t', '\n', '\r']);
    }

    // Length of the leading identifier/constant-shaped run.
    fn word_len(&self) -> usize {
        self.rest
            .find(|c| !is_word_char(c))
            .unwrap_or(self.rest.len())
    }

    fn take(&mut self, len: usize) -> &'a str {
        let (taken, rest) = self.rest.split_at(len);
        self.rest = rest;
        taken
    }

    // Consumes the offending run (through the next whitespace or
    // non-word delimiter) so that iteration always advances.
    fn invalid_token(&mut self) -> LexerError {
        let len = if self.word_len() > 0 {
            self.word_len()
        } else {
            let first = self.rest.chars().next().map_or(0, char::len_utf8);
            let tail = &self.rest[first..];
            first + tail.find(|c| !is_word_char(c)).unwrap_or(tail.len())
        };
        LexerError::InvalidToken(self.take(len).to_string())
    }

    fn lex_word(&mut self) -> Token {
        let word = self.take(self.word_len());
        match word {
            "int" => Token::KwInt,
            "return" => Token::KwReturn,
            "void" => Token::KwVoid,
            "typedef" => Token::KwTypedef,
            _ => Token::Identifier(word.to_string()),
        }
    }

    fn lex_constant(&mut self) -> Result<Token, LexerError> {
        let word = &self.rest[..self.word_len()];
        if !word.bytes().all(|b| b.is_ascii_digit()) {
            // Digits running into identifier characters, e.g. `1234a`.
            return Err(self.invalid_token());
        }
        let word = self.take(word.len());
        word.parse::<i32>()
            .map(Token::Constant)
            .map_err(|_| LexerError::OverflowedLiteral(word.to_string()))
    }

    fn lex_operator(&mut self) -> Result<Token, LexerError> {
        for (pattern, token) in OPERATORS {
            if self.rest.starts_with(pattern) {
                self.take(pattern.len());
                return Ok(token.clone());
            }
        }
        Err(self.invalid_token())
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let first = self.rest.chars().next()?;
        Some(match first {
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.lex_word()),
            c if c.is_ascii_digit() => self.lex_constant(),
            _ => self.lex_operator(),
        })
    }
}

// ------------- unit tests –------------
