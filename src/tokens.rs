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

use std::fmt;

// One variant per keyword, punctuation mark and operator. Compound
// assignment, increment/decrement, `typedef` and the comma are lexed even
// though the grammar does not accept them yet; the parser reports them with
// their proper names instead of choking on an unknown character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    KwInt,
    KwReturn,
    KwVoid,
    KwTypedef,
    Identifier(String),
    Constant(i32),

    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Semicolon,
    Comma,

    Tilde,
    Hyphen,
    Decrement,
    Plus,
    Increment,
    Asterisk,
    Slash,
    Percent,
    Ampersand,
    Pipe,
    Caret,
    LeftShift,
    RightShift,
    Bang,
    DoubleAmpersand,
    DoublePipe,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,
    LeftShiftAssign,
    RightShiftAssign,
}

// The human-readable form used inside diagnostics, e.g.
// "Expected (semicolon) but got (right parenthesis)".
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::KwInt => write!(f, "Keyword: int"),
            Token::KwReturn => write!(f, "Keyword: return"),
            Token::KwVoid => write!(f, "Keyword: void"),
            Token::KwTypedef => write!(f, "Keyword: typedef"),
            Token::Identifier(name) => write!(f, "Identifier: {name}"),
            Token::Constant(value) => write!(f, "Literal constant: {value}"),
            Token::OpenParen => write!(f, "left parenthesis"),
            Token::CloseParen => write!(f, "right parenthesis"),
            Token::OpenBrace => write!(f, "left curly brace"),
            Token::CloseBrace => write!(f, "right curly brace"),
            Token::Semicolon => write!(f, "semicolon"),
            Token::Comma => write!(f, "comma"),
            Token::Tilde => write!(f, "tilde"),
            Token::Hyphen => write!(f, "hyphen"),
            Token::Decrement => write!(f, "decrement"),
            Token::Plus => write!(f, "plus sign"),
            Token::Increment => write!(f, "increment"),
            Token::Asterisk => write!(f, "asterisk"),
            Token::Slash => write!(f, "forward slash"),
            Token::Percent => write!(f, "percent sign"),
            Token::Ampersand => write!(f, "bitwise and"),
            Token::Pipe => write!(f, "bitwise or"),
            Token::Caret => write!(f, "bitwise xor"),
            Token::LeftShift => write!(f, "left shift"),
            Token::RightShift => write!(f, "right shift"),
            Token::Bang => write!(f, "exclamation point"),
            Token::DoubleAmpersand => write!(f, "double ampersand"),
            Token::DoublePipe => write!(f, "double pipe"),
            Token::EqualEqual => write!(f, "equal to"),
            Token::BangEqual => write!(f, "not equal to"),
            Token::Less => write!(f, "less than"),
            Token::LessEqual => write!(f, "less than or equal to"),
            Token::Greater => write!(f, "greater than"),
            Token::GreaterEqual => write!(f, "greater than or equal to"),
            Token::Assign => write!(f, "assignment"),
            Token::PlusAssign => write!(f, "add assignment"),
            Token::MinusAssign => write!(f, "subtract assignment"),
            Token::StarAssign => write!(f, "multiply assignment"),
            Token::SlashAssign => write!(f, "divide assignment"),
            Token::PercentAssign => write!(f, "modulo assignment"),
            Token::AmpAssign => write!(f, "bitwise and assignment"),
            Token::PipeAssign => write!(f, "bitwise or assignment"),
            Token::CaretAssign => write!(f, "bitwise xor assignment"),
            Token::LeftShiftAssign => write!(f, "left shift assignment"),
            Token::RightShiftAssign => write!(f, "right shift assignment"),
        }
    }
}
