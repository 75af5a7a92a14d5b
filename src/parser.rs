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

use crate::ast::{BinaryOp, Expression, Function, Program, Statement, UnaryOp};
use crate::errors::ParserError;
use crate::lexer::Lexer;
use crate::tokens::Token;
use std::iter::Peekable;

// Binding power of each binary operator token, higher binds tighter. All
// operators in this subset are left-associative, so the right-hand side of
// an operator at level N is parsed with a minimum precedence of N + 1.
fn binary_op_precedence(token: &Token) -> Option<(BinaryOp, u8)> {
    Some(match token {
        Token::Asterisk => (BinaryOp::Multiply, 50),
        Token::Slash => (BinaryOp::Divide, 50),
        Token::Percent => (BinaryOp::Remainder, 50),
        Token::Plus => (BinaryOp::Add, 45),
        Token::Hyphen => (BinaryOp::Subtract, 45),
        Token::LeftShift => (BinaryOp::LeftShift, 40),
        Token::RightShift => (BinaryOp::RightShift, 40),
        Token::Less => (BinaryOp::LessThan, 35),
        Token::LessEqual => (BinaryOp::LessOrEqual, 35),
        Token::Greater => (BinaryOp::GreaterThan, 35),
        Token::GreaterEqual => (BinaryOp::GreaterOrEqual, 35),
        Token::EqualEqual => (BinaryOp::Equal, 30),
        Token::BangEqual => (BinaryOp::NotEqual, 30),
        Token::Ampersand => (BinaryOp::BitwiseAnd, 25),
        Token::Caret => (BinaryOp::BitwiseXor, 20),
        Token::Pipe => (BinaryOp::BitwiseOr, 15),
        Token::DoubleAmpersand => (BinaryOp::And, 10),
        Token::DoublePipe => (BinaryOp::Or, 5),
        _ => return None,
    })
}

/// Parses a token stream into the AST of a whole program.
pub fn parse(source: &str) -> Result<Program, ParserError> {
    Parser::new(Lexer::new(source)).parse_program()
}

pub struct Parser<'a> {
    tokens: Peekable<Lexer<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Parser {
            tokens: lexer.peekable(),
        }
    }

    // Pulls the next token, lifting lexer failures and end of input into
    // parser errors. A rule that never consumes a bad token never reports
    // it; the error surfaces only once something actually needs the token.
    fn next_token(&mut self) -> Result<Token, ParserError> {
        match self.tokens.next() {
            Some(Ok(token)) => Ok(token),
            Some(Err(error)) => Err(error.into()),
            None => Err(ParserError::UnexpectedEof),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParserError> {
        let actual = self.next_token()?;
        if actual == expected {
            Ok(())
        } else {
            Err(ParserError::UnexpectedToken { expected, actual })
        }
    }

    fn peek_binary_op(&mut self) -> Option<(BinaryOp, u8)> {
        match self.tokens.peek() {
            Some(Ok(token)) => binary_op_precedence(token),
            _ => None,
        }
    }

    pub fn parse_program(mut self) -> Result<Program, ParserError> {
        self.parse_program_body()
            .map_err(|e| ParserError::non_terminal("program", e))
    }

    fn parse_program_body(&mut self) -> Result<Program, ParserError> {
        let function = self.parse_function()?;
        match self.tokens.next() {
            None => Ok(Program { function }),
            Some(Ok(token)) => Err(ParserError::ExtraneousToken(token)),
            Some(Err(error)) => Err(error.into()),
        }
    }

    fn parse_function(&mut self) -> Result<Function, ParserError> {
        self.parse_function_body()
            .map_err(|e| ParserError::non_terminal("function", e))
    }

    fn parse_function_body(&mut self) -> Result<Function, ParserError> {
        self.expect(Token::KwInt)?;
        let name = self.parse_identifier()?;
        self.expect(Token::OpenParen)?;
        self.expect(Token::KwVoid)?;
        self.expect(Token::CloseParen)?;
        self.expect(Token::OpenBrace)?;
        let body = self.parse_statement()?;
        self.expect(Token::CloseBrace)?;
        Ok(Function { name, body })
    }

    fn parse_identifier(&mut self) -> Result<String, ParserError> {
        match self.next_token()? {
            Token::Identifier(name) => Ok(name),
            found => Err(ParserError::TokenCreation {
                wanted: "identifier",
                found,
            }),
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        self.parse_statement_body()
            .map_err(|e| ParserError::non_terminal("statement", e))
    }

    fn parse_statement_body(&mut self) -> Result<Statement, ParserError> {
        self.expect(Token::KwReturn)?;
        let expression = self.parse_expression(0)?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Return(expression))
    }

    // Precedence climbing: parse a factor, then keep folding in binary
    // operators that bind at least as tightly as `min_precedence`.
    fn parse_expression(&mut self, min_precedence: u8) -> Result<Expression, ParserError> {
        self.parse_expression_body(min_precedence)
            .map_err(|e| ParserError::non_terminal("expression", e))
    }

    fn parse_expression_body(&mut self, min_precedence: u8) -> Result<Expression, ParserError> {
        let mut left = self.parse_factor()?;
        while let Some((op, precedence)) = self.peek_binary_op() {
            if precedence < min_precedence {
                break;
            }
            self.tokens.next();
            let right = self.parse_expression(precedence + 1)?;
            left = Expression::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expression, ParserError> {
        match self.next_token()? {
            Token::Constant(value) => Ok(Expression::Constant(value)),
            Token::Tilde => self.parse_unary(UnaryOp::Complement),
            Token::Hyphen => self.parse_unary(UnaryOp::Negate),
            Token::Bang => self.parse_unary(UnaryOp::Not),
            Token::OpenParen => self
                .parse_parenthesized()
                .map_err(|e| ParserError::non_terminal("expression", e)),
            found => Err(ParserError::TokenCreation {
                wanted: "factor",
                found,
            }),
        }
    }

    fn parse_unary(&mut self, op: UnaryOp) -> Result<Expression, ParserError> {
        let operand = self.parse_factor()?;
        Ok(Expression::Unary(op, Box::new(operand)))
    }

    fn parse_parenthesized(&mut self) -> Result<Expression, ParserError> {
        let inner = self.parse_expression_body(0)?;
        match self.next_token()? {
            Token::CloseParen => Ok(inner),
            _ => Err(ParserError::UnmatchedParentheses),
        }
    }
}

// ------------- unit tests –------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error(source: &str) -> ParserError {
        parse(source).expect_err("source should not parse")
    }

    fn constant(value: i32) -> Expression {
        Expression::Constant(value)
    }

    fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Expression {
        Expression::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    #[test]
    fn test_a_basic_program_is_correctly_parsed() {
        let program = parse("int main(void) {\n  return 2;\n}\n").unwrap();
        assert_eq!(
            program,
            Program {
                function: Function {
                    name: "main".to_string(),
                    body: Statement::Return(Expression::Constant(2)),
                }
            }
        );
        assert_eq!(program.to_string(), "int main(void) {\n  return 2;\n}\n");
    }

    #[test]
    fn test_pretty_print_parenthesizes_unary_operands() {
        let program = parse("int main(void) {\n  return -(-2);\n}\n").unwrap();
        assert_eq!(
            program.to_string(),
            "int main(void) {\n  return -(-(2));\n}\n"
        );
    }

    #[test]
    fn test_nested_unary_operators() {
        let program = parse("int main(void) { return !~-2; }").unwrap();
        assert_eq!(
            program.function.body,
            Statement::Return(Expression::Unary(
                UnaryOp::Not,
                Box::new(Expression::Unary(
                    UnaryOp::Complement,
                    Box::new(Expression::Unary(UnaryOp::Negate, Box::new(constant(2))))
                ))
            ))
        );
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let program = parse("int main(void) { return 1 + 2 * 3; }").unwrap();
        assert_eq!(
            program.function.body,
            Statement::Return(binary(
                BinaryOp::Add,
                constant(1),
                binary(BinaryOp::Multiply, constant(2), constant(3)),
            ))
        );
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let program = parse("int main(void) { return 1 - 2 - 3; }").unwrap();
        assert_eq!(
            program.function.body,
            Statement::Return(binary(
                BinaryOp::Subtract,
                binary(BinaryOp::Subtract, constant(1), constant(2)),
                constant(3),
            ))
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let program = parse("int main(void) { return (1 + 2) * 3; }").unwrap();
        assert_eq!(
            program.function.body,
            Statement::Return(binary(
                BinaryOp::Multiply,
                binary(BinaryOp::Add, constant(1), constant(2)),
                constant(3),
            ))
        );
    }

    #[test]
    fn test_precedence_ladder_from_or_down_to_multiplication() {
        // 1 || 2 && 3 | 4 ^ 5 & 6 == 7 < 8 << 9 + 10 * 11
        let program = parse(
            "int main(void) { return 1 || 2 && 3 | 4 ^ 5 & 6 == 7 < 8 << 9 + 10 * 11; }",
        )
        .unwrap();
        let expected = binary(
            BinaryOp::Or,
            constant(1),
            binary(
                BinaryOp::And,
                constant(2),
                binary(
                    BinaryOp::BitwiseOr,
                    constant(3),
                    binary(
                        BinaryOp::BitwiseXor,
                        constant(4),
                        binary(
                            BinaryOp::BitwiseAnd,
                            constant(5),
                            binary(
                                BinaryOp::Equal,
                                constant(6),
                                binary(
                                    BinaryOp::LessThan,
                                    constant(7),
                                    binary(
                                        BinaryOp::LeftShift,
                                        constant(8),
                                        binary(
                                            BinaryOp::Add,
                                            constant(9),
                                            binary(
                                                BinaryOp::Multiply,
                                                constant(10),
                                                constant(11),
                                            ),
                                        ),
                                    ),
                                ),
                            ),
                        ),
                    ),
                ),
            ),
        );
        assert_eq!(program.function.body, Statement::Return(expected));
    }

    #[test]
    fn test_relational_operators_are_left_associative() {
        let program = parse("int main(void) { return 1 < 2 <= 3; }").unwrap();
        assert_eq!(
            program.function.body,
            Statement::Return(binary(
                BinaryOp::LessOrEqual,
                binary(BinaryOp::LessThan, constant(1), constant(2)),
                constant(3),
            ))
        );
    }

    #[test]
    fn test_prefix_decrement_is_rejected() {
        let error = parse_error("int main(void) {\n  return --2;\n}\n");
        assert_eq!(
            error.to_string(),
            "Parser error: invalid non-terminal <program>:\n\
             Parser error: invalid non-terminal <function>:\n\
             Parser error: invalid non-terminal <statement>:\n\
             Parser error: invalid non-terminal <expression>:\n\
             Parser error: Cannot create (factor) from (decrement)"
        );
    }

    #[test]
    fn test_extraneous_tokens_after_the_program_cause_an_error() {
        let error = parse_error("int main(void) {\n  return 2;\n}d");
        assert_eq!(
            error.to_string(),
            "Parser error: invalid non-terminal <program>:\n\
             Parser error: Extraneous token: (Identifier: d)"
        );
    }

    #[test]
    fn test_end_of_file_is_handled_correctly() {
        let error = parse_error("int main(void) {\n  return 2;\n");
        assert_eq!(
            error.to_string(),
            "Parser error: invalid non-terminal <program>:\n\
             Parser error: invalid non-terminal <function>:\n\
             Parser error: reached end of file"
        );
    }

    #[test]
    fn test_keyword_in_place_of_function_name() {
        let error = parse_error("int return(void) {\n  return 2;\n}");
        assert_eq!(
            error.to_string(),
            "Parser error: invalid non-terminal <program>:\n\
             Parser error: invalid non-terminal <function>:\n\
             Parser error: Cannot create (identifier) from (Keyword: return)"
        );
    }

    #[test]
    fn test_missing_semicolon() {
        let error = parse_error("int main(void) {\n  return 2)\n}");
        assert_eq!(
            error.to_string(),
            "Parser error: invalid non-terminal <program>:\n\
             Parser error: invalid non-terminal <function>:\n\
             Parser error: invalid non-terminal <statement>:\n\
             Parser error: Expected (semicolon) but got (right parenthesis)"
        );
    }

    #[test]
    fn test_unmatched_parentheses() {
        let error = parse_error("int main(void) {\n  return -((2);\n}\n");
        assert_eq!(
            error.to_string(),
            "Parser error: invalid non-terminal <program>:\n\
             Parser error: invalid non-terminal <function>:\n\
             Parser error: invalid non-terminal <statement>:\n\
             Parser error: invalid non-terminal <expression>:\n\
             Parser error: invalid non-terminal <expression>:\n\
             Parser error: unmatched parentheses"
        );
    }

    #[test]
    fn test_lexer_errors_are_lifted_into_the_parser_chain() {
        let error = parse_error("int main(void) {\n  return 1234a;\n}");
        assert_eq!(
            error.to_string(),
            "Parser error: invalid non-terminal <program>:\n\
             Parser error: invalid non-terminal <function>:\n\
             Parser error: invalid non-terminal <statement>:\n\
             Parser error: invalid non-terminal <expression>:\n\
             Lexer error: Invalid token: 1234a"
        );
    }

    #[test]
    fn test_an_invalid_next_token_does_not_fail_the_expression_before_it() {
        // The expression `2` parses; the bad token is only reported by the
        // rule that actually consumes it.
        let error = parse_error("int main(void) {\n  return 2 @;\n}");
        assert_eq!(
            error.to_string(),
            "Parser error: invalid non-terminal <program>:\n\
             Parser error: invalid non-terminal <function>:\n\
             Parser error: invalid non-terminal <statement>:\n\
             Lexer error: Invalid token: @"
        );
    }
}
