// Copyright 2020 - 2021 Alex Dukhno
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    fmt::{self, Display, Formatter},
    iter::Peekable,
    str::Chars,
};

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    /// Identifier, including qualified `table.col` and `table.*` forms.
    Ident(String),
    /// Raw numeric literal; the parser decides integer vs real by content.
    Number(String),
    /// Single-quoted text with doubled quotes already collapsed.
    String(String),
    /// The reserved word NULL.
    Null,
    Comma,
    SemiColon,
    LeftParen,
    RightParen,
    Asterisk,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(ident) => write!(f, "{}", ident),
            Token::Number(number) => write!(f, "{}", number),
            Token::String(string) => write!(f, "'{}'", string),
            Token::Null => write!(f, "NULL"),
            Token::Comma => write!(f, ","),
            Token::SemiColon => write!(f, ";"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Asterisk => write!(f, "*"),
            Token::Eq => write!(f, "="),
            Token::NotEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::LtEq => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::GtEq => write!(f, ">="),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum LexerError {
    UnexpectedCharacter(char),
    UnterminatedString,
}

impl Display for LexerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::UnexpectedCharacter(ch) => write!(f, "unexpected character {:?}", ch),
            LexerError::UnterminatedString => write!(f, "unterminated string literal"),
        }
    }
}

/// Splits statement text into tokens. Whitespace separates tokens and is
/// discarded; an input character that starts no token fails the whole scan.
pub struct Lexer<'l> {
    iter: Peekable<Chars<'l>>,
}

impl<'l> Lexer<'l> {
    pub fn new(input: &'l str) -> Lexer<'l> {
        Lexer {
            iter: input.chars().peekable(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = vec![];
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        while self.iter.next_if(|ch| ch.is_whitespace()).is_some() {}
        let ch = match self.iter.next() {
            Some(ch) => ch,
            None => return Ok(None),
        };
        match ch {
            ch if ch.is_ascii_alphabetic() || ch == '_' => Ok(Some(self.tokenize_ident(ch))),
            ch if ch.is_ascii_digit() || ch == '-' => Ok(Some(self.tokenize_number(ch))),
            '\'' => self.tokenize_string().map(Some),
            ',' => Ok(Some(Token::Comma)),
            ';' => Ok(Some(Token::SemiColon)),
            '(' => Ok(Some(Token::LeftParen)),
            ')' => Ok(Some(Token::RightParen)),
            '*' => Ok(Some(Token::Asterisk)),
            '=' => {
                // `=<` is the archaic spelling of `<=`
                if self.next_if_is('<') {
                    Ok(Some(Token::LtEq))
                } else {
                    Ok(Some(Token::Eq))
                }
            }
            '!' => {
                if self.next_if_is('=') {
                    Ok(Some(Token::NotEq))
                } else {
                    Err(LexerError::UnexpectedCharacter('!'))
                }
            }
            '<' => {
                if self.next_if_is('=') {
                    Ok(Some(Token::LtEq))
                } else {
                    Ok(Some(Token::Lt))
                }
            }
            '>' => {
                if self.next_if_is('=') {
                    Ok(Some(Token::GtEq))
                } else {
                    Ok(Some(Token::Gt))
                }
            }
            ch => Err(LexerError::UnexpectedCharacter(ch)),
        }
    }

    fn tokenize_ident(&mut self, first: char) -> Token {
        let mut ident = first.to_string();
        while let Some(ch) = self
            .iter
            .next_if(|&ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || ch == '*')
        {
            ident.push(ch);
        }
        if ident.eq_ignore_ascii_case("NULL") {
            Token::Null
        } else {
            Token::Ident(ident)
        }
    }

    fn tokenize_number(&mut self, first: char) -> Token {
        let mut number = first.to_string();
        while let Some(ch) = self
            .iter
            .next_if(|&ch| ch.is_ascii_digit() || ch == '.' || ch == 'E' || ch == '-')
        {
            number.push(ch);
        }
        Token::Number(number)
    }

    fn tokenize_string(&mut self) -> Result<Token, LexerError> {
        let mut string = String::new();
        loop {
            match self.iter.next() {
                Some('\'') => {
                    // two consecutive quotes collapse into one embedded quote
                    if self.next_if_is('\'') {
                        string.push('\'');
                    } else {
                        return Ok(Token::String(string));
                    }
                }
                Some(ch) => string.push(ch),
                None => return Err(LexerError::UnterminatedString),
            }
        }
    }

    fn next_if_is(&mut self, expected: char) -> bool {
        self.iter.next_if_eq(&expected).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize().expect("lexable input")
    }

    #[test]
    fn idents_and_punctuation() {
        assert_eq!(
            tokenize("CREATE TABLE names (name TEXT, id INTEGER);"),
            vec![
                Token::Ident("CREATE".to_owned()),
                Token::Ident("TABLE".to_owned()),
                Token::Ident("names".to_owned()),
                Token::LeftParen,
                Token::Ident("name".to_owned()),
                Token::Ident("TEXT".to_owned()),
                Token::Comma,
                Token::Ident("id".to_owned()),
                Token::Ident("INTEGER".to_owned()),
                Token::RightParen,
                Token::SemiColon,
            ]
        );
    }

    #[test]
    fn qualified_idents_keep_their_dots() {
        assert_eq!(
            tokenize("names.id grades.*"),
            vec![Token::Ident("names.id".to_owned()), Token::Ident("grades.*".to_owned())]
        );
    }

    #[test]
    fn null_is_a_distinguished_token() {
        assert_eq!(tokenize("NULL null"), vec![Token::Null, Token::Null]);
        assert_eq!(tokenize("NULLIFY"), vec![Token::Ident("NULLIFY".to_owned())]);
    }

    #[test]
    fn numbers_keep_sign_point_and_exponent() {
        assert_eq!(
            tokenize("4 -17 3.5 2.5E2"),
            vec![
                Token::Number("4".to_owned()),
                Token::Number("-17".to_owned()),
                Token::Number("3.5".to_owned()),
                Token::Number("2.5E2".to_owned()),
            ]
        );
    }

    #[test]
    fn doubled_quotes_collapse() {
        assert_eq!(tokenize("'O''Hara'"), vec![Token::String("O'Hara".to_owned())]);
        assert_eq!(tokenize("''"), vec![Token::String(String::new())]);
    }

    #[test]
    fn operators_extend_to_two_characters() {
        assert_eq!(
            tokenize("= != < <= > >= =<"),
            vec![
                Token::Eq,
                Token::NotEq,
                Token::Lt,
                Token::LtEq,
                Token::Gt,
                Token::GtEq,
                Token::LtEq,
            ]
        );
    }

    #[test]
    fn unknown_character_fails_the_scan() {
        assert_eq!(
            Lexer::new("SELECT @ FROM t;").tokenize(),
            Err(LexerError::UnexpectedCharacter('@'))
        );
    }

    #[test]
    fn unterminated_string_fails_the_scan() {
        assert_eq!(Lexer::new("'abc").tokenize(), Err(LexerError::UnterminatedString));
    }
}
