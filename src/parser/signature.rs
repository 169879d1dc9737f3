use crate::ast::{Ident, Param, TypeExpr};
use crate::lexer::Token;
use crate::parser::{FrontendError, Parser, syntax_error};

impl Parser<'_> {
    /// `a::b::Name`, returning the qualifier and the final segment.
    pub fn parse_qualified_ident(
        &mut self,
        expected: &str,
    ) -> Result<(Vec<String>, Ident), FrontendError> {
        let mut qualifier = vec![];
        let mut ident = self.expect_ident(expected)?;
        while self.eat(&Token::Access)?.is_some() {
            let next = self.expect_ident("a name after `::`")?;
            qualifier.push(std::mem::replace(&mut ident, next).name);
        }
        Ok((qualifier, ident))
    }

    pub fn parse_type_expr(&mut self) -> Result<TypeExpr, FrontendError> {
        let (start, line) = self.peek_position("a type")?;
        let is_const = self.eat(&Token::KeywordConst)?.is_some();
        let (path, name) = self.parse_qualified_ident("a type name")?;

        if let Some(Token::Less) = self.peek_token()? {
            return Err(self.unexpected(format!(
                "a plain type after `{}` (template types are not supported)",
                name.name
            )));
        }

        let is_pointer = self.eat(&Token::Star)?.is_some();
        let is_reference = self.eat(&Token::Ampersand)?.is_some();

        Ok(TypeExpr {
            is_const,
            path,
            name: name.name,
            is_pointer,
            is_reference,
            span: start..self.last_span().end,
            line,
        })
    }

    /// `( Type name, Type name, ... )`
    pub fn parse_params(&mut self) -> Result<Vec<Param>, FrontendError> {
        self.expect(Token::LParen, "`(` to open the argument list")?;
        let mut params = vec![];
        if self.eat(&Token::RParen)?.is_some() {
            return Ok(params);
        }

        loop {
            let ty = self.parse_type_expr()?;
            let name = self.expect_ident("an argument name")?;
            params.push(Param { ty, name });

            let next = self.advance("`,` or `)`")?;
            match next.token {
                Token::Comma => continue,
                Token::RParen => return Ok(params),
                Token::Assign => {
                    return Err(syntax_error(
                        next.line,
                        "`,` or `)` (default argument values are not supported)",
                        &next.token,
                        next.span,
                    ));
                }
                other => return Err(syntax_error(next.line, "`,` or `)`", &other, next.span)),
            }
        }
    }
}
