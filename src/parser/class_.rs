use crate::ast::{ClassBlock, CtorDecl, ForwardDeclNode, Ident, Include, MethodDecl};
use crate::lexer::{Spanned, Token};
use crate::parser::{
    CLASS_SYNTAX, FrontendError, METHOD_SYNTAX, Parser, ScopeStack, SyntaxError, syntax_error,
};

impl Parser<'_> {
    /// `class Name { ... };` or `class Name;`, attached to the innermost open
    /// namespace in `scopes`.
    pub fn parse_class(
        &mut self,
        scopes: &mut ScopeStack,
        includes: Vec<Include>,
    ) -> Result<(), FrontendError> {
        let keyword = self.expect(Token::KeywordClass, "`class`")?;
        if self.last_decl_line == Some(keyword.line) {
            return Err(syntax_error(
                keyword.line,
                "a line break (one declaration per line)",
                &keyword.token,
                keyword.span,
            ));
        }

        let (qualifier, name) = self
            .parse_qualified_ident("class name")
            .map_err(|err| err.with_hint(CLASS_SYNTAX))?;

        let Spanned { token, span, line } = self.advance("`{` or `;` after the class name")?;
        match token {
            Token::Semicolon => {
                if let Some(include) = includes.first() {
                    return Err(SyntaxError {
                        line: include.line,
                        expected: format!(
                            "a class body for `{}` (forward declarations take no include)",
                            name.name
                        ),
                        found: format!("`#include <{}>`", include.path),
                        span: include.span.clone(),
                        hint: None,
                    }
                    .into());
                }
                self.last_decl_line = Some(line);
                scopes
                    .current()
                    .forward_decls
                    .push(ForwardDeclNode { qualifier, name });
                Ok(())
            }
            Token::LBrace if !qualifier.is_empty() => Err(SyntaxError {
                line: name.line,
                expected: "an unqualified class name (declare the class inside its namespace block)"
                    .to_string(),
                found: format!("`{}::{}`", qualifier.join("::"), name.name),
                span: name.span,
                hint: Some(CLASS_SYNTAX),
            }
            .into()),
            Token::LBrace => {
                let class = self.parse_class_body(name, includes)?;
                scopes.current().classes.push(class);
                Ok(())
            }
            other => {
                Err(syntax_error(line, "`{` or `;` after the class name", &other, span)
                    .with_hint(CLASS_SYNTAX))
            }
        }
    }

    /// Everything after the opening brace, through the closing `};`.
    pub fn parse_class_body(
        &mut self,
        name: Ident,
        includes: Vec<Include>,
    ) -> Result<ClassBlock, FrontendError> {
        let mut class = ClassBlock {
            name,
            includes,
            constructors: vec![],
            methods: vec![],
        };
        let mut last_member_line = None;

        loop {
            let Some(token) = self.peek_token()? else {
                return Err(self
                    .eof_error(format!("`}};` closing class `{}`", class.name.name))
                    .with_hint(CLASS_SYNTAX));
            };
            match token {
                Token::RBrace => {
                    self.advance("`}`")?;
                    let semi = self.expect(Token::Semicolon, "`;` after the class body")?;
                    self.last_decl_line = Some(semi.line);
                    return Ok(class);
                }
                Token::Include(_) => {
                    return Err(self.unexpected(
                        "a constructor or method (include overrides go before `class` or `namespace`)",
                    ));
                }
                _ => {
                    let (_, line) = self.peek_position("a constructor or method")?;
                    if last_member_line == Some(line) {
                        return Err(self
                            .unexpected("a line break (one declaration per line)")
                            .with_hint(METHOD_SYNTAX));
                    }
                    last_member_line = Some(self.parse_member(&mut class)?);
                }
            }
        }
    }

    /// One constructor or method. Returns the line its `;` sits on.
    pub fn parse_member(&mut self, class: &mut ClassBlock) -> Result<usize, FrontendError> {
        let (start, line) = self.peek_position("a constructor or method")?;
        let is_static = self.eat(&Token::KeywordStatic)?.is_some();
        let ty = self.parse_type_expr()?;

        let is_constructor = !is_static
            && ty.is_plain()
            && ty.name == class.name.name
            && matches!(self.peek_token()?, Some(Token::LParen));

        if is_constructor {
            let params = self.parse_params()?;
            let semi = self.expect(Token::Semicolon, "`;` after the constructor")?;
            class.constructors.push(CtorDecl {
                params,
                span: start..semi.span.end,
                line,
            });
            return Ok(semi.line);
        }

        let name = self
            .expect_ident("a method name")
            .map_err(|err| err.with_hint(METHOD_SYNTAX))?;
        let params = self.parse_params()?;
        let is_const = self.eat(&Token::KeywordConst)?.is_some();
        let semi = self
            .expect(Token::Semicolon, "`;` after the method declaration")
            .map_err(|err| err.with_hint(METHOD_SYNTAX))?;

        class.methods.push(MethodDecl {
            name,
            return_type: ty,
            params,
            is_const,
            is_static,
            span: start..semi.span.end,
            line,
        });
        Ok(semi.line)
    }
}
