//! Host-language type names: parsing, printing and rewriting.
//!
//! Generic components need their declared parameter types rewritten twice:
//! once to substitute known type arguments, and once to fully qualify every
//! named type so the dispatch routine compiles outside the component's
//! namespace.

use crate::error::{TypeNameError, TypeNameResult};
use smol_str::SmolStr;
use std::fmt;

/// Keywords naming built-in types.
const PREDEFINED_TYPES: &[&str] = &[
    "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "long", "ulong",
    "short", "ushort", "object", "string", "void", "nint", "nuint", "dynamic",
];

/// Alias that anchors a name at the global namespace.
pub const GLOBAL_ALIAS: &str = "global";

/// Parsed type syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSyntax {
    /// A built-in keyword type such as `int`.
    Predefined(SmolStr),
    /// A simple or generic name: `Foo`, `List<T>`.
    Name {
        /// Identifier.
        ident: SmolStr,
        /// Generic arguments.
        args: Vec<TypeSyntax>,
    },
    /// `left.right`.
    Qualified {
        /// Qualifier.
        left: Box<TypeSyntax>,
        /// Rightmost simple name.
        right: Box<TypeSyntax>,
    },
    /// `alias::name`.
    AliasQualified {
        /// The alias, usually `global`.
        alias: SmolStr,
        /// The simple name after `::`.
        name: Box<TypeSyntax>,
    },
    /// `element[]` or `element[,]`.
    Array {
        /// Element type.
        element: Box<TypeSyntax>,
        /// Number of dimensions.
        rank: u32,
    },
    /// `inner?`.
    Nullable(Box<TypeSyntax>),
    /// `(A a, B)`.
    Tuple(Vec<(TypeSyntax, Option<SmolStr>)>),
}

impl TypeSyntax {
    /// Parse a type name.
    pub fn parse(text: &str) -> TypeNameResult<Self> {
        let tokens = tokenize(text)?;
        let mut parser = Parser { tokens, pos: 0 };
        let ty = parser.parse_type()?;
        if parser.pos != parser.tokens.len() {
            return Err(TypeNameError::trailing(text));
        }
        Ok(ty)
    }

    fn simple(ident: impl Into<SmolStr>) -> Self {
        Self::Name {
            ident: ident.into(),
            args: Vec::new(),
        }
    }
}

impl fmt::Display for TypeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predefined(name) => f.write_str(name),
            Self::Name { ident, args } => {
                f.write_str(ident)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Qualified { left, right } => write!(f, "{}.{}", left, right),
            Self::AliasQualified { alias, name } => write!(f, "{}::{}", alias, name),
            Self::Array { element, rank } => {
                write!(f, "{}[", element)?;
                for _ in 1..*rank {
                    f.write_str(",")?;
                }
                f.write_str("]")
            }
            Self::Nullable(inner) => write!(f, "{}?", inner),
            Self::Tuple(elements) => {
                f.write_str("(")?;
                for (i, (ty, name)) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", ty)?;
                    if let Some(name) = name {
                        write!(f, " {}", name)?;
                    }
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(SmolStr),
    Dot,
    ColonColon,
    Lt,
    Gt,
    Comma,
    LBracket,
    RBracket,
    Question,
    LParen,
    RParen,
}

fn tokenize(text: &str) -> TypeNameResult<Vec<Tok>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        let tok = match c {
            c if c.is_whitespace() => continue,
            '.' => Tok::Dot,
            '<' => Tok::Lt,
            '>' => Tok::Gt,
            ',' => Tok::Comma,
            '[' => Tok::LBracket,
            ']' => Tok::RBracket,
            '?' => Tok::Question,
            '(' => Tok::LParen,
            ')' => Tok::RParen,
            ':' => match chars.next() {
                Some((_, ':')) => Tok::ColonColon,
                _ => return Err(TypeNameError::unexpected(text, start)),
            },
            c if c == '_' || c == '@' || c.is_alphabetic() => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if next == '_' || next.is_alphanumeric() {
                        end = i + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                Tok::Ident(SmolStr::new(&text[start..end]))
            }
            _ => return Err(TypeNameError::unexpected(text, start)),
        };
        tokens.push(tok);
    }
    if tokens.is_empty() {
        return Err(TypeNameError::empty());
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok) -> TypeNameResult<()> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(TypeNameError::expected(format!("{:?}", tok), self.pos))
        }
    }

    fn ident(&mut self) -> TypeNameResult<SmolStr> {
        match self.tokens.get(self.pos) {
            Some(Tok::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(TypeNameError::expected("identifier", self.pos)),
        }
    }

    fn parse_type(&mut self) -> TypeNameResult<TypeSyntax> {
        let mut ty = if self.eat(&Tok::LParen) {
            self.parse_tuple()?
        } else {
            self.parse_name()?
        };
        loop {
            if self.eat(&Tok::Question) {
                ty = TypeSyntax::Nullable(Box::new(ty));
            } else if self.eat(&Tok::LBracket) {
                let mut rank = 1;
                while self.eat(&Tok::Comma) {
                    rank += 1;
                }
                self.expect(&Tok::RBracket)?;
                ty = TypeSyntax::Array {
                    element: Box::new(ty),
                    rank,
                };
            } else {
                return Ok(ty);
            }
        }
    }

    fn parse_tuple(&mut self) -> TypeNameResult<TypeSyntax> {
        let mut elements = Vec::new();
        loop {
            let ty = self.parse_type()?;
            let name = match self.peek() {
                Some(Tok::Ident(_)) => Some(self.ident()?),
                _ => None,
            };
            elements.push((ty, name));
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        self.expect(&Tok::RParen)?;
        Ok(TypeSyntax::Tuple(elements))
    }

    fn parse_name(&mut self) -> TypeNameResult<TypeSyntax> {
        let first = self.ident()?;
        let mut ty = if self.eat(&Tok::ColonColon) {
            TypeSyntax::AliasQualified {
                alias: first,
                name: Box::new(self.parse_simple()?),
            }
        } else {
            self.parse_simple_rest(first)?
        };
        if let TypeSyntax::Name { ident, args } = &ty {
            if args.is_empty()
                && PREDEFINED_TYPES.contains(&ident.as_str())
                && self.peek() != Some(&Tok::Dot)
            {
                return Ok(TypeSyntax::Predefined(ident.clone()));
            }
        }
        while self.eat(&Tok::Dot) {
            let right = self.parse_simple()?;
            ty = TypeSyntax::Qualified {
                left: Box::new(ty),
                right: Box::new(right),
            };
        }
        Ok(ty)
    }

    fn parse_simple(&mut self) -> TypeNameResult<TypeSyntax> {
        let ident = self.ident()?;
        self.parse_simple_rest(ident)
    }

    fn parse_simple_rest(&mut self, ident: SmolStr) -> TypeNameResult<TypeSyntax> {
        let mut args = Vec::new();
        if self.eat(&Tok::Lt) {
            loop {
                args.push(self.parse_type()?);
                if !self.eat(&Tok::Comma) {
                    break;
                }
            }
            self.expect(&Tok::Gt)?;
        }
        Ok(TypeSyntax::Name { ident, args })
    }
}

/// Substitutes type parameters with their arguments.
///
/// Parameters without a known argument become `object`.
#[derive(Debug, Clone, Default)]
pub struct GenericTypeNameRewriter {
    bindings: Vec<(SmolStr, Option<String>)>,
}

impl GenericTypeNameRewriter {
    /// Create a rewriter from `(type parameter, argument)` pairs.
    pub fn new(bindings: impl IntoIterator<Item = (SmolStr, Option<String>)>) -> Self {
        Self {
            bindings: bindings.into_iter().collect(),
        }
    }

    /// Rewrite a type name. Unparseable names are returned unchanged.
    pub fn rewrite(&self, type_name: &str) -> String {
        match TypeSyntax::parse(type_name) {
            Ok(ty) => self.rewrite_syntax(ty).to_string(),
            Err(_) => type_name.to_string(),
        }
    }

    fn binding(&self, ident: &str) -> Option<TypeSyntax> {
        let (_, argument) = self.bindings.iter().find(|(name, _)| name == ident)?;
        Some(match argument {
            Some(text) => TypeSyntax::parse(text).unwrap_or_else(|_| TypeSyntax::simple(text.as_str())),
            None => TypeSyntax::Predefined("object".into()),
        })
    }

    fn rewrite_syntax(&self, ty: TypeSyntax) -> TypeSyntax {
        match ty {
            TypeSyntax::Name { ident, args } if args.is_empty() => {
                self.binding(&ident).unwrap_or(TypeSyntax::Name { ident, args })
            }
            TypeSyntax::Name { ident, args } => TypeSyntax::Name {
                ident,
                args: args.into_iter().map(|a| self.rewrite_syntax(a)).collect(),
            },
            TypeSyntax::Qualified { left, right } => TypeSyntax::Qualified {
                left,
                right: Box::new(self.rewrite_args_only(*right)),
            },
            TypeSyntax::AliasQualified { alias, name } => TypeSyntax::AliasQualified {
                alias,
                name: Box::new(self.rewrite_args_only(*name)),
            },
            TypeSyntax::Array { element, rank } => TypeSyntax::Array {
                element: Box::new(self.rewrite_syntax(*element)),
                rank,
            },
            TypeSyntax::Nullable(inner) => TypeSyntax::Nullable(Box::new(self.rewrite_syntax(*inner))),
            TypeSyntax::Tuple(elements) => TypeSyntax::Tuple(
                elements
                    .into_iter()
                    .map(|(ty, name)| (self.rewrite_syntax(ty), name))
                    .collect(),
            ),
            predefined @ TypeSyntax::Predefined(_) => predefined,
        }
    }

    fn rewrite_args_only(&self, ty: TypeSyntax) -> TypeSyntax {
        match ty {
            TypeSyntax::Name { ident, args } => TypeSyntax::Name {
                ident,
                args: args.into_iter().map(|a| self.rewrite_syntax(a)).collect(),
            },
            other => other,
        }
    }
}

/// Prefixes every named type with `global::`.
///
/// Names listed as type parameters are left alone.
#[derive(Debug, Clone, Default)]
pub struct GlobalQualifiedTypeNameRewriter {
    ignore: Vec<SmolStr>,
}

impl GlobalQualifiedTypeNameRewriter {
    /// Create a rewriter that skips the given type parameter names.
    pub fn new(ignore: impl IntoIterator<Item = SmolStr>) -> Self {
        Self {
            ignore: ignore.into_iter().collect(),
        }
    }

    /// Rewrite a type name. Unparseable names are returned unchanged.
    pub fn rewrite(&self, type_name: &str) -> String {
        match TypeSyntax::parse(type_name) {
            Ok(ty) => self.qualify(ty).to_string(),
            Err(_) => type_name.to_string(),
        }
    }

    fn qualify(&self, ty: TypeSyntax) -> TypeSyntax {
        match ty {
            TypeSyntax::Name { ident, args } => {
                let args: Vec<_> = args.into_iter().map(|a| self.qualify(a)).collect();
                if args.is_empty() && self.ignore.contains(&ident) {
                    return TypeSyntax::Name { ident, args };
                }
                TypeSyntax::AliasQualified {
                    alias: GLOBAL_ALIAS.into(),
                    name: Box::new(TypeSyntax::Name { ident, args }),
                }
            }
            TypeSyntax::Qualified { left, right } => TypeSyntax::Qualified {
                left: Box::new(self.qualify_leftmost(*left)),
                right: Box::new(self.qualify_args(*right)),
            },
            TypeSyntax::AliasQualified { alias, name } => TypeSyntax::AliasQualified {
                alias,
                name: Box::new(self.qualify_args(*name)),
            },
            TypeSyntax::Array { element, rank } => TypeSyntax::Array {
                element: Box::new(self.qualify(*element)),
                rank,
            },
            TypeSyntax::Nullable(inner) => TypeSyntax::Nullable(Box::new(self.qualify(*inner))),
            TypeSyntax::Tuple(elements) => TypeSyntax::Tuple(
                elements
                    .into_iter()
                    .map(|(ty, name)| (self.qualify(ty), name))
                    .collect(),
            ),
            predefined @ TypeSyntax::Predefined(_) => predefined,
        }
    }

    /// Qualify the leftmost segment of a dotted name and the arguments of the rest.
    fn qualify_leftmost(&self, ty: TypeSyntax) -> TypeSyntax {
        match ty {
            TypeSyntax::Qualified { left, right } => TypeSyntax::Qualified {
                left: Box::new(self.qualify_leftmost(*left)),
                right: Box::new(self.qualify_args(*right)),
            },
            TypeSyntax::Name { ident, args } => TypeSyntax::AliasQualified {
                alias: GLOBAL_ALIAS.into(),
                name: Box::new(self.qualify_args(TypeSyntax::Name { ident, args })),
            },
            other => self.qualify(other),
        }
    }

    fn qualify_args(&self, ty: TypeSyntax) -> TypeSyntax {
        match ty {
            TypeSyntax::Name { ident, args } => TypeSyntax::Name {
                ident,
                args: args.into_iter().map(|a| self.qualify(a)).collect(),
            },
            other => other,
        }
    }
}

/// Generic arguments of the outermost named type, e.g. `T` in `EventCallback<T>`.
pub fn generic_arguments(type_name: &str) -> Vec<String> {
    let Ok(ty) = TypeSyntax::parse(type_name) else {
        return Vec::new();
    };
    let name = match ty {
        TypeSyntax::Qualified { right, .. } => *right,
        TypeSyntax::AliasQualified { name, .. } => *name,
        other => other,
    };
    match name {
        TypeSyntax::Name { args, .. } => args.iter().map(ToString::to_string).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_and_print() {
        for text in [
            "int",
            "System.Collections.Generic.Dictionary<string, List<T>>",
            "global::System.String",
            "int[,]",
            "T?[]",
            "(int count, Foo)",
        ] {
            assert_eq!(TypeSyntax::parse(text).map(|t| t.to_string()), Ok(text.to_string()));
        }
        assert!(TypeSyntax::parse("List<").is_err());
        assert!(TypeSyntax::parse("").is_err());
    }

    #[test]
    fn test_generic_rewriter_substitutes() {
        let rewriter = GenericTypeNameRewriter::new([
            (SmolStr::new("TKey"), Some("string".to_string())),
            (SmolStr::new("TValue"), None),
        ]);
        assert_eq!(
            rewriter.rewrite("System.Collections.Generic.Dictionary<TKey, TValue>"),
            "System.Collections.Generic.Dictionary<string, object>"
        );
        assert_eq!(rewriter.rewrite("TKey[]"), "string[]");
        assert_eq!(rewriter.rewrite("Foo.TKey"), "Foo.TKey");
    }

    #[test]
    fn test_generic_rewriter_complex_argument() {
        let rewriter =
            GenericTypeNameRewriter::new([(SmolStr::new("TItem"), Some("List<int>".to_string()))]);
        assert_eq!(
            rewriter.rewrite("Microsoft.AspNetCore.Components.RenderFragment<TItem>"),
            "Microsoft.AspNetCore.Components.RenderFragment<List<int>>"
        );
    }

    #[test]
    fn test_global_rewriter() {
        let rewriter = GlobalQualifiedTypeNameRewriter::new([SmolStr::new("TItem")]);
        assert_eq!(
            rewriter.rewrite("Microsoft.AspNetCore.Components.RenderFragment<TItem>"),
            "global::Microsoft.AspNetCore.Components.RenderFragment<TItem>"
        );
        assert_eq!(
            rewriter.rewrite("System.Collections.Generic.List<System.String>"),
            "global::System.Collections.Generic.List<global::System.String>"
        );
        assert_eq!(rewriter.rewrite("int"), "int");
        assert_eq!(rewriter.rewrite("(int, Foo)"), "(int, global::Foo)");
        assert_eq!(rewriter.rewrite("global::Foo"), "global::Foo");
        assert_eq!(rewriter.rewrite("TItem[]"), "TItem[]");
    }

    #[test]
    fn test_generic_arguments() {
        assert_eq!(
            generic_arguments("Microsoft.AspNetCore.Components.EventCallback<System.Int32>"),
            vec!["System.Int32".to_string()]
        );
        assert!(generic_arguments("Microsoft.AspNetCore.Components.EventCallback").is_empty());
    }
}
