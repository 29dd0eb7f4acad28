#![deny(missing_docs)]

//! # Type Expressions
//!
//! The input side of resolution: a closed representation of a type as written
//! in a declaration (`*[]models.Widget`, `map[string]int`, ...), plus a small
//! textual front end that turns the written form back into a `TypeExpr`.

use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::fmt::{self, Display, Write as _};
use std::str::FromStr;

/// A parsed, unevaluated type expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum TypeExpr {
    /// A named type. `module_path` is empty for unqualified names.
    Ident {
        /// The bare type name (e.g. `Widget`).
        name: String,
        /// The originating module path (e.g. `github.com/acme/models`).
        module_path: String,
    },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T` or `[N]T`
    Array(Box<TypeExpr>),
    /// `map[K]V`
    Map {
        /// Key type.
        key: Box<TypeExpr>,
        /// Value type.
        value: Box<TypeExpr>,
    },
    /// An anonymous struct literal.
    Struct(Vec<FieldDecl>),
    /// `interface{...}`
    Interface,
    /// `func(...) ...`
    Func {
        /// Parameter types.
        params: Vec<TypeExpr>,
        /// Result types.
        results: Vec<TypeExpr>,
    },
    /// `chan T`
    Chan(Box<TypeExpr>),
}

/// A single field of a struct literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Field name. Empty for embedded fields.
    pub name: String,
    /// Field type.
    pub ty: TypeExpr,
    /// Raw struct tag without the backquotes, if any.
    pub tag: Option<String>,
}

impl FieldDecl {
    /// Creates a named field without a tag.
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: None,
        }
    }

    /// Attaches a raw struct tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Whether this field is embedded (has no name of its own).
    pub fn is_embedded(&self) -> bool {
        self.name.is_empty()
    }

    /// Looks up `key:"value"` inside the struct tag.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        let tag = self.tag.as_deref()?;
        let needle = format!("{}:\"", key);
        let mut rest = tag;
        while let Some(idx) = rest.find(&needle) {
            let at_boundary = idx == 0 || rest[..idx].ends_with(' ');
            let value_start = &rest[idx + needle.len()..];
            if at_boundary {
                return value_start.find('"').map(|end| &value_start[..end]);
            }
            rest = value_start;
        }
        None
    }
}

impl TypeExpr {
    /// An unqualified identifier.
    pub fn ident(name: impl Into<String>) -> Self {
        TypeExpr::Ident {
            name: name.into(),
            module_path: String::new(),
        }
    }

    /// An identifier qualified by its originating module path.
    pub fn qualified(module_path: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Ident {
            name: name.into(),
            module_path: module_path.into(),
        }
    }

    /// `*inner`
    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    /// `[]element`
    pub fn array(element: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(element))
    }

    /// `map[key]value`
    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Parses the textual form of a type expression.
    pub fn parse(src: &str) -> AppResult<Self> {
        let mut parser = Parser {
            src,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos < src.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    /// Qualifies bare identifiers that name declarations of `module_path`.
    ///
    /// Front ends attach the owning module to same-module references; this
    /// does the same for expressions that were written without it.
    pub fn qualify_local(&self, module_path: &str, is_local: &dyn Fn(&str) -> bool) -> TypeExpr {
        let qualify = |expr: &TypeExpr| expr.qualify_local(module_path, is_local);
        match self {
            TypeExpr::Ident {
                name,
                module_path: own,
            } if own.is_empty() && is_local(name) => TypeExpr::qualified(module_path, name),
            TypeExpr::Ident { .. } | TypeExpr::Interface => self.clone(),
            TypeExpr::Pointer(inner) => TypeExpr::pointer(qualify(inner)),
            TypeExpr::Array(element) => TypeExpr::array(qualify(element)),
            TypeExpr::Map { key, value } => TypeExpr::map(qualify(key), qualify(value)),
            TypeExpr::Struct(fields) => TypeExpr::Struct(
                fields
                    .iter()
                    .map(|field| FieldDecl {
                        ty: qualify(&field.ty),
                        ..field.clone()
                    })
                    .collect(),
            ),
            TypeExpr::Func { params, results } => TypeExpr::Func {
                params: params.iter().map(qualify).collect(),
                results: results.iter().map(qualify).collect(),
            },
            TypeExpr::Chan(inner) => TypeExpr::Chan(Box::new(qualify(inner))),
        }
    }

    /// Strips every level of pointer indirection.
    pub fn strip_pointers(&self) -> &TypeExpr {
        let mut expr = self;
        while let TypeExpr::Pointer(inner) = expr {
            expr = inner;
        }
        expr
    }
}

/// Last `/` segment of a module path.
pub fn short_module_name(module_path: &str) -> &str {
    module_path.rsplit('/').next().unwrap_or(module_path)
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Ident { name, module_path } if module_path.is_empty() => f.write_str(name),
            TypeExpr::Ident { name, module_path } => {
                write!(f, "{}.{}", short_module_name(module_path), name)
            }
            TypeExpr::Pointer(inner) => write!(f, "*{}", inner),
            TypeExpr::Array(elem) => write!(f, "[]{}", elem),
            TypeExpr::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeExpr::Struct(fields) => {
                f.write_str("struct{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    if !field.is_embedded() {
                        write!(f, "{} ", field.name)?;
                    }
                    write!(f, "{}", field.ty)?;
                    if let Some(tag) = &field.tag {
                        write!(f, " `{}`", tag)?;
                    }
                }
                f.write_char('}')
            }
            TypeExpr::Interface => f.write_str("interface{}"),
            TypeExpr::Func { params, results } => {
                write!(f, "func({})", join(params))?;
                match results.as_slice() {
                    [] => Ok(()),
                    [single] => write!(f, " {}", single),
                    many => write!(f, " ({})", join(many)),
                }
            }
            TypeExpr::Chan(inner) => write!(f, "chan {}", inner),
        }
    }
}

fn join(types: &[TypeExpr]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for TypeExpr {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeExpr::parse(s)
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeExpr::parse(&value)
    }
}

/// Deepest type nesting the parser accepts.
const MAX_NESTING: usize = 256;

struct Parser<'s> {
    src: &'s str,
    pos: usize,
    depth: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '/' | '-')
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl<'s> Parser<'s> {
    fn error(&self, message: &str) -> AppError {
        AppError::Parse {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Skips blanks without crossing a line break.
    fn skip_inline_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
            self.bump();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> AppResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    fn word(&mut self) -> &'s str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_word_char(c)) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn parse_type(&mut self) -> AppResult<TypeExpr> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("type expression nested too deeply"));
        }
        self.depth += 1;
        let parsed = self.parse_nested_type();
        self.depth -= 1;
        parsed
    }

    fn parse_nested_type(&mut self) -> AppResult<TypeExpr> {
        self.skip_ws();
        match self.peek() {
            Some('*') => {
                self.bump();
                Ok(TypeExpr::pointer(self.parse_type()?))
            }
            Some('[') => {
                self.bump();
                self.skip_ws();
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.bump();
                }
                self.expect(']')?;
                Ok(TypeExpr::array(self.parse_type()?))
            }
            Some(c) if c.is_alphabetic() || c == '_' => {
                let start = self.pos;
                let word = self.word();
                match word {
                    "map" => {
                        self.expect('[')?;
                        let key = self.parse_type()?;
                        self.expect(']')?;
                        let value = self.parse_type()?;
                        Ok(TypeExpr::map(key, value))
                    }
                    "struct" => Ok(TypeExpr::Struct(self.parse_struct_body()?)),
                    "interface" => {
                        self.expect('{')?;
                        self.skip_balanced_braces()?;
                        Ok(TypeExpr::Interface)
                    }
                    "func" => self.parse_func(),
                    "chan" => Ok(TypeExpr::Chan(Box::new(self.parse_type()?))),
                    _ => self.split_ident(word, start),
                }
            }
            _ => Err(self.error("expected a type")),
        }
    }

    fn split_ident(&self, word: &str, start: usize) -> AppResult<TypeExpr> {
        let bad = |message: &str| AppError::Parse {
            offset: start,
            message: format!("{}: '{}'", message, word),
        };
        match word.rsplit_once('.') {
            None if is_ident(word) => Ok(TypeExpr::ident(word)),
            None => Err(bad("invalid identifier")),
            Some((path, name)) if !path.is_empty() && is_ident(name) => {
                Ok(TypeExpr::qualified(path, name))
            }
            Some(_) => Err(bad("invalid qualified identifier")),
        }
    }

    fn parse_struct_body(&mut self) -> AppResult<Vec<FieldDecl>> {
        self.expect('{')?;
        let mut fields = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(fields);
                }
                Some(';') => self.bump(),
                None => return Err(self.error("unterminated struct")),
                Some('*') => {
                    let ty = self.parse_type()?;
                    let tag = self.parse_tag()?;
                    fields.push(FieldDecl {
                        name: String::new(),
                        ty,
                        tag,
                    });
                }
                Some(_) => self.parse_field_line(&mut fields)?,
            }
        }
    }

    /// `A, B Type` or an embedded `pkg.Type`.
    fn parse_field_line(&mut self, fields: &mut Vec<FieldDecl>) -> AppResult<()> {
        let start = self.pos;
        let first = self.word();
        if first.is_empty() {
            return Err(self.error("expected a field"));
        }
        self.skip_inline_ws();
        if matches!(self.peek(), None | Some('\n' | ';' | '}' | '`')) {
            let ty = self.split_ident(first, start)?;
            let tag = self.parse_tag()?;
            fields.push(FieldDecl {
                name: String::new(),
                ty,
                tag,
            });
            return Ok(());
        }

        let mut names = vec![first];
        while self.eat(',') {
            self.skip_ws();
            let next = self.word();
            if !is_ident(next) {
                return Err(self.error("expected a field name"));
            }
            names.push(next);
        }
        if !is_ident(first) {
            return Err(AppError::Parse {
                offset: start,
                message: format!("invalid field name: '{}'", first),
            });
        }
        let ty = self.parse_type()?;
        let tag = self.parse_tag()?;
        for name in names {
            fields.push(FieldDecl {
                name: name.to_string(),
                ty: ty.clone(),
                tag: tag.clone(),
            });
        }
        Ok(())
    }

    fn parse_tag(&mut self) -> AppResult<Option<String>> {
        self.skip_inline_ws();
        if self.peek() != Some('`') {
            return Ok(None);
        }
        self.bump();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '`' {
                let tag = self.src[start..self.pos].to_string();
                self.bump();
                return Ok(Some(tag));
            }
            self.bump();
        }
        Err(self.error("unterminated struct tag"))
    }

    fn skip_balanced_braces(&mut self) -> AppResult<()> {
        let mut depth = 1usize;
        while let Some(c) = self.peek() {
            self.bump();
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(self.error("unterminated interface"))
    }

    fn parse_func(&mut self) -> AppResult<TypeExpr> {
        let params = self.parse_type_list()?;
        self.skip_inline_ws();
        let results = match self.peek() {
            Some('(') => self.parse_type_list()?,
            Some(c) if c == '*' || c == '[' || c.is_alphabetic() || c == '_' => {
                vec![self.parse_type()?]
            }
            _ => Vec::new(),
        };
        Ok(TypeExpr::Func { params, results })
    }

    fn parse_type_list(&mut self) -> AppResult<Vec<TypeExpr>> {
        self.expect('(')?;
        let mut types = Vec::new();
        if self.eat(')') {
            return Ok(types);
        }
        loop {
            types.push(self.parse_type()?);
            if self.eat(')') {
                return Ok(types);
            }
            self.expect(',')?;
        }
    }
}
