use std::vec;

use crate::config::Limits;
use crate::error::GroupError;
use crate::lexer::{Sign, Span, Token, TokenKind};

/// A bracketed run of tokens. `open` is the bracket token that started the
/// group and is absent for the top level.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub open: Option<Token>,
    pub children: Vec<TokenGroup>,
}

impl Group {
    pub fn sign(&self) -> Sign {
        self.open.as_ref().map(|t| t.sign).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenGroup {
    Leaf(Token),
    Group(Group),
    /// A function token fused with the argument that followed it.
    Call(Token, Box<TokenGroup>),
}

impl TokenGroup {
    pub fn sign(&self) -> Sign {
        match self {
            TokenGroup::Leaf(token) | TokenGroup::Call(token, _) => token.sign,
            TokenGroup::Group(group) => group.sign(),
        }
    }

    /// Whether a folded `+` or `-` stood directly before this item.
    pub fn explicit_sign(&self) -> bool {
        match self {
            TokenGroup::Leaf(token) | TokenGroup::Call(token, _) => token.explicit_sign,
            TokenGroup::Group(group) => group.open.as_ref().map_or(false, |t| t.explicit_sign),
        }
    }

    pub fn children(&self) -> &[TokenGroup] {
        match self {
            TokenGroup::Group(group) => &group.children,
            _ => &[],
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TokenGroup::Leaf(token) | TokenGroup::Call(token, _) => token.span,
            TokenGroup::Group(group) => match &group.open {
                Some(token) => token.span,
                None => Span(0, 0),
            },
        }
    }
}

struct Grouper {
    tokens: vec::IntoIter<Token>,
    limits: Limits,
}

impl Grouper {
    fn group_level(&mut self, open: Option<Token>, depth: usize) -> Result<Group, GroupError> {
        if depth > self.limits.max_depth {
            return Err(GroupError::MaxDepthExceeded {
                limit: self.limits.max_depth,
                span: open.map(|t| t.span).unwrap_or(Span(0, 0)),
            });
        }

        let mut children = vec![];

        loop {
            let token = match self.tokens.next() {
                Some(token) => token,
                None => match &open {
                    Some(open) => return Err(GroupError::UnbalancedBrackets { span: open.span }),
                    None => break,
                },
            };

            match token.kind {
                TokenKind::OpenBracket => {
                    let inner = self.group_level(Some(token), depth + 1)?;
                    children.push(TokenGroup::Group(inner));
                }
                TokenKind::CloseBracket if open.is_some() => break,
                TokenKind::CloseBracket => {
                    return Err(GroupError::UnbalancedBrackets { span: token.span })
                }
                _ => children.push(TokenGroup::Leaf(token)),
            }
        }

        let children = fuse_level(children, &self.limits, depth)?;
        Ok(Group { open, children })
    }
}

fn fuse_next<I>(
    child: TokenGroup,
    rest: &mut I,
    limits: &Limits,
    depth: usize,
) -> Result<TokenGroup, GroupError>
where
    I: Iterator<Item = TokenGroup>,
{
    match child {
        TokenGroup::Leaf(token) => match token.kind {
            TokenKind::Function(_) => fuse_call(token, rest, limits, depth),
            _ => Ok(TokenGroup::Leaf(token)),
        },
        other => Ok(other),
    }
}

fn fuse_call<I>(
    function: Token,
    rest: &mut I,
    limits: &Limits,
    depth: usize,
) -> Result<TokenGroup, GroupError>
where
    I: Iterator<Item = TokenGroup>,
{
    if depth >= limits.max_depth {
        return Err(GroupError::MaxDepthExceeded {
            limit: limits.max_depth,
            span: function.span,
        });
    }

    match rest.next() {
        Some(arg) => {
            let arg = fuse_next(arg, rest, limits, depth + 1)?;
            Ok(TokenGroup::Call(function, Box::new(arg)))
        }
        None => Err(GroupError::MissingArgument {
            name: function.kind.name(),
            span: function.span,
        }),
    }
}

// A chain like `Sin-Cos-x` nests one call per function, counted on top of
// the bracket depth of the level it appears in.
fn fuse_level(
    children: Vec<TokenGroup>,
    limits: &Limits,
    depth: usize,
) -> Result<Vec<TokenGroup>, GroupError> {
    let mut out = Vec::with_capacity(children.len());
    let mut iter = children.into_iter();

    while let Some(child) = iter.next() {
        out.push(fuse_next(child, &mut iter, limits, depth)?);
    }

    Ok(out)
}

/// Replaces each function leaf and the sibling after it with a single
/// `TokenGroup::Call`. Only the given level is rewritten; nested groups are
/// expected to have been fused when they were built.
pub fn fuse_functions(
    children: Vec<TokenGroup>,
    limits: &Limits,
) -> Result<Vec<TokenGroup>, GroupError> {
    fuse_level(children, limits, 0)
}

pub fn group_with(tokens: Vec<Token>, limits: &Limits) -> Result<TokenGroup, GroupError> {
    let mut grouper = Grouper {
        tokens: tokens.into_iter(),
        limits: *limits,
    };

    let root = grouper.group_level(None, 0)?;
    trace!("grouped {} top level items", root.children.len());
    Ok(TokenGroup::Group(root))
}

pub fn group(tokens: Vec<Token>) -> Result<TokenGroup, GroupError> {
    group_with(tokens, &Limits::default())
}
