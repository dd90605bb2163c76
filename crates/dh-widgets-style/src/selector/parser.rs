//! Selector parsing using the `cssparser` crate.
//!
//! Parses the selector subset the delegation engine understands: type, class,
//! id and universal selectors, structural pseudo-classes, all four
//! combinators, and comma-separated selector lists.

use cssparser::{ParseError as CssParseError, ParseErrorKind, Parser, ParserInput, Token};

use super::{Combinator, NthExpr, PseudoClass, Selector, SelectorList, SelectorPart, TypeSelector};
use crate::{Error, Result};

type ParseResult<'i, T> = std::result::Result<T, CssParseError<'i, String>>;

/// Parse a selector list such as `".dh-item, ul > li:first-child"`.
///
/// # Example
///
/// ```
/// use dh_widgets_style::selector::parse_selector_list;
///
/// let list = parse_selector_list(".dh-panel-item,.dh-panel-header").unwrap();
/// assert_eq!(list.selectors().len(), 2);
/// assert_eq!(list.to_string(), ".dh-panel-item, .dh-panel-header");
/// ```
pub fn parse_selector_list(input: &str) -> Result<SelectorList> {
    let mut parser_input = ParserInput::new(input);
    let mut parser = Parser::new(&mut parser_input);

    let selectors = parser
        .parse_comma_separated(|p| parse_selector(p))
        .map_err(|e| selector_error(input, e))?;
    Ok(SelectorList(selectors))
}

fn selector_error(input: &str, error: CssParseError<'_, String>) -> Error {
    let message = match error.kind {
        ParseErrorKind::Custom(message) => message,
        ParseErrorKind::Basic(basic) => format!("{:?}", basic),
    };
    Error::invalid_selector(
        input,
        format!(
            "{} (line {}, column {})",
            message, error.location.line, error.location.column
        ),
    )
}

/// Parse one complex selector, up to a comma or the end of input.
fn parse_selector<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, Selector> {
    let mut parts = vec![];
    let mut combinators = vec![];
    let mut current = SelectorPart::default();
    let mut pending: Option<Combinator> = None;

    parser.skip_whitespace();

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                    pending = Some(Combinator::Descendant);
                }
            }

            Token::Delim(c @ ('>' | '+' | '~')) => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
                if parts.is_empty() {
                    return Err(parser.new_custom_error(format!("Combinator '{c}' without a left-hand side")));
                }
                pending = Some(match c {
                    '>' => Combinator::Child,
                    '+' => Combinator::AdjacentSibling,
                    _ => Combinator::GeneralSibling,
                });
            }

            Token::Ident(name) => {
                if !current.is_empty() {
                    return Err(parser.new_custom_error(format!("Unexpected identifier '{name}'")));
                }
                start_part(&mut combinators, &mut pending);
                current.type_selector = Some(TypeSelector::Type(name.to_ascii_lowercase()));
            }

            Token::Delim('*') => {
                if !current.is_empty() {
                    return Err(parser.new_custom_error("Unexpected '*'".to_string()));
                }
                start_part(&mut combinators, &mut pending);
                current.type_selector = Some(TypeSelector::Universal);
            }

            Token::Delim('.') => {
                start_part_if_empty(&current, &mut combinators, &mut pending);
                let class = match parser.next_including_whitespace() {
                    Ok(Token::Ident(class)) => Some(class.to_string()),
                    _ => None,
                };
                let Some(class) = class else {
                    return Err(parser.new_custom_error("Expected class name after '.'".to_string()));
                };
                current.classes.push(class);
            }

            Token::IDHash(id) => {
                if current.id.is_some() {
                    return Err(parser.new_custom_error(format!("Second id '#{id}' in one compound")));
                }
                start_part_if_empty(&current, &mut combinators, &mut pending);
                current.id = Some(id.to_string());
            }

            Token::Colon => {
                start_part_if_empty(&current, &mut combinators, &mut pending);
                let pseudo = parse_pseudo_class(parser)?;
                current.pseudo_classes.push(pseudo);
            }

            Token::SquareBracketBlock => {
                return Err(parser.new_custom_error("Attribute selectors are not supported".to_string()));
            }

            other => {
                return Err(parser.new_custom_error(format!("Unexpected token {:?}", other)));
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    } else if matches!(
        pending,
        Some(Combinator::Child | Combinator::AdjacentSibling | Combinator::GeneralSibling)
    ) {
        return Err(parser.new_custom_error("Selector ends with a combinator".to_string()));
    }

    if parts.is_empty() {
        return Err(parser.new_custom_error("Empty selector".to_string()));
    }

    Ok(Selector { parts, combinators })
}

/// Commit the pending combinator when a new compound begins.
fn start_part(combinators: &mut Vec<Combinator>, pending: &mut Option<Combinator>) {
    if let Some(combinator) = pending.take() {
        combinators.push(combinator);
    }
}

fn start_part_if_empty(
    current: &SelectorPart,
    combinators: &mut Vec<Combinator>,
    pending: &mut Option<Combinator>,
) {
    if current.is_empty() {
        start_part(combinators, pending);
    }
}

/// Parse the pseudo-class following a ':'.
fn parse_pseudo_class<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, PseudoClass> {
    let token = parser.next_including_whitespace()?.clone();
    match token {
        Token::Ident(name) => PseudoClass::from_css(&name)
            .ok_or_else(|| parser.new_custom_error(format!("Unknown pseudo-class ':{name}'"))),
        Token::Function(name) => match name.to_ascii_lowercase().as_str() {
            "nth-child" => {
                let (a, b) = parser.parse_nested_block(parse_nth_argument)?;
                Ok(PseudoClass::NthChild(NthExpr::new(a, b)))
            }
            "not" => {
                let inner = parser.parse_nested_block(parse_simple_selector)?;
                Ok(PseudoClass::Not(Box::new(inner)))
            }
            other => Err(parser.new_custom_error(format!("Unknown pseudo-class ':{other}()'"))),
        },
        other => Err(parser.new_custom_error(format!("Expected pseudo-class name, got {:?}", other))),
    }
}

/// The `An+B` argument of :nth-child().
fn parse_nth_argument<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, (i32, i32)> {
    let nth = cssparser::parse_nth(parser)?;
    parser.expect_exhausted()?;
    Ok(nth)
}

/// Parse a compound selector (for the :not() argument).
fn parse_simple_selector<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, SelectorPart> {
    let mut part = SelectorPart::default();

    parser.skip_whitespace();

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::WhiteSpace(_) => {
                parser.expect_exhausted()?;
                break;
            }
            Token::Ident(name) => {
                part.type_selector = Some(TypeSelector::Type(name.to_ascii_lowercase()));
            }
            Token::Delim('*') => {
                part.type_selector = Some(TypeSelector::Universal);
            }
            Token::Delim('.') => {
                let class = parser.expect_ident()?;
                part.classes.push(class.to_string());
            }
            Token::IDHash(id) => {
                part.id = Some(id.to_string());
            }
            other => {
                return Err(parser.new_custom_error(format!("Unexpected token {:?} in :not()", other)));
            }
        }
    }

    if part.is_empty() {
        return Err(parser.new_custom_error("Empty :not()".to_string()));
    }
    Ok(part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(input: &str) -> Selector {
        let list = parse_selector_list(input).unwrap();
        assert_eq!(list.selectors().len(), 1, "{input}");
        list.0.into_iter().next().unwrap()
    }

    #[test]
    fn parse_class_selector() {
        let selector = single(".dh-item");
        assert_eq!(selector.parts.len(), 1);
        assert_eq!(selector.parts[0].classes, vec!["dh-item".to_string()]);
    }

    #[test]
    fn parse_compound_selector() {
        let selector = single("LI#first.a.b:first-child");
        let part = &selector.parts[0];
        assert_eq!(part.type_selector, Some(TypeSelector::Type("li".into())));
        assert_eq!(part.id.as_deref(), Some("first"));
        assert_eq!(part.classes.len(), 2);
        assert_eq!(part.pseudo_classes, vec![PseudoClass::FirstChild]);
    }

    #[test]
    fn parse_descendant_selector() {
        let selector = single(".dh-list .dh-item");
        assert_eq!(selector.parts.len(), 2);
        assert_eq!(selector.combinators, vec![Combinator::Descendant]);
    }

    #[test]
    fn parse_child_and_sibling_selectors() {
        let selector = single("ul > li + li ~ li");
        assert_eq!(
            selector.combinators,
            vec![
                Combinator::Child,
                Combinator::AdjacentSibling,
                Combinator::GeneralSibling
            ]
        );

        let selector = single("ul>li");
        assert_eq!(selector.combinators, vec![Combinator::Child]);
    }

    #[test]
    fn parse_selector_lists() {
        let list = parse_selector_list(" .a , div .b,#c ").unwrap();
        assert_eq!(list.selectors().len(), 3);
        assert_eq!(list.to_string(), ".a, div .b, #c");
    }

    #[test]
    fn parse_functional_pseudo_classes() {
        let selector = single("li:nth-child(2n+1)");
        assert_eq!(
            selector.parts[0].pseudo_classes,
            vec![PseudoClass::NthChild(NthExpr::new(2, 1))]
        );

        let selector = single("li:nth-child(even)");
        assert_eq!(
            selector.parts[0].pseudo_classes,
            vec![PseudoClass::NthChild(NthExpr::new(2, 0))]
        );

        let selector = single("li:not(.done)");
        assert_eq!(
            selector.parts[0].pseudo_classes,
            vec![PseudoClass::Not(Box::new(SelectorPart {
                classes: vec!["done".into()],
                ..SelectorPart::default()
            }))]
        );
    }

    #[test]
    fn reject_invalid_selectors() {
        for input in ["", "  ", ".", "> li", "li >", "a,", "li:hover", "[data-x]", "li::before"] {
            let result = parse_selector_list(input);
            assert!(
                matches!(result, Err(Error::InvalidSelector { .. })),
                "expected error for {input:?}, got {result:?}"
            );
        }
    }
}
