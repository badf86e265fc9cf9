//! Format-string style URL templates.
//!
//! Templates use the brace syntax the endpoint map is normalized into:
//! `{}` takes the next positional argument, `{0}` an explicit positional
//! index, `{unit}` / `{member}` a named argument, and `{{` / `}}` produce
//! literal braces.

use std::collections::BTreeMap;

use crate::{LdsError, LdsResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Positional(usize),
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numbering {
    Automatic,
    Manual,
}

/// A parsed URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    segments: Vec<Segment>,
}

/// The outcome of rendering a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedUrl {
    /// The fully substituted URL.
    pub url: String,
    /// Named arguments that were substituted into the URL.
    pub consumed: Vec<String>,
}

impl UrlTemplate {
    /// Parses a template string.
    ///
    /// # Errors
    ///
    /// Returns [`LdsError::InvalidTemplate`] for unbalanced braces, fields
    /// that are neither an index nor an identifier, and templates that mix
    /// automatic (`{}`) with manual (`{0}`) numbering.
    pub fn parse(template: &str) -> LdsResult<Self> {
        let invalid =
            |reason: &str| LdsError::InvalidTemplate(format!("{reason} in '{template}'"));

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut next_auto = 0usize;
        let mut numbering: Option<Numbering> = None;
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => return Err(invalid("unclosed placeholder")),
                            Some(c) => field.push(c),
                        }
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }

                    let segment = if field.is_empty() {
                        if numbering == Some(Numbering::Manual) {
                            return Err(invalid("cannot mix automatic and manual field numbering"));
                        }
                        numbering = Some(Numbering::Automatic);
                        next_auto += 1;
                        Segment::Positional(next_auto - 1)
                    } else if field.chars().all(|c| c.is_ascii_digit()) {
                        if numbering == Some(Numbering::Automatic) {
                            return Err(invalid("cannot mix automatic and manual field numbering"));
                        }
                        numbering = Some(Numbering::Manual);
                        let index = field
                            .parse()
                            .map_err(|_| invalid("positional index out of range"))?;
                        Segment::Positional(index)
                    } else if is_identifier(&field) {
                        Segment::Named(field)
                    } else {
                        return Err(invalid(&format!("unsupported placeholder '{{{field}}}'")));
                    };
                    segments.push(segment);
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(invalid("single '}' encountered")),
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Substitutes `positional` and `named` arguments into the template.
    ///
    /// Extra positional arguments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LdsError::MissingArgument`] when a placeholder has no value.
    pub fn render(
        &self,
        positional: &[String],
        named: &BTreeMap<String, String>,
    ) -> LdsResult<RenderedUrl> {
        let mut url = String::new();
        let mut consumed: Vec<String> = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Positional(index) => {
                    let value = positional.get(*index).ok_or_else(|| {
                        LdsError::MissingArgument(format!("positional argument {index}"))
                    })?;
                    url.push_str(value);
                }
                Segment::Named(name) => {
                    let value = named
                        .get(name)
                        .ok_or_else(|| LdsError::MissingArgument(name.clone()))?;
                    url.push_str(value);
                    if !consumed.contains(name) {
                        consumed.push(name.clone());
                    }
                }
            }
        }

        Ok(RenderedUrl { url, consumed })
    }
}

fn is_identifier(field: &str) -> bool {
    let mut chars = field.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn positional_placeholders_consume_arguments_in_order() {
        let template = UrlTemplate::parse("https://e.example/cal/{}/{}").unwrap();
        let rendered = template
            .render(&["10".to_string(), "20".to_string(), "ignored".to_string()], &named(&[]))
            .unwrap();
        assert_eq!(rendered.url, "https://e.example/cal/10/20");
        assert!(rendered.consumed.is_empty());
    }

    #[test]
    fn named_placeholders_are_reported_as_consumed() {
        let template =
            UrlTemplate::parse("https://e.example/unit/{unit}/photo/{member}/{}").unwrap();
        let rendered = template
            .render(
                &["individual".to_string()],
                &named(&[("unit", "1234"), ("member", "42"), ("lang", "eng")]),
            )
            .unwrap();
        assert_eq!(rendered.url, "https://e.example/unit/1234/photo/42/individual");
        assert_eq!(rendered.consumed, vec!["unit".to_string(), "member".to_string()]);
    }

    #[test]
    fn manual_indices_can_repeat() {
        let template = UrlTemplate::parse("https://e.example/{1}/{0}/{1}").unwrap();
        let rendered = template
            .render(&["a".to_string(), "b".to_string()], &named(&[]))
            .unwrap();
        assert_eq!(rendered.url, "https://e.example/b/a/b");
    }

    #[test]
    fn doubled_braces_are_literals() {
        let template = UrlTemplate::parse("https://e.example/?q={{x}}&u={unit}").unwrap();
        let rendered = template.render(&[], &named(&[("unit", "7")])).unwrap();
        assert_eq!(rendered.url, "https://e.example/?q={x}&u=7");
    }

    #[test]
    fn missing_values_are_reported() {
        let template = UrlTemplate::parse("https://e.example/{member}").unwrap();
        match template.render(&[], &named(&[])) {
            Err(LdsError::MissingArgument(name)) => assert_eq!(name, "member"),
            other => panic!("expected MissingArgument, got {other:?}"),
        }

        let template = UrlTemplate::parse("https://e.example/{}/{}").unwrap();
        match template.render(&["only-one".to_string()], &named(&[])) {
            Err(LdsError::MissingArgument(name)) => assert_eq!(name, "positional argument 1"),
            other => panic!("expected MissingArgument, got {other:?}"),
        }
    }

    #[test]
    fn malformed_templates_are_rejected() {
        for bad in [
            "https://e.example/{unit",
            "https://e.example/unit}",
            "https://e.example/{}/{0}",
            "https://e.example/{unit:>4}",
        ] {
            assert!(
                matches!(UrlTemplate::parse(bad), Err(LdsError::InvalidTemplate(_))),
                "expected '{bad}' to be rejected"
            );
        }
    }
}
