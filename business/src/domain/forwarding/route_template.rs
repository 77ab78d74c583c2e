use std::collections::BTreeMap;

use super::errors::ForwardingError;

/// Values captured from a path by [`RouteTemplate::matches`], keyed by parameter name.
pub type RouteValues = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Parameter(String),
}

/// A path template made of literal segments and `{name}` parameters,
/// e.g. `/product-images/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    pub fn parse(template: &str) -> Result<Self, ForwardingError> {
        let Some(rest) = template.strip_prefix('/') else {
            return Err(ForwardingError::InvalidTemplate(format!(
                "'{}' must start with '/'",
                template
            )));
        };

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                segments.push(parse_segment(template, part)?);
            }
        }

        let mut seen = Vec::new();
        for segment in &segments {
            if let Segment::Parameter(name) = segment {
                if seen.contains(&name) {
                    return Err(ForwardingError::InvalidTemplate(format!(
                        "'{}' declares '{}' twice",
                        template, name
                    )));
                }
                seen.push(name);
            }
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Parameter(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Matches `path` against the template, returning the captured values.
    ///
    /// Literal segments compare case-insensitively and one trailing slash is ignored.
    /// A parameter never captures a dot segment, in any percent-encoded spelling,
    /// since rendering it would step out of the target template.
    pub fn matches(&self, path: &str) -> Option<RouteValues> {
        let path = path.strip_prefix('/')?;
        let path = path.strip_suffix('/').unwrap_or(path);

        let parts: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut values = RouteValues::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal.eq_ignore_ascii_case(part) => {}
                Segment::Literal(_) => return None,
                Segment::Parameter(_) if part.is_empty() || is_dot_segment(part) => return None,
                Segment::Parameter(name) => {
                    values.insert(name.clone(), part.to_string());
                }
            }
        }

        Some(values)
    }

    /// Substitutes `values` into the template. Values are inserted verbatim.
    pub fn render(&self, values: &RouteValues) -> Result<String, ForwardingError> {
        if self.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(literal) => path.push_str(literal),
                Segment::Parameter(name) => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| ForwardingError::MissingRouteValue(name.clone()))?;
                    path.push_str(value);
                }
            }
        }

        Ok(path)
    }
}

impl std::fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn is_dot_segment(part: &str) -> bool {
    let decoded = urlencoding::decode_binary(part.as_bytes());
    matches!(decoded.as_ref(), b"." | b"..")
}

fn parse_segment(template: &str, part: &str) -> Result<Segment, ForwardingError> {
    let invalid = |reason: &str| {
        ForwardingError::InvalidTemplate(format!("'{}': {}", template, reason))
    };

    if part.is_empty() {
        return Err(invalid("empty segment"));
    }

    match part.strip_prefix('{') {
        Some(inner) => {
            let name = inner
                .strip_suffix('}')
                .ok_or_else(|| invalid("unclosed parameter"))?;
            if name.is_empty() {
                return Err(invalid("empty parameter name"));
            }
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid("parameter names must be alphanumeric"));
            }
            Ok(Segment::Parameter(name.to_string()))
        }
        None if part.contains('{') || part.contains('}') => {
            Err(invalid("parameters must span a whole segment"))
        }
        None => Ok(Segment::Literal(part.to_string())),
    }
}
