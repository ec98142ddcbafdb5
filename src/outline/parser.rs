//! Depth-Marker Outline Parser
//!
//! Turns free text into ordered [`OutlineLine`] records.
//!
//! ## Line Syntax
//!
//! ```text
//! --SEO Audit ::template=wide ::status=draft :+Comprehensive SEO review
//! ^^ depth    ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ directives   ^^^^^^^^^^ excerpt
//! ```
//!
//! - Leading marker characters (default `-`) give the depth
//! - The first `:+` splits title from excerpt
//! - `::key=value` segments in the title part become directives
//!
//! Rejected lines are reported, never truncated or repaired.

use tracing::{debug, info};

use crate::config::OutlineConfig;
use crate::constants::outline::{DIRECTIVE_PREFIX, EXCERPT_SEPARATOR};
use crate::types::{Directives, LineError, LineErrorKind, OutlineLine, ParsedOutline};

/// Stateless outline parser
///
/// Parsing is a pure function of the text and the config: the same input
/// always yields structurally identical output.
pub struct OutlineParser {
    config: OutlineConfig,
}

impl OutlineParser {
    pub fn new(config: OutlineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Parse raw outline text
    pub fn parse(&self, text: &str) -> ParsedOutline {
        let mut output = ParsedOutline::default();
        let mut seen = 0usize;

        for (index, raw) in text.lines().enumerate() {
            let line_number = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }

            if seen >= self.config.max_lines {
                output.errors.push(LineError::new(
                    line_number,
                    LineErrorKind::LineLimit,
                    format!(
                        "outline exceeds {} lines; remaining lines ignored",
                        self.config.max_lines
                    ),
                ));
                break;
            }
            seen += 1;

            match self.parse_line(line_number, raw, trimmed) {
                Ok(line) => output.lines.push(line),
                Err(err) => {
                    debug!("Rejected outline {}", err);
                    output.errors.push(err);
                }
            }
        }

        info!(
            "Parsed outline: {} lines accepted, {} rejected",
            output.lines.len(),
            output.errors.len()
        );

        output
    }

    fn parse_line(
        &self,
        line_number: usize,
        raw: &str,
        trimmed: &str,
    ) -> Result<OutlineLine, LineError> {
        let marker = self.config.marker;
        let depth = trimmed.chars().take_while(|c| *c == marker).count();
        let rest = trimmed[depth * marker.len_utf8()..].trim_start();

        let (title_part, excerpt) = match rest.split_once(EXCERPT_SEPARATOR) {
            Some((title_part, excerpt)) => {
                let excerpt = excerpt.trim();
                (title_part, (!excerpt.is_empty()).then(|| excerpt.to_string()))
            }
            None => (rest, None),
        };

        let (title, directives) = extract_directives(title_part);

        if title.is_empty() {
            return Err(LineError::new(
                line_number,
                LineErrorKind::EmptyTitle,
                "no title left after removing markers, excerpt and directives",
            ));
        }

        if depth > self.config.max_depth {
            return Err(LineError::new(
                line_number,
                LineErrorKind::TooDeep,
                format!(
                    "depth {} exceeds maximum of {}",
                    depth, self.config.max_depth
                ),
            )
            .with_title(title));
        }

        let length = title.chars().count();
        if length > self.config.max_title_length {
            return Err(LineError::new(
                line_number,
                LineErrorKind::TitleTooLong,
                format!(
                    "title is {} characters, maximum is {}",
                    length, self.config.max_title_length
                ),
            )
            .with_title(title));
        }

        Ok(OutlineLine {
            line_number,
            raw: raw.to_string(),
            depth,
            title,
            excerpt,
            directives,
        })
    }
}

impl Default for OutlineParser {
    fn default() -> Self {
        Self::new(OutlineConfig::default())
    }
}

/// Parse raw outline text with the given limits
pub fn parse(text: &str, config: &OutlineConfig) -> ParsedOutline {
    OutlineParser::new(config.clone()).parse(text)
}

/// Split `::key=value` segments out of a title.
///
/// A value runs to the next `::` or the end of the title. Segments that are
/// not a well-formed `key=value` pair stay in the title verbatim. Keys are
/// lowercased; a repeated key keeps its first position and takes the last
/// value.
fn extract_directives(title_part: &str) -> (String, Directives) {
    let mut directives = Directives::new();
    let mut segments = title_part.split(DIRECTIVE_PREFIX);

    let mut title = segments.next().unwrap_or_default().to_string();

    for segment in segments {
        match parse_directive(segment) {
            Some((key, value)) => {
                directives.insert(key, value);
            }
            None => {
                title.push_str(DIRECTIVE_PREFIX);
                title.push_str(segment);
            }
        }
    }

    (title.trim().to_string(), directives)
}

fn parse_directive(segment: &str) -> Option<(String, String)> {
    let (key, value) = segment.split_once('=')?;
    let key = key.trim();

    let valid_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    valid_key.then(|| (key.to_lowercase(), value.trim().to_string()))
}
