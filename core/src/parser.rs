//! Document parser (spec §4.1, component E): split a document into literal
//! parts and [ExecutableBlock]s.

use std::collections::BTreeMap;

use crate::error::{GatewayError, Result};
use crate::vartag::VariableTag;

/// `{extension_name, options, body, index_in_parts, has_output}` (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableBlock {
    pub extension_name: String,
    pub options: BTreeMap<String, String>,
    pub body: String,
    pub index_in_parts: usize,
    pub has_output: bool,
}

/// `{parts, blocks}` such that `parts[i]` is literal text and
/// `parts[block.index_in_parts]` is the placeholder slot that will receive
/// that block's substitution (spec §3). `parts` therefore always has
/// `2 * blocks.len() + 1` entries: literal segments at even indices,
/// initially-empty placeholders at odd indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub parts: Vec<String>,
    pub blocks: Vec<ExecutableBlock>,
}

impl ParsedQuery {
    /// Joins `parts` verbatim. Before dispatch (placeholders still empty)
    /// this reproduces the non-block text only; after the dispatcher fills
    /// every placeholder it reproduces the fully rewritten document.
    pub fn join(&self) -> String {
        self.parts.concat()
    }
}

/// Parses `text` into a [ParsedQuery] using the punctuation defined by `tag`.
pub fn parse(text: &str, tag: VariableTag) -> Result<ParsedQuery> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = Vec::new();
    let mut blocks = Vec::new();
    let mut literal = String::new();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];

        if c == tag.escape_char() && i + 1 < chars.len() && tag.valid_for_escape(chars[i + 1]) {
            literal.push(chars[i + 1]);
            i += 2;
            continue;
        }

        if c == tag.left_char() && i + 1 < chars.len() && chars[i + 1] == tag.left_char() {
            let (mut block, consumed) = parse_block(&chars, i, tag, true)?;
            parts.push(std::mem::take(&mut literal));
            block.index_in_parts = parts.len();
            parts.push(String::new());
            blocks.push(block);
            i += consumed;
            continue;
        }
        if c == tag.left_char() && i + 1 < chars.len() && chars[i + 1] == tag.procedure_char() {
            let (mut block, consumed) = parse_block(&chars, i, tag, false)?;
            parts.push(std::mem::take(&mut literal));
            block.index_in_parts = parts.len();
            parts.push(String::new());
            blocks.push(block);
            i += consumed;
            continue;
        }

        literal.push(c);
        i += 1;
    }

    parts.push(literal);
    Ok(ParsedQuery { parts, blocks })
}

/// Parses one block starting at `chars[start]` (pointing at the opening left
/// char). Returns the block (with `index_in_parts` left at 0, filled by the
/// caller) and the number of chars consumed, including both delimiters.
fn parse_block(
    chars: &[char],
    start: usize,
    tag: VariableTag,
    is_function: bool,
) -> Result<(ExecutableBlock, usize)> {
    let open_len = 2;
    let body_start = start + open_len;
    let close: [char; 2] = if is_function {
        [tag.right_char(), tag.right_char()]
    } else {
        [tag.procedure_char(), tag.right_char()]
    };
    let other_close: [char; 2] = if is_function {
        [tag.procedure_char(), tag.right_char()]
    } else {
        [tag.right_char(), tag.right_char()]
    };

    let mut j = body_start;
    let close_at = loop {
        if j + 1 >= chars.len() {
            return Err(GatewayError::client(format!(
                "unterminated block starting at character {start}"
            )));
        }
        if chars[j] == close[0] && chars[j + 1] == close[1] {
            break j;
        }
        if chars[j] == other_close[0] && chars[j + 1] == other_close[1] {
            return Err(GatewayError::client(format!(
                "mismatched closing delimiter inside block starting at character {start}"
            )));
        }
        j += 1;
    };

    let inner: String = chars[body_start..close_at].iter().collect();
    let block = parse_inner(&inner, is_function)?;
    let consumed = (close_at + 2) - start;
    Ok((block, consumed))
}

/// Splits `name(opts?): body` after locating the top-level colon (the first
/// `:` that is not inside the balanced `(...)` option list).
fn parse_inner(inner: &str, is_function: bool) -> Result<ExecutableBlock> {
    let trimmed = inner.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    let mut i = 0usize;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.' || chars[i] == '-') {
        i += 1;
    }
    let name: String = chars[..i].iter().collect();

    let mut opts_raw = String::new();
    if i < chars.len() && chars[i] == '(' {
        let mut depth = 0i32;
        let opts_start = i;
        loop {
            if i >= chars.len() {
                return Err(GatewayError::client(format!(
                    "unterminated option list in block '{name}'"
                )));
            }
            match chars[i] {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        i += 1;
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        opts_raw = chars[opts_start + 1..i - 1].iter().collect();
    }

    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    let body = if i < chars.len() && chars[i] == ':' {
        chars[i + 1..].iter().collect::<String>().trim().to_string()
    } else if i >= chars.len() {
        String::new()
    } else {
        return Err(GatewayError::client(format!(
            "expected ':' after block name '{name}'"
        )));
    };

    Ok(ExecutableBlock {
        extension_name: name.to_ascii_lowercase(),
        options: parse_opts(&opts_raw),
        body,
        index_in_parts: 0,
        has_output: is_function,
    })
}

/// Parses `k=v,k=v` with `,` and `=` escapable by `\` inside values.
fn parse_opts(raw: &str) -> BTreeMap<String, String> {
    let mut opts = BTreeMap::new();
    if raw.is_empty() {
        return opts;
    }
    let mut pairs = Vec::new();
    let mut cur = String::new();
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == ',' || next == '=' {
                    cur.push(next);
                    chars.next();
                    continue;
                }
            }
            cur.push(c);
            continue;
        }
        if c == ',' {
            pairs.push(std::mem::take(&mut cur));
            continue;
        }
        cur.push(c);
    }
    pairs.push(cur);

    for pair in pairs {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        if let Some(eq) = find_unescaped_eq(pair) {
            let key = pair[..eq].trim().to_string();
            let value = pair[eq + 1..].trim().to_string();
            opts.insert(key, value);
        } else {
            opts.insert(pair.to_string(), String::new());
        }
    }
    opts
}

fn find_unescaped_eq(s: &str) -> Option<usize> {
    let bytes: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == '\\' {
            i += 2;
            continue;
        }
        if bytes[i] == '=' {
            return Some(s.char_indices().nth(i).unwrap().0);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn passthrough_with_no_blocks_round_trips() {
        let p = parse("select 1", VariableTag::Brace).unwrap();
        assert_eq!(p.blocks.len(), 0);
        assert_eq!(p.join(), "select 1");
    }

    #[test]
    fn empty_document_has_single_empty_part() {
        let p = parse("", VariableTag::Brace).unwrap();
        assert_eq!(p.blocks.len(), 0);
        assert_eq!(p.parts, vec![String::new()]);
    }

    #[test]
    fn function_block_has_output_true() {
        let p = parse(
            "select * from {{ web(base.url='https://h/x'): select 5 }}",
            VariableTag::Brace,
        )
        .unwrap();
        assert_eq!(p.blocks.len(), 1);
        let b = &p.blocks[0];
        assert!(b.has_output);
        assert_eq!(b.extension_name, "web");
        assert_eq!(b.body, "select 5");
        assert_eq!(b.options.get("base.url").unwrap(), "'https://h/x'");
    }

    #[test]
    fn procedure_block_has_output_false() {
        let p = parse("{% var: a=1, b='2' %}select ${a}, ${b}", VariableTag::Brace).unwrap();
        assert_eq!(p.blocks.len(), 1);
        let b = &p.blocks[0];
        assert!(!b.has_output);
        assert_eq!(b.extension_name, "var");
        assert_eq!(b.body, "a=1, b='2'");
    }

    #[test]
    fn bridge_block_with_url_option_parses_colon_correctly() {
        let p = parse("{{ bridge(url=http://b/): select 7 }}", VariableTag::Brace).unwrap();
        let b = &p.blocks[0];
        assert_eq!(b.extension_name, "bridge");
        assert_eq!(b.options.get("url").unwrap(), "http://b/");
        assert_eq!(b.body, "select 7");
    }

    #[test]
    fn unterminated_block_is_parse_error() {
        let err = parse("select {{ web: x", VariableTag::Brace).unwrap_err();
        assert!(matches!(err, GatewayError::Client { .. }));
    }

    #[test]
    fn mismatched_closer_is_parse_error() {
        let err = parse("{{ web: x %}", VariableTag::Brace).unwrap_err();
        assert!(matches!(err, GatewayError::Client { .. }));
    }

    #[test]
    fn escape_emits_char_verbatim() {
        let p = parse(r"a \$ b", VariableTag::Brace).unwrap();
        assert_eq!(p.join(), "a $ b");
    }

    #[test]
    fn escape_does_not_apply_to_structural_chars() {
        // `\{` is not a valid escape (escape never applies to L/R/P), so the
        // backslash is emitted literally and `{` is scanned normally.
        let p = parse(r"a \{ b", VariableTag::Brace).unwrap();
        assert_eq!(p.join(), r"a \{ b");
    }

    #[test]
    fn blocks_ordered_by_textual_position() {
        let p = parse("{% var: a=1 %}x{% var: b=2 %}", VariableTag::Brace).unwrap();
        assert_eq!(p.blocks[0].body, "a=1");
        assert_eq!(p.blocks[1].body, "b=2");
        assert!(p.blocks[0].index_in_parts < p.blocks[1].index_in_parts);
    }
}
