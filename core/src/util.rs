//! Small ambient helpers shared across modules (component K): output-format
//! inference from a filename, per-query timeout arithmetic (spec §5), and a
//! couple of string helpers reused by more than one serializer.

use std::time::Duration;

/// Guesses a [crate::serializer::by_name] format name from a file path's
/// extension. Returns `None` for unrecognized or missing extensions — the
/// caller decides the fallback (spec §6's `outputFormat` property takes
/// precedence and is never inferred here).
pub fn infer_format(path: &str) -> Option<&'static str> {
    let ext = path.rsplit('.').next()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "csv" => "csv",
        "tsv" => "tsv",
        "md" | "markdown" => "markdown",
        "json" | "jsonl" | "ndjson" => "json",
        "sql" => "values",
        "arrow" | "ipc" => "arrow",
        "parquet" | "pq" => "parquet",
        "bin" | "dat" => "binary",
        _ => return None,
    })
}

/// The per-query timeout bounding one I/O operation: `min(exec_timeout,
/// per_op_timeout)` (spec §5, "Cancellation & timeouts"). `None` means no
/// bound on that axis; `None` on both means unbounded.
pub fn effective_timeout(exec_timeout: Option<Duration>, per_op_timeout: Option<Duration>) -> Option<Duration> {
    match (exec_timeout, per_op_timeout) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Splits `k=v,k=v` pairs on top-level `,` and `=`, honoring a single
/// backslash as an escape for either separator. Shared by
/// [crate::parser]-adjacent code that needs the same option-list grammar
/// outside of a full document parse (e.g. the `var` extension's body).
pub fn split_kv_pairs(raw: &str) -> Vec<(String, String)> {
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
    if !cur.is_empty() || !pairs.is_empty() {
        pairs.push(cur);
    }

    pairs
        .into_iter()
        .filter_map(|pair| {
            let pair = pair.trim();
            if pair.is_empty() {
                return None;
            }
            match pair.split_once('=') {
                Some((k, v)) => Some((k.trim().to_string(), v.trim().to_string())),
                None => Some((pair.to_string(), String::new())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_known_extensions_case_insensitively() {
        assert_eq!(infer_format("out.CSV"), Some("csv"));
        assert_eq!(infer_format("result.parquet"), Some("parquet"));
        assert_eq!(infer_format("no_extension"), None);
    }

    #[test]
    fn effective_timeout_takes_the_minimum_of_both_bounds() {
        let a = Duration::from_secs(30);
        let b = Duration::from_secs(5);
        assert_eq!(effective_timeout(Some(a), Some(b)), Some(b));
        assert_eq!(effective_timeout(None, Some(b)), Some(b));
        assert_eq!(effective_timeout(None, None), None);
    }

    #[test]
    fn split_kv_pairs_respects_escaped_separators() {
        let pairs = split_kv_pairs(r"a=1,b=x\,y,c");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "x,y".to_string()),
                ("c".to_string(), String::new()),
            ]
        );
    }
}
