//! Rewrite pipeline (spec §4.6, component H): executable-block rewrite
//! followed by variable-reference resolution.

use std::sync::Arc;

use tracing::instrument;

use crate::error::{GatewayError, Result, Warning};
use crate::option::{Config, DEFAULT_PREFIX};
use crate::parser::{self, ParsedQuery};
use crate::registry::{ConnectionHandle, Registry};
use crate::result::ResultSet;
use crate::value::{Field, Value};
use crate::variables::{QueryContext, Scope};
use crate::vartag::VariableTag;

/// Chosen via the `error.handling` option on a per-block basis (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorHandling {
    Throw,
    Warn,
    Ignore,
}

impl ErrorHandling {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "warn" => ErrorHandling::Warn,
            "ignore" => ErrorHandling::Ignore,
            _ => ErrorHandling::Throw,
        }
    }
}

pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Rewrites `text`: each block is dispatched to its extension's
    /// listener in textual order, its output (or nothing, for a
    /// no-output procedure) fills the corresponding slot, then every
    /// `${var}` reference is resolved against the scoped store.
    /// `warnings` collects non-fatal block failures when a block's
    /// `error.handling` option is `warn`.
    #[instrument(skip(self, ctx, conn, connection_properties, warnings), err)]
    pub fn rewrite(
        &self,
        text: &str,
        tag: VariableTag,
        ctx: &Arc<QueryContext>,
        conn: &Arc<dyn ConnectionHandle>,
        connection_properties: &Config,
        warnings: &mut Vec<Warning>,
    ) -> Result<String> {
        let mut parsed: ParsedQuery = parser::parse(text, tag)?;

        for block in parsed.blocks.clone() {
            let ext = self.registry.resolve(&block.extension_name).ok_or_else(|| {
                GatewayError::client(format!("unknown extension '{}'", block.extension_name))
            })?;

            let mut cfg = Config::from_descriptors(&ext.default_options());
            cfg.overlay_scoped(connection_properties, DEFAULT_PREFIX, ext.name());
            cfg.overlay_pairs(block.options.iter());

            let dispatched = (|| -> Result<ResultSet> {
                let mut listener = ext.create_listener(ctx.clone(), conn.clone(), cfg.clone())?;
                let result = listener.on_query(&block.body)?;
                listener.on_result(result)
            })();

            let text_out = match dispatched {
                Ok(mut result) => {
                    let rendered = if block.has_output {
                        stringify(&mut result, &cfg, ctx)?
                    } else {
                        String::new()
                    };
                    result.close()?;
                    rendered
                }
                Err(e) => match ErrorHandling::parse(cfg.get_or("error.handling", "throw")) {
                    ErrorHandling::Throw => return Err(e),
                    ErrorHandling::Warn => {
                        warnings.push(Warning {
                            block_extension: block.extension_name.clone(),
                            message: e.to_string(),
                        });
                        block.body.clone()
                    }
                    ErrorHandling::Ignore => String::new(),
                },
            };
            parsed.parts[block.index_in_parts] = text_out;
        }

        let rewritten = parsed.join();
        resolve_variables(&rewritten, tag, ctx)
    }
}

/// `stringify(result)` per spec §4.6: zero fields -> empty; one field ->
/// comma-joined `asString` of every row; multiple fields -> the first
/// column, comma-joined. When `result_var` is set, additionally publishes
/// `<var>.<fieldname>` for each column into the query scope.
fn stringify(result: &mut ResultSet, cfg: &Config, ctx: &QueryContext) -> Result<String> {
    let fields: Vec<Field> = result.fields().to_vec();
    if fields.is_empty() {
        return Ok(String::new());
    }

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); fields.len()];
    while let Some(row) = result.next_row()? {
        for (i, column) in columns.iter_mut().enumerate().take(row.size()) {
            if let Some(v) = row.get(i) {
                column.push(v.as_string());
            }
        }
    }

    let text = columns[0].join(",");

    if let Some(var_name) = cfg.get("result_var").filter(|v| !v.is_empty()) {
        ctx.set_variable(Scope::Query, var_name, Value::String(text.clone(), None));
        if fields.len() > 1 {
            for (field, column) in fields.iter().zip(columns.iter()) {
                let key = format!("{var_name}.{}", field.name());
                ctx.set_variable(Scope::Query, key, Value::String(column.join(","), None));
            }
        }
    }

    Ok(text)
}

/// Resolves `VL name R` references against the scoped store. Missing
/// variables are left literal unless `strict_variables` is set on `ctx`, in
/// which case resolution fails (spec §4.1).
fn resolve_variables(text: &str, tag: VariableTag, ctx: &QueryContext) -> Result<String> {
    let v = tag.variable_char();
    let l = tag.left_char();
    let r = tag.right_char();
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0usize;

    while i < chars.len() {
        if chars[i] == v && i + 1 < chars.len() && chars[i + 1] == l {
            if let Some(close) = chars[i + 2..].iter().position(|&c| c == r) {
                let name_start = i + 2;
                let name_end = name_start + close;
                let name: String = chars[name_start..name_end].iter().collect();
                match ctx.get_variable_in_scope(None, &name) {
                    Some(value) => {
                        out.push_str(&value.as_string());
                        i = name_end + 1;
                        continue;
                    }
                    None => {
                        if ctx.strict_variables {
                            return Err(GatewayError::client(format!(
                                "undefined variable '{name}'"
                            )));
                        }
                        // left literal
                    }
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    Ok(out)
}
