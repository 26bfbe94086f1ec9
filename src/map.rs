use swc_core::ecma::ast::Expr;

use crate::dispatch::Pass;
use crate::env::display_value;
use crate::error::{PerEnvError, Result};
use crate::literals::{bool_lit, key_values, plain_args, str_lit};
use crate::references::{CallReference, CallSite};

const CALLEE: &str = "loadPerEnvMap";

/// Resolves one `loadPerEnvMap({ key: path, ... }, envar[, nullable])` call.
pub fn resolve(pass: &mut Pass<'_>, reference: &CallReference) -> Result<()> {
    let args = plain_args(CALLEE, reference)?;
    let (map, envar, nullable) = match args.as_slice() {
        [map, envar] => (*map, *envar, None),
        [map, envar, nullable] => (*map, *envar, Some(*nullable)),
        _ => {
            return Err(PerEnvError::invalid(
                CALLEE,
                format!("expected 2 or 3 arguments, found {}", args.len()),
                reference.span,
            ))
        }
    };

    let entries = env_map(map, reference)?;
    let envar = str_lit(envar).ok_or_else(|| {
        PerEnvError::invalid(
            CALLEE,
            "the environment variable name must be a string literal",
            reference.span,
        )
    })?;
    let nullable = match nullable {
        None => false,
        Some(e) => bool_lit(e).ok_or_else(|| {
            PerEnvError::invalid(CALLEE, "`nullable` must be a boolean literal", reference.span)
        })?,
    };

    let live = pass.env.var(&envar);
    let selected = live
        .as_deref()
        .and_then(|value| entries.iter().find(|(key, _)| key == value))
        .map(|(_, path)| path.clone());

    tracing::debug!(
        %envar,
        live = ?live,
        selected = ?selected,
        nullable,
        assigned = reference.is_assigned(),
        "resolved loadPerEnvMap"
    );

    match (selected, &reference.site) {
        (Some(path), CallSite::Declarator { binding, kind, .. }) => {
            let Some(binding) = binding else {
                return Err(PerEnvError::invalid(
                    CALLEE,
                    "the result must be assigned to a plain identifier",
                    reference.span,
                ));
            };
            tracing::trace!(name = %binding.sym, ?kind, "declarator becomes namespace import");
            pass.edits
                .prepend_module_reference(path, Some(binding.clone()));
            pass.edits.remove_site(&reference.site);
        }
        (Some(path), CallSite::Statement { .. }) => {
            pass.edits.prepend_module_reference(path, None);
            pass.edits.remove_site(&reference.site);
        }
        (None, _) if !nullable => {
            return Err(PerEnvError::EntryNotFound {
                envar,
                value: display_value(live.as_deref()),
                span: reference.span,
            });
        }
        (None, CallSite::Declarator { item, decl, .. }) => {
            pass.edits.replace_with_null(*item, *decl);
        }
        (None, CallSite::Statement { .. }) => {
            pass.edits.remove_site(&reference.site);
        }
    }
    Ok(())
}

/// The `{ key: path }` literal as ordered pairs.
fn env_map(expr: &Expr, reference: &CallReference) -> Result<Vec<(String, String)>> {
    let Expr::Object(obj) = expr else {
        return Err(PerEnvError::invalid(
            CALLEE,
            "the first argument must be an object literal",
            reference.span,
        ));
    };
    let mut entries: Vec<(String, String)> = Vec::with_capacity(obj.props.len());
    for (key, value) in key_values(CALLEE, obj)? {
        if entries.iter().any(|(k, _)| *k == key) {
            return Err(PerEnvError::invalid(
                CALLEE,
                format!("key `{key}` appears more than once"),
                reference.span,
            ));
        }
        let path = str_lit(value).ok_or_else(|| {
            PerEnvError::invalid(
                CALLEE,
                format!("the path for `{key}` must be a string literal"),
                reference.span,
            )
        })?;
        entries.push((key, path));
    }
    Ok(entries)
}
