use std::sync::OnceLock;

use regex::Regex;
use swc_core::common::{Span, SyntaxContext};
use swc_core::ecma::ast::Expr;

use crate::bindings::top_level_bindings;
use crate::dispatch::Pass;
use crate::env::EnvCondition;
use crate::error::{PerEnvError, Result};
use crate::literals::{key_values, plain_args, str_lit};
use crate::mutator::synthetic_ident;
use crate::references::CallReference;

const CALLEE: &str = "loadPerEnv";

/// First argument of `loadPerEnv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    pub path: String,
    pub identifier: Option<String>,
}

fn ident_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[\p{ID_Start}_$][\p{ID_Continue}$\x{200C}\x{200D}]*$").expect("valid regex")
    })
}

/// Words that cannot name a binding in module code, which is always strict.
const RESERVED: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

fn is_binding_name(name: &str) -> bool {
    ident_re().is_match(name) && !RESERVED.contains(&name)
}

/// Resolves one `loadPerEnv(path | { path, identifier }, envar[, expected])` call.
pub fn resolve(pass: &mut Pass<'_>, reference: &CallReference) -> Result<()> {
    let args = plain_args(CALLEE, reference)?;
    let (target, envar, expected) = match args.as_slice() {
        [target, envar] => (*target, *envar, None),
        [target, envar, expected] => (*target, *envar, Some(*expected)),
        _ => {
            return Err(PerEnvError::invalid(
                CALLEE,
                format!("expected 2 or 3 arguments, found {}", args.len()),
                reference.span,
            ))
        }
    };

    let spec = path_spec(target, reference.span)?;
    if let Some(identifier) = &spec.identifier {
        if top_level_bindings(pass.module, &pass.edits).contains(identifier) {
            return Err(PerEnvError::DuplicateIdentifier {
                name: identifier.clone(),
                span: reference.span,
            });
        }
    }

    let condition = EnvCondition {
        envar: str_lit(envar).ok_or_else(|| {
            PerEnvError::invalid(
                CALLEE,
                "the environment variable name must be a string literal",
                reference.span,
            )
        })?,
        expected: expected
            .map(|e| {
                str_lit(e).ok_or_else(|| {
                    PerEnvError::invalid(
                        CALLEE,
                        "the expected value must be a string literal",
                        reference.span,
                    )
                })
            })
            .transpose()?,
    };

    let load = condition.is_satisfied(pass.env);
    tracing::debug!(
        path = %spec.path,
        identifier = ?spec.identifier,
        envar = %condition.envar,
        expected = ?condition.expected,
        load,
        "resolved loadPerEnv"
    );
    if load {
        // Same context the resolver gave free references to the name, so
        // hygiene treats the import and its uses as one binding.
        let ctxt = SyntaxContext::empty().apply_mark(pass.unresolved_mark);
        let binding = spec
            .identifier
            .as_deref()
            .map(|name| synthetic_ident(name, ctxt));
        pass.edits.prepend_module_reference(spec.path, binding);
    }
    pass.edits.remove_site(&reference.site);
    Ok(())
}

fn path_spec(expr: &Expr, span: Span) -> Result<PathSpec> {
    if let Some(path) = str_lit(expr) {
        return Ok(PathSpec {
            path,
            identifier: None,
        });
    }
    let Expr::Object(obj) = expr else {
        return Err(PerEnvError::invalid(
            CALLEE,
            "the first argument must be a string literal or a `{ path, identifier }` object",
            span,
        ));
    };

    let mut path = None;
    let mut identifier = None;
    for (key, value) in key_values(CALLEE, obj)? {
        let slot = match key.as_str() {
            "path" => &mut path,
            "identifier" => &mut identifier,
            other => {
                return Err(PerEnvError::invalid(
                    CALLEE,
                    format!("unknown option `{other}`"),
                    span,
                ))
            }
        };
        if slot.is_some() {
            return Err(PerEnvError::invalid(
                CALLEE,
                format!("option `{key}` is given twice"),
                span,
            ));
        }
        *slot = Some(str_lit(value).ok_or_else(|| {
            PerEnvError::invalid(CALLEE, format!("`{key}` must be a string literal"), span)
        })?);
    }

    let path = path.ok_or_else(|| PerEnvError::invalid(CALLEE, "missing `path`", span))?;
    if let Some(name) = &identifier {
        if !is_binding_name(name) {
            return Err(PerEnvError::invalid(
                CALLEE,
                format!("`{name}` is not a valid identifier"),
                span,
            ));
        }
    }
    Ok(PathSpec { path, identifier })
}
