use swc_core::ecma::ast::*;

use crate::error::{PerEnvError, Result};
use crate::references::CallReference;

/// Call arguments as plain expressions; spreads cannot be read at build time.
pub(crate) fn plain_args<'a>(
    callee: &'static str,
    reference: &'a CallReference,
) -> Result<Vec<&'a Expr>> {
    reference
        .args
        .iter()
        .map(|arg| match arg.spread {
            Some(_) => Err(PerEnvError::invalid(
                callee,
                "spread arguments are not supported",
                reference.span,
            )),
            None => Ok(&*arg.expr),
        })
        .collect()
}

pub(crate) fn str_lit(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
        Expr::Paren(p) => str_lit(&p.expr),
        _ => None,
    }
}

pub(crate) fn bool_lit(expr: &Expr) -> Option<bool> {
    match expr {
        Expr::Lit(Lit::Bool(b)) => Some(b.value),
        Expr::Paren(p) => bool_lit(&p.expr),
        _ => None,
    }
}

/// Key of an object literal property, as JS would stringify it.
pub(crate) fn prop_key(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(i) => Some(i.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        PropName::Num(n) => Some(n.value.to_string()),
        _ => None,
    }
}

/// `key: value` pairs of an object literal, in source order.
pub(crate) fn key_values<'a>(
    callee: &'static str,
    obj: &'a ObjectLit,
) -> Result<Vec<(String, &'a Expr)>> {
    obj.props
        .iter()
        .map(|p| {
            let PropOrSpread::Prop(p) = p else {
                return Err(PerEnvError::invalid(
                    callee,
                    "object spreads are not supported",
                    obj.span,
                ));
            };
            let Prop::KeyValue(kv) = &**p else {
                return Err(PerEnvError::invalid(
                    callee,
                    "only `key: value` properties are supported",
                    obj.span,
                ));
            };
            let key = prop_key(&kv.key).ok_or_else(|| {
                PerEnvError::invalid(callee, "computed keys are not supported", obj.span)
            })?;
            Ok((key, &*kv.value))
        })
        .collect()
}
