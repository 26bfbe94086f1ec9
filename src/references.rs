use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use swc_core::{
    common::Span,
    ecma::{
        ast::*,
        visit::{Visit, VisitWith},
    },
};

use crate::error::{PerEnvError, Result};

fn macro_source_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(^|[./])perenv\.macro(\.c?js)?$").expect("valid regex"))
}

pub fn is_macro_source(src: &str) -> bool {
    macro_source_re().is_match(src)
}

// -----------------------------------------------------------------------------
// Call references
// -----------------------------------------------------------------------------

/// Where a macro call sits in the module body.
#[derive(Debug, Clone)]
pub enum CallSite {
    /// `loadPerEnv(...);`
    Statement { item: usize },
    /// `const x = loadPerEnvMap(...);`, the `decl`-th declarator of `item`.
    Declarator {
        item: usize,
        decl: usize,
        /// Plain identifier target; `None` for destructuring patterns.
        binding: Option<Ident>,
        kind: VarDeclKind,
    },
}

#[derive(Debug, Clone)]
pub struct CallReference {
    pub span: Span,
    pub args: Vec<ExprOrSpread>,
    pub site: CallSite,
}

impl CallReference {
    pub fn is_assigned(&self) -> bool {
        matches!(self.site, CallSite::Declarator { .. })
    }
}

/// All call sites of one imported macro name.
#[derive(Debug)]
pub struct ReferenceGroup {
    /// Name as exported by the macro (`loadPerEnv` in `import { loadPerEnv as x }`).
    pub imported: String,
    /// Span of the first specifier that imported it.
    pub span: Span,
    pub locals: Vec<Id>,
    pub references: Vec<CallReference>,
}

#[derive(Debug, Default)]
pub struct CollectedReferences {
    /// Body positions of the macro imports themselves.
    pub macro_imports: Vec<usize>,
    pub groups: Vec<ReferenceGroup>,
}

impl CollectedReferences {
    pub fn is_empty(&self) -> bool {
        self.macro_imports.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Collection
// -----------------------------------------------------------------------------

/// Finds the macro imports of `module` and every call made through them.
pub fn collect(module: &Module) -> Result<CollectedReferences> {
    let mut out = CollectedReferences::default();
    let mut by_local: HashMap<Id, usize> = HashMap::new();

    for (idx, item) in module.body.iter().enumerate() {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
            continue;
        };
        if !is_macro_source(&import.src.value.to_string()) {
            continue;
        }
        out.macro_imports.push(idx);
        for s in &import.specifiers {
            let (imported, local, span) = match s {
                ImportSpecifier::Named(named) => {
                    let imported = match &named.imported {
                        Some(ModuleExportName::Ident(i)) => i.sym.to_string(),
                        Some(ModuleExportName::Str(s)) => s.value.to_string(),
                        None => named.local.sym.to_string(),
                    };
                    (imported, &named.local, named.span)
                }
                ImportSpecifier::Default(d) => ("default".to_string(), &d.local, d.span),
                ImportSpecifier::Namespace(ns) => ("*".to_string(), &ns.local, ns.span),
            };
            let group = match out.groups.iter().position(|g| g.imported == imported) {
                Some(g) => g,
                None => {
                    out.groups.push(ReferenceGroup {
                        imported,
                        span,
                        locals: vec![],
                        references: vec![],
                    });
                    out.groups.len() - 1
                }
            };
            out.groups[group].locals.push(local.to_id());
            by_local.insert(local.to_id(), group);
        }
    }

    if out.is_empty() {
        return Ok(out);
    }

    let mut handled: Vec<Span> = vec![];
    for (idx, item) in module.body.iter().enumerate() {
        match item {
            ModuleItem::Stmt(Stmt::Expr(ExprStmt { expr, .. })) => {
                if let Some((group, callee, call)) = macro_call(expr, &by_local) {
                    handled.push(callee.span);
                    out.groups[group].references.push(CallReference {
                        span: call.span,
                        args: call.args.clone(),
                        site: CallSite::Statement { item: idx },
                    });
                }
            }
            ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
                for (decl, d) in var.decls.iter().enumerate() {
                    let Some(init) = &d.init else { continue };
                    if let Some((group, callee, call)) = macro_call(init, &by_local) {
                        handled.push(callee.span);
                        out.groups[group].references.push(CallReference {
                            span: call.span,
                            args: call.args.clone(),
                            site: CallSite::Declarator {
                                item: idx,
                                decl,
                                binding: d.name.as_ident().map(|b| b.id.clone()),
                                kind: var.kind,
                            },
                        });
                    }
                }
            }
            _ => {}
        }
    }

    let mut finder = UsageFinder {
        locals: &by_local,
        found: vec![],
    };
    for (idx, item) in module.body.iter().enumerate() {
        if !out.macro_imports.contains(&idx) {
            item.visit_with(&mut finder);
        }
    }
    for (name, span) in finder.found {
        match handled.iter().position(|s| *s == span) {
            Some(pos) => {
                handled.swap_remove(pos);
            }
            None => {
                return Err(PerEnvError::UnsupportedCallSite {
                    callee: name,
                    span,
                })
            }
        }
    }

    for g in &out.groups {
        tracing::trace!(
            imported = %g.imported,
            references = g.references.len(),
            "collected perenv.macro references"
        );
    }
    Ok(out)
}

fn macro_call<'a>(
    expr: &'a Expr,
    by_local: &HashMap<Id, usize>,
) -> Option<(usize, &'a Ident, &'a CallExpr)> {
    let Expr::Call(call) = expr else { return None };
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Ident(ident) = &**callee else {
        return None;
    };
    by_local
        .get(&ident.to_id())
        .map(|group| (*group, ident, call))
}

/// Every identifier in the tree that refers to a macro import.
struct UsageFinder<'a> {
    locals: &'a HashMap<Id, usize>,
    found: Vec<(String, Span)>,
}

impl Visit for UsageFinder<'_> {
    fn visit_ident(&mut self, i: &Ident) {
        if self.locals.contains_key(&i.to_id()) {
            self.found.push((i.sym.to_string(), i.span));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::parse;

    #[test]
    fn recognizes_macro_sources() {
        assert!(is_macro_source("perenv.macro"));
        assert!(is_macro_source("./perEnv.macro"));
        assert!(is_macro_source("../lib/perenv.macro.js"));
        assert!(is_macro_source("@scope/perenv.macro.cjs"));
        assert!(!is_macro_source("./perenv"));
        assert!(!is_macro_source("superperenv.macro"));
        assert!(!is_macro_source("perenv.macro/other"));
    }

    #[test]
    fn modules_without_macro_import_collect_nothing() {
        let (_, module) = parse("import a from './a.js';\nloadPerEnv('./x.js', 'X');");
        let refs = collect(&module).unwrap();
        assert!(refs.is_empty());
        assert!(refs.groups.is_empty());
    }

    #[test]
    fn groups_by_imported_name() {
        let (_, module) = parse(
            "import { loadPerEnv as lpe, loadPerEnvMap } from 'perenv.macro';\n\
             lpe('./a.js', 'A');\n\
             const feature = loadPerEnvMap({ a: './a.js' }, 'F');\n\
             lpe('./b.js', 'B');",
        );
        let refs = collect(&module).unwrap();
        assert_eq!(refs.macro_imports, vec![0]);
        let names: Vec<_> = refs.groups.iter().map(|g| g.imported.as_str()).collect();
        assert_eq!(names, vec!["loadPerEnv", "loadPerEnvMap"]);
        assert_eq!(refs.groups[0].references.len(), 2);

        let map_ref = &refs.groups[1].references[0];
        assert!(map_ref.is_assigned());
        match &map_ref.site {
            CallSite::Declarator {
                item,
                decl,
                binding,
                kind,
            } => {
                assert_eq!((*item, *decl), (2, 0));
                assert_eq!(binding.as_ref().map(|b| b.sym.as_ref()), Some("feature"));
                assert_eq!(*kind, VarDeclKind::Const);
            }
            other => panic!("unexpected site {other:?}"),
        }
    }

    #[test]
    fn default_and_namespace_specifiers_form_their_own_groups() {
        let (_, module) = parse("import perenv, * as all from 'perenv.macro';");
        let refs = collect(&module).unwrap();
        let names: Vec<_> = refs.groups.iter().map(|g| g.imported.as_str()).collect();
        assert_eq!(names, vec!["default", "*"]);
    }

    #[test]
    fn nested_use_is_rejected() {
        let (_, module) = parse(
            "import { loadPerEnv } from 'perenv.macro';\n\
             function f() { loadPerEnv('./a.js', 'A'); }",
        );
        let err = collect(&module).unwrap_err();
        assert!(matches!(
            err,
            PerEnvError::UnsupportedCallSite { ref callee, .. } if callee == "loadPerEnv"
        ));
    }

    #[test]
    fn use_as_value_is_rejected() {
        let (_, module) = parse(
            "import { loadPerEnv } from 'perenv.macro';\nconst f = loadPerEnv;",
        );
        assert!(matches!(
            collect(&module),
            Err(PerEnvError::UnsupportedCallSite { .. })
        ));
    }
}
