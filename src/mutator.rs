use std::collections::{HashMap, HashSet};

use swc_core::{
    common::{SyntaxContext, DUMMY_SP},
    ecma::ast::*,
};

use crate::config::ImportOrder;
use crate::references::CallSite;

// -----------------------------------------------------------------------------
// Edit set
// -----------------------------------------------------------------------------

/// An `import` statement scheduled for the top of the module.
#[derive(Debug, Clone)]
pub struct ModuleReference {
    pub path: String,
    /// `import * as <binding> from "<path>"` when set, `import "<path>"` otherwise.
    pub binding: Option<Ident>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclEdit {
    Remove,
    NullInit,
}

/// Pending changes to a module body, keyed by position in the original body.
///
/// Nothing touches the body until [`EditSet::apply`], which builds the output
/// list in one go.
#[derive(Debug, Default)]
pub struct EditSet {
    prepends: Vec<ModuleReference>,
    removed: HashSet<usize>,
    declarators: HashMap<usize, HashMap<usize, DeclEdit>>,
}

impl EditSet {
    pub fn prepend_module_reference(&mut self, path: impl Into<String>, binding: Option<Ident>) {
        self.prepends.push(ModuleReference {
            path: path.into(),
            binding,
        });
    }

    pub fn remove_item(&mut self, item: usize) {
        self.removed.insert(item);
    }

    pub fn remove_declarator(&mut self, item: usize, decl: usize) {
        self.declarators
            .entry(item)
            .or_default()
            .insert(decl, DeclEdit::Remove);
    }

    pub fn replace_with_null(&mut self, item: usize, decl: usize) {
        self.declarators
            .entry(item)
            .or_default()
            .insert(decl, DeclEdit::NullInit);
    }

    /// Drops whatever holds the call: the statement, or just its declarator.
    pub fn remove_site(&mut self, site: &CallSite) {
        match site {
            CallSite::Statement { item } => self.remove_item(*item),
            CallSite::Declarator { item, decl, .. } => self.remove_declarator(*item, *decl),
        }
    }

    pub fn is_item_removed(&self, item: usize) -> bool {
        self.removed.contains(&item)
    }

    pub fn is_declarator_removed(&self, item: usize, decl: usize) -> bool {
        self.is_item_removed(item)
            || self
                .declarators
                .get(&item)
                .and_then(|edits| edits.get(&decl))
                .is_some_and(|edit| *edit == DeclEdit::Remove)
    }

    pub fn prepended_bindings(&self) -> impl Iterator<Item = &str> + '_ {
        self.prepends
            .iter()
            .filter_map(|r| r.binding.as_ref().map(|b| b.sym.as_ref()))
    }

    pub fn prepends(&self) -> &[ModuleReference] {
        &self.prepends
    }

    pub fn is_empty(&self) -> bool {
        self.prepends.is_empty() && self.removed.is_empty() && self.declarators.is_empty()
    }

    /// Builds the new body: module references first, then every surviving
    /// original item in its original order.
    pub fn apply(self, body: Vec<ModuleItem>, order: ImportOrder) -> Vec<ModuleItem> {
        let EditSet {
            prepends,
            removed,
            mut declarators,
        } = self;

        let mut out = Vec::with_capacity(body.len() + prepends.len());
        let imports = prepends.into_iter().map(module_reference_item);
        match order {
            ImportOrder::Reverse => out.extend(imports.rev()),
            ImportOrder::Source => out.extend(imports),
        }

        for (idx, item) in body.into_iter().enumerate() {
            if removed.contains(&idx) {
                continue;
            }
            let Some(edits) = declarators.remove(&idx) else {
                out.push(item);
                continue;
            };
            match item {
                ModuleItem::Stmt(Stmt::Decl(Decl::Var(mut var))) => {
                    var.decls = std::mem::take(&mut var.decls)
                        .into_iter()
                        .enumerate()
                        .filter_map(|(i, mut d)| match edits.get(&i) {
                            Some(DeclEdit::Remove) => None,
                            Some(DeclEdit::NullInit) => {
                                d.init = Some(null_expr());
                                Some(d)
                            }
                            None => Some(d),
                        })
                        .collect();
                    if !var.decls.is_empty() {
                        out.push(ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))));
                    }
                }
                other => out.push(other),
            }
        }
        out
    }
}

// -----------------------------------------------------------------------------
// Node builders
// -----------------------------------------------------------------------------

fn module_reference_item(r: ModuleReference) -> ModuleItem {
    let specifiers = r
        .binding
        .map(|local| {
            ImportSpecifier::Namespace(ImportStarAsSpecifier {
                span: DUMMY_SP,
                local,
            })
        })
        .into_iter()
        .collect();

    ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
        span: DUMMY_SP,
        specifiers,
        src: Box::new(Str {
            span: DUMMY_SP,
            value: r.path.into(),
            raw: None,
        }),
        type_only: false,
        with: None,
        phase: ImportPhase::Evaluation,
    }))
}

fn null_expr() -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Null(Null { span: DUMMY_SP })))
}

pub(crate) fn synthetic_ident(name: &str, ctxt: SyntaxContext) -> Ident {
    Ident::new(name.into(), DUMMY_SP, ctxt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{normalize, parse, print};
    use pretty_assertions::assert_eq;

    fn run(src: &str, order: ImportOrder, edit: impl FnOnce(&mut EditSet)) -> String {
        let (cm, module) = parse(src);
        let mut edits = EditSet::default();
        edit(&mut edits);
        let body = edits.apply(module.body, order);
        print(
            cm,
            &Module {
                span: module.span,
                body,
                shebang: None,
            },
        )
    }

    #[test]
    fn empty_edit_set_is_identity() {
        let src = "import a from \"a\";\nconst x = 1;\nfoo();\n";
        let out = run(src, ImportOrder::Reverse, |_| {});
        assert_eq!(out, normalize(src));
    }

    #[test]
    fn removes_only_the_targeted_item() {
        let out = run("a();\nb();\nc();", ImportOrder::Reverse, |e| e.remove_item(1));
        assert_eq!(out, normalize("a();\nc();"));
    }

    #[test]
    fn declarator_edits_keep_siblings() {
        let out = run("const x = 1, y = f(), z = g();", ImportOrder::Reverse, |e| {
            e.remove_declarator(0, 1);
            e.replace_with_null(0, 2);
        });
        assert_eq!(out, normalize("const x = 1, z = null;"));
    }

    #[test]
    fn declaration_goes_away_with_its_last_declarator() {
        let out = run("const y = f();\nkeep();", ImportOrder::Reverse, |e| {
            e.remove_declarator(0, 0)
        });
        assert_eq!(out, normalize("keep();"));
    }

    #[test]
    fn reverse_order_puts_last_reference_first() {
        let out = run("main();", ImportOrder::Reverse, |e| {
            e.prepend_module_reference("./first.js", None);
            e.prepend_module_reference("./second.js", Some(synthetic_ident("second", SyntaxContext::empty())));
        });
        assert_eq!(
            out,
            normalize("import * as second from \"./second.js\";\nimport \"./first.js\";\nmain();")
        );
    }

    #[test]
    fn source_order_keeps_resolution_order() {
        let out = run("main();", ImportOrder::Source, |e| {
            e.prepend_module_reference("./first.js", None);
            e.prepend_module_reference("./second.js", None);
        });
        assert_eq!(
            out,
            normalize("import \"./first.js\";\nimport \"./second.js\";\nmain();")
        );
    }

    #[test]
    fn tracks_removed_positions_and_bindings() {
        let mut e = EditSet::default();
        assert!(e.is_empty());
        e.remove_item(3);
        e.remove_declarator(1, 0);
        e.replace_with_null(1, 1);
        e.prepend_module_reference("./a.js", Some(synthetic_ident("a", SyntaxContext::empty())));
        e.prepend_module_reference("./b.js", None);

        assert!(e.is_item_removed(3));
        assert!(e.is_declarator_removed(3, 7));
        assert!(e.is_declarator_removed(1, 0));
        assert!(!e.is_declarator_removed(1, 1));
        assert_eq!(e.prepended_bindings().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(e.prepends().len(), 2);
    }
}
