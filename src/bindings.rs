use std::collections::HashSet;

use swc_core::ecma::{ast::*, utils::find_pat_ids};

use crate::mutator::EditSet;

/// Names bound at the top level of `module` once `edits` are applied:
/// import locals (including TypeScript `import x = ...`), variable patterns,
/// function, class, enum and namespace names, and the namespace imports
/// `edits` is about to prepend.
pub fn top_level_bindings(module: &Module, edits: &EditSet) -> HashSet<String> {
    let mut names: HashSet<String> = edits.prepended_bindings().map(str::to_string).collect();

    for (idx, item) in module.body.iter().enumerate() {
        if edits.is_item_removed(idx) {
            continue;
        }
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                names.extend(import.specifiers.iter().map(|s| match s {
                    ImportSpecifier::Named(n) => n.local.sym.to_string(),
                    ImportSpecifier::Default(d) => d.local.sym.to_string(),
                    ImportSpecifier::Namespace(ns) => ns.local.sym.to_string(),
                }));
            }
            ModuleItem::ModuleDecl(ModuleDecl::TsImportEquals(import)) => {
                names.insert(import.id.sym.to_string());
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                decl_bindings(idx, &export.decl, edits, &mut names);
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                let ident = match &export.decl {
                    DefaultDecl::Fn(f) => f.ident.as_ref(),
                    DefaultDecl::Class(c) => c.ident.as_ref(),
                    _ => None,
                };
                names.extend(ident.map(|i| i.sym.to_string()));
            }
            ModuleItem::Stmt(Stmt::Decl(decl)) => decl_bindings(idx, decl, edits, &mut names),
            _ => {}
        }
    }
    names
}

fn decl_bindings(idx: usize, decl: &Decl, edits: &EditSet, names: &mut HashSet<String>) {
    match decl {
        Decl::Var(var) => {
            for (i, d) in var.decls.iter().enumerate() {
                if edits.is_declarator_removed(idx, i) {
                    continue;
                }
                let ids: Vec<Id> = find_pat_ids(&d.name);
                names.extend(ids.into_iter().map(|(sym, _)| sym.to_string()));
            }
        }
        Decl::Fn(f) => {
            names.insert(f.ident.sym.to_string());
        }
        Decl::Class(c) => {
            names.insert(c.ident.sym.to_string());
        }
        Decl::TsEnum(e) => {
            names.insert(e.id.sym.to_string());
        }
        Decl::TsModule(m) => {
            if let TsModuleName::Ident(id) = &m.id {
                names.insert(id.sym.to_string());
            }
        }
        _ => {}
    }
}
