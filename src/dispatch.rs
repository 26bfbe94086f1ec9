use swc_core::common::Mark;
use swc_core::ecma::ast::Module;

use crate::env::EnvProvider;
use crate::error::{PerEnvError, Result};
use crate::mutator::EditSet;
use crate::references::CollectedReferences;
use crate::{map, single};

/// The calls `perenv.macro` exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroKind {
    /// `loadPerEnv(path | { path, identifier }, envar[, expected])`
    LoadPerEnv,
    /// `loadPerEnvMap({ key: path, ... }, envar[, nullable])`
    LoadPerEnvMap,
}

impl MacroKind {
    /// Resolution order: map lookups run before single-target loads.
    pub const ALL: [MacroKind; 2] = [MacroKind::LoadPerEnvMap, MacroKind::LoadPerEnv];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "loadPerEnv" => Some(MacroKind::LoadPerEnv),
            "loadPerEnvMap" => Some(MacroKind::LoadPerEnvMap),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MacroKind::LoadPerEnv => "loadPerEnv",
            MacroKind::LoadPerEnvMap => "loadPerEnvMap",
        }
    }
}

/// State shared by the resolvers during one pass over a module.
pub struct Pass<'a> {
    pub module: &'a Module,
    pub env: &'a dyn EnvProvider,
    /// The host resolver's mark for unresolved (top-level free) references.
    pub unresolved_mark: Mark,
    pub edits: EditSet,
}

/// Routes every collected reference to its resolver and returns the edits
/// to apply. Fails before resolving anything if a group has an unknown name.
pub fn dispatch(
    module: &Module,
    refs: &CollectedReferences,
    env: &dyn EnvProvider,
    unresolved_mark: Mark,
) -> Result<EditSet> {
    let mut kinds = Vec::with_capacity(refs.groups.len());
    for group in &refs.groups {
        match MacroKind::from_name(&group.imported) {
            Some(kind) => kinds.push((kind, group)),
            None => {
                return Err(PerEnvError::UnknownReference {
                    name: group.imported.clone(),
                    span: group.span,
                })
            }
        }
    }

    let mut pass = Pass {
        module,
        env,
        unresolved_mark,
        edits: EditSet::default(),
    };
    for idx in &refs.macro_imports {
        pass.edits.remove_item(*idx);
    }

    for kind in MacroKind::ALL {
        for (_, group) in kinds.iter().filter(|(k, _)| *k == kind) {
            for reference in &group.references {
                match kind {
                    MacroKind::LoadPerEnv => single::resolve(&mut pass, reference)?,
                    MacroKind::LoadPerEnvMap => map::resolve(&mut pass, reference)?,
                }
            }
        }
    }
    Ok(pass.edits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in MacroKind::ALL {
            assert_eq!(MacroKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(MacroKind::from_name("loadPerEnvs"), None);
        assert_eq!(MacroKind::from_name("default"), None);
    }
}
