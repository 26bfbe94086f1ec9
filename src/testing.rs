//! Parse/print helpers shared by the unit tests.

use swc_core::{
    common::{sync::Lrc, FileName, Globals, Mark, SourceMap, GLOBALS},
    ecma::{
        ast::{EsVersion, Module},
        codegen::{text_writer::JsWriter, Config as CodegenConfig, Emitter},
        parser::{parse_file_as_module, EsSyntax, Syntax, TsSyntax},
        transforms::base::{hygiene::hygiene, resolver},
        visit::VisitMutWith,
    },
};

use crate::env::EnvSnapshot;
use crate::{transform_module, Config, PerEnvError};

pub(crate) fn parse(src: &str) -> (Lrc<SourceMap>, Module) {
    parse_with(src, "input.js", Syntax::Es(EsSyntax::default()))
}

pub(crate) fn parse_ts(src: &str) -> (Lrc<SourceMap>, Module) {
    parse_with(src, "input.ts", Syntax::Typescript(TsSyntax::default()))
}

fn parse_with(src: &str, name: &str, syntax: Syntax) -> (Lrc<SourceMap>, Module) {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Custom(name.into()).into(), src.to_string());
    let module = parse_file_as_module(&fm, syntax, EsVersion::latest(), None, &mut vec![])
        .expect("test source should parse");
    (cm, module)
}

/// Marks and hygiene data live in `GLOBALS`; the host sets it up for plugins.
pub(crate) fn with_globals<R>(f: impl FnOnce() -> R) -> R {
    GLOBALS.set(&Globals::new(), f)
}

pub(crate) fn print(cm: Lrc<SourceMap>, module: &Module) -> String {
    let mut buf = vec![];
    {
        let mut emitter = Emitter {
            cfg: CodegenConfig::default(),
            cm: cm.clone(),
            comments: None,
            wr: JsWriter::new(cm, "\n", &mut buf, None),
        };
        emitter.emit_module(module).expect("module should print");
    }
    String::from_utf8(buf).expect("codegen output is utf-8")
}

/// Runs `src` through parse/print so expectations share the printer's layout.
pub(crate) fn normalize(src: &str) -> String {
    let (cm, module) = parse(src);
    print(cm, &module)
}

pub(crate) fn snapshot(vars: &[(&str, &str)]) -> EnvSnapshot {
    vars.iter().map(|(k, v)| (*k, *v)).collect()
}

pub(crate) fn transform_with(
    src: &str,
    vars: &[(&str, &str)],
    config: &Config,
) -> Result<String, PerEnvError> {
    with_globals(|| {
        let (cm, mut module) = parse(src);
        transform_module(&mut module, config, &snapshot(vars), Mark::new())?;
        Ok(print(cm, &module))
    })
}

/// Runs the transform between `resolver` and `hygiene`, as a host build does.
pub(crate) fn transform_resolved(src: &str, vars: &[(&str, &str)]) -> Result<String, PerEnvError> {
    with_globals(|| {
        let (cm, mut module) = parse(src);
        let unresolved_mark = Mark::new();
        let top_level_mark = Mark::new();
        module.visit_mut_with(&mut resolver(unresolved_mark, top_level_mark, false));
        transform_module(&mut module, &Config::default(), &snapshot(vars), unresolved_mark)?;
        module.visit_mut_with(&mut hygiene());
        Ok(print(cm, &module))
    })
}

pub(crate) fn transform(src: &str, vars: &[(&str, &str)]) -> Result<String, PerEnvError> {
    transform_with(src, vars, &Config::default())
}
