use swc_core::{
    common::{errors::HANDLER, Mark},
    ecma::{
        ast::*,
        visit::{VisitMut, VisitMutWith},
    },
    plugin::{plugin_transform, proxies::TransformPluginProgramMetadata},
};

pub mod bindings;
pub mod config;
pub mod dispatch;
pub mod env;
pub mod error;
mod literals;
pub mod map;
pub mod mutator;
pub mod references;
pub mod single;

#[cfg(test)]
mod testing;

pub use config::{Config, ImportOrder};
pub use env::{EnvCondition, EnvProvider, EnvSnapshot, Layered, ProcessEnv};
pub use error::PerEnvError;

// -----------------------------------------------------------------------------
// Transform
// -----------------------------------------------------------------------------

/// Expands every `perenv.macro` call in `module`.
///
/// `unresolved_mark` is the mark the host resolver gave unresolved
/// references; namespace imports named by the caller are bound in its context.
///
/// The module is only rewritten when every call resolves; on error it is left
/// as it was.
pub fn transform_module(
    module: &mut Module,
    config: &Config,
    env: &dyn EnvProvider,
    unresolved_mark: Mark,
) -> Result<(), PerEnvError> {
    let refs = references::collect(module)?;
    if refs.is_empty() {
        return Ok(());
    }
    let edits = dispatch::dispatch(module, &refs, env, unresolved_mark)?;
    let body = std::mem::take(&mut module.body);
    module.body = edits.apply(body, config.import_order);
    Ok(())
}

pub struct PerEnvTransform {
    config: Config,
    env: Box<dyn EnvProvider>,
    unresolved_mark: Mark,
}

impl PerEnvTransform {
    pub fn new(config: Config, unresolved_mark: Mark) -> Self {
        let env = config.env_provider();
        Self::with_env(config, env, unresolved_mark)
    }

    pub fn with_env(config: Config, env: Box<dyn EnvProvider>, unresolved_mark: Mark) -> Self {
        Self {
            config,
            env,
            unresolved_mark,
        }
    }
}

impl VisitMut for PerEnvTransform {
    // Macro imports only exist at module top level; nothing to do below it.
    fn visit_mut_module(&mut self, m: &mut Module) {
        if let Err(err) = transform_module(m, &self.config, self.env.as_ref(), self.unresolved_mark) {
            HANDLER.with(|handler| {
                handler
                    .struct_span_err(err.span(), &err.to_string())
                    .emit()
            });
        }
    }

    fn visit_mut_script(&mut self, _: &mut Script) {}
}

// -----------------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------------

#[plugin_transform]
pub fn process_transform(mut program: Program, metadata: TransformPluginProgramMetadata) -> Program {
    let config = metadata
        .get_transform_plugin_config()
        .map(|raw| Config::from_json(&raw))
        .unwrap_or_default();

    let mut transform = PerEnvTransform::new(config, metadata.unresolved_mark);
    program.visit_mut_with(&mut transform);
    program
}
