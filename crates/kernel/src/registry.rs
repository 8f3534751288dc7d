use std::sync::Arc;

use anyhow::{bail, Context};

use crate::module::{InitCtx, Module, ModuleHealth};

/// Core modules run in this order; anything else core runs after them.
const CORE_MODULE_ORDER: &[&str] = &[
    "telemetry", // Logging must be up before anything reports
    "db",        // Storage before the modules that read it
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Core,
    Custom,
}

struct Registered {
    kind: ModuleKind,
    module: Arc<dyn Module>,
}

/// Owns every module and drives the init/start/stop lifecycle.
///
/// Core modules come first in [`CORE_MODULE_ORDER`], custom modules follow in
/// registration order. Shutdown walks the same sequence backwards.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Registered>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_core(&mut self, module: Arc<dyn Module>) -> anyhow::Result<()> {
        self.register(ModuleKind::Core, module)
    }

    pub fn register_custom(&mut self, module: Arc<dyn Module>) -> anyhow::Result<()> {
        self.register(ModuleKind::Custom, module)
    }

    fn register(&mut self, kind: ModuleKind, module: Arc<dyn Module>) -> anyhow::Result<()> {
        if self.get_module(module.name()).is_some() {
            bail!("module '{}' is already registered", module.name());
        }
        tracing::debug!(module = module.name(), ?kind, "module registered");
        self.modules.push(Registered { kind, module });
        Ok(())
    }

    /// All modules in lifecycle order.
    pub fn modules(&self) -> Vec<&Arc<dyn Module>> {
        let mut core: Vec<&Registered> = self
            .modules
            .iter()
            .filter(|entry| entry.kind == ModuleKind::Core)
            .collect();
        core.sort_by_key(|entry| core_rank(entry.module.name()));

        core.into_iter()
            .chain(
                self.modules
                    .iter()
                    .filter(|entry| entry.kind == ModuleKind::Custom),
            )
            .map(|entry| &entry.module)
            .collect()
    }

    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules
            .iter()
            .find(|entry| entry.module.name() == name)
            .map(|entry| &entry.module)
    }

    pub fn kind_of(&self, name: &str) -> Option<ModuleKind> {
        self.modules
            .iter()
            .find(|entry| entry.module.name() == name)
            .map(|entry| entry.kind)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub async fn init_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.modules() {
            tracing::info!(module = module.name(), "initializing module");
            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }
        Ok(())
    }

    pub async fn start_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.modules() {
            tracing::info!(module = module.name(), "starting module");
            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }
        Ok(())
    }

    /// Stops every module in reverse lifecycle order.
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        for module in self.modules().into_iter().rev() {
            tracing::info!(module = module.name(), "stopping module");
            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }
        Ok(())
    }

    /// Health of every module, in lifecycle order.
    pub async fn health(&self) -> Vec<(&'static str, ModuleHealth)> {
        let mut report = Vec::with_capacity(self.modules.len());
        for module in self.modules() {
            report.push((module.name(), module.health().await));
        }
        report
    }
}

fn core_rank(name: &str) -> usize {
    CORE_MODULE_ORDER
        .iter()
        .position(|core| *core == name)
        .unwrap_or(CORE_MODULE_ORDER.len())
}
