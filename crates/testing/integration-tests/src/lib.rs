//! Integration test utilities for the Tern front end

pub mod project;

use anyhow::Result;
use tn_driver::{Compilation, CompileOptions};
use tn_resolve::Namespace;

/// Test fixture compiling several units into one namespace
pub struct TestFixture {
    /// Shared namespace
    pub namespace: Namespace,
    /// Options for every unit
    pub options: CompileOptions,
    /// Compilations in the order the units were added
    pub compilations: Vec<Compilation>,
}

impl TestFixture {
    /// Creates a new fixture over a prelude namespace
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(CompileOptions::default())
    }

    /// Creates a fixture whose units all use `options`
    #[must_use]
    pub fn with_options(options: CompileOptions) -> Self {
        Self {
            namespace: options.namespace(),
            options,
            compilations: Vec::new(),
        }
    }

    /// Compiles one unit and keeps its result
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not parse or hits an internal fault
    pub fn add_unit(&mut self, source: &str) -> Result<&Compilation> {
        let compilation = tn_driver::compile_with(source, &mut self.namespace, &self.options)
            .map_err(|error| anyhow::anyhow!(error.render(source, &self.options)))?;
        self.compilations.push(compilation);
        Ok(&self.compilations[self.compilations.len() - 1])
    }

    /// Diagnostic codes of every unit, in report order
    pub fn diagnostic_codes(&self) -> Vec<&'static str> {
        self.compilations
            .iter()
            .flat_map(|compilation| &compilation.diagnostics)
            .map(|diagnostic| diagnostic.kind.code())
            .collect()
    }

    /// Printed LIR of every unit that lowered
    pub fn lir_text(&self) -> String {
        self.compilations
            .iter()
            .filter_map(|compilation| compilation.lir.as_ref())
            .map(ToString::to_string)
            .collect()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
