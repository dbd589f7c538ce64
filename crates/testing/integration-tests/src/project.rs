//! Multi-unit test projects
//!
//! A project is a directory of `.tn` units compiled in file-name order into
//! one namespace, with the expected outcome next to them:
//!
//! - `expected.lir`: printed LIR of every unit, all units must check cleanly
//! - `expected.diagnostics`: diagnostic codes, one per line, in report order
//!
//! An optional `tern.toml` holds the [`CompileOptions`] for every unit.

use crate::TestFixture;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tn_driver::CompileOptions;

/// Result of running a test project
#[derive(Debug)]
pub enum TestResult {
    /// Test passed successfully
    Pass,
    /// Test failed with a reason
    Fail { reason: String },
}

/// Expected outcome of a test project
#[derive(Debug, Clone)]
pub enum ExpectedResult {
    /// Every unit lowers and prints as this text
    Lir(String),
    /// Compilation reports exactly these diagnostic codes
    Diagnostics(Vec<String>),
}

/// A multi-unit test project
#[derive(Debug)]
pub struct TestProject {
    /// Name of the test project
    pub name: String,
    /// Units as (file name, source), compiled in order
    pub files: Vec<(String, String)>,
    /// Expected result from compiling the project
    pub expected: ExpectedResult,
    /// Options for every unit
    pub options: CompileOptions,
}

impl TestProject {
    /// Creates an empty project expecting no output
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            expected: ExpectedResult::Lir(String::new()),
            options: CompileOptions::default(),
        }
    }

    /// Add a unit, compiled after the ones already added
    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.files.push((name.into(), source.into()));
    }

    /// Expect this printed LIR
    pub fn expect_lir(&mut self, lir: impl Into<String>) {
        self.expected = ExpectedResult::Lir(lir.into());
    }

    /// Expect exactly these diagnostic codes
    pub fn expect_diagnostics(&mut self, codes: Vec<String>) {
        self.expected = ExpectedResult::Diagnostics(codes);
    }

    /// Loads a project directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or has no expectation
    pub fn load(dir: &Path) -> Result<Self> {
        let name = dir
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut project = Self::new(name);

        let options_path = dir.join("tern.toml");
        if options_path.exists() {
            project.options = CompileOptions::load(&options_path)?;
        }

        let mut units: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("failed to read project {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "tn"))
            .collect();
        units.sort();
        for path in units {
            let source = fs::read_to_string(&path)
                .with_context(|| format!("failed to read unit {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            project.add_file(file_name, source);
        }

        let lir_path = dir.join("expected.lir");
        let diagnostics_path = dir.join("expected.diagnostics");
        if lir_path.exists() {
            project.expect_lir(fs::read_to_string(&lir_path)?);
        } else if diagnostics_path.exists() {
            let codes = fs::read_to_string(&diagnostics_path)?
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToString::to_string)
                .collect();
            project.expect_diagnostics(codes);
        } else {
            bail!("project {} has no expected.lir or expected.diagnostics", dir.display());
        }
        Ok(project)
    }

    /// Compiles every unit and compares against the expectation
    #[must_use]
    pub fn run(&self) -> TestResult {
        let mut fixture = TestFixture::with_options(self.options.clone());
        for (file_name, source) in &self.files {
            fixture.options.file_name.clone_from(file_name);
            if let Err(error) = fixture.add_unit(source) {
                return TestResult::Fail {
                    reason: format!("{file_name} failed to compile:\n{error}"),
                };
            }
        }

        match &self.expected {
            ExpectedResult::Lir(expected) => {
                let mut rendered = String::new();
                for ((file_name, source), compilation) in self.files.iter().zip(&fixture.compilations) {
                    if !compilation.is_ok() {
                        let options = CompileOptions {
                            file_name: file_name.clone(),
                            ..self.options.clone()
                        };
                        rendered.push_str(&compilation.render_diagnostics(source, &options));
                    }
                }
                if !rendered.is_empty() {
                    return TestResult::Fail {
                        reason: format!("unexpected diagnostics:\n{rendered}"),
                    };
                }
                let actual = fixture.lir_text();
                if actual.trim() == expected.trim() {
                    TestResult::Pass
                } else {
                    TestResult::Fail {
                        reason: format!("LIR mismatch\n--- expected\n{expected}\n--- actual\n{actual}"),
                    }
                }
            }
            ExpectedResult::Diagnostics(expected) => {
                let actual = fixture.diagnostic_codes();
                if actual == *expected {
                    return TestResult::Pass;
                }
                let mut summaries = Vec::new();
                for ((file_name, source), compilation) in self.files.iter().zip(&fixture.compilations) {
                    let options = CompileOptions {
                        file_name: file_name.clone(),
                        ..self.options.clone()
                    };
                    summaries.extend(compilation.summaries(source, &options));
                }
                TestResult::Fail {
                    reason: format!(
                        "expected diagnostics {expected:?}, found {actual:?}\n{}",
                        summaries.join("\n")
                    ),
                }
            }
        }
    }
}

/// Every project directory under `root`, sorted by name
///
/// # Errors
///
/// Returns an error if `root` cannot be read
pub fn project_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(root)
        .with_context(|| format!("failed to read {}", root.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}
