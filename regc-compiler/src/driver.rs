// Compilation driver: registry document in, metadata and source files out

use crate::codegen::write_source;
use crate::context::{CompileContext, RegistryConfig};
use crate::errors::{RegistryError, RegistryResult};
use crate::metadata::write_metadata;
use crate::scope_unit::ScopeUnit;
use anyhow::{Context, Result};
use regc_document::schema::default_schema_dir;
use regc_document::{read_registry_file, DocumentError, Node};
use regc_formatter::Config;
use std::fs;
use std::path::{Path, PathBuf};

/// One generated output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub contents: String,
}

/// Options for [`gen_registry`]
#[derive(Debug, Clone)]
pub struct GenOptions {
    /// Active dycore
    pub dycore: String,
    /// Comma-separated `key=value` configuration items
    pub config: String,
    pub output_dir: PathBuf,
    pub format: Config,
    /// Directories searched for registry schemas before the default one
    pub schema_paths: Vec<PathBuf>,
    /// Treat a failed schema validation as an error instead of returning 1
    pub error_on_no_validate: bool,
}

impl GenOptions {
    pub fn new(dycore: &str, config: &str, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            dycore: dycore.to_lowercase(),
            config: config.to_string(),
            output_dir: output_dir.into(),
            format: Config::default(),
            schema_paths: Vec::new(),
            error_on_no_validate: false,
        }
    }
}

/// Compiles the `file` sections of a registry in document order against
/// one shared context
#[derive(Debug)]
pub struct CompilationDriver {
    context: CompileContext,
    units: Vec<ScopeUnit>,
}

impl CompilationDriver {
    pub fn new(dycore: &str, config: RegistryConfig) -> Self {
        Self {
            context: CompileContext::new(dycore, config),
            units: Vec::new(),
        }
    }

    /// Compile every section of `root`
    pub fn compile(&mut self, root: &Node) -> RegistryResult<()> {
        for section in &root.children {
            log::info!(
                "Parsing {}, {}, from registry",
                section.tag,
                section.get_or("name", "")
            );
            if section.tag != "file" {
                return Err(RegistryError::UnknownSection {
                    tag: section.tag.clone(),
                });
            }
            let unit = ScopeUnit::from_node(section, &mut self.context)?;
            self.units.push(unit);
        }
        Ok(())
    }

    pub fn units(&self) -> &[ScopeUnit] {
        &self.units
    }

    pub fn context(&self) -> &CompileContext {
        &self.context
    }

    /// Render `.meta` and `.F90` files for every compiled unit
    pub fn generate(&mut self, format: &Config) -> RegistryResult<Vec<GeneratedFile>> {
        let mut files = Vec::new();
        for unit in &self.units {
            files.push(GeneratedFile {
                file_name: format!("{}.meta", unit.name()),
                contents: write_metadata(unit, &self.context.catalog)?,
            });
            files.push(GeneratedFile {
                file_name: format!("{}.F90", unit.name()),
                contents: write_source(unit, &mut self.context, format)?,
            });
        }
        Ok(files)
    }
}

/// Compile `root` and write its files to `output_dir`. Nothing is written
/// unless every section compiles.
pub fn write_registry_files(
    root: &Node,
    options: &GenOptions,
) -> Result<Vec<PathBuf>> {
    let config = RegistryConfig::parse(&options.config);
    for (key, value) in config.items() {
        log::debug!("Registry configuration item {} = {}", key, value);
    }

    let mut driver = CompilationDriver::new(&options.dycore, config);
    driver.compile(root)?;
    let files = driver.generate(&options.format)?;

    fs::create_dir_all(&options.output_dir).with_context(|| {
        format!("Failed to create output directory {}", options.output_dir.display())
    })?;

    let mut written = Vec::new();
    for file in files {
        let path = options.output_dir.join(&file.file_name);
        log::info!("Writing registry file, {}", path.display());
        fs::write(&path, &file.contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Read, validate and compile a registry file.
///
/// Returns 0 on success and 1 when the document fails schema validation,
/// unless `error_on_no_validate` is set.
pub fn gen_registry(registry_file: &Path, options: &GenOptions) -> Result<i32> {
    log::info!("Reading registry from {}", registry_file.display());
    let document = read_registry_file(registry_file)?;

    let mut schema_dirs = options.schema_paths.clone();
    schema_dirs.extend(default_schema_dir(registry_file));
    let report = document.validate(&schema_dirs)?;

    if !report.valid {
        if options.error_on_no_validate {
            return Err(DocumentError::Invalid {
                path: registry_file.to_path_buf(),
                messages: report.messages,
            }
            .into());
        }
        log::error!(
            "Invalid registry file, {}\n{}",
            registry_file.display(),
            report.messages.join("\n")
        );
        return Ok(1);
    }

    log::debug!("Parsing registry, {}", document.name().unwrap_or_default());
    write_registry_files(&document.root, options)?;
    Ok(0)
}
