//! Batch orchestrator: sequences queries against the engine and assembles
//! the class model
//!
//! Retrieval is sized by the AST metrics of the inventory query. Small
//! projects are fetched with one aggregate query. Larger ones are fetched
//! class by class (smallest first), and classes too large to carry their
//! instructions inline get a deferred instruction pass after filtering.

use std::path::Path;
use std::time::Instant;

use cpgmodel_api::{
    ClassEntity, ExtractConfig, ExtractError, ExtractResult, FsSourceReader, QueryEngine,
    RunMetrics, SourceReader,
};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use crate::builder;
use crate::crossref;
use crate::filter;
use crate::queries;
use crate::tuples::{self, RawClass, RawInventoryEntry, RawMethodInstructions};

/// State of one run: the engine session, its metrics and the classes built so far
pub struct RunContext<E: QueryEngine> {
    pub engine: E,
    pub metrics: RunMetrics,
    pub classes: Vec<ClassEntity>,
}

impl<E: QueryEngine> RunContext<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            metrics: RunMetrics::default(),
            classes: Vec::new(),
        }
    }

    /// Issue one data query; a rejected query or blank output ends the run
    fn query(&mut self, text: &str) -> ExtractResult<String> {
        debug!("Query: {}", text);
        self.metrics.queries_issued += 1;
        let response = self.engine.execute(text)?;
        if !response.success {
            return Err(ExtractError::Query {
                query: text.to_string(),
                stderr: response.stderr,
            });
        }
        if !response.has_output() {
            return Err(ExtractError::EmptyResult {
                query: text.to_string(),
            });
        }
        Ok(response.stdout)
    }

    fn query_records<T: DeserializeOwned>(&mut self, text: &str) -> ExtractResult<T> {
        let stdout = self.query(text)?;
        tuples::decode(&stdout)
    }
}

/// A built class with what is still needed to finish it
struct Retrieved {
    class: ClassEntity,
    /// Full name as the engine knows it, before normalization
    engine_name: String,
    needs_instructions: bool,
}

impl AsRef<ClassEntity> for Retrieved {
    fn as_ref(&self) -> &ClassEntity {
        &self.class
    }
}

impl AsMut<ClassEntity> for Retrieved {
    fn as_mut(&mut self) -> &mut ClassEntity {
        &mut self.class
    }
}

pub struct Orchestrator<R: SourceReader = FsSourceReader> {
    config: ExtractConfig,
    reader: R,
}

impl Orchestrator<FsSourceReader> {
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            config,
            reader: FsSourceReader,
        }
    }
}

impl Default for Orchestrator<FsSourceReader> {
    fn default() -> Self {
        Self::new(ExtractConfig::default())
    }
}

impl<R: SourceReader> Orchestrator<R> {
    pub fn with_reader(config: ExtractConfig, reader: R) -> Self {
        Self { config, reader }
    }

    /// Import the project, extract every class, then release the project on
    /// the engine side.
    ///
    /// The cleanup request is sent whether or not extraction succeeded; its own
    /// failure is only logged.
    pub fn run<E: QueryEngine>(
        &self,
        ctx: &mut RunContext<E>,
        project_dir: &str,
        project_name: &str,
    ) -> ExtractResult<()> {
        let start = Instant::now();
        let result = self
            .import(ctx, project_dir, project_name)
            .and_then(|()| self.extract(ctx));
        self.cleanup(ctx, project_name);
        ctx.metrics.total_time = start.elapsed();

        if let Err(e) = &result {
            if let Some(stderr) = e.engine_stderr() {
                warn!("Engine stderr: {}", stderr);
            }
        }
        result
    }

    pub fn import<E: QueryEngine>(
        &self,
        ctx: &mut RunContext<E>,
        project_dir: &str,
        project_name: &str,
    ) -> ExtractResult<()> {
        info!("Importing {} as {}", project_dir, project_name);
        let text = queries::import_code(project_dir, project_name);
        ctx.metrics.queries_issued += 1;
        let response = ctx.engine.execute(&text)?;
        if !response.success {
            return Err(ExtractError::Import {
                path: project_dir.to_string(),
                stderr: response.stderr,
            });
        }
        Ok(())
    }

    /// Best-effort removal of the imported project
    pub fn cleanup<E: QueryEngine>(&self, ctx: &mut RunContext<E>, project_name: &str) {
        ctx.metrics.queries_issued += 1;
        let outcome = match ctx.engine.execute(&queries::delete_project(project_name)) {
            Ok(response) if response.success => Ok(()),
            Ok(response) => Err(ExtractError::Cleanup(response.stderr)),
            Err(e) => Err(ExtractError::Cleanup(e.to_string())),
        };
        match outcome {
            Ok(()) => debug!("Deleted project {}", project_name),
            Err(e) => warn!("{}", e),
        }
    }

    /// Extract the class model of an already imported project into `ctx.classes`
    pub fn extract<E: QueryEngine>(&self, ctx: &mut RunContext<E>) -> ExtractResult<()> {
        let phase = Instant::now();
        let inventory = self.inventory(ctx)?;
        ctx.metrics.inventory_time = phase.elapsed();
        if inventory.is_empty() {
            return Err(ExtractError::NoClasses);
        }

        let phase = Instant::now();
        let raw = self.retrieve(ctx, &inventory)?;
        let mut retrieved = Vec::with_capacity(raw.len());
        for (raw_class, needs_instructions) in raw {
            retrieved.push(self.build(&raw_class, needs_instructions)?);
        }
        ctx.metrics.classes_built = retrieved.len();

        ctx.metrics.classes_filtered = filter::remove_external_classes(&mut retrieved);
        ctx.metrics.retrieval_time = phase.elapsed();

        if retrieved.is_empty() {
            return Err(ExtractError::NoClasses);
        }

        let phase = Instant::now();
        for r in &mut retrieved {
            if r.needs_instructions {
                self.fetch_instructions(ctx, r)?;
            }
        }
        ctx.metrics.instruction_time = phase.elapsed();

        info!(
            "Extracted {} classes ({} filtered, {} deferred instruction queries)",
            retrieved.len(),
            ctx.metrics.classes_filtered,
            ctx.metrics.deferred_queries()
        );
        ctx.classes = retrieved.into_iter().map(|r| r.class).collect();
        Ok(())
    }

    /// Class inventory ordered by ascending AST size
    fn inventory<E: QueryEngine>(
        &self,
        ctx: &mut RunContext<E>,
    ) -> ExtractResult<Vec<RawInventoryEntry>> {
        let mut inventory: Vec<RawInventoryEntry> = ctx.query_records(&queries::inventory())?;
        inventory.sort_by_key(|entry| entry.ast_size);
        ctx.metrics.classes_inventoried = inventory.len();
        Ok(inventory)
    }

    fn retrieve<E: QueryEngine>(
        &self,
        ctx: &mut RunContext<E>,
        inventory: &[RawInventoryEntry],
    ) -> ExtractResult<Vec<(RawClass, bool)>> {
        let total_ast_size: usize = inventory.iter().map(|entry| entry.ast_size).sum();
        ctx.metrics.small_project = total_ast_size < self.config.small_project_ast_size;

        if ctx.metrics.small_project {
            info!(
                "Small project ({} classes, AST size {}), single query",
                inventory.len(),
                total_ast_size
            );
            let classes: Vec<RawClass> = ctx.query_records(&queries::all_classes())?;
            return Ok(classes.into_iter().map(|c| (c, false)).collect());
        }

        info!(
            "Large project ({} classes, AST size {}), querying per class",
            inventory.len(),
            total_ast_size
        );
        let mut retrieved = Vec::with_capacity(inventory.len());
        for entry in inventory {
            let inline = entry.ast_size < self.config.class_inline_ast_size
                && entry.method_ast_size < self.config.method_inline_ast_size;
            debug!(
                "{}: AST {} / methods {}, instructions {}",
                entry.full_name,
                entry.ast_size,
                entry.method_ast_size,
                if inline { "inline" } else { "deferred" }
            );
            let classes: Vec<RawClass> =
                ctx.query_records(&queries::class(&entry.full_name, inline))?;
            retrieved.extend(classes.into_iter().map(|c| (c, !inline)));
        }
        Ok(retrieved)
    }

    fn build(&self, raw: &RawClass, needs_instructions: bool) -> ExtractResult<Retrieved> {
        let mut class = builder::build_class(raw);
        let lines = self.reader.read_lines(Path::new(&class.file_path))?;
        crossref::apply(&mut class, &lines)?;
        Ok(Retrieved {
            class,
            engine_name: raw.full_name.clone(),
            needs_instructions,
        })
    }

    fn fetch_instructions<E: QueryEngine>(
        &self,
        ctx: &mut RunContext<E>,
        retrieved: &mut Retrieved,
    ) -> ExtractResult<()> {
        let class = &mut retrieved.class;
        let total_lines = class.total_method_lines();

        if total_lines < self.config.class_instruction_lines {
            debug!(
                "{}: {} method lines, one instruction query",
                retrieved.engine_name, total_lines
            );
            let methods: Vec<RawMethodInstructions> =
                ctx.query_records(&queries::class_instructions(&retrieved.engine_name))?;
            ctx.metrics.deferred_class_queries += 1;
            merge_instructions(class, &methods);
            return Ok(());
        }

        debug!(
            "{}: {} method lines, querying per method",
            retrieved.engine_name, total_lines
        );
        let mut order: Vec<usize> = (0..class.methods.len())
            .filter(|&i| class.methods[i].has_body() && class.methods[i].total_method_length > 0)
            .collect();
        order.sort_by_key(|&i| class.methods[i].total_method_length);

        for i in order {
            let line = class.methods[i].line_number_start;
            let methods: Vec<RawMethodInstructions> = ctx.query_records(
                &queries::method_instructions(&retrieved.engine_name, line),
            )?;
            ctx.metrics.deferred_method_queries += 1;
            merge_instructions(class, &methods);
        }
        Ok(())
    }
}

/// Attach deferred instructions to the methods starting on the same line.
///
/// Lambdas and static initializers can share a start line with a real method
/// and are skipped.
pub fn merge_instructions(class: &mut ClassEntity, results: &[RawMethodInstructions]) {
    for result in results {
        if builder::is_synthetic_method(&result.name) {
            continue;
        }
        let Some(line) = result.line_number.filter(|&line| line > 0) else {
            continue;
        };
        if let Some(method) = class
            .methods
            .iter_mut()
            .find(|m| m.line_number_start == line)
        {
            method.instructions = builder::build_instructions(&result.instructions);
        }
    }
}
