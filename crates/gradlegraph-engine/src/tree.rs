//! Per-file orchestration
//!
//! Folds the lines of one report into the graph: classify, strip the
//! resolution marker, measure depth, parse the coordinate, reconcile the
//! ancestry stack, then upsert the artifact and its edge. The whole file is
//! one store transaction; the first fatal error rolls it back.

use crate::builder::{GraphModelBuilder, Observation};
use crate::error::{LineOutcome, LoadError, ParseFailure, SkipReason};
use gradlegraph_core::{ConfigurationKind, FileStats, NodeId, ResolutionSettings, TypeMapping};
use gradlegraph_parse::{
    classify, configuration_kind, measure, parse_coordinate, root_project_name, GrammarIssue,
    LevelError, LevelStack, LineKind, ParseError, ParseMode, Resolution, ResolutionClassifier,
};
use gradlegraph_store::GraphStore;

/// Line counters for one parsed file
pub type ParseStats = FileStats;

/// State carried from one line of a file to the next
#[derive(Debug, Clone)]
pub struct FileContext {
    configuration: ConfigurationKind,
    project: Option<String>,
    stack: LevelStack<NodeId>,
}

impl Default for FileContext {
    fn default() -> Self {
        Self {
            configuration: ConfigurationKind::Unknown,
            project: None,
            stack: LevelStack::new(),
        }
    }
}

impl FileContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration of the section being read
    pub fn configuration(&self) -> ConfigurationKind {
        self.configuration
    }

    /// Name of the most recently declared root project
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Node ids from the root project down to the latest artifact
    pub fn ancestry(&self) -> &[NodeId] {
        self.stack.path()
    }

    pub fn mode(&self) -> ParseMode {
        ParseMode::from_state(self.project.is_some(), self.configuration)
    }

    fn start_project(&mut self, name: &str, root: NodeId) {
        self.project = Some(name.to_string());
        self.stack.reset(root);
    }
}

/// Why a line classified as ignorable was dropped
fn skip_reason(line: &str, mode: ParseMode) -> SkipReason {
    if classify(line, ParseMode::ReadingTree) != LineKind::TreeLine {
        return SkipReason::Ignored;
    }

    match mode {
        ParseMode::BeforeRoot => SkipReason::BeforeRoot,
        ParseMode::AwaitingConfiguration => SkipReason::UnknownConfiguration,
        ParseMode::ReadingTree => SkipReason::Ignored,
    }
}

fn tally(stats: &mut ParseStats, outcome: &LineOutcome) {
    match outcome {
        LineOutcome::Applied { .. } => stats.tree_lines += 1,
        LineOutcome::RootDeclared => stats.roots += 1,
        LineOutcome::Skipped(SkipReason::Ignored) | LineOutcome::ConfigurationSelected(_) => {}
        LineOutcome::Skipped(_) => stats.skipped_lines += 1,
    }
}

/// Parses dependency reports into a graph store
#[derive(Debug, Clone, Default)]
pub struct TreeParser {
    builder: GraphModelBuilder,
    classifier: ResolutionClassifier,
}

impl TreeParser {
    pub fn new(builder: GraphModelBuilder, resolution: ResolutionSettings) -> Self {
        Self {
            builder,
            classifier: ResolutionClassifier::new(resolution),
        }
    }

    /// Parser with the given mapping table and resolution settings
    pub fn with_mapping(mapping: TypeMapping, resolution: ResolutionSettings) -> Self {
        Self::new(GraphModelBuilder::new(mapping), resolution)
    }

    pub fn builder(&self) -> &GraphModelBuilder {
        &self.builder
    }

    pub fn resolution(&self) -> &ResolutionSettings {
        self.classifier.settings()
    }

    /// Parse one report inside a single transaction
    ///
    /// Commits when every line is processed. On the first fatal error the
    /// transaction is rolled back and nothing from this file remains.
    pub fn parse_lines<S, I, L>(
        &self,
        store: &mut S,
        source_name: &str,
        lines: I,
    ) -> Result<ParseStats, ParseFailure>
    where
        S: GraphStore + ?Sized,
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut stats = ParseStats::default();
        store
            .begin_transaction()
            .map_err(|e| ParseFailure::new(stats, None, e.into()))?;

        tracing::debug!(file = source_name, store = store.name(), "parsing report");

        let mut context = FileContext::new();
        for (index, line) in lines.into_iter().enumerate() {
            let number = index + 1;
            stats.lines += 1;

            match self.process_line(store, &mut context, number, line.as_ref()) {
                Ok(outcome) => tally(&mut stats, &outcome),
                Err(error) => {
                    if let Err(rollback) = store.rollback() {
                        tracing::error!(file = source_name, error = %rollback, "rollback failed");
                    }
                    tracing::debug!(file = source_name, line = number, error = %error, "rolled back");
                    return Err(ParseFailure::new(stats, Some(number), error));
                }
            }
        }

        if let Err(error) = store.commit() {
            if let Err(rollback) = store.rollback() {
                tracing::error!(file = source_name, error = %rollback, "rollback failed");
            }
            tracing::debug!(file = source_name, error = %error, "commit failed, rolled back");
            return Err(ParseFailure::new(stats, None, error.into()));
        }

        tracing::debug!(
            file = source_name,
            tree_lines = stats.tree_lines,
            skipped = stats.skipped_lines,
            "committed report"
        );
        Ok(stats)
    }

    /// Parse report text; see [`TreeParser::parse_lines`]
    pub fn parse_str<S: GraphStore + ?Sized>(
        &self,
        store: &mut S,
        source_name: &str,
        text: &str,
    ) -> Result<ParseStats, ParseFailure> {
        self.parse_lines(store, source_name, text.lines())
    }

    /// Process a single line against `context`
    ///
    /// Does not manage transactions; callers wrapping several lines must roll
    /// back themselves on `Err`.
    pub fn process_line<S: GraphStore + ?Sized>(
        &self,
        store: &mut S,
        context: &mut FileContext,
        number: usize,
        line: &str,
    ) -> Result<LineOutcome, LoadError> {
        let mode = context.mode();

        match classify(line, mode) {
            LineKind::RootDeclaration => {
                let name = root_project_name(line).ok_or_else(|| ParseError::Grammar {
                    line: number,
                    text: line.trim_end().to_string(),
                    issue: GrammarIssue::RootName,
                })?;
                let project = self.builder.promote_or_create_project(store, name)?;
                context.start_project(name, project.id);
                Ok(LineOutcome::RootDeclared)
            }
            LineKind::ConfigurationHeader => {
                let kind = configuration_kind(line);
                context.configuration = kind;
                Ok(LineOutcome::ConfigurationSelected(kind))
            }
            LineKind::Ignore => Ok(LineOutcome::Skipped(skip_reason(line, mode))),
            LineKind::TreeLine => self.apply_tree_line(store, context, number, line),
        }
    }

    fn apply_tree_line<S: GraphStore + ?Sized>(
        &self,
        store: &mut S,
        context: &mut FileContext,
        number: usize,
        line: &str,
    ) -> Result<LineOutcome, LoadError> {
        let (resolution, text) = match self.classifier.classify(line) {
            Resolution::Skipped(kind) => {
                return Ok(LineOutcome::Skipped(SkipReason::DisabledResolution(kind)))
            }
            Resolution::Keep { kind, text } => (kind, text),
        };

        let indented = measure(text).ok_or_else(|| ParseError::MalformedIndentation {
            line: number,
            text: line.trim_end().to_string(),
        })?;

        let coordinate = parse_coordinate(indented.coordinate).map_err(|issue| ParseError::Grammar {
            line: number,
            text: line.trim_end().to_string(),
            issue,
        })?;

        let dependant = *context.stack.reconcile(indented.depth).map_err(|err| match err {
            LevelError::EmptyStack => ParseError::MissingRoot { line: number },
            LevelError::DepthSkipped { depth, open } => ParseError::DepthSkipped {
                line: number,
                depth,
                open,
            },
        })?;

        let dependee = self
            .builder
            .resolve_artifact(store, &coordinate.group_id, &coordinate.artifact_id)?;

        let observation = Observation {
            configuration: context.configuration,
            resolution,
            source: context.project.as_deref().unwrap_or_default(),
        };
        self.builder.resolve_edge(
            store,
            dependant,
            dependee.id,
            coordinate.specified_version.as_deref(),
            coordinate.resolved_version.as_deref(),
            &observation,
        )?;

        context.stack.push(dependee.id);
        Ok(LineOutcome::Applied {
            depth: indented.depth,
        })
    }
}
