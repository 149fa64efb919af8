//! Pipeline runner: executes the stages in order.
//!
//! [`Pipeline::run`] threads a fresh [`PipelineContext`] through every
//! [`Stage`] and notifies a [`PipelineObserver`] at each boundary. The
//! pipeline itself only borrows the lexical resources, so one instance can
//! serve any number of threads.

use crate::nlp::lexicon::LexicalResources;
use crate::pipeline::context::{OccurrenceFlags, PipelineContext};
use crate::pipeline::observer::{PipelineObserver, StageClock, StageReport};
use crate::pipeline::stages::Stage;
use crate::types::Token;

// ---------------------------------------------------------------------------
// Conditional tracing support
// ---------------------------------------------------------------------------

/// Enter a tracing span for a pipeline stage (when the `tracing` feature is
/// enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_stage {
    ($name:expr) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("pipeline_stage", stage = $name).entered();
    };
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub tokens: Vec<Token>,
    /// Which conditional restores ran
    pub flags: OccurrenceFlags,
    /// Placeholders recorded across all tables
    pub masked: usize,
}

// ============================================================================
// Pipeline
// ============================================================================

/// The fixed stage sequence bound to a set of lexical resources.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'r> {
    resources: &'r LexicalResources,
}

impl<'r> Pipeline<'r> {
    pub fn new(resources: &'r LexicalResources) -> Self {
        Self { resources }
    }

    /// Run every stage of [`Stage::ALL`] over `text`.
    ///
    /// Pass [`NoopObserver`](crate::pipeline::observer::NoopObserver) when no
    /// instrumentation is wanted.
    pub fn run(&self, text: &str, observer: &mut impl PipelineObserver) -> PipelineOutput {
        let mut ctx = PipelineContext::new(text);

        for stage in Stage::ALL {
            let name = stage.name();
            trace_stage!(name);
            observer.on_stage_start(name);
            let clock = StageClock::start();

            stage.apply(&mut ctx, self.resources);

            let report = StageReport::new(clock.elapsed())
                .with_masked(ctx.tables.total())
                .with_flags(ctx.flags);
            observer.on_stage_end(name, &report);
            if stage != Stage::FinalSplit {
                observer.on_text(name, &ctx.text);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            tokens = ctx.tokens.len(),
            masked = ctx.tables.total(),
            "tokenized"
        );

        PipelineOutput {
            flags: ctx.flags,
            masked: ctx.tables.total(),
            tokens: ctx.into_tokens(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
