//! Group rendering.
//!
//! Groups are rendered one at a time and batches within a group in order.
//! The final video's existence marks a group as done; a failed batch aborts
//! its group but never the remaining groups.

use std::path::PathBuf;

use tracing::Instrument;

use camstitch_media::Encoder;
use camstitch_models::ClipGroup;

use crate::error::{StitchError, StitchResult};
use crate::logging::GroupLogger;
use crate::planner::Planner;

/// What happened to one group.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The final video already existed; nothing ran
    Skipped { output: PathBuf },
    /// Every batch and the merge ran
    Rendered { output: PathBuf, batches: usize },
    /// No front/back pair to render
    NothingToRender,
}

/// Totals of a render loop.
#[derive(Debug, Default)]
pub struct RenderSummary {
    pub rendered: usize,
    pub skipped: usize,
    pub empty: usize,
    /// Failed group titles with their errors
    pub failed: Vec<(String, StitchError)>,
}

impl RenderSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Renders groups through an [`Encoder`].
pub struct Renderer<E> {
    encoder: E,
    planner: Planner,
}

impl<E: Encoder> Renderer<E> {
    pub fn new(encoder: E, planner: Planner) -> Self {
        Self { encoder, planner }
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Render one group unless its final video already exists.
    pub async fn render_group(&self, group: &mut ClipGroup) -> StitchResult<RenderOutcome> {
        let title = group.title();
        let logger = GroupLogger::new(&title);

        let final_output = self.planner.final_output(group);
        if tokio::fs::try_exists(&final_output).await? {
            logger.log_skip(&final_output);
            group.final_output = Some(final_output.clone());
            return Ok(RenderOutcome::Skipped {
                output: final_output,
            });
        }

        let plan = self.planner.plan(group);
        if plan.dropped_front > 0 || plan.dropped_back > 0 {
            logger.log_unpaired(plan.dropped_front, plan.dropped_back);
        }

        if plan.is_empty() {
            logger.log_warning("no front/back pairs to render");
            return Ok(RenderOutcome::NothingToRender);
        }

        async {
            logger.log_start(plan.pair_count(), plan.batches.len());

            for batch in &plan.batches {
                logger.log_batch(
                    batch.index,
                    plan.batches.len(),
                    batch.pairs.len(),
                    &batch.output,
                );
                self.encoder
                    .run(&batch.command)
                    .await
                    .map_err(|e| StitchError::group_failed(&title, e))?;
            }

            if let Some(merge) = &plan.merge {
                logger.log_merge(merge.input_count(), &plan.final_output);
                self.encoder
                    .run(merge)
                    .await
                    .map_err(|e| StitchError::group_failed(&title, e))?;
            }

            Ok::<_, StitchError>(())
        }
        .instrument(logger.create_span())
        .await?;

        logger.log_completion(&plan.final_output);
        group.final_output = Some(plan.final_output.clone());

        Ok(RenderOutcome::Rendered {
            output: plan.final_output,
            batches: plan.batches.len(),
        })
    }

    /// Render every group in order, calling `on_group` after each one.
    pub async fn render_all<F>(&self, groups: &mut [ClipGroup], mut on_group: F) -> RenderSummary
    where
        F: FnMut(&ClipGroup),
    {
        let mut summary = RenderSummary::default();

        for group in groups.iter_mut() {
            match self.render_group(group).await {
                Ok(RenderOutcome::Rendered { .. }) => summary.rendered += 1,
                Ok(RenderOutcome::Skipped { .. }) => summary.skipped += 1,
                Ok(RenderOutcome::NothingToRender) => summary.empty += 1,
                Err(e) => {
                    let title = group.title();
                    GroupLogger::new(&title).log_error(&e.to_string());
                    summary.failed.push((title, e));
                }
            }
            on_group(group);
        }

        summary
    }
}
