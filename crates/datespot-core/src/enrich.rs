//! Enrichment service: fills in missing `reviewSummary` fields.
//!
//! # Behaviour
//!
//! - Records are visited in file order. Only records whose summary is absent
//!   or empty get a generation request; every other record is written back
//!   exactly as it was read, down to key order and number formatting. Fields
//!   the prompt does not use are never type-checked. Running the service on its own output is therefore a
//!   no-op, and an interrupted run resumes by feeding the output back in.
//! - Each record gets a single generation attempt. Any [`GenerationError`]
//!   is mapped to [`FALLBACK_SUMMARY`]; one failing call never aborts the pass.
//! - The full collection is written once at the end, and additionally every
//!   `checkpoint_every` new summaries when configured.
//!
//! # Example
//!
//! ```ignore
//! use datespot_core::{EnrichConfig, EnrichService, TracingReporter};
//!
//! let service = EnrichService::new(openai_client, EnrichConfig::default());
//! let stats = service.process_enrichment(&TracingReporter).await?;
//! println!("{} of {} summaries generated", stats.updated, stats.total);
//! ```

use tracing::warn;

use crate::collection::{read_collection, write_collection};
use crate::config::EnrichConfig;
use crate::error::{AppError, GenerationError};
use crate::models::PlaceDocument;
use crate::progress::{EnrichEvent, ProgressReporter};
use crate::traits::{GenerationRequest, SummaryGenerator};

/// Summary written when generation fails.
pub const FALLBACK_SUMMARY: &str = "데이트하기 좋은 분위기 있는 장소";

/// Phrase the model is told to use verbatim when it knows too little about a place.
pub const INSUFFICIENT_INFO_SUMMARY: &str = "연인과 함께하기 좋은 추천 데이트 명소";

/// System-role instruction sent with every request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Builds the user-role prompt for one place.
pub fn build_prompt(name: &str, category: &str, address: &str) -> String {
    format!(
        "너는 데이트 코스 추천 앱의 에디터야.
아래 장소에 대해 커플들이 데이트할 때 참고할만한 매력적인 한 줄 소개를 작성해줘.

[장소 정보]
- 이름: {name}
- 카테고리: {category}
- 주소: {address}

[조건]
1. 20자 내외로 짧고 임팩트 있게.
2. \"~하기 좋은 곳\", \"~한 분위기\" 처럼 명사형이나 자연스러운 말투로 끝내줘.
3. 정보가 부족해서 잘 모르겠으면 \"{INSUFFICIENT_INFO_SUMMARY}\"라고 써줘.
4. 한국어로 작성해줘."
    )
}

/// Strips surrounding whitespace and every double quote from generated text.
pub fn sanitize_summary(raw: &str) -> String {
    raw.trim().replace('"', "").trim().to_string()
}

/// Result of one summary request after the fallback policy was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The provider produced usable text (already sanitized).
    Generated(String),
    /// The provider failed; the fallback text applies.
    Fallback(GenerationError),
}

impl SummaryOutcome {
    /// Applies the fallback rule: any error, or text that is empty once
    /// sanitized, becomes [`SummaryOutcome::Fallback`].
    pub fn from_result(result: Result<String, GenerationError>) -> Self {
        match result {
            Ok(raw) => {
                let text = sanitize_summary(&raw);
                if text.is_empty() {
                    SummaryOutcome::Fallback(GenerationError::EmptyResponse)
                } else {
                    SummaryOutcome::Generated(text)
                }
            }
            Err(e) => SummaryOutcome::Fallback(e),
        }
    }

    /// The text to store in the record.
    pub fn into_text(self) -> String {
        match self {
            SummaryOutcome::Generated(text) => text,
            SummaryOutcome::Fallback(_) => FALLBACK_SUMMARY.to_string(),
        }
    }
}

/// Counters for one enrichment pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnrichStats {
    /// Records in the collection.
    pub total: usize,
    /// Records that received a summary in this pass (fallbacks included).
    pub updated: usize,
    /// Records that already had a summary.
    pub skipped: usize,
    /// Updated records that received the fallback text.
    pub fallbacks: usize,
}

/// Service that enriches a record collection with generated summaries.
///
/// Generic over the [`SummaryGenerator`] so tests can substitute a
/// deterministic provider.
pub struct EnrichService<G: SummaryGenerator> {
    generator: G,
    config: EnrichConfig,
}

impl<G: SummaryGenerator> EnrichService<G> {
    pub fn new(generator: G, config: EnrichConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &EnrichConfig {
        &self.config
    }

    /// Requests a summary for one place and applies the fallback policy.
    pub async fn summarize(&self, name: &str, category: &str, address: &str) -> SummaryOutcome {
        let generation = &self.config.generation;
        let request = GenerationRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: build_prompt(name, category, address),
            temperature: generation.temperature,
            max_tokens: generation.max_tokens,
        };

        let outcome = SummaryOutcome::from_result(self.generator.generate(&request).await);
        if let SummaryOutcome::Fallback(e) = &outcome {
            warn!(
                provider = self.generator.name(),
                place = name,
                error = %e,
                "Summary generation failed"
            );
        }
        outcome
    }

    /// Returns a summary for one place, or [`FALLBACK_SUMMARY`] if generation fails.
    pub async fn generate_summary(&self, name: &str, category: &str, address: &str) -> String {
        self.summarize(name, category, address).await.into_text()
    }

    /// Fills every missing summary in `records`, in order.
    ///
    /// `on_checkpoint` is called with the current state of the collection
    /// every `checkpoint_every` new summaries.
    pub async fn enrich<R, C>(
        &self,
        records: &mut [PlaceDocument],
        reporter: &R,
        mut on_checkpoint: C,
    ) -> Result<EnrichStats, AppError>
    where
        R: ProgressReporter,
        C: FnMut(&[PlaceDocument]) -> Result<(), AppError>,
    {
        let total = records.len();
        let mut stats = EnrichStats {
            total,
            ..Default::default()
        };

        for idx in 0..total {
            let index = idx + 1;
            let record = &records[idx];
            let name = record.name().into_owned();

            if !record.needs_summary() {
                reporter.enrich(EnrichEvent::Skipped {
                    index,
                    total,
                    name: &name,
                });
                stats.skipped += 1;
                continue;
            }

            reporter.enrich(EnrichEvent::Generating {
                index,
                total,
                name: &name,
            });
            let outcome = self
                .summarize(&name, &record.category(), &record.address())
                .await;

            match &outcome {
                SummaryOutcome::Generated(summary) => {
                    reporter.enrich(EnrichEvent::Generated {
                        index,
                        total,
                        name: &name,
                        summary,
                    });
                }
                SummaryOutcome::Fallback(error) => {
                    stats.fallbacks += 1;
                    reporter.enrich(EnrichEvent::FallbackUsed {
                        index,
                        total,
                        name: &name,
                        error,
                    });
                }
            }

            records[idx].set_review_summary(outcome.into_text());
            stats.updated += 1;

            if self
                .config
                .checkpoint_every
                .is_some_and(|every| every > 0 && stats.updated % every == 0)
            {
                on_checkpoint(&*records)?;
            }
        }

        Ok(stats)
    }

    /// Runs the full enrichment stage: read, enrich, write.
    ///
    /// # Errors
    ///
    /// - [`AppError::InputNotFound`] if the input file does not exist; nothing
    ///   is written in that case.
    /// - I/O and serialization errors while reading or writing collections.
    ///
    /// Generation failures are never returned.
    pub async fn process_enrichment<R: ProgressReporter>(
        &self,
        reporter: &R,
    ) -> Result<EnrichStats, AppError> {
        let input = &self.config.input;
        let output = &self.config.output;

        let mut records: Vec<PlaceDocument> = read_collection(input)?;
        reporter.enrich(EnrichEvent::Started {
            total: records.len(),
            input,
        });

        let stats = self
            .enrich(&mut records, reporter, |snapshot| {
                write_collection(output, snapshot)?;
                let updated = snapshot.iter().filter(|r| !r.needs_summary()).count();
                reporter.enrich(EnrichEvent::CheckpointWritten {
                    path: output,
                    updated,
                });
                Ok(())
            })
            .await?;

        write_collection(output, &records)?;
        reporter.enrich(EnrichEvent::Completed {
            stats: &stats,
            output,
        });

        Ok(stats)
    }
}
