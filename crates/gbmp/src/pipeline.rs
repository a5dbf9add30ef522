//! # Staged Pipeline
//!
//! Explicit state machine over the three load stages:
//!
//! ```text
//! Parsing ──► Decompressing ──► Building ──► Done
//!  (chunk)      (grid row)       (batch)
//! ```
//!
//! Every call to `next` does one unit of work and returns one event. The
//! caller cancels by dropping the pipeline; nothing runs in the background.
//! After an error or [`LoadEvent::Finished`] the pipeline yields `None`.

use std::iter::FusedIterator;

use gbmp_map::{ColumnDecoder, MapAttributes, MapGrid, MapParser, MAP_SIZE};
use gbmp_mesh::{BatchWriter, GeometryBatch};

use crate::config::LoaderConfig;
use crate::error::LoadResult;
use crate::progress::{LoadEvent, LoadSummary, Progress, Stage};

#[derive(Debug)]
enum State<'a> {
    Parsing {
        parser: MapParser<'a>,
        started: bool,
    },
    Decompressing {
        attributes: MapAttributes,
        decoder: ColumnDecoder,
        grid: MapGrid,
        next_row: usize,
    },
    Building {
        grid: MapGrid,
        next_batch: usize,
    },
    Done,
}

impl State<'_> {
    const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Parsing { .. } => Some(Stage::Parsing),
            Self::Decompressing { .. } => Some(Stage::Decompressing),
            Self::Building { .. } => Some(Stage::Building),
            Self::Done => None,
        }
    }
}

/// Cooperative map loader.
///
/// ```rust,ignore
/// for event in StagedPipeline::new(&bytes, &LoaderConfig::default())? {
///     match event? {
///         LoadEvent::Progress(p) => ui.report(&p),
///         LoadEvent::Batch { batch, .. } => models.push(upload(batch)),
///         LoadEvent::Finished(summary) => log(summary),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct StagedPipeline<'a> {
    state: State<'a>,
    writer: BatchWriter,
    summary: LoadSummary,
}

impl<'a> StagedPipeline<'a> {
    /// Validates the configuration and opens the container.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidConfig`](crate::LoadError::InvalidConfig)
    /// for a bad configuration and a map error if the container magic
    /// doesn't match.
    pub fn new(data: &'a [u8], config: &LoaderConfig) -> LoadResult<Self> {
        config.validate()?;
        let magic = config.container.magic_bytes()?;
        let parser = MapParser::new(data, magic, config.container.size_hint)?;

        Ok(Self {
            state: State::Parsing {
                parser,
                started: false,
            },
            writer: BatchWriter::new(config.atlas, &config.geometry),
            summary: LoadSummary::default(),
        })
    }

    /// Stage currently running, `None` once done.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        self.state.stage()
    }

    /// Number of geometry batches the building stage will emit.
    #[must_use]
    pub const fn batch_total(&self) -> usize {
        self.writer.batch_count()
    }

    fn step(&mut self) -> LoadResult<Option<LoadEvent>> {
        let batch_total = self.writer.batch_count();
        // Stays `Done` if this step fails.
        let state = std::mem::replace(&mut self.state, State::Done);

        let (next, progress) = match state {
            State::Done => return Ok(None),

            State::Parsing {
                parser,
                started: false,
            } => {
                let total = parser.total_len();
                (
                    State::Parsing {
                        parser,
                        started: true,
                    },
                    Progress::parsing(0, total),
                )
            }

            State::Parsing { mut parser, .. } => match parser.next() {
                Some(step) => {
                    let consumed = step?.consumed;
                    let total = parser.total_len();
                    (
                        State::Parsing {
                            parser,
                            started: true,
                        },
                        Progress::parsing(consumed, total),
                    )
                }
                None => {
                    let chunks = parser.loader().directory().len();
                    let attributes = parser.finish()?;
                    self.summary.chunks = chunks;
                    tracing::info!(chunks, "parsing done");
                    (
                        State::Decompressing {
                            attributes,
                            decoder: ColumnDecoder::new()?,
                            grid: MapGrid::new(),
                            next_row: 0,
                        },
                        Progress::decompressing(0, MAP_SIZE),
                    )
                }
            },

            State::Decompressing { grid, next_row, .. } if next_row >= MAP_SIZE => {
                tracing::info!(blocks = grid.block_count(), "decompression done");
                (
                    State::Building {
                        grid,
                        next_batch: 0,
                    },
                    Progress::building(0, batch_total),
                )
            }

            State::Decompressing {
                attributes,
                decoder,
                mut grid,
                next_row,
            } => {
                grid.set_row(decoder.row(&attributes, next_row)?);
                (
                    State::Decompressing {
                        attributes,
                        decoder,
                        grid,
                        next_row: next_row + 1,
                    },
                    Progress::decompressing(next_row + 1, MAP_SIZE),
                )
            }

            State::Building { next_batch, .. } if next_batch >= batch_total => {
                tracing::info!(
                    batches = self.summary.batches,
                    vertices = self.summary.vertices,
                    "building done"
                );
                return Ok(Some(LoadEvent::Finished(self.summary)));
            }

            State::Building { grid, next_batch } => {
                let (tile_x, tile_y) = self.writer.tile_of(next_batch);
                let batch = self.writer.build(&grid, tile_x, tile_y);
                self.record(&batch);
                self.state = State::Building {
                    grid,
                    next_batch: next_batch + 1,
                };
                return Ok(Some(LoadEvent::Batch {
                    batch,
                    progress: Progress::building(next_batch + 1, batch_total),
                }));
            }
        };

        self.state = next;
        Ok(Some(LoadEvent::Progress(progress)))
    }

    fn record(&mut self, batch: &GeometryBatch) {
        self.summary.batches += 1;
        self.summary.vertices += batch.vertex_count();
        if !batch.is_empty() {
            self.summary.non_empty_batches += 1;
        }
    }

    /// Runs to completion, collecting every batch.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage.
    pub fn run(self) -> LoadResult<(Vec<GeometryBatch>, LoadSummary)> {
        let mut batches = Vec::new();
        let mut summary = LoadSummary::default();
        for event in self {
            match event? {
                LoadEvent::Batch { batch, .. } => batches.push(batch),
                LoadEvent::Finished(done) => summary = done,
                LoadEvent::Progress(_) => {}
            }
        }
        Ok((batches, summary))
    }
}

impl Iterator for StagedPipeline<'_> {
    type Item = LoadResult<LoadEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        let stage = self.state.stage();
        match self.step() {
            Ok(event) => event.map(Ok),
            Err(err) => {
                tracing::warn!(error = %err, ?stage, "load aborted");
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for StagedPipeline<'_> {}

/// Loads a map in one call.
///
/// # Errors
///
/// See [`StagedPipeline::new`] and [`StagedPipeline::run`].
pub fn load_map(
    data: &[u8],
    config: &LoaderConfig,
) -> LoadResult<(Vec<GeometryBatch>, LoadSummary)> {
    StagedPipeline::new(data, config)?.run()
}
