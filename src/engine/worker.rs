use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Instant;

use crate::analysis::pipeline::{PipelineInput, build_renderable_series};

use super::messages::{JobRequest, JobResult, WorkerEvent};

pub fn spawn_worker_thread(rx: Receiver<JobRequest>, tx: Sender<WorkerEvent>) {
    thread::spawn(move || {
        while let Ok(mut req) = rx.recv() {
            // Only the newest queued request matters; older ones are superseded already
            while let Ok(newer) = rx.try_recv() {
                log::debug!(
                    "Worker skipping superseded job (gen {} -> {})",
                    req.generation,
                    newer.generation
                );
                req = newer;
            }

            let start = Instant::now();
            let generation = req.generation;

            // Pure function; stages are streamed back so the engine can expose them
            let series = build_renderable_series(
                PipelineInput {
                    history: &req.history,
                    selection: &req.selection,
                    timeframe: req.timeframe,
                    settings: req.settings,
                    generation,
                },
                |stage| {
                    let _ = tx.send(WorkerEvent::Stage { generation, stage });
                },
            );

            let result = JobResult {
                generation,
                duration_ms: start.elapsed().as_millis(),
                series: Arc::new(series),
            };

            // Receiver gone means the engine is shutting down
            if tx.send(WorkerEvent::Finished(result)).is_err() {
                break;
            }
        }
    });
}
