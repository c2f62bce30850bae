//! Fan-out of the work set across entries.
//!
//! Each entry opens its own structure, dispatches, and reports independently; one
//! entry's failure never aborts its siblings. Reports come back in work-set order.

use std::path::Path;

use smol_str::SmolStr;

use crate::engine::StructureEngine;
use crate::run::error::Error;
use crate::run::{EntryReport, Workflow};
use crate::spec::WorkSet;
use crate::utils::parallel::{IntoParallelRefIterator, ParallelIterator};

/// Drives every entry of a work set through a workflow.
pub trait Launcher {
    fn launch<E: StructureEngine>(
        &self,
        workflow: &Workflow<'_, E>,
        storage: &Path,
        work_set: &WorkSet,
    ) -> Vec<EntryReport>;
}

/// Parallel launcher with a bounded worker count.
///
/// Falls back to the shared global pool when a dedicated pool cannot be built, and to
/// serial iteration when the `parallel` feature is disabled.
#[derive(Debug, Clone, Copy)]
pub struct ThreadPool {
    workers: usize,
}

impl ThreadPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Launcher for ThreadPool {
    fn launch<E: StructureEngine>(
        &self,
        workflow: &Workflow<'_, E>,
        storage: &Path,
        work_set: &WorkSet,
    ) -> Vec<EntryReport> {
        #[cfg(feature = "parallel")]
        let reports = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
        {
            Ok(pool) => pool.install(|| fan_out(workflow, storage, work_set)),
            Err(_) => fan_out(workflow, storage, work_set),
        };
        #[cfg(not(feature = "parallel"))]
        let reports = fan_out(workflow, storage, work_set);

        workflow.finalize();
        reports
    }
}

/// Launcher that processes entries one at a time on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Serial;

impl Launcher for Serial {
    fn launch<E: StructureEngine>(
        &self,
        workflow: &Workflow<'_, E>,
        storage: &Path,
        work_set: &WorkSet,
    ) -> Vec<EntryReport> {
        let reports = work_set
            .iter()
            .map(|entry| run_entry(workflow, storage, entry))
            .collect();
        workflow.finalize();
        reports
    }
}

fn fan_out<E: StructureEngine>(
    workflow: &Workflow<'_, E>,
    storage: &Path,
    work_set: &WorkSet,
) -> Vec<EntryReport> {
    work_set
        .entries()
        .par_iter()
        .map(|entry| run_entry(workflow, storage, entry))
        .collect()
}

fn run_entry<E: StructureEngine>(
    workflow: &Workflow<'_, E>,
    storage: &Path,
    entry: &SmolStr,
) -> EntryReport {
    let result = workflow
        .engine()
        .open_entry(storage, entry)
        .map_err(|e| Error::dispatch(entry.as_str(), e))
        .and_then(|mut structure| workflow.dispatch(entry, &mut structure));
    EntryReport {
        entry: entry.clone(),
        result,
    }
}
