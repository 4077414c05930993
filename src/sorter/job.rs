// src/sorter/job.rs

//! Pending sub-ranges and resume offsets.

use super::Algorithm;

/// A pending index range.
///
/// Quicksort uses an inclusive `[start, end]` partition range. The single-pass
/// algorithms use `[start, end)` to remember the outer index to resume at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub start: usize,
    pub end: usize,
}

impl Job {
    pub fn new(start: usize, end: usize) -> Self {
        Job { start, end }
    }
}

/// LIFO stack of jobs. The most recently pushed range is processed first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQueue {
    jobs: Vec<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        JobQueue::default()
    }

    /// A queue holding just `job`.
    pub fn single(job: Job) -> Self {
        JobQueue { jobs: vec![job] }
    }

    pub fn push(&mut self, job: Job) {
        self.jobs.push(job);
    }

    pub fn pop(&mut self) -> Option<Job> {
        self.jobs.pop()
    }

    pub fn peek(&self) -> Option<&Job> {
        self.jobs.last()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    /// Drops every job for which `keep` returns `false`.
    pub fn retain<F: FnMut(&Job) -> bool>(&mut self, keep: F) {
        self.jobs.retain(keep);
    }

    /// Jobs from bottom to top of the stack.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }
}

/// Work left over from an earlier request, tagged with the algorithm that
/// produced it so that a different algorithm never misreads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWork {
    pub algorithm: Algorithm,
    pub jobs: JobQueue,
}

impl PendingWork {
    /// Wraps `jobs`, or returns `None` when there is nothing left to do.
    pub fn from_jobs(algorithm: Algorithm, jobs: JobQueue) -> Option<Self> {
        if jobs.is_empty() {
            None
        } else {
            Some(PendingWork { algorithm, jobs })
        }
    }

    /// The queue, if it belongs to `algorithm`.
    pub fn take_for(self, algorithm: Algorithm) -> Option<JobQueue> {
        if self.algorithm == algorithm {
            Some(self.jobs)
        } else {
            log::debug!(
                "PendingWork: discarding {} {:?} job(s) for a {:?} run",
                self.jobs.len(),
                self.algorithm,
                algorithm
            );
            None
        }
    }
}
