// src/batch/pool.rs
use crate::error::Result;
use crate::reader::{ReadOptions, TdmsFile};
use crossbeam_channel::unbounded;
use log::{debug, warn};
use parking_lot::Mutex;
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;

/// Settings for decoding many files at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Number of worker threads, at least 1.
    pub workers: usize,
    /// Options every worker decodes its files with.
    pub read: ReadOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            workers: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            read: ReadOptions::default(),
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn read_options(mut self, read: ReadOptions) -> Self {
        self.read = read;
        self
    }
}

/// Outcome for one input file.
#[derive(Debug)]
pub struct FileReport<T> {
    pub path: PathBuf,
    pub result: Result<T>,
}

impl<T> FileReport<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Decode every file and keep the decoded model. Reports follow the order
/// of `paths`; a failing file does not stop the others.
pub fn decode_files<P: AsRef<Path>>(
    paths: &[P],
    options: &BatchOptions,
) -> Vec<FileReport<TdmsFile<BufReader<File>>>> {
    decode_files_with(paths, options, |_, file| Ok(file))
}

/// Decode every file on a pool of `options.workers` threads and pass each
/// decoded file to `handler`, which turns it into the reported value.
///
/// ```rust,no_run
/// use tdms_decoder::batch::{decode_files_with, BatchOptions};
///
/// let paths = ["Event20240101.tdms", "Event20240102.tdms"];
/// let counts = decode_files_with(&paths, &BatchOptions::default(), |_, file| {
///     Ok(file.channel_count())
/// });
/// for report in counts {
///     println!("{}: {:?}", report.path.display(), report.result);
/// }
/// ```
pub fn decode_files_with<P, T, F>(paths: &[P], options: &BatchOptions, handler: F) -> Vec<FileReport<T>>
where
    P: AsRef<Path>,
    T: Send,
    F: Fn(&Path, TdmsFile<BufReader<File>>) -> Result<T> + Sync,
{
    if paths.is_empty() {
        return Vec::new();
    }

    let (job_tx, job_rx) = unbounded::<(usize, PathBuf)>();
    for (index, path) in paths.iter().enumerate() {
        // The receiver lives until the end of this function.
        let _ = job_tx.send((index, path.as_ref().to_path_buf()));
    }
    drop(job_tx);

    let slots: Mutex<Vec<Option<FileReport<T>>>> =
        Mutex::new((0..paths.len()).map(|_| None).collect());
    let workers = options.workers.clamp(1, paths.len());
    debug!("decoding {} files on {} workers", paths.len(), workers);

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let slots = &slots;
            let handler = &handler;
            scope.spawn(move || {
                for (index, path) in job_rx.iter() {
                    let result = decode_one(&path, &options.read, handler);
                    if let Err(err) = &result {
                        warn!("{}: {}", path.display(), err);
                    }
                    slots.lock()[index] = Some(FileReport { path, result });
                }
            });
        }
    });

    slots.into_inner().into_iter().flatten().collect()
}

pub(crate) fn decode_one<T, F>(path: &Path, read: &ReadOptions, handler: &F) -> Result<T>
where
    F: Fn(&Path, TdmsFile<BufReader<File>>) -> Result<T>,
{
    let mut file = TdmsFile::open_with_options(path, read.clone())?;
    file.read()?;
    handler(path, file)
}
