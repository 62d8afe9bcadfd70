// src/batch/async_pool.rs
use crate::batch::pool::{decode_one, BatchOptions, FileReport};
use crate::error::{TdmsError, Result};
use crate::reader::TdmsFile;
use log::{debug, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task;

/// Async counterpart of [`decode_files_with`](crate::batch::decode_files_with).
///
/// Each file decodes on tokio's blocking pool; at most `options.workers`
/// run at once. Reports follow the order of `paths`.
pub async fn decode_files_async<T, F>(
    paths: Vec<PathBuf>,
    options: &BatchOptions,
    handler: F,
) -> Vec<FileReport<T>>
where
    T: Send + 'static,
    F: Fn(&Path, TdmsFile<BufReader<File>>) -> Result<T> + Send + Sync + 'static,
{
    let handler = Arc::new(handler);
    let permits = Arc::new(Semaphore::new(options.workers.max(1)));
    debug!("decoding {} files on up to {} blocking tasks", paths.len(), options.workers);

    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        let handler = Arc::clone(&handler);
        let permits = Arc::clone(&permits);
        let read = options.read.clone();
        let task_path = path.clone();
        let handle = task::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| TdmsError::Worker(e.to_string()))?;
            task::spawn_blocking(move || decode_one(&task_path, &read, handler.as_ref()))
                .await
                .map_err(|e| TdmsError::Worker(e.to_string()))?
        });
        handles.push((path, handle));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(TdmsError::Worker(e.to_string())),
        };
        if let Err(err) = &result {
            warn!("{}: {}", path.display(), err);
        }
        reports.push(FileReport { path, result });
    }
    reports
}
