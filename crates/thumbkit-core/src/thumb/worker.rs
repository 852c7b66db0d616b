//! The single background loader thread.
//!
//! Jobs wait in an ordered queue guarded by a mutex, so a superseded job can
//! be pulled out before it runs. Every job that runs, successful or not,
//! reports back to the UI thread over an mpsc channel; the worker never
//! touches the cache or pending tables.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use crate::error::CoreResult;
use crate::thumb::asset::VisualAsset;
use crate::thumb::extract::{Extractors, ThumbnailSource};
use crate::thumb::surface::SurfaceId;

/// Generation tag of a request. Strictly increasing per cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// One unit of decode work.
#[derive(Debug, Clone)]
pub struct Job {
    pub request: RequestId,
    pub surface: SurfaceId,
    pub key: String,
    pub source: ThumbnailSource,
}

/// A finished job on its way to the UI thread. `asset` is `None` when no
/// thumbnail could be produced.
#[derive(Debug, Clone)]
pub struct Completion {
    pub request: RequestId,
    pub surface: SurfaceId,
    pub key: String,
    pub asset: Option<VisualAsset>,
}

struct Queue {
    jobs: VecDeque<Job>,
    busy: bool,
    stopped: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    ready: Condvar,
}

pub struct Worker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Starts the loader thread.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Io`] if the thread cannot be spawned.
    pub fn spawn(extractors: Extractors, results: Sender<Completion>) -> CoreResult<Self> {
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue {
                jobs: VecDeque::new(),
                busy: false,
                stopped: false,
            }),
            ready: Condvar::new(),
        });
        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("thumbkit-loader".to_string())
            .spawn(move || run(&thread_shared, &extractors, &results))?;

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    pub fn enqueue(&self, job: Job) {
        let mut queue = self.shared.queue.lock();
        if queue.stopped {
            return;
        }
        queue.jobs.push_back(job);
        drop(queue);
        self.shared.ready.notify_one();
    }

    /// Removes a queued job. Returns `false` if it already started (or
    /// never existed); an in-flight job cannot be interrupted.
    pub fn cancel(&self, request: RequestId) -> bool {
        let mut queue = self.shared.queue.lock();
        let before = queue.jobs.len();
        queue.jobs.retain(|job| job.request != request);
        queue.jobs.len() != before
    }

    /// Requests still waiting in the queue, oldest first.
    pub fn queued(&self) -> Vec<RequestId> {
        self.shared
            .queue
            .lock()
            .jobs
            .iter()
            .map(|job| job.request)
            .collect()
    }

    /// `true` when nothing is queued and nothing is decoding.
    pub fn is_idle(&self) -> bool {
        let queue = self.shared.queue.lock();
        queue.jobs.is_empty() && !queue.busy
    }

    /// Drops queued jobs, stops the thread and waits for it to exit.
    ///
    /// A decode already running finishes first; its result is sent into a
    /// channel nobody reads any more. Calling this twice is a no-op.
    pub fn shutdown(&mut self) {
        {
            let mut queue = self.shared.queue.lock();
            queue.stopped = true;
            queue.jobs.clear();
        }
        self.shared.ready.notify_all();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("thumbnail loader thread panicked");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(shared: &Shared, extractors: &Extractors, results: &Sender<Completion>) {
    tracing::debug!("thumbnail loader started");
    loop {
        let job = {
            let mut queue = shared.queue.lock();
            queue.busy = false;
            while queue.jobs.is_empty() && !queue.stopped {
                shared.ready.wait(&mut queue);
            }
            if queue.stopped {
                break;
            }
            let Some(job) = queue.jobs.pop_front() else {
                continue;
            };
            queue.busy = true;
            job
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| extractors.extract(&job.source)));
        let asset = match outcome {
            Ok(asset) => asset,
            Err(_) => {
                tracing::debug!(key = %job.key, "thumbnail extractor panicked");
                None
            }
        };

        let completion = Completion {
            request: job.request,
            surface: job.surface,
            key: job.key,
            asset,
        };
        if results.send(completion).is_err() {
            break;
        }
    }
    tracing::debug!("thumbnail loader stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::thumb::album::{AlbumId, AlbumIndex, AlbumMap, AlbumSource};
    use crate::thumb::extract::FrameGrabber;
    use image::{DynamicImage, RgbaImage};
    use std::path::{Path, PathBuf};
    use std::sync::mpsc;
    use std::time::Duration;

    struct NoAlbums;

    impl AlbumSource for NoAlbums {
        fn scan_albums(&self) -> CoreResult<AlbumMap> {
            Ok(AlbumMap::new())
        }

        fn album_art_path(&self, _id: AlbumId) -> Option<PathBuf> {
            None
        }
    }

    /// Frames are 1 px wide per character of the file name; `panic.mp4`
    /// panics, `fail.mp4` errors.
    struct NameFrames;

    impl FrameGrabber for NameFrames {
        fn grab_frame(&self, path: &Path) -> CoreResult<Option<DynamicImage>> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            match name.as_str() {
                "panic.mp4" => panic!("decoder crashed"),
                "fail.mp4" => Err(CoreError::Frame("bad stream".into())),
                _ => Ok(Some(DynamicImage::ImageRgba8(RgbaImage::new(
                    name.len() as u32,
                    1,
                )))),
            }
        }
    }

    fn worker() -> (Worker, mpsc::Receiver<Completion>) {
        let (tx, rx) = mpsc::channel();
        let albums = Arc::new(AlbumIndex::new(Box::new(NoAlbums)));
        let extractors = Extractors::new(96, Box::new(NameFrames), albums);
        (Worker::spawn(extractors, tx).unwrap(), rx)
    }

    fn job(id: u64, name: &str) -> Job {
        Job {
            request: RequestId(id),
            surface: SurfaceId(id),
            key: format!("/v/{name}"),
            source: ThumbnailSource::Video(PathBuf::from(format!("/v/{name}"))),
        }
    }

    #[test]
    fn delivers_successful_decodes() {
        let (w, rx) = worker();
        w.enqueue(job(1, "abc.mp4"));

        let done = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(done.request, RequestId(1));
        assert_eq!(done.key, "/v/abc.mp4");
        assert_eq!(done.asset.unwrap().width(), "abc.mp4".len() as u32);
    }

    #[test]
    fn failures_and_panics_report_empty_and_worker_survives() {
        let (w, rx) = worker();
        w.enqueue(job(1, "fail.mp4"));
        w.enqueue(job(2, "panic.mp4"));
        w.enqueue(job(3, "ok.mp4"));

        let timeout = Duration::from_secs(5);
        let results: Vec<_> = (0..3).map(|_| rx.recv_timeout(timeout).unwrap()).collect();
        assert_eq!(results[0].request, RequestId(1));
        assert!(results[0].asset.is_none());
        assert_eq!(results[1].request, RequestId(2));
        assert!(results[1].asset.is_none());
        assert_eq!(results[2].request, RequestId(3));
        assert!(results[2].asset.is_some());
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn cancel_of_unknown_request_is_false() {
        let (w, _rx) = worker();
        assert!(!w.cancel(RequestId(42)));
    }

    #[test]
    fn shutdown_joins_and_ignores_new_work() {
        let (mut w, rx) = worker();
        w.shutdown();
        w.shutdown();
        w.enqueue(job(1, "late.mp4"));

        assert!(w.queued().is_empty());
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }
}
