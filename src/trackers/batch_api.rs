use crate::track::store::TrackerState;
use crate::track::Track;
use crate::trackers::detection::Detection;
use crate::trackers::player_sort::{PlayerSort, PlayerTrack};
use crate::Errors;
use anyhow::Result;
use crossbeam::channel::{Receiver, Sender};
use log::{debug, warn};
use std::thread::{spawn, JoinHandle};

/// The frame index and the tracks updated in the frame
pub type FrameTracks = (usize, Vec<PlayerTrack>);

type CommandSenderChannel = Sender<Commands>;
type CommandReceiverChannel = Receiver<Commands>;

enum Commands {
    Predict {
        detections: Vec<Detection>,
        channel: Sender<Result<FrameTracks>>,
    },
    ActiveTracks {
        channel: Sender<Vec<Track>>,
    },
    Checkpoint {
        with_history: bool,
        channel: Sender<TrackerState>,
    },
    Exit,
}

/// Handle to the result of a frame submitted to [BatchPlayerSort]
///
#[derive(Clone, Debug)]
pub struct FrameResult {
    receiver: Receiver<Result<FrameTracks>>,
}

impl FrameResult {
    pub fn ready(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Waits for the frame to be processed
    ///
    /// # Returns
    /// * the tracks of the frame;
    /// * the tracker error if the frame broke the store contract;
    /// * [`Errors::PipelineClosed`](Errors::PipelineClosed) when the worker stopped before the frame.
    ///
    pub fn get(&self) -> Result<FrameTracks> {
        self.receiver.recv().map_err(|_| Errors::PipelineClosed)?
    }
}

fn tracking_thread(mut tracker: PlayerSort, rx: CommandReceiverChannel) {
    while let Ok(command) = rx.recv() {
        match command {
            Commands::Predict {
                detections,
                channel,
            } => {
                let res = tracker
                    .predict(&detections)
                    .map(|tracks| (tracker.current_frame(), tracks));
                let failed = res.is_err();
                if let Err(e) = channel.send(res) {
                    warn!("Unable to send results to a caller, likely the caller already closed the channel. Error is: {:?}", e);
                }
                if failed {
                    warn!(
                        "Tracking stopped at frame {} because of the store failure",
                        tracker.current_frame()
                    );
                    break;
                }
            }
            Commands::ActiveTracks { channel } => {
                let tracks = tracker.active_tracks().into_iter().cloned().collect();
                if let Err(e) = channel.send(tracks) {
                    warn!("Unable to send active tracks to a caller. Error is: {:?}", e);
                }
            }
            Commands::Checkpoint {
                with_history,
                channel,
            } => {
                if let Err(e) = channel.send(tracker.checkpoint(with_history)) {
                    warn!("Unable to send the checkpoint to a caller. Error is: {:?}", e);
                }
            }
            Commands::Exit => break,
        }
    }
    debug!("Tracking thread is finished");
}

/// Player tracker running on a dedicated worker thread.
///
/// Frames are submitted without waiting for the previous ones to complete. The single worker
/// applies them strictly in the submission order, so every frame sees the store committed by the
/// previous one. When a frame fails, the worker stops and all further requests resolve to
/// [`Errors::PipelineClosed`](Errors::PipelineClosed).
///
pub struct BatchPlayerSort {
    sender: CommandSenderChannel,
    worker: Option<JoinHandle<()>>,
}

impl Drop for BatchPlayerSort {
    fn drop(&mut self) {
        // the worker may be already stopped after a failure
        let _ = self.sender.send(Commands::Exit);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Tracking thread panicked");
            }
        }
    }
}

impl BatchPlayerSort {
    /// Moves the tracker to the worker thread
    ///
    pub fn new(tracker: PlayerSort) -> Self {
        let (sender, rx) = crossbeam::channel::unbounded();
        let worker = spawn(move || tracking_thread(tracker, rx));
        Self {
            sender,
            worker: Some(worker),
        }
    }

    /// Submits the detections of the next frame
    ///
    pub fn predict(&self, detections: Vec<Detection>) -> FrameResult {
        let (channel, receiver) = crossbeam::channel::bounded(1);
        // when the worker is gone the sender is dropped with the command and the result
        // resolves to PipelineClosed
        let _ = self.sender.send(Commands::Predict {
            detections,
            channel,
        });
        FrameResult { receiver }
    }

    /// Active tracks after all the frames submitted before the call
    ///
    pub fn active_tracks(&self) -> Result<Vec<Track>> {
        let (channel, receiver) = crossbeam::channel::bounded(1);
        self.sender
            .send(Commands::ActiveTracks { channel })
            .map_err(|_| Errors::PipelineClosed)?;
        Ok(receiver.recv().map_err(|_| Errors::PipelineClosed)?)
    }

    /// Checkpoint of the tracker after all the frames submitted before the call
    ///
    pub fn checkpoint(&self, with_history: bool) -> Result<TrackerState> {
        let (channel, receiver) = crossbeam::channel::bounded(1);
        self.sender
            .send(Commands::Checkpoint {
                with_history,
                channel,
            })
            .map_err(|_| Errors::PipelineClosed)?;
        Ok(receiver.recv().map_err(|_| Errors::PipelineClosed)?)
    }
}
