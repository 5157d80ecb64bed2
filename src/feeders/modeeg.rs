// src/feeders/modeeg.rs
use super::Feeder;
use crate::error::Result;

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

// -----------------------------------------------------------------------------
// MODEEG P2 FRAMING
// -----------------------------------------------------------------------------

/// Sync bytes plus protocol version opening every P2 frame.
pub const SYNC: [u8; 3] = [0xA5, 0x5A, 0x02];
pub const FRAME_LEN: usize = 17;
pub const CHANNELS: usize = 6;
/// First channel field; channel `ch` sits at `CHANNEL_OFFSET + 2 * ch`.
pub const CHANNEL_OFFSET: usize = 4;

/// One decoded 17-byte frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModEegFrame {
    pub counter: u8,
    pub channels: [u16; CHANNELS],
    pub switches: u8,
}

impl ModEegFrame {
    /// Parses a frame whose sync bytes are already known to match.
    fn parse(bytes: &[u8]) -> Self {
        let mut channels = [0u16; CHANNELS];
        for (ch, value) in channels.iter_mut().enumerate() {
            let at = CHANNEL_OFFSET + 2 * ch;
            *value = u16::from_be_bytes([bytes[at], bytes[at + 1]]);
        }
        Self {
            counter: bytes[3],
            channels,
            switches: bytes[FRAME_LEN - 1],
        }
    }

    /// Channel value mapped from the 10-bit ADC range to roughly [-0.5, 0.5].
    pub fn sample(&self, channel: usize) -> f64 {
        normalize(self.channels[channel])
    }
}

pub fn normalize(raw: u16) -> f64 {
    (raw as f64 - 512.0) / 1024.0
}

/// Incremental frame decoder for a ModEEG byte stream.
///
/// Bytes arrive in arbitrary chunks. Anything that cannot start a frame is
/// dropped one byte at a time until the sync pattern lines up again, and a
/// partial frame at the end stays pending until the rest arrives.
#[derive(Debug, Default)]
pub struct ModEegDecoder {
    pending: VecDeque<u8>,
    discarded: usize,
    frames: usize,
}

impl ModEegDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes);
    }

    /// Decodes every complete frame currently buffered.
    pub fn frames(&mut self) -> Vec<ModEegFrame> {
        self.frames_up_to(usize::MAX)
    }

    /// Decodes at most `limit` frames; the rest stays pending.
    pub fn frames_up_to(&mut self, limit: usize) -> Vec<ModEegFrame> {
        let mut frames = Vec::new();
        while frames.len() < limit {
            let available = self.pending.len().min(SYNC.len());
            let in_sync = self
                .pending
                .iter()
                .take(available)
                .zip(SYNC.iter())
                .all(|(a, b)| a == b);

            if !in_sync {
                // Desynchronised, skip a single byte and look again
                self.pending.pop_front();
                self.discarded += 1;
                continue;
            }
            if self.pending.len() < FRAME_LEN {
                break;
            }

            let bytes: Vec<u8> = self.pending.drain(..FRAME_LEN).collect();
            frames.push(ModEegFrame::parse(&bytes));
            self.frames += 1;
        }
        frames
    }

    /// Decodes buffered frames and returns the normalized samples of `channel`.
    pub fn samples(&mut self, channel: usize) -> Vec<f64> {
        self.samples_up_to(channel, usize::MAX)
    }

    pub fn samples_up_to(&mut self, channel: usize, limit: usize) -> Vec<f64> {
        self.frames_up_to(limit)
            .iter()
            .map(|frame| frame.sample(channel))
            .collect()
    }

    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn decoded(&self) -> usize {
        self.frames
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

// -----------------------------------------------------------------------------
// STREAM FEEDER
// -----------------------------------------------------------------------------

/// Feeds one ModEEG channel from a byte stream without blocking the tick.
///
/// A background thread does the blocking reads and forwards the chunks; each
/// `feed` decodes what has arrived so far, at most `max_batch` frames. A
/// backlog stays in the decoder and drains over the following ticks.
pub struct ModEegFeeder {
    decoder: ModEegDecoder,
    channel: usize,
    max_batch: usize,
    chunks: Receiver<io::Result<Vec<u8>>>,
    finished: bool,
}

impl ModEegFeeder {
    pub fn spawn<R>(mut reader: R, channel: usize, max_batch: usize) -> Self
    where
        R: Read + Send + 'static,
    {
        let (sender, chunks) = mpsc::channel();
        thread::spawn(move || {
            let mut buffer = [0u8; 256];
            loop {
                match reader.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => {
                        if sender.send(Ok(buffer[..n].to_vec())).is_err() {
                            break; // feeder dropped
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        let _ = sender.send(Err(e));
                        break;
                    }
                }
            }
        });

        Self {
            decoder: ModEegDecoder::new(),
            channel,
            max_batch: max_batch.max(1),
            chunks,
            finished: false,
        }
    }

    pub fn decoder(&self) -> &ModEegDecoder {
        &self.decoder
    }

    /// True once the stream has ended and everything was drained.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Feeder for ModEegFeeder {
    fn feed(&mut self) -> Result<Vec<f64>> {
        loop {
            match self.chunks.try_recv() {
                Ok(Ok(bytes)) => self.decoder.push(&bytes),
                Ok(Err(e)) => {
                    self.finished = true;
                    return Err(e.into());
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    break;
                }
            }
        }
        Ok(self.decoder.samples_up_to(self.channel, self.max_batch))
    }
}
