// RetroCapture
// Copyright (c) 2025 Harlen Batagelo
// https://github.com/hbatagelo/retrocapture
// SPDX-License-Identifier: GPL-3.0-or-later

//! Platform-abstract audio capture.
//!
//! As with [`crate::capture`], the core speaks only to a small trait;
//! a PulseAudio/Core Audio/WASAPI backend implements it and deposits
//! samples into its own mutex-guarded buffer from an OS callback
//! thread, which the audio pump thread then drains.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open audio device {0:?}")]
    Open(String),
    #[error("device is not open")]
    NotOpen,
}

/// Platform audio capture collaborator.
///
/// `open("")` may create a virtual monitor sink on backends that
/// support one (PulseAudio's default-sink monitor), matching the
/// source's documented behavior for an empty device name.
pub trait AudioSource: Send {
    fn open(&mut self, device_name: &str) -> Result<(), AudioError>;
    fn start_capture(&mut self) -> Result<(), AudioError>;
    fn stop_capture(&mut self);
    fn close(&mut self);

    /// Non-blocking read of interleaved S16LE samples, up to
    /// `buf.len()`. Returns the number of samples actually written.
    fn get_samples(&mut self, buf: &mut [i16]) -> usize;

    fn sample_rate(&self) -> u32;
    fn channels(&self) -> u16;
}

/// Reads from `source` in bounded chunks (up to 2048 samples at a time)
/// and forwards each chunk to `sink`, exiting as soon as `running`
/// reports false.
pub fn pump<F>(source: &mut dyn AudioSource, running: &std::sync::atomic::AtomicBool, mut sink: F)
where
    F: FnMut(&[i16], u64),
{
    use std::sync::atomic::Ordering;

    const MAX_CHUNK_SAMPLES: usize = 2048;
    let mut buf = vec![0i16; MAX_CHUNK_SAMPLES];

    while running.load(Ordering::Relaxed) {
        let read = source.get_samples(&mut buf);
        if read > 0 {
            sink(&buf[..read], now_us());
        } else {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }
}

/// Monotonic microsecond clock shared with [`crate::sync`]. Delegates to
/// [`crate::clock::now_us`] so every capture timestamp in the process
/// shares one epoch regardless of which thread stamped it.
pub fn now_us() -> u64 {
    crate::clock::now_us() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    struct FakeSource {
        chunks: Vec<Vec<i16>>,
    }

    impl AudioSource for FakeSource {
        fn open(&mut self, _device_name: &str) -> Result<(), AudioError> {
            Ok(())
        }
        fn start_capture(&mut self) -> Result<(), AudioError> {
            Ok(())
        }
        fn stop_capture(&mut self) {}
        fn close(&mut self) {}
        fn get_samples(&mut self, buf: &mut [i16]) -> usize {
            match self.chunks.pop() {
                Some(chunk) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    n
                }
                None => 0,
            }
        }
        fn sample_rate(&self) -> u32 {
            48_000
        }
        fn channels(&self) -> u16 {
            2
        }
    }

    #[test]
    fn pump_forwards_chunks_until_stopped() {
        let mut source = FakeSource {
            chunks: vec![vec![1, 2, 3, 4]],
        };
        let running = AtomicBool::new(true);
        let received: Arc<Mutex<Vec<Vec<i16>>>> = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();

        let running_ref = &running;
        let mut iterations = 0;
        pump(&mut source, running_ref, |samples, _ts| {
            received_clone.lock().unwrap().push(samples.to_vec());
            iterations += 1;
            if iterations >= 1 {
                running_ref.store(false, Ordering::Relaxed);
            }
        });

        assert_eq!(received.lock().unwrap().len(), 1);
        assert_eq!(received.lock().unwrap()[0], vec![1, 2, 3, 4]);
    }
}
