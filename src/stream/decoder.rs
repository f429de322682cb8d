use std::collections::VecDeque;

use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::errors::PocForgeError;
use crate::utils::truncation::truncate_error;
use super::frame::{parse_line, EventFrame};

/// Reassembles an incremental byte feed into event frames.
///
/// Bytes are buffered until a newline arrives, so frames split anywhere
/// (including inside a multi-byte character) decode identically.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    malformed: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<EventFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..pos]);
            match parse_line(&text) {
                None => {}
                Some(Ok(frame)) => frames.push(frame),
                Some(Err(e)) => {
                    self.malformed += 1;
                    warn!(error = %e, line = %truncate_error(&text), "Skipping malformed event frame");
                }
            }
        }
        frames
    }

    /// Close the feed. A trailing partial line can never be completed and is
    /// dropped; returns how many bytes were discarded.
    pub fn finish(&mut self) -> usize {
        let discarded = self.buffer.len();
        if discarded > 0 {
            debug!(bytes = discarded, "Discarding incomplete trailing line");
            self.buffer.clear();
        }
        discarded
    }

    /// Number of frames skipped because they failed to parse.
    pub fn malformed_count(&self) -> usize {
        self.malformed
    }
}

struct DecodeState<S> {
    source: S,
    decoder: FrameDecoder,
    ready: VecDeque<EventFrame>,
    done: bool,
}

/// Lazily decode a chunk source into frames, in arrival order. A transport
/// error from the source is yielded once and ends the stream.
pub fn decode_stream<S>(source: S) -> impl Stream<Item = Result<EventFrame, PocForgeError>>
where
    S: Stream<Item = Result<Vec<u8>, PocForgeError>> + Unpin,
{
    let state = DecodeState {
        source,
        decoder: FrameDecoder::new(),
        ready: VecDeque::new(),
        done: false,
    };
    futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(frame) = st.ready.pop_front() {
                return Some((Ok(frame), st));
            }
            if st.done {
                return None;
            }
            match st.source.next().await {
                Some(Ok(chunk)) => st.ready.extend(st.decoder.push(&chunk)),
                Some(Err(e)) => {
                    st.done = true;
                    return Some((Err(e), st));
                }
                None => {
                    st.decoder.finish();
                    st.done = true;
                }
            }
        }
    })
}
