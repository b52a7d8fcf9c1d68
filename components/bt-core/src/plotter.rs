use embassy_futures::yield_now;
use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Receiver};
use embedded_io_async::Write;

use crate::sensor::line_level::Sample;

/// Streams samples as plotter lines: the ASCII digit followed by CRLF.
pub struct Runner<'a, Stream: Write, M: RawMutex, const N: usize> {
    stream: Stream,
    sample_receiver: Receiver<'a, M, Sample, N>,
}

pub fn new<'a, Stream: Write, M: RawMutex, const N: usize>(
    sample_receiver: Receiver<'a, M, Sample, N>,
    stream: Stream,
) -> Runner<'a, Stream, M, N> {
    Runner { stream, sample_receiver }
}

impl<'a, Stream: Write, M: RawMutex, const N: usize> Runner<'a, Stream, M, N> {
    pub async fn run(mut self) {
        loop {
            yield_now().await;
            self.emit_once().await;
        }
    }

    pub async fn emit_once(&mut self) {
        let sample = self.sample_receiver.receive().await;
        let line = [sample.digit(), b'\r', b'\n'];
        match self.stream.write_all(&line).await {
            Ok(()) => trace!("Plotter> {:?}", sample),
            Err(_) => warn!("Plotter> write error, sample dropped"),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use core::convert::Infallible;

    use embassy_sync::{blocking_mutex::raw::NoopRawMutex, channel::Channel};
    use embassy_time::Duration;

    use super::*;
    use crate::sensor::line_level::{self, Level, Sample, tests::ScriptedPin};

    /// In-memory `Write` sink capturing everything the plotter emits.
    pub struct SinkBuffer {
        pub bytes: Vec<u8>,
    }

    impl SinkBuffer {
        pub fn new() -> Self {
            SinkBuffer { bytes: Vec::new() }
        }

        pub fn lines(&self) -> Vec<String> {
            String::from_utf8(self.bytes.clone())
                .unwrap()
                .split("\r\n")
                .filter(|line| !line.is_empty())
                .map(|line| line.to_string())
                .collect()
        }
    }

    impl embedded_io_async::ErrorType for SinkBuffer {
        type Error = Infallible;
    }

    impl Write for SinkBuffer {
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }
    }

    #[tokio::test]
    async fn emits_one_crlf_line_per_sample() {
        let channel = Channel::<NoopRawMutex, Sample, 4>::new();
        let mut sink = SinkBuffer::new();
        let mut runner = new(channel.receiver(), &mut sink);

        channel.send(Sample { level: Level::Low }).await;
        channel.send(Sample { level: Level::High }).await;
        runner.emit_once().await;
        runner.emit_once().await;

        drop(runner);
        assert_eq!(sink.bytes, b"0\r\n1\r\n");
    }

    #[tokio::test]
    async fn line_held_low_yields_only_zero_lines() {
        let mut sink = SinkBuffer::new();
        emit_through_pipeline(&[false; 20], &mut sink).await;

        let lines = sink.lines();
        assert_eq!(lines.len(), 20);
        assert!(lines.iter().all(|line| line == "0"));
    }

    #[tokio::test]
    async fn line_held_high_yields_only_one_lines() {
        let mut sink = SinkBuffer::new();
        emit_through_pipeline(&[true; 20], &mut sink).await;

        let lines = sink.lines();
        assert_eq!(lines.len(), 20);
        assert!(lines.iter().all(|line| line == "1"));
    }

    #[tokio::test]
    async fn toggling_line_yields_alternating_blocks() {
        // Level flips every 10 samples, 1 ms apart: a 10 ms square wave.
        let mut script = [false; 40];
        for (i, level) in script.iter_mut().enumerate() {
            *level = (i / 10) % 2 == 1;
        }

        let mut sink = SinkBuffer::new();
        emit_through_pipeline(&script, &mut sink).await;

        let lines = sink.lines();
        assert_eq!(lines.len(), 40);
        for (i, line) in lines.iter().enumerate() {
            let expected = if (i / 10) % 2 == 1 { "1" } else { "0" };
            assert_eq!(line, expected);
        }
    }

    #[tokio::test]
    async fn every_line_is_a_binary_digit() {
        let script = [true, false, false, true, true, true, false];
        let mut sink = SinkBuffer::new();
        emit_through_pipeline(&script, &mut sink).await;

        for line in sink.lines() {
            assert!(line == "0" || line == "1", "unexpected token: {line}");
        }
    }

    async fn emit_through_pipeline(script: &[bool], sink: &mut SinkBuffer) {
        let mut state = line_level::State::<4>::new();
        let (mut sampler, receiver) = line_level::new(&mut state, ScriptedPin::new(script), Duration::from_millis(1));
        let mut plotter = new(receiver, sink);

        for _ in 0..script.len() {
            sampler.sample_once().await;
            plotter.emit_once().await;
        }
    }
}
