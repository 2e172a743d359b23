//! End-to-end runs of the gesture bridge against scripted frames.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use embassy_futures::block_on;
use embedded_hal_async::delay::DelayNs;
use gesture_core::{
    Command, CommandLink, Finger, Frame, FrameError, GestureBridge, HandPose, Landmark,
    LandmarkSource, LineBuffer, LinkError, SensorKey, StopReason, LANDMARK_COUNT,
};
use proptest::prelude::*;

struct ScriptedSource {
    frames: VecDeque<Frame>,
}

impl ScriptedSource {
    fn from_counts(counts: &[usize]) -> Self {
        Self {
            frames: counts.iter().map(|&n| frame_with(n)).collect(),
        }
    }
}

impl LandmarkSource for ScriptedSource {
    async fn next_frame(&mut self) -> Result<Frame, FrameError> {
        self.frames.pop_front().ok_or(FrameError::Closed)
    }

    fn is_open(&self) -> bool {
        !self.frames.is_empty()
    }
}

/// Link that records written bytes and answers each command from a table.
#[derive(Clone, Default)]
struct RecordingLink {
    written: Arc<Mutex<Vec<u8>>>,
    answers: Arc<Mutex<VecDeque<&'static [u8]>>>,
    pending: Option<&'static [u8]>,
}

impl CommandLink for RecordingLink {
    async fn send(&mut self, command: Command) -> Result<(), LinkError> {
        self.written.lock().unwrap().push(command.as_byte());
        self.pending = self.answers.lock().unwrap().pop_front();
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize, LinkError> {
        Ok(self.pending.map_or(0, |line| line.len()))
    }

    async fn read_line(&mut self) -> Result<LineBuffer, LinkError> {
        let line = self.pending.take().ok_or(LinkError::Timeout)?;
        LineBuffer::from_slice(line).map_err(|_| LinkError::BufferOverflow)
    }

    fn is_ready(&self) -> bool {
        true
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

fn frame_with(count: usize) -> Frame {
    let mut pose = HandPose::from_points(&[Landmark::new(0.5, 0.5); LANDMARK_COUNT]);
    let order = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky, Finger::Thumb];
    for finger in order.into_iter().take(count) {
        match finger {
            Finger::Thumb => pose.set(finger.tip(), Landmark::new(0.9, 0.5)),
            _ => pose.set(finger.tip(), Landmark::new(0.5, 0.1)),
        }
    }
    Frame::with_hand(pose)
}

fn run_counts(counts: &[usize], link: RecordingLink) -> (StopReason, Vec<u8>) {
    let written = link.written.clone();
    let mut bridge = GestureBridge::new(ScriptedSource::from_counts(counts), link, NoDelay);
    let reason = block_on(bridge.run()).unwrap();
    let bytes = written.lock().unwrap().clone();
    (reason, bytes)
}

#[test]
fn test_transitions_only_are_transmitted() {
    let (reason, written) = run_counts(&[0, 0, 1, 1, 1, 2, 0], RecordingLink::default());
    assert_eq!(reason, StopReason::SourceClosed);
    assert_eq!(written, b"0120");
}

#[test]
fn test_open_hand_selects_buzzer() {
    let (_, written) = run_counts(&[5, 5, 5], RecordingLink::default());
    assert_eq!(written, b"5");
}

#[test]
fn test_session_telemetry() {
    let link = RecordingLink::default();
    link.answers.lock().unwrap().extend([
        &b"D:25.4\r"[..],
        &b"T:23.5,H:45.2"[..],
        &b"P:0"[..],
    ]);

    let mut bridge = GestureBridge::new(ScriptedSource::from_counts(&[1, 2, 3]), link, NoDelay);
    assert_eq!(block_on(bridge.run()), Ok(StopReason::SourceClosed));

    let snapshot = bridge.snapshot();
    assert_eq!(snapshot.get(SensorKey::Distance), "25.4 cm");
    assert_eq!(snapshot.get(SensorKey::Temperature), "23.5 °C");
    assert_eq!(snapshot.get(SensorKey::Humidity), "45.2 %");
    assert_eq!(snapshot.get(SensorKey::Motion), "INACTIVO");
    assert_eq!(snapshot.get(SensorKey::Servo), "--");
    assert_eq!(bridge.last_sent(), Command::new(3));
}

#[test]
fn test_quit_frame_is_processed() {
    let link = RecordingLink::default();
    let written = link.written.clone();
    let source = ScriptedSource {
        frames: VecDeque::from([frame_with(4).quitting(), frame_with(1)]),
    };

    let mut bridge = GestureBridge::new(source, link, NoDelay);
    assert_eq!(block_on(bridge.run()), Ok(StopReason::Quit));
    assert_eq!(*written.lock().unwrap(), b"4");
    assert!(bridge.source().is_open());
}

proptest! {
    #[test]
    fn prop_one_write_per_run(counts in prop::collection::vec(0usize..=5, 0..64)) {
        let (_, written) = run_counts(&counts, RecordingLink::default());

        let mut expected: Vec<u8> = counts.iter().map(|&n| b'0' + n as u8).collect();
        expected.dedup();
        prop_assert_eq!(written, expected);
    }
}
