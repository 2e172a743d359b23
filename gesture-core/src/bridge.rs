//! GestureBridge: connects a landmark source to a command link.

use core::fmt;

use embedded_hal_async::delay::DelayNs;
use gesture_proto::{Command, SensorSnapshot, TelemetryParseError};
use log::{debug, info, warn};

use crate::classifier::{classify, ClassifyError, FingerCount, ThumbRule};
use crate::debounce::CommandDebouncer;
use crate::input::{FrameError, LandmarkSource};
use crate::output::{CommandLink, LinkError};
use crate::types::{Frame, LandmarkRole};

/// Time given to the microcontroller to answer a command.
pub const DEFAULT_RESPONSE_WAIT_MS: u32 = 100;

/// Tunables of the frame pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeConfig {
    /// How the thumb is judged.
    pub thumb_rule: ThumbRule,
    /// Wait between sending a command and checking for a reply.
    pub response_wait_ms: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            thumb_rule: ThumbRule::default(),
            response_wait_ms: DEFAULT_RESPONSE_WAIT_MS,
        }
    }
}

/// What happened to the reply window after a transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Nothing was sent this frame, so nothing was read.
    NotRequested,
    /// No bytes were waiting after the response window.
    Silent,
    /// A line was decoded; this many fields were applied.
    Applied(usize),
    /// A line was read but (part of) it was dropped.
    Malformed(TelemetryParseError),
    /// Reading the reply failed.
    ReadFailed(LinkError),
}

/// Result of pushing one frame through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameOutcome {
    /// Finger count for this frame.
    pub fingers: FingerCount,
    /// Command transmitted this frame, if any.
    pub sent: Option<Command>,
    /// Reply handling after the transmission.
    pub reply: Reply,
    /// Set when the primary hand was incomplete and counted as zero.
    pub incomplete: Option<LandmarkRole>,
}

/// Why [`GestureBridge::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReason {
    /// A frame carried the quit flag.
    Quit,
    /// The landmark source ran out of frames.
    SourceClosed,
    /// The landmark source failed.
    SourceFailed(FrameError),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quit => write!(f, "quit requested"),
            Self::SourceClosed => write!(f, "landmark stream ended"),
            Self::SourceFailed(e) => write!(f, "landmark source failed: {}", e),
        }
    }
}

/// Error type for bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Error from the landmark source.
    Frame(FrameError),
    /// Error writing a command to the link.
    Link(LinkError),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "{}", e),
            Self::Link(e) => write!(f, "{}", e),
        }
    }
}

/// A bridge that turns landmark frames into commands on a serial link.
///
/// Each frame is classified, the resulting command goes through the
/// debouncer, and only a changed command is written. After a write the
/// bridge waits the response window and, if the microcontroller answered,
/// decodes one telemetry line into its [`SensorSnapshot`].
///
/// The bridge owns the command state and the snapshot for the lifetime of
/// one session.
///
/// # Error Handling
///
/// An incomplete hand counts as zero fingers. Telemetry problems are logged
/// and leave the snapshot at its last good values. Only a failed command
/// write is returned to the caller.
pub struct GestureBridge<S, L, D> {
    source: S,
    link: L,
    delay: D,
    config: BridgeConfig,
    debouncer: CommandDebouncer,
    snapshot: SensorSnapshot,
    fingers: FingerCount,
}

impl<S: LandmarkSource, L: CommandLink, D: DelayNs> GestureBridge<S, L, D> {
    /// Create a bridge with the default configuration.
    pub fn new(source: S, link: L, delay: D) -> Self {
        Self::with_config(source, link, delay, BridgeConfig::default())
    }

    /// Create a bridge with an explicit configuration.
    pub fn with_config(source: S, link: L, delay: D, config: BridgeConfig) -> Self {
        Self {
            source,
            link,
            delay,
            config,
            debouncer: CommandDebouncer::new(),
            snapshot: SensorSnapshot::new(),
            fingers: FingerCount::ZERO,
        }
    }

    /// Run the bridge until the user quits or the source stops.
    ///
    /// A quitting frame is still processed before returning. Source errors
    /// end the loop normally; only link write errors are returned as `Err`.
    pub async fn run(&mut self) -> Result<StopReason, BridgeError> {
        loop {
            let frame = match self.source.next_frame().await {
                Ok(frame) => frame,
                Err(FrameError::Closed) => return Ok(StopReason::SourceClosed),
                Err(e) => return Ok(StopReason::SourceFailed(e)),
            };

            self.process_frame(&frame).await?;

            if frame.quit {
                return Ok(StopReason::Quit);
            }
        }
    }

    /// Read a single frame from the source and process it.
    ///
    /// Returns the outcome for testing purposes.
    pub async fn process_one(&mut self) -> Result<FrameOutcome, BridgeError> {
        let frame = self
            .source
            .next_frame()
            .await
            .map_err(BridgeError::Frame)?;
        self.process_frame(&frame).await
    }

    /// Push one frame through classifier, debouncer and link.
    pub async fn process_frame(&mut self, frame: &Frame) -> Result<FrameOutcome, BridgeError> {
        let (fingers, incomplete) = match classify(frame, self.config.thumb_rule) {
            Ok(count) => (count, None),
            Err(ClassifyError::IncompleteLandmarks(role)) => {
                warn!("Incomplete hand pose (missing {:?}), counting zero fingers", role);
                (FingerCount::ZERO, Some(role))
            }
        };
        self.fingers = fingers;

        let command = fingers.command();
        if !self.debouncer.should_send(command) {
            return Ok(FrameOutcome {
                fingers,
                sent: None,
                reply: Reply::NotRequested,
                incomplete,
            });
        }

        self.link.send(command).await.map_err(BridgeError::Link)?;
        self.debouncer.mark_sent(command);
        info!("Sent command {} ({})", command, command.mode());

        let reply = self.collect_reply(command).await;

        Ok(FrameOutcome {
            fingers,
            sent: Some(command),
            reply,
            incomplete,
        })
    }

    /// Wait the response window and decode a reply if one is waiting.
    async fn collect_reply(&mut self, command: Command) -> Reply {
        self.delay.delay_ms(self.config.response_wait_ms).await;

        match self.link.bytes_available() {
            Ok(0) => return Reply::Silent,
            Ok(_) => {}
            Err(e) => {
                warn!("Telemetry check failed: {}", e);
                return Reply::ReadFailed(e);
            }
        }

        let line = match self.link.read_line().await {
            Ok(line) => line,
            Err(e) => {
                warn!("Telemetry read failed: {}", e);
                return Reply::ReadFailed(e);
            }
        };

        debug!(
            "Received telemetry: {}",
            core::str::from_utf8(&line).unwrap_or("<invalid utf-8>")
        );

        match self.snapshot.apply_line(&line) {
            Ok(applied) => {
                info!("{}", self.snapshot.readings(command.mode()));
                Reply::Applied(applied)
            }
            Err(e) => {
                debug!("Dropped telemetry: {}", e);
                Reply::Malformed(e)
            }
        }
    }

    /// Finger count of the most recent frame.
    pub fn finger_count(&self) -> FingerCount {
        self.fingers
    }

    /// Last known sensor values.
    pub fn snapshot(&self) -> &SensorSnapshot {
        &self.snapshot
    }

    /// Last command written to the link.
    pub fn last_sent(&self) -> Option<Command> {
        self.debouncer.last_sent()
    }

    /// Active configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Get a reference to the landmark source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the landmark source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get a reference to the command link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Get a mutable reference to the command link.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Decompose the bridge into its source, link and delay.
    pub fn into_parts(self) -> (S, L, D) {
        (self.source, self.link, self.delay)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::classifier::Finger;
    use crate::output::LineBuffer;
    use crate::types::{HandPose, Landmark, LANDMARK_COUNT};
    use core::future::Future;
    use embassy_futures::block_on;
    use gesture_proto::SensorKey;
    use std::collections::VecDeque;
    use std::vec;
    use std::vec::Vec;

    struct MockSource {
        frames: VecDeque<Result<Frame, FrameError>>,
    }

    impl MockSource {
        fn new(frames: Vec<Result<Frame, FrameError>>) -> Self {
            Self {
                frames: frames.into(),
            }
        }
    }

    impl LandmarkSource for MockSource {
        fn next_frame(&mut self) -> impl Future<Output = Result<Frame, FrameError>> {
            core::future::ready(self.frames.pop_front().unwrap_or(Err(FrameError::Closed)))
        }

        fn is_open(&self) -> bool {
            !self.frames.is_empty()
        }
    }

    #[derive(Default)]
    struct MockLink {
        sent: Vec<Command>,
        replies: VecDeque<Result<&'static [u8], LinkError>>,
        fail_send: Option<LinkError>,
        reads: usize,
    }

    impl CommandLink for MockLink {
        async fn send(&mut self, command: Command) -> Result<(), LinkError> {
            if let Some(e) = self.fail_send {
                return Err(e);
            }
            self.sent.push(command);
            Ok(())
        }

        fn bytes_available(&mut self) -> Result<usize, LinkError> {
            match self.replies.front() {
                Some(Ok(bytes)) => Ok(bytes.len().max(1)),
                Some(Err(_)) => Ok(1),
                None => Ok(0),
            }
        }

        async fn read_line(&mut self) -> Result<LineBuffer, LinkError> {
            self.reads += 1;
            match self.replies.pop_front() {
                Some(Ok(bytes)) => Ok(LineBuffer::from_slice(bytes).unwrap()),
                Some(Err(e)) => Err(e),
                None => Err(LinkError::Timeout),
            }
        }

        fn is_ready(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct MockDelay {
        waited_ms: u64,
    }

    impl DelayNs for MockDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.waited_ms += u64::from(ns) / 1_000_000;
        }
    }

    /// A complete pose with `count` fingers raised (thumb last).
    fn hand(count: usize) -> HandPose {
        let mut pose = HandPose::from_points(&[Landmark::new(0.5, 0.5); LANDMARK_COUNT]);
        let order = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky, Finger::Thumb];
        for finger in order.into_iter().take(count) {
            let tip = match finger {
                Finger::Thumb => Landmark::new(0.8, 0.5),
                _ => Landmark::new(0.5, 0.1),
            };
            pose.set(finger.tip(), tip);
        }
        pose
    }

    fn frame(count: usize) -> Frame {
        Frame::with_hand(hand(count))
    }

    fn bridge(
        frames: Vec<Result<Frame, FrameError>>,
        link: MockLink,
    ) -> GestureBridge<MockSource, MockLink, MockDelay> {
        GestureBridge::new(MockSource::new(frames), link, MockDelay::default())
    }

    #[test]
    fn test_first_frame_always_sends() {
        let mut bridge = bridge(vec![Ok(Frame::empty())], MockLink::default());

        let outcome = block_on(bridge.process_one()).unwrap();
        assert_eq!(outcome.fingers, FingerCount::ZERO);
        assert_eq!(outcome.sent, Some(Command::OFF));
        assert_eq!(outcome.reply, Reply::Silent);
        assert_eq!(bridge.link().sent, vec![Command::OFF]);
        assert_eq!(bridge.last_sent(), Some(Command::OFF));
    }

    #[test]
    fn test_repeated_count_not_resent_or_read() {
        let link = MockLink {
            replies: VecDeque::from([Ok(&b"D:10"[..]), Ok(&b"D:99"[..])]),
            ..MockLink::default()
        };
        let mut bridge = bridge(vec![Ok(frame(2)), Ok(frame(2))], link);

        block_on(bridge.process_one()).unwrap();
        let outcome = block_on(bridge.process_one()).unwrap();

        assert_eq!(outcome.sent, None);
        assert_eq!(outcome.reply, Reply::NotRequested);
        assert_eq!(bridge.link().reads, 1);
        assert_eq!(bridge.snapshot().get(SensorKey::Distance), "10 cm");
    }

    #[test]
    fn test_waits_response_window_before_reading() {
        let mut bridge = GestureBridge::with_config(
            MockSource::new(vec![Ok(frame(1))]),
            MockLink::default(),
            MockDelay::default(),
            BridgeConfig {
                response_wait_ms: 250,
                ..BridgeConfig::default()
            },
        );

        block_on(bridge.process_one()).unwrap();
        let (_, _, delay) = bridge.into_parts();
        assert_eq!(delay.waited_ms, 250);
    }

    #[test]
    fn test_reply_updates_snapshot() {
        let link = MockLink {
            replies: VecDeque::from([Ok(&b"D:25.4,T:23.5,H:45.2,P:1,S:90\r"[..])]),
            ..MockLink::default()
        };
        let mut bridge = bridge(vec![Ok(frame(1))], link);

        let outcome = block_on(bridge.process_one()).unwrap();
        assert_eq!(outcome.reply, Reply::Applied(5));

        let snapshot = bridge.snapshot();
        assert_eq!(snapshot.get(SensorKey::Distance), "25.4 cm");
        assert_eq!(snapshot.get(SensorKey::Temperature), "23.5 °C");
        assert_eq!(snapshot.get(SensorKey::Humidity), "45.2 %");
        assert_eq!(snapshot.get(SensorKey::Motion), "ACTIVO");
        assert_eq!(snapshot.get(SensorKey::Servo), "90 °");
    }

    #[test]
    fn test_malformed_reply_keeps_snapshot() {
        let link = MockLink {
            replies: VecDeque::from([Ok(&b"T:21.0"[..]), Ok(&b"garbage"[..])]),
            ..MockLink::default()
        };
        let mut bridge = bridge(vec![Ok(frame(2)), Ok(frame(3))], link);

        block_on(bridge.process_one()).unwrap();
        let outcome = block_on(bridge.process_one()).unwrap();

        assert_eq!(outcome.reply, Reply::Malformed(TelemetryParseError::NoSeparator));
        assert_eq!(bridge.snapshot().get(SensorKey::Temperature), "21.0 °C");
    }

    #[test]
    fn test_read_failure_is_contained() {
        let link = MockLink {
            replies: VecDeque::from([Err(LinkError::BufferOverflow)]),
            ..MockLink::default()
        };
        let mut bridge = bridge(vec![Ok(frame(4))], link);

        let outcome = block_on(bridge.process_one()).unwrap();
        assert_eq!(outcome.sent, Command::new(4));
        assert_eq!(outcome.reply, Reply::ReadFailed(LinkError::BufferOverflow));
        assert_eq!(bridge.last_sent(), Command::new(4));
    }

    #[test]
    fn test_send_failure_propagates_and_is_retried() {
        let link = MockLink {
            fail_send: Some(LinkError::Io),
            ..MockLink::default()
        };
        let mut bridge = bridge(vec![Ok(frame(1)), Ok(frame(1))], link);

        let result = block_on(bridge.process_one());
        assert_eq!(result, Err(BridgeError::Link(LinkError::Io)));
        assert_eq!(bridge.last_sent(), None);

        bridge.link_mut().fail_send = None;
        let outcome = block_on(bridge.process_one()).unwrap();
        assert_eq!(outcome.sent, Command::new(1));
    }

    #[test]
    fn test_incomplete_pose_counts_zero() {
        let pose = HandPose::from_points(&[Landmark::new(0.5, 0.5); 7]);
        let mut bridge = bridge(vec![Ok(Frame::with_hand(pose))], MockLink::default());

        let outcome = block_on(bridge.process_one()).unwrap();
        assert_eq!(outcome.fingers, FingerCount::ZERO);
        assert_eq!(outcome.incomplete, Some(LandmarkRole::IndexTip));
        assert_eq!(outcome.sent, Some(Command::OFF));
    }

    #[test]
    fn test_run_stops_after_quit_frame() {
        let frames = vec![Ok(frame(1)), Ok(frame(3).quitting()), Ok(frame(5))];
        let mut bridge = bridge(frames, MockLink::default());

        let reason = block_on(bridge.run());
        assert_eq!(reason, Ok(StopReason::Quit));
        assert_eq!(bridge.link().sent, vec![Command::new(1).unwrap(), Command::new(3).unwrap()]);
        assert_eq!(bridge.finger_count().get(), 3);
    }

    #[test]
    fn test_run_stops_when_source_ends() {
        let mut bridge = bridge(vec![Ok(frame(2))], MockLink::default());
        assert_eq!(block_on(bridge.run()), Ok(StopReason::SourceClosed));

        let mut bridge = self::bridge(vec![Ok(frame(2)), Err(FrameError::Io)], MockLink::default());
        assert_eq!(block_on(bridge.run()), Ok(StopReason::SourceFailed(FrameError::Io)));
    }

    #[test]
    fn test_run_returns_link_errors() {
        let link = MockLink {
            fail_send: Some(LinkError::Disconnected),
            ..MockLink::default()
        };
        let mut bridge = bridge(vec![Ok(frame(2))], link);
        assert_eq!(
            block_on(bridge.run()),
            Err(BridgeError::Link(LinkError::Disconnected))
        );
    }
}
