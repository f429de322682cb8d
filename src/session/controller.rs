use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::api::PocBackend;
use crate::errors::PocForgeError;
use crate::models::{GenerationRequest, GenerationResult};
use crate::stream::{decode_stream, EventFrame};
use super::events::SessionEvent;
use super::state::{ProgressTracker, StepState, StepStatus};

/// Frame-by-frame state of one generation session.
///
/// Terminal state is entered at most once; every frame after it is ignored.
#[derive(Debug)]
pub struct SessionRun {
    submitted_info: String,
    tracker: ProgressTracker,
    terminated: bool,
}

/// What applying one frame did.
#[derive(Debug)]
pub enum FrameEffect {
    Ignored,
    Progress,
    Terminal(Result<GenerationResult, PocForgeError>),
    EndOfStream,
}

impl SessionRun {
    pub fn new(request: &GenerationRequest) -> Self {
        Self {
            submitted_info: request.vulnerability_info.clone(),
            tracker: ProgressTracker::new(),
            terminated: false,
        }
    }

    pub fn apply(&mut self, frame: EventFrame) -> FrameEffect {
        if let EventFrame::End = frame {
            return FrameEffect::EndOfStream;
        }
        if self.terminated {
            debug!(kind = ?frame.kind(), "Ignoring frame after terminal state");
            return FrameEffect::Ignored;
        }
        match frame {
            EventFrame::Status { step, message } => {
                if self.tracker.update(step, StepStatus::Active, &message) {
                    FrameEffect::Progress
                } else {
                    debug!(message = %message, "Heartbeat status frame");
                    FrameEffect::Ignored
                }
            }
            EventFrame::Result(payload) => {
                self.terminate();
                FrameEffect::Terminal(payload.into_outcome(&self.submitted_info))
            }
            EventFrame::Error { message } => {
                self.terminate();
                FrameEffect::Terminal(Err(PocForgeError::Application(message)))
            }
            EventFrame::End => FrameEffect::EndOfStream,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn steps(&self) -> &[StepState] {
        self.tracker.steps()
    }

    fn terminate(&mut self) {
        self.terminated = true;
        self.tracker.complete_current();
    }
}

/// Owns generation requests end to end. Only one session may be in flight;
/// `start` fails with `SessionBusy` while another is running.
pub struct GenerationController {
    backend: Arc<dyn PocBackend>,
    gate: Arc<Mutex<()>>,
    event_tx: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl GenerationController {
    pub fn new(backend: Arc<dyn PocBackend>) -> Self {
        Self {
            backend,
            gate: Arc::new(Mutex::new(())),
            event_tx: None,
        }
    }

    /// Attach an event channel for streaming progress to a view.
    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Whether a session is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    /// Validate the inputs and run one session to its terminal outcome.
    pub async fn start(
        &self,
        vulnerability_info: &str,
        target_info: Option<&str>,
    ) -> Result<GenerationResult, PocForgeError> {
        let request = GenerationRequest::new(vulnerability_info, target_info)?;
        let _guard = self.gate.try_lock().map_err(|_| PocForgeError::SessionBusy)?;

        let session_id = uuid::Uuid::new_v4().to_string();
        info!(session_id = %session_id, has_target = request.target_info.is_some(), "Starting generation session");
        self.emit(SessionEvent::Started { session_id: session_id.clone() });

        let outcome = self.drive(&request).await;
        match &outcome {
            Ok(result) => {
                info!(session_id = %session_id, vuln_type = %result.vulnerability_type, saved = result.saved, "Generation completed");
                self.emit(SessionEvent::Completed { result: result.clone() });
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Generation failed");
                self.emit(SessionEvent::Failed {
                    error_type: e.classify().error_type,
                    message: e.user_message(),
                });
            }
        }
        outcome
    }

    async fn drive(&self, request: &GenerationRequest) -> Result<GenerationResult, PocForgeError> {
        let body = self.backend.generate(request).await?;
        let frames = decode_stream(body);
        futures::pin_mut!(frames);

        let mut run = SessionRun::new(request);
        while let Some(item) = frames.next().await {
            match run.apply(item?) {
                FrameEffect::Progress => self.emit(SessionEvent::Progress { steps: run.steps().to_vec() }),
                FrameEffect::Terminal(result) => {
                    // Publish now; the rest of the feed is dropped unread.
                    self.emit(SessionEvent::Progress { steps: run.steps().to_vec() });
                    return result;
                }
                FrameEffect::EndOfStream => break,
                FrameEffect::Ignored => {}
            }
        }

        Err(PocForgeError::transport(
            None,
            "generation stream closed before a result was received",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::RecordingBackend;
    use crate::stream::frame::parse_body;

    fn request() -> GenerationRequest {
        GenerationRequest::new("SQLi in login", None).unwrap()
    }

    fn frame(body: &str) -> EventFrame {
        parse_body(body).unwrap()
    }

    const RESULT_OK: &str = r#"{"type": "result", "data": {"success": true, "vulnerability_type": "sqli", "poc_code": "def scan(u): pass"}}"#;

    #[test]
    fn test_status_then_result() {
        let mut run = SessionRun::new(&request());
        assert!(matches!(run.apply(frame(r#"{"type":"status","step":1,"message":"gen"}"#)), FrameEffect::Progress));
        match run.apply(frame(RESULT_OK)) {
            FrameEffect::Terminal(Ok(result)) => assert_eq!(result.vulnerability_type, "sqli"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(run.apply(EventFrame::End), FrameEffect::EndOfStream));
        assert_eq!(run.steps().len(), 1);
        assert_eq!(run.steps()[0].status, StepStatus::Completed);
    }

    #[test]
    fn test_frames_after_terminal_ignored() {
        let mut run = SessionRun::new(&request());
        assert!(matches!(
            run.apply(frame(r#"{"type":"error","data":{"error":"boom"}}"#)),
            FrameEffect::Terminal(Err(PocForgeError::Application(_)))
        ));
        assert!(matches!(run.apply(frame(RESULT_OK)), FrameEffect::Ignored));
        assert!(matches!(run.apply(frame(r#"{"type":"status","step":2,"message":"late"}"#)), FrameEffect::Ignored));
        assert!(run.is_terminated());
        assert!(run.steps().is_empty());
    }

    #[test]
    fn test_heartbeat_has_no_effect() {
        let mut run = SessionRun::new(&request());
        assert!(matches!(run.apply(frame(r#"{"type":"status","step":0,"message":"hi"}"#)), FrameEffect::Ignored));
        assert!(run.steps().is_empty());
    }

    #[tokio::test]
    async fn test_empty_info_makes_no_network_call() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = GenerationController::new(backend.clone());
        let err = controller.start("", Some("target")).await.unwrap_err();
        assert!(matches!(err, PocForgeError::Validation(_)));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_full_session_events() {
        let feed = format!(
            "data: {{\"type\":\"status\",\"step\":1,\"message\":\"gen\"}}\n\ndata: {}\n\ndata: [DONE]\n\n",
            RESULT_OK
        );
        let backend = Arc::new(RecordingBackend::with_feed(vec![feed.into_bytes()]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let controller = GenerationController::new(backend.clone()).with_event_channel(tx);

        let result = controller.start("SQLi in login", None).await.unwrap();
        assert_eq!(result.poc_code, "def scan(u): pass");
        assert_eq!(backend.call_count(), 1);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(matches!(events.first(), Some(SessionEvent::Started { .. })));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert!(matches!(events.last(), Some(SessionEvent::Completed { .. })));
        let last_steps = events
            .iter()
            .rev()
            .find_map(|e| match e {
                SessionEvent::Progress { steps } => Some(steps.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_steps.len(), 1);
        assert_eq!(last_steps[0].status, StepStatus::Completed);
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let backend = Arc::new(RecordingBackend::failing_generate(503));
        let controller = GenerationController::new(backend);
        let err = controller.start("XSS", None).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_stream_without_terminal_frame() {
        let backend = Arc::new(RecordingBackend::with_feed(vec![
            b"data: {\"type\":\"status\",\"step\":1,\"message\":\"gen\"}\n".to_vec(),
        ]));
        let controller = GenerationController::new(backend);
        let err = controller.start("XSS", None).await.unwrap_err();
        assert!(matches!(err, PocForgeError::Transport { status: None, .. }));
    }

    #[tokio::test]
    async fn test_result_published_while_connection_stays_open() {
        let feed = format!(
            "data: {{\"type\":\"status\",\"step\":1,\"message\":\"gen\"}}\n\ndata: {}\n\n",
            RESULT_OK
        );
        let backend = Arc::new(RecordingBackend::with_open_feed(vec![feed.into_bytes()]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let controller = GenerationController::new(backend).with_event_channel(tx);

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            controller.start("SQLi in login", None),
        )
        .await
        .expect("session should finish on the result frame")
        .unwrap();
        assert_eq!(result.vulnerability_type, "sqli");
        assert!(!controller.is_busy());

        let mut terminal = 0;
        while let Ok(event) = rx.try_recv() {
            if event.is_terminal() {
                assert!(matches!(event, SessionEvent::Completed { .. }));
                terminal += 1;
            }
        }
        assert_eq!(terminal, 1);
    }

    #[tokio::test]
    async fn test_error_frame_published_while_connection_stays_open() {
        let feed = b"data: {\"type\":\"error\",\"data\":{\"error\":\"quota exceeded\"}}\n\n".to_vec();
        let backend = Arc::new(RecordingBackend::with_open_feed(vec![feed]));
        let controller = GenerationController::new(backend);

        let outcome = tokio::time::timeout(std::time::Duration::from_secs(2), controller.start("XSS", None))
            .await
            .expect("session should finish on the error frame");
        match outcome {
            Err(PocForgeError::Application(msg)) => assert_eq!(msg, "quota exceeded"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_second_session_rejected_while_busy() {
        let backend = Arc::new(RecordingBackend::default());
        let controller = GenerationController::new(backend.clone());
        let _held = controller.gate.try_lock().unwrap();
        assert!(controller.is_busy());
        let err = controller.start("XSS", None).await.unwrap_err();
        assert!(matches!(err, PocForgeError::SessionBusy));
        assert_eq!(backend.call_count(), 0);
    }
}
