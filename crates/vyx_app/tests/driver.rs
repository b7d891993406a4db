use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tokio::sync::mpsc;
use vyx_app::{open_results, Driver, Frontend};
use vyx_core::{
    AppViewModel, CancelReason, ControllerPhase, JobError, JobProfile, JobRequest, Msg,
    ResultPayload, TransportError, TransportFailure, TransportOutcome,
};
use vyx_engine::{
    EngineEvent, EngineHandle, JobCancel, Mailbox, MemoryMailbox, ReqwestSubmitter, SubmitSettings,
    Submitter, TokioClock, WireFields,
};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(vyx_logging::initialize_for_tests);
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Plays back one scripted step per submission. `None` delay never resolves.
#[derive(Default)]
struct ScriptedSubmitter {
    steps: Mutex<VecDeque<(Option<Duration>, TransportOutcome)>>,
    requests: Mutex<Vec<JobRequest>>,
    aborts: Mutex<Vec<Option<CancelReason>>>,
}

impl ScriptedSubmitter {
    fn with_steps(steps: Vec<(Option<Duration>, TransportOutcome)>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            ..Self::default()
        })
    }

    fn requests(&self) -> Vec<JobRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn aborts(&self) -> Vec<Option<CancelReason>> {
        self.aborts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Submitter for ScriptedSubmitter {
    async fn submit(&self, request: &JobRequest, cancel: &JobCancel) -> TransportOutcome {
        self.requests.lock().unwrap().push(request.clone());
        let step = self.steps.lock().unwrap().pop_front();
        let respond = async move {
            match step {
                Some((Some(delay), outcome)) => {
                    tokio::time::sleep(delay).await;
                    outcome
                }
                _ => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.aborts.lock().unwrap().push(cancel.reason());
                TransportOutcome::Aborted(cancel.reason())
            }
            outcome = respond => outcome,
        }
    }
}

#[derive(Default)]
struct Recorded {
    views: Vec<AppViewModel>,
    navigations: usize,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Recorded>>);

impl Recorder {
    fn navigations(&self) -> usize {
        self.0.lock().unwrap().navigations
    }

    fn last_view(&self) -> Option<AppViewModel> {
        self.0.lock().unwrap().views.last().cloned()
    }
}

impl Frontend for Recorder {
    fn render(&mut self, view: &AppViewModel) {
        self.0.lock().unwrap().views.push(view.clone());
    }

    fn navigate_to_results(&mut self) {
        self.0.lock().unwrap().navigations += 1;
    }
}

fn build(
    profile: JobProfile,
    submitter: Arc<dyn Submitter>,
) -> (Driver, Arc<MemoryMailbox>, Recorder) {
    init_logging();
    let mailbox = Arc::new(MemoryMailbox::new());
    let recorder = Recorder::default();
    let driver = Driver::new(
        profile,
        EngineHandle::new(submitter),
        mailbox.clone(),
        Arc::new(TokioClock::new()),
        Box::new(recorder.clone()),
        StdRng::seed_from_u64(7),
    );
    (driver, mailbox, recorder)
}

#[tokio::test(start_paused = true)]
async fn success_stores_result_and_navigates_once() {
    let payload = json!({ "success": true, "content": { "total_items": 2 } });
    let submitter = ScriptedSubmitter::with_steps(vec![(
        Some(secs(2)),
        TransportOutcome::Response(ResultPayload::Success(payload.clone())),
    )]);
    let (mut driver, mailbox, recorder) = build(JobProfile::content(), submitter.clone());
    let (_cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();

    driver.submit(URL, &["blog", "x_post"]);
    driver.run_until_settled(&mut cancel_rx).await;

    assert_eq!(driver.phase(), ControllerPhase::Succeeded);
    assert_eq!(recorder.navigations(), 1);
    assert_eq!(
        submitter.requests(),
        vec![JobRequest::new(URL, ["blog", "x_post"]).unwrap()]
    );
    assert_eq!(open_results(mailbox.as_ref()), Ok(payload));
    assert_eq!(open_results(mailbox.as_ref()), Err(JobError::StaleResult));
}

#[tokio::test(start_paused = true)]
async fn never_resolving_transport_times_out_at_budget() {
    let submitter = ScriptedSubmitter::with_steps(Vec::new());
    let mut profile = JobProfile::content();
    profile.budget = secs(5);
    let (mut driver, mailbox, recorder) = build(profile, submitter.clone());
    let (_cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();
    let start = tokio::time::Instant::now();

    driver.submit(URL, &["blog"]);
    driver.run_until_settled(&mut cancel_rx).await;

    assert_eq!(driver.phase(), ControllerPhase::TimedOut);
    let waited = start.elapsed();
    assert!(waited >= secs(5) && waited < secs(6), "waited {waited:?}");
    assert_eq!(driver.state().execution().unwrap().elapsed_secs(), 5);

    let EngineEvent::Resolved {
        execution_id,
        outcome,
    } = driver.engine().next_event().await.unwrap();
    assert_eq!(execution_id, 1);
    assert_eq!(outcome, TransportOutcome::Aborted(Some(CancelReason::Timeout)));
    assert_eq!(submitter.aborts(), vec![Some(CancelReason::Timeout)]);

    assert_eq!(mailbox.take().unwrap(), None);
    assert_eq!(recorder.navigations(), 0);
    let view = recorder.last_view().unwrap();
    assert!(view.can_retry);
    assert!(view
        .error_message
        .unwrap()
        .starts_with("Request timed out after 5 seconds."));
}

#[tokio::test(start_paused = true)]
async fn cancel_wins_over_a_later_success() {
    let submitter = ScriptedSubmitter::with_steps(vec![(
        Some(secs(10)),
        TransportOutcome::Response(ResultPayload::Success(json!({ "success": true }))),
    )]);
    let (mut driver, mailbox, recorder) = build(JobProfile::content(), submitter.clone());
    let (cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        tokio::time::sleep(secs(3)).await;
        let _ = cancel_tx.send(());
    });

    driver.submit(URL, &["blog"]);
    driver.run_until_settled(&mut cancel_rx).await;
    assert_eq!(driver.phase(), ControllerPhase::Cancelled);

    let EngineEvent::Resolved { outcome, .. } = driver.engine().next_event().await.unwrap();
    assert_eq!(outcome, TransportOutcome::Aborted(Some(CancelReason::User)));

    tokio::time::sleep(secs(20)).await;
    assert_eq!(driver.phase(), ControllerPhase::Cancelled);
    assert_eq!(mailbox.take().unwrap(), None);
    assert_eq!(recorder.navigations(), 0);
    assert_eq!(
        recorder.last_view().unwrap().error_message.as_deref(),
        Some("Request was cancelled.")
    );
}

#[tokio::test(start_paused = true)]
async fn retry_resubmits_the_same_request() {
    let failure = TransportOutcome::Failed(TransportError {
        kind: TransportFailure::Network,
        message: "connection reset".into(),
        body: None,
    });
    let payload = json!({ "success": true });
    let submitter = ScriptedSubmitter::with_steps(vec![
        (Some(secs(1)), failure),
        (
            Some(secs(1)),
            TransportOutcome::Response(ResultPayload::Success(payload.clone())),
        ),
    ]);
    let (mut driver, mailbox, recorder) = build(JobProfile::clips(), submitter.clone());
    let (_cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();

    driver.submit::<&str>(URL, &[]);
    driver.run_until_settled(&mut cancel_rx).await;
    assert_eq!(driver.phase(), ControllerPhase::Failed);
    assert_eq!(
        driver.state().last_error(),
        Some(&JobError::Transport {
            status: None,
            message: "Network error: connection reset".into(),
            body: None,
        })
    );

    assert!(driver.retry());
    driver.run_until_settled(&mut cancel_rx).await;
    assert_eq!(driver.phase(), ControllerPhase::Succeeded);
    assert_eq!(driver.state().execution().unwrap().id(), 2);

    let requests = submitter.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
    assert_eq!(recorder.navigations(), 1);
    assert_eq!(mailbox.take().unwrap(), Some(payload));

    // Nothing to retry after a success.
    assert!(!driver.retry());
}

#[tokio::test(start_paused = true)]
async fn invalid_url_never_reaches_the_transport() {
    let submitter = ScriptedSubmitter::with_steps(Vec::new());
    let (mut driver, _mailbox, recorder) = build(JobProfile::content(), submitter.clone());
    let (_cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();

    driver.submit(URL.replace("youtube.com", "example.com").as_str(), &["blog"]);
    driver.run_until_settled(&mut cancel_rx).await;

    assert_eq!(driver.phase(), ControllerPhase::Idle);
    assert!(submitter.requests().is_empty());
    assert_eq!(
        recorder.last_view().unwrap().error_message.as_deref(),
        Some("Please enter a valid YouTube URL")
    );
}

#[tokio::test]
async fn server_error_fails_without_touching_the_mailbox() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;

    let submitter = ReqwestSubmitter::new(SubmitSettings::new(
        server.uri(),
        WireFields::content(),
        secs(30),
    ))
    .unwrap();
    let (mut driver, mailbox, recorder) = build(JobProfile::content(), Arc::new(submitter));
    let (_cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();

    driver.submit(URL, &["blog"]);
    driver.run_until_settled(&mut cancel_rx).await;

    assert_eq!(driver.phase(), ControllerPhase::Failed);
    assert_eq!(
        driver.state().last_error(),
        Some(&JobError::Transport {
            status: Some(500),
            message: "Server error: 500".into(),
            body: Some(json!({ "message": "internal error" })),
        })
    );
    assert_eq!(mailbox.take().unwrap(), None);
    assert_eq!(recorder.navigations(), 0);
    assert!(recorder.last_view().unwrap().can_retry);
}

#[tokio::test(start_paused = true)]
async fn repeated_options_are_selected_once() {
    let submitter = ScriptedSubmitter::with_steps(Vec::new());
    let (mut driver, _mailbox, _recorder) = build(JobProfile::content(), submitter.clone());

    driver.submit(URL, &["blog", "blog"]);

    assert_eq!(driver.phase(), ControllerPhase::Running);
    // Let the spawned submission record what it was sent.
    tokio::task::yield_now().await;
    assert_eq!(
        submitter.requests(),
        vec![JobRequest::new(URL, ["blog"]).unwrap()]
    );
}

#[tokio::test(start_paused = true)]
async fn submitting_again_after_cancel_keeps_the_selection() {
    let submitter = ScriptedSubmitter::with_steps(Vec::new());
    let (mut driver, _mailbox, _recorder) = build(JobProfile::content(), submitter.clone());
    let (cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();

    driver.submit(URL, &["blog"]);
    cancel_tx.send(()).unwrap();
    driver.run_until_settled(&mut cancel_rx).await;
    assert_eq!(driver.phase(), ControllerPhase::Cancelled);

    driver.submit(URL, &["blog"]);
    assert_eq!(driver.phase(), ControllerPhase::Running);
    assert_eq!(driver.state().execution().unwrap().id(), 2);
    assert_eq!(driver.state().last_error(), None);

    // A different selection replaces the old one rather than adding to it.
    driver.dispatch(Msg::CancelClicked);
    driver.submit(URL, &["x_post"]);
    assert_eq!(
        driver.state().last_request(),
        Some(&JobRequest::new(URL, ["x_post"]).unwrap())
    );
}
