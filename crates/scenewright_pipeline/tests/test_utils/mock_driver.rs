//! Mock generative driver for testing.

use async_trait::async_trait;
use scenewright_core::{GenerateRequest, GenerateResponse, ImageData, Output};
use scenewright_error::{GeminiError, GeminiErrorKind, ScenewrightResult};
use scenewright_interface::GenerativeDriver;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Thumbnail prompt of every screenplay the mock writes.
pub const THUMBNAIL_PROMPT: &str = "A green bottle glinting on a rocky shore at dusk";

/// What a request was asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Structured screenplay
    Script,
    /// Keyframe prompt for a scene
    Visual,
    /// Transition between two scenes
    Transition,
    /// Title card image
    Thumbnail,
    /// Keyframe or character image
    Image,
}

/// A request as received by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub kind: RequestKind,
    pub request: GenerateRequest,
}

impl RecordedRequest {
    /// The request's text parts joined together.
    pub fn text(&self) -> String {
        self.request.text_inputs().collect::<Vec<_>>().join("\n")
    }

    /// The request's image parts.
    pub fn images(&self) -> Vec<ImageData> {
        self.request.image_inputs().cloned().collect()
    }
}

/// An injected failure.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Fail with a provider error
    Error(GeminiErrorKind),
    /// Answer with text instead of an image
    NoImage,
}

/// Mock driver that answers every pipeline request deterministically.
///
/// Screenplays have `scene_count` scenes set at "LOCATION n"; visual prompts are
/// "Keyframe of LOCATION n"; images are unique per call.
pub struct MockDriver {
    scene_count: usize,
    script_override: Mutex<Option<String>>,
    text_overrides: Mutex<HashMap<RequestKind, String>>,
    failures: Mutex<HashMap<RequestKind, MockFailure>>,
    gates: Mutex<HashMap<RequestKind, Arc<Semaphore>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    text_in_flight: AtomicUsize,
    text_peak: AtomicUsize,
    image_counter: AtomicUsize,
    latency_ms: u64,
}

impl MockDriver {
    /// A mock whose screenplays have `scene_count` scenes.
    pub fn new(scene_count: usize) -> Self {
        Self {
            scene_count,
            script_override: Mutex::new(None),
            text_overrides: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            text_in_flight: AtomicUsize::new(0),
            text_peak: AtomicUsize::new(0),
            image_counter: AtomicUsize::new(0),
            latency_ms: 5,
        }
    }

    /// Answer script requests with this raw text instead.
    pub fn with_script_text(self, text: impl Into<String>) -> Self {
        *self.script_override.lock().unwrap() = Some(text.into());
        self
    }

    /// Answer requests of `kind` with this text.
    pub fn respond_with(&self, kind: RequestKind, text: impl Into<String>) {
        self.text_overrides.lock().unwrap().insert(kind, text.into());
    }

    /// Fail every request of `kind` until cleared.
    pub fn fail(&self, kind: RequestKind, failure: MockFailure) {
        self.failures.lock().unwrap().insert(kind, failure);
    }

    /// Stop failing requests of `kind`.
    pub fn clear_failure(&self, kind: RequestKind) {
        self.failures.lock().unwrap().remove(&kind);
    }

    /// Hold requests of `kind` until permits are added to the returned semaphore.
    pub fn gate(&self, kind: RequestKind) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(kind, gate.clone());
        gate
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests of one kind.
    pub fn requests_of(&self, kind: RequestKind) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|recorded| recorded.kind == kind)
            .collect()
    }

    /// Number of requests of one kind.
    pub fn count(&self, kind: RequestKind) -> usize {
        self.requests_of(kind).len()
    }

    /// Highest number of visual and transition requests in flight at once.
    pub fn peak_text_in_flight(&self) -> usize {
        self.text_peak.load(Ordering::SeqCst)
    }

    fn classify(request: &GenerateRequest) -> RequestKind {
        if request.wants_json() {
            RequestKind::Script
        } else if request.wants_image() {
            let text: Vec<&str> = request.text_inputs().collect();
            if text == [THUMBNAIL_PROMPT] && request.image_inputs().next().is_none() {
                RequestKind::Thumbnail
            } else {
                RequestKind::Image
            }
        } else if request.text_inputs().any(|text| text.contains("film editor")) {
            RequestKind::Transition
        } else {
            RequestKind::Visual
        }
    }

    fn settings_in(request: &GenerateRequest) -> Vec<String> {
        request
            .text_inputs()
            .flat_map(str::lines)
            .filter_map(|line| line.trim().strip_prefix("Setting: "))
            .map(str::to_string)
            .collect()
    }

    fn screenplay_json(&self) -> String {
        let scenes: Vec<_> = (1..=self.scene_count)
            .map(|n| {
                serde_json::json!({
                    "scene_number": n,
                    "setting": format!("LOCATION {n}"),
                    "action": format!("Something happens at location {n}."),
                    "dialogue_vo": if n == 1 { "KEEPER (V.O.): It always starts with the sea." } else { "" },
                })
            })
            .collect();
        serde_json::json!({
            "title": "The Bottle",
            "thumbnail_prompt": THUMBNAIL_PROMPT,
            "scenes": scenes,
        })
        .to_string()
    }

    fn respond(
        &self,
        kind: RequestKind,
        request: &GenerateRequest,
    ) -> ScenewrightResult<GenerateResponse> {
        let failure = self.failures.lock().unwrap().get(&kind).cloned();
        let image_request = matches!(kind, RequestKind::Thumbnail | RequestKind::Image);

        match failure {
            Some(MockFailure::Error(error)) => return Err(GeminiError::new(error).into()),
            Some(MockFailure::NoImage) if image_request => {
                return Ok(GenerateResponse {
                    outputs: vec![Output::Text("I can't draw that.".to_string())],
                });
            }
            _ => {}
        }

        if let Some(text) = self.text_overrides.lock().unwrap().get(&kind).cloned() {
            return Ok(GenerateResponse {
                outputs: vec![Output::Text(text)],
            });
        }

        let output = match kind {
            RequestKind::Script => Output::Text(
                self.script_override
                    .lock()
                    .unwrap()
                    .clone()
                    .unwrap_or_else(|| self.screenplay_json()),
            ),
            RequestKind::Visual => {
                let settings = Self::settings_in(request);
                Output::Text(format!("Keyframe of {}", settings.join(" / ")))
            }
            RequestKind::Transition => {
                let settings = Self::settings_in(request);
                let to = settings.last().cloned().unwrap_or_default();
                Output::Text(format!("MATCH CUT to {to}"))
            }
            RequestKind::Thumbnail | RequestKind::Image => {
                let n = self.image_counter.fetch_add(1, Ordering::SeqCst);
                Output::Image(ImageData::from_bytes("image/png", format!("image-{n}").as_bytes()))
            }
        };

        Ok(GenerateResponse {
            outputs: vec![output],
        })
    }
}

#[async_trait]
impl GenerativeDriver for MockDriver {
    async fn generate(&self, req: &GenerateRequest) -> ScenewrightResult<GenerateResponse> {
        let kind = Self::classify(req);
        self.requests.lock().unwrap().push(RecordedRequest {
            kind,
            request: req.clone(),
        });

        let text = matches!(kind, RequestKind::Visual | RequestKind::Transition);
        if text {
            let now = self.text_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.text_peak.fetch_max(now, Ordering::SeqCst);
        }

        let gate = self.gates.lock().unwrap().get(&kind).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(self.latency_ms)).await;

        if text {
            self.text_in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        self.respond(kind, req)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
