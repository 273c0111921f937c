//! End-to-end flows through a scripted backend.
//!
//! - Scenario A: upload → analyze → render "Living Room" → refine
//! - Scenario B: render an unknown room → `RoomNotFound`, no calls
//! - Scenario C: two transient failures then success on analyze

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dwell_config::DwellConfig;
use dwell_core::DesignImage;
use dwell_genai::{
    GenAiError, GenerativeBackend, GenerativeRequest, GenerativeResponse, StructuredRequest,
};
use dwell_pipeline::{DesignSession, Pipeline, PipelineError, RefineOutcome};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::time::Instant;

enum Reply {
    Structured(Result<Value, GenAiError>),
    Generative(Result<GenerativeResponse, GenAiError>),
}

#[derive(Default)]
struct Recorder {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl Recorder {
    fn script(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn next(&self, prompt: &str) -> Option<Reply> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies.lock().unwrap().pop_front()
    }
}

impl GenerativeBackend for Recorder {
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<Value, GenAiError> {
        match self.next(&request.prompt) {
            Some(Reply::Structured(result)) => {
                let value = result?;
                dwell_genai::check_against_schema(&request.schema, &value)?;
                Ok(value)
            }
            _ => panic!("unexpected structured request"),
        }
    }

    async fn generate(&self, request: &GenerativeRequest) -> Result<GenerativeResponse, GenAiError> {
        match self.next(&request.prompt) {
            Some(Reply::Generative(result)) => result,
            _ => panic!("unexpected generative request"),
        }
    }
}

fn png(marker: u8) -> DesignImage {
    DesignImage::from_bytes(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, marker]).unwrap()
}

fn image_reply(marker: u8) -> Reply {
    Reply::Generative(Ok(GenerativeResponse {
        images: vec![png(marker)],
        texts: Vec::new(),
    }))
}

fn apartment() -> Value {
    json!({
        "elements": [
            {"id": "wall_01", "type": "wall", "position": {"x": 0, "y": 0},
             "dimensions": {"length": 1000, "width": 20}, "rotation": 0,
             "description": "North wall"},
            {"id": "door_01", "type": "door", "position": {"x": 500, "y": 480},
             "dimensions": {"length": 90, "width": 10}, "rotation": 90,
             "doorType": "sliding", "description": "Hall door"}
        ],
        "rooms": [
            {"id": "room_01", "name": "Living Room", "classification": "Living Room",
             "area": 30.2, "inferredCeilingHeight": 2.8,
             "connectivity": ["room_02"], "elements": ["wall_01", "door_01"]},
            {"id": "room_02", "name": "Bedroom", "classification": "Bedroom",
             "area": 14.0, "inferredCeilingHeight": 2.8,
             "connectivity": ["room_01"], "elements": ["door_01"]}
        ]
    })
}

fn pipeline(recorder: Recorder) -> Pipeline<Recorder> {
    Pipeline::new(recorder, &DwellConfig::default())
}

#[tokio::test]
async fn scenario_a_upload_render_refine() {
    let pipeline = pipeline(Recorder::script([
        Reply::Structured(Ok(apartment())),
        image_reply(1),
        image_reply(2),
    ]));

    let model = pipeline.analyze(&png(0)).await.unwrap();
    assert!(model.room_by_name("Living Room").is_some());

    let mut session =
        DesignSession::start(&pipeline, Arc::new(model), "Living Room", "Modern")
            .await
            .unwrap();
    let base = session.current().image.clone();

    let outcome = session
        .refine(&pipeline, "paint the walls blue")
        .await
        .unwrap();
    match outcome {
        RefineOutcome::Updated { version, .. } => {
            assert_eq!(version, 2);
            assert!(!session.current().image.same_bytes(&base));
        }
        RefineOutcome::Rejected { explanation } => assert!(!explanation.is_empty()),
    }
    assert_eq!(pipeline.backend().calls(), 3);
}

#[tokio::test]
async fn scenario_a_unchanged_image_is_rejected() {
    let pipeline = pipeline(Recorder::script([image_reply(1), image_reply(1)]));
    let model = serde_json::from_value(apartment()).unwrap();

    let mut session = DesignSession::start(&pipeline, Arc::new(model), "Living Room", "Modern")
        .await
        .unwrap();
    let err = session
        .refine(&pipeline, "paint the walls blue")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnchangedImage));
    assert_eq!(session.versions().len(), 1);
}

#[tokio::test]
async fn scenario_b_unknown_room() {
    let pipeline = pipeline(Recorder::default());
    let model = serde_json::from_value(apartment()).unwrap();

    let err = pipeline.render(&model, "Garage", "Modern").await.unwrap_err();
    assert!(matches!(err, PipelineError::RoomNotFound { ref room, .. } if room == "Garage"));
    assert_eq!(pipeline.backend().calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn scenario_c_recovers_after_two_transient_failures() {
    let pipeline = pipeline(Recorder::script([
        Reply::Structured(Err(GenAiError::RateLimited {
            retry_after_secs: 60,
        })),
        Reply::Structured(Err(GenAiError::Api {
            status: 500,
            message: "Internal error encountered.".into(),
        })),
        Reply::Structured(Ok(apartment())),
    ]));

    let start = Instant::now();
    let model = pipeline.analyze(&png(0)).await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_millis(3000));
    assert_eq!(pipeline.backend().calls(), 3);
    assert!(model.validate().is_ok());
    assert_eq!(model.rooms.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_surface_a_remedy() {
    let pipeline = pipeline(Recorder::script(
        (0..3).map(|_| Reply::Generative(Err(GenAiError::Other("429 Too Many Requests".into())))),
    ));
    let model = serde_json::from_value(apartment()).unwrap();

    let start = Instant::now();
    let err = pipeline.render(&model, "Bedroom", "Boho").await.unwrap_err();
    assert_eq!(start.elapsed(), Duration::from_millis(3000));

    let PipelineError::Generation(service) = err else {
        panic!("expected a generation error");
    };
    assert!(service.message.contains("wait a moment"));
    assert_eq!(service.attempts, 3);
}
