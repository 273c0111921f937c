//! Scripted in-memory backend for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use dwell_config::DwellConfig;
use dwell_core::DesignImage;
use dwell_genai::{
    GenAiError, GenerativeBackend, GenerativeRequest, GenerativeResponse, StructuredRequest,
};
use serde_json::{Value, json};

use crate::Pipeline;

/// Replays queued results in order and records every request.
///
/// Structured answers are checked against the request schema, like the
/// real adapter does.
#[derive(Default)]
pub struct ScriptedBackend {
    structured: Mutex<VecDeque<Result<Value, GenAiError>>>,
    generative: Mutex<VecDeque<Result<GenerativeResponse, GenAiError>>>,
    structured_calls: Mutex<Vec<StructuredRequest>>,
    generative_calls: Mutex<Vec<GenerativeRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_structured(&self, result: Result<Value, GenAiError>) -> &Self {
        self.structured.lock().unwrap().push_back(result);
        self
    }

    pub fn push_generative(&self, result: Result<GenerativeResponse, GenAiError>) -> &Self {
        self.generative.lock().unwrap().push_back(result);
        self
    }

    pub fn push_image(&self, image: DesignImage) -> &Self {
        self.push_generative(Ok(GenerativeResponse {
            images: vec![image],
            texts: Vec::new(),
        }))
    }

    pub fn push_text(&self, text: &str) -> &Self {
        self.push_generative(Ok(GenerativeResponse {
            images: Vec::new(),
            texts: vec![text.to_string()],
        }))
    }

    pub fn structured_requests(&self) -> Vec<StructuredRequest> {
        self.structured_calls.lock().unwrap().clone()
    }

    pub fn generative_requests(&self) -> Vec<GenerativeRequest> {
        self.generative_calls.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.structured_calls.lock().unwrap().len() + self.generative_calls.lock().unwrap().len()
    }
}

impl GenerativeBackend for ScriptedBackend {
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<Value, GenAiError> {
        self.structured_calls.lock().unwrap().push(request.clone());
        let next = self
            .structured
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenAiError::Other("script exhausted".into())));
        let value = next?;
        dwell_genai::check_against_schema(&request.schema, &value)?;
        Ok(value)
    }

    async fn generate(&self, request: &GenerativeRequest) -> Result<GenerativeResponse, GenAiError> {
        self.generative_calls.lock().unwrap().push(request.clone());
        self.generative
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenAiError::Other("script exhausted".into())))
    }
}

pub fn pipeline() -> Pipeline<ScriptedBackend> {
    Pipeline::new(ScriptedBackend::new(), &DwellConfig::default())
}

/// A distinct fake PNG for each `n`.
pub fn image(n: u8) -> DesignImage {
    DesignImage::from_bytes(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, n]).unwrap()
}

pub fn server_error() -> GenAiError {
    GenAiError::Api {
        status: 500,
        message: "Internal error encountered.".into(),
    }
}

/// Two rooms joined by a door, in wire form.
pub fn floorplan_json() -> Value {
    json!({
        "elements": [
            {
                "id": "wall_01", "type": "wall",
                "position": {"x": 50, "y": 50},
                "dimensions": {"length": 900, "width": 15, "thickness": 15},
                "rotation": 0, "description": "North exterior wall"
            },
            {
                "id": "door_01", "type": "door",
                "position": {"x": 480, "y": 400},
                "dimensions": {"length": 80, "width": 10},
                "rotation": 90, "doorType": "swing",
                "doorSwingArc": {"start": 0, "end": 90},
                "description": "Kitchen door"
            },
            {
                "id": "window_01", "type": "window",
                "position": {"x": 200, "y": 50},
                "dimensions": {"length": 150, "width": 15},
                "rotation": 0, "windowSillHeight": 0.9,
                "description": "Living Room Window"
            }
        ],
        "rooms": [
            {
                "id": "room_01", "name": "Living Room", "classification": "Living Room",
                "area": 28.5, "inferredCeilingHeight": 2.8,
                "connectivity": ["room_02"], "adjacency": ["room_02"],
                "elements": ["wall_01", "door_01", "window_01"]
            },
            {
                "id": "room_02", "name": "Kitchen", "classification": "Kitchen",
                "area": 12.0, "inferredCeilingHeight": 2.8,
                "connectivity": ["room_01"], "adjacency": ["room_01"],
                "elements": ["door_01"]
            }
        ],
        "circulationPaths": [
            {"start": {"x": 480, "y": 400}, "end": {"x": 300, "y": 300}}
        ]
    })
}

pub fn floorplan() -> dwell_core::SpatialModel {
    serde_json::from_value(floorplan_json()).unwrap()
}
