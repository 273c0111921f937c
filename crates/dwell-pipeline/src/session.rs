//! Design session: the per-room studio state.
//!
//! A session owns one room of one spatial model. It keeps an append-only
//! list of design versions (the current image is always the last), the
//! conversation with the assistant, the latest materials list, and the
//! versions picked as final designs for supplier handoff. Nothing is
//! persisted; the session lives as long as the value does.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dwell_core::{DesignImage, Material, SpatialModel};
use dwell_genai::GenerativeBackend;
use serde::Serialize;

use crate::error::PipelineError;
use crate::Pipeline;

/// How a version came to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum VersionOrigin {
    /// Initial render of the room.
    Render { style: String },
    /// Result of a conversational edit.
    Refinement { instruction: String },
    /// Copy of an earlier version made current again.
    Restore { from: usize },
}

/// One image in the session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignVersion {
    /// 1-based position in the history.
    pub number: usize,
    pub image: DesignImage,
    pub origin: VersionOrigin,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Assistant,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

/// What a refinement did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefineOutcome {
    /// A new version was appended.
    Updated {
        version: usize,
        note: Option<String>,
    },
    /// The change was refused; history is untouched.
    Rejected { explanation: String },
}

/// A selected design in a supplier request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedDesign {
    pub version: usize,
    pub image: DesignImage,
}

/// Payload handed to the supplier-routing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRequest {
    pub project_name: String,
    pub room: String,
    pub materials: Vec<Material>,
    pub designs: Vec<SelectedDesign>,
}

const WELCOME: &str = "Here is your initial design, matched to your floorplan. You can now \
    request changes to materials (\"make the floor hardwood\"), colors (\"paint wall_01 light \
    gray\") and furniture (\"change the sofa to a leather one\"). Structural changes (moving \
    walls, doors or windows) and the camera angle are locked.";

const UPDATED: &str = "Here is the updated design. What would you like to change next?";

/// Studio state for one room of one spatial model.
#[derive(Debug, Clone)]
pub struct DesignSession {
    model: Arc<SpatialModel>,
    room: String,
    style: String,
    /// Never empty after construction.
    versions: Vec<DesignVersion>,
    transcript: Vec<ChatMessage>,
    materials: Vec<Material>,
    selected: Vec<usize>,
    max_final_designs: usize,
}

impl DesignSession {
    /// Render `room` in `style` and open a session on the result.
    ///
    /// # Errors
    ///
    /// Any error from [`Pipeline::render`].
    pub async fn start<B: GenerativeBackend>(
        pipeline: &Pipeline<B>,
        model: Arc<SpatialModel>,
        room: &str,
        style: &str,
    ) -> Result<Self, PipelineError> {
        let image = pipeline.render(&model, room, style).await?;
        let mut session = Self {
            model,
            room: String::new(),
            style: style.to_string(),
            versions: Vec::new(),
            transcript: Vec::new(),
            materials: Vec::new(),
            selected: Vec::new(),
            max_final_designs: pipeline.studio().max_final_designs,
        };
        session.reset(room, image);
        Ok(session)
    }

    pub fn model(&self) -> &SpatialModel {
        &self.model
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    /// Every version in creation order.
    pub fn versions(&self) -> &[DesignVersion] {
        &self.versions
    }

    /// The latest version.
    pub fn current(&self) -> &DesignVersion {
        &self.versions[self.versions.len() - 1]
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Version numbers selected as final designs, in selection order.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Look up a version by its 1-based number.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::VersionNotFound`] if there is no such version.
    pub fn version(&self, number: usize) -> Result<&DesignVersion, PipelineError> {
        number
            .checked_sub(1)
            .and_then(|index| self.versions.get(index))
            .ok_or(PipelineError::VersionNotFound(number))
    }

    /// Ask for a change to the current design.
    ///
    /// The instruction and the assistant's answer (including failures) are
    /// recorded in the transcript. An accepted edit appends a version.
    ///
    /// # Errors
    ///
    /// Any error from [`Pipeline::refine`]; the session keeps its history.
    pub async fn refine<B: GenerativeBackend>(
        &mut self,
        pipeline: &Pipeline<B>,
        instruction: &str,
    ) -> Result<RefineOutcome, PipelineError> {
        self.say(Speaker::User, instruction);
        let base = self.current().image.clone();

        match pipeline.refine(instruction, &self.model, &base).await {
            Ok(refinement) => match refinement.image {
                Some(image) => {
                    let version = self.push_version(
                        image,
                        VersionOrigin::Refinement {
                            instruction: instruction.trim().to_string(),
                        },
                    );
                    let reply = refinement
                        .explanation
                        .as_ref()
                        .map_or_else(|| UPDATED.to_string(), |note| format!("{UPDATED}\n\n{note}"));
                    self.say(Speaker::Assistant, reply);
                    Ok(RefineOutcome::Updated {
                        version,
                        note: refinement.explanation,
                    })
                }
                None => {
                    let explanation = refinement.explanation.unwrap_or_default();
                    self.say(
                        Speaker::Assistant,
                        format!("I couldn't make that change: {explanation}"),
                    );
                    Ok(RefineOutcome::Rejected { explanation })
                }
            },
            Err(e) => {
                self.say(Speaker::Assistant, format!("Sorry, an error occurred: {e}"));
                Err(e)
            }
        }
    }

    /// Move the session to another room of the same model.
    ///
    /// The new room is rendered first; only on success are history,
    /// transcript, materials and selection reset.
    ///
    /// # Errors
    ///
    /// Any error from [`Pipeline::render`]; the session is left unchanged.
    pub async fn switch_room<B: GenerativeBackend>(
        &mut self,
        pipeline: &Pipeline<B>,
        room: &str,
    ) -> Result<(), PipelineError> {
        let image = pipeline.render(&self.model, room, &self.style).await?;
        tracing::debug!(from = %self.room, to = room, "switched room");
        self.reset(room, image);
        Ok(())
    }

    /// Make an earlier version current again by appending a copy of it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::VersionNotFound`] if there is no such version.
    pub fn restore_version(&mut self, number: usize) -> Result<&DesignVersion, PipelineError> {
        let image = self.version(number)?.image.clone();
        self.push_version(image, VersionOrigin::Restore { from: number });
        Ok(self.current())
    }

    /// Derive the materials list from the current design, replacing any
    /// previous list.
    ///
    /// # Errors
    ///
    /// Any error from [`Pipeline::extract_materials`]; the previous list is
    /// kept.
    pub async fn extract_materials<B: GenerativeBackend>(
        &mut self,
        pipeline: &Pipeline<B>,
    ) -> Result<&[Material], PipelineError> {
        let image = self.current().image.clone();
        self.materials = pipeline.extract_materials(&image).await?;
        Ok(&self.materials)
    }

    /// Select or deselect a version as a final design.
    ///
    /// Returns whether the version is selected afterwards.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::VersionNotFound`] if there is no such version
    /// - [`PipelineError::SelectionLimit`] if selecting would exceed the cap
    pub fn toggle_final(&mut self, number: usize) -> Result<bool, PipelineError> {
        self.version(number)?;
        if let Some(index) = self.selected.iter().position(|&n| n == number) {
            self.selected.remove(index);
            return Ok(false);
        }
        if self.selected.len() >= self.max_final_designs {
            return Err(PipelineError::SelectionLimit {
                max: self.max_final_designs,
            });
        }
        self.selected.push(number);
        Ok(true)
    }

    /// Build the supplier handoff from the materials and selected designs.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::IncompleteSupplierRequest`] without a
    /// materials list or without any selected design.
    pub fn supplier_request(&self, project_name: &str) -> Result<SupplierRequest, PipelineError> {
        if self.materials.is_empty() {
            return Err(PipelineError::IncompleteSupplierRequest(
                "generate a material list first".to_string(),
            ));
        }
        if self.selected.is_empty() {
            return Err(PipelineError::IncompleteSupplierRequest(
                "select at least one final design".to_string(),
            ));
        }
        let designs = self
            .selected
            .iter()
            .map(|&number| {
                self.version(number).map(|v| SelectedDesign {
                    version: v.number,
                    image: v.image.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SupplierRequest {
            project_name: project_name.to_string(),
            room: self.room.clone(),
            materials: self.materials.clone(),
            designs,
        })
    }

    fn reset(&mut self, room: &str, image: DesignImage) {
        self.room = room.to_string();
        self.versions.clear();
        self.transcript.clear();
        self.materials.clear();
        self.selected.clear();
        self.push_version(
            image,
            VersionOrigin::Render {
                style: self.style.clone(),
            },
        );
        self.say(Speaker::Assistant, WELCOME);
    }

    fn push_version(&mut self, image: DesignImage, origin: VersionOrigin) -> usize {
        let number = self.versions.len() + 1;
        self.versions.push(DesignVersion {
            number,
            image,
            origin,
            created_at: Utc::now(),
        });
        number
    }

    fn say(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.transcript.push(ChatMessage::new(speaker, text));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dwell_genai::GenAiError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::test_support::{ScriptedBackend, floorplan, image, pipeline};

    async fn started(pipeline: &Pipeline<ScriptedBackend>) -> DesignSession {
        pipeline.backend().push_image(image(1));
        DesignSession::start(pipeline, Arc::new(floorplan()), "Living Room", "Modern")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn start_creates_first_version() {
        let pipeline = pipeline();
        let session = started(&pipeline).await;
        assert_eq!(session.versions().len(), 1);
        assert_eq!(session.current().number, 1);
        assert_eq!(session.current().image, image(1));
        assert_eq!(session.room(), "Living Room");
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].speaker, Speaker::Assistant);
    }

    #[tokio::test]
    async fn history_grows_by_one_per_refinement() {
        let pipeline = pipeline();
        let mut session = started(&pipeline).await;

        for n in 2..=5 {
            pipeline.backend().push_image(image(n));
            let before: Vec<_> = session.versions().to_vec();
            let outcome = session.refine(&pipeline, "swap the rug").await.unwrap();
            assert_eq!(
                outcome,
                RefineOutcome::Updated {
                    version: usize::from(n),
                    note: None
                }
            );
            assert_eq!(&session.versions()[..before.len()], before.as_slice());
        }
        assert_eq!(session.versions().len(), 5);
        assert_eq!(session.current().image, image(5));

        // each refinement works on the previous image
        let requests = pipeline.backend().generative_requests();
        assert_eq!(requests[1].images, vec![image(1)]);
        assert_eq!(requests[4].images, vec![image(4)]);
    }

    #[tokio::test]
    async fn refusal_keeps_history() {
        let pipeline = pipeline();
        let mut session = started(&pipeline).await;
        pipeline.backend().push_text("Walls are structural.");

        let outcome = session.refine(&pipeline, "remove wall_01").await.unwrap();
        assert_eq!(
            outcome,
            RefineOutcome::Rejected {
                explanation: "Walls are structural.".into()
            }
        );
        assert_eq!(session.versions().len(), 1);
        let last = session.transcript().last().unwrap();
        assert_eq!(last.text, "I couldn't make that change: Walls are structural.");
    }

    #[tokio::test]
    async fn failures_are_reported_in_the_transcript() {
        let pipeline = pipeline();
        let mut session = started(&pipeline).await;
        pipeline.backend().push_generative(Err(GenAiError::Api {
            status: 400,
            message: "bad image".into(),
        }));

        let err = session.refine(&pipeline, "add a lamp").await.unwrap_err();
        assert!(matches!(err, PipelineError::Refinement(_)));
        assert_eq!(session.versions().len(), 1);
        let texts: Vec<_> = session.transcript().iter().map(|m| m.speaker).collect();
        assert_eq!(
            texts,
            vec![Speaker::Assistant, Speaker::User, Speaker::Assistant]
        );
        assert!(session.transcript()[2].text.starts_with("Sorry, an error occurred"));
    }

    #[tokio::test]
    async fn restore_appends_a_copy() {
        let pipeline = pipeline();
        let mut session = started(&pipeline).await;
        pipeline.backend().push_image(image(2));
        session.refine(&pipeline, "blue walls").await.unwrap();

        let restored = session.restore_version(1).unwrap();
        assert_eq!(restored.number, 3);
        assert_eq!(restored.image, image(1));
        assert_eq!(restored.origin, VersionOrigin::Restore { from: 1 });
        assert_eq!(session.versions()[1].image, image(2));
        assert!(matches!(
            session.restore_version(9),
            Err(PipelineError::VersionNotFound(9))
        ));
        assert!(session.restore_version(0).is_err());
    }

    #[tokio::test]
    async fn final_selection_toggles_and_caps() {
        let pipeline = pipeline();
        let mut session = started(&pipeline).await;
        for n in 2..=4 {
            pipeline.backend().push_image(image(n));
            session.refine(&pipeline, "tweak").await.unwrap();
        }

        assert!(session.toggle_final(1).unwrap());
        assert!(session.toggle_final(2).unwrap());
        assert!(session.toggle_final(3).unwrap());
        assert!(matches!(
            session.toggle_final(4),
            Err(PipelineError::SelectionLimit { max: 3 })
        ));
        assert!(!session.toggle_final(2).unwrap());
        assert!(session.toggle_final(4).unwrap());
        assert_eq!(session.selected(), &[1, 3, 4]);
        assert!(session.toggle_final(7).is_err());
    }

    #[tokio::test]
    async fn materials_are_replaced_not_merged() {
        let pipeline = pipeline();
        let mut session = started(&pipeline).await;
        pipeline.backend().push_structured(Ok(json!([
            {"name": "Paint", "description": "White", "quantity": 40, "unit": "sqm"},
            {"name": "Sofa", "description": "Grey", "quantity": 1, "unit": "items"}
        ])));
        pipeline.backend().push_structured(Ok(json!([
            {"name": "Tiles", "description": "Terracotta", "quantity": 12, "unit": "sqm"}
        ])));

        assert_eq!(session.extract_materials(&pipeline).await.unwrap().len(), 2);
        let second = session.extract_materials(&pipeline).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "Tiles");
    }

    #[tokio::test]
    async fn switch_room_resets_state() {
        let pipeline = pipeline();
        let mut session = started(&pipeline).await;
        pipeline.backend().push_image(image(2));
        session.refine(&pipeline, "green sofa").await.unwrap();
        session.toggle_final(2).unwrap();

        pipeline.backend().push_image(image(9));
        session.switch_room(&pipeline, "Kitchen").await.unwrap();
        assert_eq!(session.room(), "Kitchen");
        assert_eq!(session.versions().len(), 1);
        assert_eq!(session.current().image, image(9));
        assert!(session.selected().is_empty());
        assert!(session.materials().is_empty());
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn failed_switch_leaves_session_alone() {
        let pipeline = pipeline();
        let mut session = started(&pipeline).await;
        let err = session.switch_room(&pipeline, "Garage").await.unwrap_err();
        assert!(matches!(err, PipelineError::RoomNotFound { .. }));
        assert_eq!(session.room(), "Living Room");
        assert_eq!(session.versions().len(), 1);
    }

    #[tokio::test]
    async fn supplier_request_needs_materials_and_selection() {
        let pipeline = pipeline();
        let mut session = started(&pipeline).await;
        assert!(matches!(
            session.supplier_request("Flat 4B"),
            Err(PipelineError::IncompleteSupplierRequest(_))
        ));

        pipeline.backend().push_structured(Ok(json!([
            {"name": "Paint", "description": "White", "quantity": 40, "unit": "sqm"}
        ])));
        session.extract_materials(&pipeline).await.unwrap();
        assert!(session.supplier_request("Flat 4B").is_err());

        session.toggle_final(1).unwrap();
        let request = session.supplier_request("Flat 4B").unwrap();
        assert_eq!(request.designs.len(), 1);
        assert_eq!(request.designs[0].image, image(1));

        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["projectName"], "Flat 4B");
        assert_eq!(wire["materials"][0]["unit"], "sqm");
    }
}
