use crate::engine::{ActivityEntry, SubjectEdit, Tracker};
use crate::errors::{AppError, TrackerError};
use crate::metrics::{advice, subject_metrics, summarize};
use crate::models::{
    AddSubjectForm, AddSubjectRequest, DashboardResponse, Direction, EditSubjectRequest,
    MoveRequest, SubjectId, SubjectView, TargetRequest,
};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let tracker = state.tracker.lock().await;
    Html(render_index(&dashboard(&tracker)))
}

pub async fn list_subjects(State(state): State<AppState>) -> Json<DashboardResponse> {
    let tracker = state.tracker.lock().await;
    Json(dashboard(&tracker))
}

pub async fn get_history(State(state): State<AppState>) -> Json<Vec<ActivityEntry>> {
    let tracker = state.tracker.lock().await;
    Json(tracker.activity())
}

pub async fn add_subject(
    State(state): State<AppState>,
    Json(payload): Json<AddSubjectRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    let target = payload.target.unwrap_or(state.default_target);
    let response = apply(&state, |tracker| {
        tracker.add_subject(&payload.name, target).map(|_| true)
    })
    .await?;
    Ok(Json(response))
}

pub async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DashboardResponse>, AppError> {
    let id = SubjectId::from(id);
    let response = apply(&state, |tracker| Ok(tracker.delete_subject(&id))).await?;
    Ok(Json(response))
}

pub async fn mark_present(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DashboardResponse>, AppError> {
    subject_action(&state, SubjectId::from(id), "present").await.map(Json)
}

pub async fn mark_absent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DashboardResponse>, AppError> {
    subject_action(&state, SubjectId::from(id), "absent").await.map(Json)
}

pub async fn undo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DashboardResponse>, AppError> {
    subject_action(&state, SubjectId::from(id), "undo").await.map(Json)
}

pub async fn edit_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<EditSubjectRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    let id = SubjectId::from(id);
    let edit = SubjectEdit {
        name: payload.name,
        attended: payload.attended,
        total: payload.total,
    };
    let response = apply(&state, |tracker| tracker.edit_subject(&id, edit)).await?;
    Ok(Json(response))
}

pub async fn set_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<TargetRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    let id = SubjectId::from(id);
    let response = apply(&state, |tracker| tracker.set_target(&id, payload.target)).await?;
    Ok(Json(response))
}

pub async fn move_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MoveRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    let id = SubjectId::from(id);
    let response = apply(&state, |tracker| Ok(tracker.reorder(&id, payload.direction))).await?;
    Ok(Json(response))
}

pub async fn add_subject_form(
    State(state): State<AppState>,
    Form(form): Form<AddSubjectForm>,
) -> Result<Redirect, AppError> {
    let target = match form.target.trim() {
        "" => state.default_target,
        raw => raw
            .parse::<f64>()
            .map_err(|_| AppError::bad_request("target must be a number"))?,
    };
    apply(&state, |tracker| tracker.add_subject(&form.name, target).map(|_| true)).await?;
    Ok(Redirect::to("/"))
}

pub async fn subject_action_form(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
) -> Result<Redirect, AppError> {
    subject_action(&state, SubjectId::from(id), action.trim()).await?;
    Ok(Redirect::to("/"))
}

async fn subject_action(
    state: &AppState,
    id: SubjectId,
    action: &str,
) -> Result<DashboardResponse, AppError> {
    let action = SubjectAction::parse(action).ok_or_else(|| {
        AppError::bad_request("action must be one of present, absent, undo, delete, up, down")
    })?;
    apply(state, |tracker| Ok(action.run(tracker, &id))).await
}

#[derive(Debug, Clone, Copy)]
enum SubjectAction {
    Present,
    Absent,
    Undo,
    Delete,
    Move(Direction),
}

impl SubjectAction {
    fn parse(action: &str) -> Option<Self> {
        match action {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            "undo" => Some(Self::Undo),
            "delete" => Some(Self::Delete),
            "up" => Some(Self::Move(Direction::Up)),
            "down" => Some(Self::Move(Direction::Down)),
            _ => None,
        }
    }

    fn run(self, tracker: &mut Tracker, id: &SubjectId) -> bool {
        match self {
            Self::Present => tracker.mark_present(id),
            Self::Absent => tracker.mark_absent(id),
            Self::Undo => tracker.undo_last_action(id).is_some(),
            Self::Delete => tracker.delete_subject(id),
            Self::Move(direction) => tracker.reorder(id, direction),
        }
    }
}

/// Runs one mutation under the lock and saves the collection when it changed.
async fn apply<F>(state: &AppState, mutate: F) -> Result<DashboardResponse, AppError>
where
    F: FnOnce(&mut Tracker) -> Result<bool, TrackerError>,
{
    let mut tracker = state.tracker.lock().await;
    let changed = mutate(&mut *tracker)?;
    if changed {
        state.store.save_or_log(tracker.subjects()).await;
    }
    Ok(dashboard(&tracker))
}

pub fn dashboard(tracker: &Tracker) -> DashboardResponse {
    let subjects = tracker
        .subjects()
        .iter()
        .map(|subject| {
            let metrics = subject_metrics(subject);
            SubjectView {
                id: subject.id.clone(),
                name: subject.name.clone(),
                attended_classes: subject.attended_classes,
                total_classes: subject.total_classes,
                target_percentage: subject.target_percentage,
                current_percentage: metrics.current_percentage,
                classes_needed: metrics.classes_needed,
                classes_can_skip: metrics.classes_can_skip,
                on_track: metrics.on_track,
                advice: advice(&metrics),
                can_undo: tracker.can_undo(&subject.id),
                history: subject.history.clone(),
            }
        })
        .collect();

    DashboardResponse {
        subjects,
        summary: summarize(tracker.subjects()),
    }
}
