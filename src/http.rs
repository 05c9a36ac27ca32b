use crate::backend::FitnessBackend;
use crate::confirmation::{confirm_booking, ConfirmOutcome};
use crate::error::ConfirmError;
use crate::schedule::{open_schedule, toggle_slot, trainer_schedule, ScheduleDay};
use crate::types::{Slot, TrainerId, TrainerSelection};
use crate::AppState;
use axum::extract::{Path, Query};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Response;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotRequest {
    trainer_id: TrainerId,
    time_slot: Slot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RemoveSlotsRequest {
    trainer_id: TrainerId,
    time_slots: Vec<Slot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TrainerRequest {
    trainer_id: TrainerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenScheduleRequest {
    trainer_id: TrainerId,
    from: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScheduleQuery {
    from: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OutcomeResponse<T> {
    outcome: T,
}

pub fn create_app<T: FitnessBackend>(state: AppState<T>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let selections: Router<AppState<T>> = Router::new()
        .route("/selections", get(get_selections::<T>))
        .route("/selections/events", get(selection_events::<T>))
        .route("/select", post(select_slot::<T>))
        .route("/toggle", post(toggle::<T>))
        .route("/remove", post(remove_slots::<T>))
        .route("/clear", post(clear_trainer_selection::<T>))
        .route("/reconcile", post(reconcile::<T>))
        .route("/sign_out", post(sign_out::<T>));

    let booking: Router<AppState<T>> = Router::new()
        .route("/schedule/open", post(open_trainer_schedule::<T>))
        .route("/schedule/:trainer_id", get(get_schedule::<T>))
        .route("/confirm", post(confirm::<T>));

    Router::new()
        .merge(selections)
        .merge(booking)
        .with_state(state)
        .layer(cors)
}

async fn get_selections<T: FitnessBackend>(State(state): State<AppState<T>>) -> impl IntoResponse {
    Json(state.store.selections())
}

async fn selection_events<T: FitnessBackend>(
    State(state): State<AppState<T>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = state
        .store
        .subscribe()
        .map(|selections| Event::default().event("selections").json_data(selections));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn select_slot<T: FitnessBackend>(
    State(state): State<AppState<T>>,
    Json(request): Json<SlotRequest>,
) -> impl IntoResponse {
    let outcome = state.store.add_slot(request.time_slot, request.trainer_id);
    Json(OutcomeResponse { outcome })
}

async fn toggle<T: FitnessBackend>(
    State(state): State<AppState<T>>,
    Json(request): Json<SlotRequest>,
) -> impl IntoResponse {
    let outcome = toggle_slot(&state.store, request.time_slot, request.trainer_id);
    Json(OutcomeResponse { outcome })
}

async fn remove_slots<T: FitnessBackend>(
    State(state): State<AppState<T>>,
    Json(request): Json<RemoveSlotsRequest>,
) -> impl IntoResponse {
    state
        .store
        .remove_slots(&request.time_slots, request.trainer_id);
    (StatusCode::OK, "Slots removed successfully".to_string())
}

async fn clear_trainer_selection<T: FitnessBackend>(
    State(state): State<AppState<T>>,
    Json(request): Json<TrainerRequest>,
) -> impl IntoResponse {
    state.store.clear_trainer_selection(request.trainer_id);
    (StatusCode::OK, "Selection cleared successfully".to_string())
}

async fn reconcile<T: FitnessBackend>(State(state): State<AppState<T>>) -> Json<Vec<TrainerSelection>> {
    Json(state.store.reconcile())
}

async fn sign_out<T: FitnessBackend>(State(state): State<AppState<T>>) -> impl IntoResponse {
    state.store.clear_all();
    (StatusCode::OK, "Signed out successfully".to_string())
}

async fn get_schedule<T: FitnessBackend>(
    State(state): State<AppState<T>>,
    Path(trainer_id): Path<TrainerId>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Vec<ScheduleDay>>, (StatusCode, String)> {
    let from = query.from.unwrap_or_else(|| state.store.now().date());
    trainer_schedule(&state.store, &state.backend, trainer_id, from, state.schedule_days)
        .await
        .map(Json)
        .map_err(|err| {
            error!(?err, trainer_id, "Failed to load trainer schedule");
            (StatusCode::BAD_GATEWAY, err.to_string())
        })
}

async fn open_trainer_schedule<T: FitnessBackend>(
    State(state): State<AppState<T>>,
    Json(request): Json<OpenScheduleRequest>,
) -> Result<Json<Vec<ScheduleDay>>, (StatusCode, String)> {
    let from = request.from.unwrap_or_else(|| state.store.now().date());
    open_schedule(
        &state.store,
        &state.backend,
        request.trainer_id,
        from,
        state.schedule_days,
    )
    .await
    .map(Json)
    .map_err(|err| {
        error!(?err, trainer_id = request.trainer_id, "Failed to open trainer schedule");
        (StatusCode::BAD_GATEWAY, err.to_string())
    })
}

async fn confirm<T: FitnessBackend>(
    State(state): State<AppState<T>>,
    Json(request): Json<TrainerRequest>,
) -> Response {
    match confirm_booking(&state.store, &state.backend, request.trainer_id).await {
        Ok(outcome @ ConfirmOutcome::Confirmed { .. }) => (StatusCode::OK, Json(outcome)).into_response(),
        Ok(outcome @ ConfirmOutcome::Rejected { .. }) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(outcome)).into_response()
        }
        Err(err @ ConfirmError::NothingSelected(_)) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err @ ConfirmError::Backend(_)) => (StatusCode::BAD_GATEWAY, err.to_string()).into_response(),
    }
}
