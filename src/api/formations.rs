use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use super::state::AppState;
use crate::auth::{AuthUser, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    CreateFormationRequest, CreateModuleRequest, EnrollResponse, Enrollment, ExerciseWithCount,
    ExerciseWithSubmissions, Formation, FormationDetail, FormationFile, FormationQuery,
    FormationSummary, ModuleWithExercises, ProgressRequest, UpdateFormationRequest, UploadForm,
    UploadedFile,
};

type FormationPath = WithRejection<Path<Uuid>, ApiError>;

/// Catalog, enrollment, files and course outline, mounted at `/api/formations`.
pub fn formation_routes(state: AppState) -> Router {
    let max_upload_bytes = state.config.storage.max_upload_bytes;

    Router::new()
        .route("/", get(list_formations).post(create_formation))
        .route(
            "/:id",
            get(get_formation)
                .put(update_formation)
                .delete(delete_formation),
        )
        .route("/:id/enroll", post(enroll))
        .route("/:id/progress", put(update_progress))
        .route(
            "/:id/files",
            get(list_files)
                .post(upload_file)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/:id/modules", get(list_modules).post(create_module))
        .with_state(state)
}

#[tracing::instrument(skip(state))]
async fn list_formations(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<FormationQuery>, ApiError>,
) -> ApiResult<Json<Vec<FormationSummary>>> {
    let formations = state
        .formation_service
        .list(query.published_only())
        .await?;
    Ok(Json(formations))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn create_formation(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateFormationRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<Formation>)> {
    let formation = state.formation_service.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(formation)))
}

#[tracing::instrument(skip(state))]
async fn get_formation(
    State(state): State<AppState>,
    WithRejection(Path(id), _): FormationPath,
) -> ApiResult<Json<FormationDetail>> {
    let formation = state.formation_service.get_detail(id).await?;
    Ok(Json(formation))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn update_formation(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): FormationPath,
    WithRejection(Json(request), _): WithRejection<Json<UpdateFormationRequest>, ApiError>,
) -> ApiResult<Json<FormationDetail>> {
    let formation = state.formation_service.update(&user, id, request).await?;
    Ok(Json(formation))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn delete_formation(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): FormationPath,
) -> ApiResult<Json<MessageResponse>> {
    state.formation_service.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("Formation supprimée avec succès")))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn enroll(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): FormationPath,
) -> ApiResult<(StatusCode, Json<EnrollResponse>)> {
    let response = state.enrollment_service.enroll(&user, id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn update_progress(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): FormationPath,
    WithRejection(Json(request), _): WithRejection<Json<ProgressRequest>, ApiError>,
) -> ApiResult<Json<Enrollment>> {
    let enrollment = state
        .enrollment_service
        .update_progress(&user, id, request.progress)
        .await?;
    Ok(Json(enrollment))
}

#[tracing::instrument(skip(state))]
async fn list_files(
    State(state): State<AppState>,
    WithRejection(Path(id), _): FormationPath,
) -> ApiResult<Json<Vec<FormationFile>>> {
    let files = state.formation_service.list_files(id).await?;
    Ok(Json(files))
}

/// Multipart upload with `file`, `title` and optional `order` fields.
#[tracing::instrument(skip(state, user, multipart), fields(user_id = %user.user_id))]
async fn upload_file(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): FormationPath,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<FormationFile>)> {
    let form = read_upload_form(multipart).await?;
    let file = state.formation_service.upload_file(&user, id, form).await?;
    Ok((StatusCode::CREATED, Json(file)))
}

async fn read_upload_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let invalid = |err: axum::extract::multipart::MultipartError| {
        tracing::debug!(error = %err, "rejected multipart body");
        ApiError::bad_request("Formulaire d'upload invalide")
    };

    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        match field.name().unwrap_or_default() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(mime::APPLICATION_OCTET_STREAM.essence_str())
                    .to_string();
                let data = field.bytes().await.map_err(invalid)?;
                form.file = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            "title" => form.title = Some(field.text().await.map_err(invalid)?),
            "order" => form.order = Some(field.text().await.map_err(invalid)?),
            _ => {}
        }
    }

    Ok(form)
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn list_modules(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): FormationPath,
) -> ApiResult<Json<Vec<ModuleWithExercises<ExerciseWithSubmissions>>>> {
    let modules = state.course_service.list_modules(&user, id).await?;
    Ok(Json(modules))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn create_module(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): FormationPath,
    WithRejection(Json(request), _): WithRejection<Json<CreateModuleRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<ModuleWithExercises<ExerciseWithCount>>)> {
    let module = state.course_service.create_module(&user, id, request).await?;
    Ok((StatusCode::CREATED, Json(module)))
}
