//! End-to-end checks against a real Postgres. Set `TEST_DATABASE_URL` to
//! run them; without it every test returns early.

mod common;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use pretty_assertions::assert_eq;
use serial_test::serial;
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use common::{app_with_pool, create_account, json_body, test_pool, TEST_PASSWORD};
use mada_academy::auth::{Role, UserSession};
use mada_academy::models::{
    CreateExerciseRequest, CreateFormationRequest, CreateModuleRequest, CreateNoteRequest,
    ExerciseType, FormationLevel, ReactRequest, ReviewSubmissionRequest, SendMessageRequest,
    SubmitExerciseRequest, UpdateFormationRequest, UpdateModuleRequest, UpdateNoteRequest,
    UploadForm, UploadedFile,
};
use mada_academy::services::{
    AdminService, CoachingService, CommunityService, CourseService, EnrollmentService,
    FormationService, MemoryStorage, MessageService, UserService,
};
use mada_academy::ApiError;

fn formations(pool: &PgPool) -> FormationService {
    FormationService::new(pool.clone(), Arc::new(MemoryStorage::new("tests/", 60)))
}

fn formation_request(title: &str) -> CreateFormationRequest {
    CreateFormationRequest {
        title: Some(title.to_string()),
        description: Some("Une formation de test".to_string()),
        category: Some("Tests".to_string()),
        level: Some(FormationLevel::Debutant),
        thumbnail: None,
    }
}

async fn published_formation(pool: &PgPool, trainer: &UserSession) -> Uuid {
    let service = formations(pool);
    let formation = service
        .create(trainer, formation_request("Formation publiée"))
        .await
        .unwrap();
    service.set_published(formation.id, true).await.unwrap();
    formation.id
}

async fn count(pool: &PgPool, table: &str, formation_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM {table} WHERE formation_id = $1"
    ))
    .bind(formation_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
#[serial]
async fn test_login_then_session_over_http() {
    let Some(pool) = test_pool().await else { return };
    let learner = create_account(&pool, Role::Apprenant).await;
    let app = app_with_pool(pool);

    let login = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "email": learner.email, "password": TEST_PASSWORD }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(login).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["user"]["role"], "APPRENANT");
    let token = body["accessToken"].as_str().unwrap().to_string();

    let session = Request::builder()
        .uri("/api/auth/session")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(session).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["email"], learner.email.as_str());

    let admin_stats = Request::builder()
        .uri("/api/admin/stats")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(admin_stats).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn test_wrong_password_is_unauthorized() {
    let Some(pool) = test_pool().await else { return };
    let learner = create_account(&pool, Role::Apprenant).await;

    let login = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "email": learner.email, "password": "mauvais-mot" }).to_string(),
        ))
        .unwrap();
    let response = app_with_pool(pool).oneshot(login).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_learner_cannot_create_formation() {
    let Some(pool) = test_pool().await else { return };
    let learner = create_account(&pool, Role::Apprenant).await;

    let result = formations(&pool)
        .create(&learner, formation_request("Interdite"))
        .await;

    assert_matches!(result, Err(ApiError::Forbidden(message)) if message == "Accès non autorisé");
}

#[tokio::test]
#[serial]
async fn test_only_creator_or_admin_updates_formation() {
    let Some(pool) = test_pool().await else { return };
    let owner = create_account(&pool, Role::FormateurAdmin).await;
    let other = create_account(&pool, Role::FormateurAdmin).await;
    let admin = create_account(&pool, Role::Admin).await;
    let service = formations(&pool);

    let formation = service
        .create(&owner, formation_request("Originale"))
        .await
        .unwrap();
    assert!(!formation.is_published);

    let rename = |title: &str| UpdateFormationRequest {
        title: Some(title.to_string()),
        ..Default::default()
    };

    let denied = service.update(&other, formation.id, rename("Volée")).await;
    assert_matches!(
        denied,
        Err(ApiError::Forbidden(message)) if message == "Vous ne pouvez modifier que vos propres formations"
    );

    let updated = service
        .update(&admin, formation.id, rename("Renommée"))
        .await
        .unwrap();
    assert_eq!(updated.formation.title, "Renommée");
    assert_eq!(updated.formation.description, "Une formation de test");
}

#[tokio::test]
#[serial]
async fn test_enrollment_rules() {
    let Some(pool) = test_pool().await else { return };
    let trainer = create_account(&pool, Role::FormateurAdmin).await;
    let learner = create_account(&pool, Role::Apprenant).await;
    let enrollments = EnrollmentService::new(pool.clone());

    let draft = formations(&pool)
        .create(&trainer, formation_request("Brouillon"))
        .await
        .unwrap();
    assert_matches!(
        enrollments.enroll(&learner, draft.id).await,
        Err(ApiError::NotFound(_))
    );

    let formation_id = published_formation(&pool, &trainer).await;
    assert_matches!(
        enrollments.enroll(&trainer, formation_id).await,
        Err(ApiError::Forbidden(_))
    );

    enrollments.enroll(&learner, formation_id).await.unwrap();
    assert_matches!(
        enrollments.enroll(&learner, formation_id).await,
        Err(ApiError::BadRequest(message)) if message == "Vous êtes déjà inscrit à cette formation"
    );
    assert_eq!(count(&pool, "enrollments", formation_id).await, 1);

    let progressed = enrollments
        .update_progress(&learner, formation_id, Some(40))
        .await
        .unwrap();
    assert_eq!(progressed.progress, 40);
    assert_matches!(
        enrollments
            .update_progress(&learner, formation_id, Some(140))
            .await,
        Err(ApiError::BadRequest(_))
    );
}

#[tokio::test]
#[serial]
async fn test_publish_toggle_is_idempotent() {
    let Some(pool) = test_pool().await else { return };
    let trainer = create_account(&pool, Role::FormateurAdmin).await;
    let service = formations(&pool);
    let formation = service
        .create(&trainer, formation_request("Publication"))
        .await
        .unwrap();

    let first = service.set_published(formation.id, true).await.unwrap();
    let second = service.set_published(formation.id, true).await.unwrap();
    assert!(first.is_published);
    assert!(second.is_published);

    let hidden = service.set_published(formation.id, false).await.unwrap();
    assert!(!hidden.is_published);

    assert_matches!(
        service.set_published(Uuid::new_v4(), true).await,
        Err(ApiError::NotFound(_))
    );
}

#[tokio::test]
#[serial]
async fn test_resubmission_clears_review() {
    let Some(pool) = test_pool().await else { return };
    let trainer = create_account(&pool, Role::FormateurAdmin).await;
    let learner = create_account(&pool, Role::Apprenant).await;
    let courses = CourseService::new(pool.clone());
    let formation_id = published_formation(&pool, &trainer).await;

    let module = courses
        .create_module(
            &trainer,
            formation_id,
            CreateModuleRequest {
                title: Some("Introduction".to_string()),
                description: None,
                order: Some(1),
            },
        )
        .await
        .unwrap();
    let exercise = courses
        .create_exercise(
            &trainer,
            module.module.id,
            CreateExerciseRequest {
                title: Some("Première page".to_string()),
                description: Some("Écrire une page HTML".to_string()),
                exercise_type: Some(ExerciseType::Text),
                required: Some(true),
                order: Some(1),
            },
        )
        .await
        .unwrap();

    let submit = |content: &str| SubmitExerciseRequest {
        content: Some(content.to_string()),
    };

    let first = courses
        .submit(&learner, exercise.exercise.id, submit("<h1>Bonjour</h1>"))
        .await
        .unwrap();
    let reviewed = courses
        .review(
            &trainer,
            first.id,
            ReviewSubmissionRequest {
                is_approved: Some(true),
                feedback: Some(Some("Très bien".to_string())),
            },
        )
        .await
        .unwrap();
    assert!(reviewed.is_approved);
    assert_eq!(reviewed.feedback.as_deref(), Some("Très bien"));

    let second = courses
        .submit(&learner, exercise.exercise.id, submit("<h1>Salut</h1>"))
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.content, "<h1>Salut</h1>");
    assert!(!second.is_approved);
    assert_eq!(second.feedback, None);

    assert_matches!(
        courses
            .review(&learner, first.id, ReviewSubmissionRequest::default())
            .await,
        Err(ApiError::Forbidden(_))
    );
}

#[tokio::test]
#[serial]
async fn test_deleting_formation_removes_its_content() {
    let Some(pool) = test_pool().await else { return };
    let trainer = create_account(&pool, Role::FormateurAdmin).await;
    let learner = create_account(&pool, Role::Apprenant).await;
    let formation_id = published_formation(&pool, &trainer).await;

    EnrollmentService::new(pool.clone())
        .enroll(&learner, formation_id)
        .await
        .unwrap();
    CourseService::new(pool.clone())
        .create_module(
            &trainer,
            formation_id,
            CreateModuleRequest {
                title: Some("Module".to_string()),
                description: None,
                order: None,
            },
        )
        .await
        .unwrap();

    let service = formations(&pool);
    assert_matches!(
        service.delete(&learner, formation_id).await,
        Err(ApiError::Forbidden(_))
    );
    service.delete(&trainer, formation_id).await.unwrap();

    assert_eq!(count(&pool, "modules", formation_id).await, 0);
    assert_eq!(count(&pool, "enrollments", formation_id).await, 0);
    assert_matches!(
        service.get_detail(formation_id).await,
        Err(ApiError::NotFound(_))
    );
}

#[tokio::test]
#[serial]
async fn test_reacting_twice_replaces_the_reaction() {
    let Some(pool) = test_pool().await else { return };
    let author = create_account(&pool, Role::Apprenant).await;
    let reader = create_account(&pool, Role::Apprenant).await;
    let community = CommunityService::new(pool.clone());

    let post = community
        .create_post(
            &author,
            mada_academy::models::CreatePostRequest {
                content: Some("Bonjour la communauté".to_string()),
            },
        )
        .await
        .unwrap();

    let react = |kind: &str| ReactRequest {
        reaction_type: Some(kind.to_string()),
    };
    community.react(&reader, post.post.id, react("LIKE")).await.unwrap();
    let changed = community.react(&reader, post.post.id, react("LOVE")).await.unwrap();
    assert_eq!(changed.reaction_type, mada_academy::models::ReactionType::Love);

    let reactions = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reactions WHERE post_id = $1")
        .bind(post.post.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reactions, 1);

    assert_matches!(
        community.react(&reader, post.post.id, react("ANGRY")).await,
        Err(ApiError::BadRequest(_))
    );

    community.remove_reaction(&reader, post.post.id).await.unwrap();
    assert_matches!(
        community.remove_reaction(&reader, post.post.id).await,
        Err(ApiError::NotFound(_))
    );

    assert_matches!(
        community.delete_post(&reader, post.post.id).await,
        Err(ApiError::Forbidden(_))
    );
}

#[tokio::test]
#[serial]
async fn test_thread_marks_incoming_messages_read() {
    let Some(pool) = test_pool().await else { return };
    let learner = create_account(&pool, Role::Apprenant).await;
    let trainer = create_account(&pool, Role::FormateurAdmin).await;
    let messages = MessageService::new(pool.clone());

    messages
        .send(
            &learner,
            SendMessageRequest {
                receiver_id: Some(trainer.user_id),
                content: Some("Une question sur le module 2".to_string()),
            },
        )
        .await
        .unwrap();

    let inbox = messages.conversations(&trainer).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].other_user.id, learner.user_id);
    assert_eq!(inbox[0].unread_count, 1);

    let thread = messages.thread(&trainer, learner.user_id).await.unwrap();
    assert_eq!(thread.len(), 1);

    let inbox = messages.conversations(&trainer).await.unwrap();
    assert_eq!(inbox[0].unread_count, 0);

    assert_matches!(
        messages
            .send(
                &learner,
                SendMessageRequest {
                    receiver_id: Some(Uuid::new_v4()),
                    content: Some("Personne ?".to_string()),
                },
            )
            .await,
        Err(ApiError::NotFound(_))
    );
}

#[tokio::test]
#[serial]
async fn test_learners_only_see_visible_notes() {
    let Some(pool) = test_pool().await else { return };
    let coach = create_account(&pool, Role::FormateurAdmin).await;
    let learner = create_account(&pool, Role::Apprenant).await;
    let coaching = CoachingService::new(pool.clone());

    for (title, is_visible) in [("Bilan", true), ("Notes privées", false)] {
        coaching
            .create(
                &coach,
                CreateNoteRequest {
                    client_id: Some(learner.user_id),
                    title: Some(title.to_string()),
                    content: Some("Contenu".to_string()),
                    is_visible: Some(is_visible),
                },
            )
            .await
            .unwrap();
    }

    let authored = coaching.list(&coach, Some(learner.user_id)).await.unwrap();
    assert_eq!(authored.len(), 2);

    let visible = coaching.visible_notes_for(learner.user_id, None).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].note.title, "Bilan");
    assert_eq!(visible[0].coach.id, coach.user_id);
}

#[tokio::test]
#[serial]
async fn test_protected_admin_cannot_be_deleted() {
    let Some(pool) = test_pool().await else { return };
    let admin = create_account(&pool, Role::Admin).await;
    let learner = create_account(&pool, Role::Apprenant).await;
    let service = AdminService::new(pool.clone(), UserService::new(pool.clone()), admin.email.clone());

    assert_matches!(
        service.delete_user(admin.user_id).await,
        Err(ApiError::BadRequest(message))
            if message == "Impossible de supprimer le compte administrateur principal"
    );

    service.delete_user(learner.user_id).await.unwrap();
    assert_matches!(
        service.delete_user(learner.user_id).await,
        Err(ApiError::NotFound(_))
    );
}

async fn login(app: &axum::Router, email: &str) -> serde_json::Value {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "email": email, "password": TEST_PASSWORD }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

fn with_bearer(method: Method, uri: &str, token: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap()
}

#[tokio::test]
#[serial]
async fn test_logout_ends_every_token_of_the_session() {
    let Some(pool) = test_pool().await else { return };
    let learner = create_account(&pool, Role::Apprenant).await;
    let app = app_with_pool(pool);

    let tokens = login(&app, &learner.email).await;
    let access = tokens["accessToken"].as_str().unwrap().to_string();
    let refresh = tokens["refreshToken"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(with_bearer(Method::GET, "/api/auth/session", &refresh, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(with_bearer(Method::POST, "/api/auth/logout", &access, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let post = serde_json::json!({ "content": "Toujours là ?" }).to_string();
    for (token, method, uri, body) in [
        (&access, Method::GET, "/api/auth/session", Body::empty()),
        (&refresh, Method::GET, "/api/auth/session", Body::empty()),
        (&refresh, Method::POST, "/api/community/posts", Body::from(post)),
    ] {
        let response = app
            .clone()
            .oneshot(with_bearer(method, uri, token, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let refresh_request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/refresh")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "refreshToken": refresh }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(refresh_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_refresh_issues_a_working_access_token() {
    let Some(pool) = test_pool().await else { return };
    let trainer = create_account(&pool, Role::FormateurAdmin).await;
    let app = app_with_pool(pool);

    let tokens = login(&app, &trainer.email).await;
    let refresh_request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/refresh")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "refreshToken": tokens["refreshToken"] }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(refresh_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let access = json_body(response).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(with_bearer(Method::GET, "/api/auth/session", &access, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn test_deleted_account_token_is_unauthorized() {
    let Some(pool) = test_pool().await else { return };
    let learner = create_account(&pool, Role::Apprenant).await;
    let app = app_with_pool(pool.clone());

    let tokens = login(&app, &learner.email).await;
    let access = tokens["accessToken"].as_str().unwrap().to_string();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(learner.user_id)
        .execute(&pool)
        .await
        .unwrap();

    let post = serde_json::json!({ "content": "Fantôme" }).to_string();
    let response = app
        .oneshot(with_bearer(
            Method::POST,
            "/api/community/posts",
            &access,
            Body::from(post),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Session invalide");
}

#[tokio::test]
#[serial]
async fn test_coaching_notes_belong_to_their_author() {
    let Some(pool) = test_pool().await else { return };
    let coach = create_account(&pool, Role::FormateurAdmin).await;
    let other_coach = create_account(&pool, Role::FormateurAdmin).await;
    let admin = create_account(&pool, Role::Admin).await;
    let learner = create_account(&pool, Role::Apprenant).await;
    let coaching = CoachingService::new(pool.clone());

    let note = coaching
        .create(
            &coach,
            CreateNoteRequest {
                client_id: Some(learner.user_id),
                title: Some("Bilan".to_string()),
                content: Some("Contenu".to_string()),
                is_visible: None,
            },
        )
        .await
        .unwrap();
    let note_id = note.note.id;

    let retitle = || UpdateNoteRequest {
        title: Some("Réécrit".to_string()),
        ..Default::default()
    };
    for intruder in [&other_coach, &admin, &learner] {
        assert_matches!(
            coaching.update(intruder, note_id, retitle()).await,
            Err(ApiError::Forbidden(_))
        );
        assert_matches!(
            coaching.delete(intruder, note_id).await,
            Err(ApiError::Forbidden(_))
        );
    }

    let updated = coaching.update(&coach, note_id, retitle()).await.unwrap();
    assert_eq!(updated.note.title, "Réécrit");
    assert_eq!(updated.client.id, learner.user_id);

    let json = serde_json::to_value(&updated).unwrap();
    assert_eq!(json["client"]["id"], learner.user_id.to_string());
    assert_eq!(json["isVisible"], true);

    coaching.delete(&coach, note_id).await.unwrap();
    assert_matches!(
        coaching.delete(&coach, note_id).await,
        Err(ApiError::NotFound(_))
    );
}

#[tokio::test]
#[serial]
async fn test_course_content_is_managed_by_its_formation_owner() {
    let Some(pool) = test_pool().await else { return };
    let owner = create_account(&pool, Role::FormateurAdmin).await;
    let other = create_account(&pool, Role::FormateurAdmin).await;
    let learner = create_account(&pool, Role::Apprenant).await;
    let courses = CourseService::new(pool.clone());
    let formation_id = published_formation(&pool, &owner).await;

    let module_request = || CreateModuleRequest {
        title: Some("Module".to_string()),
        description: None,
        order: None,
    };
    assert_matches!(
        courses.create_module(&other, formation_id, module_request()).await,
        Err(ApiError::Forbidden(_))
    );
    let module_id = courses
        .create_module(&owner, formation_id, module_request())
        .await
        .unwrap()
        .module
        .id;

    assert_matches!(
        courses
            .update_module(&other, module_id, UpdateModuleRequest::default())
            .await,
        Err(ApiError::Forbidden(_))
    );
    assert_matches!(
        courses.delete_module(&other, module_id).await,
        Err(ApiError::Forbidden(_))
    );

    let exercise_request = || CreateExerciseRequest {
        title: Some("Exercice".to_string()),
        description: Some("Consigne".to_string()),
        exercise_type: Some(ExerciseType::Text),
        required: None,
        order: None,
    };
    assert_matches!(
        courses.create_exercise(&other, module_id, exercise_request()).await,
        Err(ApiError::Forbidden(_))
    );
    let exercise_id = courses
        .create_exercise(&owner, module_id, exercise_request())
        .await
        .unwrap()
        .exercise
        .id;

    let submission = courses
        .submit(
            &learner,
            exercise_id,
            SubmitExerciseRequest {
                content: Some("Réponse".to_string()),
            },
        )
        .await
        .unwrap();
    assert_matches!(
        courses
            .review(
                &other,
                submission.id,
                ReviewSubmissionRequest {
                    is_approved: Some(true),
                    feedback: None,
                },
            )
            .await,
        Err(ApiError::Forbidden(_))
    );

    assert_matches!(
        courses.delete_exercise(&other, exercise_id).await,
        Err(ApiError::Forbidden(_))
    );
    courses.delete_exercise(&owner, exercise_id).await.unwrap();
    courses.delete_module(&owner, module_id).await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_deleting_formation_removes_stored_files_after_commit() {
    let Some(pool) = test_pool().await else { return };
    let owner = create_account(&pool, Role::FormateurAdmin).await;
    let other = create_account(&pool, Role::FormateurAdmin).await;
    let storage = Arc::new(MemoryStorage::new("tests/", 60));
    let service = FormationService::new(pool.clone(), storage.clone());

    let formation = service
        .create(&owner, formation_request("Avec fichiers"))
        .await
        .unwrap();
    let file = service
        .upload_file(
            &owner,
            formation.id,
            UploadForm {
                title: Some("Support".to_string()),
                order: None,
                file: Some(UploadedFile {
                    filename: "support.pdf".to_string(),
                    content_type: "application/pdf".to_string(),
                    data: bytes::Bytes::from_static(b"%PDF-1.4"),
                }),
            },
        )
        .await
        .unwrap();
    assert!(storage.get(&file.cloud_storage_path).is_some());

    assert_matches!(
        service.delete(&other, formation.id).await,
        Err(ApiError::Forbidden(_))
    );
    assert!(storage.get(&file.cloud_storage_path).is_some());
    assert_matches!(
        service.delete(&owner, Uuid::new_v4()).await,
        Err(ApiError::NotFound(_))
    );

    service.delete(&owner, formation.id).await.unwrap();

    assert_eq!(count(&pool, "formation_files", formation.id).await, 0);
    assert!(storage.get(&file.cloud_storage_path).is_none());
    assert!(storage.is_empty());
}
