use axum::extract::FromRef;
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::{AuthService, JwtService};
use crate::config::AppConfig;
use crate::services::{
    AdminService, CoachingService, CommunityService, CourseService, DashboardService,
    EnrollmentService, FormationService, MessageService, ObjectStorage, UserService,
};

/// Shared state handed to every router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub formation_service: FormationService,
    pub enrollment_service: EnrollmentService,
    pub course_service: CourseService,
    pub community_service: CommunityService,
    pub message_service: MessageService,
    pub coaching_service: CoachingService,
    pub admin_service: AdminService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(db: PgPool, config: AppConfig, storage: Arc<dyn ObjectStorage>) -> Self {
        let jwt_service = JwtService::new(
            &config.jwt_secret,
            Duration::minutes(config.access_token_ttl_minutes),
            Duration::days(config.refresh_token_ttl_days),
        );
        let auth_service = AuthService::new(db.clone(), jwt_service);

        let user_service = UserService::new(db.clone());
        let enrollment_service = EnrollmentService::new(db.clone());
        let coaching_service = CoachingService::new(db.clone());

        Self {
            auth_service,
            formation_service: FormationService::new(db.clone(), storage),
            course_service: CourseService::new(db.clone()),
            community_service: CommunityService::new(db.clone()),
            message_service: MessageService::new(db.clone()),
            admin_service: AdminService::new(
                db.clone(),
                user_service.clone(),
                config.protected_admin_email.clone(),
            ),
            dashboard_service: DashboardService::new(
                db,
                enrollment_service.clone(),
                coaching_service.clone(),
            ),
            user_service,
            enrollment_service,
            coaching_service,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}
