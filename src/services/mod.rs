// Business logic services

pub mod admin_service;
pub mod coaching_service;
pub mod community_service;
pub mod course_service;
pub mod dashboard_service;
pub mod enrollment_service;
pub mod formation_service;
pub mod message_service;
pub mod storage;
pub mod user_service;

pub use admin_service::AdminService;
pub use coaching_service::CoachingService;
pub use community_service::CommunityService;
pub use course_service::CourseService;
pub use dashboard_service::DashboardService;
pub use enrollment_service::EnrollmentService;
pub use formation_service::FormationService;
pub use message_service::MessageService;
pub use storage::{build_storage, MemoryStorage, ObjectStorage, S3Storage};
pub use user_service::UserService;
