use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{ClientType, Role};
use crate::models::{ExerciseType, FormationLevel, NewUser, ReactionType};
use crate::services::UserService;

struct DemoAccount {
    email: &'static str,
    password: &'static str,
    full_name: &'static str,
    role: Role,
    client_type: Option<ClientType>,
    bio: Option<&'static str>,
}

const DEMO_ACCOUNTS: [DemoAccount; 4] = [
    DemoAccount {
        email: "john@doe.com",
        password: "johndoe123",
        full_name: "John Doe",
        role: Role::FormateurAdmin,
        client_type: None,
        bio: None,
    },
    DemoAccount {
        email: "marie@test.com",
        password: "learner123",
        full_name: "Marie Dupont",
        role: Role::Apprenant,
        client_type: Some(ClientType::EnLigne),
        bio: Some("Passionnée de développement web et toujours en apprentissage !"),
    },
    DemoAccount {
        email: "jean@test.com",
        password: "presentiel123",
        full_name: "Jean Martin",
        role: Role::Apprenant,
        client_type: Some(ClientType::Presentiel),
        bio: Some("Apprenant en formation présentielle à Antananarivo"),
    },
    DemoAccount {
        email: "admin@admin.com",
        password: "moiuniquement",
        full_name: "Administrateur Système",
        role: Role::Admin,
        client_type: None,
        bio: None,
    },
];

struct DemoFormation {
    title: &'static str,
    description: &'static str,
    category: &'static str,
    level: FormationLevel,
    is_published: bool,
    progress: i32,
}

const DEMO_FORMATIONS: [DemoFormation; 3] = [
    DemoFormation {
        title: "Introduction au Développement Web",
        description: "Apprenez les bases du développement web avec HTML, CSS et JavaScript.",
        category: "Développement Web",
        level: FormationLevel::Debutant,
        is_published: true,
        progress: 35,
    },
    DemoFormation {
        title: "Design UI/UX avec Figma",
        description: "Maîtrisez les principes du design d'interface et d'expérience utilisateur avec Figma.",
        category: "Design",
        level: FormationLevel::Intermediaire,
        is_published: true,
        progress: 0,
    },
    DemoFormation {
        title: "Marketing Digital pour Débutants",
        description: "Découvrez les stratégies de marketing digital essentielles, du contenu aux réseaux sociaux.",
        category: "Marketing Digital",
        level: FormationLevel::Debutant,
        is_published: false,
        progress: 0,
    },
];

/// Demo data for local development. Accounts are matched by email and the
/// content is only inserted once, so running it twice changes nothing.
pub struct DatabaseSeeder {
    pool: PgPool,
}

impl DatabaseSeeder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn seed_all(&self) -> Result<()> {
        tracing::info!("Starting database seeding...");

        let trainer_id = self.seed_accounts().await?;
        let learner_id = self.account_id("marie@test.com").await?;

        let already_seeded = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM formations WHERE creator_id = $1)",
        )
        .bind(trainer_id)
        .fetch_one(&self.pool)
        .await?;

        if already_seeded {
            tracing::info!("Demo content already present, skipping");
        } else {
            let first_formation = self.seed_formations(trainer_id, learner_id).await?;
            self.seed_course(first_formation).await?;
            self.seed_community(trainer_id, learner_id).await?;
            self.seed_conversations(trainer_id, learner_id).await?;
        }

        tracing::info!("Database seeding completed!");
        Ok(())
    }

    /// Returns the demo trainer's id.
    async fn seed_accounts(&self) -> Result<Uuid> {
        let user_service = UserService::new(self.pool.clone());

        for account in DEMO_ACCOUNTS {
            let created = user_service
                .create_user(NewUser {
                    email: account.email.to_string(),
                    password: account.password.to_string(),
                    full_name: account.full_name.to_string(),
                    role: account.role,
                    client_type: account.client_type,
                })
                .await?;

            if let Some(user_id) = created {
                if let Some(bio) = account.bio {
                    sqlx::query("UPDATE users SET bio = $2 WHERE id = $1")
                        .bind(user_id)
                        .bind(bio)
                        .execute(&self.pool)
                        .await?;
                }
                tracing::info!(email = account.email, role = account.role.as_str(), "created demo account");
            }
        }

        self.account_id("john@doe.com").await
    }

    async fn account_id(&self, email: &str) -> Result<Uuid> {
        UserService::new(self.pool.clone())
            .get_user_id_by_email(email)
            .await?
            .with_context(|| format!("demo account {email} is missing"))
    }

    /// Returns the first published formation.
    async fn seed_formations(&self, trainer_id: Uuid, learner_id: Uuid) -> Result<Uuid> {
        let mut first_published = None;

        for formation in DEMO_FORMATIONS {
            let formation_id = sqlx::query_scalar::<_, Uuid>(
                "INSERT INTO formations (title, description, category, level, is_published, creator_id)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING id",
            )
            .bind(formation.title)
            .bind(formation.description)
            .bind(formation.category)
            .bind(formation.level)
            .bind(formation.is_published)
            .bind(trainer_id)
            .fetch_one(&self.pool)
            .await?;

            if formation.is_published {
                sqlx::query(
                    "INSERT INTO enrollments (user_id, formation_id, progress)
                     VALUES ($1, $2, $3)
                     ON CONFLICT (user_id, formation_id) DO NOTHING",
                )
                .bind(learner_id)
                .bind(formation_id)
                .bind(formation.progress)
                .execute(&self.pool)
                .await?;

                first_published.get_or_insert(formation_id);
            }

            tracing::info!(title = formation.title, "created demo formation");
        }

        first_published.context("no published demo formation")
    }

    async fn seed_course(&self, formation_id: Uuid) -> Result<()> {
        let outline = [
            (
                "Introduction au HTML",
                "Découvrez les bases du langage HTML et créez votre première page web",
                "Créer votre première page HTML",
                "Créez une page HTML simple avec un titre, un paragraphe et une image",
                ExerciseType::Text,
                true,
            ),
            (
                "Styliser avec CSS",
                "Apprenez à donner du style à vos pages avec CSS",
                "Appliquer des styles CSS",
                "Ajoutez des styles CSS à votre page HTML pour la rendre attrayante",
                ExerciseType::File,
                false,
            ),
        ];

        for (order, (title, description, exercise_title, exercise_description, kind, required)) in
            outline.into_iter().enumerate()
        {
            let module_id = sqlx::query_scalar::<_, Uuid>(
                "INSERT INTO modules (title, description, \"order\", formation_id)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id",
            )
            .bind(title)
            .bind(description)
            .bind(order as i32 + 1)
            .bind(formation_id)
            .fetch_one(&self.pool)
            .await?;

            sqlx::query(
                "INSERT INTO exercises (title, description, type, required, \"order\", module_id)
                 VALUES ($1, $2, $3, $4, 1, $5)",
            )
            .bind(exercise_title)
            .bind(exercise_description)
            .bind(kind)
            .bind(required)
            .bind(module_id)
            .execute(&self.pool)
            .await?;
        }

        tracing::info!(%formation_id, "created demo modules and exercises");
        Ok(())
    }

    async fn seed_community(&self, trainer_id: Uuid, learner_id: Uuid) -> Result<()> {
        let welcome = self
            .insert_post(
                "Bonjour à tous ! Je suis ravie de rejoindre la communauté. Qui a des conseils pour débuter en développement web ?",
                learner_id,
                false,
            )
            .await?;
        let announcement = self
            .insert_post(
                "Nouvelle formation disponible sur le design UI/UX ! N'hésitez pas à vous inscrire.",
                trainer_id,
                true,
            )
            .await?;

        for (content, author_id) in [
            (
                "Bienvenue Marie ! Je te recommande de commencer par les fondamentaux HTML/CSS.",
                trainer_id,
            ),
            ("Merci pour le conseil ! J'ai hâte de commencer.", learner_id),
        ] {
            sqlx::query("INSERT INTO comments (content, post_id, author_id) VALUES ($1, $2, $3)")
                .bind(content)
                .bind(welcome)
                .bind(author_id)
                .execute(&self.pool)
                .await?;
        }

        for (post_id, user_id, reaction) in [
            (welcome, trainer_id, ReactionType::Like),
            (announcement, learner_id, ReactionType::Celebrate),
        ] {
            sqlx::query(
                "INSERT INTO reactions (type, post_id, user_id)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (post_id, user_id) DO NOTHING",
            )
            .bind(reaction)
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        }

        tracing::info!("created demo posts");
        Ok(())
    }

    async fn insert_post(&self, content: &str, author_id: Uuid, is_pinned: bool) -> Result<Uuid> {
        let post_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO posts (content, author_id, is_pinned) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(content)
        .bind(author_id)
        .bind(is_pinned)
        .fetch_one(&self.pool)
        .await?;
        Ok(post_id)
    }

    async fn seed_conversations(&self, trainer_id: Uuid, learner_id: Uuid) -> Result<()> {
        sqlx::query(
            "INSERT INTO messages (content, sender_id, receiver_id, is_read, created_at)
             VALUES ($1, $2, $3, FALSE, NOW() - INTERVAL '1 hour'),
                    ($4, $3, $2, TRUE, NOW())",
        )
        .bind("Bonjour John, j'ai une question concernant la formation HTML/CSS. Quand commence-t-elle ?")
        .bind(learner_id)
        .bind(trainer_id)
        .bind("Bonjour Marie, la formation commence dès que vous vous inscrivez ! Vous pouvez avancer à votre rythme.")
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "INSERT INTO coaching_notes (title, content, is_visible, coach_id, client_id)
             VALUES ($1, $2, TRUE, $5, $6), ($3, $4, FALSE, $5, $6)",
        )
        .bind("Première évaluation")
        .bind("Marie montre une excellente motivation et progresse rapidement.")
        .bind("Points à améliorer")
        .bind("Travailler davantage sur CSS Grid et Flexbox. Prévoir une session de révision.")
        .bind(trainer_id)
        .bind(learner_id)
        .execute(&self.pool)
        .await?;

        tracing::info!("created demo messages and coaching notes");
        Ok(())
    }
}
