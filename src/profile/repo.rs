use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::metrics::{Gender, Goal};
use crate::profile::dto::Profile;

/// User record in the database. The username is immutable after signup and
/// unique at the store level.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub gender: Gender,
    pub age: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub goal: Goal,
    pub activity_level: f64,
    pub tdee: f64,
    pub created_at: OffsetDateTime,
}

/// Fields needed to insert a user. `tdee` has already been derived from the
/// other attributes by the caller.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub gender: Gender,
    pub age: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub goal: Goal,
    pub activity_level: f64,
    pub tdee: f64,
}

const USER_COLUMNS: &str = "id, name, username, password_hash, gender, age, height_cm, \
                            weight_kg, goal, activity_level, tdee, created_at";

impl User {
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(db: &PgPool, new: NewUser<'_>) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (name, username, password_hash, gender, age, height_cm,
                 weight_kg, goal, activity_level, tdee)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.name)
        .bind(new.username)
        .bind(new.password_hash)
        .bind(new.gender)
        .bind(new.age)
        .bind(new.height_cm)
        .bind(new.weight_kg)
        .bind(new.goal)
        .bind(new.activity_level)
        .bind(new.tdee)
        .fetch_one(db)
        .await
    }

    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
            gender: self.gender,
            age: self.age,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            goal: self.goal,
            activity_level: self.activity_level,
            tdee: self.tdee,
        }
    }
}

/// True when the error is the store-level unique-username violation, which
/// must surface as a conflict rather than a generic backend failure.
pub fn is_duplicate_username(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser<'_> {
        NewUser {
            name: "Ravi",
            username,
            password_hash: "$argon2id$irrelevant-for-the-store",
            gender: Gender::Male,
            age: 32,
            height_cm: 178.0,
            weight_kg: 74.0,
            goal: Goal::GainMuscle,
            activity_level: 1.55,
            tdee: 2700.0,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_username_does_not_create_a_second_record(db: PgPool) {
        let first = User::create(&db, new_user("ravi")).await.unwrap();

        let err = User::create(&db, new_user("ravi")).await.unwrap_err();
        assert!(is_duplicate_username(&err));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
            .bind("ravi")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 1);
        let survivor = User::find_by_username(&db, "ravi").await.unwrap().unwrap();
        assert_eq!(survivor.id, first.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn create_then_find_returns_the_stored_record(db: PgPool) {
        let created = User::create(&db, new_user("ravi")).await.unwrap();

        let found = User::find_by_username(&db, "ravi").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.name, "Ravi");
        assert_eq!(found.gender, Gender::Male);
        assert_eq!(found.goal, Goal::GainMuscle);
        assert_eq!(found.activity_level, 1.55);
        assert_eq!(found.tdee, 2700.0);

        assert!(User::find_by_username(&db, "nobody").await.unwrap().is_none());
    }
}
