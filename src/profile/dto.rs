use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::{ActivityLevel, Gender, Goal};

/// Request body for signup. `tdee` is never accepted from the client; it is
/// recomputed server-side from these fields.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    pub gender: Gender,
    pub age: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// The profile as seen by the client. No credential material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub gender: Gender,
    pub age: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub goal: Goal,
    pub activity_level: f64,
    pub tdee: f64,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: Uuid,
    pub username: String,
}

/// Response returned after login or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub profile: Profile,
}

/// Derived numbers shown alongside the profile (the "health stats" panel).
#[derive(Debug, Serialize)]
pub struct HealthStats {
    pub bmi: f64,
    pub bmr: f64,
    pub tdee: f64,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub profile: Profile,
    pub stats: HealthStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_request_deserializes_enums_from_wire_names() {
        let raw = r#"{
            "name": "Ravi",
            "username": "ravi",
            "password": "hunter22",
            "gender": "male",
            "age": 32,
            "height_cm": 178.0,
            "weight_kg": 74.0,
            "goal": "gain_muscle",
            "activity_level": "moderately_active"
        }"#;
        let req: SignupRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.gender, Gender::Male);
        assert_eq!(req.goal, Goal::GainMuscle);
        assert_eq!(req.activity_level, ActivityLevel::ModeratelyActive);
    }

    #[test]
    fn signup_request_accepts_the_full_activity_label() {
        let raw = r#"{
            "name": "Ravi", "username": "ravi", "password": "hunter22",
            "gender": "male", "age": 32, "height_cm": 178.0, "weight_kg": 74.0,
            "goal": "gain_muscle",
            "activity_level": "Lightly Active (light exercise/sports 1-3 days/week)"
        }"#;
        let req: SignupRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.activity_level, ActivityLevel::LightlyActive);
    }

    #[test]
    fn unknown_activity_tier_is_rejected_at_the_boundary() {
        let raw = r#"{
            "name": "Ravi", "username": "ravi", "password": "hunter22",
            "gender": "male", "age": 32, "height_cm": 178.0, "weight_kg": 74.0,
            "goal": "gain_muscle", "activity_level": "extremely_active"
        }"#;
        assert!(serde_json::from_str::<SignupRequest>(raw).is_err());
    }

    #[test]
    fn profile_serializes_without_credentials() {
        let profile = Profile {
            id: Uuid::new_v4(),
            name: "Ravi".into(),
            username: "ravi".into(),
            gender: Gender::Male,
            age: 32,
            height_cm: 178.0,
            weight_kg: 74.0,
            goal: Goal::GainMuscle,
            activity_level: 1.55,
            tdee: 2700.0,
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"username\":\"ravi\""));
        assert!(!json.contains("password"));
    }
}
