use crate::profile::dto::Profile;

/// Prompt for the meal-photo analysis. The output template is fixed so the
/// calorie total can be recovered by `extract::extract_calories`.
pub fn analysis_prompt(profile: &Profile, prep_notes: Option<&str>) -> String {
    let mut prompt = format!(
        "User Profile:\n\
         Name: {name}\n\
         Health Goal: {goal}\n\
         Estimated Daily Calorie Needs: {tdee:.0} kcal\n\
         \n\
         You are an expert nutritionist. Analyze the food items from the image and calculate total calories.\n\
         Provide the analysis in this format:\n\
         \n\
         FOOD ITEMS AND CALORIES:\n\
         1. Item 1 - XXX calories\n\
         2. Item 2 - XXX calories\n\
         3. Item 3 - XXX calories\n\
         \n\
         TOTAL CALORIES:\n\
         Your total caloric intake from this meal is XXX calories.\n\
         \n\
         NUTRITIONAL ANALYSIS:\n\
         - Carbohydrates: XX%\n\
         - Protein: XX%\n\
         - Fat: XX%\n\
         \n\
         RECOMMENDATION:\n\
         [Your food is healthy/Your food is not healthy] because [reason].\n\
         Suggested improvements: [suggestions].\n\
         \n\
         GOAL-SPECIFIC FEEDBACK:\n\
         Based on your health goal to \"{goal}\", this meal is [a good choice/not an ideal choice] because [reason].\n\
         If you're looking to {goal}, you could [suggestion related to their goal].\n",
        name = profile.name,
        goal = profile.goal.as_text(),
        tdee = profile.tdee,
    );
    if let Some(notes) = prep_notes.filter(|n| !n.trim().is_empty()) {
        prompt.push_str("\nMeal Preparation Details: ");
        prompt.push_str(notes);
    }
    prompt
}

/// Prompt for the 7-day meal plan.
pub fn plan_prompt(profile: &Profile, preferences: &str) -> String {
    format!(
        "Generate a detailed 7-day personalized meal plan for a person with the goal to \
         '{goal}'. Their daily calorie need is approximately {tdee:.0} kcal. The meal plan \
         should be based on the following preferences: {preferences}. Include recipes, \
         nutritional information, and a grocery list.",
        goal = profile.goal.as_text(),
        tdee = profile.tdee,
    )
}

/// Prompt for a single chat turn. Embeds the full profile and only the new
/// question; earlier transcript turns are display-only and not resent.
pub fn chat_prompt(profile: &Profile, question: &str) -> String {
    format!(
        "User Profile:\n\
         Name: {name}\n\
         Age: {age}\n\
         Gender: {gender:?}\n\
         Height: {height:.0} cm\n\
         Weight: {weight:.0} kg\n\
         Goal: {goal}\n\
         Daily Calorie Needs: {tdee:.0} kcal\n\
         \n\
         Based on this user's profile and the following question, act as a personalized \
         nutritionist and provide a helpful response.\n\
         Question: {question}",
        name = profile.name,
        age = profile.age,
        gender = profile.gender,
        height = profile.height_cm,
        weight = profile.weight_kg,
        goal = profile.goal.as_text(),
        tdee = profile.tdee,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Gender, Goal};
    use uuid::Uuid;

    fn profile() -> Profile {
        Profile {
            id: Uuid::new_v4(),
            name: "Ravi".into(),
            username: "ravi".into(),
            gender: Gender::Male,
            age: 32,
            height_cm: 178.0,
            weight_kg: 74.0,
            goal: Goal::LoseWeight,
            activity_level: 1.55,
            tdee: 2456.4,
        }
    }

    #[test]
    fn analysis_prompt_embeds_profile_and_template() {
        let p = analysis_prompt(&profile(), None);
        assert!(p.contains("Name: Ravi"));
        assert!(p.contains("Health Goal: lose weight"));
        assert!(p.contains("2456 kcal"));
        assert!(p.contains("Your total caloric intake from this meal is XXX calories."));
        assert!(!p.contains("Meal Preparation Details"));
    }

    #[test]
    fn analysis_prompt_appends_prep_notes_when_present() {
        let p = analysis_prompt(&profile(), Some("grilled, no oil"));
        assert!(p.ends_with("Meal Preparation Details: grilled, no oil"));
        // Blank notes are treated as absent.
        let blank = analysis_prompt(&profile(), Some("   "));
        assert!(!blank.contains("Meal Preparation Details"));
    }

    #[test]
    fn plan_prompt_embeds_goal_tdee_and_preferences() {
        let p = plan_prompt(&profile(), "vegetarian, low-carb");
        assert!(p.contains("'lose weight'"));
        assert!(p.contains("2456 kcal"));
        assert!(p.contains("vegetarian, low-carb"));
        assert!(p.contains("grocery list"));
    }

    #[test]
    fn chat_prompt_embeds_profile_and_only_the_new_question() {
        let p = chat_prompt(&profile(), "is ghee healthy?");
        assert!(p.contains("Age: 32"));
        assert!(p.contains("Height: 178 cm"));
        assert!(p.contains("Question: is ghee healthy?"));
    }
}
