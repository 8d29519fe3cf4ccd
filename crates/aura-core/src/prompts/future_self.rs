//! Future-self simulator: three distinct trajectories around one worry.

use crate::insight::types::FutureSelfRequest;

pub fn future_self_prompt(request: &FutureSelfRequest) -> String {
    format!(
        r#"Context: A student studying {major} who wants to become a {goal} is currently worried about: "{obstacle}".

Task: Generate 3 DISTINCT future trajectories based on this anxiety:
1. "Stable": Realistic, steady progress overcoming the obstacle.
2. "Growth": Using the obstacle as a learning pivot to something better.
3. "Moonshot": A high-risk, high-reward outcome where they master this obstacle completely.

JSON Output: [
  {{
    "type": "stable" | "growth" | "moonshot",
    "title": "Short catchy title",
    "narrative": "2 sentences describing the outcome in the second person (You...)",
    "confidenceScore": number (0-100),
    "keyMilestone": "Short string"
  }}
]"#,
        major = request.major,
        goal = request.goal,
        obstacle = request.obstacle,
    )
}
