//! Fixed operation table, keyed by agent.

use sf_protocol::{AgentName, Operation};

/// The ordered operations an agent executes when started.
///
/// Requirement and Design agents have dedicated lists; every other agent
/// runs the generic two-step list.
pub fn operations_for(agent: AgentName) -> Vec<Operation> {
    let steps: &[(&str, &str)] = match agent {
        AgentName::Requirement => &[
            ("Analyze Requirements", "Parse and analyze project requirements"),
            ("Generate User Stories", "Create user stories from requirements"),
            (
                "Validate Acceptance Criteria",
                "Validate acceptance criteria completeness",
            ),
            (
                "Requirements Documentation",
                "Generate comprehensive requirements document",
            ),
        ],
        AgentName::Design => &[
            ("UI/UX Analysis", "Analyze design requirements and user flow"),
            ("Create Wireframes", "Generate wireframes and mockups"),
            ("Design System", "Create design system and components"),
        ],
        AgentName::Dev | AgentName::Test | AgentName::Deploy | AgentName::Monitor => &[
            ("Initialize Process", "Setting up agent workflow"),
            ("Execute Tasks", "Running agent-specific operations"),
        ],
    };

    steps
        .iter()
        .enumerate()
        .map(|(i, (title, description))| {
            Operation::pending((i + 1).to_string(), *title, *description)
        })
        .collect()
}

/// Text an agent produces for `project_name` once all its operations completed.
pub fn generated_document(agent: AgentName, project_name: &str) -> String {
    format!("Generated output from {agent} for project: {project_name}")
}
