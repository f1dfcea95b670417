//! Prompt templates for the planner, architect, and coder agents.
//!
//! Every builder embeds its input verbatim. Nothing is escaped or trimmed, so
//! the caller's text always appears as a contiguous substring of the output.

use std::fmt::Write as _;

/// A tool the coder agent is told it can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentTool {
    pub name: &'static str,
    /// Comma-separated parameter names, without spaces.
    pub params: &'static str,
    pub description: &'static str,
}

impl AgentTool {
    /// Call signature as shown to the model, e.g. `read_file(path)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.params)
    }
}

/// Tools advertised in the coder system prompt, in the order they are listed.
pub const CODER_TOOLS: &[AgentTool] = &[
    AgentTool {
        name: "read_file",
        params: "path",
        description: "will reads the content of a file",
    },
    AgentTool {
        name: "write_file",
        params: "path,content",
        description: "will write content to a file",
    },
    AgentTool {
        name: "list_file",
        params: "directory",
        description: "will lists files in a directory",
    },
    AgentTool {
        name: "get_current_directory",
        params: "",
        description: "will returns the current working directory",
    },
];

const PLANNER_PREAMBLE: &str = r#"You are the PLANNER agent. Convert the user prompt into a COMPLETE engineering project plan. Plan as less features and logic possible.
Keep it primitive and simple. User should be able to directly run without any extra step."#;

const ARCHITECT_PREAMBLE: &str = r#"You are the ARCHITECT agent. Given this project plan, break it down into explicit engineering tasks.

RULES:
- For each FILE in the plan, create one or more IMPLEMENTATION TASKS.
- In each IMPLEMENTATION task description:
    * Specify exactly what to implement.
    * Name the variables, functions, classes, and components to be defined.
    * Mention how this task depends on or will be used by previous tasks.
    * Include integration details: imports, expected function signatures, data flow.
- Order tasks so that dependencies are implemented first.
- Each step must be SELF-CONTAINED but also carry FORWARD the relevant context from earlier tasks."#;

const CODER_RULES: &str = r#"Always:
- Review all existing files to maintain compatibility.
- Implement the FULL file content, integrating with other modules.
- Maintain consistent naming of variables, functions, and imports.
- When a module is imported from another file, ensure it exists and is implemented as described."#;

/// Builds the planner prompt around a raw user request.
pub fn planner_prompt(user_prompt: &str) -> String {
    format!("{PLANNER_PREAMBLE}\nUser request:\n{user_prompt}\n")
}

/// Builds the architect prompt that turns a plan into ordered implementation tasks.
pub fn architect_prompt(plan: &str) -> String {
    format!("{ARCHITECT_PREAMBLE}\n\nProject Plan:\n{plan}\n")
}

/// Static system prompt for the coder agent.
pub fn coder_system_prompt() -> String {
    let mut prompt = String::with_capacity(1024);
    prompt.push_str("You are the CODER agent.\n");
    prompt.push_str("You are implementing a specific engineering task.\n\n");
    prompt.push_str("You have access to the following tools:\n");
    for (i, tool) in CODER_TOOLS.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(prompt, "{}. {} {}.", i + 1, tool.signature(), tool.description);
    }
    prompt.push('\n');
    prompt.push_str(CODER_RULES);
    prompt.push('\n');
    prompt
}

/// User-turn message handing one architect task to the coder.
pub fn coder_task_prompt(task: &str) -> String {
    format!("Implement this task:\n{task}\n")
}

/// The three agent roles a prompt can be rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AgentRole {
    Planner,
    Architect,
    Coder,
}

impl AgentRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Planner => "PLANNER",
            Self::Architect => "ARCHITECT",
            Self::Coder => "CODER",
        }
    }

    /// Renders the full prompt text for this role.
    ///
    /// The coder has no single-argument template, so its rendering is the
    /// system prompt followed by the task message.
    pub fn render(&self, input: &str) -> String {
        match self {
            Self::Planner => planner_prompt(input),
            Self::Architect => architect_prompt(input),
            Self::Coder => format!("{}\n{}", coder_system_prompt(), coder_task_prompt(input)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "Build a todo app",
        "multi\nline\n\ninput",
        "braces {user_prompt} and {{escaped}}",
        "unicode: héllo 世界 🚀",
        "   leading and trailing spaces   ",
    ];

    #[test]
    fn test_planner_prompt_contains_input() {
        for s in SAMPLES {
            let out = planner_prompt(s);
            assert!(out.contains(s), "missing {:?}", s);
            assert!(out.len() > s.len());
        }
    }

    #[test]
    fn test_architect_prompt_contains_input() {
        for s in SAMPLES {
            let out = architect_prompt(s);
            assert!(out.contains(s), "missing {:?}", s);
            assert!(out.len() > s.len());
        }
    }

    #[test]
    fn test_coder_task_prompt_contains_input() {
        for s in SAMPLES {
            let out = coder_task_prompt(s);
            assert!(out.contains(s), "missing {:?}", s);
            assert!(out.len() > s.len());
        }
    }

    #[test]
    fn test_planner_preamble_wording() {
        assert_eq!(
            PLANNER_PREAMBLE,
            "You are the PLANNER agent. Convert the user prompt into a COMPLETE engineering \
             project plan. Plan as less features and logic possible.\n\
             Keep it primitive and simple. User should be able to directly run without any \
             extra step."
        );
    }

    #[test]
    fn test_planner_prompt_layout() {
        let out = planner_prompt("Build a calculator");
        assert!(out.starts_with("You are the PLANNER agent."));
        assert!(out.ends_with("User request:\nBuild a calculator\n"));
    }

    #[test]
    fn test_architect_prompt_layout() {
        let out = architect_prompt("PLAN");
        assert!(out.starts_with("You are the ARCHITECT agent."));
        assert!(out.contains("RULES:\n- For each FILE in the plan"));
        assert!(out.ends_with("Project Plan:\nPLAN\n"));
    }

    #[test]
    fn test_braces_are_not_interpreted() {
        let out = planner_prompt("{}");
        assert!(out.contains("User request:\n{}\n"));
    }

    #[test]
    fn test_coder_system_prompt_lists_tools_in_order() {
        let prompt = coder_system_prompt();
        assert!(prompt.starts_with("You are the CODER agent.\n"));
        assert!(prompt.contains("1. read_file(path) will reads the content of a file.\n"));
        assert!(prompt.contains("2. write_file(path,content) will write content to a file.\n"));
        assert!(prompt.contains("3. list_file(directory) will lists files in a directory.\n"));
        assert!(prompt.contains(
            "4. get_current_directory() will returns the current working directory.\n"
        ));
        assert!(prompt.contains("Always:\n- Review all existing files"));
    }

    #[test]
    fn test_coder_tools_signatures_start_with_name() {
        for tool in CODER_TOOLS {
            let signature = tool.signature();
            assert!(signature.starts_with(tool.name));
            assert!(signature.ends_with(')'));
            assert!(!tool.params.contains(' '));
        }
    }

    #[test]
    fn test_coder_system_prompt_is_stable() {
        assert_eq!(coder_system_prompt(), coder_system_prompt());
    }

    #[test]
    fn test_role_render_dispatch() {
        assert_eq!(AgentRole::Planner.render("x"), planner_prompt("x"));
        assert_eq!(AgentRole::Architect.render("x"), architect_prompt("x"));

        let coder = AgentRole::Coder.render("task one");
        assert!(coder.starts_with(&coder_system_prompt()));
        assert!(coder.ends_with(&coder_task_prompt("task one")));
    }

    #[test]
    fn test_role_labels_appear_in_prompts() {
        for role in [AgentRole::Planner, AgentRole::Architect, AgentRole::Coder] {
            let out = role.render("input");
            assert!(out.contains(&format!("You are the {} agent", role.label())));
        }
    }
}
