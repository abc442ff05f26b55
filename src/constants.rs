//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Prompt compilation constants
pub mod compiler {
    /// Separator placed between the four catalog template fragments
    pub const FRAGMENT_SEPARATOR: &str = "\n\n";

    /// Substituted for `[[CONTEXT]]` when the context field is empty
    pub const DEFAULT_CONTEXT: &str = "No specific context provided.";

    /// Substituted for `[[PERSONA]]` / `[[ROLE]]` when the persona field is empty
    pub const DEFAULT_PERSONA: &str = "assistant";

    /// Substituted for `[[CONSTRAINTS]]` when the constraints field is empty
    pub const DEFAULT_CONSTRAINTS: &str = "None";

    /// Substituted for `[[GOAL]]` when the goal field is empty
    pub const DEFAULT_GOAL: &str = "Complete the task effectively";

    /// Output format id whose schema always wins over technique support
    pub const JSON_FORMAT_ID: &str = "json";
}

/// Prompt configuration limits
pub mod limits {
    /// Maximum few-shot examples per prompt configuration
    pub const MAX_EXAMPLES: usize = 5;

    /// Maximum context length (characters)
    pub const MAX_CONTEXT_CHARS: usize = 20_000;

    /// Temperature bounds
    pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 2.0);

    /// Top-p bounds
    pub const TOP_P_RANGE: (f32, f32) = (0.0, 1.0);

    /// Max output token bounds
    pub const MAX_TOKENS_RANGE: (u32, u32) = (1, 128_000);
}

/// Heuristic scorer weights
///
/// Changing any weight changes every stored score.
pub mod scoring {
    pub const CLARITY_CAP: u32 = 30;
    pub const SPECIFICITY_CAP: u32 = 30;
    pub const STRUCTURE_CAP: u32 = 40;
    pub const TOTAL_CAP: u32 = 100;

    /// Word-count thresholds (strictly greater than)
    pub const WORDS_SHORT: usize = 20;
    pub const WORDS_LONG: usize = 50;

    /// Non-blank line thresholds (strictly greater than)
    pub const LINES_FEW: usize = 3;
    pub const LINES_MANY: usize = 5;

    /// Context length (characters) above which context counts as specific
    pub const CONTEXT_CHARS: usize = 20;

    pub const WORD_POINTS: u32 = 10;
    pub const QUESTION_POINTS: u32 = 5;
    pub const POLITE_POINTS: u32 = 5;
    pub const CONTEXT_POINTS: u32 = 10;
    pub const EXAMPLES_POINTS: u32 = 10;
    pub const CONSTRAINTS_POINTS: u32 = 5;
    pub const GOAL_POINTS: u32 = 5;
    pub const LINE_POINTS: u32 = 10;
    pub const LIST_POINTS: u32 = 10;
    pub const REASONING_POINTS: u32 = 10;

    /// Case-insensitive words that signal an explicit directive
    pub const DIRECTIVE_WORDS: [&str; 2] = ["please", "ensure"];

    /// Markers that signal list structure
    pub const LIST_MARKERS: [&str; 2] = ["1.", "-"];

    /// Technique ids of the reasoning family (chain-of-thought, mega prompt)
    pub const REASONING_TECHNIQUE_IDS: [&str; 2] = ["cot", "mega_prompt"];
}

/// System model used for drafting, scoring and variant generation
pub mod system_model {
    pub const MODEL: &str = "llama-3.3-70b-versatile";
    pub const TEMPERATURE: f32 = 0.7;
    pub const TOP_P: f32 = 1.0;
    pub const TOP_K: u32 = 40;
    pub const MAX_TOKENS: u32 = 8192;

    /// Temperature used when the system model grades a prompt
    pub const EVALUATION_TEMPERATURE: f32 = 0.0;
}

/// Default user model configuration for a new session
pub mod session_defaults {
    pub const MODEL: &str = "llama-3.3-70b-versatile";
    pub const TEMPERATURE: f32 = 0.7;
    pub const TOP_P: f32 = 1.0;
    pub const TOP_K: u32 = 40;
    pub const MAX_TOKENS: u32 = 8000;
}

/// Chain executor constants
pub mod chain {
    /// Back-reference token prefix, followed by the 1-based step number
    pub const STEP_TOKEN_PREFIX: &str = "{{STEP_";

    /// Back-reference token suffix
    pub const STEP_TOKEN_SUFFIX: &str = "_OUTPUT}}";
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;

    /// Anthropic API version header value
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";
}

/// Storage constants
pub mod storage {
    /// Project data directory
    pub const PROJECT_DIR: &str = ".promptcopilot";

    /// Database file name inside the project data directory
    pub const DATABASE_FILE: &str = "promptcopilot.db";

    /// Default page size for history and usage listings
    pub const DEFAULT_LIST_LIMIT: usize = 20;
}
