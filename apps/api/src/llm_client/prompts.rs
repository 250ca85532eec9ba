// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that writes about the candidate.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Every claim about the candidate must come from the experiences provided. \
    Do NOT invent employers, titles, dates, metrics or skills. \
    If the experiences do not support a claim, leave it out.";
