use super::CompletionRequest;
use crate::tools::ToolSpec;

pub const CONVERSATIONAL_RESPONSE: &str = "CONVERSATIONAL_RESPONSE";

/// Tools the triage step may suggest.
pub const SUGGESTIBLE_TOOLS: &[(&str, &str)] = &[
    ("GFR Calculator", "estimates kidney function from creatinine, age and sex"),
    ("Code Editor Helper", "writes or edits HTML/JS shown in the Develop panel"),
    ("Image Generator", "creates images from a description"),
];

pub fn triage_system_prompt(custom: Option<&str>, tools: &[ToolSpec]) -> String {
    let mut prompt = String::from(
        "You are the assistant of a clinical mission-control workspace. \
Decide whether the user's message is best served by one of the tools below, \
or whether it is a conversational question.\n\nTools:\n",
    );
    for (name, purpose) in SUGGESTIBLE_TOOLS {
        prompt.push_str(&format!("- {name}: {purpose}\n"));
    }
    if !tools.is_empty() {
        prompt.push_str("\nLookup tools the user can run with `/tool <name> <json>`:\n");
        for spec in tools {
            prompt.push_str(&format!("- {}: {}\n", spec.name, spec.description));
        }
    }
    prompt.push_str(&format!(
        "\nAnswer with a single JSON object and nothing else:\n\
{{\"text\": string, \"toolSuggestion\": string, \"reasoning\": string, \
\"previewAction\": {{\"code\": string, \"targetPanel\": \"develop\", \"targetDevelopTab\": \"preview\"}}}}\n\
Use \"toolSuggestion\": \"{CONVERSATIONAL_RESPONSE}\" and put the answer in \"reasoning\" \
when no tool applies. Include \"previewAction\" only when you produce a complete HTML document. \
When you write code without a preview target, put it in \"generatedCode\" instead and set \
\"toolSuggestion\" to \"Code Editor Helper\".\n"
    ));
    if let Some(custom) = custom.filter(|text| !text.trim().is_empty()) {
        prompt.push('\n');
        prompt.push_str(custom);
        prompt.push('\n');
    }
    prompt
}

pub fn completion_prompt(instruction: &str, request: &CompletionRequest) -> (String, String) {
    let system = String::from(
        "You are a code completion assistant for a single-document editor. Given the current \
document, its language and the cursor position, return the whole updated document so the \
change fits seamlessly into the existing code. Answer with JSON only: {\"completedCode\": string}",
    );
    let user = format!(
        "Request: {instruction}\nProgramming Language: {}\nCursor Position: {}\nCode Snippet:\n{}",
        request.programming_language, request.cursor_position, request.code_snippet
    );
    (system, user)
}

pub fn sub_query_prompt(query: &str, count: usize) -> (String, String) {
    let system = format!(
        "You plan web research. Break the user's question into at most {count} focused \
search queries. Answer with JSON only: {{\"subQueries\": [string, ...]}}"
    );
    (system, query.to_string())
}

pub fn synthesis_prompt(query: &str, findings_json: &str) -> (String, String) {
    let system = String::from(
        "You write research briefs from web findings. Some sub-queries may carry an \
error instead of results; mention gaps when they matter. Answer with JSON only: \
{\"summary\": string, \"keyPoints\": [string], \"sources\": [{\"title\": string, \"url\": string}]}",
    );
    let user = format!("Question: {query}\n\nFindings:\n{findings_json}");
    (system, user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triage_prompt_lists_tools_and_custom_text() {
        let tools = vec![ToolSpec {
            name: "getBoxedWarning".into(),
            description: "Boxed warning.".into(),
        }];
        let prompt = triage_system_prompt(Some("Answer in English."), &tools);
        assert!(prompt.contains("GFR Calculator"));
        assert!(prompt.contains("getBoxedWarning"));
        assert!(prompt.contains(CONVERSATIONAL_RESPONSE));
        assert!(prompt.trim_end().ends_with("Answer in English."));
    }
}
