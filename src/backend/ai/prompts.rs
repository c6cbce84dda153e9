/**
 * AI Prompts
 *
 * The four assistant tasks and the prompt each one sends. The prompt embeds
 * the caller's code in a fenced block tagged with its language.
 */

/// Assistant task exposed at `/api/ai/{task}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTask {
    Suggest,
    Review,
    Explain,
    Fix,
}

impl AiTask {
    /// Response field carrying the generated text
    pub fn response_field(self) -> &'static str {
        match self {
            AiTask::Suggest => "suggestion",
            AiTask::Review => "review",
            AiTask::Explain => "explain",
            AiTask::Fix => "fixedCode",
        }
    }

    /// Message returned when the upstream call fails
    pub fn failure_message(self) -> &'static str {
        match self {
            AiTask::Suggest => "Failed to generate suggestion",
            AiTask::Review => "Failed to review code",
            AiTask::Explain => "Failed to explain code",
            AiTask::Fix => "Failed to fix code",
        }
    }

    /// Build the prompt; `extra` is the context for `Suggest` and the issue for `Fix`
    pub fn prompt(self, code: &str, language: Option<&str>, extra: Option<&str>) -> String {
        let noun = language.unwrap_or("code");
        let fence = language.unwrap_or("javascript");
        match self {
            AiTask::Suggest => format!(
                "You are a helpful coding assistant. Given the following {noun} code, provide a helpful suggestion or completion.\n\
                 Context: {}\n\n\
                 Code:\n```{fence}\n{code}\n```\n\n\
                 Provide a concise suggestion or code completion. Only return the suggested code without explanations.",
                extra.unwrap_or("No additional context"),
            ),
            AiTask::Review => format!(
                "You are an expert code reviewer. Review the following {noun} thoroughly:\n\n\
                 Code:\n```{fence}\n{code}\n```\n\n\
                 Provide a short review covering:\n\
                 1. **Bugs & Issues:** Any potential bugs or errors\n\
                 2. **Code Quality:** Readability, maintainability, structure\n\
                 3. **Best Practices:** Are coding standards followed?\n\
                 4. **Performance:** Any performance concerns or optimizations\n\
                 5. **Security:** Security vulnerabilities (if any)\n\
                 6. **Suggestions:** Specific improvements to make\n\
                 7. **Overall Rating:** Rate the code from 1-10\n\n\
                 Be constructive and helpful in your feedback."
            ),
            AiTask::Explain => format!(
                "Explain the following {noun} in simple terms. Break it down line by line if needed:\n\n\
                 ```{fence}\n{code}\n```\n\n\
                 Provide a clear, easy-to-understand explanation."
            ),
            AiTask::Fix => {
                let issue = match extra {
                    Some(issue) => format!("The issue is: {issue}"),
                    None => "Find and fix any bugs or issues.".to_string(),
                };
                format!(
                    "Fix the following {noun}. {issue}\n\n\
                     Original Code:\n```{fence}\n{code}\n```\n\n\
                     Provide the fixed code and a brief explanation of what was wrong."
                )
            }
        }
    }
}
