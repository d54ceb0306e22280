//! Reading Questions - prompt templating for French reading-comprehension questions
//!
//! This library provides a small template engine (variables, one kind of
//! repeated block, flag and item-equality conditionals), the built-in prompt
//! for question generation, and a client for the generation service.
//!
//! # Example
//!
//! ```rust
//! use reading_questions::{render, Context};
//!
//! let ctx = Context::new().with("name", "Marie").with("show", "");
//! let out = render("Bonjour {{name}}! {{#if show}}Bienvenue.{{/if}}", &ctx);
//! assert_eq!(out, "Bonjour Marie! ");
//! ```

pub mod context;
pub mod error;
pub mod generator;
pub mod parser;
pub mod prompt;
pub mod template;

pub use context::{Context, ContextError, Value};
pub use error::{AppError, Diagnostic};
pub use generator::{
    AnthropicClient, ApiKey, ConfigError, GenerationError, GeneratorConfig, QuestionGenerator,
};
pub use prompt::{Difficulty, QuestionRequest, QuestionType, PROMPT_TEMPLATE};
pub use template::{KeyUsage, Template, UnresolvedKey};

/// Render template source against a context
///
/// Parses and renders in one step. Never fails: unresolvable markers are kept
/// verbatim or dropped, see [`Template`].
///
/// # Example
///
/// ```rust
/// use reading_questions::{render, Context};
///
/// let ctx = Context::new().with("items", vec!["a", "b", "c"]);
/// assert_eq!(render("{{#each items}}[{{this}}]{{/each}}", &ctx), "[a][b][c]");
/// ```
pub fn render(template: &str, context: &Context) -> String {
    Template::parse(template).render(context)
}

/// Render the built-in prompt for a request
pub fn render_prompt(request: &QuestionRequest) -> String {
    request.render_prompt(&Template::parse(PROMPT_TEMPLATE))
}

/// Render the prompt and send it to `generator`
pub async fn generate_questions<G: QuestionGenerator>(
    generator: &G,
    template: &Template,
    request: &QuestionRequest,
) -> Result<String, GenerationError> {
    let prompt = request.render_prompt(template);
    generator.generate(&prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_greeting() {
        let template = "Bonjour {{name}}! {{#if show}}Bienvenue.{{/if}}";
        let hidden = Context::new().with("name", "Marie").with("show", "");
        let shown = Context::new().with("name", "Marie").with("show", "yes");
        assert_eq!(render(template, &hidden), "Bonjour Marie! ");
        assert_eq!(render(template, &shown), "Bonjour Marie! Bienvenue.");
    }

    #[test]
    fn test_render_each() {
        let template = "{{#each items}}[{{this}}]{{/each}}";
        let ctx = Context::new().with("items", vec!["a", "b", "c"]);
        assert_eq!(render(template, &ctx), "[a][b][c]");
        let empty = Context::new().with("items", Vec::<String>::new());
        assert_eq!(render(template, &empty), "");
    }

    #[test]
    fn test_render_prompt_includes_text() {
        let request = QuestionRequest::new("La mer est calme ce matin.");
        let prompt = render_prompt(&request);
        assert!(prompt.contains("La mer est calme ce matin."));
        assert!(prompt.contains("(6 words)"));
        assert!(!prompt.contains("{{"));
    }
}
