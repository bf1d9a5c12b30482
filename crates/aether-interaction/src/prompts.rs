//! Prompt templates for the three UI flows.
//!
//! Rendered with minijinja. Templates have no file extension, so values are
//! inserted without HTML escaping.

use minijinja::{Environment, context};
use once_cell::sync::Lazy;

const GENERATE_TEMPLATE: &str = "generate";
const REFINE_TEMPLATE: &str = "refine";
const ASK_ABOUT_CODE_TEMPLATE: &str = "ask_about_code";

const COMPONENT_RULES: &str = r#"The generated component MUST be responsive and adapt its layout for different screen sizes. Use media queries in your CSS to create distinct looks for mobile and desktop.
You MUST generate CSS for styling. Do NOT use TailwindCSS. All styling should be in the CSS block.
The user is using React with TypeScript. For any icons, use the lucide-react library by referencing them from the `LucideIcons` object (e.g., `<LucideIcons.Mail />`)."#;

const EXPORT_RULES: &str = r#"Your generated component should be a single default exported function or const.
Do NOT include any other named exports.
Do NOT include `import React from 'react'` or any other imports, as they are provided automatically."#;

const GENERATE: &str = r#"You are a UI component code generation expert. Generate JSX/TSX and standard CSS code based on the user's prompt.

{{ component_rules }}

Crucially, you MUST add a unique 'data-aether-id' attribute to EVERY JSX element you generate. This is essential for the editor to identify elements. The ID should be a short, unique string, for example: 'el-1', 'el-2', etc.

{{ export_rules }}

Prompt: {{ prompt }}
{% if has_image %}
The user has provided an image as a visual reference. Base your component design on this image.
{% endif %}
Respond with a JSON object of the form {"jsxTsxCode": "<component source>", "cssCode": "<stylesheet>"}.
"#;

const REFINE: &str = r#"You are an AI code assistant specializing in refining UI components. The user will provide you with the existing code of a UI component, along with a prompt describing the desired changes or refinements. Your task is to modify the code according to the user's instructions and return the refined code.

{{ component_rules }}

Crucially, you MUST ensure that every JSX element has a unique 'data-aether-id' attribute. Preserve existing 'data-aether-id' attributes where possible. If adding new elements, assign them new, unique IDs (e.g., 'el-10', 'el-11').

{{ export_rules }}

Here is the existing code of the UI component:
```tsx
{{ base_component_code }}
```

Here is the existing CSS code of the UI component (if any):
```css
{{ existing_css }}
```

Here is the user's prompt for refinement:
{{ prompt }}
{% if has_image %}
The user has provided an image as a visual reference for this refinement. Take it into account.
{% endif %}
Based on the above information, generate the refined JSX/TSX code and CSS for the UI component. Ensure that the refined code is syntactically correct. Return the complete, updated component code and CSS.
Respond with a JSON object of the form {"refinedComponentCode": "<component source>", "refinedCss": "<stylesheet>"}. Omit "refinedCss" only if the stylesheet needs no change.
"#;

const ASK_ABOUT_CODE: &str = r#"You are an expert AI code assistant. The user has selected a snippet of code and has a question or request about it.

Your task is to analyze the user's prompt and the code snippet and determine if the user is asking for an explanation or asking for a code modification.

- If the user is asking for an explanation (e.g., "what does this do?", "explain this css"), provide a clear and concise explanation in the 'explanation' field. Set 'responseType' to 'explanation'. Do NOT provide code.
- If the user is asking to modify the code (e.g., "make this button bigger", "change color to blue"), you must provide the complete, updated code snippet in the 'updatedCode' field. Set 'responseType' to 'code_update'. Do NOT provide an explanation.

Code Snippet:
```
{{ code_snippet }}
```

User's Prompt:
"{{ user_prompt }}"

Analyze the user's prompt and provide the appropriate response based on the rules above.
Respond with a JSON object of the form {"responseType": "explanation" | "code_update", "explanation": "...", "updatedCode": "..."} containing only the field that matches responseType.
"#;

static PROMPTS: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template(GENERATE_TEMPLATE, GENERATE)
        .expect("valid generate template");
    env.add_template(REFINE_TEMPLATE, REFINE)
        .expect("valid refine template");
    env.add_template(ASK_ABOUT_CODE_TEMPLATE, ASK_ABOUT_CODE)
        .expect("valid ask-about-code template");
    env
});

pub fn render_generate(prompt: &str, has_image: bool) -> Result<String, minijinja::Error> {
    PROMPTS.get_template(GENERATE_TEMPLATE)?.render(context! {
        component_rules => COMPONENT_RULES,
        export_rules => EXPORT_RULES,
        prompt => prompt,
        has_image => has_image,
    })
}

pub fn render_refine(
    prompt: &str,
    base_component_code: &str,
    existing_css: Option<&str>,
    has_image: bool,
) -> Result<String, minijinja::Error> {
    PROMPTS.get_template(REFINE_TEMPLATE)?.render(context! {
        component_rules => COMPONENT_RULES,
        export_rules => EXPORT_RULES,
        prompt => prompt,
        base_component_code => base_component_code,
        existing_css => existing_css.unwrap_or_default(),
        has_image => has_image,
    })
}

pub fn render_ask_about_code(
    code_snippet: &str,
    user_prompt: &str,
) -> Result<String, minijinja::Error> {
    PROMPTS.get_template(ASK_ABOUT_CODE_TEMPLATE)?.render(context! {
        code_snippet => code_snippet,
        user_prompt => user_prompt,
    })
}
