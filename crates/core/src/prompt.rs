use crate::form::{Field, GenerationRequest};

/// Built-in instruction template used when no template file is configured.
///
/// Each `{field_key}` placeholder is replaced by the matching outline field.
pub const DEFAULT_TEMPLATE: &str = "\
You are a professional academic writing assistant. Write a complete **INTRODUCTION** for a scientific paper using the ideas below.

Target rhetorical flow: establish broad context → narrow to the specific problem → identify limitations/gaps in prior work → introduce the proposed approach → highlight key contributions/benefits.

Inputs:
• Main topic (context): {main_topic}
• Specific problem: {specific_problem}
• Limitations of prior methods (gap): {old_methods}
• Proposed solution/method: {solution}
• Key benefits/contributions: {benefits}

Requirements:
- Language: **English**; formal, academic, objective, and cohesive.
- Structure: **2 to 4 paragraphs** with natural transitions (e.g., \"However…\", \"Therefore…\", \"To address this limitation…\"); **no bullet points** or headings.
- Length: **180 to 260 words**.
- Do **not** invent datasets, quantitative results, or specific citations. If mentioning related work, use a placeholder like **[ref]**.
- Clearly articulate the **novelty** vs. prior approaches and the **practical/theoretical benefits** of the proposed method.
- Prefer a neutral academic voice; you may use \"we\" when introducing the proposed method.

Output only the plain text of the Introduction (no titles, notes, or extra commentary).";

/// Substitute the request fields into `template`.
///
/// Substitution is a single left-to-right pass, so text supplied by the user
/// is never scanned for placeholders. Unknown `{...}` tokens are kept as-is.
pub fn render_prompt(template: &str, request: &GenerationRequest) -> String {
    let mut out = String::with_capacity(template.len() + 512);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after
            .find('}')
            .and_then(|close| Field::from_key(&after[..close]).map(|field| (field, close)))
        {
            Some((field, close)) => {
                out.push_str(request.get(field));
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Fields whose placeholder does not appear in `template`.
pub fn missing_placeholders(template: &str) -> Vec<Field> {
    Field::ALL
        .into_iter()
        .filter(|field| !template.contains(&format!("{{{}}}", field.key())))
        .collect()
}
