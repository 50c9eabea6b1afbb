//! Prompt builder: system and user prompts for blog posts and questions.
//!
//! DESIGN
//! ======
//! Pure string assembly: identical requests give byte-identical prompts.
//! The section template below is a contract with the model (headers, order,
//! closing tags line), not with calling code.

use std::fmt::Write;

use crate::llm::Prompt;
use crate::paper::{GenerationRequest, PaperMetadata, QuestionRequest, WritingStyle, truncate_chars};

/// Characters of paper text the agent forwards to a provider.
pub const DEFAULT_PAPER_BUDGET: usize = 60_000;
pub const TRUNCATION_MARKER: &str = "\n\n[... content truncated ...]";

const EMOJI_DIRECTIVE: &str = "Use emojis generously throughout the text";
const HUMOR_DIRECTIVE: &str = "Include jokes, memes references, and humorous commentary";

const RULE: &str = "═══════════════════════════════════════════════════════════════";

const QUESTION_SYSTEM_PROMPT: &str =
    "You are a helpful research assistant. Answer questions about academic papers clearly and accurately.";

const POST_TEMPLATE: &str = r"# 🎯 [Creative Title with Emojis]
> **Paper**: [Exact Title] | **Authors**: [First Author et al.] | **Year**: [YYYY]

---

## 🔥 TL;DR
[2-3 sentences. Hook the reader with the most exciting finding. Use bold for key terms.]

---

## 🤔 The Problem
[Explain what sucks about current approaches. Make it relatable. 3-4 sentences.]

**Why this matters:** [1 sentence on real-world impact]

---

## 💡 The Big Idea
[Core innovation explained simply. Use analogies. 4-5 sentences.]

**In other words:** [One-line ELI5 explanation]

---

## 🔧 How It Works
[Technical details broken down into digestible chunks. Use numbered lists or bullet points.]

**Key Components:**
1. **[Component 1]**: [What it does]
2. **[Component 2]**: [What it does]
3. **[Component 3]**: [What it does]

---

## 🔢 Key Formulas

$$[Formula in LaTeX]$$

**Translation:** [What this means in plain English]
- **[Variable]**: [What it represents]

---

## 📊 Results That Matter
[Quantitative results with exact numbers. Use tables or bullet points.]

| Metric | Baseline | This Paper | Improvement |
|--------|----------|------------|-------------|
| [Metric 1] | [X] | [Y] | **+Z%** ✨ |
| [Metric 2] | [X] | [Y] | **+Z%** 🚀 |

**Key Takeaway:** [One sentence on what these numbers mean]

---

## 🎨 Why This Is Cool
[Creative commentary. Memes, analogies, hot takes. 3-4 sentences. Be entertaining.]

---

## ⚠️ Limitations & Caveats
- **[Limitation 1]**: [Why it matters]
- **[Limitation 2]**: [Why it matters]

---

## 🔮 Future Directions
[What's next? Where could this go? 2-3 bullets.]

---

## 💭 Final Thoughts
[Your hot take. What does this mean for the field? 2-3 sentences. End with impact.]

---

**Tags:** #[Keyword1] #[Keyword2] #[Keyword3] #[Field] #ML #AI";

const STYLE_GUIDELINES: &str = r#"**Emojis Usage:**
- Title: 1-2 relevant emojis
- Section headers: ALWAYS use the exact emojis shown above
- In-text: Sprinkle throughout (🚀 for improvements, ✨ for highlights, 💪 for strength, 🤔 for questions, 😅 for humor)
- Results: Use ✅ for success, 📈 for growth, 🎯 for targets

**Formatting Rules:**
- Use **bold** for all key terms, metrics, and important phrases
- Use *italics* for emphasis or quotes
- Use code formatting (backticks) for technical terms, variable names, model names
- Use > blockquotes for important takeaways
- Use --- for section dividers (horizontal rules)
- Use tables for comparisons (always include headers)
- **Math formulas**: Use double dollar signs for display math (block formulas) and single dollar signs for inline math
  - Example block: $$\mathcal{L} = \sum_{i=1}^N \log p(y_i|x_i)$$
  - Example inline: The loss function $\mathcal{L}$ measures...
  - **NEVER use** square brackets with backslash - they don't render in Markdown

**Tone Consistency:**
- Enthusiastic but not annoying
- Accessible but technically accurate
- Humorous but respectful to authors
- Critical but constructive

**Number Formatting:**
- Always include exact numbers: "92.4% accuracy" not "high accuracy"
- Show improvements: "3.2x faster" or "+15.3% improvement"
- Use bold for impressive numbers: **92.4%**

**Lists:**
- Use numbered lists for sequential steps
- Use bullet points for parallel items
- Maximum 5-7 items per list
- Each item starts with **bold term**: followed by explanation"#;

const CRITICAL_REQUIREMENTS: &str = r#"1. **ALWAYS** follow the structure above, in that exact order
2. **ALWAYS** include quantitative results with exact numbers
3. **ALWAYS** use the specified emojis for each section header
4. **ALWAYS** include horizontal rules (---) between major sections
5. **ALWAYS** end with tags
6. **NEVER** skip sections (except 🔢 Key Formulas if no math)
7. **NEVER** use generic phrases like "impressive results" - give numbers!
8. **NEVER** forget the metadata quote block at the top"#;

const FIGURE_RULES: &str = r"**CRITICAL INSTRUCTIONS FOR USING FIGURES:**

⚠️ **SYNTAX:** Use EXACTLY this format: ![[figures_folder/EXACT_FILENAME]]

✅ CORRECT Examples:
  - ![[figures_folder/framework.pdf]]
  - ![[figures_folder/architecture_diagram.png]]
  - ![[figures_folder/results_table.pdf]]

❌ WRONG Examples:
  - ![Description|figures_folder/file.jpg]  ← NO alt text syntax!
  - ![[Text|figures_folder/file.jpg]]  ← NO pipe character!
  - ![[figures_folder/file.jpg]]  ← Must use .pdf if file is .pdf!

**RULES:**
1. **Use EXACT filenames** from the list above - DO NOT change file extensions!
2. **Select 2-4 most important figures** - prioritize: architecture, model, results, framework, comparison
3. **Simple syntax only:** ![[figures_folder/exact_filename.ext]]
4. **Place contextually** in relevant sections (after section headers)
5. **NO alt text, NO descriptions inside brackets** - keep it clean and simple
6. If the original file is .pdf, keep .pdf - if .png, keep .png - DO NOT change extensions!";

const CLOSING_REMINDER: &str = r"Now generate the blog post in Markdown format, following ALL structure requirements, emoji usage, and formatting rules specified above.

Remember:
- Use the EXACT section headers with their emojis (🔥 TL;DR, 🤔 The Problem, etc.)
- Include quantitative results with exact numbers
- Add horizontal rules (---) between sections
- Include the metadata quote block at the top
- End with tags

Begin the blog post now:";

// =============================================================================
// BUILDER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    paper_budget: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self { paper_budget: DEFAULT_PAPER_BUDGET }
    }
}

impl PromptBuilder {
    #[must_use]
    pub fn with_budget(paper_budget: usize) -> Self {
        Self { paper_budget }
    }

    #[must_use]
    pub fn paper_budget(&self) -> usize {
        self.paper_budget
    }

    /// System + user prompt for a blog post.
    #[must_use]
    pub fn blog(&self, request: &GenerationRequest) -> Prompt {
        Prompt { system: system_prompt(request), user: self.user_prompt(request) }
    }

    /// System + user prompt for a question about a paper.
    #[must_use]
    pub fn question(&self, request: &QuestionRequest) -> Prompt {
        let content = self.budgeted(&request.pdf_content);
        let user = format!(
            "Based on the following PDF content, answer the question.\n\n\
             PDF Content:\n{content}\n\n\
             Question: {}\n\n\
             Please provide a clear, concise, and helpful answer based on the content provided.",
            request.question
        );
        Prompt { system: QUESTION_SYSTEM_PROMPT.to_string(), user }
    }

    fn user_prompt(&self, request: &GenerationRequest) -> String {
        let mut out = String::from(
            "Please read this academic paper and generate a blog post following the EXACT structure and style guidelines provided in the system prompt.\n\n",
        );
        if let Some(metadata) = &request.metadata {
            out.push_str(&metadata_block(metadata));
        }
        out.push_str("📄 PAPER CONTENT:\n\n");
        out.push_str(&self.budgeted(&request.paper_text));
        out.push('\n');
        if !request.figures.is_empty() {
            out.push_str(&figure_block(&request.figures));
        }
        let _ = write!(out, "\n{RULE}\n\n{CLOSING_REMINDER}");
        out
    }

    fn budgeted(&self, text: &str) -> String {
        match truncate_chars(text, self.paper_budget) {
            (kept, true) => format!("{kept}{TRUNCATION_MARKER}"),
            (kept, false) => kept.to_string(),
        }
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

fn style_description(style: WritingStyle) -> &'static str {
    match style {
        WritingStyle::Technical => {
            "Write in a detailed technical style, focusing on methodology, algorithms, and implementation details. Use precise terminology."
        }
        WritingStyle::Casual => {
            "Write in a casual, easy-to-read style. Explain concepts simply without jargon. Make it accessible to beginners."
        }
        WritingStyle::Academic => {
            "Write in a formal academic style with proper citations, structured sections, and scholarly tone."
        }
        WritingStyle::AlphaXiv => {
            "Write in the AlphaXiv style: entertaining, accessible, with creative commentary, memes references, and emojis."
        }
    }
}

/// Emoji and humor directives, joined with ". " when both apply.
#[must_use]
pub fn style_directives(include_emojis: bool, include_humor: bool) -> String {
    let mut parts = Vec::with_capacity(2);
    if include_emojis {
        parts.push(EMOJI_DIRECTIVE);
    }
    if include_humor {
        parts.push(HUMOR_DIRECTIVE);
    }
    parts.join(". ")
}

fn system_prompt(request: &GenerationRequest) -> String {
    let mut out = String::from(
        "You are an expert at writing engaging, consistent blog posts about academic papers in the AlphaXiv style.\n\n",
    );
    let _ = writeln!(out, "Style: {}", style_description(request.writing_style));
    let _ = writeln!(out, "{}", style_directives(request.flags.include_emojis, request.flags.include_humor));
    let _ = write!(
        out,
        "\n{RULE}\n📋 MANDATORY STRUCTURE - FOLLOW THIS EXACTLY FOR EVERY POST:\n{RULE}\n\n{POST_TEMPLATE}\n\n\
         {RULE}\n🎨 STYLE GUIDELINES - APPLY TO EVERY SECTION:\n{RULE}\n\n{STYLE_GUIDELINES}\n\n\
         {RULE}\n⚠️ CRITICAL REQUIREMENTS:\n{RULE}\n\n{CRITICAL_REQUIREMENTS}"
    );
    if !request.custom_prompt.trim().is_empty() {
        let _ = write!(out, "\n\nAdditional instructions: {}", request.custom_prompt);
    }
    out
}

fn metadata_block(metadata: &PaperMetadata) -> String {
    let mut out = String::from("📑 PAPER METADATA:\n\n");
    if let Some(title) = &metadata.title {
        let _ = writeln!(out, "- Title: {title}");
    }
    if !metadata.authors.is_empty() {
        let _ = writeln!(out, "- Authors: {}", metadata.authors.join(", "));
    }
    if let Some(published) = &metadata.published {
        let _ = writeln!(out, "- Published: {published}");
    }
    if !metadata.categories.is_empty() {
        let _ = writeln!(out, "- Categories: {}", metadata.categories.join(", "));
    }
    if let Some(url) = &metadata.url {
        let _ = writeln!(out, "- URL: {url}");
    }
    out.push('\n');
    out
}

fn figure_block(figures: &[String]) -> String {
    let mut out = String::from("\n🖼️ AVAILABLE FIGURES (extracted from LaTeX source):\n\n");
    for figure in figures {
        let _ = writeln!(out, "  - {figure}");
    }
    let _ = writeln!(out, "\n{FIGURE_RULES}");
    out
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
