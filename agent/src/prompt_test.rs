use super::*;
use crate::paper::StyleFlags;

fn request(text: &str) -> GenerationRequest {
    GenerationRequest::new(text)
}

#[test]
fn identical_requests_build_identical_prompts() {
    let builder = PromptBuilder::default();
    let mut req = request("Attention is all you need.");
    req.figures = vec!["arch.pdf".into()];
    assert_eq!(builder.blog(&req), builder.blog(&req.clone()));
}

#[test]
fn short_text_is_passed_verbatim() {
    let prompt = PromptBuilder::default().blog(&request("A small paper body."));
    assert!(prompt.user.contains("📄 PAPER CONTENT:\n\nA small paper body.\n"));
    assert!(!prompt.user.contains(TRUNCATION_MARKER));
}

#[test]
fn long_text_is_cut_to_budget_with_marker() {
    let budget = DEFAULT_PAPER_BUDGET;
    let text = format!("{}{}", "x".repeat(budget), "TAIL");
    let prompt = PromptBuilder::default().blog(&request(&text));

    let expected = format!("{}{TRUNCATION_MARKER}", "x".repeat(budget));
    assert!(prompt.user.contains(&expected));
    assert!(!prompt.user.contains("TAIL"));
}

#[test]
fn text_exactly_at_budget_is_not_marked() {
    let text = "y".repeat(50);
    let prompt = PromptBuilder::with_budget(50).blog(&request(&text));
    assert!(prompt.user.contains(&text));
    assert!(!prompt.user.contains(TRUNCATION_MARKER));
}

#[test]
fn system_prompt_carries_template_sections_in_order() {
    let system = PromptBuilder::default().blog(&request("t")).system;
    let headers = [
        "## 🔥 TL;DR",
        "## 🤔 The Problem",
        "## 💡 The Big Idea",
        "## 🔧 How It Works",
        "## 🔢 Key Formulas",
        "## 📊 Results That Matter",
        "## 🎨 Why This Is Cool",
        "## ⚠️ Limitations & Caveats",
        "## 🔮 Future Directions",
        "## 💭 Final Thoughts",
        "**Tags:**",
    ];
    let mut cursor = 0;
    for header in headers {
        let found = system[cursor..].find(header).unwrap_or_else(|| panic!("missing {header}"));
        cursor += found + header.len();
    }
}

#[test]
fn style_block_follows_writing_style() {
    let builder = PromptBuilder::default();
    let mut req = request("t");
    req.writing_style = WritingStyle::Technical;
    assert!(builder.blog(&req).system.contains("Style: Write in a detailed technical style"));

    req.writing_style = WritingStyle::Academic;
    assert!(builder.blog(&req).system.contains("formal academic style"));

    req.writing_style = WritingStyle::AlphaXiv;
    assert!(builder.blog(&req).system.contains("Write in the AlphaXiv style"));
}

#[test]
fn style_directives_join_with_period() {
    assert_eq!(
        style_directives(true, true),
        "Use emojis generously throughout the text. Include jokes, memes references, and humorous commentary"
    );
    assert_eq!(style_directives(false, true), "Include jokes, memes references, and humorous commentary");
    assert_eq!(style_directives(false, false), "");
}

#[test]
fn disabled_flags_drop_directives() {
    let mut req = request("t");
    req.flags = StyleFlags { include_emojis: false, include_humor: false };
    let system = PromptBuilder::default().blog(&req).system;
    assert!(!system.contains("Use emojis generously"));
    assert!(!system.contains("Include jokes"));
}

#[test]
fn custom_instructions_appended_only_when_present() {
    let builder = PromptBuilder::default();
    let mut req = request("t");
    assert!(!builder.blog(&req).system.contains("Additional instructions:"));

    req.custom_prompt = "Focus on the ablations.".into();
    assert!(builder.blog(&req).system.ends_with("\n\nAdditional instructions: Focus on the ablations."));
}

#[test]
fn figures_block_lists_each_filename() {
    let mut req = request("t");
    let builder = PromptBuilder::default();
    assert!(!builder.blog(&req).user.contains("AVAILABLE FIGURES"));

    req.figures = vec!["framework.pdf".into(), "results.png".into()];
    let user = builder.blog(&req).user;
    assert!(user.contains("🖼️ AVAILABLE FIGURES (extracted from LaTeX source):"));
    assert!(user.contains("  - framework.pdf\n"));
    assert!(user.contains("  - results.png\n"));
    assert!(user.contains("![[figures_folder/EXACT_FILENAME]]"));
}

#[test]
fn metadata_block_precedes_paper_content() {
    let mut req = request("body");
    req.metadata = Some(PaperMetadata {
        arxiv_id: Some("1706.03762".into()),
        title: Some("Attention Is All You Need".into()),
        authors: vec!["Ashish Vaswani".into(), "Noam Shazeer".into()],
        categories: vec!["cs.CL".into()],
        ..PaperMetadata::default()
    });
    let user = PromptBuilder::default().blog(&req).user;
    let meta_at = user.find("- Title: Attention Is All You Need").unwrap();
    let body_at = user.find("📄 PAPER CONTENT:").unwrap();
    assert!(meta_at < body_at);
    assert!(user.contains("- Authors: Ashish Vaswani, Noam Shazeer\n"));
    assert!(!user.contains("- Published:"));
}

#[test]
fn user_prompt_ends_with_begin_line() {
    let user = PromptBuilder::default().blog(&request("t")).user;
    assert!(user.ends_with("Begin the blog post now:"));
}

#[test]
fn question_prompt_embeds_content_and_question() {
    let prompt = PromptBuilder::default().question(&QuestionRequest {
        pdf_content: "The model uses 12 layers.".into(),
        question: "How many layers?".into(),
        temperature: 0.7,
    });
    assert!(prompt.system.starts_with("You are a helpful research assistant."));
    assert!(prompt.user.contains("PDF Content:\nThe model uses 12 layers.\n\nQuestion: How many layers?"));
}
