use curio_store::SummaryKind;

pub(crate) const SUMMARIZER_ROLE: &str = "\
You summarize saved web pages for a personal research library. Work \
only from the provided page content.";

/// Fixed instruction wording per summary kind; `Custom` uses the
/// caller-supplied prompt verbatim.
pub(crate) fn instruction(kind: SummaryKind, custom_prompt: Option<&str>) -> String {
    match kind {
        SummaryKind::Tldr => "Write a two or three sentence tl;dr of the page.".to_string(),
        SummaryKind::Bullets => {
            "Summarize the page as five to eight short bullet points.".to_string()
        }
        SummaryKind::Quotes => {
            "Pull out the most important verbatim quotes from the page, one per line.".to_string()
        }
        SummaryKind::Insights => {
            "List the key insights and practical takeaways of the page.".to_string()
        }
        SummaryKind::Custom => custom_prompt.unwrap_or("Summarize the page.").to_string(),
        // raw rows never reach the model
        SummaryKind::Raw => String::new(),
    }
}
