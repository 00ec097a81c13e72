use crate::document::Page;

/// Outcome of concatenating pages under a character budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetResult {
    pub text: String,
    pub chars_used: usize,
    pub pages_included: usize,
    /// Page whose text was hard-cut to fit, if the budget ran out.
    pub cut_at_page: Option<u32>,
}

impl BudgetResult {
    pub fn overflowed(&self) -> bool {
        self.cut_at_page.is_some()
    }
}

/// Concatenate page texts in order until `budget` characters.
///
/// The page that would cross the budget is cut at the remaining allowance
/// (no word-boundary awareness) and nothing after it is taken. Filling the
/// budget exactly is not a cut.
pub fn apply_budget(pages: &[&Page], budget: usize) -> BudgetResult {
    let mut text = String::new();
    let mut chars_used = 0;
    let mut pages_included = 0;
    let mut cut_at_page = None;

    for page in pages {
        let len = page.text().chars().count();
        if chars_used + len <= budget {
            text.push_str(page.text());
            chars_used += len;
            pages_included += 1;
        } else {
            let remaining = budget - chars_used;
            text.push_str(truncate_chars(page.text(), remaining));
            chars_used = budget;
            cut_at_page = Some(page.page_number());
            break;
        }
    }

    debug_assert!(chars_used <= budget);
    debug_assert_eq!(chars_used, text.chars().count());

    BudgetResult {
        text,
        chars_used,
        pages_included,
        cut_at_page,
    }
}

/// Full concatenation of the page texts, no separator.
pub fn concat_pages(pages: &[&Page]) -> String {
    pages.iter().map(|p| p.text()).collect()
}

/// Longest prefix of `s` holding at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Result of fitting an instruction string into the prompt budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptFit {
    pub prompt: String,
    pub context: String,
    /// Characters removed from the context.
    pub trimmed: usize,
}

/// Render with `context`; if the result exceeds `prompt_budget`, cut the
/// context by the overflow and render again.
///
/// When the context is shorter than the overflow it is emptied and the
/// prompt may still exceed the budget.
pub fn clamp_prompt(
    context: &str,
    prompt_budget: usize,
    render: impl Fn(&str) -> String,
) -> PromptFit {
    let prompt = render(context);
    let prompt_len = prompt.chars().count();
    if prompt_len <= prompt_budget {
        return PromptFit {
            prompt,
            context: context.to_string(),
            trimmed: 0,
        };
    }

    let excess = prompt_len - prompt_budget;
    let context_len = context.chars().count();
    let kept = truncate_chars(context, context_len.saturating_sub(excess));

    tracing::warn!(
        prompt_chars = prompt_len,
        budget = prompt_budget,
        excess,
        "Prompt over budget, trimming context"
    );

    let prompt = render(kept);
    PromptFit {
        trimmed: context_len - kept.chars().count(),
        context: kept.to_string(),
        prompt,
    }
}
