//! Prompts for the text generator and parsing of the outlines it returns.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::OnceLock;

use crate::trends::{TopicReport, organize_questions, truncate_chars};

pub const DEFAULT_TOPIC: &str = "latest music production trends";

pub const KEYCAPS: [&str; 4] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣"];

const OUTLINE_PREVIEW_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub number: u8,
    pub title: String,
    pub sentiment: Option<String>,
    pub body: String,
}

/// Keycap emoji for a 1-based position.
#[must_use]
pub fn keycap(position: usize) -> Option<&'static str> {
    position.checked_sub(1).and_then(|i| KEYCAPS.get(i).copied())
}

/// 1-based position of a keycap emoji.
#[must_use]
pub fn parse_keycap(input: &str) -> Option<u8> {
    KEYCAPS
        .iter()
        .position(|k| *k == input)
        .and_then(|i| u8::try_from(i + 1).ok())
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t#*_]*outline[ \t]*#?[ \t]*([1-4])[ \t]*[:.)\-–—]*[ \t*_]*(.*?)[ \t*_]*$")
            .expect("Invalid regex")
    })
}

fn sentiment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t*_\-•]*sentiment[ \t*_]*[:\-–][ \t*_]*(.+?)[ \t*_]*$")
            .expect("Invalid regex")
    })
}

/// Splits generated text on `OUTLINE n:` headers. Text without any header becomes a
/// single outline; a repeated number keeps its first occurrence.
#[must_use]
pub fn parse_outlines(text: &str) -> Vec<Outline> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let headers: Vec<(usize, usize, u8, String)> = header_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(1)?.as_str().parse().ok()?;
            let title = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
            Some((whole.start(), whole.end(), number, title))
        })
        .collect();

    if headers.is_empty() {
        let (sentiment, body) = split_sentiment(text);
        let title = body
            .lines()
            .map(|l| l.trim_matches(|c: char| c == '#' || c == '*' || c.is_whitespace()))
            .find(|l| !l.is_empty())
            .unwrap_or("Outline 1")
            .to_string();
        return vec![Outline {
            number: 1,
            title,
            sentiment,
            body,
        }];
    }

    let mut outlines: Vec<Outline> = Vec::with_capacity(headers.len());
    for (i, (_, end, number, title)) in headers.iter().enumerate() {
        if outlines.iter().any(|o| o.number == *number) {
            continue;
        }

        let next_start = headers.get(i + 1).map_or(text.len(), |h| h.0);
        let (sentiment, body) = split_sentiment(&text[*end..next_start]);
        let title = if title.is_empty() {
            format!("Outline {number}")
        } else {
            title.clone()
        };

        outlines.push(Outline {
            number: *number,
            title,
            sentiment,
            body,
        });
    }

    outlines
}

fn split_sentiment(section: &str) -> (Option<String>, String) {
    let sentiment = sentiment_re()
        .captures(section)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());
    let body = sentiment_re().replace(section, "").trim().to_string();
    (sentiment, body)
}

fn push_context(prompt: &mut String, report: &TopicReport) {
    let _ = writeln!(prompt, "Topic: {}", report.query);
    let _ = writeln!(prompt, "Category: {}", report.category);
    let _ = writeln!(prompt, "Trend: {}/100 ({})", report.score, report.status);
    let _ = writeln!(prompt, "Headline: {}", report.title);
    let _ = writeln!(prompt, "Source: {}", report.link);
    let _ = writeln!(prompt, "Summary: {}", report.snippet);

    let questions = organize_questions(&report.questions);
    if !questions.is_empty() {
        prompt.push_str("\nReader questions, in the order the post should answer them:\n");
        for question in &questions {
            let _ = writeln!(prompt, "- {question}");
        }
    }

    if !report.ai_insights.is_empty() {
        prompt.push_str("\nWhat AI search summaries currently say:\n");
        for insight in &report.ai_insights {
            let _ = writeln!(prompt, "- {insight}");
        }
    }
}

#[must_use]
pub fn outline_prompt(report: &TopicReport) -> String {
    let mut prompt = String::from(
        "You are the content strategist for SoundSwap, a community for independent music \
         producers. Write exactly 4 distinct blog outline approaches for the topic below, \
         each with a different emotional angle.\n\n",
    );
    push_context(&mut prompt, report);
    prompt.push_str(
        "\nFormat every approach exactly like this:\n\
         OUTLINE 1: <working title>\n\
         Sentiment: <emotional angle, e.g. excited, cautious, practical>\n\
         - Hook: <one line>\n\
         - Section: <one line>\n\
         - Section: <one line>\n\
         - Takeaway: <one line>\n\n\
         Number the approaches 1 to 4 and keep each under 80 words.\n",
    );
    prompt
}

#[must_use]
pub fn blog_prompt(report: &TopicReport, outline: &Outline) -> String {
    let mut prompt = String::from(
        "You are the lead strategist for SoundSwap. Write a professional, punchy, 600-word \
         blog post that follows the chosen outline.\n\n",
    );
    push_context(&mut prompt, report);

    let _ = write!(prompt, "\nChosen outline: {}\n", outline.title);
    if let Some(sentiment) = &outline.sentiment {
        let _ = writeln!(prompt, "Tone: {sentiment}");
    }
    if !outline.body.is_empty() {
        let _ = writeln!(prompt, "{}", outline.body);
    }

    prompt.push_str(
        "\nStructure:\n\
         1. Catchy H1 headline\n\
         2. 'The Trend' (H2): why this matters for producers\n\
         3. 'Strategic Takeaways' (H2): bullet points of action items\n\
         4. 'The Bottom Line' (H2): a call to action for the SoundSwap community\n",
    );
    prompt
}

#[must_use]
pub fn draft_prompt(context: &str) -> String {
    format!(
        "You are the lead copywriter for SoundSwap, a platform for independent music \
         producers. Write a high-energy, 600-word blog post based on the following intel.\n\n\
         Intel: {context}\n\n\
         Requirements:\n\
         - Professional yet punchy tone.\n\
         - Focus on actionable takeaways for producers.\n\
         - Structure: catchy H1, intro, 3 body sections with H2s, and a 'Final Verdict' call to action.\n"
    )
}

/// Chat message presenting generated outlines for selection.
#[must_use]
pub fn format_outlines(report: &TopicReport, outlines: &[Outline]) -> String {
    let mut message = format!(
        "📝 **BLOG OUTLINES: {}**\n📊 Trend: {}/100 {}\n\n",
        report.query.to_uppercase(),
        report.score,
        report.status_label()
    );

    for outline in outlines {
        let marker = keycap(usize::from(outline.number)).unwrap_or("▫️");
        let _ = writeln!(message, "{marker} **{}**", outline.title);
        if let Some(sentiment) = &outline.sentiment {
            let _ = writeln!(message, "   💭 Sentiment: {sentiment}");
        }
        if !outline.body.is_empty() {
            let preview = truncate_chars(&outline.body, OUTLINE_PREVIEW_CHARS);
            let ellipsis = if preview.len() < outline.body.len() {
                "..."
            } else {
                ""
            };
            let _ = writeln!(message, "{preview}{ellipsis}");
        }
        message.push('\n');
    }

    message.push_str("**Reply with 1️⃣-4️⃣ to write the full blog post.**");
    message
}
