//! Prompts sent to the inference service.

use advisor_models::{KpiSeries, SummaryPair};

/// Structured review of a single video.
pub const REVIEW_PROMPT: &str = r#"You are "Ad-Visor", an expert consultant in global marketing and communication.
Carefully analyze this advertising video and produce a detailed report covering the following points:

1.  **Cultural Analysis:** Identify cultural elements and assess how they are likely to resonate in different international markets.

2.  **DE&I Evaluation (Diversity, Equity & Inclusion):**
    *   **Representation:** Authenticity versus stereotypes.
    *   **Inclusivity:** Inclusive messaging and risks of exclusion.

3.  **Risk and Controversy Detection:**
    *   **Sensitive Content:** Violence, inappropriate language, controversial themes.
    *   **Ambiguous Messages:** Possible negative interpretations.

4.  **Strategic Recommendations:** Clear, actionable suggestions to improve global effectiveness and reduce risk.

Provide a well-structured answer with a clear heading for each section."#;

/// Which video a summary prompt targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryTarget {
    Current,
    Mock,
}

/// Six-point structured summary of one video.
pub fn summary_prompt(target: SummaryTarget) -> String {
    let subject = match target {
        SummaryTarget::Current => "the following advertising video",
        SummaryTarget::Mock => "the following advertising video (mock version)",
    };

    format!(
        r#"You are "Ad-Visor", a senior marketing and communication consultant.
Provide a detailed, structured summary of {subject}, focusing on:
1) Tone and pace
2) Main message and call-to-action
3) Relevant visual elements (setting, clothing, symbols)
4) Representation and inclusivity
5) Any potentially risky or controversial elements
6) A short closing paragraph with strengths and weaknesses
Answer in a clear format with section headings."#
    )
}

/// Text-only comparison of two summaries and their KPI data.
///
/// Takes a [`SummaryPair`], so it can only be built once both summaries exist.
pub fn comparison_prompt(
    summaries: &SummaryPair,
    current_kpi: &KpiSeries,
    mock_kpi: &KpiSeries,
) -> serde_json::Result<String> {
    let current_summary = summaries.current().text().trim();
    let mock_summary = summaries.mock().text().trim();
    let current_analytics = current_kpi.to_prompt_text()?;
    let mock_analytics = mock_kpi.to_prompt_text()?;

    Ok(format!(
        r#"You are "Ad-Visor", a senior consultant.
You have two detailed summaries of two advertising videos.

Summary A (Current video):
{current_summary}
With analytics:
{current_analytics}

Summary B (Mock video):
{mock_summary}
With analytics:
{mock_analytics}

Based on the summaries and the data:

Explain in detail why one of the two videos performed better than the other, considering:
- Tone, pace and message
- Clarity of the call-to-action
- Visual and symbolic elements
- Inclusivity and representation
- KPIs (ROAS, CPA, CTR, CVR, CPL, CPC)

Put the recommendations based on the differences at the top, then create a comparison table."#
    ))
}
