//! Built-in study content.
//!
//! Used whenever no study configuration file is supplied.

use serde::{Deserialize, Serialize};

use crate::analysis::{
    AnalysisReport, ClauseAnalysis, ClauseVerdict, Conclusion, PolicyDocument, PolicySegment,
    Recommendation,
};
use crate::study::Condition;

/// Identifier of the built-in policy document.
pub const BUILTIN_DOCUMENT_ID: &str = "synapse";

/// Shown on the introduction screen.
pub const INTRODUCTION: &str = "Thank you for taking part in this study on AI transparency. \
Faced with a long privacy policy, most of us scroll to the bottom and tick the box without \
reading the details, and can miss red flags about how our data is used.\n\n\
You will use two AI systems that evaluate a privacy policy. One explains its reasoning (a \
\"transparent\" AI); the other does not (an \"opaque\" AI). We want to learn whether a tool \
like this helps people understand what they are agreeing to.";

/// Consent statement the participant must accept.
pub const CONSENT_STATEMENT: &str = "I consent to anonymously participate in this study. \
I understand that my responses will be recorded for research purposes.";

/// Disclosure shown alongside the transparent analysis.
pub const BIAS_DISCLOSURE: &str = "My primary directive is to champion user privacy. I was \
fine-tuned on consumer protection regulations and privacy-focused legal analysis, so I am \
biased towards flagging clauses that are vague, overly broad, or shift liability to you, even \
when such clauses are standard industry practice.";

/// Likert statements for each condition's survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Statements rated after the transparent condition
    pub transparent: Vec<String>,
    /// Statements rated after the opaque condition
    pub opaque: Vec<String>,
}

impl QuestionSet {
    /// Questions for the given condition.
    #[must_use]
    pub fn for_condition(&self, condition: Condition) -> &[String] {
        match condition {
            Condition::Transparent => &self.transparent,
            Condition::Opaque => &self.opaque,
        }
    }
}

impl Default for QuestionSet {
    fn default() -> Self {
        Self {
            transparent: strings(&[
                "I understood why the AI marked each clause.",
                "The explanations improved my confidence in my own understanding.",
                "I trust this AI's reasoning.",
            ]),
            opaque: strings(&[
                "I understood the AI's evaluation of each clause.",
                "Even without explanations, I felt confident in my understanding.",
                "I trust this AI's judgment.",
            ]),
        }
    }
}

/// Prompts for the three comparison questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonPrompts {
    /// Overall preference prompt
    pub preferred: String,
    /// Trustworthiness prompt
    pub trustworthy: String,
    /// Reasoning-versus-decisions prompt
    pub reasoning: String,
}

impl Default for ComparisonPrompts {
    fn default() -> Self {
        Self {
            preferred: "Which AI system did you prefer overall?".into(),
            trustworthy: "Which felt more trustworthy?".into(),
            reasoning: "Would you rather use an AI that shows reasoning or one that just gives \
                        decisions?"
                .into(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn heading(text: &str) -> PolicySegment {
    PolicySegment::Heading {
        content: text.into(),
    }
}

fn clause(id: u32, text: &str) -> PolicySegment {
    PolicySegment::Clause {
        id,
        content: text.into(),
    }
}

/// The built-in privacy policy.
#[must_use]
pub fn builtin_document() -> PolicyDocument {
    PolicyDocument {
        id: BUILTIN_DOCUMENT_ID.into(),
        title: "Synapse Corporation Privacy Policy".into(),
        segments: vec![
            heading("Synapse Corporation Privacy Policy"),
            PolicySegment::Paragraph {
                content: "Effective Date: October 26, 2023. This Privacy Policy describes how \
                          Synapse Corporation and its affiliates (\"we,\" \"us,\" or \"Synapse\") \
                          collect, use, and share information in connection with your use of our \
                          websites, services, and applications (collectively, the \"Services\")."
                    .into(),
            },
            heading("1. Information We Collect"),
            clause(1, "Account Information: When you create an account, we collect information you provide to us, such as your name, email address, phone number, and payment information."),
            clause(2, "Service Usage Data: We automatically collect information about how you use the Services, including your IP address, device identifiers, browser type, operating system, pages viewed, links clicked, and the dates and times of your visits."),
            clause(3, "Third-Party Information: We may receive information about you from third-party services, such as social media platforms, when you choose to link your account with us."),
            heading("2. How We Use Your Information"),
            clause(4, "To provide, maintain, and improve our Services, including to process transactions, develop new features, and provide customer support."),
            clause(5, "We use your information to personalize the Services and provide you with tailored content and advertisements, which may involve automated decision-making and profiling."),
            heading("3. How We Share Your Information"),
            clause(6, "We share information with third-party vendors and partners who help us operate our Services, such as payment processors and cloud hosting providers. They are contractually bound to use the data only for the purposes we specify."),
            clause(7, "Your data is shared with our analytics and advertising partners to measure ad performance and deliver personalized marketing content. You may opt-out of this sharing through your account settings."),
            clause(8, "In the event of a merger, acquisition, or sale of assets, your information may be transferred as part of that transaction. We will notify you of any such change in control."),
            clause(9, "We reserve the right to disclose your information to law enforcement or other government agencies if we believe, in our sole discretion, that it is necessary to comply with a legal obligation or to protect our rights or property."),
            heading("4. Data Security and Retention"),
            clause(10, "We employ commercially reasonable security measures to protect your data. However, we cannot guarantee absolute security and disclaim all liability for any unauthorized access or use."),
            clause(11, "We will retain your personal information for as long as is necessary to fulfill the purposes outlined in this policy, unless a longer retention period is required or permitted by law."),
        ],
    }
}

fn verdict(id: u32, verdict: ClauseVerdict, explanation: &str) -> ClauseAnalysis {
    ClauseAnalysis {
        id,
        verdict,
        explanation: explanation.into(),
    }
}

/// Canned analysis of [`builtin_document`].
#[must_use]
pub fn builtin_report() -> AnalysisReport {
    use ClauseVerdict::{Concerning, Neutral, Positive};

    AnalysisReport {
        analysis: vec![
            verdict(1, Neutral, "Collecting this information is needed to create and manage an account, and the data requested is standard for that purpose."),
            verdict(2, Concerning, "'Information about how you use the Services' is extremely broad. This vague language could permit collection of sensitive behavior without explicit consent."),
            verdict(3, Neutral, "You initiate the account linking, so you stay in control, but the extent of the data pulled from the other platform may not be clear."),
            verdict(4, Positive, "Using data to maintain and improve the service is a legitimate use that directly benefits you."),
            verdict(5, Concerning, "Automated decision-making and profiling for ad targeting can lead to manipulative advertising and discriminatory outcomes."),
            verdict(6, Positive, "Sharing is limited to essential operations, and vendors are contractually bound to specific purposes."),
            verdict(7, Neutral, "Sharing data for advertising is a drawback, but a clear opt-out in account settings gives you direct control."),
            verdict(8, Neutral, "A standard business practice, but a change of ownership may also change how your data is handled."),
            verdict(9, Concerning, "'In our sole discretion' lets the company share data with authorities without a warrant or subpoena."),
            verdict(10, Concerning, "'Commercially reasonable' is a weak standard, and disclaiming all liability shifts the risk of breaches onto you."),
            verdict(11, Concerning, "No specific retention period is defined, so data may be held indefinitely and exposed in a future breach."),
        ],
        conclusion: Conclusion {
            recommendation: Recommendation::Disagree,
            summary: "5 concerning clauses versus 2 positive ones. The main issues are overly \
                      broad data collection (Clause 2), profiling for ad targeting (Clause 5), \
                      disclosure to law enforcement at the company's sole discretion (Clause 9), \
                      and weak security standards that shift breach liability onto you \
                      (Clause 10)."
                .into(),
            final_verdict: "Due to these significant privacy risks, I recommend that you DO NOT \
                            AGREE to this policy."
                .into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_questions_per_condition() {
        let set = QuestionSet::default();
        assert_eq!(set.for_condition(Condition::Transparent).len(), 3);
        assert_eq!(set.for_condition(Condition::Opaque).len(), 3);
        assert_ne!(
            set.for_condition(Condition::Transparent),
            set.for_condition(Condition::Opaque)
        );
    }

    #[test]
    fn builtin_report_covers_every_clause() {
        let doc = builtin_document();
        let report = builtin_report();
        for id in doc.clause_ids() {
            assert!(report.for_clause(id).is_some(), "clause {id} has no analysis");
        }
        assert_eq!(report.count(ClauseVerdict::Concerning), 5);
        assert_eq!(report.count(ClauseVerdict::Positive), 2);
    }
}
