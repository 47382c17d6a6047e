//! Message composition for each generation stage

use crate::llm::Message;
use crate::models::{
    DemoRequest, IterateRequest, PartialEditRequest, ProductDocRequest, ReportRequest,
    RequirementRequest, TechDocRequest,
};

use super::render;
use super::templates::{
    DEMO, ITERATION, PARTIAL_EDIT, PARTIAL_EDIT_PERSONA, PRODUCT_DOC, REFINE_PRODUCT_DOC,
    REFINE_REQUIREMENTS, REFINE_TECHNICAL_DOC, REPORT, REPORT_PERSONA, REQUIREMENTS,
    TECHNICAL_DOC,
};

const PRODUCT_FEEDBACK_DEFAULT: &str = "Please improve based on requirements.";
const TECHNICAL_FEEDBACK_DEFAULT: &str = "Please improve based on PRD.";
const DEMO_FEEDBACK_DEFAULT: &str = "Optimize the existing code";

/// Longest prototype excerpt included in a report prompt, in characters
pub const REPORT_CODE_LIMIT: usize = 4000;

/// A generation request that knows how to phrase itself for the model
pub trait Stage {
    /// Short name used in logs
    const NAME: &'static str;

    /// Model requested by the client, if any
    fn model(&self) -> Option<&str>;

    fn messages(&self) -> Vec<Message>;
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Single system message asking the model to revise `current`
fn refinement(template: &str, current: &str, feedback: &str) -> Vec<Message> {
    vec![Message::system(render(
        template,
        &[("current_content", current), ("feedback", feedback)],
    ))]
}

impl Stage for RequirementRequest {
    const NAME: &'static str = "requirements";

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    fn messages(&self) -> Vec<Message> {
        match present(&self.current_content) {
            Some(current) => refinement(REFINE_REQUIREMENTS, current, &self.raw_requirement),
            None => vec![
                Message::system(REQUIREMENTS),
                Message::user(self.raw_requirement.clone()),
            ],
        }
    }
}

impl Stage for ProductDocRequest {
    const NAME: &'static str = "product";

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    fn messages(&self) -> Vec<Message> {
        match present(&self.current_content) {
            Some(current) => refinement(
                REFINE_PRODUCT_DOC,
                current,
                present(&self.feedback).unwrap_or(PRODUCT_FEEDBACK_DEFAULT),
            ),
            None => vec![
                Message::system(PRODUCT_DOC),
                Message::user(format!(
                    "Generate a PRD based on the following requirements document:\n\n{}",
                    self.requirements_doc
                )),
            ],
        }
    }
}

impl Stage for TechDocRequest {
    const NAME: &'static str = "technical";

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    fn messages(&self) -> Vec<Message> {
        match present(&self.current_content) {
            Some(current) => refinement(
                REFINE_TECHNICAL_DOC,
                current,
                present(&self.feedback).unwrap_or(TECHNICAL_FEEDBACK_DEFAULT),
            ),
            None => vec![
                Message::system(TECHNICAL_DOC),
                Message::user(format!(
                    "Generate a technical design based on the following PRD:\n\n{}",
                    self.product_doc
                )),
            ],
        }
    }
}

impl Stage for DemoRequest {
    const NAME: &'static str = "demo";

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    fn messages(&self) -> Vec<Message> {
        if let Some(current) = present(&self.current_content) {
            let feedback = present(&self.feedback).unwrap_or(DEMO_FEEDBACK_DEFAULT);
            return vec![Message::system(render(
                ITERATION,
                &[("current_code", current), ("user_feedback", feedback)],
            ))];
        }

        let mut parts = Vec::with_capacity(3);
        if let Some(doc) = present(&self.requirements_doc) {
            parts.push(format!("[Requirements document (PRD background)]\n{}", doc));
        }
        if let Some(doc) = present(&self.product_doc) {
            parts.push(format!("[UI and interaction design document]\n{}", doc));
        }
        parts.push(format!(
            "[Core development and technical document]\n{}",
            self.tech_doc
        ));

        vec![
            Message::system(DEMO),
            Message::user(format!(
                "Using the complete set of design documents below, generate the final high-fidelity prototype code:\n\n{}",
                parts.join("\n\n---\n\n")
            )),
        ]
    }
}

/// First `limit` characters followed by "..." when `code` is longer
fn truncate_code(code: &str, limit: usize) -> String {
    match code.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &code[..cut]),
        None => code.to_string(),
    }
}

impl Stage for ReportRequest {
    const NAME: &'static str = "report";

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    fn messages(&self) -> Vec<Message> {
        let demo_code = truncate_code(
            present(&self.demo_code).unwrap_or("No prototype code yet"),
            REPORT_CODE_LIMIT,
        );

        let mut prompt = render(
            REPORT,
            &[
                (
                    "requirements_doc",
                    present(&self.requirements_doc).unwrap_or("No requirements document yet"),
                ),
                (
                    "product_doc",
                    present(&self.product_doc).unwrap_or("No design document yet"),
                ),
                (
                    "tech_doc",
                    present(&self.tech_doc).unwrap_or("No technical document yet"),
                ),
                ("demo_code", &demo_code),
            ],
        );

        if let Some(feedback) = present(&self.feedback) {
            prompt.push_str("\n\nAdditional revision notes from the user: ");
            prompt.push_str(feedback);
        }

        vec![Message::system(REPORT_PERSONA), Message::user(prompt)]
    }
}

impl Stage for IterateRequest {
    const NAME: &'static str = "iterate";

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(ITERATION),
            Message::user(format!(
                "Current code:\n```html\n{}\n```\n\nRequested changes: {}",
                self.current_code, self.user_feedback
            )),
        ]
    }
}

impl Stage for PartialEditRequest {
    const NAME: &'static str = "partial_edit";

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    fn messages(&self) -> Vec<Message> {
        let selected = self
            .selected_elements
            .iter()
            .map(|element| {
                let mut lines = Vec::with_capacity(3);
                if let Some(trace_id) = present(&element.trace_id) {
                    lines.push(format!("Trace ID: {}", trace_id));
                }
                if !element.selector.is_empty() {
                    lines.push(format!("Selector: {}", element.selector));
                }
                lines.push(format!("Current HTML Snippet: {}", element.html));
                lines.join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n---\n");

        let prompt = render(
            PARTIAL_EDIT,
            &[
                ("selected_elements_info", &selected),
                ("user_feedback", &self.user_feedback),
                ("current_code", &self.current_code),
            ],
        );

        vec![Message::system(PARTIAL_EDIT_PERSONA), Message::user(prompt)]
    }
}
