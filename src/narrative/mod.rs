//! Narrative generation for the SOP and X-Matrix panels
//!
//! The dashboard labels these outputs "AI-generated". Any text backend plugs in
//! behind [`NarrativeGenerator`]; the shipped implementation is
//! [`TemplateGenerator`], which returns fixed standard-work content and tags
//! it `source: "template"` so a client can show the simulated-output banner.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::types::Evaluation;

mod templates;

pub use templates::TemplateGenerator;

/// Input to SOP generation.
#[derive(Debug, Clone)]
pub struct SopRequest {
    /// Asset tag, e.g. "P-101"
    pub asset_id: String,
    /// Evaluation that raised the alarm
    pub evaluation: Evaluation,
}

/// A numbered procedure step with an optional bold lead-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SopStep {
    pub label: Option<String>,
    pub text: String,
}

/// Standard work document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SopDocument {
    pub title: String,
    pub document_id: String,
    pub required_tools: Vec<String>,
    pub safety_steps: Vec<String>,
    pub execution_steps: Vec<SopStep>,
    pub source: &'static str,
}

impl SopDocument {
    /// Markdown rendering, headed "Standard Work: {title} ({document_id})".
    pub fn to_markdown(&self) -> String {
        let mut out = format!("## **Standard Work: {} ({})**\n\n", self.title, self.document_id);

        out.push_str("### **Required Tools**\n");
        for tool in &self.required_tools {
            out.push_str(&format!("*   {tool}\n"));
        }

        out.push_str("\n### **Safety (LOTO)**\n");
        for (i, step) in self.safety_steps.iter().enumerate() {
            out.push_str(&format!("{}.  {step}\n", i + 1));
        }

        out.push_str("\n### **Step-by-Step Execution**\n");
        for (i, step) in self.execution_steps.iter().enumerate() {
            match &step.label {
                Some(label) => out.push_str(&format!("{}.  **{label}:** {}\n", i + 1, step.text)),
                None => out.push_str(&format!("{}.  {}\n", i + 1, step.text)),
            }
        }
        out
    }
}

/// One row of the policy deployment matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XMatrixRow {
    #[serde(rename = "Strategic Goal (L1)")]
    pub strategic_goal: String,
    #[serde(rename = "Tactical Project (L2)")]
    pub tactical_project: String,
    #[serde(rename = "Shop Floor Action (L3)")]
    pub shop_floor_action: String,
    #[serde(rename = "Correlation")]
    pub correlation: String,
    #[serde(rename = "Owner")]
    pub owner: String,
}

/// Generated X-Matrix with its banner text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XMatrix {
    pub headline: String,
    pub rows: Vec<XMatrixRow>,
    pub summary: String,
    pub note: String,
    pub source: &'static str,
}

/// Backend for generated narrative text
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Produce the sustainment SOP for an alarming asset
    async fn generate_sop(&self, request: &SopRequest) -> Result<SopDocument>;

    /// Produce the monthly policy deployment matrix
    async fn generate_x_matrix(&self) -> Result<XMatrix>;

    /// Get the generator name for logging
    fn generator_name(&self) -> &'static str;
}
