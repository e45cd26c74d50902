//! Itinerary prompt rendering
//!
//! Turns collected [`TripParameters`] into the instruction sent to the model
//! for the first itinerary. Rendering goes through a handlebars registry with
//! HTML escaping disabled so destinations like `"Bosnia & Herzegovina"`
//! reach the model untouched.

use crate::trip::TripParameters;
use handlebars::Handlebars;
use thiserror::Error;

const ITINERARY_TEMPLATE_NAME: &str = "itinerary";

const ITINERARY_TEMPLATE: &str = r#"I am a travel planning assistant. Please create a detailed {{days}}-day itinerary for {{travelers}} people visiting {{destination}} with a {{budget}} budget.{{#if interests}} Their interests include: {{interests}}.{{/if}}

Please include:
1. Day-by-day breakdown with activities and attractions
2. Recommended accommodations
3. Food and restaurant suggestions for each day
4. Transportation options within the destination
5. Estimated costs for activities, food, and accommodations
6. Any local tips or cultural insights

Format the itinerary in a well-structured, easy-to-read format with clear headings for each day.
"#;

/// Errors that can occur while rendering prompts
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Invalid prompt template: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Prompt rendering error: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Registry holding the compiled itinerary template
pub struct PromptBuilder {
    handlebars: Handlebars<'static>,
}

impl PromptBuilder {
    pub fn new() -> Result<Self, PromptError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string(ITINERARY_TEMPLATE_NAME, ITINERARY_TEMPLATE)?;
        Ok(Self { handlebars })
    }

    /// Render the initial itinerary request for a trip
    pub fn itinerary_prompt(&self, trip: &TripParameters) -> Result<String, PromptError> {
        Ok(self.handlebars.render(ITINERARY_TEMPLATE_NAME, trip)?)
    }
}

/// Convenience wrapper building a one-off registry
pub fn build_prompt(trip: &TripParameters) -> Result<String, PromptError> {
    PromptBuilder::new()?.itinerary_prompt(trip)
}
